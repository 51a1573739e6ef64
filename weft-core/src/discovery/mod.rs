//! Relationship discovery across workspace datasets.
//!
//! Three passes, all pure and deterministic over the same sampled
//! snapshot:
//!
//! - **Candidate keys** (`keys`): columns (or minimal column pairs) unique
//!   enough to identify rows
//! - **Foreign-key inference** (`foreign_keys`): value-set overlap between
//!   columns of distinct datasets
//! - **Cross-field checks** (`cross_field`): schema-inferred multi-column
//!   rules such as date ordering between created/updated column pairs
//!
//! Distinct-value sets are kept sorted before comparison so results are
//! stable and order-independent: running discovery twice over the same
//! sample yields identical output.

mod cross_field;
mod foreign_keys;
mod keys;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::analyzers::sampling::SamplingPolicy;
use crate::analyzers::AnalyzerResult;
use crate::core::{Record, Value, Workspace};

pub use cross_field::{CheckStatus, CrossFieldCheck};
pub use foreign_keys::InferredForeignKey;
pub use keys::CandidateKey;

/// Default uniqueness (percent) a column must reach to qualify as a key.
pub const DEFAULT_KEY_UNIQUENESS_PCT: f64 = 98.0;

/// Default value-set overlap (percent) required to report a foreign key.
pub const DEFAULT_FK_OVERLAP_PCT: f64 = 80.0;

/// Default minimum distinct values on the source side of a foreign key.
/// Excludes flags and other low-cardinality columns from inference.
pub const DEFAULT_MIN_FK_CARDINALITY: usize = 5;

/// Default number of columns considered when searching for key pairs.
pub const DEFAULT_MAX_PAIR_COLUMNS: usize = 8;

/// Configuration for relationship discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    pub sampling: SamplingPolicy,
    pub key_uniqueness_pct: f64,
    pub fk_overlap_pct: f64,
    pub min_fk_cardinality: usize,
    pub max_pair_columns: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingPolicy::default(),
            key_uniqueness_pct: DEFAULT_KEY_UNIQUENESS_PCT,
            fk_overlap_pct: DEFAULT_FK_OVERLAP_PCT,
            min_fk_cardinality: DEFAULT_MIN_FK_CARDINALITY,
            max_pair_columns: DEFAULT_MAX_PAIR_COLUMNS,
        }
    }
}

/// Builder for [`RelationshipDiscovery`].
pub struct RelationshipDiscoveryBuilder {
    config: DiscoveryConfig,
}

impl RelationshipDiscoveryBuilder {
    /// Set the sampling policy.
    pub fn sampling(mut self, policy: SamplingPolicy) -> Self {
        self.config.sampling = policy;
        self
    }

    /// Set the candidate-key uniqueness threshold (percent).
    pub fn key_uniqueness_pct(mut self, pct: f64) -> Self {
        self.config.key_uniqueness_pct = pct;
        self
    }

    /// Set the foreign-key overlap threshold (percent).
    pub fn fk_overlap_pct(mut self, pct: f64) -> Self {
        self.config.fk_overlap_pct = pct;
        self
    }

    /// Set the minimum source-side cardinality for foreign keys.
    pub fn min_fk_cardinality(mut self, cardinality: usize) -> Self {
        self.config.min_fk_cardinality = cardinality;
        self
    }

    /// Build the RelationshipDiscovery.
    pub fn build(self) -> RelationshipDiscovery {
        RelationshipDiscovery {
            config: self.config,
        }
    }
}

/// Infers keys, foreign keys, and cross-field findings for a workspace.
#[derive(Debug, Clone, Default)]
pub struct RelationshipDiscovery {
    config: DiscoveryConfig,
}

impl RelationshipDiscovery {
    /// Create a new builder for RelationshipDiscovery.
    pub fn builder() -> RelationshipDiscoveryBuilder {
        RelationshipDiscoveryBuilder {
            config: DiscoveryConfig::default(),
        }
    }

    /// Create a discovery pass with default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a discovery pass from an explicit configuration, validating
    /// its thresholds.
    pub fn with_config(config: DiscoveryConfig) -> AnalyzerResult<Self> {
        use crate::analyzers::AnalyzerError;
        for (name, pct) in [
            ("key_uniqueness_pct", config.key_uniqueness_pct),
            ("fk_overlap_pct", config.fk_overlap_pct),
        ] {
            if !(0.0..=100.0).contains(&pct) {
                return Err(AnalyzerError::invalid_config(format!(
                    "{name} must be within [0, 100], got {pct}"
                )));
            }
        }
        Ok(Self { config })
    }

    /// The smallest qualifying key column set per dataset (possibly empty).
    #[instrument(skip(self, workspace))]
    pub fn candidate_keys(&self, workspace: &Workspace) -> Vec<CandidateKey> {
        let keys: Vec<CandidateKey> = workspace
            .datasets
            .iter()
            .map(|dataset| keys::candidate_key_for(dataset, &self.config))
            .collect();
        info!(
            datasets = keys.len(),
            with_key = keys.iter().filter(|k| !k.columns.is_empty()).count(),
            "candidate key detection finished"
        );
        keys
    }

    /// Foreign-key-like relationships between columns of distinct datasets,
    /// sorted by endpoints for stable output.
    #[instrument(skip(self, workspace))]
    pub fn inferred_foreign_keys(&self, workspace: &Workspace) -> Vec<InferredForeignKey> {
        let fks = foreign_keys::infer(workspace, &self.config);
        info!(count = fks.len(), "foreign key inference finished");
        fks
    }

    /// Schema-inferred multi-column rule checks over each dataset's sample.
    #[instrument(skip(self, workspace))]
    pub fn cross_field_checks(&self, workspace: &Workspace) -> Vec<CrossFieldCheck> {
        let checks = cross_field::run(workspace, &self.config);
        info!(
            count = checks.len(),
            warnings = checks
                .iter()
                .filter(|c| c.status == CheckStatus::Warn)
                .count(),
            "cross-field checks finished"
        );
        checks
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }
}

/// Sorted distinct non-blank canonical values of one column, over sampled
/// rows. The sorted set is what makes overlap comparison order-independent.
pub(crate) fn distinct_values(rows: &[&Record], column: &str) -> BTreeSet<String> {
    rows.iter()
        .filter_map(|record| record.get(column))
        .filter(|value| !value.is_blank())
        .map(Value::canonical_string)
        .collect()
}

/// Count of sampled rows with a non-blank value in `column`.
pub(crate) fn non_blank_count(rows: &[&Record], column: &str) -> usize {
    rows.iter()
        .filter(|record| {
            record
                .get(column)
                .map(|value| !value.is_blank())
                .unwrap_or(false)
        })
        .count()
}
