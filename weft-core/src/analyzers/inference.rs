//! Type and pattern inference for untyped column data.
//!
//! Every other analyzer leans on this module: profiling uses the inferred
//! type for consistency scoring and the detected pattern for validity
//! checks, discovery uses it to exclude boolean-like columns from key
//! inference, and the knowledge graph uses it to pair shared fields.
//!
//! Type inference examines the dynamic class of each non-blank sample
//! value. A column whose values all share one class gets that class; a
//! column where one class dominates keeps it (a numeric column with stray
//! text stays `Numeric` and pays for the strays in its consistency score);
//! a column split between classes is `Mixed`; everything else is `Text`.
//!
//! Pattern detection is name-driven: the column name selects the semantic
//! pattern (email, phone, postal code, date, identifier), and the pattern's
//! validator then confirms individual values during profiling.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Value, ValueClass};

/// Semantic type of a column, inferred from sampled values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferredType {
    Numeric,
    Date,
    Boolean,
    Text,
    /// Incompatible classes with no dominant one.
    Mixed,
}

/// Semantic pattern detected from a column's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPattern {
    Email,
    Phone,
    PostalCode,
    DateLike,
    Identifier,
    /// No recognized pattern; value-level validity defaults to passing.
    General,
}

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9().\-\s]{5,18}[0-9]$").unwrap());
static POSTAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9\- ]{2,9}$").unwrap());
static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-]+$").unwrap());

impl ColumnPattern {
    /// Checks a single non-blank value against the pattern's validator.
    pub fn is_valid(&self, value: &Value) -> bool {
        let text = value.canonical_string();
        match self {
            ColumnPattern::Email => EMAIL_RE.is_match(&text),
            ColumnPattern::Phone => PHONE_RE.is_match(&text),
            ColumnPattern::PostalCode => POSTAL_RE.is_match(&text),
            ColumnPattern::DateLike => value.as_date().is_some(),
            ColumnPattern::Identifier => IDENTIFIER_RE.is_match(&text),
            ColumnPattern::General => true,
        }
    }

    /// Whether the pattern is a recognized semantic tag (used by the
    /// lineage score).
    pub fn is_recognized(&self) -> bool {
        !matches!(self, ColumnPattern::General)
    }
}

/// Configuration for the type inference engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Share of non-blank values a class must hold to win outright
    /// (default: 0.9).
    pub dominance_threshold: f64,
    /// Minimum share for a class to count toward a mixed verdict
    /// (default: 0.1).
    pub mixed_floor: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            dominance_threshold: 0.9,
            mixed_floor: 0.1,
        }
    }
}

/// Outcome of inferring one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeInference {
    pub inferred_type: InferredType,
    pub pattern: ColumnPattern,
    /// Non-blank values examined.
    pub examined: usize,
    /// Share of examined values per dynamic class.
    pub class_shares: HashMap<ValueClass, f64>,
}

/// Builder for [`TypeInferenceEngine`].
pub struct TypeInferenceEngineBuilder {
    config: InferenceConfig,
}

impl TypeInferenceEngineBuilder {
    /// Set the dominance threshold.
    pub fn dominance_threshold(mut self, threshold: f64) -> Self {
        self.config.dominance_threshold = threshold;
        self
    }

    /// Set the mixed-verdict floor.
    pub fn mixed_floor(mut self, floor: f64) -> Self {
        self.config.mixed_floor = floor;
        self
    }

    /// Build the TypeInferenceEngine.
    pub fn build(self) -> TypeInferenceEngine {
        TypeInferenceEngine {
            config: self.config,
        }
    }
}

/// Classifies sampled column values into a semantic type.
#[derive(Debug, Clone, Default)]
pub struct TypeInferenceEngine {
    config: InferenceConfig,
}

impl TypeInferenceEngine {
    /// Create a new builder for TypeInferenceEngine.
    pub fn builder() -> TypeInferenceEngineBuilder {
        TypeInferenceEngineBuilder {
            config: InferenceConfig::default(),
        }
    }

    /// Create an engine with default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create an engine from an explicit configuration.
    pub fn with_config(config: InferenceConfig) -> Self {
        Self { config }
    }

    /// Infers the semantic type and pattern for one column.
    ///
    /// `values` is the sampled cell slice for the column; the column name
    /// drives pattern detection. An all-blank sample yields `Text` with the
    /// `General` pattern.
    pub fn infer<'a, I>(&self, column_name: &str, values: I) -> TypeInference
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut counts: HashMap<ValueClass, usize> = HashMap::new();
        let mut examined = 0usize;
        for value in values {
            if let Some(class) = value.classify() {
                *counts.entry(class).or_insert(0) += 1;
                examined += 1;
            }
        }

        let pattern = detect_pattern(column_name);
        let inferred_type = self.decide(&counts, examined);
        let class_shares = counts
            .into_iter()
            .map(|(class, count)| (class, count as f64 / examined as f64))
            .collect();

        debug!(
            column = column_name,
            ?inferred_type,
            ?pattern,
            examined,
            "inferred column type"
        );

        TypeInference {
            inferred_type,
            pattern,
            examined,
            class_shares,
        }
    }

    fn decide(&self, counts: &HashMap<ValueClass, usize>, examined: usize) -> InferredType {
        if examined == 0 {
            return InferredType::Text;
        }
        let share = |class: ValueClass| {
            counts.get(&class).copied().unwrap_or(0) as f64 / examined as f64
        };
        let numeric = share(ValueClass::Numeric);
        let date = share(ValueClass::Date);
        let boolean = share(ValueClass::Boolean);
        let text = share(ValueClass::Text);

        // A class holding every value wins, then a dominant class, in the
        // precedence date > boolean > numeric.
        for (class_share, inferred) in [
            (date, InferredType::Date),
            (boolean, InferredType::Boolean),
            (numeric, InferredType::Numeric),
        ] {
            if class_share >= 1.0 {
                return inferred;
            }
        }
        if text >= 1.0 {
            return InferredType::Text;
        }
        for (class_share, inferred) in [
            (date, InferredType::Date),
            (boolean, InferredType::Boolean),
            (numeric, InferredType::Numeric),
        ] {
            if class_share >= self.config.dominance_threshold {
                return inferred;
            }
        }
        let contenders = [numeric, date, boolean, text]
            .iter()
            .filter(|&&s| s >= self.config.mixed_floor)
            .count();
        if contenders >= 2 {
            InferredType::Mixed
        } else {
            InferredType::Text
        }
    }
}

/// Name-driven pattern detection with fixed precedence.
///
/// Suffix conventions for keys (`_id`, `_key`, `_ref`) follow the usual
/// foreign-key naming patterns; temporal name fragments match the common
/// created/updated column families.
pub fn detect_pattern(column_name: &str) -> ColumnPattern {
    let name = column_name.to_ascii_lowercase();
    if name.contains("email") || name.contains("e-mail") {
        ColumnPattern::Email
    } else if name.contains("phone") || name.contains("mobile") || name.contains("fax") {
        ColumnPattern::Phone
    } else if name.contains("zip") || name.contains("postal") || name.contains("postcode") {
        ColumnPattern::PostalCode
    } else if name.contains("date")
        || name.contains("time")
        || name.ends_with("_at")
        || name.contains("created")
        || name.contains("updated")
        || name.contains("modified")
    {
        ColumnPattern::DateLike
    } else if name == "id"
        || name.ends_with("_id")
        || name.ends_with("_key")
        || name.ends_with("_ref")
        || name.ends_with("uuid")
    {
        ColumnPattern::Identifier
    } else {
        ColumnPattern::General
    }
}
