//! Column and dataset profiling.
//!
//! `DatasetProfiler` turns a materialized source into a `DatasetProfile`:
//! per-column completeness, uniqueness, consistency, and validity scores,
//! descriptive statistics with outlier counts for numeric columns, and
//! dataset-level composites (quality score, table health, duplication,
//! lineage) plus an issue list for the dashboard.
//!
//! The profiler is a pure function of its input snapshot: no caches, no
//! clocks (timeliness is measured against an explicit reference date), and
//! no randomness. Re-profiling unchanged data yields a deep-equal profile.
//!
//! Per-column metrics are computed over a deterministic sample (see
//! `sampling`); duplication is computed over the full record set so it
//! matches the interactive duplicate inspector row for row.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::analyzers::inference::{
    ColumnPattern, InferenceConfig, InferredType, TypeInferenceEngine,
};
use crate::analyzers::sampling::SamplingPolicy;
use crate::core::{Record, Value, ValueClass};
use crate::logging::truncate_field;
use crate::sources::MaterializedSource;

/// Values outside `[q1 - k*IQR, q3 + k*IQR]` count as outliers.
pub const OUTLIER_IQR_MULTIPLIER: f64 = 1.5;

/// A date value is timely when within this many days of the reference date.
pub const TIMELINESS_WINDOW_DAYS: i64 = 365;

/// Quality score weights: completeness, consistency, validity, uniqueness.
const QUALITY_WEIGHTS: [f64; 4] = [0.30, 0.25, 0.25, 0.20];

/// Table health weights: completeness, consistency, validity,
/// non-duplication, timeliness.
const HEALTH_WEIGHTS: [f64; 5] = [0.25, 0.20, 0.20, 0.20, 0.15];

/// Severity of a reported data-quality issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Low,
    Medium,
    High,
}

/// A single data-quality finding for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: IssueSeverity,
    pub title: String,
    pub detail: String,
    /// Offending column, when the issue is column-scoped.
    pub column: Option<String>,
}

/// Descriptive statistics for a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub mode: f64,
    pub std_dev: f64,
    pub outlier_count: usize,
    pub outlier_pct: f64,
}

/// Quality metrics for one column, computed over the sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub column: String,
    pub inferred_type: InferredType,
    pub pattern: ColumnPattern,
    /// All percentages live in [0, 100]; ratios over an empty denominator
    /// report 0.
    pub completeness_pct: f64,
    pub uniqueness_pct: f64,
    pub consistency_pct: f64,
    pub validity_pct: f64,
    /// Blank cells (null or whitespace-only) in the sample.
    pub null_count: usize,
    pub unique_count: usize,
    /// Non-blank sample values failing the pattern validator.
    pub invalid_count: usize,
    /// Non-blank sample values whose class disagrees with the inferred type.
    pub inconsistent_count: usize,
    pub numeric: Option<NumericStats>,
}

/// Aggregated profile of one materialized source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub source_id: String,
    pub source_name: String,
    pub row_count: usize,
    pub column_count: usize,
    pub sampled_rows: usize,
    pub sampling_ratio_pct: f64,
    pub columns: Vec<ColumnProfile>,
    pub completeness_pct: f64,
    pub uniqueness_pct: f64,
    pub consistency_pct: f64,
    pub validity_pct: f64,
    pub timeliness_pct: f64,
    /// Rows whose canonical serialization equals another row's, over the
    /// full record set.
    pub duplication_pct: f64,
    pub duplicate_row_count: usize,
    /// Share of columns carrying a recognized semantic pattern.
    pub lineage_pct: f64,
    pub quality_score: f64,
    pub table_health_score: f64,
    pub issues: Vec<Issue>,
}

/// Builder for [`DatasetProfiler`].
pub struct DatasetProfilerBuilder {
    sampling: SamplingPolicy,
    inference: InferenceConfig,
    reference_date: Option<NaiveDate>,
}

impl DatasetProfilerBuilder {
    /// Set the sampling policy.
    pub fn sampling(mut self, policy: SamplingPolicy) -> Self {
        self.sampling = policy;
        self
    }

    /// Set the type inference configuration.
    pub fn inference(mut self, config: InferenceConfig) -> Self {
        self.inference = config;
        self
    }

    /// Set the reference date timeliness is measured against. Without one,
    /// timeliness reports the neutral 100.
    pub fn reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Build the DatasetProfiler.
    pub fn build(self) -> DatasetProfiler {
        DatasetProfiler {
            sampling: self.sampling,
            engine: TypeInferenceEngine::with_config(self.inference),
            reference_date: self.reference_date,
        }
    }
}

/// Profiles materialized sources into quality metrics.
#[derive(Debug, Clone, Default)]
pub struct DatasetProfiler {
    sampling: SamplingPolicy,
    engine: TypeInferenceEngine,
    reference_date: Option<NaiveDate>,
}

impl DatasetProfiler {
    /// Create a new builder for DatasetProfiler.
    pub fn builder() -> DatasetProfilerBuilder {
        DatasetProfilerBuilder {
            sampling: SamplingPolicy::default(),
            inference: InferenceConfig::default(),
            reference_date: None,
        }
    }

    /// Create a profiler with default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Profiles one materialized source.
    #[instrument(skip(self, source), fields(source = %source.id))]
    pub fn profile(&self, source: &MaterializedSource) -> DatasetProfile {
        let sample = self.sampling.sample(&source.records);

        let columns: Vec<ColumnProfile> = source
            .columns
            .iter()
            .map(|column| self.profile_column(column, &sample.rows))
            .collect();

        let avg = |f: fn(&ColumnProfile) -> f64| -> f64 {
            if columns.is_empty() {
                0.0
            } else {
                columns.iter().map(f).sum::<f64>() / columns.len() as f64
            }
        };
        let completeness_pct = avg(|c| c.completeness_pct);
        let uniqueness_pct = avg(|c| c.uniqueness_pct);
        let consistency_pct = avg(|c| c.consistency_pct);
        let validity_pct = avg(|c| c.validity_pct);
        let timeliness_pct = self.timeliness(&columns, &sample.rows);

        let (duplicate_row_count, duplication_pct) = duplication(&source.records);
        let lineage_pct = if columns.is_empty() {
            0.0
        } else {
            columns.iter().filter(|c| c.pattern.is_recognized()).count() as f64
                / columns.len() as f64
                * 100.0
        };

        let quality_score = clamp_pct(
            QUALITY_WEIGHTS[0] * completeness_pct
                + QUALITY_WEIGHTS[1] * consistency_pct
                + QUALITY_WEIGHTS[2] * validity_pct
                + QUALITY_WEIGHTS[3] * uniqueness_pct,
        );
        let table_health_score = clamp_pct(
            HEALTH_WEIGHTS[0] * completeness_pct
                + HEALTH_WEIGHTS[1] * consistency_pct
                + HEALTH_WEIGHTS[2] * validity_pct
                + HEALTH_WEIGHTS[3] * (100.0 - duplication_pct)
                + HEALTH_WEIGHTS[4] * timeliness_pct,
        );

        let issues = collect_issues(source, &columns, duplication_pct);

        debug!(
            source = %source.id,
            rows = source.row_count,
            sampled = sample.sampled_rows,
            quality = quality_score,
            issues = issues.len(),
            "profiled source"
        );

        DatasetProfile {
            source_id: source.id.clone(),
            source_name: source.name.clone(),
            row_count: source.row_count,
            column_count: source.columns.len(),
            sampled_rows: sample.sampled_rows,
            sampling_ratio_pct: sample.sampling_ratio_pct,
            columns,
            completeness_pct,
            uniqueness_pct,
            consistency_pct,
            validity_pct,
            timeliness_pct,
            duplication_pct,
            duplicate_row_count,
            lineage_pct,
            quality_score,
            table_health_score,
            issues,
        }
    }

    fn profile_column(&self, column: &str, rows: &[&Record]) -> ColumnProfile {
        static NULL: Value = Value::Null;
        let values: Vec<&Value> = rows
            .iter()
            .map(|r| r.get(column).unwrap_or(&NULL))
            .collect();

        let non_blank: Vec<&Value> = values.iter().copied().filter(|v| !v.is_blank()).collect();
        let null_count = values.len() - non_blank.len();
        let completeness_pct = ratio_pct(non_blank.len(), values.len());

        let distinct: HashSet<String> =
            non_blank.iter().map(|v| v.canonical_string()).collect();
        let unique_count = distinct.len();
        let uniqueness_pct = ratio_pct(unique_count, non_blank.len());

        let inference = self.engine.infer(column, values.iter().copied());

        let (consistent, inconsistent_count) =
            consistency(&inference.inferred_type, &non_blank);
        let consistency_pct = ratio_pct(consistent, non_blank.len());

        let valid = non_blank
            .iter()
            .filter(|v| inference.pattern.is_valid(v))
            .count();
        let invalid_count = non_blank.len() - valid;
        let validity_pct = ratio_pct(valid, non_blank.len());

        let numeric = if inference.inferred_type == InferredType::Numeric {
            numeric_stats(&non_blank)
        } else {
            None
        };

        if invalid_count > 0 {
            if let Some(example) = non_blank.iter().find(|v| !inference.pattern.is_valid(v)) {
                debug!(
                    column,
                    pattern = ?inference.pattern,
                    example = %truncate_field(&example.canonical_string(), 64),
                    "column has invalid values"
                );
            }
        }

        ColumnProfile {
            column: column.to_string(),
            inferred_type: inference.inferred_type,
            pattern: inference.pattern,
            completeness_pct,
            uniqueness_pct,
            consistency_pct,
            validity_pct,
            null_count,
            unique_count,
            invalid_count,
            inconsistent_count,
            numeric,
        }
    }

    /// Share of date values within the timeliness window of the reference
    /// date. Neutral 100 without a reference date or date values.
    fn timeliness(&self, columns: &[ColumnProfile], rows: &[&Record]) -> f64 {
        let Some(reference) = self.reference_date else {
            return 100.0;
        };
        let date_columns: Vec<&str> = columns
            .iter()
            .filter(|c| c.inferred_type == InferredType::Date)
            .map(|c| c.column.as_str())
            .collect();
        if date_columns.is_empty() {
            return 100.0;
        }
        let mut total = 0usize;
        let mut timely = 0usize;
        for row in rows {
            for column in &date_columns {
                if let Some(date) = row.get(*column).and_then(Value::as_date) {
                    total += 1;
                    let age = (reference - date.date()).num_days().abs();
                    if age <= TIMELINESS_WINDOW_DAYS {
                        timely += 1;
                    }
                }
            }
        }
        if total == 0 {
            100.0
        } else {
            timely as f64 / total as f64 * 100.0
        }
    }
}

fn ratio_pct(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

fn clamp_pct(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Counts non-blank values agreeing with the inferred type.
///
/// A `Text` column accepts anything. A `Mixed` column counts its dominant
/// class as the consistent one, so the score reflects how contested the
/// column is.
fn consistency(inferred: &InferredType, non_blank: &[&Value]) -> (usize, usize) {
    let expected = match inferred {
        InferredType::Numeric => Some(ValueClass::Numeric),
        InferredType::Date => Some(ValueClass::Date),
        InferredType::Boolean => Some(ValueClass::Boolean),
        InferredType::Text => None,
        InferredType::Mixed => None,
    };
    match (inferred, expected) {
        (_, Some(class)) => {
            let matching = non_blank
                .iter()
                .filter(|v| v.classify() == Some(class))
                .count();
            (matching, non_blank.len() - matching)
        }
        (InferredType::Mixed, None) => {
            let mut counts: HashMap<ValueClass, usize> = HashMap::new();
            for value in non_blank {
                if let Some(class) = value.classify() {
                    *counts.entry(class).or_insert(0) += 1;
                }
            }
            let dominant = counts.values().copied().max().unwrap_or(0);
            (dominant, non_blank.len() - dominant)
        }
        _ => (non_blank.len(), 0),
    }
}

fn numeric_stats(non_blank: &[&Value]) -> Option<NumericStats> {
    let mut numbers: Vec<f64> = non_blank.iter().filter_map(|v| v.as_number()).collect();
    if numbers.is_empty() {
        return None;
    }
    numbers.sort_by(f64::total_cmp);
    let n = numbers.len();
    let min = numbers[0];
    let max = numbers[n - 1];
    let mean = numbers.iter().sum::<f64>() / n as f64;
    let median = percentile(&numbers, 0.5);
    let variance = numbers.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
    let std_dev = variance.sqrt();

    // Mode: longest run in the ascending slice; a strict comparison keeps
    // the smallest value on ties.
    let mut mode = numbers[0];
    let mut best_run = 0usize;
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && numbers[j] == numbers[i] {
            j += 1;
        }
        if j - i > best_run {
            best_run = j - i;
            mode = numbers[i];
        }
        i = j;
    }

    let q1 = percentile(&numbers, 0.25);
    let q3 = percentile(&numbers, 0.75);
    let iqr = q3 - q1;
    let low = q1 - OUTLIER_IQR_MULTIPLIER * iqr;
    let high = q3 + OUTLIER_IQR_MULTIPLIER * iqr;
    let outlier_count = numbers.iter().filter(|&&x| x < low || x > high).count();

    Some(NumericStats {
        min,
        max,
        mean,
        median,
        mode,
        std_dev,
        outlier_count,
        outlier_pct: ratio_pct(outlier_count, n),
    })
}

/// Linear-interpolation percentile over an ascending slice.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let position = p * (n - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - position.floor();
    sorted[lower] + fraction * (sorted[upper] - sorted[lower])
}

/// Duplicate rows by canonical serialization: sorted column keys, canonical
/// scalar rendering per cell. The same rule backs the interactive duplicate
/// inspector, so the counts line up.
fn duplication(records: &[Record]) -> (usize, f64) {
    if records.is_empty() {
        return (0, 0.0);
    }
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    for record in records {
        seen.insert(canonical_row(record));
    }
    let duplicates = records.len() - seen.len();
    (duplicates, ratio_pct(duplicates, records.len()))
}

/// Canonical serialization of one row. `Record` is a sorted map, so key
/// order is already canonical; cells render through `canonical_string`.
pub fn canonical_row(record: &Record) -> String {
    let normalized: BTreeMap<&str, String> = record
        .iter()
        .map(|(k, v)| (k.as_str(), v.canonical_string()))
        .collect();
    serde_json::to_string(&normalized).unwrap_or_default()
}

fn collect_issues(
    source: &MaterializedSource,
    columns: &[ColumnProfile],
    duplication_pct: f64,
) -> Vec<Issue> {
    let mut issues = Vec::new();

    if source.row_count == 0 {
        issues.push(Issue {
            severity: IssueSeverity::Low,
            title: "Dataset is empty".into(),
            detail: format!("'{}' has no records to profile", source.name),
            column: None,
        });
    }

    for profile in columns {
        if source.row_count == 0 {
            break;
        }
        if profile.completeness_pct < 70.0 {
            issues.push(Issue {
                severity: IssueSeverity::High,
                title: format!("Severe missing data in '{}'", profile.column),
                detail: format!(
                    "only {:.1}% of values are populated",
                    profile.completeness_pct
                ),
                column: Some(profile.column.clone()),
            });
        } else if profile.completeness_pct < 95.0 {
            issues.push(Issue {
                severity: IssueSeverity::Medium,
                title: format!("Missing values in '{}'", profile.column),
                detail: format!(
                    "{:.1}% of values are populated",
                    profile.completeness_pct
                ),
                column: Some(profile.column.clone()),
            });
        }
        if profile.pattern.is_recognized() && profile.validity_pct < 80.0 {
            issues.push(Issue {
                severity: IssueSeverity::High,
                title: format!("Invalid values in '{}'", profile.column),
                detail: format!(
                    "{} values fail the {:?} format",
                    profile.invalid_count, profile.pattern
                ),
                column: Some(profile.column.clone()),
            });
        }
        if profile.consistency_pct < 90.0 && profile.inconsistent_count > 0 {
            issues.push(Issue {
                severity: IssueSeverity::Medium,
                title: format!("Inconsistent types in '{}'", profile.column),
                detail: format!(
                    "{} values disagree with the inferred {:?} type",
                    profile.inconsistent_count, profile.inferred_type
                ),
                column: Some(profile.column.clone()),
            });
        }
    }

    if duplication_pct > 20.0 {
        issues.push(Issue {
            severity: IssueSeverity::High,
            title: "Heavy row duplication".into(),
            detail: format!("{duplication_pct:.1}% of rows duplicate another row"),
            column: None,
        });
    } else if duplication_pct > 5.0 {
        issues.push(Issue {
            severity: IssueSeverity::Medium,
            title: "Row duplication".into(),
            detail: format!("{duplication_pct:.1}% of rows duplicate another row"),
            column: None,
        });
    }

    issues
}
