//! Workspace-level KPI aggregation.
//!
//! Rolls every dataset's profile into the numbers the dashboard renders:
//! averages of the quality composites, raw totals, the data-to-errors
//! ratio, and the derived business metrics (cost of quality, time to
//! value, estimated storage). All aggregates tolerate an empty workspace
//! and report zeroed/neutral values instead of dividing by zero.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::analyzers::profiler::{DatasetProfile, DatasetProfiler, IssueSeverity};
use crate::core::Workspace;
use crate::sources::MaterializedSource;

/// Estimated remediation cost per known bad cell, in dollars. Fixed
/// constant so the metric is stable across runs.
pub const ERROR_REMEDIATION_COST_USD: f64 = 0.25;

/// Rough per-cell storage footprint used by the storage estimate.
pub const CELL_STORAGE_BYTES: f64 = 24.0;

/// Baseline days-to-value for a perfectly clean workspace.
pub const TIME_TO_VALUE_BASE_DAYS: f64 = 1.0;

/// Additional days-to-value per ten points of missing quality.
pub const TIME_TO_VALUE_PENALTY_DAYS: f64 = 1.0;

/// Workspace-wide KPIs derived from all dataset profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceKpis {
    pub dataset_count: usize,
    pub view_count: usize,
    pub total_rows: usize,
    pub total_columns: usize,
    pub total_cell_count: usize,
    /// Rows actually examined across all profiling passes.
    pub sampled_rows: usize,
    pub avg_quality_score: f64,
    pub avg_table_health: f64,
    pub avg_completeness_pct: f64,
    pub avg_consistency_pct: f64,
    pub avg_validity_pct: f64,
    pub avg_uniqueness_pct: f64,
    pub avg_duplication_pct: f64,
    /// Sampled cells failing validity or consistency, summed over columns.
    pub known_error_count: usize,
    pub high_severity_issues: usize,
    pub total_issues: usize,
    /// `total_cell_count / max(1, known_error_count)`.
    pub data_to_errors_ratio: f64,
    pub cost_of_quality_usd: f64,
    pub time_to_value_days: f64,
    pub estimated_storage_mb: f64,
}

impl WorkspaceKpis {
    fn zeroed(view_count: usize) -> Self {
        Self {
            dataset_count: 0,
            view_count,
            total_rows: 0,
            total_columns: 0,
            total_cell_count: 0,
            sampled_rows: 0,
            avg_quality_score: 0.0,
            avg_table_health: 0.0,
            avg_completeness_pct: 0.0,
            avg_consistency_pct: 0.0,
            avg_validity_pct: 0.0,
            avg_uniqueness_pct: 0.0,
            avg_duplication_pct: 0.0,
            known_error_count: 0,
            high_severity_issues: 0,
            total_issues: 0,
            data_to_errors_ratio: 0.0,
            cost_of_quality_usd: 0.0,
            time_to_value_days: 0.0,
            estimated_storage_mb: 0.0,
        }
    }
}

/// Aggregates workspace KPIs with a default profiler.
pub fn aggregate(workspace: &Workspace) -> WorkspaceKpis {
    aggregate_with(workspace, &DatasetProfiler::new())
}

/// Aggregates workspace KPIs, profiling every dataset with `profiler`.
#[instrument(skip(workspace, profiler))]
pub fn aggregate_with(workspace: &Workspace, profiler: &DatasetProfiler) -> WorkspaceKpis {
    let profiles: Vec<DatasetProfile> = workspace
        .datasets
        .iter()
        .map(|dataset| profiler.profile(&MaterializedSource::from_dataset(dataset)))
        .collect();

    let kpis = combine(&profiles, workspace.views.len());
    info!(
        datasets = kpis.dataset_count,
        rows = kpis.total_rows,
        quality = kpis.avg_quality_score,
        errors = kpis.known_error_count,
        "aggregated workspace KPIs"
    );
    kpis
}

/// Combines already-computed profiles into workspace KPIs. Exposed so
/// callers holding fresh profiles (e.g. an open dashboard) can aggregate
/// without re-profiling.
pub fn combine(profiles: &[DatasetProfile], view_count: usize) -> WorkspaceKpis {
    if profiles.is_empty() {
        return WorkspaceKpis::zeroed(view_count);
    }
    let n = profiles.len() as f64;
    let avg = |f: fn(&DatasetProfile) -> f64| profiles.iter().map(f).sum::<f64>() / n;

    let total_rows: usize = profiles.iter().map(|p| p.row_count).sum();
    let total_columns: usize = profiles.iter().map(|p| p.column_count).sum();
    let total_cell_count: usize = profiles
        .iter()
        .map(|p| p.row_count * p.column_count)
        .sum();
    let sampled_rows: usize = profiles.iter().map(|p| p.sampled_rows).sum();

    let known_error_count: usize = profiles
        .iter()
        .flat_map(|p| p.columns.iter())
        .map(|c| c.invalid_count + c.inconsistent_count)
        .sum();
    let duplicate_rows: usize = profiles.iter().map(|p| p.duplicate_row_count).sum();
    let total_issues: usize = profiles.iter().map(|p| p.issues.len()).sum();
    let high_severity_issues: usize = profiles
        .iter()
        .flat_map(|p| p.issues.iter())
        .filter(|i| i.severity == IssueSeverity::High)
        .count();

    let avg_quality_score = avg(|p| p.quality_score);

    WorkspaceKpis {
        dataset_count: profiles.len(),
        view_count,
        total_rows,
        total_columns,
        total_cell_count,
        sampled_rows,
        avg_quality_score,
        avg_table_health: avg(|p| p.table_health_score),
        avg_completeness_pct: avg(|p| p.completeness_pct),
        avg_consistency_pct: avg(|p| p.consistency_pct),
        avg_validity_pct: avg(|p| p.validity_pct),
        avg_uniqueness_pct: avg(|p| p.uniqueness_pct),
        avg_duplication_pct: avg(|p| p.duplication_pct),
        known_error_count,
        high_severity_issues,
        total_issues,
        data_to_errors_ratio: total_cell_count as f64 / known_error_count.max(1) as f64,
        cost_of_quality_usd: (known_error_count + duplicate_rows) as f64
            * ERROR_REMEDIATION_COST_USD,
        time_to_value_days: TIME_TO_VALUE_BASE_DAYS
            + (100.0 - avg_quality_score) / 10.0 * TIME_TO_VALUE_PENALTY_DAYS,
        estimated_storage_mb: total_cell_count as f64 * CELL_STORAGE_BYTES / (1024.0 * 1024.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Dataset, Record, Value};

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn workspace() -> Workspace {
        let clean = Dataset::new(
            "clean",
            "clean",
            vec!["id".into(), "email".into()],
            vec![
                record(&[
                    ("id", Value::Number(1.0)),
                    ("email", Value::Text("a@b.io".into())),
                ]),
                record(&[
                    ("id", Value::Number(2.0)),
                    ("email", Value::Text("c@d.io".into())),
                ]),
            ],
        );
        let dirty = Dataset::new(
            "dirty",
            "dirty",
            vec!["email".into()],
            vec![
                record(&[("email", Value::Text("nope".into()))]),
                record(&[("email", Value::Null)]),
            ],
        );
        Workspace::new(vec![clean, dirty], vec![])
    }

    #[test]
    fn empty_workspace_is_all_zero() {
        let kpis = aggregate(&Workspace::default());
        assert_eq!(kpis.dataset_count, 0);
        assert_eq!(kpis.total_rows, 0);
        assert_eq!(kpis.data_to_errors_ratio, 0.0);
        assert_eq!(kpis.avg_quality_score, 0.0);
        assert!(kpis.estimated_storage_mb == 0.0);
    }

    #[test]
    fn totals_and_averages() {
        let kpis = aggregate(&workspace());
        assert_eq!(kpis.dataset_count, 2);
        assert_eq!(kpis.total_rows, 4);
        assert_eq!(kpis.total_columns, 3);
        assert_eq!(kpis.total_cell_count, 2 * 2 + 2);
        assert!(kpis.avg_quality_score > 0.0 && kpis.avg_quality_score <= 100.0);
        // the dirty dataset has one invalid email
        assert!(kpis.known_error_count >= 1);
        assert!(kpis.high_severity_issues >= 1);
    }

    #[test]
    fn ratio_never_divides_by_zero() {
        let clean_only = Workspace::new(
            vec![Dataset::new(
                "c",
                "c",
                vec!["v".into()],
                vec![record(&[("v", Value::Number(1.0))])],
            )],
            vec![],
        );
        let kpis = aggregate(&clean_only);
        assert_eq!(kpis.known_error_count, 0);
        assert_eq!(kpis.data_to_errors_ratio, 1.0);
    }

    #[test]
    fn derived_metrics_track_quality() {
        let kpis = aggregate(&workspace());
        assert!(kpis.cost_of_quality_usd >= 0.0);
        assert!(kpis.time_to_value_days >= TIME_TO_VALUE_BASE_DAYS);
        assert!(kpis.estimated_storage_mb > 0.0);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let ws = workspace();
        assert_eq!(aggregate(&ws), aggregate(&ws));
    }
}
