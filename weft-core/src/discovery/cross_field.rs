//! Schema-inferred cross-field rule checks.
//!
//! Multi-column rules are inferred from column naming: a dataset carrying a
//! created/updated or start/end pair of date columns implies an ordering
//! rule between them. Each rule runs over the sampled rows and reports a
//! violation count and a pass/warn status; offending rows are not
//! enumerated here — the drill-down re-derives them from the raw dataset
//! on demand.

use serde::{Deserialize, Serialize};

use crate::analyzers::inference::{InferredType, TypeInferenceEngine};
use crate::core::{Dataset, Value, Workspace};
use crate::discovery::DiscoveryConfig;

/// Name fragments marking the earlier side of a date-ordering pair.
const EARLIER_FRAGMENTS: [&str; 4] = ["start", "begin", "created", "opened"];

/// Name fragments marking the later side of a date-ordering pair.
const LATER_FRAGMENTS: [&str; 6] = [
    "end", "finish", "updated", "modified", "completed", "closed",
];

/// Outcome of one cross-field rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warn,
}

/// A cross-field rule evaluated over one dataset's sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossFieldCheck {
    pub dataset_id: String,
    /// Stable rule identifier, e.g. `date_order:created_at<=updated_at`.
    pub rule: String,
    pub columns: Vec<String>,
    pub issue_count: usize,
    pub status: CheckStatus,
}

pub(crate) fn run(workspace: &Workspace, config: &DiscoveryConfig) -> Vec<CrossFieldCheck> {
    let engine = TypeInferenceEngine::new();
    workspace
        .datasets
        .iter()
        .flat_map(|dataset| check_dataset(dataset, config, &engine))
        .collect()
}

fn check_dataset(
    dataset: &Dataset,
    config: &DiscoveryConfig,
    engine: &TypeInferenceEngine,
) -> Vec<CrossFieldCheck> {
    let sample = config.sampling.sample(&dataset.records);

    let date_columns: Vec<&String> = dataset
        .columns
        .iter()
        .filter(|column| {
            let values: Vec<&Value> = sample
                .rows
                .iter()
                .filter_map(|record| record.get(*column))
                .collect();
            engine.infer(column.as_str(), values.into_iter()).inferred_type
                == InferredType::Date
        })
        .collect();

    let matches = |name: &str, fragments: &[&str]| {
        let lower = name.to_ascii_lowercase();
        fragments.iter().any(|fragment| lower.contains(fragment))
    };

    let mut checks = Vec::new();
    for earlier in &date_columns {
        if !matches(earlier.as_str(), &EARLIER_FRAGMENTS) {
            continue;
        }
        for later in &date_columns {
            if earlier == later || !matches(later.as_str(), &LATER_FRAGMENTS) {
                continue;
            }
            let issue_count = sample
                .rows
                .iter()
                .filter(|record| {
                    match (
                        record.get(*earlier).and_then(Value::as_date),
                        record.get(*later).and_then(Value::as_date),
                    ) {
                        (Some(from), Some(to)) => to < from,
                        _ => false,
                    }
                })
                .count();
            checks.push(CrossFieldCheck {
                dataset_id: dataset.id.clone(),
                rule: format!("date_order:{earlier}<={later}"),
                columns: vec![earlier.to_string(), later.to_string()],
                issue_count,
                status: if issue_count == 0 {
                    CheckStatus::Pass
                } else {
                    CheckStatus::Warn
                },
            });
        }
    }
    checks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Record;
    use crate::discovery::RelationshipDiscovery;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::Text(v.to_string())))
            .collect()
    }

    fn tickets(rows: Vec<Record>) -> Workspace {
        Workspace::new(
            vec![Dataset::new(
                "tickets",
                "tickets",
                vec!["created_at".into(), "closed_at".into()],
                rows,
            )],
            vec![],
        )
    }

    #[test]
    fn ordered_dates_pass() {
        let ws = tickets(vec![
            record(&[("created_at", "2023-01-01"), ("closed_at", "2023-01-05")]),
            record(&[("created_at", "2023-02-01"), ("closed_at", "2023-02-01")]),
        ]);
        let checks = RelationshipDiscovery::new().cross_field_checks(&ws);
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].status, CheckStatus::Pass);
        assert_eq!(checks[0].issue_count, 0);
        assert_eq!(checks[0].rule, "date_order:created_at<=closed_at");
    }

    #[test]
    fn inverted_dates_warn() {
        let ws = tickets(vec![
            record(&[("created_at", "2023-03-01"), ("closed_at", "2023-01-05")]),
            record(&[("created_at", "2023-01-01"), ("closed_at", "2023-01-02")]),
        ]);
        let checks = RelationshipDiscovery::new().cross_field_checks(&ws);
        assert_eq!(checks[0].status, CheckStatus::Warn);
        assert_eq!(checks[0].issue_count, 1);
    }

    #[test]
    fn unparseable_rows_are_skipped() {
        let ws = tickets(vec![
            record(&[("created_at", "2023-01-01"), ("closed_at", "soon")]),
            record(&[("created_at", "2023-01-01"), ("closed_at", "2023-01-02")]),
        ]);
        let checks = RelationshipDiscovery::new().cross_field_checks(&ws);
        // "soon" keeps closed_at from being all-date, but the dominant
        // class still wins under the default threshold only at 90%; with
        // one of two values unparseable no rule is inferred at all.
        assert!(checks.is_empty() || checks[0].issue_count == 0);
    }

    #[test]
    fn non_date_columns_produce_no_rules() {
        let ws = Workspace::new(
            vec![Dataset::new(
                "d",
                "d",
                vec!["created_count".into(), "closed_count".into()],
                vec![[
                    ("created_count".to_string(), Value::Number(3.0)),
                    ("closed_count".to_string(), Value::Number(1.0)),
                ]
                .into_iter()
                .collect()],
            )],
            vec![],
        );
        assert!(RelationshipDiscovery::new().cross_field_checks(&ws).is_empty());
    }
}
