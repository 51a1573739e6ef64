//! Candidate key detection.
//!
//! A column qualifies as a candidate key when its sampled uniqueness
//! reaches the configured threshold and it is not degenerate (all-blank or
//! constant). Single columns are preferred; when none qualifies, the
//! most-distinct columns are paired and the first qualifying pair wins, so
//! the reported set is always the smallest that identifies rows.

use serde::{Deserialize, Serialize};

use crate::core::{Dataset, Record, Value};
use crate::discovery::{distinct_values, non_blank_count, DiscoveryConfig};

/// Separator between pair components; never occurs in canonical values.
const PAIR_SEPARATOR: char = '\u{1f}';

/// The key column set detected for one dataset; empty when none qualifies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateKey {
    pub dataset_id: String,
    pub columns: Vec<String>,
    /// Sampled uniqueness of the reported set, in percent. 0 when empty.
    pub uniqueness_pct: f64,
}

pub(crate) fn candidate_key_for(dataset: &Dataset, config: &DiscoveryConfig) -> CandidateKey {
    let sample = config.sampling.sample(&dataset.records);
    let rows = &sample.rows;

    // Single columns first: the smallest possible key.
    let mut singles: Vec<(usize, f64)> = Vec::new();
    for (index, column) in dataset.columns.iter().enumerate() {
        let non_blank = non_blank_count(rows, column);
        if non_blank == 0 {
            continue;
        }
        let distinct = distinct_values(rows, column).len();
        if distinct <= 1 {
            continue;
        }
        let uniqueness = distinct as f64 / non_blank as f64 * 100.0;
        if uniqueness >= config.key_uniqueness_pct {
            singles.push((index, uniqueness));
        }
    }
    if let Some(&(index, uniqueness)) = singles.iter().max_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            // ties resolve to the earliest declared column
            .then(b.0.cmp(&a.0))
    }) {
        return CandidateKey {
            dataset_id: dataset.id.clone(),
            columns: vec![dataset.columns[index].clone()],
            uniqueness_pct: uniqueness,
        };
    }

    // Pair search over the most-distinct columns, in declaration order for
    // determinism.
    let mut ranked: Vec<(usize, usize)> = dataset
        .columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            (index, distinct_values(rows, column).len())
        })
        .filter(|&(_, distinct)| distinct > 1)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(config.max_pair_columns);
    ranked.sort_by_key(|&(index, _)| index);

    for (i, &(first, _)) in ranked.iter().enumerate() {
        for &(second, _) in &ranked[i + 1..] {
            if let Some(uniqueness) = pair_uniqueness(
                rows,
                &dataset.columns[first],
                &dataset.columns[second],
            ) {
                if uniqueness >= config.key_uniqueness_pct {
                    return CandidateKey {
                        dataset_id: dataset.id.clone(),
                        columns: vec![
                            dataset.columns[first].clone(),
                            dataset.columns[second].clone(),
                        ],
                        uniqueness_pct: uniqueness,
                    };
                }
            }
        }
    }

    CandidateKey {
        dataset_id: dataset.id.clone(),
        columns: Vec::new(),
        uniqueness_pct: 0.0,
    }
}

/// Uniqueness of the combined pair value over rows where either side is
/// non-blank. `None` when no such row exists.
fn pair_uniqueness(rows: &[&Record], first: &str, second: &str) -> Option<f64> {
    let mut considered = 0usize;
    let mut distinct = std::collections::BTreeSet::new();
    for record in rows {
        let a = record.get(first).cloned().unwrap_or(Value::Null);
        let b = record.get(second).cloned().unwrap_or(Value::Null);
        if a.is_blank() && b.is_blank() {
            continue;
        }
        considered += 1;
        distinct.insert(format!(
            "{}{}{}",
            a.canonical_string(),
            PAIR_SEPARATOR,
            b.canonical_string()
        ));
    }
    if considered == 0 || distinct.len() <= 1 {
        None
    } else {
        Some(distinct.len() as f64 / considered as f64 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::RelationshipDiscovery;
    use crate::core::Workspace;

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn unique_column_is_the_key() {
        let dataset = Dataset::new(
            "d",
            "d",
            vec!["id".into(), "status".into()],
            (0..50)
                .map(|i| {
                    record(&[
                        ("id", num(i as f64)),
                        ("status", text(if i % 2 == 0 { "open" } else { "closed" })),
                    ])
                })
                .collect(),
        );
        let ws = Workspace::new(vec![dataset], vec![]);
        let keys = RelationshipDiscovery::new().candidate_keys(&ws);
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].columns, vec!["id".to_string()]);
        assert_eq!(keys[0].uniqueness_pct, 100.0);
    }

    #[test]
    fn degenerate_columns_never_qualify() {
        let dataset = Dataset::new(
            "d",
            "d",
            vec!["all_null".into(), "constant".into()],
            (0..20)
                .map(|_| {
                    record(&[("all_null", Value::Null), ("constant", text("same"))])
                })
                .collect(),
        );
        let ws = Workspace::new(vec![dataset], vec![]);
        let keys = RelationshipDiscovery::new().candidate_keys(&ws);
        assert!(keys[0].columns.is_empty());
        assert_eq!(keys[0].uniqueness_pct, 0.0);
    }

    #[test]
    fn pair_found_when_no_single_qualifies() {
        // region repeats, seq repeats, but (region, seq) is unique
        let mut records = Vec::new();
        for region in ["north", "south", "east", "west"] {
            for seq in 0..5 {
                records.push(record(&[
                    ("region", text(region)),
                    ("seq", num(seq as f64)),
                ]));
            }
        }
        let dataset = Dataset::new(
            "d",
            "d",
            vec!["region".into(), "seq".into()],
            records,
        );
        let ws = Workspace::new(vec![dataset], vec![]);
        let keys = RelationshipDiscovery::new().candidate_keys(&ws);
        assert_eq!(
            keys[0].columns,
            vec!["region".to_string(), "seq".to_string()]
        );
        assert_eq!(keys[0].uniqueness_pct, 100.0);
    }

    #[test]
    fn near_unique_column_respects_threshold() {
        // 99 distinct out of 100 -> 99% >= 98% threshold
        let mut records: Vec<Record> =
            (0..99).map(|i| record(&[("code", num(i as f64))])).collect();
        records.push(record(&[("code", num(0.0))]));
        let dataset = Dataset::new("d", "d", vec!["code".into()], records);
        let ws = Workspace::new(vec![dataset], vec![]);
        let keys = RelationshipDiscovery::new().candidate_keys(&ws);
        assert_eq!(keys[0].columns, vec!["code".to_string()]);

        let strict = RelationshipDiscovery::builder()
            .key_uniqueness_pct(100.0)
            .build();
        assert!(strict.candidate_keys(&ws)[0].columns.is_empty());
    }
}
