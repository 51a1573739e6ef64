//! Grouping hierarchies over sampled records.
//!
//! `build_hierarchy` groups a record set by an ordered list of columns into
//! a nested count tree for the drill-down view. Groups appear in
//! first-appearance order, blank values gather under a sentinel label, and
//! every node counts the records that reach its path.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::core::{Record, Value};

/// Label under which blank values group.
pub const BLANK_LABEL: &str = "(blank)";

/// One node of a grouping tree. Leaves carry the terminal count for their
/// path; inner nodes count all records passing through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    /// `/`-joined label path from the root, stable across rebuilds.
    pub id: String,
    pub label: String,
    pub count: usize,
    pub children: Vec<HierarchyNode>,
}

/// Groups `records` by `columns[0]`, then within each group by
/// `columns[1]`, and so on. An empty column list yields an empty forest.
#[instrument(skip(records), fields(rows = records.len()))]
pub fn build_hierarchy(records: &[Record], columns: &[String]) -> Vec<HierarchyNode> {
    let rows: Vec<&Record> = records.iter().collect();
    group(&rows, columns, "")
}

fn group(rows: &[&Record], columns: &[String], parent_path: &str) -> Vec<HierarchyNode> {
    let Some((column, rest)) = columns.split_first() else {
        return Vec::new();
    };

    // Buckets in first-appearance order.
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<&Record>> = HashMap::new();
    for record in rows {
        let label = match record.get(column) {
            Some(value) if !value.is_blank() => value.canonical_string(),
            _ => BLANK_LABEL.to_string(),
        };
        if !buckets.contains_key(&label) {
            order.push(label.clone());
        }
        buckets.entry(label).or_default().push(record);
    }

    order
        .into_iter()
        .map(|label| {
            let members = buckets.remove(&label).unwrap_or_default();
            let id = if parent_path.is_empty() {
                label.clone()
            } else {
                format!("{parent_path}/{label}")
            };
            let children = group(&members, rest, &id);
            HierarchyNode {
                count: members.len(),
                id,
                label,
                children,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn sample() -> Vec<Record> {
        vec![
            record(&[("region", text("eu")), ("tier", text("gold"))]),
            record(&[("region", text("eu")), ("tier", text("silver"))]),
            record(&[("region", text("us")), ("tier", text("gold"))]),
            record(&[("region", text("eu")), ("tier", text("gold"))]),
            record(&[("region", Value::Null), ("tier", text("gold"))]),
        ]
    }

    #[test]
    fn single_level_counts() {
        let tree = build_hierarchy(&sample(), &columns(&["region"]));
        assert_eq!(tree.len(), 3);
        assert_eq!(tree[0].label, "eu");
        assert_eq!(tree[0].count, 3);
        assert_eq!(tree[1].label, "us");
        assert_eq!(tree[1].count, 1);
        assert_eq!(tree[2].label, BLANK_LABEL);
        assert_eq!(tree[2].count, 1);
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn nested_counts_conserve_totals() {
        let tree = build_hierarchy(&sample(), &columns(&["region", "tier"]));
        let eu = &tree[0];
        assert_eq!(eu.count, 3);
        let leaf_sum: usize = eu.children.iter().map(|c| c.count).sum();
        assert_eq!(leaf_sum, eu.count);
        assert_eq!(eu.children[0].label, "gold");
        assert_eq!(eu.children[0].count, 2);
        assert_eq!(eu.children[0].id, "eu/gold");
    }

    #[test]
    fn empty_columns_yield_empty_forest() {
        assert!(build_hierarchy(&sample(), &[]).is_empty());
    }

    #[test]
    fn empty_records_yield_empty_forest() {
        assert!(build_hierarchy(&[], &columns(&["region"])).is_empty());
    }

    #[test]
    fn missing_column_groups_everything_blank() {
        let tree = build_hierarchy(&sample(), &columns(&["nope"]));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].label, BLANK_LABEL);
        assert_eq!(tree[0].count, 5);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let records = sample();
        let cols = columns(&["region", "tier"]);
        assert_eq!(
            build_hierarchy(&records, &cols),
            build_hierarchy(&records, &cols)
        );
    }
}
