//! Property tests for the invariants that hold over arbitrary record sets:
//! metric bounds, duplication conservation, hierarchy count conservation,
//! and sampling determinism.

use std::collections::HashSet;

use proptest::prelude::*;

use weft_core::analyzers::{canonical_row, DatasetProfiler, SamplingPolicy};
use weft_core::core::{Dataset, Record, Value, Workspace};
use weft_core::discovery::RelationshipDiscovery;
use weft_core::hierarchy::{build_hierarchy, HierarchyNode};
use weft_core::sources::MaterializedSource;

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        (-50i64..50).prop_map(|n| Value::Number(n as f64)),
        "[a-d]{0,3}".prop_map(Value::Text),
        any::<bool>().prop_map(Value::Bool),
    ]
}

fn records_strategy(max_rows: usize) -> impl Strategy<Value = Vec<Record>> {
    proptest::collection::vec(
        (value_strategy(), value_strategy()).prop_map(|(a, b)| {
            [("a".to_string(), a), ("b".to_string(), b)]
                .into_iter()
                .collect::<Record>()
        }),
        0..max_rows,
    )
}

fn source_from(records: Vec<Record>) -> MaterializedSource {
    MaterializedSource::from_dataset(&Dataset::new(
        "d",
        "d",
        vec!["a".into(), "b".into()],
        records,
    ))
}

proptest! {
    #[test]
    fn percentages_stay_bounded(records in records_strategy(60)) {
        let profile = DatasetProfiler::new().profile(&source_from(records));
        for column in &profile.columns {
            for pct in [
                column.completeness_pct,
                column.uniqueness_pct,
                column.consistency_pct,
                column.validity_pct,
            ] {
                prop_assert!((0.0..=100.0).contains(&pct));
            }
        }
        for pct in [
            profile.completeness_pct,
            profile.uniqueness_pct,
            profile.consistency_pct,
            profile.validity_pct,
            profile.timeliness_pct,
            profile.duplication_pct,
            profile.lineage_pct,
            profile.quality_score,
            profile.table_health_score,
        ] {
            prop_assert!((0.0..=100.0).contains(&pct));
        }
    }

    #[test]
    fn duplication_conservation(records in records_strategy(60)) {
        let source = source_from(records);
        let profile = DatasetProfiler::new().profile(&source);

        let distinct: HashSet<String> =
            source.records.iter().map(canonical_row).collect();
        prop_assert_eq!(
            profile.duplicate_row_count,
            source.row_count - distinct.len()
        );

        // every flagged duplicate has at least one twin
        if profile.duplicate_row_count > 0 {
            let mut counts = std::collections::HashMap::new();
            for record in &source.records {
                *counts.entry(canonical_row(record)).or_insert(0usize) += 1;
            }
            prop_assert!(counts.values().any(|&c| c > 1));
        }
    }

    #[test]
    fn profiling_is_deterministic(records in records_strategy(40)) {
        let source = source_from(records);
        let profiler = DatasetProfiler::new();
        prop_assert_eq!(profiler.profile(&source), profiler.profile(&source));
    }

    #[test]
    fn hierarchy_conserves_counts(records in records_strategy(60)) {
        let columns = vec!["a".to_string(), "b".to_string()];
        let tree = build_hierarchy(&records, &columns);

        let top_total: usize = tree.iter().map(|n| n.count).sum();
        prop_assert_eq!(top_total, records.len());

        fn check(node: &HierarchyNode) -> bool {
            node.children.is_empty()
                || (node.children.iter().map(|c| c.count).sum::<usize>() == node.count
                    && node.children.iter().all(check))
        }
        for node in &tree {
            prop_assert!(check(node));
        }
    }

    #[test]
    fn sampling_never_exceeds_input(rows in 0usize..5_000) {
        let records: Vec<Record> = (0..rows)
            .map(|i| {
                [("a".to_string(), Value::Number(i as f64))]
                    .into_iter()
                    .collect()
            })
            .collect();
        let sample = SamplingPolicy::default().sample(&records);
        prop_assert!(sample.sampled_rows <= records.len());
        prop_assert!(sample.sampling_ratio_pct <= 100.0);
        if !records.is_empty() {
            prop_assert!(sample.sampled_rows > 0);
        }
    }

    #[test]
    fn fk_inference_is_order_independent(shift in 0usize..10) {
        // the same two datasets, with the source records rotated: distinct
        // value sets are unchanged, so inference must be too
        let customers = Dataset::new(
            "customers",
            "customers",
            vec!["id".into()],
            (1..=10)
                .map(|i| {
                    [("id".to_string(), Value::Number(i as f64))]
                        .into_iter()
                        .collect::<Record>()
                })
                .collect(),
        );
        let mut order_rows: Vec<Record> = (1..=10)
            .map(|i| {
                [("customer_id".to_string(), Value::Number(i as f64))]
                    .into_iter()
                    .collect::<Record>()
            })
            .collect();
        let order_rows_len = order_rows.len();
        order_rows.rotate_left(shift % order_rows_len);
        let orders = Dataset::new("orders", "orders", vec!["customer_id".into()], order_rows);

        let rotated = RelationshipDiscovery::new()
            .inferred_foreign_keys(&Workspace::new(vec![customers.clone(), orders], vec![]));

        let baseline_orders = Dataset::new(
            "orders",
            "orders",
            vec!["customer_id".into()],
            (1..=10)
                .map(|i| {
                    [("customer_id".to_string(), Value::Number(i as f64))]
                        .into_iter()
                        .collect::<Record>()
                })
                .collect(),
        );
        let baseline = RelationshipDiscovery::new()
            .inferred_foreign_keys(&Workspace::new(vec![customers, baseline_orders], vec![]));

        prop_assert_eq!(rotated, baseline);
    }
}
