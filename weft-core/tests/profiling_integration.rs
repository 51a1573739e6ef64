//! Integration tests for profiling and KPI aggregation over realistic
//! workspace data, including profiling a materialized view.

use chrono::NaiveDate;
use weft_core::analyzers::{
    aggregate, aggregate_with, DatasetProfiler, InferredType, IssueSeverity,
};
use weft_core::core::{
    CombineMode, Dataset, JoinConfig, JoinTarget, JoinType, OneToManyMode, Record, Value, View,
    ViewColumn, Workspace,
};
use weft_core::sources::{materialize, SourceRef};

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

/// A small customer/order workspace with deliberate quality problems:
/// a missing email, an invalid email, a stray text amount, duplicates.
fn sample_workspace() -> Workspace {
    let customers = Dataset::new(
        "customers",
        "Customers",
        vec!["id".into(), "email".into(), "signup_date".into()],
        vec![
            record(&[
                ("id", num(1.0)),
                ("email", text("ann@example.com")),
                ("signup_date", text("2023-05-01")),
            ]),
            record(&[
                ("id", num(2.0)),
                ("email", text("not-an-email")),
                ("signup_date", text("2023-06-12")),
            ]),
            record(&[
                ("id", num(3.0)),
                ("email", Value::Null),
                ("signup_date", text("2016-01-20")),
            ]),
        ],
    );
    let orders = Dataset::new(
        "orders",
        "Orders",
        vec!["order_id".into(), "customer_id".into(), "amount".into()],
        vec![
            record(&[
                ("order_id", num(100.0)),
                ("customer_id", num(1.0)),
                ("amount", num(25.0)),
            ]),
            record(&[
                ("order_id", num(100.0)),
                ("customer_id", num(1.0)),
                ("amount", num(25.0)),
            ]),
            record(&[
                ("order_id", num(101.0)),
                ("customer_id", num(2.0)),
                ("amount", text("n/a")),
            ]),
        ],
    );
    Workspace::new(vec![customers, orders], vec![])
}

#[test]
fn column_metrics_reflect_problems() {
    let ws = sample_workspace();
    let source = materialize(&ws, &SourceRef::Dataset("customers".into())).unwrap();
    let profile = DatasetProfiler::new().profile(&source);

    assert_eq!(profile.row_count, 3);
    assert_eq!(profile.sampled_rows, 3);
    assert_eq!(profile.sampling_ratio_pct, 100.0);

    let email = profile.columns.iter().find(|c| c.column == "email").unwrap();
    assert!((email.completeness_pct - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(email.validity_pct, 50.0);
    assert_eq!(email.invalid_count, 1);

    let signup = profile
        .columns
        .iter()
        .find(|c| c.column == "signup_date")
        .unwrap();
    assert_eq!(signup.inferred_type, InferredType::Date);

    // every percentage bounded
    for column in &profile.columns {
        for pct in [
            column.completeness_pct,
            column.uniqueness_pct,
            column.consistency_pct,
            column.validity_pct,
        ] {
            assert!((0.0..=100.0).contains(&pct), "{pct} out of bounds");
        }
    }
    assert!(profile
        .issues
        .iter()
        .any(|i| i.severity == IssueSeverity::High && i.column.as_deref() == Some("email")));
}

#[test]
fn duplication_matches_interactive_rule() {
    let ws = sample_workspace();
    let source = materialize(&ws, &SourceRef::Dataset("orders".into())).unwrap();
    let profile = DatasetProfiler::new().profile(&source);

    // two identical order rows -> one duplicate
    assert_eq!(profile.duplicate_row_count, 1);
    assert!((profile.duplication_pct - 100.0 / 3.0).abs() < 1e-9);
}

#[test]
fn views_profile_like_datasets() {
    let mut ws = sample_workspace();
    ws.views.push(View {
        id: "order_emails".into(),
        name: "Order emails".into(),
        combine_mode: CombineMode::JoinByKey,
        columns: vec![
            ViewColumn {
                dataset_id: "orders".into(),
                source_column: "order_id".into(),
                alias: "order_id".into(),
            },
            ViewColumn {
                dataset_id: "customers".into(),
                source_column: "email".into(),
                alias: "email".into(),
            },
        ],
        join_config: Some(JoinConfig {
            base_dataset_id: "orders".into(),
            base_key_column: "customer_id".into(),
            join_type: JoinType::Left,
            one_to_many_mode: OneToManyMode::FirstMatch,
            joins: vec![JoinTarget {
                dataset_id: "customers".into(),
                key_column: "id".into(),
            }],
        }),
    });

    let source = materialize(&ws, &SourceRef::View("order_emails".into())).unwrap();
    assert_eq!(source.row_count, 3);
    let profile = DatasetProfiler::new().profile(&source);
    assert_eq!(profile.column_count, 2);
    let email = profile.columns.iter().find(|c| c.column == "email").unwrap();
    // both matched orders pull ann@example.com; the third pulls the bad one
    assert_eq!(email.invalid_count, 1);
}

#[test]
fn timeliness_flows_into_health() {
    let ws = sample_workspace();
    let source = materialize(&ws, &SourceRef::Dataset("customers".into())).unwrap();

    let recent = DatasetProfiler::builder()
        .reference_date(NaiveDate::from_ymd_opt(2023, 7, 1).unwrap())
        .build()
        .profile(&source);
    // two of three signup dates fall within a year of the reference
    assert!((recent.timeliness_pct - 200.0 / 3.0).abs() < 1e-9);

    let neutral = DatasetProfiler::new().profile(&source);
    assert_eq!(neutral.timeliness_pct, 100.0);
    assert!(neutral.table_health_score >= recent.table_health_score);
}

#[test]
fn workspace_kpis_roll_up() {
    let ws = sample_workspace();
    let kpis = aggregate(&ws);

    assert_eq!(kpis.dataset_count, 2);
    assert_eq!(kpis.total_rows, 6);
    assert_eq!(kpis.total_columns, 6);
    assert_eq!(kpis.total_cell_count, 18);
    // invalid email + stray amount text at minimum
    assert!(kpis.known_error_count >= 2);
    assert!(kpis.data_to_errors_ratio > 0.0);
    assert!(kpis.avg_quality_score > 0.0 && kpis.avg_quality_score <= 100.0);
    assert!(kpis.cost_of_quality_usd > 0.0);
    assert!(kpis.estimated_storage_mb > 0.0);
}

#[test]
fn empty_workspace_kpis_are_neutral() {
    let kpis = aggregate(&Workspace::default());
    assert_eq!(kpis.dataset_count, 0);
    assert_eq!(kpis.data_to_errors_ratio, 0.0);
    assert!(kpis.avg_quality_score == 0.0);
}

#[test]
fn profiling_and_aggregation_are_idempotent() {
    let ws = sample_workspace();
    let profiler = DatasetProfiler::builder()
        .reference_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        .build();

    let source = materialize(&ws, &SourceRef::Dataset("customers".into())).unwrap();
    assert_eq!(profiler.profile(&source), profiler.profile(&source));
    assert_eq!(
        aggregate_with(&ws, &profiler),
        aggregate_with(&ws, &profiler)
    );
}
