//! # Weft - View Composition & Data Profiling for Tabular Workspaces
//!
//! Weft is the in-memory engine behind a data-workspace application: users
//! import tabular datasets, define virtual views that combine them, and get
//! data-quality metrics, relationship hints, and graph structures derived
//! automatically. This crate is the pure data-transformation layer — it
//! materializes sources, profiles them, aggregates KPIs, infers
//! relationships, and assembles visualization structures, all as
//! synchronous functions over plain values.
//!
//! ## Overview
//!
//! Everything starts from a [`core::Workspace`] snapshot: the imported
//! [`core::Dataset`]s and saved [`core::View`] specifications. The engine
//! never mutates its inputs and never holds cross-call state; callers pass
//! the current snapshot into each function and own every result.
//!
//! ## Quick Start
//!
//! ```rust
//! use weft_core::core::{Dataset, Record, Value, Workspace};
//! use weft_core::analyzers::{aggregate, DatasetProfiler};
//! use weft_core::sources::{materialize, SourceRef};
//!
//! let record: Record = [
//!     ("id".to_string(), Value::Number(1.0)),
//!     ("email".to_string(), Value::Text("ann@example.com".into())),
//! ]
//! .into_iter()
//! .collect();
//! let dataset = Dataset::new("users", "Users", vec!["id".into(), "email".into()], vec![record]);
//! let workspace = Workspace::new(vec![dataset], vec![]);
//!
//! // Materialize and profile
//! let source = materialize(&workspace, &SourceRef::Dataset("users".into())).unwrap();
//! let profile = DatasetProfiler::new().profile(&source);
//! assert_eq!(profile.row_count, 1);
//!
//! // Workspace-wide KPIs
//! let kpis = aggregate(&workspace);
//! assert_eq!(kpis.dataset_count, 1);
//! ```
//!
//! ## Key Capabilities
//!
//! - **View composition**: row-position concatenation and star joins with
//!   cardinality control (`expand` vs `first_match`, inner/left/full)
//! - **Profiling**: completeness, uniqueness, consistency, validity,
//!   descriptive statistics with IQR outliers, duplication, and composite
//!   quality scores with an issue list
//! - **KPI aggregation**: workspace-wide averages, totals, ratios, and
//!   derived business metrics
//! - **Relationship discovery**: candidate keys, value-overlap foreign
//!   keys, cross-field ordering checks
//! - **Knowledge graph & hierarchies**: deterministic node/edge lists and
//!   nested count trees for visualization
//!
//! ## Degradation over failure
//!
//! Data-shape problems never raise: a view pointing at a deleted dataset
//! resolves empty, degenerate columns report neutral metrics, and an empty
//! workspace aggregates to zeroed KPIs. Errors are reserved for authoring
//! mistakes ([`error::WeftError`]) and invalid builder configuration.
//!
//! ## Architecture
//!
//! - **`core`**: cell values, datasets, views, and the workspace snapshot
//! - **`sources`**: materialization of datasets and views into flat rows
//! - **`analyzers`**: type inference, profiling, sampling, KPI aggregation
//! - **`discovery`**: candidate keys, foreign keys, cross-field checks
//! - **`graph`** / **`hierarchy`**: visualization structures
//! - **`logging`**: tracing configuration helpers for host applications

pub mod analyzers;
pub mod core;
pub mod discovery;
pub mod error;
pub mod graph;
pub mod hierarchy;
pub mod logging;
pub mod prelude;
pub mod sources;
