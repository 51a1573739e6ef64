//! Profiling and aggregation framework for workspace data.
//!
//! This module turns materialized sources into quality metrics:
//!
//! - **Type Inference** (`inference`): semantic type and pattern detection
//!   over sampled, untyped values
//! - **Profiler** (`profiler`): per-column and per-dataset quality scores,
//!   descriptive statistics, outliers, and the issue list
//! - **KPI aggregation** (`kpi`): workspace-wide averages, totals, ratios,
//!   and derived business metrics
//! - **Sampling** (`sampling`): the deterministic, self-describing sampling
//!   policy every pass shares
//!
//! Each analyzer is a pure function of its input snapshot: no hidden state,
//! no clocks, no randomness. Calling one twice with unchanged inputs yields
//! deep-equal output.

pub mod errors;
pub mod inference;
pub mod kpi;
pub mod profiler;
pub mod sampling;

pub use errors::{AnalyzerError, AnalyzerResult};
pub use inference::{
    detect_pattern, ColumnPattern, InferenceConfig, InferredType, TypeInference,
    TypeInferenceEngine, TypeInferenceEngineBuilder,
};
pub use kpi::{aggregate, aggregate_with, combine, WorkspaceKpis};
pub use profiler::{
    canonical_row, ColumnProfile, DatasetProfile, DatasetProfiler, DatasetProfilerBuilder,
    Issue, IssueSeverity, NumericStats,
};
pub use sampling::{Sample, SamplingPolicy};
