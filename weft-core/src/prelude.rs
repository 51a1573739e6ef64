//! Prelude for commonly used types in weft-core.

pub use crate::analyzers::{
    aggregate, aggregate_with, ColumnPattern, ColumnProfile, DatasetProfile, DatasetProfiler,
    InferredType, Issue, IssueSeverity, SamplingPolicy, WorkspaceKpis,
};
pub use crate::core::{Dataset, Record, Value, View, Workspace};
pub use crate::discovery::{
    CandidateKey, CrossFieldCheck, InferredForeignKey, RelationshipDiscovery,
};
pub use crate::error::{Result, WeftError};
pub use crate::graph::{build_graph, WorkspaceGraph};
pub use crate::hierarchy::{build_hierarchy, HierarchyNode};
pub use crate::logging::LogConfig;
pub use crate::sources::{materialize, MaterializedSource, SourceRef};
