//! Core model types for the Weft engine.
//!
//! This module provides the fundamental values the rest of the crate
//! operates on:
//!
//! - **[`Value`]**: the closed cell variant for untyped tabular data
//! - **[`Dataset`]** and **[`Record`]**: imported tables and their rows
//! - **[`View`]**: saved specifications for combining datasets
//! - **[`Workspace`]**: the explicit snapshot passed into every engine call
//!
//! Everything here is plain data with serde derives; ownership is
//! caller-scoped and nothing holds cross-call state.

mod dataset;
mod value;
mod view;
mod workspace;

pub use dataset::{Dataset, Record};
pub use value::{Value, ValueClass};
pub use view::{
    CombineMode, JoinConfig, JoinTarget, JoinType, OneToManyMode, View, ViewColumn,
};
pub use workspace::Workspace;
