//! View specifications: saved descriptions of how datasets combine into a
//! virtual table.
//!
//! A view either zips datasets together by row position (`RowIndex`) or
//! star-joins them by key (`JoinByKey`). Validation here is the
//! configuration-time check the authoring surface runs before saving; the
//! materializer in `sources` never relies on it and degrades stale or
//! invalid views to empty results instead of failing.

use serde::{Deserialize, Serialize};

use crate::core::workspace::Workspace;
use crate::error::{Result, WeftError};

/// How a view combines its source datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineMode {
    /// Align rows by position across datasets.
    RowIndex,
    /// Star-join targets against a base dataset by key.
    JoinByKey,
}

/// Join flavor for `JoinByKey` views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinType {
    /// Base rows that match in every target.
    Inner,
    /// Every base row; unmatched targets contribute nulls.
    Left,
    /// Left, plus orphan rows for target records no base row matched.
    Full,
}

/// How one base row relates to multiple matching target rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OneToManyMode {
    /// One output row per match combination.
    Expand,
    /// Only the first match per target, by original record order.
    FirstMatch,
}

/// A column the view exposes, pulled from one source dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewColumn {
    pub dataset_id: String,
    pub source_column: String,
    /// Output name; unique within the view.
    pub alias: String,
}

/// One join target probed against the base dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinTarget {
    pub dataset_id: String,
    pub key_column: String,
}

/// Join configuration, required iff the view combines by key.
///
/// Each target is joined against the base independently (never chained
/// through prior join results), which keeps multi-target joins commutative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinConfig {
    pub base_dataset_id: String,
    pub base_key_column: String,
    pub join_type: JoinType,
    pub one_to_many_mode: OneToManyMode,
    pub joins: Vec<JoinTarget>,
}

/// A saved view specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub id: String,
    pub name: String,
    pub combine_mode: CombineMode,
    pub columns: Vec<ViewColumn>,
    pub join_config: Option<JoinConfig>,
}

impl View {
    /// Validates the specification against the current workspace.
    ///
    /// This is the authoring-time gate: it rejects a key-combined view
    /// without a join configuration, dangling dataset/column references,
    /// duplicate aliases, and columns naming datasets outside the join's
    /// base and targets. Materialization does not require it to have run.
    pub fn validate(&self, workspace: &Workspace) -> Result<()> {
        for (i, col) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.alias == col.alias) {
                return Err(WeftError::DuplicateAlias {
                    view_id: self.id.clone(),
                    alias: col.alias.clone(),
                });
            }
            let dataset = workspace.dataset(&col.dataset_id).ok_or_else(|| {
                WeftError::UnknownDataset {
                    view_id: self.id.clone(),
                    dataset_id: col.dataset_id.clone(),
                }
            })?;
            if !dataset.has_column(&col.source_column) {
                return Err(WeftError::UnknownColumn {
                    view_id: self.id.clone(),
                    dataset_id: col.dataset_id.clone(),
                    column: col.source_column.clone(),
                });
            }
        }

        if self.combine_mode != CombineMode::JoinByKey {
            return Ok(());
        }
        let config = self.join_config.as_ref().ok_or_else(|| {
            WeftError::MissingJoinConfig {
                view_id: self.id.clone(),
            }
        })?;

        let base = workspace.dataset(&config.base_dataset_id).ok_or_else(|| {
            WeftError::UnknownDataset {
                view_id: self.id.clone(),
                dataset_id: config.base_dataset_id.clone(),
            }
        })?;
        if !base.has_column(&config.base_key_column) {
            return Err(WeftError::UnknownColumn {
                view_id: self.id.clone(),
                dataset_id: config.base_dataset_id.clone(),
                column: config.base_key_column.clone(),
            });
        }
        for target in &config.joins {
            let dataset = workspace.dataset(&target.dataset_id).ok_or_else(|| {
                WeftError::UnknownDataset {
                    view_id: self.id.clone(),
                    dataset_id: target.dataset_id.clone(),
                }
            })?;
            if !dataset.has_column(&target.key_column) {
                return Err(WeftError::UnknownColumn {
                    view_id: self.id.clone(),
                    dataset_id: target.dataset_id.clone(),
                    column: target.key_column.clone(),
                });
            }
        }
        for col in &self.columns {
            let in_join = col.dataset_id == config.base_dataset_id
                || config.joins.iter().any(|j| j.dataset_id == col.dataset_id);
            if !in_join {
                return Err(WeftError::ColumnOutsideJoin {
                    view_id: self.id.clone(),
                    alias: col.alias.clone(),
                    dataset_id: col.dataset_id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Output column names, in declaration order.
    pub fn aliases(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.alias.clone()).collect()
    }
}
