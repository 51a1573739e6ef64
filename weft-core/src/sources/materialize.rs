//! Resolving datasets and views into flat, transient row sets.
//!
//! `materialize` is the single entry point: it resolves a dataset by id
//! directly and a view by applying its combine mode. The result is never
//! persisted and is recomputed on every access, so view consumers always
//! see current data.
//!
//! Composition is resilient by contract: a view left pointing at a deleted
//! dataset, a key-combined view missing its join configuration, or a
//! declared column outside the join all degrade to empty or null-filled
//! results. The UI must stay usable after deletions, so nothing in this
//! module panics or returns an error for stale references.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::core::{
    CombineMode, Dataset, JoinConfig, JoinType, OneToManyMode, Record, Value, View, Workspace,
};

/// Identifies the source to materialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "id")]
pub enum SourceRef {
    Dataset(String),
    View(String),
}

/// The resolved, flat result of a dataset or view at a point in time.
///
/// Invariant: every record carries exactly the declared columns; values the
/// source could not supply are `Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializedSource {
    pub id: String,
    pub name: String,
    pub columns: Vec<String>,
    pub records: Vec<Record>,
    pub row_count: usize,
}

impl MaterializedSource {
    fn new(id: &str, name: &str, columns: Vec<String>, records: Vec<Record>) -> Self {
        let row_count = records.len();
        Self {
            id: id.to_string(),
            name: name.to_string(),
            columns,
            records,
            row_count,
        }
    }

    /// Wraps a dataset, normalizing every record to the declared columns.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let records = dataset
            .records
            .iter()
            .map(|record| {
                dataset
                    .columns
                    .iter()
                    .map(|col| {
                        (
                            col.clone(),
                            record.get(col).cloned().unwrap_or(Value::Null),
                        )
                    })
                    .collect()
            })
            .collect();
        Self::new(&dataset.id, &dataset.name, dataset.columns.clone(), records)
    }
}

/// Resolves a dataset or view into a flat row set.
///
/// Returns `None` only when the id itself is unknown; every data-shape
/// problem inside a known view resolves to an empty result instead.
#[instrument(skip(workspace))]
pub fn materialize(workspace: &Workspace, source: &SourceRef) -> Option<MaterializedSource> {
    match source {
        SourceRef::Dataset(id) => workspace.dataset(id).map(MaterializedSource::from_dataset),
        SourceRef::View(id) => workspace.view(id).map(|view| resolve_view(workspace, view)),
    }
}

fn resolve_view(workspace: &Workspace, view: &View) -> MaterializedSource {
    let result = match view.combine_mode {
        CombineMode::RowIndex => resolve_row_index(workspace, view),
        CombineMode::JoinByKey => match &view.join_config {
            Some(config) => resolve_join(workspace, view, config),
            None => empty_result(view),
        },
    };
    debug!(
        view = %view.id,
        rows = result.row_count,
        columns = result.columns.len(),
        "materialized view"
    );
    result
}

fn empty_result(view: &View) -> MaterializedSource {
    MaterializedSource::new(&view.id, &view.name, view.aliases(), Vec::new())
}

/// Row-position alignment: row `i` pulls `records[i][source_column]` from
/// each declared dataset, null-padding past the shorter ones. A declared
/// dataset that no longer exists makes the whole view resolve empty.
fn resolve_row_index(workspace: &Workspace, view: &View) -> MaterializedSource {
    let mut datasets: HashMap<&str, &Dataset> = HashMap::new();
    for col in &view.columns {
        match workspace.dataset(&col.dataset_id) {
            Some(ds) => {
                datasets.insert(col.dataset_id.as_str(), ds);
            }
            None => return empty_result(view),
        }
    }
    let row_count = datasets.values().map(|d| d.row_count).max().unwrap_or(0);

    let records = (0..row_count)
        .map(|i| {
            view.columns
                .iter()
                .map(|col| {
                    let value = datasets
                        .get(col.dataset_id.as_str())
                        .map(|ds| ds.value_at(i, &col.source_column))
                        .unwrap_or(Value::Null);
                    (col.alias.clone(), value)
                })
                .collect()
        })
        .collect();

    MaterializedSource::new(&view.id, &view.name, view.aliases(), records)
}

struct TargetIndex<'a> {
    dataset: &'a Dataset,
    /// Canonical key value -> record indices, in original record order.
    by_key: HashMap<String, Vec<usize>>,
    /// Records whose key matched at least one base row.
    matched: Vec<bool>,
}

fn join_key(record: &Record, column: &str) -> Option<String> {
    record
        .get(column)
        .filter(|v| !v.is_blank())
        .map(Value::canonical_string)
}

/// Star-join: every target is indexed and probed against the base dataset
/// independently. Blank keys never match, mirroring SQL null-key joins.
fn resolve_join(workspace: &Workspace, view: &View, config: &JoinConfig) -> MaterializedSource {
    let Some(base) = workspace.dataset(&config.base_dataset_id) else {
        return empty_result(view);
    };
    if !base.has_column(&config.base_key_column) {
        return empty_result(view);
    }

    let mut targets = Vec::with_capacity(config.joins.len());
    for join in &config.joins {
        let Some(dataset) = workspace.dataset(&join.dataset_id) else {
            return empty_result(view);
        };
        if !dataset.has_column(&join.key_column) {
            return empty_result(view);
        }
        let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, record) in dataset.records.iter().enumerate() {
            if let Some(key) = join_key(record, &join.key_column) {
                by_key.entry(key).or_default().push(i);
            }
        }
        let matched = vec![false; dataset.records.len()];
        targets.push(TargetIndex {
            dataset,
            by_key,
            matched,
        });
    }

    // Combined rows as (base record, one optional record per target).
    let mut combined: Vec<(Option<&Record>, Vec<Option<&Record>>)> = Vec::new();

    for base_record in &base.records {
        let key = join_key(base_record, &config.base_key_column);
        let matches: Vec<Vec<usize>> = targets
            .iter()
            .map(|t| {
                key.as_deref()
                    .and_then(|k| t.by_key.get(k))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect();

        if config.join_type == JoinType::Inner && matches.iter().any(Vec::is_empty) {
            continue;
        }
        for (target, hit) in targets.iter_mut().zip(&matches) {
            for &i in hit {
                target.matched[i] = true;
            }
        }

        // Per-target choices for this base row; an unmatched target
        // contributes a null slot under left/full semantics.
        let choices: Vec<Vec<Option<usize>>> = matches
            .iter()
            .map(|hit| {
                if hit.is_empty() {
                    vec![None]
                } else {
                    match config.one_to_many_mode {
                        OneToManyMode::FirstMatch => vec![Some(hit[0])],
                        OneToManyMode::Expand => hit.iter().copied().map(Some).collect(),
                    }
                }
            })
            .collect();

        for combo in cartesian(&choices) {
            let parts = combo
                .iter()
                .zip(&targets)
                .map(|(slot, target)| slot.map(|i| &target.dataset.records[i]))
                .collect();
            combined.push((Some(base_record), parts));
        }
    }

    // Full joins additionally surface each target's never-matched records
    // as orphan rows, per target independently.
    if config.join_type == JoinType::Full {
        for (ti, target) in targets.iter().enumerate() {
            for (i, record) in target.dataset.records.iter().enumerate() {
                if !target.matched[i] {
                    let mut parts: Vec<Option<&Record>> = vec![None; targets.len()];
                    parts[ti] = Some(record);
                    combined.push((None, parts));
                }
            }
        }
    }

    let records = combined
        .iter()
        .map(|(base_record, parts)| {
            view.columns
                .iter()
                .map(|col| {
                    let part: Option<&Record> = if col.dataset_id == config.base_dataset_id {
                        *base_record
                    } else {
                        config
                            .joins
                            .iter()
                            .position(|j| j.dataset_id == col.dataset_id)
                            .and_then(|idx| parts[idx])
                    };
                    let value = part
                        .and_then(|r| r.get(&col.source_column))
                        .cloned()
                        .unwrap_or(Value::Null);
                    (col.alias.clone(), value)
                })
                .collect()
        })
        .collect();

    MaterializedSource::new(&view.id, &view.name, view.aliases(), records)
}

/// Cartesian product over per-target match choices. With no targets this
/// yields a single empty combination, i.e. one output row per base row.
fn cartesian(choices: &[Vec<Option<usize>>]) -> Vec<Vec<Option<usize>>> {
    let mut acc: Vec<Vec<Option<usize>>> = vec![Vec::new()];
    for options in choices {
        let mut next = Vec::with_capacity(acc.len() * options.len());
        for prefix in &acc {
            for option in options {
                let mut row = prefix.clone();
                row.push(*option);
                next.push(row);
            }
        }
        acc = next;
    }
    acc
}
