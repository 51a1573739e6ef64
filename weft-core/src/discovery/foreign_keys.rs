//! Foreign-key inference by value-set overlap.
//!
//! For every ordered pair of columns across distinct datasets, the source
//! column's distinct values are compared against the target's. A
//! relationship is reported when the overlap share clears the configured
//! threshold and the source side carries enough distinct values to not be
//! a flag. Orphans are the distinct source values missing from the target.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::Workspace;
use crate::discovery::{distinct_values, DiscoveryConfig};

/// A detected value-overlap relationship between two datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferredForeignKey {
    pub source_dataset_id: String,
    pub source_column: String,
    pub target_dataset_id: String,
    pub target_column: String,
    /// `|source distinct ∩ target distinct| / |source distinct|`, percent.
    pub overlap_pct: f64,
    /// Distinct source values absent from the target's value set.
    pub orphan_count: usize,
}

pub(crate) fn infer(workspace: &Workspace, config: &DiscoveryConfig) -> Vec<InferredForeignKey> {
    // Distinct sets per (dataset index, column index), computed once.
    let per_dataset: Vec<Vec<BTreeSet<String>>> = workspace
        .datasets
        .iter()
        .map(|dataset| {
            let sample = config.sampling.sample(&dataset.records);
            dataset
                .columns
                .iter()
                .map(|column| distinct_values(&sample.rows, column))
                .collect()
        })
        .collect();

    let mut found = Vec::new();
    for (si, source) in workspace.datasets.iter().enumerate() {
        for (ti, target) in workspace.datasets.iter().enumerate() {
            if si == ti {
                continue;
            }
            for (sc, source_column) in source.columns.iter().enumerate() {
                let source_set = &per_dataset[si][sc];
                if source_set.len() < config.min_fk_cardinality {
                    continue;
                }
                for (tc, target_column) in target.columns.iter().enumerate() {
                    let target_set = &per_dataset[ti][tc];
                    if target_set.is_empty() {
                        continue;
                    }
                    let overlap = source_set.intersection(target_set).count();
                    let overlap_pct = overlap as f64 / source_set.len() as f64 * 100.0;
                    if overlap_pct >= config.fk_overlap_pct {
                        found.push(InferredForeignKey {
                            source_dataset_id: source.id.clone(),
                            source_column: source_column.clone(),
                            target_dataset_id: target.id.clone(),
                            target_column: target_column.clone(),
                            overlap_pct,
                            orphan_count: source_set.len() - overlap,
                        });
                    }
                }
            }
        }
    }

    found.sort_by(|a, b| {
        (
            &a.source_dataset_id,
            &a.source_column,
            &a.target_dataset_id,
            &a.target_column,
        )
            .cmp(&(
                &b.source_dataset_id,
                &b.source_column,
                &b.target_dataset_id,
                &b.target_column,
            ))
    });
    found
}
