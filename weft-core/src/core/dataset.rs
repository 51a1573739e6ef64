//! Imported datasets: named tables of records with a fixed column list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::value::Value;

/// One row. Sorted keys make the canonical serialization used by duplicate
/// detection fall directly out of `serde_json`.
pub type Record = BTreeMap<String, Value>;

/// An imported, named table. Immutable once created: the editor-facing
/// operations below return new `Dataset` values, so profiling and view
/// snapshots taken earlier stay valid and comparable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    /// Declared columns, in display order. Unique.
    pub columns: Vec<String>,
    /// Rows in insertion order.
    pub records: Vec<Record>,
    pub row_count: usize,
}

impl Dataset {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        columns: Vec<String>,
        records: Vec<Record>,
    ) -> Self {
        let row_count = records.len();
        Self {
            id: id.into(),
            name: name.into(),
            columns,
            records,
            row_count,
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Cell at `(row, column)`; `Null` when the row or cell is absent.
    pub fn value_at(&self, row: usize, column: &str) -> Value {
        self.records
            .get(row)
            .and_then(|r| r.get(column))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Returns a copy with the record at `index` replaced. Out-of-range
    /// indices leave the dataset unchanged.
    pub fn with_record_replaced(&self, index: usize, record: Record) -> Self {
        let mut copy = self.clone();
        if let Some(slot) = copy.records.get_mut(index) {
            *slot = record;
        }
        copy
    }

    /// Returns a copy with the record at `index` removed. Out-of-range
    /// indices leave the dataset unchanged.
    pub fn with_record_removed(&self, index: usize) -> Self {
        let mut copy = self.clone();
        if index < copy.records.len() {
            copy.records.remove(index);
            copy.row_count = copy.records.len();
        }
        copy
    }
}
