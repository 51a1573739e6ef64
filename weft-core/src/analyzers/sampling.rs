//! Deterministic row sampling for profiling and discovery passes.
//!
//! Large inputs are never scanned unbounded: each pass works over a capped
//! sample and reports how much of the data it saw, so downstream KPI
//! displays are self-describing. The cap grows with the square root of the
//! row count, which keeps per-call cost roughly sub-linear while small
//! datasets are always read in full.
//!
//! Sampling is a fixed stride over the record list rather than a random
//! draw: re-running any pass over unchanged input must yield identical
//! output.

use serde::{Deserialize, Serialize};

use crate::analyzers::errors::{AnalyzerError, AnalyzerResult};
use crate::core::Record;

/// Default floor below which datasets are profiled in full.
pub const DEFAULT_MIN_ROWS: usize = 1_000;

/// Default multiplier applied to `sqrt(row_count)` above the floor.
pub const DEFAULT_SQRT_SCALE: f64 = 30.0;

/// Sampling policy shared by the profiler and relationship discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingPolicy {
    /// Datasets at or below this row count are read in full.
    min_rows: usize,
    /// Cap multiplier: `max(min_rows, sqrt_scale * ceil(sqrt(n)))`.
    sqrt_scale: f64,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            min_rows: DEFAULT_MIN_ROWS,
            sqrt_scale: DEFAULT_SQRT_SCALE,
        }
    }
}

impl SamplingPolicy {
    /// Creates a policy with an explicit floor and scale.
    ///
    /// Rejects a zero floor or a non-finite/negative scale outright; those
    /// are contract violations, not data problems.
    pub fn new(min_rows: usize, sqrt_scale: f64) -> AnalyzerResult<Self> {
        if min_rows == 0 {
            return Err(AnalyzerError::invalid_config(
                "sampling floor must be at least 1 row",
            ));
        }
        if !sqrt_scale.is_finite() || sqrt_scale < 0.0 {
            return Err(AnalyzerError::invalid_config(format!(
                "sampling scale must be finite and non-negative, got {sqrt_scale}"
            )));
        }
        Ok(Self {
            min_rows,
            sqrt_scale,
        })
    }

    /// Number of rows a dataset of `row_count` rows will contribute.
    pub fn cap_for(&self, row_count: usize) -> usize {
        let scaled = (self.sqrt_scale * (row_count as f64).sqrt().ceil()) as usize;
        self.min_rows.max(scaled).min(row_count.max(1))
    }

    /// Takes a stride sample over `records`, preserving relative order.
    pub fn sample<'a>(&self, records: &'a [Record]) -> Sample<'a> {
        let n = records.len();
        if n == 0 {
            return Sample {
                rows: Vec::new(),
                total_rows: 0,
                sampled_rows: 0,
                sampling_ratio_pct: 0.0,
            };
        }
        let cap = self.cap_for(n);
        let rows: Vec<&Record> = if n <= cap {
            records.iter().collect()
        } else {
            let stride = (n + cap - 1) / cap;
            records.iter().step_by(stride).collect()
        };
        let sampled_rows = rows.len();
        Sample {
            rows,
            total_rows: n,
            sampled_rows,
            sampling_ratio_pct: sampled_rows as f64 / n as f64 * 100.0,
        }
    }
}

/// A sampled slice of a record set, with the metadata reported alongside
/// every derived result.
#[derive(Debug, Clone)]
pub struct Sample<'a> {
    pub rows: Vec<&'a Record>,
    pub total_rows: usize,
    pub sampled_rows: usize,
    pub sampling_ratio_pct: f64,
}
