//! Normalized records and batch bookkeeping

use serde::{Deserialize, Serialize};

use crate::row::RowRejection;

/// One observation after normalization
///
/// `time_stamp` and `process_value` are always finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    /// Minutes since the start of the run
    pub time_stamp: f64,
    pub parameter: String,
    pub process_value: f64,
    pub unit: String,
}

/// Line counts for one normalized document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total_lines: usize,
    pub preamble_skipped: usize,
    pub accepted: usize,
    pub too_few_fields: usize,
    pub invalid_timestamp: usize,
}

impl BatchStats {
    pub fn rejected(&self) -> usize {
        self.too_few_fields + self.invalid_timestamp
    }

    pub(crate) fn count_rejection(&mut self, rejection: &RowRejection) {
        match rejection {
            RowRejection::TooFewFields { .. } => self.too_few_fields += 1,
            RowRejection::InvalidTimestamp(_) => self.invalid_timestamp += 1,
        }
    }
}

/// Ordered records ready to persist, plus what was dropped on the way
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBatch {
    pub records: Vec<NormalizedRecord>,
    pub stats: BatchStats,
}

impl NormalizedBatch {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
