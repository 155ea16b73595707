//! Normalization settings

use ferment_common::types::PumpLabels;
use serde::{Deserialize, Serialize};

/// Lines at the top of a controller export that never carry data
pub const DEFAULT_PREAMBLE_LINES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Leading lines dropped unconditionally before row parsing
    pub preamble_lines: usize,
    pub labels: PumpLabels,
}

impl IngestOptions {
    pub fn with_labels(mut self, labels: PumpLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_preamble_lines(mut self, preamble_lines: usize) -> Self {
        self.preamble_lines = preamble_lines;
        self
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            preamble_lines: DEFAULT_PREAMBLE_LINES,
            labels: PumpLabels::default(),
        }
    }
}
