//! Ferment Ingest Library
//!
//! Turns the CSV export of a fermentation controller into normalized
//! time-series records.
//!
//! # Pipeline
//!
//! - [`row::parse_row`]: one data line to a [`NormalizedRecord`] or a
//!   [`RowRejection`]
//! - [`batch::BatchNormalizer`]: skips the preamble and drives the row parser
//!   over a whole document, keeping input order
//!
//! Nothing here touches the network or a database; the server crate persists
//! the resulting [`NormalizedBatch`].
//!
//! # Example
//!
//! ```
//! use ferment_common::types::PumpLabels;
//! use ferment_ingest::{BatchNormalizer, IngestOptions};
//!
//! let options = IngestOptions::default().with_labels(PumpLabels::new("Glucose", "Base"));
//! let batch = BatchNormalizer::new(options).normalize("h1\nh2\n1.0,x,Pump1,y,2.5,z,mg/L\n");
//!
//! assert_eq!(batch.records.len(), 1);
//! assert_eq!(batch.records[0].parameter, "Glucose");
//! ```

pub mod batch;
pub mod cli;
pub mod models;
pub mod options;
pub mod row;

pub use batch::BatchNormalizer;
pub use models::{BatchStats, NormalizedBatch, NormalizedRecord};
pub use options::IngestOptions;
pub use row::{parse_row, RowRejection};
