//! Ferment Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types and utilities for the fermentation run data
//! service.
//!
//! # Overview
//!
//! - **Logging**: `tracing` subscriber setup shared by every binary
//! - **Checksums**: SHA-256 digests of uploaded documents
//! - **Types**: Run identifiers and pump label configuration
//!
//! # Example
//!
//! ```no_run
//! use ferment_common::types::{PumpLabels, RunId};
//!
//! let run_id: RunId = "R001002".parse()?;
//! let labels = PumpLabels::new("Glycerol", "Acid");
//! assert_eq!(labels.resolve("Pump1"), "Glycerol");
//! # Ok::<(), ferment_common::types::RunIdError>(())
//! ```

pub mod checksum;
pub mod logging;
pub mod types;
