//! Fermentation runs: document upload and time-series retrieval

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

use sqlx::PgPool;

use crate::config::IngestSettings;
use crate::storage::UploadArchive;

pub use commands::{UploadRunDataCommand, UploadRunDataError, UploadRunDataResponse};
pub use queries::{GetRunError, GetRunQuery, ListRunRecordsError, ListRunRecordsQuery};
pub use routes::runs_routes;
pub use types::{RunSummary, TimeSeriesRecord};

/// State the runs routes need
#[derive(Clone)]
pub struct RunsState {
    pub db: PgPool,
    pub archive: UploadArchive,
    pub settings: IngestSettings,
}
