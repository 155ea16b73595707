//! Feature modules implementing the ferment API
//!
//! Each feature is a vertical slice:
//! - `commands/` - Write operations
//! - `queries/` - Read operations
//! - `routes.rs` - HTTP route definitions
//! - `types.rs` - Shared row types
//!
//! # Features
//!
//! - **runs**: CSV upload and time-series retrieval for fermentation runs

pub mod runs;
pub mod shared;

use axum::Router;
use sqlx::PgPool;

use crate::config::IngestSettings;
use crate::storage::UploadArchive;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool for database operations
    pub db: PgPool,
    /// Where raw uploads are kept
    pub archive: UploadArchive,
    pub ingest: IngestSettings,
}

/// Creates the API router with all feature routes mounted
///
/// The runs routes sit directly under their mount point (`/upload`,
/// `/data/:run_id`, `/runs/:run_id`) rather than under a `/runs` nest. The
/// router is mounted at `/api/v1` and again at the root.
pub fn router(state: FeatureState) -> Router<()> {
    let runs_state = runs::RunsState {
        db: state.db,
        archive: state.archive,
        settings: state.ingest,
    };

    Router::new().merge(runs::runs_routes().with_state(runs_state))
}
