//! Ferment Server Library
//!
//! HTTP service that stores fermentation controller exports and serves them
//! back as time series.
//!
//! # Overview
//!
//! - **Upload**: `POST /api/v1/upload` takes a CSV export, archives it,
//!   normalizes it with `ferment-ingest` and stores the records for a run
//! - **Retrieval**: `GET /api/v1/data/:run_id` returns a run's records in
//!   insertion order; `GET /api/v1/runs/:run_id` returns its metadata
//! - **Database**: PostgreSQL via SQLx, schema in the workspace `migrations/`
//! - **Configuration**: environment variables (and `.env`) with defaults
//! - **Middleware**: CORS, request tracing, compression, body limit
//!
//! # Architecture
//!
//! Features are vertical slices with separate commands (writes) and queries
//! (reads). Each command or query is a plain struct plus an async `handle`
//! function running inline SQL, with its own `thiserror` enum mapped to HTTP
//! in the feature's `routes.rs`.
//!
//! # Example
//!
//! ```no_run
//! use ferment_server::{api, config::Config, db, storage::UploadArchive};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     db::run_migrations(&pool).await?;
//!
//!     let archive = UploadArchive::new(&config.ingest.upload_dir, config.ingest.archive_uploads);
//!     api::serve(api::AppState { db: pool, archive }, config).await
//! }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod storage;

// Re-export commonly used types
pub use error::{ServerError, ServerResult};
