//! Run metadata lookup
//!
//! Lets a client check whether an upload already landed before retrying it.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::runs::types::RunSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRunQuery {
    pub run_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GetRunError {
    #[error("Run '{0}' not found")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool), fields(run_id = %query.run_id))]
pub async fn handle(pool: PgPool, query: GetRunQuery) -> Result<RunSummary, GetRunError> {
    let run_id = query.run_id.trim();

    sqlx::query_as::<_, RunSummary>(
        r#"
        SELECT c.run_id, c.client_name, c.created_at, COUNT(d.id) AS record_count
        FROM run_client c
        LEFT JOIN run_time_series_data d ON d.run_id = c.run_id
        WHERE c.run_id = $1
        GROUP BY c.run_id, c.client_name, c.created_at
        "#,
    )
    .bind(run_id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| GetRunError::NotFound(run_id.to_string()))
}
