//! List every record stored for a run

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::runs::types::TimeSeriesRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRunRecordsQuery {
    pub run_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ListRunRecordsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Records in insertion order
///
/// The id is not syntax-checked: a run that was never stored, whatever its
/// spelling, yields an empty list rather than an error.
#[tracing::instrument(skip(pool), fields(run_id = %query.run_id))]
pub async fn handle(
    pool: PgPool,
    query: ListRunRecordsQuery,
) -> Result<Vec<TimeSeriesRecord>, ListRunRecordsError> {
    let records = sqlx::query_as::<_, TimeSeriesRecord>(
        r#"
        SELECT id, run_id, time_stamp, parameter, process_value, unit
        FROM run_time_series_data
        WHERE run_id = $1
        ORDER BY id
        "#,
    )
    .bind(query.run_id.trim())
    .fetch_all(&pool)
    .await?;

    tracing::debug!(count = records.len(), "Fetched run records");
    Ok(records)
}
