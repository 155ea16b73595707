//! Row types shared by the runs commands and queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored measurement, as returned to the dashboard
///
/// Field names are camelCase on the wire to match what the charts read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesRecord {
    pub id: i64,
    pub run_id: String,
    pub time_stamp: f64,
    pub parameter: String,
    pub process_value: f64,
    pub unit: String,
}

/// Run metadata plus how many records it holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RunSummary {
    pub run_id: String,
    pub client_name: String,
    pub created_at: DateTime<Utc>,
    pub record_count: i64,
}
