//! Upload run data command
//!
//! Takes one controller CSV export and stores it against a run.
//!
//! # Flow
//!
//! 1. Validate the form: a document must be present, the run id must be a
//!    legal identifier, labels must fit. Omitted fields take configured
//!    defaults.
//! 2. Archive the raw bytes (when enabled).
//! 3. Normalize the document with [`BatchNormalizer`].
//! 4. In one transaction: create the run row if it does not exist, then bulk
//!    insert the batch. A failure anywhere rolls back both.
//!
//! Uploading the same document twice appends its records twice; run
//! metadata is never duplicated or overwritten.

use ferment_common::{
    checksum::sha256_hex,
    types::{PumpLabels, RunId, RunIdError, DEFAULT_PUMP1_LABEL, DEFAULT_PUMP2_LABEL},
};
use ferment_ingest::{BatchNormalizer, IngestOptions, NormalizedRecord};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::config::IngestSettings;
use crate::error::ServerError;
use crate::features::shared::validation::{non_blank, validate_label, LabelValidationError};
use crate::storage::UploadArchive;

/// Message the dashboard shows after a successful upload
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded and data saved!";

/// Longest accepted pump label
pub const MAX_LABEL_LENGTH: usize = 100;

/// Longest accepted client name
pub const MAX_CLIENT_NAME_LENGTH: usize = 256;

/// Rows per INSERT statement (5 binds each, well under the 65535 bind limit)
const INSERT_CHUNK_SIZE: usize = 1000;

/// Command to store one uploaded document
///
/// Every field is optional on the wire; see [`UploadRunDataCommand::validate`]
/// for how gaps are filled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadRunDataCommand {
    pub run_id: Option<String>,
    pub client_name: Option<String>,
    pub pump1: Option<String>,
    pub pump2: Option<String>,
    pub file_name: Option<String>,
    #[serde(skip)]
    pub content: Option<Vec<u8>>,
}

/// Command after defaults are applied and every field checked
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    pub run_id: RunId,
    pub client_name: String,
    pub labels: PumpLabels,
    pub file_name: Option<String>,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRunDataResponse {
    pub message: String,
    pub run_id: String,
    /// False when the run already existed and only records were appended
    pub run_created: bool,
    pub records_inserted: u64,
    pub lines_rejected: usize,
    /// SHA-256 of the raw document
    pub checksum: String,
}

/// Result of the transactional write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistOutcome {
    pub run_created: bool,
    pub records_inserted: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadRunDataError {
    #[error("No file uploaded")]
    ContentRequired,

    #[error("Invalid run identifier: {0}")]
    InvalidRunId(#[from] RunIdError),

    #[error("{0}")]
    InvalidLabel(#[from] LabelValidationError),

    #[error("Failed to archive upload: {0}")]
    Archive(#[from] ServerError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl UploadRunDataCommand {
    /// Apply defaults and validate
    ///
    /// # Rules
    /// - `content` must be present (an empty document is allowed)
    /// - blank optional fields count as omitted
    /// - run id: configured default when omitted, otherwise a valid [`RunId`]
    /// - client name: configured default when omitted, at most 256 characters
    /// - pump labels: `Glucose` / `Base` when omitted, at most 100 characters
    pub fn validate(self, settings: &IngestSettings) -> Result<ValidatedUpload, UploadRunDataError> {
        let content = self.content.ok_or(UploadRunDataError::ContentRequired)?;

        let run_id = RunId::parse(
            non_blank(self.run_id)
                .as_deref()
                .unwrap_or(&settings.default_run_id),
        )?;

        let client_name =
            non_blank(self.client_name).unwrap_or_else(|| settings.default_client_name.clone());
        validate_label(&client_name, "client_name", MAX_CLIENT_NAME_LENGTH)?;

        let pump1 = non_blank(self.pump1).unwrap_or_else(|| DEFAULT_PUMP1_LABEL.to_string());
        validate_label(&pump1, "pump1", MAX_LABEL_LENGTH)?;

        let pump2 = non_blank(self.pump2).unwrap_or_else(|| DEFAULT_PUMP2_LABEL.to_string());
        validate_label(&pump2, "pump2", MAX_LABEL_LENGTH)?;

        tracing::debug!("Command validation passed");

        Ok(ValidatedUpload {
            run_id,
            client_name,
            labels: PumpLabels::new(pump1, pump2),
            file_name: self.file_name,
            content,
        })
    }
}

/// Handler for document uploads
///
/// # Errors
///
/// - Validation errors before anything is written
/// - Archive errors if the raw document cannot be saved
/// - Database errors if the transaction fails (nothing is persisted)
#[tracing::instrument(
    skip(pool, archive, settings, command),
    fields(file_name = ?command.file_name)
)]
pub async fn handle(
    pool: PgPool,
    archive: UploadArchive,
    settings: IngestSettings,
    command: UploadRunDataCommand,
) -> Result<UploadRunDataResponse, UploadRunDataError> {
    let upload = command.validate(&settings)?;
    let checksum = sha256_hex(&upload.content);

    tracing::info!(
        run_id = %upload.run_id,
        size = upload.content.len(),
        checksum = %checksum,
        "Processing upload"
    );

    archive
        .store(&upload.run_id, upload.file_name.as_deref(), &upload.content)
        .await?;

    let options = IngestOptions::default()
        .with_labels(upload.labels)
        .with_preamble_lines(settings.preamble_lines);
    let batch = BatchNormalizer::new(options).normalize_bytes(&upload.content);

    let outcome = persist_batch(&pool, &upload.run_id, &upload.client_name, &batch.records).await?;

    tracing::info!(
        run_id = %upload.run_id,
        run_created = outcome.run_created,
        records_inserted = outcome.records_inserted,
        lines_rejected = batch.stats.rejected(),
        "Upload stored"
    );

    Ok(UploadRunDataResponse {
        message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        run_id: upload.run_id.to_string(),
        run_created: outcome.run_created,
        records_inserted: outcome.records_inserted,
        lines_rejected: batch.stats.rejected(),
        checksum,
    })
}

/// Create the run if needed and append `records`, atomically
///
/// An existing run keeps its original client name. The transaction is
/// dropped (rolled back) on any error.
pub async fn persist_batch(
    pool: &PgPool,
    run_id: &RunId,
    client_name: &str,
    records: &[NormalizedRecord],
) -> Result<PersistOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let run_created = sqlx::query(
        r#"
        INSERT INTO run_client (run_id, client_name)
        VALUES ($1, $2)
        ON CONFLICT (run_id) DO NOTHING
        "#,
    )
    .bind(run_id.as_str())
    .bind(client_name)
    .execute(&mut *tx)
    .await?
    .rows_affected()
        == 1;

    let mut records_inserted = 0;
    for chunk in records.chunks(INSERT_CHUNK_SIZE) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO run_time_series_data (run_id, time_stamp, parameter, process_value, unit) ",
        );

        builder.push_values(chunk, |mut row, record| {
            row.push_bind(run_id.as_str())
                .push_bind(record.time_stamp)
                .push_bind(&record.parameter)
                .push_bind(record.process_value)
                .push_bind(&record.unit);
        });

        records_inserted += builder.build().execute(&mut *tx).await?.rows_affected();
    }

    tx.commit().await?;

    Ok(PersistOutcome {
        run_created,
        records_inserted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(content: &str) -> UploadRunDataCommand {
        UploadRunDataCommand {
            content: Some(content.as_bytes().to_vec()),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_content_rejected_first() {
        let cmd = UploadRunDataCommand {
            run_id: Some("not valid!".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            cmd.validate(&IngestSettings::default()),
            Err(UploadRunDataError::ContentRequired)
        ));
    }

    #[test]
    fn test_defaults_applied() {
        let upload = command("h1\nh2\n").validate(&IngestSettings::default()).unwrap();

        assert_eq!(upload.run_id.as_str(), "R001002");
        assert_eq!(upload.client_name, "ClientDEF");
        assert_eq!(upload.labels, PumpLabels::new("Glucose", "Base"));
    }

    #[test]
    fn test_blank_fields_count_as_omitted() {
        let cmd = UploadRunDataCommand {
            run_id: Some("  ".to_string()),
            client_name: Some("".to_string()),
            pump1: Some(" ".to_string()),
            ..command("")
        };
        let upload = cmd.validate(&IngestSettings::default()).unwrap();

        assert_eq!(upload.run_id.as_str(), "R001002");
        assert_eq!(upload.client_name, "ClientDEF");
        assert_eq!(upload.labels.pump1, "Glucose");
    }

    #[test]
    fn test_explicit_values_are_trimmed_and_kept() {
        let cmd = UploadRunDataCommand {
            run_id: Some(" R042 ".to_string()),
            client_name: Some("Acme Bio".to_string()),
            pump1: Some("Glycerol".to_string()),
            pump2: Some(" Acid ".to_string()),
            ..command("")
        };
        let upload = cmd.validate(&IngestSettings::default()).unwrap();

        assert_eq!(upload.run_id.as_str(), "R042");
        assert_eq!(upload.client_name, "Acme Bio");
        assert_eq!(upload.labels, PumpLabels::new("Glycerol", "Acid"));
    }

    #[test]
    fn test_invalid_run_id() {
        let cmd = UploadRunDataCommand {
            run_id: Some("R 1".to_string()),
            ..command("")
        };
        assert!(matches!(
            cmd.validate(&IngestSettings::default()),
            Err(UploadRunDataError::InvalidRunId(RunIdError::InvalidCharacter(' ')))
        ));
    }

    #[test]
    fn test_overlong_label() {
        let cmd = UploadRunDataCommand {
            pump2: Some("x".repeat(MAX_LABEL_LENGTH + 1)),
            ..command("")
        };
        let err = cmd.validate(&IngestSettings::default()).unwrap_err();
        assert!(err.to_string().starts_with("pump2 must be"));
    }

    #[test]
    fn test_configured_default_run() {
        let settings = IngestSettings {
            default_run_id: "R777".to_string(),
            default_client_name: "Lab".to_string(),
            ..Default::default()
        };
        let upload = command("").validate(&settings).unwrap();

        assert_eq!(upload.run_id.as_str(), "R777");
        assert_eq!(upload.client_name, "Lab");
    }
}
