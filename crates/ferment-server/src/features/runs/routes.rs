//! Runs API routes
//!
//! # Route Structure
//!
//! - `POST /api/v1/upload` - Upload a controller CSV export (multipart)
//! - `GET /api/v1/data/:run_id` - Every record stored for a run
//! - `GET /api/v1/runs/:run_id` - Run metadata and record count

use crate::api::response::{ApiResponse, ErrorResponse};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::{
    commands::{UploadRunDataCommand, UploadRunDataError},
    queries::{GetRunError, GetRunQuery, ListRunRecordsError, ListRunRecordsQuery},
    RunsState,
};

// ============================================================================
// Router Configuration
// ============================================================================

pub fn runs_routes() -> Router<RunsState> {
    Router::new()
        .route("/upload", post(upload_run_data))
        .route("/data/:run_id", get(list_run_records))
        .route("/runs/:run_id", get(get_run))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Upload a document for a run
///
/// # Endpoint
///
/// `POST /api/v1/upload` (`multipart/form-data`)
///
/// # Form Fields
///
/// - `file` - the CSV export (required)
/// - `pump1`, `pump2` - substances on the two pump channels
/// - `run_id`, `client_name` - target run; configured defaults when omitted
///
/// # Response
///
/// - `201 Created` - Document stored
/// - `400 Bad Request` - No file, invalid run id or label
/// - `413 Payload Too Large` - Body over the configured limit
/// - `500 Internal Server Error` - Archive or database failure
#[tracing::instrument(skip(state, multipart))]
async fn upload_run_data(
    State(state): State<RunsState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, RunsApiError> {
    let command = match multipart {
        Ok(multipart) => read_upload_form(multipart).await?,
        Err(rejection) => {
            // Not a multipart body at all, so there is no file
            tracing::debug!(%rejection, "Upload request is not multipart");
            UploadRunDataCommand::default()
        },
    };

    let response =
        super::commands::upload::handle(state.db, state.archive, state.settings, command).await?;

    tracing::info!(
        run_id = %response.run_id,
        records_inserted = response.records_inserted,
        "Run data uploaded via API"
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadRunDataCommand, RunsApiError> {
    let mut command = UploadRunDataCommand::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                command.file_name = field.file_name().map(str::to_string);
                command.content = Some(field.bytes().await?.to_vec());
            },
            "pump1" => command.pump1 = Some(field.text().await?),
            "pump2" => command.pump2 = Some(field.text().await?),
            "run_id" | "runId" => command.run_id = Some(field.text().await?),
            "client_name" | "clientName" => command.client_name = Some(field.text().await?),
            other => tracing::debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    Ok(command)
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// List the records of a run
///
/// # Endpoint
///
/// `GET /api/v1/data/:run_id`
///
/// # Response
///
/// - `200 OK` - Records in insertion order (empty for an unknown run)
/// - `500 Internal Server Error` - Database error
#[tracing::instrument(skip(state), fields(run_id = %run_id))]
async fn list_run_records(
    State(state): State<RunsState>,
    Path(run_id): Path<String>,
) -> Result<Response, RunsApiError> {
    let records =
        super::queries::list_records::handle(state.db, ListRunRecordsQuery { run_id }).await?;

    let meta = json!({ "count": records.len() });
    Ok((StatusCode::OK, Json(ApiResponse::success_with_meta(records, meta))).into_response())
}

/// Get run metadata
///
/// # Endpoint
///
/// `GET /api/v1/runs/:run_id`
///
/// # Response
///
/// - `200 OK` - Run found
/// - `404 Not Found` - No such run
/// - `500 Internal Server Error` - Database error
#[tracing::instrument(skip(state), fields(run_id = %run_id))]
async fn get_run(
    State(state): State<RunsState>,
    Path(run_id): Path<String>,
) -> Result<Response, RunsApiError> {
    let summary = super::queries::get_run::handle(state.db, GetRunQuery { run_id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(summary))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Unified error type for runs API endpoints
#[derive(Debug)]
enum RunsApiError {
    Multipart(MultipartError),
    UploadError(UploadRunDataError),
    ListError(ListRunRecordsError),
    GetError(GetRunError),
}

impl From<MultipartError> for RunsApiError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart(err)
    }
}

impl From<UploadRunDataError> for RunsApiError {
    fn from(err: UploadRunDataError) -> Self {
        Self::UploadError(err)
    }
}

impl From<ListRunRecordsError> for RunsApiError {
    fn from(err: ListRunRecordsError) -> Self {
        Self::ListError(err)
    }
}

impl From<GetRunError> for RunsApiError {
    fn from(err: GetRunError) -> Self {
        Self::GetError(err)
    }
}

impl IntoResponse for RunsApiError {
    fn into_response(self) -> Response {
        match self {
            RunsApiError::Multipart(ref err) => {
                let status = err.status();
                tracing::warn!(%status, "Malformed upload: {}", err.body_text());
                let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "PAYLOAD_TOO_LARGE"
                } else {
                    "BAD_REQUEST"
                };
                ErrorResponse::new(code, err.body_text()).into_response_with(status)
            },

            RunsApiError::UploadError(UploadRunDataError::ContentRequired)
            | RunsApiError::UploadError(UploadRunDataError::InvalidRunId(_))
            | RunsApiError::UploadError(UploadRunDataError::InvalidLabel(_)) => {
                ErrorResponse::new("VALIDATION_ERROR", self.to_string())
                    .into_response_with(StatusCode::BAD_REQUEST)
            },
            RunsApiError::UploadError(UploadRunDataError::Archive(_))
            | RunsApiError::UploadError(UploadRunDataError::Database(_)) => {
                tracing::error!("Error during upload: {}", self);
                ErrorResponse::new("INTERNAL_ERROR", "Failed to process the file")
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            },

            RunsApiError::ListError(ListRunRecordsError::Database(_)) => {
                tracing::error!("Database error while listing records: {}", self);
                ErrorResponse::new("INTERNAL_ERROR", "Failed to fetch data")
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            },

            RunsApiError::GetError(GetRunError::NotFound(_)) => {
                ErrorResponse::new("NOT_FOUND", self.to_string())
                    .into_response_with(StatusCode::NOT_FOUND)
            },
            RunsApiError::GetError(GetRunError::Database(_)) => {
                tracing::error!("Database error while fetching run: {}", self);
                ErrorResponse::new("INTERNAL_ERROR", "Failed to fetch data")
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            },
        }
    }
}

impl std::fmt::Display for RunsApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Multipart(e) => write!(f, "{}", e),
            Self::UploadError(e) => write!(f, "{}", e),
            Self::ListError(e) => write!(f, "{}", e),
            Self::GetError(e) => write!(f, "{}", e),
        }
    }
}
