//! Server-specific error types
//!
//! HTTP-facing errors live with each feature (see `features::runs::routes`);
//! database errors are [`crate::db::DbError`]. This type covers the upload
//! archive's filesystem work.

use thiserror::Error;

/// Result type alias for server operations
pub type ServerResult<T> = std::result::Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No free archive name for {0} after {1} attempts")]
    ArchiveNameExhausted(String, usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ServerError = io.into();
        assert!(matches!(err, ServerError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }
}
