//! Common types used across the workspace

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Parameter name the device writes for the first pump channel
pub const PUMP1_PLACEHOLDER: &str = "Pump1";

/// Parameter name the device writes for the second pump channel
pub const PUMP2_PLACEHOLDER: &str = "Pump2";

/// Substance the upload form preselects for pump 1
pub const DEFAULT_PUMP1_LABEL: &str = "Glucose";

/// Substance the upload form preselects for pump 2
pub const DEFAULT_PUMP2_LABEL: &str = "Base";

/// Fallback for a missing parameter name or unit
pub const UNKNOWN_LABEL: &str = "Unknown";

// ============================================================================
// Run Identifier
// ============================================================================

/// Errors produced when parsing a [`RunId`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunIdError {
    #[error("Run identifier is required and cannot be empty")]
    Required,

    #[error("Run identifier must be at most {max_length} characters")]
    TooLong { max_length: usize },

    #[error("Run identifier contains invalid character '{0}' (allowed: letters, digits, '-', '_')")]
    InvalidCharacter(char),
}

/// Identifier of one fermentation run (e.g. `R001002`)
///
/// Surrounding whitespace is trimmed; the remaining text must be 1 to
/// [`RunId::MAX_LENGTH`] characters of ASCII letters, digits, `-` or `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RunId(String);

impl RunId {
    /// Matches the `VARCHAR(64)` column in the database
    pub const MAX_LENGTH: usize = 64;

    pub fn parse(raw: &str) -> Result<Self, RunIdError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(RunIdError::Required);
        }

        if trimmed.len() > Self::MAX_LENGTH {
            return Err(RunIdError::TooLong {
                max_length: Self::MAX_LENGTH,
            });
        }

        if let Some(bad) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(RunIdError::InvalidCharacter(bad));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RunId {
    type Err = RunIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RunId {
    type Error = RunIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RunId> for String {
    fn from(id: RunId) -> Self {
        id.0
    }
}

impl AsRef<str> for RunId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Pump Labels
// ============================================================================

/// Substances the operator assigned to the two pump channels
///
/// Rows whose parameter is exactly `Pump1` or `Pump2` are relabelled with
/// these values during normalization. Every other parameter passes through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PumpLabels {
    pub pump1: String,
    pub pump2: String,
}

impl PumpLabels {
    pub fn new(pump1: impl Into<String>, pump2: impl Into<String>) -> Self {
        Self {
            pump1: pump1.into(),
            pump2: pump2.into(),
        }
    }

    /// Resolve a (trimmed) parameter name to its display label
    pub fn resolve<'a>(&'a self, parameter: &'a str) -> &'a str {
        match parameter {
            PUMP1_PLACEHOLDER => &self.pump1,
            PUMP2_PLACEHOLDER => &self.pump2,
            other => other,
        }
    }
}

impl Default for PumpLabels {
    fn default() -> Self {
        Self::new(DEFAULT_PUMP1_LABEL, DEFAULT_PUMP2_LABEL)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_valid() {
        for raw in ["R001002", "run-7", "batch_2024_03", "a"] {
            let id = RunId::parse(raw).unwrap();
            assert_eq!(id.as_str(), raw);
        }
    }

    #[test]
    fn test_run_id_trims_whitespace() {
        let id: RunId = "  R001002\n".parse().unwrap();
        assert_eq!(id.to_string(), "R001002");
    }

    #[test]
    fn test_run_id_empty() {
        assert_eq!(RunId::parse("   "), Err(RunIdError::Required));
    }

    #[test]
    fn test_run_id_too_long() {
        let raw = "R".repeat(RunId::MAX_LENGTH + 1);
        assert_eq!(
            RunId::parse(&raw),
            Err(RunIdError::TooLong {
                max_length: RunId::MAX_LENGTH
            })
        );
        assert!(RunId::parse(&"R".repeat(RunId::MAX_LENGTH)).is_ok());
    }

    #[test]
    fn test_run_id_invalid_characters() {
        assert_eq!(RunId::parse("R 01"), Err(RunIdError::InvalidCharacter(' ')));
        assert_eq!(RunId::parse("../etc"), Err(RunIdError::InvalidCharacter('.')));
        assert_eq!(RunId::parse("R/1"), Err(RunIdError::InvalidCharacter('/')));
    }

    #[test]
    fn test_run_id_serde_validates() {
        let id: RunId = serde_json::from_str("\"R001002\"").unwrap();
        assert_eq!(id.as_str(), "R001002");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"R001002\"");
        assert!(serde_json::from_str::<RunId>("\"bad id\"").is_err());
    }

    #[test]
    fn test_pump_labels_resolve() {
        let labels = PumpLabels::new("Glycerol", "Acid");
        assert_eq!(labels.resolve("Pump1"), "Glycerol");
        assert_eq!(labels.resolve("Pump2"), "Acid");
        assert_eq!(labels.resolve("pH"), "pH");
        assert_eq!(labels.resolve("pump1"), "pump1");
        assert_eq!(labels.resolve("Pump3"), "Pump3");
    }

    #[test]
    fn test_pump_labels_default_matches_upload_form() {
        let labels = PumpLabels::default();
        assert_eq!(labels.pump1, "Glucose");
        assert_eq!(labels.pump2, "Base");
    }
}
