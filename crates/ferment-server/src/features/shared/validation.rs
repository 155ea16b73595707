//! Shared validation utilities
//!
//! Form fields from the dashboard arrive as free text. Run identifiers are
//! validated by [`ferment_common::types::RunId`]; everything else goes
//! through the helpers here.
//!
//! # Examples
//!
//! ```rust,ignore
//! use ferment_server::features::shared::validation::{non_blank, validate_label};
//!
//! let pump1 = non_blank(form.pump1).unwrap_or_else(|| "Glucose".to_string());
//! validate_label(&pump1, "pump1", 100)?;
//! ```

use thiserror::Error;

/// Errors that can occur during label validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LabelValidationError {
    #[error("{field_name} is required and cannot be empty")]
    Required { field_name: String },

    #[error("{field_name} must be between 1 and {max_length} characters")]
    TooLong {
        field_name: String,
        max_length: usize,
    },

    #[error("{field_name} must not contain NUL characters")]
    ContainsNul { field_name: String },
}

/// Trim an optional form value, treating blank as absent
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate a free-text label
///
/// # Rules
/// - Must not be empty (after trimming whitespace)
/// - Must not exceed max_length characters
/// - Must not contain `\0` (text columns cannot store it)
///
/// # Arguments
/// * `value` - The label to validate
/// * `field_name` - Name of the field (for error messages)
/// * `max_length` - Maximum allowed length in characters
pub fn validate_label(
    value: &str,
    field_name: &str,
    max_length: usize,
) -> Result<(), LabelValidationError> {
    if value.trim().is_empty() {
        return Err(LabelValidationError::Required {
            field_name: field_name.to_string(),
        });
    }

    if value.chars().count() > max_length {
        return Err(LabelValidationError::TooLong {
            field_name: field_name.to_string(),
            max_length,
        });
    }

    if value.contains('\0') {
        return Err(LabelValidationError::ContainsNul {
            field_name: field_name.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  Glucose ".to_string())), Some("Glucose".to_string()));
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_validate_label_accepts_normal_text() {
        assert!(validate_label("Glucose", "pump1", 100).is_ok());
        assert!(validate_label("Natronlauge 25 %", "pump2", 100).is_ok());
    }

    #[test]
    fn test_validate_label_rejects_blank() {
        assert_eq!(
            validate_label("  ", "pump1", 100),
            Err(LabelValidationError::Required {
                field_name: "pump1".to_string()
            })
        );
    }

    #[test]
    fn test_validate_label_counts_characters_not_bytes() {
        let label = "é".repeat(100);
        assert!(validate_label(&label, "pump1", 100).is_ok());

        let err = validate_label(&"a".repeat(101), "pump1", 100).unwrap_err();
        assert_eq!(err.to_string(), "pump1 must be between 1 and 100 characters");
    }

    #[test]
    fn test_validate_label_rejects_nul() {
        assert_eq!(
            validate_label("Glu\0cose", "pump1", 100),
            Err(LabelValidationError::ContainsNul {
                field_name: "pump1".to_string()
            })
        );
    }
}
