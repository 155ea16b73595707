//! Shared utilities for feature modules

pub mod validation;

pub use validation::{non_blank, validate_label, LabelValidationError};
