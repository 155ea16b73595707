//! Row parser for controller CSV exports
//!
//! # Format
//!
//! ```text
//! time | tag | parameter | tag | value | tag | unit
//! 1.0,x,Pump1,y,2.5,z,mg/L
//! ```
//!
//! Only indices 0, 2, 4 and 6 are read; the others are ignored. Fields are
//! split on every comma with no quoting rules.
//!
//! Numeric fields are read up to the end of their leading number, so unit
//! suffixes such as `12.5min` or `7.2 %` still parse. The timestamp is strict
//! (no leading number drops the line) while the process value is lenient (it
//! becomes `0`). That asymmetry is long-standing behavior that stored data
//! already depends on.

use ferment_common::types::{PumpLabels, UNKNOWN_LABEL};
use thiserror::Error;

use crate::models::NormalizedRecord;

const TIME_FIELD: usize = 0;
const PARAMETER_FIELD: usize = 2;
const VALUE_FIELD: usize = 4;
const UNIT_FIELD: usize = 6;

/// Lines shorter than this carry no parameter column at all
pub const MIN_FIELDS: usize = 4;

/// Why a line was left out of the batch
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RowRejection {
    #[error("expected at least 4 fields, got {found}")]
    TooFewFields { found: usize },

    #[error("timestamp '{0}' is not a finite number")]
    InvalidTimestamp(String),
}

/// Parse one data line
///
/// Returns the normalized record, or the reason the line must be dropped.
/// Pure: the same line and labels always give the same result.
pub fn parse_row(line: &str, labels: &PumpLabels) -> Result<NormalizedRecord, RowRejection> {
    let fields: Vec<&str> = line.split(',').collect();

    if fields.len() < MIN_FIELDS {
        return Err(RowRejection::TooFewFields {
            found: fields.len(),
        });
    }

    let raw_time = fields[TIME_FIELD].trim();
    let time_stamp =
        parse_finite(raw_time).ok_or_else(|| RowRejection::InvalidTimestamp(raw_time.to_string()))?;

    let parameter = labels
        .resolve(&text_field(&fields, PARAMETER_FIELD))
        .to_string();

    let process_value = fields
        .get(VALUE_FIELD)
        .and_then(|raw| parse_finite(raw.trim()))
        .unwrap_or(0.0);

    let unit = text_field(&fields, UNIT_FIELD);

    Ok(NormalizedRecord {
        time_stamp,
        parameter,
        process_value,
        unit,
    })
}

/// Trimmed text at `index` with NUL bytes removed, or [`UNKNOWN_LABEL`] when
/// missing or blank
fn text_field(fields: &[&str], index: usize) -> String {
    let text = fields
        .get(index)
        .map(|f| f.replace('\0', ""))
        .unwrap_or_default();

    match text.trim() {
        "" => UNKNOWN_LABEL.to_string(),
        trimmed => trimmed.to_string(),
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    numeric_prefix(raw)?.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Longest leading `[+-]digits[.digits][(e|E)[+-]digits]` of `raw`
///
/// At least one mantissa digit is required. An exponent marker without
/// digits after it is not part of the number.
fn numeric_prefix(raw: &str) -> Option<&str> {
    let bytes = raw.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        end = frac_end;
    }

    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    Some(&raw[..end])
}
