//! # Validation Module
//!
//! Pre-flight checks for sales files plus small field validators.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: validate_csv (THIS MODULE)                                   │
//! │  ├── Required headers present                                          │
//! │  ├── At least one data row                                             │
//! │  └── Spot-check of the first N rows                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Import (tally-interchange)                                   │
//! │  ├── Header set re-checked before any row                              │
//! │  └── Every row decoded; bad rows fail individually                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::validate_csv;
//!
//! let report = validate_csv("store_name,quantity\nMain,1\n", 5);
//! assert!(!report.is_valid);
//! assert_eq!(report.errors, vec!["Missing required headers: sale_date"]);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::codec::{missing_headers_message, SaleRowReader};
use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted company name.
pub const MAX_COMPANY_NAME_LEN: usize = 200;

// =============================================================================
// CSV Pre-flight
// =============================================================================

/// Outcome of [`validate_csv`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        ValidationReport {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Checks a sales file's shape without decoding every row.
///
/// ## Rules
/// - `sale_date` must be among the headers
/// - the file must contain at least one data row
/// - each of the first `sample_rows` rows must have a non-blank `sale_date`
///
/// Never fails: reader errors become a single `CSV parsing error: ...`
/// message. When the header itself is missing, the per-row date check is
/// skipped since every row would trip it.
pub fn validate_csv<B: AsRef<[u8]> + ?Sized>(input: &B, sample_rows: usize) -> ValidationReport {
    match check_csv(input.as_ref(), sample_rows) {
        Ok(errors) => ValidationReport::from_errors(errors),
        Err(e) => ValidationReport::from_errors(vec![e.to_string()]),
    }
}

fn check_csv(input: &[u8], sample_rows: usize) -> crate::CoreResult<Vec<String>> {
    let mut reader = SaleRowReader::new(input)?;
    let mut errors = Vec::new();

    let missing = reader.missing_required_headers();
    let has_date_column = missing.is_empty();
    if !has_date_column {
        errors.push(missing_headers_message(&missing));
    }

    let mut seen = 0usize;
    for (index, row) in reader.rows().take(sample_rows.max(1)).enumerate() {
        let row = row?;
        seen += 1;

        // Row 1 is the header line.
        if has_date_column && index < sample_rows && row.sale_date.trim().is_empty() {
            errors.push(format!("Row {}: sale_date cannot be empty", index + 2));
        }
    }

    if seen == 0 {
        errors.push("CSV file contains no data rows".to_string());
    }

    Ok(errors)
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a company name.
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_company_name;
///
/// assert_eq!(validate_company_name("  Acme  ").unwrap(), "Acme");
/// assert!(validate_company_name("").is_err());
/// ```
pub fn validate_company_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "company name".to_string(),
        });
    }

    if name.chars().count() > MAX_COMPANY_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "company name".to_string(),
            max: MAX_COMPANY_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Parses a `YYYY-MM-DD` date argument.
pub fn parse_date(field: &str, raw: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), crate::codec::DATE_FORMAT).map_err(|e| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("expected YYYY-MM-DD ({})", e),
        }
    })
}

/// Rejects a range whose start falls after its end. Open ends always pass.
pub fn validate_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> ValidationResult<()> {
    match (start, end) {
        (Some(s), Some(e)) if s > e => Err(ValidationError::InvertedRange {
            start: s.to_string(),
            end: e.to_string(),
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
