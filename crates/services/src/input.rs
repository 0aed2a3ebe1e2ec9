//! Request field helpers shared by every service.
//!
//! Payload structs keep all fields optional so that a missing field surfaces as a
//! `Validation` error with a field-specific message instead of a generic decode failure.

use std::str::FromStr;

use chrono::NaiveDate;
use domains::{DomainError, Result};
use email_address::EmailAddress;
use uuid::Uuid;

/// Trims the value and treats a blank string as absent.
pub fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned)
}

/// Free text is stored as sent; only an all-whitespace value counts as absent.
pub fn non_empty_text(raw: Option<&str>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty()).map(str::to_owned)
}

/// Parses a path or query identifier.
pub fn parse_id(raw: &str, field: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| DomainError::validation(format!("{field} must be a valid identifier")))
}

/// A required identifier field (body or query).
pub fn required_id(raw: Option<&str>, field: &str) -> Result<Uuid> {
    match non_blank(raw) {
        Some(value) => parse_id(&value, field),
        None => Err(DomainError::validation(format!("{field} is required"))),
    }
}

/// Dates travel as `YYYY-MM-DD`.
pub fn parse_date(raw: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::validation(format!("{field} must be a date in YYYY-MM-DD format")))
}

/// Accepts `local@domain.tld`: at least one dot in the domain part.
pub fn is_valid_email(email: &str) -> bool {
    match EmailAddress::from_str(email) {
        Ok(address) => {
            let domain = address.domain();
            !email.chars().any(char::is_whitespace)
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        Err(_) => false,
    }
}
