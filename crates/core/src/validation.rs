//! Field-level validation shared by every create/update payload.
//!
//! Payloads arrive as "drafts" whose fields are all optional so that a missing
//! field is reported by name instead of as an opaque deserialization failure.
//! The helpers here turn draft fields into validated values.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// A single invalid or missing field.
///
/// `field` is the camelCase wire name of the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Wire name of the field.
    pub field: &'static str,
    /// Human-readable message, already mentioning the field.
    pub message: String,
}

impl ValidationError {
    /// The field was absent or blank.
    #[must_use]
    pub fn required(field: &'static str) -> Self {
        Self {
            field,
            message: format!("{field} is required"),
        }
    }

    /// The field was present but malformed.
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl std::fmt::Display) -> Self {
        Self {
            field,
            message: format!("{field} {reason}"),
        }
    }
}

/// Trimmed, non-blank text.
///
/// # Errors
///
/// Returns `ValidationError::required` if the value is missing or blank.
pub fn required_text(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    optional_text(value).ok_or_else(|| ValidationError::required(field))
}

/// Trimmed text, with blanks collapsed to `None`.
#[must_use]
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// A required `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns an error if the value is missing, blank, or not a calendar date.
pub fn required_date(
    value: Option<String>,
    field: &'static str,
) -> Result<NaiveDate, ValidationError> {
    optional_date(value, field)?.ok_or_else(|| ValidationError::required(field))
}

/// An optional `YYYY-MM-DD` date. Blank input is treated as absent.
///
/// Timestamps such as `2024-05-01T00:00:00.000Z` are accepted and truncated
/// to their date part, since browser date pickers sometimes send them.
///
/// # Errors
///
/// Returns an error if a non-blank value is not a calendar date.
pub fn optional_date(
    value: Option<String>,
    field: &'static str,
) -> Result<Option<NaiveDate>, ValidationError> {
    let Some(text) = optional_text(value) else {
        return Ok(None);
    };
    let date_part = match text.split_at_checked(10) {
        Some((date, rest)) if rest.starts_with(['T', ' ']) => date,
        _ => text.as_str(),
    };
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ValidationError::invalid(field, "must be a date (YYYY-MM-DD)"))
}

/// Decimal places a stored money column keeps.
pub const MONEY_SCALE: u32 = 2;

/// Exclusive upper bound of a stored money column (`NUMERIC(15, 2)`).
pub const MONEY_LIMIT: Decimal = Decimal::from_parts(1_316_134_912, 2_328, 0, false, 0);

/// A non-negative decimal amount that fits the money columns.
///
/// # Errors
///
/// Returns an error if the value is missing, negative, has more than two
/// decimal places, or is too large to store.
pub fn required_amount(
    value: Option<Decimal>,
    field: &'static str,
) -> Result<Decimal, ValidationError> {
    let amount = value.ok_or_else(|| ValidationError::required(field))?;
    money(amount, field)
}

/// Check a non-negative amount fits `NUMERIC(15, 2)` exactly.
///
/// # Errors
///
/// Returns an error if the amount is negative, has more than two decimal
/// places, or is `MONEY_LIMIT` or more.
pub fn money(amount: Decimal, field: &'static str) -> Result<Decimal, ValidationError> {
    let amount = non_negative(amount, field)?;
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(ValidationError::invalid(
            field,
            format!("must have at most {MONEY_SCALE} decimal places"),
        ));
    }
    if amount >= MONEY_LIMIT {
        return Err(ValidationError::invalid(
            field,
            format!("must be less than {MONEY_LIMIT}"),
        ));
    }
    Ok(amount)
}

/// Reject negative amounts.
///
/// # Errors
///
/// Returns an error if `amount < 0`.
pub fn non_negative(amount: Decimal, field: &'static str) -> Result<Decimal, ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::invalid(field, "must not be negative"));
    }
    Ok(amount)
}

/// Parse a required value through `FromStr`, naming the field on failure.
///
/// # Errors
///
/// Returns an error if the value is missing, blank, or does not parse.
pub fn required_parsed<T: std::str::FromStr>(
    value: Option<String>,
    field: &'static str,
) -> Result<T, ValidationError> {
    optional_parsed(value, field)?.ok_or_else(|| ValidationError::required(field))
}

/// Parse an optional value through `FromStr`. Blank input is treated as absent.
///
/// # Errors
///
/// Returns an error if a non-blank value does not parse.
pub fn optional_parsed<T: std::str::FromStr>(
    value: Option<String>,
    field: &'static str,
) -> Result<Option<T>, ValidationError> {
    optional_text(value)
        .map(|text| {
            text.parse()
                .map_err(|_| ValidationError::invalid(field, format!("has invalid value '{text}'")))
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::TransactionType;

    #[test]
    fn test_required_text_trims() {
        assert_eq!(
            required_text(Some("  Budi  ".to_string()), "fullName").unwrap(),
            "Budi"
        );
    }

    #[test]
    fn test_required_text_rejects_blank() {
        let err = required_text(Some("   ".to_string()), "fullName").unwrap_err();
        assert_eq!(err.field, "fullName");
        assert_eq!(err.to_string(), "fullName is required");

        let err = required_text(None, "rt").unwrap_err();
        assert_eq!(err.field, "rt");
    }

    #[test]
    fn test_optional_date() {
        assert_eq!(optional_date(Some(String::new()), "birthDate").unwrap(), None);
        assert_eq!(
            optional_date(Some("2024-08-17".to_string()), "birthDate").unwrap(),
            NaiveDate::from_ymd_opt(2024, 8, 17)
        );
        assert_eq!(
            optional_date(Some("2024-08-17T00:00:00.000Z".to_string()), "date").unwrap(),
            NaiveDate::from_ymd_opt(2024, 8, 17)
        );
        assert_eq!(
            optional_date(Some("2024-08-17 08:30".to_string()), "date").unwrap(),
            NaiveDate::from_ymd_opt(2024, 8, 17)
        );
        let err = optional_date(Some("17/08/2024".to_string()), "date").unwrap_err();
        assert_eq!(err.field, "date");
    }

    #[test]
    fn test_optional_date_rejects_trailing_garbage() {
        for text in ["2024-08-17xyz", "2024-08-170", "2024-08-17Z"] {
            let err = optional_date(Some(text.to_string()), "birthDate").unwrap_err();
            assert_eq!(err.field, "birthDate", "{text}");
        }
    }

    #[test]
    fn test_required_amount() {
        assert_eq!(
            required_amount(Some(Decimal::new(100_000, 0)), "amount").unwrap(),
            Decimal::new(100_000, 0)
        );
        assert!(required_amount(Some(Decimal::ZERO), "amount").is_ok());

        let err = required_amount(Some(Decimal::new(-1, 0)), "amount").unwrap_err();
        assert_eq!(err.to_string(), "amount must not be negative");

        let err = required_amount(None, "amount").unwrap_err();
        assert_eq!(err.to_string(), "amount is required");
    }

    #[test]
    fn test_money_fits_numeric_15_2() {
        assert_eq!(MONEY_LIMIT, Decimal::new(10_000_000_000_000, 0));

        let largest = "9999999999999.99".parse::<Decimal>().unwrap();
        assert_eq!(money(largest, "amount").unwrap(), largest);
        // Trailing zeros beyond two places are not extra precision
        assert!(money("12.500".parse().unwrap(), "amount").is_ok());

        let err = required_amount(Some("12345678901234.567".parse().unwrap()), "amount").unwrap_err();
        assert_eq!(err.field, "amount");

        let err = money("10.005".parse().unwrap(), "budget").unwrap_err();
        assert_eq!(err.to_string(), "budget must have at most 2 decimal places");

        let err = money(MONEY_LIMIT, "amount").unwrap_err();
        assert_eq!(err.to_string(), "amount must be less than 10000000000000");
    }

    #[test]
    fn test_required_parsed() {
        let t: TransactionType = required_parsed(Some("pemasukan".to_string()), "type").unwrap();
        assert_eq!(t, TransactionType::Income);

        let err = required_parsed::<TransactionType>(Some("gift".to_string()), "type").unwrap_err();
        assert_eq!(err.field, "type");
        assert!(err.message.contains("gift"));
    }
}
