//! Cash-fund (kas) transactions.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Month, TransactionId, TransactionType};
use crate::validation::{
    ValidationError, optional_parsed, optional_text, required_amount, required_date,
    required_parsed, required_text,
};

/// Upper bound for the `limit` filter.
pub const MAX_LIMIT: u32 = 1000;

/// One income or expense entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceTransaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Always non-negative.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
    pub category: String,
}

impl FinanceTransaction {
    /// Amount with the sign implied by the transaction type.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

/// Finance create/update body.
///
/// `amount` accepts a JSON number or a numeric string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
}

/// Validated finance columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFields {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
    pub category: String,
}

impl TransactionDraft {
    /// Validate the draft.
    ///
    /// # Errors
    ///
    /// Returns the first missing or malformed field.
    pub fn validate(self) -> Result<TransactionFields, ValidationError> {
        Ok(TransactionFields {
            kind: required_parsed(self.kind, "type")?,
            description: required_text(self.description, "description")?,
            category: required_text(self.category, "category")?,
            date: required_date(self.date, "date")?,
            amount: required_amount(self.amount, "amount")?,
        })
    }
}

impl From<TransactionFields> for TransactionDraft {
    fn from(fields: TransactionFields) -> Self {
        Self {
            kind: Some(fields.kind.as_str().to_owned()),
            amount: Some(fields.amount),
            description: Some(fields.description),
            date: Some(fields.date.to_string()),
            category: Some(fields.category),
        }
    }
}

/// Raw `?type=&category=&month=&limit=` query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub month: Option<String>,
    pub limit: Option<String>,
}

impl TransactionQuery {
    /// Parse the query into a filter.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first unparseable parameter.
    pub fn into_filter(self) -> Result<TransactionFilter, ValidationError> {
        let limit: Option<i64> = optional_parsed(self.limit, "limit")?;
        Ok(TransactionFilter {
            kind: optional_parsed(self.kind, "type")?,
            category: optional_text(self.category),
            month: optional_parsed(self.month, "month")?,
            limit: limit.map(clamp_limit),
        })
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_limit(limit: i64) -> u32 {
    limit.clamp(1, i64::from(MAX_LIMIT)) as u32
}

/// Optional constraints on the finance list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    /// Exact category match.
    pub category: Option<String>,
    pub month: Option<Month>,
    /// Already clamped to `1..=MAX_LIMIT`.
    pub limit: Option<u32>,
}

impl TransactionFilter {
    /// Whether the filter has no constraints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether `tx` passes the type, category and month constraints.
    ///
    /// `limit` is not a per-row predicate and is ignored here.
    #[must_use]
    pub fn matches(&self, tx: &FinanceTransaction) -> bool {
        self.kind.is_none_or(|k| k == tx.kind)
            && self.category.as_deref().is_none_or(|c| c == tx.category)
            && self.month.is_none_or(|m| m.contains(tx.date))
    }
}
