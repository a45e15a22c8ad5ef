//! Activities (kegiatan).
//!
//! One entity backs both the news feed and the agenda; see
//! [`crate::projection`] for the two read views.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ActivityId, ActivityStatus};
use crate::validation::{
    ValidationError, money, optional_parsed, optional_text, required_date, required_text,
};

/// A village activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    pub title: String,
    pub date: NaiveDate,
    pub location: Option<String>,
    pub status: ActivityStatus,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub budget: Option<Decimal>,
    /// Absolute URL or `/uploads/...` path.
    pub image: Option<String>,
    pub description: Option<String>,
}

/// Activity create/update body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDraft {
    pub title: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub budget: Option<Decimal>,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// Validated activity columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityFields {
    pub title: String,
    pub date: NaiveDate,
    pub location: Option<String>,
    pub status: ActivityStatus,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub budget: Option<Decimal>,
    pub image: Option<String>,
    pub description: Option<String>,
}

impl ActivityDraft {
    /// Validate the draft. A missing status defaults to `planned`.
    ///
    /// # Errors
    ///
    /// Returns the first missing or malformed field.
    pub fn validate(self) -> Result<ActivityFields, ValidationError> {
        Ok(ActivityFields {
            title: required_text(self.title, "title")?,
            date: required_date(self.date, "date")?,
            location: optional_text(self.location),
            status: optional_parsed(self.status, "status")?.unwrap_or_default(),
            budget: self
                .budget
                .map(|b| money(b, "budget"))
                .transpose()?,
            image: optional_text(self.image),
            description: optional_text(self.description),
        })
    }
}

impl From<ActivityFields> for ActivityDraft {
    fn from(fields: ActivityFields) -> Self {
        Self {
            title: Some(fields.title),
            date: Some(fields.date.to_string()),
            location: fields.location,
            status: Some(fields.status.as_str().to_owned()),
            budget: fields.budget,
            image: fields.image,
            description: fields.description,
        }
    }
}
