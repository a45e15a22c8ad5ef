//! Resident (warga) records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ResidentId, Sex};
use crate::validation::{
    ValidationError, optional_date, optional_parsed, optional_text, required_text,
};

/// A registered resident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resident {
    pub id: ResidentId,
    pub full_name: String,
    pub sex: Option<Sex>,
    pub birthplace: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub religion: Option<String>,
    pub occupation: Option<String>,
    /// Hamlet (dusun).
    pub hamlet: String,
    pub rw: String,
    pub rt: String,
    /// Household role, e.g. "Kepala Keluarga".
    pub status: Option<String>,
    /// Tenure type, e.g. "Tetap" or "Kontrak".
    pub category: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resident create/update body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentDraft {
    pub full_name: Option<String>,
    pub sex: Option<String>,
    pub birthplace: Option<String>,
    pub birth_date: Option<String>,
    pub religion: Option<String>,
    pub occupation: Option<String>,
    pub hamlet: Option<String>,
    pub rw: Option<String>,
    pub rt: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
}

/// Validated resident columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentFields {
    pub full_name: String,
    pub sex: Option<Sex>,
    pub birthplace: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub religion: Option<String>,
    pub occupation: Option<String>,
    pub hamlet: String,
    pub rw: String,
    pub rt: String,
    pub status: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
}

impl ResidentDraft {
    /// Validate the draft.
    ///
    /// Requires `fullName`, `hamlet`, `rw` and `rt`.
    ///
    /// # Errors
    ///
    /// Returns the first missing or malformed field.
    pub fn validate(self) -> Result<ResidentFields, ValidationError> {
        Ok(ResidentFields {
            full_name: required_text(self.full_name, "fullName")?,
            sex: optional_parsed(self.sex, "sex")?,
            birthplace: optional_text(self.birthplace),
            birth_date: optional_date(self.birth_date, "birthDate")?,
            religion: optional_text(self.religion),
            occupation: optional_text(self.occupation),
            hamlet: required_text(self.hamlet, "hamlet")?,
            rw: required_text(self.rw, "rw")?,
            rt: required_text(self.rt, "rt")?,
            status: optional_text(self.status),
            category: optional_text(self.category),
            address: optional_text(self.address),
        })
    }
}

impl From<ResidentFields> for ResidentDraft {
    fn from(fields: ResidentFields) -> Self {
        Self {
            full_name: Some(fields.full_name),
            sex: fields.sex.map(|s| s.as_str().to_owned()),
            birthplace: fields.birthplace,
            birth_date: fields.birth_date.map(|d| d.to_string()),
            religion: fields.religion,
            occupation: fields.occupation,
            hamlet: Some(fields.hamlet),
            rw: Some(fields.rw),
            rt: Some(fields.rt),
            status: fields.status,
            category: fields.category,
            address: fields.address,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> ResidentDraft {
        ResidentDraft {
            full_name: Some("Siti Aminah".to_string()),
            sex: Some("P".to_string()),
            birth_date: Some("1985-04-21".to_string()),
            hamlet: Some("Krajan".to_string()),
            rw: Some("02".to_string()),
            rt: Some("05".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_complete_draft() {
        let fields = draft().validate().unwrap();
        assert_eq!(fields.full_name, "Siti Aminah");
        assert_eq!(fields.sex, Some(Sex::Female));
        assert_eq!(fields.birth_date, NaiveDate::from_ymd_opt(1985, 4, 21));
        assert_eq!(fields.religion, None);
    }

    #[test]
    fn test_validate_names_missing_locality_field() {
        let mut d = draft();
        d.rt = Some(" ".to_string());
        let err = d.validate().unwrap_err();
        assert_eq!(err.field, "rt");

        let mut d = draft();
        d.hamlet = None;
        assert_eq!(d.validate().unwrap_err().field, "hamlet");
    }

    #[test]
    fn test_validate_rejects_unknown_sex() {
        let mut d = draft();
        d.sex = Some("x".to_string());
        assert_eq!(d.validate().unwrap_err().field, "sex");
    }

    #[test]
    fn test_draft_from_camel_case_json() {
        let d: ResidentDraft = serde_json::from_str(
            r#"{"fullName":"Budi","hamlet":"Krajan","rw":"01","rt":"03","birthDate":""}"#,
        )
        .unwrap();
        let fields = d.validate().unwrap();
        assert_eq!(fields.full_name, "Budi");
        assert_eq!(fields.birth_date, None);
    }

    #[test]
    fn test_fields_round_trip_through_draft() {
        let fields = draft().validate().unwrap();
        let again = ResidentDraft::from(fields.clone()).validate().unwrap();
        assert_eq!(again, fields);
    }
}
