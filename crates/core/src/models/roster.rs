//! Organizational roster (kepengurusan).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::RosterMemberId;
use crate::validation::{ValidationError, optional_text, required_text};

/// An office-holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterMember {
    pub id: RosterMemberId,
    pub full_name: String,
    /// Academic degree or honorific.
    pub degree: Option<String>,
    pub role: String,
    /// Term of office, e.g. "2023-2026".
    pub term: Option<String>,
    pub image: Option<String>,
    pub display_order: Option<i32>,
    pub active: bool,
}

impl RosterMember {
    /// Roster display order: `display_order` ascending with unset orders
    /// last, ties broken by newest id first.
    #[must_use]
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        match (self.display_order, other.display_order) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| other.id.cmp(&self.id))
    }
}

/// Roster create/update body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterDraft {
    pub full_name: Option<String>,
    pub degree: Option<String>,
    pub role: Option<String>,
    pub term: Option<String>,
    pub image: Option<String>,
    pub display_order: Option<i32>,
    pub active: Option<bool>,
}

/// Validated roster columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterFields {
    pub full_name: String,
    pub degree: Option<String>,
    pub role: String,
    pub term: Option<String>,
    pub image: Option<String>,
    pub display_order: Option<i32>,
    pub active: bool,
}

impl RosterDraft {
    /// Validate the draft. Members are active unless stated otherwise.
    ///
    /// # Errors
    ///
    /// Returns the first missing field.
    pub fn validate(self) -> Result<RosterFields, ValidationError> {
        Ok(RosterFields {
            full_name: required_text(self.full_name, "fullName")?,
            degree: optional_text(self.degree),
            role: required_text(self.role, "role")?,
            term: optional_text(self.term),
            image: optional_text(self.image),
            display_order: self.display_order,
            active: self.active.unwrap_or(true),
        })
    }
}

impl From<RosterFields> for RosterDraft {
    fn from(fields: RosterFields) -> Self {
        Self {
            full_name: Some(fields.full_name),
            degree: fields.degree,
            role: Some(fields.role),
            term: fields.term,
            image: fields.image,
            display_order: fields.display_order,
            active: Some(fields.active),
        }
    }
}

/// One entry of a batch reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterOrder {
    pub id: RosterMemberId,
    pub display_order: Option<i32>,
}

/// Body of `PUT /api/kepengurusan/order`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderRequest {
    #[serde(default)]
    pub orders: Vec<RosterOrder>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn member(id: i32, order: Option<i32>) -> RosterMember {
        RosterMember {
            id: RosterMemberId::new(id),
            full_name: format!("Pengurus {id}"),
            degree: None,
            role: "Anggota".to_string(),
            term: None,
            image: None,
            display_order: order,
            active: true,
        }
    }

    #[test]
    fn test_display_cmp_nulls_last_ties_newest_first() {
        let mut members = vec![
            member(1, None),
            member(2, Some(2)),
            member(3, Some(1)),
            member(4, None),
            member(5, Some(1)),
        ];
        members.sort_by(RosterMember::display_cmp);
        let ids: Vec<i32> = members.iter().map(|m| m.id.as_i32()).collect();
        assert_eq!(ids, vec![5, 3, 2, 4, 1]);
    }

    #[test]
    fn test_validate_defaults_active() {
        let fields = RosterDraft {
            full_name: Some("Ahmad".to_string()),
            role: Some("Ketua RT".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert!(fields.active);
        assert_eq!(fields.display_order, None);
    }

    #[test]
    fn test_validate_requires_role() {
        let err = RosterDraft {
            full_name: Some("Ahmad".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field, "role");
    }

    #[test]
    fn test_reorder_request_wire_format() {
        let req: ReorderRequest =
            serde_json::from_str(r#"{"orders":[{"id":4,"displayOrder":1},{"id":2,"displayOrder":null}]}"#)
                .unwrap();
        assert_eq!(req.orders.len(), 2);
        assert_eq!(req.orders[0].id, RosterMemberId::new(4));
        assert_eq!(req.orders[1].display_order, None);
    }
}
