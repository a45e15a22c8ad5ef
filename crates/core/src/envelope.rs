//! JSON response envelope.
//!
//! Every `/api` response has the shape `{"success": true, "data": ...}` or
//! `{"success": false, "error": "..."}`.

use serde::{Deserialize, Serialize};

/// Response wrapper shared by the server and the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful response carrying `data`.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed response carrying an error message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Convert into a `Result`, using the error text (or a generic message)
    /// for failures.
    ///
    /// # Errors
    ///
    /// Returns the envelope's error message when `success` is false or no
    /// data is present.
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err("response carried no data".to_owned()),
            (false, _) => Err(self.error.unwrap_or_else(|| "request failed".to_owned())),
        }
    }
}

/// Result of a create: the store-assigned id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created<Id> {
    pub id: Id,
}

/// Result of an update or delete.
///
/// `affected_rows` is 0 when the target id does not exist, which is still a
/// successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Affected {
    pub affected_rows: u64,
}

impl Affected {
    #[must_use]
    pub const fn new(affected_rows: u64) -> Self {
        Self { affected_rows }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ResidentId;

    #[test]
    fn test_ok_omits_error() {
        let json = serde_json::to_value(Envelope::ok(Created {
            id: ResidentId::new(9),
        }))
        .unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": {"id": 9}}));
    }

    #[test]
    fn test_failure_omits_data() {
        let json = serde_json::to_value(Envelope::<()>::failure("rt is required")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "rt is required"})
        );
    }

    #[test]
    fn test_affected_rows_wire_name() {
        let json = serde_json::to_string(&Affected::new(0)).unwrap();
        assert_eq!(json, r#"{"affectedRows":0}"#);
    }

    #[test]
    fn test_into_result() {
        let env: Envelope<Affected> =
            serde_json::from_str(r#"{"success":true,"data":{"affectedRows":1}}"#).unwrap();
        assert_eq!(env.into_result().unwrap().affected_rows, 1);

        let env: Envelope<Affected> =
            serde_json::from_str(r#"{"success":false,"error":"Unauthorized"}"#).unwrap();
        assert_eq!(env.into_result().unwrap_err(), "Unauthorized");
    }
}
