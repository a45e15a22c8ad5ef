//! Tolerant list decoding.
//!
//! The portal itself always answers `{success, data: [...]}`, but older
//! deployments and third-party mirrors return bare arrays, doubly wrapped
//! `data`, or SQL-driver style `{rows: [...]}`. These helpers accept all of
//! them and never fail on shape.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ClientError;

/// Extract the list from a response body.
///
/// Checked in order: top-level array, array at `data`, array at
/// `data.data`, array at `rows`. Anything else is an empty list.
#[must_use]
pub fn normalize_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            match map.remove("data") {
                Some(Value::Array(items)) => return items,
                Some(Value::Object(mut inner)) => {
                    if let Some(Value::Array(items)) = inner.remove("data") {
                        return items;
                    }
                }
                _ => {}
            }
            match map.remove("rows") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

/// Normalize and decode, skipping elements that do not deserialize as `T`.
#[must_use]
pub fn decode_list<T: DeserializeOwned>(value: Value) -> Vec<T> {
    normalize_list(value)
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping undecodable list element");
                None
            }
        })
        .collect()
}

/// Turn a failed list call into an empty list, logging the failure.
///
/// For public pages that should render with missing sections rather than
/// not at all.
pub fn or_empty<T>(result: Result<Vec<T>, ClientError>, what: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(list = what, error = %e, "List unavailable, showing none");
        Vec::new()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_normalize_shapes() {
        assert_eq!(normalize_list(json!([1, 2])), vec![json!(1), json!(2)]);
        assert_eq!(normalize_list(json!({"data": [1, 2]})), vec![json!(1), json!(2)]);
        assert_eq!(
            normalize_list(json!({"data": {"data": [1, 2]}})),
            vec![json!(1), json!(2)]
        );
        assert!(normalize_list(json!({"foo": "bar"})).is_empty());
    }

    #[test]
    fn test_normalize_rows_and_odd_values() {
        assert_eq!(normalize_list(json!({"rows": [3]})), vec![json!(3)]);
        assert_eq!(
            normalize_list(json!({"success": true, "data": [4]})),
            vec![json!(4)]
        );
        assert!(normalize_list(json!({"data": {"rows": [1]}})).is_empty());
        assert!(normalize_list(json!({"data": "nope"})).is_empty());
        assert!(normalize_list(json!(null)).is_empty());
        assert!(normalize_list(json!("text")).is_empty());
    }

    #[test]
    fn test_decode_list_skips_bad_elements() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Item {
            id: i32,
        }

        let items: Vec<Item> = decode_list(json!({"data": [{"id": 1}, {"id": "x"}, {"id": 3}]}));
        assert_eq!(items, vec![Item { id: 1 }, Item { id: 3 }]);
    }

    #[test]
    fn test_or_empty() {
        let ok: Result<Vec<i32>, ClientError> = Ok(vec![1]);
        assert_eq!(or_empty(ok, "numbers"), vec![1]);

        let failed: Result<Vec<i32>, ClientError> = Err(ClientError::Api {
            status: 500,
            message: "Internal server error".to_owned(),
        });
        assert!(or_empty(failed, "numbers").is_empty());
    }
}
