//! Organizational roster (kepengurusan) handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use village_portal_core::{
    Envelope, ReorderRequest, RosterDraft, RosterMember, RosterMemberId,
    envelope::{Affected, Created},
};

use super::{ApiJson, ApiPath, ApiResult, created, ok};
use crate::db::RosterQuery;
use crate::error::ApiError;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Active members shown on the home page.
pub const PREVIEW_LIMIT: u32 = 6;

/// Build the roster router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/kepengurusan", get(list).post(create))
        .route("/kepengurusan/order", put(reorder))
        .route("/kepengurusan/{id}", put(update).delete(remove))
        .route("/kepengurusan-preview", get(preview))
}

/// Every member, active or not, in display order.
///
/// # Errors
///
/// `500` if the store fails.
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<RosterMember>> {
    Ok(ok(state.store().list_roster(RosterQuery::default()).await?))
}

/// The first active members in display order.
///
/// # Errors
///
/// `500` if the store fails.
pub async fn preview(State(state): State<AppState>) -> ApiResult<Vec<RosterMember>> {
    let query = RosterQuery {
        active_only: true,
        limit: Some(PREVIEW_LIMIT),
    };
    Ok(ok(state.store().list_roster(query).await?))
}

/// Add a member.
///
/// # Errors
///
/// `400` naming the first missing field.
#[tracing::instrument(skip_all)]
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<RosterDraft>,
) -> Result<(StatusCode, Json<Envelope<Created<RosterMemberId>>>), ApiError> {
    let fields = draft.validate()?;
    let id = state.store().create_roster_member(&fields).await?;
    tracing::info!(member_id = %id, role = %fields.role, "Roster member created");
    Ok(created(id))
}

/// Overwrite a member.
///
/// # Errors
///
/// `400` on invalid input.
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RosterMemberId>,
    ApiJson(draft): ApiJson<RosterDraft>,
) -> ApiResult<Affected> {
    let fields = draft.validate()?;
    let affected = state.store().update_roster_member(id, &fields).await?;
    Ok(ok(Affected::new(affected)))
}

/// Remove a member. Idempotent.
///
/// # Errors
///
/// `500` if the store fails.
pub async fn remove(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RosterMemberId>,
) -> ApiResult<Affected> {
    let affected = state.store().delete_roster_member(id).await?;
    Ok(ok(Affected::new(affected)))
}

/// Set several display orders at once. All or nothing.
///
/// # Errors
///
/// `500` if the store fails; no order is changed in that case.
#[tracing::instrument(skip_all)]
pub async fn reorder(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ReorderRequest>,
) -> ApiResult<Affected> {
    let affected = state.store().reorder_roster(&request.orders).await?;
    tracing::info!(requested = request.orders.len(), affected, "Roster reordered");
    Ok(ok(Affected::new(affected)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::routes::test_support::TestApp;

    async fn add(app: &TestApp, name: &str, order: Value, active: bool) -> Value {
        let body = json!({"fullName": name, "role": "Anggota", "displayOrder": order, "active": active});
        let (status, json) = app.json("POST", "/api/kepengurusan", &body, true).await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["data"]["id"].clone()
    }

    fn names(json: &Value) -> Vec<&str> {
        json["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["fullName"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_display_order_nulls_last_ties_newest_first() {
        let app = TestApp::new().await;
        add(&app, "Tanpa urutan A", Value::Null, true).await;
        add(&app, "Ketua", json!(1), true).await;
        add(&app, "Sekretaris", json!(2), true).await;
        add(&app, "Bendahara", json!(2), true).await;
        add(&app, "Tanpa urutan B", Value::Null, true).await;

        let (_, json) = app.get("/api/kepengurusan").await;
        assert_eq!(
            names(&json),
            ["Ketua", "Bendahara", "Sekretaris", "Tanpa urutan B", "Tanpa urutan A"]
        );
    }

    #[tokio::test]
    async fn test_preview_active_only_capped() {
        let app = TestApp::new().await;
        for i in 0..8 {
            add(&app, &format!("Anggota {i}"), json!(i), i != 0).await;
        }
        let (_, json) = app.get("/api/kepengurusan-preview").await;
        let names = names(&json);
        assert_eq!(names.len(), 6);
        assert_eq!(names[0], "Anggota 1");
        assert!(!names.contains(&"Anggota 0"));
    }

    #[tokio::test]
    async fn test_reorder_swaps_in_one_call() {
        let app = TestApp::new().await;
        let ketua = add(&app, "Ketua", json!(1), true).await;
        let wakil = add(&app, "Wakil", json!(2), true).await;

        let body = json!({"orders": [
            {"id": ketua, "displayOrder": 2},
            {"id": wakil, "displayOrder": 1},
            {"id": 9999, "displayOrder": 3}
        ]});
        let (status, json) = app.json("PUT", "/api/kepengurusan/order", &body, true).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["affectedRows"], 2);

        let (_, json) = app.get("/api/kepengurusan").await;
        assert_eq!(names(&json), ["Wakil", "Ketua"]);
    }

    #[tokio::test]
    async fn test_reorder_requires_token() {
        let app = TestApp::new().await;
        let (status, _) = app
            .json("PUT", "/api/kepengurusan/order", &json!({"orders": []}), false)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_requires_role() {
        let app = TestApp::new().await;
        let (status, json) = app
            .json("POST", "/api/kepengurusan", &json!({"fullName": "Tanpa jabatan"}), true)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "role is required");
    }
}
