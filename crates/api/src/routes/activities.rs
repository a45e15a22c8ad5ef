//! Activity (kegiatan) handlers, plus the news and agenda projections.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use village_portal_core::{
    Activity, ActivityDraft, ActivityId, Envelope,
    envelope::{Affected, Created},
    projection::{self, Event, Post},
};

use super::{ApiJson, ApiPath, ApiResult, created, ok};
use crate::error::ApiError;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Activities shown on the home page.
pub const PREVIEW_LIMIT: u32 = 3;

/// Build the activities router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/kegiatan", get(list).post(create))
        .route("/kegiatan/{id}", put(update).delete(remove))
        .route("/kegiatan-preview", get(preview))
        .route("/berita", get(posts))
        .route("/agenda", get(agenda))
}

/// All activities, newest date first.
///
/// # Errors
///
/// `500` if the store fails.
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Activity>> {
    Ok(ok(state.store().list_activities(None).await?))
}

/// The latest few activities.
///
/// # Errors
///
/// `500` if the store fails.
pub async fn preview(State(state): State<AppState>) -> ApiResult<Vec<Activity>> {
    Ok(ok(state.store().list_activities(Some(PREVIEW_LIMIT)).await?))
}

/// Activities as news posts, newest first, with resolved image URLs.
///
/// # Errors
///
/// `500` if the store fails.
pub async fn posts(State(state): State<AppState>) -> ApiResult<Vec<Post>> {
    let activities = state.store().list_activities(None).await?;
    Ok(ok(projection::news(&activities, state.public_base_url())))
}

/// Planned and in-progress activities as agenda events, soonest first.
///
/// # Errors
///
/// `500` if the store fails.
pub async fn agenda(State(state): State<AppState>) -> ApiResult<Vec<Event>> {
    let activities = state.store().list_activities(None).await?;
    Ok(ok(projection::agenda(&activities)))
}

/// Create an activity.
///
/// # Errors
///
/// `400` naming the first missing or invalid field.
#[tracing::instrument(skip_all)]
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<ActivityDraft>,
) -> Result<(StatusCode, Json<Envelope<Created<ActivityId>>>), ApiError> {
    let fields = draft.validate()?;
    let id = state.store().create_activity(&fields).await?;
    tracing::info!(activity_id = %id, "Activity created");
    Ok(created(id))
}

/// Overwrite an activity.
///
/// # Errors
///
/// `400` on invalid input.
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ActivityId>,
    ApiJson(draft): ApiJson<ActivityDraft>,
) -> ApiResult<Affected> {
    let fields = draft.validate()?;
    let affected = state.store().update_activity(id, &fields).await?;
    Ok(ok(Affected::new(affected)))
}

/// Delete an activity. Idempotent.
///
/// # Errors
///
/// `500` if the store fails.
pub async fn remove(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ActivityId>,
) -> ApiResult<Affected> {
    let affected = state.store().delete_activity(id).await?;
    Ok(ok(Affected::new(affected)))
}
