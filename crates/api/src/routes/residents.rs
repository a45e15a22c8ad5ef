//! Resident registry handlers.
//!
//! The full list carries personal data and requires a token; statistics and
//! the last-update time are public.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use village_portal_core::{
    Envelope, Resident, ResidentDraft, ResidentId,
    envelope::{Affected, Created},
    report::{LastUpdate, ResidentStats},
};

use super::{ApiJson, ApiPath, ApiResult, created, ok};
use crate::error::ApiError;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Build the residents router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/residents", get(list).post(create))
        .route("/residents/stats", get(stats))
        .route("/residents/last-update", get(last_update))
        .route("/residents/{id}", put(update).delete(remove))
}

/// List every resident, newest first.
///
/// # Errors
///
/// `401` without a token; `500` if the store fails.
pub async fn list(_admin: RequireAdmin, State(state): State<AppState>) -> ApiResult<Vec<Resident>> {
    Ok(ok(state.store().list_residents().await?))
}

/// Register a resident.
///
/// # Errors
///
/// `400` naming the first missing required field.
#[tracing::instrument(skip_all)]
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<ResidentDraft>,
) -> Result<(StatusCode, Json<Envelope<Created<ResidentId>>>), ApiError> {
    let fields = draft.validate()?;
    let id = state.store().create_resident(&fields).await?;
    tracing::info!(resident_id = %id, "Resident created");
    Ok(created(id))
}

/// Overwrite a resident. Unknown ids report `affectedRows: 0`.
///
/// # Errors
///
/// `400` on invalid input.
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ResidentId>,
    ApiJson(draft): ApiJson<ResidentDraft>,
) -> ApiResult<Affected> {
    let fields = draft.validate()?;
    let affected = state.store().update_resident(id, &fields).await?;
    Ok(ok(Affected::new(affected)))
}

/// Delete a resident. Idempotent.
///
/// # Errors
///
/// `500` if the store fails.
pub async fn remove(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ResidentId>,
) -> ApiResult<Affected> {
    let affected = state.store().delete_resident(id).await?;
    Ok(ok(Affected::new(affected)))
}

/// Aggregate counts by sex, RT and category. No personal data.
///
/// # Errors
///
/// `500` if the store fails.
pub async fn stats(State(state): State<AppState>) -> ApiResult<ResidentStats> {
    let residents = state.store().list_residents().await?;
    Ok(ok(ResidentStats::of(&residents)))
}

/// When the registry last changed.
///
/// # Errors
///
/// `500` if the store fails.
pub async fn last_update(State(state): State<AppState>) -> ApiResult<LastUpdate> {
    let last_updated = state.store().residents_last_updated().await?;
    Ok(ok(LastUpdate { last_updated }))
}
