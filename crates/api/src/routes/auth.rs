//! Login and current-account handlers.

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use chrono::Utc;
use village_portal_core::{LoginRequest, LoginResponse, PublicUser};

use super::{ApiJson, ApiResult, ok};
use crate::error::ApiError;
use crate::middleware::RequireAdmin;
use crate::services::AuthService;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

/// Exchange username and password for a bearer token.
///
/// The last-login timestamp is written in the background; a failure there
/// is logged and does not affect the response.
///
/// # Errors
///
/// `400` for a blank field, `401` for unknown user or wrong password.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let account = AuthService::new(state.store()).login(request).await?;
    let user = account.public();
    let token = state.tokens().issue(&user)?;

    let store = state.store_handle();
    let account_id = account.id;
    tokio::spawn(async move {
        if let Err(e) = store.record_login(account_id, Utc::now()).await {
            tracing::warn!(account_id = %account_id, error = %e, "Failed to record last login");
        }
    });

    tracing::info!(username = %user.username, "Admin logged in");
    Ok(ok(LoginResponse { token, user }))
}

/// The account behind the presented token.
///
/// # Errors
///
/// `401` if the token is invalid or its account no longer exists.
pub async fn me(
    RequireAdmin(claims): RequireAdmin,
    State(state): State<AppState>,
) -> ApiResult<PublicUser> {
    let id = claims.account_id()?;
    let account = state
        .store()
        .account_by_id(id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("account no longer exists".to_owned()))?;

    Ok(ok(account.public()))
}
