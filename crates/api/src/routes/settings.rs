//! Site settings handlers.

use axum::{Router, extract::State, routing::get};
use village_portal_core::{HOME_HERO_KEY, HomeHero, HomeHeroDraft};

use super::{ApiJson, ApiResult, ok};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Build the settings router.
pub fn router() -> Router<AppState> {
    Router::new().route("/settings/home-hero", get(home_hero).put(set_home_hero))
}

/// The home page banner; both fields are `null` when unset.
///
/// # Errors
///
/// `500` if the store fails.
pub async fn home_hero(State(state): State<AppState>) -> ApiResult<HomeHero> {
    let value = state.store().get_setting(HOME_HERO_KEY).await?;
    Ok(ok(HomeHero::from_stored(value, state.public_base_url())))
}

/// Set the banner, or clear it with a blank path.
///
/// # Errors
///
/// `500` if the store fails.
pub async fn set_home_hero(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<HomeHeroDraft>,
) -> ApiResult<HomeHero> {
    let value = draft.into_value();
    state
        .store()
        .put_setting(HOME_HERO_KEY, value.as_deref())
        .await?;
    tracing::info!(cleared = value.is_none(), "Home hero updated");
    Ok(ok(HomeHero::from_stored(value, state.public_base_url())))
}
