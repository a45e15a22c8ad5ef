//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness
//! GET  /health/ready                 - Readiness (store ping)
//! GET  /uploads/*                    - Uploaded images (read-only)
//!
//! # Auth
//! POST /api/auth/login               - Exchange credentials for a token
//! GET  /api/auth/me                  - Current account (auth)
//!
//! # Residents
//! GET  /api/residents                - Full registry (auth)
//! POST /api/residents                - Create (auth)
//! PUT  /api/residents/{id}           - Update (auth)
//! DELETE /api/residents/{id}         - Delete (auth)
//! GET  /api/residents/stats          - Aggregate counts
//! GET  /api/residents/last-update    - Latest change timestamp
//!
//! # Finance
//! GET  /api/keuangan                 - Filtered list (?type, category, month, limit)
//! GET  /api/keuangan/all             - Unfiltered list
//! GET  /api/keuangan/summary         - Totals, per-category and per-month
//! POST /api/keuangan                 - Create (auth)
//! PUT/DELETE /api/keuangan/{id}      - Update / delete (auth)
//!
//! # Activities
//! GET  /api/kegiatan                 - All activities
//! GET  /api/kegiatan-preview         - Latest three
//! GET  /api/berita                   - News posts
//! GET  /api/agenda                   - Upcoming events
//! POST /api/kegiatan                 - Create (auth)
//! PUT/DELETE /api/kegiatan/{id}      - Update / delete (auth)
//!
//! # Roster
//! GET  /api/kepengurusan             - All members in display order
//! GET  /api/kepengurusan-preview     - First six active members
//! POST /api/kepengurusan             - Create (auth)
//! PUT  /api/kepengurusan/order       - Batch reorder (auth)
//! PUT/DELETE /api/kepengurusan/{id}  - Update / delete (auth)
//!
//! # Settings and uploads
//! GET  /api/settings/home-hero       - Home banner
//! PUT  /api/settings/home-hero       - Set or clear the banner (auth)
//! POST /api/upload/{destination}     - Multipart image upload (auth)
//! ```
//!
//! Every `/api` response, including unmatched paths, is the
//! `{success, data | error}` envelope.

pub mod activities;
pub mod auth;
pub mod finance;
pub mod residents;
pub mod roster;
pub mod settings;
pub mod upload;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, FromRequest, FromRequestParts, OriginalUri, State},
    http::StatusCode,
    routing::get,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use village_portal_core::{Envelope, envelope::Created};

use crate::error::ApiError;
use crate::middleware::{
    cors_layer, make_request_span, record_response, security_headers_middleware,
};
use crate::services::upload::PUBLIC_PREFIX;
use crate::state::AppState;

/// JSON body extractor whose rejections render as the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections render as the error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path extractor whose rejections render as the error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Handler result carrying `{success: true, data}`.
pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

/// Wrap `data` in a success envelope.
pub const fn ok<T>(data: T) -> Json<Envelope<T>> {
    Json(Envelope::ok(data))
}

/// `201 Created` with `{id}`.
pub const fn created<Id>(id: Id) -> (StatusCode, Json<Envelope<Created<Id>>>) {
    (StatusCode::CREATED, Json(Envelope::ok(Created { id })))
}

/// Every `/api` route.
pub fn api_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(residents::router())
        .merge(finance::router())
        .merge(activities::router())
        .merge(roster::router())
        .merge(settings::router())
        .merge(upload::router(state.config().upload_max_bytes))
        .fallback(not_found)
}

/// The complete application, minus the Sentry layers added by the binary.
pub fn app(state: AppState) -> Router {
    let config = state.config();
    let uploads = ServeDir::new(&config.upload_dir);
    let body_limit = DefaultBodyLimit::max(config.json_body_limit);
    let cors = cors_layer(config.cors_origin.as_deref());
    let api = api_router(&state);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api)
        .nest_service(PUBLIC_PREFIX, uploads)
        .layer(body_limit)
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_request_span)
                .on_response(record_response),
        )
        .with_state(state)
}

async fn not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound(uri.path().to_owned())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{StatusCode, header};

    use super::test_support::TestApp;

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new().await;
        let response = tower::ServiceExt::oneshot(
            app.router.clone(),
            axum::http::Request::get("/health")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (status, _) = app.get("/health/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_api_path_is_enveloped_404() {
        let app = TestApp::new().await;
        let (status, json) = app.get("/api/tidak-ada").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "Not found: /api/tidak-ada"})
        );
    }

    #[tokio::test]
    async fn test_malformed_json_is_enveloped_400() {
        let app = TestApp::new().await;
        let request = axum::http::Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap();
        let (status, json) = app.send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_oversized_json_is_413() {
        let app = TestApp::new().await;
        let big = "x".repeat(128 * 1024);
        let (status, json) = app
            .json(
                "POST",
                "/api/auth/login",
                &serde_json::json!({"username": big, "password": "x"}),
                false,
            )
            .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_security_headers_present() {
        let app = TestApp::new().await;
        let response = tower::ServiceExt::oneshot(
            app.router.clone(),
            axum::http::Request::get("/api/kegiatan")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    }
}
