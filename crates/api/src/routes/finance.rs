//! Cash-fund (keuangan) handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use village_portal_core::{
    Envelope, FinanceTransaction, TransactionDraft, TransactionFilter, TransactionId,
    TransactionQuery,
    envelope::{Affected, Created},
    report::FinanceReport,
};

use super::{ApiJson, ApiPath, ApiQuery, ApiResult, created, ok};
use crate::error::ApiError;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Build the finance router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/keuangan", get(list).post(create))
        .route("/keuangan/all", get(list_all))
        .route("/keuangan/summary", get(summary))
        .route("/keuangan/{id}", put(update).delete(remove))
}

/// Transactions matching the optional `type`, `category`, `month` and
/// `limit` query parameters, newest first.
///
/// # Errors
///
/// `400` if a filter value is malformed.
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TransactionQuery>,
) -> ApiResult<Vec<FinanceTransaction>> {
    let filter = query.into_filter()?;
    Ok(ok(state.store().list_transactions(&filter).await?))
}

/// Every transaction, newest first.
///
/// # Errors
///
/// `500` if the store fails.
pub async fn list_all(State(state): State<AppState>) -> ApiResult<Vec<FinanceTransaction>> {
    let filter = TransactionFilter::default();
    Ok(ok(state.store().list_transactions(&filter).await?))
}

/// Totals, per-category and per-month breakdowns over the filtered set.
///
/// `limit` is ignored: a summary over a truncated list would be misleading.
///
/// # Errors
///
/// `400` if a filter value is malformed.
pub async fn summary(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TransactionQuery>,
) -> ApiResult<FinanceReport> {
    let filter = TransactionFilter {
        limit: None,
        ..query.into_filter()?
    };
    let transactions = state.store().list_transactions(&filter).await?;
    Ok(ok(FinanceReport::of(&transactions)))
}

/// Record a transaction.
///
/// # Errors
///
/// `400` naming the first missing or invalid field.
#[tracing::instrument(skip_all)]
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<TransactionDraft>,
) -> Result<(StatusCode, Json<Envelope<Created<TransactionId>>>), ApiError> {
    let fields = draft.validate()?;
    let id = state.store().create_transaction(&fields).await?;
    tracing::info!(transaction_id = %id, kind = %fields.kind, "Transaction recorded");
    Ok(created(id))
}

/// Overwrite a transaction.
///
/// # Errors
///
/// `400` on invalid input.
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TransactionId>,
    ApiJson(draft): ApiJson<TransactionDraft>,
) -> ApiResult<Affected> {
    let fields = draft.validate()?;
    let affected = state.store().update_transaction(id, &fields).await?;
    Ok(ok(Affected::new(affected)))
}

/// Delete a transaction. Idempotent.
///
/// # Errors
///
/// `500` if the store fails.
pub async fn remove(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TransactionId>,
) -> ApiResult<Affected> {
    let affected = state.store().delete_transaction(id).await?;
    Ok(ok(Affected::new(affected)))
}
