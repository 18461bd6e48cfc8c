//! Transactions JSON API
//!
//! Endpoints:
//! - api_transactions: filtered, sorted, paginated list
//! - api_transaction_detail: single transaction by id
//! - api_transaction_create: store a new transaction
//! - api_transactions_export: every match as a CSV download

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use txboard_core::{NewTransaction, Transaction, TransactionPage, TransactionQuery};

use crate::error::{ApiError, ApiResult};
use crate::export::{csv_response, to_csv, TransactionCsvRow};
use crate::AppState;

/// Get transactions matching the query pairs
///
/// `tags` may repeat, so the raw pairs are kept instead of a map.
pub async fn api_transactions(
    state: State<AppState>,
    params: Query<Vec<(String, String)>>,
) -> ApiResult<Json<TransactionPage>> {
    let query = TransactionQuery::from_pairs(&params)?;
    let page = state.dashboard.transactions(&query)?;
    Ok(Json(page))
}

/// Download every transaction matching the query pairs as CSV
///
/// Filters and sort apply as for the list; `page` and `limit` are ignored.
pub async fn api_transactions_export(
    state: State<AppState>,
    params: Query<Vec<(String, String)>>,
) -> ApiResult<(StatusCode, HeaderMap, Vec<u8>)> {
    let query = TransactionQuery::from_pairs(&params)?;
    let rows = state.dashboard.export_transactions(&query);
    let body = to_csv(rows.iter().map(TransactionCsvRow::from))?;
    csv_response("transactions.csv", body)
}

/// Get single transaction detail
pub async fn api_transaction_detail(
    state: State<AppState>,
    path: Path<String>,
) -> ApiResult<Json<Transaction>> {
    let transaction = state.dashboard.transaction(&path.0)?;
    Ok(Json(transaction))
}

/// Create a transaction from a JSON body
pub async fn api_transaction_create(
    state: State<AppState>,
    body: Result<Json<NewTransaction>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let Json(new) = body.map_err(|rejection| ApiError::BadRequest {
        message: rejection.body_text(),
    })?;
    let created = state.dashboard.create_transaction(new)?;
    Ok((StatusCode::CREATED, Json(created)))
}
