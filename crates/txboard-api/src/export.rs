//! CSV download responses

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use csv::Writer;
use serde::Serialize;
use txboard_core::{CoreError, DaySummary, Transaction};

use crate::error::ApiResult;

/// One CSV line per transaction. Amounts stay exact decimal strings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionCsvRow {
    id: String,
    amount: String,
    description: String,
    timestamp: String,
    status: String,
    user_id: String,
    country: String,
    /// Joined with `;`
    tags: String,
    merchant_name: String,
    currency: String,
    payment_method: String,
}

impl From<&Transaction> for TransactionCsvRow {
    fn from(tx: &Transaction) -> Self {
        TransactionCsvRow {
            id: tx.id.clone(),
            amount: tx.amount.to_string(),
            description: tx.description.clone(),
            timestamp: tx.timestamp.to_rfc3339(),
            status: tx.status.to_string(),
            user_id: tx.user_id.clone(),
            country: tx.country.clone(),
            tags: tx.tags.join(";"),
            merchant_name: tx.merchant_name.clone().unwrap_or_default(),
            currency: tx.currency.clone(),
            payment_method: tx.payment_method.map(|m| m.to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DayCsvRow {
    date: String,
    count: usize,
    amount: String,
}

impl From<&DaySummary> for DayCsvRow {
    fn from(day: &DaySummary) -> Self {
        DayCsvRow {
            date: day.date.format("%Y-%m-%d").to_string(),
            count: day.count,
            amount: day.amount.to_string(),
        }
    }
}

fn csv_failure(e: impl std::fmt::Display) -> CoreError {
    CoreError::InternalError {
        message: format!("failed to write CSV: {}", e),
    }
}

/// Serialize rows with a header line taken from the row's field names
///
/// No rows means an empty body: csv writes the header with the first record.
pub fn to_csv<R: Serialize>(rows: impl IntoIterator<Item = R>) -> ApiResult<Vec<u8>> {
    let mut wtr = Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row).map_err(csv_failure)?;
    }
    let bytes = wtr.into_inner().map_err(csv_failure)?;
    Ok(bytes)
}

/// Attach CSV content type and an attachment filename to the body
pub fn csv_response(filename: &str, body: Vec<u8>) -> ApiResult<(StatusCode, HeaderMap, Vec<u8>)> {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8"));
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .map_err(csv_failure)?;
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    Ok((StatusCode::OK, headers, body))
}
