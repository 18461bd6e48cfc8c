//! Reports JSON API

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::NaiveDate;
use std::collections::HashMap;
use txboard_core::time::parse_date;
use txboard_core::{CoreError, Report};

use crate::error::ApiResult;
use crate::export::{csv_response, to_csv, DayCsvRow};
use crate::AppState;

fn date_param(params: &HashMap<String, String>, key: &str) -> ApiResult<Option<NaiveDate>> {
    match params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(value) => {
            let date = parse_date(value).map_err(|e| CoreError::invalid_argument(key, e))?;
            Ok(Some(date))
        }
        None => Ok(None),
    }
}

/// Aggregate over `startDate..=endDate`
///
/// Missing `endDate` means today (UTC); missing `startDate` means
/// `reports.default_days` before the end.
pub async fn api_report(
    state: State<AppState>,
    params: Query<HashMap<String, String>>,
) -> ApiResult<Json<Report>> {
    let report = report_for(&state, &params)?;
    Ok(Json(report))
}

/// Download the per-day rows of a report as CSV, same range defaults
pub async fn api_report_export(
    state: State<AppState>,
    params: Query<HashMap<String, String>>,
) -> ApiResult<(StatusCode, HeaderMap, Vec<u8>)> {
    let report = report_for(&state, &params)?;
    let body = to_csv(report.transactions_by_day.iter().map(DayCsvRow::from))?;
    let filename = format!(
        "report_{}_{}.csv",
        report.start_date.format("%Y-%m-%d"),
        report.end_date.format("%Y-%m-%d")
    );
    csv_response(&filename, body)
}

fn report_for(state: &AppState, params: &HashMap<String, String>) -> ApiResult<Report> {
    let start = date_param(params, "startDate")?;
    let end = date_param(params, "endDate")?;
    let (start, end) = state.dashboard.report_range(start, end)?;
    Ok(state.dashboard.report(start, end)?)
}
