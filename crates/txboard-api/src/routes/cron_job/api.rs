//! Generator job JSON API

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use txboard_core::CronJobStatus;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusBody {
    pub status: CronJobStatus,
}

pub async fn api_cron_job_status(state: State<AppState>) -> Json<JobStatusBody> {
    Json(JobStatusBody {
        status: state.dashboard.job().status(),
    })
}

/// Set the job status explicitly
pub async fn api_cron_job_update(
    state: State<AppState>,
    body: Result<Json<JobStatusBody>, JsonRejection>,
) -> ApiResult<Json<JobStatusBody>> {
    let Json(body) = body.map_err(|rejection| ApiError::BadRequest {
        message: rejection.body_text(),
    })?;
    let status = state.dashboard.job().set_status(body.status);
    Ok(Json(JobStatusBody { status }))
}

pub async fn api_cron_job_toggle(state: State<AppState>) -> Json<JobStatusBody> {
    Json(JobStatusBody {
        status: state.dashboard.job().toggle(),
    })
}
