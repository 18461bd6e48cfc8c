//! Error types for txboard-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use txboard_core::{CoreError, DefaultErrorLogger, ErrorCode, ErrorContext, ErrorDetails, ErrorLogger};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Bad request: {message}")]
    BadRequest { message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => match e.code() {
                ErrorCode::NotFound => StatusCode::NOT_FOUND,
                ErrorCode::InvalidRange | ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
                ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        match self {
            ApiError::Core(e) => e.to_details(),
            ApiError::BadRequest { .. } => ErrorDetails::new(ErrorCode::InvalidArgument, self.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Core(e) => DefaultErrorLogger.log_error(e, &ErrorContext::new("http_request")),
            ApiError::BadRequest { message } => {
                DefaultErrorLogger.log_warning(message, &ErrorContext::new("http_request"))
            }
        }
        (self.status(), Json(self.to_details())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
