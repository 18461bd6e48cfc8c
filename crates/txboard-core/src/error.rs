//! Error types for txboard-core
//!
//! This module provides error handling for transaction queries, reports
//! and the generator job, including error codes, detailed messages, and
//! suggestions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Transaction not found
    NotFound,
    /// Report range is empty or too long
    InvalidRange,
    /// Bad query parameter or transaction field
    InvalidArgument,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::NotFound => write!(f, "NOT_FOUND"),
            ErrorCode::InvalidRange => write!(f, "INVALID_RANGE"),
            ErrorCode::InvalidArgument => write!(f, "INVALID_ARGUMENT"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - the request was rejected
    Warning,
    /// Critical - application may be unstable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for txboard-core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Transaction not found: {id}")]
    NotFound { id: String },

    #[error("Invalid range {start} to {end}: {reason}")]
    InvalidRange {
        start: String,
        end: String,
        reason: String,
    },

    #[error("Range {start} to {end} covers {days} days, the maximum is {max}")]
    RangeTooLong {
        start: String,
        end: String,
        days: i64,
        max: u32,
    },

    #[error("Invalid argument '{field}': {message}")]
    InvalidArgument { field: String, message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    /// Shorthand for an `InvalidArgument` error
    pub fn invalid_argument(field: &str, message: impl Into<String>) -> Self {
        CoreError::InvalidArgument {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::InvalidRange { .. } | CoreError::RangeTooLong { .. } => ErrorCode::InvalidRange,
            CoreError::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::NotFound { .. } => ErrorSeverity::Info,
            CoreError::InvalidRange { .. } | CoreError::RangeTooLong { .. } => ErrorSeverity::Warning,
            CoreError::InvalidArgument { .. } => ErrorSeverity::Warning,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::NotFound { .. } => {
                details = details.with_suggestion(
                    "Check if the transaction ID is correct.".to_string()
                );
                details = details.with_suggestion(
                    "Use the /api/transactions endpoint to list all transactions.".to_string()
                );
            }
            CoreError::InvalidRange { start, end, .. } => {
                details = details.with_detail(serde_json::json!({ "startDate": start, "endDate": end }));
                details = details.with_suggestion(
                    "The end date must be on or after the start date.".to_string()
                );
            }
            CoreError::RangeTooLong { start, end, max, .. } => {
                details = details.with_detail(serde_json::json!({ "startDate": start, "endDate": end }));
                details = details.with_suggestion(format!("Request at most {} days per report.", max));
            }
            CoreError::InvalidArgument { field, .. } => {
                details = details.with_detail(serde_json::json!({ "field": field }));
                details = details.with_suggestion(
                    format!("Review the value supplied for '{}'.", field)
                );
            }
            CoreError::InternalError { .. } => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            data: serde_json::json!({}),
        }
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Critical => log::error!(
                target: "txboard::error",
                "ERROR [{}] {} - Operation: {} - Data: {}",
                error.code(),
                error,
                context.operation,
                context.data
            ),
            ErrorSeverity::Warning | ErrorSeverity::Info => log::warn!(
                target: "txboard::error",
                "[{}] {} - Operation: {} - Data: {}",
                error.code(),
                error,
                context.operation,
                context.data
            ),
        }
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "txboard::error",
            "WARNING: {} - Operation: {} - Data: {}",
            message,
            context.operation,
            context.data
        );
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::NotFound.to_string(), "NOT_FOUND");
        assert_eq!(ErrorCode::InvalidRange.to_string(), "INVALID_RANGE");
        assert_eq!(ErrorCode::InvalidArgument.to_string(), "INVALID_ARGUMENT");
    }

    #[test]
    fn test_error_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::InvalidArgument).unwrap();
        assert_eq!(json, "\"INVALID_ARGUMENT\"");
    }

    #[test]
    fn test_core_error_code_and_severity() {
        let error = CoreError::NotFound { id: "txn_1".to_string() };
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.severity(), ErrorSeverity::Info);

        let error = CoreError::invalid_argument("limit", "must be positive");
        assert_eq!(error.code(), ErrorCode::InvalidArgument);
        assert_eq!(error.severity(), ErrorSeverity::Warning);

        let error = CoreError::InternalError { message: "lock".to_string() };
        assert_eq!(error.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_error_details_not_found() {
        let error = CoreError::NotFound { id: "txn_1234".to_string() };
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::NotFound);
        assert!(!details.suggestions.is_empty());
        assert!(details.message.contains("txn_1234"));
    }

    #[test]
    fn test_error_details_invalid_range() {
        let error = CoreError::InvalidRange {
            start: "2024-02-01".to_string(),
            end: "2024-01-01".to_string(),
            reason: "end date is before start date".to_string(),
        };
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::InvalidRange);
        assert!(details.suggestions[0].contains("on or after"));
        assert_eq!(details.details.unwrap()["endDate"], "2024-01-01");
    }

    #[test]
    fn test_error_details_range_too_long() {
        let error = CoreError::RangeTooLong {
            start: "2020-01-01".to_string(),
            end: "2024-01-01".to_string(),
            days: 1462,
            max: 366,
        };
        assert_eq!(error.code(), ErrorCode::InvalidRange);
        assert_eq!(error.severity(), ErrorSeverity::Warning);

        let details = error.to_details();
        assert!(details.message.contains("1462 days"));
        assert_eq!(details.suggestions, vec!["Request at most 366 days per report.".to_string()]);
        assert!(!details.suggestions[0].contains("on or after"));
    }

    #[test]
    fn test_error_details_serialization_skips_empty() {
        let details = ErrorDetails::new(ErrorCode::InternalError, "boom".to_string());
        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value["message"], "boom");
        assert!(value.get("details").is_none());
        assert!(value.get("suggestions").is_none());
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("list_transactions")
            .with_data("limit", serde_json::json!(0));

        assert_eq!(context.operation, "list_transactions");
        assert_eq!(context.data["limit"], 0);
    }
}
