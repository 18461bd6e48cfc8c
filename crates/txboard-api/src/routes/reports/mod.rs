//! Report routes - per-day and per-status aggregates over a date range

pub mod api;

pub use api::{api_report, api_report_export};
