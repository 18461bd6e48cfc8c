//! Route modules for the API server
//!
//! - transactions: list, detail and create
//! - reports: date-range aggregates
//! - cron_job: generator status and toggle
//!
//! Each module has a mod.rs with exports and an api.rs with the JSON handlers.

pub mod cron_job;
pub mod reports;
pub mod transactions;
