//! Generator job routes

pub mod api;

pub use api::{api_cron_job_status, api_cron_job_toggle, api_cron_job_update, JobStatusBody};
