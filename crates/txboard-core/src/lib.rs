//! Transaction dashboard core
//!
//! Query resolution, report aggregation, storage and the background
//! generator. [`Dashboard`] ties them together for the HTTP layer.

pub mod error;
pub mod generator;
pub mod job;
pub mod models;
pub mod query;
pub mod reports;
pub mod store;
pub mod time;
pub mod types;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use txboard_config::Config;

pub use error::{
    CoreError, CoreResult, DefaultErrorLogger, ErrorCode, ErrorContext, ErrorDetails, ErrorLogger,
    ErrorSeverity,
};
pub use generator::TransactionGenerator;
pub use job::GeneratorJob;
pub use models::{NewTransaction, Transaction};
pub use query::{resolve, resolve_with, select, PaginationInfo, TransactionPage, TransactionQuery};
pub use reports::{aggregate, aggregate_with, DaySummary, Report, StatusBreakdown};
pub use store::{InMemoryStore, TransactionSource};
pub use types::{CronJobStatus, PaymentMethod, SortField, SortOrder, TransactionStatus};

/// Headline numbers for the dashboard landing view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_transactions: usize,
    pub job_status: CronJobStatus,
    /// Inserted by the generator job since startup
    pub generated_transactions: u64,
}

/// Shared application state: config, store and generator job
pub struct Dashboard {
    config: Config,
    store: Arc<dyn TransactionSource>,
    job: GeneratorJob,
}

impl Dashboard {
    pub fn new(config: Config, store: Arc<dyn TransactionSource>) -> Self {
        let initial = if config.generator.start_running {
            CronJobStatus::Running
        } else {
            CronJobStatus::Stopped
        };
        let job = GeneratorJob::new(initial, Duration::from_millis(config.generator.interval_ms));
        Self { config, store, job }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn new_generator(&self) -> TransactionGenerator {
        TransactionGenerator::new(self.config.generator.rng_seed, self.config.generator.history_days)
    }

    /// Fill the store with `generator.seed_count` back-dated transactions
    pub fn seed(&self) -> CoreResult<usize> {
        let count = self.config.generator.seed_count;
        let mut generator = self.new_generator();
        for tx in generator.batch(count, Utc::now()) {
            self.store.insert(tx)?;
        }
        log::info!("Seeded store with {} transactions", count);
        Ok(count)
    }

    /// Start the generator task on the current tokio runtime
    pub fn spawn_job(&self) -> JoinHandle<()> {
        // Offset the seed so live records don't replay the seeded history
        let seed = self.config.generator.rng_seed.map(|s| s.wrapping_add(1));
        let generator = TransactionGenerator::new(seed, self.config.generator.history_days);
        self.job.spawn(Arc::clone(&self.store), generator)
    }

    /// A query carrying only the configured page size
    pub fn default_query(&self) -> TransactionQuery {
        TransactionQuery {
            limit: i64::try_from(self.config.pagination.default_limit).ok(),
            ..TransactionQuery::default()
        }
    }

    pub fn transactions(&self, query: &TransactionQuery) -> CoreResult<TransactionPage> {
        let snapshot = self.store.list();
        resolve_with(&snapshot, query, &self.config.pagination)
    }

    /// Every transaction matching the query's filters and sort, unpaginated
    pub fn export_transactions(&self, query: &TransactionQuery) -> Vec<Transaction> {
        let snapshot = self.store.list();
        let rows: Vec<Transaction> = select(&snapshot, query).into_iter().cloned().collect();
        log::debug!("Exporting {} of {} transactions", rows.len(), snapshot.len());
        rows
    }

    pub fn transaction(&self, id: &str) -> CoreResult<Transaction> {
        self.store.get(id)
    }

    /// Validate, fill defaults and store a new transaction
    pub fn create_transaction(&self, new: NewTransaction) -> CoreResult<Transaction> {
        let new = new.normalize(&self.config.defaults, Utc::now())?;
        let id = self.store.insert(new)?;
        let created = self.store.get(&id)?;
        log::info!("Created transaction {}", created.summary());
        Ok(created)
    }

    pub fn report(&self, start: NaiveDate, end: NaiveDate) -> CoreResult<Report> {
        let snapshot = self.store.list();
        aggregate_with(&snapshot, start, end, Some(self.config.reports.max_days))
    }

    /// Fill in missing report bounds: the end defaults to today (UTC), the
    /// start to `reports.default_days` before the end
    pub fn report_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> CoreResult<(NaiveDate, NaiveDate)> {
        let end = end.unwrap_or_else(|| Utc::now().date_naive());
        let start = match start {
            Some(start) => start,
            None => end
                .checked_sub_signed(chrono::Duration::days(i64::from(self.config.reports.default_days)))
                .ok_or_else(|| {
                    CoreError::invalid_argument(
                        "startDate",
                        format!(
                            "required when endDate {} has no date {} days before it",
                            end, self.config.reports.default_days
                        ),
                    )
                })?,
        };
        Ok((start, end))
    }

    pub fn job(&self) -> &GeneratorJob {
        &self.job
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary {
            total_transactions: self.store.len(),
            job_status: self.job.status(),
            generated_transactions: self.job.generated_count(),
        }
    }
}
