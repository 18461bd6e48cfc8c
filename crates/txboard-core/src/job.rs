//! Background transaction generator job
//!
//! The running/stopped flag is process-wide and last write wins. The tokio
//! task ticks regardless of the flag and only inserts while running.

use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::error::{CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use super::generator::TransactionGenerator;
use super::store::TransactionSource;
use super::types::CronJobStatus;

/// Handle to the generator job state
#[derive(Debug, Clone)]
pub struct GeneratorJob {
    running: Arc<AtomicBool>,
    generated: Arc<AtomicU64>,
    interval: Duration,
}

impl GeneratorJob {
    pub fn new(initial: CronJobStatus, interval: Duration) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(initial == CronJobStatus::Running)),
            generated: Arc::new(AtomicU64::new(0)),
            interval,
        }
    }

    pub fn status(&self) -> CronJobStatus {
        if self.running.load(Ordering::SeqCst) {
            CronJobStatus::Running
        } else {
            CronJobStatus::Stopped
        }
    }

    /// Set the status, returning the status now in effect
    pub fn set_status(&self, status: CronJobStatus) -> CronJobStatus {
        let previous = self.running.swap(status == CronJobStatus::Running, Ordering::SeqCst);
        if previous != (status == CronJobStatus::Running) {
            log::info!("Transaction generator {}", status);
        }
        status
    }

    /// Flip between running and stopped
    pub fn toggle(&self) -> CronJobStatus {
        let was_running = self.running.fetch_xor(true, Ordering::SeqCst);
        let previous = if was_running {
            CronJobStatus::Running
        } else {
            CronJobStatus::Stopped
        };
        let status = previous.flipped();
        log::info!("Transaction generator {}", status);
        status
    }

    /// Transactions inserted by the job so far
    pub fn generated_count(&self) -> u64 {
        self.generated.load(Ordering::Relaxed)
    }

    /// One tick: insert a live transaction if the job is running
    pub fn run_once(
        &self,
        store: &dyn TransactionSource,
        generator: &mut TransactionGenerator,
    ) -> CoreResult<Option<String>> {
        if self.status() != CronJobStatus::Running {
            return Ok(None);
        }
        let id = store.insert(generator.live(Utc::now()))?;
        self.generated.fetch_add(1, Ordering::Relaxed);
        log::debug!("Generated transaction {}", id);
        Ok(Some(id))
    }

    /// Start the ticking task on the current tokio runtime
    pub fn spawn(
        &self,
        store: Arc<dyn TransactionSource>,
        mut generator: TransactionGenerator,
    ) -> JoinHandle<()> {
        let job = self.clone();
        log::info!(
            "Starting transaction generator task (interval {:?}, status {})",
            job.interval,
            job.status()
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(job.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Err(e) = job.run_once(store.as_ref(), &mut generator) {
                    let context = ErrorContext::new("generator_tick")
                        .with_data("generated", serde_json::json!(job.generated_count()));
                    DefaultErrorLogger.log_error(&e, &context);
                }
            }
        })
    }
}
