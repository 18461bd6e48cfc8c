//! Date-range report aggregation

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::{CoreError, CoreResult};
use super::models::Transaction;
use super::time::{days_between, parse_date};
use super::types::TransactionStatus;

/// Activity on a single calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    pub count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Transaction counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBreakdown {
    pub completed: usize,
    pub pending: usize,
    pub failed: usize,
    pub refunded: usize,
}

impl StatusBreakdown {
    fn record(&mut self, status: TransactionStatus) {
        match status {
            TransactionStatus::Completed => self.completed += 1,
            TransactionStatus::Pending => self.pending += 1,
            TransactionStatus::Failed => self.failed += 1,
            TransactionStatus::Refunded => self.refunded += 1,
        }
    }
}

/// Aggregate over an inclusive date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(with = "date_format")]
    pub start_date: NaiveDate,
    #[serde(with = "date_format")]
    pub end_date: NaiveDate,
    pub total_transactions: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    /// Zero when there are no transactions
    #[serde(with = "rust_decimal::serde::float")]
    pub average_amount: Decimal,
    pub transactions_by_status: StatusBreakdown,
    pub transactions_by_day: Vec<DaySummary>,
}

impl Report {
    /// Parse report bounds given as `YYYY-MM-DD` or RFC 3339
    pub fn parse_range(start: &str, end: &str) -> CoreResult<(NaiveDate, NaiveDate)> {
        let start = parse_date(start).map_err(|e| CoreError::invalid_argument("startDate", e))?;
        let end = parse_date(end).map_err(|e| CoreError::invalid_argument("endDate", e))?;
        Ok((start, end))
    }
}

/// Aggregate transactions over `[start, end]` with no limit on range length
pub fn aggregate(source: &[Transaction], start: NaiveDate, end: NaiveDate) -> CoreResult<Report> {
    aggregate_with(source, start, end, None)
}

/// Aggregate transactions over `[start, end]`, rejecting ranges longer than `max_days`
pub fn aggregate_with(
    source: &[Transaction],
    start: NaiveDate,
    end: NaiveDate,
    max_days: Option<u32>,
) -> CoreResult<Report> {
    if end < start {
        return Err(CoreError::InvalidRange {
            start: start.to_string(),
            end: end.to_string(),
            reason: "end date is before start date".to_string(),
        });
    }

    let span = (end - start).num_days() + 1;
    if let Some(max) = max_days {
        if span > i64::from(max) {
            return Err(CoreError::RangeTooLong {
                start: start.to_string(),
                end: end.to_string(),
                days: span,
                max,
            });
        }
    }

    let mut buckets: BTreeMap<NaiveDate, (usize, Decimal)> =
        days_between(start, end).map(|d| (d, (0, Decimal::ZERO))).collect();
    let mut by_status = StatusBreakdown::default();

    for tx in source {
        if let Some((count, amount)) = buckets.get_mut(&tx.date()) {
            *count += 1;
            *amount = amount.checked_add(tx.amount).ok_or_else(|| overflow(tx.date()))?;
            by_status.record(tx.status);
        }
    }

    let transactions_by_day: Vec<DaySummary> = buckets
        .into_iter()
        .map(|(date, (count, amount))| DaySummary { date, count, amount })
        .collect();

    let total_transactions: usize = transactions_by_day.iter().map(|d| d.count).sum();
    let mut total_amount = Decimal::ZERO;
    for day in &transactions_by_day {
        total_amount = total_amount.checked_add(day.amount).ok_or_else(|| overflow(day.date))?;
    }
    let average_amount = if total_transactions == 0 {
        Decimal::ZERO
    } else {
        (total_amount / Decimal::from(total_transactions))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    };

    log::debug!(
        "Aggregated report {} to {}: {} transactions over {} days",
        start,
        end,
        total_transactions,
        transactions_by_day.len()
    );

    Ok(Report {
        start_date: start,
        end_date: end,
        total_transactions,
        total_amount,
        average_amount,
        transactions_by_status: by_status,
        transactions_by_day,
    })
}

fn overflow(date: NaiveDate) -> CoreError {
    CoreError::InternalError {
        message: format!("amount total overflowed at {}", date),
    }
}

mod date_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}
