//! Synthetic transaction generator
//!
//! Produces plausible records for seeding the store and for the background
//! job. Value pools mirror the ones the dashboard's demo data has always used.

use chrono::{DateTime, Duration, Timelike, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use super::models::NewTransaction;
use super::types::{PaymentMethod, TransactionStatus};

const CATEGORIES: [&str; 5] = ["Electronics", "Groceries", "Entertainment", "Travel", "Dining"];
const COUNTRIES: [&str; 6] = ["US", "UK", "CA", "AU", "DE", "FR"];
const CURRENCIES: [&str; 5] = ["USD", "EUR", "GBP", "CAD", "AUD"];
const TAGS: [&str; 6] = ["shopping", "food", "travel", "entertainment", "subscription", "utility"];

const MIN_AMOUNT: i64 = 100;
const MAX_AMOUNT: i64 = 10_000;
const USER_COUNT: u32 = 20;
const MERCHANT_COUNT: u32 = 50;
const MAX_TAGS: usize = 3;

/// Random transaction factory
#[derive(Debug)]
pub struct TransactionGenerator {
    rng: StdRng,
    history_days: u32,
}

impl TransactionGenerator {
    /// Create a generator; a fixed `seed` gives a reproducible sequence
    pub fn new(seed: Option<u64>, history_days: u32) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            history_days: history_days.max(1),
        }
    }

    /// A transaction stamped `now`
    pub fn live(&mut self, now: DateTime<Utc>) -> NewTransaction {
        self.generate(now)
    }

    /// A transaction back-dated by up to `history_days` from `now`
    pub fn historical(&mut self, now: DateTime<Utc>) -> NewTransaction {
        let days = self.rng.gen_range(0..i64::from(self.history_days));
        let seconds: i64 = self.rng.gen_range(0..86_400);
        // Stay on the calendar day `days` before `now`
        let seconds = seconds.min(i64::from(now.num_seconds_from_midnight()));
        let timestamp = now - Duration::days(days) - Duration::seconds(seconds);
        self.generate(timestamp)
    }

    /// A batch of historical transactions
    pub fn batch(&mut self, count: usize, now: DateTime<Utc>) -> Vec<NewTransaction> {
        (0..count).map(|_| self.historical(now)).collect()
    }

    fn generate(&mut self, timestamp: DateTime<Utc>) -> NewTransaction {
        let category = self.pick(&CATEGORIES);
        let tag_count = self.rng.gen_range(1..=MAX_TAGS);

        NewTransaction {
            amount: Decimal::from(self.rng.gen_range(MIN_AMOUNT..MAX_AMOUNT)),
            description: format!("Transaction for {}", category),
            timestamp: Some(timestamp),
            status: *TransactionStatus::ALL
                .choose(&mut self.rng)
                .unwrap_or(&TransactionStatus::Completed),
            user_id: format!("user_{}", self.rng.gen_range(0..USER_COUNT)),
            country: self.pick(&COUNTRIES).to_string(),
            tags: TAGS[..tag_count].iter().map(|t| t.to_string()).collect(),
            merchant_name: Some(format!("Merchant {}", self.rng.gen_range(0..MERCHANT_COUNT))),
            currency: self.pick(&CURRENCIES).to_string(),
            payment_method: PaymentMethod::ALL.choose(&mut self.rng).copied(),
        }
    }

    fn pick(&mut self, pool: &[&'static str]) -> &'static str {
        pool.choose(&mut self.rng).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_seeded_generator_is_reproducible() {
        let a = TransactionGenerator::new(Some(42), 30).batch(20, now());
        let b = TransactionGenerator::new(Some(42), 30).batch(20, now());
        assert_eq!(a, b);

        let c = TransactionGenerator::new(Some(43), 30).batch(20, now());
        assert_ne!(a, c);
    }

    #[test]
    fn test_values_come_from_pools() {
        let mut generator = TransactionGenerator::new(Some(7), 30);
        for tx in generator.batch(200, now()) {
            assert!(tx.amount >= Decimal::from(MIN_AMOUNT) && tx.amount < Decimal::from(MAX_AMOUNT));
            assert!(tx.description.starts_with("Transaction for "));
            assert!(COUNTRIES.contains(&tx.country.as_str()));
            assert!(CURRENCIES.contains(&tx.currency.as_str()));
            assert!(!tx.tags.is_empty() && tx.tags.len() <= MAX_TAGS);
            assert_eq!(tx.tags[0], "shopping");
            assert!(tx.payment_method.is_some());
            let user: u32 = tx.user_id.trim_start_matches("user_").parse().unwrap();
            assert!(user < USER_COUNT);
        }
    }

    #[test]
    fn test_historical_stays_within_window() {
        let mut generator = TransactionGenerator::new(Some(1), 30);
        let earliest = now() - Duration::days(30);
        for tx in generator.batch(500, now()) {
            let ts = tx.timestamp.unwrap();
            assert!(ts <= now());
            assert!(ts > earliest);
        }
    }

    #[test]
    fn test_live_is_stamped_now() {
        let mut generator = TransactionGenerator::new(Some(1), 30);
        assert_eq!(generator.live(now()).timestamp, Some(now()));
    }

    #[test]
    fn test_generated_transactions_pass_validation() {
        let mut generator = TransactionGenerator::new(Some(3), 30);
        let defaults = txboard_config::DefaultsConfig::default();
        for tx in generator.batch(50, now()) {
            assert!(tx.normalize(&defaults, now()).is_ok());
        }
    }
}
