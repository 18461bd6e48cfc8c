//! Core data models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use txboard_config::DefaultsConfig;

use super::error::{CoreError, CoreResult};
use super::types::{PaymentMethod, TransactionStatus};

/// Largest amount a single transaction may carry
pub const MAX_TRANSACTION_AMOUNT: i64 = 1_000_000_000_000;

/// An immutable financial event record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique transaction identifier, assigned by the store
    pub id: String,
    /// Non-negative amount
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Free-text description
    pub description: String,
    /// Point in time of occurrence
    pub timestamp: DateTime<Utc>,
    /// Transaction status
    pub status: TransactionStatus,
    /// Owning user identifier
    pub user_id: String,
    /// Two-letter country code
    pub country: String,
    /// Labels, in display order
    pub tags: Vec<String>,
    /// Merchant name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
    /// Three-letter currency code
    pub currency: String,
    /// Payment method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
}

impl Transaction {
    /// Calendar day (UTC) the transaction falls on
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Check if any of the given tags is present
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        tags.iter().any(|tag| self.tags.contains(tag))
    }

    /// Get a summary string
    pub fn summary(&self) -> String {
        format!("{} - {} {} - {}", self.date(), self.amount, self.currency, self.description)
    }
}

/// Payload for creating a transaction; the store assigns the id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    /// Defaults to the creation time when absent
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: TransactionStatus,
    pub user_id: String,
    /// Falls back to the configured default when empty
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub merchant_name: Option<String>,
    /// Falls back to the configured default when empty
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

impl NewTransaction {
    /// Validate the payload and fill in defaults.
    ///
    /// Codes are upper-cased, tags are trimmed and de-duplicated (first
    /// occurrence wins), and a blank merchant name is dropped.
    pub fn normalize(mut self, defaults: &DefaultsConfig, now: DateTime<Utc>) -> CoreResult<Self> {
        if self.amount < Decimal::ZERO {
            return Err(CoreError::invalid_argument("amount", "must not be negative"));
        }
        if self.amount > Decimal::from(MAX_TRANSACTION_AMOUNT) {
            return Err(CoreError::invalid_argument(
                "amount",
                format!("must not exceed {}", MAX_TRANSACTION_AMOUNT),
            ));
        }

        self.description = self.description.trim().to_string();
        if self.description.is_empty() {
            return Err(CoreError::invalid_argument("description", "must not be empty"));
        }

        self.user_id = self.user_id.trim().to_string();
        if self.user_id.is_empty() {
            return Err(CoreError::invalid_argument("userId", "must not be empty"));
        }

        self.country = normalize_code("country", &self.country, &defaults.country, 2)?;
        self.currency = normalize_code("currency", &self.currency, &defaults.currency, 3)?;

        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags.iter().map(|t| t.trim()) {
            if !tag.is_empty() && !tags.iter().any(|existing| existing == tag) {
                tags.push(tag.to_string());
            }
        }
        self.tags = tags;

        self.merchant_name = self
            .merchant_name
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        if self.timestamp.is_none() {
            self.timestamp = Some(now);
        }

        Ok(self)
    }

    /// Attach an id, producing the stored record
    pub fn into_transaction(self, id: String, now: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            amount: self.amount,
            description: self.description,
            timestamp: self.timestamp.unwrap_or(now),
            status: self.status,
            user_id: self.user_id,
            country: self.country,
            tags: self.tags,
            merchant_name: self.merchant_name,
            currency: self.currency,
            payment_method: self.payment_method,
        }
    }
}

fn normalize_code(field: &str, value: &str, fallback: &str, len: usize) -> CoreResult<String> {
    let value = value.trim();
    let code = if value.is_empty() { fallback } else { value }.to_ascii_uppercase();
    if code.len() != len || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CoreError::invalid_argument(
            field,
            format!("must be a {}-letter code, got '{}'", len, code),
        ));
    }
    Ok(code)
}
