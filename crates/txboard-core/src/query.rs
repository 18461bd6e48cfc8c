//! Transaction query resolution: filter, sort, paginate
//!
//! The whole data set is filtered first, then sorted, then sliced into a
//! page. Pagination metadata always reflects the filtered total.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use txboard_config::PaginationConfig;

use super::error::{CoreError, CoreResult};
use super::models::Transaction;
use super::time::{parse_end_bound, parse_start_bound, TimeWindow};
use super::types::{SortField, SortOrder, TransactionStatus};

/// Page size used when neither the query nor the config gives one
pub const DEFAULT_LIMIT: i64 = 10;

/// Filter, sort and pagination specification; every field is optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    /// 1-based page number; values below 1 are treated as 1
    pub page: Option<i64>,
    /// Page size; must be positive
    pub limit: Option<i64>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    /// Exact match
    pub user_id: Option<String>,
    /// Case-insensitive substring
    pub description: Option<String>,
    /// Inclusive lower timestamp bound
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper timestamp bound
    pub end_date: Option<DateTime<Utc>>,
    /// Match-any
    pub tags: Vec<String>,
    pub status: Option<TransactionStatus>,
    pub country: Option<String>,
    /// Inclusive
    pub min_amount: Option<Decimal>,
    /// Inclusive
    pub max_amount: Option<Decimal>,
}

/// Pagination metadata, derived from the filtered total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
}

impl PaginationInfo {
    pub fn new(current_page: usize, total_items: usize, items_per_page: usize) -> Self {
        Self {
            current_page,
            total_pages: total_items.div_ceil(items_per_page),
            total_items,
            items_per_page,
        }
    }

    /// Index range `[start, end)` of the current page within the filtered set
    pub fn bounds(&self) -> (usize, usize) {
        let start = (self.current_page - 1).saturating_mul(self.items_per_page);
        let start = start.min(self.total_items);
        let end = start.saturating_add(self.items_per_page).min(self.total_items);
        (start, end)
    }
}

/// A page of transactions plus pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPage {
    pub data: Vec<Transaction>,
    pub pagination: PaginationInfo,
}

impl TransactionQuery {
    /// Decode the flat key/value form used on the wire.
    ///
    /// `tags` (or `tags[]`) may repeat. Empty values count as absent and
    /// unknown keys are ignored.
    pub fn from_pairs(pairs: &[(String, String)]) -> CoreResult<Self> {
        let mut query = TransactionQuery::default();

        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            match key.as_str() {
                "page" => query.page = Some(parse_int("page", value)?),
                "limit" => query.limit = Some(parse_int("limit", value)?),
                "sortBy" => {
                    query.sort_by = Some(
                        value.parse().map_err(|e: String| CoreError::invalid_argument("sortBy", e))?,
                    )
                }
                "sortOrder" => {
                    query.sort_order = Some(
                        value.parse().map_err(|e: String| CoreError::invalid_argument("sortOrder", e))?,
                    )
                }
                "userId" => query.user_id = Some(value.to_string()),
                "description" => query.description = Some(value.to_string()),
                "startDate" => {
                    query.start_date = Some(
                        parse_start_bound(value).map_err(|e| CoreError::invalid_argument("startDate", e))?,
                    )
                }
                "endDate" => {
                    query.end_date = Some(
                        parse_end_bound(value).map_err(|e| CoreError::invalid_argument("endDate", e))?,
                    )
                }
                "tags" | "tags[]" => query.tags.push(value.to_string()),
                "status" => {
                    query.status = Some(
                        value.parse().map_err(|e: String| CoreError::invalid_argument("status", e))?,
                    )
                }
                "country" => query.country = Some(value.to_string()),
                "minAmount" => query.min_amount = Some(parse_decimal("minAmount", value)?),
                "maxAmount" => query.max_amount = Some(parse_decimal("maxAmount", value)?),
                other => log::debug!("Ignoring unknown query parameter: {}", other),
            }
        }

        Ok(query)
    }

    fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_date, self.end_date)
    }

    /// Check a transaction against every filter in the query
    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(ref user_id) = self.user_id {
            if tx.user_id != *user_id {
                return false;
            }
        }

        if !self.window().contains(&tx.timestamp) {
            return false;
        }

        if let Some(ref description) = self.description {
            if !tx.description.to_lowercase().contains(&description.to_lowercase()) {
                return false;
            }
        }

        if !self.tags.is_empty() && !tx.has_any_tag(&self.tags) {
            return false;
        }

        if let Some(status) = self.status {
            if tx.status != status {
                return false;
            }
        }

        if let Some(ref country) = self.country {
            if tx.country != *country {
                return false;
            }
        }

        if let Some(min) = self.min_amount {
            if tx.amount < min {
                return false;
            }
        }

        if let Some(max) = self.max_amount {
            if tx.amount > max {
                return false;
            }
        }

        true
    }

    fn compare(&self, field: SortField, a: &Transaction, b: &Transaction) -> Ordering {
        let ordering = match field {
            SortField::Amount => a.amount.cmp(&b.amount),
            SortField::Timestamp => a.timestamp.cmp(&b.timestamp),
        };
        match self.sort_order.unwrap_or_default() {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

fn parse_int(field: &str, value: &str) -> CoreResult<i64> {
    value
        .parse()
        .map_err(|_| CoreError::invalid_argument(field, format!("expected an integer, got '{}'", value)))
}

fn parse_decimal(field: &str, value: &str) -> CoreResult<Decimal> {
    value
        .parse()
        .map_err(|_| CoreError::invalid_argument(field, format!("expected a number, got '{}'", value)))
}

/// Resolve a query with the built-in page size and no upper limit
pub fn resolve(source: &[Transaction], query: &TransactionQuery) -> CoreResult<TransactionPage> {
    resolve_page(source, query, DEFAULT_LIMIT, None)
}

/// Resolve a query using the configured default and maximum page sizes
pub fn resolve_with(
    source: &[Transaction],
    query: &TransactionQuery,
    pagination: &PaginationConfig,
) -> CoreResult<TransactionPage> {
    let default_limit = i64::try_from(pagination.default_limit).unwrap_or(DEFAULT_LIMIT);
    resolve_page(source, query, default_limit, Some(pagination.max_limit))
}

/// Every matching transaction in result order, ignoring `page` and `limit`
pub fn select<'a>(source: &'a [Transaction], query: &TransactionQuery) -> Vec<&'a Transaction> {
    let mut matched: Vec<&Transaction> = source.iter().filter(|tx| query.matches(tx)).collect();
    if let Some(field) = query.sort_by {
        matched.sort_by(|a, b| query.compare(field, a, b));
    }
    matched
}

fn resolve_page(
    source: &[Transaction],
    query: &TransactionQuery,
    default_limit: i64,
    max_limit: Option<usize>,
) -> CoreResult<TransactionPage> {
    let limit = query.limit.unwrap_or(default_limit);
    if limit <= 0 {
        return Err(CoreError::invalid_argument(
            "limit",
            format!("must be greater than 0, got {}", limit),
        ));
    }
    let limit = usize::try_from(limit)
        .map_err(|_| CoreError::invalid_argument("limit", "too large"))?;
    if let Some(max) = max_limit {
        if limit > max {
            return Err(CoreError::invalid_argument(
                "limit",
                format!("must not exceed {}, got {}", max, limit),
            ));
        }
    }

    let page = usize::try_from(query.page.unwrap_or(1).max(1)).unwrap_or(usize::MAX);

    let matched = select(source, query);

    let pagination = PaginationInfo::new(page, matched.len(), limit);
    let (start, end) = pagination.bounds();
    let data = matched[start..end].iter().map(|tx| (*tx).clone()).collect();

    log::debug!(
        "Resolved query: {} of {} transactions matched, page {}/{}",
        pagination.total_items,
        source.len(),
        pagination.current_page,
        pagination.total_pages
    );

    Ok(TransactionPage { data, pagination })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;
    use chrono::{Duration, TimeZone};

    fn tx(id: &str, amount: i64, status: TransactionStatus, day: u32, tags: &[&str]) -> Transaction {
        Transaction {
            id: id.to_string(),
            amount: Decimal::from(amount),
            description: format!("Transaction for {}", id),
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
            status,
            user_id: "user_1".to_string(),
            country: "US".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            merchant_name: None,
            currency: "USD".to_string(),
            payment_method: Some(PaymentMethod::CreditCard),
        }
    }

    fn fixture() -> Vec<Transaction> {
        (0..25)
            .map(|i| {
                let status = TransactionStatus::ALL[i % 4];
                let tags: &[&str] = if i % 3 == 0 { &["food"] } else { &["travel", "shopping"] };
                let mut t = tx(&format!("txn_{}", 1000 + i), ((i * 37) % 100 + 1) as i64, status, (i % 28) as u32 + 1, tags);
                t.user_id = format!("user_{}", i % 5);
                t.country = if i % 2 == 0 { "US" } else { "DE" }.to_string();
                t
            })
            .collect()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_min_amount_and_status_scenario() {
        let source = vec![
            tx("A", 100, TransactionStatus::Completed, 1, &[]),
            tx("B", 500, TransactionStatus::Pending, 2, &[]),
        ];

        let query = TransactionQuery { min_amount: Some(Decimal::from(200)), ..Default::default() };
        let page = resolve(&source, &query).unwrap();
        assert_eq!(page.data.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["B"]);

        let query = TransactionQuery { status: Some(TransactionStatus::Completed), ..Default::default() };
        let page = resolve(&source, &query).unwrap();
        assert_eq!(page.data.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn test_amount_bounds_are_inclusive() {
        let source = vec![
            tx("A", 100, TransactionStatus::Completed, 1, &[]),
            tx("B", 500, TransactionStatus::Pending, 2, &[]),
        ];
        let query = TransactionQuery {
            min_amount: Some(Decimal::from(100)),
            max_amount: Some(Decimal::from(500)),
            ..Default::default()
        };
        assert_eq!(resolve(&source, &query).unwrap().pagination.total_items, 2);
    }

    #[test]
    fn test_tags_match_any() {
        let source = vec![tx("A", 10, TransactionStatus::Completed, 1, &["food"])];
        let query = TransactionQuery {
            tags: vec!["food".to_string(), "travel".to_string()],
            ..Default::default()
        };
        assert_eq!(resolve(&source, &query).unwrap().data.len(), 1);

        let query = TransactionQuery { tags: vec!["travel".to_string()], ..Default::default() };
        assert!(resolve(&source, &query).unwrap().data.is_empty());
    }

    #[test]
    fn test_description_is_case_insensitive_substring() {
        let mut a = tx("A", 10, TransactionStatus::Completed, 1, &[]);
        a.description = "Transaction for Groceries".to_string();
        let query = TransactionQuery { description: Some("GROCER".to_string()), ..Default::default() };
        assert_eq!(resolve(&[a], &query).unwrap().data.len(), 1);
    }

    #[test]
    fn test_timestamp_range_is_inclusive() {
        let source: Vec<_> = (1..=5).map(|d| tx(&format!("d{}", d), 10, TransactionStatus::Completed, d, &[])).collect();
        let query = TransactionQuery {
            start_date: Some(Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2024, 1, 4, 12, 0, 0).unwrap()),
            ..Default::default()
        };
        let ids: Vec<_> = resolve(&source, &query).unwrap().data.into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["d2", "d3", "d4"]);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let source = fixture();
        let query = TransactionQuery {
            country: Some("US".to_string()),
            status: Some(TransactionStatus::Completed),
            limit: Some(100),
            ..Default::default()
        };
        let page = resolve(&source, &query).unwrap();
        assert!(!page.data.is_empty());
        assert!(page.data.iter().all(|t| t.country == "US" && t.status == TransactionStatus::Completed));
        let expected = source.iter().filter(|t| t.country == "US" && t.status == TransactionStatus::Completed).count();
        assert_eq!(page.pagination.total_items, expected);
    }

    #[test]
    fn test_sort_by_amount_ascending() {
        let query = TransactionQuery {
            sort_by: Some(SortField::Amount),
            sort_order: Some(SortOrder::Asc),
            limit: Some(25),
            ..Default::default()
        };
        let page = resolve(&fixture(), &query).unwrap();
        assert!(page.data.windows(2).all(|w| w[0].amount <= w[1].amount));
    }

    #[test]
    fn test_sort_by_timestamp_descending() {
        let query = TransactionQuery {
            sort_by: Some(SortField::Timestamp),
            sort_order: Some(SortOrder::Desc),
            limit: Some(25),
            ..Default::default()
        };
        let page = resolve(&fixture(), &query).unwrap();
        assert!(page.data.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[test]
    fn test_sort_order_defaults_to_ascending() {
        let query = TransactionQuery { sort_by: Some(SortField::Amount), limit: Some(25), ..Default::default() };
        let page = resolve(&fixture(), &query).unwrap();
        assert!(page.data.windows(2).all(|w| w[0].amount <= w[1].amount));
    }

    #[test]
    fn test_sort_happens_before_pagination() {
        let query = TransactionQuery {
            sort_by: Some(SortField::Amount),
            sort_order: Some(SortOrder::Desc),
            limit: Some(3),
            ..Default::default()
        };
        let source = fixture();
        let page = resolve(&source, &query).unwrap();
        let max = source.iter().map(|t| t.amount).max().unwrap();
        assert_eq!(page.data[0].amount, max);
    }

    #[test]
    fn test_select_ignores_pagination() {
        let source = fixture();
        let query = TransactionQuery {
            country: Some("DE".to_string()),
            sort_by: Some(SortField::Amount),
            limit: Some(2),
            page: Some(3),
            ..Default::default()
        };
        let selected = select(&source, &query);

        assert_eq!(selected.len(), 12);
        assert!(selected.iter().all(|t| t.country == "DE"));
        assert!(selected.windows(2).all(|w| w[0].amount <= w[1].amount));
    }

    #[test]
    fn test_no_sort_keeps_source_order() {
        let source = fixture();
        let page = resolve(&source, &TransactionQuery::default()).unwrap();
        let ids: Vec<_> = page.data.iter().map(|t| t.id.clone()).collect();
        let expected: Vec<_> = source.iter().take(10).map(|t| t.id.clone()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_pagination_uses_filtered_total() {
        let source = fixture();
        let query = TransactionQuery { country: Some("DE".to_string()), limit: Some(5), page: Some(2), ..Default::default() };
        let page = resolve(&source, &query).unwrap();

        assert_eq!(page.pagination.total_items, 12);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.pagination.current_page, 2);
        assert_eq!(page.pagination.items_per_page, 5);
        assert_eq!(page.data.len(), 5);
    }

    #[test]
    fn test_page_length_properties() {
        let source = fixture();
        for limit in 1..=12i64 {
            for page in 1..=6i64 {
                let query = TransactionQuery { page: Some(page), limit: Some(limit), ..Default::default() };
                let result = resolve(&source, &query).unwrap();
                let p = result.pagination;
                let total = p.total_items as i64;

                assert_eq!(p.total_pages, p.total_items.div_ceil(p.items_per_page));
                let expected = (total - (page - 1) * limit).clamp(0, limit);
                assert_eq!(result.data.len() as i64, expected);
            }
        }
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let query = TransactionQuery { page: Some(100), ..Default::default() };
        let page = resolve(&fixture(), &query).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.total_items, 25);
        assert_eq!(page.pagination.total_pages, 3);
    }

    #[test]
    fn test_non_positive_page_is_clamped() {
        let source = fixture();
        let first = resolve(&source, &TransactionQuery { page: Some(1), ..Default::default() }).unwrap();
        let zero = resolve(&source, &TransactionQuery { page: Some(0), ..Default::default() }).unwrap();
        let negative = resolve(&source, &TransactionQuery { page: Some(-3), ..Default::default() }).unwrap();

        assert_eq!(zero, first);
        assert_eq!(negative, first);
        assert_eq!(zero.pagination.current_page, 1);
    }

    #[test]
    fn test_non_positive_limit_is_rejected() {
        for limit in [0, -1] {
            let err = resolve(&fixture(), &TransactionQuery { limit: Some(limit), ..Default::default() }).unwrap_err();
            assert!(matches!(err, CoreError::InvalidArgument { ref field, .. } if field == "limit"));
        }
    }

    #[test]
    fn test_limit_above_configured_maximum_is_rejected() {
        let config = PaginationConfig { default_limit: 10, max_limit: 20 };
        let query = TransactionQuery { limit: Some(21), ..Default::default() };
        assert!(resolve_with(&fixture(), &query, &config).is_err());

        let query = TransactionQuery { limit: Some(20), ..Default::default() };
        assert_eq!(resolve_with(&fixture(), &query, &config).unwrap().data.len(), 20);
    }

    #[test]
    fn test_configured_default_limit() {
        let config = PaginationConfig { default_limit: 4, max_limit: 20 };
        let page = resolve_with(&fixture(), &TransactionQuery::default(), &config).unwrap();
        assert_eq!(page.data.len(), 4);
        assert_eq!(page.pagination.items_per_page, 4);
    }

    #[test]
    fn test_empty_result_has_zero_pages() {
        let query = TransactionQuery { user_id: Some("nobody".to_string()), ..Default::default() };
        let page = resolve(&fixture(), &query).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.total_items, 0);
        assert_eq!(page.pagination.total_pages, 0);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let source = fixture();
        let query = TransactionQuery {
            tags: vec!["food".to_string()],
            sort_by: Some(SortField::Amount),
            sort_order: Some(SortOrder::Desc),
            page: Some(2),
            limit: Some(3),
            ..Default::default()
        };
        assert_eq!(resolve(&source, &query).unwrap(), resolve(&source, &query).unwrap());
    }

    #[test]
    fn test_from_pairs_decodes_every_field() {
        let query = TransactionQuery::from_pairs(&pairs(&[
            ("page", "2"),
            ("limit", "25"),
            ("sortBy", "timestamp"),
            ("sortOrder", "desc"),
            ("userId", "user_3"),
            ("description", "travel"),
            ("startDate", "2024-01-01"),
            ("endDate", "2024-01-31"),
            ("tags", "food"),
            ("tags", "travel"),
            ("status", "refunded"),
            ("country", "FR"),
            ("minAmount", "10.5"),
            ("maxAmount", "99"),
        ]))
        .unwrap();

        assert_eq!(query.page, Some(2));
        assert_eq!(query.limit, Some(25));
        assert_eq!(query.sort_by, Some(SortField::Timestamp));
        assert_eq!(query.sort_order, Some(SortOrder::Desc));
        assert_eq!(query.user_id.as_deref(), Some("user_3"));
        assert_eq!(query.tags, vec!["food".to_string(), "travel".to_string()]);
        assert_eq!(query.status, Some(TransactionStatus::Refunded));
        assert_eq!(query.min_amount, Some(Decimal::new(105, 1)));
        assert_eq!(query.max_amount, Some(Decimal::from(99)));
        assert_eq!(query.start_date, Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        let end = query.end_date.unwrap();
        assert!(end > Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap());
        assert!(end < Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap() + Duration::seconds(1));
    }

    #[test]
    fn test_from_pairs_skips_empty_and_unknown() {
        let query = TransactionQuery::from_pairs(&pairs(&[
            ("userId", ""),
            ("status", "  "),
            ("tags[]", "food"),
            ("foo", "bar"),
        ]))
        .unwrap();

        assert_eq!(query.user_id, None);
        assert_eq!(query.status, None);
        assert_eq!(query.tags, vec!["food".to_string()]);
    }

    #[test]
    fn test_from_pairs_rejects_bad_values() {
        for (key, value) in [
            ("status", "settled"),
            ("sortBy", "description"),
            ("sortOrder", "up"),
            ("page", "two"),
            ("limit", "1.5"),
            ("minAmount", "lots"),
            ("startDate", "yesterday"),
        ] {
            let err = TransactionQuery::from_pairs(&pairs(&[(key, value)])).unwrap_err();
            assert!(
                matches!(err, CoreError::InvalidArgument { ref field, .. } if field == key),
                "expected InvalidArgument for {}",
                key
            );
        }
    }
}
