//! Transaction storage

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use super::error::{CoreError, CoreResult};
use super::models::{NewTransaction, Transaction};

/// First id handed out by [`InMemoryStore`]
pub const FIRST_ID: u64 = 1000;

/// An addressable transaction collection
pub trait TransactionSource: Send + Sync {
    /// All transactions, in insertion order
    fn list(&self) -> Vec<Transaction>;

    /// Look up one transaction
    fn get(&self, id: &str) -> CoreResult<Transaction>;

    /// Store a new transaction, returning the assigned id
    fn insert(&self, new: NewTransaction) -> CoreResult<String>;

    /// Number of stored transactions
    fn len(&self) -> usize {
        self.list().len()
    }
}

/// Process-local store; ids are `txn_<n>` from a monotonic counter
#[derive(Debug)]
pub struct InMemoryStore {
    transactions: RwLock<Vec<Transaction>>,
    next_id: AtomicU64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            transactions: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(FIRST_ID),
        }
    }

    /// Callers hold the write guard so ids follow insertion order
    fn allocate_id(&self) -> String {
        format!("txn_{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl TransactionSource for InMemoryStore {
    fn list(&self) -> Vec<Transaction> {
        self.transactions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn get(&self, id: &str) -> CoreResult<Transaction> {
        self.transactions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound { id: id.to_string() })
    }

    fn insert(&self, new: NewTransaction) -> CoreResult<String> {
        let mut transactions = self.transactions.write().unwrap_or_else(PoisonError::into_inner);
        let id = self.allocate_id();
        transactions.push(new.into_transaction(id.clone(), Utc::now()));
        Ok(id)
    }

    fn len(&self) -> usize {
        self.transactions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionStatus;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn new_tx(description: &str) -> NewTransaction {
        NewTransaction {
            amount: Decimal::from(100),
            description: description.to_string(),
            timestamp: None,
            status: TransactionStatus::Pending,
            user_id: "user_1".to_string(),
            country: "US".to_string(),
            tags: vec![],
            merchant_name: None,
            currency: "USD".to_string(),
            payment_method: None,
        }
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let store = InMemoryStore::new();
        let first = store.insert(new_tx("one")).unwrap();
        let second = store.insert(new_tx("two")).unwrap();

        assert_eq!(first, "txn_1000");
        assert_eq!(second, "txn_1001");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let store = InMemoryStore::new();
        for name in ["a", "b", "c"] {
            store.insert(new_tx(name)).unwrap();
        }
        let descriptions: Vec<_> = store.list().into_iter().map(|t| t.description).collect();
        assert_eq!(descriptions, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_get_by_id() {
        let store = InMemoryStore::new();
        let id = store.insert(new_tx("lookup")).unwrap();

        assert_eq!(store.get(&id).unwrap().description, "lookup");
        let err = store.get("txn_9").unwrap_err();
        assert_eq!(err, CoreError::NotFound { id: "txn_9".to_string() });
    }

    #[test]
    fn test_concurrent_inserts_get_unique_ids() {
        let store = Arc::new(InMemoryStore::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    (0..50).map(|_| store.insert(new_tx("t")).unwrap()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<String> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 200);
        assert_eq!(store.len(), 200);
    }

    #[test]
    fn test_concurrent_inserts_keep_id_order() {
        let store = Arc::new(InMemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store.insert(new_tx("t")).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let numbers: Vec<u64> = store
            .list()
            .iter()
            .map(|t| t.id.trim_start_matches("txn_").parse().unwrap())
            .collect();
        let expected: Vec<u64> = (FIRST_ID..FIRST_ID + 800).collect();
        assert_eq!(numbers, expected);
    }
}
