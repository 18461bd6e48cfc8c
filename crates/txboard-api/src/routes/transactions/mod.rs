//! Transaction routes - filtered list, detail, create, CSV export

pub mod api;

pub use api::{
    api_transaction_create, api_transaction_detail, api_transactions, api_transactions_export,
};
