//! Append-only transaction ledger.

pub mod models;
pub mod store;

pub use models::{NewTransaction, TransactionKind, TransactionRecord, TransactionView};
pub use store::{PgTransactionLog, TransactionLog};
