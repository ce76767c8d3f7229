//! Bank account domain: models and the account store.

pub mod models;
pub mod store;

pub use models::{Account, AccountType, AccountView, generate_account_number};
pub use store::{AccountStore, BalanceWrite, PgAccountStore};
