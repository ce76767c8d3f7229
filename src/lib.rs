//! FerroBank - Demo Banking Backend
//!
//! A small banking service: user accounts, deposits and withdrawals, and
//! OTP-verified transfers between accounts.
//!
//! # Modules
//!
//! - [`money`] - Canonical scale-2 balance arithmetic
//! - [`account`] - Accounts and the versioned account store
//! - [`ledger`] - Append-only transaction records
//! - [`otp`] - One-time-password challenges for transfers
//! - [`transfer`] - Two-phase transfer orchestration
//! - [`user_auth`] - Registration, login, JWT sessions
//! - [`gateway`] - HTTP API (axum)

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod money;

pub mod account;
pub mod ledger;
pub mod otp;
pub mod transfer;

pub mod gateway;
pub mod user_auth;

#[cfg(test)]
pub mod testkit;

// Convenient re-exports at crate root
pub use account::{Account, AccountStore, AccountType, BalanceWrite};
pub use error::BankError;
pub use ledger::{TransactionKind, TransactionLog, TransactionRecord};
pub use transfer::TransferOrchestrator;
