//! Data models for bank accounts

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::money;

/// Maximum length of a display nickname
pub const NICKNAME_MAX_LEN: usize = 50;

/// Digits in a system-generated account number
pub const ACCOUNT_NUMBER_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Checking,
    Savings,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "checking",
            AccountType::Savings => "savings",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "checking" => Some(AccountType::Checking),
            "savings" => Some(AccountType::Savings),
            _ => None,
        }
    }
}

/// A bank account row.
///
/// `version` backs the compare-and-swap balance writes; it is never exposed
/// to clients.
#[derive(Debug, Clone)]
pub struct Account {
    pub account_id: Uuid,
    pub user_id: i64,
    pub account_number: String,
    pub account_type: AccountType,
    pub balance: Decimal,
    pub nickname: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// API shape: the balance leaves the core as an exact decimal string.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountView {
    pub account_id: Uuid,
    pub account_number: String,
    pub account_type: AccountType,
    #[schema(example = "100.00")]
    pub balance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountView {
    fn from(acc: &Account) -> Self {
        Self {
            account_id: acc.account_id,
            account_number: acc.account_number.clone(),
            account_type: acc.account_type,
            balance: money::format_amount(acc.balance),
            nickname: acc.nickname.clone(),
            created_at: acc.created_at,
        }
    }
}

/// Generate a random zero-padded 10-digit account number.
///
/// Uniqueness is enforced by the database; the store retries on collision.
pub fn generate_account_number() -> String {
    let num: u64 = rand::thread_rng().gen_range(0..10_000_000_000);
    format!("{:0width$}", num, width = ACCOUNT_NUMBER_LEN)
}
