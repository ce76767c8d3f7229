//! Transaction record types
//!
//! Records are immutable once created: there is no update path anywhere in
//! the crate, and the store only ever inserts and selects them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::money;

/// Balance-affecting event kinds.
///
/// `Fee` and `Interest` exist in the persisted enum for ledger compatibility
/// but no endpoint creates them and the balance helper rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    TransferOut,
    TransferIn,
    Fee,
    Interest,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::TransferOut => "transfer-out",
            TransactionKind::TransferIn => "transfer-in",
            TransactionKind::Fee => "fee",
            TransactionKind::Interest => "interest",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "deposit" => Some(TransactionKind::Deposit),
            "withdrawal" => Some(TransactionKind::Withdrawal),
            "transfer-out" => Some(TransactionKind::TransferOut),
            "transfer-in" => Some(TransactionKind::TransferIn),
            "fee" => Some(TransactionKind::Fee),
            "interest" => Some(TransactionKind::Interest),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored ledger record.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub txn_id: Uuid,
    pub account_id: Uuid,
    pub user_id: i64,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: String,
    /// Counterparty account number for transfers
    pub related_account: Option<String>,
    pub withdrawal_method: Option<String>,
    /// Balance snapshot taken after the paired account write
    pub balance_after: Decimal,
    /// Optional user-supplied date override
    pub transaction_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new record. The store assigns `txn_id` and
/// `created_at`.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: Uuid,
    pub user_id: i64,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: String,
    pub related_account: Option<String>,
    pub withdrawal_method: Option<String>,
    pub balance_after: Decimal,
    pub transaction_date: Option<DateTime<Utc>>,
}

/// API shape: decimals leave the core as exact strings, never binary floats.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionView {
    pub txn_id: Uuid,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    #[schema(example = "40.00")]
    pub amount: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawal_method: Option<String>,
    #[schema(example = "60.00")]
    pub balance_after: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&TransactionRecord> for TransactionView {
    fn from(rec: &TransactionRecord) -> Self {
        Self {
            txn_id: rec.txn_id,
            account_id: rec.account_id,
            kind: rec.kind,
            amount: money::format_amount(rec.amount),
            description: rec.description.clone(),
            related_account: rec.related_account.clone(),
            withdrawal_method: rec.withdrawal_method.clone(),
            balance_after: money::format_amount(rec.balance_after),
            transaction_date: rec.transaction_date,
            created_at: rec.created_at,
        }
    }
}
