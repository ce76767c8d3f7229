//! In-memory store implementations for tests.
//!
//! `MemoryBank` mirrors the Postgres stores' observable behavior, including
//! version bumps on balance writes, so orchestration logic can be exercised
//! without a database.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::account::{Account, AccountStore, AccountType, BalanceWrite, generate_account_number};
use crate::error::BankError;
use crate::ledger::store::materialize;
use crate::ledger::{NewTransaction, TransactionLog, TransactionRecord};
use crate::otp::{ChallengeStore, StoredChallenge};

#[derive(Default)]
pub struct MemoryBank {
    accounts: Mutex<HashMap<Uuid, Account>>,
    records: Mutex<Vec<TransactionRecord>>,
    challenges: Mutex<HashMap<i64, StoredChallenge>>,
    no_contact: Mutex<HashSet<i64>>,
}

impl MemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account with a given balance.
    pub fn add_account(&self, user_id: i64, balance: Decimal) -> Account {
        let now = Utc::now();
        let account = Account {
            account_id: Uuid::new_v4(),
            user_id,
            account_number: generate_account_number(),
            account_type: AccountType::Checking,
            balance,
            nickname: None,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        self.accounts
            .lock()
            .unwrap()
            .insert(account.account_id, account.clone());
        account
    }

    /// Mark a user as having no phone number on file.
    pub fn remove_contact_channel(&self, user_id: i64) {
        self.no_contact.lock().unwrap().insert(user_id);
    }

    pub fn balance_of(&self, account_id: Uuid) -> Decimal {
        self.accounts.lock().unwrap()[&account_id].balance
    }

    pub fn records_for(&self, account_id: Uuid) -> Vec<TransactionRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.account_id == account_id)
            .cloned()
            .collect()
    }

    fn apply_write(
        accounts: &mut HashMap<Uuid, Account>,
        write: &BalanceWrite,
    ) -> Result<(), BankError> {
        let account = accounts
            .get_mut(&write.account_id)
            .ok_or(BankError::WriteConflict)?;
        if account.version != write.expected_version {
            return Err(BankError::WriteConflict);
        }
        account.balance = write.new_balance;
        account.version += 1;
        account.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryBank {
    async fn create(
        &self,
        user_id: i64,
        account_type: AccountType,
        nickname: Option<String>,
    ) -> Result<Account, BankError> {
        let mut account = self.add_account(user_id, Decimal::ZERO);
        account.account_type = account_type;
        account.nickname = nickname;
        self.accounts
            .lock()
            .unwrap()
            .insert(account.account_id, account.clone());
        Ok(account)
    }

    async fn fetch_owned(&self, account_id: Uuid, user_id: i64) -> Result<Account, BankError> {
        self.accounts
            .lock()
            .unwrap()
            .get(&account_id)
            .filter(|a| a.user_id == user_id)
            .cloned()
            .ok_or(BankError::AccountNotFoundOrDenied)
    }

    async fn find_by_number(&self, account_number: &str) -> Result<Option<Account>, BankError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|a| a.account_number == account_number)
            .cloned())
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Account>, BankError> {
        let mut list: Vec<Account> = self
            .accounts
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by_key(|a| a.created_at);
        Ok(list)
    }

    async fn rename(
        &self,
        account_id: Uuid,
        user_id: i64,
        nickname: Option<String>,
    ) -> Result<Account, BankError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(&account_id)
            .filter(|a| a.user_id == user_id)
            .ok_or(BankError::AccountNotFoundOrDenied)?;
        account.nickname = nickname;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn write_balance(&self, write: &BalanceWrite) -> Result<(), BankError> {
        let mut accounts = self.accounts.lock().unwrap();
        Self::apply_write(&mut accounts, write)
    }

    async fn commit_transfer(
        &self,
        debit: &BalanceWrite,
        credit: &BalanceWrite,
        out_leg: NewTransaction,
        in_leg: NewTransaction,
    ) -> Result<(TransactionRecord, TransactionRecord), BankError> {
        let mut accounts = self.accounts.lock().unwrap();
        // All-or-nothing: validate both versions before touching either row.
        let snapshot = accounts.clone();
        if let Err(err) = Self::apply_write(&mut accounts, debit)
            .and_then(|_| Self::apply_write(&mut accounts, credit))
        {
            *accounts = snapshot;
            return Err(err);
        }
        drop(accounts);

        let out_rec = materialize(out_leg);
        let in_rec = materialize(in_leg);
        let mut records = self.records.lock().unwrap();
        records.push(out_rec.clone());
        records.push(in_rec.clone());
        Ok((out_rec, in_rec))
    }

    async fn delete_with_cascade(&self, account_id: Uuid, user_id: i64) -> Result<(), BankError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get(&account_id)
            .filter(|a| a.user_id == user_id)
            .ok_or(BankError::AccountNotFoundOrDenied)?;
        if account.balance != Decimal::ZERO {
            return Err(BankError::BalanceNotZero);
        }
        accounts.remove(&account_id);
        self.records
            .lock()
            .unwrap()
            .retain(|r| r.account_id != account_id);
        Ok(())
    }
}

#[async_trait]
impl TransactionLog for MemoryBank {
    async fn append(&self, new_txn: NewTransaction) -> Result<TransactionRecord, BankError> {
        let rec = materialize(new_txn);
        self.records.lock().unwrap().push(rec.clone());
        Ok(rec)
    }

    async fn for_account(&self, account_id: Uuid) -> Result<Vec<TransactionRecord>, BankError> {
        let mut recs = self.records_for(account_id);
        recs.reverse();
        Ok(recs)
    }

    async fn for_user(&self, user_id: i64) -> Result<Vec<TransactionRecord>, BankError> {
        let mut recs: Vec<TransactionRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        recs.reverse();
        Ok(recs)
    }
}

#[async_trait]
impl ChallengeStore for MemoryBank {
    async fn put(&self, user_id: i64, challenge: StoredChallenge) -> Result<(), BankError> {
        self.challenges.lock().unwrap().insert(user_id, challenge);
        Ok(())
    }

    async fn get(&self, user_id: i64) -> Result<Option<StoredChallenge>, BankError> {
        Ok(self.challenges.lock().unwrap().get(&user_id).cloned())
    }

    async fn clear(&self, user_id: i64) -> Result<(), BankError> {
        self.challenges.lock().unwrap().remove(&user_id);
        Ok(())
    }

    async fn has_contact_channel(&self, user_id: i64) -> Result<bool, BankError> {
        Ok(!self.no_contact.lock().unwrap().contains(&user_id))
    }
}

/// Delivery double that captures issued codes for test assertions.
#[derive(Default)]
pub struct CapturingDelivery {
    pub sent: Mutex<Vec<(i64, String)>>,
}

#[async_trait]
impl crate::otp::ChallengeDelivery for CapturingDelivery {
    async fn send_challenge(&self, user_id: i64, code: &str) -> Result<(), BankError> {
        self.sent.lock().unwrap().push((user_id, code.to_string()));
        Ok(())
    }
}

impl CapturingDelivery {
    pub fn last_code_for(&self, user_id: i64) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(uid, _)| *uid == user_id)
            .map(|(_, code)| code.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TransactionKind;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn delete_requires_zero_balance_and_cascades() {
        let bank = MemoryBank::new();
        let account = bank.add_account(1, dec("5.00"));
        bank.append(NewTransaction {
            account_id: account.account_id,
            user_id: 1,
            kind: TransactionKind::Deposit,
            amount: dec("5.00"),
            description: "Deposit".to_string(),
            related_account: None,
            withdrawal_method: None,
            balance_after: dec("5.00"),
            transaction_date: None,
        })
        .await
        .unwrap();

        let res = bank.delete_with_cascade(account.account_id, 1).await;
        assert!(matches!(res, Err(BankError::BalanceNotZero)));

        bank.write_balance(&BalanceWrite {
            account_id: account.account_id,
            new_balance: dec("0.00"),
            expected_version: account.version,
        })
        .await
        .unwrap();

        bank.delete_with_cascade(account.account_id, 1).await.unwrap();
        let gone = bank.fetch_owned(account.account_id, 1).await;
        assert!(matches!(gone, Err(BankError::AccountNotFoundOrDenied)));
        assert!(bank.records_for(account.account_id).is_empty());
    }

    #[tokio::test]
    async fn stale_version_write_is_rejected() {
        let bank = MemoryBank::new();
        let account = bank.add_account(1, dec("10.00"));

        bank.write_balance(&BalanceWrite {
            account_id: account.account_id,
            new_balance: dec("20.00"),
            expected_version: account.version,
        })
        .await
        .unwrap();

        let stale = bank
            .write_balance(&BalanceWrite {
                account_id: account.account_id,
                new_balance: dec("30.00"),
                expected_version: account.version,
            })
            .await;
        assert!(matches!(stale, Err(BankError::WriteConflict)));
        assert_eq!(bank.balance_of(account.account_id), dec("20.00"));
    }
}
