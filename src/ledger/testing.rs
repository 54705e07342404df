//! In-memory ledger used by tests. Every call is counted so tests can assert
//! which remote operations a code path would have issued.
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::core::{
    memo_has_token, Institution, LedgerAccount, LedgerAccountType, LedgerTransaction,
    NewTransaction,
};

use super::{Error, Ledger, Result};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Calls {
    pub institution_creates: usize,
    pub account_creates: usize,
    pub account_listings: usize,
    pub account_lookups: usize,
    pub memo_searches: usize,
    pub reference_searches: usize,
    pub inserts: usize,
    pub updates: usize,
    pub balance_updates: usize,
}

#[derive(Debug, Clone)]
pub struct StoredTransaction {
    pub transaction_account_id: i64,
    pub tx: LedgerTransaction,
    pub cheque_number: String,
}

#[derive(Debug, Default)]
pub struct State {
    next_id: i64,
    pub user_id: i64,
    pub accounts: Vec<LedgerAccount>,
    pub institutions: Vec<Institution>,
    pub transactions: Vec<StoredTransaction>,
    pub calls: Calls,
    /// 1-based numbers of the `accounts` calls which fail.
    pub failing_account_listings: HashSet<usize>,
    pub fail_memo_searches: HashSet<String>,
    pub fail_inserts: bool,
    pub fail_updates: bool,
    pub fail_account_creates: bool,
}

impl State {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: Mutex<State>,
}

fn rejected(message: &str) -> Error {
    Error::Client(pocketsmith::Error::Api {
        status: 500,
        message: message.to_string(),
    })
}

impl MemoryLedger {
    pub fn new() -> Self {
        let ledger = Self::default();
        ledger.state().user_id = 1;
        ledger.state().next_id = 1000;
        ledger
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Calls {
        self.state().calls.clone()
    }

    pub fn add_account(&self, title: &str, institution: &str) -> LedgerAccount {
        let mut state = self.state();
        let institution = Institution {
            id: state.id(),
            title: institution.to_string(),
        };
        let account = LedgerAccount {
            id: state.id(),
            title: title.to_string(),
            currency: "jpy".to_string(),
            ty: LedgerAccountType::Bank,
            balance: Decimal::ZERO,
            transaction_account_id: state.id(),
            institution,
        };
        state.accounts.push(account.clone());
        account
    }

    /// Seeds a ledger transaction as it would exist from an earlier run.
    pub fn add_transaction_record(
        &self,
        transaction_account_id: i64,
        payee: &str,
        date: NaiveDate,
        memo: &str,
        note: &str,
    ) -> LedgerTransaction {
        let mut state = self.state();
        let tx = LedgerTransaction {
            id: state.id(),
            payee: payee.to_string(),
            amount: Decimal::from(-100),
            date,
            memo: memo.to_string(),
            note: note.to_string(),
            is_transfer: false,
            needs_review: false,
        };
        state.transactions.push(StoredTransaction {
            transaction_account_id,
            tx: tx.clone(),
            cheque_number: String::new(),
        });
        tx
    }

    pub fn transactions(&self, transaction_account_id: i64) -> Vec<LedgerTransaction> {
        self.state()
            .transactions
            .iter()
            .filter(|t| t.transaction_account_id == transaction_account_id)
            .map(|t| t.tx.clone())
            .collect()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn current_user(&self) -> Result<i64> {
        Ok(self.state().user_id)
    }

    async fn accounts(&self, _user_id: i64) -> Result<Vec<LedgerAccount>> {
        let mut state = self.state();
        state.calls.account_listings += 1;
        if state.failing_account_listings.contains(&state.calls.account_listings) {
            return Err(rejected("account listing failed"));
        }

        Ok(state.accounts.clone())
    }

    async fn find_account_by_name(&self, _user_id: i64, name: &str) -> Result<LedgerAccount> {
        let mut state = self.state();
        state.calls.account_lookups += 1;
        state
            .accounts
            .iter()
            .find(|a| a.title == name)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn find_institution_by_name(&self, _user_id: i64, name: &str) -> Result<Institution> {
        self.state()
            .institutions
            .iter()
            .find(|i| i.title == name)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn create_institution(
        &self,
        _user_id: i64,
        name: &str,
        _currency: &str,
    ) -> Result<Institution> {
        let mut state = self.state();
        state.calls.institution_creates += 1;
        let institution = Institution {
            id: state.id(),
            title: name.to_string(),
        };
        state.institutions.push(institution.clone());
        Ok(institution)
    }

    async fn create_account(
        &self,
        _user_id: i64,
        institution_id: i64,
        name: &str,
        currency: &str,
        ty: LedgerAccountType,
    ) -> Result<LedgerAccount> {
        let mut state = self.state();
        state.calls.account_creates += 1;
        if state.fail_account_creates {
            return Err(rejected("account creation rejected"));
        }

        let institution = state
            .institutions
            .iter()
            .find(|i| i.id == institution_id)
            .cloned()
            .ok_or(Error::NotFound)?;
        let account = LedgerAccount {
            id: state.id(),
            title: name.to_string(),
            currency: currency.to_string(),
            ty,
            balance: Decimal::ZERO,
            transaction_account_id: state.id(),
            institution,
        };
        state.accounts.push(account.clone());
        Ok(account)
    }

    async fn update_balance(
        &self,
        account: &LedgerAccount,
        balance: Decimal,
        _as_of: NaiveDate,
    ) -> Result<()> {
        let mut state = self.state();
        state.calls.balance_updates += 1;
        let stored = state
            .accounts
            .iter_mut()
            .find(|a| a.id == account.id)
            .ok_or(Error::NotFound)?;
        stored.balance = balance;
        Ok(())
    }

    async fn search_transactions(
        &self,
        transaction_account_id: i64,
        start: NaiveDate,
        end: NaiveDate,
        reference: &str,
    ) -> Result<Vec<LedgerTransaction>> {
        let mut state = self.state();
        state.calls.reference_searches += 1;
        Ok(state
            .transactions
            .iter()
            .filter(|t| t.transaction_account_id == transaction_account_id)
            .filter(|t| t.tx.date >= start && t.tx.date <= end)
            .filter(|t| {
                t.tx.note.contains(reference)
                    || t.tx.memo.contains(reference)
                    || t.tx.payee.contains(reference)
            })
            .map(|t| t.tx.clone())
            .collect())
    }

    async fn search_by_memo(
        &self,
        transaction_account_id: i64,
        date: NaiveDate,
        token: &str,
    ) -> Result<Vec<LedgerTransaction>> {
        let mut state = self.state();
        state.calls.memo_searches += 1;
        if state.fail_memo_searches.contains(token) {
            return Err(rejected("search failed"));
        }

        Ok(state
            .transactions
            .iter()
            .filter(|t| t.transaction_account_id == transaction_account_id)
            .filter(|t| t.tx.date == date && memo_has_token(&t.tx.memo, token))
            .map(|t| t.tx.clone())
            .collect())
    }

    async fn add_transaction(
        &self,
        transaction_account_id: i64,
        tx: &NewTransaction,
    ) -> Result<LedgerTransaction> {
        let mut state = self.state();
        state.calls.inserts += 1;
        if state.fail_inserts {
            return Err(rejected("insert rejected"));
        }

        let stored = LedgerTransaction {
            id: state.id(),
            payee: tx.payee.clone(),
            amount: tx.amount,
            date: tx.date,
            memo: tx.memo.clone(),
            note: String::new(),
            is_transfer: tx.is_transfer,
            needs_review: tx.needs_review,
        };
        state.transactions.push(StoredTransaction {
            transaction_account_id,
            tx: stored.clone(),
            cheque_number: tx.cheque_number.clone(),
        });
        Ok(stored)
    }

    async fn update_transaction(&self, id: i64, tx: &NewTransaction) -> Result<()> {
        let mut state = self.state();
        state.calls.updates += 1;
        if state.fail_updates {
            return Err(rejected("update rejected"));
        }

        let stored = state
            .transactions
            .iter_mut()
            .find(|t| t.tx.id == id)
            .ok_or(Error::NotFound)?;
        stored.tx.payee = tx.payee.clone();
        stored.tx.amount = tx.amount;
        stored.tx.date = tx.date;
        stored.tx.memo = tx.memo.clone();
        stored.tx.is_transfer = tx.is_transfer;
        stored.tx.needs_review = tx.needs_review;
        stored.cheque_number = tx.cheque_number.clone();
        Ok(())
    }
}
