pub mod pocketsmith;
#[cfg(test)]
pub mod testing;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::core::{Institution, LedgerAccount, LedgerAccountType, LedgerTransaction, NewTransaction};

#[derive(Debug, Error)]
pub enum Error {
    /// Expected outcome of a lookup, callers branch on it.
    #[error("not found")]
    NotFound,
    #[error("ledger account {0} has no transaction account")]
    MissingTransactionAccount(i64),
    #[error(transparent)]
    Client(::pocketsmith::Error),
}

impl From<::pocketsmith::Error> for Error {
    fn from(err: ::pocketsmith::Error) -> Self {
        match err {
            ::pocketsmith::Error::NotFound => Error::NotFound,
            err => Error::Client(err),
        }
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;

/// The budgeting service acting as the system of record.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Id of the user owning the API token.
    async fn current_user(&self) -> Result<i64>;

    async fn accounts(&self, user_id: i64) -> Result<Vec<LedgerAccount>>;

    async fn find_account_by_name(&self, user_id: i64, name: &str) -> Result<LedgerAccount>;

    async fn find_institution_by_name(&self, user_id: i64, name: &str) -> Result<Institution>;

    async fn create_institution(
        &self,
        user_id: i64,
        name: &str,
        currency: &str,
    ) -> Result<Institution>;

    async fn create_account(
        &self,
        user_id: i64,
        institution_id: i64,
        name: &str,
        currency: &str,
        ty: LedgerAccountType,
    ) -> Result<LedgerAccount>;

    async fn update_balance(
        &self,
        account: &LedgerAccount,
        balance: Decimal,
        as_of: NaiveDate,
    ) -> Result<()>;

    /// Transactions between `start` and `end` inclusive matching the
    /// free-text `reference`.
    async fn search_transactions(
        &self,
        transaction_account_id: i64,
        start: NaiveDate,
        end: NaiveDate,
        reference: &str,
    ) -> Result<Vec<LedgerTransaction>>;

    /// Transactions on `date` whose memo carries `token`, see
    /// [`crate::core::memo_has_token`].
    async fn search_by_memo(
        &self,
        transaction_account_id: i64,
        date: NaiveDate,
        token: &str,
    ) -> Result<Vec<LedgerTransaction>>;

    async fn add_transaction(
        &self,
        transaction_account_id: i64,
        tx: &NewTransaction,
    ) -> Result<LedgerTransaction>;

    async fn update_transaction(&self, id: i64, tx: &NewTransaction) -> Result<()>;
}
