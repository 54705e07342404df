use std::convert::TryFrom;

use async_trait::async_trait;
use chrono::NaiveDate;
use pocketsmith::{AccountType, Client, TransactionInput};
use rust_decimal::Decimal;

use crate::core::{
    memo_has_token, Institution, LedgerAccount, LedgerAccountType, LedgerTransaction,
    NewTransaction,
};

use super::{Error, Ledger, Result};

pub struct PocketsmithLedger {
    client: Client,
}

impl PocketsmithLedger {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl From<AccountType> for LedgerAccountType {
    fn from(ty: AccountType) -> Self {
        match ty {
            AccountType::Bank => LedgerAccountType::Bank,
            AccountType::Credits => LedgerAccountType::Credit,
            AccountType::Stocks => LedgerAccountType::Stocks,
            AccountType::OtherAsset => LedgerAccountType::OtherAsset,
            _ => LedgerAccountType::Other,
        }
    }
}

fn to_remote_type(ty: LedgerAccountType) -> AccountType {
    match ty {
        LedgerAccountType::Bank => AccountType::Bank,
        LedgerAccountType::Credit => AccountType::Credits,
        LedgerAccountType::Stocks => AccountType::Stocks,
        LedgerAccountType::OtherAsset | LedgerAccountType::Other => AccountType::OtherAsset,
    }
}

impl From<pocketsmith::Institution> for Institution {
    fn from(ins: pocketsmith::Institution) -> Self {
        Self {
            id: ins.id,
            title: ins.title,
        }
    }
}

impl TryFrom<pocketsmith::Account> for LedgerAccount {
    type Error = Error;

    fn try_from(account: pocketsmith::Account) -> Result<Self> {
        let primary = account
            .primary_transaction_account
            .ok_or(Error::MissingTransactionAccount(account.id))?;

        Ok(Self {
            id: account.id,
            title: account.title,
            currency: account.currency_code,
            ty: account.account_type.into(),
            balance: account.current_balance,
            transaction_account_id: primary.id,
            institution: primary.institution.into(),
        })
    }
}

impl From<pocketsmith::Transaction> for LedgerTransaction {
    fn from(tx: pocketsmith::Transaction) -> Self {
        Self {
            id: tx.id,
            payee: tx.payee,
            amount: tx.amount,
            date: tx.date,
            memo: tx.memo.unwrap_or_default(),
            note: tx.note.unwrap_or_default(),
            is_transfer: tx.is_transfer.unwrap_or_default(),
            needs_review: tx.needs_review,
        }
    }
}

fn to_input(tx: &NewTransaction) -> TransactionInput {
    TransactionInput {
        payee: tx.payee.clone(),
        amount: tx.amount,
        date: tx.date,
        is_transfer: tx.is_transfer,
        needs_review: tx.needs_review,
        memo: tx.memo.clone(),
        note: None,
        cheque_number: Some(tx.cheque_number.clone()),
    }
}

#[async_trait]
impl Ledger for PocketsmithLedger {
    async fn current_user(&self) -> Result<i64> {
        Ok(self.client.current_user().await?.id)
    }

    async fn accounts(&self, user_id: i64) -> Result<Vec<LedgerAccount>> {
        // Accounts without a transaction account cannot hold transactions
        // and are never candidates.
        Ok(self
            .client
            .accounts(user_id)
            .await?
            .into_iter()
            .filter_map(|a| LedgerAccount::try_from(a).ok())
            .collect())
    }

    async fn find_account_by_name(&self, user_id: i64, name: &str) -> Result<LedgerAccount> {
        LedgerAccount::try_from(self.client.find_account_by_name(user_id, name).await?)
    }

    async fn find_institution_by_name(&self, user_id: i64, name: &str) -> Result<Institution> {
        Ok(self
            .client
            .find_institution_by_name(user_id, name)
            .await?
            .into())
    }

    async fn create_institution(
        &self,
        user_id: i64,
        name: &str,
        currency: &str,
    ) -> Result<Institution> {
        Ok(self
            .client
            .create_institution(user_id, name, currency)
            .await?
            .into())
    }

    async fn create_account(
        &self,
        user_id: i64,
        institution_id: i64,
        name: &str,
        currency: &str,
        ty: LedgerAccountType,
    ) -> Result<LedgerAccount> {
        let account = self
            .client
            .create_account(user_id, institution_id, name, currency, to_remote_type(ty))
            .await?;

        LedgerAccount::try_from(account)
    }

    async fn update_balance(
        &self,
        account: &LedgerAccount,
        balance: Decimal,
        as_of: NaiveDate,
    ) -> Result<()> {
        self.client
            .update_transaction_account(
                account.transaction_account_id,
                account.institution.id,
                balance,
                as_of,
            )
            .await?;

        Ok(())
    }

    async fn search_transactions(
        &self,
        transaction_account_id: i64,
        start: NaiveDate,
        end: NaiveDate,
        reference: &str,
    ) -> Result<Vec<LedgerTransaction>> {
        Ok(self
            .client
            .transactions(transaction_account_id, start, end, Some(reference))
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn search_by_memo(
        &self,
        transaction_account_id: i64,
        date: NaiveDate,
        token: &str,
    ) -> Result<Vec<LedgerTransaction>> {
        Ok(self
            .client
            .transactions(transaction_account_id, date, date, None)
            .await?
            .into_iter()
            .map(LedgerTransaction::from)
            .filter(|tx| memo_has_token(&tx.memo, token))
            .collect())
    }

    async fn add_transaction(
        &self,
        transaction_account_id: i64,
        tx: &NewTransaction,
    ) -> Result<LedgerTransaction> {
        Ok(self
            .client
            .add_transaction(transaction_account_id, &to_input(tx))
            .await?
            .into())
    }

    async fn update_transaction(&self, id: i64, tx: &NewTransaction) -> Result<()> {
        self.client.update_transaction(id, &to_input(tx)).await?;

        Ok(())
    }
}
