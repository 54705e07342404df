use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use moneytree::Client;

use crate::core::{
    AccountStatus, Credential, SourceAccount, SourceAccountType, SourceTransaction,
};

use super::Aggregator;

pub struct Source {
    client: Client,
}

impl Source {
    /// Wraps a client which has already been authenticated.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn to_account_type(ty: moneytree::AccountType) -> SourceAccountType {
    match ty {
        moneytree::AccountType::Bank => SourceAccountType::Bank,
        moneytree::AccountType::CreditCard => SourceAccountType::CreditCard,
        moneytree::AccountType::StoredValue => SourceAccountType::StoredValue,
        moneytree::AccountType::Point => SourceAccountType::Point,
        moneytree::AccountType::Cash => SourceAccountType::Cash,
        moneytree::AccountType::Stock => SourceAccountType::Stock,
        moneytree::AccountType::Unknown => SourceAccountType::Other,
    }
}

fn to_canonical_account(account: moneytree::Account) -> SourceAccount {
    SourceAccount {
        id: account.id,
        name: account.institution_account_name,
        number: account.institution_account_number,
        nickname: account.nickname,
        currency: account.currency,
        ty: to_account_type(account.account_type),
        status: if account.status == "closed" {
            AccountStatus::Closed
        } else {
            AccountStatus::Open
        },
        balance: account.current_balance,
        credential_id: account.credential_id,
    }
}

fn to_canonical_txn(tx: moneytree::Transaction) -> SourceTransaction {
    SourceTransaction {
        id: tx.id,
        vendor_id: tx.raw_transaction_id,
        amount: tx.amount,
        date: tx.date.date_naive(),
        description_pretty: tx.description_pretty,
        description_guest: tx.description_guest,
        account_id: tx.account_id,
    }
}

fn to_canonical_credential(credential: moneytree::Credential) -> Credential {
    Credential {
        id: credential.id,
        institution_name: credential.institution_name,
        status: credential.status,
        status_set_at: credential.status_set_at.map(|t| t.with_timezone(&Utc)),
    }
}

#[async_trait]
impl Aggregator for Source {
    async fn credentials(&self) -> Result<Vec<Credential>> {
        Ok(self
            .client
            .guest()
            .await?
            .credentials
            .into_iter()
            .map(to_canonical_credential)
            .collect())
    }

    async fn accounts(&self) -> Result<Vec<SourceAccount>> {
        Ok(self
            .client
            .accounts()
            .await?
            .into_iter()
            .map(to_canonical_account)
            .collect())
    }

    async fn transactions(
        &self,
        account_id: i64,
        since: NaiveDate,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<SourceTransaction>> {
        Ok(self
            .client
            .transactions(account_id, since, page, per_page)
            .await?
            .into_iter()
            .map(to_canonical_txn)
            .collect())
    }

    async fn refresh_all(&self) -> Result<()> {
        Ok(self.client.refresh_all_credentials().await?)
    }
}
