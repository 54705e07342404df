pub mod moneytree;
#[cfg(test)]
pub mod testing;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::core::{Credential, SourceAccount, SourceTransaction};

/// The aggregator accounts and transactions are pulled from.
#[async_trait]
pub trait Aggregator: Send + Sync {
    async fn credentials(&self) -> Result<Vec<Credential>>;

    async fn accounts(&self) -> Result<Vec<SourceAccount>>;

    /// One page of an account's transactions dated on or after `since`.
    /// Pages are numbered from 1 and an empty page ends the listing.
    async fn transactions(
        &self,
        account_id: i64,
        since: NaiveDate,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<SourceTransaction>>;

    /// Starts a refresh of every credential. Completes before the refresh
    /// itself does.
    async fn refresh_all(&self) -> Result<()>;
}

/// Drains every page of an account's transactions.
pub async fn all_transactions<A: Aggregator + ?Sized>(
    source: &A,
    account_id: i64,
    since: NaiveDate,
    per_page: u32,
) -> Result<Vec<SourceTransaction>> {
    let mut merged = vec![];
    let mut page = 1;
    loop {
        let mut txs = source.transactions(account_id, since, page, per_page).await?;
        if txs.is_empty() {
            break;
        }

        merged.append(&mut txs);
        page += 1;
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::testing::{transaction, StaticAggregator};
    use super::*;

    #[tokio::test]
    async fn drains_all_pages() {
        let mut source = StaticAggregator::default();
        source.transactions.insert(
            7,
            (1..=5)
                .map(|i| transaction(i, 7, "2023-01-01", "Cafe"))
                .collect(),
        );
        let since = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();

        let txs = all_transactions(&source, 7, since, 2).await.unwrap();

        assert_eq!(txs.len(), 5);
        assert_eq!(source.pages_fetched(), 4);
    }
}
