//! Canned aggregator used by tests.
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::core::{Credential, SourceAccount, SourceTransaction};

use super::Aggregator;

#[derive(Debug, Default)]
pub struct StaticAggregator {
    pub credentials: Vec<Credential>,
    pub accounts: Vec<SourceAccount>,
    pub transactions: HashMap<i64, Vec<SourceTransaction>>,
    pages: AtomicUsize,
}

impl StaticAggregator {
    pub fn pages_fetched(&self) -> usize {
        self.pages.load(Ordering::SeqCst)
    }
}

/// A transaction whose vendor id is derived from `id` so both stay unique.
pub fn transaction(id: i64, account_id: i64, date: &str, description: &str) -> SourceTransaction {
    SourceTransaction {
        id,
        vendor_id: 10_000 + id,
        amount: Decimal::from(-100 * id),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        description_pretty: description.to_string(),
        description_guest: None,
        account_id,
    }
}

#[async_trait]
impl Aggregator for StaticAggregator {
    async fn credentials(&self) -> Result<Vec<Credential>> {
        Ok(self.credentials.clone())
    }

    async fn accounts(&self) -> Result<Vec<SourceAccount>> {
        Ok(self.accounts.clone())
    }

    async fn transactions(
        &self,
        account_id: i64,
        _since: NaiveDate,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<SourceTransaction>> {
        self.pages.fetch_add(1, Ordering::SeqCst);

        let all = self.transactions.get(&account_id).cloned().unwrap_or_default();
        Ok(all
            .into_iter()
            .skip(((page - 1) * per_page) as usize)
            .take(per_page as usize)
            .collect())
    }

    async fn refresh_all(&self) -> Result<()> {
        Ok(())
    }
}
