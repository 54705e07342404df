use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::accounts::{self, name, ResolveError};
use crate::core::{LedgerAccount, SourceAccount};
use crate::ledger::Ledger;
use crate::txn::{InsertFailure, Reconciler, Summary};
use crate::upstream::{all_transactions, Aggregator};

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Earliest transaction date pulled from the aggregator.
    pub since: NaiveDate,
    pub page_size: u32,
    pub insert_failure: InsertFailure,
    /// Date recorded with balance updates.
    pub today: NaiveDate,
}

/// Outcome of one account's sync, for the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountReport {
    pub account: String,
    pub summary: Summary,
}

/// Mirrors every eligible aggregator account into the ledger, one account at
/// a time. Ambiguous accounts are skipped; ledger failures while resolving or
/// creating an account abort the run.
pub async fn sync_accounts<A, L>(
    aggregator: &A,
    ledger: &L,
    user_id: i64,
    options: &SyncOptions,
) -> Result<Vec<AccountReport>>
where
    A: Aggregator + ?Sized,
    L: Ledger + ?Sized,
{
    let institutions: HashMap<i64, String> = aggregator
        .credentials()
        .await
        .context("failed to fetch aggregator credentials")?
        .into_iter()
        .map(|c| (c.id, c.institution_name))
        .collect();
    let source_accounts = aggregator
        .accounts()
        .await
        .context("failed to fetch aggregator accounts")?;

    let mut reports = vec![];
    for account in source_accounts.iter() {
        if !account.is_syncable() {
            info!(
                "Skipping account {} ({:?}, {:?}).",
                account.name, account.ty, account.status
            );
            continue;
        }

        let institution = match institutions.get(&account.credential_id) {
            Some(institution) => institution,
            None => {
                warn!(
                    "No credential {} found for account {}, skipping.",
                    account.credential_id, account.name
                );
                continue;
            }
        };

        if let Some(report) =
            sync_account(aggregator, ledger, user_id, institution, account, options).await?
        {
            reports.push(report);
        }
    }

    Ok(reports)
}

#[tracing::instrument(skip_all, fields(account = %account.name))]
async fn sync_account<A, L>(
    aggregator: &A,
    ledger: &L,
    user_id: i64,
    institution: &str,
    account: &SourceAccount,
    options: &SyncOptions,
) -> Result<Option<AccountReport>>
where
    A: Aggregator + ?Sized,
    L: Ledger + ?Sized,
{
    let title = name::display_name(institution, &name::base_name(account));
    if account.nickname.is_empty() {
        info!("Processing account {}.", title);
    } else {
        info!("Processing account {} ({}).", title, account.nickname);
    }

    let target = match resolve(ledger, user_id, institution, account).await? {
        Some(target) => target,
        None => return Ok(None),
    };

    let txs = all_transactions(aggregator, account.id, options.since, options.page_size)
        .await
        .with_context(|| format!("failed to fetch transactions for {}", title))?;
    info!("Pulled {} transactions for {}.", txs.len(), title);

    let summary = Reconciler::new(ledger, target.transaction_account_id, options.insert_failure)
        .reconcile(txs)
        .await?;
    info!(
        "Reconciled {} transactions for {}: {} inserted, {} migrated, {} failed.",
        summary.seen, title, summary.inserted, summary.migrated, summary.failed
    );

    update_balance(ledger, user_id, institution, account, options.today).await;

    Ok(Some(AccountReport {
        account: title,
        summary,
    }))
}

/// `None` when the account cannot be matched unambiguously.
async fn resolve<L: Ledger + ?Sized>(
    ledger: &L,
    user_id: i64,
    institution: &str,
    account: &SourceAccount,
) -> Result<Option<LedgerAccount>> {
    match accounts::resolve(ledger, user_id, institution, account).await {
        Ok(target) => Ok(Some(target)),
        Err(ResolveError::Ambiguous(ambiguity)) => {
            error!("Skipping account {}: {}", account.name, ambiguity);
            Ok(None)
        }
        Err(ResolveError::Ledger(err)) => Err(err)
            .with_context(|| format!("failed to resolve ledger account for {}", account.name)),
    }
}

/// Brings the ledger balance in line with the aggregator's. Failures are
/// logged only, the transactions are already synced.
async fn update_balance<L: Ledger + ?Sized>(
    ledger: &L,
    user_id: i64,
    institution: &str,
    account: &SourceAccount,
    today: NaiveDate,
) {
    let target = match accounts::resolve(ledger, user_id, institution, account).await {
        Ok(target) => target,
        Err(err) => {
            error!("Error looking up ledger account for {}: {}", account.name, err);
            return;
        }
    };

    if target.balance == account.balance {
        return;
    }

    info!(
        "Updating balance of {} from {} to {}.",
        target.title, target.balance, account.balance
    );
    if let Err(err) = ledger.update_balance(&target, account.balance, today).await {
        error!("Error updating balance of {}: {}", target.title, err);
    }
}
