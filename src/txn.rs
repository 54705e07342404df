use std::cmp::Reverse;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::core::{LedgerTransaction, NewTransaction, SourceTransaction};
use crate::ledger::{self, Ledger};
use crate::sanitize::sanitize;

/// Once more than this many transactions in a row turn out to be synced
/// already, everything older is assumed synced as well.
pub const DUPLICATE_THRESHOLD: usize = 15;

/// Wire transfers are described with this marker by Japanese banks.
const TRANSFER_MARKER: &str = "振込";

/// What to do when the ledger rejects a new transaction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertFailure {
    /// Log the failure and continue with the next transaction.
    #[default]
    Skip,
    /// Stop the whole run.
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Already in the ledger, nothing written.
    Duplicate,
    /// This many legacy ledger records were rewritten in place.
    Migrated(usize),
    Inserted,
    /// A ledger call failed; the transaction was skipped.
    Failed,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub seen: usize,
    pub inserted: usize,
    pub migrated: usize,
    pub duplicates: usize,
    pub failed: usize,
    /// Set when the scan stopped early on a run of duplicates.
    pub short_circuited: bool,
}

impl Summary {
    fn record(&mut self, outcome: Outcome) {
        self.seen += 1;
        match outcome {
            Outcome::Duplicate => self.duplicates += 1,
            Outcome::Migrated(n) => self.migrated += n,
            Outcome::Inserted => self.inserted += 1,
            Outcome::Failed => self.failed += 1,
        }
    }
}

#[derive(Debug, Error)]
#[error("failed to insert transaction {vendor_id} into the ledger")]
pub struct InsertError {
    pub vendor_id: i64,
    #[source]
    pub source: ledger::Error,
}

/// The ledger record a source transaction should become.
pub fn to_ledger_record(tx: &SourceTransaction) -> NewTransaction {
    let description = tx.description();
    let payee = sanitize(description);

    NewTransaction {
        is_transfer: payee.contains(TRANSFER_MARKER),
        payee,
        amount: tx.amount,
        date: tx.date,
        memo: format!("{} {}", description, tx.vendor_token())
            .trim()
            .to_string(),
        needs_review: false,
        cheque_number: tx.vendor_id.to_string(),
    }
}

/// Mirrors the transactions of one source account into one ledger
/// transaction account. A reconciler is scoped to a single account's scan.
pub struct Reconciler<'a, L: Ledger + ?Sized> {
    ledger: &'a L,
    transaction_account_id: i64,
    on_insert_failure: InsertFailure,
    duplicates: usize,
}

impl<'a, L: Ledger + ?Sized> Reconciler<'a, L> {
    pub fn new(ledger: &'a L, transaction_account_id: i64, on_insert_failure: InsertFailure) -> Self {
        Self {
            ledger,
            transaction_account_id,
            on_insert_failure,
            duplicates: 0,
        }
    }

    /// Processes `txs` newest first. Per-transaction failures are logged and
    /// skipped; only an insert failure under [`InsertFailure::Abort`] ends the
    /// scan with an error.
    #[tracing::instrument(skip(self, txs), fields(account = self.transaction_account_id))]
    pub async fn reconcile(mut self, mut txs: Vec<SourceTransaction>) -> Result<Summary, InsertError> {
        txs.sort_by_key(|tx| Reverse(tx.date));

        let total = txs.len();
        let mut summary = Summary::default();
        for (i, tx) in txs.iter().enumerate() {
            if self.duplicates > DUPLICATE_THRESHOLD {
                info!(
                    "Too many repeated transactions found, likely everything processed already. Skipping {} older transactions.",
                    total - i
                );
                summary.short_circuited = true;
                break;
            }

            info!(
                "[{}/{}] Processing transaction {} {} {}",
                i + 1,
                total,
                tx.id,
                tx.description(),
                tx.date
            );
            let outcome = self.reconcile_one(tx).await?;
            summary.record(outcome);
        }

        Ok(summary)
    }

    async fn reconcile_one(&mut self, tx: &SourceTransaction) -> Result<Outcome, InsertError> {
        let record = to_ledger_record(tx);
        let token = tx.vendor_token();

        match self
            .ledger
            .search_by_memo(self.transaction_account_id, tx.date, &token)
            .await
        {
            Ok(found) if !found.is_empty() => {
                debug!("Transaction {} already synced as {}.", token, found[0].id);
                self.duplicates += 1;
                return Ok(Outcome::Duplicate);
            }
            Ok(_) => {}
            Err(err) => {
                error!("Error searching transactions by memo {}: {}", token, err);
                return Ok(Outcome::Failed);
            }
        }

        let matches = match self
            .ledger
            .search_transactions(
                self.transaction_account_id,
                tx.date,
                tx.date,
                &tx.id.to_string(),
            )
            .await
        {
            Ok(matches) => matches,
            Err(err) => {
                error!("Error searching transactions for {}: {}", tx.id, err);
                return Ok(Outcome::Failed);
            }
        };

        if !matches.is_empty() {
            return Ok(self.migrate(&matches, &record).await);
        }

        self.duplicates = 0;
        match self
            .ledger
            .add_transaction(self.transaction_account_id, &record)
            .await
        {
            Ok(created) => {
                debug!("Added ledger transaction {}.", created.id);
                Ok(Outcome::Inserted)
            }
            Err(err) => match self.on_insert_failure {
                InsertFailure::Skip => {
                    error!("Error adding transaction {}: {}", token, err);
                    Ok(Outcome::Failed)
                }
                InsertFailure::Abort => Err(InsertError {
                    vendor_id: tx.vendor_id,
                    source: err,
                }),
            },
        }
    }

    /// Rewrites matches without a memo, which predate the vendor id
    /// convention. Matches that all carry a memo mean the transaction is
    /// already synced.
    async fn migrate(
        &mut self,
        matches: &[LedgerTransaction],
        record: &NewTransaction,
    ) -> Outcome {
        let mut legacy = 0;
        let mut migrated = 0;
        for existing in matches.iter().filter(|m| m.is_legacy()) {
            legacy += 1;
            info!(
                "Memo not set, updating transaction {} to the new format: {}",
                existing.id, record.payee
            );
            match self.ledger.update_transaction(existing.id, record).await {
                Ok(()) => migrated += 1,
                Err(err) => error!("Error updating transaction {}: {}", existing.id, err),
            }
        }

        if migrated > 0 {
            self.duplicates = 0;
            return Outcome::Migrated(migrated);
        }
        if legacy > 0 {
            return Outcome::Failed;
        }

        info!("Found transaction already, won't add it again: {}", record.payee);
        self.duplicates += 1;
        Outcome::Duplicate
    }
}
