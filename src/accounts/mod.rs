//! Deciding which ledger account a source account is mirrored into.
mod matcher;
pub mod name;
mod provision;

pub use matcher::{find_matching_account, Ambiguity, Match};
pub use provision::find_or_create;

use thiserror::Error;
use tracing::debug;

use crate::core::{LedgerAccount, SourceAccount};
use crate::ledger::{self, Ledger};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Ambiguous(#[from] Ambiguity),
    #[error(transparent)]
    Ledger(#[from] ledger::Error),
}

/// Finds the ledger account for `account` among the user's existing accounts,
/// falling back to find-or-create by display name when nothing matches.
pub async fn resolve<L: Ledger + ?Sized>(
    ledger: &L,
    user_id: i64,
    institution: &str,
    account: &SourceAccount,
) -> Result<LedgerAccount, ResolveError> {
    let base = name::base_name(account);
    let display = name::display_name(institution, &base);
    let candidates = ledger.accounts(user_id).await?;

    match find_matching_account(&candidates, institution, &base, &display) {
        Match::Found(found) => {
            debug!(account = %found.title, "matched existing ledger account");
            Ok(found.clone())
        }
        Match::Ambiguous(ambiguity) => Err(ambiguity.into()),
        Match::NotFound => Ok(find_or_create(
            ledger,
            user_id,
            institution,
            &display,
            account.ty,
            &account.currency,
        )
        .await?),
    }
}
