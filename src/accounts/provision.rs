use rusty_money::iso;
use tracing::{info, warn};

use crate::core::{LedgerAccount, LedgerAccountType, SourceAccountType};
use crate::ledger::{Error, Ledger, Result};

/// Currency codes as the ledger expects them, lower-case ISO 4217.
pub fn currency_code(code: &str) -> String {
    let code = code.trim();
    match iso::find(&code.to_uppercase()) {
        Some(currency) => currency.iso_alpha_code.to_lowercase(),
        None => {
            warn!("unknown currency code {:?}, passing it through", code);
            code.to_lowercase()
        }
    }
}

/// Returns the ledger account titled exactly `display_name`, creating it (and
/// its institution when missing) on first use. Lookups failing for any reason
/// other than [`Error::NotFound`] abort.
#[tracing::instrument(skip(ledger))]
pub async fn find_or_create<L: Ledger + ?Sized>(
    ledger: &L,
    user_id: i64,
    institution: &str,
    display_name: &str,
    ty: SourceAccountType,
    currency: &str,
) -> Result<LedgerAccount> {
    match ledger.find_account_by_name(user_id, display_name).await {
        Ok(account) => return Ok(account),
        Err(Error::NotFound) => {}
        Err(e) => return Err(e),
    }

    let currency = currency_code(currency);
    let ins = match ledger.find_institution_by_name(user_id, institution).await {
        Ok(ins) => ins,
        Err(Error::NotFound) => {
            info!("Creating institution {}.", institution);
            ledger
                .create_institution(user_id, institution, &currency)
                .await?
        }
        Err(e) => return Err(e),
    };

    info!("Creating ledger account {}.", display_name);
    ledger
        .create_account(
            user_id,
            ins.id,
            display_name,
            &currency,
            LedgerAccountType::from(ty),
        )
        .await
}
