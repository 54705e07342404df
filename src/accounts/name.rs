use crate::core::SourceAccount;

/// Currency whose accounts are named without a currency marker.
const HOME_CURRENCY: &str = "JPY";

/// Lower-cases `title` and collapses whitespace runs into single spaces so
/// that titles compare equal regardless of case and spacing.
pub fn normalize(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// The account name without the institution, e.g. `"Savings (1234)"`. Foreign
/// currency accounts get the currency spelled out unless the name already
/// mentions it.
pub fn base_name(account: &SourceAccount) -> String {
    let name = account.name.trim();
    let number = account.number.as_deref().unwrap_or_default().trim();
    let currency = account.currency.trim().to_uppercase();

    // A missing number still renders as "()", as in titles already in the ledger.
    let plain = format!("{} ({})", name, number);

    if currency.is_empty() || currency == HOME_CURRENCY {
        return plain;
    }

    let prefix = currency.get(..2).unwrap_or(currency.as_str());
    if plain.contains(&currency) && plain.contains(prefix) {
        return plain;
    }

    format!("{} ({}) ({})", name, currency, number)
}

/// The composed `"Institution - Account"` title this tool gives ledger
/// accounts it creates.
pub fn display_name(institution: &str, base: &str) -> String {
    if institution.trim().is_empty() {
        return base.to_string();
    }

    format!("{} - {}", institution, base)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::core::{AccountStatus, SourceAccountType};

    fn account(name: &str, number: Option<&str>, currency: &str) -> SourceAccount {
        SourceAccount {
            id: 1,
            name: name.into(),
            number: number.map(Into::into),
            nickname: String::new(),
            currency: currency.into(),
            ty: SourceAccountType::Bank,
            status: AccountStatus::Open,
            balance: Decimal::ZERO,
            credential_id: 1,
        }
    }

    #[test]
    fn normalize_collapses_case_and_spacing() {
        assert_eq!(normalize("  My   Bank "), "my bank");
        assert_eq!(normalize("Sunrise\tBank\n-  Checking"), "sunrise bank - checking");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in ["  My   Bank ", "ＡＢＣ  x", "a\u{3000}b", "Already normal"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "{:?}", input);
        }
    }

    #[test]
    fn base_name_includes_account_number() {
        assert_eq!(base_name(&account("Savings", Some("1234"), "JPY")), "Savings (1234)");
        assert_eq!(base_name(&account("Wallet", None, "JPY")), "Wallet ()");
        assert_eq!(base_name(&account("Wallet", Some("  "), "JPY")), "Wallet ()");
    }

    #[test]
    fn foreign_currency_is_spelled_out_once() {
        assert_eq!(
            base_name(&account("Savings", Some("1234"), "USD")),
            "Savings (USD) (1234)"
        );
        assert_eq!(
            base_name(&account("USD Savings", Some("1234"), "USD")),
            "USD Savings (1234)"
        );
        assert_eq!(base_name(&account("Travel", None, "EUR")), "Travel (EUR) ()");
    }

    #[test]
    fn display_name_prefixes_institution() {
        assert_eq!(display_name("Sunrise Bank", "Checking"), "Sunrise Bank - Checking");
        assert_eq!(display_name("  ", "Checking"), "Checking");
    }
}
