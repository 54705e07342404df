use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Memo key marking the aggregator transaction a ledger record came from.
pub const VENDOR_ID_KEY: &str = "mtid";

#[derive(Debug, Clone)]
pub struct SourceTransaction {
    pub id: i64,
    /// The aggregator's immutable id for the underlying bank record.
    pub vendor_id: i64,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description_pretty: String,
    pub description_guest: Option<String>,
    pub account_id: i64,
}

impl SourceTransaction {
    /// The user's own description wins over the generated one.
    pub fn description(&self) -> &str {
        match self.description_guest.as_deref().map(str::trim) {
            Some(guest) if !guest.is_empty() => guest,
            _ => self.description_pretty.trim(),
        }
    }

    pub fn vendor_token(&self) -> String {
        vendor_token(self.vendor_id)
    }
}

pub fn vendor_token(vendor_id: i64) -> String {
    format!("{}={}", VENDOR_ID_KEY, vendor_id)
}

/// Whether `memo` carries `token` as a whole, so `mtid=1` does not match a
/// memo holding `mtid=12`.
pub fn memo_has_token(memo: &str, token: &str) -> bool {
    memo.match_indices(token)
        .any(|(i, _)| !memo[i + token.len()..].starts_with(|c: char| c.is_ascii_digit()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTransaction {
    pub id: i64,
    pub payee: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub memo: String,
    pub note: String,
    pub is_transfer: bool,
    pub needs_review: bool,
}

impl LedgerTransaction {
    /// Records written before the memo convention carry no memo at all.
    pub fn is_legacy(&self) -> bool {
        self.memo.trim().is_empty()
    }
}

/// Fields written when creating or rewriting a ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub payee: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub memo: String,
    pub is_transfer: bool,
    pub needs_review: bool,
    pub cheque_number: String,
}
