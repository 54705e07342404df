use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceAccountType {
    Bank,
    CreditCard,
    StoredValue,
    Point,
    Cash,
    Stock,
    Other,
}

impl SourceAccountType {
    /// Point and cash balances have no counterpart in the ledger.
    pub fn is_supported(&self) -> bool {
        !matches!(self, SourceAccountType::Point | SourceAccountType::Cash)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone)]
pub struct SourceAccount {
    pub id: i64,
    pub name: String,
    pub number: Option<String>,
    pub nickname: String,
    pub currency: String,
    pub ty: SourceAccountType,
    pub status: AccountStatus,
    pub balance: Decimal,
    pub credential_id: i64,
}

impl SourceAccount {
    pub fn is_syncable(&self) -> bool {
        self.status == AccountStatus::Open && self.ty.is_supported()
    }
}

/// An aggregator login at one institution, used to name the institution of
/// the accounts it owns and to observe refresh progress.
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: i64,
    pub institution_name: String,
    pub status: String,
    pub status_set_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerAccountType {
    Bank,
    Credit,
    Stocks,
    OtherAsset,
    Other,
}

impl From<SourceAccountType> for LedgerAccountType {
    fn from(ty: SourceAccountType) -> Self {
        match ty {
            SourceAccountType::Bank => LedgerAccountType::Bank,
            SourceAccountType::CreditCard => LedgerAccountType::Credit,
            // Prepaid wallets behave like a bank balance.
            SourceAccountType::StoredValue => LedgerAccountType::Bank,
            SourceAccountType::Stock => LedgerAccountType::Stocks,
            SourceAccountType::Point => LedgerAccountType::OtherAsset,
            SourceAccountType::Cash | SourceAccountType::Other => LedgerAccountType::OtherAsset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Institution {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAccount {
    pub id: i64,
    pub title: String,
    pub currency: String,
    pub ty: LedgerAccountType,
    pub balance: Decimal,
    /// The transaction account actually holding transactions and balance.
    pub transaction_account_id: i64,
    pub institution: Institution,
}
