use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub resource_server: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Bank,
    CreditCard,
    StoredValue,
    Point,
    Cash,
    Stock,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: i64,
    #[serde(default)]
    pub guest_id: i64,
    #[serde(default)]
    pub nickname: String,
    pub currency: String,
    pub credential_id: i64,
    pub account_type: AccountType,
    #[serde(default)]
    pub institution_account_number: Option<String>,
    #[serde(default)]
    pub institution_account_name: String,
    #[serde(default)]
    pub branch_name: Option<String>,
    pub status: String,
    #[serde(default)]
    pub last_success_at: Option<String>,
    #[serde(default)]
    pub current_balance: Decimal,
    #[serde(default)]
    pub current_balance_in_base: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AccountsResponse {
    pub accounts: Vec<Account>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub amount: Decimal,
    pub date: DateTime<FixedOffset>,
    #[serde(default)]
    pub description_guest: Option<String>,
    #[serde(default)]
    pub description_pretty: String,
    #[serde(default)]
    pub description_raw: Option<String>,
    pub raw_transaction_id: i64,
    pub account_id: i64,
    #[serde(default)]
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

/// A login at a financial institution. Every account belongs to exactly one
/// credential, which is also where the institution name lives.
#[derive(Debug, Clone, Deserialize)]
pub struct Credential {
    pub id: i64,
    pub institution_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub status_set_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub last_success: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub auto_run: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Guest {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub base_currency: Option<String>,
    #[serde(default)]
    pub credentials: Vec<Credential>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GuestResponse {
    pub guest: Guest,
}
