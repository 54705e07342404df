use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub base_currency_code: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Bank,
    Credits,
    Loans,
    Mortgage,
    Stocks,
    Vehicle,
    Property,
    Insurance,
    OtherAsset,
    OtherLiability,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Institution {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub currency_code: Option<String>,
}

/// The sub-resource of an account which actually holds transactions and the
/// running balance.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionAccount {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub current_balance: Decimal,
    pub institution: Institution,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: i64,
    pub title: String,
    pub currency_code: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(default)]
    pub current_balance: Decimal,
    #[serde(default)]
    pub primary_transaction_account: Option<TransactionAccount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub id: i64,
    #[serde(default)]
    pub payee: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub cheque_number: Option<String>,
    #[serde(default)]
    pub is_transfer: Option<bool>,
    #[serde(default)]
    pub needs_review: bool,
}

/// Request body shared by the transaction create and update endpoints.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransactionInput {
    pub payee: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub date: NaiveDate,
    pub is_transfer: bool,
    pub needs_review: bool,
    pub memo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cheque_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateInstitutionRequest<'a> {
    pub title: &'a str,
    pub currency_code: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateAccountRequest<'a> {
    pub institution_id: i64,
    pub title: &'a str,
    pub currency_code: &'a str,
    #[serde(rename = "type")]
    pub account_type: AccountType,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateTransactionAccountRequest {
    pub institution_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub starting_balance: Decimal,
    pub starting_balance_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn decodes_account_with_primary_transaction_account() {
        let account: Account = serde_json::from_str(
            r#"{
                "id": 42,
                "title": "Sunrise Bank - Checking",
                "currency_code": "jpy",
                "type": "bank",
                "current_balance": 1200.5,
                "primary_transaction_account": {
                    "id": 77,
                    "name": "Checking",
                    "current_balance": 1200.5,
                    "institution": {"id": 9, "title": "Sunrise Bank", "currency_code": "jpy"}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(account.account_type, AccountType::Bank);
        assert_eq!(account.current_balance, Decimal::from_str("1200.5").unwrap());
        let primary = account.primary_transaction_account.unwrap();
        assert_eq!(primary.id, 77);
        assert_eq!(primary.institution.title, "Sunrise Bank");
    }

    #[test]
    fn unknown_account_type_does_not_fail_decoding() {
        let account: Account = serde_json::from_str(
            r#"{"id": 1, "title": "Bitcoin", "currency_code": "usd", "type": "crypto"}"#,
        )
        .unwrap();

        assert_eq!(account.account_type, AccountType::Unknown);
        assert!(account.primary_transaction_account.is_none());
    }

    #[test]
    fn decodes_transaction_with_null_memo() {
        let tx: Transaction = serde_json::from_str(
            r#"{"id": 5, "payee": "Cafe", "amount": -450, "date": "2023-04-01", "memo": null, "note": "Cafe 1001"}"#,
        )
        .unwrap();

        assert_eq!(tx.memo, None);
        assert_eq!(tx.amount, Decimal::from(-450));
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2023, 4, 1).unwrap());
    }

    #[test]
    fn transaction_input_serializes_amount_as_number() {
        let input = TransactionInput {
            payee: "Cafe".into(),
            amount: Decimal::from_str("-450.25").unwrap(),
            date: NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
            is_transfer: false,
            needs_review: false,
            memo: "Cafe mtid=12".into(),
            note: None,
            cheque_number: Some("12".into()),
        };

        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["amount"], serde_json::json!(-450.25));
        assert_eq!(value["date"], "2023-04-01");
        assert!(value.get("note").is_none());
    }
}
