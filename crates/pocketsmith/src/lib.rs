//! A small client for the parts of the PocketSmith v2 API needed to mirror
//! accounts and transactions from another service.
mod model;

pub use model::*;

use model::{CreateAccountRequest, CreateInstitutionRequest, UpdateTransactionAccountRequest};

use chrono::NaiveDate;
use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const BASE_URL: &str = "https://api.pocketsmith.com/v2/";
const TOKEN_HEADER: &str = "X-Developer-Key";
const TRANSACTIONS_PER_PAGE: &str = "1000";

#[derive(Debug, Error)]
pub enum Error {
    #[error("resource not found")]
    NotFound,
    #[error("pocketsmith returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("invalid request url")]
    Url(#[from] url::ParseError),
    #[error("request to pocketsmith failed")]
    Http(#[from] reqwest::Error),
    #[error("unable to parse pocketsmith response")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base: Url,
    token: String,
}

impl Client {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: Url::parse(BASE_URL).expect("constant url"),
            token: token.into(),
        }
    }

    /// Points the client at a different API root. The root should end with a
    /// trailing slash, paths are joined relative to it.
    pub fn with_base_url(mut self, base: &str) -> Result<Self> {
        self.base = Url::parse(base)?;
        Ok(self)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    async fn send<T, B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut req = self
            .http
            .request(method, url)
            .header(TOKEN_HEADER, &self.token)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound);
        }
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        Ok(serde_json::from_str(&text)?)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        self.send::<T, ()>(Method::GET, url, None).await
    }

    pub async fn current_user(&self) -> Result<User> {
        self.get(self.endpoint("me")?).await
    }

    pub async fn accounts(&self, user_id: i64) -> Result<Vec<Account>> {
        self.get(self.endpoint(&format!("users/{}/accounts", user_id))?)
            .await
    }

    /// Returns the account whose title is exactly `name`, or
    /// [`Error::NotFound`].
    pub async fn find_account_by_name(&self, user_id: i64, name: &str) -> Result<Account> {
        find_by_title(self.accounts(user_id).await?, name, |a| &a.title).ok_or(Error::NotFound)
    }

    pub async fn institutions(&self, user_id: i64) -> Result<Vec<Institution>> {
        self.get(self.endpoint(&format!("users/{}/institutions", user_id))?)
            .await
    }

    pub async fn find_institution_by_name(&self, user_id: i64, name: &str) -> Result<Institution> {
        find_by_title(self.institutions(user_id).await?, name, |i| &i.title)
            .ok_or(Error::NotFound)
    }

    pub async fn create_institution(
        &self,
        user_id: i64,
        title: &str,
        currency_code: &str,
    ) -> Result<Institution> {
        let url = self.endpoint(&format!("users/{}/institutions", user_id))?;
        let body = CreateInstitutionRequest {
            title,
            currency_code,
        };

        self.send(Method::POST, url, Some(&body)).await
    }

    pub async fn create_account(
        &self,
        user_id: i64,
        institution_id: i64,
        title: &str,
        currency_code: &str,
        account_type: AccountType,
    ) -> Result<Account> {
        let url = self.endpoint(&format!("users/{}/accounts", user_id))?;
        let body = CreateAccountRequest {
            institution_id,
            title,
            currency_code,
            account_type,
        };

        self.send(Method::POST, url, Some(&body)).await
    }

    /// Resets the balance of a transaction account as of `date`.
    pub async fn update_transaction_account(
        &self,
        transaction_account_id: i64,
        institution_id: i64,
        balance: Decimal,
        date: NaiveDate,
    ) -> Result<TransactionAccount> {
        let url = self.endpoint(&format!("transaction_accounts/{}", transaction_account_id))?;
        let body = UpdateTransactionAccountRequest {
            institution_id,
            starting_balance: balance,
            starting_balance_date: date,
        };

        self.send(Method::PUT, url, Some(&body)).await
    }

    /// Lists transactions of a transaction account between `start` and `end`
    /// inclusive, optionally narrowed by PocketSmith's free-text search.
    pub async fn transactions(
        &self,
        transaction_account_id: i64,
        start: NaiveDate,
        end: NaiveDate,
        search: Option<&str>,
    ) -> Result<Vec<Transaction>> {
        let url = transactions_url(
            &self.endpoint(&format!(
                "transaction_accounts/{}/transactions",
                transaction_account_id
            ))?,
            start,
            end,
            search,
        );

        self.get(url).await
    }

    pub async fn add_transaction(
        &self,
        transaction_account_id: i64,
        tx: &TransactionInput,
    ) -> Result<Transaction> {
        let url = self.endpoint(&format!(
            "transaction_accounts/{}/transactions",
            transaction_account_id
        ))?;

        self.send(Method::POST, url, Some(tx)).await
    }

    pub async fn update_transaction(&self, id: i64, tx: &TransactionInput) -> Result<Transaction> {
        let url = self.endpoint(&format!("transactions/{}", id))?;

        self.send(Method::PUT, url, Some(tx)).await
    }
}

fn find_by_title<T, F>(items: Vec<T>, title: &str, f: F) -> Option<T>
where
    F: Fn(&T) -> &String,
{
    items.into_iter().find(|item| f(item) == title)
}

fn transactions_url(base: &Url, start: NaiveDate, end: NaiveDate, search: Option<&str>) -> Url {
    let mut url = base.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("start_date", &start.format("%Y-%m-%d").to_string())
            .append_pair("end_date", &end.format("%Y-%m-%d").to_string())
            .append_pair("per_page", TRANSACTIONS_PER_PAGE);
        if let Some(search) = search {
            pairs.append_pair("search", search);
        }
    }

    url
}

fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ApiError {
        error: String,
    }

    match serde_json::from_str::<ApiError>(body) {
        Ok(e) => e.error,
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_joined_under_api_root() {
        let client = Client::new("token");

        assert_eq!(
            client.endpoint("users/3/accounts").unwrap().as_str(),
            "https://api.pocketsmith.com/v2/users/3/accounts"
        );
    }

    #[test]
    fn custom_base_url_is_respected() {
        let client = Client::new("token")
            .with_base_url("http://127.0.0.1:9000/api/")
            .unwrap();

        assert_eq!(
            client.endpoint("me").unwrap().as_str(),
            "http://127.0.0.1:9000/api/me"
        );
    }

    #[test]
    fn transaction_query_encodes_search_term() {
        let base = Url::parse("https://api.pocketsmith.com/v2/transaction_accounts/1/transactions")
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();

        let url = transactions_url(&base, date, date, Some("mtid=5 x"));

        assert_eq!(
            url.query(),
            Some("start_date=2023-01-02&end_date=2023-01-02&per_page=1000&search=mtid%3D5+x")
        );
    }

    #[test]
    fn title_lookup_is_exact() {
        let titles = vec!["Checking".to_string(), "Sunrise - Checking".to_string()];

        assert_eq!(
            find_by_title(titles.clone(), "Checking", |t| t),
            Some("Checking".to_string())
        );
        assert_eq!(find_by_title(titles, "checking", |t| t), None);
    }

    #[test]
    fn api_error_message_prefers_error_field() {
        assert_eq!(error_message(r#"{"error": "Invalid token"}"#), "Invalid token");
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
    }
}
