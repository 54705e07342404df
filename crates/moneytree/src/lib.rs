//! Client for the Moneytree guest API, authenticating with the same password
//! grant the mobile application uses.
mod model;

pub use model::*;

use model::{AccountsResponse, GuestResponse, TransactionsResponse};

use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use url::Url;

const AUTH_URL: &str = "https://myaccount.getmoneytree.com/oauth/token";
const API_URL: &str = "https://jp-api.getmoneytree.com/v8/api/";
const API_VERSION: &str = "20180814";
const CLIENT_USER_AGENT: &str = "Moneytree/1.16.3 (Android 12; en_AU; Pixel 3)";
const LOCALE: &str = "en_AU";

#[derive(Debug, Error)]
pub enum Error {
    #[error("not authenticated, call authenticate first")]
    Unauthenticated,
    #[error("moneytree returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("invalid header value")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
    #[error("invalid request url")]
    Url(#[from] url::ParseError),
    #[error("request to moneytree failed")]
    Http(#[from] reqwest::Error),
    #[error("unable to parse moneytree response")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    client_id: &'a str,
    grant_type: &'a str,
    guest_login: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    access_token: Option<String>,
    auth_url: Url,
    api_url: Url,
}

impl Client {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            access_token: None,
            auth_url: Url::parse(AUTH_URL).expect("constant url"),
            api_url: Url::parse(API_URL).expect("constant url"),
        }
    }

    pub fn with_urls(mut self, auth_url: &str, api_url: &str) -> Result<Self> {
        self.auth_url = Url::parse(auth_url)?;
        self.api_url = Url::parse(api_url)?;
        Ok(self)
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Exchanges guest credentials for an access token which is kept on the
    /// client for subsequent calls.
    pub async fn authenticate(&mut self, guest_login: &str, password: &str) -> Result<Token> {
        let body = PasswordGrant {
            client_id: &self.api_key,
            grant_type: "password",
            guest_login,
            password,
        };
        let req = self
            .http
            .post(self.auth_url.clone())
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .header("locale", "en-US-POSIX")
            .json(&body);

        let token: Token = decode(req).await?;
        self.access_token = Some(token.access_token.clone());

        Ok(token)
    }

    fn api_headers(&self) -> Result<HeaderMap> {
        let token = self.access_token.as_ref().ok_or(Error::Unauthenticated)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        headers.insert("accept-language", HeaderValue::from_static(LOCALE));
        headers.insert("locale", HeaderValue::from_static(LOCALE));
        headers.insert("x-api-version", HeaderValue::from_static(API_VERSION));
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );

        Ok(headers)
    }

    async fn call<T: DeserializeOwned>(&self, method: Method, url: Url) -> Result<T> {
        let req = self.http.request(method, url).headers(self.api_headers()?);

        decode(req).await
    }

    pub async fn accounts(&self) -> Result<Vec<Account>> {
        let resp: AccountsResponse = self
            .call(Method::GET, self.api_url.join("accounts.json")?)
            .await?;

        Ok(resp.accounts)
    }

    /// A single page of an account's transactions, dated on or after `since`.
    /// Pages start at 1; an empty page marks the end of the listing.
    pub async fn transactions(
        &self,
        account_id: i64,
        since: NaiveDate,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Transaction>> {
        let url = transactions_url(&self.api_url, account_id, since, page, per_page)?;
        let resp: TransactionsResponse = self.call(Method::GET, url).await?;

        Ok(resp.transactions)
    }

    pub async fn guest(&self) -> Result<Guest> {
        let resp: GuestResponse = self
            .call(Method::GET, self.api_url.join("presenter/guests.json")?)
            .await?;

        Ok(resp.guest)
    }

    /// Asks Moneytree to refresh every credential of the guest. The refresh
    /// itself happens asynchronously on their side.
    pub async fn refresh_all_credentials(&self) -> Result<()> {
        let _: serde_json::Value = self
            .call(Method::PUT, self.api_url.join("credentials/refresh.json")?)
            .await?;

        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(req: RequestBuilder) -> Result<T> {
    let resp = req.send().await?;
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            body,
        });
    }

    // Some endpoints answer with an empty body.
    if body.trim().is_empty() {
        return Ok(serde_json::from_str("null")?);
    }

    Ok(serde_json::from_str(&body)?)
}

fn transactions_url(
    api_url: &Url,
    account_id: i64,
    since: NaiveDate,
    page: u32,
    per_page: u32,
) -> Result<Url> {
    let mut url = api_url.join(&format!("accounts/{}/transactions.json", account_id))?;
    url.query_pairs_mut()
        .append_pair("since", &since.format("%Y-%m-%d").to_string())
        .append_pair("page", &page.to_string())
        .append_pair("per_page", &per_page.to_string());

    Ok(url)
}
