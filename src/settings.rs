use chrono::NaiveDate;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tokio::time::Duration;

use crate::refresh::PollOptions;
use crate::txn::InsertFailure;
use crate::CLIENT_NAME;

const CONFIG_NAME: &str = "config.toml";

/// Variables read before the `POCKETSYNC__` ones existed, mapped onto their
/// settings keys.
const LEGACY_ENV: [(&str, &str); 4] = [
    ("MONEYTREE_USERNAME", "moneytree.username"),
    ("MONEYTREE_PASSWORD", "moneytree.password"),
    ("MONEYTREE_API_KEY", "moneytree.api_key"),
    ("POCKETSMITH_TOKEN", "pocketsmith.token"),
];

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub moneytree: Moneytree,
    pub pocketsmith: Pocketsmith,
    pub sync: SyncConfig,
}

#[derive(Debug, Deserialize)]
pub struct Moneytree {
    pub username: String,
    pub password: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct Pocketsmith {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct SyncConfig {
    pub since: NaiveDate,
    pub refresh: bool,
    pub refresh_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub page_size: u32,
    pub insert_failure: InsertFailure,
}

/// Values given on the command line, which take precedence over every other
/// source.
#[derive(Debug, Default)]
pub struct Overrides {
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_key: Option<String>,
    pub pocketsmith_token: Option<String>,
    pub since: Option<String>,
    pub no_refresh: bool,
    pub refresh_timeout_secs: Option<u64>,
}

impl Settings {
    pub fn new(config_path: Option<&str>, overrides: Overrides) -> Result<Self, ConfigError> {
        Self::build(config_path, overrides, |key| std::env::var(key).ok())
    }

    fn build<F>(config_path: Option<&str>, overrides: Overrides, legacy_env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut s = Config::builder()
            .set_default("moneytree.username", "")?
            .set_default("moneytree.password", "")?
            .set_default("moneytree.api_key", "")?
            .set_default("pocketsmith.token", "")?
            .set_default("sync.since", "2010-01-01")?
            .set_default("sync.refresh", true)?
            .set_default("sync.refresh_timeout_secs", 300_i64)?
            .set_default("sync.poll_interval_secs", 15_i64)?
            .set_default("sync.page_size", 500_i64)?
            .set_default("sync.insert_failure", "skip")?;

        // An explicitly given file has to exist, the default one does not.
        s = match config_path {
            Some(path) => s.add_source(File::with_name(path)),
            None => s.add_source(File::with_name(&default_config_path()).required(false)),
        };
        s = s.add_source(Environment::with_prefix("POCKETSYNC").separator("__"));

        for (var, key) in LEGACY_ENV {
            s = s.set_override_option(key, legacy_env(var).filter(|v| !v.is_empty()))?;
        }

        s = s
            .set_override_option("moneytree.username", overrides.username)?
            .set_override_option("moneytree.password", overrides.password)?
            .set_override_option("moneytree.api_key", overrides.api_key)?
            .set_override_option("pocketsmith.token", overrides.pocketsmith_token)?
            .set_override_option("sync.since", overrides.since)?
            .set_override_option(
                "sync.refresh_timeout_secs",
                overrides.refresh_timeout_secs.map(|secs| secs as i64),
            )?;
        if overrides.no_refresh {
            s = s.set_override("sync.refresh", false)?;
        }

        let settings: Settings = s.build()?.try_deserialize()?;
        settings.validate()?;

        Ok(settings)
    }

    /// Rejects settings the run cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            (&self.moneytree.username, "--username", "MONEYTREE_USERNAME"),
            (&self.moneytree.password, "--password", "MONEYTREE_PASSWORD"),
            (&self.moneytree.api_key, "--apikey", "MONEYTREE_API_KEY"),
            (&self.pocketsmith.token, "--pocketsmith-token", "POCKETSMITH_TOKEN"),
        ];
        let missing: Vec<_> = required
            .iter()
            .filter(|(value, _, _)| value.trim().is_empty())
            .map(|(_, flag, var)| format!("{} (or {})", flag, var))
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Message(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        if self.sync.page_size == 0 {
            return Err(ConfigError::Message("sync.page_size must be positive".into()));
        }
        if self.sync.poll_interval_secs == 0 {
            return Err(ConfigError::Message(
                "sync.poll_interval_secs must be positive".into(),
            ));
        }

        Ok(())
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            timeout: Duration::from_secs(self.sync.refresh_timeout_secs),
            interval: Duration::from_secs(self.sync.poll_interval_secs),
        }
    }
}

pub(crate) fn default_config_path() -> String {
    dirs::config_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| std::env::temp_dir()))
        .join(CLIENT_NAME)
        .join(CONFIG_NAME)
        .display()
        .to_string()
}
