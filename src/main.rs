mod accounts;
mod core;
mod display;
mod ledger;
mod refresh;
mod sanitize;
mod settings;
mod sync;
mod txn;
mod upstream;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{arg, ArgMatches, Command};
use tracing::{info, warn};
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::ledger::{pocketsmith::PocketsmithLedger, Ledger};
use crate::refresh::{wait_until_settled, CredentialProbe, Settle};
use crate::settings::{Overrides, Settings};
use crate::sync::{sync_accounts, SyncOptions};
use crate::upstream::{moneytree::Source, Aggregator};

static CLIENT_NAME: &str = "pocketsync";

fn overrides(matches: &ArgMatches) -> Result<Overrides> {
    let refresh_timeout_secs = matches
        .value_of("refresh_timeout")
        .map(str::parse::<u64>)
        .transpose()
        .context("--refresh-timeout must be a number of seconds")?;

    Ok(Overrides {
        username: matches.value_of("username").map(String::from),
        password: matches.value_of("password").map(String::from),
        api_key: matches.value_of("apikey").map(String::from),
        pocketsmith_token: matches.value_of("pocketsmith_token").map(String::from),
        since: matches.value_of("since").map(String::from),
        no_refresh: matches.is_present("no_refresh"),
        refresh_timeout_secs,
    })
}

async fn run() -> Result<()> {
    let matches = Command::new(CLIENT_NAME)
        .about("The pocketsync utility mirrors accounts and transactions from \
         Moneytree into Pocketsmith. Running it repeatedly never duplicates records.")
        .version("0.1.0")
        .arg(arg!(CONFIG: -c --config [FILE] "Sets a custom config file"))
        .arg(arg!(verbose: -v --verbose "Logs every ledger lookup and write"))
        .arg(arg!(username: -u --username [EMAIL] "Moneytree login, defaults to MONEYTREE_USERNAME."))
        .arg(arg!(password: -p --password [PASSWORD] "Moneytree password, defaults to MONEYTREE_PASSWORD."))
        .arg(arg!(apikey: --apikey [KEY] "Moneytree API key, defaults to MONEYTREE_API_KEY."))
        .arg(arg!(pocketsmith_token: --"pocketsmith-token" [TOKEN] "Pocketsmith developer key, defaults to POCKETSMITH_TOKEN."))
        .arg(arg!(since: --since [DATE] "The first day of transactions to pull, defaults to 2010-01-01."))
        .arg(arg!(no_refresh: --"no-refresh" "Skips asking Moneytree to refresh credentials before syncing."))
        .arg(arg!(refresh_timeout: --"refresh-timeout" [SECS] "How long to wait for the Moneytree refresh, defaults to 300."))
        .get_matches();

    tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(if matches.is_present("verbose") {
                    LevelFilter::DEBUG.into()
                } else {
                    LevelFilter::INFO.into()
                })
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::new(matches.value_of("CONFIG"), overrides(&matches)?)?;

    let ledger = PocketsmithLedger::new(pocketsmith::Client::new(&settings.pocketsmith.token));
    let user_id = ledger
        .current_user()
        .await
        .context("failed to fetch the Pocketsmith user")?;
    info!("Syncing into Pocketsmith user {}.", user_id);

    let mut client = moneytree::Client::new(&settings.moneytree.api_key);
    client
        .authenticate(&settings.moneytree.username, &settings.moneytree.password)
        .await
        .context("failed to authenticate with Moneytree")?;
    let source = Source::new(client);

    if settings.sync.refresh {
        let requested = Utc::now();
        source
            .refresh_all()
            .await
            .context("failed to refresh Moneytree credentials")?;
        info!("Requested a refresh of all Moneytree credentials.");

        let cancel = async {
            if tokio::signal::ctrl_c().await.is_err() {
                // Without a signal handler the wait can only time out.
                std::future::pending::<()>().await;
            }
        };
        match wait_until_settled(
            &CredentialProbe(&source),
            requested,
            &settings.poll_options(),
            cancel,
        )
        .await
        {
            Settle::Ready => {}
            Settle::TimedOut => warn!(
                "Moneytree refresh still running after {}s, syncing what is available.",
                settings.sync.refresh_timeout_secs
            ),
            Settle::Cancelled => return Err(anyhow!("interrupted while waiting for Moneytree")),
        }
    }

    let options = SyncOptions {
        since: settings.sync.since,
        page_size: settings.sync.page_size,
        insert_failure: settings.sync.insert_failure,
        today: Utc::now().date_naive(),
    };
    let reports = sync_accounts(&source, &ledger, user_id, &options).await?;

    display::print_summary(std::io::stdout(), &reports)?;

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        println!("{:#}", err);
        std::process::exit(1);
    }
}
