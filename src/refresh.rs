//! Waiting for the aggregator to finish a refresh it has no completion signal
//! for, by polling the state of its credentials.
use std::future::Future;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{info, warn};

use crate::core::Credential;
use crate::upstream::Aggregator;

/// Credential states meaning a refresh is still running.
const IN_PROGRESS: [&str; 3] = ["running", "queued", "pending"];

#[async_trait]
pub trait RefreshProbe: Send + Sync {
    /// Whether the refresh started at `since` has finished.
    async fn settled(&self, since: DateTime<Utc>) -> Result<bool>;
}

/// Probes refresh progress through the aggregator's credential listing.
pub struct CredentialProbe<'a, A: ?Sized>(pub &'a A);

#[async_trait]
impl<'a, A: Aggregator + ?Sized> RefreshProbe for CredentialProbe<'a, A> {
    async fn settled(&self, since: DateTime<Utc>) -> Result<bool> {
        Ok(credentials_settled(&self.0.credentials().await?, since))
    }
}

/// A credential has settled once it left the in-progress states after the
/// refresh was requested. Credentials in a failure state will not refresh
/// at all and count as settled.
pub fn credentials_settled(credentials: &[Credential], since: DateTime<Utc>) -> bool {
    credentials.iter().all(|c| {
        if IN_PROGRESS.contains(&c.status.as_str()) {
            return false;
        }
        if c.status != "success" {
            return true;
        }

        matches!(c.status_set_at, Some(at) if at >= since)
    })
}

#[derive(Debug, Clone)]
pub struct PollOptions {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            interval: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    Ready,
    TimedOut,
    Cancelled,
}

/// Polls `probe` every interval until it reports the refresh settled, the
/// timeout elapses or `cancel` completes. Probe errors are logged and polling
/// continues.
pub async fn wait_until_settled<P, C>(
    probe: &P,
    since: DateTime<Utc>,
    opts: &PollOptions,
    cancel: C,
) -> Settle
where
    P: RefreshProbe + ?Sized,
    C: Future<Output = ()>,
{
    let started = Instant::now();
    let deadline = started + opts.timeout;
    tokio::pin!(cancel);

    let mut attempt = 0;
    loop {
        attempt += 1;
        let polled = tokio::select! {
            biased;
            _ = &mut cancel => return Settle::Cancelled,
            polled = probe.settled(since) => polled,
        };

        match polled {
            Ok(true) => {
                info!("Aggregator refresh finished after {:?}.", started.elapsed());
                return Settle::Ready;
            }
            Ok(false) => info!(
                attempt,
                "Waiting for aggregator refresh, {:?} of {:?} elapsed.",
                started.elapsed(),
                opts.timeout
            ),
            Err(err) => warn!(attempt, "Failed to poll refresh status: {}", err),
        }

        let now = Instant::now();
        if now >= deadline {
            return Settle::TimedOut;
        }

        tokio::select! {
            biased;
            _ = &mut cancel => return Settle::Cancelled,
            _ = sleep_until(std::cmp::min(now + opts.interval, deadline)) => {}
        }
    }
}
