//! Sequential page fetcher.
//!
//! One [`Fetcher`] is built per run and issues every request of that run, one
//! at a time. Every request after the first is preceded by a random pause so
//! the source site never sees a burst.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rand::Rng;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use npbstats_shared::{FetchConfig, NpbStatsError, Result};

// ---------------------------------------------------------------------------
// FetchedPage
// ---------------------------------------------------------------------------

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub url: Url,
    /// HTTP status code (always 2xx).
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

// ---------------------------------------------------------------------------
// Politeness
// ---------------------------------------------------------------------------

/// Random inter-request delay, uniform in `[0, max_delay]`.
#[derive(Debug, Clone, Copy)]
pub struct Politeness {
    max_delay: Duration,
}

impl Politeness {
    pub fn new(max_delay: Duration) -> Self {
        Self { max_delay }
    }

    /// Draw the next delay.
    pub fn jitter(&self) -> Duration {
        let max_ms = self.max_delay.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// HTTP GET client shared by every stage of a run.
pub struct Fetcher {
    client: Client,
    politeness: Politeness,
    /// Set once the first request has gone out.
    started: AtomicBool,
}

impl Fetcher {
    /// Create a fetcher with the given configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .timeout(config.timeout())
            .build()
            .map_err(|e| NpbStatsError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            politeness: Politeness::new(Duration::from_millis(config.max_delay_ms)),
            started: AtomicBool::new(false),
        })
    }

    /// Fetch `url` and return its body.
    ///
    /// Transport failures map to [`NpbStatsError::Network`], non-2xx answers
    /// to [`NpbStatsError::HttpStatus`].
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        if self.started.swap(true, Ordering::SeqCst) {
            self.pause().await;
        }
        debug!("fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| NpbStatsError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NpbStatsError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| NpbStatsError::Network(format!("{url}: body read failed: {e}")))?;

        debug!(status = status.as_u16(), bytes = body.len(), "page fetched");

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            body,
        })
    }

    /// Sleep for a random politeness interval.
    async fn pause(&self) {
        let delay = self.politeness.jitter();
        if delay.is_zero() {
            return;
        }
        debug!(delay_ms = delay.as_millis() as u64, "pausing between requests");
        tokio::time::sleep(delay).await;
    }
}
