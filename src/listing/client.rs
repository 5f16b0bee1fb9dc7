//! HTTP client for listing pages using wreq for TLS fingerprint emulation.

use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::RngExt;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Trait for fetching listing pages - enables mocking for tests.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches a page and returns its HTML.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Listing page client with browser impersonation.
pub struct PageClient {
    client: Client,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl PageClient {
    /// Creates a new page client with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self { client, delay_ms: config.delay_ms, delay_jitter_ms: config.delay_jitter_ms })
    }

    /// Adds a random delay to mimic human behavior.
    async fn delay(&self) {
        if self.delay_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

#[async_trait]
impl PageSource for PageClient {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.delay().await;

        info!("Fetching listing: {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8")
            .header("Accept-Language", "pl-PL,pl;q=0.9,en;q=0.8")
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("Cache-Control", "no-cache")
            .header("Sec-Fetch-Dest", "document")
            .header("Sec-Fetch-Mode", "navigate")
            .header("Sec-Fetch-Site", "none")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 403 || status == 429 {
            warn!("Blocked ({}). Consider using a proxy or increasing delay.", status);
            anyhow::bail!(
                "Blocked by the marketplace ({}). Try --delay, a proxy, or a saved page via --html.",
                status
            );
        }

        if !status.is_success() {
            anyhow::bail!("Request failed with status: {}", status);
        }

        response.text().await.context("Failed to read response body")
    }
}

/// Serves pages from a saved HTML file instead of the network.
pub struct SavedPage {
    html: String,
}

impl SavedPage {
    /// Loads a page saved from a browser.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read HTML file: {}", path.display()))?;
        Ok(Self { html })
    }

    /// Wraps HTML already in memory.
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }
}

#[async_trait]
impl PageSource for SavedPage {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Using saved page for {}", url);
        Ok(self.html.clone())
    }
}
