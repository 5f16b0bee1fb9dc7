//! Scrape command implementation.

use crate::commands::page_source;
use crate::config::Config;
use crate::format::Formatter;
use crate::listing::PageSource;
use crate::relay::{PageContext, SnapshotRelay};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Scrapes one listing page and prints its snapshot.
pub struct ScrapeCommand {
    config: Config,
}

impl ScrapeCommand {
    /// Creates a new scrape command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Scrapes `url`, from `html` if given, and returns formatted output.
    pub async fn execute(&self, url: &str, html: Option<&Path>) -> Result<String> {
        let source = page_source(&self.config, html)?;
        self.execute_with_source(source.as_ref(), url).await
    }

    /// Scrapes with a provided page source (for testing).
    pub async fn execute_with_source(&self, source: &dyn PageSource, url: &str) -> Result<String> {
        info!("Scraping listing: {}", url);

        let relay = Arc::new(SnapshotRelay::new());
        let page = PageContext::open(url, Arc::clone(&relay));
        page.scrape(source, &self.config).await?;

        // Display side reads what the page published.
        let snapshot = relay.fetch_latest().context("No snapshot was published")?;
        let output = Formatter::new(self.config.format).format_snapshot(&snapshot);

        if page.close() {
            debug!("Withdrew snapshot on close");
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{self, LISTING_URL};
    use crate::config::OutputFormat;
    use crate::listing::{ListingSnapshot, SavedPage};
    use async_trait::async_trait;

    struct FailingSource;

    #[async_trait]
    impl PageSource for FailingSource {
        async fn fetch(&self, _url: &str) -> Result<String> {
            anyhow::bail!("Simulated network error")
        }
    }

    #[tokio::test]
    async fn test_scrape_table() {
        let page = SavedPage::new(fixtures::listing_html("Lampa solarna LED", "49.99", "Mocna lampa"));
        let cmd = ScrapeCommand::new(fixtures::config());

        let output = cmd.execute_with_source(&page, LISTING_URL).await.unwrap();
        assert!(output.contains("Lampa solarna LED"));
        assert!(output.contains("49.99 PLN"));
        assert!(output.contains("Listing:     lampa-solarna-led-123456"));
        assert!(output.contains("Photos:      2"));
        assert!(output.contains("Description: 11 characters"));
    }

    #[tokio::test]
    async fn test_scrape_json() {
        let page = SavedPage::new(fixtures::listing_html("Lampa", "10", ""));
        let mut config = fixtures::config();
        config.format = OutputFormat::Json;

        let output = ScrapeCommand::new(config).execute_with_source(&page, LISTING_URL).await.unwrap();
        let snapshot: ListingSnapshot = serde_json::from_str(&output).unwrap();
        assert_eq!(snapshot.title.as_deref(), Some("Lampa"));
        assert_eq!(snapshot.price_amount, Some(10.0));
        assert_eq!(snapshot.description_length, 0);
        assert_eq!(snapshot.image_urls.len(), 2);
        assert!(snapshot.image_urls[0].contains("lamp-front"));
    }

    #[tokio::test]
    async fn test_scrape_blocked_page() {
        let page = SavedPage::new(r#"<html><body><div id="ddv1-captcha-container"></div></body></html>"#);
        let result = ScrapeCommand::new(fixtures::config()).execute_with_source(&page, LISTING_URL).await;
        assert!(result.unwrap_err().to_string().contains("Bot challenge"));
    }

    #[tokio::test]
    async fn test_scrape_network_error() {
        let result =
            ScrapeCommand::new(fixtures::config()).execute_with_source(&FailingSource, LISTING_URL).await;
        assert!(result.unwrap_err().to_string().contains("network error"));
    }
}
