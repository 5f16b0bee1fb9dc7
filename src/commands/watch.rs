//! Watch command: re-scrape a listing and print each update.

use crate::commands::page_source;
use crate::config::Config;
use crate::format::Formatter;
use crate::listing::PageSource;
use crate::relay::{PageContext, SnapshotRelay};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Re-scrapes a listing on an interval.
pub struct WatchCommand {
    config: Config,
}

impl WatchCommand {
    /// Creates a new watch command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Watches `url` and prints each update to stdout.
    pub async fn execute(
        &self,
        url: &str,
        html: Option<&Path>,
        interval: Duration,
        times: usize,
    ) -> Result<usize> {
        let source = page_source(&self.config, html)?;
        self.execute_with_source(source.as_ref(), url, interval, times, |update| {
            println!("{}\n", update)
        })
        .await
    }

    /// Watches with a provided page source; `emit` receives each rendered
    /// update. Returns the number of updates delivered.
    pub async fn execute_with_source(
        &self,
        source: &dyn PageSource,
        url: &str,
        interval: Duration,
        times: usize,
        mut emit: impl FnMut(String),
    ) -> Result<usize> {
        let relay = Arc::new(SnapshotRelay::new());
        let page = PageContext::open(url, Arc::clone(&relay));
        let mut delivered = 0;

        for round in 1..=times {
            if round > 1 {
                tokio::time::sleep(interval).await;
            }

            // Display side: wait for the next publish and render it.
            let update = relay.subscribe_once();
            let formatter = Formatter::new(self.config.format);
            let display = tokio::spawn(async move {
                update.await.ok().map(|snapshot| formatter.format_snapshot(&snapshot))
            });

            info!("Watch round {}/{} for {}", round, times, url);
            match page.scrape(source, &self.config).await {
                Ok(_) => {
                    if let Ok(Some(rendered)) = display.await {
                        delivered += 1;
                        emit(rendered);
                    }
                }
                Err(e) => {
                    display.abort();
                    warn!("Round {} failed: {:#}", round, e);
                }
            }
        }

        let withdrawn = page.close();
        debug!("Closed {} (snapshot withdrawn: {})", url, withdrawn);

        if delivered == 0 && times > 0 {
            anyhow::bail!("No updates received for {}", url);
        }
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{self, LISTING_URL};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves a page whose price changes on every fetch; fails on `fail_on`.
    struct ChangingPage {
        fetches: AtomicUsize,
        fail_on: Option<usize>,
    }

    impl ChangingPage {
        fn new(fail_on: Option<usize>) -> Self {
            Self { fetches: AtomicUsize::new(0), fail_on }
        }
    }

    #[async_trait]
    impl PageSource for ChangingPage {
        async fn fetch(&self, _url: &str) -> Result<String> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on == Some(n) {
                anyhow::bail!("Simulated network error");
            }
            Ok(fixtures::listing_html("Lampa", &format!("{}.00", 40 + n), "Opis"))
        }
    }

    #[tokio::test]
    async fn test_watch_emits_each_update() {
        let page = ChangingPage::new(None);
        let mut updates = Vec::new();

        let delivered = WatchCommand::new(fixtures::config())
            .execute_with_source(&page, LISTING_URL, Duration::ZERO, 3, |u| updates.push(u))
            .await
            .unwrap();

        assert_eq!(delivered, 3);
        assert!(updates[0].contains("41.00 PLN"));
        assert!(updates[1].contains("42.00 PLN"));
        assert!(updates[2].contains("43.00 PLN"));
    }

    #[tokio::test]
    async fn test_watch_survives_failed_round() {
        let page = ChangingPage::new(Some(2));
        let mut updates = Vec::new();

        let delivered = WatchCommand::new(fixtures::config())
            .execute_with_source(&page, LISTING_URL, Duration::ZERO, 3, |u| updates.push(u))
            .await
            .unwrap();

        assert_eq!(delivered, 2);
        assert!(updates[1].contains("43.00 PLN"));
    }

    #[tokio::test]
    async fn test_watch_all_rounds_failed() {
        let page = ChangingPage::new(Some(1));
        let result = WatchCommand::new(fixtures::config())
            .execute_with_source(&page, LISTING_URL, Duration::ZERO, 1, |_| {})
            .await;
        assert!(result.unwrap_err().to_string().contains("No updates"));
    }
}
