//! CLI command implementations.

pub mod analyze;
pub mod key;
pub mod scrape;
pub mod watch;

pub use analyze::AnalyzeCommand;
pub use key::KeyCommand;
pub use scrape::ScrapeCommand;
pub use watch::WatchCommand;

use crate::config::Config;
use crate::listing::{PageClient, PageSource, SavedPage};
use anyhow::{Context, Result};
use std::path::Path;

/// Picks the page source: a saved HTML file if given, else the network.
pub(crate) fn page_source(config: &Config, html: Option<&Path>) -> Result<Box<dyn PageSource>> {
    match html {
        Some(path) => Ok(Box::new(SavedPage::from_file(path)?)),
        None => {
            let client = PageClient::new(config).context("Failed to create HTTP client")?;
            Ok(Box::new(client))
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_page_source_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "<html><h1>Saved</h1></html>").unwrap();

        let source = page_source(&fixtures::config(), Some(file.path())).unwrap();
        let html = source.fetch(fixtures::LISTING_URL).await.unwrap();
        assert!(html.contains("Saved"));
    }

    #[test]
    fn test_page_source_missing_file() {
        let result = page_source(&fixtures::config(), Some(Path::new("/nonexistent/page.html")));
        assert!(result.is_err());
    }
}
