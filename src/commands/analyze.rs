//! Analyze command implementation.

use crate::analysis::{AnalysisClient, AnalysisGate, Analyzer};
use crate::commands::page_source;
use crate::config::Config;
use crate::credentials::{CredentialStore, LayeredCredentials};
use crate::format::Formatter;
use crate::listing::PageSource;
use crate::relay::{PageContext, SnapshotRelay};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Scrapes a listing and asks the model for a competitive analysis.
pub struct AnalyzeCommand {
    config: Config,
    gate: AnalysisGate,
}

impl AnalyzeCommand {
    /// Creates a new analyze command.
    pub fn new(config: Config) -> Self {
        Self { config, gate: AnalysisGate::new() }
    }

    /// Analyzes `url`, from `html` if given, and returns formatted output.
    ///
    /// Analysis failures surface as [`crate::analysis::AnalysisError`]
    /// inside the returned error.
    pub async fn execute(&self, url: &str, html: Option<&Path>) -> Result<String> {
        let source = page_source(&self.config, html)?;
        let analyzer =
            AnalysisClient::new(&self.config.analysis).context("Failed to create API client")?;
        let credentials = LayeredCredentials::from_default_locations()?;

        self.execute_with(source.as_ref(), &analyzer, &credentials, url).await
    }

    /// Analyzes with provided collaborators (for testing).
    pub async fn execute_with(
        &self,
        source: &dyn PageSource,
        analyzer: &dyn Analyzer,
        credentials: &dyn CredentialStore,
        url: &str,
    ) -> Result<String> {
        let relay = Arc::new(SnapshotRelay::new());
        let page = PageContext::open(url, Arc::clone(&relay));
        page.scrape(source, &self.config).await?;

        let snapshot = relay.fetch_latest().context("No snapshot was published")?;
        let credential = credentials.get_credential()?;

        info!("Analyzing listing: {}", snapshot.source_url);
        let result = self.gate.run(analyzer, &snapshot, credential.as_deref()).await;
        page.close();

        let analysis = result?;
        Ok(Formatter::new(self.config.format).format_report(&snapshot, &analysis))
    }
}
