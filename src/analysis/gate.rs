//! Single-flight guard for analysis requests.

use crate::analysis::client::Analyzer;
use crate::analysis::error::AnalysisError;
use crate::analysis::models::AnalysisResult;
use crate::listing::ListingSnapshot;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Allows at most one analysis at a time.
///
/// A second attempt while one is running fails fast with
/// [`AnalysisError::InFlight`] instead of queueing.
#[derive(Debug, Default)]
pub struct AnalysisGate {
    busy: AtomicBool,
}

/// Releases the gate when dropped.
#[derive(Debug)]
pub struct GatePass<'a> {
    gate: &'a AnalysisGate,
}

impl Drop for GatePass<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

impl AnalysisGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the gate, or fails if an analysis is already running.
    pub fn try_enter(&self) -> Result<GatePass<'_>, AnalysisError> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map(|_| GatePass { gate: self })
            .map_err(|_| AnalysisError::InFlight)
    }

    /// Returns true while an analysis holds the gate.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Runs one analysis through the gate.
    pub async fn run(
        &self,
        analyzer: &dyn Analyzer,
        snapshot: &ListingSnapshot,
        credential: Option<&str>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let _pass = self.try_enter()?;
        debug!("Analysis gate claimed");
        analyzer.analyze(snapshot, credential).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::fixtures::ANALYSIS_JSON;
    use crate::listing::models::fixtures;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// Analyzer that blocks until released.
    struct SlowAnalyzer {
        release: Arc<Notify>,
    }

    #[async_trait]
    impl Analyzer for SlowAnalyzer {
        async fn analyze(
            &self,
            _snapshot: &ListingSnapshot,
            _credential: Option<&str>,
        ) -> Result<AnalysisResult, AnalysisError> {
            self.release.notified().await;
            serde_json::from_str(ANALYSIS_JSON)
                .map_err(|e| AnalysisError::Schema { reason: e.to_string(), raw: String::new() })
        }
    }

    #[test]
    fn test_pass_releases_on_drop() {
        let gate = AnalysisGate::new();
        {
            let _pass = gate.try_enter().unwrap();
            assert!(gate.is_busy());
            assert!(matches!(gate.try_enter(), Err(AnalysisError::InFlight)));
        }
        assert!(!gate.is_busy());
        assert!(gate.try_enter().is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_run_is_rejected() {
        let gate = Arc::new(AnalysisGate::new());
        let release = Arc::new(Notify::new());
        let analyzer = Arc::new(SlowAnalyzer { release: Arc::clone(&release) });

        let first = {
            let gate = Arc::clone(&gate);
            let analyzer = Arc::clone(&analyzer);
            tokio::spawn(async move {
                gate.run(analyzer.as_ref(), &fixtures::snapshot(), Some("sk-test")).await
            })
        };

        while !gate.is_busy() {
            tokio::task::yield_now().await;
        }

        let second = gate.run(analyzer.as_ref(), &fixtures::snapshot(), Some("sk-test")).await;
        assert!(matches!(second, Err(AnalysisError::InFlight)));

        release.notify_one();
        let first = first.await.unwrap();
        assert_eq!(first.unwrap().rating, 3.5);
        assert!(!gate.is_busy());
    }

    #[tokio::test]
    async fn test_gate_released_after_error() {
        struct Failing;

        #[async_trait]
        impl Analyzer for Failing {
            async fn analyze(
                &self,
                _snapshot: &ListingSnapshot,
                _credential: Option<&str>,
            ) -> Result<AnalysisResult, AnalysisError> {
                Err(AnalysisError::upstream(Some(500), "boom"))
            }
        }

        let gate = AnalysisGate::new();
        assert!(gate.run(&Failing, &fixtures::snapshot(), None).await.is_err());
        assert!(!gate.is_busy());
    }
}
