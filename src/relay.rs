//! Latest-snapshot relay between the scraping side and the display side.
//!
//! The relay is a single slot: each publish replaces whatever was there
//! (last write wins, no history). Readers either pull with
//! [`SnapshotRelay::fetch_latest`] or register a one-time push with
//! [`SnapshotRelay::subscribe_once`]. Pushes are best effort; a reader that
//! was not listening still sees the value on its next pull.

use crate::config::Config;
use crate::listing::snapshot::check_for_block;
use crate::listing::{ListingSnapshot, PageSource, SnapshotBuilder};
use anyhow::Result;
use scraper::Html;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

static NEXT_SOURCE: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier of the context that produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(u64);

impl SourceId {
    /// Allocates a process-unique id.
    pub fn next() -> Self {
        Self(NEXT_SOURCE.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page-{}", self.0)
    }
}

#[derive(Default)]
struct Slot {
    latest: Option<(Arc<ListingSnapshot>, SourceId)>,
    waiters: Vec<oneshot::Sender<Arc<ListingSnapshot>>>,
}

/// Process-wide holder of the most recent snapshot.
#[derive(Default)]
pub struct SnapshotRelay {
    slot: Mutex<Slot>,
}

impl SnapshotRelay {
    /// Creates an empty relay.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        // Slot updates are single assignments, so a poisoned lock still holds
        // consistent data.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the stored snapshot and wakes one-time subscribers.
    ///
    /// Returns true if at least one subscriber received the push.
    pub fn publish(&self, snapshot: impl Into<Arc<ListingSnapshot>>, source: SourceId) -> bool {
        let snapshot = snapshot.into();
        let waiters = {
            let mut slot = self.slot();
            slot.latest = Some((Arc::clone(&snapshot), source));
            std::mem::take(&mut slot.waiters)
        };

        let delivered = waiters
            .into_iter()
            .map(|tx| tx.send(Arc::clone(&snapshot)).is_ok())
            .filter(|sent| *sent)
            .count();

        if delivered == 0 {
            debug!("Stored snapshot from {} (no listener)", source);
        } else {
            debug!("Stored snapshot from {} and pushed to {} listener(s)", source, delivered);
        }

        delivered > 0
    }

    /// Returns the stored snapshot without side effects.
    pub fn fetch_latest(&self) -> Option<Arc<ListingSnapshot>> {
        self.slot().latest.as_ref().map(|(snapshot, _)| Arc::clone(snapshot))
    }

    /// Returns the context that produced the stored snapshot.
    pub fn latest_source(&self) -> Option<SourceId> {
        self.slot().latest.as_ref().map(|(_, source)| *source)
    }

    /// Empties the slot if it was filled by `source`.
    ///
    /// Returns true if the slot was cleared.
    pub fn clear_if_source(&self, source: SourceId) -> bool {
        let mut slot = self.slot();
        if !slot.latest.as_ref().is_some_and(|(_, current)| *current == source) {
            return false;
        }

        slot.latest = None;
        debug!("Cleared snapshot from closed context {}", source);
        true
    }

    /// Registers for a single push on the next publish.
    pub fn subscribe_once(&self) -> oneshot::Receiver<Arc<ListingSnapshot>> {
        let (tx, rx) = oneshot::channel();
        let mut slot = self.slot();
        slot.waiters.retain(|w| !w.is_closed());
        slot.waiters.push(tx);
        rx
    }
}

/// A scraping context bound to one page.
///
/// Publishes its snapshots under its own [`SourceId`] and withdraws them
/// from the relay when closed.
pub struct PageContext {
    id: SourceId,
    url: String,
    relay: Arc<SnapshotRelay>,
}

impl PageContext {
    /// Opens a context for `url`.
    pub fn open(url: impl Into<String>, relay: Arc<SnapshotRelay>) -> Self {
        Self { id: SourceId::next(), url: url.into(), relay }
    }

    /// Returns this context's id.
    pub fn id(&self) -> SourceId {
        self.id
    }

    /// Fetches the page, builds a snapshot, and publishes it.
    pub async fn scrape(
        &self,
        source: &dyn PageSource,
        config: &Config,
    ) -> Result<Arc<ListingSnapshot>> {
        if !config.site.is_listing_url(&self.url) {
            warn!("{} does not look like an offer page", self.url);
        }

        let html = source.fetch(&self.url).await?;
        let snapshot = {
            let document = Html::parse_document(&html);
            check_for_block(&document)?;
            Arc::new(
                SnapshotBuilder::new(&config.site, &config.images).build_now(&document, &self.url),
            )
        };

        info!(
            "Scraped {} ({} images, {} description chars)",
            self.url, snapshot.image_count, snapshot.description_length
        );

        self.relay.publish(Arc::clone(&snapshot), self.id);
        Ok(snapshot)
    }

    /// Closes the context, withdrawing its snapshot if it is still current.
    pub fn close(self) -> bool {
        self.relay.clear_if_source(self.id)
    }
}
