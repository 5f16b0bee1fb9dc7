//! Marketplace profile: which host and URL shape count as a listing page.

use serde::{Deserialize, Serialize};
use url::Url;

/// Describes the marketplace being scraped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Registrable domain of the marketplace (matched as a host suffix).
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Path prefix of offer pages; the listing id follows it.
    #[serde(default = "default_listing_prefix")]
    pub listing_prefix: String,

    /// Currency assumed when the page carries no currency metadata.
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

fn default_domain() -> String {
    "allegro.pl".to_string()
}

fn default_listing_prefix() -> String {
    "/oferta/".to_string()
}

fn default_currency() -> String {
    "PLN".to_string()
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            listing_prefix: default_listing_prefix(),
            default_currency: default_currency(),
        }
    }
}

impl SiteProfile {
    /// Returns true if `url` points at an offer page of this marketplace.
    pub fn is_listing_url(&self, url: &str) -> bool {
        self.listing_id(url).is_some()
    }

    /// Derives the listing id from an offer URL.
    ///
    /// The id is the path remainder after the listing prefix, so
    /// `https://allegro.pl/oferta/lamp-123?x=1#y` yields `lamp-123`.
    pub fn listing_id(&self, url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?;

        if host != self.domain && !host.ends_with(&format!(".{}", self.domain)) {
            return None;
        }

        let id = parsed.path().strip_prefix(&self.listing_prefix)?.trim_end_matches('/');
        if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        }
    }
}
