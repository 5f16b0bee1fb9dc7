//! Builds a [`ListingSnapshot`] from a parsed offer page.

use crate::listing::extract::{extract_field, first_element};
use crate::listing::images::{ImageResolver, ImageRules};
use crate::listing::models::ListingSnapshot;
use crate::listing::selectors::{errors, fields};
use crate::listing::site::SiteProfile;
use anyhow::Result;
use chrono::{DateTime, Utc};
use scraper::Html;
use tracing::debug;

/// Composes field extraction and image resolution into snapshots.
pub struct SnapshotBuilder<'a> {
    site: &'a SiteProfile,
    images: &'a ImageRules,
}

impl<'a> SnapshotBuilder<'a> {
    /// Creates a builder for the given marketplace and photo rules.
    pub fn new(site: &'a SiteProfile, images: &'a ImageRules) -> Self {
        Self { site, images }
    }

    /// Builds a snapshot captured now.
    pub fn build_now(&self, document: &Html, source_url: &str) -> ListingSnapshot {
        self.build(document, source_url, Utc::now())
    }

    /// Builds a snapshot. Deterministic for a given document and time.
    pub fn build(
        &self,
        document: &Html,
        source_url: &str,
        captured_at: DateTime<Utc>,
    ) -> ListingSnapshot {
        let root = document.root_element();

        let title = extract_field(fields::TITLE, root);
        let price_amount = extract_field(fields::PRICE_AMOUNT, root).and_then(|p| parse_amount(&p));
        let currency = extract_field(fields::CURRENCY, root)
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| self.site.default_currency.clone());

        let price_display = extract_field(fields::PRICE_DISPLAY, root)
            .or_else(|| price_amount.map(|a| format!("{:.2} {}", a, currency)));

        let description_length =
            extract_field(fields::DESCRIPTION, root).map_or(0, |d| d.chars().count());

        let images = ImageResolver::new(self.images, Some(source_url)).resolve(root);

        let snapshot = ListingSnapshot {
            source_url: source_url.to_string(),
            listing_id: self.site.listing_id(source_url),
            title,
            price_display,
            price_amount,
            currency,
            image_urls: images.image_urls,
            image_count: images.image_count,
            description_length,
            seller_name: extract_field(fields::SELLER, root),
            condition: extract_field(fields::CONDITION, root),
            captured_at,
        };

        debug!(
            "Built snapshot for {:?}: {} images, {} description chars",
            snapshot.listing_id, snapshot.image_count, snapshot.description_length
        );

        snapshot
    }
}

/// Fails when the page is a bot challenge instead of an offer.
pub fn check_for_block(document: &Html) -> Result<()> {
    if first_element(errors::BLOCKED, document.root_element()).is_some() {
        anyhow::bail!(
            "Bot challenge page detected. \
            Try again later, use a proxy, or save the page from a browser and pass --html."
        );
    }
    Ok(())
}

/// Parses a machine readable amount such as `89.90` or `89,90`.
///
/// Returns `None` for anything that is not a finite, non-negative number.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String =
        text.trim().chars().filter(|c| !c.is_whitespace() && *c != '\u{a0}').collect();
    let normalized = cleaned.replace(',', ".");

    let amount: f64 = normalized.parse().ok()?;
    if amount.is_finite() && amount >= 0.0 {
        Some(amount)
    } else {
        None
    }
}
