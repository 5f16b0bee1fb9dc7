//! Data model for a captured listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable capture of a listing page.
///
/// Every field is always present when serialized; fields the page did not
/// yield are `null` rather than missing, so consumers see a fixed shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSnapshot {
    /// Page URL at capture time
    pub source_url: String,
    /// Listing id taken from the URL path, if the URL is an offer page
    pub listing_id: Option<String>,
    /// Offer title
    pub title: Option<String>,
    /// Price as displayed, currency included
    pub price_display: Option<String>,
    /// Price from machine readable metadata
    pub price_amount: Option<f64>,
    /// Currency code
    pub currency: String,
    /// Best product photos, largest first
    pub image_urls: Vec<String>,
    /// Number of distinct product photos
    pub image_count: usize,
    /// Characters of description text
    pub description_length: usize,
    /// Seller display name
    pub seller_name: Option<String>,
    /// Item condition as shown on the page
    pub condition: Option<String>,
    /// When the page was captured
    pub captured_at: DateTime<Utc>,
}

impl ListingSnapshot {
    /// Returns true if the page had a non-empty description.
    pub fn has_description(&self) -> bool {
        self.description_length > 0
    }

    /// Returns the price amount as `"89.90 PLN"`, if known.
    pub fn formatted_amount(&self) -> Option<String> {
        self.price_amount.map(|a| format!("{:.2} {}", a, self.currency))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_description() {
        let mut snapshot = fixtures::snapshot();
        assert!(snapshot.has_description());
        snapshot.description_length = 0;
        assert!(!snapshot.has_description());
    }

    #[test]
    fn test_formatted_amount() {
        let mut snapshot = fixtures::snapshot();
        assert_eq!(snapshot.formatted_amount(), Some("89.90 PLN".to_string()));
        snapshot.price_amount = None;
        assert!(snapshot.formatted_amount().is_none());
    }

    #[test]
    fn test_serialized_shape_is_fixed() {
        let mut snapshot = fixtures::snapshot();
        snapshot.listing_id = None;
        snapshot.title = None;
        snapshot.price_display = None;
        snapshot.price_amount = None;
        snapshot.seller_name = None;
        snapshot.condition = None;

        let value = serde_json::to_value(&snapshot).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "sourceUrl",
            "listingId",
            "title",
            "priceDisplay",
            "priceAmount",
            "currency",
            "imageUrls",
            "imageCount",
            "descriptionLength",
            "sellerName",
            "condition",
            "capturedAt",
        ] {
            assert!(object.contains_key(key), "missing key {key}");
        }
        assert!(object["title"].is_null());
        assert!(object["priceAmount"].is_null());
    }

    #[test]
    fn test_snapshot_serde() {
        let snapshot = fixtures::snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("SklepBerge"));

        let parsed: ListingSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
