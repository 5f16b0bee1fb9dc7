//! Schema of the competitive analysis returned by the model.

use serde::{Deserialize, Serialize};

/// Competitive analysis of one listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Overall score, 0 to 5 stars
    pub rating: f64,
    /// Metrics of the analyzed listing
    #[serde(alias = "yourAuction")]
    pub your_listing: ListingMetrics,
    /// Metrics of the strongest competing listing
    pub best_competitor: ListingMetrics,
    /// Where competitors do better
    #[serde(default)]
    pub advantages: Vec<String>,
    /// Improvement suggestions
    #[serde(default)]
    pub suggestions: String,
    /// Rewritten description as an HTML fragment
    #[serde(default)]
    pub improved_description: String,
}

/// Comparable metrics of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub price: Option<f64>,
    pub delivery_time: Option<String>,
    pub shipping_cost: Option<String>,
    /// 1 to 10
    pub description_quality: u8,
    pub photos_count: u32,
}

impl AnalysisResult {
    /// Checks value ranges serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(format!("rating {} is outside 0-5", self.rating));
        }
        for (name, metrics) in [("yourListing", &self.your_listing), ("bestCompetitor", &self.best_competitor)] {
            if !(1..=10).contains(&metrics.description_quality) {
                return Err(format!(
                    "{name}.descriptionQuality {} is outside 1-10",
                    metrics.description_quality
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// A well-formed model answer.
    pub const ANALYSIS_JSON: &str = r#"{
        "rating": 3.5,
        "yourAuction": {
            "price": 89.9,
            "deliveryTime": "24h",
            "shippingCost": "Darmowa",
            "descriptionQuality": 6,
            "photosCount": 7
        },
        "bestCompetitor": {
            "url": "https://allegro.pl/oferta/competitor-1",
            "price": 79.99,
            "deliveryTime": "2-3 dni",
            "shippingCost": "9,99 zł",
            "descriptionQuality": 8,
            "photosCount": 12
        },
        "advantages": ["Lower price", "More photos"],
        "suggestions": "Add more photos.",
        "improvedDescription": "<div><h2>Lamp</h2></div>"
    }"#;
}
