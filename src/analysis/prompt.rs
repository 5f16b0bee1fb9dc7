//! Prompt construction for the competitive analysis.

use crate::listing::ListingSnapshot;

/// Rendered in place of any field the scrape did not find.
pub const NOT_FOUND: &str = "Not found";

/// Fixed instructions sent alongside every prompt.
pub const INSTRUCTIONS: &str = "You are an expert in optimizing marketplace listings. \
You compare a listing with real competing offers and give concrete, practical advice \
that improves sales. Use web search to find genuine competing listings on the same \
marketplace and extract real data from them (price, delivery time, number of photos). \
Your answer MUST be a single JSON object matching the schema given in the input, \
with no surrounding text.";

/// Baseline description quality derived from description length.
pub fn description_quality_hint(description_length: usize) -> usize {
    (description_length / 500).clamp(1, 10)
}

fn or_not_found(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_FOUND)
}

/// Builds the analysis prompt for a snapshot.
pub fn build_prompt(snapshot: &ListingSnapshot) -> String {
    let price = snapshot
        .price_display
        .clone()
        .or_else(|| snapshot.formatted_amount())
        .unwrap_or_else(|| NOT_FOUND.to_string());
    let price_amount =
        snapshot.price_amount.map_or_else(|| "null".to_string(), |a| format!("{a:.2}"));
    let title = or_not_found(snapshot.title.as_deref());

    let mut lines = Vec::new();

    lines.push("LISTING TO ANALYZE:".to_string());
    lines.push(format!("URL: {}", snapshot.source_url));
    lines.push(format!("Listing ID: {}", or_not_found(snapshot.listing_id.as_deref())));
    lines.push(format!("Title: {title}"));
    lines.push(format!("Price: {price}"));
    lines.push(format!("Currency: {}", snapshot.currency));
    lines.push(format!("Photos: {}", snapshot.image_count));
    lines.push(format!("Has description: {}", if snapshot.has_description() { "yes" } else { "no" }));
    lines.push(format!("Description length: {} characters", snapshot.description_length));
    lines.push(format!("Seller: {}", or_not_found(snapshot.seller_name.as_deref())));
    lines.push(format!("Condition: {}", or_not_found(snapshot.condition.as_deref())));
    lines.push(String::new());

    lines.push(format!("STEP 1 - SEARCH: search the marketplace for \"{title}\" and open 3-5 competing listings from different sellers."));
    lines.push("STEP 2 - COLLECT for each competitor: exact price, delivery time, shipping cost, description quality (1-10), number of product photos.".to_string());
    lines.push("STEP 3 - COMPARE: pick the best competitor (price and delivery time) and rate this listing from 0 to 5 stars.".to_string());
    lines.push("STEP 4 - SUGGEST: list the competitors' concrete advantages and propose an improved HTML description.".to_string());
    lines.push(String::new());

    lines.push("THE ANSWER MUST BE JSON IN EXACTLY THIS SHAPE:".to_string());
    lines.push(format!(
        r#"{{
  "rating": 4.5,
  "yourListing": {{
    "price": {price_amount},
    "deliveryTime": "from the page or null",
    "shippingCost": "from the page or null",
    "descriptionQuality": {quality},
    "photosCount": {photos}
  }},
  "bestCompetitor": {{
    "url": "https://...",
    "price": 0.00,
    "deliveryTime": "real value from the listing",
    "shippingCost": "real value from the listing",
    "descriptionQuality": 1,
    "photosCount": 0
  }},
  "advantages": ["concrete advantage"],
  "suggestions": "detailed suggestions",
  "improvedDescription": "<div><h2>Title</h2><p>Description</p></div>"
}}"#,
        quality = description_quality_hint(snapshot.description_length),
        photos = snapshot.image_count,
    ));
    lines.push(String::new());
    lines.push("If some data cannot be found, use null instead of guessing.".to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::models::fixtures;

    #[test]
    fn test_prompt_embeds_fields() {
        let snapshot = fixtures::snapshot();
        let prompt = build_prompt(&snapshot);

        assert!(prompt.contains(&snapshot.source_url));
        assert!(prompt.contains("Title: Naswietlacz solarny 50W"));
        assert!(prompt.contains("Price: 89,90 zł"));
        assert!(prompt.contains("Photos: 7"));
        assert!(prompt.contains("Has description: yes"));
        assert!(prompt.contains("Description length: 3131 characters"));
        assert!(prompt.contains("Seller: SklepBerge"));
        assert!(prompt.contains("Condition: Nowy"));
        assert!(prompt.contains(r#""price": 89.90"#));
        assert!(prompt.contains(r#""descriptionQuality": 6"#));
        assert!(!prompt.contains(NOT_FOUND));
    }

    #[test]
    fn test_prompt_uses_sentinel_for_misses() {
        let mut snapshot = fixtures::snapshot();
        snapshot.price_display = None;
        snapshot.price_amount = None;
        snapshot.seller_name = None;
        snapshot.description_length = 2500;

        let prompt = build_prompt(&snapshot);
        assert!(prompt.contains("2500"));
        assert!(prompt.contains(&format!("Price: {NOT_FOUND}")));
        assert!(prompt.contains(&format!("Seller: {NOT_FOUND}")));
        assert!(prompt.contains(r#""price": null"#));
    }

    #[test]
    fn test_prompt_flags_missing_description() {
        let mut snapshot = fixtures::snapshot();
        snapshot.description_length = 0;

        let prompt = build_prompt(&snapshot);
        assert!(prompt.contains("Has description: no"));
        assert!(prompt.contains(r#""descriptionQuality": 1"#));
    }

    #[test]
    fn test_price_falls_back_to_amount() {
        let mut snapshot = fixtures::snapshot();
        snapshot.price_display = None;
        assert!(build_prompt(&snapshot).contains("Price: 89.90 PLN"));
    }

    #[test]
    fn test_description_quality_hint() {
        assert_eq!(description_quality_hint(0), 1);
        assert_eq!(description_quality_hint(499), 1);
        assert_eq!(description_quality_hint(2500), 5);
        assert_eq!(description_quality_hint(100_000), 10);
    }
}
