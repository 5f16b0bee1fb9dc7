//! Integration tests for snapshot building using fixture files.

use chrono::{TimeZone, Utc};
use listing_analyzer::analysis::build_prompt;
use listing_analyzer::config::Config;
use listing_analyzer::listing::{ImageRules, SavedPage, SiteProfile};
use listing_analyzer::{ListingSnapshot, PageContext, SnapshotBuilder, SnapshotRelay};
use scraper::Html;
use std::sync::Arc;

const OFFER_FIXTURE: &str = include_str!("fixtures/offer_page.html");
const OFFER_URL: &str = "https://allegro.pl/oferta/lampa-solarna-led-100w-17945721736";

fn build(html: &str) -> ListingSnapshot {
    let site = SiteProfile::default();
    let rules = ImageRules::default();
    let captured_at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    SnapshotBuilder::new(&site, &rules).build(&Html::parse_document(html), OFFER_URL, captured_at)
}

#[test]
fn test_build_offer_page() {
    let snapshot = build(OFFER_FIXTURE);

    assert_eq!(snapshot.listing_id.as_deref(), Some("lampa-solarna-led-100w-17945721736"));
    assert_eq!(snapshot.title.as_deref(), Some("Lampa solarna LED 100W z czujnikiem ruchu"));
    assert_eq!(snapshot.price_display.as_deref(), Some("89,90 zł"));
    assert_eq!(snapshot.price_amount, Some(89.9));
    assert_eq!(snapshot.currency, "PLN");
    assert_eq!(snapshot.seller_name.as_deref(), Some("SklepBerge"));
    assert_eq!(snapshot.condition.as_deref(), Some("Nowy"));
    assert!(snapshot.description_length > 200);
}

#[test]
fn test_offer_page_images() {
    let snapshot = build(OFFER_FIXTURE);

    // Six distinct product photos; size variants, logos, thumbnails, foreign
    // hosts, images without alt text and recommendations are not counted.
    assert_eq!(snapshot.image_count, 6);
    assert_eq!(snapshot.image_urls.len(), 5);

    // Active photo first, then largest first.
    let names: Vec<&str> =
        snapshot.image_urls.iter().map(|u| u.rsplit('/').next().unwrap()).collect();
    assert_eq!(names, vec!["lamp-main", "lamp-night", "lamp-pack", "lamp-back", "lamp-side"]);

    assert!(snapshot.image_urls.iter().all(|u| u.contains("allegroimg.com")));
    assert!(!snapshot.image_urls.iter().any(|u| u.contains("logo")));
}

#[test]
fn test_missing_fields_keep_shape() {
    let snapshot = build("<html><body><p>Nothing here</p></body></html>");

    assert!(snapshot.title.is_none());
    assert!(snapshot.price_display.is_none());
    assert_eq!(snapshot.image_count, 0);
    assert!(snapshot.image_urls.is_empty());
    assert_eq!(snapshot.description_length, 0);

    let json = serde_json::to_value(&snapshot).unwrap();
    for key in ["title", "priceDisplay", "priceAmount", "sellerName", "condition"] {
        assert!(json.get(key).unwrap().is_null(), "{key} should be null");
    }
    assert_eq!(json["currency"], "PLN");
}

#[test]
fn test_prompt_from_fixture() {
    let prompt = build_prompt(&build(OFFER_FIXTURE));
    assert!(prompt.contains("Title: Lampa solarna LED 100W z czujnikiem ruchu"));
    assert!(prompt.contains("Photos: 6"));
    assert!(prompt.contains("Seller: SklepBerge"));
}

#[tokio::test]
async fn test_page_context_publishes_fixture() {
    let relay = Arc::new(SnapshotRelay::new());
    let page = PageContext::open(OFFER_URL, Arc::clone(&relay));
    let config = Config { delay_ms: 0, delay_jitter_ms: 0, ..Config::default() };

    let update = relay.subscribe_once();
    let scraped = page.scrape(&SavedPage::new(OFFER_FIXTURE), &config).await.unwrap();

    let pushed = update.await.unwrap();
    assert_eq!(pushed, scraped);
    assert_eq!(relay.latest_source(), Some(page.id()));
    assert_eq!(relay.fetch_latest().unwrap().image_count, 6);

    assert!(page.close());
    assert!(relay.fetch_latest().is_none());
}
