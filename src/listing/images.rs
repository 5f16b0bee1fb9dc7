//! Product photo discovery and ranking.
//!
//! Pages carry many images that are not product photos: logos, icons,
//! badges, and thumbnails of unrelated offers. The resolver keeps only
//! images served from the marketplace image CDN that look like product
//! photos, collapses size variants of the same photo, and ranks the rest
//! by pixel area.

use crate::listing::extract::{first_element, parse_selector};
use crate::listing::selectors::gallery;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, trace};
use url::Url;

/// Attributes that may carry an image source, in preference order.
const SOURCE_ATTRS: &[&str] = &["src", "data-src", "data-lazy-src"];

/// Responsive source-set attributes; only the first URL is used.
const SRCSET_ATTRS: &[&str] = &["srcset", "data-srcset"];

/// Upper bound on listed URLs, whatever `max_urls` is configured to.
pub const MAX_LISTED_URLS: usize = 5;

/// Extensions stripped when computing an image identity.
const IMAGE_EXTENSIONS: &[&str] = &[".webp", ".jpeg", ".jpg", ".png", ".avif", ".gif"];

/// Filtering thresholds for product photos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRules {
    /// Host (or host suffix) that serves product photos.
    #[serde(default = "default_cdn_host")]
    pub cdn_host: String,

    /// Case-insensitive URL substrings that mark non-product images.
    #[serde(default = "default_exclusions")]
    pub exclusions: Vec<String>,

    /// Minimum length of the alt text.
    #[serde(default = "default_min_alt_len")]
    pub min_alt_len: usize,

    /// Images whose declared width and height are both below this are dropped.
    #[serde(default = "default_min_dimension")]
    pub min_dimension: u32,

    /// Maximum number of URLs returned, at most [`MAX_LISTED_URLS`].
    #[serde(default = "default_max_urls")]
    pub max_urls: usize,

    /// Cap on the count when no gallery container was found.
    #[serde(default = "default_fallback_cap")]
    pub fallback_cap: usize,
}

fn default_cdn_host() -> String {
    "allegroimg.com".to_string()
}

fn default_exclusions() -> Vec<String> {
    ["logo", "icon", "badge", "sprite", "placeholder", "banner", "avatar", "action-common", "brand-zone"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_min_alt_len() -> usize {
    3
}

fn default_min_dimension() -> u32 {
    100
}

fn default_max_urls() -> usize {
    5
}

fn default_fallback_cap() -> usize {
    50
}

impl Default for ImageRules {
    fn default() -> Self {
        Self {
            cdn_host: default_cdn_host(),
            exclusions: default_exclusions(),
            min_alt_len: default_min_alt_len(),
            min_dimension: default_min_dimension(),
            max_urls: default_max_urls(),
            fallback_cap: default_fallback_cap(),
        }
    }
}

/// Result of image resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedImages {
    /// Best photos, largest first, at most `max_urls`.
    pub image_urls: Vec<String>,
    /// Number of distinct qualifying photos.
    pub image_count: usize,
}

#[derive(Debug, Clone)]
struct ImageCandidate {
    url: String,
    identity: String,
    width: Option<u32>,
    height: Option<u32>,
}

impl ImageCandidate {
    fn area(&self) -> u64 {
        match (self.width, self.height) {
            (Some(w), Some(h)) => u64::from(w) * u64::from(h),
            _ => 0,
        }
    }
}

/// Finds and ranks product photos on a page.
pub struct ImageResolver<'r> {
    rules: &'r ImageRules,
    page_url: Option<Url>,
}

impl<'r> ImageResolver<'r> {
    /// Creates a resolver; `page_url` is used to resolve relative sources.
    pub fn new(rules: &'r ImageRules, page_url: Option<&str>) -> Self {
        Self { rules, page_url: page_url.and_then(|u| Url::parse(u).ok()) }
    }

    /// Resolves the product photos below `root`.
    pub fn resolve(&self, root: ElementRef) -> ResolvedImages {
        let container = first_element(gallery::CONTAINER, root);
        let scope = container.unwrap_or(root);
        if container.is_none() {
            debug!("No gallery container found, scanning the whole document");
        }

        let Some(img_selector) = parse_selector(gallery::IMAGE) else {
            return ResolvedImages::default();
        };

        let mut seen = HashSet::new();
        let mut unique: Vec<ImageCandidate> = scope
            .select(&img_selector)
            .filter_map(|img| self.candidate(img))
            .filter(|c| seen.insert(c.identity.clone()))
            .collect();

        // Stable sort keeps document order among equal areas.
        unique.sort_by(|a, b| b.area().cmp(&a.area()));

        if let Some(active) = self.active_candidate(scope) {
            match unique.iter().position(|c| c.identity == active.identity) {
                Some(pos) => {
                    let found = unique.remove(pos);
                    unique.insert(0, found);
                }
                None => unique.insert(0, active),
            }
        }

        let mut image_count = unique.len();
        if container.is_none() {
            image_count = image_count.min(self.rules.fallback_cap);
        }

        let image_urls: Vec<String> = unique
            .into_iter()
            .take(self.rules.max_urls.min(MAX_LISTED_URLS).min(image_count))
            .map(|c| c.url)
            .collect();

        debug!("Resolved {} images ({} listed)", image_count, image_urls.len());

        ResolvedImages { image_urls, image_count }
    }

    /// First photo shown in the main viewer that passes the same checks.
    fn active_candidate(&self, scope: ElementRef) -> Option<ImageCandidate> {
        gallery::ACTIVE.iter().filter_map(|s| parse_selector(s)).find_map(|selector| {
            scope.select(&selector).find_map(|img| self.candidate(img))
        })
    }

    /// Builds a candidate from an image element, or `None` if it is rejected.
    fn candidate(&self, img: ElementRef) -> Option<ImageCandidate> {
        let raw = source_of(img)?;
        let url = self.absolutize(raw)?;

        let host = url.host_str()?;
        let cdn = self.rules.cdn_host.as_str();
        if host != cdn && !host.ends_with(&format!(".{cdn}")) {
            trace!("Rejected {} (foreign host)", url);
            return None;
        }

        let lowered = url.as_str().to_lowercase();
        if self.rules.exclusions.iter().any(|ex| lowered.contains(&ex.to_lowercase())) {
            trace!("Rejected {} (excluded pattern)", url);
            return None;
        }

        let alt_len = img.value().attr("alt").map_or(0, |a| a.trim().chars().count());
        if alt_len < self.rules.min_alt_len {
            trace!("Rejected {} (alt text too short)", url);
            return None;
        }

        let width = dimension(img.value().attr("width"));
        let height = dimension(img.value().attr("height"));
        if let (Some(w), Some(h)) = (width, height) {
            if w < self.rules.min_dimension && h < self.rules.min_dimension {
                trace!("Rejected {} ({}x{} too small)", url, w, h);
                return None;
            }
        }

        Some(ImageCandidate { identity: identity(&url), url: url.to_string(), width, height })
    }

    fn absolutize(&self, raw: &str) -> Option<Url> {
        match &self.page_url {
            Some(base) => base.join(raw).ok(),
            None if raw.starts_with("//") => Url::parse(&format!("https:{raw}")).ok(),
            None => Url::parse(raw).ok(),
        }
    }
}

/// Picks the first usable source attribute of an image element.
fn source_of(img: ElementRef) -> Option<&str> {
    let usable = |v: &&str| !v.trim().is_empty() && !v.trim_start().starts_with("data:");

    let direct = SOURCE_ATTRS.iter().filter_map(|a| img.value().attr(a)).find(usable);
    if let Some(src) = direct {
        return Some(src.trim());
    }

    SRCSET_ATTRS.iter().filter_map(|a| img.value().attr(a)).find_map(|set| {
        set.split(|c: char| c.is_whitespace() || c == ',').find(|t| !t.is_empty() && usable(t))
    })
}

/// Parses a width/height attribute such as `800` or `800px`.
fn dimension(value: Option<&str>) -> Option<u32> {
    let digits: String = value?.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Returns true for path segments that only encode a rendition size.
fn is_size_segment(segment: &str) -> bool {
    if segment == "original" {
        return true;
    }
    if let Some(rest) = segment.strip_prefix('s') {
        if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
            return true;
        }
    }
    is_dimensions(segment)
}

/// Matches `800x600`.
fn is_dimensions(text: &str) -> bool {
    match text.split_once('x') {
        Some((w, h)) => {
            !w.is_empty()
                && !h.is_empty()
                && w.chars().all(|c| c.is_ascii_digit())
                && h.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Strips a known image extension and a trailing `_WxH` / `-WxH` marker.
fn strip_file_suffixes(name: &str) -> &str {
    let lowered = name.to_ascii_lowercase();
    let mut stem = IMAGE_EXTENSIONS
        .iter()
        .find(|ext| lowered.ends_with(*ext))
        .map_or(name, |ext| &name[..name.len() - ext.len()]);

    if let Some(idx) = stem.rfind(['_', '-']) {
        if is_dimensions(&stem[idx + 1..]) {
            stem = &stem[..idx];
        }
    }
    stem
}

/// Normalized identity of an image: host and path without size variants.
pub(crate) fn identity(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let segments: Vec<&str> =
        url.path().split('/').filter(|s| !s.is_empty() && !is_size_segment(s)).collect();

    let mut parts: Vec<&str> = Vec::with_capacity(segments.len());
    if let Some((last, rest)) = segments.split_last() {
        parts.extend_from_slice(rest);
        parts.push(strip_file_suffixes(last));
    }

    format!("{}/{}", host, parts.join("/"))
}
