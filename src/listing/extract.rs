//! Ordered-fallback field extraction.
//!
//! Every logical field has a list of [`Candidate`]s, tried most reliable
//! first. The first candidate that yields a non-blank value wins. A candidate
//! whose selector does not parse is treated exactly like one that matched
//! nothing, so a single bad entry never aborts the extraction.

use scraper::{ElementRef, Selector};
use tracing::{debug, trace};

/// Where a candidate reads its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Trimmed text content of the element.
    Text,
    /// Trimmed value of the named attribute.
    Attr(&'static str),
}

/// One lookup strategy for a field: a CSS selector plus what to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub selector: &'static str,
    pub source: Source,
}

impl Candidate {
    /// Reads the text content of the first match.
    pub const fn text(selector: &'static str) -> Self {
        Self { selector, source: Source::Text }
    }

    /// Reads an attribute of the first match.
    pub const fn attr(selector: &'static str, name: &'static str) -> Self {
        Self { selector, source: Source::Attr(name) }
    }

    fn read(&self, element: ElementRef) -> Option<String> {
        let raw = match self.source {
            Source::Text => element.text().collect::<String>(),
            Source::Attr(name) => element.value().attr(name)?.to_string(),
        };

        let value = raw.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }
}

/// Parses a selector, logging instead of failing on bad input.
pub(crate) fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            trace!("Skipping unparsable selector {:?}: {:?}", selector, e);
            None
        }
    }
}

/// Returns the first non-blank value produced by `candidates`, in order.
pub fn extract_field(candidates: &[Candidate], root: ElementRef) -> Option<String> {
    for candidate in candidates {
        let Some(selector) = parse_selector(candidate.selector) else {
            continue;
        };

        let Some(element) = root.select(&selector).next() else {
            trace!("No match for {:?}", candidate.selector);
            continue;
        };

        match candidate.read(element) {
            Some(value) => {
                debug!("Matched {:?} = {:.50}", candidate.selector, value);
                return Some(value);
            }
            None => trace!("Blank value for {:?}", candidate.selector),
        }
    }

    None
}

/// Returns the first element matched by `selectors`, in list order.
pub fn first_element<'a>(selectors: &[&str], root: ElementRef<'a>) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|s| {
        let selector = parse_selector(s)?;
        let found = root.select(&selector).next();
        if found.is_some() {
            debug!("Container matched with {:?}", s);
        }
        found
    })
}
