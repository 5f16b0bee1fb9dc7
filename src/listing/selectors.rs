//! CSS selector tables for listing pages.
//!
//! This file contains all selectors used for scraping offer pages, ordered
//! most reliable first. Update this file when the site changes its markup;
//! the extraction code itself should not need to change.
//!
//! **Update process**: When a field comes back empty, capture an HTML sample,
//! put the working selector at the front of the list, and add a test fixture.

use crate::listing::extract::Candidate;

/// Scalar fields of an offer page.
pub mod fields {
    use super::*;

    /// Offer title.
    pub static TITLE: &[Candidate] = &[
        Candidate::text("h1[itemprop='name']"),
        Candidate::text("[data-box-name='Title'] h1"),
        Candidate::text("div[data-box-name='listing title'] h1"),
        Candidate::text("h1[data-role='title']"),
        Candidate::attr("meta[property='og:title']", "content"),
        Candidate::text("h1"),
    ];

    /// Human readable price, currency included.
    pub static PRICE_DISPLAY: &[Candidate] = &[
        Candidate::attr("[data-box-name='Price'] [data-price]", "aria-label"),
        Candidate::text("[data-box-name='Price'] [data-price]"),
        Candidate::text("div[data-price]"),
        Candidate::text("[data-testid='price-container'] span"),
        Candidate::text("span[itemprop='price']"),
        Candidate::text("[data-role='price']"),
    ];

    /// Machine readable price amount.
    pub static PRICE_AMOUNT: &[Candidate] = &[
        Candidate::attr("meta[itemprop='price']", "content"),
        Candidate::attr("[itemprop='price']", "content"),
        Candidate::attr("meta[property='product:price:amount']", "content"),
    ];

    /// ISO currency code.
    pub static CURRENCY: &[Candidate] = &[
        Candidate::attr("meta[itemprop='priceCurrency']", "content"),
        Candidate::attr("meta[property='product:price:currency']", "content"),
    ];

    /// Description body.
    pub static DESCRIPTION: &[Candidate] = &[
        Candidate::text("div[data-box-name='Description']"),
        Candidate::text("[itemprop='description']"),
        Candidate::text("[data-role='description']"),
        Candidate::text("div.offer-description"),
    ];

    /// Seller name.
    pub static SELLER: &[Candidate] = &[
        Candidate::text("[data-box-name='Seller'] a"),
        Candidate::text("div[data-box-name='seller info'] a"),
        Candidate::text("a[data-role='seller-link']"),
        Candidate::text("section[aria-label*='Sprzedawca'] a"),
        Candidate::text("div.seller-info a"),
        Candidate::text("a[href*='/uzytkownik/']"),
    ];

    /// Item condition.
    pub static CONDITION: &[Candidate] = &[
        Candidate::text("[data-box-name='Parameters'] [data-role='condition']"),
        Candidate::attr("[itemprop='itemCondition']", "content"),
        Candidate::text("[itemprop='itemCondition']"),
        Candidate::text("[data-testid='condition-value']"),
    ];
}

/// Selectors for the photo gallery.
pub mod gallery {
    /// Gallery container, first match wins.
    pub static CONTAINER: &[&str] = &[
        "div[data-box-name='gallery']",
        "div[data-box-name='Gallery']",
        "[data-testid='gallery']",
        "section[aria-label*='galeria']",
        "[data-role='gallery']",
    ];

    /// The photo currently shown in the main viewer.
    pub static ACTIVE: &[&str] = &[
        "img[data-role='photo-preview']",
        "img[data-testid='main-image']",
        "[aria-current='true'] img",
        ".swiper-slide-active img",
    ];

    /// Image-bearing elements inside a gallery.
    pub static IMAGE: &str = "img";
}

/// Selectors for detecting bot-challenge pages.
pub mod errors {
    /// Challenge or captcha markers.
    pub static BLOCKED: &[&str] = &[
        "iframe[src*='captcha-delivery.com']",
        "form[action*='captcha']",
        "div#ddv1-captcha-container",
    ];
}
