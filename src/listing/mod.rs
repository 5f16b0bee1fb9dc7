//! Listing page modules: fetching, field extraction, photos, and snapshots.

pub mod client;
pub mod extract;
pub mod images;
pub mod models;
pub mod selectors;
pub mod site;
pub mod snapshot;

pub use client::{PageClient, PageSource, SavedPage};
pub use extract::{extract_field, Candidate, Source};
pub use images::{ImageResolver, ImageRules, ResolvedImages};
pub use models::ListingSnapshot;
pub use site::SiteProfile;
pub use snapshot::SnapshotBuilder;
