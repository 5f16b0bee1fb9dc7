//! listing-analyzer - Marketplace listing scraper with LLM competitive analysis
//!
//! Turns an offer page into a structured [`ListingSnapshot`], relays it
//! between the scraping and display sides, and sends it to a completion API
//! for a competitive analysis.

pub mod analysis;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod format;
pub mod listing;
pub mod relay;

pub use analysis::{AnalysisError, AnalysisResult};
pub use config::Config;
pub use listing::{ListingSnapshot, SnapshotBuilder};
pub use relay::{PageContext, SnapshotRelay};
