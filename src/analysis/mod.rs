//! Competitive analysis through an LLM completion API.

pub mod client;
pub mod envelope;
pub mod error;
pub mod gate;
pub mod models;
pub mod prompt;

pub use client::{AnalysisClient, Analyzer};
pub use error::AnalysisError;
pub use gate::AnalysisGate;
pub use models::{AnalysisResult, ListingMetrics};
pub use prompt::build_prompt;
