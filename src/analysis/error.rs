//! Error taxonomy for analysis requests.

use thiserror::Error;

/// Failure of a single analysis request.
///
/// Each variant is scoped to one attempt; none of them leave the client in
/// a bad state, and none are retried automatically.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Credential missing, or rejected by the upstream API.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Transport failure, non-success status, or an unrecognized envelope.
    #[error("upstream error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Upstream { status: Option<u16>, message: String },

    /// The model's text did not decode into the analysis schema.
    #[error("response does not match the analysis schema: {reason}")]
    Schema { reason: String, raw: String },

    /// Another analysis is already running.
    #[error("an analysis is already in progress")]
    InFlight,
}

impl AnalysisError {
    pub(crate) fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream { status, message: message.into() }
    }

    /// What the user should do about this error.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Auth(_) => "Fix your API key: run `listing-analyzer key set <KEY>` or set OPENAI_API_KEY.",
            Self::Upstream { .. } => "The analysis service is unavailable. Try again later.",
            Self::Schema { .. } => {
                "The analysis service returned an unexpected response. Contact support with the raw output (--verbose)."
            }
            Self::InFlight => "Wait for the running analysis to finish.",
        }
    }

    /// Raw model text for schema failures.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            Self::Schema { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            AnalysisError::Auth("missing API key".into()).to_string(),
            "authentication failed: missing API key"
        );
        assert_eq!(
            AnalysisError::upstream(Some(500), "boom").to_string(),
            "upstream error (500): boom"
        );
        assert_eq!(
            AnalysisError::upstream(None, "connection refused").to_string(),
            "upstream error: connection refused"
        );
    }

    #[test]
    fn test_hints_are_distinct() {
        let auth = AnalysisError::Auth(String::new()).hint();
        let upstream = AnalysisError::upstream(None, "").hint();
        let schema = AnalysisError::Schema { reason: String::new(), raw: String::new() }.hint();
        assert!(auth.contains("API key"));
        assert!(upstream.contains("Try again later"));
        assert!(schema.contains("Contact support"));
    }

    #[test]
    fn test_raw_text() {
        let err = AnalysisError::Schema { reason: "eof".into(), raw: "not json".into() };
        assert_eq!(err.raw_text(), Some("not json"));
        assert!(AnalysisError::InFlight.raw_text().is_none());
    }
}
