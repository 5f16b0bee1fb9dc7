//! HTTP client for the LLM completion API.

use crate::analysis::envelope::{error_message, extract_text, strip_code_fence};
use crate::analysis::error::AnalysisError;
use crate::analysis::models::AnalysisResult;
use crate::analysis::prompt::{build_prompt, INSTRUCTIONS};
use crate::config::AnalysisConfig;
use crate::listing::ListingSnapshot;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use wreq::Client;

/// Trait for running an analysis - enables mocking for tests.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Runs one analysis of `snapshot` with the given API key.
    async fn analyze(
        &self,
        snapshot: &ListingSnapshot,
        credential: Option<&str>,
    ) -> Result<AnalysisResult, AnalysisError>;
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: String,
    reasoning: Reasoning<'a>,
    text: TextOptions<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Reasoning<'a> {
    effort: &'a str,
}

#[derive(Debug, Serialize)]
struct TextOptions<'a> {
    verbosity: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Client for the responses endpoint of the completion API.
pub struct AnalysisClient {
    client: Client,
    settings: AnalysisConfig,
}

impl AnalysisClient {
    /// Creates a client from analysis settings.
    pub fn new(settings: &AnalysisConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client, settings: settings.clone() })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/responses", self.settings.base_url.trim_end_matches('/'))
    }

    fn request_body<'a>(&'a self, snapshot: &ListingSnapshot) -> ResponsesRequest<'a> {
        let tools = if self.settings.web_search { vec![Tool { kind: "web_search" }] } else { Vec::new() };

        ResponsesRequest {
            model: &self.settings.model,
            instructions: INSTRUCTIONS,
            input: build_prompt(snapshot),
            reasoning: Reasoning { effort: &self.settings.effort },
            text: TextOptions { verbosity: &self.settings.verbosity },
            tools,
        }
    }
}

#[async_trait]
impl Analyzer for AnalysisClient {
    async fn analyze(
        &self,
        snapshot: &ListingSnapshot,
        credential: Option<&str>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let credential = credential
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AnalysisError::Auth("no API key configured".to_string()))?;

        let body = serde_json::to_vec(&self.request_body(snapshot))
            .map_err(|e| AnalysisError::upstream(None, format!("failed to encode request: {e}")))?;

        let url = self.endpoint();
        info!("Requesting analysis from {} (model {})", url, self.settings.model);
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {credential}"))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| AnalysisError::upstream(None, format!("request failed: {e}")))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AnalysisError::upstream(Some(status), format!("failed to read body: {e}")))?;

        info!("Analysis response {} after {:.1}s", status, started.elapsed().as_secs_f64());
        parse_response(status, &text)
    }
}

/// Interprets a raw HTTP status and body.
pub fn parse_response(status: u16, body: &str) -> Result<AnalysisResult, AnalysisError> {
    let envelope = serde_json::from_str::<Value>(body);

    if !(200..300).contains(&status) {
        let message = envelope
            .as_ref()
            .ok()
            .and_then(error_message)
            .map(str::to_string)
            .unwrap_or_else(|| body.trim().to_string());

        warn!("Analysis API returned {}: {}", status, message);
        return Err(match status {
            401 | 403 => AnalysisError::Auth(message),
            _ => AnalysisError::upstream(Some(status), message),
        });
    }

    let envelope = envelope.map_err(|e| {
        AnalysisError::upstream(Some(status), format!("response body is not JSON: {e}"))
    })?;

    if let Some(message) = envelope.pointer("/error/message").and_then(Value::as_str) {
        return Err(AnalysisError::upstream(Some(status), message));
    }

    let text = extract_text(&envelope)
        .ok_or_else(|| AnalysisError::upstream(Some(status), "unrecognized response envelope"))?;

    decode_analysis(text)
}

/// Decodes the model's text into an [`AnalysisResult`].
pub fn decode_analysis(text: &str) -> Result<AnalysisResult, AnalysisError> {
    let schema_error = |reason: String| AnalysisError::Schema { reason, raw: text.to_string() };

    let result: AnalysisResult =
        serde_json::from_str(strip_code_fence(text)).map_err(|e| schema_error(e.to_string()))?;
    result.validate().map_err(schema_error)?;

    debug!("Decoded analysis with rating {}", result.rating);
    Ok(result)
}
