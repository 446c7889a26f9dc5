//! External model gateway: one bounded call to the hosted generative-text API.
//!
//! Every unusable outcome — transport error, non-2xx status, malformed body,
//! empty or safety-blocked candidate list — collapses into the single failure
//! signal `None`. The raw detail is logged for operator visibility and never
//! surfaced to callers. One attempt per invocation; there is no retry.

use harborqa_core::AppConfig;
use serde::Deserialize;

/// Seam over the hosted text model. `None` is the uniform failure signal.
#[async_trait::async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Live gateway to the Gemini generateContent endpoint. The client carries
/// the fixed request timeout from config; a request still in flight when it
/// elapses counts as a failure.
pub struct GeminiModel {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl GeminiModel {
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            url: config.model_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait::async_trait]
impl TextModel for GeminiModel {
    async fn generate(&self, prompt: &str) -> Option<String> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        let response = match self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(target: "harborqa::model", error = %e, "model request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(
                target: "harborqa::model",
                status = %status,
                detail = %detail,
                "model returned non-success status"
            );
            return None;
        }

        let parsed: GenerateContentResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(target: "harborqa::model", error = %e, "model response body was malformed");
                return None;
            }
        };

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .filter(|t| !t.trim().is_empty());
        if text.is_none() {
            tracing::warn!(
                target: "harborqa::model",
                "model returned no usable candidates (safety block or empty output)"
            );
        }
        text
    }
}

/// Deterministic offline model for demos and tests. Prompts asking for a
/// JSON array get a valid one-element test-case array; everything else gets
/// a short script.
pub struct MockModel;

#[async_trait::async_trait]
impl TextModel for MockModel {
    async fn generate(&self, prompt: &str) -> Option<String> {
        if prompt.contains("JSON array") {
            Some(
                "```json\n[{\"id\": \"TC-100\", \"title\": \"Mock generated case\", \
                 \"description\": \"Deterministic output from the mock model.\", \
                 \"steps\": [\"Open the page\", \"Exercise the feature\"], \
                 \"expected_result\": \"Feature behaves as described\"}]\n```"
                    .to_string(),
            )
        } else {
            Some("# Mock automation script\nprint(\"mock run\")".to_string())
        }
    }
}
