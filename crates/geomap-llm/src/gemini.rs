//! Google Gemini `generateContent` adapter

use async_trait::async_trait;
use geomap_core::config::LayeredConfig;
use geomap_core::error::{GeomapError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::Generator;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini text generator
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiGenerator {
    /// Create a new Gemini generator. An empty API key is rejected.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GeomapError::LlmUnavailable {
                reason: "empty API key".to_string(),
                remediation: "set GENAI_API_KEY or llm.api_key in geomap.toml".to_string(),
            });
        }

        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            GeomapError::LlmUnavailable {
                reason: format!("Failed to build HTTP client: {}", e),
                remediation: "Check the TLS configuration of this host".to_string(),
            }
        })?;

        Ok(Self {
            api_key,
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        })
    }

    /// Build from layered configuration (model, key, timeout)
    pub fn from_config(config: &LayeredConfig) -> Result<Self> {
        let api_key = config.require_api_key()?;
        Self::new(
            api_key,
            config.llm_model.value.clone(),
            Duration::from_secs(config.llm_timeout_secs.value),
        )
    }

    /// Point the client at a different endpoint (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GeminiRequest { contents: vec![GeminiContent { parts: vec![GeminiPart { text: prompt }] }] };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "Sending request to Gemini");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeomapError::LlmRequest {
                reason: if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    format!("Failed to reach Gemini: {}", e)
                },
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| GeomapError::LlmRequest {
            reason: format!("Failed to read Gemini response: {}", e),
        })?;

        if !status.is_success() {
            tracing::warn!(%status, "Gemini API error");
            return Err(GeomapError::LlmRequest { reason: format!("HTTP {}: {}", status, text.trim()) });
        }

        extract_text(&text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Concatenate the text parts of the first candidate
fn extract_text(body: &str) -> Result<String> {
    let parsed: GeminiResponse = serde_json::from_str(body).map_err(|e| GeomapError::LlmRequest {
        reason: format!("Failed to parse Gemini response: {}", e),
    })?;

    let candidate = parsed
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GeomapError::LlmRequest { reason: "No candidates in response".to_string() })?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = match candidate.finish_reason {
            Some(finish) => format!("Empty response (finish reason: {})", finish),
            None => "Empty response".to_string(),
        };
        return Err(GeomapError::LlmRequest { reason });
    }

    Ok(text)
}
