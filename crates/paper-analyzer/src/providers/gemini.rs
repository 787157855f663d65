//! Gemini client for section summaries and global synthesis
//!
//! Talks to the Generative Language API in JSON response mode.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::SummarizerConfig;
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::providers::llm::Summarizer;
use crate::types::{Chunk, ChunkSummary, GlobalAnalysis, SectionSummary};

/// Gemini client via the Generative Language API
pub struct GeminiSummarizer {
    client: Client,
    config: SummarizerConfig,
}

impl GeminiSummarizer {
    /// Create a new Gemini client
    ///
    /// A missing API key is not an error here so the server can start without
    /// one; every call then fails with a configuration error.
    pub fn new(config: &SummarizerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        if config.api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY is not set; summarization requests will fail");
        }

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Get the API endpoint URL
    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn api_key(&self) -> Result<&str> {
        self.config.api_key.as_deref().ok_or_else(|| {
            Error::Config(
                "GEMINI_API_KEY is not set. Add it to the environment or a .env file.".to_string(),
            )
        })
    }

    /// Send a prompt and decode the JSON object the model returns
    async fn generate_json<T: DeserializeOwned>(&self, prompt: String) -> Result<T> {
        let api_key = self.api_key()?;

        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        // Status and body are kept in the message so quota signals stay classifiable
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::summarizer(format!(
                "Gemini generation failed ({}): {}",
                status, body
            )));
        }

        let gen_response: GenerateResponse = response.json().await?;

        let text = gen_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| Error::summarizer("No text in Gemini response"))?;

        Ok(serde_json::from_str(strip_code_fence(&text))?)
    }
}

/// Models occasionally wrap JSON in a markdown fence even in JSON mode
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[derive(serde::Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(serde::Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(serde::Serialize)]
struct Part {
    text: String,
}

#[derive(serde::Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(serde::Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(serde::Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(serde::Deserialize)]
struct ResponsePart {
    text: String,
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize_chunk(&self, chunk: &Chunk) -> Result<ChunkSummary> {
        self.generate_json(PromptBuilder::section_summary(chunk)).await
    }

    async fn synthesize(&self, sections: &[SectionSummary]) -> Result<GlobalAnalysis> {
        self.generate_json(PromptBuilder::global_synthesis(sections)).await
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.config.api_key.is_some())
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
