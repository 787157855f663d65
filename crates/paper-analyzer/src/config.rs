//! Configuration for the analyzer

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Main analyzer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Summarization service configuration
    pub summarizer: SummarizerConfig,
    /// Retry/backoff policy for summarization calls
    pub retry: RetryConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Background processing configuration
    pub processing: ProcessingConfig,
    /// Result cache configuration
    pub cache: CacheConfig,
}

impl AnalyzerConfig {
    /// Load configuration: defaults, then an optional TOML file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                toml::from_str::<AnalyzerConfig>(&raw).map_err(|e| {
                    Error::Config(format!("Invalid config file {}: {}", path.display(), e))
                })?
            }
            None => AnalyzerConfig::default(),
        };

        config.apply_env()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                self.summarizer.api_key = Some(key);
            }
        }
        if let Ok(model) = std::env::var("ANALYZER_MODEL") {
            self.summarizer.model = model;
        }
        if let Ok(host) = std::env::var("ANALYZER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("ANALYZER_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| Error::Config(format!("Invalid ANALYZER_PORT '{}': {}", port, e)))?;
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// Summarization service (Gemini) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// API base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// API key; usually supplied through GEMINI_API_KEY
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(), // Free tier, fast, handles JSON well
            api_key: None,
            temperature: 0.3,
            timeout_secs: 120,
        }
    }
}

/// Retry policy for rate-limited summarization calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per call, including the first
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further attempt
    pub base_delay_ms: u64,
    /// Case-insensitive substrings that mark an error as a quota/rate-limit signal
    pub quota_markers: Vec<String>,
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 40_000, // Free tier allows 5 requests/minute
            quota_markers: vec![
                "resource_exhausted".to_string(),
                "quota".to_string(),
                "429 too many requests".to_string(),
            ],
        }
    }
}

/// Chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk (~3000 tokens)
    pub max_chunk_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 12_000,
        }
    }
}

/// Background processing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Maximum jobs running at once; unset means no limit
    pub max_concurrent_jobs: Option<usize>,
}

/// Result cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum cached results; unset means unbounded
    pub max_entries: Option<usize>,
}
