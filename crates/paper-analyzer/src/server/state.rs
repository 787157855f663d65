//! Application state shared across handlers

use std::sync::Arc;

use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::processing::{JobScheduler, PipelineRunner};
use crate::providers::{GeminiSummarizer, Summarizer};
use crate::storage::ResultCache;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: AnalyzerConfig,
    /// Summarization provider
    summarizer: Arc<dyn Summarizer>,
    /// Job registry, result cache and background worker
    scheduler: Arc<JobScheduler>,
}

impl AppState {
    /// Create state backed by the Gemini summarizer.
    ///
    /// Spawns the background job worker, so it must be called inside a tokio runtime.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        let summarizer: Arc<dyn Summarizer> = Arc::new(GeminiSummarizer::new(&config.summarizer)?);
        tracing::info!(
            "Summarizer: {} ({})",
            summarizer.name(),
            summarizer.model()
        );
        Ok(Self::with_summarizer(config, summarizer))
    }

    /// Create state around an existing summarizer
    pub fn with_summarizer(config: AnalyzerConfig, summarizer: Arc<dyn Summarizer>) -> Self {
        let cache = Arc::new(ResultCache::new(config.cache.max_entries));
        let pipeline = Arc::new(PipelineRunner::new(&config, summarizer.clone(), cache));
        let scheduler = JobScheduler::start(pipeline, config.processing.max_concurrent_jobs);

        tracing::info!(
            "Retry policy: {} attempts, {}ms base delay",
            config.retry.max_attempts,
            config.retry.base_delay_ms
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                summarizer,
                scheduler,
            }),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.inner.config
    }

    pub fn summarizer(&self) -> &Arc<dyn Summarizer> {
        &self.inner.summarizer
    }

    pub fn scheduler(&self) -> &Arc<JobScheduler> {
        &self.inner.scheduler
    }

    /// Ready once the summarizer reports it can take requests
    pub async fn is_ready(&self) -> bool {
        match self.inner.summarizer.health_check().await {
            Ok(ready) => ready,
            Err(e) => {
                tracing::warn!("Summarizer health check failed: {}", e);
                false
            }
        }
    }
}
