//! Summarization provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Chunk, ChunkSummary, GlobalAnalysis, SectionSummary};

/// Trait for LLM-backed summarization
///
/// Implementations:
/// - `GeminiSummarizer`: Google Generative Language API (gemini-2.5-flash)
///
/// Errors are returned as-is; classification into quota and non-quota
/// failures happens in the retrying invoker.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize a single chunk of a section
    async fn summarize_chunk(&self, chunk: &Chunk) -> Result<ChunkSummary>;

    /// Synthesize one paper-level analysis from all section summaries
    async fn synthesize(&self, sections: &[SectionSummary]) -> Result<GlobalAnalysis>;

    /// Check if the provider is configured and reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
