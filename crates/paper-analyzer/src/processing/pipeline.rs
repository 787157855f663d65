//! Single-document analysis pipeline
//!
//! parse -> empty check -> cache lookup -> segment -> chunk -> summarize each
//! chunk -> synthesize -> cache write. Steps always run in this order.

use std::sync::Arc;

use crate::config::AnalyzerConfig;
use crate::error::{Error, Result};
use crate::generation::build_fallback_analysis;
use crate::ingestion::{
    Chunker, DocumentParser, FileParser, SectionChunker, SectionDetector, Segmenter,
};
use crate::providers::Summarizer;
use crate::storage::{Fingerprint, ResultCache};
use crate::types::{
    estimate_tokens, join_pages, Analysis, AnalysisMode, AnalysisResult, AnalysisStats,
    DetectedSection, ExtractionReport, GlobalAnalysis, PageRecord, SectionSummary,
};

use super::retry::RetryingInvoker;

/// Parsed pages plus their joined text
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub pages: Vec<PageRecord>,
    pub text: String,
}

/// What a pipeline run produced
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Fully summarized result, fresh or from cache
    Complete(AnalysisResult),
    /// Summarizer stayed rate limited; structure-only result that was not cached
    QuotaLimited {
        fallback: AnalysisResult,
        message: String,
    },
}

/// Drives one document through extraction, summarization and caching
pub struct PipelineRunner {
    parser: Arc<dyn DocumentParser>,
    segmenter: Arc<dyn Segmenter>,
    chunker: Arc<dyn Chunker>,
    summarizer: Arc<dyn Summarizer>,
    invoker: RetryingInvoker,
    cache: Arc<ResultCache>,
}

impl PipelineRunner {
    /// Build a runner with the default parser, section detector and chunker
    pub fn new(
        config: &AnalyzerConfig,
        summarizer: Arc<dyn Summarizer>,
        cache: Arc<ResultCache>,
    ) -> Self {
        Self {
            parser: Arc::new(FileParser::new()),
            segmenter: Arc::new(SectionDetector::new()),
            chunker: Arc::new(SectionChunker::new(config.chunking.max_chunk_chars)),
            summarizer,
            invoker: RetryingInvoker::from_config(&config.retry),
            cache,
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn DocumentParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_segmenter(mut self, segmenter: Arc<dyn Segmenter>) -> Self {
        self.segmenter = segmenter;
        self
    }

    pub fn with_chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn with_invoker(mut self, invoker: RetryingInvoker) -> Self {
        self.invoker = invoker;
        self
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub fn summarizer(&self) -> &Arc<dyn Summarizer> {
        &self.summarizer
    }

    /// Parse into pages without judging whether any text came out
    pub async fn parse_pages(&self, data: &[u8], filename: &str) -> Result<ExtractedDocument> {
        let parser = self.parser.clone();
        let bytes = data.to_vec();
        let name = filename.to_string();

        // PDF extraction is CPU bound
        let pages = tokio::task::spawn_blocking(move || parser.parse(&name, &bytes))
            .await
            .map_err(|e| Error::internal(format!("Parser task failed: {}", e)))??;

        let text = join_pages(&pages);
        Ok(ExtractedDocument { pages, text })
    }

    /// Parse and reject documents without extractable text
    pub async fn extract(&self, data: &[u8], filename: &str) -> Result<ExtractedDocument> {
        let doc = self.parse_pages(data, filename).await?;
        if doc.text.trim().is_empty() {
            return Err(Error::EmptyContent(filename.to_string()));
        }
        Ok(doc)
    }

    /// Extraction preview: pages, sizes and detected sections, no summarization.
    ///
    /// Documents without text (scans, image-only PDFs) still get a report, with
    /// zero characters, so callers can see why analysis would fail.
    pub async fn inspect(&self, data: &[u8], filename: &str) -> Result<ExtractionReport> {
        let doc = self.parse_pages(data, filename).await?;
        let sections = self.segmenter.segment(&doc.pages);

        Ok(ExtractionReport {
            filename: filename.to_string(),
            total_pages: doc.pages.len(),
            total_characters: doc.text.chars().count(),
            total_tokens: estimate_tokens(&doc.text),
            detected_sections: sections
                .iter()
                .map(|s| DetectedSection {
                    name: s.name.clone(),
                    page_start: s.page_start,
                    content_length: s.content.chars().count(),
                })
                .collect(),
        })
    }

    /// Analyze one document.
    ///
    /// Parse and empty-content failures are returned as errors. Quota
    /// exhaustion is not an error here: it yields [`RunOutcome::QuotaLimited`]
    /// carrying the fallback result.
    pub async fn run(&self, data: &[u8], filename: &str) -> Result<RunOutcome> {
        let doc = self.extract(data, filename).await?;

        // A hit is the stored payload with `cached` set and the filename of
        // this request; no other field changes
        let fingerprint = Fingerprint::of(data);
        if let Some(mut hit) = self.cache.get(&fingerprint) {
            tracing::info!("Serving '{}' from cache ({})", filename, fingerprint.short());
            hit.filename = filename.to_string();
            return Ok(RunOutcome::Complete(hit));
        }

        let sections = self.segmenter.segment(&doc.pages);
        let chunks = self.chunker.chunk(&sections);
        let total_tokens = estimate_tokens(&doc.text);

        tracing::info!(
            "Analyzing '{}': {} pages, {} sections, {} chunks, ~{} tokens",
            filename,
            doc.pages.len(),
            sections.len(),
            chunks.len(),
            total_tokens
        );

        let summarizer = &self.summarizer;
        let quota_limited = |message: String| {
            tracing::warn!("Falling back to structure-only analysis for '{}'", filename);
            RunOutcome::QuotaLimited {
                fallback: AnalysisResult {
                    filename: filename.to_string(),
                    total_pages: doc.pages.len(),
                    total_tokens,
                    analysis: build_fallback_analysis(&sections, &message),
                    cached: false,
                },
                message,
            }
        };

        let mut section_summaries = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            tracing::debug!("Summarizing chunk {}/{}: {}", i + 1, chunks.len(), chunk.name);

            match self
                .invoker
                .invoke(&chunk.name, || summarizer.summarize_chunk(chunk))
                .await
            {
                Ok(summary) => section_summaries.push(SectionSummary::from_chunk(chunk, summary)),
                Err(e @ Error::QuotaExceeded { .. }) => return Ok(quota_limited(e.to_string())),
                Err(e) => {
                    tracing::warn!("Failed to summarize '{}': {}", chunk.name, e);
                    section_summaries.push(SectionSummary::failed(chunk, &e.to_string()));
                }
            }
        }

        let global = match self
            .invoker
            .invoke("global synthesis", || summarizer.synthesize(&section_summaries))
            .await
        {
            Ok(global) => global,
            Err(e @ Error::QuotaExceeded { .. }) => return Ok(quota_limited(e.to_string())),
            Err(e) => {
                tracing::warn!("Global synthesis failed for '{}': {}", filename, e);
                GlobalAnalysis::placeholder(&e.to_string())
            }
        };

        let result = AnalysisResult {
            filename: filename.to_string(),
            total_pages: doc.pages.len(),
            total_tokens,
            analysis: Analysis {
                global,
                stats: AnalysisStats {
                    total_sections: sections.len(),
                    total_chunks_processed: chunks.len(),
                    mode: AnalysisMode::Full,
                    error: None,
                },
                sections: section_summaries,
            },
            cached: false,
        };

        self.cache.put(fingerprint, &result);
        tracing::info!(
            "Analysis complete for '{}': {} section summaries",
            filename,
            result.analysis.sections.len()
        );

        Ok(RunOutcome::Complete(result))
    }
}
