//! Analysis result types returned to callers

use serde::{Deserialize, Serialize};

use super::document::Chunk;

/// Structured summary returned by the summarizer for a single chunk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkSummary {
    pub summary: String,
    pub key_points: Vec<String>,
    pub key_terms: Vec<String>,
}

/// Per-section summary in the final analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub section_name: String,
    pub page_start: u32,
    pub summary: String,
    pub key_points: Vec<String>,
    pub key_terms: Vec<String>,
}

impl SectionSummary {
    /// Attach a summarizer response to the chunk it was produced for
    pub fn from_chunk(chunk: &Chunk, summary: ChunkSummary) -> Self {
        Self {
            section_name: chunk.name.clone(),
            page_start: chunk.page_start,
            summary: summary.summary,
            key_points: summary.key_points,
            key_terms: summary.key_terms,
        }
    }

    /// Degraded summary for a chunk whose summarization failed
    pub fn failed(chunk: &Chunk, error: &str) -> Self {
        Self {
            section_name: chunk.name.clone(),
            page_start: chunk.page_start,
            summary: format!("Error summarizing: {}", error),
            key_points: Vec::new(),
            key_terms: Vec::new(),
        }
    }
}

/// Paper-level analysis synthesized from all section summaries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalAnalysis {
    pub inferred_title: String,
    pub global_summary: String,
    pub problem_statement: String,
    pub methodology: String,
    pub key_contributions: Vec<String>,
    pub limitations: Vec<String>,
    pub future_work: Vec<String>,
    pub all_key_terms: Vec<String>,
}

impl GlobalAnalysis {
    /// Stand-in used when synthesis fails for a reason other than quota
    pub fn placeholder(error: &str) -> Self {
        Self {
            inferred_title: "Unknown".to_string(),
            global_summary: format!("Error generating global summary: {}", error),
            ..Default::default()
        }
    }
}

/// How the analysis was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Every chunk went through the summarizer
    Full,
    /// Structure-only result built after the summarizer stayed rate limited
    FallbackQuotaLimited,
}

/// Counters describing the analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub total_sections: usize,
    pub total_chunks_processed: usize,
    pub mode: AnalysisMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Global analysis plus per-section summaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub global: GlobalAnalysis,
    pub sections: Vec<SectionSummary>,
    pub stats: AnalysisStats,
}

impl Analysis {
    pub fn is_fallback(&self) -> bool {
        self.stats.mode == AnalysisMode::FallbackQuotaLimited
    }
}

/// Result payload for one analyzed document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub filename: String,
    pub total_pages: usize,
    pub total_tokens: usize,
    pub analysis: Analysis,
    /// True when served from the content-addressed cache
    pub cached: bool,
}

/// Section as reported by the extraction preview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedSection {
    pub name: String,
    pub page_start: u32,
    pub content_length: usize,
}

/// Raw extraction results, without summarization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub filename: String,
    pub total_pages: usize,
    pub total_characters: usize,
    pub total_tokens: usize,
    pub detected_sections: Vec<DetectedSection>,
}
