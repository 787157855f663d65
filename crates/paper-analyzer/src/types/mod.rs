//! Core types for the analyzer

pub mod analysis;
pub mod document;

pub use analysis::{
    Analysis, AnalysisMode, AnalysisResult, AnalysisStats, ChunkSummary, DetectedSection,
    ExtractionReport, GlobalAnalysis, SectionSummary,
};
pub use document::{estimate_tokens, join_pages, Chunk, FileType, PageRecord, Section, Table};
