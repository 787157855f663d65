//! paper-analyzer: research paper analysis with deduplicated background jobs
//!
//! Documents are parsed into pages, split into sections and chunks, and
//! summarized through a rate-limit aware invoker. Results are cached by
//! content fingerprint, and analyses can run inline or as background jobs
//! tracked through an explicit lifecycle. When the summarizer stays rate
//! limited, a structure-only fallback analysis is returned instead of an error.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod processing;
pub mod providers;
pub mod server;
pub mod storage;
pub mod types;

pub use config::AnalyzerConfig;
pub use error::{Error, Result};
pub use processing::{
    JobOutcome, JobRegistry, JobScheduler, JobStatus, JobStatusView, PipelineRunner,
    RetryingInvoker, RunOutcome,
};
pub use providers::Summarizer;
pub use storage::{Fingerprint, ResultCache};
pub use types::{AnalysisResult, Chunk, FileType, PageRecord, Section};
