#![allow(dead_code)]

use async_trait::async_trait;
use paper_analyzer::config::AnalyzerConfig;
use paper_analyzer::error::{Error, Result};
use paper_analyzer::processing::{JobScheduler, JobStatus, PipelineRunner};
use paper_analyzer::providers::Summarizer;
use paper_analyzer::storage::ResultCache;
use paper_analyzer::types::{Chunk, ChunkSummary, GlobalAnalysis, SectionSummary};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use uuid::Uuid;

/// Three pages, one section per page
pub const PAPER: &str = "Abstract\nWe propose a method for ranking papers.\u{000C}Introduction\nPrior work is limited in scope.\u{000C}Conclusion\nThe method works well.";

pub const PAPER_NAME: &str = "paper.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// `{summary: "S"}` for every chunk and a fixed global object
    Constant,
    /// Every call fails with an upstream rate-limit signal
    AlwaysQuota,
    /// Chunks succeed, global synthesis stays rate limited
    QuotaOnSynthesis,
}

/// Summarizer double with call counters and an optional gate
pub struct ScriptedSummarizer {
    behavior: Behavior,
    gate: Option<Arc<Semaphore>>,
    pub chunk_calls: AtomicUsize,
    pub synth_calls: AtomicUsize,
}

impl ScriptedSummarizer {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            gate: None,
            chunk_calls: AtomicUsize::new(0),
            synth_calls: AtomicUsize::new(0),
        })
    }

    /// Chunk calls block until the returned semaphore gets permits
    pub fn gated(behavior: Behavior) -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let summarizer = Arc::new(Self {
            behavior,
            gate: Some(gate.clone()),
            chunk_calls: AtomicUsize::new(0),
            synth_calls: AtomicUsize::new(0),
        });
        (summarizer, gate)
    }

    pub fn chunk_calls(&self) -> usize {
        self.chunk_calls.load(Ordering::SeqCst)
    }

    pub fn synth_calls(&self) -> usize {
        self.synth_calls.load(Ordering::SeqCst)
    }

    fn quota_error() -> Error {
        Error::summarizer("Gemini generation failed (429 Too Many Requests): RESOURCE_EXHAUSTED")
    }
}

pub fn fixed_global() -> GlobalAnalysis {
    GlobalAnalysis {
        inferred_title: "Ranking Papers".to_string(),
        global_summary: "G".to_string(),
        ..Default::default()
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn summarize_chunk(&self, _chunk: &Chunk) -> Result<ChunkSummary> {
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        self.chunk_calls.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            Behavior::Constant | Behavior::QuotaOnSynthesis => Ok(ChunkSummary {
                summary: "S".to_string(),
                key_points: Vec::new(),
                key_terms: Vec::new(),
            }),
            Behavior::AlwaysQuota => Err(Self::quota_error()),
        }
    }

    async fn synthesize(&self, _sections: &[SectionSummary]) -> Result<GlobalAnalysis> {
        self.synth_calls.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            Behavior::Constant => Ok(fixed_global()),
            Behavior::AlwaysQuota | Behavior::QuotaOnSynthesis => Err(Self::quota_error()),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }
}

/// Default config with millisecond backoff
pub fn fast_config() -> AnalyzerConfig {
    let mut config = AnalyzerConfig::default();
    config.retry.base_delay_ms = 1;
    config
}

pub fn scheduler(summarizer: Arc<dyn Summarizer>) -> Arc<JobScheduler> {
    scheduler_with(summarizer, |pipeline| pipeline)
}

/// Scheduler whose pipeline is adjusted before the worker starts
pub fn scheduler_with(
    summarizer: Arc<dyn Summarizer>,
    customize: impl FnOnce(PipelineRunner) -> PipelineRunner,
) -> Arc<JobScheduler> {
    let config = fast_config();
    let cache = Arc::new(ResultCache::new(config.cache.max_entries));
    let pipeline = Arc::new(customize(PipelineRunner::new(&config, summarizer, cache)));
    JobScheduler::start(pipeline, config.processing.max_concurrent_jobs)
}

/// Poll until the job reaches a terminal state
pub async fn wait_for_terminal(scheduler: &JobScheduler, job_id: Uuid) -> JobStatus {
    for _ in 0..400 {
        let status = scheduler
            .get_status(job_id)
            .expect("job should exist")
            .status;
        if status.is_terminal() {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("job {job_id} did not reach a terminal state");
}
