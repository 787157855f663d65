//! Job scheduler: the service object that owns the registry and cache
//!
//! Requests either run the pipeline inline or register a job and hand its
//! work to the background worker through an unbounded channel.

use futures::future::BoxFuture;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::storage::{CacheStats, ResultCache};
use crate::types::{AnalysisResult, ExtractionReport};

use super::job_registry::{JobOutcome, JobRegistry, JobStatusView, RegistryStats};
use super::pipeline::{PipelineRunner, RunOutcome};
use super::worker::JobWorker;

/// Work handed to the background worker
pub struct QueuedJob {
    pub id: Uuid,
    pub work: BoxFuture<'static, JobOutcome>,
}

/// Queue and cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStats {
    pub jobs: RegistryStats,
    pub cache: CacheStats,
    pub max_concurrent_jobs: Option<usize>,
}

/// Entry point for synchronous and background analysis
pub struct JobScheduler {
    registry: Arc<JobRegistry>,
    pipeline: Arc<PipelineRunner>,
    sender: mpsc::UnboundedSender<QueuedJob>,
    max_concurrent_jobs: Option<usize>,
}

impl JobScheduler {
    /// Create a scheduler and the receiving end its worker drains
    pub fn new(
        pipeline: Arc<PipelineRunner>,
        max_concurrent_jobs: Option<usize>,
    ) -> (Self, mpsc::UnboundedReceiver<QueuedJob>) {
        let (sender, receiver) = mpsc::unbounded_channel();

        let scheduler = Self {
            registry: Arc::new(JobRegistry::new()),
            pipeline,
            sender,
            max_concurrent_jobs: max_concurrent_jobs.map(|n| n.max(1)),
        };

        (scheduler, receiver)
    }

    /// Create a scheduler and spawn its worker on the current runtime
    pub fn start(pipeline: Arc<PipelineRunner>, max_concurrent_jobs: Option<usize>) -> Arc<Self> {
        let (scheduler, receiver) = Self::new(pipeline, max_concurrent_jobs);
        let worker = scheduler.worker();

        tokio::spawn(async move {
            worker.run(receiver).await;
        });

        Arc::new(scheduler)
    }

    /// Build the worker that executes this scheduler's jobs
    pub fn worker(&self) -> JobWorker {
        JobWorker::new(self.registry.clone(), self.max_concurrent_jobs)
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        self.pipeline.cache()
    }

    pub fn pipeline(&self) -> &Arc<PipelineRunner> {
        &self.pipeline
    }

    /// Register a job in `queued`
    pub fn create_job(&self, filename: &str) -> Uuid {
        let job_id = self.registry.create(filename);
        tracing::info!("Created job {} for '{}'", job_id, filename);
        job_id
    }

    /// Hand `work` to the background worker; returns without waiting for it
    pub fn submit<F>(&self, job_id: Uuid, work: F) -> Result<()>
    where
        F: Future<Output = JobOutcome> + Send + 'static,
    {
        let job = QueuedJob {
            id: job_id,
            work: Box::pin(work),
        };

        if self.sender.send(job).is_err() {
            tracing::error!("Job worker is not running; failing job {}", job_id);
            // Walk the job to a terminal state so pollers are not left waiting
            self.registry.mark_running(job_id)?;
            self.registry
                .finish(job_id, JobOutcome::Failed("Job worker is not running".to_string()))?;
            return Err(Error::internal("Job worker is not running"));
        }

        Ok(())
    }

    /// Register and enqueue a full analysis of `data`
    pub fn submit_job(&self, data: Vec<u8>, filename: &str) -> Result<Uuid> {
        let job_id = self.create_job(filename);
        let pipeline = self.pipeline.clone();
        let filename = filename.to_string();

        self.submit(job_id, async move {
            match pipeline.run(&data, &filename).await {
                Ok(RunOutcome::Complete(result)) => JobOutcome::Completed(result),
                Ok(RunOutcome::QuotaLimited { fallback, message }) => JobOutcome::Partial {
                    result: fallback,
                    message,
                },
                Err(e) => JobOutcome::Failed(e.to_string()),
            }
        })?;

        Ok(job_id)
    }

    pub fn get_status(&self, job_id: Uuid) -> Result<JobStatusView> {
        self.registry.status(job_id)
    }

    pub fn get_result(&self, job_id: Uuid) -> Result<AnalysisResult> {
        self.registry.result(job_id)
    }

    pub fn list_jobs(&self) -> Vec<JobStatusView> {
        self.registry.list()
    }

    /// Run the pipeline inline.
    ///
    /// Quota exhaustion surfaces as [`Error::RateLimited`] carrying the
    /// structure-only fallback result.
    pub async fn analyze_synchronously(&self, data: &[u8], filename: &str) -> Result<AnalysisResult> {
        match self.pipeline.run(data, filename).await? {
            RunOutcome::Complete(result) => Ok(result),
            RunOutcome::QuotaLimited { fallback, message } => Err(Error::RateLimited {
                message,
                fallback: Box::new(fallback),
            }),
        }
    }

    /// Extraction preview without summarization
    pub async fn inspect(&self, data: &[u8], filename: &str) -> Result<ExtractionReport> {
        self.pipeline.inspect(data, filename).await
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            jobs: self.registry.stats(),
            cache: self.cache().stats(),
            max_concurrent_jobs: self.max_concurrent_jobs,
        }
    }
}
