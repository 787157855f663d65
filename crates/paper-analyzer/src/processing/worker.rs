//! Background worker that drives queued jobs to a terminal state

use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

use super::job_registry::{JobOutcome, JobRegistry, JobStatus};
use super::scheduler::QueuedJob;

/// Drains the scheduler channel, running each job on its own task
pub struct JobWorker {
    registry: Arc<JobRegistry>,
    /// Caps running jobs when set; jobs waiting for a permit stay queued
    semaphore: Option<Arc<Semaphore>>,
}

impl JobWorker {
    pub fn new(registry: Arc<JobRegistry>, max_concurrent_jobs: Option<usize>) -> Self {
        Self {
            registry,
            semaphore: max_concurrent_jobs.map(|n| Arc::new(Semaphore::new(n.max(1)))),
        }
    }

    /// Process jobs until every sender is dropped
    pub async fn run(self, mut receiver: mpsc::UnboundedReceiver<QueuedJob>) {
        match &self.semaphore {
            Some(sem) => tracing::info!(
                "Job worker started: up to {} concurrent jobs",
                sem.available_permits()
            ),
            None => tracing::info!("Job worker started: no concurrency limit"),
        }

        while let Some(job) = receiver.recv().await {
            let registry = self.registry.clone();
            let semaphore = self.semaphore.clone();

            tokio::spawn(async move {
                let _permit = match semaphore {
                    Some(sem) => match sem.acquire_owned().await {
                        Ok(permit) => Some(permit),
                        Err(e) => {
                            tracing::error!("Job {} could not acquire a slot: {}", job.id, e);
                            return;
                        }
                    },
                    None => None,
                };

                Self::execute(&registry, job).await;
            });
        }

        tracing::info!("Job worker stopped");
    }

    async fn execute(registry: &JobRegistry, job: QueuedJob) {
        let job_id = job.id;

        if let Err(e) = registry.mark_running(job_id) {
            tracing::error!("Cannot start job {}: {}", job_id, e);
            return;
        }
        tracing::info!("Job {} running", job_id);

        // Separate task so a panic in the work is reported instead of lost
        let outcome = match tokio::spawn(job.work).await {
            Ok(outcome) => outcome,
            Err(e) => JobOutcome::Failed(format!("Job aborted unexpectedly: {}", e)),
        };

        let error = match &outcome {
            JobOutcome::Completed(_) => None,
            JobOutcome::Partial { message, .. } | JobOutcome::Failed(message) => {
                Some(message.clone())
            }
        };

        match registry.finish(job_id, outcome) {
            Ok(JobStatus::Completed) => tracing::info!("Job {} completed", job_id),
            Ok(JobStatus::Partial) => tracing::warn!(
                "Job {} finished with a fallback analysis: {}",
                job_id,
                error.unwrap_or_default()
            ),
            Ok(status) => tracing::error!(
                "Job {} {}: {}",
                job_id,
                status,
                error.unwrap_or_default()
            ),
            Err(e) => tracing::error!("Cannot finish job {}: {}", job_id, e),
        }
    }
}
