//! Analysis orchestration: retrying summarization, the document pipeline,
//! the job registry and the background scheduler

mod job_registry;
mod pipeline;
mod retry;
mod scheduler;
mod worker;

pub use job_registry::{
    JobOutcome, JobRecord, JobRegistry, JobStatus, JobStatusView, RegistryStats,
};
pub use pipeline::{ExtractedDocument, PipelineRunner, RunOutcome};
pub use retry::{QuotaClassifier, RetryingInvoker};
pub use scheduler::{JobScheduler, QueuedJob, SchedulerStats};
pub use worker::JobWorker;
