//! Job registry with an explicit lifecycle state machine
//!
//! `queued -> running -> {completed | partial | failed}`. Terminal states are
//! final; any other transition is rejected.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::AnalysisResult;

/// Job lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    /// Full analysis, freshly computed or served from cache
    Completed,
    /// Structure-only fallback analysis after quota exhaustion
    Partial,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Partial | Self::Failed)
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match self {
            Self::Queued => next == Self::Running,
            Self::Running => next.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a job's work ended
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Completed(AnalysisResult),
    /// Fallback result plus the quota message that forced it
    Partial {
        result: AnalysisResult,
        message: String,
    },
    Failed(String),
}

impl JobOutcome {
    pub fn status(&self) -> JobStatus {
        match self {
            Self::Completed(_) => JobStatus::Completed,
            Self::Partial { .. } => JobStatus::Partial,
            Self::Failed(_) => JobStatus::Failed,
        }
    }
}

/// A tracked analysis job
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: Uuid,
    pub filename: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub result: Option<AnalysisResult>,
}

impl JobRecord {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            status: JobStatus::Queued,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            error: None,
            result: None,
        }
    }

    pub fn view(&self) -> JobStatusView {
        JobStatusView {
            job_id: self.id,
            filename: self.filename.clone(),
            status: self.status,
            created_at: self.created_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
            error: self.error.clone(),
        }
    }

    fn transition(&mut self, next: JobStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(Error::internal(format!(
                "Illegal job transition for {}: {} -> {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }
}

/// Caller-facing job status, without the result payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusView {
    pub job_id: Uuid,
    pub filename: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// Job counts by status
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistryStats {
    pub total: usize,
    pub queued: usize,
    pub running: usize,
    pub completed: usize,
    pub partial: usize,
    pub failed: usize,
}

/// Process-lifetime map of job id to job record
#[derive(Default)]
pub struct JobRegistry {
    jobs: DashMap<Uuid, JobRecord>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job in `queued` and return its id
    pub fn create(&self, filename: impl Into<String>) -> Uuid {
        let record = JobRecord::new(filename);
        let id = record.id;
        self.jobs.insert(id, record);
        id
    }

    /// `queued -> running`
    pub fn mark_running(&self, job_id: Uuid) -> Result<()> {
        let mut job = self.jobs.get_mut(&job_id).ok_or(Error::JobNotFound(job_id))?;
        job.transition(JobStatus::Running)?;
        job.started_at = Some(Utc::now());
        Ok(())
    }

    /// `running -> completed | partial | failed`
    pub fn finish(&self, job_id: Uuid, outcome: JobOutcome) -> Result<JobStatus> {
        let mut job = self.jobs.get_mut(&job_id).ok_or(Error::JobNotFound(job_id))?;
        job.transition(outcome.status())?;
        job.completed_at = Some(Utc::now());

        match outcome {
            JobOutcome::Completed(result) => {
                job.result = Some(result);
            }
            JobOutcome::Partial { result, message } => {
                job.result = Some(result);
                job.error = Some(message);
            }
            JobOutcome::Failed(message) => {
                job.error = Some(message);
            }
        }

        Ok(job.status)
    }

    pub fn status(&self, job_id: Uuid) -> Result<JobStatusView> {
        self.jobs
            .get(&job_id)
            .map(|job| job.view())
            .ok_or(Error::JobNotFound(job_id))
    }

    /// Stored result of a finished job
    pub fn result(&self, job_id: Uuid) -> Result<AnalysisResult> {
        let job = self.jobs.get(&job_id).ok_or(Error::JobNotFound(job_id))?;

        match job.status {
            JobStatus::Queued | JobStatus::Running => Err(Error::StillProcessing {
                job_id,
                status: job.status,
            }),
            JobStatus::Failed => Err(Error::JobFailed {
                job_id,
                message: job
                    .error
                    .clone()
                    .unwrap_or_else(|| "Unknown error".to_string()),
            }),
            JobStatus::Completed | JobStatus::Partial => job
                .result
                .clone()
                .ok_or_else(|| Error::internal(format!("Job {} finished without a result", job_id))),
        }
    }

    /// All jobs, newest first
    pub fn list(&self) -> Vec<JobStatusView> {
        let mut views: Vec<JobStatusView> = self.jobs.iter().map(|job| job.view()).collect();
        views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        views
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        let mut stats = RegistryStats::default();
        for job in self.jobs.iter() {
            stats.total += 1;
            match job.status {
                JobStatus::Queued => stats.queued += 1,
                JobStatus::Running => stats.running += 1,
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Partial => stats.partial += 1,
                JobStatus::Failed => stats.failed += 1,
            }
        }
        stats
    }
}
