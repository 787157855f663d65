mod common;

use common::{
    scheduler, scheduler_with, wait_for_terminal, Behavior, ScriptedSummarizer, PAPER, PAPER_NAME,
};
use paper_analyzer::error::{Error, Result};
use paper_analyzer::ingestion::DocumentParser;
use paper_analyzer::processing::JobStatus;
use paper_analyzer::storage::Fingerprint;
use paper_analyzer::types::{AnalysisMode, PageRecord};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[tokio::test]
async fn three_section_paper_is_summarized_in_order_then_cached() {
    let summarizer = ScriptedSummarizer::new(Behavior::Constant);
    let scheduler = scheduler(summarizer.clone());

    let first = scheduler
        .analyze_synchronously(PAPER.as_bytes(), PAPER_NAME)
        .await
        .expect("first analysis");

    assert!(!first.cached);
    assert_eq!(first.filename, PAPER_NAME);
    assert_eq!(first.total_pages, 3);
    let names: Vec<_> = first
        .analysis
        .sections
        .iter()
        .map(|s| s.section_name.as_str())
        .collect();
    assert_eq!(names, vec!["Abstract", "Introduction", "Conclusion"]);
    let starts: Vec<_> = first.analysis.sections.iter().map(|s| s.page_start).collect();
    assert_eq!(starts, vec![1, 2, 3]);
    assert!(first.analysis.sections.iter().all(|s| s.summary == "S"));
    assert_eq!(first.analysis.stats.total_chunks_processed, 3);
    assert_eq!(first.analysis.stats.total_sections, 3);
    assert_eq!(first.analysis.stats.mode, AnalysisMode::Full);
    assert_eq!(first.analysis.global, common::fixed_global());

    let second = scheduler
        .analyze_synchronously(PAPER.as_bytes(), PAPER_NAME)
        .await
        .expect("second analysis");

    assert!(second.cached);
    let mut uncached = second.clone();
    uncached.cached = false;
    assert_eq!(uncached, first);

    // No further summarization work for the duplicate
    assert_eq!(summarizer.chunk_calls(), 3);
    assert_eq!(summarizer.synth_calls(), 1);
    assert_eq!(scheduler.cache().len(), 1);
}

#[tokio::test]
async fn cache_hit_reports_current_filename() {
    let summarizer = ScriptedSummarizer::new(Behavior::Constant);
    let scheduler = scheduler(summarizer.clone());

    scheduler
        .analyze_synchronously(PAPER.as_bytes(), "original.txt")
        .await
        .expect("first analysis");
    let renamed = scheduler
        .analyze_synchronously(PAPER.as_bytes(), "renamed.txt")
        .await
        .expect("second analysis");

    assert!(renamed.cached);
    assert_eq!(renamed.filename, "renamed.txt");
}

#[tokio::test]
async fn background_jobs_share_the_cache() {
    let summarizer = ScriptedSummarizer::new(Behavior::Constant);
    let scheduler = scheduler(summarizer.clone());

    let first = scheduler
        .submit_job(PAPER.as_bytes().to_vec(), PAPER_NAME)
        .expect("submit first");
    assert_eq!(wait_for_terminal(&scheduler, first).await, JobStatus::Completed);

    let second = scheduler
        .submit_job(PAPER.as_bytes().to_vec(), PAPER_NAME)
        .expect("submit second");
    assert_eq!(wait_for_terminal(&scheduler, second).await, JobStatus::Completed);

    let first_result = scheduler.get_result(first).expect("first result");
    let second_result = scheduler.get_result(second).expect("second result");
    assert!(!first_result.cached);
    assert!(second_result.cached);
    assert_eq!(first_result.analysis, second_result.analysis);
    assert_eq!(summarizer.chunk_calls(), 3);

    // The synchronous path reads the same cache
    let sync = scheduler
        .analyze_synchronously(PAPER.as_bytes(), PAPER_NAME)
        .await
        .expect("sync analysis");
    assert!(sync.cached);
    assert_eq!(summarizer.chunk_calls(), 3);
}

#[tokio::test]
async fn quota_exhaustion_yields_partial_job_with_fallback() {
    let summarizer = ScriptedSummarizer::new(Behavior::AlwaysQuota);
    let scheduler = scheduler(summarizer.clone());

    let job_id = scheduler
        .submit_job(PAPER.as_bytes().to_vec(), PAPER_NAME)
        .expect("submit");
    assert_eq!(wait_for_terminal(&scheduler, job_id).await, JobStatus::Partial);

    let result = scheduler.get_result(job_id).expect("partial result");
    assert_eq!(result.analysis.stats.mode, AnalysisMode::FallbackQuotaLimited);
    assert_eq!(result.analysis.stats.total_chunks_processed, 0);
    let names: Vec<_> = result
        .analysis
        .sections
        .iter()
        .map(|s| s.section_name.as_str())
        .collect();
    assert_eq!(names, vec!["Abstract", "Introduction", "Conclusion"]);
    assert!(result.analysis.sections.iter().all(|s| s.key_points.is_empty()));

    let status = scheduler.get_status(job_id).expect("status");
    assert!(status.error.expect("quota message").contains("Rate limit exceeded"));

    // First chunk exhausts the retry budget, synthesis is never attempted
    assert_eq!(summarizer.chunk_calls(), 3);
    assert_eq!(summarizer.synth_calls(), 0);
    assert!(scheduler.cache().is_empty());

    let json = serde_json::to_value(&result).expect("serialize");
    assert_eq!(json["analysis"]["stats"]["mode"], "fallback_quota_limited");
}

#[tokio::test]
async fn synchronous_quota_exhaustion_carries_fallback() {
    let summarizer = ScriptedSummarizer::new(Behavior::AlwaysQuota);
    let scheduler = scheduler(summarizer);

    match scheduler
        .analyze_synchronously(PAPER.as_bytes(), PAPER_NAME)
        .await
    {
        Err(Error::RateLimited { message, fallback }) => {
            assert!(message.contains("429"));
            assert!(fallback.analysis.is_fallback());
            assert_eq!(fallback.analysis.sections.len(), 3);
            assert!(!fallback.cached);
        }
        other => panic!("expected rate limited error, got {other:?}"),
    }
    assert!(scheduler.cache().is_empty());
}

#[tokio::test]
async fn quota_during_synthesis_falls_back_without_caching() {
    let summarizer = ScriptedSummarizer::new(Behavior::QuotaOnSynthesis);
    let scheduler = scheduler(summarizer.clone());

    match scheduler
        .analyze_synchronously(PAPER.as_bytes(), PAPER_NAME)
        .await
    {
        Err(Error::RateLimited { message, fallback }) => {
            assert!(message.contains("RESOURCE_EXHAUSTED"));
            assert_eq!(fallback.analysis.stats.mode, AnalysisMode::FallbackQuotaLimited);
            let names: Vec<_> = fallback
                .analysis
                .sections
                .iter()
                .map(|s| s.section_name.as_str())
                .collect();
            assert_eq!(names, vec!["Abstract", "Introduction", "Conclusion"]);
        }
        other => panic!("expected rate limited error, got {other:?}"),
    }
    assert_eq!(summarizer.chunk_calls(), 3);
    assert_eq!(summarizer.synth_calls(), 3);
    assert!(scheduler.cache().is_empty());

    let job_id = scheduler
        .submit_job(PAPER.as_bytes().to_vec(), PAPER_NAME)
        .expect("submit");
    assert_eq!(wait_for_terminal(&scheduler, job_id).await, JobStatus::Partial);
    let result = scheduler.get_result(job_id).expect("partial result");
    assert!(result.analysis.is_fallback());
    assert_eq!(result.analysis.sections.len(), 3);
    assert!(scheduler.cache().is_empty());
}

struct CorruptPdfParser;

impl DocumentParser for CorruptPdfParser {
    fn parse(&self, filename: &str, _data: &[u8]) -> Result<Vec<PageRecord>> {
        Err(Error::file_parse(filename, "trailer not found"))
    }

    fn supports(&self, filename: &str) -> bool {
        filename.ends_with(".pdf")
    }
}

#[tokio::test]
async fn injected_parser_failure_fails_the_job_with_its_message() {
    let summarizer = ScriptedSummarizer::new(Behavior::Constant);
    let scheduler = scheduler_with(summarizer.clone(), |pipeline| {
        pipeline.with_parser(Arc::new(CorruptPdfParser))
    });

    let job_id = scheduler
        .submit_job(b"%PDF-1.7".to_vec(), "scan.pdf")
        .expect("submit");
    assert_eq!(wait_for_terminal(&scheduler, job_id).await, JobStatus::Failed);

    let status = scheduler.get_status(job_id).expect("status");
    assert!(status.error.expect("stored error").contains("trailer not found"));
    match scheduler.get_result(job_id) {
        Err(Error::JobFailed { message, .. }) => assert!(message.contains("trailer not found")),
        other => panic!("expected failed job, got {other:?}"),
    }
    assert_eq!(summarizer.chunk_calls(), 0);
}

#[tokio::test]
async fn whitespace_document_is_rejected_without_caching() {
    let summarizer = ScriptedSummarizer::new(Behavior::Constant);
    let scheduler = scheduler(summarizer.clone());
    let blank = " \n\t\u{000C}   \n".as_bytes();

    let err = scheduler
        .analyze_synchronously(blank, "blank.txt")
        .await
        .expect_err("blank document must fail");
    assert!(matches!(err, Error::EmptyContent(_)));
    assert!(scheduler.cache().is_empty());
    assert!(!scheduler.cache().contains(&Fingerprint::of(blank)));

    let job_id = scheduler
        .submit_job(blank.to_vec(), "blank.txt")
        .expect("submit");
    assert_eq!(wait_for_terminal(&scheduler, job_id).await, JobStatus::Failed);
    match scheduler.get_result(job_id) {
        Err(Error::JobFailed { message, .. }) => {
            assert!(message.contains("no extractable text"));
        }
        other => panic!("expected failed job, got {other:?}"),
    }
    assert_eq!(summarizer.chunk_calls(), 0);
}

#[tokio::test]
async fn parse_failure_fails_the_job() {
    let summarizer = ScriptedSummarizer::new(Behavior::Constant);
    let scheduler = scheduler(summarizer);
    let garbage = vec![0xff, 0xfe, 0x00, 0x81];

    let err = scheduler
        .analyze_synchronously(&garbage, "broken.txt")
        .await
        .expect_err("invalid UTF-8 must fail");
    assert!(matches!(err, Error::FileParse { .. }));

    let job_id = scheduler.submit_job(garbage, "broken.txt").expect("submit");
    assert_eq!(wait_for_terminal(&scheduler, job_id).await, JobStatus::Failed);
}

#[tokio::test]
async fn observed_statuses_follow_the_lifecycle() {
    let (summarizer, gate) = ScriptedSummarizer::gated(Behavior::Constant);
    let scheduler = scheduler(summarizer);

    let job_id = scheduler
        .submit_job(PAPER.as_bytes().to_vec(), PAPER_NAME)
        .expect("submit");

    // Nothing has yielded to the worker yet
    let mut observed = vec![scheduler.get_status(job_id).expect("status").status];
    assert_eq!(observed[0], JobStatus::Queued);
    assert!(matches!(
        scheduler.get_result(job_id),
        Err(Error::StillProcessing { status: JobStatus::Queued, .. })
    ));

    // The gate holds the job in `running`
    for _ in 0..200 {
        if scheduler.get_status(job_id).expect("status").status == JobStatus::Running {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let running = scheduler.get_status(job_id).expect("status");
    assert_eq!(running.status, JobStatus::Running);
    assert!(running.started_at.is_some());
    assert!(running.completed_at.is_none());
    assert!(matches!(
        scheduler.get_result(job_id),
        Err(Error::StillProcessing { status: JobStatus::Running, .. })
    ));

    gate.add_permits(16);
    loop {
        let status = scheduler.get_status(job_id).expect("status").status;
        if observed.last() != Some(&status) {
            observed.push(status);
        }
        if status.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let allowed = [JobStatus::Queued, JobStatus::Running, JobStatus::Completed];
    assert!(observed.len() <= allowed.len());
    assert_eq!(observed[..], allowed[..observed.len()]);

    // Terminal state holds
    tokio::time::sleep(Duration::from_millis(20)).await;
    let done = scheduler.get_status(job_id).expect("status");
    assert_eq!(done.status, JobStatus::Completed);
    assert!(done.completed_at.is_some());
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let scheduler = scheduler(ScriptedSummarizer::new(Behavior::Constant));
    let missing = Uuid::new_v4();

    assert!(matches!(scheduler.get_status(missing), Err(Error::JobNotFound(id)) if id == missing));
    assert!(matches!(scheduler.get_result(missing), Err(Error::JobNotFound(_))));
}

#[tokio::test]
async fn concurrent_identical_uploads_leave_one_cache_entry() {
    let summarizer = ScriptedSummarizer::new(Behavior::Constant);
    let scheduler = scheduler(summarizer);

    let jobs: Vec<_> = (0..4)
        .map(|i| {
            scheduler
                .submit_job(PAPER.as_bytes().to_vec(), &format!("copy-{i}.txt"))
                .expect("submit")
        })
        .collect();

    for job_id in &jobs {
        assert_eq!(wait_for_terminal(&scheduler, *job_id).await, JobStatus::Completed);
    }

    assert_eq!(scheduler.cache().len(), 1);
    let stats = scheduler.stats();
    assert_eq!(stats.jobs.total, 4);
    assert_eq!(stats.jobs.completed, 4);
    assert_eq!(scheduler.list_jobs().len(), 4);
}

#[test]
fn fingerprints_are_deterministic_and_distinct() {
    let a = Fingerprint::of(PAPER.as_bytes());
    let b = Fingerprint::of(PAPER.as_bytes());
    let c = Fingerprint::of(b"a different paper");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.to_string(), a.as_str());
}
