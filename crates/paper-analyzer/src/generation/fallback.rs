//! Structure-only analysis used when the summarizer stays rate limited

use crate::types::{Analysis, AnalysisMode, AnalysisStats, GlobalAnalysis, Section, SectionSummary};

/// Build a degraded analysis from section names and page starts alone
pub fn build_fallback_analysis(sections: &[Section], reason: &str) -> Analysis {
    let section_summaries = sections
        .iter()
        .map(|section| SectionSummary {
            section_name: section.name.clone(),
            page_start: section.page_start,
            summary: format!(
                "Summary unavailable (rate limited). Section starts on page {}.",
                section.page_start
            ),
            key_points: Vec::new(),
            key_terms: Vec::new(),
        })
        .collect();

    let outline = sections
        .iter()
        .map(|s| format!("{} (p. {})", s.name, s.page_start))
        .collect::<Vec<_>>()
        .join(", ");

    let global = GlobalAnalysis {
        inferred_title: "Unknown".to_string(),
        global_summary: format!(
            "Summarization is temporarily unavailable because the upstream rate limit was \
             exceeded. Detected structure: {}. Please retry in a few minutes.",
            outline
        ),
        ..Default::default()
    };

    Analysis {
        global,
        sections: section_summaries,
        stats: AnalysisStats {
            total_sections: sections.len(),
            total_chunks_processed: 0,
            mode: AnalysisMode::FallbackQuotaLimited,
            error: Some(reason.to_string()),
        },
    }
}
