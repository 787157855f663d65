//! Prompt templates for section summaries and global synthesis

use crate::types::{Chunk, SectionSummary};

/// Prompt builder for summarization requests
pub struct PromptBuilder;

impl PromptBuilder {
    /// Prompt asking for a JSON summary of one chunk
    pub fn section_summary(chunk: &Chunk) -> String {
        format!(
            r#"You are a research paper analysis assistant.

Summarize the following section from a research paper.

Section: {name}

Text:
{content}

Provide:
1. A 2-3 sentence summary
2. 3-5 key points as bullet points
3. Any important terms or concepts mentioned

Respond in this exact JSON format:
{{
  "summary": "...",
  "key_points": ["point1", "point2", ...],
  "key_terms": ["term1", "term2", ...]
}}"#,
            name = chunk.name,
            content = chunk.content,
        )
    }

    /// Prompt asking for a paper-level analysis built from section summaries
    pub fn global_synthesis(sections: &[SectionSummary]) -> String {
        let combined = sections
            .iter()
            .map(|s| format!("**{}**: {}", s.section_name, s.summary))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"You are a research paper analysis assistant.

Below are summaries of each section of a research paper:

{combined}

Based on these section summaries, provide a comprehensive analysis:

1. Paper title (infer from content)
2. A 5-line overall summary of the entire paper
3. Problem statement (what problem does this paper solve?)
4. Methodology overview (how do they solve it?)
5. Key results and contributions (3-5 bullet points)
6. Limitations mentioned or implied
7. 3 possible future research directions / open gaps
8. A list of all key terms across the paper

Respond in this exact JSON format:
{{
  "inferred_title": "...",
  "global_summary": "...",
  "problem_statement": "...",
  "methodology": "...",
  "key_contributions": ["...", "..."],
  "limitations": ["...", "..."],
  "future_work": ["...", "..."],
  "all_key_terms": ["...", "..."]
}}"#,
            combined = combined,
        )
    }
}
