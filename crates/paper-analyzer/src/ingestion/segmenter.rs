//! Heuristic section detection for research papers

use regex::Regex;

use crate::types::{join_pages, PageRecord, Section};

/// Splits page records into ordered sections
pub trait Segmenter: Send + Sync {
    fn segment(&self, pages: &[PageRecord]) -> Vec<Section>;
}

/// Detects section headings from line-level text heuristics:
/// well-known research paper headings, numbered headings, and short all-caps lines
pub struct SectionDetector {
    known_heading: Regex,
    numbered_heading: Regex,
}

impl SectionDetector {
    pub fn new() -> Self {
        let known_heading = Regex::new(
            r"^(?:\d+\.?\s*)?(?:abstract|introduction|background|related\s*work|literature\s*review|methodology|methods?|approach|proposed\s*(?:method|approach|system)|experiment(?:s|al)?(?:\s*(?:setup|results?))?|results?(?:\s*and\s*discussion)?|discussion|analysis|evaluation|conclusion(?:s)?|future\s*work|acknowledg(?:e)?ments?|references|bibliography|appendix)",
        )
        .expect("valid known heading pattern");
        let numbered_heading =
            Regex::new(r"^\d+\.?\s+[A-Z]").expect("valid numbered heading pattern");

        Self {
            known_heading,
            numbered_heading,
        }
    }

    fn is_heading(&self, line: &str) -> bool {
        if line.is_empty() {
            return false;
        }
        if self.known_heading.is_match(&line.to_lowercase()) {
            return true;
        }

        let len = line.chars().count();
        if len < 80 && self.numbered_heading.is_match(line) {
            return true;
        }

        len > 3 && len < 60 && is_all_caps(line)
    }
}

impl Default for SectionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter for SectionDetector {
    fn segment(&self, pages: &[PageRecord]) -> Vec<Section> {
        let full_text = join_pages(pages);

        // Character offset at which each page starts in the joined text
        let mut page_offsets = Vec::with_capacity(pages.len());
        let mut offset = 0usize;
        for page in pages.iter().filter(|p| !p.text.is_empty()) {
            page_offsets.push((page.page_number, offset));
            offset += page.text.chars().count() + 2;
        }
        let page_for_offset = |char_offset: usize| -> u32 {
            page_offsets
                .iter()
                .rev()
                .find(|(_, start)| char_offset >= *start)
                .map(|(page, _)| *page)
                .unwrap_or(1)
        };

        let mut sections = Vec::new();
        let mut current = Section {
            name: "Preamble".to_string(),
            content: String::new(),
            page_start: 1,
        };

        let mut char_offset = 0usize;
        for line in full_text.split('\n') {
            let stripped = line.trim();

            if self.is_heading(stripped) {
                let next = Section {
                    name: stripped.to_string(),
                    content: String::new(),
                    page_start: page_for_offset(char_offset),
                };
                let finished = std::mem::replace(&mut current, next);
                if !finished.content.trim().is_empty() {
                    sections.push(finished);
                }
            } else {
                current.content.push_str(line);
                current.content.push('\n');
            }

            char_offset += line.chars().count() + 1;
        }

        if !current.content.trim().is_empty() {
            sections.push(current);
        }

        if sections.len() <= 1 {
            return vec![Section {
                name: "Full Document".to_string(),
                content: full_text,
                page_start: 1,
            }];
        }

        sections
    }
}

/// True when the line has cased letters and none of them are lowercase
fn is_all_caps(line: &str) -> bool {
    line.chars().any(char::is_uppercase) && !line.chars().any(char::is_lowercase)
}
