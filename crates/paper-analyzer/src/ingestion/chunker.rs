//! Section-aware chunking that keeps each request within the summarizer's budget

use crate::types::{Chunk, Section};

/// Splits sections into summarizable chunks, preserving order and page attribution
pub trait Chunker: Send + Sync {
    fn chunk(&self, sections: &[Section]) -> Vec<Chunk>;
}

/// Packs paragraphs of oversized sections into sequentially numbered parts
#[derive(Debug, Clone)]
pub struct SectionChunker {
    /// Maximum characters per chunk
    max_chars: usize,
}

impl SectionChunker {
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars: max_chars.max(1),
        }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    fn split_section(&self, section: &Section, chunks: &mut Vec<Chunk>) {
        let part_name = |index: usize| format!("{} (Part {})", section.name, index);

        let mut current = String::new();
        let mut current_len = 0usize;
        let mut part = 1usize;

        for para in section.content.split("\n\n") {
            let para_len = para.chars().count();

            if current_len + para_len + 2 > self.max_chars {
                if !current.trim().is_empty() {
                    chunks.push(Chunk {
                        name: part_name(part),
                        content: current.trim().to_string(),
                        page_start: section.page_start,
                    });
                    part += 1;
                }
                current = para.to_string();
                current_len = para_len;
            } else {
                current.push_str("\n\n");
                current.push_str(para);
                current_len += para_len + 2;
            }
        }

        if !current.trim().is_empty() {
            // A section that never overflowed keeps its original name
            let name = if part > 1 {
                part_name(part)
            } else {
                section.name.clone()
            };
            chunks.push(Chunk {
                name,
                content: current.trim().to_string(),
                page_start: section.page_start,
            });
        }
    }
}

impl Default for SectionChunker {
    fn default() -> Self {
        Self::new(12_000)
    }
}

impl Chunker for SectionChunker {
    fn chunk(&self, sections: &[Section]) -> Vec<Chunk> {
        let mut chunks = Vec::with_capacity(sections.len());

        for section in sections {
            if section.content.chars().count() <= self.max_chars {
                chunks.push(Chunk {
                    name: section.name.clone(),
                    content: section.content.clone(),
                    page_start: section.page_start,
                });
            } else {
                self.split_section(section, &mut chunks);
            }
        }

        chunks
    }
}
