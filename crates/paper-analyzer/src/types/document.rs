//! Page, section and chunk types flowing through the analysis pipeline

use serde::{Deserialize, Serialize};

/// Supported file types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Plain text file (pages separated by form feeds)
    Txt,
    /// Markdown file
    Markdown,
    /// Unknown file type
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "txt" | "text" => Self::Txt,
            "md" | "markdown" => Self::Markdown,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a filename
    pub fn from_filename(filename: &str) -> Self {
        match filename.rsplit_once('.') {
            Some((_, ext)) => Self::from_extension(ext),
            None => Self::Unknown,
        }
    }

    /// Check if this is a supported file type
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// A table extracted from a page, row-major
pub type Table = Vec<Vec<String>>;

/// Text extracted from a single page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Trimmed page text
    pub text: String,
    /// Tables found on the page
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl PageRecord {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
            tables: Vec::new(),
        }
    }
}

/// A logical section of the document, e.g. "Introduction"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub content: String,
    /// Page the section heading was found on (1-indexed)
    pub page_start: u32,
}

/// A unit of text small enough for a single summarization request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Section name, suffixed with "(Part k)" when the section was split
    pub name: String,
    pub content: String,
    pub page_start: u32,
}

/// Join non-empty page text with blank lines, the same layout segmentation sees
pub fn join_pages(pages: &[PageRecord]) -> String {
    pages
        .iter()
        .filter(|p| !p.text.is_empty())
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Approximate token count (1 token is roughly 4 characters of English text)
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}
