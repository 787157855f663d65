//! Page-level document parsing

use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::{FileType, PageRecord};

/// Time allowed for pdf-extract before falling back to lopdf
const PDF_EXTRACT_TIMEOUT: Duration = Duration::from_secs(60);

/// Turns raw file bytes into ordered page records
pub trait DocumentParser: Send + Sync {
    /// Parse `data` into pages; fails with [`Error::FileParse`] on malformed input
    fn parse(&self, filename: &str, data: &[u8]) -> Result<Vec<PageRecord>>;

    /// Whether this parser can handle the given filename
    fn supports(&self, filename: &str) -> bool;
}

/// Parser for PDF and plain text documents
#[derive(Debug, Default, Clone, Copy)]
pub struct FileParser;

impl FileParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract per-page PDF text with a timeout to prevent hangs on problematic fonts
    fn extract_pdf_pages(filename: &str, data: &[u8]) -> Result<Vec<String>> {
        use std::sync::mpsc;
        use std::thread;

        let data_vec = data.to_vec();
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem_by_pages(&data_vec);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(PDF_EXTRACT_TIMEOUT) {
            Ok(Ok(pages)) => {
                let _ = handle.join();
                Ok(pages)
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                tracing::warn!("[{}] pdf-extract failed: {}, trying lopdf", filename, e);
                Self::extract_pdf_pages_fallback(filename, data)
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // The extraction thread cannot be killed; let it finish in the background
                tracing::error!(
                    "[{}] PDF extraction timeout after {}s, trying lopdf",
                    filename,
                    PDF_EXTRACT_TIMEOUT.as_secs()
                );
                Self::extract_pdf_pages_fallback(filename, data)
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                tracing::error!("[{}] PDF extraction thread crashed", filename);
                Self::extract_pdf_pages_fallback(filename, data)
            }
        }
    }

    /// Fallback PDF text extraction using lopdf directly
    fn extract_pdf_pages_fallback(filename: &str, data: &[u8]) -> Result<Vec<String>> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::file_parse(filename, format!("Failed to load PDF: {}", e)))?;

        let pages = doc.get_pages();
        let mut texts = Vec::with_capacity(pages.len());
        for page_num in pages.keys() {
            match doc.extract_text(&[*page_num]) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    tracing::debug!("[{}] No text for page {}: {}", filename, page_num, e);
                    texts.push(String::new());
                }
            }
        }

        Ok(texts)
    }

    /// Plain text: pages are separated by form feeds
    fn split_text_pages(filename: &str, data: &[u8]) -> Result<Vec<String>> {
        let text = std::str::from_utf8(data)
            .map_err(|e| Error::file_parse(filename, format!("Invalid UTF-8: {}", e)))?;
        Ok(text.split('\u{000C}').map(str::to_string).collect())
    }
}

impl DocumentParser for FileParser {
    fn parse(&self, filename: &str, data: &[u8]) -> Result<Vec<PageRecord>> {
        let texts = match FileType::from_filename(filename) {
            FileType::Pdf => Self::extract_pdf_pages(filename, data)?,
            FileType::Txt | FileType::Markdown => Self::split_text_pages(filename, data)?,
            FileType::Unknown => {
                return Err(Error::UnsupportedFileType(filename.to_string()));
            }
        };

        let pages: Vec<PageRecord> = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageRecord::new(i as u32 + 1, text.trim()))
            .collect();

        tracing::debug!("[{}] Parsed {} pages", filename, pages.len());
        Ok(pages)
    }

    fn supports(&self, filename: &str) -> bool {
        FileType::from_filename(filename).is_supported()
    }
}
