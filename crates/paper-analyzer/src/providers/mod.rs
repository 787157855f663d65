//! Provider abstractions for the summarization service

pub mod gemini;
pub mod llm;

pub use gemini::GeminiSummarizer;
pub use llm::Summarizer;
