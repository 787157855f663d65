//! Prompt construction and local analysis synthesis

pub mod fallback;
pub mod prompt;

pub use fallback::build_fallback_analysis;
pub use prompt::PromptBuilder;
