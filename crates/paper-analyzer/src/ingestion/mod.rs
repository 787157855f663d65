//! Document ingestion: page parsing, section detection and chunking

mod chunker;
mod parser;
mod segmenter;

pub use chunker::{Chunker, SectionChunker};
pub use parser::{DocumentParser, FileParser};
pub use segmenter::{SectionDetector, Segmenter};
