//! In-memory storage for completed analyses

mod result_cache;

pub use result_cache::{CacheStats, Fingerprint, ResultCache};
