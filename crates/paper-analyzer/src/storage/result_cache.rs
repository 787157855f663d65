//! Content-addressed cache of completed analyses
//!
//! Keys are SHA-256 digests of the raw upload bytes. Only fully summarized
//! results are stored; the first write for a fingerprint wins.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::AnalysisResult;

/// Hex-encoded SHA-256 digest of a document's raw bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of `data`
    pub fn of(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix for log lines
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: AnalysisResult,
    cached_at: DateTime<Utc>,
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub max_entries: Option<usize>,
}

/// Shared fingerprint -> result map
pub struct ResultCache {
    entries: RwLock<HashMap<Fingerprint, CacheEntry>>,
    /// Unbounded when `None`
    max_entries: Option<usize>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    pub fn new(max_entries: Option<usize>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.map(|n| n.max(1)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a stored result; the returned copy is tagged `cached = true`.
    ///
    /// Callers serving a hit may replace `filename` with the requesting
    /// upload's name; that is the only other field that differs from the
    /// stored payload.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<AnalysisResult> {
        let found = self
            .entries
            .read()
            .get(fingerprint)
            .map(|entry| entry.result.clone());

        match found {
            Some(mut result) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Cache hit: {}", fingerprint.short());
                result.cached = true;
                Some(result)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Cache miss: {}", fingerprint.short());
                None
            }
        }
    }

    /// Store a fully computed result.
    ///
    /// Returns `false` without touching the cache when the fingerprint is
    /// already present or the result is a fallback analysis.
    pub fn put(&self, fingerprint: Fingerprint, result: &AnalysisResult) -> bool {
        if result.analysis.is_fallback() {
            tracing::debug!("Not caching fallback analysis: {}", fingerprint.short());
            return false;
        }

        let mut entries = self.entries.write();
        if entries.contains_key(&fingerprint) {
            return false;
        }

        if let Some(max) = self.max_entries {
            if entries.len() >= max {
                if let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, v)| v.cached_at)
                    .map(|(k, _)| k.clone())
                {
                    entries.remove(&oldest);
                }
            }
        }

        let mut stored = result.clone();
        stored.cached = false;
        tracing::debug!("Cached result: {}", fingerprint.short());
        entries.insert(
            fingerprint,
            CacheEntry {
                result: stored,
                cached_at: Utc::now(),
            },
        );
        true
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.read().contains_key(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            max_entries: self.max_entries,
        }
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(None)
    }
}
