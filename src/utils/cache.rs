//! File-backed cache for the last successful aggregation.
//!
//! The cache is a single pretty-printed JSON file:
//!
//! ```text
//! {
//!   "timestamp": 1718000000.123,
//!   "last_updated": "2024-06-10T06:13:20.123+00:00",
//!   "data": { "author": {...}, "publications": [...] }
//! }
//! ```
//!
//! Writes go to a temporary file in the same directory which is then renamed
//! over the old file, so readers never observe a half-written cache.
//! Freshness is recomputed on every read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::CacheConfig;
use crate::models::AggregationResult;

/// A persisted aggregation with its creation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Creation time in fractional seconds since the Unix epoch
    pub timestamp: f64,

    /// Creation time as RFC 3339
    pub last_updated: String,

    pub data: AggregationResult,
}

impl CacheEntry {
    /// Stamp `data` with the current time
    pub fn new(data: AggregationResult) -> Self {
        Self::at(data, Utc::now())
    }

    fn at(data: AggregationResult, when: DateTime<Utc>) -> Self {
        Self {
            timestamp: when.timestamp_micros() as f64 / 1_000_000.0,
            last_updated: when.to_rfc3339(),
            data,
        }
    }

    /// Whether the entry is younger than `ttl`
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        is_fresh(self.timestamp, ttl)
    }
}

/// Only the header of the cache file, for status checks
#[derive(Debug, Deserialize)]
struct CacheHeader {
    timestamp: f64,
    last_updated: String,
}

fn now_epoch() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

fn is_fresh(timestamp: f64, ttl: Duration) -> bool {
    now_epoch() - timestamp < ttl.as_secs_f64()
}

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult {
    /// Entry found and younger than the TTL
    Hit(CacheEntry),

    /// Entry found but older than the TTL
    Expired(CacheEntry),

    /// No readable entry
    Miss,
}

impl CacheResult {
    /// The entry, fresh or not
    pub fn entry(self) -> Option<CacheEntry> {
        match self {
            CacheResult::Hit(entry) | CacheResult::Expired(entry) => Some(entry),
            CacheResult::Miss => None,
        }
    }
}

/// Cache status as reported by the status endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStatus {
    pub has_cache: bool,
    pub last_updated: Option<String>,
    pub is_fresh: bool,
}

impl CacheStatus {
    fn empty() -> Self {
        Self {
            has_cache: false,
            last_updated: None,
            is_fresh: false,
        }
    }
}

/// Single-file cache store
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
    ttl: Duration,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.path.clone(), config.ttl())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether a cache file is present (readable or not)
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the cached entry and classify it by freshness
    pub fn load(&self) -> CacheResult {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to read cache {}: {}", self.path.display(), e);
                } else {
                    tracing::debug!("Cache MISS: {} does not exist", self.path.display());
                }
                return CacheResult::Miss;
            }
        };

        match serde_json::from_str::<CacheEntry>(&content) {
            Ok(entry) if entry.is_fresh(self.ttl) => {
                tracing::debug!("Cache HIT ({})", entry.last_updated);
                CacheResult::Hit(entry)
            }
            Ok(entry) => {
                tracing::debug!("Cache expired ({})", entry.last_updated);
                CacheResult::Expired(entry)
            }
            Err(e) => {
                tracing::warn!("Ignoring corrupt cache {}: {}", self.path.display(), e);
                CacheResult::Miss
            }
        }
    }

    /// Persist `data` as the new cache entry
    ///
    /// Write failures are logged; the returned entry is valid either way.
    pub fn save(&self, data: AggregationResult) -> CacheEntry {
        let entry = CacheEntry::new(data);

        match self.write_atomic(&entry) {
            Ok(()) => tracing::info!(
                "Cached {} publications at {}",
                entry.data.publications.len(),
                self.path.display()
            ),
            Err(e) => tracing::warn!("Failed to write cache {}: {}", self.path.display(), e),
        }

        entry
    }

    /// Whether the file on disk holds exactly `entry`
    pub fn contains(&self, entry: &CacheEntry) -> bool {
        self.load().entry().as_ref() == Some(entry)
    }

    fn write_atomic(&self, entry: &CacheEntry) -> std::io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let content = serde_json::to_string_pretty(entry)?;
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(content.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Report presence and freshness without materializing the publications
    pub fn status(&self) -> CacheStatus {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return CacheStatus::empty();
        };

        match serde_json::from_str::<CacheHeader>(&content) {
            Ok(header) => CacheStatus {
                has_cache: true,
                is_fresh: is_fresh(header.timestamp, self.ttl),
                last_updated: Some(header.last_updated),
            },
            Err(e) => {
                tracing::warn!("Ignoring corrupt cache {}: {}", self.path.display(), e);
                CacheStatus::empty()
            }
        }
    }
}
