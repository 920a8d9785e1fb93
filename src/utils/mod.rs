//! Utility modules supporting the aggregation pipeline.
//!
//! - [`HttpClient`]: shared reqwest client with configured timeouts
//! - [`sanitize`] / [`clean`]: normalize raw abstract text
//! - [`CacheStore`]: single-file cache of the last aggregation
//! - [`ProgressReporter`]: progress events for streaming clients
//!
//! # Sanitizing
//!
//! ```rust
//! use scholar_digest::utils::sanitize;
//!
//! let text = sanitize(Some("<jats:p>Deep &amp; wide</jats:p>"));
//! assert_eq!(text.as_deref(), Some("Deep wide"));
//! assert_eq!(sanitize(None), None);
//! ```
//!
//! # Cache
//!
//! ```rust,no_run
//! use scholar_digest::utils::{CacheResult, CacheStore};
//! use std::time::Duration;
//!
//! let cache = CacheStore::new("scholar_cache.json", Duration::from_secs(86400));
//! match cache.load() {
//!     CacheResult::Hit(entry) => println!("fresh since {}", entry.last_updated),
//!     CacheResult::Expired(entry) => println!("stale since {}", entry.last_updated),
//!     CacheResult::Miss => println!("no cache"),
//! }
//! ```

mod cache;
mod http;
mod progress;
mod sanitize;

pub use cache::{CacheEntry, CacheResult, CacheStatus, CacheStore};
pub use http::{HttpClient, BROWSER_USER_AGENT};
pub use progress::{ProgressReporter, STARTING_LABEL};
pub use sanitize::{clean, sanitize};
