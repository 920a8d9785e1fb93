//! # Scholar Digest
//!
//! Aggregates one author's publications from Google Scholar, completes their
//! abstracts from fallback bibliographic APIs, and serves the result over
//! HTTP with a file-backed cache and streamed progress.
//!
//! ## Architecture
//!
//! - [`models`]: Publications, author metrics, profile records, stream events
//! - [`sources`]: Profile and abstract sources behind async traits
//! - [`pipeline`]: Abstract resolution and per-author aggregation
//! - [`service`]: Cache-backed, serialized refreshes
//! - [`api`]: Axum routes
//! - [`utils`]: HTTP client, sanitizer, cache store, progress reporting
//! - [`config`]: Configuration management
//! - [`ui`]: Terminal output for the CLI

pub mod api;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod service;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use models::{AggregationResult, Publication};
pub use service::PublicationService;
pub use sources::{AbstractSource, ProfileSource, SourceRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
