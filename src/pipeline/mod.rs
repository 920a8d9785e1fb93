//! The aggregation pipeline.
//!
//! The [`Aggregator`] walks an author's profile publication by publication
//! and hands each one to the [`AbstractResolver`], which picks an abstract
//! from the profile itself or from the fallback sources.

mod aggregator;
mod resolver;

pub use aggregator::Aggregator;
pub use resolver::{AbstractResolver, MIN_COMPLETE_ABSTRACT_LEN};

use crate::sources::SourceError;

/// Errors that abort a whole aggregation run
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// The author profile could not be fetched
    #[error("Failed to fetch profile {author_id}: {source}")]
    Profile {
        author_id: String,
        #[source]
        source: SourceError,
    },
}
