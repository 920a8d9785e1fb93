//! Core data models for publications, profiles and streamed events.

mod events;
mod profile;
mod publication;

pub use events::{ProgressEvent, StreamEvent};
pub use profile::{RawProfile, RawPublication};
pub use publication::{AggregationResult, AuthorRecord, Publication, PublicationBuilder};
