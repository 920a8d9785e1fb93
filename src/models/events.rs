//! Events streamed to clients while an aggregation runs.

use serde::{Deserialize, Serialize};

use super::AggregationResult;

/// Progress after a publication has been processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Number of publications processed so far
    pub current: usize,

    /// Total number of publications on the profile
    pub total: usize,

    /// Title of the publication just processed
    pub latest: String,
}

/// A single server-sent event payload
///
/// Serializes to one of `{"progress": {...}}`, `{"done": true, "data": {...}}`
/// or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamEvent {
    Progress { progress: ProgressEvent },
    Done { done: bool, data: AggregationResult },
    Error { error: String },
}

impl StreamEvent {
    pub fn progress(current: usize, total: usize, latest: impl Into<String>) -> Self {
        StreamEvent::Progress {
            progress: ProgressEvent {
                current,
                total,
                latest: latest.into(),
            },
        }
    }

    pub fn done(data: AggregationResult) -> Self {
        StreamEvent::Done { done: true, data }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamEvent::Error {
            error: message.into(),
        }
    }

    /// Whether this event ends the stream
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Progress { .. })
    }
}
