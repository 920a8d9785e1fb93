//! Progress reporting for aggregation runs.
//!
//! An aggregation reports through a [`ProgressReporter`]. A reporter either
//! forwards [`StreamEvent`]s into a bounded channel (the SSE endpoint and the
//! CLI progress bar read from the other end) or is quiet and only counts.
//!
//! # Usage
//!
//! ```ignore
//! use scholar_digest::utils::ProgressReporter;
//!
//! let (mut reporter, mut events) = ProgressReporter::channel(32);
//! tokio::spawn(async move {
//!     while let Some(event) = events.recv().await {
//!         println!("{}", serde_json::to_string(&event).unwrap());
//!     }
//! });
//! reporter.begin(2).await;
//! reporter.advance("First paper").await;
//! reporter.advance("Second paper").await;
//! ```

use tokio::sync::mpsc;

use crate::models::{AggregationResult, StreamEvent};

/// Label of the event announcing the start of a run
pub const STARTING_LABEL: &str = "Starting...";

/// Progress reporter with an optional event channel
///
/// A closed channel (the client went away) is not an error: the reporter
/// drops the sender and keeps counting so the run can finish and be cached.
#[derive(Debug, Default)]
pub struct ProgressReporter {
    sender: Option<mpsc::Sender<StreamEvent>>,
    current: usize,
    total: usize,
}

impl ProgressReporter {
    /// Create a reporter forwarding events to `sender`
    pub fn new(sender: mpsc::Sender<StreamEvent>) -> Self {
        Self {
            sender: Some(sender),
            current: 0,
            total: 0,
        }
    }

    /// Create a reporter together with the receiving end of its channel
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<StreamEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    /// Create a reporter that emits nothing
    pub fn quiet() -> Self {
        Self::default()
    }

    /// Announce a run over `total` publications
    pub async fn begin(&mut self, total: usize) {
        self.current = 0;
        self.total = total;
        self.emit(StreamEvent::progress(0, total, STARTING_LABEL)).await;
    }

    /// Record one processed publication
    pub async fn advance(&mut self, latest: &str) {
        self.current += 1;
        tracing::debug!("Processed {}/{}: {}", self.current, self.total, latest);
        self.emit(StreamEvent::progress(self.current, self.total, latest))
            .await;
    }

    /// Send the final result
    pub async fn finish(&mut self, data: &AggregationResult) {
        if self.sender.is_some() {
            self.emit(StreamEvent::done(data.clone())).await;
        }
    }

    /// Send a terminal error
    pub async fn fail(&mut self, message: &str) {
        self.emit(StreamEvent::error(message)).await;
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether events are still being delivered
    pub fn is_connected(&self) -> bool {
        self.sender.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    async fn emit(&mut self, event: StreamEvent) {
        let Some(sender) = &self.sender else {
            return;
        };

        if sender.send(event).await.is_err() {
            tracing::debug!("Progress receiver dropped, continuing without events");
            self.sender = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthorRecord;

    #[tokio::test]
    async fn test_events_in_order() {
        let (mut reporter, mut rx) = ProgressReporter::channel(8);

        reporter.begin(2).await;
        reporter.advance("One").await;
        reporter.advance("Two").await;
        reporter.fail("boom").await;
        drop(reporter);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert_eq!(
            events,
            vec![
                StreamEvent::progress(0, 2, "Starting..."),
                StreamEvent::progress(1, 2, "One"),
                StreamEvent::progress(2, 2, "Two"),
                StreamEvent::error("boom"),
            ]
        );
    }

    #[tokio::test]
    async fn test_finish_sends_done() {
        let (mut reporter, mut rx) = ProgressReporter::channel(1);
        let data = AggregationResult::new(
            AuthorRecord {
                name: "A".to_string(),
                citations: 1,
                h_index: 1,
                i10_index: 0,
            },
            vec![],
        );

        reporter.finish(&data).await;
        let event = rx.recv().await.unwrap();
        assert!(event.is_terminal());
        assert_eq!(event, StreamEvent::done(data));
    }

    #[tokio::test]
    async fn test_dropped_receiver_keeps_counting() {
        let (mut reporter, rx) = ProgressReporter::channel(1);
        drop(rx);

        reporter.begin(3).await;
        reporter.advance("One").await;
        reporter.advance("Two").await;

        assert!(!reporter.is_connected());
        assert_eq!(reporter.current(), 2);
        assert_eq!(reporter.total(), 3);
    }

    #[tokio::test]
    async fn test_quiet_reporter() {
        let mut reporter = ProgressReporter::quiet();
        reporter.begin(1).await;
        reporter.advance("Only").await;
        assert!(!reporter.is_connected());
        assert_eq!(reporter.current(), 1);
    }
}
