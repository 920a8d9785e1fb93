//! Server-Sent Events stream of a running aggregation.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::Stream;
use std::convert::Infallible;
use std::time::Duration;

use super::state::SharedState;
use crate::utils::ProgressReporter;

/// Events buffered between the aggregation task and a slow client
const EVENT_BUFFER: usize = 64;

/// `GET /api/publications/stream` - run an aggregation and stream its progress.
///
/// The aggregation runs in its own task; a client that disconnects does not
/// cancel it and the result is still cached.
pub async fn stream_publications(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (mut reporter, mut rx) = ProgressReporter::channel(EVENT_BUFFER);

    let service = state.service.clone();
    tokio::spawn(async move {
        if let Err(e) = service.refresh(&mut reporter).await {
            tracing::debug!("Streamed refresh ended with error: {}", e);
        }
    });

    let stream = async_stream::stream! {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(data) => yield Ok::<_, Infallible>(Event::default().data(data)),
                Err(e) => tracing::warn!("Failed to encode stream event: {}", e),
            }
            if event.is_terminal() {
                break;
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
