//! Mock sources for testing purposes.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::models::{RawProfile, RawPublication};
use crate::sources::{AbstractSource, ProfileSource, SourceError};

#[derive(Debug, Clone)]
enum MockReply {
    Found(String),
    Empty,
    Fail(String),
}

/// A mock abstract source that returns a predefined answer for every title.
#[derive(Debug)]
pub struct MockAbstractSource {
    id: String,
    reply: Mutex<MockReply>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockAbstractSource {
    /// Create a mock that answers with no abstract.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reply: Mutex::new(MockReply::Empty),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock that answers with `text`.
    pub fn found(id: impl Into<String>, text: impl Into<String>) -> Self {
        let mock = Self::new(id);
        mock.set_found(text);
        mock
    }

    /// Create a mock that fails every lookup.
    pub fn failing(id: impl Into<String>, message: impl Into<String>) -> Self {
        let mock = Self::new(id);
        mock.set_failure(message);
        mock
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_found(&self, text: impl Into<String>) {
        *self.reply.lock().unwrap() = MockReply::Found(text.into());
    }

    pub fn set_failure(&self, message: impl Into<String>) {
        *self.reply.lock().unwrap() = MockReply::Fail(message.into());
    }

    /// Number of lookups made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AbstractSource for MockAbstractSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn lookup_abstract(
        &self,
        _title: &str,
        _authors: &[String],
    ) -> Result<Option<String>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.reply.lock().unwrap().clone();
        match reply {
            MockReply::Found(text) => Ok(Some(text)),
            MockReply::Empty => Ok(None),
            MockReply::Fail(message) => Err(SourceError::Api(message)),
        }
    }
}

/// A mock profile source serving a fixed profile.
///
/// Filling returns the stub unchanged, except for titles registered with
/// [`MockProfileSource::fail_fill`].
#[derive(Debug, Default)]
pub struct MockProfileSource {
    profile: Mutex<Option<RawProfile>>,
    fill_failures: Mutex<HashSet<String>>,
}

impl MockProfileSource {
    pub fn new(profile: RawProfile) -> Self {
        Self {
            profile: Mutex::new(Some(profile)),
            fill_failures: Mutex::new(HashSet::new()),
        }
    }

    /// A source whose profile fetch always fails.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Make filling the publication titled `title` fail.
    pub fn fail_fill(&self, title: impl Into<String>) {
        self.fill_failures.lock().unwrap().insert(title.into());
    }
}

#[async_trait]
impl ProfileSource for MockProfileSource {
    fn id(&self) -> &str {
        "mock"
    }

    async fn fetch_profile(&self, author_id: &str) -> Result<RawProfile, SourceError> {
        self.profile
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SourceError::NotFound(format!("no profile for {}", author_id)))
    }

    async fn fill_publication(
        &self,
        publication: &RawPublication,
    ) -> Result<RawPublication, SourceError> {
        let failures = self.fill_failures.lock().unwrap();
        if failures.contains(publication.label()) {
            return Err(SourceError::Network(format!(
                "detail page unavailable for {}",
                publication.label()
            )));
        }
        Ok(publication.clone())
    }
}

/// Build a publication stub for testing.
pub fn make_stub(title: &str, citations: u64) -> RawPublication {
    RawPublication {
        num_citations: Some(citations),
        authors: vec!["A. Author".to_string()],
        ..RawPublication::new(title)
    }
}
