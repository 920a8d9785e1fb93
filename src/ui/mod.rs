//! Terminal output for the CLI.

use indicatif::{ProgressBar, ProgressStyle};

use crate::models::StreamEvent;
use crate::utils::CacheEntry;

/// Progress bar fed by aggregation stream events
pub struct RefreshProgress {
    bar: ProgressBar,
}

impl RefreshProgress {
    /// Create a progress bar; hidden when `quiet`
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(0)
        };
        bar.set_style(
            ProgressStyle::with_template("{msg}\n{spinner:.cyan} {wide_bar:.cyan/blue} {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                .progress_chars("█   "),
        );
        bar.set_message("Fetching profile");
        Self { bar }
    }

    /// Apply one stream event
    pub fn handle(&self, event: &StreamEvent) {
        match event {
            StreamEvent::Progress { progress } => {
                self.bar.set_length(progress.total as u64);
                self.bar.set_position(progress.current as u64);
                self.bar.set_message(truncate(&progress.latest, 70));
            }
            StreamEvent::Done { data, .. } => self.bar.finish_with_message(format!(
                "Aggregated {} publications",
                data.publications.len()
            )),
            StreamEvent::Error { error } => self.bar.abandon_with_message(format!("Failed: {}", error)),
        }
    }
}

/// One-line summary of a completed refresh
pub fn refresh_summary(entry: &CacheEntry) -> String {
    format!(
        "{}: {} publications, {} with abstracts, {} citations (updated {})",
        entry.data.author.name,
        entry.data.publications.len(),
        entry.data.abstract_count(),
        entry.data.author.citations,
        entry.last_updated
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AggregationResult, AuthorRecord, Publication};

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long title", 10), "a very ...");
    }

    #[test]
    fn test_refresh_summary() {
        let entry = CacheEntry {
            timestamp: 0.0,
            last_updated: "2024-01-01T00:00:00+00:00".to_string(),
            data: AggregationResult::new(
                AuthorRecord {
                    name: "Jane Doe".to_string(),
                    citations: 42,
                    h_index: 2,
                    i10_index: 0,
                },
                vec![
                    Publication::builder("A")
                        .abstract_text(Some("text".to_string()))
                        .build(),
                    Publication::new("B"),
                ],
            ),
        };

        assert_eq!(
            refresh_summary(&entry),
            "Jane Doe: 2 publications, 1 with abstracts, 42 citations (updated 2024-01-01T00:00:00+00:00)"
        );
    }

    #[test]
    fn test_hidden_bar_handles_events() {
        let progress = RefreshProgress::new(true);
        progress.handle(&StreamEvent::progress(0, 2, "Starting..."));
        progress.handle(&StreamEvent::progress(1, 2, "First"));
        progress.handle(&StreamEvent::error("boom"));
    }
}
