use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle of a single chapter illustration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    /// Queued, not yet authorised to load
    Waiting,
    /// Request in flight, timeout bound armed
    Loading,
    /// Image received
    Success,
    /// Timed out or failed; can be retried
    Error,
}

impl LoadStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoadStatus::Success | LoadStatus::Error)
    }
}

/// Result of a finished load, as seen by the backoff policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Success,
    Error,
}

/// Queue bookkeeping for one chapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub chapter_index: usize,
    pub status: LoadStatus,
    pub retry_count: u32,
}

/// Permission for one chapter to start loading.
///
/// Carries the story generation and retry count it was issued for, so a
/// completion arriving after a reset or a retry can be recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub generation: u64,
    pub chapter_index: usize,
    pub retry_count: u32,
}

/// What the driver needs to know about one chapter's illustration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageRequest {
    pub prompt: Option<String>,
    pub seed: Option<u64>,
    /// Image that already arrived with the story; never queued
    pub preloaded: Option<String>,
}

impl ImageRequest {
    pub fn new(prompt: Option<String>, seed: Option<u64>) -> Self {
        Self {
            prompt,
            seed,
            preloaded: None,
        }
    }

    pub fn with_preloaded(mut self, image: Option<String>) -> Self {
        self.preloaded = image.filter(|i| !i.is_empty());
        self
    }
}

/// Parameters of the image generation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageUrlConfig {
    /// Base URL; the encoded prompt is appended as the last path segment
    pub endpoint: String,
    /// Returned when a chapter has no usable prompt
    pub fallback_url: String,
    pub width: u32,
    pub height: u32,
    pub model: String,
    /// How many prompt words survive truncation
    pub prompt_words: usize,
    pub style_suffix: String,
    pub default_seed: u64,
}

impl Default for ImageUrlConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://image.pollinations.ai/prompt".to_string(),
            fallback_url: "https://placehold.co/768x512?text=Illustration".to_string(),
            width: 768,
            height: 512,
            model: "flux".to_string(),
            prompt_words: 8,
            style_suffix: "children's book illustration".to_string(),
            default_seed: 1234,
        }
    }
}

/// Timing and concurrency of the image queue.
///
/// All durations are whole seconds; the backoff arithmetic floors to seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageQueueConfig {
    pub load_timeout_secs: u64,
    pub cooldown_initial_secs: u64,
    pub cooldown_min_secs: u64,
    pub cooldown_max_secs: u64,
    pub max_concurrent: usize,
}

impl Default for ImageQueueConfig {
    fn default() -> Self {
        Self {
            load_timeout_secs: 35,
            cooldown_initial_secs: 15,
            cooldown_min_secs: 15,
            cooldown_max_secs: 60,
            max_concurrent: 1,
        }
    }
}

impl ImageQueueConfig {
    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }

    /// Concurrency limit, never below one
    pub fn concurrency(&self) -> usize {
        self.max_concurrent.max(1)
    }
}

/// Render-ready view of one chapter's image state
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySnapshot {
    pub chapter_index: usize,
    pub status: LoadStatus,
    pub retry_count: u32,
    pub image: Option<String>,
    pub error: Option<String>,
}

impl EntrySnapshot {
    /// Placeholder for a chapter the driver has not published yet
    pub fn waiting(chapter_index: usize) -> Self {
        Self {
            chapter_index,
            status: LoadStatus::Waiting,
            retry_count: 0,
            image: None,
            error: None,
        }
    }
}

/// Render-ready view of the whole queue
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueueSnapshot {
    pub generation: u64,
    pub entries: Vec<EntrySnapshot>,
    pub pending: Vec<usize>,
    pub in_flight: Vec<usize>,
    pub cooldown: Duration,
}

impl QueueSnapshot {
    pub fn entry(&self, chapter_index: usize) -> Option<&EntrySnapshot> {
        self.entries.get(chapter_index)
    }

    /// Like [`entry`](Self::entry), but a chapter not published yet shows as waiting
    pub fn entry_or_waiting(&self, chapter_index: usize) -> EntrySnapshot {
        self.entry(chapter_index)
            .cloned()
            .unwrap_or_else(|| EntrySnapshot::waiting(chapter_index))
    }

    /// True once every chapter has either an image or an error
    pub fn is_settled(&self) -> bool {
        self.entries.iter().all(|e| e.status.is_terminal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpublished_chapter_shows_as_waiting() {
        let snapshot = QueueSnapshot::default();
        assert!(snapshot.entry(2).is_none());

        let entry = snapshot.entry_or_waiting(2);
        assert_eq!(entry.chapter_index, 2);
        assert_eq!(entry.status, LoadStatus::Waiting);
        assert!(entry.image.is_none());
    }

    #[test]
    fn test_published_entry_is_kept() {
        let mut loaded = EntrySnapshot::waiting(0);
        loaded.status = LoadStatus::Success;
        loaded.image = Some("data:image/png;base64,AAAA".to_string());
        let snapshot = QueueSnapshot {
            entries: vec![loaded.clone()],
            ..Default::default()
        };
        assert_eq!(snapshot.entry_or_waiting(0), loaded);
    }
}
