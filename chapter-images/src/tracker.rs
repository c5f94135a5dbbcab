//! Per-chapter load tracking.
//!
//! A tracker only moves into `Loading` when the controller admits it, and it
//! arms its own deadline at that moment. Transport layers that hang without
//! ever reporting failure are caught by [`LoadTracker::expire`].

use crate::models::{EntrySnapshot, LoadStatus, QueueEntry};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub struct LoadTracker {
    chapter_index: usize,
    status: LoadStatus,
    retry_count: u32,
    deadline: Option<Instant>,
    image: Option<String>,
    error: Option<String>,
}

impl LoadTracker {
    pub fn new(chapter_index: usize) -> Self {
        Self {
            chapter_index,
            status: LoadStatus::Waiting,
            retry_count: 0,
            deadline: None,
            image: None,
            error: None,
        }
    }

    /// Tracker for an image that arrived together with the story
    pub fn preloaded(chapter_index: usize, image: String) -> Self {
        Self {
            status: LoadStatus::Success,
            image: Some(image),
            ..Self::new(chapter_index)
        }
    }

    pub fn chapter_index(&self) -> usize {
        self.chapter_index
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// `Waiting -> Loading`, arming the timeout bound
    pub fn start(&mut self, now: Instant, bound: Duration) -> bool {
        if self.status != LoadStatus::Waiting {
            return false;
        }
        self.status = LoadStatus::Loading;
        self.deadline = Some(now + bound);
        self.error = None;
        true
    }

    /// `Loading -> Success`
    pub fn succeed(&mut self, image: String) -> bool {
        if self.status != LoadStatus::Loading {
            return false;
        }
        self.status = LoadStatus::Success;
        self.deadline = None;
        self.image = Some(image);
        true
    }

    /// `Loading -> Error`
    pub fn fail(&mut self, reason: impl Into<String>) -> bool {
        if self.status != LoadStatus::Loading {
            return false;
        }
        self.status = LoadStatus::Error;
        self.deadline = None;
        self.error = Some(reason.into());
        true
    }

    /// Fails the load if its deadline has passed
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if self.status == LoadStatus::Loading && deadline <= now => {
                log::warn!(
                    "Chapter {} image timed out (attempt {})",
                    self.chapter_index + 1,
                    self.retry_count + 1
                );
                self.fail("Timed out waiting for the illustration")
            }
            _ => false,
        }
    }

    /// `Error -> Waiting` with a fresh retry count
    pub fn reset_for_retry(&mut self) -> bool {
        if self.status != LoadStatus::Error {
            return false;
        }
        self.status = LoadStatus::Waiting;
        self.retry_count += 1;
        self.deadline = None;
        self.error = None;
        true
    }

    pub fn entry(&self) -> QueueEntry {
        QueueEntry {
            chapter_index: self.chapter_index,
            status: self.status,
            retry_count: self.retry_count,
        }
    }

    pub fn snapshot(&self) -> EntrySnapshot {
        EntrySnapshot {
            chapter_index: self.chapter_index,
            status: self.status,
            retry_count: self.retry_count,
            image: self.image.clone(),
            error: self.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUND: Duration = Duration::from_secs(5);

    #[test]
    fn test_happy_path() {
        let now = Instant::now();
        let mut tracker = LoadTracker::new(0);
        assert_eq!(tracker.status(), LoadStatus::Waiting);

        assert!(tracker.start(now, BOUND));
        assert_eq!(tracker.status(), LoadStatus::Loading);
        assert_eq!(tracker.deadline(), Some(now + BOUND));

        assert!(tracker.succeed("data:image/png;base64,AAAA".to_string()));
        assert_eq!(tracker.status(), LoadStatus::Success);
        assert_eq!(tracker.deadline(), None);
        assert_eq!(tracker.image(), Some("data:image/png;base64,AAAA"));
    }

    #[test]
    fn test_expire_exactly_at_bound() {
        let now = Instant::now();
        let mut tracker = LoadTracker::new(2);
        tracker.start(now, BOUND);

        assert!(!tracker.expire(now + Duration::from_millis(4999)));
        assert_eq!(tracker.status(), LoadStatus::Loading);

        assert!(tracker.expire(now + BOUND));
        assert_eq!(tracker.status(), LoadStatus::Error);
        assert!(tracker.snapshot().error.is_some());
    }

    #[test]
    fn test_retry_increments_count() {
        let now = Instant::now();
        let mut tracker = LoadTracker::new(1);
        tracker.start(now, BOUND);
        tracker.fail("503");

        assert!(tracker.reset_for_retry());
        assert_eq!(tracker.status(), LoadStatus::Waiting);
        assert_eq!(tracker.retry_count(), 1);
        assert_eq!(tracker.snapshot().error, None);
    }

    #[test]
    fn test_illegal_transitions_are_ignored() {
        let now = Instant::now();
        let mut tracker = LoadTracker::new(0);
        assert!(!tracker.succeed("x".to_string()));
        assert!(!tracker.fail("x"));
        assert!(!tracker.reset_for_retry());

        tracker.start(now, BOUND);
        assert!(!tracker.start(now, BOUND));
        assert!(!tracker.reset_for_retry());

        tracker.succeed("x".to_string());
        assert!(!tracker.fail("late failure"));
        assert!(!tracker.expire(now + BOUND * 2));
        assert_eq!(tracker.status(), LoadStatus::Success);
    }

    #[test]
    fn test_preloaded_is_success() {
        let tracker = LoadTracker::preloaded(3, "data:image/png;base64,BBBB".to_string());
        assert_eq!(tracker.status(), LoadStatus::Success);
        assert_eq!(tracker.entry().chapter_index, 3);
    }
}
