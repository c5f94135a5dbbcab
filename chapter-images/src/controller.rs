//! Sequential queue controller.
//!
//! Pure state machine: every method takes the current instant and the
//! controller never sleeps itself. The driver asks [`QueueController::next_alarm`]
//! when to call [`QueueController::poll`] next. Load deadlines and the
//! cooldown are the only alarms, and both vanish with [`QueueController::clear`]
//! or a new [`QueueController::load`].

use crate::backoff::Cooldown;
use crate::models::{
    Admission, ImageQueueConfig, LoadOutcome, LoadStatus, QueueEntry, QueueSnapshot,
};
use crate::tracker::LoadTracker;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// What happened during one [`QueueController::poll`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollResult {
    /// Chapters whose timeout bound elapsed
    pub timed_out: Vec<usize>,
    /// Chapters authorised to start loading now
    pub admissions: Vec<Admission>,
}

#[derive(Debug, Clone)]
pub struct QueueController {
    config: ImageQueueConfig,
    generation: u64,
    trackers: Vec<LoadTracker>,
    pending: VecDeque<usize>,
    in_flight: Vec<usize>,
    cooldown: Cooldown,
    cooldown_until: Option<Instant>,
}

impl QueueController {
    pub fn new(config: ImageQueueConfig) -> Self {
        let cooldown = Cooldown::from_config(&config);
        Self {
            config,
            generation: 0,
            trackers: Vec::new(),
            pending: VecDeque::new(),
            in_flight: Vec::new(),
            cooldown,
            cooldown_until: None,
        }
    }

    pub fn config(&self) -> &ImageQueueConfig {
        &self.config
    }

    /// Replaces whatever was queued with a new story.
    ///
    /// `preloaded[i]` holds the image chapter `i` already came with, if any.
    /// Returns the new generation; completions from older generations are
    /// ignored from here on.
    pub fn load(&mut self, preloaded: Vec<Option<String>>) -> u64 {
        self.reset();

        self.trackers = preloaded
            .into_iter()
            .enumerate()
            .map(|(index, image)| match image {
                Some(image) => LoadTracker::preloaded(index, image),
                None => LoadTracker::new(index),
            })
            .collect();

        self.pending = self
            .trackers
            .iter()
            .filter(|t| t.status() == LoadStatus::Waiting)
            .map(|t| t.chapter_index())
            .collect();

        log::info!(
            "Image queue generation {}: {} chapters, {} to fetch",
            self.generation,
            self.trackers.len(),
            self.pending.len()
        );

        self.generation
    }

    /// Drops all chapters, pending work and alarms
    pub fn clear(&mut self) {
        self.reset();
        log::debug!("Image queue cleared (generation {})", self.generation);
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.trackers.clear();
        self.pending.clear();
        self.in_flight.clear();
        self.cooldown = Cooldown::from_config(&self.config);
        self.cooldown_until = None;
    }

    /// Fires due alarms and admits as many chapters as policy allows
    pub fn poll(&mut self, now: Instant) -> PollResult {
        let mut result = PollResult::default();

        let mut expired = Vec::new();
        for &index in &self.in_flight {
            if self.trackers[index].expire(now) {
                expired.push(index);
            }
        }
        for index in expired {
            self.finish(index, LoadOutcome::Error, now);
            result.timed_out.push(index);
        }

        if matches!(self.cooldown_until, Some(until) if until <= now) {
            self.cooldown_until = None;
        }

        while self.cooldown_until.is_none() && self.in_flight.len() < self.config.concurrency() {
            let Some(index) = self.pending.pop_front() else {
                break;
            };
            let tracker = &mut self.trackers[index];
            if !tracker.start(now, self.config.load_timeout()) {
                continue;
            }
            self.in_flight.push(index);

            log::info!(
                "Admitting chapter {} image (attempt {})",
                index + 1,
                tracker.retry_count() + 1
            );
            result.admissions.push(Admission {
                generation: self.generation,
                chapter_index: index,
                retry_count: tracker.retry_count(),
            });
        }

        result
    }

    /// Reports the end of an admitted load.
    ///
    /// Returns `false` for stale reports: another generation, a chapter that
    /// already timed out, or an attempt superseded by a retry.
    pub fn complete(
        &mut self,
        admission: Admission,
        outcome: Result<String, String>,
        now: Instant,
    ) -> bool {
        let index = admission.chapter_index;
        if admission.generation != self.generation || !self.in_flight.contains(&index) {
            log::debug!("Ignoring stale completion for chapter {}", index + 1);
            return false;
        }

        let tracker = &mut self.trackers[index];
        if tracker.retry_count() != admission.retry_count {
            return false;
        }

        let load_outcome = match outcome {
            Ok(image) => {
                tracker.succeed(image);
                LoadOutcome::Success
            }
            Err(reason) => {
                log::warn!("Chapter {} image failed: {}", index + 1, reason);
                tracker.fail(reason);
                LoadOutcome::Error
            }
        };

        self.finish(index, load_outcome, now);
        true
    }

    fn finish(&mut self, index: usize, outcome: LoadOutcome, now: Instant) {
        self.in_flight.retain(|&i| i != index);
        self.pending.retain(|&i| i != index);
        let wait = self.cooldown.record(outcome);
        self.cooldown_until = Some(now + wait);
        log::debug!(
            "Chapter {} finished with {:?}; next admission in {}s",
            index + 1,
            outcome,
            wait.as_secs()
        );
    }

    /// Puts a chapter back in line.
    ///
    /// An in-flight chapter is first failed (which counts for backoff). A
    /// chapter that is already waiting or already has its image is left as is.
    pub fn retry(&mut self, index: usize, now: Instant) -> bool {
        let Some(tracker) = self.trackers.get_mut(index) else {
            return false;
        };

        match tracker.status() {
            LoadStatus::Loading => {
                tracker.fail("Retry requested");
                self.finish(index, LoadOutcome::Error, now);
            }
            LoadStatus::Error => {}
            LoadStatus::Waiting | LoadStatus::Success => return false,
        }

        self.trackers[index].reset_for_retry();
        if !self.pending.contains(&index) {
            self.pending.push_back(index);
        }
        log::info!("Chapter {} image queued for retry", index + 1);
        true
    }

    /// Earliest instant at which [`QueueController::poll`] has work to do
    pub fn next_alarm(&self) -> Option<Instant> {
        let deadlines = self
            .in_flight
            .iter()
            .filter_map(|&index| self.trackers[index].deadline());
        let cooldown = if self.pending.is_empty() {
            None
        } else {
            self.cooldown_until
        };
        deadlines.chain(cooldown).min()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    pub fn status(&self, index: usize) -> Option<LoadStatus> {
        self.trackers.get(index).map(LoadTracker::status)
    }

    pub fn tracker(&self, index: usize) -> Option<&LoadTracker> {
        self.trackers.get(index)
    }

    pub fn entries(&self) -> Vec<QueueEntry> {
        self.trackers.iter().map(LoadTracker::entry).collect()
    }

    /// The chapter currently loading (first one, if concurrency > 1)
    pub fn current(&self) -> Option<usize> {
        self.in_flight.first().copied()
    }

    pub fn in_flight(&self) -> &[usize] {
        &self.in_flight
    }

    pub fn pending(&self) -> Vec<usize> {
        self.pending.iter().copied().collect()
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown.current()
    }

    pub fn cooldown_until(&self) -> Option<Instant> {
        self.cooldown_until
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            generation: self.generation,
            entries: self.trackers.iter().map(LoadTracker::snapshot).collect(),
            pending: self.pending(),
            in_flight: self.in_flight.clone(),
            cooldown: self.cooldown(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn controller() -> QueueController {
        QueueController::new(ImageQueueConfig::default())
    }

    /// Runs the controller to completion, answering each admission with
    /// `answer(index)` after `load_time`, and returns admissions with their start times
    fn drive(
        queue: &mut QueueController,
        start: Instant,
        load_time: Duration,
        mut answer: impl FnMut(usize) -> Result<String, String>,
    ) -> Vec<(Admission, Instant)> {
        let mut now = start;
        let mut started = Vec::new();
        loop {
            let result = queue.poll(now);
            assert!(queue.in_flight().len() <= 1);
            for admission in result.admissions {
                started.push((admission, now));
                now += load_time;
                let outcome = answer(admission.chapter_index);
                assert!(queue.complete(admission, outcome, now));
            }
            match queue.next_alarm() {
                Some(alarm) => now = now.max(alarm),
                None => break,
            }
        }
        started
    }

    #[test]
    fn test_admits_every_chapter_once_in_order() {
        let mut queue = controller();
        queue.load(vec![None; 5]);
        let start = Instant::now();

        let started = drive(&mut queue, start, secs(2), |_| Ok("img".to_string()));

        let order: Vec<usize> = started.iter().map(|(a, _)| a.chapter_index).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        // each load ends before the next begins
        for pair in started.windows(2) {
            assert!(pair[1].1 >= pair[0].1 + secs(2));
        }
        assert!(queue
            .entries()
            .iter()
            .all(|e| e.status == LoadStatus::Success));
    }

    #[test]
    fn test_first_admission_is_immediate() {
        let mut queue = controller();
        queue.load(vec![None; 2]);
        let now = Instant::now();
        let result = queue.poll(now);
        assert_eq!(result.admissions.len(), 1);
        assert_eq!(queue.current(), Some(0));
        assert_eq!(queue.status(1), Some(LoadStatus::Waiting));

        // nothing else while chapter 0 is loading
        assert!(queue.poll(now + secs(1)).admissions.is_empty());
    }

    #[test]
    fn test_backoff_scenario() {
        let mut queue = controller();
        queue.load(vec![None; 3]);
        let t0 = Instant::now();

        let a0 = queue.poll(t0).admissions[0];
        assert!(queue.complete(a0, Err("HTTP 429".to_string()), t0));
        assert_eq!(queue.cooldown(), secs(30));
        assert_eq!(queue.next_alarm(), Some(t0 + secs(30)));

        assert!(queue.poll(t0 + secs(29)).admissions.is_empty());
        let t1 = t0 + secs(30);
        let admitted = queue.poll(t1).admissions;
        assert_eq!(admitted.len(), 1);
        assert_eq!(admitted[0].chapter_index, 1);

        let t2 = t1 + secs(3);
        assert!(queue.complete(admitted[0], Ok("img".to_string()), t2));
        assert_eq!(queue.cooldown(), secs(22));

        assert!(queue.poll(t2 + secs(21)).admissions.is_empty());
        let admitted = queue.poll(t2 + secs(22)).admissions;
        assert_eq!(admitted[0].chapter_index, 2);
    }

    #[test]
    fn test_timeout_fails_the_chapter_and_backs_off() {
        let config = ImageQueueConfig {
            load_timeout_secs: 5,
            ..ImageQueueConfig::default()
        };
        let mut queue = QueueController::new(config);
        queue.load(vec![None; 2]);
        let t0 = Instant::now();

        let admission = queue.poll(t0).admissions[0];
        assert_eq!(queue.next_alarm(), Some(t0 + secs(5)));

        let early = queue.poll(t0 + Duration::from_millis(4999));
        assert!(early.timed_out.is_empty());
        assert_eq!(queue.status(0), Some(LoadStatus::Loading));

        let due = queue.poll(t0 + secs(5));
        assert_eq!(due.timed_out, vec![0]);
        assert!(due.admissions.is_empty());
        assert_eq!(queue.status(0), Some(LoadStatus::Error));
        assert_eq!(queue.cooldown(), secs(30));

        // the response straggles in afterwards and is ignored
        assert!(!queue.complete(admission, Ok("late".to_string()), t0 + secs(6)));
        assert_eq!(queue.status(0), Some(LoadStatus::Error));
    }

    #[test]
    fn test_retry_requeues_only_that_chapter() {
        let mut queue = controller();
        queue.load(vec![None; 3]);
        let t0 = Instant::now();

        let a0 = queue.poll(t0).admissions[0];
        queue.complete(a0, Err("boom".to_string()), t0);
        let t1 = t0 + secs(30);
        let a1 = queue.poll(t1).admissions[0];
        assert_eq!(a1.chapter_index, 1);

        assert!(queue.retry(0, t1));
        assert_eq!(queue.status(0), Some(LoadStatus::Waiting));
        assert_eq!(queue.status(1), Some(LoadStatus::Loading));
        assert_eq!(queue.status(2), Some(LoadStatus::Waiting));
        assert_eq!(queue.pending(), vec![2, 0]);

        // retrying again while waiting changes nothing
        assert!(!queue.retry(0, t1));
        assert_eq!(queue.pending(), vec![2, 0]);

        queue.complete(a1, Ok("img".to_string()), t1);
        let t2 = t1 + secs(22);
        assert_eq!(queue.poll(t2).admissions[0].chapter_index, 2);
        let a2 = Admission {
            generation: queue.generation(),
            chapter_index: 2,
            retry_count: 0,
        };
        queue.complete(a2, Ok("img".to_string()), t2);

        // 22 * 0.75 = 16.5
        assert_eq!(queue.cooldown(), secs(16));
        let retried = queue.poll(t2 + secs(16)).admissions;
        assert_eq!(retried.len(), 1);
        assert_eq!(retried[0].chapter_index, 0);
        assert_eq!(retried[0].retry_count, 1);
        assert_eq!(queue.status(0), Some(LoadStatus::Loading));
        assert_eq!(queue.status(1), Some(LoadStatus::Success));
        assert_eq!(queue.status(2), Some(LoadStatus::Success));
    }

    #[test]
    fn test_retry_of_loading_chapter_counts_as_failure() {
        let mut queue = controller();
        queue.load(vec![None; 2]);
        let t0 = Instant::now();
        let a0 = queue.poll(t0).admissions[0];

        assert!(queue.retry(0, t0 + secs(4)));
        assert_eq!(queue.current(), None);
        assert_eq!(queue.cooldown(), secs(30));
        assert_eq!(queue.pending(), vec![1, 0]);

        // the superseded attempt cannot complete anymore
        assert!(!queue.complete(a0, Ok("old".to_string()), t0 + secs(5)));
    }

    #[test]
    fn test_retry_ignores_success_and_unknown_chapters() {
        let mut queue = controller();
        queue.load(vec![Some("data:image/png;base64,AA".to_string())]);
        assert!(!queue.retry(0, Instant::now()));
        assert!(!queue.retry(7, Instant::now()));
    }

    #[test]
    fn test_new_story_discards_old_generation() {
        let mut queue = controller();
        let first = queue.load(vec![None; 3]);
        let t0 = Instant::now();
        let old = queue.poll(t0).admissions[0];
        assert_eq!(old.generation, first);

        let second = queue.load(vec![None; 2]);
        assert_ne!(first, second);
        assert_eq!(queue.len(), 2);
        assert!(queue.in_flight().is_empty());
        assert_eq!(queue.pending(), vec![0, 1]);
        assert_eq!(queue.cooldown_until(), None);

        assert!(!queue.complete(old, Err("old failure".to_string()), t0));
        assert_eq!(queue.cooldown(), secs(15));

        let fresh = queue.poll(t0).admissions;
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].generation, second);
        assert_eq!(fresh[0].chapter_index, 0);
    }

    #[test]
    fn test_preloaded_chapters_are_skipped() {
        let mut queue = controller();
        queue.load(vec![
            Some("data:image/png;base64,AA".to_string()),
            None,
            Some("data:image/png;base64,BB".to_string()),
        ]);
        assert_eq!(queue.pending(), vec![1]);

        let started = drive(&mut queue, Instant::now(), secs(1), |_| Ok("img".to_string()));
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].0.chapter_index, 1);
    }

    #[test]
    fn test_clear_removes_alarms() {
        let mut queue = controller();
        queue.load(vec![None; 2]);
        queue.poll(Instant::now());
        assert!(queue.next_alarm().is_some());

        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.next_alarm(), None);
        assert!(queue.poll(Instant::now()).admissions.is_empty());
    }

    #[test]
    fn test_configurable_concurrency() {
        let config = ImageQueueConfig {
            max_concurrent: 2,
            ..ImageQueueConfig::default()
        };
        let mut queue = QueueController::new(config);
        queue.load(vec![None; 3]);
        let admitted = queue.poll(Instant::now()).admissions;
        let indices: Vec<usize> = admitted.iter().map(|a| a.chapter_index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_idle_queue_has_no_alarm_after_last_completion() {
        let mut queue = controller();
        queue.load(vec![None]);
        let t0 = Instant::now();
        let a0 = queue.poll(t0).admissions[0];
        queue.complete(a0, Ok("img".to_string()), t0 + secs(1));
        assert_eq!(queue.next_alarm(), None);

        // a retry after the fact still honours the cooldown
        queue.trackers[0] = {
            let mut t = LoadTracker::new(0);
            t.start(t0, secs(35));
            t.fail("forced");
            t
        };
        assert!(queue.retry(0, t0 + secs(2)));
        assert_eq!(queue.next_alarm(), queue.cooldown_until());
    }
}
