//! Adaptive pause between image requests.
//!
//! The image service throttles aggressively, so every completed request is
//! followed by a cooldown. Failures double it up to a ceiling; successes
//! shrink it by a quarter down to a floor.

use crate::models::{ImageQueueConfig, LoadOutcome};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cooldown {
    current_secs: u64,
    min_secs: u64,
    max_secs: u64,
}

impl Cooldown {
    pub fn new(initial_secs: u64, min_secs: u64, max_secs: u64) -> Self {
        let max_secs = max_secs.max(min_secs);
        Self {
            current_secs: initial_secs.max(min_secs).min(max_secs),
            min_secs,
            max_secs,
        }
    }

    pub fn from_config(config: &ImageQueueConfig) -> Self {
        Self::new(
            config.cooldown_initial_secs,
            config.cooldown_min_secs,
            config.cooldown_max_secs,
        )
    }

    pub fn current(&self) -> Duration {
        Duration::from_secs(self.current_secs)
    }

    /// Adjusts the wait for the given outcome and returns the new value
    pub fn record(&mut self, outcome: LoadOutcome) -> Duration {
        let previous = self.current_secs;
        self.current_secs = match outcome {
            LoadOutcome::Error => previous.saturating_mul(2).min(self.max_secs),
            LoadOutcome::Success => (previous.saturating_mul(3) / 4).max(self.min_secs),
        };

        if self.current_secs != previous {
            log::debug!(
                "Image cooldown {}s -> {}s after {:?}",
                previous,
                self.current_secs,
                outcome
            );
        }

        self.current()
    }
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::from_config(&ImageQueueConfig::default())
    }
}
