//! Deferred-task scheduling.
//!
//! A [`Debouncer`] models "schedule a task, cancelling any previously scheduled one that has not
//! started yet". It is a pure data structure: callers pass the current [`Instant`] in, so tests
//! never sleep.

use std::time::{Duration, Instant};

/// Delay before re-analysis after the last edit.
pub const DEFAULT_REANALYSIS_DELAY_MS: u64 = 150;

/// A single-slot deferred task.
///
/// Every schedule gets a new generation number. Only the most recent schedule can fire, and it
/// fires at most once.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
    generation: u64,
}

impl Debouncer {
    /// Create a debouncer with a default delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            generation: 0,
        }
    }

    /// Create a debouncer with a delay in milliseconds.
    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    /// The default delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule the task `delay` from `now`, superseding any pending schedule.
    ///
    /// Returns the new generation.
    pub fn schedule(&mut self, now: Instant) -> u64 {
        self.schedule_in(now, self.delay)
    }

    /// Schedule the task with an explicit delay.
    pub fn schedule_in(&mut self, now: Instant, delay: Duration) -> u64 {
        self.generation += 1;
        self.deadline = Some(now + delay);
        self.generation
    }

    /// Drop the pending schedule, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns `true` while a schedule is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the pending schedule fires.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Generation of the most recent schedule.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` if `generation` is still the most recent schedule.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Fire the pending schedule if its deadline has passed.
    ///
    /// Returns the generation that fired; the slot is cleared, so a schedule fires only once.
    pub fn take_due(&mut self, now: Instant) -> Option<u64> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(self.generation)
            }
            _ => None,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::from_millis(DEFAULT_REANALYSIS_DELAY_MS)
    }
}
