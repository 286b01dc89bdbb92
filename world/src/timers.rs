//! Deadline bookkeeping for the three round timers.
//!
//! Every timer is a deadline measured in running round time. Running time only
//! advances through unpaused ticks, so pausing preserves each timer's remaining
//! duration exactly.

use std::time::Duration;

use six_seven_core::CLOCK_QUANTUM;

/// Timers ordered by the precedence used to break ties at the same instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Deadline {
    PowerUpExpiry,
    SpawnStep,
    ClockStep,
}

#[derive(Clone, Debug)]
pub(crate) struct Timers {
    now: Duration,
    spawn_due: Duration,
    clock_due: Duration,
}

impl Timers {
    /// Schedules the first spawn immediately and the first clock step one quantum out.
    pub(crate) fn new() -> Self {
        Self {
            now: Duration::ZERO,
            spawn_due: Duration::ZERO,
            clock_due: CLOCK_QUANTUM,
        }
    }

    pub(crate) fn now(&self) -> Duration {
        self.now
    }

    pub(crate) fn spawn_remaining(&self) -> Duration {
        self.spawn_due.saturating_sub(self.now)
    }

    pub(crate) fn clock_remaining(&self) -> Duration {
        self.clock_due.saturating_sub(self.now)
    }

    /// Returns the earliest deadline that falls on or before `horizon`.
    pub(crate) fn next_due(
        &self,
        power_up_expiry: Option<Duration>,
        horizon: Duration,
    ) -> Option<(Duration, Deadline)> {
        let mut candidates = [
            power_up_expiry.map(|at| (at, Deadline::PowerUpExpiry)),
            Some((self.spawn_due, Deadline::SpawnStep)),
            Some((self.clock_due, Deadline::ClockStep)),
        ];
        candidates.sort();
        candidates
            .into_iter()
            .flatten()
            .find(|(at, _)| *at <= horizon)
    }

    /// Moves running time forward; time never flows backwards.
    pub(crate) fn jump_to(&mut self, at: Duration) {
        self.now = self.now.max(at);
    }

    pub(crate) fn schedule_spawn(&mut self, delay: Duration) {
        self.spawn_due = self.now.saturating_add(delay);
    }

    pub(crate) fn schedule_clock(&mut self) {
        self.clock_due = self.clock_due.saturating_add(CLOCK_QUANTUM);
    }
}

/// Converts a fractional millisecond interval into a whole-nanosecond delay.
pub(crate) fn interval_to_duration(interval_ms: f64) -> Duration {
    if !interval_ms.is_finite() || interval_ms <= 0.0 {
        return Duration::ZERO;
    }
    let nanos = (interval_ms * 1_000_000.0).round();
    Duration::from_nanos(nanos.min(u64::MAX as f64) as u64)
}
