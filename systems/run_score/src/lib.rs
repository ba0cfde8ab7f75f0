#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Run clock, candy total and reward multiplier.

use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use trick_or_treat_core::{Event, RunState};
use trick_or_treat_system_sequencer::duration_from_secs;

/// Tunables for a single timed run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Length of the run in seconds.
    pub run_seconds: f32,
    /// Multiplier a fresh run starts with; values below one are raised to one.
    pub starting_multiplier: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            run_seconds: 180.0,
            starting_multiplier: 1,
        }
    }
}

/// Countdown and score keeper for the current run.
#[derive(Debug)]
pub struct RunScore {
    length: Duration,
    starting_multiplier: u32,
    elapsed: Duration,
    candy_total: u32,
    multiplier: u32,
    running: bool,
}

impl RunScore {
    /// Creates a running, untouched run.
    #[must_use]
    pub fn new(config: &RunConfig) -> Self {
        let starting_multiplier = config.starting_multiplier.max(1);
        Self {
            length: duration_from_secs(config.run_seconds),
            starting_multiplier,
            elapsed: Duration::ZERO,
            candy_total: 0,
            multiplier: starting_multiplier,
            running: true,
        }
    }

    /// Discards all progress and starts the countdown again, republishing the HUD values.
    pub fn reset(&mut self, out: &mut Vec<Event>) {
        self.elapsed = Duration::ZERO;
        self.candy_total = 0;
        self.multiplier = self.starting_multiplier;
        self.running = true;
        self.publish(out);
    }

    /// Emits the current timer, total and multiplier.
    pub fn publish(&self, out: &mut Vec<Event>) {
        self.publish_timer(out);
        out.push(Event::CandyTotalChanged {
            total: self.candy_total,
        });
        out.push(Event::MultiplierChanged {
            multiplier: self.multiplier,
        });
    }

    /// Counts the run down by `dt`. Returns `true` on the tick the run ends.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) -> bool {
        if !self.running {
            return false;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        self.publish_timer(out);

        if self.remaining().is_zero() {
            return self.end_run(out);
        }
        false
    }

    /// Adds `amount` candy scaled by the multiplier. Returns the amount actually added.
    ///
    /// Rewards arriving after the run ended are dropped.
    pub fn add_candy(&mut self, amount: u32, out: &mut Vec<Event>) -> u32 {
        if !self.running {
            debug!("reward of {amount} ignored; run already ended");
            return 0;
        }

        let awarded = amount.saturating_mul(self.multiplier);
        self.candy_total = self.candy_total.saturating_add(awarded);
        out.push(Event::CandyTotalChanged {
            total: self.candy_total,
        });
        awarded
    }

    /// Shifts the multiplier by `delta`, never letting it drop below one.
    pub fn add_multiplier(&mut self, delta: i32, out: &mut Vec<Event>) -> u32 {
        let shifted = (i64::from(self.multiplier) + i64::from(delta)).clamp(1, i64::from(u32::MAX));
        self.multiplier = u32::try_from(shifted).unwrap_or(u32::MAX);
        out.push(Event::MultiplierChanged {
            multiplier: self.multiplier,
        });
        self.multiplier
    }

    /// Stops the countdown. Returns `false` if the run had already ended.
    pub fn end_run(&mut self, out: &mut Vec<Event>) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        out.push(Event::RunEnded {
            total: self.candy_total,
        });
        info!(
            "run ended after {:.1}s with {} candy",
            self.elapsed.as_secs_f32(),
            self.candy_total
        );
        true
    }

    /// Whether the countdown is still running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Time left before the run ends.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.length.saturating_sub(self.elapsed)
    }

    /// Remaining time as a fraction of the run length.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.length.is_zero() {
            return 0.0;
        }
        (self.remaining().as_secs_f32() / self.length.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Whole seconds left, rounded up.
    #[must_use]
    pub fn seconds_left(&self) -> u32 {
        let remaining = self.remaining();
        let whole = remaining.as_secs();
        let rounded = if remaining.subsec_nanos() > 0 {
            whole + 1
        } else {
            whole
        };
        u32::try_from(rounded).unwrap_or(u32::MAX)
    }

    /// Snapshot of the run.
    #[must_use]
    pub fn state(&self) -> RunState {
        RunState {
            elapsed: self.elapsed,
            remaining: self.remaining(),
            candy_total: self.candy_total,
            multiplier: self.multiplier,
            is_running: self.running,
        }
    }

    fn publish_timer(&self, out: &mut Vec<Event>) {
        out.push(Event::TimerChanged {
            progress: self.progress(),
            seconds_left: self.seconds_left(),
        });
    }
}
