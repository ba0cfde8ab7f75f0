#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cooperative timing primitives driven by the fixed simulation tick.
//!
//! Nothing in here owns a clock. Every primitive is advanced explicitly with
//! the tick's delta time, so waits, cooldowns and camera moves all progress in
//! lockstep with the rest of the simulation and can be cancelled between any
//! two ticks. Completion is reported by value (payloads pushed into a caller
//! buffer, or a `true` return) rather than through stored callbacks, which is
//! what makes cancellation silent: a cancelled timer has nothing left to call.

use std::{collections::VecDeque, time::Duration};

/// Converts configuration seconds into a [`Duration`], treating negative and
/// non-finite values as zero and saturating values too large to represent.
#[must_use]
pub fn duration_from_secs(seconds: f32) -> Duration {
    if seconds.is_finite() && seconds > 0.0 {
        Duration::try_from_secs_f32(seconds).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

/// Hermite smoothing of `t` clamped to `[0, 1]`: `t²(3 − 2t)`.
#[must_use]
pub fn smooth_step(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Opaque handle identifying a timer registered with a [`Scheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct PendingTimer<T> {
    handle: TimerHandle,
    due: Duration,
    payload: T,
}

/// Delay-and-notify scheduler keyed by opaque handles.
///
/// Payloads are returned from [`Scheduler::advance`] once their delay has
/// elapsed, ordered by due time and then by scheduling order.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_handle: u64,
    pending: Vec<PendingTimer<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_handle: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    /// Creates an empty scheduler whose clock starts at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `payload` to be returned once `delay` has elapsed.
    pub fn schedule_after(&mut self, delay: Duration, payload: T) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.pending.push(PendingTimer {
            handle,
            due: self.now.saturating_add(delay),
            payload,
        });
        handle
    }

    /// Cancels a pending timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.pending.iter().position(|timer| timer.handle == handle) {
            Some(index) => {
                let _ = self.pending.remove(index);
                true
            }
            None => false,
        }
    }

    /// Reports whether the timer is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|timer| timer.handle == handle)
    }

    /// Time left before the timer fires, if it is still pending.
    #[must_use]
    pub fn remaining(&self, handle: TimerHandle) -> Option<Duration> {
        self.pending
            .iter()
            .find(|timer| timer.handle == handle)
            .map(|timer| timer.due.saturating_sub(self.now))
    }

    /// Drops every pending timer without firing it.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Advances the clock by `dt` and appends the payloads of every timer that came due.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<T>) {
        self.now = self.now.saturating_add(dt);

        let mut fired = Vec::new();
        let mut index = 0;
        while index < self.pending.len() {
            if self.pending[index].due <= self.now {
                fired.push(self.pending.remove(index));
            } else {
                index += 1;
            }
        }

        fired.sort_by_key(|timer| (timer.due, timer.handle));
        out.extend(fired.into_iter().map(|timer| timer.payload));
    }
}

/// Single instruction within a [`Sequence`].
#[derive(Clone, Debug, PartialEq)]
pub enum Step<T> {
    /// Suspend the sequence for at least the given duration.
    Wait(Duration),
    /// Hand the payload back to the owner.
    Emit(T),
}

/// Ordered list of waits and emissions, built before it is started.
#[derive(Clone, Debug, PartialEq)]
pub struct Sequence<T> {
    steps: VecDeque<Step<T>>,
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self {
            steps: VecDeque::new(),
        }
    }
}

impl<T> Sequence<T> {
    /// Creates an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a wait step.
    #[must_use]
    pub fn wait(mut self, duration: Duration) -> Self {
        self.steps.push_back(Step::Wait(duration));
        self
    }

    /// Appends an emission step.
    #[must_use]
    pub fn emit(mut self, payload: T) -> Self {
        self.steps.push_back(Step::Emit(payload));
        self
    }

    /// Reports whether the sequence has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Debug)]
struct RunningSequence<T> {
    steps: VecDeque<Step<T>>,
    banked: Duration,
}

/// Holds at most one running [`Sequence`] for its owner.
///
/// Starting a sequence discards whatever was running before, so the owner can
/// never observe emissions from two overlapping sequences.
#[derive(Debug)]
pub struct SequenceSlot<T> {
    running: Option<RunningSequence<T>>,
}

impl<T> Default for SequenceSlot<T> {
    fn default() -> Self {
        Self { running: None }
    }
}

impl<T> SequenceSlot<T> {
    /// Creates an idle slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `sequence`, silently cancelling any sequence already running.
    ///
    /// Returns `true` if a previous sequence was cancelled. Leading emissions
    /// are not delivered until the next [`SequenceSlot::advance`]; owners that
    /// need them immediately advance by [`Duration::ZERO`].
    pub fn start(&mut self, sequence: Sequence<T>) -> bool {
        let replaced = self.running.is_some();
        self.running = if sequence.is_empty() {
            None
        } else {
            Some(RunningSequence {
                steps: sequence.steps,
                banked: Duration::ZERO,
            })
        };
        replaced
    }

    /// Stops the running sequence without delivering its remaining steps.
    pub fn cancel(&mut self) -> bool {
        self.running.take().is_some()
    }

    /// Reports whether a sequence is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.running.is_some()
    }

    /// Advances the running sequence by `dt`, appending every payload reached.
    ///
    /// Time left over after a wait completes is carried into the next wait.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<T>) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        running.banked = running.banked.saturating_add(dt);
        loop {
            let wait = match running.steps.front() {
                Some(Step::Wait(duration)) => Some(*duration),
                Some(Step::Emit(_)) => None,
                None => break,
            };

            match wait {
                Some(duration) if running.banked < duration => break,
                Some(duration) => {
                    running.banked -= duration;
                    let _ = running.steps.pop_front();
                }
                None => {
                    if let Some(Step::Emit(payload)) = running.steps.pop_front() {
                        out.push(payload);
                    }
                }
            }
        }

        if running.steps.is_empty() {
            self.running = None;
        }
    }
}

/// Fixed-duration interpolation clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    duration: Duration,
    elapsed: Duration,
    completed: bool,
}

impl Tween {
    /// Creates a tween that completes after `duration`.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            elapsed: Duration::ZERO,
            completed: false,
        }
    }

    /// Advances the tween. Returns `true` exactly once, on the tick it completes.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.completed {
            return false;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed >= self.duration {
            self.completed = true;
            return true;
        }
        false
    }

    /// Linear progress measured against `span` instead of the full duration.
    #[must_use]
    pub fn fraction_over(&self, span: Duration) -> f32 {
        if span.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / span.as_secs_f32()).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smooth_step_clamps_and_eases() {
        assert_eq!(smooth_step(-1.0), 0.0);
        assert_eq!(smooth_step(2.0), 1.0);
        assert!((smooth_step(0.5) - 0.5).abs() < f32::EPSILON);
        assert!(smooth_step(0.25) < 0.25);
    }

    #[test]
    fn negative_seconds_become_zero() {
        assert_eq!(duration_from_secs(-3.0), Duration::ZERO);
        assert_eq!(duration_from_secs(f32::NAN), Duration::ZERO);
        assert_eq!(duration_from_secs(0.5), Duration::from_millis(500));
    }

    #[test]
    fn oversized_seconds_saturate() {
        assert_eq!(duration_from_secs(1e20), Duration::MAX);
    }

    #[test]
    fn tween_reports_completion_once() {
        let mut tween = Tween::new(Duration::from_millis(100));
        assert!(!tween.advance(Duration::from_millis(60)));
        assert!(tween.advance(Duration::from_millis(60)));
        assert!(!tween.advance(Duration::from_millis(60)));
        assert_eq!(tween.fraction_over(Duration::from_millis(100)), 1.0);
    }

    #[test]
    fn zero_length_tween_completes_on_first_advance() {
        let mut tween = Tween::new(Duration::ZERO);
        assert!(tween.advance(Duration::ZERO));
    }

    #[test]
    fn empty_sequence_leaves_slot_idle() {
        let mut slot: SequenceSlot<u8> = SequenceSlot::new();
        assert!(!slot.start(Sequence::new()));
        assert!(!slot.is_active());
    }
}
