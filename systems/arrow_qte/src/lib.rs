#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Arrow sequence reaction minigame.
//!
//! A fresh sequence is drawn per run. Each discrete key press either extends
//! the matched prefix or, on any mismatch, sends the cursor back to the start.
//! The engine has no clock of its own; callers that want a time limit call
//! [`ArrowQte::abort`] when it expires.

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use trick_or_treat_core::{ArrowSymbol, Event};

/// Symbols drawn from when no pool is configured. `Down` is left out.
pub const DEFAULT_POOL: [ArrowSymbol; 3] = [ArrowSymbol::Left, ArrowSymbol::Up, ArrowSymbol::Right];

/// Tunables for the arrow minigame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QteConfig {
    /// Number of symbols per sequence; zero is treated as one.
    pub length: u32,
    /// Symbols the sequence is drawn from, uniformly.
    pub pool: Vec<ArrowSymbol>,
}

impl Default for QteConfig {
    fn default() -> Self {
        Self {
            length: 3,
            pool: DEFAULT_POOL.to_vec(),
        }
    }
}

/// Effect of a single key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputOutcome {
    /// No sequence is running.
    Ignored,
    /// The press matched; `matched` symbols are now entered.
    Advanced {
        /// Length of the matched prefix after the press.
        matched: u32,
    },
    /// The press did not match and progress went back to zero.
    Reset,
    /// The press completed the sequence.
    Completed,
}

/// Input-matching state machine for the arrow minigame.
#[derive(Debug)]
pub struct ArrowQte {
    pool: Vec<ArrowSymbol>,
    sequence: Vec<ArrowSymbol>,
    cursor: usize,
    active: bool,
}

impl Default for ArrowQte {
    fn default() -> Self {
        Self::new(DEFAULT_POOL.to_vec())
    }
}

impl ArrowQte {
    /// Creates an idle engine drawing from `pool`. An empty pool falls back to [`DEFAULT_POOL`].
    #[must_use]
    pub fn new(pool: Vec<ArrowSymbol>) -> Self {
        let pool = if pool.is_empty() {
            warn!("arrow minigame configured with an empty symbol pool; using the default pool");
            DEFAULT_POOL.to_vec()
        } else {
            pool
        };

        Self {
            pool,
            sequence: Vec::new(),
            cursor: 0,
            active: false,
        }
    }

    /// Generates a new sequence of `length` symbols and starts accepting input.
    ///
    /// A zero length is clamped to one. Starting while a previous sequence is
    /// running replaces it without reporting a completion for the old one.
    pub fn run<R: Rng + ?Sized>(&mut self, length: u32, rng: &mut R, out: &mut Vec<Event>) {
        let length = length.max(1) as usize;
        self.sequence = (0..length)
            .map(|_| self.pool[rng.gen_range(0..self.pool.len())])
            .collect();
        self.cursor = 0;
        self.active = true;

        out.push(Event::QteStarted {
            sequence: self.sequence.clone(),
        });
        self.report_progress(out);
    }

    /// Feeds one discrete key press into the engine.
    pub fn handle_input(&mut self, symbol: ArrowSymbol, out: &mut Vec<Event>) -> InputOutcome {
        if !self.active {
            debug!("arrow {symbol:?} ignored; no sequence running");
            return InputOutcome::Ignored;
        }

        if self.sequence.get(self.cursor) != Some(&symbol) {
            self.cursor = 0;
            self.report_progress(out);
            return InputOutcome::Reset;
        }

        self.cursor += 1;
        self.report_progress(out);

        if self.cursor >= self.sequence.len() {
            self.active = false;
            out.push(Event::QteCompleted { success: true });
            return InputOutcome::Completed;
        }

        InputOutcome::Advanced {
            matched: self.cursor as u32,
        }
    }

    /// Ends a running sequence as a failure. Returns `false` if nothing was running.
    pub fn abort(&mut self, out: &mut Vec<Event>) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        out.push(Event::QteCompleted { success: false });
        true
    }

    /// Stops a running sequence without reporting any completion.
    pub fn cancel(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }

    /// Reports whether input is being accepted.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Symbols of the current or last sequence.
    #[must_use]
    pub fn sequence(&self) -> &[ArrowSymbol] {
        &self.sequence
    }

    /// Length of the matched prefix.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Instruction text describing the sequence and the progress through it.
    #[must_use]
    pub fn instruction_text(&self) -> String {
        let words: Vec<&str> = self.sequence.iter().map(|symbol| symbol.word()).collect();
        format!(
            "Press {} to say trick-or-treat!\nProgress: {}/{}",
            words.join(", "),
            self.cursor,
            self.sequence.len()
        )
    }

    fn report_progress(&self, out: &mut Vec<Event>) {
        out.push(Event::QteProgressed {
            matched: self.cursor as u32,
            length: self.sequence.len() as u32,
        });
        out.push(Event::InstructionTextChanged {
            text: self.instruction_text(),
        });
    }
}
