#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Door sequencer driving a single door through knock, open and reveal.

use std::time::Duration;

use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use trick_or_treat_core::{DoorPhase, Event, HouseId, SoundCue};
use trick_or_treat_system_sequencer::{duration_from_secs, Sequence, SequenceSlot};

/// Timing and content of a door's knock-and-open sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorConfig {
    /// Number of knock cues played before the door opens.
    pub knock_count: u32,
    /// Seconds after each knock cue.
    pub knock_delay: f32,
    /// Extra anticipation seconds between the last knock and the door opening.
    pub open_delay: f32,
    /// Volume used for knock and door cues.
    pub volume: f32,
    /// Two silhouette asset keys; either slot may be left unassigned.
    pub silhouettes: [Option<String>; 2],
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            knock_count: 2,
            knock_delay: 0.2,
            open_delay: 0.6,
            volume: 1.0,
            silhouettes: [
                Some("silhouette_witch".to_owned()),
                Some("silhouette_vampire".to_owned()),
            ],
        }
    }
}

/// Result of asking a door to knock and open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KnockOutcome {
    /// A sequence is already in flight or the door is open; nothing changed.
    Ignored,
    /// The knock sequence started.
    Started,
    /// Every delay was zero, so the door opened immediately.
    Opened,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DoorCue {
    Knock(u32),
    Anticipate,
    Open,
}

/// Owns one door's lifecycle: `Closed → Knocking → Opening → Open → Closed`.
#[derive(Debug)]
pub struct DoorSequencer {
    house: HouseId,
    config: DoorConfig,
    phase: DoorPhase,
    sequence: SequenceSlot<DoorCue>,
    silhouette: Option<String>,
}

impl DoorSequencer {
    /// Creates a closed door belonging to `house`.
    #[must_use]
    pub fn new(house: HouseId, config: DoorConfig) -> Self {
        Self {
            house,
            config,
            phase: DoorPhase::Closed,
            sequence: SequenceSlot::new(),
            silhouette: None,
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> DoorPhase {
        self.phase
    }

    /// Silhouette revealed by the last opening, if the door is open.
    #[must_use]
    pub fn silhouette(&self) -> Option<&str> {
        self.silhouette.as_deref()
    }

    /// Plays the knock cues, waits out the anticipation delay and opens the door.
    ///
    /// Only a closed door reacts; while a sequence is in flight or the door is
    /// already open the call is ignored, so a single opening is reported no
    /// matter how often the player knocks.
    pub fn knock_and_open<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) -> KnockOutcome {
        if self.phase != DoorPhase::Closed {
            debug!("{} ignored knock while {:?}", self.house, self.phase);
            return KnockOutcome::Ignored;
        }

        let knock_delay = duration_from_secs(self.config.knock_delay);
        let mut sequence = Sequence::new();
        for knock in 0..self.config.knock_count {
            sequence = sequence.emit(DoorCue::Knock(knock)).wait(knock_delay);
        }
        sequence = sequence
            .emit(DoorCue::Anticipate)
            .wait(duration_from_secs(self.config.open_delay))
            .emit(DoorCue::Open);

        let _ = self.sequence.start(sequence);
        self.set_phase(DoorPhase::Knocking, out);

        if self.pump(Duration::ZERO, rng, out) {
            KnockOutcome::Opened
        } else {
            KnockOutcome::Started
        }
    }

    /// Advances the in-flight sequence. Returns `true` on the tick the door opens.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        dt: Duration,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) -> bool {
        if !self.sequence.is_active() {
            return false;
        }
        self.pump(dt, rng, out)
    }

    /// Cancels any in-flight sequence and forces the door closed, clearing its visuals.
    pub fn reset(&mut self, out: &mut Vec<Event>) {
        let cancelled = self.sequence.cancel();
        if self.phase == DoorPhase::Closed && !cancelled {
            return;
        }

        if self.phase == DoorPhase::Open {
            out.push(Event::SoundRequested {
                cue: SoundCue::DoorClose,
                volume: self.config.volume,
            });
        }
        self.silhouette = None;
        self.set_phase(DoorPhase::Closed, out);
        out.push(Event::DoorReset { house: self.house });
    }

    fn pump<R: Rng + ?Sized>(&mut self, dt: Duration, rng: &mut R, out: &mut Vec<Event>) -> bool {
        let mut cues = Vec::new();
        self.sequence.advance(dt, &mut cues);

        let mut opened = false;
        for cue in cues {
            match cue {
                DoorCue::Knock(knock) => {
                    out.push(Event::SoundRequested {
                        cue: SoundCue::Knock,
                        volume: self.config.volume,
                    });
                    out.push(Event::DoorKnocked {
                        house: self.house,
                        knock,
                    });
                }
                DoorCue::Anticipate => self.set_phase(DoorPhase::Opening, out),
                DoorCue::Open => {
                    self.open(rng, out);
                    opened = true;
                }
            }
        }
        opened
    }

    fn open<R: Rng + ?Sized>(&mut self, rng: &mut R, out: &mut Vec<Event>) {
        self.silhouette = self.pick_silhouette(rng);
        self.set_phase(DoorPhase::Open, out);
        out.push(Event::SoundRequested {
            cue: SoundCue::DoorOpen,
            volume: self.config.volume,
        });
        out.push(Event::DoorOpened {
            house: self.house,
            silhouette: self.silhouette.clone(),
        });
        info!("{} door opened", self.house);
    }

    fn pick_silhouette<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        let [first, second] = &self.config.silhouettes;
        let (preferred, fallback) = if rng.gen_bool(0.5) {
            (first, second)
        } else {
            (second, first)
        };

        let picked = preferred.as_ref().or(fallback.as_ref()).cloned();
        if picked.is_none() {
            warn!("{} has no silhouette assigned; opening without one", self.house);
        }
        picked
    }

    fn set_phase(&mut self, phase: DoorPhase, out: &mut Vec<Event>) {
        if self.phase == phase {
            return;
        }
        self.phase = phase;
        out.push(Event::DoorPhaseChanged {
            house: self.house,
            phase,
        });
    }
}
