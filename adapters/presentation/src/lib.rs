#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation contracts for Trick or Treat adapters.
//!
//! The world never calls audio or HUD code. It describes what should be
//! heard and shown through events, and [`present`] replays those events
//! against whichever collaborators an adapter provides.

use log::{debug, info};
use trick_or_treat_core::{Event, HouseId, Panel, SoundCue};

/// Fire-and-forget sound playback.
pub trait AudioSink {
    /// Plays `cue` at `volume`. Missing assets are silently skipped.
    fn play_sound(&mut self, cue: SoundCue, volume: f32);
}

/// Heads-up display and the other screen-space collaborators.
pub trait Hud {
    /// Updates the run timer with the remaining fraction and whole seconds left.
    fn set_timer(&mut self, progress: f32, seconds_left: u32);

    /// Updates the candy counter.
    fn set_candy(&mut self, total: u32);

    /// Updates the multiplier badge.
    fn set_multiplier(&mut self, multiplier: u32);

    /// Shows or hides the approach prompt.
    fn show_prompt(&mut self, visible: bool);

    /// Shows or hides a panel.
    fn show_panel(&mut self, panel: Panel, visible: bool);

    /// Replaces the minigame instruction text.
    fn set_instruction_text(&mut self, text: &str);

    /// Switches a house's porch light.
    fn set_porch_light(&mut self, house: HouseId, lit: bool);

    /// Displays the end-of-run results.
    fn show_results(&mut self, total: u32);
}

/// Text shown while the candy-catch minigame is running.
#[must_use]
pub fn candy_progress_text(caught: u32, target: u32) -> String {
    format!("Catch the candy! {caught}/{target}")
}

/// Forwards every presentation-relevant event to the collaborators, in order.
pub fn present(events: &[Event], audio: &mut dyn AudioSink, hud: &mut dyn Hud) {
    for event in events {
        match event {
            Event::SoundRequested { cue, volume } => audio.play_sound(*cue, *volume),
            Event::TimerChanged {
                progress,
                seconds_left,
            } => hud.set_timer(*progress, *seconds_left),
            Event::CandyTotalChanged { total } => hud.set_candy(*total),
            Event::MultiplierChanged { multiplier } => hud.set_multiplier(*multiplier),
            Event::PromptVisibilityChanged { visible } => hud.show_prompt(*visible),
            Event::PanelVisibilityChanged { panel, visible } => hud.show_panel(*panel, *visible),
            Event::InstructionTextChanged { text } => hud.set_instruction_text(text),
            Event::CandyCatchProgressed { caught, target } => {
                hud.set_instruction_text(&candy_progress_text(*caught, *target));
            }
            Event::HouseAvailabilityChanged { house, available } => {
                hud.set_porch_light(*house, *available);
            }
            Event::ResultsShown { total } => hud.show_results(*total),
            _ => {}
        }
    }
}

/// Audio sink that only logs the cues it is asked to play.
#[derive(Debug, Default)]
pub struct LoggingAudio {
    played: usize,
}

impl LoggingAudio {
    /// Number of cues played so far.
    #[must_use]
    pub const fn played(&self) -> usize {
        self.played
    }
}

impl AudioSink for LoggingAudio {
    fn play_sound(&mut self, cue: SoundCue, volume: f32) {
        self.played += 1;
        debug!("sound {cue:?} at volume {volume:.2}");
    }
}

/// HUD that logs notable changes and remembers the last displayed values.
#[derive(Debug, Default)]
pub struct LoggingHud {
    seconds_left: u32,
    candy: u32,
    multiplier: u32,
    results: Option<u32>,
}

impl LoggingHud {
    /// Last whole-seconds value shown on the timer.
    #[must_use]
    pub const fn seconds_left(&self) -> u32 {
        self.seconds_left
    }

    /// Last candy total shown.
    #[must_use]
    pub const fn candy(&self) -> u32 {
        self.candy
    }

    /// Last multiplier shown.
    #[must_use]
    pub const fn multiplier(&self) -> u32 {
        self.multiplier
    }

    /// Total shown in the results window, once it has been opened.
    #[must_use]
    pub const fn results(&self) -> Option<u32> {
        self.results
    }
}

impl Hud for LoggingHud {
    fn set_timer(&mut self, _progress: f32, seconds_left: u32) {
        if seconds_left != self.seconds_left && seconds_left % 30 == 0 {
            info!("{seconds_left}s left");
        }
        self.seconds_left = seconds_left;
    }

    fn set_candy(&mut self, total: u32) {
        if total != self.candy {
            info!("candy: {total}");
        }
        self.candy = total;
    }

    fn set_multiplier(&mut self, multiplier: u32) {
        self.multiplier = multiplier;
        debug!("multiplier x{multiplier}");
    }

    fn show_prompt(&mut self, visible: bool) {
        debug!("approach prompt {}", if visible { "shown" } else { "hidden" });
    }

    fn show_panel(&mut self, panel: Panel, visible: bool) {
        debug!("{panel:?} panel {}", if visible { "shown" } else { "hidden" });
    }

    fn set_instruction_text(&mut self, text: &str) {
        debug!("instructions: {}", text.replace('\n', " | "));
    }

    fn set_porch_light(&mut self, house: HouseId, lit: bool) {
        debug!("{house} porch light {}", if lit { "on" } else { "off" });
    }

    fn show_results(&mut self, total: u32) {
        self.results = Some(total);
        info!("results: {total} candy collected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candy_progress_text_counts_up() {
        assert_eq!(candy_progress_text(2, 5), "Catch the candy! 2/5");
    }

    #[test]
    fn logging_hud_remembers_results() {
        let mut audio = LoggingAudio::default();
        let mut hud = LoggingHud::default();
        present(
            &[
                Event::SoundRequested {
                    cue: SoundCue::GameOver,
                    volume: 1.0,
                },
                Event::CandyTotalChanged { total: 12 },
                Event::ResultsShown { total: 12 },
            ],
            &mut audio,
            &mut hud,
        );
        assert_eq!(audio.played(), 1);
        assert_eq!(hud.candy(), 12);
        assert_eq!(hud.results(), Some(12));
    }
}
