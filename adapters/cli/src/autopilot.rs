//! Scripted player used to drive headless runs.

use log::debug;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use trick_or_treat_core::{ArrowSymbol, Command, DoorPhase, GameMode, Panel};
use trick_or_treat_world::{query, World};

/// Horizontal distance treated as "close enough" when steering.
const DEADBAND: f32 = 0.05;
/// Distance to the next house beyond which the autopilot runs.
const RUN_DISTANCE: f32 = 6.0;
/// Axis deflection per unit of bucket offset.
const STEER_GAIN: f32 = 2.0;

/// Decides which commands a player would issue before each tick.
#[derive(Debug)]
pub(crate) struct Autopilot {
    rng: ChaCha8Rng,
    accuracy: f64,
    axis: f32,
    running: bool,
}

impl Autopilot {
    /// Creates an autopilot that types each arrow correctly with probability `accuracy`.
    pub(crate) fn new(accuracy: f64, seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            accuracy: accuracy.clamp(0.0, 1.0),
            axis: 0.0,
            running: false,
        }
    }

    /// Commands for the upcoming tick.
    pub(crate) fn decide(&mut self, world: &World) -> Vec<Command> {
        let mut commands = Vec::new();
        if query::input_frozen(world) {
            return commands;
        }

        match query::mode(world) {
            GameMode::Explore => self.explore(world, &mut commands),
            GameMode::DoorPov => self.at_door(world, &mut commands),
            GameMode::MiniGame => self.minigame(world, &mut commands),
        }
        commands
    }

    fn explore(&mut self, world: &World, commands: &mut Vec<Command>) {
        if query::prompt_visible(world) {
            self.steer(0.0, commands);
            commands.push(Command::Interact);
            return;
        }

        let x = query::player(world).position.x;
        let target = query::houses(world)
            .into_iter()
            .filter(|house| house.availability.is_available())
            .map(|house| house.trigger.center())
            .min_by(|a, b| (a - x).abs().total_cmp(&(b - x).abs()));

        match target {
            Some(target) => {
                let offset = target - x;
                self.set_running(offset.abs() > RUN_DISTANCE, commands);
                self.steer(direction(offset), commands);
            }
            None => {
                self.set_running(false, commands);
                self.steer(0.0, commands);
            }
        }
    }

    fn at_door(&mut self, world: &World, commands: &mut Vec<Command>) {
        self.steer(0.0, commands);
        if !query::panel_visible(world, Panel::DoorPov) {
            return;
        }
        let closed = query::focused_house(world)
            .and_then(|house| query::house(world, house))
            .is_some_and(|house| house.door == DoorPhase::Closed);
        if closed {
            commands.push(Command::Knock);
        }
    }

    fn minigame(&mut self, world: &World, commands: &mut Vec<Command>) {
        if let Some(qte) = query::qte(world) {
            let Some(&expected) = qte.sequence.get(qte.matched) else {
                return;
            };
            let symbol = if self.rng.gen_bool(self.accuracy) {
                expected
            } else {
                let wrong: Vec<ArrowSymbol> = ArrowSymbol::ALL
                    .into_iter()
                    .filter(|symbol| *symbol != expected)
                    .collect();
                let typo = wrong.choose(&mut self.rng).copied().unwrap_or(expected);
                debug!("autopilot mistyped {expected:?} as {typo:?}");
                typo
            };
            commands.push(Command::Arrow { symbol });
            return;
        }

        if let Some(catch) = query::candy_catch(world) {
            let target = catch
                .candies
                .iter()
                .map(|(_, position)| *position)
                .min_by(|a, b| a.y.total_cmp(&b.y))
                .map_or(catch.area.center_x(), |position| position.x);
            let offset = target - catch.bucket.x;
            let axis = if offset.abs() < DEADBAND {
                0.0
            } else {
                (offset * STEER_GAIN).clamp(-1.0, 1.0)
            };
            self.steer(axis, commands);
        }
    }

    fn steer(&mut self, axis: f32, commands: &mut Vec<Command>) {
        if axis != self.axis {
            self.axis = axis;
            commands.push(Command::SetHorizontalAxis { value: axis });
        }
    }

    fn set_running(&mut self, held: bool, commands: &mut Vec<Command>) {
        if held != self.running {
            self.running = held;
            commands.push(Command::SetRunModifier { held });
        }
    }
}

fn direction(offset: f32) -> f32 {
    if offset.abs() < DEADBAND {
        0.0
    } else {
        offset.signum()
    }
}
