#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Trick or Treat.
//!
//! The world owns the run clock, the houses and their doors, the camera rig,
//! both minigames and the physics collaborator. It is also the only place the
//! game flow lives: every command passes through [`apply`], which moves the
//! flow between its named states and reports each change as an [`Event`].
//! Because the door, the arrow minigame and the candy catch are each driven
//! from exactly one flow state, at most one of them can be active at a time.

mod camera;
mod config;
mod houses;

use std::time::Duration;

use glam::Vec2;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use trick_or_treat_core::{
    ArrowSymbol, Command, Event, GameMode, HouseId, Panel, Physics, SoundCue, WELCOME_BANNER,
};
use trick_or_treat_system_arrow_qte::{ArrowQte, InputOutcome};
use trick_or_treat_system_candy_catch::CandyCatch;
use trick_or_treat_system_door::KnockOutcome;
use trick_or_treat_system_run_score::RunScore;
use trick_or_treat_system_sequencer::{duration_from_secs, Scheduler, TimerHandle};

use camera::{keep_view_inside, CameraRig};
use houses::HouseRegistry;

pub use config::{
    default_street, CameraConfig, ConfigError, FlowConfig, HouseConfig, HouseCooldownConfig,
    PlayerConfig, SessionConfig,
};
pub use trick_or_treat_system_arrow_qte::QteConfig;
pub use trick_or_treat_system_candy_catch::{BucketConfig, CandyCatchConfig};
pub use trick_or_treat_system_door::DoorConfig;
pub use trick_or_treat_system_run_score::RunConfig;

const PANELS: [Panel; 4] = [
    Panel::DoorPov,
    Panel::ArrowQte,
    Panel::CandyCatch,
    Panel::Results,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MiniGame {
    Arrows { timeout: Option<TimerHandle> },
    CandyCatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Explore,
    EnteringPov { house: HouseId },
    AtDoor { house: HouseId },
    MiniGame { house: HouseId, game: MiniGame },
    LeavingPov { house: HouseId },
}

impl Flow {
    const fn mode(self) -> GameMode {
        match self {
            Self::Explore => GameMode::Explore,
            Self::EnteringPov { .. } | Self::AtDoor { .. } | Self::LeavingPov { .. } => {
                GameMode::DoorPov
            }
            Self::MiniGame { .. } => GameMode::MiniGame,
        }
    }

    const fn house(self) -> Option<HouseId> {
        match self {
            Self::Explore => None,
            Self::EnteringPov { house }
            | Self::AtDoor { house }
            | Self::MiniGame { house, .. }
            | Self::LeavingPov { house } => Some(house),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WorldTimer {
    HouseCooldownElapsed(HouseId),
    QteTimedOut,
}

/// Represents the authoritative Trick or Treat session state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: SessionConfig,
    rng: ChaCha8Rng,
    physics: Box<dyn Physics>,
    run: RunScore,
    flow: Flow,
    camera: CameraRig,
    houses: HouseRegistry,
    timers: Scheduler<WorldTimer>,
    qte: ArrowQte,
    candy: CandyCatch,
    player_x: f32,
    player_control: bool,
    axis: f32,
    run_held: bool,
    nearby: Option<HouseId>,
    prompt_visible: bool,
    panels: [bool; 4],
    input_frozen: bool,
    tick_index: u64,
}

impl World {
    /// Creates a world at the start of a fresh run.
    ///
    /// The configuration is expected to have passed
    /// [`SessionConfig::validate`]; `seed` drives every random draw so whole
    /// sessions replay identically.
    #[must_use]
    pub fn new(config: SessionConfig, seed: u64, physics: Box<dyn Physics>) -> Self {
        let houses = HouseRegistry::new(&config.houses, &config.door);
        let player_x = start_position(&config, &houses);
        let camera = CameraRig::new(home_position(&config, player_x), config.camera.explore_zoom);
        let nearby = houses.at(player_x);

        Self {
            banner: WELCOME_BANNER,
            rng: ChaCha8Rng::seed_from_u64(seed),
            physics,
            run: RunScore::new(&config.run),
            flow: Flow::Explore,
            camera,
            houses,
            timers: Scheduler::new(),
            qte: ArrowQte::new(config.qte.pool.clone()),
            candy: CandyCatch::new(config.candy_catch.clone()),
            player_x,
            player_control: true,
            axis: 0.0,
            run_held: false,
            nearby,
            prompt_visible: false,
            panels: [false; 4],
            input_frozen: false,
            tick_index: 0,
            config,
        }
    }

    fn player_position(&self) -> Vec2 {
        Vec2::new(self.player_x, self.config.player.y)
    }

    fn camera_home(&self) -> Vec2 {
        home_position(&self.config, self.player_x)
    }

    fn set_flow(&mut self, flow: Flow, out: &mut Vec<Event>) {
        let before = self.flow.mode();
        self.flow = flow;
        let after = flow.mode();
        if before != after {
            out.push(Event::GameModeChanged { mode: after });
        }
    }

    fn set_panel(&mut self, panel: Panel, visible: bool, out: &mut Vec<Event>) {
        let slot = &mut self.panels[panel_index(panel)];
        if *slot == visible {
            return;
        }
        *slot = visible;
        out.push(Event::PanelVisibilityChanged { panel, visible });
    }

    fn set_player_control(&mut self, enabled: bool, out: &mut Vec<Event>) {
        if self.player_control == enabled {
            return;
        }
        self.player_control = enabled;
        out.push(Event::PlayerControlChanged { enabled });
    }

    fn refresh_prompt(&mut self, out: &mut Vec<Event>) {
        let visible = self.flow == Flow::Explore
            && !self.input_frozen
            && self
                .nearby
                .and_then(|house| self.houses.get(house))
                .is_some_and(|house| house.available);
        if visible != self.prompt_visible {
            self.prompt_visible = visible;
            out.push(Event::PromptVisibilityChanged { visible });
        }
    }

    fn update_nearby(&mut self, out: &mut Vec<Event>) {
        let current = self.houses.at(self.player_x);
        if current != self.nearby {
            if let Some(house) = self.nearby {
                out.push(Event::HouseLeft { house });
            }
            if let Some(house) = current {
                out.push(Event::HouseApproached { house });
            }
            self.nearby = current;
        }
        self.refresh_prompt(out);
    }

    fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out.push(Event::TimeAdvanced { dt });

        if self.run.tick(dt, out) {
            self.end_run(out);
        }

        let mut fired = Vec::new();
        self.timers.advance(dt, &mut fired);
        for timer in fired {
            self.fire_timer(timer, out);
        }

        self.move_player(dt, out);

        if self.camera.is_transitioning() {
            if self.camera.advance(dt, out) {
                self.camera_arrived(out);
            }
        } else {
            let home = self.camera_home();
            self.camera
                .follow(home, self.config.camera.smooth_speed, dt, out);
        }

        match self.flow {
            Flow::AtDoor { house } => {
                let opened = match self.houses.get_mut(house) {
                    Some(entry) => entry.door.advance(dt, &mut self.rng, out),
                    None => false,
                };
                if opened {
                    self.door_opened(house, out);
                }
            }
            Flow::MiniGame {
                house,
                game: MiniGame::CandyCatch,
            } => {
                let outcome =
                    self.candy
                        .tick(dt, self.axis, self.physics.as_mut(), &mut self.rng, out);
                if let Some(outcome) = outcome {
                    self.finish_candy(house, outcome.caught, out);
                }
            }
            _ => {}
        }
    }

    fn move_player(&mut self, dt: Duration, out: &mut Vec<Event>) {
        if !self.player_control {
            return;
        }
        let player = &self.config.player;
        let speed = if self.run_held {
            player.speed * player.run_multiplier
        } else {
            player.speed
        };
        let x = player
            .street
            .clamp(self.player_x + self.axis * speed * dt.as_secs_f32());
        if x == self.player_x {
            return;
        }
        self.player_x = x;
        out.push(Event::PlayerMoved { x });
        self.update_nearby(out);
    }

    fn fire_timer(&mut self, timer: WorldTimer, out: &mut Vec<Event>) {
        match timer {
            WorldTimer::HouseCooldownElapsed(house) => {
                if let Some(entry) = self.houses.get_mut(house) {
                    entry.cooldown = None;
                    if !entry.available {
                        entry.available = true;
                        out.push(Event::HouseAvailabilityChanged {
                            house,
                            available: true,
                        });
                        info!("{house} has candy again");
                    }
                }
                self.refresh_prompt(out);
            }
            WorldTimer::QteTimedOut => {
                if let Flow::MiniGame {
                    house,
                    game: MiniGame::Arrows { .. },
                } = self.flow
                {
                    if self.qte.abort(out) {
                        info!("arrow sequence at {house} timed out");
                        self.qte_failed(house, out);
                    }
                }
            }
        }
    }

    fn enter_pov(&mut self, house: HouseId, out: &mut Vec<Event>) {
        if self.input_frozen {
            debug!("door view of {house} refused; input is frozen");
            return;
        }
        if self.flow != Flow::Explore {
            debug!(
                "door view of {house} refused while in {:?}",
                self.flow.mode()
            );
            return;
        }
        let Some(entry) = self.houses.get(house) else {
            warn!("{house} is not registered; cannot frame its door");
            return;
        };
        if !entry.available {
            debug!("door view of {house} refused; the house is cooling down");
            return;
        }

        let target = entry.anchor + self.config.camera.pov_offset;
        let camera = &self.config.camera;
        let (zoom, move_time, zoom_time) = (camera.pov_zoom, camera.move_time, camera.zoom_time);

        self.set_flow(Flow::EnteringPov { house }, out);
        self.refresh_prompt(out);
        self.set_player_control(false, out);
        self.camera.set_follow(false, out);
        self.camera
            .start_transition(target, zoom, move_time, zoom_time, out);
        info!("framing the door of {house}");
    }

    fn leave_pov(&mut self, house: HouseId, out: &mut Vec<Event>) {
        if let Some(entry) = self.houses.get_mut(house) {
            entry.door.reset(out);
        }
        self.set_panel(Panel::DoorPov, false, out);
        self.set_panel(Panel::ArrowQte, false, out);
        self.set_panel(Panel::CandyCatch, false, out);

        let home = self.camera_home();
        let camera = &self.config.camera;
        let (zoom, move_time, zoom_time) = (camera.explore_zoom, camera.move_time, camera.zoom_time);
        self.camera
            .start_transition(home, zoom, move_time, zoom_time, out);
        self.set_flow(Flow::LeavingPov { house }, out);
    }

    fn camera_arrived(&mut self, out: &mut Vec<Event>) {
        match self.flow {
            Flow::EnteringPov { house } => {
                self.set_flow(Flow::AtDoor { house }, out);
                self.set_panel(Panel::DoorPov, true, out);
            }
            Flow::LeavingPov { .. } => {
                self.set_flow(Flow::Explore, out);
                if !self.input_frozen {
                    self.set_player_control(true, out);
                    self.camera.set_follow(true, out);
                }
                self.refresh_prompt(out);
            }
            _ => {}
        }
    }

    fn knock(&mut self, out: &mut Vec<Event>) {
        let Flow::AtDoor { house } = self.flow else {
            debug!("knock ignored outside the door view");
            return;
        };
        let outcome = match self.houses.get_mut(house) {
            Some(entry) => entry.door.knock_and_open(&mut self.rng, out),
            None => return,
        };
        if outcome == KnockOutcome::Opened {
            self.door_opened(house, out);
        }
    }

    fn walk_away(&mut self, out: &mut Vec<Event>) {
        match self.flow {
            Flow::AtDoor { house } => {
                info!("walking away from {house}");
                self.leave_pov(house, out);
            }
            flow => debug!("walk away ignored in {:?}", flow.mode()),
        }
    }

    fn door_opened(&mut self, house: HouseId, out: &mut Vec<Event>) {
        self.set_panel(Panel::DoorPov, false, out);
        self.qte.run(self.config.qte.length, &mut self.rng, out);
        let timeout = self.config.flow.qte_time_limit.map(|seconds| {
            self.timers
                .schedule_after(duration_from_secs(seconds), WorldTimer::QteTimedOut)
        });
        self.set_panel(Panel::ArrowQte, true, out);
        self.set_flow(
            Flow::MiniGame {
                house,
                game: MiniGame::Arrows { timeout },
            },
            out,
        );
    }

    fn arrow(&mut self, symbol: ArrowSymbol, out: &mut Vec<Event>) {
        let Flow::MiniGame {
            house,
            game: MiniGame::Arrows { timeout },
        } = self.flow
        else {
            debug!("arrow {symbol:?} ignored; no arrow sequence running");
            return;
        };

        if self.qte.handle_input(symbol, out) == InputOutcome::Completed {
            if let Some(handle) = timeout {
                let _ = self.timers.cancel(handle);
            }
            self.qte_succeeded(house, out);
        }
    }

    fn qte_succeeded(&mut self, house: HouseId, out: &mut Vec<Event>) {
        self.set_panel(Panel::ArrowQte, false, out);
        let target = self.config.flow.candy_count.sample(&mut self.rng);
        let view = self.camera.view(self.config.camera.aspect);

        self.set_panel(Panel::CandyCatch, true, out);
        self.set_flow(
            Flow::MiniGame {
                house,
                game: MiniGame::CandyCatch,
            },
            out,
        );
        if let Some(outcome) = self
            .candy
            .run(target, Some(view), self.physics.as_mut(), out)
        {
            self.finish_candy(house, outcome.caught, out);
        }
    }

    fn qte_failed(&mut self, house: HouseId, out: &mut Vec<Event>) {
        self.set_panel(Panel::ArrowQte, false, out);
        if let Some(entry) = self.houses.get_mut(house) {
            entry.door.reset(out);
        }
        self.set_flow(Flow::AtDoor { house }, out);
        self.set_panel(Panel::DoorPov, true, out);
    }

    fn finish_candy(&mut self, house: HouseId, caught: u32, out: &mut Vec<Event>) {
        self.set_panel(Panel::CandyCatch, false, out);
        let awarded = self.run.add_candy(caught, out);
        out.push(Event::RewardCommitted {
            house,
            caught,
            awarded,
        });
        info!("{house} handed out {caught} candy worth {awarded}");

        if caught > 0 {
            self.start_cooldown(house, out);
        }
        self.leave_pov(house, out);
    }

    fn start_cooldown(&mut self, house: HouseId, out: &mut Vec<Event>) {
        let seconds = self.config.cooldown.range().sample(&mut self.rng);
        let Some(entry) = self.houses.get_mut(house) else {
            return;
        };
        if !entry.available {
            return;
        }

        entry.available = false;
        if let Some(previous) = entry.cooldown.take() {
            let _ = self.timers.cancel(previous);
        }
        entry.cooldown = Some(self.timers.schedule_after(
            duration_from_secs(seconds),
            WorldTimer::HouseCooldownElapsed(house),
        ));
        out.push(Event::HouseAvailabilityChanged {
            house,
            available: false,
        });
        debug!("{house} cooling down for {seconds:.0}s");
    }

    fn end_run(&mut self, out: &mut Vec<Event>) {
        out.push(Event::SoundRequested {
            cue: SoundCue::GameOver,
            volume: self.config.flow.game_over_volume,
        });
        self.input_frozen = true;
        self.axis = 0.0;
        self.set_player_control(false, out);

        match self.flow {
            Flow::MiniGame { house, game } => {
                match game {
                    MiniGame::Arrows { timeout } => {
                        let _ = self.qte.cancel();
                        if let Some(handle) = timeout {
                            let _ = self.timers.cancel(handle);
                        }
                    }
                    MiniGame::CandyCatch => {
                        let _ = self.candy.abort(self.physics.as_mut());
                    }
                }
                self.leave_pov(house, out);
            }
            Flow::EnteringPov { house } | Flow::AtDoor { house } => self.leave_pov(house, out),
            Flow::Explore | Flow::LeavingPov { .. } => {}
        }

        self.refresh_prompt(out);
        self.set_panel(Panel::Results, true, out);
        out.push(Event::ResultsShown {
            total: self.run.state().candy_total,
        });
    }

    fn reset_session(&mut self, out: &mut Vec<Event>) {
        let _ = self.qte.cancel();
        let _ = self.candy.abort(self.physics.as_mut());
        self.timers.clear();

        for house in self.houses.iter_mut() {
            house.door.reset(out);
            house.cooldown = None;
            if house.available != house.lit_at_start {
                house.available = house.lit_at_start;
                out.push(Event::HouseAvailabilityChanged {
                    house: house.id,
                    available: house.available,
                });
            }
        }
        for panel in PANELS {
            self.set_panel(panel, false, out);
        }

        self.input_frozen = false;
        self.axis = 0.0;
        self.run_held = false;
        self.player_x = start_position(&self.config, &self.houses);
        out.push(Event::PlayerMoved { x: self.player_x });

        let home = self.camera_home();
        self.camera
            .snap(home, self.config.camera.explore_zoom, out);
        self.camera.set_follow(true, out);
        self.set_flow(Flow::Explore, out);
        self.set_player_control(true, out);
        self.run.reset(out);
        self.update_nearby(out);
        info!("fresh run started");
    }
}

fn panel_index(panel: Panel) -> usize {
    match panel {
        Panel::DoorPov => 0,
        Panel::ArrowQte => 1,
        Panel::CandyCatch => 2,
        Panel::Results => 3,
    }
}

/// Where the free camera settles for a player standing at `player_x`.
fn home_position(config: &SessionConfig, player_x: f32) -> Vec2 {
    let camera = &config.camera;
    let target = Vec2::new(player_x, config.player.y) + camera.follow_offset;
    match camera.follow_bounds {
        Some(bounds) => keep_view_inside(target, camera.explore_zoom, camera.aspect, bounds),
        None => target,
    }
}

fn start_position(config: &SessionConfig, houses: &HouseRegistry) -> f32 {
    let x = match config.player.start_house {
        Some(id) => match houses.get(id) {
            Some(house) => house.trigger.center(),
            None => {
                warn!("start {id} is not registered; starting at x = {}", config.player.start_x);
                config.player.start_x
            }
        },
        None => config.player.start_x,
    };
    config.player.street.clamp(x)
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SetHorizontalAxis { value } => {
            world.axis = if value.is_finite() {
                value.clamp(-1.0, 1.0)
            } else {
                0.0
            };
            if world.input_frozen {
                world.axis = 0.0;
            }
        }
        Command::SetRunModifier { held } => world.run_held = held,
        Command::Interact => match world.nearby {
            Some(house) if world.flow == Flow::Explore => world.enter_pov(house, out_events),
            _ => debug!("interact ignored; no door within reach"),
        },
        Command::EnterDoorPov { house } => world.enter_pov(house, out_events),
        Command::Knock => world.knock(out_events),
        Command::WalkAway => world.walk_away(out_events),
        Command::Arrow { symbol } => world.arrow(symbol, out_events),
        Command::AddMultiplier { delta } => {
            let _ = world.run.add_multiplier(delta, out_events);
        }
        Command::EndRun => {
            if world.run.end_run(out_events) {
                world.end_run(out_events);
            } else {
                debug!("end of run requested twice");
            }
        }
        Command::ConfirmResults => {
            if world.run.is_running() {
                debug!("results confirmed while the run is still going");
                return;
            }
            out_events.push(Event::SceneResetRequested);
            world.reset_session(out_events);
        }
        Command::ResetRun => world.reset_session(out_events),
    }
}

/// Emits the events an adapter needs to draw the world from scratch.
pub fn announce(world: &mut World, out_events: &mut Vec<Event>) {
    out_events.push(Event::GameModeChanged {
        mode: world.flow.mode(),
    });
    world.run.publish(out_events);
    for house in world.houses.iter() {
        out_events.push(Event::HouseAvailabilityChanged {
            house: house.id,
            available: house.available,
        });
    }
    out_events.push(Event::PlayerMoved { x: world.player_x });
    out_events.push(Event::CameraMoved {
        position: world.camera.position(),
        zoom: world.camera.zoom(),
    });
    if let Some(house) = world.nearby {
        out_events.push(Event::HouseApproached { house });
    }
    world.refresh_prompt(out_events);
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec2;
    use trick_or_treat_core::{
        ArrowSymbol, Availability, BodyId, Bounds, CandyId, DoorPhase, FloatRange, GameMode,
        HouseId, Panel, RunState,
    };

    use super::{houses::House, panel_index, SessionConfig, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Configuration the world was built with.
    #[must_use]
    pub fn config(world: &World) -> &SessionConfig {
        &world.config
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Mode of the game flow.
    #[must_use]
    pub fn mode(world: &World) -> GameMode {
        world.flow.mode()
    }

    /// House whose door is framed, entered or being left, if any.
    #[must_use]
    pub fn focused_house(world: &World) -> Option<HouseId> {
        world.flow.house()
    }

    /// Run clock and score.
    #[must_use]
    pub fn run_state(world: &World) -> RunState {
        world.run.state()
    }

    /// Whether the run ended and player input is frozen.
    #[must_use]
    pub fn input_frozen(world: &World) -> bool {
        world.input_frozen
    }

    /// Whether the approach prompt is showing.
    #[must_use]
    pub fn prompt_visible(world: &World) -> bool {
        world.prompt_visible
    }

    /// Whether `panel` is showing.
    #[must_use]
    pub fn panel_visible(world: &World, panel: Panel) -> bool {
        world.panels[panel_index(panel)]
    }

    /// Captures the player's state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player_position(),
            control_enabled: world.player_control,
            nearby: world.nearby,
        }
    }

    /// Captures the camera's state.
    #[must_use]
    pub fn camera(world: &World) -> CameraSnapshot {
        CameraSnapshot {
            position: world.camera.position(),
            zoom: world.camera.zoom(),
            following: world.camera.is_following(),
            transitioning: world.camera.is_transitioning(),
        }
    }

    /// Captures every house in identifier order.
    #[must_use]
    pub fn houses(world: &World) -> Vec<HouseSnapshot> {
        world
            .houses
            .iter()
            .map(|house| snapshot(world, house))
            .collect()
    }

    /// Captures a single house.
    #[must_use]
    pub fn house(world: &World, id: HouseId) -> Option<HouseSnapshot> {
        world.houses.get(id).map(|house| snapshot(world, house))
    }

    /// Captures the running arrow sequence.
    #[must_use]
    pub fn qte(world: &World) -> Option<QteSnapshot> {
        if !world.qte.is_active() {
            return None;
        }
        Some(QteSnapshot {
            sequence: world.qte.sequence().to_vec(),
            matched: world.qte.cursor(),
        })
    }

    /// Captures the running candy-catch round.
    #[must_use]
    pub fn candy_catch(world: &World) -> Option<CandyCatchSnapshot> {
        let area = world.candy.area()?;
        let bucket = world.candy.bucket_position()?;
        let candies = world
            .candy
            .live_candies()
            .filter_map(|candy| {
                world
                    .physics
                    .position(BodyId::Candy(candy))
                    .map(|position| (candy, position))
            })
            .collect();
        Some(CandyCatchSnapshot {
            area,
            bucket,
            caught: world.candy.caught(),
            spawned: world.candy.spawned(),
            target: world.candy.target(),
            candies,
        })
    }

    fn snapshot(world: &World, house: &House) -> HouseSnapshot {
        let availability = if house.available {
            Availability::Available
        } else {
            Availability::CoolingDown {
                remaining: house
                    .cooldown
                    .and_then(|handle| world.timers.remaining(handle))
                    .unwrap_or_default(),
            }
        };
        HouseSnapshot {
            id: house.id,
            door_anchor: house.anchor,
            trigger: house.trigger,
            availability,
            door: house.door.phase(),
            silhouette: house.door.silhouette().map(str::to_owned),
        }
    }

    /// Read-only snapshot of the player.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct PlayerSnapshot {
        /// Position on the street.
        pub position: Vec2,
        /// Whether walking input is accepted.
        pub control_enabled: bool,
        /// House whose trigger the player stands in.
        pub nearby: Option<HouseId>,
    }

    /// Read-only snapshot of the camera.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct CameraSnapshot {
        /// Camera centre.
        pub position: Vec2,
        /// Orthographic size.
        pub zoom: f32,
        /// Whether free follow is enabled.
        pub following: bool,
        /// Whether a door transition is in flight.
        pub transitioning: bool,
    }

    /// Read-only snapshot of a house.
    #[derive(Clone, Debug, PartialEq)]
    pub struct HouseSnapshot {
        /// House identifier.
        pub id: HouseId,
        /// Point framed by the door view.
        pub door_anchor: Vec2,
        /// Stretch of street the house can be approached from.
        pub trigger: FloatRange,
        /// Reward availability.
        pub availability: Availability,
        /// Door lifecycle phase.
        pub door: DoorPhase,
        /// Silhouette visible in the open door.
        pub silhouette: Option<String>,
    }

    /// Read-only snapshot of the arrow minigame.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct QteSnapshot {
        /// Symbols to enter, in order.
        pub sequence: Vec<ArrowSymbol>,
        /// Length of the matched prefix.
        pub matched: usize,
    }

    /// Read-only snapshot of the candy-catch minigame.
    #[derive(Clone, Debug, PartialEq)]
    pub struct CandyCatchSnapshot {
        /// Play area of the round.
        pub area: Bounds,
        /// Bucket centre.
        pub bucket: Vec2,
        /// Candies caught so far.
        pub caught: u32,
        /// Candies spawned so far.
        pub spawned: u32,
        /// Candies the round drops in total.
        pub target: u32,
        /// Live candies and their positions, in spawn order.
        pub candies: Vec<(CandyId, Vec2)>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trick_or_treat_core::{BodyDesc, BodyId, Overlap};

    #[derive(Debug)]
    struct InertPhysics;

    impl Physics for InertPhysics {
        fn spawn_body(&mut self, _body: BodyId, _desc: BodyDesc) {}
        fn despawn_body(&mut self, _body: BodyId) {}
        fn set_position(&mut self, _body: BodyId, _position: Vec2) {}
        fn apply_impulse(&mut self, _body: BodyId, _impulse: Vec2) {}
        fn set_angular_velocity(&mut self, _body: BodyId, _degrees_per_second: f32) {}
        fn position(&self, _body: BodyId) -> Option<Vec2> {
            None
        }
        fn step(&mut self, _dt: Duration, _overlaps: &mut Vec<Overlap>) {}
    }

    fn world() -> World {
        World::new(SessionConfig::default(), 1, Box::new(InertPhysics))
    }

    #[test]
    fn flow_modes_group_the_door_states() {
        let house = HouseId::new(1);
        assert_eq!(Flow::EnteringPov { house }.mode(), GameMode::DoorPov);
        assert_eq!(Flow::LeavingPov { house }.mode(), GameMode::DoorPov);
        assert_eq!(
            Flow::MiniGame {
                house,
                game: MiniGame::CandyCatch
            }
            .mode(),
            GameMode::MiniGame
        );
        assert_eq!(Flow::Explore.house(), None);
    }

    #[test]
    fn panels_only_report_changes() {
        let mut world = world();
        let mut events = Vec::new();
        world.set_panel(Panel::Results, true, &mut events);
        world.set_panel(Panel::Results, true, &mut events);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn start_house_places_the_player_at_its_trigger() {
        let mut config = SessionConfig::default();
        config.player.start_house = Some(HouseId::new(2));
        let world = World::new(config, 3, Box::new(InertPhysics));
        assert_eq!(world.player_x, 18.0);
        assert_eq!(world.nearby, Some(HouseId::new(2)));
    }

    #[test]
    fn announce_shows_the_prompt_when_starting_at_a_house() {
        let mut config = SessionConfig::default();
        config.player.start_house = Some(HouseId::new(1));
        let mut world = World::new(config, 3, Box::new(InertPhysics));
        let mut events = Vec::new();
        announce(&mut world, &mut events);
        assert!(events.contains(&Event::PromptVisibilityChanged { visible: true }));
    }
}
