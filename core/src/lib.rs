#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Trick or Treat engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the stateful systems it owns. Adapters submit
//! [`Command`] values describing player intent or the passage of time, the
//! world executes those commands via its `apply` entry point, and then
//! broadcasts [`Event`] values describing every state change and every call
//! the presentation collaborators (audio, HUD) should observe. Physics is the
//! one collaborator the world calls directly, through the narrow [`Physics`]
//! trait.

use std::{fmt, time::Duration};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Trick or treat! Knock on every lit door before the night runs out.";

/// Top-level mode of the game flow state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Free walking along the street with the camera following the player.
    Explore,
    /// Camera is framed on a door; the player chooses to knock or walk away.
    DoorPov,
    /// One of the door minigames owns the input.
    MiniGame,
}

/// Unique identifier assigned to a house on the street.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HouseId(u32);

impl HouseId {
    /// Creates a new house identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for HouseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "house #{}", self.0)
    }
}

/// Unique identifier assigned to a falling candy entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandyId(u32);

impl CandyId {
    /// Creates a new candy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Directional symbol used by the arrow reaction minigame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrowSymbol {
    /// Left arrow key.
    Left,
    /// Up arrow key.
    Up,
    /// Right arrow key.
    Right,
    /// Down arrow key.
    Down,
}

impl ArrowSymbol {
    /// Every symbol the input collaborator can report.
    pub const ALL: [ArrowSymbol; 4] = [Self::Left, Self::Up, Self::Right, Self::Down];

    /// Upper-case word used when spelling a sequence out to the player.
    #[must_use]
    pub const fn word(self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Up => "UP",
            Self::Right => "RIGHT",
            Self::Down => "DOWN",
        }
    }
}

/// Lifecycle phase of a single door.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DoorPhase {
    /// Door is shut and idle.
    Closed,
    /// Knock cues are playing.
    Knocking,
    /// Knocking finished; waiting out the anticipation delay.
    Opening,
    /// Door is open and the silhouette is visible.
    Open,
}

/// Sound cues the audio collaborator knows how to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// A single knock on a door.
    Knock,
    /// Door swinging open.
    DoorOpen,
    /// Door closing again.
    DoorClose,
    /// Candy landing in the bucket.
    Candy,
    /// Generic UI click.
    Click,
    /// End of the run.
    GameOver,
}

/// Panels the HUD collaborator can show or hide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Panel {
    /// Knock / walk-away choice shown while framed on a door.
    DoorPov,
    /// Arrow sequence instructions.
    ArrowQte,
    /// Candy catching progress.
    CandyCatch,
    /// End of run results window.
    Results,
}

/// Reason a candy left play without being caught.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LossReason {
    /// Fell below the cleanup line.
    BelowCleanupLine,
    /// Drifted beyond the lateral or vertical margins around the play area.
    OutsideArea,
    /// Still falling when the fail-safe timeout forced completion.
    TimedOut,
}

/// Reward availability of a house, as reported by world queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability {
    /// Porch light is on; knocking can yield candy.
    Available,
    /// Candy was recently claimed; the house reopens after `remaining`.
    CoolingDown {
        /// Time left until the house becomes available again.
        remaining: Duration,
    },
}

impl Availability {
    /// Reports whether the house currently offers candy.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Closed interval of floating point values used by configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    /// Lower bound of the interval.
    pub min: f32,
    /// Upper bound of the interval.
    pub max: f32,
}

impl FloatRange {
    /// Creates a new range; the bounds may be given in either order.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns the bounds ordered so that the first is not greater than the second.
    #[must_use]
    pub fn ordered(&self) -> (f32, f32) {
        if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        }
    }

    /// Reports whether `value` lies inside the interval.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        let (lo, hi) = self.ordered();
        value >= lo && value <= hi
    }

    /// Clamps `value` into the interval. A bound that is not a number leaves `value` as is.
    #[must_use]
    pub fn clamp(&self, value: f32) -> f32 {
        let (lo, hi) = self.ordered();
        if lo <= hi {
            value.clamp(lo, hi)
        } else {
            value
        }
    }

    /// Midpoint of the interval.
    #[must_use]
    pub fn center(&self) -> f32 {
        (self.min + self.max) * 0.5
    }

    /// Draws a value uniformly from the interval.
    ///
    /// Degenerate intervals, including ones with a non-finite bound or
    /// width, yield their lower bound.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let (lo, hi) = self.ordered();
        let width = hi - lo;
        if !(width.is_finite() && width > f32::EPSILON) {
            return lo;
        }
        rng.gen_range(lo..hi)
    }
}

/// Closed interval of counts used by configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    /// Smallest count that may be drawn.
    pub min: u32,
    /// Largest count that may be drawn.
    pub max: u32,
}

impl CountRange {
    /// Creates a new range; the bounds may be given in either order.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Draws a count uniformly from the interval, bounds inclusive.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        rng.gen_range(lo..=hi)
    }
}

/// Axis-aligned rectangle expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Lower-left corner.
    pub min: Vec2,
    /// Upper-right corner.
    pub max: Vec2,
}

impl Bounds {
    /// Creates a rectangle from two corners.
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Horizontal centre of the rectangle.
    #[must_use]
    pub fn center_x(&self) -> f32 {
        (self.min.x + self.max.x) * 0.5
    }

    /// Clamps a horizontal coordinate into the rectangle.
    #[must_use]
    pub fn clamp_x(&self, x: f32) -> f32 {
        if self.min.x <= self.max.x {
            x.clamp(self.min.x, self.max.x)
        } else {
            self.center_x()
        }
    }

    /// Reports whether `point` lies outside the rectangle grown by the margins.
    #[must_use]
    pub fn is_outside(&self, point: Vec2, lateral_margin: f32, vertical_margin: f32) -> bool {
        point.x < self.min.x - lateral_margin
            || point.x > self.max.x + lateral_margin
            || point.y < self.min.y - vertical_margin
            || point.y > self.max.y + vertical_margin
    }
}

/// Inset applied to each edge of a view when deriving a play area.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    /// Inset from the left edge.
    pub left: f32,
    /// Inset from the right edge.
    pub right: f32,
    /// Inset from the top edge.
    pub top: f32,
    /// Inset from the bottom edge.
    pub bottom: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 0.5,
            right: 0.5,
            top: 0.8,
            bottom: 1.0,
        }
    }
}

/// Visible region of an orthographic camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBounds {
    /// Camera centre in world units.
    pub center: Vec2,
    /// Half of the visible height (orthographic size).
    pub half_height: f32,
    /// Width divided by height.
    pub aspect: f32,
}

impl ViewBounds {
    /// Derives the rectangle left after insetting the visible region by `margins`.
    #[must_use]
    pub fn inset(&self, margins: Margins) -> Bounds {
        let half_width = self.half_height * self.aspect;
        Bounds::new(
            Vec2::new(
                self.center.x - half_width + margins.left,
                self.center.y - self.half_height + margins.bottom,
            ),
            Vec2::new(
                self.center.x + half_width - margins.right,
                self.center.y + self.half_height - margins.top,
            ),
        )
    }
}

/// Snapshot of the run clock and score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunState {
    /// Time elapsed since the run started.
    pub elapsed: Duration,
    /// Time left before the run ends.
    pub remaining: Duration,
    /// Candy collected so far, multipliers already applied.
    pub candy_total: u32,
    /// Current reward multiplier; never below one.
    pub multiplier: u32,
    /// Whether the countdown is still running.
    pub is_running: bool,
}

/// Physics body addressed by the candy-catch simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BodyId {
    /// The single bucket collecting candy.
    Bucket,
    /// A falling candy.
    Candy(CandyId),
}

/// How the physics collaborator integrates a body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    /// Affected by gravity and impulses.
    Dynamic,
    /// Positioned explicitly by the simulation each tick.
    Kinematic,
}

/// Initial description of a physics body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyDesc {
    /// Integration mode.
    pub kind: BodyKind,
    /// Initial centre position.
    pub position: Vec2,
    /// Half extents of the axis-aligned overlap box.
    pub half_extents: Vec2,
    /// Initial tilt in degrees.
    pub rotation_degrees: f32,
    /// Multiplier applied to world gravity.
    pub gravity_scale: f32,
}

/// Pair of bodies that started overlapping during a physics step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Overlap {
    /// First body of the pair.
    pub first: BodyId,
    /// Second body of the pair.
    pub second: BodyId,
}

impl Overlap {
    /// Returns the partner of `body` if the pair involves it.
    #[must_use]
    pub fn partner_of(&self, body: BodyId) -> Option<BodyId> {
        if self.first == body {
            Some(self.second)
        } else if self.second == body {
            Some(self.first)
        } else {
            None
        }
    }
}

/// Narrow interface onto the external 2D physics step.
///
/// The simulation issues spawn, impulse and velocity commands, reads back
/// positions, and consumes overlap-begin events. It never inspects the
/// integrator's internals.
pub trait Physics: fmt::Debug {
    /// Creates a body; an existing body with the same id is replaced.
    fn spawn_body(&mut self, body: BodyId, desc: BodyDesc);

    /// Removes a body. Unknown ids are ignored.
    fn despawn_body(&mut self, body: BodyId);

    /// Teleports a body, typically a kinematic one.
    fn set_position(&mut self, body: BodyId, position: Vec2);

    /// Applies an instantaneous change of momentum.
    fn apply_impulse(&mut self, body: BodyId, impulse: Vec2);

    /// Sets the spin of a body in degrees per second.
    fn set_angular_velocity(&mut self, body: BodyId, degrees_per_second: f32);

    /// Current centre of a body, if it exists.
    fn position(&self, body: BodyId) -> Option<Vec2>;

    /// Advances the integrator and appends overlaps that began during the step.
    fn step(&mut self, dt: Duration, overlaps: &mut Vec<Overlap>);
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Reports the continuous horizontal input axis in `[-1, 1]`.
    SetHorizontalAxis {
        /// Axis value; out-of-range values are clamped.
        value: f32,
    },
    /// Reports whether the run modifier is held.
    SetRunModifier {
        /// Held state of the modifier.
        held: bool,
    },
    /// Interact button pressed; enters the door of the house the player stands at.
    Interact,
    /// Requests the camera to frame the door of a specific house.
    EnterDoorPov {
        /// House whose door should be framed.
        house: HouseId,
    },
    /// Knock on the currently framed door.
    Knock,
    /// Leave the currently framed door.
    WalkAway,
    /// Discrete directional key press.
    Arrow {
        /// Direction that was pressed.
        symbol: ArrowSymbol,
    },
    /// Adjusts the reward multiplier.
    AddMultiplier {
        /// Signed change; the multiplier never drops below one.
        delta: i32,
    },
    /// Ends the run immediately.
    EndRun,
    /// Acknowledges the results window, requesting a fresh run.
    ConfirmResults,
    /// Discards the current run and starts a fresh one.
    ResetRun,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the game flow entered a new mode.
    GameModeChanged {
        /// Mode that became active.
        mode: GameMode,
    },
    /// Asks the audio collaborator to play a cue.
    SoundRequested {
        /// Cue to play.
        cue: SoundCue,
        /// Playback volume in `[0, 1]`.
        volume: f32,
    },
    /// Run countdown changed.
    TimerChanged {
        /// Remaining time divided by run length, in `[0, 1]`.
        progress: f32,
        /// Whole seconds left, rounded up.
        seconds_left: u32,
    },
    /// Candy total changed.
    CandyTotalChanged {
        /// New total.
        total: u32,
    },
    /// Reward multiplier changed.
    MultiplierChanged {
        /// New multiplier.
        multiplier: u32,
    },
    /// The approach prompt should be shown or hidden. Activating it maps to [`Command::Interact`].
    PromptVisibilityChanged {
        /// Whether the prompt is visible.
        visible: bool,
    },
    /// A HUD panel should be shown or hidden.
    PanelVisibilityChanged {
        /// Panel concerned.
        panel: Panel,
        /// Whether the panel is visible.
        visible: bool,
    },
    /// Instruction text shown by the active minigame changed.
    InstructionTextChanged {
        /// Full text to display.
        text: String,
    },
    /// Player movement was enabled or frozen.
    PlayerControlChanged {
        /// Whether the player can move.
        enabled: bool,
    },
    /// Player walked to a new position on the street.
    PlayerMoved {
        /// New horizontal position.
        x: f32,
    },
    /// Player stepped into a house trigger.
    HouseApproached {
        /// House whose trigger was entered.
        house: HouseId,
    },
    /// Player stepped out of a house trigger.
    HouseLeft {
        /// House whose trigger was left.
        house: HouseId,
    },
    /// Free camera follow was enabled or disabled.
    CameraFollowChanged {
        /// Whether the camera follows the player.
        enabled: bool,
    },
    /// A camera move-and-zoom transition started.
    CameraTransitionStarted {
        /// Destination position.
        target: Vec2,
        /// Destination orthographic size.
        zoom: f32,
    },
    /// Camera position or zoom changed.
    CameraMoved {
        /// Current camera centre.
        position: Vec2,
        /// Current orthographic size.
        zoom: f32,
    },
    /// The active camera transition reached its destination.
    CameraTransitionFinished,
    /// A door changed lifecycle phase.
    DoorPhaseChanged {
        /// House owning the door.
        house: HouseId,
        /// New phase.
        phase: DoorPhase,
    },
    /// A knock cue played.
    DoorKnocked {
        /// House owning the door.
        house: HouseId,
        /// Zero-based knock index within the sequence.
        knock: u32,
    },
    /// The door opened and the silhouette is visible.
    DoorOpened {
        /// House owning the door.
        house: HouseId,
        /// Silhouette asset key that was revealed, if any was assigned.
        silhouette: Option<String>,
    },
    /// The door was forced back to closed and its visuals cleared.
    DoorReset {
        /// House owning the door.
        house: HouseId,
    },
    /// A new arrow sequence was generated.
    QteStarted {
        /// Symbols the player must enter, in order.
        sequence: Vec<ArrowSymbol>,
    },
    /// The matched prefix of the arrow sequence changed.
    QteProgressed {
        /// Length of the matched prefix.
        matched: u32,
        /// Total sequence length.
        length: u32,
    },
    /// The arrow minigame finished.
    QteCompleted {
        /// Whether the full sequence was entered.
        success: bool,
    },
    /// The candy-catch minigame started.
    CandyCatchStarted {
        /// Number of candies that will fall.
        target: u32,
        /// Play area the candies fall through.
        area: Bounds,
    },
    /// The bucket moved.
    BucketMoved {
        /// New bucket centre.
        position: Vec2,
    },
    /// A candy began falling.
    CandySpawned {
        /// Identifier of the candy.
        candy: CandyId,
        /// Asset key of the candy kind.
        kind: String,
        /// Spawn position.
        position: Vec2,
    },
    /// A candy landed in the bucket.
    CandyCaught {
        /// Identifier of the candy.
        candy: CandyId,
    },
    /// A candy left play without being caught.
    CandyLost {
        /// Identifier of the candy.
        candy: CandyId,
        /// Why it was removed.
        reason: LossReason,
    },
    /// Catch progress changed.
    CandyCatchProgressed {
        /// Candies caught so far.
        caught: u32,
        /// Candies that will fall in total.
        target: u32,
    },
    /// The candy-catch minigame finished.
    CandyCatchFinished {
        /// Final number of candies caught.
        caught: u32,
        /// Whether the fail-safe timeout forced completion.
        forced: bool,
    },
    /// Candy from a house was added to the run total.
    RewardCommitted {
        /// House that handed out the candy.
        house: HouseId,
        /// Candies caught in the minigame.
        caught: u32,
        /// Amount added to the total after the multiplier.
        awarded: u32,
    },
    /// A house's porch light changed.
    HouseAvailabilityChanged {
        /// House concerned.
        house: HouseId,
        /// Whether candy can be claimed.
        available: bool,
    },
    /// The run finished.
    RunEnded {
        /// Final candy total.
        total: u32,
    },
    /// The results collaborator should display the final total.
    ResultsShown {
        /// Final candy total.
        total: u32,
    },
    /// The results collaborator asked for the scene to be reset.
    SceneResetRequested,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn float_range_samples_inside_inverted_bounds() {
        let range = FloatRange::new(3.0, -1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..256 {
            let value = range.sample(&mut rng);
            assert!((-1.0..3.0).contains(&value), "sampled {value}");
        }
    }

    #[test]
    fn degenerate_float_range_returns_its_bound() {
        let range = FloatRange::new(2.5, 2.5);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(range.sample(&mut rng), 2.5);
    }

    #[test]
    fn non_finite_float_range_returns_its_bound() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert!(FloatRange::new(f32::NAN, f32::NAN).sample(&mut rng).is_nan());
        assert_eq!(FloatRange::new(-1.0, f32::INFINITY).sample(&mut rng), -1.0);
    }

    #[test]
    fn float_range_clamp_ignores_nan_bounds() {
        assert_eq!(FloatRange::new(5.0, -5.0).clamp(9.0), 5.0);
        assert_eq!(FloatRange::new(f32::NAN, 5.0).clamp(9.0), 9.0);
    }

    #[test]
    fn clamp_x_tolerates_nan_bounds() {
        let bounds = Bounds::new(Vec2::new(f32::NAN, 0.0), Vec2::new(1.0, 1.0));
        assert!(bounds.clamp_x(0.5).is_nan());
        let inverted = Bounds::new(Vec2::new(4.0, 0.0), Vec2::new(2.0, 1.0));
        assert_eq!(inverted.clamp_x(10.0), 3.0);
    }

    #[test]
    fn count_range_is_inclusive() {
        let range = CountRange::new(4, 4);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(range.sample(&mut rng), 4);
    }

    #[test]
    fn view_inset_applies_each_margin() {
        let view = ViewBounds {
            center: Vec2::new(10.0, 0.0),
            half_height: 3.0,
            aspect: 2.0,
        };
        let area = view.inset(Margins::default());
        assert!(area.min.abs_diff_eq(Vec2::new(4.5, -2.0), 1e-5));
        assert!(area.max.abs_diff_eq(Vec2::new(15.5, 2.2), 1e-5));
    }

    #[test]
    fn outside_check_respects_margins() {
        let area = Bounds::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));
        assert!(!area.is_outside(Vec2::new(1.5, 0.0), 1.0, 1.0));
        assert!(area.is_outside(Vec2::new(2.5, 0.0), 1.0, 1.0));
        assert!(area.is_outside(Vec2::new(0.0, -2.5), 1.0, 1.0));
    }

    #[test]
    fn overlap_reports_partner() {
        let candy = BodyId::Candy(CandyId::new(9));
        let overlap = Overlap {
            first: candy,
            second: BodyId::Bucket,
        };
        assert_eq!(overlap.partner_of(BodyId::Bucket), Some(candy));
        assert_eq!(overlap.partner_of(candy), Some(BodyId::Bucket));
        assert_eq!(overlap.partner_of(BodyId::Candy(CandyId::new(1))), None);
    }
}
