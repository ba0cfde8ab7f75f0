//! Session configuration and its up-front validation.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use trick_or_treat_core::{Bounds, CountRange, FloatRange, HouseId};
use trick_or_treat_system_arrow_qte::QteConfig;
use trick_or_treat_system_candy_catch::CandyCatchConfig;
use trick_or_treat_system_door::DoorConfig;
use trick_or_treat_system_run_score::RunConfig;

/// Everything needed to build a [`crate::World`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Run length and multiplier.
    pub run: RunConfig,
    /// Player movement.
    pub player: PlayerConfig,
    /// Camera zooms, transition times and follow behaviour.
    pub camera: CameraConfig,
    /// Minigame pipeline tunables.
    pub flow: FlowConfig,
    /// Door used by houses that do not configure their own.
    pub door: DoorConfig,
    /// Arrow minigame.
    pub qte: QteConfig,
    /// Candy-catch minigame.
    pub candy_catch: CandyCatchConfig,
    /// Reward cooldown applied to houses.
    pub cooldown: HouseCooldownConfig,
    /// Houses along the street.
    pub houses: Vec<HouseConfig>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            run: RunConfig::default(),
            player: PlayerConfig::default(),
            camera: CameraConfig::default(),
            flow: FlowConfig::default(),
            door: DoorConfig::default(),
            qte: QteConfig::default(),
            candy_catch: CandyCatchConfig::default(),
            cooldown: HouseCooldownConfig::default(),
            houses: default_street(),
        }
    }
}

/// Four lit houses spaced along the default street.
#[must_use]
pub fn default_street() -> Vec<HouseConfig> {
    [6.0, 18.0, 30.0, 42.0]
        .into_iter()
        .zip(1..)
        .map(|(x, id)| HouseConfig::new(HouseId::new(id), Vec2::new(x, 1.2), 1.5))
        .collect()
}

/// Player movement along the street.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Walking speed in world units per second.
    pub speed: f32,
    /// Speed factor while the run modifier is held.
    pub run_multiplier: f32,
    /// Horizontal extent the player can walk.
    pub street: FloatRange,
    /// Height of the street.
    pub y: f32,
    /// Starting position when no start house is given.
    pub start_x: f32,
    /// Start in front of this house instead of at `start_x`.
    pub start_house: Option<HouseId>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            run_multiplier: 1.6,
            street: FloatRange::new(-10.0, 50.0),
            y: 0.0,
            start_x: 0.0,
            start_house: None,
        }
    }
}

/// Camera zooms and transition timing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Orthographic size while exploring.
    pub explore_zoom: f32,
    /// Orthographic size while framed on a door.
    pub pov_zoom: f32,
    /// Seconds the position part of a transition takes.
    pub move_time: f32,
    /// Seconds the zoom part of a transition takes.
    pub zoom_time: f32,
    /// Offset from the door anchor when framed on a door.
    pub pov_offset: Vec2,
    /// Offset from the player while following.
    pub follow_offset: Vec2,
    /// Follow responsiveness; the lerp factor per tick is `smooth_speed * dt`.
    pub smooth_speed: f32,
    /// Width divided by height of the viewport.
    pub aspect: f32,
    /// Region the free-following camera's view is kept inside.
    pub follow_bounds: Option<Bounds>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            explore_zoom: 4.5,
            pov_zoom: 3.2,
            move_time: 0.35,
            zoom_time: 0.25,
            pov_offset: Vec2::ZERO,
            follow_offset: Vec2::ZERO,
            smooth_speed: 5.0,
            aspect: 16.0 / 9.0,
            follow_bounds: None,
        }
    }
}

/// Minigame pipeline tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Number of candies dropped per candy-catch round.
    pub candy_count: CountRange,
    /// Seconds allowed for the arrow minigame; unlimited when absent.
    pub qte_time_limit: Option<f32>,
    /// Volume of the game-over cue.
    pub game_over_volume: f32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            candy_count: CountRange::new(3, 6),
            qte_time_limit: None,
            game_over_volume: 1.0,
        }
    }
}

/// Bounds of the random reward cooldown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseCooldownConfig {
    /// Shortest cooldown in seconds.
    pub min_seconds: f32,
    /// Longest cooldown in seconds.
    pub max_seconds: f32,
}

impl Default for HouseCooldownConfig {
    fn default() -> Self {
        Self {
            min_seconds: 20.0,
            max_seconds: 120.0,
        }
    }
}

impl HouseCooldownConfig {
    /// Cooldown bounds as a range.
    #[must_use]
    pub const fn range(&self) -> FloatRange {
        FloatRange::new(self.min_seconds, self.max_seconds)
    }
}

/// A house registered on the street.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HouseConfig {
    /// Unique identifier.
    pub id: HouseId,
    /// Point the camera frames when the player is at the door.
    pub door_anchor: Vec2,
    /// Stretch of street from which the house can be approached.
    pub trigger: FloatRange,
    /// Door timing for this house; the session door is used when absent.
    #[serde(default)]
    pub door: Option<DoorConfig>,
    /// Whether the porch light is on when a run starts.
    #[serde(default = "lit_by_default")]
    pub available_at_start: bool,
}

const fn lit_by_default() -> bool {
    true
}

impl HouseConfig {
    /// Creates a lit house with the session door whose trigger spans `half_width` around the anchor.
    #[must_use]
    pub fn new(id: HouseId, door_anchor: Vec2, half_width: f32) -> Self {
        Self {
            id,
            door_anchor,
            trigger: FloatRange::new(door_anchor.x - half_width, door_anchor.x + half_width),
            door: None,
            available_at_start: true,
        }
    }
}

/// Longest delay accepted anywhere in the configuration: one day.
const MAX_SECONDS: f32 = 86_400.0;

/// Largest knock, arrow or candy count accepted per round.
const MAX_COUNT: u32 = 1_000;

/// Reasons a [`SessionConfig`] is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The run would end before it starts.
    #[error("run length must be positive (received {seconds}s)")]
    NonPositiveRunLength {
        /// Configured run length.
        seconds: f32,
    },
    /// Candies would spawn without pause.
    #[error("candy spawn interval must be positive (received {seconds}s)")]
    NonPositiveSpawnInterval {
        /// Configured interval.
        seconds: f32,
    },
    /// A delay or duration is negative, not a number or longer than a day.
    #[error("{field} must be between 0 and 86400 seconds (received {seconds})")]
    InvalidDuration {
        /// Name of the offending setting.
        field: &'static str,
        /// Configured value.
        seconds: f32,
    },
    /// A plain number is infinite or not a number.
    #[error("{field} must be a finite number (received {value})")]
    NonFinite {
        /// Name of the offending setting.
        field: &'static str,
        /// Configured value.
        value: f32,
    },
    /// A size that must be strictly positive is not.
    #[error("{field} must be a positive number (received {value})")]
    NonPositive {
        /// Name of the offending setting.
        field: &'static str,
        /// Configured value.
        value: f32,
    },
    /// A range has its bounds swapped or holds a value that is not a finite number.
    #[error("{field} must be a finite range with min <= max (received {min}..{max})")]
    InvalidRange {
        /// Name of the offending setting.
        field: &'static str,
        /// Configured lower bound.
        min: f32,
        /// Configured upper bound.
        max: f32,
    },
    /// A count would make a round absurdly long.
    #[error("{field} must be at most {max} (received {count})")]
    CountTooLarge {
        /// Name of the offending setting.
        field: &'static str,
        /// Configured count.
        count: u32,
        /// Largest accepted count.
        max: u32,
    },
    /// Two houses share an identifier.
    #[error("{house} is registered more than once")]
    DuplicateHouse {
        /// Repeated identifier.
        house: HouseId,
    },
    /// A setting names a house that is not registered.
    #[error("{house} is referenced but not registered")]
    UnknownHouse {
        /// Missing identifier.
        house: HouseId,
    },
}

impl SessionConfig {
    /// Checks the configuration for values the world cannot run with.
    ///
    /// A zero arrow sequence length is not an error; it is clamped to one
    /// when the minigame starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let run_seconds = self.run.run_seconds;
        if !(run_seconds.is_finite() && run_seconds > 0.0) {
            return Err(ConfigError::NonPositiveRunLength {
                seconds: run_seconds,
            });
        }

        let interval = self.candy_catch.spawn_interval;
        if !(interval.is_finite() && interval > 0.0) {
            return Err(ConfigError::NonPositiveSpawnInterval { seconds: interval });
        }

        let mut durations = vec![
            ("run.run_seconds", run_seconds),
            ("candy_catch.spawn_interval", interval),
            ("door.knock_delay", self.door.knock_delay),
            ("door.open_delay", self.door.open_delay),
            ("camera.move_time", self.camera.move_time),
            ("camera.zoom_time", self.camera.zoom_time),
            ("candy_catch.fail_safe_timeout", self.candy_catch.fail_safe_timeout),
        ];
        if let Some(limit) = self.flow.qte_time_limit {
            durations.push(("flow.qte_time_limit", limit));
        }
        for door in self.houses.iter().filter_map(|house| house.door.as_ref()) {
            durations.push(("houses.door.knock_delay", door.knock_delay));
            durations.push(("houses.door.open_delay", door.open_delay));
        }
        for (field, seconds) in durations {
            check_seconds(field, seconds)?;
        }

        let cooldown = self.cooldown.range();
        check_range("cooldown", cooldown)?;
        check_seconds("cooldown.min_seconds", cooldown.min)?;
        check_seconds("cooldown.max_seconds", cooldown.max)?;

        check_range("player.street", self.player.street)?;
        let candy = &self.candy_catch;
        check_range("candy_catch.tilt_range", candy.tilt_range)?;
        check_range("candy_catch.spin_range", candy.spin_range)?;
        check_range("candy_catch.lateral_impulse_range", candy.lateral_impulse_range)?;
        for house in &self.houses {
            check_range("houses.trigger", house.trigger)?;
        }

        if let Some(bounds) = self.camera.follow_bounds {
            check_range(
                "camera.follow_bounds.x",
                FloatRange::new(bounds.min.x, bounds.max.x),
            )?;
            check_range(
                "camera.follow_bounds.y",
                FloatRange::new(bounds.min.y, bounds.max.y),
            )?;
        }

        check_positive("camera.explore_zoom", self.camera.explore_zoom)?;
        check_positive("camera.pov_zoom", self.camera.pov_zoom)?;
        check_positive("camera.aspect", self.camera.aspect)?;

        let mut numbers = vec![
            ("player.speed", self.player.speed),
            ("player.run_multiplier", self.player.run_multiplier),
            ("player.y", self.player.y),
            ("player.start_x", self.player.start_x),
            ("camera.pov_offset.x", self.camera.pov_offset.x),
            ("camera.pov_offset.y", self.camera.pov_offset.y),
            ("camera.follow_offset.x", self.camera.follow_offset.x),
            ("camera.follow_offset.y", self.camera.follow_offset.y),
            ("camera.smooth_speed", self.camera.smooth_speed),
            ("flow.game_over_volume", self.flow.game_over_volume),
            ("door.volume", self.door.volume),
            ("candy_catch.area.min.x", candy.area.min.x),
            ("candy_catch.area.min.y", candy.area.min.y),
            ("candy_catch.area.max.x", candy.area.max.x),
            ("candy_catch.area.max.y", candy.area.max.y),
            ("candy_catch.bucket_y", candy.bucket_y),
            ("candy_catch.spawn_y", candy.spawn_y),
            ("candy_catch.cleanup_y", candy.cleanup_y),
            ("candy_catch.margins.left", candy.margins.left),
            ("candy_catch.margins.right", candy.margins.right),
            ("candy_catch.margins.top", candy.margins.top),
            ("candy_catch.margins.bottom", candy.margins.bottom),
            ("candy_catch.candy_half_extents.x", candy.candy_half_extents.x),
            ("candy_catch.candy_half_extents.y", candy.candy_half_extents.y),
            ("candy_catch.downward_impulse", candy.downward_impulse),
            ("candy_catch.gravity_scale", candy.gravity_scale),
            ("candy_catch.lateral_margin", candy.lateral_margin),
            ("candy_catch.vertical_margin", candy.vertical_margin),
            ("candy_catch.catch_volume", candy.catch_volume),
        ];
        if let Some(bucket) = &candy.bucket {
            numbers.push(("candy_catch.bucket.speed", bucket.speed));
            numbers.push(("candy_catch.bucket.half_extents.x", bucket.half_extents.x));
            numbers.push(("candy_catch.bucket.half_extents.y", bucket.half_extents.y));
        }
        for house in &self.houses {
            numbers.push(("houses.door_anchor.x", house.door_anchor.x));
            numbers.push(("houses.door_anchor.y", house.door_anchor.y));
            if let Some(door) = &house.door {
                numbers.push(("houses.door.volume", door.volume));
            }
        }
        for (field, value) in numbers {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }

        let candies = self.flow.candy_count;
        if candies.min > candies.max {
            return Err(ConfigError::InvalidRange {
                field: "flow.candy_count",
                min: candies.min as f32,
                max: candies.max as f32,
            });
        }
        let mut counts = vec![
            ("flow.candy_count.max", candies.max),
            ("qte.length", self.qte.length),
            ("door.knock_count", self.door.knock_count),
        ];
        for door in self.houses.iter().filter_map(|house| house.door.as_ref()) {
            counts.push(("houses.door.knock_count", door.knock_count));
        }
        for (field, count) in counts {
            if count > MAX_COUNT {
                return Err(ConfigError::CountTooLarge {
                    field,
                    count,
                    max: MAX_COUNT,
                });
            }
        }

        let mut seen = BTreeSet::new();
        for house in &self.houses {
            if !seen.insert(house.id) {
                return Err(ConfigError::DuplicateHouse { house: house.id });
            }
        }

        if let Some(house) = self.player.start_house {
            if !seen.contains(&house) {
                return Err(ConfigError::UnknownHouse { house });
            }
        }

        Ok(())
    }
}

fn check_seconds(field: &'static str, seconds: f32) -> Result<(), ConfigError> {
    if (0.0..=MAX_SECONDS).contains(&seconds) {
        Ok(())
    } else {
        Err(ConfigError::InvalidDuration { field, seconds })
    }
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

// Written so that a NaN bound fails the check.
fn check_range(field: &'static str, range: FloatRange) -> Result<(), ConfigError> {
    if range.min.is_finite() && range.max.is_finite() && range.min <= range.max {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange {
            field,
            min: range.min,
            max: range.max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        assert_eq!(SessionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn duplicate_houses_are_rejected() {
        let house = HouseConfig::new(HouseId::new(4), Vec2::new(3.0, 1.0), 1.0);
        let config = SessionConfig {
            houses: vec![house.clone(), house],
            ..SessionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateHouse {
                house: HouseId::new(4)
            })
        );
    }

    #[test]
    fn inverted_cooldown_is_rejected() {
        let config = SessionConfig {
            cooldown: HouseCooldownConfig {
                min_seconds: 50.0,
                max_seconds: 10.0,
            },
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange {
                field: "cooldown",
                ..
            })
        ));
    }

    #[test]
    fn negative_cooldown_is_rejected() {
        let config = SessionConfig {
            cooldown: HouseCooldownConfig {
                min_seconds: -5.0,
                max_seconds: 10.0,
            },
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDuration {
                field: "cooldown.min_seconds",
                ..
            })
        ));
    }

    #[test]
    fn unknown_start_house_is_rejected() {
        let mut config = SessionConfig::default();
        config.player.start_house = Some(HouseId::new(99));
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownHouse {
                house: HouseId::new(99)
            })
        );
    }

    #[test]
    fn zero_run_length_is_rejected() {
        let mut config = SessionConfig::default();
        config.run.run_seconds = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveRunLength { .. })
        ));
    }

    #[test]
    fn run_length_beyond_a_day_is_rejected() {
        let mut config = SessionConfig::default();
        config.run.run_seconds = 1e20;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDuration {
                field: "run.run_seconds",
                ..
            })
        ));
    }

    #[test]
    fn huge_door_delay_is_rejected() {
        let mut config = SessionConfig::default();
        config.door.open_delay = 1e20;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDuration {
                field: "door.open_delay",
                ..
            })
        ));
    }

    #[test]
    fn nan_street_bound_is_rejected() {
        let mut config = SessionConfig::default();
        config.player.street.min = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange {
                field: "player.street",
                ..
            })
        ));
    }

    #[test]
    fn nan_spin_range_is_rejected() {
        let mut config = SessionConfig::default();
        config.candy_catch.spin_range = FloatRange::new(f32::NAN, f32::NAN);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange {
                field: "candy_catch.spin_range",
                ..
            })
        ));
    }

    #[test]
    fn inverted_tilt_range_is_rejected() {
        let mut config = SessionConfig::default();
        config.candy_catch.tilt_range = FloatRange::new(10.0, -10.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange {
                field: "candy_catch.tilt_range",
                ..
            })
        ));
    }

    #[test]
    fn infinite_lateral_impulse_is_rejected() {
        let mut config = SessionConfig::default();
        config.candy_catch.lateral_impulse_range = FloatRange::new(-1.0, f32::INFINITY);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange {
                field: "candy_catch.lateral_impulse_range",
                ..
            })
        ));
    }

    #[test]
    fn nan_aspect_is_rejected() {
        let mut config = SessionConfig::default();
        config.camera.aspect = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "camera.aspect",
                ..
            })
        ));
    }

    #[test]
    fn inverted_follow_bounds_are_rejected() {
        let mut config = SessionConfig::default();
        config.camera.follow_bounds = Some(Bounds::new(Vec2::new(5.0, 0.0), Vec2::new(-5.0, 8.0)));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange {
                field: "camera.follow_bounds.x",
                ..
            })
        ));
    }

    #[test]
    fn nan_player_speed_is_rejected() {
        let mut config = SessionConfig::default();
        config.player.speed = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite {
                field: "player.speed",
                ..
            })
        ));
    }

    #[test]
    fn oversized_counts_are_rejected() {
        let mut config = SessionConfig::default();
        config.qte.length = 4_000_000_000;
        assert_eq!(
            config.validate(),
            Err(ConfigError::CountTooLarge {
                field: "qte.length",
                count: 4_000_000_000,
                max: MAX_COUNT,
            })
        );

        let mut config = SessionConfig::default();
        config.door.knock_count = 5_000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CountTooLarge {
                field: "door.knock_count",
                ..
            })
        ));
    }
}
