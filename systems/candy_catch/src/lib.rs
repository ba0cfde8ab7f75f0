#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Candy-catch minigame: candies rain down over a play area and the player
//! steers a bucket along a fixed lane to collect them.
//!
//! Falling is delegated to the [`Physics`] collaborator. The simulation
//! spawns bodies, applies their initial impulses, consumes the overlap-begin
//! pairs reported by each physics step and sweeps candies that left play.
//! A round completes once every candy has been spawned and none remain live,
//! or when the fail-safe countdown that starts with the last spawn runs out.

use std::{collections::BTreeSet, time::Duration};

use glam::Vec2;
use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use trick_or_treat_core::{
    BodyDesc, BodyId, BodyKind, Bounds, CandyId, Event, FloatRange, LossReason, Margins, Physics,
    SoundCue, ViewBounds,
};
use trick_or_treat_system_sequencer::duration_from_secs;

/// Bucket the player steers along the catch lane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketConfig {
    /// Horizontal speed in world units per second at full axis deflection.
    pub speed: f32,
    /// Half extents of the bucket's catch box.
    pub half_extents: Vec2,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            speed: 10.0,
            half_extents: Vec2::new(0.6, 0.35),
        }
    }
}

/// Tunables for the candy-catch minigame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandyCatchConfig {
    /// Seconds between two spawns.
    pub spawn_interval: f32,
    /// Play area used when not aligned to the camera view.
    pub area: Bounds,
    /// Lane the bucket is locked to.
    pub bucket_y: f32,
    /// Height candies appear at.
    pub spawn_y: f32,
    /// Candies falling below this line are lost.
    pub cleanup_y: f32,
    /// Re-derive the area and lanes from the camera view on every run.
    pub auto_align_to_view: bool,
    /// Inset from the view edges used by auto-alignment.
    pub margins: Margins,
    /// Bucket settings; without a bucket the minigame cannot be played.
    pub bucket: Option<BucketConfig>,
    /// Candy asset keys, one picked per spawn.
    pub candy_kinds: Vec<String>,
    /// Half extents of a candy's overlap box.
    pub candy_half_extents: Vec2,
    /// Initial tilt in degrees.
    pub tilt_range: FloatRange,
    /// Spin in degrees per second.
    pub spin_range: FloatRange,
    /// Sideways impulse applied on spawn.
    pub lateral_impulse_range: FloatRange,
    /// Extra downward impulse applied on spawn.
    pub downward_impulse: f32,
    /// Gravity multiplier for candies.
    pub gravity_scale: f32,
    /// Also remove candies that drift beyond the margins around the area.
    pub cull_outside_area: bool,
    /// Horizontal slack around the area before a candy counts as outside.
    pub lateral_margin: f32,
    /// Vertical slack around the area before a candy counts as outside.
    pub vertical_margin: f32,
    /// Seconds after the last spawn before remaining candies are discarded.
    pub fail_safe_timeout: f32,
    /// Volume of the catch cue.
    pub catch_volume: f32,
}

impl Default for CandyCatchConfig {
    fn default() -> Self {
        Self {
            spawn_interval: 0.35,
            area: Bounds::new(Vec2::new(-6.0, -3.5), Vec2::new(6.0, 3.5)),
            bucket_y: -3.0,
            spawn_y: 3.5,
            cleanup_y: -5.0,
            auto_align_to_view: true,
            margins: Margins::default(),
            bucket: Some(BucketConfig::default()),
            candy_kinds: vec![
                "candy_corn".to_owned(),
                "lollipop".to_owned(),
                "wrapped_toffee".to_owned(),
            ],
            candy_half_extents: Vec2::new(0.2, 0.2),
            tilt_range: FloatRange::new(-25.0, 25.0),
            spin_range: FloatRange::new(-180.0, 180.0),
            lateral_impulse_range: FloatRange::new(-1.5, 1.5),
            downward_impulse: 0.0,
            gravity_scale: 0.5,
            cull_outside_area: true,
            lateral_margin: 1.0,
            vertical_margin: 2.0,
            fail_safe_timeout: 6.0,
            catch_volume: 1.0,
        }
    }
}

/// Final result of a candy-catch round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CatchOutcome {
    /// Candies that landed in the bucket.
    pub caught: u32,
    /// Whether the fail-safe timeout ended the round.
    pub forced: bool,
}

#[derive(Debug)]
struct Round {
    target: u32,
    spawned: u32,
    caught: u32,
    area: Bounds,
    bucket_y: f32,
    spawn_y: f32,
    cleanup_y: f32,
    bucket: BucketConfig,
    bucket_x: f32,
    spawn_timer: Duration,
    fail_safe: Option<Duration>,
    live: BTreeSet<CandyId>,
}

/// Owner of the bucket and every live candy for one round at a time.
#[derive(Debug)]
pub struct CandyCatch {
    config: CandyCatchConfig,
    round: Option<Round>,
    next_candy: u32,
}

impl CandyCatch {
    /// Creates an idle minigame.
    #[must_use]
    pub fn new(config: CandyCatchConfig) -> Self {
        Self {
            config,
            round: None,
            next_candy: 0,
        }
    }

    /// Starts a round dropping `target` candies (at least one).
    ///
    /// `view` is the camera's visible region, used when auto-alignment is
    /// enabled. Returns an outcome straight away when the round cannot be
    /// played because no bucket is configured.
    pub fn run(
        &mut self,
        target: u32,
        view: Option<ViewBounds>,
        physics: &mut dyn Physics,
        out: &mut Vec<Event>,
    ) -> Option<CatchOutcome> {
        if self.round.is_some() {
            debug!("candy catch restarted while running; tearing down the previous round");
            let _ = self.abort(physics);
        }

        let target = target.max(1);
        let Some(bucket) = self.config.bucket.clone() else {
            warn!("candy catch has no bucket configured; skipping the minigame");
            let outcome = CatchOutcome {
                caught: 0,
                forced: false,
            };
            out.push(Event::CandyCatchFinished {
                caught: outcome.caught,
                forced: outcome.forced,
            });
            return Some(outcome);
        };

        if self.config.candy_kinds.is_empty() {
            warn!("candy catch has no candy kinds configured; every spawn will be skipped");
        }

        let (area, bucket_y, spawn_y, cleanup_y) = match view {
            Some(view) if self.config.auto_align_to_view => {
                let area = view.inset(self.config.margins);
                (area, area.min.y + 0.25, area.max.y - 0.25, area.min.y - 1.0)
            }
            _ => (
                self.config.area,
                self.config.bucket_y,
                self.config.spawn_y,
                self.config.cleanup_y,
            ),
        };

        let bucket_x = area.center_x();
        let bucket_position = Vec2::new(bucket_x, bucket_y);
        physics.spawn_body(
            BodyId::Bucket,
            BodyDesc {
                kind: BodyKind::Kinematic,
                position: bucket_position,
                half_extents: bucket.half_extents,
                rotation_degrees: 0.0,
                gravity_scale: 0.0,
            },
        );

        self.round = Some(Round {
            target,
            spawned: 0,
            caught: 0,
            area,
            bucket_y,
            spawn_y,
            cleanup_y,
            bucket,
            bucket_x,
            spawn_timer: Duration::ZERO,
            fail_safe: None,
            live: BTreeSet::new(),
        });

        out.push(Event::CandyCatchStarted { target, area });
        out.push(Event::BucketMoved {
            position: bucket_position,
        });
        out.push(Event::CandyCatchProgressed { caught: 0, target });
        None
    }

    /// Advances the round by one fixed tick.
    ///
    /// `axis` is the horizontal input in `[-1, 1]` steering the bucket.
    /// Returns the outcome on the tick the round completes.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        dt: Duration,
        axis: f32,
        physics: &mut dyn Physics,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) -> Option<CatchOutcome> {
        self.move_bucket(dt, axis, physics, out);
        self.spawn_due(dt, physics, rng, out);

        let mut overlaps = Vec::new();
        physics.step(dt, &mut overlaps);
        for overlap in overlaps {
            if let Some(BodyId::Candy(candy)) = overlap.partner_of(BodyId::Bucket) {
                let _ = self.notify_caught(candy, physics, out);
            }
        }

        self.sweep(physics, out);

        let round = self.round.as_mut()?;
        let all_spawned = round.spawned >= round.target;
        if all_spawned && round.live.is_empty() {
            return Some(self.finish(false, physics, out));
        }

        if let Some(remaining) = round.fail_safe.as_mut() {
            *remaining = remaining.saturating_sub(dt);
            if remaining.is_zero() {
                return Some(self.finish(true, physics, out));
            }
        }
        None
    }

    /// Records a bucket overlap with `candy`.
    ///
    /// Ignored when no round is running or the candy is no longer live, so
    /// late or duplicate notifications never change the count.
    pub fn notify_caught(
        &mut self,
        candy: CandyId,
        physics: &mut dyn Physics,
        out: &mut Vec<Event>,
    ) -> bool {
        let Some(round) = self.round.as_mut() else {
            debug!("catch of candy {} ignored; no round running", candy.get());
            return false;
        };
        if !round.live.remove(&candy) {
            debug!("catch of candy {} ignored; not live", candy.get());
            return false;
        }

        round.caught += 1;
        physics.despawn_body(BodyId::Candy(candy));
        out.push(Event::CandyCaught { candy });
        out.push(Event::SoundRequested {
            cue: SoundCue::Candy,
            volume: self.config.catch_volume,
        });
        out.push(Event::CandyCatchProgressed {
            caught: round.caught,
            target: round.target,
        });
        true
    }

    /// Tears the round down without reporting a completion.
    pub fn abort(&mut self, physics: &mut dyn Physics) -> bool {
        let Some(round) = self.round.take() else {
            return false;
        };
        for candy in round.live {
            physics.despawn_body(BodyId::Candy(candy));
        }
        physics.despawn_body(BodyId::Bucket);
        debug!("candy catch aborted with {} caught", round.caught);
        true
    }

    /// Reports whether a round is in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.round.is_some()
    }

    /// Candies caught in the running round.
    #[must_use]
    pub fn caught(&self) -> u32 {
        self.round.as_ref().map_or(0, |round| round.caught)
    }

    /// Candies the running round drops in total.
    #[must_use]
    pub fn target(&self) -> u32 {
        self.round.as_ref().map_or(0, |round| round.target)
    }

    /// Candies spawned so far in the running round.
    #[must_use]
    pub fn spawned(&self) -> u32 {
        self.round.as_ref().map_or(0, |round| round.spawned)
    }

    /// Play area of the running round.
    #[must_use]
    pub fn area(&self) -> Option<Bounds> {
        self.round.as_ref().map(|round| round.area)
    }

    /// Current bucket centre.
    #[must_use]
    pub fn bucket_position(&self) -> Option<Vec2> {
        self.round
            .as_ref()
            .map(|round| Vec2::new(round.bucket_x, round.bucket_y))
    }

    /// Candies still falling, in spawn order.
    pub fn live_candies(&self) -> impl Iterator<Item = CandyId> + '_ {
        self.round.iter().flat_map(|round| round.live.iter().copied())
    }

    fn move_bucket(
        &mut self,
        dt: Duration,
        axis: f32,
        physics: &mut dyn Physics,
        out: &mut Vec<Event>,
    ) {
        let Some(round) = self.round.as_mut() else {
            return;
        };
        let axis = if axis.is_finite() { axis.clamp(-1.0, 1.0) } else { 0.0 };
        let x = round
            .area
            .clamp_x(round.bucket_x + axis * round.bucket.speed * dt.as_secs_f32());
        if x == round.bucket_x {
            return;
        }

        round.bucket_x = x;
        let position = Vec2::new(x, round.bucket_y);
        physics.set_position(BodyId::Bucket, position);
        out.push(Event::BucketMoved { position });
    }

    fn spawn_due<R: Rng + ?Sized>(
        &mut self,
        dt: Duration,
        physics: &mut dyn Physics,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) {
        let Some(round) = self.round.as_mut() else {
            return;
        };
        if round.spawned >= round.target {
            return;
        }

        round.spawn_timer = round.spawn_timer.saturating_sub(dt);
        if !round.spawn_timer.is_zero() {
            return;
        }

        if !self.config.candy_kinds.is_empty() {
            let candy = CandyId::new(self.next_candy);
            self.next_candy = self.next_candy.wrapping_add(1);

            let kinds = &self.config.candy_kinds;
            let kind = kinds[rng.gen_range(0..kinds.len())].clone();
            let x = FloatRange::new(round.area.min.x, round.area.max.x).sample(rng);
            let position = Vec2::new(x, round.spawn_y);
            let body = BodyId::Candy(candy);

            physics.spawn_body(
                body,
                BodyDesc {
                    kind: BodyKind::Dynamic,
                    position,
                    half_extents: self.config.candy_half_extents,
                    rotation_degrees: self.config.tilt_range.sample(rng),
                    gravity_scale: self.config.gravity_scale,
                },
            );
            physics.apply_impulse(
                body,
                Vec2::new(
                    self.config.lateral_impulse_range.sample(rng),
                    -self.config.downward_impulse.max(0.0),
                ),
            );
            physics.set_angular_velocity(body, self.config.spin_range.sample(rng));

            let _ = round.live.insert(candy);
            out.push(Event::CandySpawned {
                candy,
                kind,
                position,
            });
        }

        round.spawned += 1;
        round.spawn_timer = duration_from_secs(self.config.spawn_interval);
        if round.spawned >= round.target {
            round.fail_safe = Some(duration_from_secs(self.config.fail_safe_timeout));
        }
    }

    fn sweep(&mut self, physics: &mut dyn Physics, out: &mut Vec<Event>) {
        let Some(round) = self.round.as_mut() else {
            return;
        };

        let mut lost = Vec::new();
        for &candy in &round.live {
            let reason = match physics.position(BodyId::Candy(candy)) {
                Some(position) if position.y < round.cleanup_y => Some(LossReason::BelowCleanupLine),
                Some(position)
                    if self.config.cull_outside_area
                        && round.area.is_outside(
                            position,
                            self.config.lateral_margin,
                            self.config.vertical_margin,
                        ) =>
                {
                    Some(LossReason::OutsideArea)
                }
                Some(_) => None,
                // Body vanished from the physics world.
                None => Some(LossReason::OutsideArea),
            };
            if let Some(reason) = reason {
                lost.push((candy, reason));
            }
        }

        for (candy, reason) in lost {
            let _ = round.live.remove(&candy);
            physics.despawn_body(BodyId::Candy(candy));
            out.push(Event::CandyLost { candy, reason });
        }
    }

    fn finish(
        &mut self,
        forced: bool,
        physics: &mut dyn Physics,
        out: &mut Vec<Event>,
    ) -> CatchOutcome {
        let outcome = match self.round.take() {
            Some(round) => {
                for candy in round.live {
                    physics.despawn_body(BodyId::Candy(candy));
                    out.push(Event::CandyLost {
                        candy,
                        reason: LossReason::TimedOut,
                    });
                }
                physics.despawn_body(BodyId::Bucket);
                CatchOutcome {
                    caught: round.caught,
                    forced,
                }
            }
            None => CatchOutcome {
                caught: 0,
                forced,
            },
        };

        out.push(Event::CandyCatchFinished {
            caught: outcome.caught,
            forced: outcome.forced,
        });
        info!(
            "candy catch finished with {} caught{}",
            outcome.caught,
            if forced { " (fail-safe)" } else { "" }
        );
        outcome
    }
}
