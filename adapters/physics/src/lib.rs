#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic 2D integrator implementing the core [`Physics`] contract.
//!
//! Dynamic bodies fall under scaled gravity with unit mass, so an impulse is
//! a direct change of velocity. Kinematic bodies only move when positioned
//! explicitly. Overlaps are tested between kinematic and dynamic bodies
//! using the box swept by the dynamic body over the step, which keeps fast
//! candies from tunnelling through a thin bucket. Only pairs that were not
//! already touching after the previous step are reported.

use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

use glam::Vec2;
use log::debug;
use trick_or_treat_core::{BodyDesc, BodyId, BodyKind, Overlap, Physics};

/// Standard gravity in world units per second squared.
pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, -9.81);

#[derive(Clone, Copy, Debug)]
struct Body {
    kind: BodyKind,
    position: Vec2,
    velocity: Vec2,
    half_extents: Vec2,
    rotation_degrees: f32,
    spin: f32,
    gravity_scale: f32,
}

#[derive(Clone, Copy, Debug)]
struct Aabb {
    min: Vec2,
    max: Vec2,
}

impl Aabb {
    fn around(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// Small physics world holding every body spawned by the simulation.
#[derive(Debug)]
pub struct SimplePhysics {
    gravity: Vec2,
    bodies: BTreeMap<BodyId, Body>,
    touching: BTreeSet<(BodyId, BodyId)>,
}

impl Default for SimplePhysics {
    fn default() -> Self {
        Self::new(DEFAULT_GRAVITY)
    }
}

impl SimplePhysics {
    /// Creates an empty world with the provided gravity.
    #[must_use]
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            bodies: BTreeMap::new(),
            touching: BTreeSet::new(),
        }
    }

    /// Number of bodies currently simulated.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Current tilt of a body in degrees.
    #[must_use]
    pub fn rotation_degrees(&self, body: BodyId) -> Option<f32> {
        self.bodies.get(&body).map(|body| body.rotation_degrees)
    }

    fn forget_contacts(&mut self, body: BodyId) {
        self.touching
            .retain(|(first, second)| *first != body && *second != body);
    }
}

impl Physics for SimplePhysics {
    fn spawn_body(&mut self, body: BodyId, desc: BodyDesc) {
        self.forget_contacts(body);
        let _ = self.bodies.insert(
            body,
            Body {
                kind: desc.kind,
                position: desc.position,
                velocity: Vec2::ZERO,
                half_extents: desc.half_extents.abs(),
                rotation_degrees: desc.rotation_degrees,
                spin: 0.0,
                gravity_scale: desc.gravity_scale,
            },
        );
    }

    fn despawn_body(&mut self, body: BodyId) {
        if self.bodies.remove(&body).is_some() {
            self.forget_contacts(body);
        }
    }

    fn set_position(&mut self, body: BodyId, position: Vec2) {
        match self.bodies.get_mut(&body) {
            Some(state) => state.position = position,
            None => debug!("set_position on unknown body {body:?}"),
        }
    }

    fn apply_impulse(&mut self, body: BodyId, impulse: Vec2) {
        if let Some(state) = self.bodies.get_mut(&body) {
            if state.kind == BodyKind::Dynamic {
                state.velocity += impulse;
            }
        }
    }

    fn set_angular_velocity(&mut self, body: BodyId, degrees_per_second: f32) {
        if let Some(state) = self.bodies.get_mut(&body) {
            state.spin = degrees_per_second;
        }
    }

    fn position(&self, body: BodyId) -> Option<Vec2> {
        self.bodies.get(&body).map(|body| body.position)
    }

    fn step(&mut self, dt: Duration, overlaps: &mut Vec<Overlap>) {
        let seconds = dt.as_secs_f32();
        let gravity = self.gravity;

        let mut swept = Vec::new();
        let mut kinematic = Vec::new();
        for (&id, body) in &mut self.bodies {
            match body.kind {
                BodyKind::Dynamic => {
                    let before = Aabb::around(body.position, body.half_extents);
                    body.velocity += gravity * body.gravity_scale * seconds;
                    body.position += body.velocity * seconds;
                    body.rotation_degrees += body.spin * seconds;
                    let after = Aabb::around(body.position, body.half_extents);
                    swept.push((id, before.union(after)));
                }
                BodyKind::Kinematic => {
                    body.rotation_degrees += body.spin * seconds;
                    kinematic.push((id, Aabb::around(body.position, body.half_extents)));
                }
            }
        }

        let mut touching = BTreeSet::new();
        for (holder, holder_box) in &kinematic {
            for (faller, faller_box) in &swept {
                if !holder_box.intersects(faller_box) {
                    continue;
                }
                let pair = (*holder, *faller);
                if !self.touching.contains(&pair) {
                    overlaps.push(Overlap {
                        first: *holder,
                        second: *faller,
                    });
                }
                let _ = touching.insert(pair);
            }
        }
        self.touching = touching;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trick_or_treat_core::CandyId;

    fn candy(id: u32) -> BodyId {
        BodyId::Candy(CandyId::new(id))
    }

    fn dynamic_at(position: Vec2, gravity_scale: f32) -> BodyDesc {
        BodyDesc {
            kind: BodyKind::Dynamic,
            position,
            half_extents: Vec2::splat(0.2),
            rotation_degrees: 0.0,
            gravity_scale,
        }
    }

    fn bucket_at(position: Vec2) -> BodyDesc {
        BodyDesc {
            kind: BodyKind::Kinematic,
            position,
            half_extents: Vec2::new(0.6, 0.1),
            rotation_degrees: 0.0,
            gravity_scale: 0.0,
        }
    }

    #[test]
    fn dynamic_bodies_fall_under_scaled_gravity() {
        let mut physics = SimplePhysics::default();
        physics.spawn_body(candy(0), dynamic_at(Vec2::ZERO, 0.5));
        physics.spawn_body(candy(1), dynamic_at(Vec2::ZERO, 0.0));

        let mut overlaps = Vec::new();
        physics.step(Duration::from_secs(1), &mut overlaps);

        let scaled = physics.position(candy(0)).expect("spawned");
        assert!(scaled.y < 0.0);
        assert_eq!(physics.position(candy(1)), Some(Vec2::ZERO));
    }

    #[test]
    fn kinematic_bodies_ignore_gravity_and_impulses() {
        let mut physics = SimplePhysics::default();
        physics.spawn_body(BodyId::Bucket, bucket_at(Vec2::new(1.0, -3.0)));
        physics.apply_impulse(BodyId::Bucket, Vec2::new(5.0, 0.0));

        let mut overlaps = Vec::new();
        physics.step(Duration::from_millis(500), &mut overlaps);
        assert_eq!(physics.position(BodyId::Bucket), Some(Vec2::new(1.0, -3.0)));
    }

    #[test]
    fn impulse_changes_velocity_directly() {
        let mut physics = SimplePhysics::new(Vec2::ZERO);
        physics.spawn_body(candy(0), dynamic_at(Vec2::ZERO, 1.0));
        physics.apply_impulse(candy(0), Vec2::new(2.0, 0.0));
        physics.set_angular_velocity(candy(0), 90.0);

        let mut overlaps = Vec::new();
        physics.step(Duration::from_secs(1), &mut overlaps);
        assert_eq!(physics.position(candy(0)), Some(Vec2::new(2.0, 0.0)));
        assert_eq!(physics.rotation_degrees(candy(0)), Some(90.0));
    }

    #[test]
    fn overlap_is_reported_once_per_contact() {
        let mut physics = SimplePhysics::new(Vec2::new(0.0, -1.0));
        physics.spawn_body(BodyId::Bucket, bucket_at(Vec2::new(0.0, -1.0)));
        physics.spawn_body(candy(0), dynamic_at(Vec2::new(0.0, -0.75), 1.0));

        let mut overlaps = Vec::new();
        for _ in 0..5 {
            physics.step(Duration::from_millis(50), &mut overlaps);
        }
        assert_eq!(
            overlaps,
            vec![Overlap {
                first: BodyId::Bucket,
                second: candy(0),
            }]
        );
    }

    #[test]
    fn fast_bodies_do_not_tunnel_through_thin_targets() {
        let mut physics = SimplePhysics::new(Vec2::ZERO);
        physics.spawn_body(BodyId::Bucket, bucket_at(Vec2::new(0.0, 0.0)));
        physics.spawn_body(candy(0), dynamic_at(Vec2::new(0.0, 5.0), 0.0));
        physics.apply_impulse(candy(0), Vec2::new(0.0, -100.0));

        let mut overlaps = Vec::new();
        physics.step(Duration::from_millis(100), &mut overlaps);
        assert!(physics.position(candy(0)).expect("spawned").y < -4.0);
        assert_eq!(overlaps.len(), 1);
    }

    #[test]
    fn despawned_bodies_are_forgotten() {
        let mut physics = SimplePhysics::default();
        physics.spawn_body(candy(3), dynamic_at(Vec2::ZERO, 1.0));
        physics.despawn_body(candy(3));
        physics.despawn_body(candy(3));
        assert_eq!(physics.body_count(), 0);
        assert_eq!(physics.position(candy(3)), None);
    }
}
