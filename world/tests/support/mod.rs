#![allow(dead_code)]

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use trick_or_treat_core::{BodyDesc, BodyId, Command, Event, HouseId, Overlap, Physics};
use trick_or_treat_world::{self as world, query, HouseConfig, SessionConfig, World};

pub const DT: Duration = Duration::from_millis(50);
pub const SEED: u64 = 7;

/// Holds bodies in place and reports a bucket overlap for every live candy.
#[derive(Debug, Default)]
pub struct GreedyPhysics {
    bodies: BTreeMap<BodyId, Vec2>,
}

impl Physics for GreedyPhysics {
    fn spawn_body(&mut self, body: BodyId, desc: BodyDesc) {
        let _ = self.bodies.insert(body, desc.position);
    }

    fn despawn_body(&mut self, body: BodyId) {
        let _ = self.bodies.remove(&body);
    }

    fn set_position(&mut self, body: BodyId, position: Vec2) {
        if let Some(current) = self.bodies.get_mut(&body) {
            *current = position;
        }
    }

    fn apply_impulse(&mut self, _body: BodyId, _impulse: Vec2) {}

    fn set_angular_velocity(&mut self, _body: BodyId, _degrees_per_second: f32) {}

    fn position(&self, body: BodyId) -> Option<Vec2> {
        self.bodies.get(&body).copied()
    }

    fn step(&mut self, _dt: Duration, overlaps: &mut Vec<Overlap>) {
        if !self.bodies.contains_key(&BodyId::Bucket) {
            return;
        }
        for body in self.bodies.keys() {
            if matches!(body, BodyId::Candy(_)) {
                overlaps.push(Overlap {
                    first: BodyId::Bucket,
                    second: *body,
                });
            }
        }
    }
}

/// Holds bodies in place and never reports an overlap, so nothing is ever caught.
#[derive(Debug, Default)]
pub struct StillPhysics {
    bodies: BTreeMap<BodyId, Vec2>,
}

impl Physics for StillPhysics {
    fn spawn_body(&mut self, body: BodyId, desc: BodyDesc) {
        let _ = self.bodies.insert(body, desc.position);
    }

    fn despawn_body(&mut self, body: BodyId) {
        let _ = self.bodies.remove(&body);
    }

    fn set_position(&mut self, body: BodyId, position: Vec2) {
        if let Some(current) = self.bodies.get_mut(&body) {
            *current = position;
        }
    }

    fn apply_impulse(&mut self, _body: BodyId, _impulse: Vec2) {}

    fn set_angular_velocity(&mut self, _body: BodyId, _degrees_per_second: f32) {}

    fn position(&self, body: BodyId) -> Option<Vec2> {
        self.bodies.get(&body).copied()
    }

    fn step(&mut self, _dt: Duration, _overlaps: &mut Vec<Overlap>) {}
}

pub const HOUSE: HouseId = HouseId::new(1);

/// One house right where the player starts, four candies per visit.
pub fn porch_config() -> SessionConfig {
    let mut config = SessionConfig {
        houses: vec![HouseConfig::new(HOUSE, Vec2::new(0.0, 1.2), 1.5)],
        ..SessionConfig::default()
    };
    config.player.start_x = 0.0;
    config.qte.length = 3;
    config.flow.candy_count.min = 4;
    config.flow.candy_count.max = 4;
    config.cooldown.min_seconds = 20.0;
    config.cooldown.max_seconds = 20.0;
    config
}

pub fn greedy_world(config: SessionConfig) -> World {
    World::new(config, SEED, Box::new(GreedyPhysics::default()))
}

pub fn still_world(config: SessionConfig) -> World {
    World::new(config, SEED, Box::new(StillPhysics::default()))
}

pub fn send(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

pub fn tick_for(world: &mut World, seconds: f32) -> Vec<Event> {
    let ticks = (seconds / DT.as_secs_f32()).ceil() as usize;
    let mut events = Vec::new();
    for _ in 0..ticks {
        world::apply(world, Command::Tick { dt: DT }, &mut events);
    }
    events
}

/// Walks into the door view, knocks and waits for the door to open.
pub fn open_door(world: &mut World) -> Vec<Event> {
    let mut events = send(world, Command::Interact);
    events.extend(tick_for(world, 0.5));
    events.extend(send(world, Command::Knock));
    events.extend(tick_for(world, 1.5));
    events
}

/// Types the running arrow sequence correctly.
pub fn solve_arrows(world: &mut World) -> Vec<Event> {
    let sequence = query::qte(world)
        .map(|qte| qte.sequence)
        .unwrap_or_default();
    let mut events = Vec::new();
    for symbol in sequence {
        events.extend(send(world, Command::Arrow { symbol }));
    }
    events
}

pub fn count<F: Fn(&Event) -> bool>(events: &[Event], predicate: F) -> usize {
    events.iter().filter(|event| predicate(event)).count()
}
