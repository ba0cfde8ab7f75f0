mod support;

use support::{send, solve_arrows, tick_for, DT};
use trick_or_treat_core::{Command, Event};
use trick_or_treat_physics::SimplePhysics;
use trick_or_treat_world::{self as world, query, SessionConfig, World};

fn play(seed: u64) -> (Vec<Event>, u32) {
    let mut world = World::new(SessionConfig::default(), seed, Box::new(SimplePhysics::default()));
    let mut events = Vec::new();
    world::announce(&mut world, &mut events);

    events.extend(send(&mut world, Command::SetHorizontalAxis { value: 1.0 }));
    for _ in 0..200 {
        if query::player(&world).nearby.is_some() {
            break;
        }
        world::apply(&mut world, Command::Tick { dt: DT }, &mut events);
    }
    events.extend(send(&mut world, Command::SetHorizontalAxis { value: 0.0 }));
    events.extend(send(&mut world, Command::Interact));
    events.extend(tick_for(&mut world, 0.5));
    events.extend(send(&mut world, Command::Knock));
    events.extend(tick_for(&mut world, 1.5));
    events.extend(solve_arrows(&mut world));

    for step in 0..160 {
        let value = if (step / 10) % 2 == 0 { -1.0 } else { 1.0 };
        events.extend(send(&mut world, Command::SetHorizontalAxis { value }));
        world::apply(&mut world, Command::Tick { dt: DT }, &mut events);
    }

    (events, query::run_state(&world).candy_total)
}

#[test]
fn same_seed_replays_identically() {
    let (first, first_total) = play(0x5eed);
    let (second, second_total) = play(0x5eed);

    assert_eq!(first_total, second_total);
    assert_eq!(first, second);
    assert!(first
        .iter()
        .any(|event| matches!(event, Event::RewardCommitted { .. })));
}
