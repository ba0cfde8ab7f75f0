use std::time::Duration;

use proptest::prelude::*;
use trick_or_treat_core::Event;
use trick_or_treat_system_run_score::{RunConfig, RunScore};

fn short_run(seconds: f32) -> RunScore {
    RunScore::new(&RunConfig {
        run_seconds: seconds,
        ..RunConfig::default()
    })
}

#[test]
fn candy_is_scaled_by_the_multiplier() {
    let mut run = RunScore::new(&RunConfig::default());
    let mut events = Vec::new();
    let _ = run.add_multiplier(2, &mut events);
    assert_eq!(run.add_candy(5, &mut events), 15);
    assert_eq!(run.state().candy_total, 15);
    assert!(events.contains(&Event::CandyTotalChanged { total: 15 }));
}

#[test]
fn multiplier_never_drops_below_one() {
    let mut run = RunScore::new(&RunConfig::default());
    let mut events = Vec::new();
    assert_eq!(run.add_multiplier(1, &mut events), 2);
    assert_eq!(run.add_multiplier(-10, &mut events), 1);
    assert_eq!(events.last(), Some(&Event::MultiplierChanged { multiplier: 1 }));
}

#[test]
fn countdown_ends_the_run_exactly_once() {
    let mut run = short_run(1.0);
    let mut events = Vec::new();

    let mut ended = 0;
    for _ in 0..30 {
        if run.tick(Duration::from_millis(100), &mut events) {
            ended += 1;
        }
    }
    assert_eq!(ended, 1);
    assert!(!run.is_running());
    assert!(!run.end_run(&mut events), "explicit end after expiry is a no-op");

    let run_ended = events
        .iter()
        .filter(|event| matches!(event, Event::RunEnded { .. }))
        .count();
    assert_eq!(run_ended, 1);
    assert!(events.contains(&Event::TimerChanged {
        progress: 0.0,
        seconds_left: 0
    }));
}

#[test]
fn rewards_after_the_run_are_dropped() {
    let mut run = RunScore::new(&RunConfig::default());
    let mut events = Vec::new();
    let _ = run.add_candy(3, &mut events);
    assert!(run.end_run(&mut events));
    assert_eq!(run.add_candy(10, &mut events), 0);
    assert_eq!(run.state().candy_total, 3);
}

#[test]
fn reset_starts_a_fresh_run() {
    let mut run = short_run(2.0);
    let mut events = Vec::new();
    let _ = run.add_multiplier(4, &mut events);
    let _ = run.add_candy(2, &mut events);
    let _ = run.tick(Duration::from_secs(3), &mut events);
    assert!(!run.is_running());

    events.clear();
    run.reset(&mut events);
    let state = run.state();
    assert!(state.is_running);
    assert_eq!(state.candy_total, 0);
    assert_eq!(state.multiplier, 1);
    assert_eq!(state.remaining, Duration::from_secs(2));
    assert!(events.contains(&Event::TimerChanged {
        progress: 1.0,
        seconds_left: 2
    }));
}

proptest! {
    #[test]
    fn total_never_decreases_and_multiplier_stays_positive(
        steps in proptest::collection::vec((0u32..20, -5i32..5), 1..64)
    ) {
        let mut run = RunScore::new(&RunConfig::default());
        let mut events = Vec::new();
        let mut previous = 0;

        for (amount, delta) in steps {
            let multiplier = run.state().multiplier;
            let awarded = run.add_candy(amount, &mut events);
            prop_assert_eq!(awarded, amount * multiplier);
            prop_assert!(run.state().candy_total >= previous);
            previous = run.state().candy_total;

            let _ = run.add_multiplier(delta, &mut events);
            prop_assert!(run.state().multiplier >= 1);
        }
    }

    #[test]
    fn timer_reports_stay_in_range(ticks in proptest::collection::vec(0u64..2_000, 1..64)) {
        let mut run = short_run(30.0);
        let mut events = Vec::new();
        for millis in ticks {
            let _ = run.tick(Duration::from_millis(millis), &mut events);
        }
        for event in &events {
            if let Event::TimerChanged { progress, seconds_left } = event {
                prop_assert!((0.0..=1.0).contains(progress));
                prop_assert!(*seconds_left <= 30);
            }
        }
    }
}
