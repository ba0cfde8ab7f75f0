use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use trick_or_treat_core::{ArrowSymbol, Event};
use trick_or_treat_system_arrow_qte::{ArrowQte, InputOutcome, QteConfig, DEFAULT_POOL};

fn successes(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::QteCompleted { success: true }))
        .count()
}

fn wrong_symbol_for(expected: ArrowSymbol) -> ArrowSymbol {
    ArrowSymbol::ALL
        .into_iter()
        .find(|symbol| *symbol != expected)
        .expect("four symbols always leave a wrong one")
}

#[test]
fn default_config_uses_three_symbols_without_down() {
    let config = QteConfig::default();
    assert_eq!(config.length, 3);
    assert!(!config.pool.contains(&ArrowSymbol::Down));
}

#[test]
fn zero_length_is_clamped_to_one() {
    let mut qte = ArrowQte::default();
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut events = Vec::new();
    qte.run(0, &mut rng, &mut events);
    assert_eq!(qte.sequence().len(), 1);

    let symbol = qte.sequence()[0];
    assert_eq!(qte.handle_input(symbol, &mut events), InputOutcome::Completed);
}

#[test]
fn run_reports_initial_progress_text() {
    let mut qte = ArrowQte::default();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut events = Vec::new();
    qte.run(3, &mut rng, &mut events);

    assert!(matches!(events.first(), Some(Event::QteStarted { sequence }) if sequence.len() == 3));
    assert!(events.contains(&Event::QteProgressed {
        matched: 0,
        length: 3
    }));
    let text = events.iter().find_map(|event| match event {
        Event::InstructionTextChanged { text } => Some(text.clone()),
        _ => None,
    });
    assert!(text.expect("instruction text").ends_with("Progress: 0/3"));
}

#[test]
fn input_after_success_is_ignored() {
    let mut qte = ArrowQte::default();
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let mut events = Vec::new();
    qte.run(2, &mut rng, &mut events);
    let sequence = qte.sequence().to_vec();
    for symbol in &sequence {
        let _ = qte.handle_input(*symbol, &mut events);
    }
    assert_eq!(qte.handle_input(sequence[0], &mut events), InputOutcome::Ignored);
    assert_eq!(successes(&events), 1);
}

#[test]
fn abort_reports_failure_once() {
    let mut qte = ArrowQte::default();
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut events = Vec::new();
    qte.run(4, &mut rng, &mut events);

    assert!(qte.abort(&mut events));
    assert!(!qte.abort(&mut events));
    let failures = events
        .iter()
        .filter(|event| matches!(event, Event::QteCompleted { success: false }))
        .count();
    assert_eq!(failures, 1);
}

proptest! {
    #[test]
    fn correct_sequence_succeeds_exactly_once(seed in any::<u64>(), length in 1u32..16) {
        let mut qte = ArrowQte::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut events = Vec::new();
        qte.run(length, &mut rng, &mut events);

        let sequence = qte.sequence().to_vec();
        prop_assert_eq!(sequence.len(), length as usize);
        prop_assert!(sequence.iter().all(|symbol| DEFAULT_POOL.contains(symbol)));

        for (index, symbol) in sequence.iter().enumerate() {
            let outcome = qte.handle_input(*symbol, &mut events);
            prop_assert_ne!(outcome, InputOutcome::Reset);
            if index + 1 == sequence.len() {
                prop_assert_eq!(outcome, InputOutcome::Completed);
            }
        }

        prop_assert_eq!(successes(&events), 1);
        prop_assert!(!qte.is_active());
    }

    #[test]
    fn mismatch_resets_without_success(seed in any::<u64>(), length in 1u32..16, position in 0usize..16) {
        let mut qte = ArrowQte::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut events = Vec::new();
        qte.run(length, &mut rng, &mut events);

        let sequence = qte.sequence().to_vec();
        let position = position % sequence.len();
        for symbol in &sequence[..position] {
            let _ = qte.handle_input(*symbol, &mut events);
        }
        prop_assert_eq!(qte.cursor(), position);

        let outcome = qte.handle_input(wrong_symbol_for(sequence[position]), &mut events);
        prop_assert_eq!(outcome, InputOutcome::Reset);
        prop_assert_eq!(qte.cursor(), 0);
        prop_assert!(qte.is_active());
        prop_assert_eq!(successes(&events), 0);
    }
}
