//! End-of-run report assembled from the event stream.

use std::{collections::BTreeSet, fmt};

use serde::Serialize;
use trick_or_treat_core::{Event, RunState};

/// Candy handed out by one house visit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct Reward {
    /// Numeric identifier of the house.
    pub(crate) house: u32,
    /// Candies caught in the minigame.
    pub(crate) caught: u32,
    /// Amount added to the total after the multiplier.
    pub(crate) awarded: u32,
}

/// Printable result of a headless run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct Summary {
    pub(crate) seed: u64,
    pub(crate) candy_total: u32,
    pub(crate) multiplier: u32,
    pub(crate) elapsed_seconds: f32,
    pub(crate) houses_visited: usize,
    pub(crate) doors_opened: u32,
    pub(crate) qte_failures: u32,
    pub(crate) candies_caught: u32,
    pub(crate) candies_missed: u32,
    pub(crate) rewards: Vec<Reward>,
}

/// Running counters fed with every event batch.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    rewards: Vec<Reward>,
    doors_opened: u32,
    qte_failures: u32,
    caught: u32,
    missed: u32,
}

impl Tally {
    pub(crate) fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::RewardCommitted {
                    house,
                    caught,
                    awarded,
                } => self.rewards.push(Reward {
                    house: house.get(),
                    caught: *caught,
                    awarded: *awarded,
                }),
                Event::DoorOpened { .. } => self.doors_opened += 1,
                Event::QteCompleted { success: false } => self.qte_failures += 1,
                Event::CandyCaught { .. } => self.caught += 1,
                Event::CandyLost { .. } => self.missed += 1,
                _ => {}
            }
        }
    }

    pub(crate) fn finish(self, state: RunState, seed: u64) -> Summary {
        let houses_visited = self
            .rewards
            .iter()
            .map(|reward| reward.house)
            .collect::<BTreeSet<_>>()
            .len();
        Summary {
            seed,
            candy_total: state.candy_total,
            multiplier: state.multiplier,
            elapsed_seconds: state.elapsed.as_secs_f32(),
            houses_visited,
            doors_opened: self.doors_opened,
            qte_failures: self.qte_failures,
            candies_caught: self.caught,
            candies_missed: self.missed,
            rewards: self.rewards,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Trick or Treat run (seed {})", self.seed)?;
        writeln!(
            f,
            "  candy total    {} (x{} multiplier)",
            self.candy_total, self.multiplier
        )?;
        writeln!(f, "  time played    {:.1}s", self.elapsed_seconds)?;
        writeln!(f, "  houses visited {}", self.houses_visited)?;
        writeln!(f, "  doors opened   {}", self.doors_opened)?;
        writeln!(f, "  arrow failures {}", self.qte_failures)?;
        writeln!(
            f,
            "  candies        {} caught, {} missed",
            self.candies_caught, self.candies_missed
        )?;
        for reward in &self.rewards {
            writeln!(
                f,
                "  house #{:<3} caught {:>2} -> +{}",
                reward.house, reward.caught, reward.awarded
            )?;
        }
        Ok(())
    }
}
