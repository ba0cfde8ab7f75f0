//! Registry of the houses lining the street.

use std::collections::BTreeMap;

use glam::Vec2;
use log::warn;
use trick_or_treat_core::{FloatRange, HouseId};
use trick_or_treat_system_door::{DoorConfig, DoorSequencer};
use trick_or_treat_system_sequencer::TimerHandle;

use crate::config::HouseConfig;

/// Authoritative state of one house.
#[derive(Debug)]
pub(crate) struct House {
    pub(crate) id: HouseId,
    pub(crate) anchor: Vec2,
    pub(crate) trigger: FloatRange,
    pub(crate) door: DoorSequencer,
    pub(crate) available: bool,
    pub(crate) lit_at_start: bool,
    pub(crate) cooldown: Option<TimerHandle>,
}

/// Houses keyed by identifier, wired once at construction.
#[derive(Debug, Default)]
pub(crate) struct HouseRegistry {
    entries: BTreeMap<HouseId, House>,
}

impl HouseRegistry {
    pub(crate) fn new(houses: &[HouseConfig], default_door: &DoorConfig) -> Self {
        let mut entries = BTreeMap::new();
        for config in houses {
            let door = config.door.clone().unwrap_or_else(|| default_door.clone());
            let house = House {
                id: config.id,
                anchor: config.door_anchor,
                trigger: config.trigger,
                door: DoorSequencer::new(config.id, door),
                available: config.available_at_start,
                lit_at_start: config.available_at_start,
                cooldown: None,
            };
            if entries.insert(config.id, house).is_some() {
                warn!("{} registered twice; keeping the last entry", config.id);
            }
        }
        Self { entries }
    }

    pub(crate) fn get(&self, id: HouseId) -> Option<&House> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: HouseId) -> Option<&mut House> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &House> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut House> {
        self.entries.values_mut()
    }

    /// First house, by identifier, whose trigger covers `x`.
    pub(crate) fn at(&self, x: f32) -> Option<HouseId> {
        self.entries
            .values()
            .find(|house| house.trigger.contains(x))
            .map(|house| house.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_position_uses_triggers() {
        let houses = [
            HouseConfig::new(HouseId::new(2), Vec2::new(10.0, 1.0), 1.0),
            HouseConfig::new(HouseId::new(1), Vec2::new(0.0, 1.0), 1.0),
        ];
        let registry = HouseRegistry::new(&houses, &DoorConfig::default());
        assert_eq!(registry.at(0.5), Some(HouseId::new(1)));
        assert_eq!(registry.at(9.2), Some(HouseId::new(2)));
        assert_eq!(registry.at(5.0), None);
    }
}
