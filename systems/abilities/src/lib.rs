#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that activates abilities stored in the player's backpack.

use std::time::Duration;

use outpost_core::{Command, Event, InventoryView, ABILITY_DELAY};

/// Activates at most one stowed pickup per tick, newest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Abilities {
    cooldown: Duration,
}

impl Abilities {
    /// Creates an ability system with no pending delay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining shared delay before a delayed ability may activate.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Counts the shared delay down and emits an activation command.
    ///
    /// Pickups still travelling into the backpack are skipped, as are delayed
    /// pickups while the shared delay runs. Every activation restarts the delay.
    pub fn handle(&mut self, events: &[Event], inventory: &InventoryView, out: &mut Vec<Command>) {
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.cooldown = self.cooldown.saturating_sub(*dt);
            }
        }

        let ready = inventory
            .backpack
            .iter()
            .rev()
            .filter(|entry| entry.stowed)
            .find(|entry| !(entry.has_delay && !self.cooldown.is_zero()));

        if let Some(entry) = ready {
            self.cooldown = ABILITY_DELAY;
            out.push(Command::ActivateAbility {
                pickup: entry.pickup,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_core::{BackpackEntry, PickupId};

    fn entry(id: u32, stowed: bool, has_delay: bool) -> BackpackEntry {
        BackpackEntry {
            pickup: PickupId::new(id),
            stowed,
            has_delay,
        }
    }

    fn backpack(entries: Vec<BackpackEntry>) -> InventoryView {
        InventoryView {
            backpack: entries,
            ..InventoryView::default()
        }
    }

    #[test]
    fn newest_stowed_pickup_activates_first() {
        let mut abilities = Abilities::new();
        let inventory = backpack(vec![
            entry(0, true, false),
            entry(1, true, false),
            entry(2, false, false),
        ]);
        let mut out = Vec::new();

        abilities.handle(&[], &inventory, &mut out);

        assert_eq!(
            out,
            vec![Command::ActivateAbility {
                pickup: PickupId::new(1)
            }]
        );
        assert_eq!(abilities.cooldown(), ABILITY_DELAY);
    }

    #[test]
    fn delayed_pickups_wait_for_the_shared_delay() {
        let mut abilities = Abilities::new();
        let inventory = backpack(vec![entry(0, true, true), entry(1, true, true)]);
        let mut out = Vec::new();

        abilities.handle(&[], &inventory, &mut out);
        assert_eq!(out.len(), 1);

        let shorter = backpack(vec![entry(0, true, true)]);
        abilities.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_millis(500),
            }],
            &shorter,
            &mut out,
        );
        assert_eq!(out.len(), 1, "delay still running");

        abilities.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_millis(300),
            }],
            &shorter,
            &mut out,
        );
        assert_eq!(
            out.last(),
            Some(&Command::ActivateAbility {
                pickup: PickupId::new(0)
            })
        );
    }

    #[test]
    fn undelayed_pickups_bypass_the_delay() {
        let mut abilities = Abilities::new();
        let mut out = Vec::new();
        abilities.handle(&[], &backpack(vec![entry(0, true, true)]), &mut out);

        abilities.handle(&[], &backpack(vec![entry(3, true, false)]), &mut out);

        assert_eq!(
            out.last(),
            Some(&Command::ActivateAbility {
                pickup: PickupId::new(3)
            })
        );
    }

    #[test]
    fn travelling_pickups_are_skipped() {
        let mut abilities = Abilities::new();
        let mut out = Vec::new();
        abilities.handle(&[], &backpack(vec![entry(0, false, false)]), &mut out);
        assert!(out.is_empty());
        assert!(abilities.cooldown().is_zero());
    }
}
