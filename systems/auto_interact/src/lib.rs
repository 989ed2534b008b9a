#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns dwell time next to a slot into an automatic action.

use outpost_core::{Command, Event, InventoryConfig, InventoryView, AUTO_INTERACT_COOLDOWN};

/// Dwell-time accumulator that fires at most one inventory action per crossing.
#[derive(Clone, Debug, PartialEq)]
pub struct AutoInteract {
    threshold: f32,
    accumulator: f32,
}

impl AutoInteract {
    /// Creates an idle timer using the configured dwell time.
    #[must_use]
    pub fn new(config: &InventoryConfig) -> Self {
        Self {
            threshold: config.auto_interaction_time,
            accumulator: 0.0,
        }
    }

    /// Accumulated dwell time in seconds. Negative while cooling down.
    #[must_use]
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Fill ratio of the dwell indicator, clamped to `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.threshold <= 0.0 {
            return 1.0;
        }
        (self.accumulator / self.threshold).clamp(0.0, 1.0)
    }

    /// Advances the accumulator by the elapsed time of the tick.
    ///
    /// Time only counts while a slot is selected and the threshold has not been
    /// reached. Dwelling next to a takeable turret on a slot that shows its range
    /// fills at half speed.
    pub fn advance(&mut self, events: &[Event], inventory: &InventoryView) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    let Some(slot) = inventory.selected else {
                        continue;
                    };
                    if self.accumulator >= self.threshold {
                        continue;
                    }

                    let mut elapsed = dt.as_secs_f32();
                    if inventory.can_take && slot.show_range {
                        elapsed /= 2.0;
                    }
                    self.accumulator += elapsed;
                }
                Event::SlotSelected { .. } => self.accumulator = 0.0,
                _ => {}
            }
        }
    }

    /// Resets on new selections and fires the highest-priority legal action
    /// once the threshold is reached.
    pub fn handle(&mut self, events: &[Event], inventory: &InventoryView, out: &mut Vec<Command>) {
        if events
            .iter()
            .any(|event| matches!(event, Event::SlotSelected { .. }))
        {
            self.accumulator = 0.0;
        }

        if self.accumulator < self.threshold {
            return;
        }

        if inventory.selected.is_none() {
            self.accumulator = AUTO_INTERACT_COOLDOWN;
            return;
        }

        let command = if inventory.can_upgrade {
            Command::UpgradeTurret
        } else if inventory.can_take {
            Command::TakeTurret
        } else if inventory.can_place {
            Command::PlaceTurret
        } else {
            return;
        };

        out.push(command);
        self.accumulator = AUTO_INTERACT_COOLDOWN;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use outpost_core::{HeldSnapshot, SlotId, SlotSnapshot, TurretId};
    use std::time::Duration;

    fn selected(show_range: bool) -> InventoryView {
        InventoryView {
            selected: Some(SlotSnapshot {
                id: SlotId::new(0),
                position: Vec3::ZERO,
                show_range,
                occupant: None,
            }),
            ..InventoryView::default()
        }
    }

    fn seconds(value: u64) -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_secs(value),
        }]
    }

    #[test]
    fn idle_without_selection() {
        let mut timer = AutoInteract::new(&InventoryConfig::default());
        timer.advance(&seconds(5), &InventoryView::default());
        assert_eq!(timer.accumulator(), 0.0);
    }

    #[test]
    fn takeable_slot_with_range_fills_at_half_speed() {
        let mut timer = AutoInteract::new(&InventoryConfig::default());
        let inventory = InventoryView {
            can_take: true,
            ..selected(true)
        };

        timer.advance(&seconds(1), &inventory);
        assert!((timer.progress() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn accumulator_stops_at_threshold() {
        let mut timer = AutoInteract::new(&InventoryConfig::default());
        let inventory = selected(false);
        timer.advance(&seconds(3), &inventory);
        timer.advance(&seconds(3), &inventory);
        assert_eq!(timer.accumulator(), 3.0);
        assert_eq!(timer.progress(), 1.0);
    }

    #[test]
    fn upgrade_takes_priority_over_take_and_place() {
        let mut timer = AutoInteract::new(&InventoryConfig::default());
        let inventory = InventoryView {
            held: Some(HeldSnapshot {
                turret: TurretId::new(0),
                next_grade: None,
            }),
            can_take: true,
            can_place: true,
            can_upgrade: true,
            ..selected(false)
        };
        timer.advance(&seconds(2), &inventory);

        let mut out = Vec::new();
        timer.handle(&[], &inventory, &mut out);
        timer.handle(&[], &inventory, &mut out);

        assert_eq!(out, vec![Command::UpgradeTurret]);
        assert_eq!(timer.accumulator(), AUTO_INTERACT_COOLDOWN);
        assert_eq!(timer.progress(), 0.0);
    }

    #[test]
    fn take_precedes_place() {
        let mut timer = AutoInteract::new(&InventoryConfig::default());
        let inventory = InventoryView {
            can_take: true,
            can_place: true,
            ..selected(false)
        };
        timer.advance(&seconds(2), &inventory);

        let mut out = Vec::new();
        timer.handle(&[], &inventory, &mut out);
        assert_eq!(out, vec![Command::TakeTurret]);
    }

    #[test]
    fn selection_without_legal_action_stays_armed() {
        let mut timer = AutoInteract::new(&InventoryConfig::default());
        let inventory = selected(false);
        timer.advance(&seconds(2), &inventory);

        let mut out = Vec::new();
        timer.handle(&[], &inventory, &mut out);

        assert!(out.is_empty());
        assert_eq!(timer.accumulator(), 2.0);
    }

    #[test]
    fn lost_selection_at_threshold_cools_down() {
        let mut timer = AutoInteract::new(&InventoryConfig::default());
        timer.advance(&seconds(2), &selected(false));

        let mut out = Vec::new();
        timer.handle(&[], &InventoryView::default(), &mut out);

        assert!(out.is_empty());
        assert_eq!(timer.accumulator(), AUTO_INTERACT_COOLDOWN);
    }

    #[test]
    fn new_selection_restarts_the_dwell() {
        let mut timer = AutoInteract::new(&InventoryConfig::default());
        let inventory = InventoryView {
            can_take: true,
            ..selected(false)
        };
        timer.advance(&seconds(2), &inventory);

        let mut out = Vec::new();
        timer.handle(
            &[Event::SlotSelected {
                slot: SlotId::new(1),
            }],
            &inventory,
            &mut out,
        );

        assert!(out.is_empty());
        assert_eq!(timer.accumulator(), 0.0);
    }
}
