#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that periodically scans the player's surroundings for slots
//! and pickups.
//!
//! The scan runs on a fixed interval that is independent of the frame rate.
//! Each scan selects the nearest qualifying placement slot, clears the
//! selection when nothing is in reach and forwards every pickup it touches
//! to the world for collection.

use std::time::Duration;

use arrayvec::ArrayVec;
use glam::Vec3;
use outpost_core::{
    Command, Event, Interactable, InteractableMask, InventoryConfig, InventoryView,
    PlayerSnapshot, SlotId, SlotSnapshot, OVERLAP_CAPACITY,
};

/// Fixed-capacity buffer filled by a single overlap query.
pub type OverlapBuffer = ArrayVec<Interactable, OVERLAP_CAPACITY>;

/// Proximity scanner that reuses a fixed overlap buffer between scans.
#[derive(Debug)]
pub struct ProximityScanner {
    interval: Duration,
    radius: f32,
    mask: InteractableMask,
    accumulator: Duration,
    hits: OverlapBuffer,
}

impl ProximityScanner {
    /// Creates a scanner tuned by the provided inventory configuration.
    #[must_use]
    pub fn new(config: &InventoryConfig) -> Self {
        Self {
            interval: Duration::try_from_secs_f32(config.interact_check_interval.max(0.0))
                .unwrap_or_default(),
            radius: config.interact_radius,
            mask: InteractableMask::default(),
            accumulator: Duration::ZERO,
            hits: ArrayVec::new(),
        }
    }

    /// Restricts the interactables reported by future scans.
    #[must_use]
    pub fn with_mask(mut self, mask: InteractableMask) -> Self {
        self.mask = mask;
        self
    }

    /// Interactables discovered by the most recent scan.
    #[must_use]
    pub fn last_hits(&self) -> &[Interactable] {
        &self.hits
    }

    /// Advances the scan clock and, when a scan is due, emits selection and
    /// collection commands.
    ///
    /// `overlap` performs the sphere query; it receives the centre, radius,
    /// mask and the buffer to fill and returns the number of hits.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        player: &PlayerSnapshot,
        inventory: &InventoryView,
        slots: &[SlotSnapshot],
        overlap: F,
        out: &mut Vec<Command>,
    ) where
        F: FnOnce(Vec3, f32, InteractableMask, &mut OverlapBuffer) -> usize,
    {
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.accumulator = self.accumulator.saturating_add(*dt);
            }
        }

        if self.accumulator < self.interval {
            return;
        }
        self.accumulator = Duration::ZERO;

        let centre = player.interaction_origin();
        let found = overlap(centre, self.radius, self.mask, &mut self.hits);
        if found == 0 {
            if inventory.selected.is_some() {
                out.push(Command::ClearSelection);
            }
            return;
        }

        let holding = inventory.has_turret();
        let mut best: Option<BestSlot> = None;

        for hit in self.hits.iter().take(found) {
            match *hit {
                Interactable::Slot(id) => {
                    let Some(slot) = find_slot(slots, id) else {
                        continue;
                    };
                    if !holding && slot.occupant.is_none() {
                        continue;
                    }

                    let current = BestSlot {
                        distance_sq: slot.position.distance_squared(centre),
                        slot: id,
                    };
                    match &mut best {
                        Some(existing) => {
                            if current.precedes(existing) {
                                *existing = current;
                            }
                        }
                        None => best = Some(current),
                    }
                }
                Interactable::Pickup(pickup) => {
                    if !inventory.holds_pickup(pickup) {
                        out.push(Command::CollectPickup { pickup });
                    }
                }
            }
        }

        if let Some(best) = best {
            if inventory.selected_slot() != Some(best.slot) {
                out.push(Command::SelectSlot { slot: best.slot });
            }
        }
    }
}

fn find_slot(slots: &[SlotSnapshot], slot: SlotId) -> Option<&SlotSnapshot> {
    slots
        .binary_search_by_key(&slot, |snapshot| snapshot.id)
        .ok()
        .map(|index| &slots[index])
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestSlot {
    distance_sq: f32,
    slot: SlotId,
}

impl BestSlot {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }

        self.slot < other.slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use outpost_core::{HeldSnapshot, PickupId, TurretId};

    fn player_at_origin() -> PlayerSnapshot {
        PlayerSnapshot {
            position: Vec3::ZERO,
            facing: Quat::IDENTITY,
            grounded: true,
        }
    }

    fn slot(id: u32, position: Vec3, occupied: bool) -> SlotSnapshot {
        SlotSnapshot {
            id: SlotId::new(id),
            position,
            show_range: true,
            occupant: occupied.then(|| TurretId::new(id)),
        }
    }

    fn tick() -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(5),
        }]
    }

    fn report(
        hits: &[Interactable],
    ) -> impl FnOnce(Vec3, f32, InteractableMask, &mut OverlapBuffer) -> usize {
        let hits = hits.to_vec();
        move |_, _, _, buffer| {
            buffer.clear();
            buffer.extend(hits.iter().copied());
            buffer.len()
        }
    }

    #[test]
    fn scan_waits_for_the_interval() {
        let mut scanner = ProximityScanner::new(&InventoryConfig::default());
        let slots = [slot(0, Vec3::Z, true)];
        let mut out = Vec::new();

        scanner.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_millis(2),
            }],
            &player_at_origin(),
            &InventoryView::default(),
            &slots,
            |_, _, _, _| panic!("scan ran early"),
            &mut out,
        );

        assert!(out.is_empty());
    }

    #[test]
    fn nearest_occupied_slot_is_selected() {
        let mut scanner = ProximityScanner::new(&InventoryConfig::default());
        let slots = [
            slot(0, Vec3::new(0.0, 0.0, 2.0), true),
            slot(1, Vec3::new(0.0, 0.0, 0.75), true),
        ];
        let mut out = Vec::new();

        scanner.handle(
            &tick(),
            &player_at_origin(),
            &InventoryView::default(),
            &slots,
            report(&[
                Interactable::Slot(SlotId::new(0)),
                Interactable::Slot(SlotId::new(1)),
            ]),
            &mut out,
        );

        assert_eq!(
            out,
            vec![Command::SelectSlot {
                slot: SlotId::new(1)
            }]
        );
    }

    #[test]
    fn equidistant_slots_prefer_smaller_identifier() {
        let mut scanner = ProximityScanner::new(&InventoryConfig::default());
        let slots = [
            slot(3, Vec3::new(1.0, 0.0, 0.5), true),
            slot(4, Vec3::new(-1.0, 0.0, 0.5), true),
        ];
        let mut out = Vec::new();

        scanner.handle(
            &tick(),
            &player_at_origin(),
            &InventoryView::default(),
            &slots,
            report(&[
                Interactable::Slot(SlotId::new(4)),
                Interactable::Slot(SlotId::new(3)),
            ]),
            &mut out,
        );

        assert_eq!(
            out,
            vec![Command::SelectSlot {
                slot: SlotId::new(3)
            }]
        );
    }

    #[test]
    fn empty_slot_only_qualifies_while_holding() {
        let slots = [slot(0, Vec3::Z, false)];
        let hits: &[Interactable] = &[Interactable::Slot(SlotId::new(0))];

        let mut scanner = ProximityScanner::new(&InventoryConfig::default());
        let mut out = Vec::new();
        scanner.handle(
            &tick(),
            &player_at_origin(),
            &InventoryView::default(),
            &slots,
            report(hits),
            &mut out,
        );
        assert!(out.is_empty(), "empty hand ignores vacant slots");

        let holding = InventoryView {
            held: Some(HeldSnapshot {
                turret: TurretId::new(9),
                next_grade: None,
            }),
            ..InventoryView::default()
        };
        scanner.handle(
            &tick(),
            &player_at_origin(),
            &holding,
            &slots,
            report(hits),
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::SelectSlot {
                slot: SlotId::new(0)
            }]
        );
    }

    #[test]
    fn nothing_in_reach_clears_an_existing_selection() {
        let mut scanner = ProximityScanner::new(&InventoryConfig::default());
        let selected = InventoryView {
            selected: Some(slot(0, Vec3::Z, true)),
            ..InventoryView::default()
        };
        let mut out = Vec::new();

        scanner.handle(&tick(), &player_at_origin(), &selected, &[], report(&[]), &mut out);
        assert_eq!(out, vec![Command::ClearSelection]);

        out.clear();
        scanner.handle(
            &tick(),
            &player_at_origin(),
            &InventoryView::default(),
            &[],
            report(&[]),
            &mut out,
        );
        assert!(out.is_empty(), "nothing selected, nothing to clear");
    }

    #[test]
    fn current_selection_is_not_reselected() {
        let mut scanner = ProximityScanner::new(&InventoryConfig::default());
        let current = slot(0, Vec3::Z, true);
        let selected = InventoryView {
            selected: Some(current),
            ..InventoryView::default()
        };
        let mut out = Vec::new();

        scanner.handle(
            &tick(),
            &player_at_origin(),
            &selected,
            &[current],
            report(&[Interactable::Slot(SlotId::new(0))]),
            &mut out,
        );

        assert!(out.is_empty());
    }

    #[test]
    fn pickups_in_reach_are_collected() {
        let mut scanner = ProximityScanner::new(&InventoryConfig::default());
        let mut out = Vec::new();

        scanner.handle(
            &tick(),
            &player_at_origin(),
            &InventoryView::default(),
            &[],
            report(&[Interactable::Pickup(PickupId::new(2))]),
            &mut out,
        );

        assert_eq!(
            out,
            vec![Command::CollectPickup {
                pickup: PickupId::new(2)
            }]
        );
        assert_eq!(scanner.last_hits(), &[Interactable::Pickup(PickupId::new(2))]);
    }

    #[test]
    fn query_receives_offset_centre_and_radius() {
        let mut scanner =
            ProximityScanner::new(&InventoryConfig::default()).with_mask(InteractableMask::SLOTS);
        let mut out = Vec::new();

        scanner.handle(
            &tick(),
            &player_at_origin(),
            &InventoryView::default(),
            &[],
            |centre, radius, mask, _| {
                assert!((centre - Vec3::new(0.0, 0.0, 0.5)).length() < 1e-5);
                assert!((radius - 2.0).abs() < f32::EPSILON);
                assert_eq!(mask, InteractableMask::SLOTS);
                0
            },
            &mut out,
        );
    }
}
