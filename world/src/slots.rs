//! Placement slot storage.

use std::collections::BTreeMap;

use glam::Vec3;
use outpost_core::{SlotId, SlotSnapshot, TurretId};

#[derive(Clone, Debug)]
pub(crate) struct SlotState {
    pub(crate) id: SlotId,
    pub(crate) position: Vec3,
    pub(crate) show_range: bool,
    pub(crate) occupant: Option<TurretId>,
    /// Whether the slot currently previews the held turret's range.
    pub(crate) range_preview: bool,
}

impl SlotState {
    pub(crate) fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            id: self.id,
            position: self.position,
            show_range: self.show_range,
            occupant: self.occupant,
        }
    }
}

#[derive(Debug)]
pub(crate) struct SlotRegistry {
    entries: BTreeMap<SlotId, SlotState>,
    next_slot_id: SlotId,
}

impl SlotRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_slot_id: SlotId::new(0),
        }
    }

    pub(crate) fn insert(&mut self, position: Vec3, show_range: bool) -> SlotId {
        let id = self.next_slot_id;
        self.next_slot_id = SlotId::new(id.get().saturating_add(1));
        let state = SlotState {
            id,
            position,
            show_range,
            occupant: None,
            range_preview: false,
        };
        let _ = self.entries.insert(id, state);
        id
    }

    pub(crate) fn get(&self, slot: SlotId) -> Option<&SlotState> {
        self.entries.get(&slot)
    }

    pub(crate) fn get_mut(&mut self, slot: SlotId) -> Option<&mut SlotState> {
        self.entries.get_mut(&slot)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &SlotState> {
        self.entries.values()
    }
}
