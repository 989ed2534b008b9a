//! Ability pickups and the ordered backpack they are collected into.

use std::collections::BTreeMap;

use glam::Vec3;
use outpost_core::{BackpackEntry, PickupId};

#[derive(Clone, Debug)]
pub(crate) struct PickupState {
    pub(crate) id: PickupId,
    pub(crate) position: Vec3,
    pub(crate) has_delay: bool,
    /// Cleared once the pickup is collected so proximity queries skip it.
    pub(crate) collidable: bool,
    /// Set once the pickup reached its backpack position.
    pub(crate) stowed: bool,
}

/// Pickup storage plus the insertion-ordered backpack.
#[derive(Debug)]
pub(crate) struct Backpack {
    pickups: BTreeMap<PickupId, PickupState>,
    order: Vec<PickupId>,
    next_pickup_id: PickupId,
}

impl Backpack {
    pub(crate) fn new() -> Self {
        Self {
            pickups: BTreeMap::new(),
            order: Vec::new(),
            next_pickup_id: PickupId::new(0),
        }
    }

    pub(crate) fn spawn(&mut self, position: Vec3, has_delay: bool) -> PickupId {
        let id = self.next_pickup_id;
        self.next_pickup_id = PickupId::new(id.get().saturating_add(1));
        let state = PickupState {
            id,
            position,
            has_delay,
            collidable: true,
            stowed: false,
        };
        let _ = self.pickups.insert(id, state);
        id
    }

    pub(crate) fn contains(&self, pickup: PickupId) -> bool {
        self.order.contains(&pickup)
    }

    /// Appends a world pickup to the backpack and returns its index.
    ///
    /// Returns `None` when the pickup does not exist or was already collected.
    pub(crate) fn collect(&mut self, pickup: PickupId) -> Option<usize> {
        if self.contains(pickup) {
            return None;
        }
        let state = self.pickups.get_mut(&pickup)?;
        state.collidable = false;
        let index = self.order.len();
        self.order.push(pickup);
        Some(index)
    }

    pub(crate) fn stow(&mut self, pickup: PickupId) -> bool {
        if !self.contains(pickup) {
            return false;
        }
        match self.pickups.get_mut(&pickup) {
            Some(state) => {
                state.stowed = true;
                true
            }
            None => false,
        }
    }

    /// Removes a stowed pickup from the backpack and the world.
    pub(crate) fn consume(&mut self, pickup: PickupId) -> bool {
        let stowed = self.pickups.get(&pickup).is_some_and(|state| state.stowed);
        if !stowed {
            return false;
        }
        let Some(position) = self.order.iter().position(|entry| *entry == pickup) else {
            return false;
        };
        let _ = self.order.remove(position);
        let _ = self.pickups.remove(&pickup);
        true
    }

    pub(crate) fn pickups(&self) -> impl Iterator<Item = &PickupState> {
        self.pickups.values()
    }

    /// Backpack entries in insertion order, skipping pickups that vanished.
    pub(crate) fn entries(&self) -> Vec<BackpackEntry> {
        self.order
            .iter()
            .filter_map(|id| self.pickups.get(id))
            .map(|state| BackpackEntry {
                pickup: state.id,
                stowed: state.stowed,
                has_delay: state.has_delay,
            })
            .collect()
    }
}
