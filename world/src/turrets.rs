//! Authoritative turret state management utilities.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec3;
use outpost_core::{Grade, TurretId, TurretLocation};

/// State of a turret stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TurretState {
    /// Identifier allocated by the world for the turret.
    pub(crate) id: TurretId,
    /// Grade blueprint the turret was built from.
    pub(crate) grade: Grade,
    /// Owner of the turret.
    pub(crate) location: TurretLocation,
    /// Last resting position in world space.
    pub(crate) position: Vec3,
    /// Whether the turret fires at enemies.
    pub(crate) enabled: bool,
    /// Set between a placement and the landing of the turret.
    pub(crate) settling: bool,
    /// Whether the selection highlight is visible.
    pub(crate) highlighted: bool,
    /// Remaining time during which the turret cannot be taken.
    pub(crate) lockout: Duration,
}

impl TurretState {
    /// Whether the turret may currently leave its slot.
    pub(crate) fn is_takeable(&self) -> bool {
        !self.settling && self.lockout.is_zero()
    }
}

/// Registry that stores turrets and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TurretRegistry {
    entries: BTreeMap<TurretId, TurretState>,
    next_turret_id: TurretId,
}

impl TurretRegistry {
    /// Creates an empty turret registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_turret_id: TurretId::new(0),
        }
    }

    /// Inserts a new enabled turret and returns its identifier.
    pub(crate) fn insert(
        &mut self,
        grade: Grade,
        location: TurretLocation,
        position: Vec3,
    ) -> TurretId {
        let id = self.next_turret_id;
        self.next_turret_id = TurretId::new(id.get().saturating_add(1));
        let state = TurretState {
            id,
            grade,
            location,
            position,
            enabled: location != TurretLocation::Hand,
            settling: false,
            highlighted: false,
            lockout: Duration::ZERO,
        };
        let _ = self.entries.insert(id, state);
        id
    }

    /// Removes a turret, returning its final state.
    pub(crate) fn remove(&mut self, turret: TurretId) -> Option<TurretState> {
        self.entries.remove(&turret)
    }

    pub(crate) fn get(&self, turret: TurretId) -> Option<&TurretState> {
        self.entries.get(&turret)
    }

    pub(crate) fn get_mut(&mut self, turret: TurretId) -> Option<&mut TurretState> {
        self.entries.get_mut(&turret)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TurretState> {
        self.entries.values()
    }

    /// Counts lockouts down by the elapsed time.
    pub(crate) fn advance_lockouts(&mut self, dt: Duration) {
        for turret in self.entries.values_mut() {
            turret.lockout = turret.lockout.saturating_sub(dt);
        }
    }
}
