#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative yard state management for Outpost.
//!
//! The world owns every slot, turret, pickup and enemy together with the
//! player's hand and selection. All mutations flow through [`apply`]; links
//! between slots and turrets are always rewritten on both sides within a
//! single command so a turret is owned by exactly one location.

mod backpack;
mod slots;
mod turrets;

use std::{collections::BTreeMap, time::Duration};

use glam::{Quat, Vec3};
use outpost_core::{
    Command, Continuation, Ease, EnemyId, Event, Grade, GradeCatalog, InventoryConfig, Motion,
    PickupId, SlotId, TurretId, TurretLocation, TweenId, TweenRequest, TweenSubject,
};
use tracing::{debug, trace};

use crate::{
    backpack::Backpack,
    slots::{SlotRegistry, SlotState},
    turrets::{TurretRegistry, TurretState},
};

const PLACE_JUMP: Duration = Duration::from_millis(600);
const PLACE_JUMP_HEIGHT: f32 = 2.0;
const PLACE_SCALE: Duration = Duration::from_millis(200);
const PLACE_ROTATE: Duration = Duration::from_secs(1);
const SQUASH_DELAY: Duration = Duration::from_millis(500);
const SQUASH_STEP: Duration = Duration::from_millis(100);
const TAKE_STEP: Duration = Duration::from_millis(300);
const TAKE_JUMP_HEIGHT: f32 = 1.0;
const UPGRADE_JUMP: Duration = Duration::from_millis(250);
const UPGRADE_JUMP_HEIGHT: f32 = 1.0;
const UPGRADE_GROW: Duration = Duration::from_millis(500);
const PICKUP_SCALE_FACTOR: f32 = 0.8;

const SQUASHED_SCALE: Vec3 = Vec3::new(1.3, 0.7, 1.3);
const STRETCHED_SCALE: Vec3 = Vec3::new(0.8, 1.3, 0.8);

#[derive(Clone, Debug)]
struct Player {
    position: Vec3,
    facing: Quat,
    grounded: bool,
    held: Option<TurretId>,
    selected: Option<SlotId>,
    placing: bool,
    upgrading: bool,
}

impl Player {
    fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            facing: Quat::IDENTITY,
            grounded: true,
            held: None,
            selected: None,
            placing: false,
            upgrading: false,
        }
    }
}

#[derive(Clone, Debug)]
struct EnemyState {
    id: EnemyId,
    position: Vec3,
    health: f32,
    deceleration: f32,
}

/// Represents the authoritative Outpost yard state.
#[derive(Debug)]
pub struct World {
    config: InventoryConfig,
    catalog: GradeCatalog,
    player: Player,
    slots: SlotRegistry,
    turrets: TurretRegistry,
    backpack: Backpack,
    enemies: BTreeMap<EnemyId, EnemyState>,
    next_enemy_id: EnemyId,
    next_tween_id: TweenId,
    tick_index: u64,
    game_finished: bool,
}

impl World {
    /// Creates an empty yard that builds turrets from the provided catalog.
    #[must_use]
    pub fn new(catalog: GradeCatalog, config: InventoryConfig) -> Self {
        Self {
            config,
            catalog,
            player: Player::new(),
            slots: SlotRegistry::new(),
            turrets: TurretRegistry::new(),
            backpack: Backpack::new(),
            enemies: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
            next_tween_id: TweenId::new(0),
            tick_index: 0,
            game_finished: false,
        }
    }

    fn next_grade_of(&self, turret: TurretId) -> Option<Grade> {
        self.turrets
            .get(turret)
            .and_then(|state| self.catalog.next_grade(state.grade))
    }

    fn held(&self) -> Option<TurretId> {
        self.player
            .held
            .filter(|turret| self.turrets.get(*turret).is_some())
    }

    fn selected_slot(&self) -> Option<&SlotState> {
        self.player.selected.and_then(|slot| self.slots.get(slot))
    }

    fn selected_occupant(&self) -> Option<&TurretState> {
        self.selected_slot()
            .and_then(|slot| slot.occupant)
            .and_then(|turret| self.turrets.get(turret))
    }

    fn can_take(&self) -> bool {
        if self.player.upgrading {
            return false;
        }
        let Some(occupant) = self.selected_occupant() else {
            return false;
        };
        if !occupant.is_takeable() {
            return false;
        }

        match self.held() {
            None => true,
            // Swapping compares upgrade paths, not instances.
            Some(held) => {
                !self.player.placing
                    && self.next_grade_of(held) != self.catalog.next_grade(occupant.grade)
            }
        }
    }

    fn can_place(&self) -> bool {
        if self.player.placing || self.player.upgrading || self.held().is_none() {
            return false;
        }
        self.selected_slot()
            .is_some_and(|slot| slot.occupant.is_none())
    }

    fn can_upgrade(&self) -> bool {
        if self.player.upgrading {
            return false;
        }
        let Some(held) = self.held() else {
            return false;
        };
        let Some(occupant) = self.selected_occupant() else {
            return false;
        };
        if occupant.id == held || occupant.settling {
            return false;
        }

        let placed_next = self.catalog.next_grade(occupant.grade);
        placed_next.is_some() && placed_next == self.next_grade_of(held)
    }

    fn allocate_tween(
        &mut self,
        subject: TweenSubject,
        motion: Motion,
        duration: Duration,
    ) -> TweenRequest {
        let id = self.next_tween_id;
        self.next_tween_id = TweenId::new(id.get().wrapping_add(1));
        TweenRequest::new(id, subject, motion, duration)
    }

    fn prune_stale_references(&mut self) {
        if let Some(turret) = self.player.held {
            if self.turrets.get(turret).is_none() {
                trace!(turret = turret.get(), "dropping stale held turret");
                self.player.held = None;
            }
        }
        if let Some(slot) = self.player.selected {
            if self.slots.get(slot).is_none() {
                trace!(slot = slot.get(), "dropping stale selection");
                self.player.selected = None;
            }
        }
    }

    fn select_slot(&mut self, slot: SlotId, out_events: &mut Vec<Event>) {
        if self.slots.get(slot).is_none() {
            trace!(slot = slot.get(), "select ignored: unknown slot");
            return;
        }
        if self.player.selected == Some(slot) {
            return;
        }

        self.clear_selection(out_events);
        self.player.selected = Some(slot);
        out_events.push(Event::SlotSelected { slot });
        self.show_feedback(slot, out_events);
    }

    fn clear_selection(&mut self, out_events: &mut Vec<Event>) {
        if let Some(previous) = self.player.selected.take() {
            self.reset_feedback(previous, out_events);
            out_events.push(Event::SlotDeselected { slot: previous });
        }
    }

    fn show_feedback(&mut self, slot: SlotId, out_events: &mut Vec<Event>) {
        let Some(state) = self.slots.get(slot) else {
            return;
        };
        if !state.show_range {
            return;
        }
        let occupant = state.occupant;
        let held = self.held();
        let highlight_occupant = held.is_none() || self.can_upgrade();

        if let Some(occupant) = occupant.filter(|_| highlight_occupant) {
            if let Some(turret) = self.turrets.get_mut(occupant) {
                turret.highlighted = true;
                out_events.push(Event::TurretHighlightChanged {
                    turret: occupant,
                    highlighted: true,
                });
            }
            return;
        }

        let Some(blueprint) = held
            .and_then(|turret| self.turrets.get(turret))
            .and_then(|turret| self.catalog.get(turret.grade))
        else {
            return;
        };
        let radius = blueprint.aim_distance;
        let color = blueprint.range_color;
        if let Some(state) = self.slots.get_mut(slot) {
            state.range_preview = true;
            out_events.push(Event::RangePreviewShown {
                slot,
                radius,
                color,
            });
        }
    }

    fn reset_feedback(&mut self, slot: SlotId, out_events: &mut Vec<Event>) {
        let Some(state) = self.slots.get_mut(slot) else {
            return;
        };
        let occupant = state.occupant;
        if state.range_preview {
            state.range_preview = false;
            out_events.push(Event::RangePreviewHidden { slot });
        }
        if let Some(turret) = occupant {
            self.set_highlight(turret, false, out_events);
        }
    }

    fn set_highlight(&mut self, turret: TurretId, highlighted: bool, out_events: &mut Vec<Event>) {
        if let Some(state) = self.turrets.get_mut(turret) {
            if state.highlighted != highlighted {
                state.highlighted = highlighted;
                out_events.push(Event::TurretHighlightChanged {
                    turret,
                    highlighted,
                });
            }
        }
    }

    fn take(&mut self, out_events: &mut Vec<Event>) {
        if !self.can_take() {
            trace!("take ignored: preconditions unmet");
            return;
        }
        let Some(slot) = self.player.selected else {
            return;
        };
        let Some(taken) = self.slots.get(slot).and_then(|state| state.occupant) else {
            return;
        };

        self.clear_selection(out_events);
        if let Some(state) = self.slots.get_mut(slot) {
            state.occupant = None;
        }
        if let Some(previous) = self.held() {
            self.begin_placement(previous, slot, out_events);
        }

        if let Some(state) = self.turrets.get_mut(taken) {
            state.location = TurretLocation::Hand;
            state.enabled = false;
            state.settling = false;
        }
        self.player.held = Some(taken);
        debug!(turret = taken.get(), slot = slot.get(), "turret taken");
        out_events.push(Event::TurretTaken {
            turret: taken,
            from: slot,
        });

        let subject = TweenSubject::Turret(taken);
        let rotate = self.allocate_tween(subject, Motion::Rotate { to: Quat::IDENTITY }, TAKE_STEP);
        let stretch = self.allocate_tween(
            subject,
            Motion::Scale {
                from: None,
                to: STRETCHED_SCALE,
            },
            TAKE_STEP,
        );
        let hop = self.allocate_tween(
            subject,
            Motion::LocalJump {
                to: Vec3::ZERO,
                height: TAKE_JUMP_HEIGHT,
            },
            TAKE_STEP,
        );
        let squash = self
            .allocate_tween(
                subject,
                Motion::Scale {
                    from: None,
                    to: SQUASHED_SCALE,
                },
                SQUASH_STEP,
            )
            .with_delay(TAKE_STEP);
        let relax = self
            .allocate_tween(
                subject,
                Motion::Scale {
                    from: None,
                    to: Vec3::ONE,
                },
                SQUASH_STEP,
            )
            .with_delay(TAKE_STEP + SQUASH_STEP);
        for request in [rotate, stretch, hop, squash, relax] {
            out_events.push(Event::TweenRequested { request });
        }
    }

    fn place(&mut self, out_events: &mut Vec<Event>) {
        if !self.can_place() {
            trace!("place ignored: preconditions unmet");
            return;
        }
        let (Some(turret), Some(slot)) = (self.held(), self.player.selected) else {
            return;
        };
        self.begin_placement(turret, slot, out_events);
    }

    /// Moves a held turret into a vacant slot and starts the landing choreography.
    fn begin_placement(&mut self, turret: TurretId, slot: SlotId, out_events: &mut Vec<Event>) {
        let Some(target) = self.slots.get(slot).map(|state| state.position) else {
            return;
        };

        if self.player.held == Some(turret) {
            self.player.held = None;
        }
        self.set_highlight(turret, false, out_events);
        if let Some(state) = self.slots.get_mut(slot) {
            state.occupant = Some(turret);
        }
        let lockout = seconds(self.config.take_delay);
        if let Some(state) = self.turrets.get_mut(turret) {
            state.location = TurretLocation::Slot(slot);
            state.settling = true;
            state.lockout = lockout;
        }
        self.player.placing = true;
        debug!(turret = turret.get(), slot = slot.get(), "turret placed");
        out_events.push(Event::TurretPlaced { turret, slot });

        let subject = TweenSubject::Turret(turret);
        let grow = self
            .allocate_tween(
                subject,
                Motion::Scale {
                    from: None,
                    to: Vec3::ONE,
                },
                PLACE_SCALE,
            )
            .with_ease(Ease::InOutBack);
        let jump = self
            .allocate_tween(
                subject,
                Motion::Jump {
                    to: target,
                    height: PLACE_JUMP_HEIGHT,
                },
                PLACE_JUMP,
            )
            .then(Continuation::SettleTurret { turret, slot });
        let rotate = self.allocate_tween(
            subject,
            Motion::Rotate { to: Quat::IDENTITY },
            PLACE_ROTATE,
        );
        let squash = self
            .allocate_tween(
                subject,
                Motion::Scale {
                    from: None,
                    to: SQUASHED_SCALE,
                },
                SQUASH_STEP,
            )
            .with_delay(SQUASH_DELAY);
        let relax = self
            .allocate_tween(
                subject,
                Motion::Scale {
                    from: None,
                    to: Vec3::ONE,
                },
                SQUASH_STEP,
            )
            .with_delay(SQUASH_DELAY + SQUASH_STEP)
            .then(Continuation::ReleasePlacement);
        for request in [grow, jump, rotate, squash, relax] {
            out_events.push(Event::TweenRequested { request });
        }
    }

    fn upgrade(&mut self, out_events: &mut Vec<Event>) {
        if !self.can_upgrade() {
            trace!("upgrade ignored: preconditions unmet");
            return;
        }
        let (Some(held), Some(slot)) = (self.held(), self.player.selected) else {
            return;
        };
        let Some((placed, target)) = self
            .slots
            .get(slot)
            .and_then(|state| state.occupant.map(|occupant| (occupant, state.position)))
        else {
            return;
        };

        self.player.upgrading = true;
        debug!(held = held.get(), placed = placed.get(), slot = slot.get(), "upgrade started");
        out_events.push(Event::UpgradeStarted { held, placed, slot });

        let request = self
            .allocate_tween(
                TweenSubject::Turret(held),
                Motion::Jump {
                    to: target,
                    height: UPGRADE_JUMP_HEIGHT,
                },
                UPGRADE_JUMP,
            )
            .then(Continuation::MergeTurrets { held, placed, slot });
        out_events.push(Event::TweenRequested { request });
    }

    fn merge(
        &mut self,
        held: TurretId,
        placed: TurretId,
        slot: SlotId,
        out_events: &mut Vec<Event>,
    ) {
        self.player.upgrading = false;

        let Some(position) = self
            .slots
            .get(slot)
            .filter(|state| state.occupant == Some(placed))
            .map(|state| state.position)
        else {
            debug!(slot = slot.get(), "merge dropped: slot changed hands");
            return;
        };
        if self.held() != Some(held) {
            debug!(turret = held.get(), "merge dropped: turret left the hand");
            return;
        }
        let shared = self.next_grade_of(held);
        let Some(grade) = shared.filter(|_| shared == self.next_grade_of(placed)) else {
            debug!("merge dropped: upgrade paths diverged");
            return;
        };

        let _ = self.turrets.remove(held);
        let _ = self.turrets.remove(placed);
        self.player.held = None;
        out_events.push(Event::TurretDestroyed { turret: held });
        out_events.push(Event::TurretDestroyed { turret: placed });

        let turret = self
            .turrets
            .insert(grade, TurretLocation::Slot(slot), position);
        if let Some(state) = self.slots.get_mut(slot) {
            state.occupant = Some(turret);
        }
        debug!(turret = turret.get(), grade = grade.get(), slot = slot.get(), "turrets merged");
        out_events.push(Event::TurretUpgraded {
            turret,
            grade,
            slot,
            consumed: [held, placed],
        });

        let request = self
            .allocate_tween(
                TweenSubject::Turret(turret),
                Motion::Scale {
                    from: Some(Vec3::ZERO),
                    to: Vec3::ONE,
                },
                UPGRADE_GROW,
            )
            .with_ease(Ease::OutBack);
        out_events.push(Event::TweenRequested { request });
    }

    fn settle(&mut self, turret: TurretId, slot: SlotId, out_events: &mut Vec<Event>) {
        let Some(position) = self
            .slots
            .get(slot)
            .filter(|state| state.occupant == Some(turret))
            .map(|state| state.position)
        else {
            trace!(turret = turret.get(), "settle ignored: turret no longer in slot");
            return;
        };
        if let Some(state) = self.turrets.get_mut(turret) {
            state.settling = false;
            state.enabled = true;
            state.position = position;
            out_events.push(Event::TurretSettled { turret, slot });
        }
    }

    fn collect(&mut self, pickup: PickupId, out_events: &mut Vec<Event>) {
        let Some(index) = self.backpack.collect(pickup) else {
            trace!(pickup = pickup.get(), "collect ignored");
            return;
        };

        let travel = seconds(self.config.object_move_speed);
        let stack_height = index as f32 * self.config.distance_between_objects;
        let subject = TweenSubject::Pickup(pickup);
        let stack = self
            .allocate_tween(
                subject,
                Motion::LocalMove {
                    to: Vec3::new(0.0, stack_height, 0.0),
                },
                travel,
            )
            .then(Continuation::StowPickup { pickup });
        let grow = self
            .allocate_tween(
                subject,
                Motion::Scale {
                    from: None,
                    to: Vec3::ONE,
                },
                travel.mul_f32(PICKUP_SCALE_FACTOR),
            )
            .with_ease(Ease::InBack);
        out_events.push(Event::TweenRequested { request: stack });
        out_events.push(Event::TweenRequested { request: grow });

        debug!(pickup = pickup.get(), index, "ability collected");
        out_events.push(Event::AbilityCollected { pickup, index });
    }

    fn resume(&mut self, continuation: Continuation, out_events: &mut Vec<Event>) {
        match continuation {
            Continuation::SettleTurret { turret, slot } => self.settle(turret, slot, out_events),
            Continuation::ReleasePlacement => {
                self.player.placing = false;
                out_events.push(Event::PlacementReleased);
            }
            Continuation::MergeTurrets { held, placed, slot } => {
                self.merge(held, placed, slot, out_events);
            }
            Continuation::StowPickup { pickup } => {
                if self.backpack.stow(pickup) {
                    out_events.push(Event::AbilityStowed { pickup });
                }
            }
        }
    }

    fn spawn_turret(
        &mut self,
        grade: Grade,
        slot: Option<SlotId>,
        position: Vec3,
        out_events: &mut Vec<Event>,
    ) {
        if self.catalog.get(grade).is_none() {
            trace!(grade = grade.get(), "spawn ignored: unknown grade");
            return;
        }

        let (location, position) = match slot {
            Some(slot) => match self.slots.get(slot) {
                Some(state) if state.occupant.is_none() => {
                    (TurretLocation::Slot(slot), state.position)
                }
                _ => {
                    trace!(slot = slot.get(), "spawn ignored: slot missing or occupied");
                    return;
                }
            },
            None => (TurretLocation::Free, position),
        };

        let turret = self.turrets.insert(grade, location, position);
        if let TurretLocation::Slot(slot) = location {
            if let Some(state) = self.slots.get_mut(slot) {
                state.occupant = Some(turret);
            }
        }
        out_events.push(Event::TurretSpawned {
            turret,
            grade,
            location,
        });
    }

    fn damage_enemy(
        &mut self,
        enemy: EnemyId,
        damage: f32,
        deceleration: f32,
        out_events: &mut Vec<Event>,
    ) {
        let Some(state) = self.enemies.get_mut(&enemy) else {
            return;
        };
        state.health -= damage;
        state.deceleration += deceleration;
        out_events.push(Event::EnemyDamaged {
            enemy,
            health: state.health,
            deceleration: state.deceleration,
        });

        if state.health <= 0.0 {
            let _ = self.enemies.remove(&enemy);
            debug!(enemy = enemy.get(), "enemy died");
            out_events.push(Event::EnemyDied { enemy });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.turrets.advance_lockouts(dt);
            world.prune_stale_references();
        }
        Command::SpawnSlot {
            position,
            show_range,
        } => {
            let slot = world.slots.insert(position, show_range);
            out_events.push(Event::SlotSpawned { slot, position });
        }
        Command::SpawnTurret {
            grade,
            slot,
            position,
        } => world.spawn_turret(grade, slot, position, out_events),
        Command::SpawnPickup {
            position,
            has_delay,
        } => {
            let pickup = world.backpack.spawn(position, has_delay);
            out_events.push(Event::PickupSpawned { pickup, position });
        }
        Command::SpawnEnemy { position, health } => {
            let enemy = world.next_enemy_id;
            world.next_enemy_id = EnemyId::new(enemy.get().saturating_add(1));
            let _ = world.enemies.insert(
                enemy,
                EnemyState {
                    id: enemy,
                    position,
                    health,
                    deceleration: 0.0,
                },
            );
            out_events.push(Event::EnemySpawned { enemy, position });
        }
        Command::MoveEnemy { enemy, position } => {
            if let Some(state) = world.enemies.get_mut(&enemy) {
                state.position = position;
            }
        }
        Command::SelectSlot { slot } => world.select_slot(slot, out_events),
        Command::ClearSelection => world.clear_selection(out_events),
        Command::TakeTurret => world.take(out_events),
        Command::PlaceTurret => world.place(out_events),
        Command::UpgradeTurret => world.upgrade(out_events),
        Command::CollectPickup { pickup } => world.collect(pickup, out_events),
        Command::ActivateAbility { pickup } => {
            if world.backpack.consume(pickup) {
                debug!(pickup = pickup.get(), "ability activated");
                out_events.push(Event::AbilityActivated { pickup });
            }
        }
        Command::Resume { continuation } => world.resume(continuation, out_events),
        Command::MovePlayer {
            displacement,
            facing,
        } => {
            let mut position = world.player.position + displacement;
            let grounded = position.y <= 0.0;
            if grounded {
                position.y = 0.0;
            }
            if facing.is_finite() && facing.length_squared() > f32::EPSILON {
                world.player.facing = facing.normalize();
            }
            world.player.position = position;
            world.player.grounded = grounded;
            out_events.push(Event::PlayerMoved {
                position,
                facing: world.player.facing,
                grounded,
            });
        }
        Command::DamageEnemy {
            enemy,
            damage,
            deceleration,
        } => world.damage_enemy(enemy, damage, deceleration, out_events),
        Command::FinishGame => {
            if !world.game_finished {
                world.game_finished = true;
                out_events.push(Event::GameFinished);
            }
        }
    }
}

fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value.max(0.0)).unwrap_or_default()
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use arrayvec::ArrayVec;
    use glam::Vec3;
    use outpost_core::{
        BackpackEntry, EnemySnapshot, EnemyView, GradeCatalog, HeldSnapshot, Interactable,
        InteractableMask, InventoryView, PlayerSnapshot, SlotId, SlotSnapshot, TurretId,
        TurretLocation, TurretSnapshot, TurretView,
    };

    use super::World;

    /// Captures the player's pose.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            facing: world.player.facing,
            grounded: world.player.grounded,
        }
    }

    /// Captures the player's hand, selection, action predicates and backpack.
    #[must_use]
    pub fn inventory_view(world: &World) -> InventoryView {
        let held = world.held().map(|turret| HeldSnapshot {
            turret,
            next_grade: world.next_grade_of(turret),
        });
        InventoryView {
            held,
            selected: world.selected_slot().map(|slot| slot.snapshot()),
            placing: world.player.placing,
            upgrading: world.player.upgrading,
            can_take: world.can_take(),
            can_place: world.can_place(),
            can_upgrade: world.can_upgrade(),
            backpack: world.backpack.entries(),
        }
    }

    /// Backpack entries in insertion order.
    #[must_use]
    pub fn backpack(world: &World) -> Vec<BackpackEntry> {
        world.backpack.entries()
    }

    /// Captures a single slot.
    #[must_use]
    pub fn slot(world: &World, slot: SlotId) -> Option<SlotSnapshot> {
        world.slots.get(slot).map(|state| state.snapshot())
    }

    /// Captures every slot ordered by identifier.
    #[must_use]
    pub fn slots(world: &World) -> Vec<SlotSnapshot> {
        world.slots.iter().map(|state| state.snapshot()).collect()
    }

    /// Captures a single turret.
    #[must_use]
    pub fn turret(world: &World, turret: TurretId) -> Option<TurretSnapshot> {
        world
            .turrets
            .get(turret)
            .and_then(|state| snapshot_turret(world, state))
    }

    /// Captures every turret in the yard, including the held one.
    #[must_use]
    pub fn turret_view(world: &World) -> TurretView {
        let snapshots = world
            .turrets
            .iter()
            .filter_map(|state| snapshot_turret(world, state))
            .collect();
        TurretView::from_snapshots(snapshots)
    }

    /// Captures every living enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots = world
            .enemies
            .values()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                position: enemy.position,
                health: enemy.health,
                deceleration: enemy.deceleration,
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Provides read-only access to the grade catalog.
    #[must_use]
    pub fn catalog(world: &World) -> &GradeCatalog {
        &world.catalog
    }

    /// Reports whether the round finished.
    #[must_use]
    pub fn game_finished(world: &World) -> bool {
        world.game_finished
    }

    /// Reports every interactable within `radius` of `centre` that matches `mask`.
    ///
    /// Results are written into the fixed-capacity buffer in identifier order,
    /// slots before pickups; anything beyond the buffer's capacity is dropped.
    /// Returns the number of reported interactables.
    pub fn overlap_sphere<const N: usize>(
        world: &World,
        centre: Vec3,
        radius: f32,
        mask: InteractableMask,
        out: &mut ArrayVec<Interactable, N>,
    ) -> usize {
        out.clear();
        let radius_sq = radius * radius;

        if mask.contains(InteractableMask::SLOTS) {
            let slots = world
                .slots
                .iter()
                .filter(|slot| slot.position.distance_squared(centre) <= radius_sq)
                .map(|slot| Interactable::Slot(slot.id));
            for hit in slots {
                if out.try_push(hit).is_err() {
                    return out.len();
                }
            }
        }

        if mask.contains(InteractableMask::PICKUPS) {
            let pickups = world
                .backpack
                .pickups()
                .filter(|pickup| pickup.collidable)
                .filter(|pickup| pickup.position.distance_squared(centre) <= radius_sq)
                .map(|pickup| Interactable::Pickup(pickup.id));
            for hit in pickups {
                if out.try_push(hit).is_err() {
                    return out.len();
                }
            }
        }

        out.len()
    }

    fn snapshot_turret(world: &World, state: &super::TurretState) -> Option<TurretSnapshot> {
        let blueprint = world.catalog.get(state.grade)?;
        let position = match state.location {
            TurretLocation::Hand => world.player.position,
            TurretLocation::Slot(_) | TurretLocation::Free => state.position,
        };
        Some(TurretSnapshot {
            id: state.id,
            grade: state.grade,
            next_grade: blueprint.next_grade,
            location: state.location,
            position,
            aim_distance: blueprint.aim_distance,
            attack: blueprint.attack,
            enabled: state.enabled,
        })
    }
}
