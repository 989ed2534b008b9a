#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Composition root that drives the Outpost world and its systems.
//!
//! [`Simulation::tick`] advances the clock and runs every system in a fixed
//! order: timers and tween continuations, abilities, the proximity scan, the
//! auto-interact threshold, player movement and finally turret targeting and
//! combat. Commands emitted by a stage are applied before the next stage runs
//! and every resulting event is published on the [`EventBus`].

mod bus;
mod config;

use std::time::Duration;

use glam::{Quat, Vec3};
use outpost_core::{Command, Event, GradeCatalog, InventoryConfig, TurretTarget};
use outpost_system_abilities::Abilities;
use outpost_system_auto_interact::AutoInteract;
use outpost_system_movement::Movement;
use outpost_system_proximity::ProximityScanner;
use outpost_system_turret_combat::TurretCombat;
use outpost_system_turret_targeting::TurretTargeting;
use outpost_system_tweening::Tweening;
use outpost_world::{self as world, query, World};
use tracing::{debug, trace};

pub use crate::{
    bus::{EventBus, SubscriptionId, Topic},
    config::{
        EnemySetup, InputSegment, PickupSetup, PlayerSetup, ScenarioConfig, ScenarioError,
        SlotSetup,
    },
};
pub use outpost_system_movement::{JoystickInput, MovementConfig};

/// Owns the world, the systems and the event bus connecting them.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    bus: EventBus,
    proximity: ProximityScanner,
    auto_interact: AutoInteract,
    tweening: Tweening,
    abilities: Abilities,
    movement: Movement,
    targeting: TurretTargeting,
    combat: TurretCombat,
    targets: Vec<TurretTarget>,
    carry_over: Vec<Event>,
    ticks: u64,
}

impl Simulation {
    /// Creates a simulation over an empty yard.
    #[must_use]
    pub fn new(
        catalog: GradeCatalog,
        inventory: InventoryConfig,
        movement: MovementConfig,
    ) -> Self {
        Self {
            world: World::new(catalog, inventory),
            bus: EventBus::new(),
            proximity: ProximityScanner::new(&inventory),
            auto_interact: AutoInteract::new(&inventory),
            tweening: Tweening::new(),
            abilities: Abilities::new(),
            movement: Movement::new(movement),
            targeting: TurretTargeting::new(),
            combat: TurretCombat::new(),
            targets: Vec::new(),
            carry_over: Vec::new(),
            ticks: 0,
        }
    }

    /// Creates a simulation and populates the yard described by the scenario.
    pub fn from_scenario(scenario: &ScenarioConfig) -> Result<Self, ScenarioError> {
        let catalog = scenario.catalog()?;
        let mut simulation = Self::new(catalog, scenario.inventory, scenario.movement);

        if scenario.player.position != Vec3::ZERO {
            simulation.apply(Command::MovePlayer {
                displacement: scenario.player.position,
                facing: Quat::IDENTITY,
            });
        }

        for slot in &scenario.slots {
            let mut events = Vec::new();
            world::apply(
                &mut simulation.world,
                Command::SpawnSlot {
                    position: slot.position,
                    show_range: slot.show_range,
                },
                &mut events,
            );
            let spawned = events.iter().find_map(|event| match event {
                Event::SlotSpawned { slot, .. } => Some(*slot),
                _ => None,
            });
            if let (Some(grade), Some(id)) = (slot.turret, spawned) {
                world::apply(
                    &mut simulation.world,
                    Command::SpawnTurret {
                        grade,
                        slot: Some(id),
                        position: slot.position,
                    },
                    &mut events,
                );
            }
            simulation.publish_all(events);
        }

        for pickup in &scenario.pickups {
            simulation.apply(Command::SpawnPickup {
                position: pickup.position,
                has_delay: pickup.has_delay,
            });
        }
        for enemy in &scenario.enemies {
            simulation.apply(Command::SpawnEnemy {
                position: enemy.position,
                health: enemy.health,
            });
        }

        debug!(
            slots = scenario.slots.len(),
            pickups = scenario.pickups.len(),
            enemies = scenario.enemies.len(),
            "scenario loaded"
        );
        Ok(simulation)
    }

    /// Provides read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Number of ticks simulated so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Fill ratio of the auto-interact indicator.
    #[must_use]
    pub fn interact_progress(&self) -> f32 {
        self.auto_interact.progress()
    }

    /// Whether the player walked during the last tick.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.movement.is_moving()
    }

    /// Targets acquired by turrets during the last tick.
    #[must_use]
    pub fn targets(&self) -> &[TurretTarget] {
        &self.targets
    }

    /// Registers an event handler; see [`EventBus::subscribe`].
    pub fn subscribe<F>(&mut self, topics: &[Topic], handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        self.bus.subscribe(topics, handler)
    }

    /// Removes an event handler.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Applies an external command immediately.
    ///
    /// The resulting events are published right away and reach the systems on
    /// the next tick.
    pub fn apply(&mut self, command: Command) {
        let mut events = Vec::new();
        self.execute(command, &mut events);
        self.carry_over.append(&mut events);
    }

    /// Advances the simulation by `dt` with the provided joystick sample.
    pub fn tick(&mut self, dt: Duration, input: JoystickInput) {
        self.ticks = self.ticks.saturating_add(1);

        let mut timeline = std::mem::take(&mut self.carry_over);
        let tick_start = timeline.len();
        self.execute(Command::Tick { dt }, &mut timeline);
        let tick_end = timeline.len();

        let mut commands = Vec::new();
        self.tweening.handle(&timeline, &mut commands);
        let carry_from = timeline.len();
        self.execute_all(&mut commands, &mut timeline);

        // Selections applied since the last tick reset the dwell timer too.
        let inventory = query::inventory_view(&self.world);
        self.auto_interact.advance(&timeline[..tick_end], &inventory);

        let inventory = query::inventory_view(&self.world);
        self.abilities
            .handle(&timeline[tick_start..tick_end], &inventory, &mut commands);
        self.execute_all(&mut commands, &mut timeline);

        let player = query::player(&self.world);
        let inventory = query::inventory_view(&self.world);
        let slots = query::slots(&self.world);
        let world = &self.world;
        self.proximity.handle(
            &timeline[tick_start..tick_end],
            &player,
            &inventory,
            &slots,
            |centre, radius, mask, buffer| {
                query::overlap_sphere(world, centre, radius, mask, buffer)
            },
            &mut commands,
        );
        let proximity_start = timeline.len();
        self.execute_all(&mut commands, &mut timeline);

        let inventory = query::inventory_view(&self.world);
        self.auto_interact
            .handle(&timeline[proximity_start..], &inventory, &mut commands);
        self.execute_all(&mut commands, &mut timeline);

        let player = query::player(&self.world);
        self.movement
            .handle(&timeline[..tick_end], &player, input, &mut commands);
        self.execute_all(&mut commands, &mut timeline);

        let turrets = query::turret_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        self.targeting.handle(&turrets, &enemies, &mut self.targets);
        self.combat.handle(
            &timeline[tick_start..tick_end],
            &turrets,
            &enemies,
            &self.targets,
            &mut commands,
        );
        self.execute_all(&mut commands, &mut timeline);

        trace!(
            tick = self.ticks,
            events = timeline.len(),
            targets = self.targets.len(),
            "tick complete"
        );
        self.carry_over = timeline.split_off(carry_from);
    }

    fn execute_all(&mut self, commands: &mut Vec<Command>, out_events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            self.execute(command, out_events);
        }
    }

    fn execute(&mut self, command: Command, out_events: &mut Vec<Event>) {
        let start = out_events.len();
        world::apply(&mut self.world, command, out_events);
        for event in &out_events[start..] {
            self.bus.publish(event);
        }
    }

    fn publish_all(&mut self, events: Vec<Event>) {
        for event in &events {
            self.bus.publish(event);
        }
        self.carry_over.extend(events);
    }
}
