#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Outpost gameplay crates.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command batches.

use std::{collections::BTreeMap, time::Duration};

use bitflags::bitflags;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of interactables a single proximity query may report.
pub const OVERLAP_CAPACITY: usize = 10;

/// Distance in front of the player at which the interaction sphere is centred.
pub const INTERACT_FORWARD_OFFSET: f32 = 0.5;

/// Value the auto-interact accumulator is reset to after it fires.
pub const AUTO_INTERACT_COOLDOWN: f32 = -0.3;

/// Shared delay applied between two ability activations.
pub const ABILITY_DELAY: Duration = Duration::from_millis(800);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Creates a placement slot at the provided position.
    SpawnSlot {
        /// World position of the slot.
        position: Vec3,
        /// Whether the slot displays range indicators when selected.
        show_range: bool,
    },
    /// Creates a turret of the provided grade, optionally inside a slot.
    SpawnTurret {
        /// Grade blueprint the turret is instantiated from.
        grade: Grade,
        /// Slot that receives the turret, if any.
        slot: Option<SlotId>,
        /// World position used when the turret is not placed into a slot.
        position: Vec3,
    },
    /// Creates a free-floating ability pickup.
    SpawnPickup {
        /// World position of the pickup.
        position: Vec3,
        /// Whether activating the pickup honours the shared ability delay.
        has_delay: bool,
    },
    /// Creates an enemy that turrets may target.
    SpawnEnemy {
        /// World position of the enemy.
        position: Vec3,
        /// Starting health of the enemy.
        health: f32,
    },
    /// Teleports an enemy to a new position.
    MoveEnemy {
        /// Identifier of the enemy being moved.
        enemy: EnemyId,
        /// Destination of the enemy.
        position: Vec3,
    },
    /// Adopts the provided slot as the player's selected interaction target.
    SelectSlot {
        /// Slot to select.
        slot: SlotId,
    },
    /// Drops the current selection and clears its visual feedback.
    ClearSelection,
    /// Takes the turret out of the selected slot into the player's hand.
    TakeTurret,
    /// Places the held turret into the selected slot.
    PlaceTurret,
    /// Merges the held turret with the selected slot's turret.
    UpgradeTurret,
    /// Appends a pickup to the player's backpack.
    CollectPickup {
        /// Pickup being collected.
        pickup: PickupId,
    },
    /// Consumes a stowed pickup from the backpack.
    ActivateAbility {
        /// Pickup being consumed.
        pickup: PickupId,
    },
    /// Resolves the continuation attached to a finished tween.
    Resume {
        /// Work that was deferred until the tween finished.
        continuation: Continuation,
    },
    /// Moves and rotates the player.
    MovePlayer {
        /// Offset applied to the player's position.
        displacement: Vec3,
        /// Orientation the player faces after moving.
        facing: Quat,
    },
    /// Applies damage and slow-down to an enemy.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Health removed from the enemy.
        damage: f32,
        /// Deceleration accumulated on the enemy.
        deceleration: f32,
    },
    /// Marks the round as finished.
    FinishGame,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a slot was created.
    SlotSpawned {
        /// Identifier assigned to the slot.
        slot: SlotId,
        /// World position of the slot.
        position: Vec3,
    },
    /// Confirms that a turret was created.
    TurretSpawned {
        /// Identifier assigned to the turret.
        turret: TurretId,
        /// Grade of the new turret.
        grade: Grade,
        /// Where the turret lives after spawning.
        location: TurretLocation,
    },
    /// Confirms that a pickup was created.
    PickupSpawned {
        /// Identifier assigned to the pickup.
        pickup: PickupId,
        /// World position of the pickup.
        position: Vec3,
    },
    /// Confirms that an enemy was created.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// World position of the enemy.
        position: Vec3,
    },
    /// Announces that a slot became the selected interaction target.
    SlotSelected {
        /// Slot that was selected.
        slot: SlotId,
    },
    /// Announces that a slot stopped being the selected interaction target.
    SlotDeselected {
        /// Slot that was deselected.
        slot: SlotId,
    },
    /// Reports a change of a turret's selection highlight.
    TurretHighlightChanged {
        /// Turret whose highlight changed.
        turret: TurretId,
        /// Whether the highlight is now visible.
        highlighted: bool,
    },
    /// Requests that a slot preview the range of the held turret.
    RangePreviewShown {
        /// Slot displaying the preview.
        slot: SlotId,
        /// Radius of the preview in world units.
        radius: f32,
        /// Colour of the preview.
        color: RangeColor,
    },
    /// Requests that a slot hide its range preview.
    RangePreviewHidden {
        /// Slot hiding the preview.
        slot: SlotId,
    },
    /// Confirms that a turret moved from a slot into the player's hand.
    TurretTaken {
        /// Turret now held by the player.
        turret: TurretId,
        /// Slot the turret left.
        from: SlotId,
    },
    /// Confirms that a turret left the player's hand for a slot.
    TurretPlaced {
        /// Turret that was placed.
        turret: TurretId,
        /// Slot that now owns the turret.
        slot: SlotId,
    },
    /// Confirms that a placed turret landed and resumed operation.
    TurretSettled {
        /// Turret that landed.
        turret: TurretId,
        /// Slot hosting the turret.
        slot: SlotId,
    },
    /// Confirms that the placement lock was released.
    PlacementReleased,
    /// Confirms that an upgrade merge is in flight.
    UpgradeStarted {
        /// Turret carried by the player.
        held: TurretId,
        /// Turret sitting in the slot.
        placed: TurretId,
        /// Slot that receives the upgraded turret.
        slot: SlotId,
    },
    /// Confirms that two turrets merged into their shared next grade.
    TurretUpgraded {
        /// Newly created turret.
        turret: TurretId,
        /// Grade of the new turret.
        grade: Grade,
        /// Slot hosting the new turret.
        slot: SlotId,
        /// Turrets consumed by the merge.
        consumed: [TurretId; 2],
    },
    /// Confirms that a turret ceased to exist.
    TurretDestroyed {
        /// Identifier of the destroyed turret.
        turret: TurretId,
    },
    /// Confirms that a pickup entered the backpack.
    AbilityCollected {
        /// Pickup that was collected.
        pickup: PickupId,
        /// Position of the pickup inside the backpack.
        index: usize,
    },
    /// Confirms that a collected pickup finished travelling into the backpack.
    AbilityStowed {
        /// Pickup that arrived.
        pickup: PickupId,
    },
    /// Confirms that a pickup was consumed from the backpack.
    AbilityActivated {
        /// Pickup that was consumed.
        pickup: PickupId,
    },
    /// Asks the tween service to animate an entity.
    TweenRequested {
        /// Description of the animation.
        request: TweenRequest,
    },
    /// Reports the player's pose after a move.
    PlayerMoved {
        /// New position of the player.
        position: Vec3,
        /// New orientation of the player.
        facing: Quat,
        /// Whether the player stands on the ground.
        grounded: bool,
    },
    /// Reports that an enemy took damage.
    EnemyDamaged {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Remaining health.
        health: f32,
        /// Total deceleration accumulated so far.
        deceleration: f32,
    },
    /// Reports that an enemy ran out of health and was removed.
    EnemyDied {
        /// Enemy that died.
        enemy: EnemyId,
    },
    /// Announces that the round finished.
    GameFinished,
}

/// Unique identifier assigned to a turret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TurretId(u32);

impl TurretId {
    /// Creates a new turret identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a placement slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(u32);

impl SlotId {
    /// Creates a new slot identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an ability pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PickupId(u32);

impl PickupId {
    /// Creates a new pickup identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tween request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(u32);

impl TweenId {
    /// Creates a new tween identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Upgrade tier of a turret. Higher grades are further along an upgrade chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grade(u32);

impl Grade {
    /// Creates a new grade with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the grade.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Colour used when presenting a turret's range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl RangeColor {
    /// Creates a new range colour from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the colour.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the colour.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the colour.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

impl Default for RangeColor {
    fn default() -> Self {
        Self::from_rgb(0x6c, 0xc4, 0xff)
    }
}

/// Handle to something a proximity query can discover.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Interactable {
    /// A placement slot.
    Slot(SlotId),
    /// A free-floating pickup.
    Pickup(PickupId),
}

bitflags! {
    /// Filter restricting which interactables a proximity query reports.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct InteractableMask: u8 {
        /// Placement slots.
        const SLOTS = 0b01;
        /// Ability pickups that still collide.
        const PICKUPS = 0b10;
    }
}

impl Default for InteractableMask {
    fn default() -> Self {
        Self::all()
    }
}

/// Where a turret currently lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurretLocation {
    /// Owned by a placement slot.
    Slot(SlotId),
    /// Carried by the player.
    Hand,
    /// Standing in the world without a slot.
    Free,
}

/// Offensive parameters of a turret grade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackProfile {
    /// Health removed from each enemy caught by an attack.
    pub damage: f32,
    /// Seconds between two area attacks.
    pub attack_rate: f32,
    /// Half-angle of the damage cone in degrees.
    pub damage_angle: f32,
    /// Deceleration applied to each enemy caught by an attack.
    pub deceleration: f32,
}

impl Default for AttackProfile {
    fn default() -> Self {
        Self {
            damage: 1.0,
            attack_rate: 0.1,
            damage_angle: 20.0,
            deceleration: 1.0,
        }
    }
}

/// Static description of a turret grade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurretBlueprint {
    /// Grade described by the blueprint.
    pub grade: Grade,
    /// Grade two turrets of this blueprint merge into, if any.
    #[serde(default)]
    pub next_grade: Option<Grade>,
    /// Targeting radius in world units.
    pub aim_distance: f32,
    /// Colour of the range indicator.
    #[serde(default)]
    pub range_color: RangeColor,
    /// Offensive parameters.
    #[serde(default)]
    pub attack: AttackProfile,
}

/// Reasons a grade catalog may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Two blueprints describe the same grade.
    #[error("grade {0:?} is described more than once")]
    DuplicateGrade(Grade),
    /// A blueprint refers to a grade the catalog does not contain.
    #[error("grade {grade:?} upgrades into unknown grade {next:?}")]
    UnknownNextGrade {
        /// Blueprint holding the dangling reference.
        grade: Grade,
        /// Missing grade.
        next: Grade,
    },
    /// A blueprint upgrades into a grade that is not strictly higher.
    #[error("grade {grade:?} upgrades into {next:?}, which is not a higher grade")]
    NotAscending {
        /// Blueprint holding the offending reference.
        grade: Grade,
        /// Grade that is not higher than `grade`.
        next: Grade,
    },
}

/// Lookup table of turret blueprints forming strictly ascending upgrade chains.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GradeCatalog {
    blueprints: BTreeMap<Grade, TurretBlueprint>,
}

impl GradeCatalog {
    /// Builds a catalog, rejecting duplicates, dangling and non-ascending links.
    ///
    /// Requiring every link to point at a strictly higher grade rules out
    /// cycles without walking the chains.
    pub fn new(blueprints: Vec<TurretBlueprint>) -> Result<Self, CatalogError> {
        let mut table = BTreeMap::new();
        for blueprint in blueprints {
            let grade = blueprint.grade;
            if table.insert(grade, blueprint).is_some() {
                return Err(CatalogError::DuplicateGrade(grade));
            }
        }

        for blueprint in table.values() {
            let Some(next) = blueprint.next_grade else {
                continue;
            };
            if next <= blueprint.grade {
                return Err(CatalogError::NotAscending {
                    grade: blueprint.grade,
                    next,
                });
            }
            if !table.contains_key(&next) {
                return Err(CatalogError::UnknownNextGrade {
                    grade: blueprint.grade,
                    next,
                });
            }
        }

        Ok(Self { blueprints: table })
    }

    /// Returns the blueprint describing the provided grade.
    #[must_use]
    pub fn get(&self, grade: Grade) -> Option<&TurretBlueprint> {
        self.blueprints.get(&grade)
    }

    /// Returns the grade the provided grade upgrades into.
    #[must_use]
    pub fn next_grade(&self, grade: Grade) -> Option<Grade> {
        self.get(grade).and_then(|blueprint| blueprint.next_grade)
    }

    /// Walks the upgrade chain starting at `grade`, including `grade` itself.
    pub fn chain_from(&self, grade: Grade) -> impl Iterator<Item = Grade> + '_ {
        let start = self.get(grade).map(|blueprint| blueprint.grade);
        std::iter::successors(start, move |current| self.next_grade(*current))
    }

    /// Iterator over every blueprint ordered by grade.
    pub fn iter(&self) -> impl Iterator<Item = &TurretBlueprint> {
        self.blueprints.values()
    }
}

/// Tuning values for the player's inventory and interaction loop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Seconds between two proximity scans.
    pub interact_check_interval: f32,
    /// Radius of the proximity sphere.
    pub interact_radius: f32,
    /// Seconds of dwell time before an automatic interaction fires.
    pub auto_interaction_time: f32,
    /// Seconds a freshly placed turret cannot be taken again.
    pub take_delay: f32,
    /// Vertical spacing between pickups stacked in the backpack.
    pub distance_between_objects: f32,
    /// Seconds a collected pickup travels into the backpack.
    pub object_move_speed: f32,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            interact_check_interval: 0.005,
            interact_radius: 2.0,
            auto_interaction_time: 2.0,
            take_delay: 0.5,
            distance_between_objects: 0.25,
            object_move_speed: 0.5,
        }
    }
}

/// Easing curve attached to a tween.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Ease {
    /// Constant speed.
    #[default]
    Linear,
    /// Pulls back before accelerating towards the end value.
    InBack,
    /// Overshoots the end value before settling.
    OutBack,
    /// Pulls back at the start and overshoots at the end.
    InOutBack,
}

/// Entity animated by a tween.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TweenSubject {
    /// A turret.
    Turret(TurretId),
    /// A pickup.
    Pickup(PickupId),
}

/// Property change performed by a tween.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    /// Arc towards a world position.
    Jump {
        /// Destination in world space.
        to: Vec3,
        /// Apex height of the arc.
        height: f32,
    },
    /// Arc towards a position relative to the parent.
    LocalJump {
        /// Destination in parent space.
        to: Vec3,
        /// Apex height of the arc.
        height: f32,
    },
    /// Straight move towards a position relative to the parent.
    LocalMove {
        /// Destination in parent space.
        to: Vec3,
    },
    /// Scale change.
    Scale {
        /// Starting scale; `None` keeps the current scale.
        from: Option<Vec3>,
        /// Final scale.
        to: Vec3,
    },
    /// Rotation change.
    Rotate {
        /// Final orientation.
        to: Quat,
    },
}

/// Deferred work resolved once a tween finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Continuation {
    /// A placed turret landed in its slot.
    SettleTurret {
        /// Turret that was placed.
        turret: TurretId,
        /// Slot that owns the turret.
        slot: SlotId,
    },
    /// The placement choreography finished and new placements may start.
    ReleasePlacement,
    /// The held turret reached the slot and both turrets merge.
    MergeTurrets {
        /// Turret carried by the player.
        held: TurretId,
        /// Turret sitting in the slot.
        placed: TurretId,
        /// Slot that receives the upgraded turret.
        slot: SlotId,
    },
    /// A collected pickup reached its backpack position.
    StowPickup {
        /// Pickup that arrived.
        pickup: PickupId,
    },
}

/// Fire-and-forget animation request addressed to the tween service.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenRequest {
    /// Identifier allocated by the world.
    pub id: TweenId,
    /// Entity being animated.
    pub subject: TweenSubject,
    /// Property change to perform.
    pub motion: Motion,
    /// Time to wait before the tween starts.
    pub delay: Duration,
    /// Time the tween takes once started.
    pub duration: Duration,
    /// Easing curve.
    pub ease: Ease,
    /// Work to resolve when the tween finishes.
    pub on_complete: Option<Continuation>,
}

impl TweenRequest {
    /// Creates a linear tween without delay or continuation.
    #[must_use]
    pub const fn new(
        id: TweenId,
        subject: TweenSubject,
        motion: Motion,
        duration: Duration,
    ) -> Self {
        Self {
            id,
            subject,
            motion,
            delay: Duration::ZERO,
            duration,
            ease: Ease::Linear,
            on_complete: None,
        }
    }

    /// Delays the start of the tween.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Applies an easing curve.
    #[must_use]
    pub const fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Attaches a continuation resolved when the tween finishes.
    #[must_use]
    pub const fn then(mut self, continuation: Continuation) -> Self {
        self.on_complete = Some(continuation);
        self
    }

    /// Total time from the request until the tween finishes.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.delay.saturating_add(self.duration)
    }
}

/// Immutable representation of the player used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// World position of the player.
    pub position: Vec3,
    /// Orientation of the player.
    pub facing: Quat,
    /// Whether the player stands on the ground.
    pub grounded: bool,
}

impl PlayerSnapshot {
    /// Unit vector the player faces.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.facing * Vec3::Z
    }

    /// Centre of the sphere used for proximity queries.
    #[must_use]
    pub fn interaction_origin(&self) -> Vec3 {
        self.position + self.forward() * INTERACT_FORWARD_OFFSET
    }
}

/// Immutable representation of a placement slot used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotSnapshot {
    /// Identifier of the slot.
    pub id: SlotId,
    /// World position of the slot.
    pub position: Vec3,
    /// Whether the slot displays range indicators when selected.
    pub show_range: bool,
    /// Turret owned by the slot, if any.
    pub occupant: Option<TurretId>,
}

/// Immutable representation of a turret used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurretSnapshot {
    /// Identifier of the turret.
    pub id: TurretId,
    /// Grade of the turret.
    pub grade: Grade,
    /// Grade the turret merges into, if any.
    pub next_grade: Option<Grade>,
    /// Where the turret lives.
    pub location: TurretLocation,
    /// World position of the turret.
    pub position: Vec3,
    /// Targeting radius in world units.
    pub aim_distance: f32,
    /// Offensive parameters.
    pub attack: AttackProfile,
    /// Whether the turret is operational.
    pub enabled: bool,
}

/// Read-only snapshot describing all turrets in the yard.
#[derive(Clone, Debug, Default)]
pub struct TurretView {
    snapshots: Vec<TurretSnapshot>,
}

impl TurretView {
    /// Creates a new turret view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TurretSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured turret snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TurretSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single turret.
    #[must_use]
    pub fn get(&self, turret: TurretId) -> Option<&TurretSnapshot> {
        self.snapshots
            .binary_search_by_key(&turret, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }
}

/// Immutable representation of an enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier of the enemy.
    pub id: EnemyId,
    /// World position of the enemy.
    pub position: Vec3,
    /// Remaining health.
    pub health: f32,
    /// Deceleration accumulated so far.
    pub deceleration: f32,
}

/// Read-only snapshot describing all enemies in the yard.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }
}

/// Entry of the player's backpack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackpackEntry {
    /// Pickup stored in the entry.
    pub pickup: PickupId,
    /// Whether the pickup finished travelling into the backpack.
    pub stowed: bool,
    /// Whether activating the pickup honours the shared ability delay.
    pub has_delay: bool,
}

/// Snapshot of the turret held by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeldSnapshot {
    /// Held turret.
    pub turret: TurretId,
    /// Grade the held turret merges into, if any.
    pub next_grade: Option<Grade>,
}

/// Snapshot of the player's interaction state, including the action predicates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InventoryView {
    /// Turret carried by the player.
    pub held: Option<HeldSnapshot>,
    /// Slot currently selected as interaction target.
    pub selected: Option<SlotSnapshot>,
    /// Whether a placement is in flight.
    pub placing: bool,
    /// Whether an upgrade merge is in flight.
    pub upgrading: bool,
    /// Whether taking the selected slot's turret is legal.
    pub can_take: bool,
    /// Whether placing the held turret is legal.
    pub can_place: bool,
    /// Whether merging the held turret with the slot's turret is legal.
    pub can_upgrade: bool,
    /// Backpack entries in insertion order.
    pub backpack: Vec<BackpackEntry>,
}

impl InventoryView {
    /// Whether the player carries a turret.
    #[must_use]
    pub fn has_turret(&self) -> bool {
        self.held.is_some()
    }

    /// Identifier of the selected slot, if any.
    #[must_use]
    pub fn selected_slot(&self) -> Option<SlotId> {
        self.selected.map(|slot| slot.id)
    }

    /// Whether the pickup already sits in the backpack.
    #[must_use]
    pub fn holds_pickup(&self, pickup: PickupId) -> bool {
        self.backpack.iter().any(|entry| entry.pickup == pickup)
    }
}

/// Target assignment computed for a turret.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurretTarget {
    /// Turret acquiring the target.
    pub turret: TurretId,
    /// Enemy being targeted.
    pub enemy: EnemyId,
    /// World position of the turret.
    pub turret_position: Vec3,
    /// World position of the enemy.
    pub enemy_position: Vec3,
}

impl TurretTarget {
    /// Direction from the turret towards the enemy; zero when both coincide.
    #[must_use]
    pub fn aim_direction(&self) -> Vec3 {
        (self.enemy_position - self.turret_position).normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn blueprint(grade: u32, next: Option<u32>) -> TurretBlueprint {
        TurretBlueprint {
            grade: Grade::new(grade),
            next_grade: next.map(Grade::new),
            aim_distance: 4.0,
            range_color: RangeColor::default(),
            attack: AttackProfile::default(),
        }
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn turret_id_round_trips_through_bincode() {
        assert_round_trip(&TurretId::new(42));
    }

    #[test]
    fn blueprint_round_trips_through_bincode() {
        assert_round_trip(&blueprint(1, Some(2)));
    }

    #[test]
    fn catalog_accepts_ascending_chain() {
        let catalog = GradeCatalog::new(vec![
            blueprint(3, None),
            blueprint(1, Some(2)),
            blueprint(2, Some(3)),
        ])
        .expect("valid chain");

        let chain: Vec<u32> = catalog.chain_from(Grade::new(1)).map(|g| g.get()).collect();
        assert_eq!(chain, vec![1, 2, 3]);
        assert_eq!(catalog.next_grade(Grade::new(3)), None);
    }

    #[test]
    fn catalog_rejects_duplicate_grades() {
        let error = GradeCatalog::new(vec![blueprint(1, None), blueprint(1, None)])
            .expect_err("duplicate grade");
        assert_eq!(error, CatalogError::DuplicateGrade(Grade::new(1)));
    }

    #[test]
    fn catalog_rejects_dangling_next_grade() {
        let error =
            GradeCatalog::new(vec![blueprint(1, Some(5))]).expect_err("dangling reference");
        assert_eq!(
            error,
            CatalogError::UnknownNextGrade {
                grade: Grade::new(1),
                next: Grade::new(5),
            }
        );
    }

    #[test]
    fn catalog_rejects_cycles_as_non_ascending() {
        let error = GradeCatalog::new(vec![blueprint(1, Some(2)), blueprint(2, Some(1))])
            .expect_err("cycle");
        assert_eq!(
            error,
            CatalogError::NotAscending {
                grade: Grade::new(2),
                next: Grade::new(1),
            }
        );
    }

    #[test]
    fn chain_from_unknown_grade_is_empty() {
        let catalog = GradeCatalog::new(vec![blueprint(1, None)]).expect("valid");
        assert_eq!(catalog.chain_from(Grade::new(9)).count(), 0);
    }

    #[test]
    fn default_range_color_is_light_blue() {
        let color = RangeColor::default();
        assert_eq!((color.red(), color.green(), color.blue()), (0x6c, 0xc4, 0xff));
        assert_eq!(RangeColor::from_rgb(0x6c, 0xc4, 0xff), color);
    }

    #[test]
    fn interaction_origin_sits_in_front_of_player() {
        let player = PlayerSnapshot {
            position: Vec3::new(1.0, 0.0, 1.0),
            facing: Quat::IDENTITY,
            grounded: true,
        };
        let origin = player.interaction_origin();
        assert!((origin - Vec3::new(1.0, 0.0, 1.5)).length() < 1e-5);
    }

    #[test]
    fn tween_total_includes_delay() {
        let request = TweenRequest::new(
            TweenId::new(0),
            TweenSubject::Turret(TurretId::new(0)),
            Motion::Rotate { to: Quat::IDENTITY },
            Duration::from_millis(100),
        )
        .with_delay(Duration::from_millis(500));
        assert_eq!(request.total(), Duration::from_millis(600));
    }

    #[test]
    fn inventory_defaults_match_tuning() {
        let config = InventoryConfig::default();
        assert!((config.auto_interaction_time - 2.0).abs() < f32::EPSILON);
        assert!((config.interact_radius - 2.0).abs() < f32::EPSILON);
        assert!((config.take_delay - 0.5).abs() < f32::EPSILON);
    }
}
