use glam::Vec3;
use outpost_core::{
    AttackProfile, Command, Event, Grade, GradeCatalog, InventoryConfig, RangeColor, SlotId,
    TurretBlueprint,
};
use outpost_system_turret_targeting::TurretTargeting;
use outpost_world::{self as world, query, World};

fn yard() -> (World, SlotId) {
    let catalog = GradeCatalog::new(vec![TurretBlueprint {
        grade: Grade::new(1),
        next_grade: None,
        aim_distance: 4.0,
        range_color: RangeColor::default(),
        attack: AttackProfile::default(),
    }])
    .expect("valid catalog");
    let mut world = World::new(catalog, InventoryConfig::default());
    let mut events = Vec::new();

    world::apply(
        &mut world,
        Command::SpawnSlot {
            position: Vec3::new(0.0, 0.0, 1.0),
            show_range: true,
        },
        &mut events,
    );
    let slot = events
        .iter()
        .find_map(|event| match event {
            Event::SlotSpawned { slot, .. } => Some(*slot),
            _ => None,
        })
        .expect("slot spawned");
    world::apply(
        &mut world,
        Command::SpawnTurret {
            grade: Grade::new(1),
            slot: Some(slot),
            position: Vec3::ZERO,
        },
        &mut events,
    );
    for position in [Vec3::new(0.0, 0.0, 4.0), Vec3::new(0.0, 0.0, 3.0)] {
        world::apply(
            &mut world,
            Command::SpawnEnemy {
                position,
                health: 5.0,
            },
            &mut events,
        );
    }
    (world, slot)
}

fn targets(world: &World) -> Vec<outpost_core::TurretTarget> {
    let mut system = TurretTargeting::new();
    let mut out = Vec::new();
    system.handle(&query::turret_view(world), &query::enemy_view(world), &mut out);
    out
}

#[test]
fn slotted_turret_targets_the_nearest_enemy() {
    let (world, _) = yard();

    let found = targets(&world);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].enemy_position, Vec3::new(0.0, 0.0, 3.0));
    assert_eq!(found[0].aim_direction(), Vec3::Z);
}

#[test]
fn turret_in_hand_stops_targeting() {
    let (mut world, slot) = yard();
    let mut events = Vec::new();
    world::apply(&mut world, Command::SelectSlot { slot }, &mut events);
    world::apply(&mut world, Command::TakeTurret, &mut events);
    assert!(query::inventory_view(&world).has_turret(), "turret should be in hand");

    assert!(targets(&world).is_empty());
}
