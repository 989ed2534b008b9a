#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns targeting data into cone-shaped area damage.

use std::collections::BTreeMap;

use glam::Vec3;
use outpost_core::{Command, EnemyView, Event, TurretId, TurretSnapshot, TurretTarget, TurretView};

/// Turret combat system that tracks per-turret attack accumulators.
#[derive(Debug, Default)]
pub struct TurretCombat {
    accumulators: BTreeMap<TurretId, f32>,
    scratch: Vec<Command>,
}

impl TurretCombat {
    /// Creates a new turret combat system with no firing turrets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the turret kept a target through the last update.
    #[must_use]
    pub fn is_firing(&self, turret: TurretId) -> bool {
        self.accumulators.contains_key(&turret)
    }

    /// Emits `Command::DamageEnemy` entries for turrets whose attack is due.
    ///
    /// Each attack hits every enemy inside the turret's aim distance whose
    /// direction lies within `damage_angle` degrees of the aim direction.
    /// Turrets that lost their target stop firing and restart from zero.
    pub fn handle(
        &mut self,
        events: &[Event],
        turrets: &TurretView,
        enemies: &EnemyView,
        targets: &[TurretTarget],
        out: &mut Vec<Command>,
    ) {
        self.accumulators
            .retain(|turret, _| targets.iter().any(|target| target.turret == *turret));

        let elapsed: f32 = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(dt.as_secs_f32()),
                _ => None,
            })
            .sum();

        self.scratch.clear();

        for target in targets {
            let Some(turret) = turrets.get(target.turret) else {
                continue;
            };
            let timer = self.accumulators.entry(target.turret).or_insert(0.0);
            *timer += elapsed;
            if elapsed <= 0.0 || *timer < turret.attack.attack_rate {
                continue;
            }
            *timer = 0.0;

            damage_cone(turret, target.aim_direction(), enemies, &mut self.scratch);
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn damage_cone(turret: &TurretSnapshot, aim: Vec3, enemies: &EnemyView, out: &mut Vec<Command>) {
    let max_distance = turret.aim_distance * turret.aim_distance;

    for enemy in enemies.iter() {
        let offset = enemy.position - turret.position;
        if offset.length_squared() > max_distance {
            continue;
        }
        if !within_cone(aim, offset, turret.attack.damage_angle) {
            continue;
        }

        out.push(Command::DamageEnemy {
            enemy: enemy.id,
            damage: turret.attack.damage,
            deceleration: turret.attack.deceleration,
        });
    }
}

fn within_cone(aim: Vec3, offset: Vec3, half_angle_degrees: f32) -> bool {
    if aim == Vec3::ZERO || offset.length_squared() <= f32::EPSILON {
        return true;
    }
    aim.angle_between(offset).to_degrees() <= half_angle_degrees
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_core::{AttackProfile, EnemyId, EnemySnapshot, Grade, SlotId, TurretLocation};
    use std::time::Duration;

    fn turrets() -> TurretView {
        TurretView::from_snapshots(vec![TurretSnapshot {
            id: TurretId::new(1),
            grade: Grade::new(1),
            next_grade: None,
            location: TurretLocation::Slot(SlotId::new(0)),
            position: Vec3::ZERO,
            aim_distance: 5.0,
            attack: AttackProfile::default(),
            enabled: true,
        }])
    }

    fn enemy(id: u32, position: Vec3) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            position,
            health: 10.0,
            deceleration: 0.0,
        }
    }

    fn target(enemy: u32, position: Vec3) -> TurretTarget {
        TurretTarget {
            turret: TurretId::new(1),
            enemy: EnemyId::new(enemy),
            turret_position: Vec3::ZERO,
            enemy_position: position,
        }
    }

    fn elapsed(ms: u64) -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(ms),
        }]
    }

    #[test]
    fn attack_waits_for_attack_rate() {
        let mut system = TurretCombat::new();
        let enemies = EnemyView::from_snapshots(vec![enemy(1, Vec3::Z)]);
        let targets = [target(1, Vec3::Z)];
        let mut out = Vec::new();

        system.handle(&elapsed(50), &turrets(), &enemies, &targets, &mut out);
        assert!(out.is_empty());
        assert!(system.is_firing(TurretId::new(1)));

        system.handle(&elapsed(60), &turrets(), &enemies, &targets, &mut out);
        assert_eq!(
            out,
            vec![Command::DamageEnemy {
                enemy: EnemyId::new(1),
                damage: 1.0,
                deceleration: 1.0,
            }]
        );
    }

    #[test]
    fn cone_spares_enemies_outside_the_damage_angle() {
        let mut system = TurretCombat::new();
        let enemies = EnemyView::from_snapshots(vec![
            enemy(1, Vec3::new(0.0, 0.0, 3.0)),
            enemy(2, Vec3::new(0.5, 0.0, 3.0)),
            enemy(3, Vec3::new(3.0, 0.0, 0.0)),
            enemy(4, Vec3::new(0.0, 0.0, 9.0)),
        ]);
        let targets = [target(1, Vec3::new(0.0, 0.0, 3.0))];
        let mut out = Vec::new();

        system.handle(&elapsed(100), &turrets(), &enemies, &targets, &mut out);

        let hit: Vec<_> = out
            .iter()
            .filter_map(|command| match command {
                Command::DamageEnemy { enemy, .. } => Some(enemy.get()),
                _ => None,
            })
            .collect();
        assert_eq!(hit, vec![1, 2]);
    }

    #[test]
    fn losing_the_target_stops_firing() {
        let mut system = TurretCombat::new();
        let enemies = EnemyView::from_snapshots(vec![enemy(1, Vec3::Z)]);
        let mut out = Vec::new();

        system.handle(&elapsed(50), &turrets(), &enemies, &[target(1, Vec3::Z)], &mut out);
        system.handle(&elapsed(50), &turrets(), &enemies, &[], &mut out);
        assert!(!system.is_firing(TurretId::new(1)));

        system.handle(&elapsed(50), &turrets(), &enemies, &[target(1, Vec3::Z)], &mut out);
        assert!(out.is_empty(), "accumulator restarted from zero");
    }
}
