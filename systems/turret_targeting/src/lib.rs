#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic turret targets from world snapshots.

use glam::Vec3;
use outpost_core::{EnemyId, EnemyView, TurretId, TurretLocation, TurretTarget, TurretView};

/// Turret targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TurretTargeting {
    turret_workspace: Vec<TurretWorkspace>,
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TurretTargeting {
    /// Creates a new turret targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes turret targets for the provided world snapshot.
    ///
    /// Only enabled turrets sitting in a slot acquire targets. The output
    /// buffer is cleared before populating it with the latest assignments.
    pub fn handle(
        &mut self,
        turrets: &TurretView,
        enemies: &EnemyView,
        out: &mut Vec<TurretTarget>,
    ) {
        out.clear();

        if turrets.iter().next().is_none() || enemies.iter().next().is_none() {
            return;
        }

        self.prepare_turret_workspace(turrets);
        if self.turret_workspace.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies);

        for turret in &self.turret_workspace {
            let max_distance = turret.aim_distance * turret.aim_distance;
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.enemy_workspace {
                let distance_sq = candidate.position.distance_squared(turret.position);
                if distance_sq > max_distance {
                    continue;
                }

                let current = BestCandidate {
                    distance_sq,
                    enemy: candidate.id,
                    position: candidate.position,
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

            if let Some(best_candidate) = best {
                out.push(TurretTarget {
                    turret: turret.id,
                    enemy: best_candidate.enemy,
                    turret_position: turret.position,
                    enemy_position: best_candidate.position,
                });
            }
        }
    }

    fn prepare_turret_workspace(&mut self, turrets: &TurretView) {
        self.turret_workspace.clear();
        let (lower, _) = turrets.iter().size_hint();
        self.turret_workspace.reserve(lower);

        for snapshot in turrets.iter() {
            if !snapshot.enabled || !matches!(snapshot.location, TurretLocation::Slot(_)) {
                continue;
            }
            if snapshot.aim_distance <= 0.0 {
                continue;
            }

            self.turret_workspace.push(TurretWorkspace {
                id: snapshot.id,
                position: snapshot.position,
                aim_distance: snapshot.aim_distance,
            });
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace
            .extend(enemies.iter().map(|snapshot| EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
            }));
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TurretWorkspace {
    id: TurretId,
    position: Vec3,
    aim_distance: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance_sq: f32,
    enemy: EnemyId,
    position: Vec3,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }

        self.enemy < other.enemy
    }
}
