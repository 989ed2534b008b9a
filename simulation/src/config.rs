//! Scenario files describing the yard a simulation starts from.

use std::{fs, path::Path};

use glam::Vec3;
use outpost_core::{CatalogError, Grade, GradeCatalog, InventoryConfig, TurretBlueprint};
use outpost_system_movement::{JoystickInput, MovementConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The scenario file could not be read.
    #[error("failed to read scenario {path}")]
    Io {
        /// Location of the scenario file.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The scenario is not valid TOML or does not match the schema.
    #[error("failed to parse scenario")]
    Parse(#[from] toml::de::Error),
    /// The grade table is inconsistent.
    #[error("invalid grade table")]
    Catalog(#[from] CatalogError),
    /// A slot starts with a turret of a grade missing from the grade table.
    #[error("slot #{slot} starts with unknown grade {grade:?}")]
    UnknownTurretGrade {
        /// Index of the slot in the scenario.
        slot: usize,
        /// Grade the slot refers to.
        grade: Grade,
    },
}

/// Initial player placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSetup {
    /// Starting position.
    pub position: Vec3,
}

/// Placement slot present at the start of the round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotSetup {
    /// World position of the slot.
    pub position: Vec3,
    /// Whether the slot displays range indicators when selected.
    #[serde(default = "default_show_range")]
    pub show_range: bool,
    /// Grade of the turret initially sitting in the slot.
    #[serde(default)]
    pub turret: Option<Grade>,
}

fn default_show_range() -> bool {
    true
}

/// Ability pickup lying in the yard at the start of the round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PickupSetup {
    /// World position of the pickup.
    pub position: Vec3,
    /// Whether activating the pickup honours the shared ability delay.
    #[serde(default)]
    pub has_delay: bool,
}

/// Enemy present at the start of the round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySetup {
    /// World position of the enemy.
    pub position: Vec3,
    /// Starting health.
    pub health: f32,
}

/// Joystick deflection held for a number of ticks.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputSegment {
    /// Number of ticks the deflection is held.
    pub ticks: u32,
    /// Deflection along the world X axis.
    #[serde(default)]
    pub horizontal: f32,
    /// Deflection along the world Z axis.
    #[serde(default)]
    pub vertical: f32,
}

/// Complete description of a scripted round.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Interaction tuning.
    pub inventory: InventoryConfig,
    /// Movement tuning.
    pub movement: MovementConfig,
    /// Player placement.
    pub player: PlayerSetup,
    /// Turret grade table.
    pub grades: Vec<TurretBlueprint>,
    /// Placement slots.
    pub slots: Vec<SlotSetup>,
    /// Ability pickups.
    pub pickups: Vec<PickupSetup>,
    /// Enemies.
    pub enemies: Vec<EnemySetup>,
    /// Scripted joystick input, played back tick by tick.
    pub input: Vec<InputSegment>,
}

impl ScenarioConfig {
    /// Parses a scenario from TOML text and validates it.
    pub fn from_toml_str(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = toml::from_str(text)?;
        let _ = scenario.catalog()?;
        Ok(scenario)
    }

    /// Reads and validates a scenario file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Builds the grade catalog and checks that every starting turret uses a
    /// known grade.
    pub fn catalog(&self) -> Result<GradeCatalog, ScenarioError> {
        let catalog = GradeCatalog::new(self.grades.clone())?;
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(grade) = slot.turret {
                if catalog.get(grade).is_none() {
                    return Err(ScenarioError::UnknownTurretGrade { slot: index, grade });
                }
            }
        }
        Ok(catalog)
    }

    /// Total number of ticks covered by the input script.
    #[must_use]
    pub fn scripted_ticks(&self) -> u64 {
        self.input.iter().map(|segment| u64::from(segment.ticks)).sum()
    }

    /// Joystick sample for the provided tick; idle once the script ran out.
    #[must_use]
    pub fn input_at(&self, tick: u64) -> JoystickInput {
        let mut start = 0_u64;
        for segment in &self.input {
            let end = start + u64::from(segment.ticks);
            if tick < end {
                return JoystickInput::new(segment.horizontal, segment.vertical);
            }
            start = end;
        }
        JoystickInput::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
        [inventory]
        auto_interaction_time = 1.5

        [player]
        position = [1.0, 0.0, 2.0]

        [[grades]]
        grade = 1
        next_grade = 2
        aim_distance = 4.0

        [[grades]]
        grade = 2
        aim_distance = 6.0
        attack = { damage = 2.0 }

        [[slots]]
        position = [0.0, 0.0, 3.0]
        turret = 1

        [[slots]]
        position = [3.0, 0.0, 3.0]
        show_range = false

        [[input]]
        ticks = 2
        vertical = 1.0

        [[input]]
        ticks = 1
        horizontal = -1.0
    "#;

    #[test]
    fn scenario_parses_with_defaults() {
        let scenario = ScenarioConfig::from_toml_str(SCENARIO).expect("valid scenario");

        assert!((scenario.inventory.auto_interaction_time - 1.5).abs() < f32::EPSILON);
        assert!((scenario.inventory.interact_radius - 2.0).abs() < f32::EPSILON);
        assert_eq!(scenario.movement, MovementConfig::default());
        assert_eq!(scenario.player.position, Vec3::new(1.0, 0.0, 2.0));
        assert_eq!(scenario.slots[0].turret, Some(Grade::new(1)));
        assert!(scenario.slots[0].show_range);
        assert!(!scenario.slots[1].show_range);

        let catalog = scenario.catalog().expect("catalog");
        let upgraded = catalog.get(Grade::new(2)).expect("grade 2");
        assert!((upgraded.attack.damage - 2.0).abs() < f32::EPSILON);
        assert!((upgraded.attack.attack_rate - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn input_script_plays_back_in_order() {
        let scenario = ScenarioConfig::from_toml_str(SCENARIO).expect("valid scenario");

        assert_eq!(scenario.scripted_ticks(), 3);
        assert_eq!(scenario.input_at(0), JoystickInput::new(0.0, 1.0));
        assert_eq!(scenario.input_at(1), JoystickInput::new(0.0, 1.0));
        assert_eq!(scenario.input_at(2), JoystickInput::new(-1.0, 0.0));
        assert_eq!(scenario.input_at(3), JoystickInput::default());
    }

    #[test]
    fn unknown_starting_grade_is_rejected() {
        let text = r#"
            [[grades]]
            grade = 1
            aim_distance = 4.0

            [[slots]]
            position = [0.0, 0.0, 0.0]
            turret = 7
        "#;

        let error = ScenarioConfig::from_toml_str(text).expect_err("unknown grade");
        assert!(matches!(
            error,
            ScenarioError::UnknownTurretGrade { slot: 0, grade } if grade == Grade::new(7)
        ));
    }

    #[test]
    fn malformed_toml_reports_parse_error() {
        let error = ScenarioConfig::from_toml_str("grades = 3").expect_err("wrong shape");
        assert!(matches!(error, ScenarioError::Parse(_)));
    }
}
