#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that turns joystick input into player moves.

use glam::{Quat, Vec3};
use outpost_core::{Command, Event, PlayerSnapshot};
use serde::{Deserialize, Serialize};

/// Tuning values for player movement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Ground speed in world units per second at full joystick deflection.
    pub speed: f32,
    /// Slerp factor per second used to turn towards the move direction.
    pub rotation_per_frame: f32,
    /// Vertical acceleration applied while airborne.
    pub gravity: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            rotation_per_frame: 10.0,
            gravity: -9.81,
        }
    }
}

/// Joystick deflection sampled for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JoystickInput {
    /// Deflection along the world X axis.
    pub horizontal: f32,
    /// Deflection along the world Z axis.
    pub vertical: f32,
}

impl JoystickInput {
    /// Creates a joystick sample, clamping both axes to `[-1, 1]`.
    #[must_use]
    pub fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal: clamp_axis(horizontal),
            vertical: clamp_axis(vertical),
        }
    }

    fn direction(self) -> Vec3 {
        Vec3::new(clamp_axis(self.horizontal), 0.0, clamp_axis(self.vertical))
    }
}

fn clamp_axis(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Pure system that reacts to world events and emits player movement commands.
#[derive(Clone, Debug)]
pub struct Movement {
    config: MovementConfig,
    enabled: bool,
    is_moving: bool,
}

impl Movement {
    /// Creates a movement system with the provided tuning.
    #[must_use]
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            enabled: true,
            is_moving: false,
        }
    }

    /// Whether the player walked on the ground during the last update.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    /// Whether the joystick still drives the player.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Consumes world events and the player snapshot to emit a move command.
    pub fn handle(
        &mut self,
        events: &[Event],
        player: &PlayerSnapshot,
        input: JoystickInput,
        out: &mut Vec<Command>,
    ) {
        let mut elapsed = 0.0;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => elapsed += dt.as_secs_f32(),
                Event::GameFinished => self.enabled = false,
                _ => {}
            }
        }

        self.is_moving = false;
        if !self.enabled || elapsed <= 0.0 {
            return;
        }

        let direction = input.direction();
        let has_direction = direction.length_squared() > 0.0;

        let mut displacement = direction * self.config.speed * elapsed;
        if !player.grounded {
            displacement.y += self.config.gravity * elapsed;
        }

        let mut facing = player.facing;
        if has_direction {
            let step = (self.config.rotation_per_frame * elapsed).clamp(0.0, 1.0);
            facing = facing.slerp(look_rotation(direction), step);
        }

        self.is_moving = has_direction && player.grounded;

        if displacement == Vec3::ZERO && facing == player.facing {
            return;
        }
        out.push(Command::MovePlayer {
            displacement,
            facing,
        });
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(MovementConfig::default())
    }
}

/// Rotation about the vertical axis that turns `+Z` towards `direction`.
fn look_rotation(direction: Vec3) -> Quat {
    Quat::from_rotation_y(direction.x.atan2(direction.z))
}
