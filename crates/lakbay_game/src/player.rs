//! Player movement model.
//!
//! The player is driven in two halves around the host's physics integration:
//! `pre_update` turns held input into horizontal acceleration, and
//! `post_update` enforces the fall-speed cap, applies ground deceleration or
//! the air clamp, and snaps near-zero drift to rest. Grounded state comes from
//! the [`GroundContactTracker`](crate::ground::GroundContactTracker); the
//! player never decides it on its own.
//!
//! After `post_update`, `acc.x` is always `0` or `±stop_deceleration`, so input
//! acceleration is applied once per frame and never piles up.

use glam::Vec2;
use lakbay_core::input::{Control, Controls, XDirection};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Input acceleration while grounded (units/s²).
    pub acceleration: f32,
    /// Deceleration applied when stopping or over the cap on the ground.
    pub stop_deceleration: f32,
    pub run_max_speed: f32,
    pub sprint_max_speed: f32,
    /// Terminal fall speed.
    pub max_fall_speed: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            acceleration: 300.0,
            stop_deceleration: 300.0,
            run_max_speed: 90.0,
            sprint_max_speed: 210.0,
            max_fall_speed: 270.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Sprites are authored facing right.
    pub fn flip_horizontal(self) -> bool {
        self == Self::Left
    }
}

impl From<XDirection> for Facing {
    fn from(direction: XDirection) -> Self {
        match direction {
            XDirection::Left => Self::Left,
            XDirection::Right => Self::Right,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
    pub half_extents: Vec2,
    pub facing: Facing,
    pub config: MovementConfig,
}

impl Player {
    pub const SIZE: f32 = 32.0;

    pub fn new(pos: Vec2) -> Self {
        Self::with_config(pos, MovementConfig::default())
    }

    pub fn with_config(pos: Vec2, config: MovementConfig) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            half_extents: Vec2::splat(Self::SIZE * 0.5),
            facing: Facing::default(),
            config,
        }
    }

    /// Sprint raises the cap only while a direction is held with it.
    pub fn is_sprinting(&self, controls: &Controls<'_>) -> bool {
        controls.is_moving() && controls.is_held(Control::Sprint)
    }

    pub fn max_x_speed(&self, controls: &Controls<'_>) -> f32 {
        if self.is_sprinting(controls) {
            self.config.sprint_max_speed
        } else {
            self.config.run_max_speed
        }
    }

    pub fn is_x_movement_allowed(grounded: bool) -> bool {
        grounded
    }

    /// Apply input acceleration. Runs once per frame before integration.
    ///
    /// Input toward the direction of travel adds nothing once speed is at or
    /// above the cap. `post_update` owns the speed from there: the ground
    /// ramp-down after a sprint release runs at `stop_deceleration` alone,
    /// which would cancel out against held input when the two are equal.
    /// Input against the direction of travel always applies.
    pub fn pre_update(&mut self, controls: &Controls<'_>, grounded: bool) {
        let Some(direction) = controls.held_x_direction() else {
            return;
        };
        if !Self::is_x_movement_allowed(grounded) {
            return;
        }

        self.facing = direction.into();

        let at_cap = self.vel.x.abs() >= self.max_x_speed(controls);
        if at_cap && direction.matches_velocity(self.vel.x) {
            return;
        }
        self.acc.x += self.config.acceleration * direction.sign();
    }

    /// Host-side explicit Euler step. Gravity is added on top of the body's own
    /// acceleration.
    pub fn integrate(&mut self, gravity: Vec2, dt: f32) {
        self.vel += (self.acc + gravity) * dt;
        self.pos += self.vel * dt;
    }

    /// Enforce speed limits after integration. Runs once per frame.
    pub fn post_update(&mut self, controls: &Controls<'_>, grounded: bool, dt: f32) {
        self.clamp_fall_speed();
        self.apply_deceleration(controls, grounded, dt);
    }

    fn clamp_fall_speed(&mut self) {
        let max = self.config.max_fall_speed;
        if self.vel.y >= max {
            self.vel.y = max;
            self.acc.y = 0.0;
        } else if self.vel.y < -max {
            self.vel.y = -max;
        }
    }

    fn apply_deceleration(&mut self, controls: &Controls<'_>, grounded: bool, dt: f32) {
        let cap = self.max_x_speed(controls);
        let speed = self.vel.x.abs();
        let over_cap = speed > cap;

        if grounded {
            if !controls.is_moving() {
                self.acc.x = if self.vel.x != 0.0 {
                    -self.config.stop_deceleration * sign(self.vel.x)
                } else {
                    0.0
                };
            } else if over_cap {
                // Overshoot from this frame's own input is clipped; anything
                // larger (sprint released) ramps down.
                let step_gain = self.config.acceleration * dt + 1e-3;
                if speed - cap <= step_gain {
                    self.vel.x = cap * sign(self.vel.x);
                    self.acc.x = 0.0;
                } else {
                    self.acc.x = -self.config.stop_deceleration * sign(self.vel.x);
                }
            } else {
                self.acc.x = 0.0;
            }
        } else {
            if over_cap {
                self.vel.x = self.vel.x.clamp(-cap, cap);
            }
            self.acc.x = 0.0;
        }

        let vel_sign = sign(self.vel.x);
        let acc_sign = sign(self.acc.x);
        let decelerating = vel_sign != 0.0 && acc_sign != 0.0 && vel_sign != acc_sign;
        if decelerating && self.vel.x.abs() < 1.0 {
            log::trace!("Snapping residual velocity {:.3} to rest", self.vel.x);
            self.vel.x = 0.0;
            self.acc.x = 0.0;
        }
    }
}

/// Sign with an explicit zero, unlike `f32::signum`.
fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
