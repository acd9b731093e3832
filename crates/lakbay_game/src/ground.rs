//! Ground contact tracking.
//!
//! Grounded state is recomputed every physics step: the tracker assumes the
//! body is airborne when the step begins and only flips to grounded if a
//! qualifying contact is reported before the step ends. Walking off a ledge
//! therefore clears the flag on the very next step.

use glam::Vec2;
use serde::Deserialize;

/// Which side of the tracked body a contact touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// How the other body in a contact takes part in collision response. Level
/// tile layers pick one through their `body` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    /// Moves and is pushed by collisions.
    Active,
    /// Never moves; level geometry and world bounds.
    Fixed,
    /// Reports overlaps but does not resolve them (triggers).
    Passive,
    /// Neither blocks nor reports.
    PreventCollision,
}

impl BodyKind {
    pub fn is_solid(self) -> bool {
        matches!(self, Self::Active | Self::Fixed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub side: Side,
    pub other: BodyKind,
}

#[derive(Debug, Default)]
pub struct GroundContactTracker {
    grounded: bool,
    pending: bool,
}

impl GroundContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn begin_step(&mut self) {
        self.pending = false;
    }

    /// `step_velocity` is the velocity the body carried into collision
    /// resolution for this step.
    pub fn on_contact(&mut self, contact: &Contact, step_velocity: Vec2) {
        let falling = step_velocity.y > 0.0;
        if contact.side == Side::Bottom && contact.other.is_solid() && falling {
            self.pending = true;
        }
    }

    pub fn end_step(&mut self) {
        if self.pending != self.grounded {
            log::debug!(
                "Player {}",
                if self.pending { "landed" } else { "left the ground" }
            );
        }
        self.grounded = self.pending;
    }
}
