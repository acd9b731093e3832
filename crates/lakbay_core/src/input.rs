//! Input state tracking with both edge-triggered and level-triggered queries,
//! plus the abstract control layer gameplay code reads from.
//!
//! - **Level-triggered (held):** `is_held(key)` returns true every frame the key
//!   is physically down. Held keys are kept in press order so that conflicting
//!   directions can be resolved by recency.
//!
//! - **Edge-triggered (just_pressed / just_released):** These are true only during
//!   the frame the transition happened. They are cleared by `end_frame()`, which
//!   the frame runner calls only after at least one fixed simulation step has
//!   consumed them.
//!
//! Gameplay never asks about physical keys directly. It goes through
//! [`Controls`], which resolves a [`Control`] to every key bound to it in a
//! [`ControlMap`].

use std::collections::HashSet;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Escape,
    Space,
    ShiftLeft,
    ShiftRight,
    W,
    A,
    S,
    D,
    R,
}

/// Abstract gameplay controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Left,
    Right,
    Sprint,
}

/// Horizontal intent derived from held controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XDirection {
    Left,
    Right,
}

impl XDirection {
    /// `-1.0` for left, `1.0` for right.
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// True when `velocity_x` is strictly moving this way.
    pub fn matches_velocity(self, velocity_x: f32) -> bool {
        match self {
            Self::Left => velocity_x < 0.0,
            Self::Right => velocity_x > 0.0,
        }
    }
}

#[derive(Debug, Default)]
pub struct InputState {
    /// Held keys, oldest press first.
    held: Vec<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        if !self.held.contains(&key) {
            self.held.push(key);
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if let Some(index) = self.held.iter().position(|&k| k == key) {
            self.held.remove(index);
            self.just_released.insert(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    /// Held keys, most recently pressed first.
    pub fn held_latest_first(&self) -> impl Iterator<Item = Key> + '_ {
        self.held.iter().rev().copied()
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

/// Binding of each [`Control`] to the physical keys that trigger it.
#[derive(Debug, Clone)]
pub struct ControlMap {
    pub left: Vec<Key>,
    pub right: Vec<Key>,
    pub sprint: Vec<Key>,
}

impl Default for ControlMap {
    fn default() -> Self {
        Self {
            left: vec![Key::Left, Key::A],
            right: vec![Key::Right, Key::D],
            sprint: vec![Key::ShiftLeft, Key::ShiftRight],
        }
    }
}

impl ControlMap {
    pub fn keys(&self, control: Control) -> &[Key] {
        match control {
            Control::Left => &self.left,
            Control::Right => &self.right,
            Control::Sprint => &self.sprint,
        }
    }
}

/// Read-only view pairing the device state with a control map.
#[derive(Clone, Copy)]
pub struct Controls<'a> {
    input: &'a InputState,
    map: &'a ControlMap,
}

impl<'a> Controls<'a> {
    pub fn new(input: &'a InputState, map: &'a ControlMap) -> Self {
        Self { input, map }
    }

    pub fn is_held(&self, control: Control) -> bool {
        self.map
            .keys(control)
            .iter()
            .any(|&key| self.input.is_held(key))
    }

    pub fn was_pressed(&self, control: Control) -> bool {
        self.map
            .keys(control)
            .iter()
            .any(|&key| self.input.is_just_pressed(key))
    }

    pub fn was_released(&self, control: Control) -> bool {
        self.map
            .keys(control)
            .iter()
            .any(|&key| self.input.is_just_released(key))
    }

    /// The direction of the most recently pressed key still held that is bound
    /// to `Left` or `Right`. Holding both resolves to whichever came last.
    pub fn held_x_direction(&self) -> Option<XDirection> {
        for key in self.input.held_latest_first() {
            if self.map.left.contains(&key) {
                return Some(XDirection::Left);
            }
            if self.map.right.contains(&key) {
                return Some(XDirection::Right);
            }
        }
        None
    }

    /// Holding a direction, whether or not the body is actually moving.
    pub fn is_moving(&self) -> bool {
        self.held_x_direction().is_some()
    }

    /// Holding against the current horizontal velocity.
    pub fn is_turning(&self, velocity_x: f32) -> bool {
        match self.held_x_direction() {
            Some(XDirection::Left) => velocity_x > 0.0,
            Some(XDirection::Right) => velocity_x < 0.0,
            None => false,
        }
    }
}
