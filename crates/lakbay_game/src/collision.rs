//! Tile collision used by the headless host.
//!
//! Collision tile layers from the level are flattened into one grid of cells,
//! each tagged with the [`BodyKind`] of its layer.
//! Movement is resolved with **axis-separable move-and-slide**: X first, then
//! Y using the corrected X, which prevents diagonal tunneling and gives the
//! "slide along walls" behavior platformers need. Each blocked side is turned
//! into a [`Contact`] for the ground tracker, as is each passive tile the
//! leading edge touches.
//!
//! World units follow the level data: `+y` points down, cell `(0, 0)` is the
//! top-left tile.

use glam::Vec2;
use std::collections::HashMap;

use crate::ground::{BodyKind, Contact, Side};

/// Collision category bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Category {
    Ground = 0b0000_0001,
    Player = 0b0000_0010,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionGroup {
    pub name: &'static str,
    pub category: u32,
    pub mask: u32,
}

impl CollisionGroup {
    pub const GROUND: CollisionGroup = CollisionGroup {
        name: "ground",
        category: Category::Ground as u32,
        mask: Category::Player as u32,
    };
    pub const PLAYER: CollisionGroup = CollisionGroup {
        name: "player",
        category: Category::Player as u32,
        mask: Category::Ground as u32,
    };

    /// Both sides have to accept each other.
    pub fn can_collide(&self, other: &CollisionGroup) -> bool {
        (self.mask & other.category) != 0 && (other.mask & self.category) != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center_x: f32,
    pub center_y: f32,
    pub half_w: f32,
    pub half_h: f32,
}

#[derive(Debug, Clone)]
pub struct CollisionMoveResult {
    pub aabb: Aabb,
    pub collided_x: bool,
    pub collided_y: bool,
    contacts: Vec<Contact>,
}

impl CollisionMoveResult {
    /// One contact per blocked side with the kind of body that blocked it,
    /// plus one per side whose leading edge touched a passive tile.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }
}

/// Outcome of resolving one axis of motion.
#[derive(Debug, Clone, Copy)]
struct AxisHit {
    pos: f32,
    blocker: Option<BodyKind>,
    touched_passive: bool,
}

impl AxisHit {
    fn free(pos: f32) -> Self {
        Self {
            pos,
            blocker: None,
            touched_passive: false,
        }
    }

    fn push_contacts(&self, side: Side, collided: bool, contacts: &mut Vec<Contact>) {
        if collided {
            contacts.push(Contact {
                side,
                other: self.blocker.unwrap_or(BodyKind::Fixed),
            });
        }
        if self.touched_passive {
            contacts.push(Contact {
                side,
                other: BodyKind::Passive,
            });
        }
    }
}

/// The map rectangle. Everything outside it is a fixed body.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn min(&self) -> Vec2 {
        Vec2::ZERO
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

#[derive(Debug, Clone)]
pub struct CollisionGrid {
    pub cell_w: f32,
    pub cell_h: f32,
    pub width: i32,
    pub height: i32,
    pub group: CollisionGroup,
    /// When set, everything outside the map counts as a fixed body.
    bounded: bool,
    cells: HashMap<GridCell, BodyKind>,
}

impl CollisionGrid {
    pub fn new(
        cell_w: f32,
        cell_h: f32,
        width: i32,
        height: i32,
        solids: impl IntoIterator<Item = GridCell>,
    ) -> Self {
        Self {
            cell_w,
            cell_h,
            width,
            height,
            group: CollisionGroup::GROUND,
            bounded: false,
            cells: solids
                .into_iter()
                .map(|cell| (cell, BodyKind::Fixed))
                .collect(),
        }
    }

    pub fn insert(&mut self, cell: GridCell, body: BodyKind) {
        self.cells.insert(cell, body);
    }

    pub fn set_group(&mut self, group: CollisionGroup) {
        self.group = group;
    }

    pub fn apply_bounds(&mut self, bounds: &WorldBounds) {
        log::debug!(
            "World bounds {}x{} applied to collision grid",
            bounds.width,
            bounds.height
        );
        self.bounded = true;
    }

    pub fn body_at(&self, x: i32, y: i32) -> Option<BodyKind> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return self.bounded.then_some(BodyKind::Fixed);
        }
        self.cells.get(&GridCell { x, y }).copied()
    }

    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.body_at(x, y).is_some_and(BodyKind::is_solid)
    }

    pub fn is_solid_at(&self, pos: Vec2) -> bool {
        self.is_solid(self.world_to_cell_x(pos.x), self.world_to_cell_y(pos.y))
    }

    pub fn solid_count(&self) -> usize {
        self.cells.values().filter(|body| body.is_solid()).count()
    }

    pub fn move_and_collide_detailed(
        &self,
        aabb: Aabb,
        dx: f32,
        dy: f32,
        mover: &CollisionGroup,
    ) -> CollisionMoveResult {
        const EPS: f32 = 0.0001;

        if !self.group.can_collide(mover) {
            let mut moved = aabb;
            moved.center_x += dx;
            moved.center_y += dy;
            return CollisionMoveResult {
                aabb: moved,
                collided_x: false,
                collided_y: false,
                contacts: Vec::new(),
            };
        }

        let x_hit = self.resolve_axis_x(aabb, dx);
        let collided_x = (x_hit.pos - (aabb.center_x + dx)).abs() > EPS;

        let mut moved = aabb;
        moved.center_x = x_hit.pos;
        let y_hit = self.resolve_axis_y(moved, dy);
        let collided_y = (y_hit.pos - (aabb.center_y + dy)).abs() > EPS;
        moved.center_y = y_hit.pos;

        let mut contacts = Vec::new();
        let y_side = if dy > 0.0 { Side::Bottom } else { Side::Top };
        y_hit.push_contacts(y_side, collided_y, &mut contacts);
        let x_side = if dx > 0.0 { Side::Right } else { Side::Left };
        x_hit.push_contacts(x_side, collided_x, &mut contacts);

        CollisionMoveResult {
            aabb: moved,
            collided_x,
            collided_y,
            contacts,
        }
    }

    fn resolve_axis_x(&self, aabb: Aabb, dx: f32) -> AxisHit {
        if dx == 0.0 {
            return AxisHit::free(aabb.center_x);
        }

        const EPS: f32 = 0.001;
        let mut candidate_x = aabb.center_x + dx;
        let y0 = self.world_to_cell_y(aabb.center_y - aabb.half_h + EPS);
        let y1 = self.world_to_cell_y(aabb.center_y + aabb.half_h - EPS);

        let (x_cell, limit) = if dx > 0.0 {
            let x_cell = self.world_to_cell_x(candidate_x + aabb.half_w - EPS);
            (x_cell, self.cell_left_world(x_cell) - aabb.half_w)
        } else {
            let x_cell = self.world_to_cell_x(candidate_x - aabb.half_w + EPS);
            (x_cell, self.cell_left_world(x_cell + 1) + aabb.half_w)
        };
        let mut hit = self.scan(std::iter::repeat(x_cell).zip(y0..=y1));
        if hit.blocker.is_some() {
            candidate_x = if dx > 0.0 {
                candidate_x.min(limit)
            } else {
                candidate_x.max(limit)
            };
        }
        // Never push opposite to the motion.
        hit.pos = if dx > 0.0 {
            candidate_x.max(aabb.center_x)
        } else {
            candidate_x.min(aabb.center_x)
        };
        hit
    }

    fn resolve_axis_y(&self, aabb: Aabb, dy: f32) -> AxisHit {
        if dy == 0.0 {
            return AxisHit::free(aabb.center_y);
        }

        const EPS: f32 = 0.001;
        let mut candidate_y = aabb.center_y + dy;
        let x0 = self.world_to_cell_x(aabb.center_x - aabb.half_w + EPS);
        let x1 = self.world_to_cell_x(aabb.center_x + aabb.half_w - EPS);

        let (y_cell, limit) = if dy > 0.0 {
            let y_cell = self.world_to_cell_y(candidate_y + aabb.half_h - EPS);
            (y_cell, self.cell_top_world(y_cell) - aabb.half_h)
        } else {
            let y_cell = self.world_to_cell_y(candidate_y - aabb.half_h + EPS);
            (y_cell, self.cell_top_world(y_cell + 1) + aabb.half_h)
        };
        let mut hit = self.scan((x0..=x1).zip(std::iter::repeat(y_cell)));
        if hit.blocker.is_some() {
            candidate_y = if dy > 0.0 {
                candidate_y.min(limit)
            } else {
                candidate_y.max(limit)
            };
        }
        hit.pos = if dy > 0.0 {
            candidate_y.max(aabb.center_y)
        } else {
            candidate_y.min(aabb.center_y)
        };
        hit
    }

    /// Classify the cells along a leading edge. The first solid body found
    /// becomes the blocker.
    fn scan(&self, cells: impl Iterator<Item = (i32, i32)>) -> AxisHit {
        let mut hit = AxisHit::free(0.0);
        for (x, y) in cells {
            match self.body_at(x, y) {
                Some(body) if body.is_solid() && hit.blocker.is_none() => {
                    hit.blocker = Some(body);
                }
                Some(BodyKind::Passive) => hit.touched_passive = true,
                _ => {}
            }
        }
        hit
    }

    fn world_to_cell_x(&self, world_x: f32) -> i32 {
        (world_x / self.cell_w).floor() as i32
    }

    fn world_to_cell_y(&self, world_y: f32) -> i32 {
        (world_y / self.cell_h).floor() as i32
    }

    fn cell_left_world(&self, x: i32) -> f32 {
        x as f32 * self.cell_w
    }

    fn cell_top_world(&self, y: i32) -> f32 {
        y as f32 * self.cell_h
    }
}
