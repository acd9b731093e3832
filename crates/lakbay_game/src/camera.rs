use glam::Vec2;

pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
    pub viewport: (u32, u32),
    /// World rectangle the view must stay inside, as (min, max).
    pub limits: Option<(Vec2, Vec2)>,
}

impl Camera2D {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            viewport: (viewport_width, viewport_height),
            limits: None,
        }
    }

    /// Half the visible world extent at the current zoom.
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(
            self.viewport.0 as f32 / (2.0 * self.zoom),
            self.viewport.1 as f32 / (2.0 * self.zoom),
        )
    }

    /// Center on `target`, then push back inside the limits. An axis where
    /// the map is smaller than the view centers on the map.
    pub fn lock_to(&mut self, target: Vec2) {
        self.position = target;
        let Some((min, max)) = self.limits else {
            return;
        };
        let half = self.half_extents();
        self.position.x = clamp_axis(target.x, min.x, max.x, half.x);
        self.position.y = clamp_axis(target.y, min.y, max.y, half.y);
    }
}

fn clamp_axis(value: f32, min: f32, max: f32, half: f32) -> f32 {
    if max - min <= half * 2.0 {
        (min + max) * 0.5
    } else {
        value.clamp(min + half, max - half)
    }
}
