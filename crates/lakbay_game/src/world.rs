//! Headless host that runs the level: fixed-step physics around the player's
//! pre/post updates, ground tracking, animation, camera and the info panel.

use glam::Vec2;

use lakbay_core::input::{ControlMap, Controls, InputState, Key};
use lakbay_core::time::TimeState;

use crate::animation::{AnimationRegistry, ClipContext, PlayerAnimator};
use crate::buttons::VirtualButtons;
use crate::collision::{Aabb, CollisionGroup};
use crate::config::GameConfig;
use crate::ground::GroundContactTracker;
use crate::player::Player;
use crate::scene::LevelScene;
use crate::timeline::{EventMarker, InfoPanels, TimelineEvent};

pub struct World {
    pub scene: LevelScene,
    pub player: Option<Player>,
    pub tracker: GroundContactTracker,
    pub input: InputState,
    pub control_map: ControlMap,
    pub buttons: VirtualButtons,
    pub time: TimeState,
    pub animator: PlayerAnimator,
    pub panels: InfoPanels,
    registry: AnimationRegistry,
    timeline: Vec<TimelineEvent>,
    markers: Vec<EventMarker>,
    gravity: Vec2,
}

impl World {
    pub fn new(
        mut scene: LevelScene,
        timeline: Vec<TimelineEvent>,
        registry: AnimationRegistry,
        animation_id: &str,
        config: &GameConfig,
    ) -> Result<Self, String> {
        registry.validate_player_clips(animation_id)?;
        let player = scene.take_player();
        let markers = scene.event_markers();
        Ok(Self {
            scene,
            player,
            tracker: GroundContactTracker::new(),
            input: InputState::new(),
            control_map: ControlMap::default(),
            buttons: VirtualButtons::new(),
            time: TimeState::new(config.fixed_dt),
            animator: PlayerAnimator::new(animation_id),
            panels: InfoPanels::new(),
            registry,
            timeline,
            markers,
            gravity: config.gravity(),
        })
    }

    pub fn is_grounded(&self) -> bool {
        self.tracker.is_grounded()
    }

    /// Run as many fixed steps as `real_dt` pays for. Edge-triggered input
    /// survives until a step has seen it. Space expands the showing summary,
    /// Escape closes the panel.
    pub fn frame(&mut self, real_dt: f64) {
        self.time.begin_frame_with(real_dt);
        let dt = self.time.fixed_dt as f32;
        let mut stepped = false;
        while self.time.should_step() {
            self.step(dt);
            stepped = true;
        }
        if stepped {
            if self.input.is_just_pressed(Key::Space) {
                self.expand_panel();
            }
            if self.input.is_just_pressed(Key::Escape) {
                self.panels.close();
            }
            self.input.end_frame();
        }
        self.time.end_frame();
    }

    pub fn step(&mut self, dt: f32) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        let controls = Controls::new(&self.input, &self.control_map);

        player.pre_update(&controls, self.tracker.is_grounded());

        let start = player.pos;
        player.integrate(self.gravity, dt);
        let step_velocity = player.vel;
        let delta = player.pos - start;

        let aabb = Aabb {
            center_x: start.x,
            center_y: start.y,
            half_w: player.half_extents.x,
            half_h: player.half_extents.y,
        };
        let result = self.scene.collision.move_and_collide_detailed(
            aabb,
            delta.x,
            delta.y,
            &CollisionGroup::PLAYER,
        );
        player.pos = Vec2::new(result.aabb.center_x, result.aabb.center_y);
        if result.collided_x {
            player.vel.x = 0.0;
        }
        if result.collided_y {
            player.vel.y = 0.0;
        }

        self.tracker.begin_step();
        for contact in result.contacts() {
            self.tracker.on_contact(contact, step_velocity);
        }
        self.tracker.end_step();

        let grounded = self.tracker.is_grounded();
        player.post_update(&controls, grounded, dt);
        log::trace!(
            "step pos=({:.2}, {:.2}) vel=({:.2}, {:.2}) acc.x={:.1} grounded={}",
            player.pos.x,
            player.pos.y,
            player.vel.x,
            player.vel.y,
            player.acc.x,
            grounded
        );

        let ctx = ClipContext {
            grounded,
            velocity_x: player.vel.x,
            held: controls.held_x_direction(),
            sprinting: player.is_sprinting(&controls),
            run_max_speed: player.config.run_max_speed,
        };
        let dt_us = (f64::from(dt) * 1_000_000.0).round() as u64;
        self.animator
            .update(&ctx, player.facing, &self.registry, dt_us);

        if self.scene.camera_follows_player {
            self.scene.camera.lock_to(player.pos);
        }
        self.panels.update(
            player.pos.x,
            &self.markers,
            &self.timeline,
            self.time.total_time,
        );
    }

    /// Open the full details for the event whose summary is showing.
    pub fn expand_panel(&mut self) -> bool {
        let Some(event_id) = self.panels.current().map(|panel| panel.event_id) else {
            return false;
        };
        let Some(event) = self.timeline.iter().find(|e| e.id == event_id) else {
            return false;
        };
        self.panels.show_full(event, self.time.total_time);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::PlayerClip;
    use crate::buttons::VirtualButton;
    use crate::collision::{CollisionGrid, GridCell, WorldBounds};
    use crate::scene::{Entity, SceneEntity};
    use crate::camera::Camera2D;
    use crate::timeline::PanelKind;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    const DT: f32 = 1.0 / 60.0;
    /// Floor surface in world units: row 10 of 16px tiles.
    const FLOOR_Y: f32 = 160.0;

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "lakbay_world_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn registry() -> AnimationRegistry {
        let path = temp_file_path("anim");
        fs::write(
            &path,
            r#"{
              "version": "0.1",
              "animation_id": "player",
              "sheet": { "columns": 6, "rows": 7, "sprite_width": 32, "sprite_height": 32 },
              "animations": {
                "idle": { "frames": [ { "cell": 0, "duration_ms": 100 } ], "looping": true },
                "run": { "frames": [ { "cell": 6, "duration_ms": 100 } ], "looping": true },
                "sprint": { "frames": [ { "cell": 12, "duration_ms": 100 } ], "looping": true }
              }
            }"#,
        )
        .expect("write anim file");
        let mut registry = AnimationRegistry::new();
        registry.load_file(&path).expect("anim file loads");
        let _ = fs::remove_file(path);
        registry
    }

    fn event(id: u32) -> TimelineEvent {
        TimelineEvent {
            id,
            year: "1880".to_string(),
            name: format!("Event {id}"),
            title: String::new(),
            biography: String::new(),
            love_story: "Summary".to_string(),
            writings: String::new(),
            influence: String::new(),
            historical_context: String::new(),
            image_key: String::new(),
            card_spacing: 500.0,
            card_lift: 25.0,
        }
    }

    fn world_with_player_at(pos: Vec2) -> World {
        let width = 200;
        let height = 11;
        let mut collision = CollisionGrid::new(
            16.0,
            16.0,
            width,
            height,
            (0..width).map(|x| GridCell { x, y: 10 }),
        );
        let bounds = WorldBounds::new(width as f32 * 16.0, height as f32 * 16.0);
        collision.apply_bounds(&bounds);
        let scene = LevelScene {
            level_id: "test".to_string(),
            entities: vec![SceneEntity {
                entity: Entity::Player(Player::new(pos)),
                z: 0,
            }],
            collision,
            bounds,
            camera: Camera2D::new(800, 600),
            camera_follows_player: true,
            vignettes: Vec::new(),
        };
        World::new(scene, Vec::new(), registry(), "player", &GameConfig::default())
            .expect("world builds")
    }

    fn resting_world() -> World {
        let mut world = world_with_player_at(Vec2::new(100.0, FLOOR_Y - 16.0));
        for _ in 0..3 {
            world.step(DT);
        }
        assert!(world.is_grounded());
        world
    }

    fn player(world: &World) -> &Player {
        world.player.as_ref().expect("player present")
    }

    #[test]
    fn player_falls_lands_and_stays_grounded() {
        let mut world = world_with_player_at(Vec2::new(100.0, 60.0));
        world.step(DT);
        assert!(!world.is_grounded());
        for _ in 0..120 {
            world.step(DT);
        }
        assert!(world.is_grounded());
        assert!((player(&world).pos.y - (FLOOR_Y - 16.0)).abs() < 0.01);
        assert_eq!(player(&world).vel.y, 0.0);
        assert_eq!(world.animator.clip(), PlayerClip::Idle);
    }

    #[test]
    fn holding_right_runs_at_run_cap() {
        let mut world = resting_world();
        world.input.key_down(Key::Right);
        for _ in 0..120 {
            world.step(DT);
        }
        let p = player(&world);
        assert!((p.vel.x - 90.0).abs() < 1e-3);
        assert_eq!(world.animator.clip(), PlayerClip::Run);
        assert!(world.is_grounded());
    }

    #[test]
    fn sprint_button_raises_cap_and_selects_sprint_clip() {
        let mut world = resting_world();
        world
            .buttons
            .press(VirtualButton::Right, &mut world.input);
        world.buttons.press(VirtualButton::Run, &mut world.input);
        for _ in 0..180 {
            world.step(DT);
        }
        assert!((player(&world).vel.x - 210.0).abs() < 1e-3);
        assert_eq!(world.animator.clip(), PlayerClip::Sprint);
        assert_eq!(world.animator.speed, 3.0);
    }

    #[test]
    fn releasing_input_comes_to_rest() {
        let mut world = resting_world();
        world.input.key_down(Key::Right);
        for _ in 0..60 {
            world.step(DT);
        }
        world.input.key_up(Key::Right);
        for _ in 0..60 {
            world.step(DT);
        }
        assert_eq!(player(&world).vel.x, 0.0);
        assert_eq!(world.animator.clip(), PlayerClip::Idle);
    }

    #[test]
    fn walls_stop_horizontal_motion() {
        let mut world = resting_world();
        world.input.key_down(Key::Left);
        for _ in 0..240 {
            world.step(DT);
        }
        let p = player(&world);
        assert!((p.pos.x - 16.0).abs() < 0.01, "stopped by the left bound");
        assert!(p.vel.x.abs() <= 300.0 * DT + 1e-3);
    }

    #[test]
    fn frame_runs_fixed_steps_and_clears_edges_after_stepping() {
        let mut world = resting_world();
        world.input.key_down(Key::Right);
        world.frame(0.005);
        assert_eq!(world.time.steps_this_frame, 0);
        assert!(world.input.is_just_pressed(Key::Right));

        world.frame(0.02);
        assert_eq!(world.time.steps_this_frame, 1);
        assert!(!world.input.is_just_pressed(Key::Right));
        assert!(player(&world).vel.x > 0.0);
    }

    #[test]
    fn camera_follows_player() {
        let mut world = resting_world();
        world.input.key_down(Key::Right);
        for _ in 0..600 {
            world.step(DT);
        }
        let px = player(&world).pos.x;
        assert!(px > 800.0);
        assert_eq!(world.scene.camera.position.x, px);
    }

    #[test]
    fn walking_past_an_event_shows_its_summary() {
        let mut world = resting_world();
        world.timeline = vec![event(7)];
        world.markers = vec![EventMarker {
            event_index: 0,
            x: 130.0,
        }];
        world.step(DT);
        let panel = world.panels.current().expect("summary shows");
        assert_eq!(panel.kind, PanelKind::Summary);
        assert_eq!(panel.text, "Event 7 (1880)\n\nSummary");

        world.input.key_down(Key::Space);
        world.frame(1.0 / 60.0);
        assert_eq!(
            world.panels.current().map(|p| p.kind),
            Some(PanelKind::Full)
        );

        world.input.key_down(Key::Escape);
        world.frame(1.0 / 60.0);
        assert!(world.panels.current().is_none());
    }

    #[test]
    fn missing_player_clip_is_an_error() {
        let scene = world_with_player_at(Vec2::ZERO).scene;
        let err = World::new(
            scene,
            Vec::new(),
            AnimationRegistry::new(),
            "player",
            &GameConfig::default(),
        )
        .err()
        .expect("empty registry must fail");
        assert!(err.contains("missing player clip"));
    }
}
