//! Animation registry and player clip selection.
//!
//! The registry wraps the core `AnimationFile`/`AnimationClip` types from
//! `lakbay_core::animation` and resolves clips by animation id and name.
//!
//! Clip selection is a pure function of the player's state; the animator only
//! restarts playback when the selected clip actually changes, so holding a
//! direction does not reset the run cycle every frame.

use std::collections::HashMap;
use std::path::Path;

use lakbay_core::animation::{load_animation_file, AnimationClip, AnimationState};
use lakbay_core::input::XDirection;

use crate::player::Facing;

/// Playback speed multiplier ceiling.
pub const MAX_PLAYBACK_SPEED: f32 = 3.0;
/// Horizontal speed at which playback reaches 4x before the cap kicks in.
const PLAYBACK_SPEED_REFERENCE: f32 = 200.0;

/// Registry holding animation clips from multiple animation definition files,
/// keyed by `animation_id` then clip name.
pub struct AnimationRegistry {
    files: HashMap<String, HashMap<String, AnimationClip>>,
}

impl AnimationRegistry {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
        }
    }

    /// Load an animation file and register its clips under its `animation_id`.
    pub fn load_file(&mut self, path: &Path) -> Result<String, String> {
        let file = load_animation_file(path)?;
        let id = file.animation_id.clone();
        self.files.insert(file.animation_id, file.animations);
        Ok(id)
    }

    pub fn resolve_clip(&self, source: &str, name: &str) -> Option<&AnimationClip> {
        self.files.get(source).and_then(|clips| clips.get(name))
    }

    /// Check that every [`PlayerClip`] exists in `source`.
    pub fn validate_player_clips(&self, source: &str) -> Result<(), String> {
        for clip in PlayerClip::ALL {
            if self.resolve_clip(source, clip.name()).is_none() {
                return Err(format!(
                    "Animation '{}' is missing player clip '{}'",
                    source,
                    clip.name()
                ));
            }
        }
        Ok(())
    }
}

impl Default for AnimationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerClip {
    Idle,
    Run,
    Sprint,
}

impl PlayerClip {
    pub const ALL: [PlayerClip; 3] = [Self::Idle, Self::Run, Self::Sprint];

    /// Clip name in the animation file.
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Run => "run",
            Self::Sprint => "sprint",
        }
    }
}

/// Everything clip selection looks at.
#[derive(Debug, Clone, Copy)]
pub struct ClipContext {
    pub grounded: bool,
    pub velocity_x: f32,
    pub held: Option<XDirection>,
    pub sprinting: bool,
    pub run_max_speed: f32,
}

/// Half-up rounding to zero, i.e. `-0.5 <= v < 0.5`.
fn rounds_to_zero(value: f32) -> bool {
    (value + 0.5).floor() == 0.0
}

pub fn select_clip(ctx: &ClipContext) -> PlayerClip {
    if rounds_to_zero(ctx.velocity_x) {
        return PlayerClip::Idle;
    }
    if !ctx.grounded {
        return PlayerClip::Run;
    }

    // Holding against momentum reads as skidding, which uses the idle pose.
    let moving_with_input = ctx
        .held
        .map_or(true, |direction| direction.matches_velocity(ctx.velocity_x));
    if !moving_with_input {
        return PlayerClip::Idle;
    }
    if ctx.sprinting && ctx.velocity_x.abs() > ctx.run_max_speed {
        PlayerClip::Sprint
    } else {
        PlayerClip::Run
    }
}

/// Grows quadratically with horizontal speed, capped at [`MAX_PLAYBACK_SPEED`].
pub fn playback_speed(velocity_x: f32) -> f32 {
    let ratio = velocity_x.abs() / PLAYBACK_SPEED_REFERENCE;
    (1.0 + ratio * ratio * 3.0).min(MAX_PLAYBACK_SPEED)
}

/// Drives the player's sprite-sheet animation.
pub struct PlayerAnimator {
    source_id: String,
    clip: PlayerClip,
    state: AnimationState,
    pub speed: f32,
    pub flip_horizontal: bool,
    pub cell: u32,
}

impl PlayerAnimator {
    pub fn new(source_id: &str) -> Self {
        Self {
            source_id: source_id.to_string(),
            clip: PlayerClip::Idle,
            state: AnimationState::new(PlayerClip::Idle.name()),
            speed: 1.0,
            flip_horizontal: false,
            cell: 0,
        }
    }

    pub fn clip(&self) -> PlayerClip {
        self.clip
    }

    pub fn set(&mut self, clip: PlayerClip) {
        if clip == self.clip {
            return;
        }
        log::debug!("Player animation {} -> {}", self.clip.name(), clip.name());
        self.clip = clip;
        self.state = AnimationState::new(clip.name());
    }

    pub fn update(
        &mut self,
        ctx: &ClipContext,
        facing: Facing,
        registry: &AnimationRegistry,
        dt_us: u64,
    ) {
        self.speed = playback_speed(ctx.velocity_x);
        self.flip_horizontal = facing.flip_horizontal();
        self.set(select_clip(ctx));

        match registry.resolve_clip(&self.source_id, self.clip.name()) {
            Some(clip) => self.cell = self.state.tick_scaled(dt_us, self.speed, clip),
            None => log::warn!(
                "Animation '{}' has no clip '{}'",
                self.source_id,
                self.clip.name()
            ),
        }
    }
}
