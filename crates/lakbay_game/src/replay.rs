use lakbay_core::input::Key;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::buttons::VirtualButton;
use crate::world::World;

/// Scripted key and on-screen button presses fed to the input device, one
/// entry per frame group.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    pub version: String,
    #[serde(default = "default_dt")]
    pub fixed_dt: f64,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub press: Vec<Key>,
    #[serde(default)]
    pub release: Vec<Key>,
    #[serde(default)]
    pub button_down: Vec<VirtualButton>,
    #[serde(default)]
    pub button_up: Vec<VirtualButton>,
    /// How many frames to run after applying the key changes.
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplayFrame {
    /// Releases go first so a frame can swap one key or button for another.
    pub fn apply(&self, world: &mut World) {
        for &key in &self.release {
            world.input.key_up(key);
        }
        for &button in &self.button_up {
            world.buttons.release(button, &mut world.input);
        }
        for &key in &self.press {
            world.input.key_down(key);
        }
        for &button in &self.button_down {
            world.buttons.press(button, &mut world.input);
        }
    }
}

impl ReplaySequence {
    pub fn total_frames(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.repeat.max(1))).sum()
    }

    /// Run every frame of the sequence against `world`, one `fixed_dt` of
    /// wall time per frame.
    pub fn play(&self, world: &mut World) {
        for frame in &self.frames {
            frame.apply(world);
            for _ in 0..frame.repeat.max(1) {
                world.frame(self.fixed_dt);
            }
        }
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.version != "0.1" {
        return Err(format!(
            "Replay validation failed: unsupported version '{}'",
            replay.version
        ));
    }
    if !(replay.fixed_dt > 0.0) {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt() -> f64 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}
