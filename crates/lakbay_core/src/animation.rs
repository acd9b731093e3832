//! Frame-based sprite-sheet animation types and deterministic tick logic.
//!
//! An animation file names one sprite sheet (a uniform grid of cells) and a set
//! of clips. Each clip is a sequence of cell indices with per-frame durations.
//! All timing uses integer microseconds (`u64`) so advancement is deterministic
//! under the fixed-timestep model. Playback speed multipliers are applied to
//! the incoming delta before it reaches the integer accumulator.
//!
//! The JSON format stores `duration_ms` for readability; on load this is
//! converted to `duration_us`.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Uniform grid sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SpriteSheet {
    pub columns: u32,
    pub rows: u32,
    pub sprite_width: u32,
    pub sprite_height: u32,
}

impl SpriteSheet {
    pub fn cell_count(&self) -> u32 {
        self.columns * self.rows
    }
}

/// A single frame in an animation clip.
#[derive(Debug, Clone)]
pub struct AnimationFrame {
    pub cell: u32,
    pub duration_us: u64,
}

/// A named sequence of frames that can loop or play once.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub frames: Vec<AnimationFrame>,
    pub looping: bool,
}

impl AnimationClip {
    /// Total duration of one full cycle in microseconds.
    pub fn total_duration_us(&self) -> u64 {
        self.frames.iter().map(|f| f.duration_us).sum()
    }
}

/// Top-level animation definition file.
#[derive(Debug, Clone)]
pub struct AnimationFile {
    pub version: String,
    pub animation_id: String,
    pub sheet: SpriteSheet,
    pub animations: HashMap<String, AnimationClip>,
}

/// Runtime state for one active animation instance.
#[derive(Debug, Clone)]
pub struct AnimationState {
    pub clip_name: String,
    pub frame_index: usize,
    pub elapsed_us: u64,
    pub finished: bool,
}

impl AnimationState {
    pub fn new(clip_name: &str) -> Self {
        Self {
            clip_name: clip_name.to_string(),
            frame_index: 0,
            elapsed_us: 0,
            finished: false,
        }
    }

    /// Advance the animation by `dt_us` microseconds. Returns the current frame's
    /// sheet cell.
    pub fn tick(&mut self, dt_us: u64, clip: &AnimationClip) -> u32 {
        if clip.frames.is_empty() {
            return 0;
        }
        if self.finished {
            return clip
                .frames
                .get(self.frame_index)
                .or_else(|| clip.frames.last())
                .map_or(0, |f| f.cell);
        }

        self.elapsed_us += dt_us;

        loop {
            let current_frame = &clip.frames[self.frame_index];
            if self.elapsed_us < current_frame.duration_us {
                break;
            }

            self.elapsed_us -= current_frame.duration_us;
            self.frame_index += 1;

            if self.frame_index >= clip.frames.len() {
                if clip.looping {
                    self.frame_index = 0;
                } else {
                    self.frame_index = clip.frames.len() - 1;
                    self.elapsed_us = 0;
                    self.finished = true;
                    break;
                }
            }
        }

        clip.frames[self.frame_index].cell
    }

    /// Like [`tick`](Self::tick) with the delta scaled by a playback speed.
    pub fn tick_scaled(&mut self, dt_us: u64, speed: f32, clip: &AnimationClip) -> u32 {
        let scaled = (dt_us as f64 * speed.max(0.0) as f64).round() as u64;
        self.tick(scaled, clip)
    }
}

// --- JSON deserialization types (private) ---

#[derive(Debug, Deserialize)]
struct AnimationFileJson {
    version: String,
    animation_id: String,
    sheet: SpriteSheet,
    animations: HashMap<String, AnimationClipJson>,
}

#[derive(Debug, Deserialize)]
struct AnimationClipJson {
    frames: Vec<AnimationFrameJson>,
    #[serde(default)]
    looping: bool,
}

#[derive(Debug, Deserialize)]
struct AnimationFrameJson {
    cell: u32,
    duration_ms: u64,
}

/// Load an animation definition file from disk.
pub fn load_animation_file(path: &Path) -> Result<AnimationFile, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read animation file {}: {e}", path.display()))?;
    let json: AnimationFileJson = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse animation file {}: {e}", path.display()))?;
    validate_animation_json(&json)?;

    let animations = json
        .animations
        .into_iter()
        .map(|(name, clip_json)| {
            let frames = clip_json
                .frames
                .into_iter()
                .map(|f| AnimationFrame {
                    cell: f.cell,
                    duration_us: f.duration_ms * 1000,
                })
                .collect();
            (
                name,
                AnimationClip {
                    frames,
                    looping: clip_json.looping,
                },
            )
        })
        .collect();

    Ok(AnimationFile {
        version: json.version,
        animation_id: json.animation_id,
        sheet: json.sheet,
        animations,
    })
}

fn validate_animation_json(json: &AnimationFileJson) -> Result<(), String> {
    if json.version != "0.1" {
        return Err(format!(
            "Animation validation failed: unsupported version '{}'",
            json.version
        ));
    }
    if json.animation_id.is_empty() {
        return Err("Animation validation failed: animation_id is empty".to_string());
    }
    let sheet = &json.sheet;
    if sheet.columns == 0 || sheet.rows == 0 || sheet.sprite_width == 0 || sheet.sprite_height == 0
    {
        return Err("Animation validation failed: sheet dimensions must be > 0".to_string());
    }
    for (name, clip) in &json.animations {
        if clip.frames.is_empty() {
            return Err(format!(
                "Animation validation failed: clip '{}' has no frames",
                name
            ));
        }
        for (i, frame) in clip.frames.iter().enumerate() {
            if frame.cell >= sheet.cell_count() {
                return Err(format!(
                    "Animation validation failed: clip '{}' frame {} cell {} is outside the sheet",
                    name, i, frame.cell
                ));
            }
            if frame.duration_ms == 0 {
                return Err(format!(
                    "Animation validation failed: clip '{}' frame {} has zero duration",
                    name, i
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "lakbay_anim_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn make_clip(durations_ms: &[u64], looping: bool) -> AnimationClip {
        AnimationClip {
            frames: durations_ms
                .iter()
                .enumerate()
                .map(|(i, &d)| AnimationFrame {
                    cell: i as u32,
                    duration_us: d * 1000,
                })
                .collect(),
            looping,
        }
    }

    #[test]
    fn tick_advances_through_frames() {
        let clip = make_clip(&[100, 100, 100], true);
        let mut state = AnimationState::new("run");

        assert_eq!(state.tick(0, &clip), 0);
        assert_eq!(state.tick(50_000, &clip), 0);
        assert_eq!(state.tick(60_000, &clip), 1);
    }

    #[test]
    fn looping_wraps_around() {
        let clip = make_clip(&[100, 100], true);
        let mut state = AnimationState::new("idle");

        assert_eq!(state.tick(250_000, &clip), 0);
        assert!(!state.finished);
    }

    #[test]
    fn non_looping_stops_on_last_frame() {
        let clip = make_clip(&[100, 100], false);
        let mut state = AnimationState::new("once");

        assert_eq!(state.tick(300_000, &clip), 1);
        assert!(state.finished);
        assert_eq!(state.tick(100_000, &clip), 1);
    }

    #[test]
    fn tick_scaled_runs_faster() {
        let clip = make_clip(&[100, 100, 100, 100], true);
        let mut normal = AnimationState::new("run");
        let mut fast = AnimationState::new("run");

        assert_eq!(normal.tick_scaled(100_000, 1.0, &clip), 1);
        assert_eq!(fast.tick_scaled(100_000, 3.0, &clip), 3);
    }

    #[test]
    fn tick_scaled_ignores_negative_speed() {
        let clip = make_clip(&[100, 100], true);
        let mut state = AnimationState::new("run");
        assert_eq!(state.tick_scaled(150_000, -2.0, &clip), 0);
        assert_eq!(state.elapsed_us, 0);
    }

    #[test]
    fn sheet_cell_count_is_columns_times_rows() {
        let sheet = SpriteSheet {
            columns: 6,
            rows: 7,
            sprite_width: 32,
            sprite_height: 32,
        };
        assert_eq!(sheet.cell_count(), 42);
    }

    #[test]
    fn load_animation_file_parses_valid_json() {
        let path = temp_file_path("valid");
        let json = r#"
        {
          "version": "0.1",
          "animation_id": "player",
          "sheet": { "columns": 6, "rows": 7, "sprite_width": 32, "sprite_height": 32 },
          "animations": {
            "idle": {
              "frames": [
                { "cell": 0, "duration_ms": 100 },
                { "cell": 1, "duration_ms": 100 }
              ],
              "looping": true
            },
            "run": {
              "frames": [ { "cell": 6, "duration_ms": 80 } ]
            }
          }
        }
        "#;
        fs::write(&path, json).expect("write temp file");

        let file = load_animation_file(&path).expect("should parse");
        assert_eq!(file.animation_id, "player");
        assert_eq!(file.sheet.columns, 6);
        assert_eq!(file.animations.len(), 2);
        let idle = &file.animations["idle"];
        assert!(idle.looping);
        assert_eq!(idle.frames[1].cell, 1);
        assert_eq!(idle.frames[0].duration_us, 100_000);
        assert!(!file.animations["run"].looping);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_animation_file_rejects_cell_outside_sheet() {
        let path = temp_file_path("bad_cell");
        let json = r#"
        {
          "version": "0.1",
          "animation_id": "player",
          "sheet": { "columns": 2, "rows": 2, "sprite_width": 32, "sprite_height": 32 },
          "animations": {
            "idle": { "frames": [{ "cell": 4, "duration_ms": 100 }] }
          }
        }
        "#;
        fs::write(&path, json).expect("write temp file");
        let err = load_animation_file(&path).expect_err("out of range cell should fail");
        assert!(err.contains("outside the sheet"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_animation_file_rejects_bad_version() {
        let path = temp_file_path("bad_version");
        let json = r#"
        {
          "version": "9.9",
          "animation_id": "player",
          "sheet": { "columns": 1, "rows": 1, "sprite_width": 32, "sprite_height": 32 },
          "animations": {}
        }
        "#;
        fs::write(&path, json).expect("write temp file");
        let err = load_animation_file(&path).expect_err("bad version should fail");
        assert!(err.contains("unsupported version"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn total_duration_us() {
        let clip = make_clip(&[100, 200, 300], true);
        assert_eq!(clip.total_duration_us(), 600_000);
    }
}
