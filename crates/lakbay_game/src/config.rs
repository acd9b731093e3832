//! Game and player tuning files.

use glam::Vec2;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::player::MovementConfig;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    pub version: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// World gravity in units/s², y down.
    pub gravity: [f32; 2],
    pub fixed_dt: f64,
    pub camera_zoom: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            viewport_width: 800,
            viewport_height: 600,
            gravity: [0.0, 800.0],
            fixed_dt: 1.0 / 60.0,
            camera_zoom: 1.5,
        }
    }
}

impl GameConfig {
    pub fn gravity(&self) -> Vec2 {
        Vec2::from(self.gravity)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlayerConfigFile {
    pub version: String,
    #[serde(default)]
    pub movement: MovementConfig,
}

pub fn load_game_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read game config {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse game config JSON {}: {e}", path.display()))?;
    validate_game_config(&config)?;
    Ok(config)
}

fn validate_game_config(config: &GameConfig) -> Result<(), String> {
    if config.version != "0.1" {
        return Err(format!(
            "Game config validation failed: unsupported version '{}'",
            config.version
        ));
    }
    if config.viewport_width == 0 || config.viewport_height == 0 {
        return Err("Game config validation failed: viewport must be non-empty".to_string());
    }
    if !(config.fixed_dt > 0.0) {
        return Err("Game config validation failed: fixed_dt must be > 0".to_string());
    }
    if !(config.camera_zoom > 0.0) {
        return Err("Game config validation failed: camera_zoom must be > 0".to_string());
    }
    Ok(())
}

pub fn load_movement_config_from_path(path: &Path) -> Result<MovementConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read player config {}: {e}", path.display()))?;
    let file: PlayerConfigFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse player config JSON {}: {e}", path.display()))?;
    if file.version != "0.1" {
        return Err(format!(
            "Player config validation failed: unsupported version '{}'",
            file.version
        ));
    }
    validate_movement(&file.movement)?;
    Ok(file.movement)
}

fn validate_movement(movement: &MovementConfig) -> Result<(), String> {
    let values = [
        ("acceleration", movement.acceleration),
        ("stop_deceleration", movement.stop_deceleration),
        ("run_max_speed", movement.run_max_speed),
        ("sprint_max_speed", movement.sprint_max_speed),
        ("max_fall_speed", movement.max_fall_speed),
    ];
    for (name, value) in values {
        if !(value > 0.0) {
            return Err(format!(
                "Player config validation failed: {name} must be > 0"
            ));
        }
    }
    if movement.sprint_max_speed < movement.run_max_speed {
        log::warn!(
            "sprint_max_speed ({}) is below run_max_speed ({}); sprinting will slow the player down",
            movement.sprint_max_speed,
            movement.run_max_speed
        );
    }
    Ok(())
}
