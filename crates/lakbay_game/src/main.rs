//! Lakbay -- headless level runner.
//!
//! Loads the game config, player tuning, animation clips, timeline and level,
//! composes the level scene, then drives the world with a scripted key replay
//! at a fixed timestep:
//!
//!   1. `ReplayFrame::apply` -- press/release keys and on-screen buttons
//!   2. `World::frame` -- feed the accumulator and run whole fixed steps
//!   3. each step: player pre-update, integrate, tile collision, ground
//!      contacts, player post-update, animation, camera, info panel
//!
//! The replay path may be passed as the first argument.

mod animation;
mod buttons;
mod camera;
mod collision;
mod config;
mod ground;
mod level;
mod player;
mod replay;
mod scene;
mod timeline;
mod world;

use std::path::{Path, PathBuf};

use animation::AnimationRegistry;
use config::{load_game_config_from_path, load_movement_config_from_path};
use level::load_level_from_path;
use replay::load_replay_from_path;
use scene::{EntityFactory, LevelScene};
use timeline::load_timeline_from_path;
use world::World;

const GAME_CONFIG_PATH: &str = "assets/config/game.json";
const PLAYER_CONFIG_PATH: &str = "assets/config/player.json";
const PLAYER_ANIMATION_PATH: &str = "assets/animations/player.json";
const LEVEL_PATH: &str = "assets/levels/main.json";
const TIMELINE_PATH: &str = "assets/data/timeline.json";
const DEFAULT_REPLAY_PATH: &str = "assets/replays/walk_right.json";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let replay_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPLAY_PATH));

    if let Err(err) = run(&replay_path) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run(replay_path: &Path) -> Result<(), String> {
    let config = load_game_config_from_path(Path::new(GAME_CONFIG_PATH))?;
    let movement = load_movement_config_from_path(Path::new(PLAYER_CONFIG_PATH))?;

    let mut registry = AnimationRegistry::new();
    let animation_id = registry.load_file(Path::new(PLAYER_ANIMATION_PATH))?;

    let timeline = load_timeline_from_path(Path::new(TIMELINE_PATH))?;
    log::info!("Loaded {} timeline events", timeline.len());

    let level = load_level_from_path(Path::new(LEVEL_PATH))?;
    let factory = EntityFactory::with_defaults(movement);
    let scene = LevelScene::compose(
        &level,
        &factory,
        &timeline,
        (config.viewport_width, config.viewport_height),
        config.camera_zoom,
    );
    for label in scene.labels() {
        log::debug!("Label '{}' at ({}, {})", label.text, label.pos.x, label.pos.y);
    }

    let mut world = World::new(scene, timeline, registry, &animation_id, &config)?;
    if world.player.is_none() {
        log::warn!("Level '{}' has no player; nothing will move", level.level_id);
    }

    let replay = load_replay_from_path(replay_path)?;
    log::info!(
        "Running replay '{}' ({} frames)",
        replay_path.display(),
        replay.total_frames()
    );

    replay.play(&mut world);

    if let Some(player) = &world.player {
        log::info!(
            "Replay finished after {} steps: pos=({:.1}, {:.1}) vel=({:.1}, {:.1}) grounded={} clip={} camera=({:.1}, {:.1})",
            world.time.fixed_step_count,
            player.pos.x,
            player.pos.y,
            player.vel.x,
            player.vel.y,
            world.is_grounded(),
            world.animator.clip().name(),
            world.scene.camera.position.x,
            world.scene.camera.position.y
        );
    }
    Ok(())
}
