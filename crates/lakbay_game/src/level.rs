//! Level description: map geometry, tile layers and spawn objects.
//!
//! Levels are authored in a tile editor and exported to this JSON shape; the
//! loader only validates and hands the data to the scene composer. Solid
//! layers are flagged with a boolean `solid` property; a `body` property
//! (`fixed`, `active`, `passive` or `prevent_collision`) overrides it.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::collision::{CollisionGrid, GridCell};
use crate::ground::BodyKind;

#[derive(Debug, Deserialize, Clone)]
pub struct LevelFile {
    pub version: String,
    pub level_id: String,
    /// Map size in tiles.
    pub width: i32,
    pub height: i32,
    pub tile_width: u32,
    pub tile_height: u32,
    #[serde(default)]
    pub tile_layers: Vec<TileLayer>,
    #[serde(default)]
    pub object_layers: Vec<ObjectLayer>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TileLayer {
    pub name: String,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub cells: Vec<[i32; 2]>,
    /// Horizontal runs of tiles, a compact form for floors.
    #[serde(default)]
    pub spans: Vec<TileSpan>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct TileSpan {
    pub y: i32,
    pub x_start: i32,
    pub x_end: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObjectLayer {
    pub name: String,
    #[serde(default)]
    pub order: i32,
    pub objects: Vec<SpawnObject>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpawnObject {
    pub class: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub text: Option<TextProps>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TextProps {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub pixelsize: Option<f32>,
    #[serde(default)]
    pub halign: Option<String>,
    #[serde(default)]
    pub valign: Option<String>,
    /// `#rrggbb` fill color.
    #[serde(default)]
    pub color: Option<String>,
}

impl TileLayer {
    pub fn property_bool(&self, name: &str) -> bool {
        self.properties
            .get(name)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    pub fn is_solid(&self) -> bool {
        self.property_bool("solid")
    }

    /// Body kind of this layer's tiles, or `None` when the layer takes no
    /// part in collision.
    pub fn body_kind(&self) -> Result<Option<BodyKind>, String> {
        match self.properties.get("body") {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| format!("layer '{}' has invalid body kind: {e}", self.name)),
            None => Ok(self.is_solid().then_some(BodyKind::Fixed)),
        }
    }

    pub fn tiles(&self) -> impl Iterator<Item = GridCell> + '_ {
        let singles = self.cells.iter().map(|&[x, y]| GridCell { x, y });
        let runs = self
            .spans
            .iter()
            .flat_map(|span| (span.x_start..=span.x_end).map(move |x| GridCell { x, y: span.y }));
        singles.chain(runs)
    }
}

impl LevelFile {
    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * self.tile_width as f32
    }

    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * self.tile_height as f32
    }

    /// Layers whose tiles block movement.
    pub fn solid_layers(&self) -> impl Iterator<Item = &TileLayer> {
        self.tile_layers
            .iter()
            .filter(|layer| matches!(layer.body_kind(), Ok(Some(body)) if body.is_solid()))
    }

    /// Tiles of every collision layer merged into one grid. Later layers win
    /// where cells overlap.
    pub fn collision_grid(&self) -> CollisionGrid {
        let mut grid = CollisionGrid::new(
            self.tile_width as f32,
            self.tile_height as f32,
            self.width,
            self.height,
            std::iter::empty(),
        );
        for layer in &self.tile_layers {
            let Ok(Some(body)) = layer.body_kind() else {
                continue;
            };
            for cell in layer.tiles() {
                grid.insert(cell, body);
            }
        }
        grid
    }

    /// Every spawn object with the order of the layer it lives on.
    pub fn spawns(&self) -> impl Iterator<Item = (&SpawnObject, i32)> {
        self.object_layers
            .iter()
            .flat_map(|layer| layer.objects.iter().map(move |obj| (obj, layer.order)))
    }
}

pub fn load_level_from_path(path: &Path) -> Result<LevelFile, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read level file {}: {e}", path.display()))?;
    let level: LevelFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse level JSON {}: {e}", path.display()))?;
    validate_level(&level)?;
    Ok(level)
}

fn validate_level(level: &LevelFile) -> Result<(), String> {
    if level.version != "0.1" {
        return Err(format!(
            "Level validation failed: unsupported version '{}'",
            level.version
        ));
    }
    if level.width <= 0 || level.height <= 0 {
        return Err("Level validation failed: width and height must be > 0".to_string());
    }
    if level.tile_width == 0 || level.tile_height == 0 {
        return Err("Level validation failed: tile size must be > 0".to_string());
    }

    let mut names = HashSet::new();
    for layer in &level.tile_layers {
        if !names.insert(layer.name.as_str()) {
            return Err(format!(
                "Level validation failed: duplicate layer name '{}'",
                layer.name
            ));
        }
        layer
            .body_kind()
            .map_err(|e| format!("Level validation failed: {e}"))?;
        for span in &layer.spans {
            if span.x_start > span.x_end {
                return Err(format!(
                    "Level validation failed: layer '{}' has reversed span on row {}",
                    layer.name, span.y
                ));
            }
        }
        for cell in layer.tiles() {
            if cell.x < 0 || cell.x >= level.width || cell.y < 0 || cell.y >= level.height {
                return Err(format!(
                    "Level validation failed: layer '{}' tile out of bounds ({}, {})",
                    layer.name, cell.x, cell.y
                ));
            }
        }
    }
    for layer in &level.object_layers {
        if !names.insert(layer.name.as_str()) {
            return Err(format!(
                "Level validation failed: duplicate layer name '{}'",
                layer.name
            ));
        }
        if layer.objects.is_empty() {
            log::warn!(
                "Object layer '{}' has no objects. This is allowed but often accidental.",
                layer.name
            );
        }
    }
    if level.solid_layers().next().is_none() {
        log::warn!("Level '{}' has no solid layers", level.level_id);
    }
    Ok(())
}
