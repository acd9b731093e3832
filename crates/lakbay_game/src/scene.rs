//! Level scene composition: turns a loaded level and the timeline into live
//! entities, collision setup, camera and vignette cards.

use glam::Vec2;
use std::collections::HashMap;

use crate::camera::Camera2D;
use crate::collision::{CollisionGrid, CollisionGroup, WorldBounds};
use crate::level::{LevelFile, SpawnObject};
use crate::player::{MovementConfig, Player};
use crate::timeline::{EventMarker, TimelineEvent};

pub const DEFAULT_TEXT_SIZE: f32 = 16.0;
pub const DEFAULT_TEXT_BOX: f32 = 100.0;

const CARD_PADDING: f32 = 5.0;
const CARD_TEXT_OFFSET_X: f32 = 120.0 + CARD_PADDING;
const PORTRAIT_SCALE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const CARD_FILL: Color = Color::rgb(0x22, 0x1f, 0x19);
    pub const CARD_STROKE: Color = Color::rgb(0x55, 0x24, 0x13);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: &str) -> Result<Self, String> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(format!("Invalid color '{hex}': expected 6 hex digits"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|e| format!("Invalid color '{hex}': {e}"))
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn from_halign(value: Option<&str>) -> Self {
        match value {
            Some("center") => Self::Center,
            Some("right") => Self::Right,
            _ => Self::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BaseAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl BaseAlign {
    pub fn from_valign(value: Option<&str>) -> Self {
        match value {
            Some("center") => Self::Middle,
            Some("bottom") => Self::Bottom,
            _ => Self::Top,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextShadow {
    pub blur: f32,
    pub offset: Vec2,
    pub color: Color,
}

impl Default for TextShadow {
    fn default() -> Self {
        Self {
            blur: 2.0,
            offset: Vec2::new(2.0, 2.0),
            color: Color::BLACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub pos: Vec2,
    pub text: String,
    pub size: f32,
    pub width: f32,
    pub height: f32,
    pub color: Color,
    pub align: TextAlign,
    pub base_align: BaseAlign,
    pub shadow: TextShadow,
}

#[derive(Debug, Clone)]
pub enum Entity {
    Player(Player),
    /// Marks where the timeline cards start.
    Woman { pos: Vec2 },
    Label(Label),
}

#[derive(Debug, Clone)]
pub struct SceneEntity {
    pub entity: Entity,
    /// Draw order, taken from the object layer.
    pub z: i32,
}

type Spawner = Box<dyn Fn(&SpawnObject) -> Option<Entity>>;

/// Maps level object classes to entity constructors.
pub struct EntityFactory {
    spawners: HashMap<String, Spawner>,
}

impl EntityFactory {
    pub fn new() -> Self {
        Self {
            spawners: HashMap::new(),
        }
    }

    /// The factory used by level scenes: `Player`, `Woman` and `Text`.
    pub fn with_defaults(movement: MovementConfig) -> Self {
        let mut factory = Self::new();
        factory.register("Player", move |obj| {
            Some(Entity::Player(Player::with_config(
                Vec2::new(obj.x, obj.y),
                movement,
            )))
        });
        factory.register("Woman", |obj| {
            Some(Entity::Woman {
                pos: Vec2::new(obj.x, obj.y),
            })
        });
        factory.register("Text", |obj| Some(Entity::Label(text_label(obj))));
        factory
    }

    pub fn register(
        &mut self,
        class: &str,
        spawner: impl Fn(&SpawnObject) -> Option<Entity> + 'static,
    ) {
        self.spawners.insert(class.to_string(), Box::new(spawner));
    }

    pub fn spawn(&self, obj: &SpawnObject, layer_order: i32) -> Option<SceneEntity> {
        let Some(spawner) = self.spawners.get(&obj.class) else {
            log::warn!("No entity factory for class '{}'; skipping", obj.class);
            return None;
        };
        spawner(obj).map(|entity| SceneEntity {
            entity,
            z: layer_order,
        })
    }
}

impl Default for EntityFactory {
    fn default() -> Self {
        Self::with_defaults(MovementConfig::default())
    }
}

fn text_label(obj: &SpawnObject) -> Label {
    let props = obj.text.clone().unwrap_or_default();
    let color = match props.color.as_deref().map(Color::from_hex) {
        Some(Ok(color)) => color,
        Some(Err(err)) => {
            log::warn!("{err}; text '{}' falls back to white", props.text);
            Color::WHITE
        }
        None => Color::WHITE,
    };
    Label {
        pos: Vec2::new(obj.x, obj.y),
        text: props.text,
        size: props.pixelsize.unwrap_or(DEFAULT_TEXT_SIZE),
        width: obj.width.unwrap_or(DEFAULT_TEXT_BOX),
        height: obj.height.unwrap_or(DEFAULT_TEXT_BOX),
        color,
        align: TextAlign::from_halign(props.halign.as_deref()),
        base_align: BaseAlign::from_valign(props.valign.as_deref()),
        shadow: TextShadow::default(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardLine {
    pub text: String,
    pub offset: Vec2,
    pub font_size: f32,
}

/// A timeline card placed along the level.
#[derive(Debug, Clone, PartialEq)]
pub struct Vignette {
    pub event_index: usize,
    pub pos: Vec2,
    pub portrait_key: String,
    pub portrait_offset: Vec2,
    pub portrait_scale: f32,
    pub lines: Vec<CardLine>,
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f32,
}

impl Vignette {
    pub fn layout(event_index: usize, event: &TimelineEvent, anchor: Vec2) -> Self {
        let line = |text: String, y: f32, font_size: f32| CardLine {
            text,
            offset: Vec2::new(CARD_TEXT_OFFSET_X, y),
            font_size,
        };
        Self {
            event_index,
            pos: Vec2::new(
                anchor.x + event.card_spacing * event_index as f32,
                anchor.y - event.card_lift,
            ),
            portrait_key: event.image_key.clone(),
            portrait_offset: Vec2::splat(CARD_PADDING),
            portrait_scale: PORTRAIT_SCALE,
            lines: vec![
                line(event.year.clone(), 0.0, 14.0),
                line(event.name.clone(), 15.0 + CARD_PADDING, 14.0),
                line(format!("({})", event.title), 32.0 + CARD_PADDING, 12.0),
                line(event.biography.clone(), 49.0 + CARD_PADDING, 10.0),
                line(event.love_story.clone(), 95.0 + CARD_PADDING, 10.0),
            ],
            fill: Color::CARD_FILL,
            stroke: Color::CARD_STROKE,
            stroke_width: 6.0,
        }
    }
}

pub struct LevelScene {
    pub level_id: String,
    pub entities: Vec<SceneEntity>,
    pub collision: CollisionGrid,
    pub bounds: WorldBounds,
    pub camera: Camera2D,
    pub camera_follows_player: bool,
    pub vignettes: Vec<Vignette>,
}

impl LevelScene {
    pub fn compose(
        level: &LevelFile,
        factory: &EntityFactory,
        timeline: &[TimelineEvent],
        viewport: (u32, u32),
        zoom: f32,
    ) -> Self {
        let mut entities: Vec<SceneEntity> = level
            .spawns()
            .filter_map(|(obj, order)| factory.spawn(obj, order))
            .collect();
        entities.sort_by_key(|e| e.z);

        let bounds = WorldBounds::new(level.pixel_width(), level.pixel_height());
        let mut collision = level.collision_grid();
        collision.set_group(CollisionGroup::GROUND);
        collision.apply_bounds(&bounds);

        let mut scene = Self {
            level_id: level.level_id.clone(),
            entities,
            collision,
            bounds,
            camera: Camera2D::new(viewport.0, viewport.1),
            camera_follows_player: false,
            vignettes: Vec::new(),
        };
        scene.setup_camera(zoom);
        scene.setup_vignettes(timeline);

        log::info!(
            "Composed level '{}': {} entities, {} solid tiles, {} vignettes",
            scene.level_id,
            scene.entities.len(),
            scene.collision.solid_count(),
            scene.vignettes.len()
        );
        scene
    }

    pub fn player(&self) -> Option<&Player> {
        self.entities.iter().find_map(|e| match &e.entity {
            Entity::Player(player) => Some(player),
            _ => None,
        })
    }

    /// Removes the first player from the entity list so the host can own it.
    pub fn take_player(&mut self) -> Option<Player> {
        let index = self
            .entities
            .iter()
            .position(|e| matches!(e.entity, Entity::Player(_)))?;
        match self.entities.remove(index).entity {
            Entity::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn woman_anchor(&self) -> Option<Vec2> {
        self.entities.iter().find_map(|e| match e.entity {
            Entity::Woman { pos } => Some(pos),
            _ => None,
        })
    }

    /// Text labels in draw order.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.entities.iter().filter_map(|e| match &e.entity {
            Entity::Label(label) => Some(label),
            _ => None,
        })
    }

    /// Proximity markers at each card's horizontal position.
    pub fn event_markers(&self) -> Vec<EventMarker> {
        self.vignettes
            .iter()
            .map(|v| EventMarker {
                event_index: v.event_index,
                x: v.pos.x,
            })
            .collect()
    }

    fn setup_camera(&mut self, zoom: f32) {
        self.camera.zoom = zoom;
        self.camera.limits = Some((self.bounds.min(), self.bounds.max()));
        let Some(pos) = self.player().map(|p| p.pos) else {
            log::warn!("Player not found in scene entities. Camera will not follow player.");
            return;
        };
        if self.collision.is_solid_at(pos) {
            log::warn!(
                "Player spawns inside a solid tile at ({}, {})",
                pos.x,
                pos.y
            );
        }
        self.camera_follows_player = true;
        self.camera.lock_to(pos);
    }

    fn setup_vignettes(&mut self, timeline: &[TimelineEvent]) {
        let Some(anchor) = self.woman_anchor() else {
            log::warn!("Woman not found in scene entities.");
            return;
        };
        self.vignettes = timeline
            .iter()
            .enumerate()
            .map(|(index, event)| Vignette::layout(index, event, anchor))
            .collect();
    }
}
