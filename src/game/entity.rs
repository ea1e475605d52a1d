//! Players on the grid, their tinted sprite layers, and the id-keyed roster of remote players.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::game::tween::Tween;
use crate::game::types::{GridCell, InteractionEvent, IsoPoint, VisualState};

pub type EntityId = String;

/// 24-bit RGB tint.
pub type Color = u32;

pub const DEFAULT_TINT: Color = 0xffffff;

/// Depth gap between stacked layers; the name label sits one step above the top layer.
pub const LAYER_DEPTH_STEP: f32 = 0.1;

/// One independently tinted sprite of an avatar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppearanceLayer {
    pub name: String,
    pub color: Color,
    pub depth_offset: f32,
}

/// Ordered sprite layers, drawn bottom to top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    layers: Vec<AppearanceLayer>,
}

impl Default for Appearance {
    fn default() -> Self {
        Self::new([
            ("body", DEFAULT_TINT),
            ("face", DEFAULT_TINT),
            ("hair", DEFAULT_TINT),
        ])
    }
}

impl Appearance {
    /// Layers get increasing depth offsets in the given order.
    pub fn new<S: Into<String>>(layers: impl IntoIterator<Item = (S, Color)>) -> Self {
        let layers = layers
            .into_iter()
            .enumerate()
            .map(|(i, (name, color))| AppearanceLayer {
                name: name.into(),
                color,
                depth_offset: i as f32 * LAYER_DEPTH_STEP,
            })
            .collect();
        Self { layers }
    }

    pub fn layers(&self) -> &[AppearanceLayer] {
        &self.layers
    }

    pub fn color(&self, layer: &str) -> Option<Color> {
        self.layers.iter().find(|l| l.name == layer).map(|l| l.color)
    }

    /// Returns true when the tint actually changed.
    pub fn set_color(&mut self, layer: &str, color: Color) -> bool {
        match self.layers.iter_mut().find(|l| l.name == layer) {
            Some(l) if l.color != color => {
                l.color = color;
                true
            }
            _ => false,
        }
    }

    /// Apply every wire field that names a known layer. Returns true if anything changed.
    ///
    /// A bare `color` field from older clients tints the body unless `bodyColor` is also present.
    pub fn patch(&mut self, fields: &BTreeMap<String, Color>) -> bool {
        let mut changed = false;
        if let (Some(color), false) = (fields.get("color"), fields.contains_key("bodyColor")) {
            changed |= self.set_color("body", *color);
        }
        for (key, color) in fields {
            if let Some(layer) = key.strip_suffix("Color") {
                changed |= self.set_color(layer, *color);
            }
        }
        changed
    }

    /// `<layer>Color` fields of a `player-move` payload.
    pub fn to_wire_fields(&self) -> BTreeMap<String, Color> {
        self.layers
            .iter()
            .map(|l| (format!("{}Color", l.name), l.color))
            .collect()
    }

    /// Default layers tinted with whatever the payload carries.
    pub fn from_wire_fields(fields: &BTreeMap<String, Color>) -> Self {
        let mut appearance = Self::default();
        appearance.patch(fields);
        appearance
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Local,
    Remote,
}

/// A player avatar. Motion fields are written only by the movement controller.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    role: Role,
    display_name: String,
    appearance: Appearance,
    pub(crate) grid_position: GridCell,
    pub(crate) screen_position: IsoPoint,
    pub(crate) visual: VisualState,
    pub(crate) tween: Option<Tween>,
    pub(crate) on_arrival: Option<InteractionEvent>,
    pub(crate) frame_clock: Duration,
}

impl Entity {
    pub fn new(
        id: impl Into<EntityId>,
        role: Role,
        display_name: impl Into<String>,
        appearance: Appearance,
        cell: GridCell,
        screen_position: IsoPoint,
    ) -> Self {
        Self {
            id: id.into(),
            role,
            display_name: display_name.into(),
            appearance,
            grid_position: cell,
            screen_position,
            visual: VisualState::default(),
            tween: None,
            on_arrival: None,
            frame_clock: Duration::ZERO,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.display_name == name {
            return false;
        }
        self.display_name = name;
        true
    }

    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    pub fn appearance_mut(&mut self) -> &mut Appearance {
        &mut self.appearance
    }

    /// Logical cell; updated the moment a move is accepted.
    pub fn grid_position(&self) -> GridCell {
        self.grid_position
    }

    /// Interpolated sprite position.
    pub fn screen_position(&self) -> IsoPoint {
        self.screen_position
    }

    pub fn visual_state(&self) -> VisualState {
        self.visual
    }

    pub fn is_moving(&self) -> bool {
        self.tween.is_some()
    }

    /// Render depth of every appearance layer, then the name label.
    pub fn layer_depths(&self) -> Vec<(&str, f32)> {
        let y = self.screen_position.y;
        let label = self.appearance.layers().len() as f32 * LAYER_DEPTH_STEP;
        self.appearance
            .layers()
            .iter()
            .map(|l| (l.name.as_str(), y + l.depth_offset))
            .chain(std::iter::once(("label", y + label)))
            .collect()
    }
}

/// Remote players keyed by session id.
#[derive(Debug, Default)]
pub struct Roster {
    entities: HashMap<EntityId, Entity>,
}

impl Roster {
    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn insert(&mut self, entity: Entity) {
        self.entities.insert(entity.id.clone(), entity);
    }

    pub fn remove(&mut self, id: &str) -> Option<Entity> {
        self.entities.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }
}
