use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Logical cell on the world grid. The origin is the world center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Straight-line distance in grid units.
    pub fn distance(self, other: GridCell) -> f32 {
        let dx = (i64::from(self.x) - i64::from(other.x)) as f64;
        let dy = (i64::from(self.y) - i64::from(other.y)) as f64;
        (dx * dx + dy * dy).sqrt() as f32
    }

    /// The four edge-adjacent cells, in up/down/left/right order.
    pub fn neighbors(self) -> [GridCell; 4] {
        [
            GridCell::new(self.x, self.y.saturating_sub(1)),
            GridCell::new(self.x, self.y.saturating_add(1)),
            GridCell::new(self.x.saturating_sub(1), self.y),
            GridCell::new(self.x.saturating_add(1), self.y),
        ]
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid cell key {0:?}, expected \"x,y\"")]
pub struct CellParseError(pub String);

impl FromStr for GridCell {
    type Err = CellParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s.split_once(',').ok_or_else(|| CellParseError(s.to_string()))?;
        let x = x.trim().parse().map_err(|_| CellParseError(s.to_string()))?;
        let y = y.trim().parse().map_err(|_| CellParseError(s.to_string()))?;
        Ok(GridCell { x, y })
    }
}

/// Screen-space point relative to the world origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IsoPoint {
    pub x: f32,
    pub y: f32,
}

impl IsoPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, to: IsoPoint, t: f32) -> IsoPoint {
        IsoPoint {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motion {
    Idle,
    Walking,
}

/// What the sprite of an entity currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualState {
    pub motion: Motion,
    pub facing: Facing,
    pub frame: u32,
}

impl Default for VisualState {
    fn default() -> Self {
        Self {
            motion: Motion::Idle,
            facing: Facing::Right,
            frame: 0,
        }
    }
}

/// Kind of outcome the host application reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionKind {
    MathChallenge,
    NpcDialog,
    CollectItem,
    OpenTool,
}

/// One-shot notification to the host: open a quiz, a dialog, a tool, or confirm a pickup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionEvent {
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    pub id: String,
}

impl InteractionEvent {
    pub fn new(kind: InteractionKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_key_parses_back() {
        let cell = GridCell::new(-3, 7);
        assert_eq!(cell.to_string(), "-3,7");
        assert_eq!("-3,7".parse::<GridCell>(), Ok(cell));
        assert_eq!(" 4, -1 ".trim().parse::<GridCell>(), Ok(GridCell::new(4, -1)));
    }

    #[test]
    fn malformed_cell_key_is_rejected() {
        assert!("3".parse::<GridCell>().is_err());
        assert!("a,b".parse::<GridCell>().is_err());
        assert!("".parse::<GridCell>().is_err());
    }

    #[test]
    fn distance_survives_extreme_coordinates() {
        let far = GridCell::new(i32::MAX, i32::MIN).distance(GridCell::new(i32::MIN, i32::MAX));
        assert!(far.is_finite());
        assert!(far > 4.0e9);
        assert_eq!(GridCell::new(i32::MIN, 0).neighbors()[2], GridCell::new(i32::MIN, 0));
    }

    #[test]
    fn interaction_event_uses_kebab_case_type() {
        let event = InteractionEvent::new(InteractionKind::MathChallenge, "great-oak");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "math-challenge");
        assert_eq!(json["id"], "great-oak");
    }
}
