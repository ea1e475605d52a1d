//! Terrain layout and obstacle registry.
//!
//! The layout fixes the playable boundary once; obstacles (scenery, NPCs, props and
//! the challenge tile) are registered while the world is built and never removed.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::types::GridCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Ground,
    Void,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("terrain layout has no tiles")]
    Empty,
    #[error("row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown terrain glyph {glyph:?} at row {row}, column {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },
}

/// Immutable tile matrix. Matrix `[row][col]` is cell `(col - origin_col, row - origin_row)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainLayout {
    tiles: Vec<Vec<Tile>>,
    origin_col: i32,
    origin_row: i32,
}

impl TerrainLayout {
    /// All-ground rectangle centered on the world origin.
    pub fn centered(rows: usize, cols: usize) -> Self {
        Self {
            tiles: vec![vec![Tile::Ground; cols]; rows],
            origin_col: (cols / 2) as i32,
            origin_row: (rows / 2) as i32,
        }
    }

    /// Square board covering `-size/2..=size/2` on both axes.
    pub fn square(size: usize) -> Self {
        let side = (size / 2) * 2 + 1;
        Self::centered(side, side)
    }

    /// Parse text rows (`.` ground, `#` void), centered on the world origin.
    pub fn from_rows(rows: &[&str]) -> Result<Self, LayoutError> {
        let expected = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if expected == 0 {
            return Err(LayoutError::Empty);
        }

        let mut tiles = Vec::with_capacity(rows.len());
        for (row, line) in rows.iter().enumerate() {
            let parsed = line
                .chars()
                .enumerate()
                .map(|(col, glyph)| match glyph {
                    '.' => Ok(Tile::Ground),
                    '#' => Ok(Tile::Void),
                    glyph => Err(LayoutError::UnknownGlyph { glyph, row, col }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            if parsed.len() != expected {
                return Err(LayoutError::RaggedRow {
                    row,
                    expected,
                    found: parsed.len(),
                });
            }
            tiles.push(parsed);
        }

        Ok(Self {
            origin_col: (expected / 2) as i32,
            origin_row: (tiles.len() / 2) as i32,
            tiles,
        })
    }

    pub fn rows(&self) -> usize {
        self.tiles.len()
    }

    pub fn cols(&self) -> usize {
        self.tiles.first().map(Vec::len).unwrap_or(0)
    }

    /// Smallest and largest cell covered by the matrix.
    pub fn bounds(&self) -> (GridCell, GridCell) {
        let min = GridCell::new(-self.origin_col, -self.origin_row);
        let max = GridCell::new(
            self.cols() as i32 - 1 - self.origin_col,
            self.rows() as i32 - 1 - self.origin_row,
        );
        (min, max)
    }

    pub fn tile_at(&self, cell: GridCell) -> Option<Tile> {
        let col = cell.x.checked_add(self.origin_col)?;
        let row = cell.y.checked_add(self.origin_row)?;
        if col < 0 || row < 0 {
            return None;
        }
        self.tiles
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .copied()
    }

    pub fn cells(&self) -> impl Iterator<Item = (GridCell, Tile)> + '_ {
        self.tiles.iter().enumerate().flat_map(move |(row, tiles)| {
            tiles.iter().enumerate().map(move |(col, tile)| {
                (
                    GridCell::new(col as i32 - self.origin_col, row as i32 - self.origin_row),
                    *tile,
                )
            })
        })
    }
}

/// Cells occupied by scenery, NPCs or props.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObstacleSet {
    cells: HashSet<GridCell>,
}

impl ObstacleSet {
    pub fn insert(&mut self, cell: GridCell) -> bool {
        self.cells.insert(cell)
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.cells.iter().copied()
    }

    /// Sorted `"x,y"` keys.
    pub fn keys(&self) -> Vec<String> {
        let mut cells: Vec<GridCell> = self.cells.iter().copied().collect();
        cells.sort_by_key(|c| (c.y, c.x));
        cells.iter().map(GridCell::to_string).collect()
    }
}

/// Something the player can talk to or use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interactive {
    Npc { dialog_id: String },
    Prop { tool_id: String },
}

/// Static world: terrain, obstacles, interactives and the challenge tile.
#[derive(Debug, Clone)]
pub struct World {
    layout: TerrainLayout,
    obstacles: ObstacleSet,
    interactives: HashMap<GridCell, Interactive>,
    scenery: HashSet<GridCell>,
    challenge_cell: GridCell,
}

impl World {
    /// The challenge tile is an obstacle from the start.
    pub fn new(layout: TerrainLayout, challenge_cell: GridCell) -> Self {
        let mut obstacles = ObstacleSet::default();
        obstacles.insert(challenge_cell);
        Self {
            layout,
            obstacles,
            interactives: HashMap::new(),
            scenery: HashSet::new(),
            challenge_cell,
        }
    }

    pub fn layout(&self) -> &TerrainLayout {
        &self.layout
    }

    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    pub fn challenge_cell(&self) -> GridCell {
        self.challenge_cell
    }

    /// Inside the layout and on ground.
    pub fn is_valid_tile(&self, cell: GridCell) -> bool {
        self.layout.tile_at(cell) == Some(Tile::Ground)
    }

    pub fn is_obstacle(&self, cell: GridCell) -> bool {
        self.obstacles.contains(cell)
    }

    pub fn is_open(&self, cell: GridCell) -> bool {
        self.is_valid_tile(cell) && !self.is_obstacle(cell)
    }

    pub fn register_obstacle(&mut self, cell: GridCell) {
        self.obstacles.insert(cell);
    }

    /// Trees, rocks and other blocking decoration.
    pub fn register_scenery(&mut self, cell: GridCell) {
        self.scenery.insert(cell);
        self.register_obstacle(cell);
    }

    pub fn register_npc(&mut self, cell: GridCell, dialog_id: impl Into<String>) {
        self.interactives.insert(
            cell,
            Interactive::Npc {
                dialog_id: dialog_id.into(),
            },
        );
        self.register_obstacle(cell);
    }

    pub fn register_prop(&mut self, cell: GridCell, tool_id: impl Into<String>) {
        self.interactives.insert(
            cell,
            Interactive::Prop {
                tool_id: tool_id.into(),
            },
        );
        self.register_obstacle(cell);
    }

    pub fn interactive_at(&self, cell: GridCell) -> Option<&Interactive> {
        self.interactives.get(&cell)
    }

    pub fn interactives(&self) -> impl Iterator<Item = (GridCell, &Interactive)> {
        self.interactives.iter().map(|(cell, i)| (*cell, i))
    }

    pub fn scenery(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.scenery.iter().copied()
    }

    pub fn is_challenge_cell(&self, cell: GridCell) -> bool {
        cell == self.challenge_cell
    }

    /// Blocked cells a click may still target by walking next to them.
    pub fn is_reroutable(&self, cell: GridCell) -> bool {
        self.is_challenge_cell(cell) || self.interactives.contains_key(&cell)
    }

    /// Open 4-neighbor of `cell` closest to `from`, if any.
    pub fn find_nearest_open_neighbor(&self, cell: GridCell, from: GridCell) -> Option<GridCell> {
        cell.neighbors()
            .into_iter()
            .filter(|n| self.is_open(*n))
            .min_by(|a, b| a.distance(from).total_cmp(&b.distance(from)))
    }
}
