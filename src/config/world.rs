/// World configuration constants.
///
/// This module defines the isometric basis, the challenge tile, collectible
/// spawning and movement timing shared by the renderer and the game core.
use crate::game::types::GridCell;

/// Width of one isometric tile in pixels.
pub const TILE_WIDTH: f32 = 64.0;

/// Height of one isometric tile in pixels.
pub const TILE_HEIGHT: f32 = 32.0;

/// Side length of the default square board (cells `-GRID_SIZE/2..=GRID_SIZE/2`).
pub const GRID_SIZE: usize = 10;

/// The tile that opens a math challenge.
pub const CHALLENGE_CELL: GridCell = GridCell { x: 5, y: 5 };

/// Identifier sent with every `math-challenge` interaction.
pub const CHALLENGE_ID: &str = "great-oak";

/// Where the local avatar appears when a session starts.
pub const SPAWN_CELL: GridCell = GridCell { x: 0, y: 0 };

/// Number of collectible ids (`item_0..item_{N-1}`) offered per session.
pub const COLLECTIBLE_TARGET_COUNT: usize = 3;

/// Random placements tried per collectible before giving up on it.
pub const SPAWN_ATTEMPT_BUDGET: usize = 50;

/// Travel time per grid unit of straight-line distance.
pub const MOVE_MS_PER_CELL: u64 = 200;

/// Shortest allowed move animation.
pub const MOVE_DURATION_MIN_MS: u64 = 300;

/// Longest allowed move animation.
pub const MOVE_DURATION_MAX_MS: u64 = 800;

/// Time a collected marker takes to shrink away.
pub const COLLECT_SHRINK_MS: u64 = 250;
