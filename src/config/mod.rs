/// Main configuration module.
///
/// Re-exports submodules for world, chat, relay server and anti-spam configuration,
/// and gathers the game-core constants into [`WorldConfig`].
pub mod anti_spam;
pub mod chat;
pub mod server;
pub mod world;

use std::time::Duration;

use crate::game::coords::TileMetrics;
use crate::game::movement::MoveTiming;
use crate::game::terrain::{TerrainLayout, World};
use crate::game::types::GridCell;

/// Game-core settings. `Default` uses the constants of this module.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    pub tile: TileMetrics,
    pub challenge_cell: GridCell,
    pub challenge_id: String,
    pub spawn_cell: GridCell,
    pub collectible_target_count: usize,
    pub spawn_attempt_budget: usize,
    pub move_timing: MoveTiming,
    pub chat_bubble_lifetime: Duration,
    pub chat_bubble_fade: Duration,
    pub collect_shrink: Duration,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tile: TileMetrics {
                width: world::TILE_WIDTH,
                height: world::TILE_HEIGHT,
            },
            challenge_cell: world::CHALLENGE_CELL,
            challenge_id: world::CHALLENGE_ID.to_string(),
            spawn_cell: world::SPAWN_CELL,
            collectible_target_count: world::COLLECTIBLE_TARGET_COUNT,
            spawn_attempt_budget: world::SPAWN_ATTEMPT_BUDGET,
            move_timing: MoveTiming {
                per_cell: Duration::from_millis(world::MOVE_MS_PER_CELL),
                min: Duration::from_millis(world::MOVE_DURATION_MIN_MS),
                max: Duration::from_millis(world::MOVE_DURATION_MAX_MS),
            },
            chat_bubble_lifetime: Duration::from_millis(chat::CHAT_BUBBLE_LIFETIME_MS),
            chat_bubble_fade: Duration::from_millis(chat::CHAT_BUBBLE_FADE_MS),
            collect_shrink: Duration::from_millis(world::COLLECT_SHRINK_MS),
        }
    }
}

impl WorldConfig {
    /// The open square board of `GRID_SIZE` with this config's challenge tile.
    pub fn default_world(&self) -> World {
        World::new(TerrainLayout::square(world::GRID_SIZE), self.challenge_cell)
    }
}
