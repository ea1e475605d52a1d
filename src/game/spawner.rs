//! Collectible spawning.
//!
//! Scatters the session's quest items over free ground and removes their
//! markers once the host confirms a pickup.

use std::collections::HashSet;
use std::time::Duration;

use log::{debug, warn};
use rand::Rng;

use crate::game::terrain::World;
use crate::game::types::GridCell;

/// Ids offered every session: `item_0..item_{count-1}`.
pub fn collectible_ids(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("item_{i}")).collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerState {
    Present,
    Shrinking { elapsed: Duration },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectibleItem {
    pub id: String,
    pub position: GridCell,
    pub state: MarkerState,
}

/// What a spawn pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnReport {
    /// Ids a placement was tried for.
    pub attempted: Vec<String>,
    pub placed: Vec<(String, GridCell)>,
    /// Ids no free cell was found for.
    pub failed: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CollectibleSpawner {
    items: Vec<CollectibleItem>,
    collected: HashSet<String>,
    shrink: Duration,
}

impl CollectibleSpawner {
    pub fn new(shrink: Duration) -> Self {
        Self {
            items: Vec::new(),
            collected: HashSet::new(),
            shrink,
        }
    }

    /// Place every id that is neither collected nor already on the board.
    ///
    /// A free cell is walkable, not the challenge tile, not `spawn_cell`, and not
    /// taken by another item. Ids that find no cell within `attempt_budget` random
    /// tries are left out for this session.
    pub fn spawn<R: Rng>(
        &mut self,
        world: &World,
        spawn_cell: GridCell,
        target_count: usize,
        attempt_budget: usize,
        already_collected: &HashSet<String>,
        rng: &mut R,
    ) -> SpawnReport {
        self.collected.extend(already_collected.iter().cloned());

        let (min, max) = world.layout().bounds();
        let mut claimed: HashSet<GridCell> = self.items.iter().map(|i| i.position).collect();
        let mut report = SpawnReport::default();

        let board_is_empty = min.x > max.x || min.y > max.y;

        for id in collectible_ids(target_count) {
            if self.collected.contains(&id) || self.items.iter().any(|i| i.id == id) {
                continue;
            }
            report.attempted.push(id.clone());

            if board_is_empty {
                warn!("[Spawner] No tiles to place {} on", id);
                report.failed.push(id);
                continue;
            }

            let found = (0..attempt_budget)
                .map(|_| GridCell::new(rng.random_range(min.x..=max.x), rng.random_range(min.y..=max.y)))
                .find(|cell| {
                    world.is_open(*cell)
                        && !world.is_challenge_cell(*cell)
                        && *cell != spawn_cell
                        && !claimed.contains(cell)
                });

            match found {
                Some(cell) => {
                    debug!("[Spawner] {} placed at {}", id, cell);
                    claimed.insert(cell);
                    report.placed.push((id.clone(), cell));
                    self.items.push(CollectibleItem {
                        id,
                        position: cell,
                        state: MarkerState::Present,
                    });
                }
                None => {
                    warn!("[Spawner] No free tile for {} after {} attempts", id, attempt_budget);
                    report.failed.push(id);
                }
            }
        }

        report
    }

    pub fn items(&self) -> &[CollectibleItem] {
        &self.items
    }

    pub fn is_collected(&self, id: &str) -> bool {
        self.collected.contains(id)
    }

    /// Item still offered for pickup on `cell`.
    pub fn uncollected_at(&self, cell: GridCell) -> Option<&CollectibleItem> {
        self.items.iter().find(|i| {
            i.position == cell && i.state == MarkerState::Present && !self.collected.contains(&i.id)
        })
    }

    /// Mark ids as collected and start shrinking their markers.
    pub fn sync_collected<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            if !self.collected.insert(id.to_string()) {
                continue;
            }
            if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
                debug!("[Spawner] {} collected, removing marker", id);
                item.state = MarkerState::Shrinking {
                    elapsed: Duration::ZERO,
                };
            }
        }
    }

    /// Marker scale: 1.0 while present, shrinking towards 0.0 once collected.
    pub fn marker_scale(&self, item: &CollectibleItem) -> f32 {
        match item.state {
            MarkerState::Present => 1.0,
            MarkerState::Shrinking { elapsed } if !self.shrink.is_zero() => {
                1.0 - (elapsed.as_secs_f32() / self.shrink.as_secs_f32()).min(1.0)
            }
            MarkerState::Shrinking { .. } => 0.0,
        }
    }

    /// Advance shrink animations and drop finished markers.
    pub fn update(&mut self, dt: Duration) {
        let shrink = self.shrink;
        self.items.retain_mut(|item| match &mut item.state {
            MarkerState::Present => true,
            MarkerState::Shrinking { elapsed } => {
                *elapsed += dt;
                *elapsed < shrink
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::terrain::TerrainLayout;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn world() -> World {
        World::new(TerrainLayout::centered(11, 11), GridCell::new(5, 5))
    }

    #[test]
    fn spawns_every_missing_id_on_distinct_free_cells() {
        let world = world();
        let mut spawner = CollectibleSpawner::new(Duration::from_millis(250));
        let mut rng = StdRng::seed_from_u64(7);

        let report = spawner.spawn(&world, GridCell::new(0, 0), 3, 50, &HashSet::new(), &mut rng);

        assert_eq!(report.attempted, collectible_ids(3));
        assert_eq!(report.placed.len(), 3);
        let cells: HashSet<GridCell> = report.placed.iter().map(|(_, c)| *c).collect();
        assert_eq!(cells.len(), 3);
        for cell in cells {
            assert!(world.is_open(cell));
            assert_ne!(cell, GridCell::new(0, 0));
            assert_ne!(cell, world.challenge_cell());
        }
    }

    #[test]
    fn already_collected_ids_are_not_attempted() {
        let world = world();
        for k in 0..=3 {
            let collected: HashSet<String> = collectible_ids(k).into_iter().collect();
            let mut spawner = CollectibleSpawner::new(Duration::from_millis(250));
            let mut rng = StdRng::seed_from_u64(k as u64);

            let report = spawner.spawn(&world, GridCell::new(0, 0), 3, 50, &collected, &mut rng);

            assert_eq!(report.attempted.len(), 3 - k);
            assert!(spawner.items().iter().all(|i| !collected.contains(&i.id)));
        }
    }

    #[test]
    fn crowded_board_degrades_silently() {
        // Every cell is the spawn cell, the challenge tile, or a rock.
        let layout = TerrainLayout::from_rows(&["..."]).unwrap();
        let mut world = World::new(layout, GridCell::new(1, 0));
        world.register_scenery(GridCell::new(-1, 0));
        let mut spawner = CollectibleSpawner::new(Duration::from_millis(250));
        let mut rng = StdRng::seed_from_u64(1);

        let report = spawner.spawn(&world, GridCell::new(0, 0), 3, 50, &HashSet::new(), &mut rng);

        assert_eq!(report.attempted.len(), 3);
        assert!(report.placed.is_empty());
        assert_eq!(report.failed.len(), 3);
        assert!(spawner.items().is_empty());
    }

    #[test]
    fn empty_board_fails_every_id() {
        let world = World::new(TerrainLayout::centered(0, 0), GridCell::new(5, 5));
        let mut spawner = CollectibleSpawner::new(Duration::from_millis(250));
        let mut rng = StdRng::seed_from_u64(2);

        let report = spawner.spawn(&world, GridCell::new(0, 0), 3, 50, &HashSet::new(), &mut rng);
        assert_eq!(report.failed, collectible_ids(3));
        assert!(report.placed.is_empty());

        let world = World::new(TerrainLayout::centered(4, 0), GridCell::new(5, 5));
        let report = spawner.spawn(&world, GridCell::new(0, 0), 3, 50, &HashSet::new(), &mut rng);
        assert_eq!(report.failed.len(), 3);
        assert!(spawner.items().is_empty());
    }

    #[test]
    fn respawning_keeps_one_marker_per_id() {
        let world = world();
        let mut spawner = CollectibleSpawner::new(Duration::from_millis(250));
        let mut rng = StdRng::seed_from_u64(9);

        spawner.spawn(&world, GridCell::new(0, 0), 3, 50, &HashSet::new(), &mut rng);
        let second = spawner.spawn(&world, GridCell::new(0, 0), 3, 50, &HashSet::new(), &mut rng);

        assert!(second.attempted.is_empty());
        let mut ids: Vec<&str> = spawner.items().iter().map(|i| i.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["item_0", "item_1", "item_2"]);

        spawner.sync_collected(["item_1"]);
        spawner.update(Duration::from_millis(300));
        assert!(spawner.items().iter().all(|i| i.id != "item_1"));
    }

    #[test]
    fn collected_marker_shrinks_then_disappears() {
        let world = world();
        let mut spawner = CollectibleSpawner::new(Duration::from_millis(250));
        let mut rng = StdRng::seed_from_u64(3);
        spawner.spawn(&world, GridCell::new(0, 0), 3, 50, &HashSet::new(), &mut rng);
        let cell = spawner.items()[0].position;
        assert!(spawner.uncollected_at(cell).is_some());

        spawner.sync_collected(["item_0", "item_9"]);
        assert!(spawner.uncollected_at(cell).is_none());
        assert!(spawner.is_collected("item_9"));

        spawner.update(Duration::from_millis(100));
        let item = spawner.items().iter().find(|i| i.id == "item_0").unwrap();
        assert!(spawner.marker_scale(item) < 1.0);
        spawner.update(Duration::from_millis(200));
        assert!(spawner.items().iter().all(|i| i.id != "item_0"));
        assert_eq!(spawner.items().len(), 2);
    }
}
