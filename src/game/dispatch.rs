//! Click classification.
//!
//! Turns the clicked cell into exactly one walk target plus the interaction to
//! fire on arrival. Priority: NPC, prop, collectible, challenge tile, plain ground.

use crate::game::spawner::CollectibleSpawner;
use crate::game::terrain::{Interactive, World};
use crate::game::types::{GridCell, InteractionEvent, InteractionKind};

/// Where to walk and what to report once there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveIntent {
    pub target: GridCell,
    pub on_arrival: Option<InteractionEvent>,
}

#[derive(Debug, Clone)]
pub struct InteractionDispatcher {
    challenge_id: String,
}

impl InteractionDispatcher {
    pub fn new(challenge_id: impl Into<String>) -> Self {
        Self {
            challenge_id: challenge_id.into(),
        }
    }

    /// `None` when the click can lead nowhere (a blocked, non-interactive cell).
    ///
    /// Blocked interactive cells keep their own cell as target; the movement
    /// controller walks to the nearest open neighbor instead.
    pub fn resolve(
        &self,
        world: &World,
        collectibles: &CollectibleSpawner,
        cell: GridCell,
    ) -> Option<MoveIntent> {
        let on_arrival = match world.interactive_at(cell) {
            Some(Interactive::Npc { dialog_id }) => {
                Some(InteractionEvent::new(InteractionKind::NpcDialog, dialog_id.clone()))
            }
            Some(Interactive::Prop { tool_id }) => {
                Some(InteractionEvent::new(InteractionKind::OpenTool, tool_id.clone()))
            }
            None => {
                if let Some(item) = collectibles.uncollected_at(cell) {
                    Some(InteractionEvent::new(InteractionKind::CollectItem, item.id.clone()))
                } else if world.is_challenge_cell(cell) {
                    Some(InteractionEvent::new(
                        InteractionKind::MathChallenge,
                        self.challenge_id.clone(),
                    ))
                } else if world.is_obstacle(cell) {
                    return None;
                } else {
                    None
                }
            }
        };

        Some(MoveIntent {
            target: cell,
            on_arrival,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::terrain::TerrainLayout;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;
    use std::time::Duration;

    fn setup() -> (World, CollectibleSpawner) {
        let mut world = World::new(TerrainLayout::centered(11, 11), GridCell::new(5, 5));
        world.register_npc(GridCell::new(-3, 0), "owl");
        world.register_prop(GridCell::new(3, -3), "telescope");
        world.register_scenery(GridCell::new(0, 3));
        let mut spawner = CollectibleSpawner::new(Duration::from_millis(250));
        spawner.spawn(&world, GridCell::new(0, 0), 1, 50, &HashSet::new(), &mut StdRng::seed_from_u64(11));
        (world, spawner)
    }

    fn kind_at(world: &World, spawner: &CollectibleSpawner, cell: GridCell) -> Option<InteractionKind> {
        InteractionDispatcher::new("great-oak")
            .resolve(world, spawner, cell)
            .and_then(|i| i.on_arrival)
            .map(|e| e.kind)
    }

    #[test]
    fn each_special_cell_maps_to_its_event() {
        let (world, spawner) = setup();
        let item_cell = spawner.items()[0].position;

        assert_eq!(kind_at(&world, &spawner, GridCell::new(-3, 0)), Some(InteractionKind::NpcDialog));
        assert_eq!(kind_at(&world, &spawner, GridCell::new(3, -3)), Some(InteractionKind::OpenTool));
        assert_eq!(kind_at(&world, &spawner, item_cell), Some(InteractionKind::CollectItem));
        assert_eq!(kind_at(&world, &spawner, GridCell::new(5, 5)), Some(InteractionKind::MathChallenge));
    }

    #[test]
    fn npc_dialog_carries_dialog_id() {
        let (world, spawner) = setup();
        let intent = InteractionDispatcher::new("great-oak")
            .resolve(&world, &spawner, GridCell::new(-3, 0))
            .unwrap();
        assert_eq!(intent.target, GridCell::new(-3, 0));
        assert_eq!(intent.on_arrival, Some(InteractionEvent::new(InteractionKind::NpcDialog, "owl")));
    }

    #[test]
    fn npc_wins_over_challenge_tile() {
        let (mut world, spawner) = setup();
        world.register_npc(GridCell::new(5, 5), "oak-spirit");
        assert_eq!(kind_at(&world, &spawner, GridCell::new(5, 5)), Some(InteractionKind::NpcDialog));
    }

    #[test]
    fn collected_item_is_no_longer_offered() {
        let (world, mut spawner) = setup();
        let item_cell = spawner.items()[0].position;
        spawner.sync_collected(["item_0"]);

        let intent = InteractionDispatcher::new("great-oak")
            .resolve(&world, &spawner, item_cell)
            .unwrap();
        assert_eq!(intent.on_arrival, None);
    }

    #[test]
    fn plain_ground_and_scenery() {
        let (world, spawner) = setup();
        let dispatcher = InteractionDispatcher::new("great-oak");
        let free = [GridCell::new(1, 0), GridCell::new(0, 1), GridCell::new(-1, -1)]
            .into_iter()
            .find(|c| spawner.uncollected_at(*c).is_none())
            .unwrap();

        assert_eq!(
            dispatcher.resolve(&world, &spawner, free),
            Some(MoveIntent {
                target: free,
                on_arrival: None
            })
        );
        assert_eq!(dispatcher.resolve(&world, &spawner, GridCell::new(0, 3)), None);
    }
}
