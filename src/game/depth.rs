//! Back-to-front ordering for the isometric scene.
//!
//! Everything drawn above the ground shares one depth space keyed by projected
//! screen y, so a sprite further down the screen covers the ones behind it.

use crate::game::coords::{TileMetrics, grid_to_iso};
use crate::game::entity::{Entity, EntityId};
use crate::game::types::GridCell;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawKind {
    EntityLayer { entity: EntityId, layer: String },
    Scenery(GridCell),
    Npc(GridCell),
    Prop(GridCell),
    Challenge(GridCell),
    Collectible(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub kind: DrawKind,
    pub depth: f32,
}

/// Depth of something standing still on `cell`.
pub fn cell_depth(cell: GridCell, tile: TileMetrics) -> f32 {
    grid_to_iso(cell, tile).y
}

/// One item per appearance layer plus the name label.
pub fn entity_items(entity: &Entity) -> impl Iterator<Item = DrawItem> + '_ {
    entity.layer_depths().into_iter().map(|(layer, depth)| DrawItem {
        kind: DrawKind::EntityLayer {
            entity: entity.id().to_string(),
            layer: layer.to_string(),
        },
        depth,
    })
}

/// Stable sort, farthest first.
pub fn sort_back_to_front(items: &mut [DrawItem]) {
    items.sort_by(|a, b| a.depth.total_cmp(&b.depth));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::{Appearance, Role};
    use crate::game::types::IsoPoint;

    const TILE: TileMetrics = TileMetrics {
        width: 64.0,
        height: 32.0,
    };

    #[test]
    fn avatar_in_front_of_tree_draws_after_it() {
        let tree = GridCell::new(1, 1);
        let entity = Entity::new(
            "p",
            Role::Remote,
            "P",
            Appearance::default(),
            GridCell::new(2, 1),
            grid_to_iso(GridCell::new(2, 1), TILE),
        );
        let mut items: Vec<DrawItem> = entity_items(&entity).collect();
        items.push(DrawItem {
            kind: DrawKind::Scenery(tree),
            depth: cell_depth(tree, TILE),
        });
        sort_back_to_front(&mut items);
        assert_eq!(items[0].kind, DrawKind::Scenery(tree));
        assert!(matches!(&items[4].kind, DrawKind::EntityLayer { layer, .. } if layer == "label"));
    }

    #[test]
    fn avatar_behind_tree_is_covered() {
        let tree = GridCell::new(1, 1);
        let entity = Entity::new(
            "p",
            Role::Remote,
            "P",
            Appearance::default(),
            GridCell::new(0, 0),
            IsoPoint::new(0.0, 0.0),
        );
        let mut items: Vec<DrawItem> = entity_items(&entity).collect();
        items.push(DrawItem {
            kind: DrawKind::Scenery(tree),
            depth: cell_depth(tree, TILE),
        });
        sort_back_to_front(&mut items);
        assert_eq!(items.last().map(|i| &i.kind), Some(&DrawKind::Scenery(tree)));
    }
}
