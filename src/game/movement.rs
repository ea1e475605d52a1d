//! Entity movement system.
//!
//! Moves avatars from cell to cell: validates the destination, walks next to
//! blocked interactive tiles instead of onto them, tweens the sprite, and releases
//! the arrival interaction once the walk ends.

use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::game::coords::{TileMetrics, grid_to_iso};
use crate::game::entity::{Appearance, Entity, Role};
use crate::game::terrain::World;
use crate::game::tween::Tween;
use crate::game::types::{Facing, GridCell, InteractionEvent, Motion};

/// Walk cycle frame length.
const WALK_FRAME_MS: u128 = 100;

/// Frames in the walk cycle.
const WALK_FRAME_COUNT: u128 = 4;

/// Travel time rule: `per_cell` per grid unit, clamped to `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveTiming {
    pub per_cell: Duration,
    pub min: Duration,
    pub max: Duration,
}

pub fn move_duration(distance: f32, timing: &MoveTiming) -> Duration {
    let ms = (timing.per_cell.as_millis() as f64 * f64::from(distance.max(0.0))).round();
    Duration::from_millis(ms as u64).clamp(timing.min, timing.max)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The destination was off the board, blocked, or unreachable. Nothing changed.
    Rejected,
    Accepted {
        destination: GridCell,
        duration: Duration,
    },
}

impl MoveOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, MoveOutcome::Accepted { .. })
    }
}

#[derive(Debug, Clone)]
pub struct MovementController {
    tile: TileMetrics,
    timing: MoveTiming,
}

impl MovementController {
    pub fn new(tile: TileMetrics, timing: MoveTiming) -> Self {
        Self { tile, timing }
    }

    pub fn tile(&self) -> TileMetrics {
        self.tile
    }

    /// Idle entity standing on `cell`.
    pub fn spawn(
        &self,
        id: impl Into<String>,
        role: Role,
        name: impl Into<String>,
        appearance: Appearance,
        cell: GridCell,
    ) -> Entity {
        Entity::new(id, role, name, appearance, cell, grid_to_iso(cell, self.tile))
    }

    /// Walk `entity` to `destination`, firing `on_arrival` when it gets there.
    ///
    /// Blocked challenge/NPC/prop tiles are replaced by their open neighbor closest
    /// to the entity; the arrival event moves to the substitute walk.
    pub fn move_to(
        &self,
        world: &World,
        entity: &mut Entity,
        destination: GridCell,
        on_arrival: Option<InteractionEvent>,
    ) -> MoveOutcome {
        if !world.is_valid_tile(destination) {
            debug!("[Movement] {} ignored off-board target {}", entity.id(), destination);
            return MoveOutcome::Rejected;
        }

        if world.is_obstacle(destination) {
            if !world.is_reroutable(destination) {
                debug!("[Movement] {} ignored blocked target {}", entity.id(), destination);
                return MoveOutcome::Rejected;
            }
            return match world.find_nearest_open_neighbor(destination, entity.grid_position) {
                Some(neighbor) => self.move_to(world, entity, neighbor, on_arrival),
                None => {
                    debug!("[Movement] {} cannot reach {}: no open neighbor", entity.id(), destination);
                    MoveOutcome::Rejected
                }
            };
        }

        let duration = self.animate_to(entity, destination, on_arrival);
        MoveOutcome::Accepted {
            destination,
            duration,
        }
    }

    /// Start the walk without any validation. Remote players go through here.
    ///
    /// The logical position changes immediately; the sprite follows over the
    /// clamped duration, starting from wherever it currently is.
    pub fn animate_to(
        &self,
        entity: &mut Entity,
        destination: GridCell,
        on_arrival: Option<InteractionEvent>,
    ) -> Duration {
        let duration = move_duration(entity.grid_position.distance(destination), &self.timing);
        let target = grid_to_iso(destination, self.tile);

        let dx = target.x - entity.screen_position.x;
        if dx < 0.0 {
            entity.visual.facing = Facing::Left;
        } else if dx > 0.0 {
            entity.visual.facing = Facing::Right;
        }
        entity.visual.motion = Motion::Walking;

        entity.tween = Some(Tween::new(entity.screen_position, target, duration));
        entity.on_arrival = on_arrival;
        entity.grid_position = destination;

        debug!(
            "[Movement] {} -> {} over {}ms",
            entity.id(),
            destination,
            duration.as_millis()
        );
        duration
    }

    /// Advance one frame. Returns the arrival event when the walk just finished.
    pub fn update(&self, entity: &mut Entity, dt: Duration) -> Option<InteractionEvent> {
        let tween = entity.tween.as_mut()?;
        let done = tween.advance(dt);
        entity.screen_position = tween.position();

        if done {
            entity.tween = None;
            entity.visual.motion = Motion::Idle;
            entity.visual.frame = 0;
            entity.frame_clock = Duration::ZERO;
            return entity.on_arrival.take();
        }

        entity.frame_clock += dt;
        entity.visual.frame = ((entity.frame_clock.as_millis() / WALK_FRAME_MS) % WALK_FRAME_COUNT) as u32;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::terrain::TerrainLayout;
    use crate::game::types::InteractionKind;

    fn timing() -> MoveTiming {
        MoveTiming {
            per_cell: Duration::from_millis(200),
            min: Duration::from_millis(300),
            max: Duration::from_millis(800),
        }
    }

    fn controller() -> MovementController {
        MovementController::new(
            TileMetrics {
                width: 64.0,
                height: 32.0,
            },
            timing(),
        )
    }

    fn walker(controller: &MovementController, cell: GridCell) -> Entity {
        controller.spawn("me", Role::Local, "Me", Appearance::default(), cell)
    }

    #[test]
    fn duration_is_clamped() {
        assert_eq!(move_duration(0.1, &timing()), Duration::from_millis(300));
        assert_eq!(move_duration(10.0, &timing()), Duration::from_millis(800));
        assert_eq!(move_duration(2.0, &timing()), Duration::from_millis(400));
        assert_eq!(move_duration(-4.0, &timing()), Duration::from_millis(300));
    }

    #[test]
    fn accepted_move_updates_logical_position_immediately() {
        let controller = controller();
        let world = World::new(TerrainLayout::centered(5, 5), GridCell::new(9, 9));
        let mut entity = walker(&controller, GridCell::new(0, 0));

        let outcome = controller.move_to(&world, &mut entity, GridCell::new(2, 0), None);

        assert!(outcome.is_accepted());
        assert_eq!(entity.grid_position(), GridCell::new(2, 0));
        assert_eq!(entity.visual_state().motion, Motion::Walking);
        assert_eq!(entity.screen_position(), grid_to_iso(GridCell::new(0, 0), controller.tile()));
    }

    #[test]
    fn walk_ends_idle_on_first_frame() {
        let controller = controller();
        let world = World::new(TerrainLayout::centered(5, 5), GridCell::new(9, 9));
        let mut entity = walker(&controller, GridCell::new(0, 0));
        controller.move_to(&world, &mut entity, GridCell::new(-2, 1), None);

        controller.update(&mut entity, Duration::from_millis(250));
        assert_eq!(entity.visual_state().frame, 2);
        controller.update(&mut entity, Duration::from_millis(1000));

        let state = entity.visual_state();
        assert_eq!(state.motion, Motion::Idle);
        assert_eq!(state.frame, 0);
        assert!(!entity.is_moving());
        assert_eq!(entity.screen_position(), grid_to_iso(GridCell::new(-2, 1), controller.tile()));
    }

    #[test]
    fn facing_follows_horizontal_screen_delta() {
        let controller = controller();
        let world = World::new(TerrainLayout::centered(5, 5), GridCell::new(9, 9));
        let mut entity = walker(&controller, GridCell::new(0, 0));

        controller.move_to(&world, &mut entity, GridCell::new(0, 1), None);
        assert_eq!(entity.visual_state().facing, Facing::Left);
        controller.move_to(&world, &mut entity, GridCell::new(1, 0), None);
        assert_eq!(entity.visual_state().facing, Facing::Right);
    }

    #[test]
    fn off_board_and_blocked_targets_are_ignored() {
        let controller = controller();
        let mut world = World::new(TerrainLayout::centered(3, 3), GridCell::new(9, 9));
        world.register_scenery(GridCell::new(1, 1));
        let mut entity = walker(&controller, GridCell::new(0, 0));

        assert_eq!(
            controller.move_to(&world, &mut entity, GridCell::new(10, 10), None),
            MoveOutcome::Rejected
        );
        assert_eq!(
            controller.move_to(&world, &mut entity, GridCell::new(1, 1), None),
            MoveOutcome::Rejected
        );
        assert_eq!(entity.grid_position(), GridCell::new(0, 0));
        assert!(!entity.is_moving());
    }

    #[test]
    fn blocked_challenge_reroutes_and_fires_once_on_arrival() {
        let controller = controller();
        let world = World::new(TerrainLayout::centered(13, 13), GridCell::new(5, 5));
        let mut entity = walker(&controller, GridCell::new(5, 3));
        let event = InteractionEvent::new(InteractionKind::MathChallenge, "great-oak");

        let outcome = controller.move_to(&world, &mut entity, GridCell::new(5, 5), Some(event.clone()));

        assert_eq!(
            outcome,
            MoveOutcome::Accepted {
                destination: GridCell::new(5, 4),
                duration: Duration::from_millis(300),
            }
        );
        assert_eq!(controller.update(&mut entity, Duration::from_millis(100)), None);
        assert_eq!(controller.update(&mut entity, Duration::from_millis(300)), Some(event));
        assert_eq!(controller.update(&mut entity, Duration::from_millis(300)), None);
    }

    #[test]
    fn unreachable_interactive_is_a_no_op() {
        let controller = controller();
        let mut world = World::new(TerrainLayout::centered(5, 5), GridCell::new(0, 0));
        for n in GridCell::new(0, 0).neighbors() {
            world.register_scenery(n);
        }
        let mut entity = walker(&controller, GridCell::new(2, 2));
        let event = InteractionEvent::new(InteractionKind::MathChallenge, "great-oak");

        assert_eq!(
            controller.move_to(&world, &mut entity, GridCell::new(0, 0), Some(event)),
            MoveOutcome::Rejected
        );
        assert_eq!(controller.update(&mut entity, Duration::from_secs(1)), None);
        assert_eq!(entity.grid_position(), GridCell::new(2, 2));
    }

    #[test]
    fn new_target_restarts_from_interpolated_position() {
        let controller = controller();
        let world = World::new(TerrainLayout::centered(7, 7), GridCell::new(9, 9));
        let mut entity = walker(&controller, GridCell::new(0, 0));

        controller.move_to(&world, &mut entity, GridCell::new(3, 0), None);
        controller.update(&mut entity, Duration::from_millis(200));
        let midway = entity.screen_position();
        controller.move_to(&world, &mut entity, GridCell::new(0, 3), None);
        controller.update(&mut entity, Duration::ZERO);

        assert_eq!(entity.screen_position(), midway);
        assert_eq!(entity.grid_position(), GridCell::new(0, 3));
    }
}
