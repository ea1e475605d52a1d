//! The running world.
//!
//! `GroveScene` wires pointer input through the dispatcher and movement
//! controller, mirrors the local avatar over the realtime channel, and advances
//! every animation once per `update(dt)` tick. Nothing here blocks: chat typed
//! in the UI is queued through a [`ChatSender`] and drained at the start of the
//! next tick.

use std::collections::HashSet;
use std::time::Duration;

use log::{info, warn};
use rand::Rng;
use tokio::sync::mpsc;

use crate::config::WorldConfig;
use crate::game::chat::ChatBubbles;
use crate::game::coords::{Viewport, grid_to_iso, iso_to_grid};
use crate::game::depth::{DrawItem, DrawKind, cell_depth, entity_items, sort_back_to_front};
use crate::game::dispatch::InteractionDispatcher;
use crate::game::entity::{Appearance, Color, Entity, EntityId, Role, Roster};
use crate::game::movement::{MoveOutcome, MovementController};
use crate::game::spawner::{CollectibleSpawner, SpawnReport};
use crate::game::sync::{BroadcastEvent, ChannelEvent, RealtimeChannel, SyncBridge};
use crate::game::terrain::{Interactive, World};
use crate::game::types::{GridCell, InteractionEvent, IsoPoint};

/// Handle the UI keeps to submit chat lines.
pub type ChatSender = mpsc::UnboundedSender<String>;

/// Cell under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverTile {
    pub cell: GridCell,
    pub walkable: bool,
}

pub struct GroveScene<C: RealtimeChannel> {
    config: WorldConfig,
    world: World,
    viewport: Viewport,
    controller: MovementController,
    dispatcher: InteractionDispatcher,
    local: Entity,
    remotes: Roster,
    bubbles: ChatBubbles,
    collectibles: CollectibleSpawner,
    bridge: SyncBridge<C>,
    chat_inbox: mpsc::UnboundedReceiver<String>,
}

impl<C: RealtimeChannel> GroveScene<C> {
    pub fn new(
        config: WorldConfig,
        world: World,
        local_id: impl Into<EntityId>,
        display_name: impl Into<String>,
        appearance: Appearance,
        channel: C,
    ) -> (Self, ChatSender) {
        let local_id = local_id.into();
        let controller = MovementController::new(config.tile, config.move_timing);
        let local = controller.spawn(
            local_id.clone(),
            Role::Local,
            display_name,
            appearance,
            config.spawn_cell,
        );
        let (chat_tx, chat_inbox) = mpsc::unbounded_channel();

        info!("[Scene] {} entered at {}", local_id, config.spawn_cell);
        let scene = Self {
            dispatcher: InteractionDispatcher::new(config.challenge_id.clone()),
            bubbles: ChatBubbles::new(config.chat_bubble_lifetime, config.chat_bubble_fade),
            collectibles: CollectibleSpawner::new(config.collect_shrink),
            bridge: SyncBridge::new(local_id, channel),
            viewport: Viewport::default(),
            remotes: Roster::default(),
            controller,
            local,
            world,
            config,
            chat_inbox,
        };
        (scene, chat_tx)
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Scatter this session's collectibles, skipping ids the player already owns.
    pub fn spawn_collectibles<R: Rng>(&mut self, collected: &HashSet<String>, rng: &mut R) -> SpawnReport {
        self.collectibles.spawn(
            &self.world,
            self.config.spawn_cell,
            self.config.collectible_target_count,
            self.config.spawn_attempt_budget,
            collected,
            rng,
        )
    }

    /// Click at a screen position.
    pub fn pointer_down(&mut self, screen: IsoPoint) -> MoveOutcome {
        let cell = iso_to_grid(self.viewport.screen_to_world(screen), self.config.tile);
        self.click_cell(cell)
    }

    /// Click on a cell: resolve it, walk there, announce the move if it was accepted.
    pub fn click_cell(&mut self, cell: GridCell) -> MoveOutcome {
        let Some(intent) = self.dispatcher.resolve(&self.world, &self.collectibles, cell) else {
            return MoveOutcome::Rejected;
        };

        let outcome = self
            .controller
            .move_to(&self.world, &mut self.local, intent.target, intent.on_arrival);
        if outcome.is_accepted() {
            self.bridge.publish_move(&self.local);
        }
        outcome
    }

    /// Cell under the pointer, `None` off the board.
    pub fn hover(&self, screen: IsoPoint) -> Option<HoverTile> {
        let cell = iso_to_grid(self.viewport.screen_to_world(screen), self.config.tile);
        if !self.world.is_valid_tile(cell) {
            return None;
        }
        Some(HoverTile {
            cell,
            walkable: !self.world.is_obstacle(cell),
        })
    }

    /// One frame. Returns the interactions whose walk finished during it.
    pub fn update(&mut self, dt: Duration) -> Vec<InteractionEvent> {
        while let Ok(line) = self.chat_inbox.try_recv() {
            self.bridge.send_chat(&line, &mut self.bubbles);
        }

        let mut events = Vec::new();
        if let Some(event) = self.controller.update(&mut self.local, dt) {
            info!("[Scene] {} arrived: {:?} {}", self.local.id(), event.kind, event.id);
            events.push(event);
        }
        for remote in self.remotes.iter_mut() {
            self.controller.update(remote, dt);
        }

        self.collectibles.update(dt);
        self.bubbles.update(dt);
        events
    }

    pub fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Subscribed => self.bridge.on_subscribed(&self.local),
            ChannelEvent::Broadcast(BroadcastEvent::PlayerMove(msg)) => {
                self.bridge
                    .apply_player_move(&msg, &mut self.remotes, &self.controller);
            }
            ChannelEvent::Broadcast(BroadcastEvent::Chat(chat)) => {
                self.bridge.apply_chat(&chat, &self.remotes, &mut self.bubbles);
            }
            ChannelEvent::PresenceSync(ids) => {
                self.bridge
                    .reconcile_presence(&ids, &mut self.remotes, &mut self.bubbles);
            }
        }
    }

    /// Raw `(event, payload)` broadcast from the relay. Malformed input is dropped.
    pub fn handle_relayed(&mut self, event: &str, payload: serde_json::Value) {
        match BroadcastEvent::from_parts(event, payload) {
            Ok(event) => self.handle_channel_event(ChannelEvent::Broadcast(event)),
            Err(e) => warn!("[Scene] Dropped {} broadcast: {}", event, e),
        }
    }

    /// Retint layers of the local avatar and let everyone know.
    pub fn set_appearance<'a>(&mut self, colors: impl IntoIterator<Item = (&'a str, Color)>) {
        let mut changed = false;
        for (layer, color) in colors {
            changed |= self.local.appearance_mut().set_color(layer, color);
        }
        if changed {
            self.bridge.publish_move(&self.local);
        }
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) {
        if self.local.set_display_name(name) {
            self.bridge.publish_move(&self.local);
        }
    }

    /// The host confirmed these pickups.
    pub fn sync_collected<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        self.collectibles.sync_collected(ids);
    }

    /// Everything standing on the board, back to front.
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let tile = self.config.tile;
        let mut items: Vec<DrawItem> = self
            .world
            .scenery()
            .map(|cell| DrawItem {
                kind: DrawKind::Scenery(cell),
                depth: cell_depth(cell, tile),
            })
            .collect();

        items.extend(self.world.interactives().map(|(cell, interactive)| DrawItem {
            kind: match interactive {
                Interactive::Npc { .. } => DrawKind::Npc(cell),
                Interactive::Prop { .. } => DrawKind::Prop(cell),
            },
            depth: cell_depth(cell, tile),
        }));

        let challenge = self.world.challenge_cell();
        if self.world.interactive_at(challenge).is_none() {
            items.push(DrawItem {
                kind: DrawKind::Challenge(challenge),
                depth: cell_depth(challenge, tile),
            });
        }

        items.extend(self.collectibles.items().iter().map(|item| DrawItem {
            kind: DrawKind::Collectible(item.id.clone()),
            depth: cell_depth(item.position, tile),
        }));

        items.extend(entity_items(&self.local));
        for remote in self.remotes.iter() {
            items.extend(entity_items(remote));
        }

        sort_back_to_front(&mut items);
        items
    }

    /// Screen position of a cell's tile center under the current viewport.
    pub fn cell_to_screen(&self, cell: GridCell) -> IsoPoint {
        self.viewport.world_to_screen(grid_to_iso(cell, self.config.tile))
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn local(&self) -> &Entity {
        &self.local
    }

    pub fn remotes(&self) -> &Roster {
        &self.remotes
    }

    pub fn bubbles(&self) -> &ChatBubbles {
        &self.bubbles
    }

    pub fn collectibles(&self) -> &CollectibleSpawner {
        &self.collectibles
    }

    pub fn channel(&self) -> &C {
        self.bridge.channel()
    }

    pub fn channel_mut(&mut self) -> &mut C {
        self.bridge.channel_mut()
    }
}
