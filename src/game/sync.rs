//! Realtime sync bridge.
//!
//! Mirrors the local avatar onto a best-effort pub/sub channel and rebuilds the
//! other players from what arrives. There is no ordering or delivery guarantee:
//! the last `player-move` seen for an id wins, and presence `sync` is the only
//! way a remote player is removed.

use std::collections::{BTreeMap, HashSet};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::chat::{ChatBubbles, ChatVerdict, screen_message};
use crate::game::entity::{Appearance, Color, Entity, EntityId, Role, Roster};
use crate::game::movement::MovementController;
use crate::game::types::GridCell;

pub const PLAYER_MOVE_EVENT: &str = "player-move";
pub const CHAT_EVENT: &str = "chat";

/// Position and look of one player, also used as the presence `track` state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMove {
    pub id: EntityId,
    pub x: i32,
    pub y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `<layer>Color` fields.
    #[serde(flatten)]
    pub colors: BTreeMap<String, Color>,
}

impl PlayerMove {
    pub fn from_entity(entity: &Entity) -> Self {
        let cell = entity.grid_position();
        Self {
            id: entity.id().to_string(),
            x: cell.x,
            y: cell.y,
            name: Some(entity.display_name().to_string()),
            colors: entity.appearance().to_wire_fields(),
        }
    }

    pub fn cell(&self) -> GridCell {
        GridCell::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatTag {
    Chat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPayload {
    #[serde(rename = "type")]
    pub tag: ChatTag,
    pub message: String,
    pub id: EntityId,
}

impl ChatPayload {
    pub fn new(id: impl Into<EntityId>, message: impl Into<String>) -> Self {
        Self {
            tag: ChatTag::Chat,
            message: message.into(),
            id: id.into(),
        }
    }
}

/// Broadcast messages exchanged over the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum BroadcastEvent {
    #[serde(rename = "player-move")]
    PlayerMove(PlayerMove),
    #[serde(rename = "chat")]
    Chat(ChatPayload),
}

/// What the channel reports back to the game.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Subscribed,
    Broadcast(BroadcastEvent),
    /// Every session id the channel currently considers connected.
    PresenceSync(Vec<EntityId>),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("malformed channel message: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unknown broadcast event {0:?}")]
    UnknownEvent(String),
}

impl BroadcastEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BroadcastEvent::PlayerMove(_) => PLAYER_MOVE_EVENT,
            BroadcastEvent::Chat(_) => CHAT_EVENT,
        }
    }

    /// Rebuild from the `(event, payload)` pair a relay forwards.
    pub fn from_parts(event: &str, payload: serde_json::Value) -> Result<Self, SyncError> {
        match event {
            PLAYER_MOVE_EVENT => Ok(BroadcastEvent::PlayerMove(serde_json::from_value(payload)?)),
            CHAT_EVENT => Ok(BroadcastEvent::Chat(serde_json::from_value(payload)?)),
            other => Err(SyncError::UnknownEvent(other.to_string())),
        }
    }
}

/// Outbound side of the pub/sub backend. Sends are fire-and-forget.
pub trait RealtimeChannel {
    fn track(&mut self, state: &PlayerMove);
    fn broadcast(&mut self, event: &BroadcastEvent);
}

/// How an inbound `player-move` was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteUpdate {
    IgnoredSelf,
    Joined,
    Moved { appearance_changed: bool },
}

#[derive(Debug)]
pub struct SyncBridge<C: RealtimeChannel> {
    local_id: EntityId,
    channel: C,
}

impl<C: RealtimeChannel> SyncBridge<C> {
    pub fn new(local_id: impl Into<EntityId>, channel: C) -> Self {
        Self {
            local_id: local_id.into(),
            channel,
        }
    }

    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Announce the local player's current cell and look.
    pub fn publish_move(&mut self, local: &Entity) {
        let msg = PlayerMove::from_entity(local);
        debug!("[Sync] Broadcast player-move {} -> {}", msg.id, msg.cell());
        self.channel.broadcast(&BroadcastEvent::PlayerMove(msg));
    }

    /// Track presence, then publish the spawn position for players already in the world.
    pub fn on_subscribed(&mut self, local: &Entity) {
        info!("[Sync] Subscribed as {}", self.local_id);
        self.channel.track(&PlayerMove::from_entity(local));
        self.publish_move(local);
    }

    /// Create, move or restyle a remote player. Never touches the local player.
    pub fn apply_player_move(
        &self,
        msg: &PlayerMove,
        roster: &mut Roster,
        controller: &MovementController,
    ) -> RemoteUpdate {
        if msg.id == self.local_id {
            return RemoteUpdate::IgnoredSelf;
        }

        match roster.get_mut(&msg.id) {
            Some(entity) => {
                controller.animate_to(entity, msg.cell(), None);
                let mut appearance_changed = entity.appearance_mut().patch(&msg.colors);
                if let Some(name) = &msg.name {
                    appearance_changed |= entity.set_display_name(name.clone());
                }
                RemoteUpdate::Moved { appearance_changed }
            }
            None => {
                info!("[Sync] Player {} joined at {}", msg.id, msg.cell());
                let name = msg.name.clone().unwrap_or_default();
                roster.insert(controller.spawn(
                    msg.id.clone(),
                    Role::Remote,
                    name,
                    Appearance::from_wire_fields(&msg.colors),
                    msg.cell(),
                ));
                RemoteUpdate::Joined
            }
        }
    }

    /// Tear down every tracked remote player missing from the presence roster.
    pub fn reconcile_presence(
        &self,
        present: &[EntityId],
        roster: &mut Roster,
        bubbles: &mut ChatBubbles,
    ) -> Vec<EntityId> {
        let present: HashSet<&str> = present.iter().map(String::as_str).collect();
        let mut gone: Vec<EntityId> = roster
            .ids()
            .into_iter()
            .filter(|id| !present.contains(id.as_str()))
            .collect();
        gone.sort();

        for id in &gone {
            roster.remove(id);
            bubbles.remove(id);
            info!("[Sync] Player {} left", id);
        }
        gone
    }

    /// Show the line above the local player and publish it. Returns false if it was dropped.
    pub fn send_chat(&mut self, raw: &str, bubbles: &mut ChatBubbles) -> bool {
        let message = match screen_message(raw) {
            ChatVerdict::Accepted(message) => message,
            ChatVerdict::Empty => return false,
            ChatVerdict::Blocked { word } => {
                warn!("[Sync] Dropped chat from {}: blocked word {:?}", self.local_id, word);
                return false;
            }
        };

        bubbles.show(&self.local_id, message.clone());
        self.channel
            .broadcast(&BroadcastEvent::Chat(ChatPayload::new(self.local_id.clone(), message)));
        true
    }

    /// Bubble above the speaker, local or remote. Unknown speakers are ignored.
    pub fn apply_chat(&self, chat: &ChatPayload, roster: &Roster, bubbles: &mut ChatBubbles) -> bool {
        if chat.id != self.local_id && !roster.contains(&chat.id) {
            return false;
        }
        bubbles.show(&chat.id, chat.message.clone());
        true
    }
}
