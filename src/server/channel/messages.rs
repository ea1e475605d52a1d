use actix::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::game::entity::EntityId;
use crate::game::sync::{BroadcastEvent, ChannelEvent, PlayerMove, SyncError};

// Client -> server
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "action", content = "data")]
pub enum ClientWsMessage {
    /// Enter (or refresh) the channel presence roster.
    Track(PlayerMove),
    /// Forward to every other member of the channel.
    Broadcast(BroadcastEvent),
    Ping,
}

// Server -> client
#[derive(Message, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[rtype(result = "()")]
#[serde(tag = "action", content = "data")]
pub enum ServerWsMessage {
    Subscribed {
        id: EntityId,
    },
    Broadcast(BroadcastEvent),
    PresenceSync {
        ids: Vec<EntityId>,
    },
    Error {
        code: String,
        message: String,
        #[serde(default)]
        context: Option<Value>,
    },
}

impl ServerWsMessage {
    pub fn subscribed(id: &str) -> Self {
        Self::Subscribed { id: id.to_string() }
    }
    pub fn presence_sync(ids: Vec<EntityId>) -> Self {
        Self::PresenceSync { ids }
    }
    pub fn error(code: &str, message: &str, context: Option<Value>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.to_string(),
            context,
        }
    }

    /// What a game client should feed its scene. Error frames carry no game event.
    pub fn into_channel_event(self) -> Option<ChannelEvent> {
        match self {
            Self::Subscribed { .. } => Some(ChannelEvent::Subscribed),
            Self::Broadcast(event) => Some(ChannelEvent::Broadcast(event)),
            Self::PresenceSync { ids } => Some(ChannelEvent::PresenceSync(ids)),
            Self::Error { .. } => None,
        }
    }
}

/// Decode one text frame received from the relay.
pub fn decode_server_frame(text: &str) -> Result<Option<ChannelEvent>, SyncError> {
    let frame: ServerWsMessage = serde_json::from_str(text)?;
    Ok(frame.into_channel_event())
}

/// Sent to a session replaced by a newer connection with the same id.
#[derive(Message)]
#[rtype(result = "()")]
pub struct SessionKicked {
    pub reason: String,
}
