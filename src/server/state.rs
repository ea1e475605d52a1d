// src/server/state.rs

//! Application state for the relay server.
//!
//! Holds the address of the channel server actor, shared between WebSocket handlers.

use actix::Addr;
use crate::server::channel::server::ChannelServer;

/// Shared application state, injected into HTTP/WebSocket handlers.
pub struct AppState {
    /// Address of the channel server actor (membership, presence, fan-out).
    pub channel_server: Addr<ChannelServer>,
}

impl AppState {
    pub fn new(channel_server: Addr<ChannelServer>) -> Self {
        AppState { channel_server }
    }
}
