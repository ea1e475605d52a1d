// src/server/mod.rs

//! Server layer root module.
//!
//! This module organizes the realtime relay the game clients connect to:
//! - Application state management
//! - HTTP/WebSocket routing
//! - Channel membership, presence and broadcast fan-out
//! - Per-session anti-spam and error reporting

pub mod anti_spam;
pub mod channel;
pub mod router;
pub mod state;
pub mod ws_actor_utils;
pub mod ws_error;
