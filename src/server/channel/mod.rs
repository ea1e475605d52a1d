//! Realtime channel relay: broadcast fan-out plus presence per named channel.

pub mod messages;
pub mod registry;
pub mod server;
pub mod session;
