//! The Grove: isometric grid movement and interaction engine, plus the
//! realtime relay its clients share presence and broadcasts through.

pub mod config;
pub mod game;
pub mod server;
