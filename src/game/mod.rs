pub mod chat;
pub mod coords;
pub mod depth;
pub mod dispatch;
pub mod entity;
pub mod movement;
pub mod rewards;
pub mod scene;
pub mod spawner;
pub mod sync;
pub mod terrain;
pub mod tween;
pub mod types;


pub use scene::{ChatSender, GroveScene, HoverTile};
pub use sync::{BroadcastEvent, ChannelEvent, RealtimeChannel};
