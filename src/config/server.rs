/// Relay server configuration constants.
///
/// Network binding and the channel every game session joins.

/// Interface the relay binds to.
pub const BIND_HOST: &str = "127.0.0.1";

/// Port the relay listens on.
pub const BIND_PORT: u16 = 8080;

/// Channel shared by every player of the world.
pub const CHANNEL_NAME: &str = "the-grove-global";

/// Largest absolute cell coordinate the relay forwards in a `player-move` or track.
pub const MAX_CELL_COORDINATE: i32 = 1_000_000;
