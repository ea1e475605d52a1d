//! HTTP and WebSocket routing configuration.
//!
//! Every realtime channel is reached through one WebSocket endpoint; each
//! connection is handled by its own session actor.

use actix_web::web;
use crate::server::channel::session::ws_channel;

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/ws/channel/{channel}")
            .to(ws_channel)
    );
}
