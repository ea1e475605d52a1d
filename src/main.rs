//! Main entry point for the relay server.
//!
//! Initializes the actor system, configures application state, and launches the HTTP server
//! with the realtime channel WebSocket endpoint.

use actix::Actor;
use actix_web::{web, App, HttpServer};
use log::info;

use grove::config::server::{BIND_HOST, BIND_PORT, CHANNEL_NAME};
use grove::server::channel::server::ChannelServer;
use grove::server::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Logger configured through RUST_LOG, info level by default.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Start the ChannelServer actor (owns every channel's roster).
    let channel_server = ChannelServer::new().start();

    // Shared application state for WebSocket handlers.
    let state = web::Data::new(AppState::new(channel_server));

    info!(
        "[Relay] Listening on {}:{} (clients join /ws/channel/{})",
        BIND_HOST, BIND_PORT, CHANNEL_NAME
    );

    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*"))
            )
            .app_data(state.clone())
            .configure(grove::server::router::config)
    })
    .bind((BIND_HOST, BIND_PORT))?
    .run()
    .await
}
