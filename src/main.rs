//! Main entry point for the backend server.
//!
//! Initializes logging, reads the process configuration, starts the match
//! server actor and launches the HTTP server with the WebSocket endpoint.

use actix::Actor;
use actix_web::{App, HttpServer, web};
use log::info;

use config::game::RoundTiming;
use config::server::ServerConfig;
use server::match_session::MatchServer;

pub mod config;
mod game;
mod server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger from environment variable (default to info level).
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env().map_err(std::io::Error::other)?;

    // Start the MatchServer actor (handles lobbies, rounds and arbitration).
    let match_server = MatchServer::new(RoundTiming::default()).start();

    // Shared application state for HTTP/WebSocket handlers.
    let state = web::Data::new(server::state::AppState::new(match_server));

    info!("Server listening on {}:{}", config.host, config.port);
    let cors_origin = config.cors_origin.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", cors_origin.clone()))
                    .add(("Access-Control-Allow-Headers", "*"))
            )
            .app_data(state.clone())
            .configure(crate::server::router::config)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
