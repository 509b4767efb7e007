//! HTTP and WebSocket routing configuration.

use actix_web::web;
use crate::server::game_session::session::ws_game;

/// Configure the application's routes. Game clients talk over a single socket endpoint.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/ws/game")
            .to(ws_game)
    );
}
