//! HTTP and WebSocket routing configuration.
//!
//! `/ws` carries the game events; `/api/matches/{match_id}` returns a lobby
//! snapshot so a client can check a code before joining.

use actix_web::{HttpResponse, http::StatusCode, web};

use crate::server::match_session::messages::GetMatch;
use crate::server::match_session::session::ws_match;
use crate::server::state::AppState;
use crate::server::ws_error::{LobbyError, http_error_response};

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws").to(ws_match))
        .service(web::resource("/api/matches/{match_id}").route(web::get().to(get_match)));
}

async fn get_match(path: web::Path<String>, data: web::Data<AppState>) -> HttpResponse {
    let match_id = path.into_inner();
    match data.match_server.send(GetMatch { match_id }).await {
        Ok(Some(game)) => HttpResponse::Ok().json(game.snapshot()),
        Ok(None) => {
            let err = LobbyError::NotFound;
            http_error_response(err.code(), &err.to_string(), StatusCode::NOT_FOUND)
        }
        Err(e) => http_error_response(
            "INTERNAL",
            &format!("Match server unavailable: {}", e),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    }
}
