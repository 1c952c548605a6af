/// Lobby and round errors, plus helpers for WebSocket and HTTP error responses.
///
/// Every client-facing failure is reported through these helpers so that error
/// payloads stay consistent: a stable code and a human-readable message.
use actix_web::{HttpResponse, http::StatusCode};
use thiserror::Error;

use crate::server::match_session::messages::ServerWsMessage;

/// Rejection of a client request. None of these are fatal to the server.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LobbyError {
    #[error("Lobby not found")]
    NotFound,
    #[error("Lobby is full")]
    Full,
    #[error("{0}")]
    Forbidden(&'static str),
    /// The action is meaningless in the current state; usually a benign race.
    #[error("Action not allowed in the current state")]
    InvalidState,
}

impl LobbyError {
    /// Unique error code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            LobbyError::NotFound => "NOT_FOUND",
            LobbyError::Full => "FULL",
            LobbyError::Forbidden(_) => "FORBIDDEN",
            LobbyError::InvalidState => "INVALID_STATE",
        }
    }

    /// Whether the requester should be told about this error.
    pub fn is_reported(&self) -> bool {
        !matches!(self, LobbyError::InvalidState)
    }

    pub fn to_ws_message(&self) -> ServerWsMessage {
        ServerWsMessage::error(self.code(), &self.to_string())
    }
}

/// Formats a WebSocket error event as a JSON string.
///
/// Used where no typed `ServerWsMessage` can be built (e.g. serialization failures).
pub fn ws_error_message(code: &str, message: &str) -> String {
    serde_json::json!({
        "event": "error",
        "data": { "code": code, "message": message },
    })
    .to_string()
}

/// Returns an HTTP error response with a JSON body.
pub fn http_error_response(code: &str, message: &str, status: StatusCode) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({
        "error": { "code": code, "message": message },
    }))
}
