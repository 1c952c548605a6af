use actix::prelude::*;
use serde::{Deserialize, Serialize};

use crate::game::state::Match;
use crate::game::types::{ConnectionId, LobbySnapshot, MatchId, MatchState, RoundResult};

/// Client -> server events. Wire form: `{"event": "...", "data": ...}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientWsMessage {
    /// Payload: display name.
    CreateLobby(String),
    #[serde(rename_all = "camelCase")]
    JoinLobby {
        match_id: MatchId,
        #[serde(default)]
        display_name: String,
    },
    ToggleReady(MatchId),
    StartGame(MatchId),
    PlayerClick(MatchId),
    RequestRematch(MatchId),
    LeaveLobby(MatchId),
    Ping,
}

/// Server -> client events, same wire form.
#[derive(Message, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[rtype(result = "()")]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerWsMessage {
    LobbyCreated(MatchId),
    LobbyState(LobbySnapshot),
    GameStart(MatchId),
    GameState(MatchState),
    Countdown(u32),
    #[serde(rename_all = "camelCase")]
    GameResult {
        winner_id: Option<ConnectionId>,
        result: RoundResult,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reaction_ms: Option<u64>,
    },
    PlayerLeft,
    Error {
        code: String,
        message: String,
    },
}

impl ServerWsMessage {
    pub fn error(code: &str, message: &str) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

/// A connection opened; `addr` receives its outbound events.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub conn_id: ConnectionId,
    pub addr: Recipient<ServerWsMessage>,
}

/// A connection closed (cleanly or not).
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub conn_id: ConnectionId,
}

/// A decoded client event from `conn_id`.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ClientEvent {
    pub conn_id: ConnectionId,
    pub event: ClientWsMessage,
}

/// Look up a match by code.
#[derive(Message)]
#[rtype(result = "Option<Match>")]
pub struct GetMatch {
    pub match_id: MatchId,
}

/// Number of live matches.
#[derive(Message)]
#[rtype(result = "usize")]
pub struct MatchCount;
