use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a live connection, stable for its lifetime.
pub type ConnectionId = Uuid;

/// Short code identifying a match (e.g. "K7QX2M").
pub type MatchId = String;

/// Phase of a match. Transitions follow
/// waiting -> countdown -> red -> green -> finished -> waiting,
/// with red -> finished on a false start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchState {
    Waiting,
    Countdown,
    Red,
    Green,
    Finished,
}

impl MatchState {
    /// Countdown, red and green: a round is being played.
    pub fn is_in_round(self) -> bool {
        matches!(self, MatchState::Countdown | MatchState::Red | MatchState::Green)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundResult {
    Win,
    Lose,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: ConnectionId,
    pub display_name: String,
    pub is_ready: bool,
    pub is_host: bool,
}

impl Player {
    pub fn host(id: ConnectionId, display_name: String) -> Self {
        Self {
            id,
            display_name,
            is_ready: true,
            is_host: true,
        }
    }

    pub fn guest(id: ConnectionId, display_name: String) -> Self {
        Self {
            id,
            display_name,
            is_ready: false,
            is_host: false,
        }
    }

    /// Promote to host. The host is always ready.
    pub fn promote(&mut self) {
        self.is_host = true;
        self.is_ready = true;
    }
}

/// Membership and readiness snapshot sent to every member of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbySnapshot {
    pub players: Vec<Player>,
    pub state: MatchState,
}
