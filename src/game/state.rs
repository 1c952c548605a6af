use std::time::{Duration, Instant};

use crate::config::lobby::{MAX_DISPLAY_NAME_LEN, MAX_PLAYERS, REQUIRED_PLAYERS};
use crate::game::types::{
    ConnectionId, LobbySnapshot, MatchId, MatchState, Player, RoundResult,
};
use crate::server::ws_error::LobbyError;

/// Result of a successful join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    /// The connection was already a member; nothing changed.
    AlreadyMember,
}

/// What happened to a match after a player was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Departure {
    /// No players remain; the match must be destroyed.
    pub emptied: bool,
    /// Player promoted to host because the host left.
    pub promoted: Option<ConnectionId>,
}

/// Outcome of a finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOutcome {
    pub winner_id: Option<ConnectionId>,
    pub false_start: bool,
    /// Time from green to the winning click.
    pub reaction: Option<Duration>,
}

/// A two-player match: membership, readiness and the round state machine.
#[derive(Debug, Clone)]
pub struct Match {
    pub id: MatchId,
    /// Join order. At most `MAX_PLAYERS`.
    pub players: Vec<Player>,
    pub state: MatchState,
    pub winner_id: Option<ConnectionId>,
    /// When green began. Advisory only; never used for arbitration.
    pub round_start_time: Option<Instant>,
    /// Incremented at every start; lets stale timers recognize a superseded round.
    pub round: u32,
}

impl Match {
    /// Create a match in `waiting` with a single host player.
    pub fn new(id: MatchId, host_id: ConnectionId, display_name: &str) -> Self {
        Self {
            id,
            players: vec![Player::host(host_id, normalize_name(display_name, 1))],
            state: MatchState::Waiting,
            winner_id: None,
            round_start_time: None,
            round: 0,
        }
    }

    pub fn player(&self, id: ConnectionId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn is_member(&self, id: ConnectionId) -> bool {
        self.player(id).is_some()
    }

    pub fn is_host(&self, id: ConnectionId) -> bool {
        self.player(id).is_some_and(|p| p.is_host)
    }

    pub fn host(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_host)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn snapshot(&self) -> LobbySnapshot {
        LobbySnapshot {
            players: self.players.clone(),
            state: self.state,
        }
    }

    /// Check whether `id` could join, without changing anything.
    pub fn check_join(&self, id: ConnectionId) -> Result<JoinOutcome, LobbyError> {
        if self.is_member(id) {
            return Ok(JoinOutcome::AlreadyMember);
        }
        if self.is_full() {
            return Err(LobbyError::Full);
        }
        Ok(JoinOutcome::Joined)
    }

    /// Append a non-host, not-ready player.
    pub fn add_player(
        &mut self,
        id: ConnectionId,
        display_name: &str,
    ) -> Result<JoinOutcome, LobbyError> {
        let outcome = self.check_join(id)?;
        if outcome == JoinOutcome::Joined {
            let name = normalize_name(display_name, self.players.len() + 1);
            self.players.push(Player::guest(id, name));
        }
        Ok(outcome)
    }

    /// Flip a non-host player's readiness. Returns the new value, or `None`
    /// when the request is ignored (host, non-member, or not in the lobby).
    pub fn toggle_ready(&mut self, id: ConnectionId) -> Option<bool> {
        if self.state != MatchState::Waiting {
            return None;
        }
        let player = self.players.iter_mut().find(|p| p.id == id)?;
        if player.is_host {
            return None;
        }
        player.is_ready = !player.is_ready;
        Some(player.is_ready)
    }

    /// Exactly two players, all ready, still in the lobby.
    pub fn can_start(&self) -> bool {
        self.state == MatchState::Waiting
            && self.players.len() == REQUIRED_PLAYERS
            && self.players.iter().all(|p| p.is_ready || p.is_host)
    }

    /// waiting -> countdown. Returns the new round number.
    pub fn begin_countdown(&mut self) -> Result<u32, LobbyError> {
        if !self.can_start() {
            return Err(LobbyError::InvalidState);
        }
        self.state = MatchState::Countdown;
        self.winner_id = None;
        self.round_start_time = None;
        self.round += 1;
        Ok(self.round)
    }

    /// countdown -> red, only for the given round.
    pub fn enter_red(&mut self, round: u32) -> bool {
        if self.round != round || self.state != MatchState::Countdown {
            return false;
        }
        self.state = MatchState::Red;
        true
    }

    /// red -> green, only for the given round and if nobody clicked yet.
    pub fn enter_green(&mut self, round: u32, now: Instant) -> bool {
        if self.round != round || self.state != MatchState::Red {
            return false;
        }
        self.state = MatchState::Green;
        self.round_start_time = Some(now);
        true
    }

    /// Resolve a click. The transition to `finished` is the lock: only the
    /// first click in red or green produces an outcome, later ones get `None`.
    pub fn arbitrate_click(&mut self, clicker: ConnectionId, now: Instant) -> Option<RoundOutcome> {
        if !self.is_member(clicker) {
            return None;
        }
        let outcome = match self.state {
            MatchState::Red => RoundOutcome {
                winner_id: self.opponent_of(clicker),
                false_start: true,
                reaction: None,
            },
            MatchState::Green => RoundOutcome {
                winner_id: Some(clicker),
                false_start: false,
                reaction: self.round_start_time.map(|start| now.saturating_duration_since(start)),
            },
            _ => return None,
        };
        self.finish(outcome.winner_id);
        Some(outcome)
    }

    /// End a round in progress because `leaver` is departing; the other
    /// player wins. Returns `None` when no round was in progress.
    pub fn forfeit(&mut self, leaver: ConnectionId) -> Option<RoundOutcome> {
        if !self.state.is_in_round() || !self.is_member(leaver) {
            return None;
        }
        let winner_id = self.opponent_of(leaver);
        self.finish(winner_id);
        Some(RoundOutcome {
            winner_id,
            false_start: false,
            reaction: None,
        })
    }

    /// finished -> waiting. Clears the result and non-host readiness.
    pub fn reset_for_rematch(&mut self) -> Result<(), LobbyError> {
        if self.state != MatchState::Finished {
            return Err(LobbyError::InvalidState);
        }
        for player in self.players.iter_mut().filter(|p| !p.is_host) {
            player.is_ready = false;
        }
        self.state = MatchState::Waiting;
        self.winner_id = None;
        self.round_start_time = None;
        Ok(())
    }

    /// Remove a player, promoting the first remaining one if the host left.
    /// Returns `None` if `id` was not a member.
    pub fn remove_player(&mut self, id: ConnectionId) -> Option<Departure> {
        let index = self.players.iter().position(|p| p.id == id)?;
        self.players.remove(index);

        let mut promoted = None;
        if !self.players.is_empty() && !self.players.iter().any(|p| p.is_host) {
            let first = &mut self.players[0];
            first.promote();
            promoted = Some(first.id);
        }
        Some(Departure {
            emptied: self.players.is_empty(),
            promoted,
        })
    }

    /// Personalized result for every current player.
    pub fn results(&self) -> Vec<(ConnectionId, RoundResult)> {
        self.players
            .iter()
            .map(|p| {
                let result = if Some(p.id) == self.winner_id {
                    RoundResult::Win
                } else {
                    RoundResult::Lose
                };
                (p.id, result)
            })
            .collect()
    }

    fn opponent_of(&self, id: ConnectionId) -> Option<ConnectionId> {
        self.players.iter().find(|p| p.id != id).map(|p| p.id)
    }

    fn finish(&mut self, winner_id: Option<ConnectionId>) {
        self.state = MatchState::Finished;
        self.winner_id = winner_id;
    }
}

/// Trim and cap a display name; empty names become "Player N".
pub fn normalize_name(display_name: &str, position: usize) -> String {
    let trimmed = display_name.trim();
    if trimmed.is_empty() {
        return format!("Player {}", position);
    }
    trimmed.chars().take(MAX_DISPLAY_NAME_LEN).collect()
}
