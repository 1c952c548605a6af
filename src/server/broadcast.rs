//! Fan-out of server events to connected clients.

use std::collections::HashMap;

use actix::Recipient;
use log::debug;

use crate::game::state::Match;
use crate::game::types::ConnectionId;
use crate::server::match_session::messages::ServerWsMessage;

/// Outbound channel of every live connection.
#[derive(Default)]
pub struct Broadcaster {
    recipients: HashMap<ConnectionId, Recipient<ServerWsMessage>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, conn: ConnectionId, recipient: Recipient<ServerWsMessage>) {
        self.recipients.insert(conn, recipient);
    }

    pub fn unregister(&mut self, conn: ConnectionId) {
        self.recipients.remove(&conn);
    }

    /// Send to one connection. Unknown connections are skipped.
    pub fn send_to(&self, conn: ConnectionId, msg: ServerWsMessage) {
        match self.recipients.get(&conn) {
            Some(recipient) => recipient.do_send(msg),
            None => debug!("[Broadcast] Dropping message for unknown connection {}", conn),
        }
    }

    /// Send to every current member of a match.
    pub fn send_to_match(&self, game: &Match, msg: ServerWsMessage) {
        for player in &game.players {
            self.send_to(player.id, msg.clone());
        }
    }

    /// Send the lobby snapshot to every member of a match.
    pub fn send_lobby_state(&self, game: &Match) {
        debug!(
            "[Broadcast] Lobby state for {}: {} player(s), state={:?}",
            game.id,
            game.players.len(),
            game.state
        );
        self.send_to_match(game, ServerWsMessage::LobbyState(game.snapshot()));
    }
}
