/// Match server actor.
///
/// Owns every match, the connection registry and the outbound channels. All
/// lobby and round mutations go through this actor's mailbox, so events for a
/// match are processed one at a time and never interleave with its timers.

use std::collections::HashMap;

use actix::prelude::*;
use actix::MessageResult;
use log::{debug, info, warn};

use super::messages::{ClientEvent, ClientWsMessage, Connect, Disconnect, GetMatch, MatchCount};
use super::{lobby, round};
use crate::config::game::RoundTiming;
use crate::game::types::{ConnectionId, MatchId};
use crate::server::broadcast::Broadcaster;
use crate::server::registry::ConnectionRegistry;
use crate::server::store::MatchStore;
use crate::server::ws_error::LobbyError;

pub struct MatchServer {
    pub(super) store: MatchStore,
    pub(super) registry: ConnectionRegistry,
    pub(super) broadcaster: Broadcaster,
    /// Pending countdown tick or green transition, per match.
    pub(super) timers: HashMap<MatchId, SpawnHandle>,
    pub(super) timing: RoundTiming,
}

impl MatchServer {
    pub fn new(timing: RoundTiming) -> Self {
        Self::with_store(MatchStore::new(), timing)
    }

    /// Use a preconfigured store (e.g. with a deterministic code generator).
    pub fn with_store(store: MatchStore, timing: RoundTiming) -> Self {
        Self {
            store,
            registry: ConnectionRegistry::new(),
            broadcaster: Broadcaster::new(),
            timers: HashMap::new(),
            timing,
        }
    }

    /// Track the pending timer of a match. Timers are chained: a new one is
    /// only set from the callback of the previous one or from a fresh start.
    pub(super) fn set_timer(&mut self, match_id: &str, handle: SpawnHandle) {
        self.timers.insert(match_id.to_string(), handle);
    }

    pub(super) fn cancel_timer(&mut self, match_id: &str, ctx: &mut Context<Self>) {
        if let Some(handle) = self.timers.remove(match_id) {
            ctx.cancel_future(handle);
            debug!("[MatchServer] Timer cancelled for {}", match_id);
        }
    }

    /// Report a rejected request to its sender. `InvalidState` stays silent.
    fn report(&self, conn_id: ConnectionId, err: LobbyError) {
        if err.is_reported() {
            warn!("[MatchServer] Request from {} rejected: {}", conn_id, err);
            self.broadcaster.send_to(conn_id, err.to_ws_message());
        } else {
            debug!("[MatchServer] Request from {} ignored: {}", conn_id, err);
        }
    }

    fn dispatch(
        &mut self,
        conn_id: ConnectionId,
        event: ClientWsMessage,
        ctx: &mut Context<Self>,
    ) -> Result<(), LobbyError> {
        match event {
            ClientWsMessage::CreateLobby(display_name) => {
                lobby::create_lobby(self, conn_id, &display_name, ctx);
                Ok(())
            }
            ClientWsMessage::JoinLobby { match_id, display_name } => {
                lobby::join_lobby(self, conn_id, &match_id, &display_name, ctx)
            }
            ClientWsMessage::ToggleReady(match_id) => lobby::toggle_ready(self, conn_id, &match_id, ctx),
            ClientWsMessage::StartGame(match_id) => lobby::start_game(self, conn_id, &match_id, ctx),
            ClientWsMessage::LeaveLobby(match_id) => lobby::leave_lobby(self, conn_id, &match_id, ctx),
            ClientWsMessage::PlayerClick(match_id) => round::player_click(self, conn_id, &match_id, ctx),
            ClientWsMessage::RequestRematch(match_id) => {
                round::request_rematch(self, conn_id, &match_id, ctx)
            }
            ClientWsMessage::Ping => Ok(()),
        }
    }
}

impl Actor for MatchServer {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("[MatchServer] Started");
    }
}

impl Handler<Connect> for MatchServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _ctx: &mut Self::Context) -> Self::Result {
        debug!("[MatchServer] Connection {} registered", msg.conn_id);
        self.broadcaster.register(msg.conn_id, msg.addr);
    }
}

impl Handler<Disconnect> for MatchServer {
    type Result = ();

    /// Runs the leave path for whatever match the connection was in.
    fn handle(&mut self, msg: Disconnect, ctx: &mut Self::Context) -> Self::Result {
        info!("[MatchServer] Connection {} closed", msg.conn_id);
        lobby::leave_current(self, msg.conn_id, ctx);
        self.broadcaster.unregister(msg.conn_id);
    }
}

impl Handler<ClientEvent> for MatchServer {
    type Result = ();

    fn handle(&mut self, msg: ClientEvent, ctx: &mut Self::Context) -> Self::Result {
        if let Err(err) = self.dispatch(msg.conn_id, msg.event, ctx) {
            self.report(msg.conn_id, err);
        }
    }
}

impl Handler<GetMatch> for MatchServer {
    type Result = MessageResult<GetMatch>;

    fn handle(&mut self, msg: GetMatch, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.store.get(&msg.match_id).cloned())
    }
}

impl Handler<MatchCount> for MatchServer {
    type Result = MessageResult<MatchCount>;

    fn handle(&mut self, _msg: MatchCount, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.store.len())
    }
}
