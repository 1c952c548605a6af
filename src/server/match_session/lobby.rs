/// Lobby operations for the MatchServer: create, join, readiness, explicit
/// start and leave/disconnect cleanup.

use actix::prelude::*;
use log::{debug, info};

use super::messages::ServerWsMessage;
use super::round;
use super::server::MatchServer;
use crate::game::state::JoinOutcome;
use crate::game::types::ConnectionId;
use crate::server::ws_error::LobbyError;

/// Create a match hosted by `conn_id`. Leaves any previous match first.
pub fn create_lobby(
    this: &mut MatchServer,
    conn_id: ConnectionId,
    display_name: &str,
    ctx: &mut Context<MatchServer>,
) {
    leave_current(this, conn_id, ctx);

    let match_id = this.store.create(conn_id, display_name);
    this.registry.bind(conn_id, match_id.clone());
    info!("[MatchServer] Lobby {} created by {}", match_id, conn_id);

    this.broadcaster.send_to(conn_id, ServerWsMessage::LobbyCreated(match_id.clone()));
    if let Some(game) = this.store.get(&match_id) {
        this.broadcaster.send_lobby_state(game);
    }
}

/// Join an existing match. Rejoining a match one already belongs to is a
/// no-op that re-sends the snapshot.
pub fn join_lobby(
    this: &mut MatchServer,
    conn_id: ConnectionId,
    match_id: &str,
    display_name: &str,
    ctx: &mut Context<MatchServer>,
) -> Result<(), LobbyError> {
    let outcome = this
        .store
        .get(match_id)
        .ok_or(LobbyError::NotFound)?
        .check_join(conn_id)?;

    if this.registry.is_bound_elsewhere(conn_id, match_id) {
        debug!("[MatchServer] {} switches to {}, leaving previous match", conn_id, match_id);
        leave_current(this, conn_id, ctx);
    }

    let game = this.store.get_mut(match_id).ok_or(LobbyError::NotFound)?;
    if outcome == JoinOutcome::Joined {
        game.add_player(conn_id, display_name)?;
        info!("[MatchServer] {} joined lobby {}", conn_id, match_id);
    }
    this.registry.bind(conn_id, match_id.to_string());
    this.broadcaster.send_lobby_state(game);
    Ok(())
}

/// Flip a guest's readiness; auto-starts once both players are ready.
pub fn toggle_ready(
    this: &mut MatchServer,
    conn_id: ConnectionId,
    match_id: &str,
    ctx: &mut Context<MatchServer>,
) -> Result<(), LobbyError> {
    let game = this.store.get_mut(match_id).ok_or(LobbyError::NotFound)?;
    let Some(is_ready) = game.toggle_ready(conn_id) else {
        return Err(LobbyError::InvalidState);
    };
    debug!("[MatchServer] {} is now {} in {}", conn_id, if is_ready { "ready" } else { "not ready" }, match_id);
    this.broadcaster.send_lobby_state(game);

    if game.can_start() {
        info!("[MatchServer] All players ready in {}, starting", match_id);
        round::start_match(this, match_id, ctx);
    }
    Ok(())
}

/// Host-only start, with the same preconditions as the automatic start.
pub fn start_game(
    this: &mut MatchServer,
    conn_id: ConnectionId,
    match_id: &str,
    ctx: &mut Context<MatchServer>,
) -> Result<(), LobbyError> {
    let game = this.store.get(match_id).ok_or(LobbyError::NotFound)?;
    if !game.is_host(conn_id) {
        return Err(LobbyError::Forbidden("Only the host can start the game"));
    }
    if !game.can_start() {
        debug!(
            "[MatchServer] Cannot start {}: players={}, state={:?}",
            match_id,
            game.players.len(),
            game.state
        );
        return Err(LobbyError::InvalidState);
    }
    round::start_match(this, match_id, ctx);
    Ok(())
}

/// Explicit leave of the match the connection is currently in.
pub fn leave_lobby(
    this: &mut MatchServer,
    conn_id: ConnectionId,
    match_id: &str,
    ctx: &mut Context<MatchServer>,
) -> Result<(), LobbyError> {
    if this.registry.match_of(conn_id).map(String::as_str) != Some(match_id) {
        return Err(LobbyError::InvalidState);
    }
    leave_current(this, conn_id, ctx);
    Ok(())
}

/// Remove `conn_id` from the match it is bound to, if any.
///
/// A round in progress ends with the remaining player as winner. An emptied
/// match is destroyed with its pending timer; otherwise the host is re-elected
/// and the remaining member gets a snapshot and `playerLeft`.
pub fn leave_current(this: &mut MatchServer, conn_id: ConnectionId, ctx: &mut Context<MatchServer>) {
    let Some(match_id) = this.registry.unbind(conn_id) else {
        return;
    };
    let Some(game) = this.store.get_mut(&match_id) else {
        return;
    };

    let forfeit = game.forfeit(conn_id);
    let Some(departure) = game.remove_player(conn_id) else {
        return;
    };
    info!("[MatchServer] {} left {}", conn_id, match_id);

    if departure.emptied {
        this.store.remove(&match_id);
        this.cancel_timer(&match_id, ctx);
        info!("[MatchServer] Lobby {} destroyed (empty)", match_id);
        return;
    }
    if let Some(promoted) = departure.promoted {
        info!("[MatchServer] {} promoted to host of {}", promoted, match_id);
    }
    if let Some(outcome) = forfeit {
        info!("[MatchServer] Round in {} forfeited by {}", match_id, conn_id);
        this.cancel_timer(&match_id, ctx);
        round::announce_results(this, &match_id, outcome);
    }

    if let Some(game) = this.store.get(&match_id) {
        this.broadcaster.send_lobby_state(game);
        this.broadcaster.send_to_match(game, ServerWsMessage::PlayerLeft);
    }
}
