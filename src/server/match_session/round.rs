/// Round lifecycle for the MatchServer: countdown, red, green, click
/// arbitration, results and rematch.
///
/// Timer callbacks carry the round number they were scheduled for and check
/// it together with the state before acting, so a callback that outlived its
/// round (rematch, early finish, destroyed match) does nothing.

use std::time::Instant;

use actix::prelude::*;
use log::{debug, info};

use super::messages::ServerWsMessage;
use super::server::MatchServer;
use crate::game::state::RoundOutcome;
use crate::game::types::{ConnectionId, MatchState};
use crate::server::ws_error::LobbyError;

/// waiting -> countdown, then schedule the first countdown tick.
pub fn start_match(this: &mut MatchServer, match_id: &str, ctx: &mut Context<MatchServer>) {
    let Some(game) = this.store.get_mut(match_id) else {
        return;
    };
    let Ok(round) = game.begin_countdown() else {
        return;
    };
    info!("[MatchServer] Round {} of {} starting", round, match_id);

    this.broadcaster.send_to_match(game, ServerWsMessage::GameStart(match_id.to_string()));
    this.broadcaster.send_to_match(game, ServerWsMessage::GameState(MatchState::Countdown));
    let from = this.timing.countdown_from;
    schedule_countdown_tick(this, match_id, round, from, ctx);
}

fn schedule_countdown_tick(
    this: &mut MatchServer,
    match_id: &str,
    round: u32,
    value: u32,
    ctx: &mut Context<MatchServer>,
) {
    let id = match_id.to_string();
    let handle = ctx.run_later(this.timing.countdown_tick, move |act, ctx| {
        countdown_tick(act, &id, round, value, ctx);
    });
    this.set_timer(match_id, handle);
}

/// Broadcast `value`, or enter red once the countdown is exhausted.
fn countdown_tick(
    this: &mut MatchServer,
    match_id: &str,
    round: u32,
    value: u32,
    ctx: &mut Context<MatchServer>,
) {
    let Some(game) = this.store.get(match_id) else {
        return;
    };
    if game.round != round || game.state != MatchState::Countdown {
        debug!("[MatchServer] Stale countdown tick for {} ignored", match_id);
        return;
    }
    if value == 0 {
        enter_red(this, match_id, round, ctx);
        return;
    }
    debug!("[MatchServer] Countdown {} in {}", value, match_id);
    this.broadcaster.send_to_match(game, ServerWsMessage::Countdown(value));
    schedule_countdown_tick(this, match_id, round, value - 1, ctx);
}

/// countdown -> red, and schedule green after a randomized delay.
fn enter_red(this: &mut MatchServer, match_id: &str, round: u32, ctx: &mut Context<MatchServer>) {
    let Some(game) = this.store.get_mut(match_id) else {
        return;
    };
    if !game.enter_red(round) {
        return;
    }
    this.broadcaster.send_to_match(game, ServerWsMessage::GameState(MatchState::Red));

    let delay = this.timing.draw_green_delay();
    debug!("[MatchServer] {} turns green in {:?}", match_id, delay);
    let id = match_id.to_string();
    let handle = ctx.run_later(delay, move |act, _ctx| {
        enter_green(act, &id, round);
    });
    this.set_timer(match_id, handle);
}

/// red -> green, unless someone already false-started.
fn enter_green(this: &mut MatchServer, match_id: &str, round: u32) {
    let Some(game) = this.store.get_mut(match_id) else {
        return;
    };
    if !game.enter_green(round, Instant::now()) {
        debug!("[MatchServer] Stale green transition for {} ignored", match_id);
        return;
    }
    this.timers.remove(match_id);
    this.broadcaster.send_to_match(game, ServerWsMessage::GameState(MatchState::Green));
}

/// Arbitrate a click. The first click in red or green finishes the round;
/// anything else is an `InvalidState` no-op.
pub fn player_click(
    this: &mut MatchServer,
    conn_id: ConnectionId,
    match_id: &str,
    ctx: &mut Context<MatchServer>,
) -> Result<(), LobbyError> {
    let game = this.store.get_mut(match_id).ok_or(LobbyError::NotFound)?;
    if !game.is_member(conn_id) {
        return Err(LobbyError::Forbidden("You are not a player in this match"));
    }
    let outcome = game
        .arbitrate_click(conn_id, Instant::now())
        .ok_or(LobbyError::InvalidState)?;

    if outcome.false_start {
        info!("[MatchServer] {} false-started in {}", conn_id, match_id);
    } else {
        info!("[MatchServer] {} clicked first in {} ({:?})", conn_id, match_id, outcome.reaction);
    }
    this.cancel_timer(match_id, ctx);
    announce_results(this, match_id, outcome);
    Ok(())
}

/// Send each player their personalized result, then `finished` to the match.
pub fn announce_results(this: &MatchServer, match_id: &str, outcome: RoundOutcome) {
    let Some(game) = this.store.get(match_id) else {
        return;
    };
    info!("[MatchServer] Results for {}: winner={:?}", match_id, outcome.winner_id);
    let reaction_ms = outcome.reaction.map(|d| d.as_millis() as u64);
    for (player_id, result) in game.results() {
        this.broadcaster.send_to(
            player_id,
            ServerWsMessage::GameResult {
                winner_id: outcome.winner_id,
                result,
                reaction_ms,
            },
        );
    }
    this.broadcaster.send_to_match(game, ServerWsMessage::GameState(MatchState::Finished));
}

/// finished -> waiting, keeping membership and host.
pub fn request_rematch(
    this: &mut MatchServer,
    conn_id: ConnectionId,
    match_id: &str,
    ctx: &mut Context<MatchServer>,
) -> Result<(), LobbyError> {
    let game = this.store.get_mut(match_id).ok_or(LobbyError::NotFound)?;
    if !game.is_member(conn_id) {
        return Err(LobbyError::Forbidden("You are not a player in this match"));
    }
    game.reset_for_rematch()?;
    info!("[MatchServer] Rematch requested in {} by {}", match_id, conn_id);

    this.broadcaster.send_to_match(game, ServerWsMessage::GameState(MatchState::Waiting));
    this.broadcaster.send_lobby_state(game);
    this.cancel_timer(match_id, ctx);
    Ok(())
}
