use std::time::Duration;

use actix::prelude::*;
use actix::MessageResult;
use uuid::Uuid;

use super::messages::{
    ClientEvent, ClientWsMessage, Connect, Disconnect, GetMatch, MatchCount, ServerWsMessage,
};
use super::server::MatchServer;
use crate::config::game::RoundTiming;
use crate::game::state::Match;
use crate::game::types::{ConnectionId, MatchState, RoundResult};
use crate::server::store::MatchStore;

/// Stands in for a client session and records everything it is sent.
#[derive(Default)]
struct Recorder {
    inbox: Vec<ServerWsMessage>,
}

impl Actor for Recorder {
    type Context = Context<Self>;
}

impl Handler<ServerWsMessage> for Recorder {
    type Result = ();

    fn handle(&mut self, msg: ServerWsMessage, _ctx: &mut Self::Context) {
        self.inbox.push(msg);
    }
}

#[derive(Message)]
#[rtype(result = "Vec<ServerWsMessage>")]
struct Drain;

impl Handler<Drain> for Recorder {
    type Result = MessageResult<Drain>;

    fn handle(&mut self, _msg: Drain, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(std::mem::take(&mut self.inbox))
    }
}

struct TestClient {
    id: ConnectionId,
    recorder: Addr<Recorder>,
    server: Addr<MatchServer>,
}

impl TestClient {
    async fn connect(server: &Addr<MatchServer>) -> Self {
        let recorder = Recorder::default().start();
        let id = Uuid::new_v4();
        server
            .send(Connect {
                conn_id: id,
                addr: recorder.clone().recipient(),
            })
            .await
            .unwrap();
        Self {
            id,
            recorder,
            server: server.clone(),
        }
    }

    async fn send(&self, event: ClientWsMessage) {
        self.server
            .send(ClientEvent {
                conn_id: self.id,
                event,
            })
            .await
            .unwrap();
    }

    /// Enqueue without waiting for the server to process it.
    fn send_now(&self, event: ClientWsMessage) {
        self.server.do_send(ClientEvent {
            conn_id: self.id,
            event,
        });
    }

    async fn disconnect(&self) {
        self.server.send(Disconnect { conn_id: self.id }).await.unwrap();
    }

    /// Everything received since the last drain.
    async fn drain(&self) -> Vec<ServerWsMessage> {
        self.recorder.send(Drain).await.unwrap()
    }
}

fn fast_timing(green_delay: Duration) -> RoundTiming {
    RoundTiming::fixed(Duration::from_millis(10), green_delay)
}

/// Match server whose codes are "ABC123", "ABC124", ...
fn start_server(timing: RoundTiming) -> Addr<MatchServer> {
    let mut next = 123;
    let store = MatchStore::with_id_generator(Box::new(move || {
        let id = format!("ABC{}", next);
        next += 1;
        id
    }));
    MatchServer::with_store(store, timing).start()
}

async fn get_match(server: &Addr<MatchServer>, match_id: &str) -> Option<Match> {
    server
        .send(GetMatch {
            match_id: match_id.to_string(),
        })
        .await
        .unwrap()
}

async fn wait_for_state(server: &Addr<MatchServer>, match_id: &str, state: MatchState) {
    for _ in 0..400 {
        if get_match(server, match_id).await.is_some_and(|m| m.state == state) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("match {} never reached {:?}", match_id, state);
}

/// A hosts "ABC123", B joins and readies up, which starts the round.
async fn started_match(server: &Addr<MatchServer>) -> (TestClient, TestClient) {
    let a = TestClient::connect(server).await;
    let b = TestClient::connect(server).await;
    a.send(ClientWsMessage::CreateLobby("Alice".to_string())).await;
    b.send(join("ABC123", "Bob")).await;
    b.send(ClientWsMessage::ToggleReady("ABC123".to_string())).await;
    (a, b)
}

fn join(match_id: &str, name: &str) -> ClientWsMessage {
    ClientWsMessage::JoinLobby {
        match_id: match_id.to_string(),
        display_name: name.to_string(),
    }
}

fn click(match_id: &str) -> ClientWsMessage {
    ClientWsMessage::PlayerClick(match_id.to_string())
}

fn states(msgs: &[ServerWsMessage]) -> Vec<MatchState> {
    msgs.iter()
        .filter_map(|m| match m {
            ServerWsMessage::GameState(s) => Some(*s),
            _ => None,
        })
        .collect()
}

fn results(msgs: &[ServerWsMessage]) -> Vec<(Option<ConnectionId>, RoundResult)> {
    msgs.iter()
        .filter_map(|m| match m {
            ServerWsMessage::GameResult { winner_id, result, .. } => Some((*winner_id, *result)),
            _ => None,
        })
        .collect()
}

fn error_codes(msgs: &[ServerWsMessage]) -> Vec<String> {
    msgs.iter()
        .filter_map(|m| match m {
            ServerWsMessage::Error { code, .. } => Some(code.clone()),
            _ => None,
        })
        .collect()
}

fn last_lobby_state(msgs: &[ServerWsMessage]) -> Option<&crate::game::types::LobbySnapshot> {
    msgs.iter().rev().find_map(|m| match m {
        ServerWsMessage::LobbyState(snapshot) => Some(snapshot),
        _ => None,
    })
}

#[actix::test]
async fn test_full_round_first_green_click_wins() {
    let server = start_server(fast_timing(Duration::from_millis(30)));
    let a = TestClient::connect(&server).await;
    let b = TestClient::connect(&server).await;

    a.send(ClientWsMessage::CreateLobby("Alice".to_string())).await;
    let created = a.drain().await;
    assert_eq!(created[0], ServerWsMessage::LobbyCreated("ABC123".to_string()));
    assert_eq!(last_lobby_state(&created).unwrap().players.len(), 1);

    b.send(join("ABC123", "Bob")).await;
    let joined = b.drain().await;
    let snapshot = last_lobby_state(&joined).unwrap();
    assert_eq!(snapshot.players.len(), 2);
    assert_eq!(snapshot.state, MatchState::Waiting);
    let bob = snapshot.players.iter().find(|p| p.id == b.id).unwrap();
    assert!(!bob.is_ready);
    assert!(!bob.is_host);

    b.send(ClientWsMessage::ToggleReady("ABC123".to_string())).await;
    wait_for_state(&server, "ABC123", MatchState::Green).await;
    a.send(click("ABC123")).await;
    b.send(click("ABC123")).await;

    let a_msgs = a.drain().await;
    let countdown: Vec<u32> = a_msgs
        .iter()
        .filter_map(|m| match m {
            ServerWsMessage::Countdown(n) => Some(*n),
            _ => None,
        })
        .collect();
    assert_eq!(countdown, vec![3, 2, 1]);
    assert!(a_msgs.contains(&ServerWsMessage::GameStart("ABC123".to_string())));
    assert_eq!(
        states(&a_msgs),
        vec![
            MatchState::Countdown,
            MatchState::Red,
            MatchState::Green,
            MatchState::Finished
        ]
    );
    assert_eq!(results(&a_msgs), vec![(Some(a.id), RoundResult::Win)]);

    let b_msgs = b.drain().await;
    assert_eq!(results(&b_msgs), vec![(Some(a.id), RoundResult::Lose)]);

    let game = get_match(&server, "ABC123").await.unwrap();
    assert_eq!(game.state, MatchState::Finished);
    assert_eq!(game.winner_id, Some(a.id));
}

#[actix::test]
async fn test_click_during_red_is_false_start() {
    let server = start_server(fast_timing(Duration::from_secs(30)));
    let (a, b) = started_match(&server).await;
    wait_for_state(&server, "ABC123", MatchState::Red).await;

    b.send(click("ABC123")).await;
    a.send(click("ABC123")).await;

    let game = get_match(&server, "ABC123").await.unwrap();
    assert_eq!(game.state, MatchState::Finished);
    assert_eq!(game.winner_id, Some(a.id));
    assert_eq!(results(&a.drain().await), vec![(Some(a.id), RoundResult::Win)]);
    assert_eq!(results(&b.drain().await), vec![(Some(a.id), RoundResult::Lose)]);
}

#[actix::test]
async fn test_simultaneous_green_clicks_have_one_winner() {
    let server = start_server(fast_timing(Duration::from_millis(20)));
    let (a, b) = started_match(&server).await;
    wait_for_state(&server, "ABC123", MatchState::Green).await;

    b.send_now(click("ABC123"));
    a.send_now(click("ABC123"));

    let game = get_match(&server, "ABC123").await.unwrap();
    assert_eq!(game.state, MatchState::Finished);
    assert_eq!(game.winner_id, Some(b.id));

    let a_results = results(&a.drain().await);
    let b_results = results(&b.drain().await);
    assert_eq!(a_results, vec![(Some(b.id), RoundResult::Lose)]);
    assert_eq!(b_results, vec![(Some(b.id), RoundResult::Win)]);
}

#[actix::test]
async fn test_clicks_outside_round_change_nothing() {
    let server = start_server(RoundTiming::fixed(Duration::from_secs(5), Duration::from_secs(30)));
    let a = TestClient::connect(&server).await;
    let b = TestClient::connect(&server).await;
    a.send(ClientWsMessage::CreateLobby("Alice".to_string())).await;
    b.send(join("ABC123", "Bob")).await;
    a.drain().await;

    a.send(click("ABC123")).await;
    assert!(a.drain().await.is_empty());
    assert_eq!(get_match(&server, "ABC123").await.unwrap().state, MatchState::Waiting);

    b.send(ClientWsMessage::ToggleReady("ABC123".to_string())).await;
    a.send(click("ABC123")).await;
    let game = get_match(&server, "ABC123").await.unwrap();
    assert_eq!(game.state, MatchState::Countdown);
    assert_eq!(game.winner_id, None);
}

#[actix::test]
async fn test_join_errors() {
    let server = start_server(RoundTiming::default());
    let a = TestClient::connect(&server).await;
    let b = TestClient::connect(&server).await;
    let c = TestClient::connect(&server).await;

    c.send(join("NOPE99", "Carol")).await;
    assert_eq!(error_codes(&c.drain().await), vec!["NOT_FOUND".to_string()]);

    a.send(ClientWsMessage::CreateLobby("Alice".to_string())).await;
    b.send(join("ABC123", "Bob")).await;
    c.send(join("ABC123", "Carol")).await;
    assert_eq!(error_codes(&c.drain().await), vec!["FULL".to_string()]);
    assert_eq!(get_match(&server, "ABC123").await.unwrap().players.len(), 2);
}

#[actix::test]
async fn test_rejoin_resends_snapshot() {
    let server = start_server(RoundTiming::default());
    let a = TestClient::connect(&server).await;
    let b = TestClient::connect(&server).await;
    a.send(ClientWsMessage::CreateLobby("Alice".to_string())).await;
    b.send(join("ABC123", "Bob")).await;
    b.drain().await;

    b.send(join("ABC123", "Bob")).await;
    let msgs = b.drain().await;
    assert!(error_codes(&msgs).is_empty());
    assert_eq!(last_lobby_state(&msgs).unwrap().players.len(), 2);
}

#[actix::test]
async fn test_start_game_is_host_only() {
    let server = start_server(fast_timing(Duration::from_secs(30)));
    let a = TestClient::connect(&server).await;
    let b = TestClient::connect(&server).await;
    a.send(ClientWsMessage::CreateLobby("Alice".to_string())).await;

    // Alone: silently ignored.
    a.send(ClientWsMessage::StartGame("ABC123".to_string())).await;
    b.send(join("ABC123", "Bob")).await;
    // Guest not ready: silently ignored.
    a.send(ClientWsMessage::StartGame("ABC123".to_string())).await;
    assert!(error_codes(&a.drain().await).is_empty());
    assert_eq!(get_match(&server, "ABC123").await.unwrap().state, MatchState::Waiting);

    b.send(ClientWsMessage::StartGame("ABC123".to_string())).await;
    assert_eq!(error_codes(&b.drain().await), vec!["FORBIDDEN".to_string()]);
    assert_eq!(get_match(&server, "ABC123").await.unwrap().state, MatchState::Waiting);
}

#[actix::test]
async fn test_host_cannot_toggle_ready() {
    let server = start_server(RoundTiming::default());
    let a = TestClient::connect(&server).await;
    a.send(ClientWsMessage::CreateLobby("Alice".to_string())).await;
    a.drain().await;

    a.send(ClientWsMessage::ToggleReady("ABC123".to_string())).await;
    assert!(a.drain().await.is_empty());
    let game = get_match(&server, "ABC123").await.unwrap();
    assert!(game.players[0].is_ready);
}

#[actix::test]
async fn test_explicit_start_after_auto_start_is_ignored() {
    let server = start_server(fast_timing(Duration::from_secs(30)));
    let (a, _b) = started_match(&server).await;
    a.send(ClientWsMessage::StartGame("ABC123".to_string())).await;

    let msgs = a.drain().await;
    let starts = msgs
        .iter()
        .filter(|m| matches!(m, ServerWsMessage::GameStart(_)))
        .count();
    assert_eq!(starts, 1);
    assert_eq!(get_match(&server, "ABC123").await.unwrap().round, 1);
}

#[actix::test]
async fn test_rematch_resets_to_lobby() {
    let server = start_server(fast_timing(Duration::from_millis(20)));
    let (a, b) = started_match(&server).await;

    // Rematch is meaningless mid-round.
    b.send(ClientWsMessage::RequestRematch("ABC123".to_string())).await;
    assert_ne!(get_match(&server, "ABC123").await.unwrap().state, MatchState::Waiting);

    wait_for_state(&server, "ABC123", MatchState::Green).await;
    a.send(click("ABC123")).await;
    b.send(ClientWsMessage::RequestRematch("ABC123".to_string())).await;

    let game = get_match(&server, "ABC123").await.unwrap();
    assert_eq!(game.state, MatchState::Waiting);
    assert_eq!(game.winner_id, None);
    assert_eq!(game.round_start_time, None);
    assert_eq!(game.players.len(), 2);
    assert!(game.is_host(a.id));
    assert!(!game.player(b.id).unwrap().is_ready);

    let a_msgs = a.drain().await;
    assert_eq!(states(&a_msgs).last(), Some(&MatchState::Waiting));
    assert_eq!(last_lobby_state(&a_msgs).unwrap().state, MatchState::Waiting);

    // A second round can be played.
    b.send(ClientWsMessage::ToggleReady("ABC123".to_string())).await;
    wait_for_state(&server, "ABC123", MatchState::Green).await;
    assert_eq!(get_match(&server, "ABC123").await.unwrap().round, 2);
}

#[actix::test]
async fn test_host_disconnect_promotes_guest() {
    let server = start_server(RoundTiming::default());
    let a = TestClient::connect(&server).await;
    let b = TestClient::connect(&server).await;
    a.send(ClientWsMessage::CreateLobby("Alice".to_string())).await;
    b.send(join("ABC123", "Bob")).await;
    b.drain().await;

    a.disconnect().await;
    let msgs = b.drain().await;
    let snapshot = last_lobby_state(&msgs).unwrap();
    assert_eq!(snapshot.players.len(), 1);
    assert!(snapshot.players[0].is_host);
    assert!(snapshot.players[0].is_ready);
    assert_eq!(msgs.last(), Some(&ServerWsMessage::PlayerLeft));
    assert_eq!(server.send(MatchCount).await.unwrap(), 1);

    b.disconnect().await;
    assert_eq!(server.send(MatchCount).await.unwrap(), 0);
    assert!(get_match(&server, "ABC123").await.is_none());
}

#[actix::test]
async fn test_disconnect_mid_round_awards_remaining_player() {
    let server = start_server(fast_timing(Duration::from_millis(60)));
    let (a, b) = started_match(&server).await;
    wait_for_state(&server, "ABC123", MatchState::Red).await;
    b.drain().await;

    a.disconnect().await;
    let msgs = b.drain().await;
    assert_eq!(results(&msgs), vec![(Some(b.id), RoundResult::Win)]);
    assert_eq!(states(&msgs), vec![MatchState::Finished]);
    assert_eq!(msgs.last(), Some(&ServerWsMessage::PlayerLeft));

    // The pending green transition must not fire on the finished match.
    tokio::time::sleep(Duration::from_millis(150)).await;
    let game = get_match(&server, "ABC123").await.unwrap();
    assert_eq!(game.state, MatchState::Finished);
    assert_eq!(game.winner_id, Some(b.id));
    assert!(game.is_host(b.id));
    assert!(states(&b.drain().await).is_empty());
}

#[actix::test]
async fn test_match_destroyed_with_pending_timer() {
    let server = start_server(fast_timing(Duration::from_millis(20)));
    let (a, b) = started_match(&server).await;

    a.disconnect().await;
    b.disconnect().await;
    assert_eq!(server.send(MatchCount).await.unwrap(), 0);

    // Stale timers of the destroyed match must not touch the next one.
    let c = TestClient::connect(&server).await;
    c.send(ClientWsMessage::CreateLobby("Carol".to_string())).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let game = get_match(&server, "ABC124").await.unwrap();
    assert_eq!(game.state, MatchState::Waiting);
    assert!(states(&c.drain().await).is_empty());
}

#[actix::test]
async fn test_joining_another_match_leaves_the_first() {
    let server = start_server(RoundTiming::default());
    let a = TestClient::connect(&server).await;
    let b = TestClient::connect(&server).await;
    let c = TestClient::connect(&server).await;

    a.send(ClientWsMessage::CreateLobby("Alice".to_string())).await; // ABC123
    c.send(join("ABC123", "Carol")).await;
    b.send(ClientWsMessage::CreateLobby("Bob".to_string())).await; // ABC124
    c.drain().await;

    a.send(join("ABC124", "Alice")).await;

    let first = get_match(&server, "ABC123").await.unwrap();
    assert_eq!(first.players.len(), 1);
    assert!(first.is_host(c.id));
    let c_msgs = c.drain().await;
    assert_eq!(c_msgs.last(), Some(&ServerWsMessage::PlayerLeft));

    let second = get_match(&server, "ABC124").await.unwrap();
    assert!(second.is_member(a.id));
    assert!(second.is_host(b.id));

    // Creating a new lobby leaves the current one too; ABC124 keeps Bob.
    a.send(ClientWsMessage::CreateLobby("Alice".to_string())).await; // ABC125
    assert_eq!(get_match(&server, "ABC124").await.unwrap().players.len(), 1);
    assert_eq!(server.send(MatchCount).await.unwrap(), 3);
}

#[actix::test]
async fn test_full_lobby_rejection_keeps_current_membership() {
    let server = start_server(RoundTiming::default());
    let a = TestClient::connect(&server).await;
    let b = TestClient::connect(&server).await;
    let c = TestClient::connect(&server).await;

    a.send(ClientWsMessage::CreateLobby("Alice".to_string())).await; // ABC123
    b.send(join("ABC123", "Bob")).await;
    c.send(ClientWsMessage::CreateLobby("Carol".to_string())).await; // ABC124

    c.send(join("ABC123", "Carol")).await;
    assert_eq!(error_codes(&c.drain().await), vec!["FULL".to_string()]);
    assert!(get_match(&server, "ABC124").await.unwrap().is_member(c.id));
}

#[actix::test]
async fn test_leave_lobby() {
    let server = start_server(RoundTiming::default());
    let a = TestClient::connect(&server).await;
    let b = TestClient::connect(&server).await;
    a.send(ClientWsMessage::CreateLobby("Alice".to_string())).await;
    b.send(join("ABC123", "Bob")).await;
    a.drain().await;

    b.send(ClientWsMessage::LeaveLobby("ABC123".to_string())).await;
    let msgs = a.drain().await;
    assert_eq!(last_lobby_state(&msgs).unwrap().players.len(), 1);
    assert_eq!(msgs.last(), Some(&ServerWsMessage::PlayerLeft));

    // Leaving again is a silent no-op.
    b.send(ClientWsMessage::LeaveLobby("ABC123".to_string())).await;
    assert!(b.drain().await.iter().all(|m| !matches!(m, ServerWsMessage::Error { .. })));
}

#[actix::test]
async fn test_non_member_cannot_click() {
    let server = start_server(fast_timing(Duration::from_secs(30)));
    let (_a, _b) = started_match(&server).await;
    let outsider = TestClient::connect(&server).await;
    wait_for_state(&server, "ABC123", MatchState::Red).await;

    outsider.send(click("ABC123")).await;
    assert_eq!(error_codes(&outsider.drain().await), vec!["FORBIDDEN".to_string()]);
    assert_eq!(get_match(&server, "ABC123").await.unwrap().state, MatchState::Red);
}
