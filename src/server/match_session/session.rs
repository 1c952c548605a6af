/// WebSocket session handler for a player connection.
///
/// This actor owns a single client connection: it registers with the match
/// server on start, decodes client events and forwards them, serializes
/// server events back to the client, and reports the disconnect on stop.
use std::time::Instant;

use actix::prelude::*;
use actix_web::{Error, HttpRequest, HttpResponse, web};
use actix_web_actors::ws;
use log::{debug, warn};
use uuid::Uuid;

use super::messages::{ClientEvent, ClientWsMessage, Connect, Disconnect, ServerWsMessage};
use super::server::MatchServer;
use crate::config::server::{CLIENT_TIMEOUT, HEARTBEAT_INTERVAL};
use crate::game::types::ConnectionId;
use crate::server::ws_error::ws_error_message;

pub struct PlayerSession {
    pub conn_id: ConnectionId,
    pub match_server: Addr<MatchServer>,
    /// Last time the client showed signs of life.
    last_seen: Instant,
}

impl PlayerSession {
    pub fn new(match_server: Addr<MatchServer>) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            match_server,
            last_seen: Instant::now(),
        }
    }

    /// Ping the client periodically and drop it once it goes silent.
    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.last_seen) > CLIENT_TIMEOUT {
                warn!("[Session] {} timed out", act.conn_id);
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for PlayerSession {
    type Context = ws::WebsocketContext<Self>;

    /// Registers the connection with the match server.
    fn started(&mut self, ctx: &mut Self::Context) {
        debug!("[Session] {} connected", self.conn_id);
        self.heartbeat(ctx);
        self.match_server.do_send(Connect {
            conn_id: self.conn_id,
            addr: ctx.address().recipient(),
        });
    }

    /// Runs the leave path on the match server, whatever the cause of the stop.
    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.match_server.do_send(Disconnect { conn_id: self.conn_id });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for PlayerSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                warn!("[Session] {} protocol error: {}", self.conn_id, e);
                ctx.stop();
                return;
            }
        };
        self.last_seen = Instant::now();
        match msg {
            ws::Message::Text(text) => match serde_json::from_str::<ClientWsMessage>(&text) {
                Ok(ClientWsMessage::Ping) => {}
                Ok(event) => {
                    self.match_server.do_send(ClientEvent {
                        conn_id: self.conn_id,
                        event,
                    });
                }
                Err(e) => {
                    debug!("[Session] {} sent an invalid message: {}", self.conn_id, e);
                    ctx.text(ws_error_message("INVALID_MESSAGE", "Invalid client message"));
                }
            },
            ws::Message::Ping(bytes) => ctx.pong(&bytes),
            ws::Message::Pong(_) => {}
            ws::Message::Close(reason) => {
                ctx.close(reason);
                ctx.stop();
            }
            _ => (),
        }
    }
}

impl Handler<ServerWsMessage> for PlayerSession {
    type Result = ();

    /// Serializes a server event to the client.
    fn handle(&mut self, msg: ServerWsMessage, ctx: &mut Self::Context) {
        match serde_json::to_string(&msg) {
            Ok(text) => ctx.text(text),
            Err(e) => {
                warn!("[Session] Failed to serialize {:?}: {}", msg, e);
                ctx.text(ws_error_message("INTERNAL", "Internal server error"));
            }
        }
    }
}

/// WebSocket endpoint. Each upgrade gets a fresh connection id.
pub async fn ws_match(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<crate::server::state::AppState>,
) -> Result<HttpResponse, Error> {
    ws::start(PlayerSession::new(data.match_server.clone()), &req, stream)
}
