/// Match session module: lobby membership, readiness, the timed round and
/// click arbitration, plus the WebSocket session that feeds them.

pub mod server;
pub mod session;
pub mod messages;
pub mod lobby;
pub mod round;

#[cfg(test)]
mod tests;

pub use server::MatchServer;
