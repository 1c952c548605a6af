//! Match domain: players, the lobby rules and the round state machine.
//!
//! Nothing here knows about actors or sockets; the match server drives these
//! types and turns their outcomes into client events.
pub mod types;
pub mod state;
