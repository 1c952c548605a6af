// src/server/mod.rs

//! Server layer root module.
//!
//! This module organizes the backend server components, including:
//! - Application state management
//! - HTTP/WebSocket routing
//! - The connection registry, match store and broadcast fan-out
//! - The match server (lobby, readiness, rounds, arbitration)

pub mod state;
pub mod router;
pub mod registry;
pub mod store;
pub mod broadcast;
pub mod match_session;
pub mod ws_error;
