//! Connection -> match index.
//!
//! A connection is bound to at most one match. Rebinding returns the previous
//! binding so the caller can run that match's removal path first.

use std::collections::HashMap;

use crate::game::types::{ConnectionId, MatchId};

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    bindings: HashMap<ConnectionId, MatchId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `conn` to `match_id`. Returns the match it was previously bound
    /// to, if that was a different one.
    pub fn bind(&mut self, conn: ConnectionId, match_id: MatchId) -> Option<MatchId> {
        let previous = self.bindings.insert(conn, match_id.clone());
        previous.filter(|prev| *prev != match_id)
    }

    pub fn unbind(&mut self, conn: ConnectionId) -> Option<MatchId> {
        self.bindings.remove(&conn)
    }

    pub fn match_of(&self, conn: ConnectionId) -> Option<&MatchId> {
        self.bindings.get(&conn)
    }

    /// Whether `conn` is bound to a match other than `match_id`.
    pub fn is_bound_elsewhere(&self, conn: ConnectionId, match_id: &str) -> bool {
        self.match_of(conn).is_some_and(|bound| bound != match_id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}
