//! In-memory match table.
//!
//! Owns creation (with collision-free short codes) and deletion of matches.

use std::collections::HashMap;

use log::debug;
use rand::Rng;

use crate::config::lobby::{MATCH_ID_CHARSET, MATCH_ID_LEN};
use crate::game::state::Match;
use crate::game::types::{ConnectionId, MatchId};

/// Source of candidate match codes.
pub type IdGenerator = Box<dyn FnMut() -> MatchId>;

pub struct MatchStore {
    matches: HashMap<MatchId, Match>,
    next_id: IdGenerator,
}

impl Default for MatchStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchStore {
    pub fn new() -> Self {
        Self::with_id_generator(Box::new(random_match_id))
    }

    /// Use a custom code generator (tests use it to force collisions).
    pub fn with_id_generator(next_id: IdGenerator) -> Self {
        Self {
            matches: HashMap::new(),
            next_id,
        }
    }

    /// Create a match hosted by `host`, regenerating the code until it does
    /// not collide with a live match.
    pub fn create(&mut self, host: ConnectionId, display_name: &str) -> MatchId {
        let mut id = (self.next_id)();
        while self.matches.contains_key(&id) {
            debug!("[MatchStore] Code {} already in use, regenerating", id);
            id = (self.next_id)();
        }
        self.matches.insert(id.clone(), Match::new(id.clone(), host, display_name));
        id
    }

    pub fn get(&self, id: &str) -> Option<&Match> {
        self.matches.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Match> {
        self.matches.get_mut(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Match> {
        self.matches.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.matches.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }
}

/// Random code of `MATCH_ID_LEN` characters from `MATCH_ID_CHARSET`.
pub fn random_match_id() -> MatchId {
    let mut rng = rand::rng();
    (0..MATCH_ID_LEN)
        .map(|_| MATCH_ID_CHARSET[rng.random_range(0..MATCH_ID_CHARSET.len())] as char)
        .collect()
}
