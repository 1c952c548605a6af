/// Lobby configuration constants.
/// 
/// This module defines parameters for match lobbies, such as player limits
/// and the shape of generated match codes.
pub const MAX_PLAYERS: usize = 2; // Hard cap on concurrent members of a match.

/// Number of players required to start a round.
pub const REQUIRED_PLAYERS: usize = 2;

/// Length of a generated match code (e.g. "K7QX2M").
pub const MATCH_ID_LEN: usize = 6;

/// Characters used in match codes. Ambiguous glyphs (0/O, 1/I) are left out.
pub const MATCH_ID_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Display names longer than this are truncated.
pub const MAX_DISPLAY_NAME_LEN: usize = 24;
