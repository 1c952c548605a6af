/// Main configuration module.
/// 
/// Re-exports submodules for round timing, lobby limits and process settings.
pub mod game;
pub mod lobby;
pub mod server;
