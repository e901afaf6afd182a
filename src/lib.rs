// Public API for integration tests and potential library usage

pub mod classifier;
pub mod config;
pub mod game;
pub mod history;
pub mod lobby;
pub mod protocol;
pub mod state;
pub mod ticker;
pub mod types;
pub mod ws;
