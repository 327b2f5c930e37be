//! Core traits and types for the Arbor game engine
//!
//! This crate provides the fundamental abstractions for game-tree learning:
//! - `BoardGame`: capability trait the search engine drives games through
//! - `Move` / `MoveOutcome`: the move vocabulary shared by engine and store
//! - `Registry`: static registration system for games

pub mod board_game;
pub mod registry;

// Re-export main types for convenience
pub use board_game::{BoardGame, GameError, Move, MoveOutcome};
pub use registry::{
    clear_registry, create_game, is_registered, list_registered_games, register_game, GameFactory,
    GameOptions,
};
