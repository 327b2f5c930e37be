//! Game registration for the Arbor engine
//!
//! This crate provides a single initialization point for registering all
//! bundled games with the engine-core registry, plus the numeric game ids
//! the CLI and the stored tree names use.
//!
//! # Usage
//!
//! ```rust
//! use engine_games::{game_name, register_all_games};
//!
//! // Call once at startup - safe to call multiple times
//! register_all_games();
//! assert_eq!(game_name(0), Some("tictactoe"));
//! ```

use std::sync::Once;

static INIT: Once = Once::new();

/// Register all bundled games with the engine-core registry.
///
/// This function uses `std::sync::Once` to ensure registration only
/// happens once, even if called multiple times. Safe to call from
/// multiple threads.
///
/// Currently registers:
/// - TicTacToe (`"tictactoe"`, id 0)
/// - Othello (`"othello"`, id 1)
/// - Vertical four-in-a-row (`"connect4"`, id 2)
pub fn register_all_games() {
    INIT.call_once(|| {
        games_tictactoe::register_tictactoe();
        games_othello::register_othello();
        games_connect4::register_connect4();
    });
}

/// Registry name for a numeric game id, as used in tree file names.
pub fn game_name(id: u8) -> Option<&'static str> {
    match id {
        0 => Some("tictactoe"),
        1 => Some("othello"),
        2 => Some("connect4"),
        _ => None,
    }
}

// Re-export individual registration functions for advanced use cases
pub use games_connect4::register_connect4;
pub use games_othello::register_othello;
pub use games_tictactoe::register_tictactoe;
