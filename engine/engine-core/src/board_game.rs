//! Shared types and the capability trait for two-player board games.
//!
//! Every game the search engine can learn implements [`BoardGame`]. The
//! engine never looks inside a game: it only replays states, asks for legal
//! moves and applies them. Board states travel as strings of base-3 digits
//! (`'0'` empty, `'1'` first player, `'2'` second player) so that the store
//! can pack them into fixed-width keys.

use thiserror::Error;

/// Errors reported by game implementations.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("unsupported board size: {0}")]
    UnsupportedSize(u8),

    #[error("no game registered as '{0}'")]
    UnknownGame(String),
}

/// A move on the board. When `pass` is set the coordinates are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub x: u8,
    pub y: u8,
    pub pass: bool,
}

impl Move {
    /// A pass move. Games that do not allow passing never receive it.
    pub const PASS: Move = Move {
        x: 0,
        y: 0,
        pass: true,
    };

    /// Place a piece at the given coordinates.
    pub fn place(x: u8, y: u8) -> Self {
        Self { x, y, pass: false }
    }
}

/// Result of applying a move or loading a state.
///
/// `winner` is `None` while the game is running and on a draw; when `done`
/// is set and `winner` is `Some`, it names the winning player.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    pub done: bool,
    pub winner: Option<String>,
}

impl MoveOutcome {
    pub fn ongoing() -> Self {
        Self::default()
    }

    pub fn draw() -> Self {
        Self {
            done: true,
            winner: None,
        }
    }

    pub fn won(player: &str) -> Self {
        Self {
            done: true,
            winner: Some(player.to_string()),
        }
    }
}

/// Capability trait consumed by the search engine.
///
/// Implementations own the full rules of one game. The engine drives them
/// through state replay: `set_state` must accept states with leading zeros
/// stripped (the store trims them) and left-pad back to the board size.
pub trait BoardGame: Send + std::fmt::Debug {
    /// Return to the initial position with the first player to move.
    fn reset(&mut self);

    /// Apply a move for the player in turn and evaluate the board.
    fn apply(&mut self, mv: Move) -> Result<MoveOutcome, GameError>;

    /// Legal moves for the player in turn.
    ///
    /// An empty list with the pass flag unset means the game is over; the
    /// pass flag set means the player has no placement and must pass.
    fn available_actions(&self) -> (Vec<(u8, u8)>, bool);

    /// The two player names in start order.
    fn players(&self) -> [String; 2];

    /// Override the player names (used when resuming a stored tree).
    fn set_players(&mut self, players: [String; 2]);

    /// Current board state as base-3 digits plus the player in turn.
    fn state(&self) -> (String, String);

    /// Load a board state and evaluate it as if it had just been reached.
    fn set_state(&mut self, state: &str, player_in_turn: &str) -> MoveOutcome;

    /// Number of cells on the board; states are padded to this length.
    fn cell_count(&self) -> usize;

    /// Human-readable board for console play.
    fn render(&self) -> String;
}
