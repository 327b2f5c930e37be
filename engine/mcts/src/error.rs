//! Error type for the search engine.

use engine_core::GameError;
use thiserror::Error;
use treestore::StoreError;

/// Errors that can occur while learning or playing.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("game error: {0}")]
    Game(#[from] GameError),

    /// The game and the stored tree disagree, e.g. a non-terminal state
    /// without legal moves. There is no recovery protocol.
    #[error("invalid search state: {0}")]
    InvalidState(String),

    #[error("malformed state file: {0}")]
    MalformedStateFile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
