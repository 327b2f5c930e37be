//! Error type for the tree store.

use thiserror::Error;

/// Errors that can occur in the tree store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The node map holds no record for a key the caller expected to exist.
    #[error("no node registered for state '{state}'")]
    NodeNotFound { state: String },

    /// An action carries the unassigned sentinel where a real actions
    /// address is required.
    #[error("unassigned actions address provided")]
    UnassignedAddress,

    /// Actions blocks address their records through a single count byte.
    #[error("actions block holds at most 255 records, got {0}")]
    BlockTooLarge(usize),

    /// A non-terminal node must never attach an empty actions block.
    #[error("refusing to write an empty actions block")]
    EmptyBlock,

    /// A store file failed validation on reopen.
    #[error("corrupt store file {path}: {reason}")]
    Corrupt { path: String, reason: String },
}
