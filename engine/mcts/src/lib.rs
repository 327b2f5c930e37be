//! Monte Carlo Tree Search over the persistent tree store.
//!
//! This crate drives learning for any game implementing the `engine-core`
//! `BoardGame` trait. Each learning round runs the four classic phases:
//!
//! 1. **Select**: walk the stored tree from the root action, choosing
//!    children by UCT (with a small uniform-random rate)
//! 2. **Expand**: attach every legal move of the selected leaf as new
//!    child nodes, merging transpositions through the store
//! 3. **Simulate**: play one uniformly random playout to the end
//! 4. **BackPropagate**: add the result to every action on the path
//!
//! Unlike an in-memory search, the tree lives entirely in the
//! `treestore` files; the only transient structure is the current select
//! path. Learning can therefore stop at any round boundary and resume
//! later: the run counters travel through a small `.state` text file,
//! and states whose value crossed the configured thresholds are flushed
//! to the AI journal for offline training.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mcts::{Journal, JournalSettings, RoundOutcome, SearchConfig, Tree};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//! use treestore::TreeStore;
//!
//! let game = games_tictactoe::TicTacToe::new(3, "X", "Y")?;
//! let (initial_state, _) = game.state();
//! let store = TreeStore::open("ttt", "X", "Y", &initial_state, 100_000, false)?;
//! let journal = Journal::new("ttt", JournalSettings::default(), 9);
//!
//! let mut tree = Tree::new(
//!     Box::new(game),
//!     store,
//!     journal,
//!     SearchConfig::default(),
//!     "ttt.state".into(),
//!     false,
//!     ChaCha20Rng::from_entropy(),
//! )?;
//!
//! while tree.learn_round()? == RoundOutcome::Learned {}
//! tree.shutdown()?;
//! ```

pub mod config;
pub mod error;
pub mod journal;
pub mod learn;
pub mod play;
pub mod tree;

// Re-export main types
pub use config::SearchConfig;
pub use error::SearchError;
pub use journal::{Journal, JournalSettings};
pub use learn::{RoundOutcome, Step};
pub use play::{PlayResult, PlayTree};
pub use tree::{RunState, Tree, TreeStats};
