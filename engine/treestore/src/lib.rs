//! Persistent, deduplicated game-tree store
//!
//! This crate persists a Monte Carlo search tree to disk in a fixed-layout
//! binary format so that learning can be interrupted and resumed, and the
//! finished tree can be replayed for exploit-only play.
//!
//! # Layout
//!
//! A tree is three files sharing a name prefix:
//!
//! - `<name>-map.bin` / `<name>-ovfl.bin`: a bucket-addressed hash map from
//!   17-byte node keys (packed state plus player-to-move bit) to 9-byte
//!   node values (terminal flag plus actions address), with collision
//!   chains in the overflow file
//! - `<name>-actions.bin`: an append-only log of actions blocks, each a
//!   count byte followed by 36-byte action records
//!
//! Content-addressed keys merge transpositions: any two move orders that
//! reach the same position share a single node record.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      TreeStore                      │
//! ├─────────────────────────────────────────────────────┤
//! │  ┌─────────────────────┐  ┌───────────────────────┐ │
//! │  │   DiskMap<17, 9>    │  │      ActionsLog       │ │
//! │  │ (node key → value)  │  │ (blocks of records)   │ │
//! │  └──────────┬──────────┘  └───────────┬───────────┘ │
//! │             │                         │             │
//! │       codec + record          record + stats        │
//! │      (byte packing)          (in-place update)      │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod actions;
pub mod codec;
pub mod diskmap;
pub mod error;
pub mod record;
pub mod store;

// Re-export main types
pub use actions::ActionsLog;
pub use diskmap::DiskMap;
pub use error::StoreError;
pub use record::{ActionRecord, NodeKey, NodeValue, ACTION_LEN, NODE_KEY_LEN, NODE_VALUE_LEN, UNASSIGNED};
pub use store::{Action, Attached, Node, TreeStore, ROOT_SENTINEL};
