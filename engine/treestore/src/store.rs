//! The persistent game-tree store.
//!
//! Composes the actions log and the node map into the operations the
//! search engine needs. Nodes are addressed by content (state plus
//! player-to-move), so two move orders reaching the same position share
//! one node record and the tree becomes a DAG on disk.
//!
//! A tree is three files sharing a name prefix: `<name>-map.bin`,
//! `<name>-ovfl.bin` and `<name>-actions.bin`. A fresh tree is seeded with
//! one synthetic root action (coordinates 0xFF/0xFF) whose child is the
//! game's initial state; that block always sits at address 0.

use std::path::{Path, PathBuf};

use engine_core::Move;
use tracing::{info, warn};

use crate::actions::ActionsLog;
use crate::diskmap::DiskMap;
use crate::error::StoreError;
use crate::record::{ActionRecord, NodeKey, NodeValue, NODE_KEY_LEN, NODE_VALUE_LEN, UNASSIGNED};

/// Coordinate marking the synthetic root action.
pub const ROOT_SENTINEL: u8 = u8::MAX;

/// A stored node, hydrated with its action list when expanded.
#[derive(Debug, Clone)]
pub struct Node {
    pub state: String,
    pub player: String,
    pub is_end: bool,
    pub actions_addr: u64,
    /// Empty while the node is unexpanded.
    pub actions: Vec<Action>,
}

/// A stored action: the record contents plus where the record lives.
#[derive(Debug, Clone)]
pub struct Action {
    pub visits: u64,
    /// Doubled points; a win adds 2, a draw 1.
    pub points: u64,
    pub x: u8,
    pub y: u8,
    pub pass: bool,
    pub child_key: NodeKey,
    /// Position of the record within its block.
    pub index: u64,
    /// Address of the block holding the record.
    pub actions_addr: u64,
}

impl Action {
    fn from_record(record: ActionRecord, index: u64, actions_addr: u64) -> Self {
        Self {
            visits: record.visits,
            points: record.points,
            x: record.x,
            y: record.y,
            pass: record.pass,
            child_key: record.child_key,
            index,
            actions_addr,
        }
    }

    /// The move this action applies.
    pub fn game_move(&self) -> Move {
        Move {
            x: self.x,
            y: self.y,
            pass: self.pass,
        }
    }
}

/// Result of attaching a block of actions to a node.
#[derive(Debug)]
pub struct Attached {
    /// The stored actions, in the caller's move order.
    pub actions: Vec<Action>,
    /// Child node per action; reused nodes keep their stored flags.
    /// Action lists are not hydrated.
    pub nodes: Vec<Node>,
    /// Address of the new actions block.
    pub addr: u64,
    /// How many children already existed as nodes (transpositions).
    pub reused: u64,
}

/// Persistent, deduplicated game-tree store.
#[derive(Debug)]
pub struct TreeStore {
    actions: ActionsLog,
    nodes: DiskMap<NODE_KEY_LEN, NODE_VALUE_LEN>,
    player_a: String,
    player_b: String,
}

impl TreeStore {
    /// Open a tree, creating a fresh one when `force_new` is set or any of
    /// the three backing files is missing. A fresh tree is seeded with the
    /// sentinel root action leading to `initial_state`.
    pub fn open(
        name: &str,
        player_a: &str,
        player_b: &str,
        initial_state: &str,
        estimated_states: u64,
        force_new: bool,
    ) -> Result<Self, StoreError> {
        let map_path = map_path(name);
        let ovfl_path = ovfl_path(name);
        let actions_path = actions_path(name);

        let all_present =
            map_path.exists() && ovfl_path.exists() && actions_path.exists();
        let fresh = force_new || !all_present;
        if fresh && all_present {
            info!(name, "Discarding existing tree files");
        }

        let mut store = if fresh {
            // Recreate all three together so they cannot drift apart
            remove_if_present(&actions_path)?;
            Self {
                actions: ActionsLog::open(&actions_path)?,
                nodes: DiskMap::create(&map_path, &ovfl_path, estimated_states)?,
                player_a: player_a.to_string(),
                player_b: player_b.to_string(),
            }
        } else {
            Self {
                actions: ActionsLog::open(&actions_path)?,
                nodes: DiskMap::open(&map_path, &ovfl_path)?,
                player_a: player_a.to_string(),
                player_b: player_b.to_string(),
            }
        };

        if fresh {
            store.seed_root(initial_state)?;
            info!(name, "Seeded new tree");
        }

        Ok(store)
    }

    /// Open an existing tree for exploit-only play. Missing files fall back
    /// to a minimal fresh tree so a game is still possible.
    pub fn open_for_play(
        name: &str,
        player_a: &str,
        player_b: &str,
        initial_state: &str,
    ) -> Result<Self, StoreError> {
        let all_present = map_path(name).exists()
            && ovfl_path(name).exists()
            && actions_path(name).exists();
        if !all_present {
            warn!(name, "No learned tree on disk, starting empty");
            return Self::open(name, player_a, player_b, initial_state, 10, true);
        }

        Self::open(name, player_a, player_b, initial_state, 10, false)
    }

    /// The player names the store resolves key bits against.
    pub fn players(&self) -> [String; 2] {
        [self.player_a.clone(), self.player_b.clone()]
    }

    /// The root action with its child node fully hydrated.
    pub fn top_action(&mut self) -> Result<(Action, Node), StoreError> {
        let records = self.actions.read_block(0)?;
        let record = records.first().ok_or(StoreError::EmptyBlock)?;

        let action = Action::from_record(*record, 0, 0);
        let node = self.node(&action.child_key)?;

        Ok((action, node))
    }

    /// A node with its action list; children of the actions are not
    /// fetched.
    pub fn node(&mut self, key: &NodeKey) -> Result<Node, StoreError> {
        let value = self.node_value(key)?;
        let actions = self.actions_at(value.actions_addr)?;

        Ok(self.hydrate(key, value, actions))
    }

    /// Attach a block of actions to the node holding `parent_state`.
    ///
    /// The parent's to-move player is whoever is not `child_player`. Each
    /// resulting state is looked up in the node map and only inserted when
    /// absent; the count of pre-existing children comes back as `reused`.
    pub fn attach_actions(
        &mut self,
        parent_state: &str,
        child_player: &str,
        moves: &[Move],
        result_states: &[String],
    ) -> Result<Attached, StoreError> {
        debug_assert_eq!(moves.len(), result_states.len());

        let parent_key = NodeKey::new(parent_state, child_player != self.player_a);
        let mut parent_value = self
            .node_value_opt(&parent_key)?
            .ok_or_else(|| StoreError::NodeNotFound {
                state: parent_state.to_string(),
            })?;

        let mut records = Vec::with_capacity(moves.len());
        let mut nodes = Vec::with_capacity(moves.len());
        let mut reused = 0u64;
        for (mv, state) in moves.iter().zip(result_states) {
            let (node, key, was_reused) = self.add_node(state, child_player)?;
            if was_reused {
                reused += 1;
            }
            records.push(ActionRecord::new(*mv, key));
            nodes.push(node);
        }

        let addr = self.actions.append_block(&records)?;

        parent_value.actions_addr = addr;
        self.nodes
            .set(parent_key.as_bytes(), &parent_value.pack())?;

        let actions = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| Action::from_record(record, i as u64, addr))
            .collect();

        Ok(Attached {
            actions,
            nodes,
            addr,
            reused,
        })
    }

    /// Rewrite the visits/points of one stored action.
    pub fn update_action_stats(
        &mut self,
        actions_addr: u64,
        index: u64,
        visits: u64,
        points: u64,
    ) -> Result<(), StoreError> {
        if actions_addr == UNASSIGNED {
            return Err(StoreError::UnassignedAddress);
        }

        self.actions.update_stats(actions_addr, index, visits, points)
    }

    /// Mark a node as terminal.
    pub fn set_node_is_end(&mut self, key: &NodeKey) -> Result<(), StoreError> {
        let mut value = self.node_value(key)?;
        value.is_end = true;
        self.nodes.set(key.as_bytes(), &value.pack())
    }

    /// Number of node records in the map (full scan).
    pub fn node_count(&mut self) -> Result<u64, StoreError> {
        self.nodes.len()
    }

    /// Visit every node record (dump and tests).
    pub fn for_each_node<F>(&mut self, mut f: F) -> Result<(), StoreError>
    where
        F: FnMut(&NodeKey, &NodeValue),
    {
        self.nodes.for_each(|key, value| {
            f(&NodeKey::from_bytes(*key), &NodeValue::unpack(value));
        })
    }

    /// Visit every actions block in file order (dump and tests).
    pub fn for_each_block<F>(&mut self, f: F) -> Result<(), StoreError>
    where
        F: FnMut(u64, &[ActionRecord]),
    {
        self.actions.for_each_block(f)
    }

    /// Total size of the actions log in bytes.
    pub fn actions_len(&mut self) -> Result<u64, StoreError> {
        self.actions.len()
    }

    /// Push all buffered writes to disk.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        self.actions.flush()?;
        self.nodes.flush()
    }

    /// Create the root actions block: one sentinel action leading to the
    /// initial state with the first player to move.
    fn seed_root(&mut self, initial_state: &str) -> Result<(), StoreError> {
        let player_a = self.player_a.clone();
        let (_, key, _) = self.add_node(initial_state, &player_a)?;
        let record = ActionRecord::new(
            Move {
                x: ROOT_SENTINEL,
                y: ROOT_SENTINEL,
                pass: false,
            },
            key,
        );

        let addr = self.actions.append_block(&[record])?;
        debug_assert_eq!(addr, 0);

        Ok(())
    }

    /// Look up or create the node for `(state, player)`. Returns the node,
    /// its key, and whether it already existed.
    fn add_node(&mut self, state: &str, player: &str) -> Result<(Node, NodeKey, bool), StoreError> {
        let key = NodeKey::new(state, player == self.player_a);

        match self.node_value_opt(&key)? {
            Some(value) => Ok((self.hydrate(&key, value, Vec::new()), key, true)),
            None => {
                let value = NodeValue::unassigned();
                self.nodes.set(key.as_bytes(), &value.pack())?;
                Ok((self.hydrate(&key, value, Vec::new()), key, false))
            }
        }
    }

    fn node_value_opt(&mut self, key: &NodeKey) -> Result<Option<NodeValue>, StoreError> {
        Ok(self
            .nodes
            .get(key.as_bytes())?
            .map(|buf| NodeValue::unpack(&buf)))
    }

    fn node_value(&mut self, key: &NodeKey) -> Result<NodeValue, StoreError> {
        self.node_value_opt(key)?
            .ok_or_else(|| StoreError::NodeNotFound {
                state: key.state(),
            })
    }

    /// Actions of a block, or an empty list for the unassigned sentinel.
    fn actions_at(&mut self, addr: u64) -> Result<Vec<Action>, StoreError> {
        if addr == UNASSIGNED {
            return Ok(Vec::new());
        }

        let records = self.actions.read_block(addr)?;
        Ok(records
            .into_iter()
            .enumerate()
            .map(|(i, record)| Action::from_record(record, i as u64, addr))
            .collect())
    }

    fn hydrate(&self, key: &NodeKey, value: NodeValue, actions: Vec<Action>) -> Node {
        let player = if key.player_is_a() {
            self.player_a.clone()
        } else {
            self.player_b.clone()
        };

        Node {
            state: key.state(),
            player,
            is_end: value.is_end,
            actions_addr: value.actions_addr,
            actions,
        }
    }
}

fn map_path(name: &str) -> PathBuf {
    PathBuf::from(format!("{}-map.bin", name))
}

fn ovfl_path(name: &str) -> PathBuf {
    PathBuf::from(format!("{}-ovfl.bin", name))
}

fn actions_path(name: &str) -> PathBuf {
    PathBuf::from(format!("{}-actions.bin", name))
}

fn remove_if_present(path: &Path) -> Result<(), StoreError> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ACTION_LEN;

    const EMPTY_BOARD: &str = "000000000";

    fn open_store(dir: &tempfile::TempDir, force_new: bool) -> TreeStore {
        let name = dir.path().join("tree").display().to_string();
        TreeStore::open(&name, "X", "Y", EMPTY_BOARD, 64, force_new).unwrap()
    }

    fn moves(coords: &[(u8, u8)]) -> Vec<Move> {
        coords.iter().map(|&(x, y)| Move::place(x, y)).collect()
    }

    #[test]
    fn fresh_store_holds_only_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir, true);

        // One sentinel action: count byte plus a single record
        assert_eq!(store.actions_len().unwrap(), 1 + ACTION_LEN as u64);
        assert_eq!(store.node_count().unwrap(), 1);

        let (action, node) = store.top_action().unwrap();
        assert_eq!(action.x, ROOT_SENTINEL);
        assert_eq!(action.y, ROOT_SENTINEL);
        assert_eq!(action.index, 0);
        assert_eq!(action.actions_addr, 0);

        assert_eq!(node.state, "");
        assert_eq!(node.player, "X");
        assert!(!node.is_end);
        assert_eq!(node.actions_addr, UNASSIGNED);
        assert!(node.actions.is_empty());
    }

    #[test]
    fn attach_creates_children_and_links_the_parent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir, true);

        let attached = store
            .attach_actions(
                "",
                "Y",
                &moves(&[(0, 0), (1, 1)]),
                &["100000000".to_string(), "000010000".to_string()],
            )
            .unwrap();

        assert_eq!(attached.addr, 37);
        assert_eq!(attached.reused, 0);
        assert_eq!(attached.actions.len(), 2);
        assert_eq!(attached.actions[1].index, 1);
        assert_eq!(attached.actions[1].actions_addr, 37);
        assert_eq!(attached.nodes[0].player, "Y");

        // Root node now points at the new block
        let (_, root) = store.top_action().unwrap();
        assert_eq!(root.actions_addr, 37);
        assert_eq!(root.actions.len(), 2);
        assert_eq!(root.actions[0].game_move(), Move::place(0, 0));

        // 1 root + 2 children
        assert_eq!(store.node_count().unwrap(), 3);
    }

    #[test]
    fn attach_to_unknown_parent_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir, true);

        let err = store
            .attach_actions(
                "222000000",
                "Y",
                &moves(&[(0, 0)]),
                &["122000000".to_string()],
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::NodeNotFound { .. }));
    }

    #[test]
    fn transpositions_reuse_the_stored_node() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir, true);

        let first = store
            .attach_actions("", "Y", &moves(&[(0, 0)]), &["100000000".to_string()])
            .unwrap();
        assert_eq!(first.reused, 0);
        let count_before = store.node_count().unwrap();

        // The same resulting state attached under another parent reuses
        // the node record instead of writing a second one
        let second = store
            .attach_actions("", "Y", &moves(&[(0, 0)]), &["100000000".to_string()])
            .unwrap();
        assert_eq!(second.reused, 1);
        assert_eq!(store.node_count().unwrap(), count_before);
        assert_eq!(second.actions[0].child_key, first.actions[0].child_key);
    }

    #[test]
    fn update_stats_roundtrips_through_the_block() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir, true);

        let attached = store
            .attach_actions(
                "",
                "Y",
                &moves(&[(0, 0), (0, 1)]),
                &["100000000".to_string(), "010000000".to_string()],
            )
            .unwrap();

        store
            .update_action_stats(attached.addr, 1, 3, 5)
            .unwrap();

        let (_, root) = store.top_action().unwrap();
        assert_eq!(root.actions[1].visits, 3);
        assert_eq!(root.actions[1].points, 5);
        assert_eq!(root.actions[0].visits, 0);
    }

    #[test]
    fn unassigned_address_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir, true);

        assert!(matches!(
            store.update_action_stats(UNASSIGNED, 0, 1, 2),
            Err(StoreError::UnassignedAddress)
        ));
    }

    #[test]
    fn set_node_is_end_marks_the_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir, true);

        let attached = store
            .attach_actions("", "Y", &moves(&[(0, 0)]), &["100000000".to_string()])
            .unwrap();
        let key = attached.actions[0].child_key;

        store.set_node_is_end(&key).unwrap();
        let node = store.node(&key).unwrap();
        assert!(node.is_end);
        assert_eq!(node.state, "100000000");
        assert_eq!(node.player, "Y");
    }

    #[test]
    fn tree_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let addr;
        {
            let mut store = open_store(&dir, true);
            let attached = store
                .attach_actions("", "Y", &moves(&[(2, 2)]), &["000000001".to_string()])
                .unwrap();
            addr = attached.addr;
            store.update_action_stats(addr, 0, 7, 14).unwrap();
            store.flush().unwrap();
        }

        let mut store = open_store(&dir, false);
        let (_, root) = store.top_action().unwrap();
        assert_eq!(root.actions_addr, addr);
        assert_eq!(root.actions[0].visits, 7);
        assert_eq!(root.actions[0].points, 14);
        assert_eq!(store.node_count().unwrap(), 2);
    }

    #[test]
    fn force_new_discards_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = open_store(&dir, true);
            store
                .attach_actions("", "Y", &moves(&[(0, 0)]), &["100000000".to_string()])
                .unwrap();
            store.flush().unwrap();
        }

        let mut store = open_store(&dir, true);
        assert_eq!(store.node_count().unwrap(), 1);
        assert_eq!(store.actions_len().unwrap(), 1 + ACTION_LEN as u64);
    }

    #[test]
    fn parent_key_uses_the_inverted_player_bit() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir, true);

        // Root has X to move; attaching children for Y must find it
        store
            .attach_actions("", "Y", &moves(&[(0, 0)]), &["100000000".to_string()])
            .unwrap();

        // The child has Y to move; its children belong to X and the
        // parent lookup has to resolve the Y-keyed node
        let attached = store
            .attach_actions(
                "100000000",
                "X",
                &moves(&[(1, 1)]),
                &["100020000".to_string()],
            )
            .unwrap();
        assert_eq!(attached.reused, 0);

        let child_key = NodeKey::new("100000000", false);
        let child = store.node(&child_key).unwrap();
        assert_eq!(child.actions_addr, attached.addr);
    }
}
