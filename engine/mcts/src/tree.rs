//! The learning tree: game + store + journal plus run bookkeeping.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use engine_core::{BoardGame, Move};
use rand_chacha::ChaCha20Rng;
use tracing::{info, warn};

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::journal::Journal;
use treestore::TreeStore;

/// Run counters carried across sessions through the state file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    pub player_a: String,
    pub player_b: String,
    pub n_nodes: i64,
    pub rounds: u64,
    /// Reserved; written as 0.
    pub overlearn_rounds: u64,
    pub n_reused_nodes: i64,
    pub n_unexpanded_nodes: i64,
}

impl RunState {
    /// Load the state file, or `None` when it does not exist.
    pub fn load(path: &Path) -> Result<Option<RunState>, SearchError> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path)?;
        let line = contents.lines().next().unwrap_or_default();
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 7 {
            return Err(SearchError::MalformedStateFile(format!(
                "expected 7 fields, got {}",
                fields.len()
            )));
        }

        let parse_int = |field: &str, what: &str| {
            field.parse::<i64>().map_err(|_| {
                SearchError::MalformedStateFile(format!("{} is not a number: '{}'", what, field))
            })
        };

        Ok(Some(RunState {
            player_a: fields[0].to_string(),
            player_b: fields[1].to_string(),
            n_nodes: parse_int(fields[2], "node count")?,
            rounds: parse_int(fields[3], "rounds")? as u64,
            overlearn_rounds: parse_int(fields[4], "overlearn rounds")? as u64,
            n_reused_nodes: parse_int(fields[5], "reused node count")?,
            n_unexpanded_nodes: parse_int(fields[6], "unexpanded node count")?,
        }))
    }

    /// Write the single-line state file, replacing any previous one.
    pub fn save(&self, path: &Path) -> Result<(), SearchError> {
        let line = format!(
            "{},{},{},{},{},{},{}\n",
            self.player_a,
            self.player_b,
            self.n_nodes,
            self.rounds,
            self.overlearn_rounds,
            self.n_reused_nodes,
            self.n_unexpanded_nodes,
        );
        std::fs::write(path, line)?;
        Ok(())
    }
}

/// Snapshot of the run counters for logging and summaries.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub rounds: u64,
    pub max_rounds: u64,
    pub n_nodes: i64,
    pub n_reused_nodes: i64,
    pub n_unexpanded_nodes: i64,
    pub depth_stats: BTreeMap<usize, i64>,
}

/// A learning tree over one game and its persistent store.
pub struct Tree {
    pub(crate) game: Box<dyn BoardGame>,
    pub(crate) store: TreeStore,
    pub(crate) journal: Journal,
    pub(crate) rng: ChaCha20Rng,
    pub(crate) config: SearchConfig,
    pub(crate) player_a: String,
    pub(crate) player_b: String,
    pub(crate) rounds: u64,
    pub(crate) max_rounds: u64,
    pub(crate) overlearn_rounds: u64,
    pub(crate) n_nodes: i64,
    pub(crate) n_reused_nodes: i64,
    pub(crate) n_unexpanded_nodes: i64,
    /// Nodes created per path depth (the root action counts as depth 1).
    pub(crate) depth_stats: BTreeMap<usize, i64>,
    pub(crate) state_path: PathBuf,
}

impl Tree {
    /// Build a learning tree. When the state file exists and `force_new`
    /// is unset, the stored counters are restored and the round budget is
    /// added on top of the stored rounds.
    pub fn new(
        game: Box<dyn BoardGame>,
        store: TreeStore,
        journal: Journal,
        config: SearchConfig,
        state_path: PathBuf,
        force_new: bool,
        rng: ChaCha20Rng,
    ) -> Result<Self, SearchError> {
        let [player_a, player_b] = game.players();

        let mut tree = Self {
            game,
            store,
            journal,
            rng,
            max_rounds: config.max_rounds,
            config,
            player_a,
            player_b,
            rounds: 0,
            overlearn_rounds: 0,
            n_nodes: 1,
            n_reused_nodes: 0,
            n_unexpanded_nodes: 1,
            depth_stats: BTreeMap::from([(1, 1)]),
            state_path,
        };

        if tree.state_path.exists() {
            if force_new {
                std::fs::remove_file(&tree.state_path)?;
            } else {
                tree.depth_stats.clear();
                tree.restore_run_state()?;
            }
        }

        Ok(tree)
    }

    fn restore_run_state(&mut self) -> Result<(), SearchError> {
        let Some(state) = RunState::load(&self.state_path)? else {
            return Ok(());
        };

        info!(
            rounds = state.rounds,
            nodes = state.n_nodes,
            "Resuming stored tree"
        );

        self.player_a = state.player_a.clone();
        self.player_b = state.player_b.clone();
        self.n_nodes = state.n_nodes;
        self.rounds = state.rounds;
        self.max_rounds += state.rounds;
        self.overlearn_rounds = state.overlearn_rounds;
        self.n_reused_nodes = state.n_reused_nodes;
        self.n_unexpanded_nodes = state.n_unexpanded_nodes;

        self.game.set_players([state.player_a, state.player_b]);

        Ok(())
    }

    /// Completed learning rounds.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Round target for this run (input budget plus restored rounds).
    pub fn max_rounds(&self) -> u64 {
        self.max_rounds
    }

    /// Current run counters.
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            rounds: self.rounds,
            max_rounds: self.max_rounds,
            n_nodes: self.n_nodes,
            n_reused_nodes: self.n_reused_nodes,
            n_unexpanded_nodes: self.n_unexpanded_nodes,
            depth_stats: self.depth_stats.clone(),
        }
    }

    /// Write the state file for a later resume.
    pub fn save_state(&self) -> Result<(), SearchError> {
        RunState {
            player_a: self.player_a.clone(),
            player_b: self.player_b.clone(),
            n_nodes: self.n_nodes,
            rounds: self.rounds,
            overlearn_rounds: self.overlearn_rounds,
            n_reused_nodes: self.n_reused_nodes,
            n_unexpanded_nodes: self.n_unexpanded_nodes,
        }
        .save(&self.state_path)
    }

    /// Clean shutdown: state file, journal, then the store files.
    pub fn shutdown(&mut self) -> Result<(), SearchError> {
        self.save_state()?;
        if let Err(e) = self.journal.flush() {
            warn!(error = %e, "Failed to flush AI journal");
        }
        self.store.flush()?;

        info!(rounds = self.rounds, nodes = self.n_nodes, "Tree closed");
        Ok(())
    }

    pub(crate) fn log_statistics(&self, final_print: bool) {
        info!(
            rounds = self.rounds,
            unique_nodes = self.n_nodes,
            reused_nodes = self.n_reused_nodes,
            unexpanded_nodes = self.n_unexpanded_nodes,
            "Learning progress"
        );

        if final_print {
            for (depth, nodes) in &self.depth_stats {
                info!(depth, nodes, "Nodes created at depth");
            }
        }
    }
}

/// Legal moves of the current game position in engine form.
///
/// `None` means the game is over. A forced pass becomes the single
/// synthetic pass move.
pub(crate) fn available_game_moves(game: &dyn BoardGame) -> Option<Vec<Move>> {
    let (actions, pass) = game.available_actions();

    if actions.is_empty() && !pass {
        return None;
    }
    if pass {
        return Some(vec![Move::PASS]);
    }

    Some(
        actions
            .into_iter()
            .map(|(x, y)| Move::place(x, y))
            .collect(),
    )
}
