//! CLI configuration.
//!
//! Arguments default to the central config (config.toml with `ARBOR_*`
//! environment overrides); CLI flags take highest priority.

use anyhow::{anyhow, Result};
use clap::Args;
use engine_config::CentralConfig;
use once_cell::sync::Lazy;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(engine_config::load_config);

/// The resolved central configuration.
pub fn central() -> &'static CentralConfig {
    &CENTRAL_CONFIG
}

// Default value functions that read from central config
fn default_data_dir() -> String {
    CENTRAL_CONFIG.common.data_dir.clone()
}

pub fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_max_rounds() -> u64 {
    CENTRAL_CONFIG.search.max_rounds
}

fn default_states() -> u64 {
    CENTRAL_CONFIG.search.estimated_states
}

/// Arguments shared by every subcommand that touches a stored tree.
#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    /// Game id (0 = TicTacToe, 1 = Othello, 2 = vertical four-in-a-row)
    #[arg(long, default_value_t = 0)]
    pub game: u8,

    /// Board side length (ignored by games with a fixed board)
    #[arg(long, default_value_t = 4)]
    pub size: u8,

    /// Directory holding the tree files
    #[arg(long, default_value_t = default_data_dir())]
    pub data_dir: String,
}

impl TreeArgs {
    pub fn validate(&self) -> Result<()> {
        if engine_games::game_name(self.game).is_none() {
            return Err(anyhow!("no game corresponding to id {}", self.game));
        }
        Ok(())
    }

    /// Registry name of the selected game.
    pub fn game_name(&self) -> &'static str {
        engine_games::game_name(self.game).expect("validated game id")
    }

    /// Path prefix of the tree files: `<data_dir>/nodetree<size>x<size>-<game>`.
    pub fn tree_name(&self) -> String {
        format!(
            "{}/nodetree{}x{}-{}",
            self.data_dir, self.size, self.size, self.game
        )
    }

    /// Path of the run-state file.
    pub fn state_path(&self) -> std::path::PathBuf {
        format!("{}.state", self.tree_name()).into()
    }
}

/// Arguments for the learn subcommand.
#[derive(Args, Debug, Clone)]
pub struct LearnArgs {
    #[command(flatten)]
    pub tree: TreeArgs,

    /// Learning rounds to run (added on top of a resumed tree's rounds)
    #[arg(long, default_value_t = default_max_rounds())]
    pub max_rounds: u64,

    /// Estimated number of unique states, sizes the node map at creation
    #[arg(long, default_value_t = default_states())]
    pub states: u64,

    /// Discard any existing tree and start fresh
    #[arg(long)]
    pub force_new: bool,
}

impl LearnArgs {
    pub fn validate(&self) -> Result<()> {
        self.tree.validate()?;
        if self.max_rounds == 0 {
            return Err(anyhow!("max_rounds must be greater than 0"));
        }
        if self.states == 0 {
            return Err(anyhow!("states must be greater than 0"));
        }
        Ok(())
    }
}

/// Arguments for the play subcommand.
#[derive(Args, Debug, Clone)]
pub struct PlayArgs {
    #[command(flatten)]
    pub tree: TreeArgs,

    /// Make the first move instead of letting the engine open
    #[arg(long)]
    pub first: bool,
}

/// Arguments for the dump subcommand.
#[derive(Args, Debug, Clone)]
pub struct DumpArgs {
    #[command(flatten)]
    pub tree: TreeArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_args() -> TreeArgs {
        TreeArgs {
            game: 0,
            size: 3,
            data_dir: "./data".to_string(),
        }
    }

    #[test]
    fn tree_name_matches_the_layout() {
        let args = tree_args();
        assert_eq!(args.tree_name(), "./data/nodetree3x3-0");
        assert_eq!(
            args.state_path(),
            std::path::PathBuf::from("./data/nodetree3x3-0.state")
        );
    }

    #[test]
    fn unknown_game_ids_are_rejected() {
        let mut args = tree_args();
        args.game = 9;
        assert!(args.validate().is_err());
    }

    #[test]
    fn learn_args_reject_zero_budgets() {
        let learn = LearnArgs {
            tree: tree_args(),
            max_rounds: 0,
            states: 100,
            force_new: false,
        };
        assert!(learn.validate().is_err());

        let learn = LearnArgs {
            tree: tree_args(),
            max_rounds: 10,
            states: 0,
            force_new: false,
        };
        assert!(learn.validate().is_err());
    }
}
