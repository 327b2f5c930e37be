//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// Serde default functions (required for #[serde(default = "...")]).
// These call the accessor functions from the defaults module.

fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_max_rounds() -> u64 {
    defaults::max_rounds()
}
fn d_estimated_states() -> u64 {
    defaults::estimated_states()
}
fn d_exploration() -> f64 {
    defaults::exploration()
}
fn d_random_round_rate() -> f32 {
    defaults::random_round_rate()
}
fn d_warmup_rounds() -> u64 {
    defaults::warmup_rounds()
}
fn d_stats_interval() -> u64 {
    defaults::stats_interval()
}
fn d_high_threshold() -> f64 {
    defaults::high_threshold()
}
fn d_low_threshold() -> f64 {
    defaults::low_threshold()
}
fn d_visits_threshold() -> u64 {
    defaults::visits_threshold()
}

/// Top-level central configuration, loaded from config.toml.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub journal: JournalConfig,
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Deserialize)]
pub struct CommonConfig {
    /// Directory holding tree files, state files and journals.
    #[serde(default = "d_data_dir")]
    pub data_dir: String,

    /// Default tracing filter (trace, debug, info, warn, error).
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            data_dir: d_data_dir(),
            log_level: d_log_level(),
        }
    }
}

/// Tunables for the learning loop.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Learning rounds to run before stopping.
    #[serde(default = "d_max_rounds")]
    pub max_rounds: u64,

    /// Estimated number of unique states, used to size the node map.
    #[serde(default = "d_estimated_states")]
    pub estimated_states: u64,

    /// Exploration constant in the UCT score.
    #[serde(default = "d_exploration")]
    pub exploration: f64,

    /// Probability of selecting a child uniformly at random.
    #[serde(default = "d_random_round_rate")]
    pub random_round_rate: f32,

    /// Rounds to complete before the journal starts recording.
    #[serde(default = "d_warmup_rounds")]
    pub warmup_rounds: u64,

    /// Log progress statistics every this many rounds.
    #[serde(default = "d_stats_interval")]
    pub stats_interval: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_rounds: d_max_rounds(),
            estimated_states: d_estimated_states(),
            exploration: d_exploration(),
            random_round_rate: d_random_round_rate(),
            warmup_rounds: d_warmup_rounds(),
            stats_interval: d_stats_interval(),
        }
    }
}

/// Thresholds for the AI value journal.
#[derive(Debug, Clone, Deserialize)]
pub struct JournalConfig {
    /// States with value at or above this are journaled as wins.
    #[serde(default = "d_high_threshold")]
    pub high_threshold: f64,

    /// States with value at or below this are journaled as losses.
    #[serde(default = "d_low_threshold")]
    pub low_threshold: f64,

    /// Minimum visits before a state value is considered meaningful.
    #[serde(default = "d_visits_threshold")]
    pub visits_threshold: u64,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            high_threshold: d_high_threshold(),
            low_threshold: d_low_threshold(),
            visits_threshold: d_visits_threshold(),
        }
    }
}
