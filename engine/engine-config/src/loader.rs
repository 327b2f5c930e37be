//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable
//! overrides.

use crate::CentralConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",    // Current directory
    "../config.toml", // Parent directory (when running from a subdirectory)
];

/// Load the central configuration from config.toml.
///
/// Searches in the following order:
/// 1. Path specified by the ARBOR_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    // Check for explicit config path
    if let Ok(path) = std::env::var("ARBOR_CONFIG") {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from ARBOR_CONFIG: {}", path.display());
            return load_from_path(&path);
        }
        warn!(
            "ARBOR_CONFIG={} not found, searching defaults",
            path.display()
        );
    }

    // Search default locations
    for path_str in CONFIG_SEARCH_PATHS {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(&path);
        }
    }

    // Fall back to defaults
    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
pub fn load_from_path(path: &Path) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u64, f64, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = v;
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: ARBOR_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.data_dir, "ARBOR_COMMON_DATA_DIR");
    env_override!(config, common.log_level, "ARBOR_COMMON_LOG_LEVEL");

    // Search
    env_override!(config, search.max_rounds, "ARBOR_SEARCH_MAX_ROUNDS", parse);
    env_override!(
        config,
        search.estimated_states,
        "ARBOR_SEARCH_ESTIMATED_STATES",
        parse
    );
    env_override!(config, search.exploration, "ARBOR_SEARCH_EXPLORATION", parse);
    env_override!(
        config,
        search.random_round_rate,
        "ARBOR_SEARCH_RANDOM_ROUND_RATE",
        parse
    );
    env_override!(
        config,
        search.warmup_rounds,
        "ARBOR_SEARCH_WARMUP_ROUNDS",
        parse
    );
    env_override!(
        config,
        search.stats_interval,
        "ARBOR_SEARCH_STATS_INTERVAL",
        parse
    );

    // Journal
    env_override!(
        config,
        journal.high_threshold,
        "ARBOR_JOURNAL_HIGH_THRESHOLD",
        parse
    );
    env_override!(
        config,
        journal.low_threshold,
        "ARBOR_JOURNAL_LOW_THRESHOLD",
        parse
    );
    env_override!(
        config,
        journal.visits_threshold,
        "ARBOR_JOURNAL_VISITS_THRESHOLD",
        parse
    );

    config
}
