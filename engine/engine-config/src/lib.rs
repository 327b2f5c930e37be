//! Central configuration for Arbor
//!
//! Single source of truth for tunables shared by the library crates and the
//! CLI. Configuration is resolved in priority order:
//!
//! 1. CLI arguments (handled by the binary)
//! 2. `ARBOR_<SECTION>_<KEY>` environment variables
//! 3. `config.toml` (current or parent directory, or `ARBOR_CONFIG` path)
//! 4. Built-in defaults
//!
//! # Usage
//!
//! ```rust
//! let config = engine_config::load_config();
//! assert!(config.search.exploration > 0.0);
//! ```

pub mod defaults;
mod loader;
mod structs;

pub use loader::{apply_env_overrides, load_config, load_from_path, CONFIG_SEARCH_PATHS};
pub use structs::{CentralConfig, CommonConfig, JournalConfig, SearchConfig};
