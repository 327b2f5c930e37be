//! Single source of truth for default configuration values.
//!
//! Every default lives here as a `const` with an accessor function, so the
//! serde defaults, the CLI defaults and the tests all agree.

// Common
const DATA_DIR: &str = ".";
const LOG_LEVEL: &str = "info";

// Search
const MAX_ROUNDS: u64 = 1_000_000;
const ESTIMATED_STATES: u64 = 1_000_000;
const EXPLORATION: f64 = 10.0;
const RANDOM_ROUND_RATE: f32 = 0.1;
const WARMUP_ROUNDS: u64 = 10_000;
const STATS_INTERVAL: u64 = 10_000;

// Journal
const HIGH_THRESHOLD: f64 = 0.7;
const LOW_THRESHOLD: f64 = 0.3;
const VISITS_THRESHOLD: u64 = 5;

pub fn data_dir() -> &'static str {
    DATA_DIR
}

pub fn log_level() -> &'static str {
    LOG_LEVEL
}

pub fn max_rounds() -> u64 {
    MAX_ROUNDS
}

pub fn estimated_states() -> u64 {
    ESTIMATED_STATES
}

pub fn exploration() -> f64 {
    EXPLORATION
}

pub fn random_round_rate() -> f32 {
    RANDOM_ROUND_RATE
}

pub fn warmup_rounds() -> u64 {
    WARMUP_ROUNDS
}

pub fn stats_interval() -> u64 {
    STATS_INTERVAL
}

pub fn high_threshold() -> f64 {
    HIGH_THRESHOLD
}

pub fn low_threshold() -> f64 {
    LOW_THRESHOLD
}

pub fn visits_threshold() -> u64 {
    VISITS_THRESHOLD
}
