//! Search configuration parameters.

/// Configuration for the learning loop.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Learning rounds to run before stopping. When a tree is resumed the
    /// stored round count is added on top.
    pub max_rounds: u64,

    /// Exploration constant in the UCT formula. Higher values favour
    /// rarely-visited children over high scorers.
    pub exploration: f64,

    /// Probability of descending to a uniformly random child instead of
    /// the UCT maximiser.
    pub random_round_rate: f32,

    /// Rounds to complete before the journal starts recording values.
    pub warmup_rounds: u64,

    /// Log progress statistics every this many rounds (0 disables).
    pub stats_interval: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_rounds: 1_000_000,
            exploration: 10.0,
            random_round_rate: 0.1,
            warmup_rounds: 10_000,
            stats_interval: 10_000,
        }
    }
}

impl SearchConfig {
    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            max_rounds: 10,
            exploration: 10.0,
            random_round_rate: 0.1,
            warmup_rounds: 0,
            stats_interval: 0,
        }
    }

    /// Builder pattern: set the round budget.
    pub fn with_max_rounds(mut self, rounds: u64) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    /// Builder pattern: set the random selection rate.
    pub fn with_random_round_rate(mut self, rate: f32) -> Self {
        self.random_round_rate = rate;
        self
    }

    /// Builder pattern: set the journal warm-up.
    pub fn with_warmup_rounds(mut self, rounds: u64) -> Self {
        self.warmup_rounds = rounds;
        self
    }
}
