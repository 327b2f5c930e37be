//! Static game registry for runtime game selection
//!
//! Game crates register a factory under a stable name at startup; the CLI
//! looks games up by name and constructs them with [`GameOptions`].

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;

use tracing::warn;

use crate::board_game::{BoardGame, GameError};

/// Construction options passed to game factories.
#[derive(Debug, Clone)]
pub struct GameOptions {
    /// Board side length. Games with a fixed board ignore it.
    pub size: u8,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self { size: 4 }
    }
}

/// Factory function type for creating game instances.
pub type GameFactory = fn(&GameOptions) -> Result<Box<dyn BoardGame>, GameError>;

/// Thread-safe registry mapping game name to factory functions.
static REGISTRY: Lazy<Mutex<HashMap<String, GameFactory>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Register a game with the global registry.
///
/// Typically called once from a game crate's `register_*` function.
pub fn register_game(name: String, factory: GameFactory) {
    let mut registry = REGISTRY.lock().unwrap();
    if registry.contains_key(&name) {
        warn!(game = %name, "Overriding existing game registration");
    }
    registry.insert(name, factory);
}

/// Create a new game instance by name.
pub fn create_game(name: &str, options: &GameOptions) -> Result<Box<dyn BoardGame>, GameError> {
    let factory = {
        let registry = REGISTRY.lock().unwrap();
        registry.get(name).copied()
    };
    match factory {
        Some(factory) => factory(options),
        None => {
            warn!(game = %name, "Attempted to create unregistered game");
            Err(GameError::UnknownGame(name.to_string()))
        }
    }
}

/// Get list of all registered game names.
pub fn list_registered_games() -> Vec<String> {
    let registry = REGISTRY.lock().unwrap();
    registry.keys().cloned().collect()
}

/// Check if a game is registered.
pub fn is_registered(name: &str) -> bool {
    let registry = REGISTRY.lock().unwrap();
    registry.contains_key(name)
}

/// Clear all registered games (mainly for testing).
pub fn clear_registry() {
    let mut registry = REGISTRY.lock().unwrap();
    registry.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board_game::{Move, MoveOutcome};
    use crate::test_utils::REGISTRY_TEST_MUTEX;

    #[derive(Debug)]
    struct TestGame {
        size: u8,
    }

    impl BoardGame for TestGame {
        fn reset(&mut self) {}

        fn apply(&mut self, _mv: Move) -> Result<MoveOutcome, GameError> {
            Ok(MoveOutcome::ongoing())
        }

        fn available_actions(&self) -> (Vec<(u8, u8)>, bool) {
            (vec![(0, 0)], false)
        }

        fn players(&self) -> [String; 2] {
            ["A".to_string(), "B".to_string()]
        }

        fn set_players(&mut self, _players: [String; 2]) {}

        fn state(&self) -> (String, String) {
            ("0".repeat(self.size as usize), "A".to_string())
        }

        fn set_state(&mut self, _state: &str, _player: &str) -> MoveOutcome {
            MoveOutcome::ongoing()
        }

        fn cell_count(&self) -> usize {
            self.size as usize
        }

        fn render(&self) -> String {
            String::new()
        }
    }

    fn test_factory(options: &GameOptions) -> Result<Box<dyn BoardGame>, GameError> {
        if options.size == 0 {
            return Err(GameError::UnsupportedSize(0));
        }
        Ok(Box::new(TestGame { size: options.size }))
    }

    #[test]
    fn register_and_create() {
        let _guard = REGISTRY_TEST_MUTEX.lock().unwrap();
        clear_registry();

        register_game("test_game".to_string(), test_factory);
        assert!(is_registered("test_game"));

        let game = create_game("test_game", &GameOptions { size: 3 }).unwrap();
        assert_eq!(game.cell_count(), 3);
    }

    #[test]
    fn unknown_game_is_an_error() {
        let _guard = REGISTRY_TEST_MUTEX.lock().unwrap();
        clear_registry();

        let err = create_game("nonexistent", &GameOptions::default()).unwrap_err();
        assert!(matches!(err, GameError::UnknownGame(_)));
    }

    #[test]
    fn factory_errors_pass_through() {
        let _guard = REGISTRY_TEST_MUTEX.lock().unwrap();
        clear_registry();

        register_game("test_game".to_string(), test_factory);
        let err = create_game("test_game", &GameOptions { size: 0 }).unwrap_err();
        assert!(matches!(err, GameError::UnsupportedSize(0)));
    }

    #[test]
    fn list_and_clear() {
        let _guard = REGISTRY_TEST_MUTEX.lock().unwrap();
        clear_registry();

        register_game("game1".to_string(), test_factory);
        register_game("game2".to_string(), test_factory);

        let mut games = list_registered_games();
        games.sort();
        assert_eq!(games, vec!["game1".to_string(), "game2".to_string()]);

        clear_registry();
        assert!(list_registered_games().is_empty());
    }
}
