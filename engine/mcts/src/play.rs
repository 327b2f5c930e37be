//! Exploit-only play against a learned tree.
//!
//! The tree never explores here: it follows the stored statistics while
//! the position stays inside the learned part of the tree, and falls back
//! to uniform random play once outside it.

use engine_core::{BoardGame, GameError, Move};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::error::SearchError;
use crate::tree::available_game_moves;
use treestore::{Node, TreeStore};

/// Result of a play move, including the engine's reply when one was made.
#[derive(Debug, Clone)]
pub struct PlayResult {
    pub done: bool,
    pub winner: Option<String>,
    pub reply: Option<Move>,
}

/// A play session: the human against the stored tree.
pub struct PlayTree {
    game: Box<dyn BoardGame>,
    store: TreeStore,
    rng: ChaCha20Rng,
    /// Where the game currently sits in the stored tree; `None` once the
    /// position has left the learned part.
    at: Option<Node>,
}

impl PlayTree {
    pub fn new(game: Box<dyn BoardGame>, store: TreeStore, rng: ChaCha20Rng) -> Self {
        Self {
            game,
            store,
            rng,
            at: None,
        }
    }

    /// Start a new game with the human moving first.
    pub fn reset_human_first(&mut self) -> Result<(), SearchError> {
        self.game.reset();
        let (_, root) = self.store.top_action()?;
        self.at = Some(root);
        Ok(())
    }

    /// Start a new game with the engine moving first.
    pub fn reset_engine_first(&mut self) -> Result<PlayResult, SearchError> {
        self.reset_human_first()?;
        self.engine_move()
    }

    /// Apply the human's move, then answer with the engine's reply unless
    /// the game ended.
    pub fn human_move(&mut self, mv: Move) -> Result<PlayResult, SearchError> {
        let moves = available_game_moves(self.game.as_ref())
            .ok_or_else(|| SearchError::InvalidState("game is already over".to_string()))?;
        if !moves.contains(&mv) {
            return Err(SearchError::Game(GameError::IllegalMove(
                "not a valid move".to_string(),
            )));
        }

        self.follow(mv)?;

        let outcome = self.game.apply(mv)?;
        if outcome.done {
            return Ok(PlayResult {
                done: true,
                winner: outcome.winner,
                reply: None,
            });
        }

        self.engine_move()
    }

    /// The board as the game renders it.
    pub fn render(&self) -> String {
        self.game.render()
    }

    /// Move the tree cursor along the action matching `mv`, if stored.
    fn follow(&mut self, mv: Move) -> Result<(), SearchError> {
        let next_key = match &self.at {
            Some(node) => node
                .actions
                .iter()
                .find(|a| a.game_move() == mv)
                .map(|a| a.child_key),
            None => None,
        };

        self.at = match next_key {
            Some(key) => Some(self.store.node(&key)?),
            None => {
                debug!("Position left the learned tree");
                None
            }
        };

        Ok(())
    }

    /// Pick and apply the engine's move: best stored score while inside
    /// the tree, uniform random otherwise.
    fn engine_move(&mut self) -> Result<PlayResult, SearchError> {
        let stored = match &self.at {
            Some(node) if !node.actions.is_empty() => {
                let mut selected = 0;
                let mut best = 0.0f64;
                for (i, action) in node.actions.iter().enumerate() {
                    if action.visits == 0 {
                        continue;
                    }
                    let score = action.points as f64 / 2.0 / action.visits as f64;
                    if score > best {
                        selected = i;
                        best = score;
                    }
                }

                let action = &node.actions[selected];
                Some((action.game_move(), action.child_key))
            }
            _ => None,
        };

        let mv = match stored {
            Some((mv, key)) => {
                self.at = Some(self.store.node(&key)?);
                mv
            }
            None => {
                self.at = None;
                let moves = available_game_moves(self.game.as_ref()).ok_or_else(|| {
                    SearchError::InvalidState("no moves available for the engine".to_string())
                })?;
                moves[self.rng.gen_range(0..moves.len())]
            }
        };

        let outcome = self.game.apply(mv)?;

        Ok(PlayResult {
            done: outcome.done,
            winner: outcome.winner,
            reply: Some(mv),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_tictactoe::TicTacToe;
    use rand::SeedableRng;

    fn play_tree(dir: &tempfile::TempDir) -> PlayTree {
        let game = TicTacToe::new(3, "X", "Y").unwrap();
        let (initial_state, _) = game.state();
        let name = dir.path().join("ttt").display().to_string();
        let store = TreeStore::open_for_play(&name, "X", "Y", &initial_state).unwrap();

        PlayTree::new(Box::new(game), store, ChaCha20Rng::seed_from_u64(5))
    }

    #[test]
    fn empty_tree_still_plays_random_moves() {
        let dir = tempfile::tempdir().unwrap();
        let mut play = play_tree(&dir);

        play.reset_human_first().unwrap();
        let result = play.human_move(Move::place(0, 0)).unwrap();

        assert!(!result.done);
        let reply = result.reply.expect("the engine must answer");
        assert!(!reply.pass);
        assert_ne!((reply.x, reply.y), (0, 0));
    }

    #[test]
    fn engine_can_open_the_game() {
        let dir = tempfile::tempdir().unwrap();
        let mut play = play_tree(&dir);

        let result = play.reset_engine_first().unwrap();
        assert!(!result.done);
        assert!(result.reply.is_some());

        // Board holds exactly one mark now
        let board = play.render();
        assert_eq!(board.matches('X').count(), 1);
    }

    #[test]
    fn illegal_human_moves_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut play = play_tree(&dir);

        play.reset_human_first().unwrap();
        play.human_move(Move::place(1, 1)).unwrap();

        assert!(matches!(
            play.human_move(Move::place(1, 1)),
            Err(SearchError::Game(GameError::IllegalMove(_)))
        ));
    }

    #[test]
    fn games_run_to_completion() {
        let dir = tempfile::tempdir().unwrap();
        let mut play = play_tree(&dir);
        play.reset_human_first().unwrap();

        // Always take the first legal move until the game ends
        let mut result = None;
        for _ in 0..9 {
            let moves = available_game_moves(play.game.as_ref()).unwrap();
            let outcome = play.human_move(moves[0]).unwrap();
            let done = outcome.done;
            result = Some(outcome);
            if done {
                break;
            }
        }

        assert!(result.expect("at least one move was played").done);
    }
}
