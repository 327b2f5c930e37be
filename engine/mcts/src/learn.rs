//! The four-phase learning loop: Select, Expand, Simulate, BackPropagate.
//!
//! One round walks the stored tree from the root action to a leaf, expands
//! the leaf with every legal move, plays one random playout from a fresh
//! child, and writes the result back along the path. All tree state lives
//! in the store; the only in-memory structure is the current select path.

use engine_core::{BoardGame, MoveOutcome};
use rand::Rng;
use tracing::info;

use crate::error::SearchError;
use crate::tree::{available_game_moves, Tree};
use treestore::{Action, Node};

/// One entry of the select path: a stored action and the node it leads to.
#[derive(Debug, Clone)]
pub struct Step {
    pub action: Action,
    pub node: Node,
}

/// What a single learning round did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// A full Select → Expand → Simulate → BackPropagate pass completed.
    Learned,
    /// The round budget is exhausted; the outer loop should stop.
    Finished,
}

/// Upper confidence bound for trees.
///
/// Points are stored doubled, so the exploitation term halves them back to
/// real points. Callers must filter out unvisited children first.
fn uct(parent_visits: u64, visits: u64, points: u64, exploration: f64) -> f64 {
    debug_assert!(visits > 0, "UCT of an unvisited child");

    let wins = points as f64 / 2.0;
    let n = visits as f64;
    let parent = parent_visits as f64;

    wins / n + exploration * (parent.ln() / n).sqrt()
}

impl Tree {
    /// Run one learning round.
    pub fn learn_round(&mut self) -> Result<RoundOutcome, SearchError> {
        self.game.reset();

        let mut path = self.select()?;
        if path.is_empty() {
            return Ok(RoundOutcome::Finished);
        }

        // Replay the game up to the selected leaf
        let outcome = self.replay(&path[path.len() - 1]);
        let mut winner = outcome.winner;
        let mut reached_end = outcome.done;

        if !reached_end {
            self.expand(&mut path)?;

            let outcome = self.replay(&path[path.len() - 1]);
            winner = outcome.winner;
            reached_end = outcome.done;

            if !reached_end {
                winner = self.simulate()?;
            }
        }

        if reached_end {
            self.mark_node_end(&path[path.len() - 1])?;
        }

        self.back_propagate(&path, winner.as_deref())?;

        Ok(RoundOutcome::Learned)
    }

    /// Traverse the stored tree to the node to explore or exploit next.
    ///
    /// Returns the ordered path from the root action; an empty path means
    /// the round budget is exhausted.
    fn select(&mut self) -> Result<Vec<Step>, SearchError> {
        let (action, node) = self.store.top_action()?;

        if self.config.stats_interval > 0
            && self.rounds > 0
            && self.rounds % self.config.stats_interval == 0
        {
            self.log_statistics(false);
        }

        if self.rounds >= self.max_rounds {
            info!(rounds = self.rounds, "Max rounds reached");
            self.log_statistics(true);
            return Ok(Vec::new());
        }

        let mut path = vec![Step { action, node }];

        loop {
            let next_action = {
                let current = &path[path.len() - 1];
                if current.node.actions.is_empty() {
                    // Unexpanded leaf or terminal: the path is complete
                    return Ok(path);
                }

                let actions = &current.node.actions;
                let selected = if self.rng.gen::<f32>() < self.config.random_round_rate {
                    self.rng.gen_range(0..actions.len())
                } else {
                    let mut selected = 0;
                    let mut max_uct = 0.0;
                    for (i, action) in actions.iter().enumerate() {
                        // Unvisited children always go first, in insertion
                        // order
                        if action.visits == 0 {
                            selected = i;
                            break;
                        }

                        let score = uct(
                            current.action.visits,
                            action.visits,
                            action.points,
                            self.config.exploration,
                        );
                        if score > max_uct {
                            selected = i;
                            max_uct = score;
                        }
                    }
                    selected
                };

                actions[selected].clone()
            };

            let node = self.store.node(&next_action.child_key)?;
            path.push(Step {
                action: next_action,
                node,
            });
        }
    }

    /// Expand the leaf at the tail of the path with every legal move and
    /// append one random new child to the path.
    fn expand(&mut self, path: &mut Vec<Step>) -> Result<(), SearchError> {
        let (leaf_state, leaf_player) = {
            let leaf = &path[path.len() - 1];
            (leaf.node.state.clone(), leaf.node.player.clone())
        };

        self.game.set_state(&leaf_state, &leaf_player);
        let moves = available_game_moves(self.game.as_ref()).ok_or_else(|| {
            SearchError::InvalidState(format!(
                "no legal moves from non-terminal state '{}'",
                leaf_state
            ))
        })?;

        let child_player = if leaf_player == self.player_a {
            self.player_b.clone()
        } else {
            self.player_a.clone()
        };

        // Probe each move from the leaf, restoring the leaf in between so
        // every candidate starts clean
        let mut result_states = Vec::with_capacity(moves.len());
        for mv in &moves {
            self.game.apply(*mv)?;
            let (state, _) = self.game.state();
            result_states.push(state);
            self.game.set_state(&leaf_state, &leaf_player);
        }

        let attached = self
            .store
            .attach_actions(&leaf_state, &child_player, &moves, &result_states)?;

        let new_nodes = attached.actions.len() as i64 - attached.reused as i64;
        self.n_nodes += new_nodes;
        self.n_reused_nodes += attached.reused as i64;
        // One of the new nodes is the one being expanded right now
        self.n_unexpanded_nodes += new_nodes - 1;

        let pick = self.rng.gen_range(0..attached.actions.len());
        path.push(Step {
            action: attached.actions[pick].clone(),
            node: attached.nodes[pick].clone(),
        });

        if new_nodes > 0 {
            let depth = path.len();
            *self.depth_stats.entry(depth).or_insert(0) += new_nodes;
        }

        Ok(())
    }

    /// Play random legal moves from the current game position until the
    /// game ends. Returns the winner, or `None` on a draw.
    fn simulate(&mut self) -> Result<Option<String>, SearchError> {
        loop {
            let moves = available_game_moves(self.game.as_ref()).ok_or_else(|| {
                SearchError::InvalidState("simulation ran out of moves".to_string())
            })?;
            let mv = moves[self.rng.gen_range(0..moves.len())];

            let outcome = self.game.apply(mv)?;
            if outcome.done {
                return Ok(outcome.winner);
            }
        }
    }

    /// Walk the path tail to head, updating every action's statistics.
    ///
    /// Win credit goes to actions whose child node has the winner to move;
    /// the replay convention reports terminal winners the same way.
    fn back_propagate(&mut self, path: &[Step], winner: Option<&str>) -> Result<(), SearchError> {
        for step in path.iter().rev() {
            let mut new_points = step.action.points;
            match winner {
                None => new_points += 1,
                Some(winner) if step.node.player == winner => new_points += 2,
                Some(_) => {}
            }
            let new_visits = step.action.visits + 1;

            self.store.update_action_stats(
                step.action.actions_addr,
                step.action.index,
                new_visits,
                new_points,
            )?;

            if self.rounds > self.config.warmup_rounds {
                self.journal.record(
                    &step.node.player,
                    &step.node.state,
                    new_visits,
                    new_points as f64 / 2.0,
                );
            }
        }

        self.rounds += 1;

        Ok(())
    }

    /// Load a step's state into the game and evaluate it.
    fn replay(&mut self, step: &Step) -> MoveOutcome {
        self.game.set_state(&step.node.state, &step.node.player)
    }

    /// Flag the step's node as terminal, once.
    fn mark_node_end(&mut self, step: &Step) -> Result<(), SearchError> {
        if !step.node.is_end {
            // A terminal node can never be expanded
            self.n_unexpanded_nodes -= 1;
            self.store.set_node_is_end(&step.action.child_key)?;
        }
        Ok(())
    }
}
