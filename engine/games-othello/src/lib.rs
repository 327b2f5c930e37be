//! Othello game implementation for the Arbor engine
//!
//! Othello on a 4×4, 6×6 or 8×8 board. A move must flank at least one line
//! of opponent discs; every flanked line is flipped. A player without a
//! legal placement must pass. The game ends when neither player can move or
//! the board is full; the higher disc count wins.
//!
//! # Usage
//!
//! ```rust
//! use games_othello::register_othello;
//! use engine_core::{create_game, BoardGame, GameOptions};
//!
//! register_othello();
//! let game = create_game("othello", &GameOptions { size: 4 }).unwrap();
//! assert_eq!(game.cell_count(), 16);
//! ```

use engine_core::{register_game, BoardGame, GameError, Move, MoveOutcome};

const EMPTY: u8 = 0;

/// The eight scan directions used for move legality and flipping.
const DIRECTIONS: [(i16, i16); 8] = [
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
];

/// Register Othello with the global game registry under `"othello"`.
pub fn register_othello() {
    register_game("othello".to_string(), |options| {
        Ok(Box::new(Othello::new(options.size, "B", "W")?))
    });
}

/// One legal placement together with every disc it flips.
#[derive(Debug, Clone)]
struct Placement {
    mv: (u8, u8),
    flips: Vec<(u8, u8)>,
}

/// Othello on an `size` × `size` board.
///
/// Cells hold `0` (empty), `1` (first player) or `2` (second player),
/// indexed `x * size + y`. Legal placements for both players are cached and
/// refreshed after every board change.
#[derive(Debug)]
pub struct Othello {
    cells: Vec<u8>,
    players: [String; 2],
    in_turn: usize,
    size: u8,
    done: bool,
    placements: [Vec<Placement>; 2],
}

impl Othello {
    /// Create a new game. Only sizes 4, 6 and 8 form a valid Othello board.
    pub fn new(size: u8, player_a: &str, player_b: &str) -> Result<Self, GameError> {
        if ![4, 6, 8].contains(&size) {
            return Err(GameError::UnsupportedSize(size));
        }

        let mut game = Self {
            cells: vec![EMPTY; size as usize * size as usize],
            players: [player_a.to_string(), player_b.to_string()],
            in_turn: 0,
            size,
            done: false,
            placements: [Vec::new(), Vec::new()],
        };
        game.reset();

        Ok(game)
    }

    fn cell(&self, x: u8, y: u8) -> u8 {
        self.cells[x as usize * self.size as usize + y as usize]
    }

    fn set_cell(&mut self, x: u8, y: u8, value: u8) {
        self.cells[x as usize * self.size as usize + y as usize] = value;
    }

    fn in_turn_name(&self) -> &str {
        &self.players[self.in_turn]
    }

    /// All legal placements for `mark`, with the flips of every flanked
    /// line combined per landing square.
    fn evaluate_placements(&self, mark: u8) -> Vec<Placement> {
        let n = self.size as i16;
        let opponent = 3 - mark;
        let mut placements: Vec<Placement> = Vec::new();

        for x in 0..self.size {
            for y in 0..self.size {
                if self.cell(x, y) != EMPTY {
                    continue;
                }

                let mut flips = Vec::new();
                for (dx, dy) in DIRECTIONS {
                    let mut cx = x as i16 + dx;
                    let mut cy = y as i16 + dy;
                    let mut line = Vec::new();

                    while (0..n).contains(&cx)
                        && (0..n).contains(&cy)
                        && self.cell(cx as u8, cy as u8) == opponent
                    {
                        line.push((cx as u8, cy as u8));
                        cx += dx;
                        cy += dy;
                    }

                    // A line counts only when it ends on our own disc
                    if !line.is_empty()
                        && (0..n).contains(&cx)
                        && (0..n).contains(&cy)
                        && self.cell(cx as u8, cy as u8) == mark
                    {
                        flips.extend(line);
                    }
                }

                if !flips.is_empty() {
                    placements.push(Placement { mv: (x, y), flips });
                }
            }
        }

        placements
    }

    fn refresh_placements(&mut self) {
        self.placements = [self.evaluate_placements(1), self.evaluate_placements(2)];
    }

    fn disc_counts(&self) -> (usize, usize) {
        let a = self.cells.iter().filter(|&&c| c == 1).count();
        let b = self.cells.iter().filter(|&&c| c == 2).count();
        (a, b)
    }

    /// Evaluate the position after a board change; placement caches must be
    /// current. The game ends when neither player can place or the board is
    /// full; the disc majority wins and equal counts draw.
    fn evaluate_game(&mut self) -> Option<String> {
        let (a, b) = self.disc_counts();
        let no_moves = self.placements[0].is_empty() && self.placements[1].is_empty();

        if no_moves || a + b == self.cells.len() {
            self.done = true;
            if a > b {
                return Some(self.players[0].clone());
            } else if b > a {
                return Some(self.players[1].clone());
            }
        }

        None
    }

    fn outcome(&mut self) -> MoveOutcome {
        let winner = self.evaluate_game();
        MoveOutcome {
            done: self.done,
            winner,
        }
    }
}

impl BoardGame for Othello {
    fn reset(&mut self) {
        self.cells.fill(EMPTY);
        let half = self.size / 2;
        // Standard opening diamond
        self.set_cell(half - 1, half - 1, 1);
        self.set_cell(half, half, 1);
        self.set_cell(half, half - 1, 2);
        self.set_cell(half - 1, half, 2);

        self.in_turn = 0;
        self.done = false;
        self.refresh_placements();
    }

    fn apply(&mut self, mv: Move) -> Result<MoveOutcome, GameError> {
        if mv.pass {
            if !self.placements[self.in_turn].is_empty() {
                return Err(GameError::IllegalMove(
                    "pass with placements available".to_string(),
                ));
            }
        } else {
            let mark = self.in_turn as u8 + 1;
            let placement = self.placements[self.in_turn]
                .iter()
                .find(|p| p.mv == (mv.x, mv.y))
                .cloned()
                .ok_or_else(|| {
                    GameError::IllegalMove(format!("({}, {}) flanks nothing", mv.x, mv.y))
                })?;

            self.set_cell(mv.x, mv.y, mark);
            for (fx, fy) in placement.flips {
                self.set_cell(fx, fy, mark);
            }
        }

        self.in_turn = 1 - self.in_turn;
        self.refresh_placements();
        Ok(self.outcome())
    }

    fn available_actions(&self) -> (Vec<(u8, u8)>, bool) {
        if self.done {
            return (Vec::new(), false);
        }

        let moves: Vec<(u8, u8)> = self.placements[self.in_turn]
            .iter()
            .map(|p| p.mv)
            .collect();
        let pass = moves.is_empty();

        (moves, pass)
    }

    fn players(&self) -> [String; 2] {
        self.players.clone()
    }

    fn set_players(&mut self, players: [String; 2]) {
        self.players = players;
    }

    fn state(&self) -> (String, String) {
        let digits: String = self.cells.iter().map(|c| (b'0' + c) as char).collect();
        (digits, self.in_turn_name().to_string())
    }

    fn set_state(&mut self, state: &str, player_in_turn: &str) -> MoveOutcome {
        let padded = format!("{:0>width$}", state, width = self.cells.len());

        self.done = false;
        self.in_turn = if player_in_turn == self.players[1] { 1 } else { 0 };
        for (cell, digit) in self.cells.iter_mut().zip(padded.bytes()) {
            *cell = match digit {
                b'1' => 1,
                b'2' => 2,
                _ => EMPTY,
            };
        }

        self.refresh_placements();
        self.outcome()
    }

    fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn render(&self) -> String {
        let columns = "   A B C D E F G H";
        let mut out = String::new();
        out.push('\n');
        for r in (0..self.size).rev() {
            out.push_str(&format!("{} ", r + 1));
            for c in 0..self.size {
                let mark = match self.cell(c, r) {
                    1 => &self.players[0][..1],
                    2 => &self.players[1][..1],
                    _ => " ",
                };
                out.push('|');
                out.push_str(mark);
            }
            out.push_str("|\n");
        }
        out.push_str(&columns[0..4 + 2 * (self.size as usize - 1)]);
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Othello {
        Othello::new(4, "B", "W").unwrap()
    }

    #[test]
    fn only_othello_sizes_are_accepted() {
        assert!(Othello::new(4, "B", "W").is_ok());
        assert!(Othello::new(6, "B", "W").is_ok());
        assert!(Othello::new(8, "B", "W").is_ok());
        assert!(matches!(
            Othello::new(5, "B", "W"),
            Err(GameError::UnsupportedSize(5))
        ));
    }

    #[test]
    fn opening_position_has_four_discs() {
        let g = game();
        let (state, player) = g.state();
        assert_eq!(player, "B");
        assert_eq!(state.bytes().filter(|&b| b != b'0').count(), 4);
        // B at (1,1) and (2,2), W at (1,2) and (2,1): idx = x*4+y
        assert_eq!(state, "0000012002100000");
    }

    #[test]
    fn opening_moves_for_black() {
        let g = game();
        let (mut moves, pass) = g.available_actions();
        moves.sort();
        assert!(!pass);
        // Four symmetric flanking squares
        assert_eq!(moves, vec![(0, 2), (1, 3), (2, 0), (3, 1)]);
    }

    #[test]
    fn a_move_flips_the_flanked_line() {
        let mut g = game();
        let outcome = g.apply(Move::place(1, 3)).unwrap();
        assert!(!outcome.done);

        // The W disc at (1,2) is now B
        assert_eq!(g.cell(1, 3), 1);
        assert_eq!(g.cell(1, 2), 1);
        let (_, player) = g.state();
        assert_eq!(player, "W");
    }

    #[test]
    fn non_flanking_move_is_rejected() {
        let mut g = game();
        assert!(matches!(
            g.apply(Move::place(0, 0)),
            Err(GameError::IllegalMove(_))
        ));
    }

    #[test]
    fn pass_with_placements_is_rejected() {
        let mut g = game();
        assert!(matches!(
            g.apply(Move::PASS),
            Err(GameError::IllegalMove(_))
        ));
    }

    #[test]
    fn set_state_restores_position_and_turn() {
        let mut g = game();
        g.apply(Move::place(1, 3)).unwrap();
        let (state, player) = g.state();

        let mut other = game();
        let outcome = other.set_state(&state, &player);
        assert!(!outcome.done);
        assert_eq!(other.state(), (state, player));
    }

    #[test]
    fn full_board_majority_wins() {
        let mut g = game();
        // All B except one W corner: B wins on disc count
        let state = "1111111111111112";
        let outcome = g.set_state(state, "B");
        assert!(outcome.done);
        assert_eq!(outcome.winner.as_deref(), Some("B"));
    }

    #[test]
    fn equal_counts_draw_when_board_is_full() {
        let mut g = game();
        let state = "1111111122222222";
        let outcome = g.set_state(state, "B");
        assert!(outcome.done);
        assert_eq!(outcome.winner, None);
    }

    #[test]
    fn terminal_position_reports_no_actions() {
        let mut g = game();
        g.set_state("1111111111111112", "B");
        let (moves, pass) = g.available_actions();
        assert!(moves.is_empty());
        assert!(!pass);
    }

    #[test]
    fn player_without_placements_must_pass() {
        let mut g = game();
        // Column 0 holds empty,W,B,B from the bottom: B can take (0,0) by
        // flanking the W disc, while no empty square flanks a B line for W.
        let outcome = g.set_state("0211000000000000", "W");
        assert!(!outcome.done);
        let (moves, pass) = g.available_actions();
        assert!(moves.is_empty());
        assert!(pass);

        let after_pass = g.apply(Move::PASS).unwrap();
        assert!(!after_pass.done);
        // B is in turn again after the pass
        let (_, player) = g.state();
        assert_eq!(player, "B");
        let (moves, pass) = g.available_actions();
        assert!(!pass);
        assert!(moves.contains(&(0, 0)));
    }
}
