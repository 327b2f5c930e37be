//! TicTacToe game implementation for the Arbor engine
//!
//! A complete reference implementation of the `BoardGame` trait on a square
//! board of configurable size. A full row, column or diagonal wins; a full
//! board with no winner is a draw. There are no pass moves.
//!
//! # Usage
//!
//! ```rust
//! use games_tictactoe::register_tictactoe;
//! use engine_core::{create_game, BoardGame, GameOptions};
//!
//! register_tictactoe();
//! let game = create_game("tictactoe", &GameOptions { size: 3 }).unwrap();
//! assert_eq!(game.cell_count(), 9);
//! ```

use engine_core::{register_game, BoardGame, GameError, Move, MoveOutcome};

/// Smallest board still worth playing on.
pub const MIN_SIZE: u8 = 3;
/// Largest board the state codec can key (64 base-3 digits).
pub const MAX_SIZE: u8 = 8;

const EMPTY: u8 = 0;

/// Register TicTacToe with the global game registry under `"tictactoe"`.
pub fn register_tictactoe() {
    register_game("tictactoe".to_string(), |options| {
        Ok(Box::new(TicTacToe::new(options.size, "X", "Y")?))
    });
}

/// TicTacToe on an `size` × `size` board.
///
/// Cells hold `0` (empty), `1` (first player) or `2` (second player),
/// indexed `x * size + y`, matching the digit order of the state string.
#[derive(Debug)]
pub struct TicTacToe {
    cells: Vec<u8>,
    players: [String; 2],
    in_turn: usize,
    size: u8,
    moves_played: usize,
    done: bool,
}

impl TicTacToe {
    /// Create a new game. Sizes outside 3..=8 are rejected: below three the
    /// game is degenerate, above eight the state no longer fits 64 digits.
    pub fn new(size: u8, player_a: &str, player_b: &str) -> Result<Self, GameError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(GameError::UnsupportedSize(size));
        }

        let mut game = Self {
            cells: vec![EMPTY; size as usize * size as usize],
            players: [player_a.to_string(), player_b.to_string()],
            in_turn: 0,
            size,
            moves_played: 0,
            done: false,
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

    /// Evaluate the board after a change. Sets `done` on a win and returns
    /// true when the position is a draw (full board, no winner).
    fn evaluate(&mut self) -> bool {
        let n = self.size;

        // Columns and rows
        for a in 0..n {
            let mut win_col = self.cell(a, 0) != EMPTY;
            let mut win_row = self.cell(0, a) != EMPTY;

            let mut b = 1;
            while b < n && (win_col || win_row) {
                if self.cell(a, 0) != self.cell(a, b) {
                    win_col = false;
                }
                if self.cell(0, a) != self.cell(b, a) {
                    win_row = false;
                }
                b += 1;
            }
            if win_col || win_row {
                self.done = true;
                return false;
            }
        }

        // Diagonals
        let mut win_d1 = self.cell(0, 0) != EMPTY;
        let mut win_d2 = self.cell(0, n - 1) != EMPTY;

        let mut a = 1;
        while a < n && (win_d1 || win_d2) {
            if self.cell(0, 0) != self.cell(a, a) {
                win_d1 = false;
            }
            if self.cell(0, n - 1) != self.cell(a, n - 1 - a) {
                win_d2 = false;
            }
            a += 1;
        }
        if win_d1 || win_d2 {
            self.done = true;
            return false;
        }

        self.moves_played == self.cells.len()
    }

    fn in_turn_name(&self) -> &str {
        &self.players[self.in_turn]
    }
}

impl BoardGame for TicTacToe {
    fn reset(&mut self) {
        self.cells.fill(EMPTY);
        self.moves_played = 0;
        self.in_turn = 0;
        self.done = false;
    }

    fn apply(&mut self, mv: Move) -> Result<MoveOutcome, GameError> {
        if mv.pass {
            return Err(GameError::IllegalMove("no pass moves".to_string()));
        }
        if mv.x >= self.size || mv.y >= self.size {
            return Err(GameError::IllegalMove(format!(
                "({}, {}) is off the board",
                mv.x, mv.y
            )));
        }
        if self.cell(mv.x, mv.y) != EMPTY {
            return Err(GameError::IllegalMove(
                "spot already occupied".to_string(),
            ));
        }

        self.set_cell(mv.x, mv.y, self.in_turn as u8 + 1);
        self.moves_played += 1;

        if self.evaluate() {
            return Ok(MoveOutcome::draw());
        }
        if self.done {
            return Ok(MoveOutcome::won(self.in_turn_name()));
        }

        self.in_turn = 1 - self.in_turn;
        Ok(MoveOutcome::ongoing())
    }

    fn available_actions(&self) -> (Vec<(u8, u8)>, bool) {
        if self.done {
            return (Vec::new(), false);
        }

        let mut actions = Vec::with_capacity(self.cells.len() - self.moves_played);
        for x in 0..self.size {
            for y in 0..self.size {
                if self.cell(x, y) == EMPTY {
                    actions.push((x, y));
                }
            }
        }

        (actions, false)
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

        self.moves_played = 0;
        self.done = false;
        self.in_turn = if player_in_turn == self.players[1] { 1 } else { 0 };
        for (cell, digit) in self.cells.iter_mut().zip(padded.bytes()) {
            *cell = match digit {
                b'1' => 1,
                b'2' => 2,
                _ => EMPTY,
            };
            if *cell != EMPTY {
                self.moves_played += 1;
            }
        }

        if self.evaluate() {
            return MoveOutcome::draw();
        }
        if self.done {
            // The winner is reported as the player in turn at this state,
            // matching how the search credits terminal replays.
            return MoveOutcome::won(self.in_turn_name());
        }

        MoveOutcome::ongoing()
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
