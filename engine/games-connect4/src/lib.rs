//! Vertical four-in-a-row game implementation for the Arbor engine
//!
//! Discs drop into one of 7 columns on a 6-row grid; the first player to
//! line up four discs horizontally, vertically or diagonally wins. Players
//! choose only the column, the row follows from gravity, and there is no
//! pass move.
//!
//! # Usage
//!
//! ```rust
//! use games_connect4::register_connect4;
//! use engine_core::{create_game, BoardGame, GameOptions};
//!
//! register_connect4();
//! let game = create_game("connect4", &GameOptions::default()).unwrap();
//! assert_eq!(game.cell_count(), 42);
//! ```

use engine_core::{register_game, BoardGame, GameError, Move, MoveOutcome};

/// Board width in columns.
pub const COLUMNS: u8 = 7;
/// Board height in rows.
pub const ROWS: u8 = 6;
/// Discs in a row needed to win.
const TARGET: i16 = 4;

const EMPTY: u8 = 0;

/// Register the game with the global registry under `"connect4"`.
///
/// The board has a fixed geometry, so the size option is ignored.
pub fn register_connect4() {
    register_game("connect4".to_string(), |_options| {
        Ok(Box::new(Connect4::new("B", "W")))
    });
}

/// Vertical four-in-a-row on the classic 7×6 grid.
///
/// Cells hold `0` (empty), `1` (first player) or `2` (second player),
/// indexed `x * ROWS + y` with row 0 at the bottom, matching the digit
/// order of the state string.
#[derive(Debug)]
pub struct Connect4 {
    cells: Vec<u8>,
    players: [String; 2],
    in_turn: usize,
    moves_played: usize,
    done: bool,
}

impl Connect4 {
    /// Create a new game with the given player names.
    pub fn new(player_a: &str, player_b: &str) -> Self {
        let mut game = Self {
            cells: vec![EMPTY; COLUMNS as usize * ROWS as usize],
            players: [player_a.to_string(), player_b.to_string()],
            in_turn: 0,
            moves_played: 0,
            done: false,
        };
        game.reset();

        game
    }

    fn cell(&self, x: u8, y: u8) -> u8 {
        self.cells[x as usize * ROWS as usize + y as usize]
    }

    fn set_cell(&mut self, x: u8, y: u8, value: u8) {
        self.cells[x as usize * ROWS as usize + y as usize] = value;
    }

    fn in_turn_name(&self) -> &str {
        &self.players[self.in_turn]
    }

    /// Lowest empty row of a column, if any.
    fn drop_row(&self, column: u8) -> Option<u8> {
        (0..ROWS).find(|&r| self.cell(column, r) == EMPTY)
    }

    /// Evaluate the board after a change. Sets `done` on a win and returns
    /// true when the position is a draw (full board, no winner).
    fn evaluate(&mut self) -> bool {
        // Runs are scanned from every occupied cell in the four distinct
        // line directions; longer runs re-detect from their start cell.
        const LINE_DIRS: [(i16, i16); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

        for x in 0..COLUMNS as i16 {
            for y in 0..ROWS as i16 {
                let mark = self.cell(x as u8, y as u8);
                if mark == EMPTY {
                    continue;
                }

                for (dx, dy) in LINE_DIRS {
                    let end_x = x + dx * (TARGET - 1);
                    let end_y = y + dy * (TARGET - 1);
                    if !(0..COLUMNS as i16).contains(&end_x) || !(0..ROWS as i16).contains(&end_y)
                    {
                        continue;
                    }

                    if (1..TARGET)
                        .all(|i| self.cell((x + dx * i) as u8, (y + dy * i) as u8) == mark)
                    {
                        self.done = true;
                        return false;
                    }
                }
            }
        }

        self.moves_played == self.cells.len()
    }
}

impl BoardGame for Connect4 {
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
        if mv.x >= COLUMNS {
            return Err(GameError::IllegalMove(format!(
                "column {} is off the board",
                mv.x
            )));
        }
        let row = self
            .drop_row(mv.x)
            .ok_or_else(|| GameError::IllegalMove("column is full".to_string()))?;

        self.set_cell(mv.x, row, self.in_turn as u8 + 1);
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

        let actions = (0..COLUMNS)
            .filter(|&x| self.cell(x, ROWS - 1) == EMPTY)
            .map(|x| (x, 0))
            .collect();

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
        let columns = "   A B C D E F G";
        let mut out = String::new();
        out.push('\n');
        for r in (0..ROWS).rev() {
            out.push_str(&format!("{} ", r + 1));
            for c in 0..COLUMNS {
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
        out.push_str(columns);
        out.push('\n');
        out
    }
}

impl Default for Connect4 {
    fn default() -> Self {
        Self::new("B", "W")
    }
}
