pub mod dump;
pub mod learn;
pub mod play;

use anyhow::Result;
use engine_core::{BoardGame, GameOptions};

use crate::config::TreeArgs;

/// Construct the selected game with its canonical player names.
pub fn build_game(args: &TreeArgs) -> Result<Box<dyn BoardGame>> {
    args.validate()?;
    let options = GameOptions { size: args.size };
    Ok(engine_core::create_game(args.game_name(), &options)?)
}

/// Format a move as board notation (column letter plus 1-based row).
/// Off-board coordinates (the root sentinel) print numerically.
pub fn format_move(mv: engine_core::Move) -> String {
    if mv.pass {
        return "pass".to_string();
    }
    if mv.x >= 26 {
        return format!("{},{}", mv.x, mv.y);
    }
    format!("{}{}", (b'A' + mv.x) as char, u16::from(mv.y) + 1)
}
