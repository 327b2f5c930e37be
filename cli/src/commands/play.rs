//! The play subcommand: an interactive game against the learned tree.

use std::io::Write;

use anyhow::{anyhow, Result};
use engine_core::{BoardGame, Move};
use mcts::{PlayResult, PlayTree, RunState};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use treestore::TreeStore;

use crate::commands::{build_game, format_move};
use crate::config::PlayArgs;

pub fn run(args: PlayArgs) -> Result<()> {
    let mut game = build_game(&args.tree)?;
    let name = args.tree.tree_name();

    // A stored tree knows its player names; the game must use the same
    if let Some(state) = RunState::load(&args.tree.state_path())? {
        game.set_players([state.player_a, state.player_b]);
    }
    let players = game.players();
    let (initial_state, _) = game.state();

    let store = TreeStore::open_for_play(&name, &players[0], &players[1], &initial_state)?;
    // Only Othello ever requires a pass
    let pass_allowed = args.tree.game == 1;

    let mut play = PlayTree::new(game, store, ChaCha20Rng::from_entropy());

    println!("Ready to play!");
    if args.first {
        play.reset_human_first()?;
    } else {
        let opening = play.reset_engine_first()?;
        if let Some(reply) = opening.reply {
            println!("Opponent played {}", format_move(reply));
        }
    }
    print!("{}", play.render());

    let stdin = std::io::stdin();
    loop {
        print!("Column [A,B...]{}: ", if pass_allowed { ", empty to pass" } else { "" });
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let column = line.trim().to_uppercase();

        let mv = if column.is_empty() && pass_allowed {
            Move::PASS
        } else {
            let Some(x) = "ABCDEFGH".find(&column).filter(|_| column.len() == 1) else {
                println!("Not a valid column");
                continue;
            };

            print!("Row [1,2...]: ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            if stdin.read_line(&mut line)? == 0 {
                return Ok(());
            }
            let Ok(row) = line.trim().parse::<u8>() else {
                println!("Not a valid row");
                continue;
            };
            if row == 0 {
                println!("Not a valid row");
                continue;
            }

            Move::place(x as u8, row - 1)
        };

        let result = match play.human_move(mv) {
            Ok(result) => result,
            Err(e) => return Err(anyhow!("error while making move: {}", e)),
        };

        if let Some(reply) = result.reply {
            println!("Opponent played {}", format_move(reply));
        }
        print!("{}", play.render());

        if result.done {
            report_outcome(&result);
            return Ok(());
        }
    }
}

fn report_outcome(result: &PlayResult) {
    match &result.winner {
        Some(winner) => println!("Winner is {}", winner),
        None => println!("Game is a draw"),
    }
}
