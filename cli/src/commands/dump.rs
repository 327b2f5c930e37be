//! The dump subcommand: print the raw contents of a stored tree.
//!
//! Output is line-per-record plain text: first every node-map entry as
//! `state|player|actions-addr`, then every actions block as its records
//! `(visits|points|move -> child state:player)`.

use anyhow::{anyhow, Result};
use mcts::RunState;
use treestore::{TreeStore, UNASSIGNED};

use crate::commands::format_move;
use crate::config::DumpArgs;

pub fn run(args: DumpArgs) -> Result<()> {
    args.tree.validate()?;
    let name = args.tree.tree_name();

    for suffix in ["-map.bin", "-ovfl.bin", "-actions.bin"] {
        let path = format!("{}{}", name, suffix);
        if !std::path::Path::new(&path).exists() {
            return Err(anyhow!("no tree file {}", path));
        }
    }

    // Player names live in the state file; fall back to positional labels
    let (player_a, player_b) = match RunState::load(&args.tree.state_path())? {
        Some(state) => (state.player_a, state.player_b),
        None => ("A".to_string(), "B".to_string()),
    };

    let mut store = TreeStore::open(&name, &player_a, &player_b, "", 10, false)?;

    println!("Nodes:");
    store.for_each_node(|key, value| {
        let player = if key.player_is_a() {
            &player_a
        } else {
            &player_b
        };
        let addr = if value.actions_addr == UNASSIGNED {
            "*".to_string()
        } else {
            value.actions_addr.to_string()
        };
        let end = if value.is_end { "|end" } else { "" };
        println!("{}|{}|{}{}", key.state(), player, addr, end);
    })?;

    println!("\nActions:");
    store.for_each_block(|addr, records| {
        let rendered: Vec<String> = records
            .iter()
            .map(|r| {
                let player = if r.child_key.player_is_a() {
                    &player_a
                } else {
                    &player_b
                };
                format!(
                    "({}|{:.1}|{} -> {}:{})",
                    r.visits,
                    r.points as f64 / 2.0,
                    format_move(r.game_move()),
                    r.child_key.state(),
                    player,
                )
            })
            .collect();
        println!("{} -> {}", addr, rendered.join(", "));
    })?;

    Ok(())
}
