//! The learn subcommand: drive the MCTS loop until the round budget is
//! reached or the user interrupts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use engine_core::BoardGame;
use indicatif::{ProgressBar, ProgressStyle};
use mcts::{Journal, JournalSettings, RoundOutcome, SearchConfig, SearchError, Tree, TreeStats};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{error, info};
use treestore::TreeStore;

use crate::commands::build_game;
use crate::config::{central, LearnArgs};

pub async fn run(args: LearnArgs) -> Result<()> {
    args.validate()?;

    let game = build_game(&args.tree)?;
    let (initial_state, _) = game.state();
    let players = game.players();
    let cell_count = game.cell_count();
    let name = args.tree.tree_name();

    std::fs::create_dir_all(&args.tree.data_dir)?;

    info!(
        game = args.tree.game_name(),
        tree = %name,
        max_rounds = args.max_rounds,
        force_new = args.force_new,
        "Learn starting"
    );

    let store = TreeStore::open(
        &name,
        &players[0],
        &players[1],
        &initial_state,
        args.states,
        args.force_new,
    )?;

    let settings = JournalSettings {
        high_threshold: central().journal.high_threshold,
        low_threshold: central().journal.low_threshold,
        visits_threshold: central().journal.visits_threshold,
    };
    let journal = Journal::new(&name, settings, cell_count);

    let config = SearchConfig {
        max_rounds: args.max_rounds,
        exploration: central().search.exploration,
        random_round_rate: central().search.random_round_rate,
        warmup_rounds: central().search.warmup_rounds,
        stats_interval: central().search.stats_interval,
    };

    let tree = Tree::new(
        game,
        store,
        journal,
        config,
        args.tree.state_path(),
        args.force_new,
        ChaCha20Rng::from_entropy(),
    )?;

    // First interrupt asks the loop to stop at the next round boundary;
    // a second one during shutdown exits immediately.
    let cancel = Arc::new(AtomicBool::new(false));
    let signal_handle = {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                error!("Failed to listen for ctrl+c signal");
                return;
            }
            info!("Interrupt received, stopping after the current round");
            cancel.store(true, Ordering::Relaxed);

            if tokio::signal::ctrl_c().await.is_ok() {
                error!("Second interrupt, exiting immediately");
                std::process::exit(2);
            }
        })
    };

    let stats = tokio::task::spawn_blocking(move || learn_loop(tree, cancel)).await??;
    signal_handle.abort();

    info!(
        rounds = stats.rounds,
        unique_nodes = stats.n_nodes,
        reused_nodes = stats.n_reused_nodes,
        unexpanded_nodes = stats.n_unexpanded_nodes,
        "Learning finished"
    );

    Ok(())
}

/// The blocking loop: one round at a time, checking the cancel flag at
/// each iteration boundary.
fn learn_loop(mut tree: Tree, cancel: Arc<AtomicBool>) -> Result<TreeStats, SearchError> {
    let bar = ProgressBar::new(tree.max_rounds());
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} rounds [{elapsed_precise}]")
            .expect("static template"),
    );
    bar.set_position(tree.rounds());

    loop {
        if cancel.load(Ordering::Relaxed) {
            info!(rounds = tree.rounds(), "Learning cancelled");
            break;
        }

        match tree.learn_round()? {
            RoundOutcome::Learned => bar.inc(1),
            RoundOutcome::Finished => break,
        }
    }

    bar.finish_and_clear();
    tree.shutdown()?;

    Ok(tree.stats())
}
