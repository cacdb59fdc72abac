use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use chain_tycoon::prelude::*;
use clap::Parser;
use tracing::info;

/// Runs a live session: ticks on a timer while a script of actions is played,
/// then prints the final snapshot as JSON.
#[derive(Parser, Debug)]
#[command(name = "session")]
struct Args {
    /// Milliseconds between ticks
    #[arg(short, long, default_value_t = DEFAULT_TICK_PERIOD.as_millis() as u64)]
    tick_ms: u64,

    /// Stop after this many cycles (runs until ctrl-c otherwise)
    #[arg(short, long)]
    cycles: Option<u64>,

    /// JSON array of actions, e.g. [{"type":"build","payload":"miner"}]
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Milliseconds between scripted actions
    #[arg(long, default_value_t = 500)]
    action_ms: u64,

    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with rule overrides
    #[arg(short, long)]
    rules: Option<PathBuf>,
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    playground::init_tracing("info");
    let args = Args::parse();

    let mut builder = Game::builder();
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    if let Some(path) = &args.rules {
        builder = builder.rules(Rules::from_json(&read(path)?)?);
    }
    let actions: Vec<Action> = match &args.script {
        Some(path) => serde_json::from_str(&read(path)?)
            .with_context(|| format!("parsing {}", path.display()))?,
        None => vec![],
    };

    let session = Session::start(builder.build()?, Duration::from_millis(args.tick_ms))?;
    let mut snapshots = session.subscribe();

    let script = async {
        for action in actions {
            let outcome = session.dispatch(action).await?;
            info!(?action, ?outcome, "scripted action");
            tokio::time::sleep(Duration::from_millis(args.action_ms)).await;
        }
        Ok::<_, SessionError>(())
    };
    let until_done = async {
        while snapshots.changed().await.is_ok() {
            let cycle = snapshots.borrow_and_update().state.cycle;
            if args.cycles.is_some_and(|limit| cycle >= limit) {
                break;
            }
        }
    };

    tokio::select! {
        result = async { script.await?; until_done.await; Ok::<_, SessionError>(()) } => result?,
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
    }

    let game = session.shutdown().await?;
    println!("{}", game.snapshot().to_json_pretty()?);

    Ok(())
}
