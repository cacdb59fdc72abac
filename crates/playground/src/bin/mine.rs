use std::time::Instant;

use anyhow::Result;
use chain_tycoon::prelude::*;
use clap::Parser;
use tracing::{info, warn};

/// Searches for a nonce whose SHA-256 digest starts with enough zeros.
#[derive(Parser, Debug)]
#[command(name = "mine")]
struct Args {
    /// Block payload to hash
    #[arg(short, long, default_value = "genesis")]
    payload: String,

    /// Required number of leading zero hex digits
    #[arg(short, long, default_value_t = 4)]
    difficulty: u32,

    /// Give up after this many attempts
    #[arg(short, long)]
    max_attempts: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    playground::init_tracing("info");
    let args = Args::parse();

    let mut search = NonceSearch::new(args.payload, args.difficulty);
    if let Some(max) = args.max_attempts {
        search = search.max_attempts(max);
    }

    let cancel = CancelFlag::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling search");
            on_signal.cancel();
        }
    });

    let started = Instant::now();
    let proof = search.run(&cancel).await?;
    info!(
        attempts = proof.attempts,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "proof found"
    );

    println!("nonce {}\nhash  {}", proof.nonce, proof.hash);

    Ok(())
}
