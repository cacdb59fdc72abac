use std::path::PathBuf;

use anyhow::{Context, Result};
use chain_tycoon::prelude::*;
use clap::{Parser, ValueEnum};

/// Plays scripted policies against seeded games and prints a summary table.
#[derive(Parser, Debug)]
#[command(name = "autoplay")]
struct Args {
    /// Policies to play
    #[arg(short, long, value_enum, default_values_t = [PolicyArg::Idle, PolicyArg::Greedy, PolicyArg::Curriculum])]
    policy: Vec<PolicyArg>,

    /// Ticks per run
    #[arg(short, long, default_value_t = AutoplayBuilder::DEFAULT_CYCLES)]
    cycles: usize,

    /// Number of seeds, starting at --first-seed
    #[arg(short, long, default_value_t = 20)]
    seeds: u64,

    #[arg(long, default_value_t = 0)]
    first_seed: u64,

    /// JSON file with rule overrides
    #[arg(short, long)]
    rules: Option<PathBuf>,

    #[arg(long)]
    csv: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    Idle,
    Greedy,
    Curriculum,
}

fn main() -> Result<()> {
    playground::init_tracing("warn");
    let args = Args::parse();

    let mut builder = AutoplayBuilder::new()
        .cycles(args.cycles)
        .seeds(args.first_seed..args.first_seed + args.seeds);
    for policy in args.policy {
        builder = match policy {
            PolicyArg::Idle => builder.add_policy(Idle::new()),
            PolicyArg::Greedy => builder.add_policy(Greedy::new()),
            PolicyArg::Curriculum => builder.add_policy(Curriculum::new()),
        };
    }
    if let Some(path) = args.rules {
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        builder = builder.rules(Rules::from_json(&json)?);
    }

    let format = if args.csv { Format::Csv } else { Format::PrettyPrint };
    let results = builder.build()?.run_all()?.format(format);

    println!("{}", results);

    Ok(())
}
