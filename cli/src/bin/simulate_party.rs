use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use delve_engine::api::{simulate_encounter_many, EncounterConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "simulate-party")]
#[command(about = "Monte Carlo sim: many fights of the party against a monster group")]
struct Args {
    /// Monster id (repeat per monster)
    #[arg(
        long = "monster",
        default_values_t = ["goblin".to_string(), "goblin".to_string(), "goblin".to_string()]
    )]
    monsters: Vec<String>,

    /// Number of trials
    #[arg(long, default_value_t = 1000)]
    trials: u32,

    /// RNG base seed (trial i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Safety cap on rounds per trial
    #[arg(long, default_value_t = 30)]
    max_rounds: u32,

    /// Party JSON file (built-in party when omitted)
    #[arg(long)]
    party: Option<PathBuf>,

    /// Extra monster book JSON merged over the built-in one
    #[arg(long)]
    monsters_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut cfg = EncounterConfig::new(args.monsters.iter().cloned(), args.seed);
    cfg.party_path = args.party.as_ref().map(|p| p.to_string_lossy().into_owned());
    cfg.monsters_path = args.monsters_file.as_ref().map(|p| p.to_string_lossy().into_owned());
    cfg.combat.max_rounds = args.max_rounds;

    let stats = simulate_encounter_many(&cfg, args.trials)
        .with_context(|| format!("simulating against {}", args.monsters.join(", ")))?;

    println!("simulate-party results");
    println!("----------------------");
    println!("trials:             {}", stats.trials);
    println!("monsters:           {}", args.monsters.join(", "));
    println!("difficulty:         {}", stats.difficulty);
    println!("round cap:          {}", args.max_rounds);
    println!();
    println!("win rate:           {:.1}%", stats.win_rate * 100.0);
    println!("defeats:            {}", stats.defeats);
    println!("stalemates:         {}", stats.stalemates);
    println!("hit rate:           {:.1}%", stats.hit_rate * 100.0);
    println!("crit rate:          {:.1}%", stats.crit_rate * 100.0);
    println!("avg survivors:      {:.2}", stats.avg_survivors);
    println!("avg rounds (wins):  {:.2}", stats.avg_rounds);
    println!("median rounds:      {}", stats.median_rounds);

    Ok(())
}
