use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use delve_engine::api::{simulate_encounter, EncounterConfig};
use delve_engine::config::GameConfig;
use delve_engine::content::{builtin_scenario, default_party, default_scenario};
use delve_engine::encounter::xp_for_cr;
use delve_engine::game::{load_scenario_or_default, GameContext};
use delve_engine::save::{load_party_or_default, save_party};
use delve_engine::scene::{Interface, RunSummary, Scenario, ScriptedInterface};
use delve_engine::{
    calculate_encounter_difficulty, Character, ChallengeRating, Dice, MonsterFactory,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Ui {
    /// Prompt on stdin
    Console,
    /// Replay --choice answers, then always take the first option
    Auto,
}

#[derive(Subcommand)]
enum Cmd {
    /// Roll a dice expression such as 2d6+3
    Roll {
        expr: String,
        /// RNG seed for determinism
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Number of rolls
        #[arg(long, default_value_t = 1)]
        times: u32,
    },
    /// Rate an encounter for a party
    Difficulty {
        /// Party member level (repeat per member)
        #[arg(long = "level", required = true)]
        levels: Vec<u32>,
        /// Monster challenge rating, e.g. 1/4 (repeat per monster)
        #[arg(long = "cr", required = true)]
        crs: Vec<ChallengeRating>,
    },
    /// Run one fight and print the combat log
    Fight {
        /// Monster id (repeat per monster)
        #[arg(
            long = "monster",
            default_values_t = ["goblin".to_string(), "goblin".to_string()]
        )]
        monsters: Vec<String>,
        /// Party JSON file (built-in party when omitted)
        #[arg(long)]
        party: Option<PathBuf>,
        /// RNG seed for determinism
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Safety cap on rounds
        #[arg(long, default_value_t = 30)]
        max_rounds: u32,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Play a scenario from its start scene to an ending
    Play {
        /// Scenario JSON/YAML (built-in goblin hunt when omitted)
        #[arg(long)]
        scenario: Option<PathBuf>,
        /// Party JSON file (built-in party when omitted)
        #[arg(long)]
        party: Option<PathBuf>,
        /// Write the party here when the scenario ends
        #[arg(long)]
        save: Option<PathBuf>,
        /// Game config JSON/YAML
        #[arg(long)]
        config: Option<PathBuf>,
        /// RNG seed (config seed, then entropy, when omitted)
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_enum, default_value_t = Ui::Console)]
        interface: Ui,
        /// Scripted answer for the auto interface (repeatable, 0-based)
        #[arg(long = "choice")]
        choices: Vec<usize>,
    },
    /// Serialize the built-in party to JSON (stdout)
    PartyDump {
        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },
    /// List the built-in monsters
    Monsters,
}

#[derive(Parser)]
#[command(name = "delve")]
#[command(about = "D&D 5e encounter and scenario harness")]
struct Cli {
    /// Debug logging (otherwise RUST_LOG, default warn)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

/// Line-based prompts on stdin/stdout. End of input picks the first option.
struct ConsoleInterface<R> {
    input: R,
}

impl<R: BufRead> ConsoleInterface<R> {
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl<R: BufRead> Interface for ConsoleInterface<R> {
    fn show(&mut self, text: &str) {
        println!("{text}");
    }

    fn choose(&mut self, prompt: &str, options: &[String]) -> usize {
        println!("{prompt}");
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {option}", i + 1);
        }
        loop {
            print!("> ");
            let _ = io::stdout().flush();
            let Some(answer) = self.read_line() else {
                return 0;
            };
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return n - 1,
                _ => println!("enter a number from 1 to {}", options.len()),
            }
        }
    }

    fn pause(&mut self) {
        print!("(enter)");
        let _ = io::stdout().flush();
        self.read_line();
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

/// Unreadable party files fall back to the built-in party with a warning.
fn party_from(path: Option<&Path>) -> Vec<Character> {
    path.map_or_else(default_party, load_party_or_default)
}

/// Unreadable scenario files fall back to the built-in intro with a warning.
fn scenario_from(path: Option<&Path>) -> Scenario {
    match path {
        Some(p) => load_scenario_or_default(p),
        None => builtin_scenario("goblin_hunt").unwrap_or_else(default_scenario),
    }
}

struct PlayResult {
    summary: RunSummary,
    party: Vec<Character>,
    map: Option<String>,
}

fn play(
    ui: &mut dyn Interface,
    mut scenario: Scenario,
    party: Vec<Character>,
    config: &GameConfig,
    dice: Dice,
) -> anyhow::Result<PlayResult> {
    let mut ctx = GameContext::new(party, dice, ui);
    ctx.configure(config);
    ctx.map = scenario.map.take();
    let summary = scenario
        .manager
        .run(&mut ctx)
        .with_context(|| format!("running scenario {}", scenario.name))?;
    Ok(PlayResult { summary, map: ctx.map.as_ref().map(|m| m.ascii()), party: ctx.party })
}

fn print_summary(result: &PlayResult) {
    let summary = &result.summary;
    println!();
    println!("scenario results");
    println!("----------------");
    println!("scenes played:      {}", summary.path.join(" -> "));
    println!("survivors:          {}", summary.survivors.join(", "));
    println!("fallen:             {}", summary.fallen.join(", "));
    for (counter, value) in summary.state.iter() {
        println!("{:<20}{value}", format!("{counter}:"));
    }
    if let Some(map) = &result.map {
        println!();
        println!("{map}");
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Cmd::Roll { expr, seed, times } => {
            let mut dice = Dice::from_seed(seed);
            for _ in 0..times {
                let total = dice.roll_expr(&expr).with_context(|| format!("rolling {expr}"))?;
                println!("{total}");
            }
        }
        Cmd::Difficulty { levels, crs } => {
            let result = calculate_encounter_difficulty(&levels, &crs);
            let t = result.thresholds;
            println!("{}", result.summary());
            println!(
                "thresholds: easy={} medium={} hard={} deadly={}",
                t.easy, t.medium, t.hard, t.deadly
            );
        }
        Cmd::Fight { monsters, party, seed, max_rounds, json } => {
            let mut cfg = EncounterConfig::new(monsters, seed);
            cfg.party_path = party.map(|p| p.to_string_lossy().into_owned());
            cfg.combat.max_rounds = max_rounds;
            let result = simulate_encounter(&cfg)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                for line in &result.log {
                    println!("{line}");
                }
                println!("difficulty={} xp_awarded={}", result.difficulty, result.xp_awarded);
            }
        }
        Cmd::Play { scenario, party, save, config, seed, interface, choices } => {
            let config = match &config {
                Some(p) => GameConfig::load(p)
                    .with_context(|| format!("loading config from {}", p.display()))?,
                None => GameConfig::default(),
            };
            let scenario = scenario_from(scenario.as_deref());
            let party = party_from(party.as_deref());
            if party.is_empty() {
                bail!("the party is empty");
            }
            let dice = match seed.or(config.seed) {
                Some(seed) => {
                    info!(seed, "seeded run");
                    Dice::from_seed(seed)
                }
                None => Dice::from_entropy(),
            };

            let result = match interface {
                Ui::Console => {
                    let stdin = io::stdin();
                    let mut ui = ConsoleInterface { input: stdin.lock() };
                    play(&mut ui, scenario, party, &config, dice)?
                }
                Ui::Auto => {
                    let mut ui = ScriptedInterface::new(choices);
                    let result = play(&mut ui, scenario, party, &config, dice)?;
                    for line in ui.transcript() {
                        println!("{line}");
                    }
                    debug!(unused = ui.remaining_answers(), "scripted answers left over");
                    result
                }
            };
            print_summary(&result);
            if let Some(path) = save {
                save_party(&path, &result.party)
                    .with_context(|| format!("saving party to {}", path.display()))?;
                println!("party saved to {}", path.display());
            }
        }
        Cmd::PartyDump { pretty } => {
            let party = default_party();
            if pretty {
                println!("{}", serde_json::to_string_pretty(&party)?);
            } else {
                println!("{}", serde_json::to_string(&party)?);
            }
        }
        Cmd::Monsters => {
            let factory = MonsterFactory::builtin();
            for id in factory.ids() {
                let Some(m) = factory.get(id) else { continue };
                let xp = m.xp.or_else(|| xp_for_cr(m.challenge_rating)).unwrap_or(0);
                println!(
                    "{id:<14} {:<14} CR {:<4} AC {:<2} HP {:<3} XP {xp}",
                    m.name, m.challenge_rating.to_string(), m.armor_class, m.hit_points
                );
            }
        }
    }
    Ok(())
}
