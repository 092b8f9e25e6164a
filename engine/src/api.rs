//! One-call entry points for running fights outside a scenario.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::combat::{run_combat, CombatEvent, CombatOutcome, CombatReport, Side};
use crate::config::CombatConfig;
use crate::content::default_party;
use crate::monster::{load_monster_book, MonsterFactory};
use crate::save::load_party;
use crate::Dice;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EncounterConfig {
    /// Monster ids; unknown ids are skipped with a warning.
    pub monsters: Vec<String>,
    /// Saved party JSON. The built-in party when absent.
    #[serde(default)]
    pub party_path: Option<String>,
    /// Extra monster book merged over the built-in one.
    #[serde(default)]
    pub monsters_path: Option<String>,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub combat: CombatConfig,
}

impl EncounterConfig {
    pub fn new<S: Into<String>>(monsters: impl IntoIterator<Item = S>, seed: u64) -> Self {
        Self {
            monsters: monsters.into_iter().map(Into::into).collect(),
            party_path: None,
            monsters_path: None,
            seed,
            combat: CombatConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EncounterResult {
    pub outcome: CombatOutcome,
    pub rounds: u32,
    pub difficulty: String,
    pub adjusted_xp: u32,
    pub xp_awarded: u32,
    pub survivors: Vec<String>,
    pub fallen: Vec<String>,
    pub monsters_remaining: Vec<String>,
    pub party: Vec<Character>,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EncounterStats {
    pub trials: u32,
    pub victories: u32,
    pub defeats: u32,
    pub stalemates: u32,
    pub difficulty: String,
    pub win_rate: f64,
    /// Party attacks only.
    pub hit_rate: f64,
    /// Share of party hits that were critical.
    pub crit_rate: f64,
    pub avg_rounds: f64,
    pub median_rounds: u32,
    pub avg_survivors: f64,
}

fn encounter_party(cfg: &EncounterConfig) -> Result<Vec<Character>> {
    match &cfg.party_path {
        Some(path) => load_party(Path::new(path))
            .with_context(|| format!("loading party from {path}")),
        None => Ok(default_party()),
    }
}

fn encounter_factory(cfg: &EncounterConfig) -> Result<MonsterFactory> {
    let mut factory = MonsterFactory::builtin();
    if let Some(path) = &cfg.monsters_path {
        let book = load_monster_book(Path::new(path))
            .with_context(|| format!("loading monsters from {path}"))?;
        factory.extend(book);
    }
    Ok(factory)
}

fn fight(
    party: &mut [Character],
    factory: &MonsterFactory,
    cfg: &EncounterConfig,
    seed: u64,
) -> Result<CombatReport> {
    let monsters = factory.create_many(&cfg.monsters);
    if monsters.is_empty() {
        bail!("none of the monsters {:?} are known", cfg.monsters);
    }
    let mut dice = Dice::from_seed(seed);
    Ok(run_combat(party, monsters, &mut dice, &cfg.combat))
}

pub fn simulate_encounter(cfg: &EncounterConfig) -> Result<EncounterResult> {
    let mut party = encounter_party(cfg)?;
    let factory = encounter_factory(cfg)?;
    let report = fight(&mut party, &factory, cfg, cfg.seed)?;
    Ok(EncounterResult {
        outcome: report.outcome,
        rounds: report.rounds,
        difficulty: report.difficulty.difficulty.to_string(),
        adjusted_xp: report.difficulty.adjusted_xp,
        xp_awarded: report.xp_awarded,
        survivors: report.survivors,
        fallen: report.fallen,
        monsters_remaining: report.monsters_remaining,
        party,
        log: report.log,
    })
}

/// Run `trials` independent fights with a fresh party each time; trial `i`
/// uses seed `cfg.seed + i`.
pub fn simulate_encounter_many(cfg: &EncounterConfig, trials: u32) -> Result<EncounterStats> {
    let template = encounter_party(cfg)?;
    let factory = encounter_factory(cfg)?;

    let mut stats = EncounterStats { trials, ..EncounterStats::default() };
    let (mut hits, mut misses, mut crits) = (0u64, 0u64, 0u64);
    let mut survivors = 0u64;
    let mut win_rounds = Vec::new();

    for i in 0..trials {
        let mut party = template.clone();
        let report = fight(&mut party, &factory, cfg, cfg.seed.wrapping_add(u64::from(i)))?;
        if stats.difficulty.is_empty() {
            stats.difficulty = report.difficulty.difficulty.to_string();
        }
        for event in &report.events {
            if let CombatEvent::Attack { attacker, hit, crit, .. } = event {
                if attacker.side != Side::Party {
                    continue;
                }
                match (*hit, *crit) {
                    (true, true) => {
                        hits += 1;
                        crits += 1;
                    }
                    (true, false) => hits += 1,
                    _ => misses += 1,
                }
            }
        }
        survivors += report.survivors.len() as u64;
        match report.outcome {
            CombatOutcome::Victory => {
                stats.victories += 1;
                win_rounds.push(report.rounds);
            }
            CombatOutcome::Defeat => stats.defeats += 1,
            CombatOutcome::Stalemate => stats.stalemates += 1,
        }
    }

    let ratio = |num: u64, den: u64| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    win_rounds.sort_unstable();
    stats.win_rate = ratio(u64::from(stats.victories), u64::from(trials));
    stats.hit_rate = ratio(hits, hits + misses);
    stats.crit_rate = ratio(crits, hits);
    let round_total = win_rounds.iter().map(|&r| u64::from(r)).sum();
    stats.avg_rounds = ratio(round_total, win_rounds.len() as u64);
    stats.median_rounds = median(&win_rounds);
    stats.avg_survivors = ratio(survivors, u64::from(trials));
    Ok(stats)
}

fn median(sorted: &[u32]) -> u32 {
    match sorted.len() {
        0 => 0,
        n if n % 2 == 1 => sorted[n / 2],
        n => (sorted[n / 2 - 1] + sorted[n / 2]) / 2,
    }
}
