//! Shared state threaded through a running scenario.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::character::Character;
use crate::config::{CombatConfig, GameConfig};
use crate::error::LoadError;
use crate::exploration::ExplorationMap;
use crate::load::read_structured;
use crate::merchant::MerchantRegistry;
use crate::monster::{load_monster_book, MonsterFactory};
use crate::scene::{Interface, Scenario};
use crate::Dice;

/// Ordered named counters (gold, reputation, victories, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameState {
    counters: IndexMap<String, i64>,
}

impl Default for GameState {
    fn default() -> Self {
        let counters = [
            ("gold", 100),
            ("gold_spent", 0),
            ("reputation", 0),
            ("combat_victories", 0),
            ("total_xp", 0),
            ("deaths", 0),
            ("locations_visited", 0),
            ("npcs_met", 0),
            ("quests_completed", 0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Self { counters }
    }
}

impl GameState {
    pub fn get(&self, key: &str) -> i64 {
        self.counters.get(key).copied().unwrap_or(0)
    }

    pub fn set(&mut self, key: &str, value: i64) {
        self.counters.insert(key.to_string(), value);
    }

    /// Add a signed delta; unknown counters start at zero.
    pub fn add(&mut self, key: &str, delta: i64) -> i64 {
        let slot = self.counters.entry(key.to_string()).or_insert(0);
        *slot += delta;
        *slot
    }

    /// Overlay configured starting values.
    pub fn merge(&mut self, overrides: &IndexMap<String, i64>) {
        for (k, v) in overrides {
            self.set(k, *v);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.counters.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

pub struct GameContext<'ui> {
    pub party: Vec<Character>,
    pub state: GameState,
    pub dice: Dice,
    pub monsters: MonsterFactory,
    pub merchants: MerchantRegistry,
    pub map: Option<ExplorationMap>,
    pub combat: CombatConfig,
    pub ui: &'ui mut dyn Interface,
}

impl<'ui> GameContext<'ui> {
    /// Built-in monsters and shops, default counters and combat rules.
    pub fn new(party: Vec<Character>, dice: Dice, ui: &'ui mut dyn Interface) -> Self {
        Self {
            party,
            state: GameState::default(),
            dice,
            monsters: MonsterFactory::builtin(),
            merchants: MerchantRegistry::with_defaults(),
            map: None,
            combat: CombatConfig::default(),
            ui,
        }
    }

    /// Apply a loaded config. An unreadable extra monster book is skipped.
    pub fn configure(&mut self, config: &GameConfig) {
        self.combat = config.combat.clone();
        self.state.merge(&config.starting_state);
        if let Some(path) = &config.monsters_path {
            match load_monster_book(Path::new(path)) {
                Ok(book) => self.monsters.extend(book),
                Err(err) => warn!(%err, "extra monster book not loaded"),
            }
        }
    }

    pub fn alive_count(&self) -> usize {
        self.party.iter().filter(|c| c.is_alive()).count()
    }
}

pub fn load_scenario(path: &Path) -> Result<Scenario, LoadError> {
    let raw: serde_json::Value = read_structured(path)?;
    let scenario = Scenario::from_value(raw)?;
    info!(scenario = %scenario.name, scenes = scenario.manager.len(), "scenario loaded");
    Ok(scenario)
}

/// Load a scenario, degrading to the built-in intro on any failure.
pub fn load_scenario_or_default(path: &Path) -> Scenario {
    load_scenario(path).unwrap_or_else(|err| {
        warn!(%err, "falling back to the default scenario");
        crate::content::default_scenario()
    })
}
