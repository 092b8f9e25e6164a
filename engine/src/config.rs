use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Ability;
use crate::dice::DiceExpr;
use crate::error::LoadError;
use crate::load::read_structured;

pub const DEFAULT_MAX_ROUNDS: u32 = 30;
pub const DEFAULT_FRONT_LINE: usize = 3;
pub const DEFAULT_LOOT_CHANCE: i32 = 50;

/// Damage used by a character with no weapon equipped, chosen by a
/// case-insensitive substring of the class name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDamage {
    pub class: String,
    pub dice: DiceExpr,
    pub ability: Ability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageTable {
    pub entries: Vec<ClassDamage>,
    pub fallback: ClassDamage,
}

impl Default for DamageTable {
    fn default() -> Self {
        let row = |class: &str, count, sides, ability| ClassDamage {
            class: class.to_string(),
            dice: DiceExpr::new(count, sides, 0),
            ability,
        };
        Self {
            entries: vec![
                row("fighter", 1, 8, Ability::Str),
                row("paladin", 1, 8, Ability::Str),
                row("barbarian", 1, 12, Ability::Str),
                row("rogue", 1, 6, Ability::Dex),
                row("ranger", 1, 6, Ability::Dex),
                row("cleric", 1, 6, Ability::Str),
                row("wizard", 1, 4, Ability::Dex),
                row("sorcerer", 1, 4, Ability::Dex),
            ],
            fallback: row("", 1, 8, Ability::Str),
        }
    }
}

impl DamageTable {
    pub fn lookup(&self, class_name: &str) -> &ClassDamage {
        let lowered = class_name.to_lowercase();
        self.entries
            .iter()
            .find(|e| lowered.contains(&e.class.to_lowercase()))
            .unwrap_or(&self.fallback)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Rounds before the fight is called a stalemate.
    pub max_rounds: u32,
    /// Party slots that monsters must get through first.
    pub front_line_size: usize,
    /// Per-item drop chance on a kill, in percent.
    pub loot_chance_percent: i32,
    pub damage_table: DamageTable,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            front_line_size: DEFAULT_FRONT_LINE,
            loot_chance_percent: DEFAULT_LOOT_CHANCE,
            damage_table: DamageTable::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub combat: CombatConfig,
    /// Counters merged over the built-in starting state.
    pub starting_state: IndexMap<String, i64>,
    pub seed: Option<u64>,
    /// Extra monster book merged over the built-in one.
    pub monsters_path: Option<String>,
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        read_structured(path)
    }
}
