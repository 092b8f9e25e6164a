use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dice::DiceExpr;
use crate::encounter::{xp_for_cr, ChallengeRating};
use crate::error::LoadError;
use crate::item::Item;
use crate::load::read_json;
use crate::{Abilities, Dice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Melee,
    Ranged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Damage {
    pub dice: DiceExpr,
    pub damage_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub kind: ActionKind,
    pub attack_bonus: i32,
    pub damages: Vec<Damage>,
    /// Normal range in feet.
    pub range: u32,
}

impl Action {
    pub fn roll_damage(&self, dice: &mut Dice, crit: bool) -> i32 {
        self.damages
            .iter()
            .map(|d| if crit { d.dice.roll_crit(dice) } else { d.dice.roll(dice) })
            .sum()
    }
}

/// A per-encounter monster instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub id: String,
    pub name: String,
    pub abilities: Abilities,
    pub armor_class: i32,
    pub hit_points: i32,
    pub max_hit_points: i32,
    pub hit_dice: String,
    pub challenge_rating: ChallengeRating,
    pub xp: u32,
    pub speed: u32,
    pub actions: Vec<Action>,
    #[serde(default)]
    pub loot: Vec<Item>,
}

impl Monster {
    pub fn is_alive(&self) -> bool {
        self.hit_points > 0
    }
}

/* ---------------- data file format ---------------- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub attack_bonus: i32,
    pub damage: DiceExpr,
    pub damage_type: String,
    #[serde(default)]
    pub additional_damage: Option<DiceExpr>,
    #[serde(default)]
    pub additional_damage_type: Option<String>,
    #[serde(default = "default_range")]
    pub range: u32,
}

fn default_range() -> u32 {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterRecord {
    pub name: String,
    pub abilities: Abilities,
    pub armor_class: i32,
    pub hit_points: i32,
    #[serde(default)]
    pub hit_dice: String,
    #[serde(default)]
    pub xp: Option<u32>,
    #[serde(default = "default_speed")]
    pub speed: u32,
    pub challenge_rating: ChallengeRating,
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
    #[serde(default)]
    pub loot: Vec<Item>,
}

fn default_speed() -> u32 {
    30
}

impl MonsterRecord {
    pub fn instantiate(&self, id: &str, name: Option<&str>) -> Monster {
        let actions = self
            .actions
            .iter()
            .map(|a| {
                let mut damages =
                    vec![Damage { dice: a.damage, damage_type: a.damage_type.clone() }];
                if let Some(extra) = a.additional_damage {
                    damages.push(Damage {
                        dice: extra,
                        damage_type: a
                            .additional_damage_type
                            .clone()
                            .unwrap_or_else(|| a.damage_type.clone()),
                    });
                }
                Action {
                    name: a.name.clone(),
                    kind: a.kind,
                    attack_bonus: a.attack_bonus,
                    damages,
                    range: a.range,
                }
            })
            .collect();

        Monster {
            id: id.to_string(),
            name: name.unwrap_or(&self.name).to_string(),
            abilities: self.abilities,
            armor_class: self.armor_class,
            hit_points: self.hit_points,
            max_hit_points: self.hit_points,
            hit_dice: self.hit_dice.clone(),
            challenge_rating: self.challenge_rating,
            xp: self.xp.or_else(|| xp_for_cr(self.challenge_rating)).unwrap_or(0),
            speed: self.speed,
            actions,
            loot: self.loot.clone(),
        }
    }
}

/// Monster id → stat block, as stored in monster data files.
pub type MonsterBook = IndexMap<String, MonsterRecord>;

pub fn load_monster_book(path: &Path) -> Result<MonsterBook, LoadError> {
    read_json(path)
}

/// Materializes fresh monster instances for each encounter.
#[derive(Debug, Clone, Default)]
pub struct MonsterFactory {
    book: MonsterBook,
}

impl MonsterFactory {
    pub fn new(book: MonsterBook) -> Self {
        Self { book }
    }

    pub fn builtin() -> Self {
        Self::new(crate::content::builtin_monsters())
    }

    /// Merge another book; later entries override earlier ids.
    pub fn extend(&mut self, book: MonsterBook) {
        self.book.extend(book);
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.book.keys().map(String::as_str)
    }

    pub fn get(&self, id: &str) -> Option<&MonsterRecord> {
        self.book.get(id).or_else(|| self.book.get(&id.replace('-', "_")))
    }

    /// `None` (with a warning) when the id is unknown.
    pub fn create(&self, id: &str, name: Option<&str>) -> Option<Monster> {
        match self.get(id) {
            Some(record) => Some(record.instantiate(id, name)),
            None => {
                warn!(monster = id, "monster not found, skipping");
                None
            }
        }
    }

    /// Create every known id; unknown ids are skipped.
    pub fn create_many<S: AsRef<str>>(&self, ids: &[S]) -> Vec<Monster> {
        ids.iter().filter_map(|id| self.create(id.as_ref(), None)).collect()
    }
}
