use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub mod api;
pub mod character;
pub mod combat;
pub mod config;
pub mod content;
pub mod dice;
pub mod encounter;
pub mod error;
pub mod exploration;
pub mod game;
pub mod item;
pub mod load;
pub mod merchant;
pub mod monster;
pub mod save;
pub mod scene;

pub use character::{Character, CharacterClass, Spell};
pub use dice::DiceExpr;
pub use encounter::{calculate_encounter_difficulty, ChallengeRating, Difficulty};
pub use error::{DiceError, LoadError, SceneError};
pub use item::Item;
pub use monster::{Monster, MonsterFactory};

#[derive(Debug, Clone)]
enum Source {
    Seeded(ChaCha8Rng),
    Scripted { values: Vec<i32>, cursor: usize },
}

/// Source of every random number in the engine.
///
/// Seeded dice are reproducible; scripted dice replay a fixed cycle of face
/// values and always resolve random choices to the first candidate.
#[derive(Debug, Clone)]
pub struct Dice {
    source: Source,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self { source: Source::Seeded(ChaCha8Rng::seed_from_u64(seed)) }
    }

    pub fn from_entropy() -> Self {
        Self { source: Source::Seeded(ChaCha8Rng::from_entropy()) }
    }

    pub fn from_scripted(values: Vec<i32>) -> Self {
        Self { source: Source::Scripted { values, cursor: 0 } }
    }

    /// One die with `sides` faces (1..=sides).
    pub fn die(&mut self, sides: u32) -> i32 {
        let sides = sides.max(1) as i32;
        match &mut self.source {
            Source::Seeded(rng) => rng.gen_range(1..=sides),
            Source::Scripted { values, cursor } => {
                if values.is_empty() {
                    return 1;
                }
                let v = values[*cursor % values.len()];
                *cursor += 1;
                v
            }
        }
    }

    pub fn d20(&mut self) -> i32 {
        self.die(20)
    }

    pub fn percent(&mut self) -> i32 {
        self.die(100)
    }

    /// Uniform index into a collection of `len` candidates.
    pub fn pick(&mut self, len: usize) -> usize {
        match &mut self.source {
            Source::Seeded(rng) if len > 1 => rng.gen_range(0..len),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
}

/// The six ability scores, serialized with their three-letter keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abilities {
    #[serde(rename = "str")]
    pub str_: i32,
    pub dex: i32,
    pub con: i32,
    #[serde(rename = "int")]
    pub int_: i32,
    pub wis: i32,
    pub cha: i32,
}

impl Default for Abilities {
    fn default() -> Self {
        Self { str_: 10, dex: 10, con: 10, int_: 10, wis: 10, cha: 10 }
    }
}

impl Abilities {
    pub fn new(str_: i32, dex: i32, con: i32, int_: i32, wis: i32, cha: i32) -> Self {
        Self { str_, dex, con, int_, wis, cha }
    }

    pub fn score(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Str => self.str_,
            Ability::Dex => self.dex,
            Ability::Con => self.con,
            Ability::Int => self.int_,
            Ability::Wis => self.wis,
            Ability::Cha => self.cha,
        }
    }

    pub fn mod_of(&self, ability: Ability) -> i32 {
        ability_mod(self.score(ability))
    }
}

/// D&D ability modifier = floor((score - 10) / 2) for integer scores.
pub fn ability_mod(score: i32) -> i32 {
    // `div_euclid` with positive divisor matches mathematical floor division.
    (score - 10).div_euclid(2)
}
