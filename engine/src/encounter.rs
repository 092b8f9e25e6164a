use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::Dice;
use crate::dice::DiceExpr;
use crate::error::DiceError;

/// Published challenge rating. Accepts `0.25` or `"1/4"` when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct ChallengeRating(pub f64);

impl ChallengeRating {
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Finite and not negative.
    pub fn checked(value: f64) -> Result<Self, String> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(format!("challenge rating {value} is out of range"))
        }
    }

    /// Table key in eighths (1/8 → 1, 1/4 → 2, 1 → 8). `None` when the value
    /// is not a whole number of eighths.
    fn eighths(self) -> Option<u32> {
        let scaled = self.0 * 8.0;
        if !self.0.is_finite() || self.0 < 0.0 || (scaled - scaled.round()).abs() > 1e-6 {
            return None;
        }
        Some(scaled.round() as u32)
    }
}

impl fmt::Display for ChallengeRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.eighths() {
            Some(1) => f.write_str("1/8"),
            Some(2) => f.write_str("1/4"),
            Some(4) => f.write_str("1/2"),
            _ => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for ChallengeRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> Deserialize<'de> for ChallengeRating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Self::checked(n).map_err(serde::de::Error::custom),
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl std::str::FromStr for ChallengeRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bad = || format!("bad challenge rating '{s}'");
        let value = if let Some((num, den)) = s.split_once('/') {
            let num: f64 = num.trim().parse().map_err(|_| bad())?;
            let den: f64 = den.trim().parse().map_err(|_| bad())?;
            if den == 0.0 {
                return Err(bad());
            }
            num / den
        } else {
            s.parse().map_err(|_| bad())?
        };
        Self::checked(value)
    }
}

// XP by CR; fractional entries first, then CR 1..=30.
const FRACTIONAL_XP: [(u32, u32); 4] = [(0, 10), (1, 25), (2, 50), (4, 100)];
const XP_BY_WHOLE_CR: [u32; 30] = [
    200, 450, 700, 1_100, 1_800, 2_300, 2_900, 3_900, 5_000, 5_900, // 1-10
    7_200, 8_400, 10_000, 11_500, 13_000, 15_000, 18_000, 20_000, 22_000, 25_000, // 11-20
    33_000, 41_000, 50_000, 62_000, 75_000, 90_000, 105_000, 120_000, 135_000, 155_000, // 21-30
];

/// XP value of a single monster of the given challenge rating.
pub fn xp_for_cr(cr: ChallengeRating) -> Option<u32> {
    let eighths = cr.eighths()?;
    if let Some(&(_, xp)) = FRACTIONAL_XP.iter().find(|(k, _)| *k == eighths) {
        return Some(xp);
    }
    if eighths % 8 != 0 {
        return None;
    }
    let whole = (eighths / 8) as usize;
    XP_BY_WHOLE_CR.get(whole.checked_sub(1)?).copied()
}

/// Encounter-size multiplier in tenths (×1.5 → 15).
pub fn encounter_multiplier_tenths(monster_count: usize) -> u64 {
    match monster_count {
        0 | 1 => 10,
        2 => 15,
        3..=6 => 20,
        7..=10 => 25,
        11..=14 => 30,
        _ => 40,
    }
}

pub fn encounter_multiplier(monster_count: usize) -> f64 {
    encounter_multiplier_tenths(monster_count) as f64 / 10.0
}

/// Easy / medium / hard / deadly XP thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Thresholds {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
    pub deadly: u32,
}

impl std::ops::Add for Thresholds {
    type Output = Thresholds;

    fn add(self, rhs: Thresholds) -> Thresholds {
        Thresholds {
            easy: self.easy + rhs.easy,
            medium: self.medium + rhs.medium,
            hard: self.hard + rhs.hard,
            deadly: self.deadly + rhs.deadly,
        }
    }
}

const fn t(easy: u32, medium: u32, hard: u32, deadly: u32) -> Thresholds {
    Thresholds { easy, medium, hard, deadly }
}

const THRESHOLDS_BY_LEVEL: [Thresholds; 20] = [
    t(25, 50, 75, 100),
    t(50, 100, 150, 200),
    t(75, 150, 225, 400),
    t(125, 250, 375, 500),
    t(250, 500, 750, 1_100),
    t(300, 600, 900, 1_400),
    t(350, 750, 1_100, 1_700),
    t(450, 900, 1_400, 2_100),
    t(550, 1_100, 1_600, 2_400),
    t(600, 1_200, 1_900, 2_800),
    t(800, 1_600, 2_400, 3_600),
    t(1_000, 2_000, 3_000, 4_500),
    t(1_100, 2_200, 3_400, 5_100),
    t(1_250, 2_500, 3_800, 5_700),
    t(1_400, 2_800, 4_300, 6_400),
    t(1_600, 3_200, 4_800, 7_200),
    t(2_000, 3_900, 5_900, 8_800),
    t(2_100, 4_200, 6_300, 9_500),
    t(2_400, 4_900, 7_300, 10_900),
    t(2_800, 5_700, 8_500, 12_700),
];

/// Per-character thresholds; levels outside 1..=20 use the level-1 row.
pub fn thresholds_for_level(level: u32) -> Thresholds {
    level
        .checked_sub(1)
        .and_then(|i| THRESHOLDS_BY_LEVEL.get(i as usize))
        .copied()
        .unwrap_or(THRESHOLDS_BY_LEVEL[0])
}

pub fn party_thresholds(levels: &[u32]) -> Thresholds {
    levels
        .iter()
        .map(|&lvl| thresholds_for_level(lvl))
        .fold(Thresholds::default(), |acc, t| acc + t)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Trivial,
    Easy,
    Medium,
    Hard,
    Deadly,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Trivial => "trivial",
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Deadly => "deadly",
        }
    }

    pub fn classify(adjusted_xp: u32, thresholds: Thresholds) -> Self {
        if adjusted_xp < thresholds.easy {
            Difficulty::Trivial
        } else if adjusted_xp < thresholds.medium {
            Difficulty::Easy
        } else if adjusted_xp < thresholds.hard {
            Difficulty::Medium
        } else if adjusted_xp < thresholds.deadly {
            Difficulty::Hard
        } else {
            Difficulty::Deadly
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EncounterDifficulty {
    pub monster_xp: u32,
    pub multiplier: f64,
    pub adjusted_xp: u32,
    pub thresholds: Thresholds,
    pub difficulty: Difficulty,
}

impl EncounterDifficulty {
    pub fn summary(&self) -> String {
        format!(
            "monster_xp={} x{:.1} adjusted_xp={} difficulty={}",
            self.monster_xp, self.multiplier, self.adjusted_xp, self.difficulty
        )
    }
}

/// Classify an encounter from party levels and monster challenge ratings.
pub fn calculate_encounter_difficulty(
    party_levels: &[u32],
    monster_crs: &[ChallengeRating],
) -> EncounterDifficulty {
    let monster_xp: u32 = monster_crs
        .iter()
        .map(|&cr| {
            xp_for_cr(cr).unwrap_or_else(|| {
                warn!(cr = cr.0, "challenge rating not in XP table, counting 0 XP");
                0
            })
        })
        .sum();
    let tenths = encounter_multiplier_tenths(monster_crs.len());
    let adjusted_xp = (u64::from(monster_xp) * tenths / 10) as u32;
    let thresholds = party_thresholds(party_levels);

    EncounterDifficulty {
        monster_xp,
        multiplier: tenths as f64 / 10.0,
        adjusted_xp,
        thresholds,
        difficulty: Difficulty::classify(adjusted_xp, thresholds),
    }
}

/* ---------------- character advancement ---------------- */

const XP_FOR_LEVEL: [u32; 20] = [
    0, 300, 900, 2_700, 6_500, 14_000, 23_000, 34_000, 48_000, 64_000, 85_000, 100_000, 120_000,
    140_000, 165_000, 195_000, 225_000, 265_000, 305_000, 355_000,
];

pub const MAX_LEVEL: u32 = 20;

/// Total XP needed to reach `level`.
pub fn xp_for_level(level: u32) -> Option<u32> {
    level
        .checked_sub(1)
        .and_then(|i| XP_FOR_LEVEL.get(i as usize))
        .copied()
}

pub fn level_for_xp(xp: u32) -> u32 {
    XP_FOR_LEVEL.iter().rposition(|&need| xp >= need).map_or(1, |i| i as u32 + 1)
}

/* ---------------- random encounter tables ---------------- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomEncounterEntry {
    /// `"3"` or an inclusive range `"1-2"`.
    pub roll: String,
    #[serde(default)]
    pub monsters: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl RandomEncounterEntry {
    pub fn matches(&self, rolled: i32) -> bool {
        match self.roll.split_once('-') {
            Some((lo, hi)) => match (lo.trim().parse::<i32>(), hi.trim().parse::<i32>()) {
                (Ok(lo), Ok(hi)) => (lo..=hi).contains(&rolled),
                _ => false,
            },
            None => self.roll.trim().parse::<i32>() == Ok(rolled),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomEncounterTable {
    pub name: String,
    pub die: DiceExpr,
    pub entries: Vec<RandomEncounterEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RolledEncounter<'a> {
    pub rolled: i32,
    pub entry: &'a RandomEncounterEntry,
}

impl RandomEncounterTable {
    pub fn new(
        name: impl Into<String>,
        die: &str,
        entries: Vec<RandomEncounterEntry>,
    ) -> Result<Self, DiceError> {
        Ok(Self { name: name.into(), die: DiceExpr::parse(die)?, entries })
    }

    /// Roll the table die; `None` when no entry covers the result.
    pub fn roll(&self, dice: &mut Dice) -> Option<RolledEncounter<'_>> {
        let rolled = self.die.roll(dice);
        self.entries
            .iter()
            .find(|e| e.matches(rolled))
            .map(|entry| RolledEncounter { rolled, entry })
    }
}
