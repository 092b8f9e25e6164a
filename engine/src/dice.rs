use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Dice;
use crate::error::DiceError;

/// Largest accepted dice count and die size.
pub const MAX_DICE: u32 = 1000;
/// Largest accepted flat modifier, either sign.
pub const MAX_MODIFIER: i32 = 10_000;

/// Parsed `NdS[+B|-B]` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiceExpr {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

impl DiceExpr {
    pub const fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self { count, sides, modifier }
    }

    pub fn parse(src: &str) -> Result<Self, DiceError> {
        let compact: String = src.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(DiceError::Empty);
        }
        let lowered = compact.to_ascii_lowercase();
        let (count_part, rest) = lowered
            .split_once('d')
            .ok_or_else(|| DiceError::MissingSeparator(src.to_string()))?;

        let count: u32 = count_part
            .parse()
            .map_err(|_| DiceError::BadCount(src.to_string()))?;
        if count == 0 {
            return Err(DiceError::BadCount(src.to_string()));
        }

        let (sides_part, modifier) = match rest.find(['+', '-']) {
            Some(pos) => {
                let (sides, m) = rest.split_at(pos);
                let value: i64 = m[1..]
                    .parse()
                    .map_err(|_| DiceError::BadModifier(src.to_string()))?;
                let value = if m.starts_with('-') { -value } else { value };
                let value =
                    i32::try_from(value).map_err(|_| DiceError::OutOfRange(src.to_string()))?;
                (sides, value)
            }
            None => (rest, 0),
        };
        let sides: u32 = sides_part
            .parse()
            .map_err(|_| DiceError::BadSides(src.to_string()))?;
        if sides == 0 {
            return Err(DiceError::BadSides(src.to_string()));
        }

        if count > MAX_DICE
            || sides > MAX_DICE
            || !(-MAX_MODIFIER..=MAX_MODIFIER).contains(&modifier)
        {
            return Err(DiceError::OutOfRange(src.to_string()));
        }

        Ok(Self { count, sides, modifier })
    }

    pub fn roll(&self, dice: &mut Dice) -> i32 {
        self.roll_n(dice, self.count)
    }

    /// Critical damage: twice the dice, modifier once.
    pub fn roll_crit(&self, dice: &mut Dice) -> i32 {
        self.roll_n(dice, self.count.saturating_mul(2))
    }

    fn roll_n(&self, dice: &mut Dice, n: u32) -> i32 {
        (0..n)
            .map(|_| dice.die(self.sides))
            .fold(self.modifier, i32::saturating_add)
    }

    pub fn min(&self) -> i32 {
        i32::try_from(self.count).unwrap_or(i32::MAX).saturating_add(self.modifier)
    }

    pub fn max(&self) -> i32 {
        let faces = u64::from(self.count) * u64::from(self.sides);
        i32::try_from(faces).unwrap_or(i32::MAX).saturating_add(self.modifier)
    }

    pub fn average(&self) -> f64 {
        f64::from(self.count) * (f64::from(self.sides) + 1.0) / 2.0 + f64::from(self.modifier)
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modifier {
            0 => write!(f, "{}d{}", self.count, self.sides),
            m if m > 0 => write!(f, "{}d{}+{}", self.count, self.sides, m),
            m => write!(f, "{}d{}-{}", self.count, self.sides, m.abs()),
        }
    }
}

impl FromStr for DiceExpr {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for DiceExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DiceExpr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl Dice {
    /// Parse and roll in one step.
    pub fn roll_expr(&mut self, expr: &str) -> Result<i32, DiceError> {
        Ok(DiceExpr::parse(expr)?.roll(self))
    }
}
