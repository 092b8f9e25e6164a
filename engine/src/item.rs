use serde::{Deserialize, Serialize};

use crate::dice::DiceExpr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub damage: DiceExpr,
    #[serde(default = "default_damage_type")]
    pub damage_type: String,
    #[serde(default)]
    pub attack_bonus: i32,
    #[serde(default)]
    pub finesse: bool,
    #[serde(default)]
    pub ranged: bool,
}

fn default_damage_type() -> String {
    "bludgeoning".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmorCategory {
    Light,
    Medium,
    Heavy,
    Shield,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Armor {
    pub armor_class: i32,
    pub category: ArmorCategory,
    #[serde(default)]
    pub stealth_disadvantage: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum PotionEffect {
    Healing { dice: DiceExpr },
    SpellSlot { level: u8 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemKind {
    Weapon(Weapon),
    Armor(Armor),
    Potion(PotionEffect),
    Gear,
}

/// Anything that can sit in an inventory or a merchant's stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price in gold pieces.
    pub value: u32,
    #[serde(default)]
    pub weight: f32,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl Item {
    pub fn weapon(name: &str, damage: DiceExpr, damage_type: &str, value: u32) -> Self {
        Self {
            name: name.to_string(),
            description: format!("{damage} {damage_type}"),
            value,
            weight: 0.0,
            kind: ItemKind::Weapon(Weapon {
                damage,
                damage_type: damage_type.to_string(),
                attack_bonus: 0,
                finesse: false,
                ranged: false,
            }),
        }
    }

    pub fn armor(name: &str, armor_class: i32, category: ArmorCategory, value: u32) -> Self {
        Self {
            name: name.to_string(),
            description: format!("AC {armor_class}"),
            value,
            weight: 0.0,
            kind: ItemKind::Armor(Armor { armor_class, category, stealth_disadvantage: false }),
        }
    }

    pub fn healing_potion(name: &str, dice: DiceExpr, value: u32) -> Self {
        Self {
            name: name.to_string(),
            description: format!("Restores {dice} HP"),
            value,
            weight: 0.5,
            kind: ItemKind::Potion(PotionEffect::Healing { dice }),
        }
    }

    pub fn mana_potion(name: &str, level: u8, value: u32) -> Self {
        Self {
            name: name.to_string(),
            description: format!("Restores one level {level} spell slot"),
            value,
            weight: 0.5,
            kind: ItemKind::Potion(PotionEffect::SpellSlot { level }),
        }
    }

    pub fn gear(name: &str, value: u32) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            value,
            weight: 0.0,
            kind: ItemKind::Gear,
        }
    }

    pub fn with_flags(mut self, finesse: bool, ranged: bool) -> Self {
        if let ItemKind::Weapon(w) = &mut self.kind {
            w.finesse = finesse;
            w.ranged = ranged;
        }
        self
    }

    pub fn is_healing_potion(&self) -> bool {
        matches!(self.kind, ItemKind::Potion(PotionEffect::Healing { .. }))
    }

    /// What a merchant pays for this item.
    pub fn resale_value(&self) -> u32 {
        self.value / 2
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} gp)", self.name, self.value)
    }
}
