use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dice::DiceExpr;
use crate::encounter::{MAX_LEVEL, xp_for_level};
use crate::item::{ArmorCategory, Item, ItemKind, PotionEffect};
use crate::{Abilities, Ability, Dice};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterClass {
    pub name: String,
    pub hit_die: u32,
    #[serde(default)]
    pub caster: bool,
    /// Ability used for spell attacks and healing.
    #[serde(default)]
    pub spellcasting_ability: Option<Ability>,
}

impl CharacterClass {
    pub fn new(name: &str, hit_die: u32) -> Self {
        Self { name: name.to_string(), hit_die, caster: false, spellcasting_ability: None }
    }

    pub fn caster(name: &str, hit_die: u32, ability: Ability) -> Self {
        Self {
            name: name.to_string(),
            hit_die,
            caster: true,
            spellcasting_ability: Some(ability),
        }
    }

    pub fn fighter() -> Self {
        Self::new("Fighter", 10)
    }

    pub fn paladin() -> Self {
        Self::new("Paladin", 10)
    }

    pub fn barbarian() -> Self {
        Self::new("Barbarian", 12)
    }

    pub fn ranger() -> Self {
        Self::new("Ranger", 10)
    }

    pub fn rogue() -> Self {
        Self::new("Rogue", 8)
    }

    pub fn cleric() -> Self {
        Self::caster("Cleric", 8, Ability::Wis)
    }

    pub fn wizard() -> Self {
        Self::caster("Wizard", 6, Ability::Int)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spell {
    pub name: String,
    /// 0 for cantrips.
    pub level: u8,
    #[serde(default)]
    pub healing: Option<DiceExpr>,
    #[serde(default)]
    pub damage: Option<DiceExpr>,
    /// Saving throw for half damage. Spells without one use a spell attack
    /// unless they always hit.
    #[serde(default)]
    pub save: Option<Ability>,
    #[serde(default)]
    pub auto_hit: bool,
    /// Separate bolts per casting, each resolved on its own.
    #[serde(default = "one_projectile")]
    pub projectiles: u8,
}

fn one_projectile() -> u8 {
    1
}

impl Spell {
    fn new(name: &str, level: u8) -> Self {
        Self {
            name: name.to_string(),
            level,
            healing: None,
            damage: None,
            save: None,
            auto_hit: false,
            projectiles: 1,
        }
    }

    fn dealing(mut self, dice: DiceExpr) -> Self {
        self.damage = Some(dice);
        self
    }

    pub fn cure_wounds() -> Self {
        Self { healing: Some(DiceExpr::new(1, 8, 0)), ..Self::new("Cure Wounds", 1) }
    }

    pub fn fire_bolt() -> Self {
        Self::new("Fire Bolt", 0).dealing(DiceExpr::new(1, 10, 0))
    }

    pub fn sacred_flame() -> Self {
        Self {
            save: Some(Ability::Dex),
            ..Self::new("Sacred Flame", 0).dealing(DiceExpr::new(1, 8, 0))
        }
    }

    pub fn guiding_bolt() -> Self {
        Self::new("Guiding Bolt", 1).dealing(DiceExpr::new(4, 6, 0))
    }

    pub fn magic_missile() -> Self {
        Self {
            auto_hit: true,
            projectiles: 3,
            ..Self::new("Magic Missile", 1).dealing(DiceExpr::new(1, 4, 1))
        }
    }

    pub fn scorching_ray() -> Self {
        Self { projectiles: 3, ..Self::new("Scorching Ray", 2).dealing(DiceExpr::new(2, 6, 0)) }
    }

    pub fn is_cantrip(&self) -> bool {
        self.level == 0
    }
}

/// What drinking a potion did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PotionOutcome {
    Healed(i32),
    SlotRestored(u8),
    /// Slot potion with no room for another slot of its level.
    Wasted,
}

// Full-caster slots by character level, index = spell level - 1.
const SPELL_SLOTS: [[u8; 9]; 20] = [
    [2, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 0, 0, 0, 0, 0, 0, 0, 0],
    [4, 2, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 2, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 1, 0, 0, 0, 0, 0],
    [4, 3, 3, 2, 0, 0, 0, 0, 0],
    [4, 3, 3, 3, 1, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 2, 1, 1],
];

const ABILITY_IMPROVEMENT_LEVELS: [u32; 5] = [4, 8, 12, 16, 19];

pub fn full_caster_slots(level: u32) -> BTreeMap<u8, u8> {
    let row = level.clamp(1, MAX_LEVEL) as usize - 1;
    SPELL_SLOTS[row]
        .iter()
        .enumerate()
        .filter(|&(_, &n)| n > 0)
        .map(|(i, &n)| (i as u8 + 1, n))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelUp {
    pub from: u32,
    pub to: u32,
    pub hp_gain: i32,
    pub ability_score_improvement: bool,
}

/// A player character. Inventory, equipment and spell tracking are always
/// present, empty when unused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub abilities: Abilities,
    pub class: CharacterClass,
    pub level: u32,
    #[serde(default)]
    pub xp: u32,
    pub hit_points: i32,
    pub max_hit_points: i32,
    pub armor_class: i32,
    #[serde(default)]
    pub gold: u32,
    #[serde(default)]
    pub inventory: Vec<Item>,
    #[serde(default)]
    pub equipped_weapon: Option<Item>,
    #[serde(default)]
    pub equipped_armor: Option<Item>,
    #[serde(default)]
    pub equipped_shield: Option<Item>,
    #[serde(default)]
    pub spells: Vec<Spell>,
    #[serde(default)]
    pub spell_slots: BTreeMap<u8, u8>,
    #[serde(default)]
    pub kills: Vec<String>,
    #[serde(default)]
    pub pending_ability_improvements: u32,
}

impl Character {
    /// Level-appropriate character with max hit die at level 1 and average
    /// rolls afterwards.
    pub fn new(name: &str, class: CharacterClass, abilities: Abilities, level: u32) -> Self {
        let level = level.clamp(1, MAX_LEVEL);
        let con = abilities.mod_of(Ability::Con);
        let first = class.hit_die as i32 + con;
        let per_level = (class.hit_die as i32 / 2 + 1 + con).max(1);
        let max_hp = (first + per_level * (level as i32 - 1)).max(1);
        let spell_slots = if class.caster { full_caster_slots(level) } else { BTreeMap::new() };
        Self {
            name: name.to_string(),
            armor_class: 10 + abilities.mod_of(Ability::Dex),
            abilities,
            class,
            level,
            xp: xp_for_level(level).unwrap_or(0),
            hit_points: max_hp,
            max_hit_points: max_hp,
            gold: 0,
            inventory: Vec::new(),
            equipped_weapon: None,
            equipped_armor: None,
            equipped_shield: None,
            spells: Vec::new(),
            spell_slots,
            kills: Vec::new(),
            pending_ability_improvements: 0,
        }
    }

    pub fn with_gold(mut self, gold: u32) -> Self {
        self.gold = gold;
        self
    }

    pub fn with_spell(mut self, spell: Spell) -> Self {
        self.spells.push(spell);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.inventory.push(item);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.hit_points > 0
    }

    pub fn hp_ratio(&self) -> f64 {
        if self.max_hit_points <= 0 {
            return 0.0;
        }
        f64::from(self.hit_points) / f64::from(self.max_hit_points)
    }

    pub fn ability_mod(&self, ability: Ability) -> i32 {
        self.abilities.mod_of(ability)
    }

    pub fn proficiency_bonus(&self) -> i32 {
        2 + (self.level.max(1) as i32 - 1) / 4
    }

    /// Heal up to max HP and return the amount actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if amount <= 0 {
            return 0;
        }
        let before = self.hit_points;
        self.hit_points = (self.hit_points + amount).min(self.max_hit_points);
        self.hit_points - before
    }

    /// Subtract damage; returns true when this hit dropped the character.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        let was_up = self.is_alive();
        self.hit_points -= amount.max(0);
        was_up && !self.is_alive()
    }

    pub fn add_item(&mut self, item: Item) {
        self.inventory.push(item);
    }

    pub fn remove_item(&mut self, index: usize) -> Option<Item> {
        (index < self.inventory.len()).then(|| self.inventory.remove(index))
    }

    /// Equip a weapon; the previous one goes back to the inventory.
    pub fn equip_weapon(&mut self, weapon: Item) {
        if !matches!(weapon.kind, ItemKind::Weapon(_)) {
            self.inventory.push(weapon);
            return;
        }
        if let Some(previous) = self.equipped_weapon.replace(weapon) {
            self.inventory.push(previous);
        }
    }

    /// Wear body armor or carry a shield, one of each. Whatever it replaces
    /// goes back to the inventory and AC is recomputed.
    pub fn equip_armor(&mut self, armor: Item) {
        let ItemKind::Armor(stats) = &armor.kind else {
            self.inventory.push(armor);
            return;
        };
        let slot = if stats.category == ArmorCategory::Shield {
            &mut self.equipped_shield
        } else {
            &mut self.equipped_armor
        };
        if let Some(previous) = slot.replace(armor) {
            self.inventory.push(previous);
        }
        self.armor_class = self.computed_armor_class();
    }

    /// Body armor (10 unarmored) plus DEX as the armor category allows,
    /// plus the shield.
    pub fn computed_armor_class(&self) -> i32 {
        let dex = self.ability_mod(Ability::Dex);
        let body = match self.equipped_armor.as_ref().map(|i| &i.kind) {
            Some(ItemKind::Armor(a)) => match a.category {
                ArmorCategory::Light => a.armor_class + dex,
                ArmorCategory::Medium => a.armor_class + dex.min(2),
                ArmorCategory::Heavy | ArmorCategory::Shield => a.armor_class,
            },
            _ => 10 + dex,
        };
        let shield = match self.equipped_shield.as_ref().map(|i| &i.kind) {
            Some(ItemKind::Armor(a)) => a.armor_class,
            _ => 0,
        };
        body + shield
    }

    pub fn healing_potion_index(&self) -> Option<usize> {
        self.inventory.iter().position(Item::is_healing_potion)
    }

    /// First potion that restores a slot of `level`.
    pub fn mana_potion_index(&self, level: u8) -> Option<usize> {
        self.inventory.iter().position(|i| {
            matches!(i.kind, ItemKind::Potion(PotionEffect::SpellSlot { level: l }) if l == level)
        })
    }

    /// Drink the potion at `index`. None when that slot holds no potion.
    pub fn drink_potion(&mut self, index: usize, dice: &mut Dice) -> Option<(Item, PotionOutcome)> {
        let ItemKind::Potion(effect) = &self.inventory.get(index)?.kind else {
            return None;
        };
        let effect = effect.clone();
        let potion = self.inventory.remove(index);
        let outcome = match effect {
            PotionEffect::Healing { dice: expr } => {
                PotionOutcome::Healed(self.heal(expr.roll(dice)))
            }
            PotionEffect::SpellSlot { level } if self.restore_slot(level) => {
                PotionOutcome::SlotRestored(level)
            }
            PotionEffect::SpellSlot { .. } => PotionOutcome::Wasted,
        };
        Some((potion, outcome))
    }

    /// Regain one spell slot, never beyond the class maximum for this level.
    pub fn restore_slot(&mut self, spell_level: u8) -> bool {
        if !self.class.caster || spell_level == 0 {
            return false;
        }
        let cap = full_caster_slots(self.level).get(&spell_level).copied().unwrap_or(0);
        let current = self.spell_slots.get(&spell_level).copied().unwrap_or(0);
        if current >= cap {
            return false;
        }
        self.spell_slots.insert(spell_level, current + 1);
        true
    }

    pub fn healing_spell(&self) -> Option<&Spell> {
        if !self.class.caster {
            return None;
        }
        self.spells
            .iter()
            .filter(|s| s.healing.is_some())
            .find(|s| s.level == 0 || self.can_cast(s.level))
    }

    /// Levelled healing spell the caster knows but has no slot for.
    pub fn spent_healing_spell(&self) -> Option<&Spell> {
        if !self.class.caster {
            return None;
        }
        self.spells
            .iter()
            .find(|s| s.healing.is_some() && !s.is_cantrip() && !self.can_cast(s.level))
    }

    /// Strongest damage spell castable now. Casters who know a levelled
    /// healing spell keep their slots for it and fall back to cantrips.
    pub fn offensive_spell(&self) -> Option<&Spell> {
        if !self.class.caster {
            return None;
        }
        let saving_slots = self.spells.iter().any(|s| s.healing.is_some() && !s.is_cantrip());
        self.spells
            .iter()
            .filter(|s| s.damage.is_some())
            .filter(|s| s.is_cantrip() || (!saving_slots && self.can_cast(s.level)))
            .max_by_key(|s| s.level)
    }

    /// 8 + proficiency + spellcasting modifier.
    pub fn spell_save_dc(&self) -> i32 {
        8 + self.proficiency_bonus() + self.spellcasting_mod()
    }

    pub fn spell_attack_bonus(&self) -> i32 {
        self.proficiency_bonus() + self.spellcasting_mod()
    }

    pub fn can_cast(&self, spell_level: u8) -> bool {
        spell_level == 0 || self.spell_slots.get(&spell_level).copied().unwrap_or(0) > 0
    }

    pub fn spend_slot(&mut self, spell_level: u8) -> bool {
        if spell_level == 0 {
            return true;
        }
        match self.spell_slots.get_mut(&spell_level) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn spellcasting_mod(&self) -> i32 {
        self.class.spellcasting_ability.map_or(0, |a| self.ability_mod(a))
    }

    /// Spend one hit die: roll it plus CON (minimum 1).
    pub fn short_rest(&mut self, dice: &mut Dice) -> i32 {
        if !self.is_alive() {
            return 0;
        }
        let roll = dice.die(self.class.hit_die) + self.ability_mod(Ability::Con);
        self.heal(roll.max(1))
    }

    pub fn long_rest(&mut self) -> i32 {
        if !self.is_alive() {
            return 0;
        }
        if self.class.caster {
            self.spell_slots = full_caster_slots(self.level);
        }
        let before = self.hit_points;
        self.hit_points = self.max_hit_points;
        self.hit_points - before
    }

    pub fn can_level_up(&self) -> bool {
        self.level < MAX_LEVEL && xp_for_level(self.level + 1).is_some_and(|need| self.xp >= need)
    }

    /// Advance one level if XP allows: half hit die rounded up plus CON.
    pub fn level_up(&mut self) -> Option<LevelUp> {
        if !self.can_level_up() {
            return None;
        }
        let from = self.level;
        self.level += 1;
        let hp_gain = (self.class.hit_die as i32 / 2 + 1 + self.ability_mod(Ability::Con)).max(1);
        self.max_hit_points += hp_gain;
        self.hit_points += hp_gain;
        let asi = ABILITY_IMPROVEMENT_LEVELS.contains(&self.level);
        if asi {
            self.pending_ability_improvements += 1;
        }
        if self.class.caster {
            self.spell_slots = full_caster_slots(self.level);
        }
        Some(LevelUp { from, to: self.level, hp_gain, ability_score_improvement: asi })
    }

    /// Apply every level-up the current XP allows.
    pub fn level_up_all(&mut self) -> Vec<LevelUp> {
        std::iter::from_fn(|| self.level_up()).collect()
    }
}
