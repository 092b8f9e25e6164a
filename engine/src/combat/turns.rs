use tracing::debug;

use super::targeting::accessible_targets;
use super::{Battle, CombatEvent, Combatant, HealSource};
use crate::Ability;
use crate::character::{PotionOutcome, Spell};
use crate::dice::DiceExpr;
use crate::item::ItemKind;

/// Resolved to-hit roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackRoll {
    pub roll: i32,
    pub total: i32,
    pub armor_class: i32,
    pub hit: bool,
    pub crit: bool,
}

impl AttackRoll {
    /// Natural 1 always misses, natural 20 always hits and crits.
    pub fn resolve(roll: i32, bonus: i32, armor_class: i32) -> Self {
        let total = roll + bonus;
        let crit = roll == 20;
        let hit = crit || (roll != 1 && total >= armor_class);
        Self { roll, total, armor_class, hit, crit }
    }

    fn describe(&self) -> &'static str {
        if self.crit {
            "CRIT!"
        } else if self.hit {
            "HIT"
        } else if self.roll == 1 {
            "MISS (NAT1)"
        } else {
            "MISS"
        }
    }
}

fn format_modifier(modifier: i32) -> String {
    if modifier >= 0 { format!("+{modifier}") } else { format!("-{}", modifier.abs()) }
}

impl Battle<'_> {
    /// Heal a wounded ally, else drink for a spent healing slot, else drink a
    /// potion when badly hurt, else cast a damage spell or attack.
    pub fn character_turn(&mut self, idx: usize) {
        if self.alive_monsters.is_empty() || !self.party[idx].is_alive() {
            return;
        }
        if self.try_healing_spell(idx) || self.try_mana_potion(idx) || self.try_healing_potion(idx)
        {
            return;
        }
        if let Some(spell) = self.party[idx].offensive_spell().cloned() {
            self.cast_damage_spell(idx, &spell);
            return;
        }
        self.character_attack(idx);
    }

    fn most_wounded_ally(&self) -> Option<usize> {
        self.alive_chars
            .iter()
            .copied()
            .filter(|&i| self.party[i].hp_ratio() < 0.5)
            .min_by(|&a, &b| self.party[a].hp_ratio().total_cmp(&self.party[b].hp_ratio()))
    }

    fn try_healing_spell(&mut self, idx: usize) -> bool {
        let Some(spell) = self.party[idx].healing_spell().cloned() else {
            return false;
        };
        let Some(dice) = spell.healing else {
            return false;
        };
        let Some(target) = self.most_wounded_ally() else {
            return false;
        };

        self.party[idx].spend_slot(spell.level);
        let amount = (dice.roll(self.dice) + self.party[idx].spellcasting_mod()).max(1);
        let before = self.party[target].hit_points;
        let healed = self.party[target].heal(amount);
        self.events.push(CombatEvent::Heal {
            healer: idx,
            target,
            amount: healed,
            source: HealSource::Spell,
        });
        self.log.push(format!(
            "[HEAL][{}] casts {} on {}: +{} ({} → {})",
            self.party[idx].name,
            spell.name,
            self.party[target].name,
            healed,
            before,
            self.party[target].hit_points
        ));
        true
    }

    /// A healer out of slots drinks a slot potion while an ally is wounded.
    fn try_mana_potion(&mut self, idx: usize) -> bool {
        let me = &self.party[idx];
        let Some(level) = me.spent_healing_spell().map(|s| s.level) else {
            return false;
        };
        let Some(slot) = me.mana_potion_index(level) else {
            return false;
        };
        if self.most_wounded_ally().is_none() {
            return false;
        }
        let Some((potion, outcome)) = self.party[idx].drink_potion(slot, self.dice) else {
            return false;
        };
        if let PotionOutcome::SlotRestored(level) = outcome {
            self.events.push(CombatEvent::SlotRestored { character: idx, level });
        }
        self.log.push(format!(
            "[MANA][{}] drinks {}: level {} slots {}",
            self.party[idx].name,
            potion.name,
            level,
            self.party[idx].spell_slots.get(&level).copied().unwrap_or(0)
        ));
        true
    }

    fn try_healing_potion(&mut self, idx: usize) -> bool {
        let me = &self.party[idx];
        if me.hp_ratio() >= 0.3 {
            return false;
        }
        let Some(slot) = me.healing_potion_index() else {
            return false;
        };
        let before = me.hit_points;
        let Some((potion, PotionOutcome::Healed(healed))) =
            self.party[idx].drink_potion(slot, self.dice)
        else {
            return false;
        };
        self.events.push(CombatEvent::Heal {
            healer: idx,
            target: idx,
            amount: healed,
            source: HealSource::Potion,
        });
        self.log.push(format!(
            "[HEAL][{}] drinks {}: +{} ({} → {})",
            self.party[idx].name,
            potion.name,
            healed,
            before,
            self.party[idx].hit_points
        ));
        true
    }

    /// Damage dice, ability and flat to-hit bonus for the character's attack.
    fn weapon_profile(&self, idx: usize) -> (DiceExpr, Ability, i32) {
        let me = &self.party[idx];
        if let Some(ItemKind::Weapon(w)) = me.equipped_weapon.as_ref().map(|i| &i.kind) {
            let ability = if w.ranged || w.finesse { Ability::Dex } else { Ability::Str };
            return (w.damage, ability, w.attack_bonus);
        }
        let row = self.config.damage_table.lookup(&me.class.name);
        (row.dice, row.ability, 0)
    }

    /// Cast `spell` at random living monsters, one target per bolt. The slot is
    /// spent once per casting.
    fn cast_damage_spell(&mut self, idx: usize, spell: &Spell) {
        let Some(dice) = spell.damage else {
            return;
        };
        self.party[idx].spend_slot(spell.level);
        let caster = self.party[idx].name.clone();
        for _ in 0..spell.projectiles.max(1) {
            if self.alive_monsters.is_empty() {
                break;
            }
            let j = self.alive_monsters[self.dice.pick(self.alive_monsters.len())];
            let target = self.monsters[j].name.clone();

            let (hit, damage, saved) = if let Some(ability) = spell.save {
                let dc = self.party[idx].spell_save_dc();
                let roll = self.dice.d20() + self.monsters[j].abilities.mod_of(ability);
                let saved = roll >= dc;
                let rolled = dice.roll(self.dice).max(0);
                let damage = if saved { rolled / 2 } else { rolled };
                self.log.push(format!(
                    "[SPELL][{}] {} → {} {:?} save {} vs DC {} {}",
                    caster,
                    spell.name,
                    target,
                    ability,
                    roll,
                    dc,
                    if saved { "SAVED" } else { "FAILED" }
                ));
                (damage > 0, damage, Some(saved))
            } else if spell.auto_hit {
                self.log.push(format!("[SPELL][{}] {} → {} ✔", caster, spell.name, target));
                (true, dice.roll(self.dice).max(1), None)
            } else {
                let bonus = self.party[idx].spell_attack_bonus();
                let atk =
                    AttackRoll::resolve(self.dice.d20(), bonus, self.monsters[j].armor_class);
                self.log.push(format!(
                    "[SPELL][{}] {} → {} d20={} {} = {} vs AC {} {} {}",
                    caster,
                    spell.name,
                    target,
                    atk.roll,
                    format_modifier(bonus),
                    atk.total,
                    atk.armor_class,
                    atk.describe(),
                    if atk.hit { "✔" } else { "✖" }
                ));
                let damage = match (atk.hit, atk.crit) {
                    (false, _) => 0,
                    (true, true) => dice.roll_crit(self.dice).max(1),
                    (true, false) => dice.roll(self.dice).max(1),
                };
                (atk.hit, damage, None)
            };

            self.events.push(CombatEvent::SpellCast {
                caster: idx,
                target: j,
                spell: spell.name.clone(),
                hit,
                damage,
                saved,
            });
            if hit {
                self.log.push(format!("[DMG][{}] {} {} = {}", caster, spell.name, dice, damage));
                self.damage_monster(idx, j, damage);
            }
        }
    }

    /// Apply damage, log the new HP and take the monster out at 0.
    fn damage_monster(&mut self, idx: usize, j: usize, damage: i32) {
        let monster = &mut self.monsters[j];
        let before = monster.hit_points;
        monster.hit_points -= damage;
        self.log.push(format!("[HP][{}] {} → {}", monster.name, before, monster.hit_points));
        if monster.hit_points <= 0 {
            self.defeat_monster(idx, j);
        }
    }

    fn character_attack(&mut self, idx: usize) {
        let j = self.alive_monsters[self.dice.pick(self.alive_monsters.len())];
        let (damage_dice, ability, weapon_bonus) = self.weapon_profile(idx);
        let ability_mod = self.party[idx].ability_mod(ability);
        let bonus = ability_mod + self.party[idx].proficiency_bonus() + weapon_bonus;

        let atk = AttackRoll::resolve(self.dice.d20(), bonus, self.monsters[j].armor_class);
        let damage = if atk.hit {
            let base = (damage_dice.roll(self.dice) + ability_mod).max(1);
            if atk.crit { base * 2 } else { base }
        } else {
            0
        };

        let attacker = self.party[idx].name.clone();
        self.log.push(format!(
            "[ATTACK][{}] → {} d20={} {} = {} vs AC {} {} {}",
            attacker,
            self.monsters[j].name,
            atk.roll,
            format_modifier(bonus),
            atk.total,
            atk.armor_class,
            atk.describe(),
            if atk.hit { "✔" } else { "✖" }
        ));
        self.events.push(CombatEvent::Attack {
            attacker: Combatant::character(idx),
            target: Combatant::monster(j),
            roll: atk.roll,
            total: atk.total,
            armor_class: atk.armor_class,
            hit: atk.hit,
            crit: atk.crit,
            damage,
        });
        if !atk.hit {
            return;
        }

        self.log.push(format!(
            "[DMG][{}] {}{} {} = {}",
            attacker,
            if atk.crit { "crit: 2×" } else { "" },
            damage_dice,
            format_modifier(ability_mod),
            damage
        ));
        self.damage_monster(idx, j, damage);
    }

    /// One attack action against a reachable character.
    pub fn monster_turn(&mut self, j: usize) {
        if self.alive_chars.is_empty() || !self.monsters[j].is_alive() {
            return;
        }
        if self.monsters[j].actions.is_empty() {
            self.log.push(format!("[TURN][{}] has no attack; skipping", self.monsters[j].name));
            return;
        }
        let pick = self.dice.pick(self.monsters[j].actions.len());
        let action = self.monsters[j].actions[pick].clone();

        let reachable = accessible_targets(&self.alive_chars, self.config.front_line_size);
        let target = reachable[self.dice.pick(reachable.len())];

        let atk = AttackRoll::resolve(
            self.dice.d20(),
            action.attack_bonus,
            self.party[target].armor_class,
        );
        let damage = if atk.hit { action.roll_damage(self.dice, atk.crit).max(0) } else { 0 };

        self.log.push(format!(
            "[ATTACK][{}] {} → {} d20={} {} = {} vs AC {} {} {}",
            self.monsters[j].name,
            action.name,
            self.party[target].name,
            atk.roll,
            format_modifier(action.attack_bonus),
            atk.total,
            atk.armor_class,
            atk.describe(),
            if atk.hit { "✔" } else { "✖" }
        ));
        self.events.push(CombatEvent::Attack {
            attacker: Combatant::monster(j),
            target: Combatant::character(target),
            roll: atk.roll,
            total: atk.total,
            armor_class: atk.armor_class,
            hit: atk.hit,
            crit: atk.crit,
            damage,
        });
        if !atk.hit {
            return;
        }

        let before = self.party[target].hit_points;
        let dropped = self.party[target].take_damage(damage);
        self.log.push(format!(
            "[DMG][{}] {} = {} [{}]",
            self.monsters[j].name,
            action.name,
            damage,
            action
                .damages
                .iter()
                .map(|d| format!("{} {}", d.dice, d.damage_type))
                .collect::<Vec<_>>()
                .join(" + ")
        ));
        self.log.push(format!(
            "[HP][{}] {} → {}",
            self.party[target].name, before, self.party[target].hit_points
        ));
        if dropped {
            self.character_down(target);
        }
    }

    fn character_down(&mut self, idx: usize) {
        if let Some(pos) = self.alive_chars.iter().position(|&i| i == idx) {
            self.alive_chars.remove(pos);
            debug!(character = %self.party[idx].name, "character down");
            self.events.push(CombatEvent::Defeated { who: Combatant::character(idx) });
            self.log.push(format!("[DOWN][{}] falls", self.party[idx].name));
        }
    }
}
