use tracing::debug;

use super::{Battle, CombatEvent, CombatOutcome, Combatant};
use crate::character::LevelUp;

impl Battle<'_> {
    /// Take a monster out of the fight. Rewards go to `killer` only the first
    /// time a given monster drops.
    pub(super) fn defeat_monster(&mut self, killer: usize, j: usize) {
        let Some(pos) = self.alive_monsters.iter().position(|&m| m == j) else {
            return;
        };
        self.alive_monsters.remove(pos);
        self.events.push(CombatEvent::Defeated { who: Combatant::monster(j) });
        self.log.push(format!("[DOWN][{}] is defeated", self.monsters[j].name));
        self.award_kill(killer, j);
    }

    fn award_kill(&mut self, killer: usize, j: usize) {
        let xp = self.monsters[j].xp;
        let hero = &mut self.party[killer];
        hero.xp += xp;
        hero.kills.push(self.monsters[j].name.clone());
        self.xp_awarded += xp;
        self.events.push(CombatEvent::Experience { character: killer, xp });
        self.log.push(format!("[XP][{}] +{} (total {})", hero.name, xp, hero.xp));
        debug!(character = %hero.name, monster = %self.monsters[j].name, xp, "kill");

        for item in self.monsters[j].loot.clone() {
            if self.dice.percent() > self.config.loot_chance_percent {
                continue;
            }
            self.log.push(format!("[LOOT][{}] finds {}", self.party[killer].name, item));
            self.events.push(CombatEvent::Loot { character: killer, item: item.name.clone() });
            self.party[killer].add_item(item);
        }
    }

    /// Post-fight bookkeeping. Survivors of a victory level up as far as their
    /// XP allows.
    pub(super) fn settle(&mut self, outcome: CombatOutcome) -> Vec<(String, LevelUp)> {
        let mut level_ups = Vec::new();
        if outcome == CombatOutcome::Victory {
            for idx in self.alive_chars.clone() {
                for up in self.party[idx].level_up_all() {
                    let asi = if up.ability_score_improvement {
                        ", ability score improvement"
                    } else {
                        ""
                    };
                    self.log.push(format!(
                        "[LEVEL][{}] {} → {} (+{} HP{})",
                        self.party[idx].name,
                        up.from,
                        up.to,
                        up.hp_gain,
                        asi
                    ));
                    self.events.push(CombatEvent::LevelUp { character: idx, level_up: up });
                    level_ups.push((self.party[idx].name.clone(), up));
                }
            }
        }
        for hero in self.party.iter().filter(|c| !c.is_alive()) {
            self.log.push(format!("[FALLEN][{}] hp={}", hero.name, hero.hit_points));
        }
        level_ups
    }
}
