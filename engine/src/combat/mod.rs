//! Round-based party-versus-monsters combat.
//!
//! Turn order is fixed: every living character in party order, then every
//! living monster in encounter order, repeated until one side is empty or the
//! round cap is reached.

use serde::Serialize;
use tracing::{debug, info};

use crate::character::{Character, LevelUp};
use crate::config::CombatConfig;
use crate::encounter::{calculate_encounter_difficulty, EncounterDifficulty};
use crate::monster::Monster;
use crate::Dice;

mod rewards;
pub mod targeting;
mod turns;

pub use turns::AttackRoll;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Party,
    Monsters,
}

/// Index into the party slice or the encounter's monster list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Combatant {
    pub side: Side,
    pub index: usize,
}

impl Combatant {
    pub fn character(index: usize) -> Self {
        Self { side: Side::Party, index }
    }

    pub fn monster(index: usize) -> Self {
        Self { side: Side::Monsters, index }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealSource {
    Spell,
    Potion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CombatEvent {
    Round {
        number: u32,
    },
    Attack {
        attacker: Combatant,
        target: Combatant,
        roll: i32,
        total: i32,
        armor_class: i32,
        hit: bool,
        crit: bool,
        damage: i32,
    },
    Heal {
        healer: usize,
        target: usize,
        amount: i32,
        source: HealSource,
    },
    /// One bolt of a damage spell against a monster.
    SpellCast {
        caster: usize,
        target: usize,
        spell: String,
        hit: bool,
        damage: i32,
        /// Outcome of the target's saving throw, for save spells.
        saved: Option<bool>,
    },
    SlotRestored {
        character: usize,
        level: u8,
    },
    Defeated {
        who: Combatant,
    },
    Experience {
        character: usize,
        xp: u32,
    },
    Loot {
        character: usize,
        item: String,
    },
    LevelUp {
        character: usize,
        level_up: LevelUp,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatOutcome {
    Victory,
    Defeat,
    /// Round cap reached with both sides still standing.
    Stalemate,
}

impl CombatOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            CombatOutcome::Victory => "victory",
            CombatOutcome::Defeat => "defeat",
            CombatOutcome::Stalemate => "stalemate",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CombatReport {
    pub outcome: CombatOutcome,
    pub rounds: u32,
    pub difficulty: EncounterDifficulty,
    pub xp_awarded: u32,
    pub survivors: Vec<String>,
    pub fallen: Vec<String>,
    pub monsters_defeated: usize,
    pub monsters_remaining: Vec<String>,
    pub level_ups: Vec<(String, LevelUp)>,
    pub events: Vec<CombatEvent>,
    pub log: Vec<String>,
}

/// Mutable state of one fight.
pub struct Battle<'a> {
    party: &'a mut [Character],
    monsters: Vec<Monster>,
    alive_chars: Vec<usize>,
    alive_monsters: Vec<usize>,
    dice: &'a mut Dice,
    config: &'a CombatConfig,
    round: u32,
    xp_awarded: u32,
    events: Vec<CombatEvent>,
    log: Vec<String>,
}

impl<'a> Battle<'a> {
    pub fn new(
        party: &'a mut [Character],
        monsters: Vec<Monster>,
        dice: &'a mut Dice,
        config: &'a CombatConfig,
    ) -> Self {
        let alive_chars = (0..party.len()).filter(|&i| party[i].is_alive()).collect();
        let alive_monsters = (0..monsters.len()).filter(|&j| monsters[j].is_alive()).collect();
        Self {
            party,
            monsters,
            alive_chars,
            alive_monsters,
            dice,
            config,
            round: 0,
            xp_awarded: 0,
            events: Vec::new(),
            log: Vec::new(),
        }
    }

    pub fn party(&self) -> &[Character] {
        &*self.party
    }

    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    pub fn alive_characters(&self) -> &[usize] {
        &self.alive_chars
    }

    pub fn alive_monsters(&self) -> &[usize] {
        &self.alive_monsters
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn is_over(&self) -> bool {
        self.alive_chars.is_empty() || self.alive_monsters.is_empty()
    }

    pub fn difficulty(&self) -> EncounterDifficulty {
        let levels: Vec<u32> = self.party.iter().map(|c| c.level).collect();
        let crs: Vec<_> = self.monsters.iter().map(|m| m.challenge_rating).collect();
        calculate_encounter_difficulty(&levels, &crs)
    }

    /// One full round: characters in party order, then monsters.
    pub fn run_round(&mut self) {
        self.round += 1;
        debug!(round = self.round, "combat round");
        self.events.push(CombatEvent::Round { number: self.round });
        self.log.push(format!(
            "[ROUND] {} heroes={}/{} monsters={}/{}",
            self.round,
            self.alive_chars.len(),
            self.party.len(),
            self.alive_monsters.len(),
            self.monsters.len()
        ));

        for idx in self.alive_chars.clone() {
            if self.alive_monsters.is_empty() {
                break;
            }
            if !self.alive_chars.contains(&idx) {
                continue;
            }
            self.character_turn(idx);
        }

        for j in self.alive_monsters.clone() {
            if self.alive_chars.is_empty() {
                break;
            }
            if !self.alive_monsters.contains(&j) {
                continue;
            }
            self.monster_turn(j);
        }
    }

    pub fn outcome(&self) -> CombatOutcome {
        if self.alive_monsters.is_empty() {
            CombatOutcome::Victory
        } else if self.alive_chars.is_empty() {
            CombatOutcome::Defeat
        } else {
            CombatOutcome::Stalemate
        }
    }

    /// Fight until one side falls or the round cap is hit, then settle
    /// experience and level-ups.
    pub fn run(mut self) -> CombatReport {
        let difficulty = self.difficulty();
        self.log.push(format!(
            "[START] {} heroes vs {} monsters; {}",
            self.alive_chars.len(),
            self.alive_monsters.len(),
            difficulty.summary()
        ));

        while !self.is_over() && self.round < self.config.max_rounds {
            self.run_round();
        }

        let outcome = self.outcome();
        if outcome == CombatOutcome::Stalemate {
            self.log.push(format!("[END] too many rounds ({}): stalemate", self.round));
        }
        let level_ups = self.settle(outcome);

        let survivors = self.alive_chars.iter().map(|&i| self.party[i].name.clone()).collect();
        let fallen: Vec<String> =
            self.party.iter().filter(|c| !c.is_alive()).map(|c| c.name.clone()).collect();
        let monsters_remaining: Vec<String> =
            self.alive_monsters.iter().map(|&j| self.monsters[j].name.clone()).collect();

        self.log.push(format!(
            "[END] outcome={} rounds={} xp={}",
            outcome.as_str(),
            self.round,
            self.xp_awarded
        ));
        info!(outcome = outcome.as_str(), rounds = self.round, "combat finished");

        CombatReport {
            outcome,
            rounds: self.round,
            difficulty,
            xp_awarded: self.xp_awarded,
            survivors,
            fallen,
            monsters_defeated: self.monsters.len() - monsters_remaining.len(),
            monsters_remaining,
            level_ups,
            events: self.events,
            log: self.log,
        }
    }
}

/// Run a complete fight against freshly created monsters.
pub fn run_combat(
    party: &mut [Character],
    monsters: Vec<Monster>,
    dice: &mut Dice,
    config: &CombatConfig,
) -> CombatReport {
    Battle::new(party, monsters, dice, config).run()
}
