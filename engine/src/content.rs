//! Content compiled into the binary: a monster book, sample scenarios and a
//! starting party, used whenever no data files are supplied.

use tracing::warn;

use crate::character::{Character, CharacterClass, Spell};
use crate::dice::DiceExpr;
use crate::item::{ArmorCategory, Item};
use crate::monster::MonsterBook;
use crate::scene::{Scenario, Scene, SceneManager};
use crate::Abilities;

const MONSTERS: &str = include_str!("../content/monsters.json");

const SCENARIOS: [(&str, &str); 1] =
    [("goblin_hunt", include_str!("../content/scenarios/goblin_hunt.json"))];

pub fn builtin_monsters() -> MonsterBook {
    serde_json::from_str(MONSTERS).unwrap_or_else(|err| {
        warn!(%err, "bundled monster book is unreadable");
        MonsterBook::default()
    })
}

pub fn builtin_scenario_names() -> impl Iterator<Item = &'static str> {
    SCENARIOS.iter().map(|(name, _)| *name)
}

pub fn builtin_scenario(name: &str) -> Option<Scenario> {
    let (_, text) = SCENARIOS.iter().find(|(n, _)| *n == name)?;
    match Scenario::from_json_str(text) {
        Ok(scenario) => Some(scenario),
        Err(err) => {
            warn!(scenario = name, %err, "bundled scenario is invalid");
            None
        }
    }
}

/// A lone intro scene that ends the run.
pub fn default_scenario() -> Scenario {
    let mut manager = SceneManager::new();
    manager.add_scene(Scene::narrative(
        "intro",
        "A Quiet Road",
        "The road stretches on and nothing stirs. Perhaps another day will bring adventure.",
        None,
    ));
    Scenario { name: "Default".to_string(), manager, map: None }
}

fn healing_potion() -> Item {
    Item::healing_potion("Potion of Healing", DiceExpr::new(2, 4, 2), 50)
}

/// Level 3 fighter, cleric, rogue and wizard, front line first.
pub fn default_party() -> Vec<Character> {
    let mut fighter = Character::new(
        "Aldric",
        CharacterClass::fighter(),
        Abilities::new(16, 12, 14, 10, 12, 8),
        3,
    )
    .with_gold(30)
    .with_item(healing_potion());
    fighter.equip_weapon(Item::weapon("Longsword", DiceExpr::new(1, 8, 0), "slashing", 15));
    fighter.equip_armor(Item::armor("Chain Mail", 16, ArmorCategory::Heavy, 75));

    let mut cleric = Character::new(
        "Tomas",
        CharacterClass::cleric(),
        Abilities::new(14, 10, 14, 10, 16, 12),
        3,
    )
    .with_gold(25)
    .with_spell(Spell::cure_wounds())
    .with_spell(Spell::sacred_flame())
    .with_item(healing_potion());
    cleric.equip_weapon(Item::weapon("Mace", DiceExpr::new(1, 6, 0), "bludgeoning", 5));
    cleric.equip_armor(Item::armor("Scale Mail", 14, ArmorCategory::Medium, 50));

    let mut rogue =
        Character::new("Lyra", CharacterClass::rogue(), Abilities::new(10, 16, 12, 12, 10, 14), 3)
            .with_gold(40);
    rogue.equip_armor(Item::armor("Leather Armor", 11, ArmorCategory::Light, 10));
    rogue.equip_weapon(
        Item::weapon("Shortsword", DiceExpr::new(1, 6, 0), "piercing", 10).with_flags(true, false),
    );

    let mut wizard =
        Character::new("Merric", CharacterClass::wizard(), Abilities::new(8, 14, 12, 16, 12, 10), 3)
            .with_gold(20)
            .with_spell(Spell::fire_bolt())
            .with_spell(Spell::magic_missile());
    wizard.equip_weapon(
        Item::weapon("Dagger", DiceExpr::new(1, 4, 0), "piercing", 2).with_flags(true, false),
    );

    vec![fighter, cleric, rogue, wizard]
}
