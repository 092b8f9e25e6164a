use delve_engine::content::{builtin_scenario, default_party, default_scenario};
use delve_engine::game::{load_scenario, load_scenario_or_default, GameContext};
use delve_engine::scene::{
    Choice, RestType, Scenario, Scene, SceneKind, SceneManager, ScriptedInterface,
};
use delve_engine::{Abilities, Character, CharacterClass, Dice, SceneError};
use indexmap::IndexMap;

fn context(ui: &mut ScriptedInterface, dice: Dice) -> GameContext<'_> {
    GameContext::new(default_party(), dice, ui)
}

fn choice(text: &str, next: &str, effects: &[(&str, i64)]) -> Choice {
    Choice {
        text: text.to_string(),
        next_scene: Some(next.to_string()),
        effects: effects.iter().map(|(k, v)| (k.to_string(), *v)).collect::<IndexMap<_, _>>(),
    }
}

#[test]
fn scene_without_successor_clears_the_current_pointer() {
    let mut manager = SceneManager::new();
    manager.add_scene(Scene::narrative("victory", "Victory", "You won.", None));
    manager.set_current(Some("victory"));

    let mut ui = ScriptedInterface::default();
    let mut ctx = context(&mut ui, Dice::from_seed(1));
    assert_eq!(manager.step(&mut ctx), Ok(None));
    assert_eq!(manager.current(), None);
    // stepping a finished scenario is a no-op
    assert_eq!(manager.step(&mut ctx), Ok(None));
}

#[test]
fn run_follows_the_chain_to_the_end() {
    let mut manager = SceneManager::new();
    manager.add_scene(Scene::narrative("a", "A", "first", Some("b")));
    manager.add_scene(Scene::narrative("b", "B", "second", Some("c")));
    manager.add_scene(Scene::narrative("c", "C", "third", None));
    manager.validate().unwrap();

    let mut ui = ScriptedInterface::default();
    let mut ctx = context(&mut ui, Dice::from_seed(1));
    let summary = manager.run(&mut ctx).unwrap();
    drop(ctx);

    assert_eq!(summary.path, ["a", "b", "c"]);
    assert_eq!(summary.survivors.len(), 4);
    assert_eq!(ui.transcript(), ["== A ==", "first", "== B ==", "second", "== C ==", "third"]);
}

#[test]
fn choice_effects_adjust_counters() {
    let mut manager = SceneManager::new();
    manager.add_scene(Scene::new(
        "gate",
        "The Gate",
        SceneKind::Choice {
            description: "A guard blocks the way.".to_string(),
            choices: vec![
                choice("Bribe him", "inside", &[("gold", -20)]),
                choice("Talk your way in", "inside", &[("reputation", 2), ("npcs_met", 1)]),
            ],
        },
    ));
    manager.add_scene(Scene::narrative("inside", "Inside", "You are in.", None));

    let mut ui = ScriptedInterface::new([1]);
    let mut ctx = context(&mut ui, Dice::from_seed(1));
    let summary = manager.run(&mut ctx).unwrap();

    assert_eq!(summary.path, ["gate", "inside"]);
    assert_eq!(ctx.state.get("reputation"), 2);
    assert_eq!(ctx.state.get("npcs_met"), 1);
    assert_eq!(ctx.state.get("gold"), 100);
}

#[test]
fn out_of_range_answers_clamp_to_the_last_option() {
    let mut manager = SceneManager::new();
    manager.add_scene(Scene::new(
        "fork",
        "Fork",
        SceneKind::Choice {
            description: String::new(),
            choices: vec![choice("Left", "left", &[]), choice("Right", "right", &[])],
        },
    ));
    manager.add_scene(Scene::narrative("left", "Left", "", None));
    manager.add_scene(Scene::narrative("right", "Right", "", None));

    let mut ui = ScriptedInterface::new([7]);
    let mut ctx = context(&mut ui, Dice::from_seed(1));
    assert_eq!(manager.run(&mut ctx).unwrap().path, ["fork", "right"]);
}

#[test]
fn combat_victory_updates_counters() {
    let mut manager = SceneManager::new();
    manager.add_scene(Scene::new(
        "ambush",
        "Ambush",
        SceneKind::Combat {
            description: "A goblin leaps out.".to_string(),
            monsters: vec!["goblin".to_string()],
            on_victory: Some("won".to_string()),
            on_defeat: Some("lost".to_string()),
        },
    ));
    manager.add_scene(Scene::narrative("won", "Won", "", None));
    manager.add_scene(Scene::narrative("lost", "Lost", "", None));

    // Aldric: 15 + 5 hits AC 15, 15 + 3 drops the goblin
    let mut ui = ScriptedInterface::default();
    let mut ctx = context(&mut ui, Dice::from_scripted(vec![15]));
    let summary = manager.run(&mut ctx).unwrap();

    assert_eq!(summary.path, ["ambush", "won"]);
    assert_eq!(ctx.state.get("combat_victories"), 1);
    assert_eq!(ctx.state.get("total_xp"), 50);
    assert_eq!(ctx.state.get("deaths"), 0);
}

#[test]
fn combat_defeat_takes_the_defeat_branch() {
    let mut manager = SceneManager::new();
    manager.add_scene(Scene::new(
        "bridge",
        "Bridge",
        SceneKind::Combat {
            description: String::new(),
            monsters: vec!["ogre".to_string()],
            on_victory: Some("won".to_string()),
            on_defeat: Some("lost".to_string()),
        },
    ));
    manager.add_scene(Scene::narrative("won", "Won", "", None));
    manager.add_scene(Scene::narrative("lost", "Lost", "", None));

    let mut hero = Character::new("Pip", CharacterClass::fighter(), Abilities::default(), 1);
    hero.hit_points = 1;
    let mut ui = ScriptedInterface::default();
    let mut ctx = GameContext::new(vec![hero], Dice::from_scripted(vec![10]), &mut ui);
    let summary = manager.run(&mut ctx).unwrap();

    assert_eq!(summary.path, ["bridge", "lost"]);
    assert_eq!(summary.fallen, ["Pip"]);
    assert_eq!(ctx.state.get("deaths"), 1);
    assert_eq!(ctx.state.get("combat_victories"), 0);
}

#[test]
fn combat_with_no_known_monsters_counts_as_cleared() {
    let mut manager = SceneManager::new();
    manager.add_scene(Scene::new(
        "empty",
        "Empty Room",
        SceneKind::Combat {
            description: String::new(),
            monsters: vec!["beholder_king".to_string()],
            on_victory: Some("next".to_string()),
            on_defeat: None,
        },
    ));
    manager.add_scene(Scene::narrative("next", "Next", "", None));

    let mut ui = ScriptedInterface::default();
    let mut ctx = context(&mut ui, Dice::from_seed(1));
    assert_eq!(manager.run(&mut ctx).unwrap().path, ["empty", "next"]);
    assert_eq!(ctx.state.get("combat_victories"), 0);
}

#[test]
fn rests_restore_the_party() {
    let mut manager = SceneManager::new();
    manager.add_scene(Scene::new(
        "camp",
        "Camp",
        SceneKind::Rest { rest_type: RestType::Long, next_scene: None },
    ));

    let mut ui = ScriptedInterface::default();
    let mut ctx = context(&mut ui, Dice::from_seed(1));
    for hero in &mut ctx.party {
        hero.hit_points = 1;
    }
    ctx.party[1].spend_slot(1);
    manager.run(&mut ctx).unwrap();

    assert!(ctx.party.iter().all(|c| c.hit_points == c.max_hit_points));
    assert_eq!(ctx.party[1].spell_slots.get(&1), Some(&4));
}

#[test]
fn merchant_scene_buys_for_the_chosen_shopper() {
    let mut manager = SceneManager::new();
    manager.add_scene(Scene::new(
        "shop",
        "Shop",
        SceneKind::Merchant { merchant_id: "village".to_string(), next_scene: None },
    ));

    // shopper Aldric, Buy, first listing (healing potion), Leave
    let mut ui = ScriptedInterface::new([0, 1, 1, 0]);
    let mut ctx = context(&mut ui, Dice::from_seed(1));
    ctx.party[0].gold = 120;
    let pack_before = ctx.party[0].inventory.len();
    manager.run(&mut ctx).unwrap();

    assert_eq!(ctx.party[0].gold, 70);
    assert_eq!(ctx.party[0].inventory.len(), pack_before + 1);
    assert_eq!(ctx.state.get("gold_spent"), 50);
    assert_eq!(ctx.merchants.transactions().len(), 1);
    assert_eq!(ctx.merchants.get("village").unwrap().get("potion_healing").unwrap().quantity, 4);
}

#[test]
fn enter_hook_runs_before_the_scene() {
    let mut manager = SceneManager::new();
    manager.add_scene(
        Scene::narrative("tavern", "Tavern", "Smoke and song.", None)
            .with_on_enter(Box::new(|ctx: &mut GameContext<'_>| {
                ctx.state.add("npcs_met", 1);
                ctx.ui.show("hook");
            })),
    );

    let mut ui = ScriptedInterface::default();
    let mut ctx = context(&mut ui, Dice::from_seed(1));
    manager.run(&mut ctx).unwrap();
    assert_eq!(ctx.state.get("npcs_met"), 1);
    drop(ctx);
    assert_eq!(ui.transcript()[0], "hook");
}

#[test]
fn unknown_scene_type_is_a_typed_error() {
    let err = Scenario::from_json_str(
        r#"{ "scenes": [ { "id": "riddle", "type": "puzzle", "title": "Sphinx" } ] }"#,
    )
    .unwrap_err();
    assert_eq!(
        err,
        SceneError::UnknownType { id: "riddle".to_string(), kind: "puzzle".to_string() }
    );
}

#[test]
fn dangling_references_are_rejected() {
    let err = Scenario::from_json_str(
        r#"{ "scenes": [
            { "id": "start", "type": "narrative", "text": "hi", "next_scene": "nowhere" }
        ] }"#,
    )
    .unwrap_err();
    assert_eq!(
        err,
        SceneError::DanglingReference { from: "start".to_string(), to: "nowhere".to_string() }
    );
}

#[test]
fn executing_a_missing_scene_fails() {
    let manager = SceneManager::new();
    let mut ui = ScriptedInterface::default();
    let mut ctx = context(&mut ui, Dice::from_seed(1));
    assert_eq!(
        manager.execute("ghost", &mut ctx),
        Err(SceneError::UnknownScene("ghost".to_string()))
    );
    assert_eq!(manager.validate(), Err(SceneError::NoStart));
}

#[test]
fn scenario_file_fields_map_onto_scene_kinds() {
    let scenario = Scenario::from_json_str(
        r#"{
            "name": "Tiny",
            "scenes": [
                {
                    "id": "rest", "type": "rest", "title": "Nap",
                    "rest_type": "short", "next_scene": "shop"
                },
                { "id": "shop", "type": "merchant", "title": "Stall" }
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(scenario.name, "Tiny");
    assert_eq!(scenario.manager.start(), Some("rest"));
    let rest = scenario.manager.get("rest").unwrap();
    assert_eq!(
        rest.kind,
        SceneKind::Rest { rest_type: RestType::Short, next_scene: Some("shop".to_string()) }
    );
    let shop = scenario.manager.get("shop").unwrap();
    assert_eq!(
        shop.kind,
        SceneKind::Merchant { merchant_id: "village".to_string(), next_scene: None }
    );
}

#[test]
fn default_scenario_is_a_single_intro() {
    let mut scenario = default_scenario();
    assert_eq!(scenario.manager.len(), 1);
    let mut ui = ScriptedInterface::default();
    let mut ctx = context(&mut ui, Dice::from_seed(1));
    assert_eq!(scenario.manager.run(&mut ctx).unwrap().path, ["intro"]);
}

#[test]
fn unreadable_scenario_files_fall_back_to_the_intro() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    assert!(load_scenario(&missing).is_err());
    assert_eq!(load_scenario_or_default(&missing).name, "Default");

    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, r#"{ "scenes": [ { "id": "x", "type": "puzzle" } ] }"#).unwrap();
    let fallback = load_scenario_or_default(&broken);
    assert_eq!(fallback.name, "Default");
    assert_eq!(fallback.manager.start(), Some("intro"));

    let good = dir.path().join("tiny.json");
    std::fs::write(
        &good,
        r#"{ "name": "Tiny", "scenes": [ { "id": "a", "type": "narrative", "text": "hi" } ] }"#,
    )
    .unwrap();
    assert_eq!(load_scenario_or_default(&good).name, "Tiny");
}

#[test]
fn goblin_hunt_plays_to_an_ending_and_tracks_the_map() {
    let mut scenario = builtin_scenario("goblin_hunt").expect("bundled scenario");
    let mut ui = ScriptedInterface::default();
    let mut ctx = context(&mut ui, Dice::from_seed(2024));
    ctx.map = scenario.map.take();
    let summary = scenario.manager.run(&mut ctx).unwrap();

    assert_eq!(summary.path[0], "village_square");
    let last = summary.path.last().unwrap();
    assert!(last == "victory" || last == "defeat", "ended at {last}");
    assert_eq!(ctx.state.get("reputation"), 1);

    let map = ctx.map.as_ref().unwrap();
    assert!(map.is_visited("village"));
    assert!(map.is_visited("forest_entrance"));
    assert!(ctx.state.get("locations_visited") >= 2);
}
