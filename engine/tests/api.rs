use delve_engine::api::{simulate_encounter, simulate_encounter_many, EncounterConfig};
use delve_engine::combat::CombatOutcome;
use delve_engine::content::default_party;
use delve_engine::save::save_party;

#[test]
fn single_encounter_reports_the_fight() {
    let result = simulate_encounter(&EncounterConfig::new(["goblin", "goblin"], 11)).unwrap();
    assert!(result.rounds >= 1);
    assert_eq!(result.party.len(), 4);
    assert_eq!(result.survivors.len() + result.fallen.len(), 4);
    assert!(result.log[0].starts_with("[START]"));
    assert!(result.log.last().unwrap().starts_with("[END]"));
    if result.outcome == CombatOutcome::Victory {
        assert!(result.monsters_remaining.is_empty());
        assert_eq!(result.xp_awarded, 100);
    }
}

#[test]
fn same_seed_same_encounter() {
    let cfg = EncounterConfig::new(["orc", "wolf"], 5);
    let a = simulate_encounter(&cfg).unwrap();
    let b = simulate_encounter(&cfg).unwrap();
    assert_eq!(a.log, b.log);
    assert_eq!(a.outcome, b.outcome);
}

#[test]
fn unknown_monsters_are_an_error() {
    let err = simulate_encounter(&EncounterConfig::new(["tarrasque_jr"], 1)).unwrap_err();
    assert!(err.to_string().contains("tarrasque_jr"));
}

#[test]
fn missing_party_file_is_reported_with_context() {
    let mut cfg = EncounterConfig::new(["goblin"], 1);
    cfg.party_path = Some("/definitely/not/here.json".to_string());
    let err = simulate_encounter(&cfg).unwrap_err();
    assert!(format!("{err:#}").contains("loading party from /definitely/not/here.json"));
}

#[test]
fn saved_party_is_used_when_given() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("solo.json");
    save_party(&path, &default_party()[..1]).unwrap();

    let mut cfg = EncounterConfig::new(["goblin"], 3);
    cfg.party_path = Some(path.to_string_lossy().into_owned());
    let result = simulate_encounter(&cfg).unwrap();
    assert_eq!(result.party.len(), 1);
    assert_eq!(result.party[0].name, "Aldric");
}

#[test]
fn many_trials_aggregate_rates() {
    let cfg = EncounterConfig::new(["goblin", "goblin", "goblin"], 100);
    let stats = simulate_encounter_many(&cfg, 40).unwrap();
    assert_eq!(stats.trials, 40);
    assert_eq!(stats.victories + stats.defeats + stats.stalemates, 40);
    assert!((0.0..=1.0).contains(&stats.win_rate));
    assert!(stats.hit_rate > 0.0 && stats.hit_rate <= 1.0);
    assert!((0.0..=1.0).contains(&stats.crit_rate));
    assert!(stats.avg_survivors <= 4.0);
    assert_eq!(stats.difficulty, "easy");
}
