use delve_engine::content::default_party;
use delve_engine::save::{
    load_character, load_party, load_party_or_default, save_character, save_party,
};
use delve_engine::LoadError;

#[test]
fn party_survives_a_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("party.json");
    let mut party = default_party();
    party[0].hit_points = 3;
    party[2].kills.push("Goblin".to_string());

    save_party(&path, &party).unwrap();
    assert_eq!(load_party(&path).unwrap(), party);
}

#[test]
fn single_character_files_work_too() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tomas.json");
    let tomas = default_party().remove(1);
    save_character(&path, &tomas).unwrap();
    assert_eq!(load_character(&path).unwrap(), tomas);
}

#[test]
fn missing_or_broken_saves_fall_back_to_the_default_party() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    assert!(matches!(load_party(&missing), Err(LoadError::Io { .. })));
    assert_eq!(load_party_or_default(&missing), default_party());

    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "[{ \"name\": ").unwrap();
    assert!(matches!(load_party(&broken), Err(LoadError::Json { .. })));
    assert_eq!(load_party_or_default(&broken).len(), 4);
}
