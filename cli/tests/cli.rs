use assert_cmd::Command;
use predicates::prelude::*;

fn delve() -> Command {
    Command::cargo_bin("delve").unwrap()
}

#[test]
fn roll_prints_one_total_per_roll() {
    let out = delve().args(["roll", "2d6+3", "--seed", "1", "--times", "3"]).assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    let totals: Vec<i32> = stdout.lines().map(|l| l.parse().unwrap()).collect();
    assert_eq!(totals.len(), 3);
    assert!(totals.iter().all(|t| (5..=15).contains(t)));
}

#[test]
fn bad_dice_expression_fails() {
    delve()
        .args(["roll", "2x6"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rolling 2x6"));
}

#[test]
fn difficulty_rates_the_goblin_ambush() {
    delve()
        .args(["difficulty", "--level", "1", "--level", "1"])
        .args(["--cr", "1/4", "--cr", "1/4", "--cr", "1/4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("adjusted_xp=300 difficulty=deadly"))
        .stdout(predicate::str::contains("thresholds: easy=50 medium=100 hard=150 deadly=200"));
}

#[test]
fn fight_prints_the_combat_log() {
    delve()
        .args(["fight", "--monster", "goblin", "--seed", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[START] 4 heroes vs 1 monsters"))
        .stdout(predicate::str::contains("[END]"));
}

#[test]
fn fight_json_is_machine_readable() {
    let out = delve().args(["fight", "--monster", "orc", "--json"]).assert().success();
    let value: serde_json::Value = serde_json::from_slice(&out.get_output().stdout).unwrap();
    assert_eq!(value["party"].as_array().unwrap().len(), 4);
    assert!(value["log"].as_array().unwrap().len() > 2);
}

#[test]
fn fight_against_nothing_known_fails() {
    delve()
        .args(["fight", "--monster", "nothing_here"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing_here"));
}

#[test]
fn auto_play_runs_the_goblin_hunt_and_saves() {
    let dir = tempfile::tempdir().unwrap();
    let save = dir.path().join("party.json");
    delve()
        .args(["play", "--interface", "auto", "--seed", "7", "--save"])
        .arg(&save)
        .assert()
        .success()
        .stdout(predicate::str::contains("== Mistvale =="))
        .stdout(predicate::str::contains(
            "scenes played:      village_square -> village_choice -> forest_entrance",
        ))
        .stdout(predicate::str::contains("party saved to"));
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&save).unwrap()).unwrap();
    assert_eq!(saved.as_array().unwrap().len(), 4);
}

#[test]
fn auto_play_follows_scripted_choices() {
    // village_choice -> inn (costs 10 gold), then set out
    delve()
        .args(["play", "--interface", "auto", "--seed", "7", "--choice", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "village_choice -> inn_rest -> village_choice -> forest_entrance",
        ))
        .stdout(predicate::str::contains("gold:               90"));
}

#[test]
fn console_play_reads_answers_from_stdin() {
    delve()
        .args(["play", "--seed", "7"])
        .write_stdin("\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("What do you do?"))
        .stdout(predicate::str::contains("  1. Set out for the forest"));
}

#[test]
fn unreadable_files_fall_back_to_the_defaults() {
    delve()
        .env_remove("RUST_LOG")
        .args(["play", "--interface", "auto", "--seed", "1"])
        .args(["--scenario", "/no/such/scenario.json", "--party", "/no/such/party.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scenes played:      intro"))
        .stdout(predicate::str::contains("survivors:          Aldric, Tomas, Lyra, Merric"))
        .stderr(predicate::str::contains("falling back to the default scenario"))
        .stderr(predicate::str::contains("falling back to the default party"));
}

#[test]
fn party_dump_and_monster_list() {
    delve()
        .args(["party-dump", "--pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Aldric\""));
    delve()
        .arg("monsters")
        .assert()
        .success()
        .stdout(predicate::str::contains("goblin_boss"))
        .stdout(predicate::str::contains("CR 1/4"));
}

#[test]
fn simulate_party_reports_rates() {
    Command::cargo_bin("simulate-party")
        .unwrap()
        .args(["--monster", "wolf", "--trials", "20", "--seed", "9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("trials:             20"))
        .stdout(predicate::str::contains("win rate:"));
}
