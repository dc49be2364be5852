//! Config loading tests using temporary TOML files

mod common;

use std::fs;

use common::untouchable;
use skirmish::combat::ScriptedRoller;
use skirmish::{run_pve, CombatConfig, ConfigError, Outcome};
use tempfile::TempDir;

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("skirmish.toml");
    fs::write(&path, body).expect("Failed to write config");
    path
}

#[test]
fn test_toml_overrides_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        r#"
round_limit = 12
counter_rate = 0.25
connect_max_chain = 5
"#,
    );

    let config = CombatConfig::load(Some(&path)).expect("Failed to load config");
    assert_eq!(config.round_limit, 12);
    assert_eq!(config.counter_rate, 0.25);
    assert_eq!(config.connect_max_chain, 5);
    assert_eq!(config.min_cri, 5);
    assert_eq!(config.default_cri, 10);
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("absent.toml");
    let config = CombatConfig::load(Some(&path)).expect("Failed to load config");
    assert_eq!(config.round_limit, CombatConfig::default().round_limit);
}

#[test]
fn test_invalid_value_rejected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "min_cri = 2\ndefault_cri = 2\n");
    let err = CombatConfig::load(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "min_cri", .. }));
}

#[test]
fn test_wrong_type_is_extract_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "round_limit = \"many\"\n");
    let err = CombatConfig::load(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Extract(_)));
    assert!(err.to_string().starts_with("config extraction failed"));
}

#[test]
fn test_round_limit_from_file_drives_battle() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "round_limit = 4\n");
    let config = CombatConfig::load(Some(&path)).expect("Failed to load config");

    let mut dice = ScriptedRoller::constant(0.5);
    let result = run_pve(untouchable("Asuna", 10), None, untouchable("Slime", 10), None, &config, &mut dice);
    assert_eq!(result.outcome, Outcome::Draw);
    assert_eq!(result.rounds, 4);
}
