//! Tests for JSON configuration files and their layering with the CLI

use clap::Parser;
use clinic_flow_simulator::clinic::{DoctorProfileConfig, GammaLaw};
use clinic_flow_simulator::simulation::SimulationOrchestrator;
use clinic_flow_simulator::types::config::{CliArgs, ConfigError, ConfigValidationError, SimulationConfig};
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.display().to_string()
}

#[test]
fn test_partial_file_merges_with_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "clinic.json", r#"{ "seed": 99, "imaging_room_count": 3 }"#);

    let config = SimulationConfig::from_file(&path).unwrap();
    let defaults = SimulationConfig::default();
    assert_eq!(config.seed, Some(99));
    assert_eq!(config.imaging_room_count, 3);
    assert_eq!(config.horizon, defaults.horizon);
    assert_eq!(config.doctor_count, 7);
    assert_eq!(config.appointment_only_doctor, Some(0));
    assert!(config.validate().is_ok());
}

#[test]
fn test_null_roles_clear_designations() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "roles.json",
        r#"{ "appointment_only_doctor": null, "walkin_only_doctor": 3 }"#,
    );

    let config = SimulationConfig::from_file(&path).unwrap();
    assert_eq!(config.appointment_only_doctor, None);
    assert_eq!(config.walkin_only_doctor, Some(3));
}

#[test]
fn test_null_seed_runs_from_entropy() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "unseeded.json", r#"{ "seed": null }"#);

    let config = SimulationConfig::from_file(&path).unwrap();
    assert_eq!(config.seed, None);

    let report = SimulationOrchestrator::new(config).unwrap().run().unwrap();
    assert_eq!(report.seed, None);
    assert!(report.reconciliation.consistent);

    // An unseeded config saves as null and loads back unseeded
    let saved = dir.path().join("resaved.json");
    SimulationConfig { seed: None, ..Default::default() }.save_to_file(&saved).unwrap();
    assert_eq!(SimulationConfig::from_file(&saved).unwrap().seed, None);
}

#[test]
fn test_cli_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "clinic.json", r#"{ "seed": 99, "horizon": 500.0 }"#);

    let args = CliArgs::try_parse_from(["clinic-flow-simulator", "--config", path.as_str(), "--seed", "5"]).unwrap();
    let config = SimulationConfig::from_cli_args(args).unwrap();
    assert_eq!(config.seed, Some(5));
    assert_eq!(config.horizon, 500.0);
}

#[test]
fn test_saved_config_loads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("saved.json");

    let mut saved = SimulationConfig::default().with_doctors(DoctorProfileConfig::clinic_defaults()[..3].to_vec());
    saved.imaging_duration = GammaLaw::new(2.0, 1.5, 0.5);
    saved.walkin_only_doctor = None;
    saved.save_to_file(&path).unwrap();

    let loaded = SimulationConfig::from_file(&path).unwrap();
    assert_eq!(loaded.doctor_count, 3);
    assert_eq!(loaded.doctors, saved.doctors);
    assert_eq!(loaded.imaging_duration, saved.imaging_duration);
    assert_eq!(loaded.walkin_only_doctor, None);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_file_errors() {
    let dir = TempDir::new().unwrap();

    let missing = dir.path().join("missing.json");
    assert!(matches!(SimulationConfig::from_file(&missing), Err(ConfigError::FileNotFound(_))));

    let yaml = write_config(&dir, "clinic.yaml", "seed: 1");
    assert!(matches!(SimulationConfig::from_file(&yaml), Err(ConfigError::UnsupportedFormat(_))));

    let broken = write_config(&dir, "broken.json", "{ seed: ");
    assert!(matches!(SimulationConfig::from_file(&broken), Err(ConfigError::JsonError(_))));
}

#[test]
fn test_doctor_count_must_match_profiles() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "count.json", r#"{ "doctor_count": 4 }"#);

    let config = SimulationConfig::from_file(&path).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigValidationError::ProfileCountMismatch { expected: 4, actual: 7 })
    ));
}

#[test]
fn test_invalid_law_names_its_field() {
    let mut config = SimulationConfig::default();
    config.doctors[2].second_exam = GammaLaw::new(-1.0, 2.0, 1.0);

    match config.validate() {
        Err(ConfigValidationError::InvalidLaw { field, .. }) => assert_eq!(field, "doctors[2].second_exam"),
        other => panic!("expected an invalid law error, got {:?}", other),
    }
}

#[test]
fn test_printed_config_is_loadable_json() {
    let json = SimulationConfig::default().print_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["doctor_count"], 7);
    assert_eq!(value["doctors"].as_array().map(Vec::len), Some(7));
}
