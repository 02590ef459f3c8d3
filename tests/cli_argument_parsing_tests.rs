//! Tests for CLI argument parsing functionality
//!
//! These tests verify that command line arguments are parsed and layered on
//! top of the default configuration.

use clap::Parser;
use clinic_flow_simulator::types::config::{parse_log_format, parse_report_format, CliArgs, SimulationConfig};
use clinic_flow_simulator::types::{LogFormat, ReportFormat};

fn parse(args: &[&str]) -> CliArgs {
    let mut argv = vec!["clinic-flow-simulator"];
    argv.extend_from_slice(args);
    CliArgs::try_parse_from(argv).unwrap()
}

#[test]
fn test_no_arguments_keeps_defaults() {
    let args = parse(&[]);
    assert!(args.config.is_none());
    assert!(args.seed.is_none());
    assert!(!args.no_special_roles);
    assert!(!args.dry_run);

    let config = SimulationConfig::from_cli_args(args).unwrap();
    let defaults = SimulationConfig::default();
    assert_eq!(config.seed, defaults.seed);
    assert_eq!(config.horizon, defaults.horizon);
    assert_eq!(config.appointment_only_doctor, Some(0));
    assert_eq!(config.walkin_only_doctor, Some(1));
}

#[test]
fn test_numeric_overrides() {
    let args = parse(&[
        "--seed",
        "7",
        "--horizon",
        "540",
        "--lunch-start",
        "250",
        "--lunch-end",
        "310",
        "--walkin-cutoff-margin",
        "45",
        "--imaging-room-count",
        "3",
        "--afternoon-speedup-factor",
        "0.9",
        "--imaging-pre-lunch-penalty",
        "1.5",
        "--queue-sample-interval",
        "2.5",
    ]);
    let config = SimulationConfig::from_cli_args(args).unwrap();

    assert_eq!(config.seed, Some(7));
    assert_eq!(config.horizon, 540.0);
    assert_eq!(config.lunch_window(), (250.0, 310.0));
    assert_eq!(config.walkin_cutoff(), 495.0);
    assert_eq!(config.imaging_room_count, 3);
    assert_eq!(config.afternoon_speedup_factor, 0.9);
    assert_eq!(config.imaging_pre_lunch_penalty, 1.5);
    assert_eq!(config.queue_sample_interval, 2.5);
    assert!(config.validate().is_ok());
}

#[test]
fn test_negative_punctuality_bounds() {
    let args = parse(&["--punctuality-min-deviation", "-15", "--punctuality-max-deviation", "5"]);
    let config = SimulationConfig::from_cli_args(args).unwrap();
    assert_eq!(config.punctuality_bounds(), (-15.0, 5.0));
}

#[test]
fn test_random_seed_flag_clears_the_seed() {
    let config = SimulationConfig::from_cli_args(parse(&["--random-seed"])).unwrap();
    assert_eq!(config.seed, None);
    assert!(config.validate().is_ok());

    // A fixed seed and an entropy seed cannot both be asked for
    assert!(CliArgs::try_parse_from(["clinic-flow-simulator", "--random-seed", "--seed", "3"]).is_err());
}

#[test]
fn test_logging_flags() {
    let args = parse(&["--log-format", "json", "--log-dir", "logs", "--log-filter", "warn"]);
    assert_eq!(args.log_format.as_deref(), Some("json"));
    assert_eq!(args.log_dir.as_deref(), Some("logs"));
    assert_eq!(args.log_filter.as_deref(), Some("warn"));
    assert_eq!(parse_log_format(args.log_format.as_deref()).unwrap(), LogFormat::Json);

    // Logging flags never leak into the simulation config
    let config = SimulationConfig::from_cli_args(args).unwrap();
    assert_eq!(config.seed, Some(42));
}

#[test]
fn test_role_flags() {
    let config = SimulationConfig::from_cli_args(parse(&["--no-special-roles"])).unwrap();
    assert_eq!(config.appointment_only_doctor, None);
    assert_eq!(config.walkin_only_doctor, None);

    // Explicit roles win over the clearing flag
    let config = SimulationConfig::from_cli_args(parse(&[
        "--no-special-roles",
        "--walkin-only-doctor",
        "4",
    ]))
    .unwrap();
    assert_eq!(config.appointment_only_doctor, None);
    assert_eq!(config.walkin_only_doctor, Some(4));

    let config = SimulationConfig::from_cli_args(parse(&["--appointment-only-doctor", "6"])).unwrap();
    assert_eq!(config.appointment_only_doctor, Some(6));
    assert_eq!(config.walkin_only_doctor, Some(1));
}

#[test]
fn test_output_flags() {
    let args = parse(&[
        "--report-output",
        "run.json",
        "--report-format",
        "json",
        "--event-log",
        "--verbose",
        "--dry-run",
    ]);
    assert_eq!(args.report_output.as_deref(), Some("run.json"));
    assert!(args.event_log);
    assert!(args.verbose);
    assert!(!args.debug);
    assert!(args.dry_run);
    assert_eq!(parse_report_format(args.report_format.as_deref()).unwrap(), ReportFormat::Json);
}

#[test]
fn test_report_format_parsing() {
    assert_eq!(parse_report_format(None).unwrap(), ReportFormat::Text);
    assert_eq!(parse_report_format(Some("TEXT")).unwrap(), ReportFormat::Text);
    assert!(parse_report_format(Some("yaml")).is_err());
}

#[test]
fn test_invalid_arguments_are_rejected() {
    assert!(CliArgs::try_parse_from(["clinic-flow-simulator", "--seed", "abc"]).is_err());
    assert!(CliArgs::try_parse_from(["clinic-flow-simulator", "--imaging-room-count", "-1"]).is_err());
    assert!(CliArgs::try_parse_from(["clinic-flow-simulator", "--unknown-flag"]).is_err());
}

#[test]
fn test_invalid_override_fails_validation() {
    let config = SimulationConfig::from_cli_args(parse(&["--lunch-start", "320", "--lunch-end", "300"])).unwrap();
    assert!(config.validate().is_err());

    let config = SimulationConfig::from_cli_args(parse(&["--afternoon-speedup-factor", "1.2"])).unwrap();
    assert!(config.validate().is_err());

    let config = SimulationConfig::from_cli_args(parse(&["--imaging-room-count", "0"])).unwrap();
    assert!(config.validate().is_err());
}
