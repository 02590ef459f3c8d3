// Clinic Flow Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/clinic-flow-simulator
// ```
//
// Or with custom configuration:
//
// ```console
// $ ./target/release/clinic-flow-simulator --seed 7 --imaging-room-count 3 --verbose
// $ ./target/release/clinic-flow-simulator --log-format json --log-dir logs
// ```

use anyhow::Context;
use clap::Parser;
use clinic_flow_simulator::simulation::{LoggingConfig, RunReport, SimulationOrchestrator};
use clinic_flow_simulator::types::config::{parse_report_format, CliArgs};
use clinic_flow_simulator::types::{ReportFormat, SimulationConfig};
use std::fs;
use std::process;
use tracing::{error, info};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    if args.print_config {
        let default_config = SimulationConfig::default();
        match default_config.print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    // Initialize logging based on CLI flags
    let logging_config = match LoggingConfig::from_cli_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to configure logging: {}", e);
            process::exit(1);
        }
    };

    // The guard flushes the log file writer when main returns
    let _logging_guard = match logging_config.init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    info!("Starting Clinic Flow Simulator");

    let report_format = match parse_report_format(args.report_format.as_deref()) {
        Ok(format) => format,
        Err(e) => {
            error!("Failed to parse report format: {}", e);
            process::exit(1);
        }
    };

    let config = match SimulationConfig::from_cli_args(args.clone()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        process::exit(1);
    }

    info!("Configuration loaded and validated successfully");

    if args.dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - simulation will not be executed.");
        print_configuration_summary(&config);
        return;
    }

    print_startup_banner(&config);

    if let Err(e) = run_simulation(config, &args, report_format) {
        error!("Simulation failed: {:#}", e);
        process::exit(1);
    }

    info!("Clinic Flow Simulator completed successfully");
}

/// Run one clinic day and emit the requested outputs
fn run_simulation(config: SimulationConfig, args: &CliArgs, format: ReportFormat) -> anyhow::Result<()> {
    let orchestrator =
        SimulationOrchestrator::new(config).context("Failed to initialize simulation")?;
    info!(run_id = %orchestrator.run_id(), processes = orchestrator.process_count(), "Simulation initialized");

    let report = orchestrator.run().context("Clinic simulation aborted")?;

    if args.event_log {
        print!("{}", report.render_event_log());
        println!();
    }

    match format {
        ReportFormat::Text => print!("{}", report),
        ReportFormat::Json => println!("{}", report.to_json().context("Failed to serialize run report")?),
    }

    if let Some(path) = &args.report_output {
        write_report(&report, path)?;
        eprintln!("Run report written to: {}", path);
    }

    Ok(())
}

/// Write the full run report as pretty JSON
fn write_report(report: &RunReport, path: &str) -> anyhow::Result<()> {
    let json = report.to_json().context("Failed to serialize run report")?;
    fs::write(path, json).with_context(|| format!("Failed to write run report to '{}'", path))?;
    info!(path, records = report.records.len(), "Run report written");
    Ok(())
}

/// Print startup banner and configuration summary
fn print_startup_banner(config: &SimulationConfig) {
    eprintln!("Clinic Flow Simulator");
    eprintln!("=====================");
    eprintln!("Patient flow through a multi-doctor clinic with shared imaging rooms");
    eprintln!();

    print_configuration_summary(config);
}

/// Print configuration summary
fn print_configuration_summary(config: &SimulationConfig) {
    let (lunch_start, lunch_end) = config.lunch_window();
    let (early, late) = config.punctuality_bounds();

    eprintln!("Configuration:");
    eprintln!("  Doctors: {}", config.doctor_count);
    eprintln!("  Imaging Rooms: {}", config.imaging_room_count);
    eprintln!("  Appointment Horizon: {:.0} min", config.horizon);
    eprintln!("  Walk-in Cutoff: {:.0} min", config.walkin_cutoff());
    eprintln!("  Lunch Window: {:.0} - {:.0} min", lunch_start, lunch_end);
    eprintln!("  Afternoon Exam Factor: {:.2}", config.afternoon_speedup_factor);
    eprintln!("  Pre-lunch Imaging Factor: {:.2}", config.imaging_pre_lunch_penalty);
    eprintln!("  Punctuality Deviation: {:+.0} .. {:+.0} min", early, late);
    match config.appointment_only_doctor {
        Some(index) => eprintln!("  Appointment-only Doctor: Dr {}", index + 1),
        None => eprintln!("  Appointment-only Doctor: none"),
    }
    match config.walkin_only_doctor {
        Some(index) => eprintln!("  Walk-in-only Doctor: Dr {}", index + 1),
        None => eprintln!("  Walk-in-only Doctor: none"),
    }
    eprintln!("  Hard Timeout: {:.0} min", config.hard_timeout_at());
    match config.seed {
        Some(seed) => eprintln!("  Random Seed: {}", seed),
        None => eprintln!("  Random Seed: from entropy"),
    }

    eprintln!("\nDoctor Profiles:");
    for (index, doctor) in config.doctors.iter().enumerate() {
        eprintln!(
            "  Dr {}: mean walk-in gap {:.1} min, appointment interval {:.1}-{:.1} min, imaging {:.0}%",
            index + 1,
            doctor.interarrival.mean,
            doctor.appointment_interval.min,
            doctor.appointment_interval.max,
            doctor.imaging_probability * 100.0
        );
    }
    eprintln!();
}
