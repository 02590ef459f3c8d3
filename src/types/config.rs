//! Configuration structures for the clinic flow simulator
//!
//! This module contains the simulation configuration structure, the command
//! line surface and the validation logic that guards a run before it starts.
//! Values are layered: built-in defaults, then an optional JSON file, then
//! command line flags.

use super::{LogFormat, ReportFormat};
use crate::clinic::{DoctorProfileConfig, GammaLaw};
use clap::Parser;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

/// Default clinic day constants (minutes)
pub mod clinic_day {
    /// Appointment horizon: no appointment arrivals are admitted at or after it
    pub const HORIZON: f64 = 480.0;

    /// Walk-ins stop this many minutes before the horizon
    pub const WALKIN_CUTOFF_MARGIN: f64 = 60.0;

    /// Lunch window start
    pub const LUNCH_START: f64 = 240.0;

    /// Lunch window end
    pub const LUNCH_END: f64 = 300.0;

    /// Multiplier applied to the horizon to form the walk-in priority offset
    pub const WALKIN_PRIORITY_OFFSET_MULTIPLIER: f64 = 1000.0;
}

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "clinic-flow-simulator",
    version = "0.1.0",
    about = "Clinic Flow Simulator - Discrete-event model of a multi-doctor clinic with shared imaging rooms",
    long_about = "Simulates one clinic day: appointment and walk-in patients contend for doctors and imaging rooms under a priority discipline, a staff lunch window and time-varying service rates. The run ends once the day has fully drained.

EXAMPLES:
    # Run with default settings (seed 42, 7 doctors, 2 imaging rooms)
    clinic-flow-simulator

    # Use a configuration file
    clinic-flow-simulator --config clinic.json

    # Override specific settings
    clinic-flow-simulator --seed 7 --imaging-room-count 3

    # Generate configuration template
    clinic-flow-simulator --print-config > my-clinic.json

    # Validate configuration without running
    clinic-flow-simulator --config my-clinic.json --dry-run

    # Write the full run report as JSON
    clinic-flow-simulator --report-output run.json

    # Unseeded run with JSON logs kept on disk
    clinic-flow-simulator --random-seed --log-format json --log-dir logs

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)

    Doctor ids used by --appointment-only-doctor and --walkin-only-doctor are zero-based."
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Appointment horizon in minutes
    #[arg(long, help = "Appointment horizon in minutes")]
    pub horizon: Option<f64>,

    /// Lunch window start in minutes
    #[arg(long, help = "Lunch window start (minutes)")]
    pub lunch_start: Option<f64>,

    /// Lunch window end in minutes
    #[arg(long, help = "Lunch window end (minutes)")]
    pub lunch_end: Option<f64>,

    /// Walk-in cutoff margin before the horizon
    #[arg(
        long,
        help = "Minutes before the horizon at which walk-ins stop",
        long_help = "Walk-in generation stops once the next arrival would fall at or after horizon minus this margin. Default: 60"
    )]
    pub walkin_cutoff_margin: Option<f64>,

    /// Number of imaging rooms
    #[arg(long, help = "Number of imaging rooms")]
    pub imaging_room_count: Option<usize>,

    /// Afternoon exam speedup factor (< 1 means faster)
    #[arg(long, help = "Exam duration multiplier after lunch (0.0-1.0]")]
    pub afternoon_speedup_factor: Option<f64>,

    /// Imaging duration penalty before lunch ends (> 1 means slower)
    #[arg(long, help = "Imaging duration multiplier before lunch end (>= 1.0)")]
    pub imaging_pre_lunch_penalty: Option<f64>,

    /// Earliest punctuality deviation for appointments (negative = early)
    #[arg(long, allow_hyphen_values = true, help = "Minimum punctuality deviation (minutes)")]
    pub punctuality_min_deviation: Option<f64>,

    /// Latest punctuality deviation for appointments
    #[arg(long, allow_hyphen_values = true, help = "Maximum punctuality deviation (minutes)")]
    pub punctuality_max_deviation: Option<f64>,

    /// Random seed for reproducible results
    #[arg(long, conflicts_with = "random_seed", help = "Random seed for reproducible results")]
    pub seed: Option<u64>,

    /// Seed the run from OS entropy instead of a fixed seed
    #[arg(long, help = "Draw a fresh seed from OS entropy (results not reproducible)")]
    pub random_seed: bool,

    /// Doctor (zero-based) who only sees appointments
    #[arg(long, help = "Zero-based id of the appointment-only doctor")]
    pub appointment_only_doctor: Option<usize>,

    /// Doctor (zero-based) who only sees walk-ins
    #[arg(long, help = "Zero-based id of the walk-in-only doctor")]
    pub walkin_only_doctor: Option<usize>,

    /// Clear both special-role designations
    #[arg(long, help = "Run every doctor in dual appointment/walk-in mode")]
    pub no_special_roles: bool,

    /// Queue sampling interval in minutes
    #[arg(long, help = "Queue sampling interval (minutes)")]
    pub queue_sample_interval: Option<f64>,

    /// Output path for the JSON run report
    #[arg(long, help = "Write the full run report as JSON to this path")]
    pub report_output: Option<String>,

    /// Format of the summary printed to stdout
    #[arg(long, help = "Summary format on stdout (text or json)")]
    pub report_format: Option<String>,

    /// Print the narrative event log after the run
    #[arg(long, help = "Print the narrative event log after the run")]
    pub event_log: bool,

    /// Diagnostic log format
    #[arg(long, help = "Diagnostic log format on stderr (text or json)")]
    pub log_format: Option<String>,

    /// Directory for daily-rolling JSON log files
    #[arg(
        long,
        help = "Also write JSON logs to daily files in this directory",
        long_help = "Writes a daily-rolling JSON log file (clinic-flow-simulator.YYYY-MM-DD) into this directory in addition to console output."
    )]
    pub log_dir: Option<String>,

    /// Custom tracing filter directives
    #[arg(long, help = "Tracing filter directives, e.g. clinic_flow_simulator=trace")]
    pub log_filter: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging (includes every patient transition)")]
    pub debug: bool,

    /// Dry run mode - validate configuration without running simulation
    #[arg(long, help = "Validate configuration without running simulation")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Appointment horizon in minutes
    pub horizon: Option<f64>,
    /// Lunch window start
    pub lunch_start: Option<f64>,
    /// Lunch window end
    pub lunch_end: Option<f64>,
    /// Walk-in cutoff margin before the horizon
    pub walkin_cutoff_margin: Option<f64>,
    /// Number of doctors
    pub doctor_count: Option<usize>,
    /// Number of imaging rooms
    pub imaging_room_count: Option<usize>,
    /// Afternoon exam speedup factor
    pub afternoon_speedup_factor: Option<f64>,
    /// Imaging pre-lunch penalty factor
    pub imaging_pre_lunch_penalty: Option<f64>,
    /// Minimum punctuality deviation
    pub punctuality_min_deviation: Option<f64>,
    /// Maximum punctuality deviation
    pub punctuality_max_deviation: Option<f64>,
    /// Random seed; `null` asks for an entropy seed
    #[serde(default, deserialize_with = "deserialize_explicit_option")]
    pub seed: Option<Option<u64>>,
    /// Appointment-only doctor; `null` clears the default designation
    #[serde(default, deserialize_with = "deserialize_explicit_option")]
    pub appointment_only_doctor: Option<Option<usize>>,
    /// Walk-in-only doctor; `null` clears the default designation
    #[serde(default, deserialize_with = "deserialize_explicit_option")]
    pub walkin_only_doctor: Option<Option<usize>>,
    /// Queue sampling interval
    pub queue_sample_interval: Option<f64>,
    /// Longest single wait the queue monitor takes
    pub monitor_sub_increment: Option<f64>,
    /// Drain polling interval after the horizon
    pub drain_check_interval: Option<f64>,
    /// Hard timeout as a multiple of the horizon
    pub hard_timeout_factor: Option<f64>,
    /// Whether to keep the narrative log in memory
    pub record_event_log: Option<bool>,
    /// Per-doctor stochastic laws
    pub doctors: Option<Vec<DoctorProfileConfig>>,
    /// Shared imaging duration law
    pub imaging_duration: Option<GammaLaw>,
}

/// Distinguish an absent key from an explicit `null`
fn deserialize_explicit_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Configuration for one simulated clinic day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Appointment horizon in minutes
    pub horizon: f64,

    /// Lunch window start in minutes
    pub lunch_start: f64,

    /// Lunch window end in minutes
    pub lunch_end: f64,

    /// Walk-ins stop at `horizon - walkin_cutoff_margin`
    pub walkin_cutoff_margin: f64,

    /// Number of doctors (must match `doctors.len()`)
    pub doctor_count: usize,

    /// Number of imaging rooms
    pub imaging_room_count: usize,

    /// Exam duration multiplier for exams starting at or after lunch end
    pub afternoon_speedup_factor: f64,

    /// Imaging duration multiplier for imaging starting before lunch end
    pub imaging_pre_lunch_penalty: f64,

    /// Minimum punctuality deviation for appointments (negative = early)
    pub punctuality_min_deviation: f64,

    /// Maximum punctuality deviation for appointments
    pub punctuality_max_deviation: f64,

    /// Random seed for reproducible results
    pub seed: Option<u64>,

    /// Zero-based id of the appointment-only doctor
    pub appointment_only_doctor: Option<usize>,

    /// Zero-based id of the walk-in-only doctor
    pub walkin_only_doctor: Option<usize>,

    /// Queue sampling interval in minutes
    pub queue_sample_interval: f64,

    /// Longest single wait the queue monitor takes between checks
    pub monitor_sub_increment: f64,

    /// Drain polling interval after the horizon
    pub drain_check_interval: f64,

    /// The run is forced to stop once time exceeds `horizon * hard_timeout_factor`
    pub hard_timeout_factor: f64,

    /// Keep the narrative log in memory for the run report
    pub record_event_log: bool,

    /// Per-doctor stochastic laws, indexed by doctor id
    pub doctors: Vec<DoctorProfileConfig>,

    /// Shared imaging duration law
    pub imaging_duration: GammaLaw,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),

    /// Unknown report format on the command line
    #[error("Invalid report format: {0}")]
    InvalidReportFormat(String),

    /// Unknown log format on the command line
    #[error("Invalid log format: {0}")]
    InvalidLogFormat(String),
}

/// Validation errors for simulation configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// Horizon is not a positive finite number
    #[error("Horizon must be a positive number of minutes, got {0}")]
    InvalidHorizon(f64),

    /// Lunch window is reversed or outside the day
    #[error("Invalid lunch window: start ({start}) must be <= end ({end}) and both within [0, horizon]")]
    InvalidLunchWindow {
        /// Configured lunch start
        start: f64,
        /// Configured lunch end
        end: f64,
    },

    /// Walk-in cutoff margin leaves no walk-in window
    #[error("Walk-in cutoff margin must be within [0, {horizon}), got {margin}")]
    InvalidWalkinCutoffMargin {
        /// Configured margin
        margin: f64,
        /// Configured horizon
        horizon: f64,
    },

    /// Doctor count is zero
    #[error("Doctor count must be greater than 0, got {0}")]
    InvalidDoctorCount(usize),

    /// Imaging room count is zero
    #[error("Imaging room count must be greater than 0, got {0}")]
    InvalidImagingRoomCount(usize),

    /// Afternoon speedup is outside (0, 1]
    #[error("Afternoon speedup factor must be within (0.0, 1.0], got {0}")]
    InvalidSpeedupFactor(f64),

    /// Imaging penalty is below 1
    #[error("Imaging pre-lunch penalty must be >= 1.0, got {0}")]
    InvalidImagingPenalty(f64),

    /// Punctuality bounds are reversed
    #[error("Invalid punctuality bounds: min ({min}) must be <= max ({max})")]
    InvalidPunctualityBounds {
        /// Configured minimum deviation
        min: f64,
        /// Configured maximum deviation
        max: f64,
    },

    /// A polling or sampling interval is not positive
    #[error("Invalid interval for {field}: {value} (must be > 0)")]
    InvalidInterval {
        /// Name of the interval field
        field: String,
        /// The invalid value
        value: f64,
    },

    /// Hard timeout would fire at or before the horizon
    #[error("Hard timeout factor must be > 1.0, got {0}")]
    InvalidTimeoutFactor(f64),

    /// Number of doctor profiles differs from doctor count
    #[error("Expected {expected} doctor profiles, got {actual}")]
    ProfileCountMismatch {
        /// Configured doctor count
        expected: usize,
        /// Number of profiles supplied
        actual: usize,
    },

    /// Probability value is out of range
    #[error("Invalid probability for {field}: {value} (must be between 0.0 and 1.0)")]
    InvalidPercentage {
        /// Name of the field with invalid probability
        field: String,
        /// The invalid value
        value: f64,
    },

    /// A stochastic law has unusable parameters
    #[error("Invalid law for {field}: {reason}")]
    InvalidLaw {
        /// Law location, e.g. `doctors[2].second_exam`
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let doctors = DoctorProfileConfig::clinic_defaults();
        Self {
            horizon: clinic_day::HORIZON,
            lunch_start: clinic_day::LUNCH_START,
            lunch_end: clinic_day::LUNCH_END,
            walkin_cutoff_margin: clinic_day::WALKIN_CUTOFF_MARGIN,
            doctor_count: doctors.len(),
            imaging_room_count: 2,
            afternoon_speedup_factor: 0.85,
            imaging_pre_lunch_penalty: 1.25,
            punctuality_min_deviation: -5.0,
            punctuality_max_deviation: 10.0,
            seed: Some(42),
            appointment_only_doctor: Some(0),
            walkin_only_doctor: Some(1),
            queue_sample_interval: 1.0,
            monitor_sub_increment: 0.5,
            drain_check_interval: 2.0,
            hard_timeout_factor: 4.0,
            record_event_log: true,
            doctors,
            imaging_duration: GammaLaw::new(1.25, 1.9, 1.0),
        }
    }
}

impl SimulationConfig {
    /// Create a new configuration from command line arguments and optional config file
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::from_cli_args(args)
    }

    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI takes precedence over the file
        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        let doctors = config_file.doctors.unwrap_or(defaults.doctors);
        // A file that supplies its own profiles implies its own doctor count
        let doctor_count = config_file.doctor_count.unwrap_or(doctors.len());

        Self {
            horizon: config_file.horizon.unwrap_or(defaults.horizon),
            lunch_start: config_file.lunch_start.unwrap_or(defaults.lunch_start),
            lunch_end: config_file.lunch_end.unwrap_or(defaults.lunch_end),
            walkin_cutoff_margin: config_file
                .walkin_cutoff_margin
                .unwrap_or(defaults.walkin_cutoff_margin),
            doctor_count,
            imaging_room_count: config_file
                .imaging_room_count
                .unwrap_or(defaults.imaging_room_count),
            afternoon_speedup_factor: config_file
                .afternoon_speedup_factor
                .unwrap_or(defaults.afternoon_speedup_factor),
            imaging_pre_lunch_penalty: config_file
                .imaging_pre_lunch_penalty
                .unwrap_or(defaults.imaging_pre_lunch_penalty),
            punctuality_min_deviation: config_file
                .punctuality_min_deviation
                .unwrap_or(defaults.punctuality_min_deviation),
            punctuality_max_deviation: config_file
                .punctuality_max_deviation
                .unwrap_or(defaults.punctuality_max_deviation),
            seed: config_file.seed.unwrap_or(defaults.seed),
            appointment_only_doctor: config_file
                .appointment_only_doctor
                .unwrap_or(defaults.appointment_only_doctor),
            walkin_only_doctor: config_file
                .walkin_only_doctor
                .unwrap_or(defaults.walkin_only_doctor),
            queue_sample_interval: config_file
                .queue_sample_interval
                .unwrap_or(defaults.queue_sample_interval),
            monitor_sub_increment: config_file
                .monitor_sub_increment
                .unwrap_or(defaults.monitor_sub_increment),
            drain_check_interval: config_file
                .drain_check_interval
                .unwrap_or(defaults.drain_check_interval),
            hard_timeout_factor: config_file
                .hard_timeout_factor
                .unwrap_or(defaults.hard_timeout_factor),
            record_event_log: config_file.record_event_log.unwrap_or(defaults.record_event_log),
            doctors,
            imaging_duration: config_file.imaging_duration.unwrap_or(defaults.imaging_duration),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) {
        if let Some(value) = args.horizon {
            config.horizon = value;
        }
        if let Some(value) = args.lunch_start {
            config.lunch_start = value;
        }
        if let Some(value) = args.lunch_end {
            config.lunch_end = value;
        }
        if let Some(value) = args.walkin_cutoff_margin {
            config.walkin_cutoff_margin = value;
        }
        if let Some(value) = args.imaging_room_count {
            config.imaging_room_count = value;
        }
        if let Some(value) = args.afternoon_speedup_factor {
            config.afternoon_speedup_factor = value;
        }
        if let Some(value) = args.imaging_pre_lunch_penalty {
            config.imaging_pre_lunch_penalty = value;
        }
        if let Some(value) = args.punctuality_min_deviation {
            config.punctuality_min_deviation = value;
        }
        if let Some(value) = args.punctuality_max_deviation {
            config.punctuality_max_deviation = value;
        }
        if args.random_seed {
            config.seed = None;
        }
        if let Some(value) = args.seed {
            config.seed = Some(value);
        }
        if args.no_special_roles {
            config.appointment_only_doctor = None;
            config.walkin_only_doctor = None;
        }
        if let Some(value) = args.appointment_only_doctor {
            config.appointment_only_doctor = Some(value);
        }
        if let Some(value) = args.walkin_only_doctor {
            config.walkin_only_doctor = Some(value);
        }
        if let Some(value) = args.queue_sample_interval {
            config.queue_sample_interval = value;
        }
    }

    /// Replace the doctor table and keep `doctor_count` in step with it
    pub fn with_doctors(mut self, doctors: Vec<DoctorProfileConfig>) -> Self {
        self.doctor_count = doctors.len();
        self.doctors = doctors;
        self
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    ///
    /// Special-role designations are deliberately not checked here: an
    /// out-of-range role is disabled with a warning when the run is built.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.horizon.is_finite() || self.horizon <= 0.0 {
            return Err(ConfigValidationError::InvalidHorizon(self.horizon));
        }

        if !(self.lunch_start.is_finite() && self.lunch_end.is_finite())
            || self.lunch_start < 0.0
            || self.lunch_start > self.lunch_end
            || self.lunch_end > self.horizon
        {
            return Err(ConfigValidationError::InvalidLunchWindow {
                start: self.lunch_start,
                end: self.lunch_end,
            });
        }

        if !self.walkin_cutoff_margin.is_finite()
            || self.walkin_cutoff_margin < 0.0
            || self.walkin_cutoff_margin >= self.horizon
        {
            return Err(ConfigValidationError::InvalidWalkinCutoffMargin {
                margin: self.walkin_cutoff_margin,
                horizon: self.horizon,
            });
        }

        if self.doctor_count == 0 {
            return Err(ConfigValidationError::InvalidDoctorCount(self.doctor_count));
        }

        if self.imaging_room_count == 0 {
            return Err(ConfigValidationError::InvalidImagingRoomCount(self.imaging_room_count));
        }

        if !(self.afternoon_speedup_factor > 0.0 && self.afternoon_speedup_factor <= 1.0) {
            return Err(ConfigValidationError::InvalidSpeedupFactor(self.afternoon_speedup_factor));
        }

        if !self.imaging_pre_lunch_penalty.is_finite() || self.imaging_pre_lunch_penalty < 1.0 {
            return Err(ConfigValidationError::InvalidImagingPenalty(
                self.imaging_pre_lunch_penalty,
            ));
        }

        if !(self.punctuality_min_deviation.is_finite() && self.punctuality_max_deviation.is_finite())
            || self.punctuality_min_deviation > self.punctuality_max_deviation
        {
            return Err(ConfigValidationError::InvalidPunctualityBounds {
                min: self.punctuality_min_deviation,
                max: self.punctuality_max_deviation,
            });
        }

        self.validate_interval("queue_sample_interval", self.queue_sample_interval)?;
        self.validate_interval("monitor_sub_increment", self.monitor_sub_increment)?;
        self.validate_interval("drain_check_interval", self.drain_check_interval)?;

        if !self.hard_timeout_factor.is_finite() || self.hard_timeout_factor <= 1.0 {
            return Err(ConfigValidationError::InvalidTimeoutFactor(self.hard_timeout_factor));
        }

        if self.doctors.len() != self.doctor_count {
            return Err(ConfigValidationError::ProfileCountMismatch {
                expected: self.doctor_count,
                actual: self.doctors.len(),
            });
        }

        for (index, profile) in self.doctors.iter().enumerate() {
            self.validate_percentage(
                &format!("doctors[{}].imaging_probability", index),
                profile.imaging_probability,
            )?;
            profile.validate_laws().map_err(|(law, reason)| ConfigValidationError::InvalidLaw {
                field: format!("doctors[{}].{}", index, law),
                reason,
            })?;
        }

        self.imaging_duration.validate().map_err(|reason| ConfigValidationError::InvalidLaw {
            field: "imaging_duration".to_string(),
            reason,
        })?;

        Ok(())
    }

    /// Helper method to validate probability values
    fn validate_percentage(&self, field: &str, value: f64) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigValidationError::InvalidPercentage {
                field: field.to_string(),
                value,
            });
        }
        Ok(())
    }

    /// Helper method to validate strictly positive intervals
    fn validate_interval(&self, field: &str, value: f64) -> Result<(), ConfigValidationError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigValidationError::InvalidInterval { field: field.to_string(), value });
        }
        Ok(())
    }

    /// Instant at or after which no further walk-ins are admitted
    pub fn walkin_cutoff(&self) -> f64 {
        self.horizon - self.walkin_cutoff_margin
    }

    /// Additive offset used by the scalar form of walk-in priority keys
    pub fn walkin_priority_offset(&self) -> f64 {
        self.horizon * clinic_day::WALKIN_PRIORITY_OFFSET_MULTIPLIER
    }

    /// Instant after which the drain detector forces a stop
    pub fn hard_timeout_at(&self) -> f64 {
        self.horizon * self.hard_timeout_factor
    }

    /// Lunch window as a `(start, end)` tuple
    pub fn lunch_window(&self) -> (f64, f64) {
        (self.lunch_start, self.lunch_end)
    }

    /// Punctuality deviation bounds as a `(min, max)` tuple
    pub fn punctuality_bounds(&self) -> (f64, f64) {
        (self.punctuality_min_deviation, self.punctuality_max_deviation)
    }
}

/// Parse the stdout summary format requested on the command line
pub fn parse_report_format(value: Option<&str>) -> Result<ReportFormat, ConfigError> {
    match value {
        None => Ok(ReportFormat::Text),
        Some(raw) => raw.parse().map_err(ConfigError::InvalidReportFormat),
    }
}

/// Parse the diagnostic log format flag (defaults to text)
pub fn parse_log_format(value: Option<&str>) -> Result<LogFormat, ConfigError> {
    match value {
        None => Ok(LogFormat::Text),
        Some(raw) => raw.parse().map_err(ConfigError::InvalidLogFormat),
    }
}
