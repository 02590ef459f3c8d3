//! Shared simulation state handed to every process step
//!
//! The context owns everything processes read or mutate: the clock reading,
//! the RNG, the resource registry, doctor profiles, lunch flags, counters,
//! collected records and the narrative log. Side effects that need the
//! engine (waking a process, registering a new one) are queued here and
//! applied by the engine right after the step returns.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::{SimulationError, SimulationResult};
use super::monitor::QueueSeries;
use super::process::{Process, ProcessId};
use super::statistics::ClinicCounters;
use crate::clinic::{
    DoctorProfile, FlooredGamma, LunchBoard, ParametricDoctorProfile, ResourceRegistry,
};
use crate::patient::PatientRecord;
use crate::sim_event;
use crate::types::{DoctorId, ImagingRoomId, ResourceId, SimulationConfig};

/// One line of the human-readable run narrative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeEntry {
    /// Simulated time in minutes
    pub time: f64,
    /// What happened
    pub message: String,
}

/// Chronological narrative of a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    #[serde(skip)]
    enabled: bool,
    entries: Vec<NarrativeEntry>,
}

impl EventLog {
    /// Create a log; when disabled, entries are only traced, not kept
    pub fn new(enabled: bool) -> Self {
        Self { enabled, entries: Vec::new() }
    }

    /// Append an entry (no-op when disabled)
    pub fn push(&mut self, time: f64, message: String) {
        if self.enabled {
            self.entries.push(NarrativeEntry { time, message });
        }
    }

    /// Entries in the order they were produced
    pub fn entries(&self) -> &[NarrativeEntry] {
        &self.entries
    }

    /// Number of kept entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries were kept
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose message contains `needle`
    pub fn matching<'a>(&'a self, needle: &'a str) -> impl Iterator<Item = &'a NarrativeEntry> + 'a {
        self.entries.iter().filter(move |entry| entry.message.contains(needle))
    }
}

/// Why and how the run ended
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StopSignal {
    /// A stop has been requested
    pub requested: bool,
    /// The stop came from the hard timeout rather than a drained clinic
    pub forced: bool,
    /// Human-readable reason
    pub reason: Option<String>,
}

/// Side effect queued during a step for the engine to apply
#[derive(Debug)]
pub(crate) enum PendingWake {
    /// A queued request was granted
    Granted(ProcessId),
    /// A new process was started
    Spawned(Box<dyn Process>),
}

/// Mutable world state visible to processes
#[derive(Debug)]
pub struct SimContext {
    now: f64,
    current: ProcessId,
    config: SimulationConfig,
    rng: StdRng,
    resources: ResourceRegistry,
    profiles: Vec<Box<dyn DoctorProfile>>,
    imaging_law: FlooredGamma,
    lunch: LunchBoard,
    counters: ClinicCounters,
    records: Vec<PatientRecord>,
    series: QueueSeries,
    log: EventLog,
    stop: StopSignal,
    pending: Vec<PendingWake>,
}

impl SimContext {
    /// Build the world from a configuration using its parametric profiles
    pub fn new(config: SimulationConfig) -> SimulationResult<Self> {
        let profiles = config
            .doctors
            .iter()
            .map(|doctor| {
                ParametricDoctorProfile::from_config(doctor)
                    .map(|profile| Box::new(profile) as Box<dyn DoctorProfile>)
            })
            .collect::<SimulationResult<Vec<_>>>()?;
        Self::with_profiles(config, profiles)
    }

    /// Build the world with caller-supplied doctor profiles
    pub fn with_profiles(
        config: SimulationConfig,
        profiles: Vec<Box<dyn DoctorProfile>>,
    ) -> SimulationResult<Self> {
        if profiles.len() != config.doctor_count {
            return Err(SimulationError::configuration_error(format!(
                "{} doctor profiles supplied for {} doctors",
                profiles.len(),
                config.doctor_count
            )));
        }

        let rng = match config.seed {
            Some(seed) => {
                debug!(seed, "Seeding RNG");
                StdRng::seed_from_u64(seed)
            }
            None => {
                debug!("No seed configured, seeding RNG from entropy");
                StdRng::from_entropy()
            }
        };

        Ok(Self {
            now: 0.0,
            current: ProcessId(0),
            rng,
            resources: ResourceRegistry::new(config.doctor_count, config.imaging_room_count),
            imaging_law: config.imaging_duration.sampler()?,
            lunch: LunchBoard::new(config.doctor_count),
            counters: ClinicCounters::new(config.doctor_count),
            records: Vec::new(),
            series: QueueSeries::new(config.doctor_count, config.imaging_room_count),
            log: EventLog::new(config.record_event_log),
            stop: StopSignal::default(),
            pending: Vec::new(),
            profiles,
            config,
        })
    }

    /// Current simulated time in minutes
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Process whose step is running
    pub fn current_process(&self) -> ProcessId {
        self.current
    }

    /// Run configuration
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Shared random number generator
    pub fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }

    /// Draw from a doctor's profile with the shared RNG
    pub fn draw<T>(
        &mut self,
        doctor: DoctorId,
        sample: impl FnOnce(&dyn DoctorProfile, &mut dyn RngCore) -> T,
    ) -> SimulationResult<T> {
        let profile = self.profiles.get(doctor.index()).ok_or_else(|| {
            SimulationError::profile_error(format!("no profile for {}", doctor))
        })?;
        let rng: &mut dyn RngCore = &mut self.rng;
        Ok(sample(&**profile, rng))
    }

    /// Draw a base imaging duration
    pub fn draw_imaging_duration(&mut self) -> f64 {
        self.imaging_law.sample(&mut self.rng)
    }

    /// Resource registry (read-only)
    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub(crate) fn resources_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.resources
    }

    /// Pick an imaging room among those with the shortest queue
    pub fn choose_imaging_room(&mut self) -> SimulationResult<ImagingRoomId> {
        self.resources.choose_imaging_room(&mut self.rng)
    }

    /// Release a slot held by the current process
    ///
    /// If a waiting request takes over the slot, its process is woken at the
    /// current instant after this step.
    pub fn release(&mut self, resource: ResourceId) -> SimulationResult<()> {
        if let Some(next) = self.resources.release(resource, self.current)? {
            self.pending.push(PendingWake::Granted(next));
        }
        Ok(())
    }

    /// Start a new process at the current instant
    pub fn spawn(&mut self, process: Box<dyn Process>) {
        self.pending.push(PendingWake::Spawned(process));
    }

    /// Per-doctor lunch flags
    pub fn lunch(&self) -> &LunchBoard {
        &self.lunch
    }

    /// Per-doctor lunch flags (mutable)
    pub fn lunch_mut(&mut self) -> &mut LunchBoard {
        &mut self.lunch
    }

    /// Global counters
    pub fn counters(&self) -> &ClinicCounters {
        &self.counters
    }

    /// Global counters (mutable)
    pub fn counters_mut(&mut self) -> &mut ClinicCounters {
        &mut self.counters
    }

    /// Store a finished (or interrupted) patient record
    pub fn record_patient(&mut self, record: PatientRecord) {
        self.records.push(record);
    }

    /// Collected patient records
    pub fn records(&self) -> &[PatientRecord] {
        &self.records
    }

    /// Sampled queue lengths
    pub fn series(&self) -> &QueueSeries {
        &self.series
    }

    /// Append one queue sample at the current instant
    pub fn sample_queues(&mut self) {
        let doctors = self.resources.doctor_queue_lengths();
        let rooms = self.resources.imaging_queue_lengths();
        self.series.push(self.now, &doctors, &rooms);
    }

    /// Narrative log
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Record a narrative line and emit it as a trace event
    pub fn narrate(&mut self, message: impl Into<String>) {
        let message = message.into();
        sim_event!(info, message.as_str(), sim_time = self.now);
        self.log.push(self.now, message);
    }

    /// Record a narrative line at warning level
    pub fn narrate_warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(component = "clinic", sim_time = self.now, "{}", message);
        self.log.push(self.now, message);
    }

    /// Ask the engine to end the run after this step
    pub fn request_stop(&mut self, reason: impl Into<String>) {
        if !self.stop.requested {
            self.stop.requested = true;
            self.stop.reason = Some(reason.into());
        }
    }

    /// End the run because the hard timeout was exceeded
    pub fn force_stop(&mut self, reason: impl Into<String>) {
        if !self.stop.requested {
            self.stop.forced = true;
        }
        self.request_stop(reason);
    }

    /// Stop state
    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    pub(crate) fn set_step(&mut self, now: f64, current: ProcessId) {
        self.now = now;
        self.current = current;
    }

    pub(crate) fn take_pending(&mut self) -> Vec<PendingWake> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn queue_wake(&mut self, process: ProcessId) {
        self.pending.push(PendingWake::Granted(process));
    }

    pub(crate) fn into_outcome(self) -> ContextOutcome {
        ContextOutcome {
            counters: self.counters,
            series: self.series,
            records: self.records,
            log: self.log,
            stop: self.stop,
        }
    }
}

/// Everything a finished run hands to the report
#[derive(Debug)]
pub(crate) struct ContextOutcome {
    pub(crate) counters: ClinicCounters,
    pub(crate) series: QueueSeries,
    pub(crate) records: Vec<PatientRecord>,
    pub(crate) log: EventLog,
    pub(crate) stop: StopSignal,
}
