//! Main simulation orchestrator
//!
//! The orchestrator owns the clock, the process table and the shared
//! context. It builds appointment schedules, registers every process at time
//! zero and then drives the event loop until the drain detector (or the hard
//! timeout) stops the run.

use chrono::Utc;
use tracing::{debug, error, field, info, instrument, warn};

use super::clock::SimClock;
use super::context::{PendingWake, SimContext};
use super::error::{SimulationError, SimulationResult};
use super::monitor::QueueMonitor;
use super::process::{Process, ProcessId, Yield};
use super::statistics::{RunReport, RunSummaryInputs};
use super::terminator::DrainDetector;
use crate::clinic::{DoctorProfile, LunchCoordinator, RequestOutcome, Schedule};
use crate::patient::{AppointmentGenerator, RoleAssignments, WalkInGenerator};
use crate::perf_span;
use crate::types::{DoctorId, RunId, SimulationConfig};

/// Drives one simulated clinic day
#[derive(Debug)]
pub struct SimulationOrchestrator {
    run_id: RunId,
    clock: SimClock,
    ctx: SimContext,
    processes: Vec<Option<Box<dyn Process>>>,
    roles: RoleAssignments,
    schedules: Vec<Schedule>,
    steps: u64,
    retired: usize,
}

impl SimulationOrchestrator {
    /// Validate the configuration and set up the clinic with parametric profiles
    #[instrument(skip(config), fields(doctors = config.doctor_count, rooms = config.imaging_room_count, seed = ?config.seed))]
    pub fn new(config: SimulationConfig) -> SimulationResult<Self> {
        config.validate()?;
        Self::from_context(SimContext::new(config)?)
    }

    /// Validate the configuration and set up the clinic with custom profiles
    pub fn with_profiles(
        config: SimulationConfig,
        profiles: Vec<Box<dyn DoctorProfile>>,
    ) -> SimulationResult<Self> {
        config.validate()?;
        Self::from_context(SimContext::with_profiles(config, profiles)?)
    }

    fn from_context(mut ctx: SimContext) -> SimulationResult<Self> {
        let run_id = RunId::new();
        info!(
            run_id = %run_id,
            horizon = ctx.config().horizon,
            walkin_cutoff = ctx.config().walkin_cutoff(),
            lunch_start = ctx.config().lunch_start,
            lunch_end = ctx.config().lunch_end,
            "Initializing clinic simulation"
        );

        let roles = RoleAssignments::resolve(ctx.config());
        let schedules = Self::build_schedules(&mut ctx, &roles)?;

        let mut orchestrator = Self {
            run_id,
            clock: SimClock::new(),
            ctx,
            processes: Vec::new(),
            roles,
            schedules,
            steps: 0,
            retired: 0,
        };
        orchestrator.register_processes();
        Ok(orchestrator)
    }

    /// Lay out every doctor's slots once, in doctor order, from the shared RNG
    fn build_schedules(ctx: &mut SimContext, roles: &RoleAssignments) -> SimulationResult<Vec<Schedule>> {
        let horizon = ctx.config().horizon;
        let mut schedules = Vec::with_capacity(ctx.config().doctor_count);

        ctx.narrate("--- Generating scheduled appointment times ---");
        for index in 0..ctx.config().doctor_count {
            let doctor = DoctorId(index);
            if !roles.runs_appointments(doctor) {
                ctx.narrate(format!("  {} (Walk-in-only): no appointments scheduled.", doctor));
                schedules.push(Schedule::empty(doctor));
                continue;
            }

            let schedule = ctx.draw(doctor, |profile, rng| Schedule::build(doctor, profile, horizon, rng))??;
            let last = schedule.last().map_or_else(|| "None".to_string(), |t| format!("{:.2}", t));
            ctx.narrate(format!(
                "  {}: {} appointments scheduled. Last scheduled: {} (Limit: {:.0})",
                doctor,
                schedule.len(),
                last,
                horizon
            ));
            schedules.push(schedule);
        }

        debug!(total = schedules.iter().map(Schedule::len).sum::<usize>(), "Schedules built");
        Ok(schedules)
    }

    /// Register generators, lunch coordinators, the monitor and the detector
    fn register_processes(&mut self) {
        self.ctx.narrate("--- Starting patient generators ---");
        for index in 0..self.ctx.config().doctor_count {
            let doctor = DoctorId(index);
            let walk_ins = self.roles.runs_walk_ins(doctor);
            let appointments = self.roles.runs_appointments(doctor) && !self.schedules[index].is_empty();

            if walk_ins {
                self.register(Box::new(WalkInGenerator::new(doctor)));
            }
            if appointments {
                self.register(Box::new(AppointmentGenerator::new(self.schedules[index].clone())));
            }

            let started = match (walk_ins, appointments) {
                (true, true) => "BOTH appointment and walk-in generators started",
                (true, false) => "walk-in generator started",
                (false, true) => "appointment generator started",
                (false, false) => "no generators started",
            };
            self.ctx.narrate(format!("  {}: {}.", doctor, started));

            self.register(Box::new(LunchCoordinator::new(doctor)));
        }

        let (interval, sub_increment) =
            (self.ctx.config().queue_sample_interval, self.ctx.config().monitor_sub_increment);
        self.register(Box::new(QueueMonitor::new(interval, sub_increment)));
        let drain_interval = self.ctx.config().drain_check_interval;
        self.register(Box::new(DrainDetector::new(drain_interval)));
    }

    fn register(&mut self, process: Box<dyn Process>) -> ProcessId {
        let id = ProcessId(self.processes.len());
        debug!(process = %id, name = %process.name(), sim_time = self.clock.now(), "Registering process");
        self.processes.push(Some(process));
        self.clock.schedule_now(id);
        id
    }

    /// Run identifier
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Resolved special roles
    pub fn roles(&self) -> RoleAssignments {
        self.roles
    }

    /// Appointment schedules, by doctor
    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    /// Shared state, for inspection before or after stepping
    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    /// Number of processes ever registered
    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// Run the day to completion and produce the report
    pub fn run(mut self) -> SimulationResult<RunReport> {
        let started_at = Utc::now();
        let span = perf_span!("clinic_day", run_id = field::display(self.run_id));
        let _enter = span.enter();
        info!(processes = self.processes.len(), "Starting clinic simulation");

        while let Some(event) = self.clock.advance() {
            self.step(event.process)?;
            if self.ctx.stop_signal().requested {
                break;
            }
        }

        if !self.ctx.stop_signal().requested {
            warn!(sim_time = self.clock.now(), "Event queue exhausted before a stop was requested");
        }
        self.stop_all();

        let final_time = self.clock.now();
        info!(
            sim_time = final_time,
            steps = self.steps,
            retired = self.retired,
            forced = self.ctx.stop_signal().forced,
            "Clinic simulation finished"
        );

        let config = self.ctx.config();
        let inputs = RunSummaryInputs {
            run_id: self.run_id,
            seed: config.seed,
            started_at,
            horizon: config.horizon,
            walkin_cutoff: config.walkin_cutoff(),
            lunch_window: config.lunch_window(),
            final_time,
            roles: self.roles,
            schedules: self.schedules.iter().map(Schedule::len).collect(),
            imaging_probabilities: config.doctors.iter().map(|d| d.imaging_probability).collect(),
        };
        let outcome = self.ctx.into_outcome();
        Ok(RunReport::assemble(
            inputs,
            outcome.counters,
            outcome.series,
            outcome.records,
            outcome.log,
            outcome.stop,
        ))
    }

    /// Resume one process and apply what it asked for
    fn step(&mut self, id: ProcessId) -> SimulationResult<()> {
        let slot = self.processes.get_mut(id.0).ok_or_else(|| {
            SimulationError::scheduler_error(format!("event for unregistered {}", id))
        })?;
        let Some(mut process) = slot.take() else {
            debug!(process = %id, "Dropping wake for a finished process");
            return Ok(());
        };

        self.steps += 1;
        self.ctx.set_step(self.clock.now(), id);
        let outcome = process.resume(&mut self.ctx);
        self.apply_pending();

        match outcome {
            Ok(Yield::Wait(delay)) => match self.clock.schedule_in(delay, id) {
                Ok(()) => self.processes[id.0] = Some(process),
                Err(e) => self.retire(id, process, e),
            },
            Ok(Yield::Request(resource, key)) => {
                match self.ctx.resources_mut().request(resource, id, key) {
                    Ok(RequestOutcome::Granted) => {
                        self.clock.schedule_now(id);
                        self.processes[id.0] = Some(process);
                    }
                    Ok(RequestOutcome::Queued { position }) => {
                        debug!(process = %id, resource = %resource, position, key = %key, "Request queued");
                        self.processes[id.0] = Some(process);
                    }
                    Err(e) => self.retire(id, process, e),
                }
            }
            Ok(Yield::Done) => self.finish(id, process),
            Err(e) => self.retire(id, process, e),
        }
        Ok(())
    }

    /// Schedule wakes queued during a step, in the order they were queued
    fn apply_pending(&mut self) {
        for wake in self.ctx.take_pending() {
            match wake {
                PendingWake::Granted(id) => self.clock.schedule_now(id),
                PendingWake::Spawned(process) => {
                    self.register(process);
                }
            }
        }
    }

    fn finish(&mut self, id: ProcessId, mut process: Box<dyn Process>) {
        self.ctx.set_step(self.clock.now(), id);
        process.on_exit(&mut self.ctx);

        let granted = self.ctx.resources_mut().evict(id);
        if !granted.is_empty() {
            warn!(process = %id, name = %process.name(), "Process ended while holding a resource; slot handed over");
        }
        for next in granted {
            self.ctx.queue_wake(next);
        }
        self.apply_pending();
    }

    fn retire(&mut self, id: ProcessId, process: Box<dyn Process>, err: SimulationError) {
        error!(
            process = %id,
            name = %process.name(),
            category = err.category(),
            recoverable = err.is_recoverable(),
            sim_time = self.clock.now(),
            "Process step failed, retiring process: {}",
            err
        );
        self.retired += 1;
        self.finish(id, process);
    }

    /// Let every live process observe the stop, in registration order
    fn stop_all(&mut self) {
        let now = self.clock.now();
        for index in 0..self.processes.len() {
            if let Some(process) = self.processes[index].as_mut() {
                self.ctx.set_step(now, ProcessId(index));
                process.on_stop(&mut self.ctx);
            }
        }
        // Nothing runs after the stop
        drop(self.ctx.take_pending());
    }
}
