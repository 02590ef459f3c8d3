//! Arrival generators and doctor role resolution
//!
//! Each doctor gets up to two generators: a walk-in stream with exponential
//! gaps that stops at the walk-in cutoff, and an appointment stream that
//! replays the doctor's pre-built schedule with a uniform punctuality
//! deviation per slot.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::admission::Patient;
use super::process::PatientProcess;
use crate::clinic::Schedule;
use crate::simulation::{Process, SimContext, SimulationResult, Yield};
use crate::types::{DoctorId, ExamClass, PatientCategory, SimulationConfig};

/// Which doctors see only one arrival stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignments {
    /// Doctor with no walk-in stream
    pub appointment_only: Option<DoctorId>,
    /// Doctor with no appointment stream
    pub walkin_only: Option<DoctorId>,
}

impl RoleAssignments {
    /// Resolve configured roles, disabling any that name a missing doctor
    pub fn resolve(config: &SimulationConfig) -> Self {
        let check = |role: &str, value: Option<usize>| -> Option<DoctorId> {
            let index = value?;
            if index < config.doctor_count {
                info!(role, doctor = index + 1, "Special role assigned");
                Some(DoctorId(index))
            } else {
                warn!(
                    role,
                    doctor_id = index,
                    doctor_count = config.doctor_count,
                    "Role names a doctor that does not exist; disabling it"
                );
                None
            }
        };

        let roles = Self {
            appointment_only: check("appointment-only", config.appointment_only_doctor),
            walkin_only: check("walk-in-only", config.walkin_only_doctor),
        };

        if let (Some(a), Some(w)) = (roles.appointment_only, roles.walkin_only) {
            if a == w {
                warn!(
                    doctor = a.number(),
                    "Appointment-only and walk-in-only roles name the same doctor; it will see no patients"
                );
            }
        }
        roles
    }

    /// Whether `doctor` gets a walk-in generator
    pub fn runs_walk_ins(&self, doctor: DoctorId) -> bool {
        self.appointment_only != Some(doctor)
    }

    /// Whether `doctor` gets an appointment schedule and generator
    pub fn runs_appointments(&self, doctor: DoctorId) -> bool {
        self.walkin_only != Some(doctor)
    }
}

/// Count the arrival and draw the patient's exam class
fn admit(ctx: &mut SimContext, doctor: DoctorId, category: PatientCategory) -> SimulationResult<ExamClass> {
    ctx.counters_mut().record_arrival(category);
    ctx.draw(doctor, |profile, rng| profile.sample_exam_class(rng))
}

/// Walk-in arrival stream of one doctor
#[derive(Debug)]
pub struct WalkInGenerator {
    doctor: DoctorId,
    admitted: usize,
    awaiting_arrival: bool,
}

impl WalkInGenerator {
    /// Generator for `doctor`
    pub fn new(doctor: DoctorId) -> Self {
        Self { doctor, admitted: 0, awaiting_arrival: false }
    }

    fn next_gap(&mut self, ctx: &mut SimContext) -> SimulationResult<Yield> {
        let gap = ctx.draw(self.doctor, |profile, rng| profile.interarrival(rng))?;
        let cutoff = ctx.config().walkin_cutoff();
        let next_arrival = ctx.now() + gap;

        if next_arrival >= cutoff {
            ctx.narrate(format!(
                "{:.2} - {} walk-in generator STOPPING. Next arrival ({:.2}) would exceed cutoff ({:.2}).",
                ctx.now(),
                self.doctor,
                next_arrival,
                cutoff
            ));
            return Ok(Yield::Done);
        }

        self.awaiting_arrival = true;
        Ok(Yield::Wait(gap.max(0.0)))
    }
}

impl Process for WalkInGenerator {
    fn name(&self) -> String {
        format!("walk-ins-{}", self.doctor.number())
    }

    fn resume(&mut self, ctx: &mut SimContext) -> SimulationResult<Yield> {
        if self.awaiting_arrival {
            self.awaiting_arrival = false;
            let now = ctx.now();
            if now >= ctx.config().walkin_cutoff() {
                return Ok(Yield::Done);
            }

            self.admitted += 1;
            let exam_class = admit(ctx, self.doctor, PatientCategory::WalkIn)?;
            let patient = Patient::walk_in(self.doctor, self.admitted, exam_class, now);
            ctx.spawn(Box::new(PatientProcess::new(patient)));
        }

        self.next_gap(ctx)
    }
}

/// Appointment arrival stream of one doctor
#[derive(Debug)]
pub struct AppointmentGenerator {
    doctor: DoctorId,
    slots: Vec<f64>,
    next_slot: usize,
    in_flight: Option<usize>,
}

impl AppointmentGenerator {
    /// Generator replaying `schedule`
    pub fn new(schedule: Schedule) -> Self {
        Self { doctor: schedule.doctor, slots: schedule.slots, next_slot: 0, in_flight: None }
    }

    fn arrive(&mut self, ctx: &mut SimContext, slot: usize) -> SimulationResult<()> {
        let now = ctx.now();
        let scheduled = self.slots[slot];
        if now >= ctx.config().horizon {
            debug!(doctor = self.doctor.number(), scheduled, now, "Appointment arrives after horizon; skipped");
            return Ok(());
        }

        let exam_class = admit(ctx, self.doctor, PatientCategory::Appointment)?;
        let patient = Patient::appointment(self.doctor, slot + 1, exam_class, scheduled, now);
        ctx.spawn(Box::new(PatientProcess::new(patient)));
        Ok(())
    }
}

impl Process for AppointmentGenerator {
    fn name(&self) -> String {
        format!("appointments-{}", self.doctor.number())
    }

    fn resume(&mut self, ctx: &mut SimContext) -> SimulationResult<Yield> {
        if let Some(slot) = self.in_flight.take() {
            self.arrive(ctx, slot)?;
        }

        let (min_dev, max_dev) = ctx.config().punctuality_bounds();
        while self.next_slot < self.slots.len() {
            let slot = self.next_slot;
            self.next_slot += 1;

            let deviation = ctx.rng().gen_range(min_dev..=max_dev);
            let actual = (self.slots[slot] + deviation).max(0.0);
            let delay = actual - ctx.now();
            if delay > 0.0 {
                self.in_flight = Some(slot);
                return Ok(Yield::Wait(delay));
            }
            self.arrive(ctx, slot)?;
        }

        Ok(Yield::Done)
    }
}
