//! Patient lifecycle process
//!
//! A patient walks through: optional lunch hold, first exam, and for class A
//! an imaging session, another optional lunch hold and a second exam, then
//! departs. Every request uses the same priority key. The engine suspends
//! the process between phases; each call to `resume` handles exactly one
//! wake-up.

use crate::clinic::PriorityKey;
use crate::patient::{Patient, PatientRecord, ServiceRecord};
use crate::simulation::{Process, SimContext, SimulationResult, Yield};
use crate::types::{ExamRound, ImagingRoomId, PatientPhase, ResourceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Arrived,
    LunchHold(ExamRound),
    AwaitingDoctor(ExamRound),
    InExam(ExamRound),
    AwaitingImaging(ImagingRoomId),
    InImaging(ImagingRoomId),
    Departed,
}

/// State machine for one patient
#[derive(Debug)]
pub struct PatientProcess {
    patient: Patient,
    key: PriorityKey,
    stage: Stage,
    record: PatientRecord,
}

impl PatientProcess {
    /// Process for an admitted patient
    pub fn new(patient: Patient) -> Self {
        Self {
            key: patient.priority_key(),
            stage: Stage::Arrived,
            record: PatientRecord::new(patient),
            patient,
        }
    }

    /// Record collected so far
    pub fn record(&self) -> &PatientRecord {
        &self.record
    }

    fn doctor_resource(&self) -> ResourceId {
        ResourceId::Doctor(self.patient.doctor())
    }

    fn exam_slot(&mut self, round: ExamRound) -> &mut Option<ServiceRecord> {
        match round {
            ExamRound::First => &mut self.record.first_exam,
            ExamRound::Second => &mut self.record.second_exam,
        }
    }

    /// Hold for lunch if needed, otherwise join the doctor's queue
    fn approach_doctor(&mut self, ctx: &mut SimContext, round: ExamRound) -> SimulationResult<Yield> {
        self.record.phase = match round {
            ExamRound::First => PatientPhase::WaitingFirstExam,
            ExamRound::Second => PatientPhase::WaitingSecondExam,
        };

        let window = ctx.config().lunch_window();
        let hold = ctx
            .lunch()
            .hold_for(self.patient.doctor(), ctx.now(), self.patient.arrival_time, window);

        if let Some(remaining) = hold {
            ctx.narrate(format!(
                "{:.2} - {} waiting until lunch ends ({:.2}) for {} (before {} exam). Remaining: {:.2} min.",
                ctx.now(),
                self.patient.id,
                window.1,
                self.patient.doctor(),
                round,
                remaining
            ));
            ctx.counters_mut().record_lunch_hold();
            self.record.lunch_hold += remaining;
            self.stage = Stage::LunchHold(round);
            return Ok(Yield::Wait(remaining));
        }

        Ok(self.request_doctor(ctx, round))
    }

    fn request_doctor(&mut self, ctx: &mut SimContext, round: ExamRound) -> Yield {
        let doctor = self.patient.doctor();
        let queue = ctx.resources().doctor_queue_lengths().get(doctor.index()).copied().unwrap_or(0);
        let label = match round {
            ExamRound::First => String::new(),
            ExamRound::Second => " for 2nd exam".to_string(),
        };
        ctx.narrate(format!(
            "{:.2} - {} requests {}{} (Prio: {:.2}). Queue: {}",
            ctx.now(),
            self.patient.id,
            doctor,
            label,
            self.key.legacy_scalar(ctx.config().walkin_priority_offset()),
            queue
        ));

        *self.exam_slot(round) = Some(ServiceRecord::requested(ctx.now()));
        self.stage = Stage::AwaitingDoctor(round);
        Yield::Request(self.doctor_resource(), self.key)
    }

    fn start_exam(&mut self, ctx: &mut SimContext, round: ExamRound) -> SimulationResult<Yield> {
        let doctor = self.patient.doctor();
        let class = self.patient.exam_class;
        let base = match round {
            ExamRound::First => ctx.draw(doctor, |profile, rng| profile.first_exam(class, rng))?,
            ExamRound::Second => ctx.draw(doctor, |profile, rng| profile.second_exam(rng))?,
        };

        let now = ctx.now();
        let sped_up = now >= ctx.config().lunch_end;
        let duration = if sped_up { base * ctx.config().afternoon_speedup_factor } else { base };

        let slot = self.exam_slot(round);
        let service = slot.get_or_insert_with(|| ServiceRecord::requested(now));
        service.started_at = Some(now);
        service.base_duration = Some(base);
        service.duration = Some(duration);
        let wait = now - service.requested_at;

        self.record.phase = match round {
            ExamRound::First => PatientPhase::FirstExam,
            ExamRound::Second => PatientPhase::SecondExam,
        };
        ctx.narrate(format!(
            "{:.2} - {} {} EXAM STARTED with {}. Wait: {:.2} min. Duration: {:.2} min{}",
            now,
            self.patient.id,
            round,
            doctor,
            wait,
            duration,
            if sped_up { " [Sped up]" } else { "" }
        ));

        self.stage = Stage::InExam(round);
        Ok(Yield::Wait(duration))
    }

    fn finish_exam(&mut self, ctx: &mut SimContext, round: ExamRound) -> SimulationResult<Yield> {
        let doctor = self.patient.doctor();
        ctx.release(self.doctor_resource())?;

        let now = ctx.now();
        if let Some(service) = self.exam_slot(round) {
            service.ended_at = Some(now);
        }
        match round {
            ExamRound::First => ctx.counters_mut().record_first_exam(doctor),
            ExamRound::Second => ctx.counters_mut().record_second_exam(doctor),
        }
        ctx.narrate(format!("{:.2} - {} {} EXAM ENDED with {}.", now, self.patient.id, round, doctor));

        match round {
            ExamRound::First if self.patient.exam_class.requires_imaging() => self.request_imaging(ctx),
            _ => Ok(self.depart(ctx)),
        }
    }

    fn request_imaging(&mut self, ctx: &mut SimContext) -> SimulationResult<Yield> {
        self.record.phase = PatientPhase::ImagingWait;
        let room = ctx.choose_imaging_room()?;
        let queue = ctx.resources().imaging_queue_lengths().get(room.index()).copied().unwrap_or(0);
        ctx.narrate(format!(
            "{:.2} - {} requests {}. Room queue: {}",
            ctx.now(),
            self.patient.id,
            room,
            queue
        ));

        self.record.imaging_room = Some(room);
        self.record.imaging = Some(ServiceRecord::requested(ctx.now()));
        self.stage = Stage::AwaitingImaging(room);
        Ok(Yield::Request(ResourceId::Imaging(room), self.key))
    }

    fn start_imaging(&mut self, ctx: &mut SimContext, room: ImagingRoomId) -> Yield {
        let base = ctx.draw_imaging_duration();
        let now = ctx.now();
        let penalised = now < ctx.config().lunch_end;
        let duration = if penalised { base * ctx.config().imaging_pre_lunch_penalty } else { base };

        let service = self.record.imaging.get_or_insert_with(|| ServiceRecord::requested(now));
        service.started_at = Some(now);
        service.base_duration = Some(base);
        service.duration = Some(duration);
        let wait = now - service.requested_at;

        self.record.phase = PatientPhase::Imaging;
        ctx.narrate(format!(
            "{:.2} - {} imaging STARTED in {}. Wait: {:.2} min. Duration: {:.2} min{}",
            now,
            self.patient.id,
            room,
            wait,
            duration,
            if penalised { " [Pre-lunch]" } else { "" }
        ));

        self.stage = Stage::InImaging(room);
        Yield::Wait(duration)
    }

    fn finish_imaging(&mut self, ctx: &mut SimContext, room: ImagingRoomId) -> SimulationResult<Yield> {
        ctx.release(ResourceId::Imaging(room))?;

        let now = ctx.now();
        if let Some(service) = self.record.imaging.as_mut() {
            service.ended_at = Some(now);
        }
        ctx.counters_mut().record_imaging();
        ctx.narrate(format!("{:.2} - {} imaging ENDED in {}.", now, self.patient.id, room));

        self.approach_doctor(ctx, ExamRound::Second)
    }

    fn depart(&mut self, ctx: &mut SimContext) -> Yield {
        let now = ctx.now();
        ctx.counters_mut().record_departure(self.patient.category());
        self.record.departed_at = Some(now);
        self.record.phase = PatientPhase::Departed;
        ctx.narrate(format!(
            "{:.2} - {} DEPARTED. Time in system: {:.2} min.",
            now,
            self.patient.id,
            now - self.patient.arrival_time
        ));

        self.stage = Stage::Departed;
        Yield::Done
    }
}

impl Process for PatientProcess {
    fn name(&self) -> String {
        self.patient.id.to_string()
    }

    fn resume(&mut self, ctx: &mut SimContext) -> SimulationResult<Yield> {
        match self.stage {
            Stage::Arrived => {
                ctx.narrate(format!(
                    "{:.2} - {} ARRIVED for {}.",
                    self.patient.arrival_time,
                    self.patient,
                    self.patient.doctor()
                ));
                self.approach_doctor(ctx, ExamRound::First)
            }
            Stage::LunchHold(round) => {
                ctx.narrate(format!(
                    "{:.2} - {} continues after lunch for {} ({} exam).",
                    ctx.now(),
                    self.patient.id,
                    self.patient.doctor(),
                    round
                ));
                Ok(self.request_doctor(ctx, round))
            }
            Stage::AwaitingDoctor(round) => self.start_exam(ctx, round),
            Stage::InExam(round) => self.finish_exam(ctx, round),
            Stage::AwaitingImaging(room) => Ok(self.start_imaging(ctx, room)),
            Stage::InImaging(room) => self.finish_imaging(ctx, room),
            Stage::Departed => Ok(Yield::Done),
        }
    }

    fn on_exit(&mut self, ctx: &mut SimContext) {
        if !ctx.counters_mut().leave_system() {
            ctx.narrate_warning(format!(
                "!!!! ERROR !!!! Patient counter dropped below zero at {:.2} for {}!",
                ctx.now(),
                self.patient.id
            ));
        }
        ctx.record_patient(self.record.clone());
    }

    fn on_stop(&mut self, ctx: &mut SimContext) {
        ctx.record_patient(self.record.clone());
    }
}
