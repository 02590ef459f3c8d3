//! Lunch window handling
//!
//! Each doctor carries an on-lunch flag raised at the window start and
//! cleared at its end. The flag never interrupts an exam in progress; it only
//! holds back patients who reach a doctor queue while it is raised.

use serde::{Deserialize, Serialize};

use crate::simulation::{Process, SimContext, SimulationResult, Yield};
use crate::types::DoctorId;

/// Per-doctor lunch flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunchBoard {
    on_lunch: Vec<bool>,
}

impl LunchBoard {
    /// All doctors start off lunch
    pub fn new(doctor_count: usize) -> Self {
        Self { on_lunch: vec![false; doctor_count] }
    }

    /// Whether the doctor's lunch flag is raised
    pub fn is_on_lunch(&self, doctor: DoctorId) -> bool {
        self.on_lunch.get(doctor.index()).copied().unwrap_or(false)
    }

    /// Raise or clear a doctor's flag
    pub fn set(&mut self, doctor: DoctorId, on_lunch: bool) {
        if let Some(flag) = self.on_lunch.get_mut(doctor.index()) {
            *flag = on_lunch;
        }
    }

    /// How long a patient must wait before queueing for `doctor`, if at all
    ///
    /// A hold applies only while the flag is raised, `now` lies inside
    /// `[start, end)` and the patient arrived before `end`.
    pub fn hold_for(&self, doctor: DoctorId, now: f64, arrival: f64, window: (f64, f64)) -> Option<f64> {
        let (start, end) = window;
        if !self.is_on_lunch(doctor) || now < start || now >= end || arrival >= end {
            return None;
        }
        let remaining = end - now;
        (remaining > 0.0).then_some(remaining)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LunchStage {
    Idle,
    AwaitingStart,
    AwaitingEnd,
}

/// Raises a doctor's lunch flag at the window start and clears it at the end
#[derive(Debug)]
pub struct LunchCoordinator {
    doctor: DoctorId,
    stage: LunchStage,
}

impl LunchCoordinator {
    /// Coordinator for one doctor
    pub fn new(doctor: DoctorId) -> Self {
        Self { doctor, stage: LunchStage::Idle }
    }
}

impl Process for LunchCoordinator {
    fn name(&self) -> String {
        format!("lunch-{}", self.doctor.number())
    }

    fn resume(&mut self, ctx: &mut SimContext) -> SimulationResult<Yield> {
        let (start, end) = ctx.config().lunch_window();
        match self.stage {
            LunchStage::Idle => {
                self.stage = LunchStage::AwaitingStart;
                Ok(Yield::Wait((start - ctx.now()).max(0.0)))
            }
            LunchStage::AwaitingStart => {
                ctx.lunch_mut().set(self.doctor, true);
                ctx.narrate(format!(
                    "--- {:.2} - {} LUNCH BREAK PERIOD STARTED (will finish current patient) ---",
                    ctx.now(),
                    self.doctor
                ));
                self.stage = LunchStage::AwaitingEnd;
                Ok(Yield::Wait((end - ctx.now()).max(0.0)))
            }
            LunchStage::AwaitingEnd => {
                ctx.lunch_mut().set(self.doctor, false);
                ctx.narrate(format!(
                    "--- {:.2} - {} LUNCH BREAK PERIOD ENDED (back to service) ---",
                    ctx.now(),
                    self.doctor
                ));
                Ok(Yield::Done)
            }
        }
    }
}
