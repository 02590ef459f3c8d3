//! Per-patient trace of waits and service times

use serde::{Deserialize, Serialize};

use super::admission::Patient;
use crate::types::{ImagingRoomId, PatientPhase};

/// Timing of one service (an exam or an imaging session)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// When the request was made
    pub requested_at: f64,
    /// When the slot was granted
    pub started_at: Option<f64>,
    /// Sampled duration before any adjustment
    pub base_duration: Option<f64>,
    /// Duration actually served
    pub duration: Option<f64>,
    /// When the service ended
    pub ended_at: Option<f64>,
}

impl ServiceRecord {
    /// A request made at `requested_at`
    pub fn requested(requested_at: f64) -> Self {
        Self { requested_at, started_at: None, base_duration: None, duration: None, ended_at: None }
    }

    /// Time spent waiting in the queue
    pub fn wait(&self) -> Option<f64> {
        self.started_at.map(|start| start - self.requested_at)
    }

    /// Whether an adjustment factor changed the duration
    pub fn adjusted(&self) -> bool {
        matches!((self.base_duration, self.duration), (Some(base), Some(actual)) if base != actual)
    }
}

/// Everything recorded about one patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Admission data
    pub patient: Patient,
    /// Last phase reached
    pub phase: PatientPhase,
    /// Minutes spent held back by lunch, across both exams
    pub lunch_hold: f64,
    /// First exam
    pub first_exam: Option<ServiceRecord>,
    /// Room chosen for imaging
    pub imaging_room: Option<ImagingRoomId>,
    /// Imaging session
    pub imaging: Option<ServiceRecord>,
    /// Second exam
    pub second_exam: Option<ServiceRecord>,
    /// Departure time, if the patient left before the run ended
    pub departed_at: Option<f64>,
}

impl PatientRecord {
    /// Fresh record for a just-admitted patient
    pub fn new(patient: Patient) -> Self {
        Self {
            patient,
            phase: PatientPhase::Arrived,
            lunch_hold: 0.0,
            first_exam: None,
            imaging_room: None,
            imaging: None,
            second_exam: None,
            departed_at: None,
        }
    }

    /// Arrival to departure
    pub fn time_in_system(&self) -> Option<f64> {
        self.departed_at.map(|t| t - self.patient.arrival_time)
    }

    /// Sum of all queue waits so far
    pub fn total_wait(&self) -> f64 {
        [self.first_exam, self.imaging, self.second_exam]
            .iter()
            .flatten()
            .filter_map(ServiceRecord::wait)
            .sum()
    }

    /// Whether the patient left the clinic
    pub fn is_complete(&self) -> bool {
        self.departed_at.is_some()
    }
}
