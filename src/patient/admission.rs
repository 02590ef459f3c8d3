//! Admitted patient data and priority key derivation

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clinic::PriorityKey;
use crate::types::{DoctorId, ExamClass, PatientCategory, PatientId};

/// A patient as admitted by a generator
///
/// Everything here is fixed at admission: the priority key a patient uses
/// for all of its requests is derived from these fields and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Deterministic identity
    pub id: PatientId,
    /// Whether imaging and a second exam follow the first exam
    pub exam_class: ExamClass,
    /// Time the patient entered the system
    pub arrival_time: f64,
    /// Booked slot time, appointments only
    pub scheduled_time: Option<f64>,
}

impl Patient {
    /// A walk-in arriving at `arrival_time`
    pub fn walk_in(doctor: DoctorId, sequence: usize, exam_class: ExamClass, arrival_time: f64) -> Self {
        Self {
            id: PatientId::new(PatientCategory::WalkIn, doctor, sequence),
            exam_class,
            arrival_time,
            scheduled_time: None,
        }
    }

    /// An appointment booked for `scheduled_time` that showed up at `arrival_time`
    pub fn appointment(
        doctor: DoctorId,
        sequence: usize,
        exam_class: ExamClass,
        scheduled_time: f64,
        arrival_time: f64,
    ) -> Self {
        Self {
            id: PatientId::new(PatientCategory::Appointment, doctor, sequence),
            exam_class,
            arrival_time,
            scheduled_time: Some(scheduled_time),
        }
    }

    /// Assigned doctor
    pub fn doctor(&self) -> DoctorId {
        self.id.doctor
    }

    /// Arrival stream
    pub fn category(&self) -> PatientCategory {
        self.id.category
    }

    /// Priority key for every request this patient makes
    pub fn priority_key(&self) -> PriorityKey {
        match self.scheduled_time {
            Some(scheduled) => PriorityKey::appointment(scheduled),
            None => PriorityKey::walk_in(self.arrival_time),
        }
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let detail = match self.scheduled_time {
            Some(scheduled) => format!("Sched@{:.2}", scheduled),
            None => "Walk-in".to_string(),
        };
        write!(f, "{} ({} {}, {})", self.id, self.category(), self.exam_class, detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_follow_category() {
        let appt = Patient::appointment(DoctorId(0), 1, ExamClass::A, 30.0, 26.5);
        let walk_in = Patient::walk_in(DoctorId(0), 1, ExamClass::B, 35.0);

        assert_eq!(appt.priority_key(), PriorityKey::appointment(30.0));
        assert_eq!(walk_in.priority_key(), PriorityKey::walk_in(35.0));
        assert!(appt.priority_key() < walk_in.priority_key());
    }

    #[test]
    fn test_late_appointment_keeps_slot_priority() {
        let late = Patient::appointment(DoctorId(2), 4, ExamClass::B, 100.0, 110.0);
        assert_eq!(late.priority_key().value, 100.0);
    }

    #[test]
    fn test_display() {
        let appt = Patient::appointment(DoctorId(1), 3, ExamClass::A, 42.0, 40.0);
        assert_eq!(appt.to_string(), "Patient-AP-2-3 (Appointment Type-A, Sched@42.00)");
    }
}
