//! Appointment schedules
//!
//! Each doctor's slots are laid out once before the run starts by summing
//! sampled intervals from zero. Only slots strictly before the horizon are
//! kept.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::profile::DoctorProfile;
use crate::simulation::{SimulationError, SimulationResult};
use crate::types::DoctorId;

/// Scheduled appointment times of one doctor, strictly increasing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Doctor the slots belong to
    pub doctor: DoctorId,
    /// Slot times in minutes
    pub slots: Vec<f64>,
}

impl Schedule {
    /// Empty schedule, used for walk-in-only doctors
    pub fn empty(doctor: DoctorId) -> Self {
        Self { doctor, slots: Vec::new() }
    }

    /// Lay out slots until the next one would reach `horizon`
    pub fn build(
        doctor: DoctorId,
        profile: &dyn DoctorProfile,
        horizon: f64,
        rng: &mut dyn RngCore,
    ) -> SimulationResult<Self> {
        let mut slots = Vec::new();
        let mut current = 0.0;

        loop {
            let interval = profile.appointment_interval(rng);
            if !interval.is_finite() || interval <= 0.0 {
                return Err(SimulationError::profile_error(format!(
                    "{} drew a non-positive appointment interval ({})",
                    doctor, interval
                )));
            }

            let next = current + interval;
            if next >= horizon {
                break;
            }
            slots.push(next);
            current = next;
        }

        Ok(Self { doctor, slots })
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether there are no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Last slot, if any
    pub fn last(&self) -> Option<f64> {
        self.slots.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clinic::{DoctorProfileConfig, ParametricDoctorProfile, UniformLaw};
    use crate::types::ExamClass;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Debug)]
    struct FixedInterval(f64);

    impl DoctorProfile for FixedInterval {
        fn interarrival(&self, _rng: &mut dyn RngCore) -> f64 {
            1.0
        }
        fn first_exam(&self, _class: ExamClass, _rng: &mut dyn RngCore) -> f64 {
            1.0
        }
        fn second_exam(&self, _rng: &mut dyn RngCore) -> f64 {
            1.0
        }
        fn appointment_interval(&self, _rng: &mut dyn RngCore) -> f64 {
            self.0
        }
        fn imaging_probability(&self) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_fixed_interval_slots() {
        let mut rng = StdRng::seed_from_u64(0);
        let schedule = Schedule::build(DoctorId(0), &FixedInterval(50.0), 480.0, &mut rng).unwrap();

        assert_eq!(schedule.slots, vec![50.0, 100.0, 150.0, 200.0, 250.0, 300.0, 350.0, 400.0, 450.0]);
        assert_eq!(schedule.last(), Some(450.0));
    }

    #[test]
    fn test_slot_equal_to_horizon_is_dropped() {
        let mut rng = StdRng::seed_from_u64(0);
        let schedule = Schedule::build(DoctorId(0), &FixedInterval(60.0), 480.0, &mut rng).unwrap();

        assert_eq!(schedule.len(), 7);
        assert!(schedule.slots.iter().all(|t| *t < 480.0));
    }

    #[test]
    fn test_interval_beyond_horizon_gives_empty_schedule() {
        let mut rng = StdRng::seed_from_u64(0);
        let schedule = Schedule::build(DoctorId(3), &FixedInterval(500.0), 480.0, &mut rng).unwrap();
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_non_positive_interval_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            Schedule::build(DoctorId(0), &FixedInterval(0.0), 480.0, &mut rng),
            Err(SimulationError::ProfileError(_))
        ));
    }

    #[test]
    fn test_default_profile_slots_are_increasing() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut config = DoctorProfileConfig::clinic_defaults().remove(0);
        config.appointment_interval = UniformLaw::new(9.0, 15.0, 10.0);
        let profile = ParametricDoctorProfile::from_config(&config).unwrap();

        let schedule = Schedule::build(DoctorId(0), &profile, 480.0, &mut rng).unwrap();
        assert!(!schedule.is_empty());
        assert!(schedule.slots.windows(2).all(|w| w[1] - w[0] >= 10.0 - 1e-9));
        assert!(schedule.slots[0] >= 10.0);
    }
}
