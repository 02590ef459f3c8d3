//! Hand-checkable clinic days driven by fixed-duration doctor profiles
//!
//! A deterministic `DoctorProfile` removes every stochastic duration, so the
//! exact timing of arrivals, lunch holds and exams can be asserted.

use clinic_flow_simulator::clinic::{DoctorProfile, DoctorProfileConfig, GammaLaw};
use clinic_flow_simulator::patient::PatientRecord;
use clinic_flow_simulator::simulation::{RunReport, SimulationOrchestrator};
use clinic_flow_simulator::types::{ExamClass, PatientCategory, PatientPhase, SimulationConfig};
use rand::RngCore;

const TOLERANCE: f64 = 1e-9;

/// Doctor whose every duration and gap is a constant
#[derive(Debug, Clone, Copy)]
struct FixedProfile {
    walk_in_gap: f64,
    exam: f64,
    second_exam: f64,
    appointment_interval: f64,
    imaging_probability: f64,
}

impl FixedProfile {
    fn new() -> Self {
        Self {
            walk_in_gap: 1_000.0,
            exam: 7.0,
            second_exam: 5.0,
            appointment_interval: 50.0,
            imaging_probability: 0.0,
        }
    }
}

impl DoctorProfile for FixedProfile {
    fn interarrival(&self, _rng: &mut dyn RngCore) -> f64 {
        self.walk_in_gap
    }

    fn first_exam(&self, _class: ExamClass, _rng: &mut dyn RngCore) -> f64 {
        self.exam
    }

    fn second_exam(&self, _rng: &mut dyn RngCore) -> f64 {
        self.second_exam
    }

    fn appointment_interval(&self, _rng: &mut dyn RngCore) -> f64 {
        self.appointment_interval
    }

    fn imaging_probability(&self) -> f64 {
        self.imaging_probability
    }
}

/// One-doctor clinic on a short day
fn single_doctor_config(horizon: f64, lunch: (f64, f64)) -> SimulationConfig {
    let mut doctor = DoctorProfileConfig::clinic_defaults().remove(0);
    doctor.imaging_probability = 0.0;

    SimulationConfig {
        horizon,
        lunch_start: lunch.0,
        lunch_end: lunch.1,
        walkin_cutoff_margin: 10.0,
        imaging_room_count: 1,
        punctuality_min_deviation: -5.0,
        punctuality_max_deviation: 10.0,
        seed: Some(17),
        appointment_only_doctor: None,
        walkin_only_doctor: None,
        ..Default::default()
    }
    .with_doctors(vec![doctor])
}

fn run(config: SimulationConfig, profile: FixedProfile) -> RunReport {
    SimulationOrchestrator::with_profiles(config, vec![Box::new(profile)])
        .unwrap()
        .run()
        .unwrap()
}

fn record_arriving_at(report: &RunReport, arrival: f64) -> &PatientRecord {
    report
        .records
        .iter()
        .find(|record| (record.patient.arrival_time - arrival).abs() < TOLERANCE)
        .unwrap_or_else(|| panic!("no patient arrived at {}", arrival))
}

#[test]
fn test_single_appointment_day() {
    let config = SimulationConfig {
        appointment_only_doctor: Some(0),
        ..single_doctor_config(100.0, (80.0, 90.0))
    };
    let report = run(config, FixedProfile::new());

    // Slots every 50 minutes below a 100 minute horizon: only t=50
    assert_eq!(report.schedules, vec![1]);
    assert_eq!(report.counters.walkin_arrivals, 0);
    assert_eq!(report.counters.appointment_arrivals, 1);
    assert_eq!(report.counters.appointment_departures, 1);
    assert_eq!(report.counters.in_system, 0);
    assert!(report.reconciliation.consistent);

    let record = &report.records[0];
    let patient = record.patient;
    assert_eq!(patient.category(), PatientCategory::Appointment);
    assert_eq!(patient.exam_class, ExamClass::B);
    assert_eq!(patient.scheduled_time, Some(50.0));
    assert!(patient.arrival_time >= 45.0 && patient.arrival_time <= 60.0);

    // Idle doctor: no wait, then a plain seven minute exam
    let exam = record.first_exam.unwrap();
    assert_eq!(exam.wait(), Some(0.0));
    assert_eq!(exam.duration, Some(7.0));
    assert!(!exam.adjusted());
    assert!(record.imaging.is_none());
    assert!(record.second_exam.is_none());
    assert_eq!(record.phase, PatientPhase::Departed);
    assert!((record.departed_at.unwrap() - (patient.arrival_time + 7.0)).abs() < TOLERANCE);

    assert!(!report.forced_stop);
    assert!(report.final_time >= 100.0);
}

#[test]
fn test_lunch_holds_walk_ins_until_lunch_end() {
    let config = SimulationConfig {
        walkin_only_doctor: Some(0),
        walkin_cutoff_margin: 50.0,
        ..single_doctor_config(200.0, (50.0, 100.0))
    };
    let profile = FixedProfile { walk_in_gap: 20.0, exam: 5.0, ..FixedProfile::new() };
    let report = run(config.clone(), profile);

    // Arrivals every 20 minutes; the one due at 160 would cross the 150 cutoff
    assert_eq!(report.counters.walkin_arrivals, 7);
    assert_eq!(report.counters.lunch_holds, 2);

    let morning = record_arriving_at(&report, 20.0);
    assert_eq!(morning.lunch_hold, 0.0);
    assert_eq!(morning.first_exam.unwrap().started_at, Some(20.0));
    assert_eq!(morning.first_exam.unwrap().duration, Some(5.0));

    let sped_up = 5.0 * config.afternoon_speedup_factor;

    // Arrived during lunch: held until 100, first in line, exam sped up
    let held_long = record_arriving_at(&report, 60.0);
    assert!((held_long.lunch_hold - 40.0).abs() < TOLERANCE);
    let exam = held_long.first_exam.unwrap();
    assert!((exam.started_at.unwrap() - 100.0).abs() < TOLERANCE);
    assert_eq!(exam.base_duration, Some(5.0));
    assert!((exam.duration.unwrap() - sped_up).abs() < TOLERANCE);

    // Held too, then queued behind the earlier walk-in
    let held_short = record_arriving_at(&report, 80.0);
    assert!((held_short.lunch_hold - 20.0).abs() < TOLERANCE);
    let exam = held_short.first_exam.unwrap();
    assert!((exam.started_at.unwrap() - (100.0 + sped_up)).abs() < 1e-6);

    // Arrived exactly at lunch end: no hold, but ranked after both
    let after_lunch = record_arriving_at(&report, 100.0);
    assert_eq!(after_lunch.lunch_hold, 0.0);
    let exam = after_lunch.first_exam.unwrap();
    assert!((exam.started_at.unwrap() - (100.0 + 2.0 * sped_up)).abs() < 1e-6);

    assert_eq!(report.counters.walkin_departures, 7);
    assert!(report.reconciliation.consistent);
}

#[test]
fn test_imaging_round_trip_with_fixed_durations() {
    let mut config = SimulationConfig {
        appointment_only_doctor: Some(0),
        ..single_doctor_config(100.0, (10.0, 20.0))
    };
    config.doctors[0].imaging_probability = 1.0;
    let profile = FixedProfile { imaging_probability: 1.0, ..FixedProfile::new() };
    let report = run(config.clone(), profile);

    assert_eq!(report.counters.imaging_completions, 1);
    assert_eq!(report.counters.first_exams, vec![1]);
    assert_eq!(report.counters.second_exams, vec![1]);

    let record = &report.records[0];
    assert_eq!(record.patient.exam_class, ExamClass::A);
    assert!(record.imaging_room.is_some());

    // After lunch: imaging unpenalised, both exams sped up
    let first = record.first_exam.unwrap();
    let imaging = record.imaging.unwrap();
    let second = record.second_exam.unwrap();
    assert_eq!(imaging.duration, imaging.base_duration);
    assert!((first.duration.unwrap() - 7.0 * config.afternoon_speedup_factor).abs() < TOLERANCE);
    assert!((second.duration.unwrap() - 5.0 * config.afternoon_speedup_factor).abs() < TOLERANCE);
    assert!(imaging.started_at.unwrap() >= first.ended_at.unwrap());
    assert!(second.started_at.unwrap() >= imaging.ended_at.unwrap());
    assert_eq!(record.departed_at, second.ended_at);
    assert_eq!(report.doctor_summaries()[0].referral_rate, 100.0);
}

#[test]
fn test_morning_imaging_is_penalised() {
    let mut config = SimulationConfig {
        appointment_only_doctor: Some(0),
        ..single_doctor_config(100.0, (80.0, 90.0))
    };
    config.doctors[0].imaging_probability = 1.0;
    // Draws far below the floor, so every session lasts exactly four minutes
    config.imaging_duration = GammaLaw::new(1.0, 0.001, 4.0);
    let profile = FixedProfile { imaging_probability: 1.0, ..FixedProfile::new() };
    let report = run(config.clone(), profile);

    assert_eq!(report.counters.imaging_completions, 1);
    let record = &report.records[0];
    let arrival = record.patient.arrival_time;

    // Arrival is at most 60, so the whole visit ends before lunch starts at 80
    let first = record.first_exam.unwrap();
    assert_eq!(first.duration, Some(7.0));
    assert!((first.ended_at.unwrap() - (arrival + 7.0)).abs() < TOLERANCE);

    let imaging = record.imaging.unwrap();
    let start = imaging.started_at.unwrap();
    assert!((start - (arrival + 7.0)).abs() < TOLERANCE);
    assert!(start < config.lunch_end);
    assert_eq!(imaging.base_duration, Some(4.0));
    assert!((imaging.duration.unwrap() - 4.0 * config.imaging_pre_lunch_penalty).abs() < TOLERANCE);
    assert!((imaging.ended_at.unwrap() - (arrival + 7.0 + 5.0)).abs() < TOLERANCE);

    // Second exam follows straight on, before lunch, at the plain rate
    let second = record.second_exam.unwrap();
    assert!((second.started_at.unwrap() - (arrival + 12.0)).abs() < TOLERANCE);
    assert_eq!(second.duration, Some(5.0));
    assert!((record.departed_at.unwrap() - (arrival + 17.0)).abs() < TOLERANCE);
    assert_eq!(record.lunch_hold, 0.0);
}

#[test]
fn test_hard_timeout_forces_stop() {
    let config = SimulationConfig {
        appointment_only_doctor: Some(0),
        ..single_doctor_config(100.0, (80.0, 90.0))
    };
    // One exam far longer than four horizons
    let profile = FixedProfile { exam: 10_000.0, ..FixedProfile::new() };
    let report = run(config.clone(), profile);

    assert!(report.forced_stop);
    assert_eq!(report.stop_reason.as_deref(), Some("hard timeout exceeded"));
    assert!(report.final_time > config.hard_timeout_at());
    assert!(report.final_time < config.hard_timeout_at() + 2.0 * config.drain_check_interval);
    assert_eq!(report.log.matching("LONG RUN WARNING").count(), 1);

    // The patient is still mid-exam and is reported as such
    assert_eq!(report.counters.in_system, 1);
    assert_eq!(report.counters.total_departures(), 0);
    assert!(report.reconciliation.consistent);
    let record = &report.records[0];
    assert_eq!(record.phase, PatientPhase::FirstExam);
    assert!(!record.is_complete());
}

#[test]
fn test_conflicting_roles_leave_the_doctor_idle() {
    let config = SimulationConfig {
        appointment_only_doctor: Some(0),
        walkin_only_doctor: Some(0),
        ..single_doctor_config(100.0, (80.0, 90.0))
    };
    let report = run(config, FixedProfile::new());

    assert_eq!(report.schedules, vec![0]);
    assert_eq!(report.counters.total_generated, 0);
    assert!(report.records.is_empty());
    assert!(!report.forced_stop);
    assert!(report.final_time >= 100.0);
}

#[test]
fn test_out_of_range_role_falls_back_to_dual_mode() {
    let config = SimulationConfig {
        appointment_only_doctor: Some(5),
        walkin_cutoff_margin: 50.0,
        ..single_doctor_config(200.0, (150.0, 160.0))
    };
    let profile = FixedProfile { walk_in_gap: 40.0, ..FixedProfile::new() };
    let report = run(config, profile);

    assert_eq!(report.roles.appointment_only, None);
    assert!(report.counters.appointment_arrivals > 0);
    assert!(report.counters.walkin_arrivals > 0);
    assert!(report.reconciliation.consistent);
}

#[test]
fn test_profile_count_must_match_doctors() {
    let config = single_doctor_config(100.0, (80.0, 90.0));
    let profiles: Vec<Box<dyn DoctorProfile>> = vec![Box::new(FixedProfile::new()), Box::new(FixedProfile::new())];
    assert!(SimulationOrchestrator::with_profiles(config, profiles).is_err());
}
