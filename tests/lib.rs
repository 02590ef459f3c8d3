// Integration tests test your crate's public API. They only have access to items
// in your crate that are marked pub. See the Cargo Targets page of the Cargo Book
// for more information.
//
//   https://doc.rust-lang.org/cargo/reference/cargo-targets.html#integration-tests
//

use clinic_flow_simulator::*;

mod priority_ordering_tests;
mod scenario_tests;

// Configuration, CLI and reporting surfaces
mod cli_argument_parsing_tests;
mod config_loading_tests;

#[test]
fn test_core_id_types() {
    let doctor = DoctorId(2);
    let room = ImagingRoomId(0);

    assert_eq!(doctor.number(), 3);
    assert_eq!(room.number(), 1);
    assert_eq!(ResourceId::Doctor(doctor), ResourceId::Doctor(DoctorId(2)));
    assert_ne!(ResourceId::Doctor(DoctorId(0)), ResourceId::Imaging(ImagingRoomId(0)));

    let walk_in = PatientId::new(PatientCategory::WalkIn, doctor, 4);
    let appointment = PatientId::new(PatientCategory::Appointment, doctor, 4);
    assert_eq!(walk_in.to_string(), "Patient-WI-3-4");
    assert_eq!(appointment.to_string(), "Patient-AP-3-4");

    // Run ids are unique and prefixed
    let run_id = RunId::new();
    assert_ne!(run_id, RunId::new());
    assert!(run_id.to_string().starts_with("RUN_"));
}

#[test]
fn test_serialization_roundtrip() {
    let run_id = RunId::new();
    let json = serde_json::to_string(&run_id).unwrap();
    assert!(json.contains("RUN_"));
    let deserialized: RunId = serde_json::from_str(&json).unwrap();
    assert_eq!(run_id, deserialized);

    let patient = Patient::appointment(DoctorId(1), 3, ExamClass::A, 42.0, 39.5);
    let json = serde_json::to_string(&patient).unwrap();
    let deserialized: Patient = serde_json::from_str(&json).unwrap();
    assert_eq!(patient, deserialized);
}

#[test]
fn test_default_configuration_is_valid() {
    let config = SimulationConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.doctor_count, 7);
    assert_eq!(config.doctors.len(), 7);
    assert_eq!(config.walkin_cutoff(), 420.0);
    assert_eq!(config.hard_timeout_at(), 1920.0);
}
