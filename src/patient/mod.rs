//! Patients and their arrival streams
//!
//! This module contains the admitted-patient data, the patient lifecycle
//! process, per-patient records and the walk-in and appointment generators.

pub mod admission;
pub mod generator;
pub mod process;
pub mod record;

pub use admission::Patient;
pub use generator::{AppointmentGenerator, RoleAssignments, WalkInGenerator};
pub use process::PatientProcess;
pub use record::{PatientRecord, ServiceRecord};
