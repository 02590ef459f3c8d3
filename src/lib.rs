//! Clinic Flow Simulator
//!
//! A discrete-event simulation of one working day of an outpatient clinic:
//! appointment and walk-in patients queue for doctors, some are referred to
//! shared imaging rooms and return for a second exam, doctors observe a lunch
//! window, and the day ends once the clinic has drained after the
//! appointment horizon.
//!
//! # Overview
//!
//! The simulator is single-threaded and fully reproducible for a fixed seed.
//! All randomness flows from one seeded RNG in a fixed draw order.
//!
//! ## Key Features
//!
//! - **Two-part priorities**: every appointment outranks every walk-in;
//!   within a class, earlier slot or arrival wins
//! - **Exclusive resources**: capacity-one doctors and imaging rooms, never
//!   preempted
//! - **Lunch and afternoon effects**: lunch holds, afternoon exam speedup,
//!   pre-lunch imaging penalty
//! - **Pluggable doctor profiles**: stochastic laws behind a trait
//! - **Run report**: flow counters, reconciliation, queue series, per-patient
//!   records and a narrative log, as text tables or JSON
//!
//! ## Quick Start
//!
//! ```rust
//! use clinic_flow_simulator::*;
//!
//! let config = SimulationConfig {
//!     seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let report = SimulationOrchestrator::new(config)?.run()?;
//! println!("{} patients completed", report.counters.total_departures());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: identifiers, enums and configuration
//! - [`clinic`]: doctor profiles, priority resources, schedules and lunch
//! - [`patient`]: patients, their lifecycle process and arrival generators
//! - [`simulation`]: engine, context, monitoring, termination and reporting
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Types     │    │   Clinic    │    │   Patient   │
//! │             │    │             │    │             │
//! │ Identifiers │◄───┤ Profiles    │◄───┤ Lifecycle   │
//! │ Enums       │    │ Resources   │    │ Generators  │
//! │ Config      │    │ Lunch       │    │ Records     │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!        ▲                  ▲                  ▲
//!        │                  │                  │
//!        │           ┌─────────────┐           │
//!        └───────────┤ Simulation  ├───────────┘
//!                    │             │
//!                    │ Clock       │
//!                    │ Context     │
//!                    │ Orchestrator│
//!                    │ Report      │
//!                    └─────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod clinic;
pub mod patient;
pub mod simulation;
pub mod types;

// Core types and identifiers
pub use types::{
    ConfigValidationError,
    // Identifiers
    DoctorId,
    // Enums
    ExamClass,
    ExamRound,
    ImagingRoomId,
    LogFormat,
    PatientCategory,
    PatientId,
    PatientPhase,
    ReportFormat,
    ResourceId,
    RunId,
    // Configuration
    SimulationConfig,
};

// Clinic resources and profiles
pub use clinic::{
    DoctorProfile, DoctorProfileConfig, GammaLaw, ParametricDoctorProfile, PriorityKey,
    PriorityResource, ResourceRegistry, Schedule,
};

// Patients and generators
pub use patient::{Patient, PatientProcess, PatientRecord, RoleAssignments, ServiceRecord};

// Simulation engine and reporting
pub use simulation::{
    ClinicCounters, Process, ProcessId, RunReport, SimContext, SimulationError,
    SimulationOrchestrator, SimulationResult, Yield,
};
