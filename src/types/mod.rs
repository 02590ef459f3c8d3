//! Core types and identifiers for the clinic flow simulator
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the simulation system.
//!
//! # Overview
//!
//! - **Identifiers**: typed indices for doctors and imaging rooms, deterministic
//!   patient identities and UUID run ids
//! - **Enums**: patient categories, exam classes and lifecycle phases
//! - **Configuration**: simulation configuration with validation and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use clinic_flow_simulator::types::*;
//!
//! let doctor = DoctorId(0);
//! let patient = PatientId::new(PatientCategory::WalkIn, doctor, 1);
//! assert_eq!(patient.to_string(), "Patient-WI-1-1");
//!
//! let config = SimulationConfig {
//!     imaging_room_count: 3,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
