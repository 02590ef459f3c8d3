//! Simulation engine and run control
//!
//! This module contains the discrete-event engine, the process abstraction,
//! the shared context, the queue monitor, the drain detector, statistics
//! collection, error handling and logging setup.
//!
//! # Overview
//!
//! - **SimClock**: min-heap of pending resumptions, FIFO within an instant
//! - **Process**: cooperative state machine resumed one step at a time
//! - **SimContext**: world state shared by all processes
//! - **SimulationOrchestrator**: builds the clinic and drives the event loop
//! - **RunReport**: counters, queue series, patient records and narrative
//!
//! # Usage Example
//!
//! ```rust
//! use clinic_flow_simulator::simulation::*;
//! use clinic_flow_simulator::types::*;
//!
//! let config = SimulationConfig {
//!     seed: Some(7),
//!     record_event_log: false,
//!     ..Default::default()
//! };
//!
//! let report = SimulationOrchestrator::new(config).unwrap().run().unwrap();
//! assert!(report.final_time >= 480.0);
//! assert!(report.reconciliation.consistent);
//! ```

pub mod clock;
pub mod context;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod orchestrator;
pub mod process;
pub mod statistics;
pub mod terminator;

// Re-export all public types for convenience
pub use clock::*;
pub use context::*;
pub use error::*;
pub use logging::*;
pub use monitor::*;
pub use orchestrator::*;
pub use process::*;
pub use statistics::*;
pub use terminator::*;
