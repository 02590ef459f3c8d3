//! The clinic: doctors, imaging rooms and their stochastic behaviour
//!
//! - [`profile`]: per-doctor duration and rate laws behind a trait
//! - [`resource`]: capacity-one servers with a two-part priority queue
//! - [`registry`]: the set of doctors and imaging rooms
//! - [`schedule`]: appointment slot layout
//! - [`lunch`]: lunch flags and their coordinator process

pub mod lunch;
pub mod profile;
pub mod registry;
pub mod resource;
pub mod schedule;

pub use lunch::{LunchBoard, LunchCoordinator};
pub use profile::{
    DoctorProfile, DoctorProfileConfig, ExponentialLaw, FlooredGamma, GammaLaw,
    ParametricDoctorProfile, UniformLaw,
};
pub use registry::ResourceRegistry;
pub use resource::{PriorityKey, PriorityResource, RequestOutcome};
pub use schedule::Schedule;
