//! Process abstraction
//!
//! Every actor in the clinic (patients, generators, the lunch coordinator,
//! the queue monitor and the drain detector) is a state machine that the
//! engine resumes one step at a time. A step runs to its next suspension
//! point and tells the engine how to suspend through [`Yield`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::context::SimContext;
use super::error::SimulationResult;
use crate::clinic::PriorityKey;
use crate::types::ResourceId;

/// Index of a registered process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessId(pub usize);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "process#{}", self.0)
    }
}

/// How a process suspends at the end of a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Yield {
    /// Resume after the given number of minutes
    Wait(f64),
    /// Resume once the resource has been granted
    Request(ResourceId, PriorityKey),
    /// The process has finished
    Done,
}

/// A cooperative simulation process
pub trait Process: fmt::Debug {
    /// Short label used in diagnostics
    fn name(&self) -> String;

    /// Run until the next suspension point
    fn resume(&mut self, ctx: &mut SimContext) -> SimulationResult<Yield>;

    /// Called once when the process finishes or is retired after an error
    fn on_exit(&mut self, _ctx: &mut SimContext) {}

    /// Called on every live process when the run stops
    fn on_stop(&mut self, _ctx: &mut SimContext) {}
}
