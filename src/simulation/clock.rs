//! Simulation clock and event queue
//!
//! Pending resumptions live in a min-heap keyed by `(time, sequence)`.
//! The sequence number is assigned at scheduling time, so events at the
//! same instant fire in the order they were scheduled.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::error::{SimulationError, SimulationResult};
use super::process::ProcessId;

/// A pending resumption of one process
#[derive(Debug, Clone, Copy)]
pub struct ScheduledEvent {
    /// Simulated time at which the process resumes
    pub at: f64,
    /// Scheduling order, used as the tie-breaker
    pub seq: u64,
    /// Process to resume
    pub process: ProcessId,
}

// BinaryHeap is a max-heap, so the comparison is reversed.
impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.at.total_cmp(&other.at) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            ord => ord,
        }
        .reverse()
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledEvent {}

/// Monotonic simulated clock with its event queue
#[derive(Debug, Default)]
pub struct SimClock {
    now: f64,
    next_seq: u64,
    queue: BinaryHeap<ScheduledEvent>,
}

impl SimClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time in minutes
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of pending events
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Schedule `process` to resume after `delay` minutes
    pub fn schedule_in(&mut self, delay: f64, process: ProcessId) -> SimulationResult<()> {
        if !delay.is_finite() || delay < 0.0 {
            return Err(SimulationError::scheduler_error(format!(
                "{} requested an invalid wait of {}",
                process, delay
            )));
        }
        self.push(self.now + delay, process);
        Ok(())
    }

    /// Schedule `process` to resume at the current instant
    pub fn schedule_now(&mut self, process: ProcessId) {
        self.push(self.now, process);
    }

    fn push(&mut self, at: f64, process: ProcessId) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(ScheduledEvent { at, seq, process });
    }

    /// Pop the earliest event and advance the clock to it
    pub fn advance(&mut self) -> Option<ScheduledEvent> {
        let event = self.queue.pop()?;
        self.now = event.at;
        Some(event)
    }
}
