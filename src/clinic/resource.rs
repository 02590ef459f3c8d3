//! Priority-ordered exclusive resources
//!
//! Doctors and imaging rooms are capacity-one servers. Waiting requests are
//! served by ascending [`PriorityKey`], ties broken by request order. A slot
//! is never preempted: once granted it stays with its holder until the
//! holder releases it.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::simulation::{ProcessId, SimulationError, SimulationResult};
use crate::types::{PatientCategory, ResourceId};

/// Two-part queue priority: every appointment outranks every walk-in
///
/// Within a class, smaller values are served first. Appointments carry their
/// scheduled slot time and walk-ins their actual arrival time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriorityKey {
    /// Arrival stream
    pub class: PatientCategory,
    /// Scheduled time (appointments) or arrival time (walk-ins)
    pub value: f64,
}

impl PriorityKey {
    /// Key of an appointment booked for `scheduled_time`
    pub fn appointment(scheduled_time: f64) -> Self {
        Self { class: PatientCategory::Appointment, value: scheduled_time }
    }

    /// Key of a walk-in that arrived at `arrival_time`
    pub fn walk_in(arrival_time: f64) -> Self {
        Self { class: PatientCategory::WalkIn, value: arrival_time }
    }

    /// Flatten into a single number by pushing walk-ins up by `walkin_offset`
    ///
    /// Orders the same way as the key itself as long as every value is
    /// smaller than the offset.
    pub fn legacy_scalar(&self, walkin_offset: f64) -> f64 {
        match self.class {
            PatientCategory::Appointment => self.value,
            PatientCategory::WalkIn => walkin_offset + self.value,
        }
    }

    fn class_rank(&self) -> u8 {
        match self.class {
            PatientCategory::Appointment => 0,
            PatientCategory::WalkIn => 1,
        }
    }
}

impl Ord for PriorityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.class_rank()
            .cmp(&other.class_rank())
            .then_with(|| self.value.total_cmp(&other.value))
    }
}

impl PartialOrd for PriorityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PriorityKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PriorityKey {}

impl fmt::Display for PriorityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class {
            PatientCategory::Appointment => write!(f, "appt@{:.2}", self.value),
            PatientCategory::WalkIn => write!(f, "walk-in@{:.2}", self.value),
        }
    }
}

/// Result of a resource request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The requester holds the resource now
    Granted,
    /// The requester waits; `position` is its zero-based rank in the queue
    Queued {
        /// Zero-based rank among waiting requests
        position: usize,
    },
}

/// Capacity-limited server with a priority-ordered waiting queue
#[derive(Debug, Clone)]
pub struct PriorityResource {
    id: ResourceId,
    capacity: usize,
    holders: Vec<ProcessId>,
    waiting: BTreeMap<(PriorityKey, u64), ProcessId>,
    next_ticket: u64,
}

impl PriorityResource {
    /// Create an idle resource
    pub fn new(id: ResourceId, capacity: usize) -> Self {
        Self {
            id,
            capacity: capacity.max(1),
            holders: Vec::with_capacity(capacity.max(1)),
            waiting: BTreeMap::new(),
            next_ticket: 0,
        }
    }

    /// Which doctor or room this is
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Maximum simultaneous holders
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of waiting requests
    pub fn queue_len(&self) -> usize {
        self.waiting.len()
    }

    /// Number of current holders
    pub fn holder_count(&self) -> usize {
        self.holders.len()
    }

    /// Whether `process` currently holds a slot
    pub fn is_held_by(&self, process: ProcessId) -> bool {
        self.holders.contains(&process)
    }

    /// No holders and nobody waiting
    pub fn is_idle(&self) -> bool {
        self.holders.is_empty() && self.waiting.is_empty()
    }

    /// Keys of waiting requests in service order
    pub fn waiting_keys(&self) -> impl Iterator<Item = PriorityKey> + '_ {
        self.waiting.keys().map(|(key, _)| *key)
    }

    /// Ask for a slot
    pub fn request(&mut self, process: ProcessId, key: PriorityKey) -> SimulationResult<RequestOutcome> {
        if self.holders.contains(&process) || self.waiting.values().any(|p| *p == process) {
            return Err(SimulationError::resource_error(format!(
                "{} already holds or waits for {}",
                process, self.id
            )));
        }

        if self.holders.len() < self.capacity {
            self.holders.push(process);
            return Ok(RequestOutcome::Granted);
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.waiting.insert((key, ticket), process);
        let position = self.waiting.range(..(key, ticket)).count();
        Ok(RequestOutcome::Queued { position })
    }

    /// Give up a held slot and hand it to the best waiting request
    ///
    /// Returns the process that was granted the freed slot, if any.
    pub fn release(&mut self, process: ProcessId) -> SimulationResult<Option<ProcessId>> {
        let index = self.holders.iter().position(|p| *p == process).ok_or_else(|| {
            SimulationError::resource_error(format!("{} released {} without holding it", process, self.id))
        })?;
        self.holders.swap_remove(index);

        Ok(self.grant_next())
    }

    /// Drop every trace of `process`: held slots and waiting requests
    ///
    /// Returns processes granted a slot as a result.
    pub fn evict(&mut self, process: ProcessId) -> Vec<ProcessId> {
        self.waiting.retain(|_, p| *p != process);

        let mut granted = Vec::new();
        while let Some(index) = self.holders.iter().position(|p| *p == process) {
            self.holders.swap_remove(index);
            if let Some(next) = self.grant_next() {
                granted.push(next);
            }
        }
        granted
    }

    fn grant_next(&mut self) -> Option<ProcessId> {
        if self.holders.len() >= self.capacity {
            return None;
        }
        let (_, next) = self.waiting.pop_first()?;
        self.holders.push(next);
        Some(next)
    }
}
