//! Periodic queue-length sampling
//!
//! The monitor samples every doctor and imaging-room waiting queue at a fixed
//! interval. It waits in short sub-increments rather than one long sleep, and
//! takes one last sample when the run stops.

use serde::{Deserialize, Serialize};

use super::context::SimContext;
use super::error::SimulationResult;
use super::process::{Process, Yield};

const WINDOW_TOLERANCE: f64 = 1e-9;

/// Sampled queue lengths, aligned on `timestamps`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueSeries {
    /// Sample times
    pub timestamps: Vec<f64>,
    /// One series per doctor
    pub doctor_queues: Vec<Vec<usize>>,
    /// One series per imaging room
    pub imaging_queues: Vec<Vec<usize>>,
}

impl QueueSeries {
    /// Empty series for the given clinic layout
    pub fn new(doctor_count: usize, imaging_room_count: usize) -> Self {
        Self {
            timestamps: Vec::new(),
            doctor_queues: vec![Vec::new(); doctor_count],
            imaging_queues: vec![Vec::new(); imaging_room_count],
        }
    }

    /// Append one sample; every series grows by exactly one entry
    pub fn push(&mut self, time: f64, doctors: &[usize], rooms: &[usize]) {
        self.timestamps.push(time);
        for (index, series) in self.doctor_queues.iter_mut().enumerate() {
            series.push(doctors.get(index).copied().unwrap_or(0));
        }
        for (index, series) in self.imaging_queues.iter_mut().enumerate() {
            series.push(rooms.get(index).copied().unwrap_or(0));
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether nothing was sampled
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Longest queue seen for a doctor
    pub fn peak_doctor_queue(&self, doctor: usize) -> usize {
        self.doctor_queues.get(doctor).and_then(|s| s.iter().max().copied()).unwrap_or(0)
    }

    /// Longest queue seen for an imaging room
    pub fn peak_imaging_queue(&self, room: usize) -> usize {
        self.imaging_queues.get(room).and_then(|s| s.iter().max().copied()).unwrap_or(0)
    }

    /// Sample mean of a doctor's queue length
    pub fn mean_doctor_queue(&self, doctor: usize) -> f64 {
        match self.doctor_queues.get(doctor) {
            Some(series) if !series.is_empty() => {
                series.iter().sum::<usize>() as f64 / series.len() as f64
            }
            _ => 0.0,
        }
    }
}

/// Samples queue lengths until the run stops
#[derive(Debug)]
pub struct QueueMonitor {
    interval: f64,
    sub_increment: f64,
    window_start: Option<f64>,
}

impl QueueMonitor {
    /// Monitor sampling every `interval` minutes, never sleeping longer than
    /// `sub_increment` at a time
    pub fn new(interval: f64, sub_increment: f64) -> Self {
        Self { interval, sub_increment, window_start: None }
    }
}

impl Process for QueueMonitor {
    fn name(&self) -> String {
        "queue-monitor".to_string()
    }

    fn resume(&mut self, ctx: &mut SimContext) -> SimulationResult<Yield> {
        let now = ctx.now();
        let mut remaining = match self.window_start {
            Some(start) => self.interval - (now - start),
            None => 0.0,
        };

        if remaining <= WINDOW_TOLERANCE {
            ctx.sample_queues();
            self.window_start = Some(now);
            remaining = self.interval;
        }

        Ok(Yield::Wait(remaining.min(self.sub_increment)))
    }

    fn on_stop(&mut self, ctx: &mut SimContext) {
        ctx.sample_queues();
        ctx.narrate(format!("{:.2} - Queue tracking stopped.", ctx.now()));
    }
}
