//! Statistics collection and reporting
//!
//! [`ClinicCounters`] is the single source of truth for patient flow counts.
//! [`RunReport`] bundles the counters with run metadata, sampled queue series,
//! patient records and the narrative log, and renders the summary tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use super::context::{EventLog, StopSignal};
use super::error::SimulationResult;
use super::monitor::QueueSeries;
use crate::patient::{PatientRecord, RoleAssignments};
use crate::types::{DoctorId, PatientCategory, RunId};

/// Global patient-flow counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicCounters {
    /// Patients admitted by any generator
    pub total_generated: usize,
    /// Appointment patients admitted
    pub appointment_arrivals: usize,
    /// Walk-in patients admitted
    pub walkin_arrivals: usize,
    /// Appointment patients that departed
    pub appointment_departures: usize,
    /// Walk-in patients that departed
    pub walkin_departures: usize,
    /// Patients currently in the clinic; never negative
    pub in_system: usize,
    /// Completed first exams, by doctor
    pub first_exams: Vec<usize>,
    /// Completed second exams, by doctor
    pub second_exams: Vec<usize>,
    /// Completed imaging sessions, all rooms
    pub imaging_completions: usize,
    /// Times a patient exit found the in-system counter already at zero
    pub underflow_anomalies: usize,
    /// Times a patient was held back by a doctor's lunch
    pub lunch_holds: usize,
}

impl ClinicCounters {
    /// Zeroed counters for `doctor_count` doctors
    pub fn new(doctor_count: usize) -> Self {
        Self {
            first_exams: vec![0; doctor_count],
            second_exams: vec![0; doctor_count],
            ..Default::default()
        }
    }

    /// Count an admission
    pub fn record_arrival(&mut self, category: PatientCategory) {
        self.total_generated += 1;
        self.in_system += 1;
        match category {
            PatientCategory::Appointment => self.appointment_arrivals += 1,
            PatientCategory::WalkIn => self.walkin_arrivals += 1,
        }
    }

    /// Count a completed departure
    pub fn record_departure(&mut self, category: PatientCategory) {
        match category {
            PatientCategory::Appointment => self.appointment_departures += 1,
            PatientCategory::WalkIn => self.walkin_departures += 1,
        }
    }

    /// Guarded decrement of the in-system counter
    ///
    /// Returns `false` (and counts an anomaly) if the counter was already zero.
    pub fn leave_system(&mut self) -> bool {
        if self.in_system == 0 {
            self.underflow_anomalies += 1;
            return false;
        }
        self.in_system -= 1;
        true
    }

    /// Count a completed first exam
    pub fn record_first_exam(&mut self, doctor: DoctorId) {
        if let Some(count) = self.first_exams.get_mut(doctor.index()) {
            *count += 1;
        }
    }

    /// Count a completed second exam
    pub fn record_second_exam(&mut self, doctor: DoctorId) {
        if let Some(count) = self.second_exams.get_mut(doctor.index()) {
            *count += 1;
        }
    }

    /// Count a completed imaging session
    pub fn record_imaging(&mut self) {
        self.imaging_completions += 1;
    }

    /// Count a lunch hold
    pub fn record_lunch_hold(&mut self) {
        self.lunch_holds += 1;
    }

    /// Departures across both streams
    pub fn total_departures(&self) -> usize {
        self.appointment_departures + self.walkin_departures
    }

    /// Admitted minus departed
    pub fn calculated_remaining(&self) -> i64 {
        self.total_generated as i64 - self.total_departures() as i64
    }

    /// First exams across all doctors
    pub fn total_first_exams(&self) -> usize {
        self.first_exams.iter().sum()
    }

    /// Second exams across all doctors
    pub fn total_second_exams(&self) -> usize {
        self.second_exams.iter().sum()
    }

    /// Observed imaging referral rate in percent for one doctor
    ///
    /// Uses completed second exams over completed first exams.
    pub fn referral_rate(&self, doctor: DoctorId) -> f64 {
        let first = self.first_exams.get(doctor.index()).copied().unwrap_or(0);
        let second = self.second_exams.get(doctor.index()).copied().unwrap_or(0);
        if first == 0 {
            0.0
        } else {
            second as f64 / first as f64 * 100.0
        }
    }

    /// Observed referral rate in percent across all doctors
    pub fn overall_referral_rate(&self) -> f64 {
        let first = self.total_first_exams();
        if first == 0 {
            0.0
        } else {
            self.total_second_exams() as f64 / first as f64 * 100.0
        }
    }
}

/// Cross-check between admitted, departed and in-system counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// `total_generated - total_departures`
    pub calculated_remaining: i64,
    /// The in-system counter at the end of the run
    pub counter_remaining: usize,
    /// Whether the two agree
    pub consistent: bool,
}

impl Reconciliation {
    /// Compare the counters; a mismatch is logged, never fatal
    pub fn check(counters: &ClinicCounters) -> Self {
        let calculated_remaining = counters.calculated_remaining();
        let counter_remaining = counters.in_system;
        let consistent = calculated_remaining == counter_remaining as i64;
        if !consistent {
            warn!(
                calculated_remaining,
                counter_remaining,
                underflow_anomalies = counters.underflow_anomalies,
                "Calculated remaining patients and counter value do not match"
            );
        }
        Self { calculated_remaining, counter_remaining, consistent }
    }
}

/// Per-doctor line of the activity table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorSummary {
    /// Doctor
    pub doctor: DoctorId,
    /// Appointment slots scheduled
    pub scheduled: usize,
    /// Completed first exams
    pub first_exams: usize,
    /// Completed second exams
    pub second_exams: usize,
    /// Observed referral rate in percent
    pub referral_rate: f64,
    /// Configured imaging probability in percent
    pub expected_rate: f64,
    /// Mean wait for the first exam among patients who started it
    pub mean_first_wait: Option<f64>,
    /// Longest sampled waiting queue
    pub peak_queue: usize,
}

/// Everything produced by one simulated clinic day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run identifier
    pub run_id: RunId,
    /// Seed actually used, if any
    pub seed: Option<u64>,
    /// Wall-clock start
    pub started_at: DateTime<Utc>,
    /// Wall-clock finish
    pub finished_at: DateTime<Utc>,
    /// Wall-clock runtime in milliseconds
    pub elapsed_ms: u64,
    /// Appointment horizon
    pub horizon: f64,
    /// Walk-in cutoff
    pub walkin_cutoff: f64,
    /// Lunch window
    pub lunch_window: (f64, f64),
    /// Simulated time when the run ended
    pub final_time: f64,
    /// Whether the hard timeout ended the run
    pub forced_stop: bool,
    /// Why the run ended
    pub stop_reason: Option<String>,
    /// Resolved special roles
    pub roles: RoleAssignments,
    /// Appointment slots per doctor
    pub schedules: Vec<usize>,
    /// Configured imaging probability per doctor
    pub imaging_probabilities: Vec<f64>,
    /// Flow counters
    pub counters: ClinicCounters,
    /// Counter cross-check
    pub reconciliation: Reconciliation,
    /// Sampled queue lengths
    pub series: QueueSeries,
    /// Per-patient records
    pub records: Vec<PatientRecord>,
    /// Narrative log
    pub log: EventLog,
}

/// Inputs needed to assemble a [`RunReport`]
#[derive(Debug)]
pub struct RunSummaryInputs {
    /// Unique run identifier
    pub run_id: RunId,
    /// Seed actually used
    pub seed: Option<u64>,
    /// Wall-clock start
    pub started_at: DateTime<Utc>,
    /// Appointment horizon
    pub horizon: f64,
    /// Walk-in cutoff
    pub walkin_cutoff: f64,
    /// Lunch window
    pub lunch_window: (f64, f64),
    /// Simulated time when the run ended
    pub final_time: f64,
    /// Resolved special roles
    pub roles: RoleAssignments,
    /// Appointment slots per doctor
    pub schedules: Vec<usize>,
    /// Configured imaging probability per doctor
    pub imaging_probabilities: Vec<f64>,
}

impl RunReport {
    /// Assemble the report and reconcile the counters
    pub fn assemble(
        inputs: RunSummaryInputs,
        counters: ClinicCounters,
        series: QueueSeries,
        records: Vec<PatientRecord>,
        log: EventLog,
        stop: StopSignal,
    ) -> Self {
        let finished_at = Utc::now();
        let elapsed_ms = (finished_at - inputs.started_at).num_milliseconds().max(0) as u64;
        let reconciliation = Reconciliation::check(&counters);

        Self {
            run_id: inputs.run_id,
            seed: inputs.seed,
            started_at: inputs.started_at,
            finished_at,
            elapsed_ms,
            horizon: inputs.horizon,
            walkin_cutoff: inputs.walkin_cutoff,
            lunch_window: inputs.lunch_window,
            final_time: inputs.final_time,
            forced_stop: stop.forced,
            stop_reason: stop.reason,
            roles: inputs.roles,
            schedules: inputs.schedules,
            imaging_probabilities: inputs.imaging_probabilities,
            counters,
            reconciliation,
            series,
            records,
            log,
        }
    }

    /// Appointment slots scheduled across all doctors
    pub fn scheduled_total(&self) -> usize {
        self.schedules.iter().sum()
    }

    /// Per-doctor activity lines
    pub fn doctor_summaries(&self) -> Vec<DoctorSummary> {
        (0..self.counters.first_exams.len())
            .map(|index| {
                let doctor = DoctorId(index);
                let waits: Vec<f64> = self
                    .records
                    .iter()
                    .filter(|record| record.patient.doctor() == doctor)
                    .filter_map(|record| record.first_exam.and_then(|exam| exam.wait()))
                    .collect();
                let mean_first_wait =
                    (!waits.is_empty()).then(|| waits.iter().sum::<f64>() / waits.len() as f64);

                DoctorSummary {
                    doctor,
                    scheduled: self.schedules.get(index).copied().unwrap_or(0),
                    first_exams: self.counters.first_exams[index],
                    second_exams: self.counters.second_exams.get(index).copied().unwrap_or(0),
                    referral_rate: self.counters.referral_rate(doctor),
                    expected_rate: self.imaging_probabilities.get(index).copied().unwrap_or(0.0) * 100.0,
                    mean_first_wait,
                    peak_queue: self.series.peak_doctor_queue(index),
                }
            })
            .collect()
    }

    /// Mean time in system over departed patients
    pub fn mean_time_in_system(&self) -> Option<f64> {
        let times: Vec<f64> = self.records.iter().filter_map(PatientRecord::time_in_system).collect();
        (!times.is_empty()).then(|| times.iter().sum::<f64>() / times.len() as f64)
    }

    /// Serialize the whole report as pretty JSON
    pub fn to_json(&self) -> SimulationResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable summary tables
    pub fn generate_summary_report(&self) -> String {
        let c = &self.counters;
        let mut report = String::new();

        report.push_str("--- Simulation finished ---\n");
        report.push_str(&format!("Run: {}\n", self.run_id));
        match self.seed {
            Some(seed) => report.push_str(&format!("Random seed: {}\n", seed)),
            None => report.push_str("Random seed: (entropy)\n"),
        }
        report.push_str(&format!("Total simulated time: {:.2} min\n", self.final_time));
        report.push_str(&format!("Wall-clock runtime: {} ms\n", self.elapsed_ms));
        if self.forced_stop {
            report.push_str("Run was FORCED to stop by the hard timeout.\n");
        }

        report.push_str("\n--- Patient Flow Statistics ---\n");
        report.push_str(&format!(
            "Total scheduled appointments (all doctors): {}\n",
            self.scheduled_total()
        ));
        report.push_str(&format!(
            "Total generated patients (processes started): {}\n",
            c.total_generated
        ));
        report.push_str(&format!("  Appointment arrivals (realized): {}\n", c.appointment_arrivals));
        report.push_str(&format!("  Walk-in arrivals: {}\n", c.walkin_arrivals));
        report.push_str(&format!("\nTotal completed patients: {}\n", c.total_departures()));
        report.push_str(&format!("  Appointment departures: {}\n", c.appointment_departures));
        report.push_str(&format!("  Walk-in departures: {}\n", c.walkin_departures));
        report.push_str(&format!(
            "Patients remaining at end (calculated): {}\n",
            self.reconciliation.calculated_remaining
        ));
        report.push_str(&format!(
            "Patients remaining at end (counter): {}\n",
            self.reconciliation.counter_remaining
        ));
        if !self.reconciliation.consistent {
            report.push_str(
                "!!! WARNING: Calculated remaining patients and counter value do not match. Please verify.\n",
            );
        }
        if let Some(mean) = self.mean_time_in_system() {
            report.push_str(&format!("Mean time in system: {:.2} min\n", mean));
        }
        if c.lunch_holds > 0 {
            report.push_str(&format!("Lunch holds: {}\n", c.lunch_holds));
        }

        let summaries = self.doctor_summaries();
        report.push_str("\n--- Doctor Activity Statistics ---\n");
        report.push_str("Total exams performed by doctors:\n");
        for line in &summaries {
            report.push_str(&format!(
                "  Doctor {}: {} (1st Exam: {}, 2nd Exam: {})\n",
                line.doctor.number(),
                line.first_exams + line.second_exams,
                line.first_exams,
                line.second_exams
            ));
        }
        report.push_str(&format!(
            "\nTotal imaging patients (all rooms): {} patients\n",
            c.imaging_completions
        ));

        report.push_str("\n--- Doctor-level Imaging Referral Statistics ---\n");
        report.push_str(&format!(
            "{:<10} | {:<12} | {:<14} | {:<16} | {:<18}\n",
            "Doctor", "1st Exams", "Sent to Imaging", "Imaging Rate (%)", "Expected Rate (%)"
        ));
        report.push_str(&format!("{}\n", "-".repeat(80)));
        for line in &summaries {
            report.push_str(&format!(
                "Dr {:<7} | {:<12} | {:<14} | {:<16.2} | {:<18.2}\n",
                line.doctor.number(),
                line.first_exams,
                line.second_exams,
                line.referral_rate,
                line.expected_rate
            ));
        }

        if c.total_second_exams() != c.imaging_completions {
            report.push_str(&format!(
                "\nNote: Total second exams ({}) and total imaging patients ({}) can differ.\n",
                c.total_second_exams(),
                c.imaging_completions
            ));
            report.push_str(
                "This can happen if some patients do not return for the second exam before the simulation ends.\n",
            );
        }

        report.push_str(&format!("{}\n", "-".repeat(80)));
        report.push_str(&format!(
            "{:<10} | {:<12} | {:<14} | {:<16.2} | {:<18}\n",
            "Total",
            c.total_first_exams(),
            c.total_second_exams(),
            c.overall_referral_rate(),
            "N/A"
        ));

        if c.underflow_anomalies > 0 {
            report.push_str(&format!(
                "\n!!! {} in-system counter underflow anomalies were clamped.\n",
                c.underflow_anomalies
            ));
        }

        report
    }

    /// Narrative log rendered one entry per line
    pub fn render_event_log(&self) -> String {
        self.log
            .entries()
            .iter()
            .map(|entry| format!("{}\n", entry.message))
            .collect()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.generate_summary_report())
    }
}
