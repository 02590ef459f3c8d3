//! Enumeration types for the clinic flow simulator
//!
//! Patient categories, exam classes, patient lifecycle phases and report
//! formats used throughout the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Arrival stream a patient belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatientCategory {
    /// Booked patient, ranked by scheduled time
    Appointment,
    /// Unscheduled patient, ranked after every appointment
    WalkIn,
}

impl fmt::Display for PatientCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatientCategory::Appointment => write!(f, "Appointment"),
            PatientCategory::WalkIn => write!(f, "Walk-in"),
        }
    }
}

impl FromStr for PatientCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "appointment" | "appt" => Ok(PatientCategory::Appointment),
            "walk-in" | "walkin" | "walk_in" => Ok(PatientCategory::WalkIn),
            _ => Err(format!("Unknown patient category: {}", s)),
        }
    }
}

/// Examination class decided at admission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamClass {
    /// Requires imaging and a second exam
    A,
    /// Single exam, then departure
    B,
}

impl ExamClass {
    /// Whether this class is referred to imaging
    pub fn requires_imaging(self) -> bool {
        matches!(self, ExamClass::A)
    }
}

impl fmt::Display for ExamClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamClass::A => write!(f, "Type-A"),
            ExamClass::B => write!(f, "Type-B"),
        }
    }
}

/// Lifecycle phase of a patient process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatientPhase {
    /// Admitted, not yet queued
    Arrived,
    /// Waiting for (or held by lunch before) the first exam
    WaitingFirstExam,
    /// In the first exam
    FirstExam,
    /// Queued for an imaging room
    ImagingWait,
    /// In imaging
    Imaging,
    /// Waiting for (or held by lunch before) the second exam
    WaitingSecondExam,
    /// In the second exam
    SecondExam,
    /// Left the clinic
    Departed,
}

impl fmt::Display for PatientPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PatientPhase::Arrived => "Arrived",
            PatientPhase::WaitingFirstExam => "WaitingFirstExam",
            PatientPhase::FirstExam => "FirstExam",
            PatientPhase::ImagingWait => "ImagingWait",
            PatientPhase::Imaging => "Imaging",
            PatientPhase::WaitingSecondExam => "WaitingSecondExam",
            PatientPhase::SecondExam => "SecondExam",
            PatientPhase::Departed => "Departed",
        };
        write!(f, "{}", label)
    }
}

/// Which doctor exam a patient is heading to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamRound {
    /// Initial examination
    First,
    /// Follow-up after imaging
    Second,
}

impl fmt::Display for ExamRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamRound::First => write!(f, "1st"),
            ExamRound::Second => write!(f, "2nd"),
        }
    }
}

/// Output format for the run report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    /// Human-readable tables
    Text,
    /// Machine-readable JSON
    Json,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!("Unknown report format: {}", s)),
        }
    }
}

/// Output format for diagnostic logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    /// Plain console lines
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exam_class_imaging_flag() {
        assert!(ExamClass::A.requires_imaging());
        assert!(!ExamClass::B.requires_imaging());
    }

    #[test]
    fn test_patient_category_parsing() {
        assert_eq!("appointment".parse::<PatientCategory>().unwrap(), PatientCategory::Appointment);
        assert_eq!("Walk-In".parse::<PatientCategory>().unwrap(), PatientCategory::WalkIn);
        assert!("emergency".parse::<PatientCategory>().is_err());
    }

    #[test]
    fn test_report_format_parsing() {
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("TEXT".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert!("csv".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("plain".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(PatientCategory::WalkIn.to_string(), "Walk-in");
        assert_eq!(ExamClass::A.to_string(), "Type-A");
        assert_eq!(ExamRound::Second.to_string(), "2nd");
        assert_eq!(PatientPhase::ImagingWait.to_string(), "ImagingWait");
    }
}
