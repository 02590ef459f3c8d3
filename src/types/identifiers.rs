//! Identifier types for the clinic flow simulator
//!
//! Doctors and imaging rooms are addressed by zero-based indices wrapped in
//! newtypes. Patients carry a deterministic identity derived from their
//! arrival stream so that event traces are reproducible for a fixed seed.
//! Runs are tagged with a UUID.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

use super::PatientCategory;

/// Zero-based index of a doctor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DoctorId(pub usize);

impl DoctorId {
    /// Zero-based index into per-doctor tables
    pub fn index(self) -> usize {
        self.0
    }

    /// One-based number used in narrative output
    pub fn number(self) -> usize {
        self.0 + 1
    }
}

impl fmt::Display for DoctorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dr {}", self.number())
    }
}

/// Zero-based index of an imaging room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImagingRoomId(pub usize);

impl ImagingRoomId {
    /// Zero-based index into per-room tables
    pub fn index(self) -> usize {
        self.0
    }

    /// One-based number used in narrative output
    pub fn number(self) -> usize {
        self.0 + 1
    }
}

impl fmt::Display for ImagingRoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Imaging Room {}", self.number())
    }
}

/// A contended service point: one doctor or one imaging room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceId {
    /// A doctor's examination slot
    Doctor(DoctorId),
    /// A shared imaging room
    Imaging(ImagingRoomId),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Doctor(id) => write!(f, "{}", id),
            ResourceId::Imaging(id) => write!(f, "{}", id),
        }
    }
}

/// Deterministic patient identity
///
/// Sequence numbers are one-based and counted per doctor and per arrival
/// stream, so `Patient-AP-2-5` is the fifth appointment patient of doctor 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientId {
    /// Arrival stream the patient came from
    pub category: PatientCategory,
    /// Assigned doctor
    pub doctor: DoctorId,
    /// One-based sequence within the doctor's stream
    pub sequence: usize,
}

impl PatientId {
    /// Create a patient identity
    pub fn new(category: PatientCategory, doctor: DoctorId, sequence: usize) -> Self {
        Self { category, doctor, sequence }
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.category {
            PatientCategory::Appointment => "AP",
            PatientCategory::WalkIn => "WI",
        };
        write!(f, "Patient-{}-{}-{}", tag, self.doctor.number(), self.sequence)
    }
}

/// Unique identifier for one simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Create a new random run ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RUN_{}", self.0.simple())
    }
}

impl Serialize for RunId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("RUN_{}", self.0.simple()))
    }
}

impl<'de> Deserialize<'de> for RunId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if let Some(uuid_str) = s.strip_prefix("RUN_") {
            let uuid = Uuid::parse_str(uuid_str).map_err(serde::de::Error::custom)?;
            Ok(RunId(uuid))
        } else {
            // Fallback: accept a raw UUID
            let uuid = Uuid::parse_str(&s).map_err(serde::de::Error::custom)?;
            Ok(RunId(uuid))
        }
    }
}
