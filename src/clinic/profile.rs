//! Doctor profiles and the stochastic laws behind them
//!
//! A [`DoctorProfile`] is a pure sampling strategy: every call is an
//! independent draw from the caller's RNG and no profile keeps state between
//! calls. [`ParametricDoctorProfile`] is the data-driven implementation built
//! from a serializable [`DoctorProfileConfig`].

use rand::{Rng, RngCore};
use rand_distr::{Distribution, Exp, Gamma};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::simulation::{SimulationError, SimulationResult};
use crate::types::ExamClass;

/// Gamma law with a hard lower floor on every draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GammaLaw {
    /// Shape parameter (k)
    pub shape: f64,
    /// Scale parameter (theta)
    pub scale: f64,
    /// Draws below this value are raised to it
    pub floor: f64,
}

impl GammaLaw {
    /// Create a gamma law
    pub fn new(shape: f64, scale: f64, floor: f64) -> Self {
        Self { shape, scale, floor }
    }

    /// Check the parameters without building a sampler
    pub fn validate(&self) -> Result<(), String> {
        if !(self.shape.is_finite() && self.shape > 0.0) {
            return Err(format!("shape must be positive, got {}", self.shape));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(format!("scale must be positive, got {}", self.scale));
        }
        if !(self.floor.is_finite() && self.floor >= 0.0) {
            return Err(format!("floor must be non-negative, got {}", self.floor));
        }
        Ok(())
    }

    /// Build a reusable sampler
    pub fn sampler(&self) -> SimulationResult<FlooredGamma> {
        self.validate().map_err(SimulationError::profile_error)?;
        let dist = Gamma::new(self.shape, self.scale).map_err(|e| {
            SimulationError::profile_error(format!(
                "gamma({}, {}) rejected: {}",
                self.shape, self.scale, e
            ))
        })?;
        Ok(FlooredGamma { dist, floor: self.floor })
    }
}

/// Uniform law on `[min, max]` with a hard lower floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformLaw {
    /// Lower bound of the raw draw
    pub min: f64,
    /// Upper bound of the raw draw
    pub max: f64,
    /// Draws below this value are raised to it
    pub floor: f64,
}

impl UniformLaw {
    /// Create a uniform law
    pub fn new(min: f64, max: f64, floor: f64) -> Self {
        Self { min, max, floor }
    }

    /// Check the parameters; the smallest possible draw must be positive
    pub fn validate(&self) -> Result<(), String> {
        if !(self.min.is_finite() && self.max.is_finite() && self.floor.is_finite()) {
            return Err("bounds must be finite".to_string());
        }
        if self.min > self.max {
            return Err(format!("min ({}) must be <= max ({})", self.min, self.max));
        }
        if self.min.max(self.floor) <= 0.0 {
            return Err(format!(
                "smallest draw max(min, floor) = {} must be positive",
                self.min.max(self.floor)
            ));
        }
        Ok(())
    }

    /// Draw one value
    pub fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        rng.gen_range(self.min..=self.max).max(self.floor)
    }
}

/// Exponential law given by its mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialLaw {
    /// Mean of the law (1 / rate)
    pub mean: f64,
}

impl ExponentialLaw {
    /// Create an exponential law with the given mean
    pub fn with_mean(mean: f64) -> Self {
        Self { mean }
    }

    /// Check the parameters without building a sampler
    pub fn validate(&self) -> Result<(), String> {
        if !(self.mean.is_finite() && self.mean > 0.0) {
            return Err(format!("mean must be positive, got {}", self.mean));
        }
        Ok(())
    }

    fn sampler(&self) -> SimulationResult<Exp<f64>> {
        self.validate().map_err(SimulationError::profile_error)?;
        Exp::new(1.0 / self.mean).map_err(|e| {
            SimulationError::profile_error(format!("exponential(mean {}) rejected: {}", self.mean, e))
        })
    }
}

/// Built gamma sampler with its floor
#[derive(Debug, Clone)]
pub struct FlooredGamma {
    dist: Gamma<f64>,
    floor: f64,
}

impl FlooredGamma {
    /// Draw one value, raised to the floor if needed
    pub fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        self.dist.sample(rng).max(self.floor)
    }
}

/// Serializable parameter table for one doctor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorProfileConfig {
    /// Walk-in interarrival gap
    pub interarrival: ExponentialLaw,
    /// First exam for patients who will need imaging
    pub first_exam_a: GammaLaw,
    /// First (and only) exam for patients who will not need imaging
    pub first_exam_b: GammaLaw,
    /// Second exam after imaging
    pub second_exam: GammaLaw,
    /// Spacing between consecutive appointment slots
    pub appointment_interval: UniformLaw,
    /// Probability that a patient is referred to imaging
    pub imaging_probability: f64,
}

impl DoctorProfileConfig {
    /// Default seven-doctor table of the reference clinic
    pub fn clinic_defaults() -> Vec<Self> {
        let row = |mean: f64,
                   a: (f64, f64, f64),
                   b: (f64, f64, f64),
                   second: (f64, f64, f64),
                   interval: (f64, f64, f64),
                   p: f64| Self {
            interarrival: ExponentialLaw::with_mean(mean),
            first_exam_a: GammaLaw::new(a.0, a.1, a.2),
            first_exam_b: GammaLaw::new(b.0, b.1, b.2),
            second_exam: GammaLaw::new(second.0, second.1, second.2),
            appointment_interval: UniformLaw::new(interval.0, interval.1, interval.2),
            imaging_probability: p,
        };

        vec![
            row(10.0, (1.15, 2.41, 0.25), (0.80, 4.71, 0.70), (2.3, 1.5, 0.25), (9.0, 15.0, 10.0), 0.76),
            row(12.0, (3.0, 1.0, 0.5), (3.0, 1.0, 0.5), (4.0, 1.0, 0.5), (13.0, 17.0, 1.0), 0.80),
            row(12.0, (2.0, 1.0, 0.5), (4.0, 1.0, 0.5), (6.0, 1.0, 0.5), (11.0, 15.0, 1.0), 0.78),
            row(11.0, (2.0, 1.0, 0.5), (3.0, 1.0, 0.5), (4.0, 1.0, 0.5), (8.0, 12.0, 1.0), 0.60),
            row(13.0, (2.0, 1.0, 0.5), (3.0, 1.0, 0.5), (5.0, 1.0, 0.5), (9.0, 13.0, 1.0), 0.65),
            row(10.0, (2.0, 1.0, 0.5), (5.0, 1.0, 0.5), (2.0, 1.0, 0.5), (11.0, 17.0, 1.0), 0.90),
            row(14.0, (2.0, 1.0, 0.5), (5.0, 1.0, 0.5), (3.0, 1.0, 0.5), (10.0, 16.0, 1.0), 0.87),
        ]
    }

    /// Validate every law; on failure returns the law name and the reason
    pub fn validate_laws(&self) -> Result<(), (&'static str, String)> {
        self.interarrival.validate().map_err(|e| ("interarrival", e))?;
        self.first_exam_a.validate().map_err(|e| ("first_exam_a", e))?;
        self.first_exam_b.validate().map_err(|e| ("first_exam_b", e))?;
        self.second_exam.validate().map_err(|e| ("second_exam", e))?;
        self.appointment_interval.validate().map_err(|e| ("appointment_interval", e))?;
        Ok(())
    }
}

/// Per-doctor source of stochastic durations and rates
pub trait DoctorProfile: fmt::Debug {
    /// Gap until the next walk-in
    fn interarrival(&self, rng: &mut dyn RngCore) -> f64;

    /// First exam duration for the given class
    fn first_exam(&self, class: ExamClass, rng: &mut dyn RngCore) -> f64;

    /// Second exam duration
    fn second_exam(&self, rng: &mut dyn RngCore) -> f64;

    /// Spacing to the next appointment slot
    fn appointment_interval(&self, rng: &mut dyn RngCore) -> f64;

    /// Fixed imaging referral probability
    fn imaging_probability(&self) -> f64;

    /// Draw the exam class of a newly admitted patient
    fn sample_exam_class(&self, rng: &mut dyn RngCore) -> ExamClass {
        if rng.gen::<f64>() < self.imaging_probability() {
            ExamClass::A
        } else {
            ExamClass::B
        }
    }
}

/// Doctor profile driven by a [`DoctorProfileConfig`]
#[derive(Debug, Clone)]
pub struct ParametricDoctorProfile {
    interarrival: Exp<f64>,
    first_exam_a: FlooredGamma,
    first_exam_b: FlooredGamma,
    second_exam: FlooredGamma,
    appointment_interval: UniformLaw,
    imaging_probability: f64,
}

impl ParametricDoctorProfile {
    /// Build samplers from a parameter table
    pub fn from_config(config: &DoctorProfileConfig) -> SimulationResult<Self> {
        config
            .validate_laws()
            .map_err(|(law, reason)| SimulationError::profile_error(format!("{}: {}", law, reason)))?;
        if !(0.0..=1.0).contains(&config.imaging_probability) {
            return Err(SimulationError::profile_error(format!(
                "imaging probability {} outside [0, 1]",
                config.imaging_probability
            )));
        }

        Ok(Self {
            interarrival: config.interarrival.sampler()?,
            first_exam_a: config.first_exam_a.sampler()?,
            first_exam_b: config.first_exam_b.sampler()?,
            second_exam: config.second_exam.sampler()?,
            appointment_interval: config.appointment_interval,
            imaging_probability: config.imaging_probability,
        })
    }
}

impl DoctorProfile for ParametricDoctorProfile {
    fn interarrival(&self, rng: &mut dyn RngCore) -> f64 {
        self.interarrival.sample(rng)
    }

    fn first_exam(&self, class: ExamClass, rng: &mut dyn RngCore) -> f64 {
        match class {
            ExamClass::A => self.first_exam_a.sample(rng),
            ExamClass::B => self.first_exam_b.sample(rng),
        }
    }

    fn second_exam(&self, rng: &mut dyn RngCore) -> f64 {
        self.second_exam.sample(rng)
    }

    fn appointment_interval(&self, rng: &mut dyn RngCore) -> f64 {
        self.appointment_interval.sample(rng)
    }

    fn imaging_probability(&self) -> f64 {
        self.imaging_probability
    }
}
