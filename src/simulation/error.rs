//! Error types and handling
//!
//! Every fallible operation in the engine returns [`SimulationResult`].
//! Errors raised inside a single process step are logged and retire only
//! that process; errors raised while building or driving the engine abort
//! the run.

use thiserror::Error;

use crate::types::ConfigValidationError;

/// Errors that can occur during simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ConfigurationError(String),

    /// A doctor profile or duration law is unusable
    #[error("Profile error: {0}")]
    ProfileError(String),

    /// Resource misuse, e.g. releasing a slot that is not held
    #[error("Resource error: {0}")]
    ResourceError(String),

    /// Invalid scheduling request, e.g. a negative or non-finite wait
    #[error("Scheduler error: {0}")]
    SchedulerError(String),

    /// A process step failed
    #[error("Process error: {0}")]
    ProcessError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<ConfigValidationError> for SimulationError {
    fn from(error: ConfigValidationError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl SimulationError {
    /// Create a configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a profile error
    pub fn profile_error(msg: impl Into<String>) -> Self {
        Self::ProfileError(msg.into())
    }

    /// Create a resource error
    pub fn resource_error(msg: impl Into<String>) -> Self {
        Self::ResourceError(msg.into())
    }

    /// Create a scheduler error
    pub fn scheduler_error(msg: impl Into<String>) -> Self {
        Self::SchedulerError(msg.into())
    }

    /// Create a process error
    pub fn process_error(msg: impl Into<String>) -> Self {
        Self::ProcessError(msg.into())
    }

    /// Whether the run can continue after this error
    ///
    /// Recoverable errors retire the offending process; the rest abort.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimulationError::ConfigurationError(_) => false,
            SimulationError::ProfileError(_) => false,
            SimulationError::ResourceError(_) => true,
            SimulationError::SchedulerError(_) => true,
            SimulationError::ProcessError(_) => true,
            SimulationError::IoError(_) => false,
            SimulationError::SerializationError(_) => false,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::ConfigurationError(_) => "Configuration",
            SimulationError::ProfileError(_) => "Profile",
            SimulationError::ResourceError(_) => "Resource",
            SimulationError::SchedulerError(_) => "Scheduler",
            SimulationError::ProcessError(_) => "Process",
            SimulationError::IoError(_) => "IO",
            SimulationError::SerializationError(_) => "Serialization",
        }
    }
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;
