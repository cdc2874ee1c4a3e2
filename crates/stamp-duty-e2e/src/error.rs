//! Error types for the suite

use duty_driver::DriverError;
use thiserror::Error;

/// Result type for page-object steps
pub type StampDutyResult<T> = Result<T, StampDutyError>;

/// Errors surfaced by hard steps of the journey
#[derive(Debug, Error)]
pub enum StampDutyError {
    /// A named step failed; `step` reads as a verb phrase
    #[error("Failed to {step}: {source}")]
    Step {
        /// What was being attempted, e.g. `close popup`
        step: &'static str,
        /// Underlying driver failure
        #[source]
        source: DriverError,
    },

    /// Driver error outside a named step
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StampDutyError {
    /// Wrap a driver failure as a failed step
    #[must_use]
    pub const fn step(step: &'static str, source: DriverError) -> Self {
        Self::Step { step, source }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Attach a step name to a driver result
pub trait StepContext<T> {
    /// Map the error into [`StampDutyError::Step`]
    ///
    /// # Errors
    ///
    /// Returns the wrapped error if `self` is `Err`.
    fn step(self, step: &'static str) -> StampDutyResult<T>;
}

impl<T> StepContext<T> for Result<T, DriverError> {
    fn step(self, step: &'static str) -> StampDutyResult<T> {
        self.map_err(|source| StampDutyError::step(step, source))
    }
}
