//! Error types for predictive_control

use thiserror::Error;

/// Main error type for the predictive controller
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    /// Plant time constant would divide by zero in the derivative
    #[error("Invalid parameter: time constant must be finite and nonzero, got {0}")]
    InvalidTimeConstant(f64),
    /// Prediction horizon shorter than one control period
    #[error("Invalid parameter: horizon must be at least 1, got {0}")]
    InvalidHorizon(usize),
    /// Control period shorter than the simulation step
    #[error("Invalid parameter: control period {cdt} is shorter than simulation step {dt}")]
    ControlPeriodTooShort { dt: f64, cdt: f64 },
    /// Actuator bounds are reversed or not finite
    #[error("Invalid parameter: saturation bounds [{lo}, {hi}] are not ordered")]
    InvalidSaturation { lo: f64, hi: f64 },
    /// Any other unusable configuration value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// A simulation is already running on this runner
    #[error("Runner error: a simulation is already in progress")]
    Busy,
    /// The worker thread died before delivering a result
    #[error("Runner error: {0}")]
    WorkerFailed(String),
    /// Visualization error
    #[error("Visualization error: {0}")]
    Visualization(String),
}

/// Result type alias for controller operations
pub type ControlResult<T> = Result<T, ControlError>;
