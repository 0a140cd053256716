//! predictive_control - closed-loop model predictive control of a
//! first-order lag plant
//!
//! The controller integrates the plant with RK4 at the simulation step,
//! re-plans a horizon of control samples every control period with an
//! iterative secant search, and applies only the first sample of each plan.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod plant;
pub mod control;

// Re-export common types for convenience
pub use common::{Saturation, SecantPair, Plant, RecedingHorizonController};
pub use common::{ControlError, ControlResult};
pub use control::{MpcConfig, PredictiveController, SimulationHistory, ReferenceTrajectory};
pub use plant::FirstOrderLag;
pub use utils::{SimulationRunner, RunReport, ResponsePlot};
