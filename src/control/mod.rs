//! Model predictive control of a first-order lag
//!
//! Reference generation, horizon prediction, tracking cost, the secant
//! optimizer and the closed-loop orchestrator that ties them together.

pub mod config;
pub mod cost;
pub mod mpc;
pub mod optimizer;
pub mod predictor;
pub mod reference;

pub use config::*;
pub use cost::*;
pub use mpc::*;
pub use optimizer::*;
pub use predictor::*;
pub use reference::*;
