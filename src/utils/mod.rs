//! Utility modules for predictive_control

pub mod integrator;
pub mod runner;
pub mod visualization;

pub use integrator::*;
pub use runner::*;
pub use visualization::{ResponsePlot, colors};
