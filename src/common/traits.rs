//! Common traits defining interfaces for plants and controllers

use crate::utils::integrator::rk4;

/// Single-input single-output continuous-time plant
pub trait Plant {
    /// dy/dt for output `y` under constant input `u`
    fn derivative(&self, y: f64, u: f64) -> f64;

    /// Propagate the output forward by `h` seconds holding `u` constant
    fn step(&self, y: f64, u: f64, h: f64) -> f64 {
        rk4(y, h, |y| self.derivative(y, u))
    }
}

/// Trait for controllers that re-plan over a receding horizon
pub trait RecedingHorizonController {
    /// Compute the control action to apply now, given the measured
    /// output and the current simulation step index
    fn control(&mut self, measured: f64, step: usize) -> f64;

    /// Length of the planned control sequence
    fn horizon(&self) -> usize;
}
