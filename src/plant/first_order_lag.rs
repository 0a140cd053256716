//
// First-order lag plant: dy/dt = (Ku * u - y) / tau
//

use crate::common::{ControlError, ControlResult, Plant};

/// First-order lag with static gain `ku` and time constant `tau`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstOrderLag {
    pub ku: f64,
    pub tau: f64,
}

impl FirstOrderLag {
    /// Create the plant; `tau` must be finite and nonzero.
    pub fn new(ku: f64, tau: f64) -> ControlResult<Self> {
        if tau == 0.0 || !tau.is_finite() {
            return Err(ControlError::InvalidTimeConstant(tau));
        }
        if !ku.is_finite() {
            return Err(ControlError::InvalidParameter(format!("plant gain must be finite, got {}", ku)));
        }
        Ok(Self { ku, tau })
    }

    /// Closed-form step response from rest: y(t) = Ku * u * (1 - e^(-t/tau))
    pub fn analytic_response(&self, u: f64, t: f64) -> f64 {
        self.ku * u * (1.0 - (-t / self.tau).exp())
    }

    /// Output the plant settles at under constant input `u`
    pub fn steady_state(&self, u: f64) -> f64 {
        self.ku * u
    }
}

impl Plant for FirstOrderLag {
    fn derivative(&self, y: f64, u: f64) -> f64 {
        (self.ku * u - y) / self.tau
    }
}
