//! Common types used throughout predictive_control

use crate::common::error::{ControlError, ControlResult};

/// Actuator limits `[lo, hi]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Saturation {
    pub lo: f64,
    pub hi: f64,
}

impl Saturation {
    pub fn new(lo: f64, hi: f64) -> ControlResult<Self> {
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(ControlError::InvalidSaturation { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    /// Restrict `u` to the actuator range (anti-windup)
    pub fn clamp(&self, u: f64) -> f64 {
        if u >= self.hi {
            self.hi
        } else if u <= self.lo {
            self.lo
        } else {
            u
        }
    }

    pub fn contains(&self, u: f64) -> bool {
        u >= self.lo && u <= self.hi
    }
}

impl Default for Saturation {
    fn default() -> Self {
        Self { lo: -10.0, hi: 10.0 }
    }
}

/// Two-slot ring buffer holding the latest and previous sample of a value.
///
/// Used for the finite differences of the secant step; slots are shifted,
/// never reset, between iterations.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SecantPair {
    pub latest: f64,
    pub previous: f64,
}

impl SecantPair {
    pub fn new(latest: f64, previous: f64) -> Self {
        Self { latest, previous }
    }

    /// Move `latest` into `previous` and store `value` as the new latest
    pub fn shift(&mut self, value: f64) {
        self.previous = self.latest;
        self.latest = value;
    }

    /// `latest - previous`
    pub fn delta(&self) -> f64 {
        self.latest - self.previous
    }
}
