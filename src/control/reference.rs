//! Piecewise-constant reference trajectory

use nalgebra::DVector;

use crate::common::{ControlError, ControlResult};

/// Setpoint for every simulation step of a run
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTrajectory {
    values: Vec<f64>,
}

impl ReferenceTrajectory {
    /// Expand `segments` over `round(duration / dt)` steps. Each segment
    /// holds for `round(N / segments.len())` steps (at least one) and the
    /// last segment absorbs whatever remains.
    pub fn build(duration: f64, dt: f64, segments: &[f64]) -> ControlResult<Self> {
        if segments.is_empty() {
            return Err(ControlError::InvalidParameter("reference needs at least one setpoint".to_string()));
        }
        if !(dt > 0.0) {
            return Err(ControlError::InvalidParameter(format!("simulation step must be positive, got {}", dt)));
        }
        let n = (duration / dt).round() as usize;
        let segment_len = ((n as f64 / segments.len() as f64).round_ties_even() as usize).max(1);
        let last = segments.len() - 1;

        let values = (0..n)
            .map(|i| segments[(i / segment_len).min(last)])
            .collect();

        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Setpoint at `index`, clamped to the final value past the end.
    /// An empty trajectory (zero duration) reads as 0.
    pub fn at(&self, index: usize) -> f64 {
        match self.values.get(index) {
            Some(&v) => v,
            None => self.last().unwrap_or(0.0),
        }
    }

    /// Fill `out` with the setpoints at `start + i * time_ratio`
    pub fn windowed_into(&self, start: usize, time_ratio: usize, out: &mut [f64]) {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.at(i.saturating_mul(time_ratio).saturating_add(start));
        }
    }

    /// Horizon-length slice of the reference sampled once per control period
    pub fn windowed(&self, start: usize, horizon: usize, time_ratio: usize) -> DVector<f64> {
        let mut window = DVector::zeros(horizon);
        self.windowed_into(start, time_ratio, window.as_mut_slice());
        window
    }
}
