//! Secant-step optimizer for the horizon control sequence
//!
//! Each iteration predicts the horizon outputs for the current candidate
//! sequence, scores them against the reference window and moves every
//! control sample by
//!
//! ```text
//! up[i] -= lrate * (f_k - f_{k-1}) / (up_i,k - up_i,k-1 + EPS)
//! ```
//!
//! i.e. the change in *total* cost between two iterations divided by the
//! change of that one sample. This is a secant estimate of a derivative,
//! not a true partial derivative: all samples share one cost delta, so the
//! search is a coupled heuristic with no convergence guarantee. On the
//! first iteration both history slots are zero and the step is driven by
//! `EPS` alone, which throws the sequence onto a saturation bound; the
//! search only becomes gradual once the samples differ from their history.

use nalgebra::DVector;
use tracing::trace;

use crate::common::{Plant, Saturation, SecantPair};
use crate::control::config::MpcConfig;
use crate::control::cost::tracking_cost;
use crate::control::predictor::predict_into;
use crate::control::reference::ReferenceTrajectory;

/// Guards the secant denominator when two candidates coincide
pub const SECANT_EPSILON: f64 = 1e-25;

/// Everything the optimizer carries from one iteration (and one control
/// period) to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerState {
    /// Candidate control sequence
    pub up: DVector<f64>,
    /// Predicted outputs for `up`
    pub yp: DVector<f64>,
    /// Last two candidates per horizon index
    pub hist_u: Vec<SecantPair>,
    /// Last two total costs
    pub hist_f: SecantPair,
}

impl OptimizerState {
    pub fn zeros(horizon: usize) -> Self {
        Self {
            up: DVector::zeros(horizon),
            yp: DVector::zeros(horizon),
            hist_u: vec![SecantPair::default(); horizon],
            hist_f: SecantPair::default(),
        }
    }

    pub fn horizon(&self) -> usize {
        self.up.len()
    }

    /// Sample applied to the plant under the receding-horizon rule
    pub fn first_control(&self) -> f64 {
        self.up[0]
    }
}

/// Result of one control update
#[derive(Debug, Clone)]
pub struct OptimizerOutcome {
    /// First sample of the refined sequence
    pub control: f64,
    /// Cost evaluated on the last iteration
    pub cost: f64,
    /// State to warm-start the next update with
    pub state: OptimizerState,
}

/// Iterative secant optimizer settings
#[derive(Debug, Clone, PartialEq)]
pub struct SecantOptimizer {
    pub horizon: usize,
    /// Prediction step, one control period [s]
    pub step: f64,
    /// Simulation steps per control period
    pub time_ratio: usize,
    pub iterations: usize,
    pub learning_rate: f64,
    pub decay_factor: f64,
    pub saturation: Saturation,
}

impl SecantOptimizer {
    pub fn from_config(config: &MpcConfig) -> Self {
        Self {
            horizon: config.horizon,
            step: config.cdt,
            time_ratio: config.time_ratio(),
            iterations: config.iterations,
            learning_rate: config.learning_rate,
            decay_factor: config.decay_factor(),
            saturation: config.saturation,
        }
    }

    /// One iteration: predict, score, secant update with saturation, and
    /// shift the history. Returns the updated state and the cost of the
    /// sequence it started from.
    pub fn iterate<P: Plant>(
        &self,
        plant: &P,
        mut state: OptimizerState,
        y0: f64,
        window: &[f64],
        lrate: f64,
    ) -> (OptimizerState, f64) {
        predict_into(plant, y0, &state.up, self.step, &mut state.yp);
        let cost = tracking_cost(state.yp.as_slice(), window);
        state.hist_f.latest = cost;

        let df = state.hist_f.delta();
        for (u, hist) in state.up.iter_mut().zip(state.hist_u.iter_mut()) {
            let candidate = *u - lrate * df / (hist.delta() + SECANT_EPSILON);
            // 0/0 leaves the sample where it is
            if !candidate.is_nan() {
                *u = self.saturation.clamp(candidate);
            }
            hist.shift(*u);
        }

        state.hist_f.previous = state.hist_f.latest;
        (state, cost)
    }

    /// Run all iterations against a precomputed reference window
    pub fn solve_window<P: Plant>(&self, plant: &P, mut state: OptimizerState, y0: f64, window: &[f64]) -> OptimizerOutcome {
        let mut lrate = self.learning_rate;
        let mut cost = state.hist_f.latest;

        for k in 0..self.iterations {
            let (next, c) = self.iterate(plant, state, y0, window, lrate);
            state = next;
            cost = c;
            trace!(iteration = k, cost, lrate, "secant iteration");
            lrate *= self.decay_factor;
        }

        OptimizerOutcome {
            control: state.first_control(),
            cost,
            state,
        }
    }

    /// Refine the warm-started sequence for the control update at
    /// simulation step `step_index`.
    pub fn solve<P: Plant>(
        &self,
        plant: &P,
        state: OptimizerState,
        y0: f64,
        reference: &ReferenceTrajectory,
        step_index: usize,
    ) -> OptimizerOutcome {
        let window = reference.windowed(step_index, self.horizon, self.time_ratio);
        self.solve_window(plant, state, y0, window.as_slice())
    }
}
