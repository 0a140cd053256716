//
// Closed-loop model predictive control of a first-order lag
//
// The plant is integrated every `dt`; the optimizer runs every `cdt` and
// its first control sample is held (zero-order hold) until the next update.
//

use tracing::{debug, info};

use crate::common::{ControlResult, Plant, RecedingHorizonController};
use crate::control::config::MpcConfig;
use crate::control::optimizer::{OptimizerState, SecantOptimizer};
use crate::control::reference::ReferenceTrajectory;
use crate::plant::FirstOrderLag;

/// Time series recorded once per simulation tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationHistory {
    pub time: Vec<f64>,
    pub output: Vec<f64>,
    /// Held control value applied during each tick
    pub control: Vec<f64>,
    /// Number of optimizer invocations
    pub control_updates: usize,
}

impl SimulationHistory {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Series without the final sample, as the plots draw them
    pub fn trimmed(&self) -> (&[f64], &[f64], &[f64]) {
        let n = self.len().saturating_sub(1);
        (&self.time[..n], &self.output[..n], &self.control[..n])
    }

    /// Pair the reference with a time axis of equal length.
    ///
    /// The float clock can run one tick past `round(duration / dt)`, so the
    /// reference is one shorter than the history, or exactly as long.
    /// Either case is matched against the trimmed or full time axis, and
    /// anything else is cut to the shorter of the two.
    pub fn reference_for_plot<'a>(&'a self, reference: &'a [f64]) -> (&'a [f64], &'a [f64]) {
        let trimmed = self.len().saturating_sub(1);
        if trimmed == reference.len() {
            (&self.time[..trimmed], reference)
        } else {
            let n = self.len().min(reference.len());
            (&self.time[..n], &reference[..n])
        }
    }
}

/// Receding-horizon controller closed around its own plant model
pub struct PredictiveController {
    config: MpcConfig,
    plant: FirstOrderLag,
    reference: ReferenceTrajectory,
    optimizer: SecantOptimizer,
    state: Option<OptimizerState>,
    /// Plant output
    y: f64,
    /// Simulation clock [s]
    t: f64,
    /// Next control update [s]
    ct: f64,
    step_index: usize,
    held_control: f64,
    history: SimulationHistory,
}

impl PredictiveController {
    /// Validate `config` and build the controller at rest
    pub fn new(config: MpcConfig) -> ControlResult<Self> {
        config.validate()?;
        let plant = FirstOrderLag::new(config.ku, config.tau)?;
        let reference = ReferenceTrajectory::build(config.duration, config.dt, &config.reference)?;
        let optimizer = SecantOptimizer::from_config(&config);
        let state = OptimizerState::zeros(config.horizon);

        Ok(Self {
            config,
            plant,
            reference,
            optimizer,
            state: Some(state),
            y: 0.0,
            t: 0.0,
            ct: 0.0,
            step_index: 0,
            held_control: 0.0,
            history: SimulationHistory::default(),
        })
    }

    pub fn reference(&self) -> &ReferenceTrajectory {
        &self.reference
    }

    pub fn history(&self) -> &SimulationHistory {
        &self.history
    }

    /// Consume the controller, keeping only what it recorded
    pub fn into_history(self) -> SimulationHistory {
        self.history
    }

    pub fn optimizer_state(&self) -> Option<&OptimizerState> {
        self.state.as_ref()
    }

    pub fn output(&self) -> f64 {
        self.y
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    pub fn is_finished(&self) -> bool {
        self.t >= self.config.duration
    }

    /// Advance the closed loop by one simulation step
    pub fn tick(&mut self) {
        self.history.time.push(self.t);
        self.history.output.push(self.y);

        if self.ct <= self.t {
            self.held_control = self.control(self.y, self.step_index);
            self.ct += self.config.cdt;
        }

        self.history.control.push(self.held_control);
        self.y = self.plant.step(self.y, self.held_control, self.config.dt);
        self.t += self.config.dt;
        self.step_index += 1;
    }

    /// Run until the simulated duration has elapsed. Blocking and not
    /// reentrant; callers that need cancellation drive [`tick`] themselves.
    ///
    /// [`tick`]: PredictiveController::tick
    pub fn run(&mut self) -> &SimulationHistory {
        info!(
            duration = self.config.duration,
            dt = self.config.dt,
            cdt = self.config.cdt,
            horizon = self.config.horizon,
            iterations = self.config.iterations,
            "starting closed-loop simulation"
        );

        while !self.is_finished() {
            self.tick();
        }

        info!(
            ticks = self.history.len(),
            control_updates = self.history.control_updates,
            final_output = self.y,
            "simulation finished"
        );
        &self.history
    }
}

impl RecedingHorizonController for PredictiveController {
    fn control(&mut self, measured: f64, step: usize) -> f64 {
        let state = self
            .state
            .take()
            .unwrap_or_else(|| OptimizerState::zeros(self.config.horizon));
        let outcome = self.optimizer.solve(&self.plant, state, measured, &self.reference, step);

        debug!(step, time = self.t, control = outcome.control, cost = outcome.cost, "control update");
        self.history.control_updates += 1;
        self.state = Some(outcome.state);
        outcome.control
    }

    fn horizon(&self) -> usize {
        self.config.horizon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ControlError;

    fn tracking_config(setpoint: f64) -> MpcConfig {
        MpcConfig::default()
            .with_duration(8.0)
            .with_cdt(0.1)
            .with_reference(vec![setpoint])
            .with_horizon(20)
            .with_learning_rate(1e-2)
            .with_iterations(60)
    }

    #[test]
    fn test_rejects_invalid_config() {
        let err = PredictiveController::new(MpcConfig::default().with_plant(1.0, 0.0)).err();
        assert_eq!(err, Some(ControlError::InvalidTimeConstant(0.0)));
        assert!(PredictiveController::new(MpcConfig::default().with_horizon(0)).is_err());
        assert!(PredictiveController::new(MpcConfig::default().with_cdt(0.001)).is_err());
    }

    #[test]
    fn test_initial_state() {
        let controller = PredictiveController::new(MpcConfig::default()).unwrap();
        assert_eq!(controller.output(), 0.0);
        assert_eq!(controller.reference().len(), 1000);
        assert_eq!(controller.optimizer_state(), Some(&OptimizerState::zeros(20)));
        assert!(controller.history().is_empty());
        assert_eq!(controller.horizon(), 20);
    }

    #[test]
    fn test_closed_loop_tracks_constant_reference() {
        let mut controller = PredictiveController::new(tracking_config(1.0)).unwrap();
        let history = controller.run();
        let tail = &history.output[history.len() - 100..];
        assert!(tail.iter().all(|y| (y - 1.0).abs() < 1e-3));
    }

    #[test]
    fn test_saturated_actuator_limits_tracking() {
        let config = tracking_config(20.0).with_duration(15.0).with_horizon(30).with_iterations(100);
        let mut controller = PredictiveController::new(config).unwrap();
        let history = controller.run();

        assert!(history.control.iter().all(|&u| (-10.0..=10.0).contains(&u)));
        // Ku * sat_hi is the best reachable output
        assert!((history.output[history.len() - 1] - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let config = tracking_config(1.5).with_duration(2.0);
        let mut a = PredictiveController::new(config.clone()).unwrap();
        let mut b = PredictiveController::new(config).unwrap();
        assert_eq!(a.run(), b.run());
    }

    #[test]
    fn test_zero_order_hold_between_updates() {
        let config = MpcConfig::default()
            .with_duration(1.0)
            .with_cdt(0.1)
            .with_reference(vec![1.0])
            .with_horizon(5)
            .with_iterations(20);
        let mut controller = PredictiveController::new(config).unwrap();
        let history = controller.run().clone();

        assert_eq!(history.len(), 100);
        assert_eq!(history.control.len(), history.output.len());
        assert_eq!(history.control_updates, 10);
        // updates land on ticks 0, 11, 20, ... so ticks 1..=10 hold the first action
        assert!(history.control[1..11].iter().all(|&u| u == history.control[0]));
        assert_eq!(history.time[0], 0.0);
        assert_eq!(history.output[0], 0.0);
    }

    #[test]
    fn test_history_alignment_with_reference() {
        // float clock overshoots: 1501 ticks against 1500 reference samples
        let config = MpcConfig::default()
            .with_duration(15.0)
            .with_cdt(0.5)
            .with_horizon(3)
            .with_iterations(2);
        let mut controller = PredictiveController::new(config).unwrap();
        controller.run();
        let history = controller.history();
        assert_eq!(history.len(), 1501);
        assert_eq!(controller.reference().len(), 1500);
        let (t, r) = history.reference_for_plot(controller.reference().values());
        assert_eq!(t.len(), r.len());
        assert_eq!(t.len(), 1500);

        // exact clock: both 100 long
        let config = MpcConfig::default().with_duration(1.0).with_horizon(3).with_iterations(2);
        let mut controller = PredictiveController::new(config).unwrap();
        controller.run();
        let history = controller.history();
        assert_eq!(history.len(), controller.reference().len());
        let (t, r) = history.reference_for_plot(controller.reference().values());
        assert_eq!(t.len(), 100);
        assert_eq!(r.len(), 100);
        assert_eq!(history.trimmed().0.len(), 99);
    }

    #[test]
    fn test_warm_start_persists_across_updates() {
        let mut controller = PredictiveController::new(tracking_config(1.0)).unwrap();
        controller.tick();
        let after_first = controller.optimizer_state().cloned().unwrap();
        assert_ne!(after_first, OptimizerState::zeros(20));

        // the next update is due on tick 11
        for _ in 0..11 {
            controller.tick();
        }
        assert_eq!(controller.history().control_updates, 2);
        let after_second = controller.optimizer_state().unwrap();
        assert_ne!(after_second, &after_first);
        assert_eq!(after_second.horizon(), 20);
    }
}
