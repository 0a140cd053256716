//! Controller configuration
//!
//! Holds every tunable of the closed-loop simulation, the parse-or-default
//! helpers used to fill it from text fields, and the construction-time
//! validation that rejects configurations the loop cannot run.

use std::str::FromStr;

use tracing::warn;

use crate::common::{ControlError, ControlResult, Saturation};

/// Reference used when the setpoint list cannot be parsed: one flat value
pub const FLAT_REFERENCE: [f64; 1] = [1.0];

/// Configuration of one closed-loop simulation
#[derive(Debug, Clone, PartialEq)]
pub struct MpcConfig {
    /// Total simulated time [s]
    pub duration: f64,
    /// Simulation step [s]
    pub dt: f64,
    /// Control period [s], at least `dt`
    pub cdt: f64,
    /// Setpoints, each held for an equal share of the run
    pub reference: Vec<f64>,
    /// Prediction horizon in control periods
    pub horizon: usize,
    /// Initial optimizer step size
    pub learning_rate: f64,
    /// Learning-rate decay per ten iterations [%]
    pub decay_percent: f64,
    /// Optimizer iterations per control update
    pub iterations: usize,
    /// Plant gain
    pub ku: f64,
    /// Plant time constant [s]
    pub tau: f64,
    /// Actuator bounds
    pub saturation: Saturation,
}

impl Default for MpcConfig {
    fn default() -> Self {
        Self {
            duration: 10.0,
            dt: 0.01,
            cdt: 0.01,
            reference: vec![1.0, 2.0, 3.0, 2.0],
            horizon: 20,
            learning_rate: 5e-3,
            decay_percent: 0.0,
            iterations: 300,
            ku: 1.0,
            tau: 1.0,
            saturation: Saturation::default(),
        }
    }
}

impl MpcConfig {
    /// Preset used by the interactive front-end on startup
    pub fn interactive() -> Self {
        Self {
            duration: 30.0,
            cdt: 0.1,
            reference: vec![1.0, 2.0, 4.0, 1.0],
            horizon: 30,
            learning_rate: 1e-2,
            iterations: 100,
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_cdt(mut self, cdt: f64) -> Self {
        self.cdt = cdt;
        self
    }

    pub fn with_reference(mut self, reference: Vec<f64>) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_decay_percent(mut self, decay_percent: f64) -> Self {
        self.decay_percent = decay_percent;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_plant(mut self, ku: f64, tau: f64) -> Self {
        self.ku = ku;
        self.tau = tau;
        self
    }

    pub fn with_saturation(mut self, lo: f64, hi: f64) -> Self {
        self.saturation = Saturation { lo, hi };
        self
    }

    /// Number of simulation steps, `round(duration / dt)`
    pub fn steps(&self) -> usize {
        (self.duration / self.dt).round() as usize
    }

    /// Simulation steps per control period, `floor(cdt / dt)`
    pub fn time_ratio(&self) -> usize {
        (self.cdt / self.dt).floor() as usize
    }

    /// Per-iteration factor such that ten iterations shrink the
    /// learning rate by `decay_percent`
    pub fn decay_factor(&self) -> f64 {
        (1.0 - self.decay_percent / 100.0).powf(0.1)
    }

    /// Reject configurations that would corrupt the integrator or the
    /// reference sampling.
    pub fn validate(&self) -> ControlResult<()> {
        if self.tau == 0.0 || !self.tau.is_finite() {
            return Err(ControlError::InvalidTimeConstant(self.tau));
        }
        if self.horizon < 1 {
            return Err(ControlError::InvalidHorizon(self.horizon));
        }
        if !(self.dt > 0.0) || !self.dt.is_finite() {
            return Err(ControlError::InvalidParameter(format!(
                "simulation step must be positive, got {}",
                self.dt
            )));
        }
        if self.cdt < self.dt || !self.cdt.is_finite() {
            return Err(ControlError::ControlPeriodTooShort { dt: self.dt, cdt: self.cdt });
        }
        if self.time_ratio() < 1 {
            return Err(ControlError::ControlPeriodTooShort { dt: self.dt, cdt: self.cdt });
        }
        if !(self.duration >= 0.0) || !self.duration.is_finite() {
            return Err(ControlError::InvalidParameter(format!(
                "duration must be finite and non-negative, got {}",
                self.duration
            )));
        }
        if self.reference.is_empty() {
            return Err(ControlError::InvalidParameter("reference needs at least one setpoint".to_string()));
        }
        if self.reference.iter().any(|r| !r.is_finite()) {
            return Err(ControlError::InvalidParameter("reference setpoints must be finite".to_string()));
        }
        if self.iterations == 0 {
            return Err(ControlError::InvalidParameter("iterations must be at least 1".to_string()));
        }
        if !self.learning_rate.is_finite() {
            return Err(ControlError::InvalidParameter(format!(
                "learning rate must be finite, got {}",
                self.learning_rate
            )));
        }
        if !(0.0..=100.0).contains(&self.decay_percent) {
            return Err(ControlError::InvalidParameter(format!(
                "decay must lie in [0, 100] percent, got {}",
                self.decay_percent
            )));
        }
        if !self.ku.is_finite() {
            return Err(ControlError::InvalidParameter(format!("plant gain must be finite, got {}", self.ku)));
        }
        Saturation::new(self.saturation.lo, self.saturation.hi)?;
        Ok(())
    }

    /// Apply one textual option. Unparseable values leave the field as it
    /// was, except the reference, which falls back to [`FLAT_REFERENCE`].
    /// Unknown keys are an error.
    ///
    /// Keys: `duration`, `dt`, `cdt`, `ref`, `horizon`, `lrate`, `decay`,
    /// `iter`, `ku`, `tau`, `sat`.
    pub fn set_field(&mut self, key: &str, text: &str) -> ControlResult<()> {
        match key.trim() {
            "duration" => self.duration = parse_f64_or(text, self.duration),
            "dt" => self.dt = parse_f64_or(text, self.dt),
            "cdt" => self.cdt = parse_f64_or(text, self.cdt),
            "ref" | "reference" => self.reference = parse_list_or(text, &FLAT_REFERENCE),
            "horizon" => self.horizon = parse_usize_or(text, self.horizon),
            "lrate" | "learning_rate" => self.learning_rate = parse_f64_or(text, self.learning_rate),
            "decay" => self.decay_percent = parse_f64_or(text, self.decay_percent),
            "iter" | "iterations" => self.iterations = parse_usize_or(text, self.iterations),
            "ku" => self.ku = parse_f64_or(text, self.ku),
            "tau" => self.tau = parse_f64_or(text, self.tau),
            "sat" | "saturation" => self.saturation = parse_saturation_or(text, self.saturation),
            other => {
                return Err(ControlError::InvalidParameter(format!("unknown option '{}'", other)));
            }
        }
        Ok(())
    }

    /// Build a configuration from `key=value` strings on top of `base`
    pub fn from_pairs<I, S>(base: Self, pairs: I) -> ControlResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = base;
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                ControlError::InvalidParameter(format!("expected key=value, got '{}'", pair))
            })?;
            config.set_field(key, value)?;
        }
        Ok(config)
    }
}

fn parse_or<T>(text: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match text.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            warn!(input = text, fallback = ?default, "unparseable value, using default");
            default
        }
    }
}

/// Parse a real number or fall back to `default`
pub fn parse_f64_or(text: &str, default: f64) -> f64 {
    parse_or(text, default)
}

/// Parse a non-negative integer or fall back to `default`
pub fn parse_usize_or(text: &str, default: usize) -> usize {
    parse_or(text, default)
}

/// Parse a comma-separated list of reals; any bad entry (or an empty
/// list) yields `default` as a whole.
pub fn parse_list_or(text: &str, default: &[f64]) -> Vec<f64> {
    let parsed: Result<Vec<f64>, _> = text.split(',').map(|v| v.trim().parse::<f64>()).collect();
    match parsed {
        Ok(values) if !values.is_empty() => values,
        _ => {
            warn!(input = text, fallback = ?default, "unparseable list, using default");
            default.to_vec()
        }
    }
}

/// Parse `lo,hi` actuator bounds or fall back to `default`.
/// Extra entries after the first two are ignored.
pub fn parse_saturation_or(text: &str, default: Saturation) -> Saturation {
    let mut parts = text.split(',').map(|v| v.trim().parse::<f64>());
    match (parts.next(), parts.next()) {
        (Some(Ok(lo)), Some(Ok(hi))) => Saturation { lo, hi },
        _ => {
            warn!(input = text, fallback = ?default, "unparseable saturation, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MpcConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.steps(), 1000);
        assert_eq!(config.time_ratio(), 1);
        assert!(MpcConfig::interactive().validate().is_ok());
        assert_eq!(MpcConfig::interactive().time_ratio(), 10);
    }

    #[test]
    fn test_fatal_configurations() {
        let config = MpcConfig::default().with_plant(1.0, 0.0);
        assert_eq!(config.validate(), Err(ControlError::InvalidTimeConstant(0.0)));

        let config = MpcConfig::default().with_horizon(0);
        assert_eq!(config.validate(), Err(ControlError::InvalidHorizon(0)));

        let config = MpcConfig::default().with_dt(0.1).with_cdt(0.05);
        assert!(matches!(config.validate(), Err(ControlError::ControlPeriodTooShort { .. })));

        let config = MpcConfig::default().with_saturation(5.0, -5.0);
        assert!(matches!(config.validate(), Err(ControlError::InvalidSaturation { .. })));

        let config = MpcConfig::default().with_decay_percent(150.0);
        assert!(matches!(config.validate(), Err(ControlError::InvalidParameter(_))));

        let config = MpcConfig::default().with_reference(vec![]);
        assert!(matches!(config.validate(), Err(ControlError::InvalidParameter(_))));
    }

    #[test]
    fn test_decay_factor_over_ten_iterations() {
        let config = MpcConfig::default().with_decay_percent(20.0);
        let after_ten = config.decay_factor().powi(10);
        assert!((after_ten - 0.8).abs() < 1e-12);
        assert_eq!(MpcConfig::default().decay_factor(), 1.0);
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(parse_f64_or("2.5", 1.0), 2.5);
        assert_eq!(parse_f64_or("abc", 1.0), 1.0);
        assert_eq!(parse_f64_or("", 30.0), 30.0);
        assert_eq!(parse_usize_or(" 42 ", 7), 42);
        assert_eq!(parse_usize_or("-3", 7), 7);
        assert_eq!(parse_list_or("1, 2,4,1", &[0.0]), vec![1.0, 2.0, 4.0, 1.0]);
        assert_eq!(parse_list_or("1,,2", &[3.0]), vec![3.0]);
        assert_eq!(parse_saturation_or("-5,5", Saturation::default()), Saturation { lo: -5.0, hi: 5.0 });
        assert_eq!(parse_saturation_or("-5", Saturation::default()), Saturation::default());
    }

    #[test]
    fn test_set_field_and_from_pairs() {
        let config = MpcConfig::from_pairs(
            MpcConfig::interactive(),
            vec!["horizon=12", "ref=0.5,1.5", "tau=oops", "sat=-2,2", "iter=x"],
        )
        .unwrap();
        assert_eq!(config.horizon, 12);
        assert_eq!(config.reference, vec![0.5, 1.5]);
        assert_eq!(config.tau, 1.0);
        assert_eq!(config.saturation, Saturation { lo: -2.0, hi: 2.0 });
        assert_eq!(config.iterations, 100);
        // untouched fields keep the base preset
        assert_eq!(config.cdt, 0.1);

        let mut config = MpcConfig::default();
        assert!(config.set_field("gain", "2").is_err());
        assert!(MpcConfig::from_pairs(MpcConfig::default(), vec!["horizon"]).is_err());
    }

    #[test]
    fn test_unparseable_reference_falls_back_to_flat_setpoint() {
        let config = MpcConfig::from_pairs(MpcConfig::interactive(), vec!["ref=abc"]).unwrap();
        assert_eq!(config.reference, vec![1.0]);
        assert_eq!(config.reference.len(), 1);

        let config = MpcConfig::from_pairs(MpcConfig::default(), vec!["ref=1,x,3"]).unwrap();
        assert_eq!(config.reference, FLAT_REFERENCE.to_vec());
    }

    #[test]
    fn test_unparseable_values_keep_base_preset() {
        let config = MpcConfig::from_pairs(
            MpcConfig::interactive(),
            vec!["horizon=abc", "duration=x", "iter=?", "lrate=", "sat=-1"],
        )
        .unwrap();
        assert_eq!(config, MpcConfig::interactive());
    }

    #[test]
    fn test_zero_tau_is_parsed_then_rejected() {
        let config = MpcConfig::from_pairs(MpcConfig::default(), vec!["tau=0"]).unwrap();
        assert_eq!(config.tau, 0.0);
        assert!(config.validate().is_err());
    }
}
