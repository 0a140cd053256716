//! Tracking cost of a predicted trajectory

use itertools::zip_eq;

/// Sum of squared tracking errors over the horizon. No input or rate
/// penalty is applied.
///
/// # Panics
/// If `predicted` and `reference` differ in length.
pub fn tracking_cost(predicted: &[f64], reference: &[f64]) -> f64 {
    zip_eq(predicted, reference)
        .map(|(y, r)| (y - r).powi(2))
        .sum()
}
