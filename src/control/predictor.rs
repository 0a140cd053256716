//! Horizon prediction: chain plant steps over a candidate control sequence

use nalgebra::DVector;

use crate::common::Plant;

/// Forward-simulate `plant` from `y0`, applying `up[i]` for `step` seconds
/// at stage `i`. Writes one predicted output per stage into `out`.
pub fn predict_into<P: Plant>(plant: &P, y0: f64, up: &DVector<f64>, step: f64, out: &mut DVector<f64>) {
    let mut y = y0;
    for (u, yp) in up.iter().zip(out.iter_mut()) {
        y = plant.step(y, *u, step);
        *yp = y;
    }
}

/// Allocating variant of [`predict_into`]
pub fn predict<P: Plant>(plant: &P, y0: f64, up: &DVector<f64>, step: f64) -> DVector<f64> {
    let mut out = DVector::zeros(up.len());
    predict_into(plant, y0, up, step, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plant::FirstOrderLag;

    #[test]
    fn test_prediction_chains_steps() {
        let plant = FirstOrderLag::new(1.0, 1.0).unwrap();
        let up = DVector::from_vec(vec![1.0, 1.0, -2.0]);
        let yp = predict(&plant, 0.5, &up, 0.1);

        let y1 = plant.step(0.5, 1.0, 0.1);
        let y2 = plant.step(y1, 1.0, 0.1);
        let y3 = plant.step(y2, -2.0, 0.1);
        assert_eq!(yp.as_slice(), &[y1, y2, y3]);
    }

    #[test]
    fn test_constant_input_tracks_analytic_response() {
        let plant = FirstOrderLag::new(2.0, 0.5).unwrap();
        let up = DVector::from_element(20, 1.0);
        let yp = predict(&plant, 0.0, &up, 0.05);
        for (i, y) in yp.iter().enumerate() {
            let t = 0.05 * (i + 1) as f64;
            assert!((y - plant.analytic_response(1.0, t)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_prediction_does_not_touch_inputs() {
        let plant = FirstOrderLag::new(1.0, 1.0).unwrap();
        let up = DVector::from_element(5, 3.0);
        let first = predict(&plant, 0.0, &up, 0.1);
        let second = predict(&plant, 0.0, &up, 0.1);
        assert_eq!(first, second);
        assert_eq!(up, DVector::from_element(5, 3.0));
    }
}
