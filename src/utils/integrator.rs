//! Numerical integration for scalar ODEs

/// Classical 4th-order Runge-Kutta step for `dy/dt = f(y)`.
///
/// # Arguments
/// * `y` - Current state
/// * `h` - Step size
/// * `f` - Derivative function f(y) -> dy/dt
pub fn rk4<F>(y: f64, h: f64, f: F) -> f64
where
    F: Fn(f64) -> f64,
{
    let k1 = f(y);
    let k2 = f(y + 0.5 * h * k1);
    let k3 = f(y + 0.5 * h * k2);
    let k4 = f(y + h * k3);

    y + (h / 6.0) * (k1 + 2.0 * k2 + 2.0 * k3 + k4)
}
