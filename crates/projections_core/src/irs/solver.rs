//! Newton's method with a numeric derivative.
//!
//! Used to invert the gross-to-net withholding function, which is piecewise
//! linear in income, so the dollar-wide secant derivative is exact between
//! bracket bounds and the iteration lands in a handful of steps.

use crate::error::SolveError;

const STEP: f64 = 1.0;
const TOLERANCE: f64 = 1.0;
const MAX_ITERATIONS: u32 = 100;

/// Find `x` such that `f(x) == 0`, starting from `x0`.
///
/// Converges when `|f(x)| <= 1.0` (a dollar, for the withholding use).
pub fn solve_newton(f: impl Fn(f64) -> f64, x0: f64) -> Result<f64, SolveError> {
    let mut x = x0;
    for _ in 0..MAX_ITERATIONS {
        let fx = f(x);
        if fx.abs() <= TOLERANCE {
            return Ok(x);
        }
        let derivative = (f(x + STEP) - fx) / STEP;
        if derivative == 0.0 || !derivative.is_finite() {
            return Err(SolveError::ZeroDerivative { x });
        }
        x -= fx / derivative;
    }
    Err(SolveError::MaxIterations { iterations: MAX_ITERATIONS, last: x })
}
