//! Numeric tolerance helpers
//!
//! Every comparison of multipliers, errors or curvature against zero or a
//! bound goes through these functions rather than an exact float comparison.

/// Is `x == y` to within `epsilon`?
#[inline]
pub fn approx_eq(x: f64, y: f64, epsilon: f64) -> bool {
    (x - y).abs() < epsilon
}

/// Is `x <= y` to within `epsilon`?
#[inline]
pub fn leq(x: f64, y: f64, epsilon: f64) -> bool {
    x <= y + epsilon
}

/// Is `x >= y` to within `epsilon`?
#[inline]
pub fn geq(x: f64, y: f64, epsilon: f64) -> bool {
    x >= y - epsilon
}

/// Clamp `x` to `[low, high]`. Unlike `f64::clamp` this accepts an infinite
/// upper bound and never panics; `low` wins if the range is inverted.
#[inline]
pub fn clamp(x: f64, low: f64, high: f64) -> f64 {
    x.min(high).max(low)
}
