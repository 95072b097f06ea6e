//! Tolerant floating-point comparison for scores.

use std::cmp::Ordering;

/// Relative tolerance (absolute below magnitude 1.0).
pub const EPSILON: f64 = 1e-10;

/// Compare two scores, treating values within `EPSILON` as equal.
///
/// Exactly equal values (including matching infinities) are `Equal`;
/// non-finite values otherwise fall back to `f64::total_cmp`.
pub fn approx_cmp(a: f64, b: f64) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    if !a.is_finite() || !b.is_finite() {
        return a.total_cmp(&b);
    }
    let scale = a.abs().max(b.abs()).max(1.0);
    if (a - b).abs() <= EPSILON * scale {
        Ordering::Equal
    } else if a < b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    approx_cmp(a, b) == Ordering::Equal
}
