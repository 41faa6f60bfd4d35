//! Angle utilities shared by the geometry primitives and the matcher.
//!
//! A fiducial line has no preferred direction, so every angle here is
//! treated modulo a half turn: slopes live in `[0, π)` and differences
//! in `[0, π/2]`.

use nalgebra::Vector2;

/// Normalizes an angle into the range [0, π).
#[inline]
pub fn normalize_half_turn(angle: f64) -> f64 {
    let norm = angle.rem_euclid(std::f64::consts::PI);
    if norm >= std::f64::consts::PI - 1e-12 {
        0.0
    } else {
        norm
    }
}

/// Smallest unsigned difference between two undirected line angles,
/// in [0, π/2]. Antipodal directions compare as equal (π apart → 0).
#[inline]
pub fn half_turn_difference(a: f64, b: f64) -> f64 {
    let mut diff = (a - b).abs().rem_euclid(std::f64::consts::PI);
    if diff > std::f64::consts::FRAC_PI_2 {
        diff = std::f64::consts::PI - diff;
    }
    diff
}

/// Orientation of a direction vector as an undirected line angle in [0, π).
#[inline]
pub fn direction_angle(dir: &Vector2<f64>) -> f64 {
    normalize_half_turn(dir.y.atan2(dir.x))
}
