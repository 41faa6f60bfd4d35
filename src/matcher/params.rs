//! Tolerance parameters governing every matching decision.
//!
//! Real-world tolerances (millimetres, degrees) are configured once per
//! calibration session; the pixel-domain bounds the matcher actually
//! compares against are derived from them and from the spacing estimate.
//! [`LabelingParams::update_parameters`] recomputes the derived fields and
//! MUST run after any change to spacing or frame size — matching with
//! stale derived values is the primary correctness hazard here, which is
//! why every constructor path ends in `update_parameters`.

use crate::geometry::Dot;
use serde::{Deserialize, Serialize};

/// Configuration snapshot parameterizing one matching session.
///
/// Public fields are the configured real-world values; derived
/// pixel-domain values are private and kept consistent by
/// [`update_parameters`](Self::update_parameters).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelingParams {
    /// Frame width and height in pixels. Dots must lie inside.
    pub frame_size: [u32; 2],
    /// Estimated millimetres per pixel for this probe depth setting.
    pub approximate_spacing_mm_per_pixel: f64,
    /// Symmetric widening of configured line-pair distance ranges, percent.
    pub max_line_pair_distance_error_percent: f64,
    /// Upper bound on the angle between any two lines of one pattern, rad.
    pub max_angle_difference_rad: f64,
    /// Admissible angular deviation for pairs expected parallel, rad.
    pub angle_tolerance_rad: f64,
    /// Default bound on the midpoint shift of a parallel pair, millimetres.
    /// Individual pattern pairs may override it.
    pub max_line_shift_mm: f64,
    /// Lower end of the valid slope band for a single candidate line, rad.
    pub min_theta_rad: f64,
    /// Upper end of the valid slope band for a single candidate line, rad.
    pub max_theta_rad: f64,

    #[serde(skip)]
    px_per_mm: f64,
    #[serde(skip)]
    max_line_shift_px: f64,
    #[serde(skip)]
    distance_error_span: (f64, f64),
}

impl Default for LabelingParams {
    fn default() -> Self {
        let mut params = Self {
            frame_size: [640, 480],
            approximate_spacing_mm_per_pixel: 0.1,
            max_line_pair_distance_error_percent: 10.0,
            max_angle_difference_rad: std::f64::consts::FRAC_PI_2,
            angle_tolerance_rad: 5.0_f64.to_radians(),
            max_line_shift_mm: 2.0,
            min_theta_rad: 0.0,
            max_theta_rad: std::f64::consts::PI,
            px_per_mm: 0.0,
            max_line_shift_px: 0.0,
            distance_error_span: (1.0, 1.0),
        };
        params.update_parameters();
        params
    }
}

impl LabelingParams {
    /// Recomputes the derived pixel-domain tolerances.
    ///
    /// Call after mutating `approximate_spacing_mm_per_pixel`,
    /// `max_line_pair_distance_error_percent`, `max_line_shift_mm`, or
    /// `frame_size`, before the next matching pass.
    pub fn update_parameters(&mut self) {
        let spacing = self.approximate_spacing_mm_per_pixel.max(f64::MIN_POSITIVE);
        self.px_per_mm = 1.0 / spacing;
        self.max_line_shift_px = self.max_line_shift_mm * self.px_per_mm;
        let err = self.max_line_pair_distance_error_percent / 100.0;
        self.distance_error_span = (1.0 - err, 1.0 + err);
    }

    /// Converts a configured distance range in millimetres into the widened
    /// pixel-domain range used for comparisons. Bounds are inclusive.
    pub fn distance_range_px(&self, range_mm: (f64, f64)) -> (f64, f64) {
        (
            range_mm.0 * self.distance_error_span.0 * self.px_per_mm,
            range_mm.1 * self.distance_error_span.1 * self.px_per_mm,
        )
    }

    /// Pixel-domain shift bound for a parallel pair: the pair's own bound
    /// when configured, the session default otherwise.
    pub fn shift_bound_px(&self, pair_bound_mm: Option<f64>) -> f64 {
        pair_bound_mm.unwrap_or(self.max_line_shift_mm) * self.px_per_mm
    }

    /// Whether a line slope lies inside the valid theta band.
    pub fn theta_band_contains(&self, slope_rad: f64) -> bool {
        slope_rad >= self.min_theta_rad && slope_rad <= self.max_theta_rad
    }

    /// Whether a dot lies inside the configured frame.
    pub fn frame_contains(&self, dot: &Dot) -> bool {
        dot.x >= 0.0
            && dot.y >= 0.0
            && dot.x < self.frame_size[0] as f64
            && dot.y < self.frame_size[1] as f64
    }
}
