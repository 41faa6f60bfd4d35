//! Geometry primitives: dots, candidate lines, and the derived values the
//! matcher reasons about.
//!
//! A [`Line`] is an ordered group of dots believed collinear. Its derived
//! quantities (principal direction, endpoints, slope, length) are computed
//! lazily and cached. The principal direction comes from the dot cloud's
//! covariance, so it does not depend on the current dot ordering and stays
//! valid across the reorderings done by [`crate::ordering`].

use crate::angle::direction_angle;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;

/// A single detected fiducial candidate point in image space.
///
/// Coordinates are frame-relative pixels; `intensity` is the summed pixel
/// weight reported by the upstream segmentation and feeds the matcher's
/// goodness metric.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    pub x: f64,
    pub y: f64,
    pub intensity: f64,
}

impl Dot {
    pub fn new(x: f64, y: f64, intensity: f64) -> Self {
        Self { x, y, intensity }
    }

    #[inline]
    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    #[inline]
    pub fn distance_to(&self, other: &Dot) -> f64 {
        (self.position() - other.position()).norm()
    }
}

/// Reasons a line is unusable for geometric computations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GeometryError {
    /// Fewer than two dots.
    DegenerateLine { dot_count: usize },
    /// Two or more dots, but all at the same position.
    CoincidentDots,
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::DegenerateLine { dot_count } => {
                write!(f, "degenerate line ({dot_count} dots, need >= 2)")
            }
            GeometryError::CoincidentDots => write!(f, "all dots coincide"),
        }
    }
}

impl std::error::Error for GeometryError {}

/// An ordered group of dots on a common straight line.
///
/// Built by the upstream line finder; owned by the matcher for the duration
/// of one matching pass.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Line {
    dots: Vec<Dot>,
    #[serde(skip)]
    direction: OnceCell<Vector2<f64>>,
    #[serde(skip)]
    endpoints: OnceCell<(Dot, Dot)>,
    #[serde(skip)]
    slope: OnceCell<f64>,
    #[serde(skip)]
    intensity: OnceCell<f64>,
}

impl Line {
    pub fn new(dots: Vec<Dot>) -> Self {
        Self {
            dots,
            direction: OnceCell::new(),
            endpoints: OnceCell::new(),
            slope: OnceCell::new(),
            intensity: OnceCell::new(),
        }
    }

    #[inline]
    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    #[inline]
    pub fn dot_count(&self) -> usize {
        self.dots.len()
    }

    /// Summed intensity of all dots on the line.
    pub fn intensity(&self) -> f64 {
        *self
            .intensity
            .get_or_init(|| self.dots.iter().map(|d| d.intensity).sum())
    }

    /// Reorders the dots in place. Derived values are order-independent,
    /// so caches stay valid.
    pub(crate) fn reorder_dots<F>(&mut self, reorder: F)
    where
        F: FnOnce(&mut Vec<Dot>),
    {
        reorder(&mut self.dots);
    }

    fn compute_direction(&self) -> Result<Vector2<f64>, GeometryError> {
        let n = self.dots.len();
        if n < 2 {
            return Err(GeometryError::DegenerateLine { dot_count: n });
        }
        let inv = 1.0 / n as f64;
        let cx = self.dots.iter().map(|d| d.x).sum::<f64>() * inv;
        let cy = self.dots.iter().map(|d| d.y).sum::<f64>() * inv;
        let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
        for d in &self.dots {
            let dx = d.x - cx;
            let dy = d.y - cy;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }
        if sxx + syy < 1e-12 {
            return Err(GeometryError::CoincidentDots);
        }
        // Principal axis of the 2x2 covariance in closed form.
        let theta = 0.5 * (2.0 * sxy).atan2(sxx - syy);
        let mut dir = Vector2::new(theta.cos(), theta.sin());
        // Canonical sign: positive x, ties broken toward positive y.
        if dir.x < 0.0 || (dir.x == 0.0 && dir.y < 0.0) {
            dir = -dir;
        }
        Ok(dir)
    }

    /// Unit principal direction, canonically signed (x > 0, or y > 0 for
    /// vertical lines).
    pub fn direction(&self) -> Result<Vector2<f64>, GeometryError> {
        if let Some(dir) = self.direction.get() {
            return Ok(*dir);
        }
        let dir = self.compute_direction()?;
        let _ = self.direction.set(dir);
        Ok(dir)
    }

    fn compute_endpoints(&self) -> Result<(Dot, Dot), GeometryError> {
        let dir = self.direction()?;
        let origin = self.dots[0].position();
        let mut min_t = f64::INFINITY;
        let mut max_t = f64::NEG_INFINITY;
        let mut start = self.dots[0];
        let mut end = self.dots[0];
        for d in &self.dots {
            let t = (d.position() - origin).dot(&dir);
            if t < min_t {
                min_t = t;
                start = *d;
            }
            if t > max_t {
                max_t = t;
                end = *d;
            }
        }
        Ok((start, end))
    }

    /// Extreme dot at the low end of the principal direction. With the
    /// canonical direction sign this is the left-most dot (top-most for
    /// vertical lines).
    pub fn start_point(&self) -> Result<Dot, GeometryError> {
        Ok(self.endpoints()?.0)
    }

    /// Extreme dot at the high end of the principal direction.
    pub fn end_point(&self) -> Result<Dot, GeometryError> {
        Ok(self.endpoints()?.1)
    }

    fn endpoints(&self) -> Result<(Dot, Dot), GeometryError> {
        if let Some(ep) = self.endpoints.get() {
            return Ok(*ep);
        }
        let ep = self.compute_endpoints()?;
        let _ = self.endpoints.set(ep);
        Ok(ep)
    }

    /// Span length between the two extreme dots.
    pub fn length(&self) -> Result<f64, GeometryError> {
        let (start, end) = self.endpoints()?;
        Ok(start.distance_to(&end))
    }

    /// Midpoint of the span between the two extreme dots.
    pub fn midpoint(&self) -> Result<Point2<f64>, GeometryError> {
        let (start, end) = self.endpoints()?;
        Ok(Point2::new((start.x + end.x) * 0.5, (start.y + end.y) * 0.5))
    }

    /// Line angle relative to the image x-axis, normalized into [0, π).
    pub fn slope(&self) -> Result<f64, GeometryError> {
        if let Some(s) = self.slope.get() {
            return Ok(*s);
        }
        let s = direction_angle(&self.direction()?);
        let _ = self.slope.set(s);
        Ok(s)
    }
}

/// Perpendicular distance from `dot` to the infinite line through `line`'s
/// endpoints. Always non-negative.
pub fn distance_point_to_line(dot: &Dot, line: &Line) -> Result<f64, GeometryError> {
    let dir = line.direction()?;
    let start = line.start_point()?;
    let to_dot = dot.position() - start.position();
    Ok((dir.x * to_dot.y - dir.y * to_dot.x).abs())
}

/// Signed displacement between the midpoints of two line spans, measured
/// along the first line's direction.
///
/// For the parallel wires of an N-wire phantom the midpoints should sit on
/// a common perpendicular; a large along-line component means the candidate
/// pair does not belong to the same phantom cross-section.
pub fn shift_between_lines(a: &Line, b: &Line) -> Result<f64, GeometryError> {
    let dir = a.direction()?;
    let mid_a = a.midpoint()?;
    let mid_b = b.midpoint()?;
    Ok((mid_b - mid_a).dot(&dir))
}

/// Unsigned angle between two lines in [0, π/2].
pub fn angle_between_lines(a: &Line, b: &Line) -> Result<f64, GeometryError> {
    Ok(crate::angle::half_turn_difference(a.slope()?, b.slope()?))
}
