//! Raw serde schema for the phantom configuration tree.
//!
//! These types mirror the JSON layout one-to-one and carry angles in
//! degrees, the unit configurations are written in. Validation and the
//! conversion into [`crate::LabelingParams`] / [`crate::PatternLibrary`]
//! happen in the parent module.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct ConfigTree {
    /// Frame width and height in pixels.
    pub frame_size: [u32; 2],
    /// Estimated millimetres per pixel.
    pub approximate_spacing_mm_per_pixel: f64,
    #[serde(default = "default_distance_error_percent")]
    pub max_line_pair_distance_error_percent: f64,
    #[serde(default = "default_max_angle_difference_deg")]
    pub max_angle_difference_deg: f64,
    #[serde(default = "default_angle_tolerance_deg")]
    pub angle_tolerance_deg: f64,
    #[serde(default = "default_max_line_shift_mm")]
    pub max_line_shift_mm: f64,
    /// Declared valid slope band for candidate lines, degrees.
    #[serde(default)]
    pub theta_deg: Option<[f64; 2]>,
    /// Pattern templates, most specific first.
    pub patterns: Vec<PatternEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PatternEntry {
    pub id: usize,
    #[serde(default)]
    pub name: String,
    pub family: FamilyEntry,
    /// One entry per ordered line pair (i, j), i < j, lexicographic.
    pub pairs: Vec<PairEntry>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FamilyEntry {
    FixedTriple,
    NWires { wires: usize },
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PairEntry {
    pub distance_mm: Option<[f64; 2]>,
    pub angle_deg: Option<[f64; 2]>,
    pub max_shift_mm: Option<f64>,
}

fn default_distance_error_percent() -> f64 {
    10.0
}

fn default_max_angle_difference_deg() -> f64 {
    90.0
}

fn default_angle_tolerance_deg() -> f64 {
    10.0
}

fn default_max_line_shift_mm() -> f64 {
    2.0
}
