//! Configuration loading: one tree in, tolerance parameters and the
//! pattern library out.
//!
//! The tree is read once per calibration session (and again on explicit
//! reconfiguration). Everything is validated here so the matcher never
//! sees an inverted range, a zero spacing, or a pattern whose pair table
//! does not match its line count. The caller passes the valid slope band
//! explicitly; it overrides and narrows whatever band the tree declares.

pub mod schema;

use crate::matcher::LabelingParams;
use crate::pattern::{PairTolerance, PatternDefinition, PatternFamily, PatternLibrary};
use schema::{ConfigTree, FamilyEntry, PairEntry, PatternEntry};
use std::path::Path;

/// Setup-time configuration failure. Fatal: no matching pass may run
/// against a configuration that failed to load.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// File could not be read.
    Io { path: String, message: String },
    /// The tree is not valid JSON or misses required fields.
    Parse(String),
    /// A `[min, max]` range with min > max.
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    /// A value that must be strictly positive was not.
    NonPositive { field: &'static str, value: f64 },
    /// A value that must not be negative was.
    Negative { field: &'static str, value: f64 },
    EmptyPatternLibrary,
    DuplicatePatternId { id: usize },
    /// An n-wires pattern with fewer than two wires.
    InvalidWireCount { pattern: String, wires: usize },
    /// Pair table length does not match C(line_count, 2).
    PairCountMismatch {
        pattern: String,
        expected: usize,
        found: usize,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "failed to read configuration {path}: {message}")
            }
            ConfigError::Parse(message) => write!(f, "failed to parse configuration: {message}"),
            ConfigError::InvertedRange { field, min, max } => {
                write!(f, "inverted range for {field}: min {min} > max {max}")
            }
            ConfigError::NonPositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            ConfigError::Negative { field, value } => {
                write!(f, "{field} must not be negative, got {value}")
            }
            ConfigError::EmptyPatternLibrary => write!(f, "configuration declares no patterns"),
            ConfigError::DuplicatePatternId { id } => {
                write!(f, "duplicate pattern id {id}")
            }
            ConfigError::InvalidWireCount { pattern, wires } => {
                write!(f, "pattern '{pattern}' declares {wires} wires, need >= 2")
            }
            ConfigError::PairCountMismatch {
                pattern,
                expected,
                found,
            } => write!(
                f,
                "pattern '{pattern}' declares {found} pair tolerances, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parses a configuration tree into tolerance parameters and the pattern
/// library.
///
/// `min_theta_rad` / `max_theta_rad` come from the caller (typically the
/// segmentation stage, which knows which slopes it can produce) and narrow
/// the band the tree declares.
pub fn read_configuration(
    tree: &serde_json::Value,
    min_theta_rad: f64,
    max_theta_rad: f64,
) -> Result<(LabelingParams, PatternLibrary), ConfigError> {
    let tree: ConfigTree =
        serde_json::from_value(tree.clone()).map_err(|e| ConfigError::Parse(e.to_string()))?;

    let params = build_params(&tree, min_theta_rad, max_theta_rad)?;
    let library = build_library(&tree)?;
    Ok((params, library))
}

/// Reads and parses a JSON configuration file.
pub fn load_configuration(
    path: &Path,
    min_theta_rad: f64,
    max_theta_rad: f64,
) -> Result<(LabelingParams, PatternLibrary), ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let tree: serde_json::Value =
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
    read_configuration(&tree, min_theta_rad, max_theta_rad)
}

fn build_params(
    tree: &ConfigTree,
    min_theta_rad: f64,
    max_theta_rad: f64,
) -> Result<LabelingParams, ConfigError> {
    if tree.approximate_spacing_mm_per_pixel <= 0.0 {
        return Err(ConfigError::NonPositive {
            field: "approximate_spacing_mm_per_pixel",
            value: tree.approximate_spacing_mm_per_pixel,
        });
    }
    require_non_negative(
        "max_line_pair_distance_error_percent",
        tree.max_line_pair_distance_error_percent,
    )?;
    require_non_negative("angle_tolerance_deg", tree.angle_tolerance_deg)?;
    require_non_negative("max_angle_difference_deg", tree.max_angle_difference_deg)?;
    require_non_negative("max_line_shift_mm", tree.max_line_shift_mm)?;

    // The caller-supplied band overrides the declared one by narrowing it.
    let (mut min_theta, mut max_theta) = (min_theta_rad, max_theta_rad);
    if let Some([decl_min_deg, decl_max_deg]) = tree.theta_deg {
        let decl_min = decl_min_deg.to_radians();
        let decl_max = decl_max_deg.to_radians();
        if decl_min > decl_max {
            return Err(ConfigError::InvertedRange {
                field: "theta_deg",
                min: decl_min_deg,
                max: decl_max_deg,
            });
        }
        min_theta = min_theta.max(decl_min);
        max_theta = max_theta.min(decl_max);
    }
    if min_theta > max_theta {
        return Err(ConfigError::InvertedRange {
            field: "theta band",
            min: min_theta,
            max: max_theta,
        });
    }

    let mut params = LabelingParams::default();
    params.frame_size = tree.frame_size;
    params.approximate_spacing_mm_per_pixel = tree.approximate_spacing_mm_per_pixel;
    params.max_line_pair_distance_error_percent = tree.max_line_pair_distance_error_percent;
    params.max_angle_difference_rad = tree.max_angle_difference_deg.to_radians();
    params.angle_tolerance_rad = tree.angle_tolerance_deg.to_radians();
    params.max_line_shift_mm = tree.max_line_shift_mm;
    params.min_theta_rad = min_theta;
    params.max_theta_rad = max_theta;
    params.update_parameters();
    Ok(params)
}

fn build_library(tree: &ConfigTree) -> Result<PatternLibrary, ConfigError> {
    if tree.patterns.is_empty() {
        return Err(ConfigError::EmptyPatternLibrary);
    }
    let mut patterns = Vec::with_capacity(tree.patterns.len());
    let mut seen_ids = Vec::new();
    for entry in &tree.patterns {
        if seen_ids.contains(&entry.id) {
            return Err(ConfigError::DuplicatePatternId { id: entry.id });
        }
        seen_ids.push(entry.id);
        patterns.push(build_pattern(entry)?);
    }
    Ok(PatternLibrary::new(patterns))
}

fn build_pattern(entry: &PatternEntry) -> Result<PatternDefinition, ConfigError> {
    let family = match entry.family {
        FamilyEntry::FixedTriple => PatternFamily::FixedTriple,
        FamilyEntry::NWires { wires } => {
            if wires < 2 {
                return Err(ConfigError::InvalidWireCount {
                    pattern: entry.name.clone(),
                    wires,
                });
            }
            PatternFamily::NWires { wires }
        }
    };
    let n = family.line_count();
    let expected_pairs = n * (n - 1) / 2;
    if entry.pairs.len() != expected_pairs {
        return Err(ConfigError::PairCountMismatch {
            pattern: entry.name.clone(),
            expected: expected_pairs,
            found: entry.pairs.len(),
        });
    }
    let pair_tolerances = entry
        .pairs
        .iter()
        .map(build_pair_tolerance)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PatternDefinition {
        id: entry.id,
        name: entry.name.clone(),
        family,
        pair_tolerances,
    })
}

fn build_pair_tolerance(entry: &PairEntry) -> Result<PairTolerance, ConfigError> {
    let distance_mm = match entry.distance_mm {
        Some([min, max]) => {
            if min > max {
                return Err(ConfigError::InvertedRange {
                    field: "distance_mm",
                    min,
                    max,
                });
            }
            require_non_negative("distance_mm min", min)?;
            Some((min, max))
        }
        None => None,
    };
    let angle_rad = match entry.angle_deg {
        Some([min, max]) => {
            if min > max {
                return Err(ConfigError::InvertedRange {
                    field: "angle_deg",
                    min,
                    max,
                });
            }
            require_non_negative("angle_deg min", min)?;
            Some((min.to_radians(), max.to_radians()))
        }
        None => None,
    };
    if let Some(shift) = entry.max_shift_mm {
        require_non_negative("max_shift_mm", shift)?;
    }
    Ok(PairTolerance {
        distance_mm,
        angle_rad,
        max_shift_mm: entry.max_shift_mm,
    })
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_tree() -> serde_json::Value {
        json!({
            "frame_size": [640, 480],
            "approximate_spacing_mm_per_pixel": 0.2,
            "theta_deg": [0.0, 180.0],
            "patterns": [
                {
                    "id": 1,
                    "name": "two parallel wires",
                    "family": { "kind": "n_wires", "wires": 2 },
                    "pairs": [ { "distance_mm": [9.0, 11.0] } ]
                }
            ]
        })
    }

    #[test]
    fn minimal_tree_round_trips() {
        let (params, library) =
            read_configuration(&minimal_tree(), 0.0, std::f64::consts::PI).unwrap();
        assert_eq!(params.frame_size, [640, 480]);
        assert_eq!(library.len(), 1);
        let pattern = library.iter().next().unwrap();
        assert_eq!(pattern.line_count(), 2);
        assert_eq!(pattern.pair_tolerance(0, 1).distance_mm, Some((9.0, 11.0)));
        // 9 mm at 0.2 mm/px, widened by the default 10 percent.
        let (lo, hi) = params.distance_range_px((9.0, 11.0));
        assert!((lo - 9.0 * 0.9 / 0.2).abs() < 1e-9);
        assert!((hi - 11.0 * 1.1 / 0.2).abs() < 1e-9);
    }

    #[test]
    fn caller_band_narrows_declared_band() {
        let mut tree = minimal_tree();
        tree["theta_deg"] = json!([30.0, 150.0]);
        let (params, _) =
            read_configuration(&tree, 45.0_f64.to_radians(), std::f64::consts::PI).unwrap();
        assert!((params.min_theta_rad - 45.0_f64.to_radians()).abs() < 1e-12);
        assert!((params.max_theta_rad - 150.0_f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn missing_required_field_is_a_parse_error() {
        let tree = json!({ "patterns": [] });
        match read_configuration(&tree, 0.0, 1.0) {
            Err(ConfigError::Parse(_)) => {}
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn inverted_pair_range_is_rejected() {
        let mut tree = minimal_tree();
        tree["patterns"][0]["pairs"][0]["distance_mm"] = json!([11.0, 9.0]);
        assert_eq!(
            read_configuration(&tree, 0.0, 1.0),
            Err(ConfigError::InvertedRange {
                field: "distance_mm",
                min: 11.0,
                max: 9.0
            })
        );
    }

    #[test]
    fn pair_table_must_match_line_count() {
        let mut tree = minimal_tree();
        tree["patterns"][0]["family"] = json!({ "kind": "n_wires", "wires": 3 });
        match read_configuration(&tree, 0.0, 1.0) {
            Err(ConfigError::PairCountMismatch {
                expected: 3,
                found: 1,
                ..
            }) => {}
            other => panic!("expected pair count mismatch, got {other:?}"),
        }
    }

    #[test]
    fn empty_library_is_rejected() {
        let mut tree = minimal_tree();
        tree["patterns"] = json!([]);
        assert_eq!(
            read_configuration(&tree, 0.0, 1.0),
            Err(ConfigError::EmptyPatternLibrary)
        );
    }

    #[test]
    fn duplicate_pattern_ids_are_rejected() {
        let mut tree = minimal_tree();
        let first = tree["patterns"][0].clone();
        tree["patterns"].as_array_mut().unwrap().push(first);
        assert_eq!(
            read_configuration(&tree, 0.0, 1.0),
            Err(ConfigError::DuplicatePatternId { id: 1 })
        );
    }

    #[test]
    fn zero_spacing_is_rejected() {
        let mut tree = minimal_tree();
        tree["approximate_spacing_mm_per_pixel"] = json!(0.0);
        match read_configuration(&tree, 0.0, 1.0) {
            Err(ConfigError::NonPositive { .. }) => {}
            other => panic!("expected non-positive error, got {other:?}"),
        }
    }
}
