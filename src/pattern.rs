//! Phantom pattern templates and the pattern library.
//!
//! A pattern describes one known calibration-phantom geometry: how many
//! wires it has and the admissible geometric relationships between each
//! ordered pair of its wires. Patterns are built once at configuration
//! load and shared read-only by every matching pass.

use serde::{Deserialize, Serialize};

/// Admissible relationships for one ordered pair of pattern lines.
///
/// Absent bounds are not checked for that pair. Present bounds are
/// inclusive on both ends.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PairTolerance {
    /// Perpendicular line-to-line distance range in millimetres.
    pub distance_mm: Option<(f64, f64)>,
    /// Angle range between the two lines in radians, within [0, π/2].
    pub angle_rad: Option<(f64, f64)>,
    /// Maximum absolute midpoint shift along the line direction, millimetres.
    pub max_shift_mm: Option<f64>,
}

/// The two supported phantom families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternFamily {
    /// Three wires with left / diagonal / right roles.
    FixedTriple,
    /// N parallel wires, labeled top to bottom.
    NWires { wires: usize },
}

impl PatternFamily {
    /// Number of candidate lines this family consumes.
    pub fn line_count(&self) -> usize {
        match self {
            PatternFamily::FixedTriple => 3,
            PatternFamily::NWires { wires } => *wires,
        }
    }
}

/// Immutable template for one phantom geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternDefinition {
    /// Identifier written into every labeling produced from this pattern.
    pub id: usize,
    pub name: String,
    pub family: PatternFamily,
    /// One entry per ordered pair (i, j), i < j, in lexicographic order.
    pub pair_tolerances: Vec<PairTolerance>,
}

impl PatternDefinition {
    pub fn line_count(&self) -> usize {
        self.family.line_count()
    }

    /// Number of ordered pairs for this pattern's line count.
    pub fn pair_count(&self) -> usize {
        let n = self.line_count();
        n * (n - 1) / 2
    }

    /// Tolerance for the ordered pair (i, j) with i < j.
    ///
    /// Panics if `i >= j` or `j` is out of range; pair indices are produced
    /// by the matcher's own enumeration and never come from input data.
    pub fn pair_tolerance(&self, i: usize, j: usize) -> &PairTolerance {
        assert!(i < j && j < self.line_count(), "invalid pair ({i}, {j})");
        // Lexicographic rank of (i, j) among the C(n, 2) pairs.
        let n = self.line_count();
        let index = i * n - i * (i + 1) / 2 + (j - i - 1);
        &self.pair_tolerances[index]
    }
}

/// Ordered collection of pattern definitions.
///
/// Order is significant: `find_pattern` evaluates patterns front to back
/// and the first satisfying pattern wins. Configurations are expected to
/// list patterns from most to least specific.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternLibrary {
    patterns: Vec<PatternDefinition>,
}

impl PatternLibrary {
    pub fn new(patterns: Vec<PatternDefinition>) -> Self {
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternDefinition> {
        self.patterns.iter()
    }

    /// Smallest line count any pattern requires, or `None` for an empty
    /// library. A frame with fewer candidate lines cannot match anything.
    pub fn smallest_line_count(&self) -> Option<usize> {
        self.patterns.iter().map(|p| p.line_count()).min()
    }
}
