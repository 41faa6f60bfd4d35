#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod matcher;
pub mod pattern;
pub mod types;

// “Expert” modules – still public, but considered unstable internals.
pub mod angle;
pub mod geometry;
pub mod ordering;

// --- High-level re-exports -------------------------------------------------

// Main entry points: matcher + results.
pub use crate::matcher::{LabelingParams, PatternMatcher};
pub use crate::types::{LabelingResult, MatchOutcome};

// Core data types shared with the upstream collaborators.
pub use crate::geometry::{Dot, GeometryError, Line};
pub use crate::pattern::{PairTolerance, PatternDefinition, PatternFamily, PatternLibrary};

// Configuration loading.
pub use crate::config::{load_configuration, read_configuration, ConfigError};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```
/// use fid_labeler::prelude::*;
///
/// let params = LabelingParams::default();
/// let library = PatternLibrary::default();
/// let mut matcher = PatternMatcher::new(params, library);
///
/// let outcome = matcher.find_pattern(&[], Vec::new());
/// assert!(!outcome.dots_found);
/// ```
pub mod prelude {
    pub use crate::geometry::{Dot, Line};
    pub use crate::types::{LabelingResult, MatchOutcome};
    pub use crate::{LabelingParams, PatternLibrary, PatternMatcher};
}
