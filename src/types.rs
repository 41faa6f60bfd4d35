use serde::Serialize;

/// Label assigned to one dot by a successful matching pass: which pattern
/// and which wire of that pattern the dot belongs to, plus its image-plane
/// coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LabelingResult {
    pub pattern_id: usize,
    pub wire_id: usize,
    pub x: f64,
    pub y: f64,
}

/// Outcome of one matching pass.
///
/// `dots_found == false` means no pattern satisfied its constraints for
/// this frame; `results` is empty in that case. This is an expected
/// per-frame outcome, not an error.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MatchOutcome {
    pub dots_found: bool,
    /// Identifier of the winning pattern, if any.
    pub pattern_id: Option<usize>,
    /// One entry per labeled dot; dots outside the matched lines are absent.
    pub results: Vec<LabelingResult>,
    /// Summed dot intensity of the winning combination's lines.
    pub pattern_intensity: f64,
}
