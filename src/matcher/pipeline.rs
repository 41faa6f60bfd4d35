//! The pattern search engine.
//!
//! One [`PatternMatcher`] serves one device pipeline: it owns the pattern
//! library and tolerance parameters for the session and is fed fresh dots
//! and candidate lines once per frame. Patterns are evaluated in library
//! order and the first pattern with a satisfying line combination wins;
//! later patterns are understood to be looser fallbacks, so no global
//! re-ranking happens across patterns. Within one pattern, all passing
//! combinations are scored by total dot intensity and the best is kept.

use log::{debug, warn};

use crate::geometry::{
    angle_between_lines, distance_point_to_line, shift_between_lines, GeometryError, Line,
};
use crate::pattern::{PairTolerance, PatternDefinition, PatternFamily, PatternLibrary};
use crate::types::{LabelingResult, MatchOutcome};
use crate::Dot;

use super::params::LabelingParams;
use super::results::{assemble_fixed_triple, assemble_n_wires, resolve_slot_order};

/// Caller-owned matching engine; one instance per device pipeline.
///
/// The library and parameters are immutable during a pass. Per-pass state
/// (results, success flag, intensity) is reset by [`clear`](Self::clear)
/// at the start of every [`find_pattern`](Self::find_pattern) call.
pub struct PatternMatcher {
    params: LabelingParams,
    library: PatternLibrary,
    dots_found: bool,
    pattern_intensity: f64,
    results: Vec<LabelingResult>,
}

/// Best passing combination for one pattern, lines in slot order.
struct Hypothesis {
    slot_indices: Vec<usize>,
    intensity: f64,
}

impl PatternMatcher {
    pub fn new(params: LabelingParams, library: PatternLibrary) -> Self {
        Self {
            params,
            library,
            dots_found: false,
            pattern_intensity: 0.0,
            results: Vec::new(),
        }
    }

    pub fn params(&self) -> &LabelingParams {
        &self.params
    }

    /// Replaces the tolerance parameters. Do not call while a pass is in
    /// flight on another thread; quiesce the pipeline first.
    pub fn set_params(&mut self, mut params: LabelingParams) {
        params.update_parameters();
        self.params = params;
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    pub fn dots_found(&self) -> bool {
        self.dots_found
    }

    /// Summed dot intensity of the winning combination, 0 after a failed
    /// pass.
    pub fn pattern_intensity(&self) -> f64 {
        self.pattern_intensity
    }

    pub fn results(&self) -> &[LabelingResult] {
        &self.results
    }

    /// Drops all per-pass state.
    pub fn clear(&mut self) {
        self.dots_found = false;
        self.pattern_intensity = 0.0;
        self.results.clear();
    }

    /// Runs one matching pass over the frame's dots and candidate lines.
    ///
    /// `dots` is the full detection list for the frame (used to check the
    /// frame-bounds invariant); `lines` are the candidate groupings from
    /// the upstream line finder. Returns the labeling for the winning
    /// pattern, or a failed outcome when nothing matched. Degenerate or
    /// out-of-band candidates are skipped, never fatal.
    pub fn find_pattern(&mut self, dots: &[Dot], lines: Vec<Line>) -> MatchOutcome {
        self.clear();

        let stray = dots.iter().filter(|d| !self.params.frame_contains(d)).count();
        if stray > 0 {
            warn!("find_pattern: {stray} of {} dots outside the frame", dots.len());
        }

        let candidates = self.filter_candidates(lines);

        let smallest = match self.library.smallest_line_count() {
            Some(n) => n,
            None => {
                warn!("find_pattern: empty pattern library");
                return self.failed_outcome();
            }
        };
        if candidates.len() < smallest {
            debug!(
                "find_pattern: {} candidate lines, smallest pattern needs {smallest}",
                candidates.len()
            );
            return self.failed_outcome();
        }

        let mut winner: Option<(usize, f64, Vec<LabelingResult>)> = None;
        for pattern in self.library.iter() {
            let needed = pattern.line_count();
            if candidates.len() < needed {
                debug!(
                    "find_pattern: pattern '{}' needs {needed} lines, have {}",
                    pattern.name,
                    candidates.len()
                );
                continue;
            }
            let Some(hypothesis) = best_combination(&self.params, pattern, &candidates) else {
                continue;
            };
            let matched: Vec<Line> = hypothesis
                .slot_indices
                .iter()
                .map(|&i| candidates[i].clone())
                .collect();
            let assembled = match pattern.family {
                PatternFamily::FixedTriple => assemble_fixed_triple(pattern.id, matched),
                PatternFamily::NWires { .. } => assemble_n_wires(pattern.id, matched),
            };
            match assembled {
                Ok(results) => {
                    debug!(
                        "find_pattern: pattern '{}' matched, intensity {:.1}, {} dots labeled",
                        pattern.name,
                        hypothesis.intensity,
                        results.len()
                    );
                    winner = Some((pattern.id, hypothesis.intensity, results));
                    break;
                }
                Err(err) => {
                    debug!(
                        "find_pattern: assembly failed for pattern '{}': {err}",
                        pattern.name
                    );
                }
            }
        }

        match winner {
            Some((pattern_id, intensity, results)) => {
                self.dots_found = true;
                self.pattern_intensity = intensity;
                self.results = results;
                MatchOutcome {
                    dots_found: true,
                    pattern_id: Some(pattern_id),
                    results: self.results.clone(),
                    pattern_intensity: intensity,
                }
            }
            None => {
                debug!("find_pattern: no pattern matched");
                self.failed_outcome()
            }
        }
    }

    fn failed_outcome(&self) -> MatchOutcome {
        MatchOutcome::default()
    }

    /// Drops candidates the search must not consider: degenerate lines,
    /// lines with out-of-frame dots, and lines outside the theta band.
    fn filter_candidates(&self, lines: Vec<Line>) -> Vec<Line> {
        lines
            .into_iter()
            .filter(|line| {
                let slope = match line.slope() {
                    Ok(slope) => slope,
                    Err(err) => {
                        debug!("find_pattern: skipping candidate line: {err}");
                        return false;
                    }
                };
                if !self.params.theta_band_contains(slope) {
                    debug!(
                        "find_pattern: slope {:.3} outside theta band [{:.3}, {:.3}]",
                        slope, self.params.min_theta_rad, self.params.max_theta_rad
                    );
                    return false;
                }
                if line.dots().iter().any(|d| !self.params.frame_contains(d)) {
                    debug!("find_pattern: candidate line has out-of-frame dots");
                    return false;
                }
                true
            })
            .collect()
    }
}

/// Enumerates C(n, k) combinations of candidate indices in lexicographic
/// order, resolves each into the family's slot order, verifies the
/// pattern's pairwise constraints, and keeps the best-scoring survivor.
/// Ties keep the earlier combination, so the result is deterministic for
/// identical input.
fn best_combination(
    params: &LabelingParams,
    pattern: &PatternDefinition,
    candidates: &[Line],
) -> Option<Hypothesis> {
    let k = pattern.line_count();
    let n = candidates.len();
    let mut best: Option<Hypothesis> = None;

    let mut combo = (0..k).collect::<Vec<usize>>();
    loop {
        if let Some(slots) = verify_combination(params, pattern, candidates, &combo) {
            let intensity: f64 = slots.iter().map(|&i| candidates[i].intensity()).sum();
            let better = best
                .as_ref()
                .map(|b| intensity > b.intensity)
                .unwrap_or(true);
            if better {
                best = Some(Hypothesis {
                    slot_indices: slots,
                    intensity,
                });
            }
        }
        if !advance_combination(&mut combo, n) {
            break;
        }
    }
    best
}

/// Advances `combo` to the next lexicographic k-combination of 0..n.
/// Returns false once the last combination has been visited.
fn advance_combination(combo: &mut [usize], n: usize) -> bool {
    let k = combo.len();
    let mut i = k;
    while i > 0 {
        i -= 1;
        if combo[i] < n - (k - i) {
            combo[i] += 1;
            for j in i + 1..k {
                combo[j] = combo[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

/// Checks one combination. Returns the candidate indices in slot order when
/// every pairwise constraint holds and no dot is labeled twice.
fn verify_combination(
    params: &LabelingParams,
    pattern: &PatternDefinition,
    candidates: &[Line],
    combo: &[usize],
) -> Option<Vec<usize>> {
    let slots = match resolve_slot_order(&pattern.family, candidates, combo) {
        Ok(slots) => slots,
        Err(err) => {
            debug!("find_pattern: slot ordering on degenerate line: {err}");
            return None;
        }
    };
    for i in 0..slots.len() {
        for j in i + 1..slots.len() {
            let tol = pattern.pair_tolerance(i, j);
            let a = &candidates[slots[i]];
            let b = &candidates[slots[j]];
            match pair_satisfies(params, tol, a, b) {
                Ok(true) => {}
                Ok(false) => return None,
                Err(err) => {
                    debug!("find_pattern: pair check on degenerate line: {err}");
                    return None;
                }
            }
        }
    }
    if !dots_are_disjoint(candidates, &slots) {
        return None;
    }
    Some(slots)
}

/// Verifies one slot-ordered line pair against its configured tolerance.
/// All bounds are inclusive.
fn pair_satisfies(
    params: &LabelingParams,
    tol: &PairTolerance,
    a: &Line,
    b: &Line,
) -> Result<bool, GeometryError> {
    let angle = angle_between_lines(a, b)?;
    if angle > params.max_angle_difference_rad {
        return Ok(false);
    }
    match tol.angle_rad {
        Some((lo, hi)) => {
            if angle < lo || angle > hi {
                return Ok(false);
            }
        }
        // No configured angle range means the pair is expected parallel.
        None => {
            if angle > params.angle_tolerance_rad {
                return Ok(false);
            }
        }
    }
    if let Some(range_mm) = tol.distance_mm {
        let (lo_px, hi_px) = params.distance_range_px(range_mm);
        let distance = distance_point_to_line(&a.start_point()?, b)?;
        if distance < lo_px || distance > hi_px {
            return Ok(false);
        }
        // Parallel-family pairs also require midpoint alignment.
        let shift = shift_between_lines(a, b)?;
        if shift.abs() > params.shift_bound_px(tol.max_shift_mm) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// A dot may belong to several alternative candidate lines, but the winning
/// hypothesis must not label the same dot twice.
fn dots_are_disjoint(candidates: &[Line], slots: &[usize]) -> bool {
    let mut seen: Vec<(f64, f64)> = Vec::new();
    for &index in slots {
        for dot in candidates[index].dots() {
            if seen.iter().any(|&(x, y)| x == dot.x && y == dot.y) {
                return false;
            }
            seen.push((dot.x, dot.y));
        }
    }
    true
}
