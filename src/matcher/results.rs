//! Family-specific result assembly.
//!
//! Once a combination of candidate lines passes all pairwise checks, the
//! lines are resolved into the family's canonical slot order and every dot
//! of every matched line receives its `(pattern, wire)` label. Dots outside
//! the matched lines are simply absent from the output.

use crate::geometry::{GeometryError, Line};
use crate::ordering::{sort_by_distance_from_start, sort_left_to_right};
use crate::pattern::PatternFamily;
use crate::types::LabelingResult;

/// Reorders a combination of candidate indices into the family's slot
/// order. Pair tolerances and wire identifiers are both defined against
/// this order.
///
/// - Fixed triple: ascending midpoint x, giving left / diagonal / right.
/// - N wires: ascending start-point y, top line first.
pub(crate) fn resolve_slot_order(
    family: &PatternFamily,
    candidates: &[Line],
    combo: &[usize],
) -> Result<Vec<usize>, GeometryError> {
    let mut keyed: Vec<(usize, f64)> = Vec::with_capacity(combo.len());
    for &index in combo {
        let line = &candidates[index];
        let key = match family {
            PatternFamily::FixedTriple => line.midpoint()?.x,
            PatternFamily::NWires { .. } => line.start_point()?.y,
        };
        keyed.push((index, key));
    }
    keyed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    Ok(keyed.into_iter().map(|(index, _)| index).collect())
}

/// Labels the three lines of a fixed-triple pattern.
///
/// `matched` must already be in slot order: left-most, diagonal, right-most.
/// Wire identifiers follow that role mapping; dots within each line are
/// ordered by distance from the line's start point.
pub(crate) fn assemble_fixed_triple(
    pattern_id: usize,
    matched: Vec<Line>,
) -> Result<Vec<LabelingResult>, GeometryError> {
    label_in_slot_order(pattern_id, matched, |line| sort_by_distance_from_start(line))
}

/// Labels the lines of an N-wires pattern.
///
/// `matched` must already be in slot order (top line first); wire
/// identifiers are 0..N-1 in that order and dots within each line are
/// ordered left to right.
pub(crate) fn assemble_n_wires(
    pattern_id: usize,
    matched: Vec<Line>,
) -> Result<Vec<LabelingResult>, GeometryError> {
    label_in_slot_order(pattern_id, matched, |line| {
        sort_left_to_right(line);
        Ok(())
    })
}

fn label_in_slot_order<F>(
    pattern_id: usize,
    matched: Vec<Line>,
    order_dots: F,
) -> Result<Vec<LabelingResult>, GeometryError>
where
    F: Fn(&mut Line) -> Result<(), GeometryError>,
{
    let mut results = Vec::new();
    for (wire_id, mut line) in matched.into_iter().enumerate() {
        order_dots(&mut line)?;
        for dot in line.dots() {
            results.push(LabelingResult {
                pattern_id,
                wire_id,
                x: dot.x,
                y: dot.y,
            });
        }
    }
    Ok(results)
}
