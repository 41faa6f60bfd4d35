//! Deterministic point ordering within a line.
//!
//! Stable labeling requires a canonical dot traversal before wire
//! sub-identifiers are assigned. Both sorts are stable, so dots comparing
//! equal keep their original relative order and repeated application is a
//! no-op.

use crate::geometry::{GeometryError, Line};

/// Reorders a line's dots by descending horizontal coordinate.
pub fn sort_right_to_left(line: &mut Line) {
    line.reorder_dots(|dots| {
        dots.sort_by(|a, b| b.x.partial_cmp(&a.x).unwrap_or(std::cmp::Ordering::Equal));
    });
}

/// Reorders a line's dots by ascending horizontal coordinate.
pub fn sort_left_to_right(line: &mut Line) {
    line.reorder_dots(|dots| {
        dots.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
    });
}

/// Reorders a line's dots by ascending distance from the line's start point.
pub fn sort_by_distance_from_start(line: &mut Line) -> Result<(), GeometryError> {
    let start = line.start_point()?;
    line.reorder_dots(|dots| {
        dots.sort_by(|a, b| {
            let da = start.distance_to(a);
            let db = start.distance_to(b);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });
    });
    Ok(())
}
