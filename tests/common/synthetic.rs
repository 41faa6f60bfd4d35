//! Synthetic phantom frames for the end-to-end tests.
//!
//! Geometry is generated at 0.2 mm per pixel, the spacing the test
//! configuration declares, so a 10 mm wire gap appears as 50 px.

use fid_labeler::{Dot, Line};
use serde_json::json;

pub const SPACING_MM_PER_PX: f64 = 0.2;

/// Millimetres to pixels at the test spacing.
pub fn mm(value: f64) -> f64 {
    value / SPACING_MM_PER_PX
}

/// A horizontal wire cross-section: `count` dots starting at `x0`.
pub fn horizontal_wire(y: f64, x0: f64, count: usize, step: f64, intensity: f64) -> Line {
    Line::new(
        (0..count)
            .map(|i| Dot::new(x0 + i as f64 * step, y, intensity))
            .collect(),
    )
}

/// A vertical wire cross-section spanning `length` pixels.
pub fn vertical_wire(x: f64, y0: f64, length: f64, intensity: f64) -> Line {
    Line::new(vec![
        Dot::new(x, y0, intensity),
        Dot::new(x, y0 + length * 0.5, intensity),
        Dot::new(x, y0 + length, intensity),
    ])
}

/// Every dot of every line, in line order.
pub fn collect_dots(lines: &[Line]) -> Vec<Dot> {
    lines.iter().flat_map(|l| l.dots().to_vec()).collect()
}

/// Five parallel wires, 10 mm apart, matching the `five-wires` pattern of
/// [`phantom_config`].
pub fn five_wire_frame() -> (Vec<Dot>, Vec<Line>) {
    let lines: Vec<Line> = (0..5)
        .map(|i| horizontal_wire(100.0 + mm(10.0) * i as f64, 120.0, 3, 40.0, 1.0))
        .collect();
    let dots = collect_dots(&lines);
    (dots, lines)
}

/// Left vertical, 45 degree diagonal, right vertical, 10 mm apart,
/// matching the `triple` pattern of [`phantom_config`].
pub fn triple_frame() -> (Vec<Dot>, Vec<Line>) {
    let left = vertical_wire(200.0, 100.0, mm(10.0), 1.0);
    let right = vertical_wire(200.0 + mm(10.0), 100.0, mm(10.0), 1.0);
    let diagonal = Line::new(vec![
        Dot::new(202.0, 100.0 + mm(10.0) - 2.0, 1.0),
        Dot::new(200.0 + mm(5.0), 100.0 + mm(5.0), 1.0),
        Dot::new(200.0 + mm(10.0) - 2.0, 102.0, 1.0),
    ]);
    let lines = vec![left, diagonal, right];
    let dots = collect_dots(&lines);
    (dots, lines)
}

/// The test configuration tree: a fixed triple (id 1) listed before a
/// five-wire fallback (id 2).
pub fn phantom_config() -> serde_json::Value {
    let mut five_wire_pairs = Vec::new();
    for i in 0..5u32 {
        for j in i + 1..5 {
            let gap = f64::from(j - i) * 10.0;
            five_wire_pairs.push(json!({ "distance_mm": [gap, gap] }));
        }
    }
    json!({
        "frame_size": [640, 480],
        "approximate_spacing_mm_per_pixel": SPACING_MM_PER_PX,
        "max_line_pair_distance_error_percent": 10.0,
        "angle_tolerance_deg": 5.0,
        "max_line_shift_mm": 2.0,
        "theta_deg": [0.0, 180.0],
        "patterns": [
            {
                "id": 1,
                "name": "triple",
                "family": { "kind": "fixed_triple" },
                "pairs": [
                    { "angle_deg": [40.0, 50.0] },
                    { "distance_mm": [10.0, 10.0] },
                    { "angle_deg": [40.0, 50.0] }
                ]
            },
            {
                "id": 2,
                "name": "five-wires",
                "family": { "kind": "n_wires", "wires": 5 },
                "pairs": five_wire_pairs
            }
        ]
    })
}
