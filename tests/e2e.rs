mod common;

use common::synthetic::{
    collect_dots, five_wire_frame, horizontal_wire, mm, phantom_config, triple_frame,
};
use fid_labeler::{load_configuration, read_configuration, ConfigError, PatternMatcher};

fn matcher_from_config() -> PatternMatcher {
    let (params, library) =
        read_configuration(&phantom_config(), 0.0, std::f64::consts::PI).expect("valid config");
    PatternMatcher::new(params, library)
}

#[test]
fn five_wire_frame_matches_the_fallback_pattern() {
    let (dots, lines) = five_wire_frame();
    let mut matcher = matcher_from_config();
    let outcome = matcher.find_pattern(&dots, lines);

    assert!(outcome.dots_found);
    assert_eq!(outcome.pattern_id, Some(2));
    assert_eq!(outcome.results.len(), 15);

    // Top wire first, dots left to right along each wire.
    for r in &outcome.results {
        let expected_wire = ((r.y - 100.0) / mm(10.0)).round() as usize;
        assert_eq!(r.wire_id, expected_wire);
    }
    for wire in 0..5 {
        let xs: Vec<f64> = outcome
            .results
            .iter()
            .filter(|r| r.wire_id == wire)
            .map(|r| r.x)
            .collect();
        assert_eq!(xs, vec![120.0, 160.0, 200.0]);
    }
}

#[test]
fn triple_frame_matches_the_specific_pattern_first() {
    let (dots, lines) = triple_frame();
    let mut matcher = matcher_from_config();
    let outcome = matcher.find_pattern(&dots, lines);

    assert!(outcome.dots_found);
    assert_eq!(outcome.pattern_id, Some(1));
    assert_eq!(outcome.results.len(), 9);

    // Roles in ascending x: left 0, diagonal 1, right 2.
    for r in &outcome.results {
        let expected = if r.x <= 200.0 {
            0
        } else if r.x < 250.0 {
            1
        } else {
            2
        };
        assert_eq!(r.wire_id, expected, "dot at ({}, {})", r.x, r.y);
    }
}

#[test]
fn spurious_candidate_lines_do_not_break_the_match() {
    let (_, mut lines) = five_wire_frame();
    // A stray grouping far from the phantom and one close but misspaced.
    lines.insert(0, horizontal_wire(400.0, 30.0, 3, 25.0, 2.0));
    lines.push(horizontal_wire(115.0, 120.0, 3, 40.0, 2.0));
    let dots = collect_dots(&lines);

    let mut matcher = matcher_from_config();
    let outcome = matcher.find_pattern(&dots, lines);

    assert!(outcome.dots_found);
    assert_eq!(outcome.pattern_id, Some(2));
    assert_eq!(outcome.results.len(), 15);
    assert!(outcome.results.iter().all(|r| (100.0..=300.0).contains(&r.y)));
}

#[test]
fn wire_shifted_beyond_bound_fails_the_pass() {
    let (_, mut lines) = five_wire_frame();
    // Displace the middle wire along its own direction by 4 mm; the
    // configured bound is 2 mm.
    lines[2] = horizontal_wire(100.0 + mm(20.0), 120.0 + mm(4.0), 3, 40.0, 1.0);
    let dots = collect_dots(&lines);

    let mut matcher = matcher_from_config();
    let outcome = matcher.find_pattern(&dots, lines);

    assert!(!outcome.dots_found);
    assert!(outcome.results.is_empty());
}

#[test]
fn repeated_passes_yield_identical_labelings() {
    let (dots, lines) = five_wire_frame();
    let mut matcher = matcher_from_config();
    let first = matcher.find_pattern(&dots, lines.clone());
    let second = matcher.find_pattern(&dots, lines);
    assert_eq!(first.pattern_id, second.pattern_id);
    assert_eq!(first.results, second.results);
}

#[test]
fn respacing_requires_parameter_refresh() {
    // The same pixel geometry stops matching when the spacing estimate
    // halves: 50 px between wires now means 5 mm, not 10 mm.
    let (dots, lines) = five_wire_frame();
    let mut matcher = matcher_from_config();

    let mut params = matcher.params().clone();
    params.approximate_spacing_mm_per_pixel = 0.1;
    matcher.set_params(params);

    let outcome = matcher.find_pattern(&dots, lines);
    assert!(!outcome.dots_found);
}

#[test]
fn configuration_loads_from_a_file() {
    let path = std::env::temp_dir().join("fid_labeler_e2e_config.json");
    std::fs::write(&path, serde_json::to_string_pretty(&phantom_config()).unwrap()).unwrap();

    let loaded = load_configuration(&path, 0.0, std::f64::consts::PI);
    std::fs::remove_file(&path).ok();

    let (params, library) = loaded.expect("file config loads");
    assert_eq!(library.len(), 2);
    assert_eq!(params.frame_size, [640, 480]);
}

#[test]
fn missing_configuration_file_reports_io_error() {
    let path = std::env::temp_dir().join("fid_labeler_does_not_exist.json");
    match load_configuration(&path, 0.0, std::f64::consts::PI) {
        Err(ConfigError::Io { .. }) => {}
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn empty_frame_fails_without_panicking() {
    let mut matcher = matcher_from_config();
    let outcome = matcher.find_pattern(&[], Vec::new());
    assert!(!outcome.dots_found);
    assert!(outcome.results.is_empty());
}
