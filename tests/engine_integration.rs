//! Engine integration tests
//!
//! These tests exercise the full pipeline through the public API:
//! registry lookup, step flattening, progressive landmark placement,
//! resolution, and clinical interpretation.

use proptest::prelude::*;
use std::collections::HashSet;

use cephalo::analyses;
use cephalo::domain::{GeoPoint, ResultCategory, Symbol};
use cephalo::{Engine, ManualLandmarks, StepState};

fn steiner_engine() -> Engine {
    Engine::new(analyses::get("steiner").unwrap()).unwrap()
}

fn class_i_snapshot() -> ManualLandmarks {
    let mut manual = ManualLandmarks::new();
    manual.set("N", GeoPoint::new(0.0, 0.0));
    manual.set("S", GeoPoint::new(-100.0, 0.0));
    manual.set("A", GeoPoint::new(-20.9, -148.5));
    manual.set("B", GeoPoint::new(-34.7, -197.0));
    manual
}

#[test]
fn progressive_placement_walks_the_step_list() {
    let mut engine = steiner_engine();
    let mut manual = ManualLandmarks::new();
    let skipped = HashSet::new();
    let evaluating = HashSet::new();

    // With nothing placed, the first point is current
    let evaluation = engine.evaluate(&manual, &skipped, &evaluating);
    let current: Vec<&str> = evaluation
        .steps
        .iter()
        .filter(|s| s.state == StepState::Current)
        .map(|s| s.symbol.as_str())
        .collect();
    assert_eq!(current, vec!["N"]);

    // Placing it advances `current` to the next manual step
    manual.set("N", GeoPoint::new(0.0, 0.0));
    let evaluation = engine.evaluate(&manual, &skipped, &evaluating);
    let current: Vec<&str> = evaluation
        .steps
        .iter()
        .filter(|s| s.state == StepState::Current)
        .map(|s| s.symbol.as_str())
        .collect();
    assert_eq!(current, vec!["S"]);
}

#[test]
fn complete_snapshot_yields_class_i_finding() {
    let mut engine = steiner_engine();
    let manual = class_i_snapshot();
    let skipped = HashSet::new();
    let evaluating = HashSet::new();

    let evaluation = engine.evaluate(&manual, &skipped, &evaluating);
    assert!(evaluation.is_complete());

    let skeletal = evaluation
        .results
        .iter()
        .find(|r| r.category == ResultCategory::SkeletalPattern)
        .unwrap();
    assert_eq!(skeletal.finding.label(), "Class I skeletal pattern");
    assert!(skeletal.relevant.contains(&Symbol::from("ANB")));
}

#[test]
fn findings_track_measurement_changes() {
    let mut engine = steiner_engine();
    let mut manual = class_i_snapshot();
    let skipped = HashSet::new();
    let evaluating = HashSet::new();

    // Retrude B sharply: ANB grows past the Class II threshold
    manual.set("B", GeoPoint::new(-80.0, -197.0));
    let evaluation = engine.evaluate(&manual, &skipped, &evaluating);

    let skeletal = evaluation
        .results
        .iter()
        .find(|r| r.category == ResultCategory::SkeletalPattern)
        .unwrap();
    assert_eq!(skeletal.finding.label(), "Class II skeletal pattern");
}

#[test]
fn every_result_references_resolved_symbols() {
    let mut engine = steiner_engine();
    let manual = class_i_snapshot();
    let skipped = HashSet::new();
    let evaluating = HashSet::new();

    let evaluation = engine.evaluate(&manual, &skipped, &evaluating);
    for result in &evaluation.results {
        for symbol in &result.relevant {
            assert!(
                evaluation.values.contains_key(symbol),
                "{} referenced but unresolved",
                symbol
            );
        }
    }
}

#[test]
fn downs_analysis_runs_end_to_end() {
    let mut engine = Engine::new(analyses::get("downs").unwrap()).unwrap();
    let mut manual = ManualLandmarks::new();
    manual.set("Po", GeoPoint::new(-180.0, -20.0));
    manual.set("Or", GeoPoint::new(-20.0, -30.0));
    manual.set("N", GeoPoint::new(0.0, 0.0));
    manual.set("Pog", GeoPoint::new(-45.0, -210.0));
    manual.set("A", GeoPoint::new(-20.9, -148.5));

    let skipped = HashSet::new();
    let evaluating = HashSet::new();
    let evaluation = engine.evaluate(&manual, &skipped, &evaluating);

    assert!(evaluation.is_complete());
    assert!(!evaluation.results.is_empty());
}

#[test]
fn skipping_a_point_blocks_its_dependents_only() {
    let mut engine = steiner_engine();
    let mut manual = class_i_snapshot();
    manual.remove(&Symbol::from("B"));

    let mut skipped = HashSet::new();
    skipped.insert(Symbol::from("B"));
    let evaluating = HashSet::new();

    let evaluation = engine.evaluate(&manual, &skipped, &evaluating);
    let state = |sym: &str| {
        evaluation
            .steps
            .iter()
            .find(|s| s.symbol.as_str() == sym)
            .unwrap()
            .state
    };

    assert_eq!(state("B"), StepState::Skipped);
    assert_eq!(state("SNB"), StepState::Pending);
    assert_eq!(state("ANB"), StepState::Pending);
    // The unrelated branch still resolves
    assert_eq!(state("SNA"), StepState::Done);
}

#[test]
fn unknown_analysis_is_rejected_before_engine_construction() {
    assert!(analyses::get("bjork_jarabak").is_err());
    assert!(matches!(analyses::resolve_selection(None), Ok(None)));
}

// =============================================================================
// Properties
// =============================================================================

/// Placements at arbitrary coordinates
fn arb_point() -> impl Strategy<Value = GeoPoint> {
    (-1000.0f64..1000.0, -1000.0f64..1000.0).prop_map(|(x, y)| GeoPoint::new(x, y))
}

proptest! {
    /// Adding a placement never unresolves a previously resolved step
    #[test]
    fn placement_is_monotonic(n in arb_point(), s in arb_point(), a in arb_point()) {
        let mut engine = steiner_engine();
        let mut manual = ManualLandmarks::new();
        let skipped = HashSet::new();
        let evaluating = HashSet::new();

        manual.set("N", n);
        manual.set("S", s);
        let before: Vec<Symbol> = engine
            .evaluate(&manual, &skipped, &evaluating)
            .values
            .keys()
            .cloned()
            .collect();

        manual.set("A", a);
        let after = engine.evaluate(&manual, &skipped, &evaluating);
        for symbol in before {
            prop_assert!(after.values.contains_key(&symbol));
        }
    }

    /// A step is done exactly when its value is defined
    #[test]
    fn done_iff_value_defined(n in arb_point(), s in arb_point()) {
        let mut engine = steiner_engine();
        let mut manual = ManualLandmarks::new();
        manual.set("N", n);
        manual.set("S", s);

        let skipped = HashSet::new();
        let evaluating = HashSet::new();
        let evaluation = engine.evaluate(&manual, &skipped, &evaluating);

        for step in &evaluation.steps {
            let defined = evaluation.values.contains_key(&step.symbol);
            prop_assert_eq!(defined, step.state == StepState::Done);
        }
    }

    /// Flattening is deterministic across engine instances
    #[test]
    fn step_order_is_stable(_seed in 0u8..8) {
        let first: Vec<String> = steiner_engine()
            .steps()
            .iter()
            .map(|s| s.symbol().to_string())
            .collect();
        let second: Vec<String> = steiner_engine()
            .steps()
            .iter()
            .map(|s| s.symbol().to_string())
            .collect();
        prop_assert_eq!(first, second);
    }
}
