//! # Evaluation Engine
//!
//! Ties the pieces together for one active analysis:
//!
//! | Stage | Module | Purpose |
//! |-------|--------|---------|
//! | Flattening | [`steps`] | Analysis definition → ordered step set |
//! | Resolution | [`resolve`] | Snapshot + steps → states and values |
//! | Construction | [`construct`] | Vector pair → renderable angle geometry |
//! | Snapshot | [`snapshot`] | Versioned manual-placement input |
//!
//! [`Engine`] owns the flattened steps and the validated landmark DAG for
//! one analysis, and memoizes whole evaluations against the snapshot
//! identity and version plus the skip set. Every evaluation is a pure
//! recomputation; nothing here blocks or suspends.

mod construct;
mod resolve;
mod snapshot;
mod steps;

pub use construct::{construct_angle, AngleConstruction, ArcClip, Extension, ARC_RADIUS};
pub use resolve::Resolver;
pub use snapshot::{ManualLandmark, ManualLandmarks, ManualValue};
pub use steps::{dedupe_steps, find_step_by_symbol, steps_for_analysis, Step, StepState};

use log::debug;
use serde::Serialize;
use std::collections::HashSet;

use crate::domain::{
    Analysis, CategorizedResult, GraphError, LandmarkGraph, ObjectMap, Symbol, Unit, ValueMap,
};

/// One step in the engine's output, with its derived lifecycle state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub symbol: Symbol,
    pub title: String,
    pub state: StepState,
    pub unit: Option<Unit>,
}

/// The complete output of one evaluation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Ordered steps with per-step state, in flattening order
    pub steps: Vec<StepReport>,
    /// Resolved values; unresolved symbols are absent
    pub values: ValueMap,
    /// Mapped geometry for rendering
    pub objects: ObjectMap,
    /// Categorized clinical findings, possibly partial
    pub results: Vec<CategorizedResult>,
}

impl Evaluation {
    /// Returns true when every step is resolved
    pub fn is_complete(&self) -> bool {
        self.steps.iter().all(|s| s.state == StepState::Done)
    }

    /// A scalar measurement in physical units: linear values are scaled by
    /// the pixel-to-unit factor, angular values pass through unchanged
    pub fn scaled_value(&self, symbol: &Symbol, scale_factor: f64) -> Option<f64> {
        let value = self.values.get(symbol)?.as_scalar()?;
        let unit = self
            .steps
            .iter()
            .find(|s| &s.symbol == symbol)
            .and_then(|s| s.unit);
        match unit {
            Some(u) if u.is_linear() => Some(value * scale_factor),
            _ => Some(value),
        }
    }
}

struct CachedEvaluation {
    /// Snapshot instance identity; versions alone alias across instances
    nonce: u64,
    version: u64,
    skipped: HashSet<Symbol>,
    evaluating: HashSet<Symbol>,
    evaluation: Evaluation,
}

/// The evaluation engine for one active analysis
///
/// Construction validates the landmark schema (acyclicity, consistent
/// definitions) once; evaluation is then infallible and memoized against
/// the snapshot version.
pub struct Engine {
    analysis: &'static Analysis,
    steps: Vec<Step>,
    all_steps: Vec<Step>,
    graph: LandmarkGraph,
    cache: Option<CachedEvaluation>,
}

impl Engine {
    /// Loads an analysis: flattens its steps and validates the landmark DAG
    pub fn new(analysis: &'static Analysis) -> Result<Self, GraphError> {
        let graph =
            LandmarkGraph::from_landmarks(analysis.components.iter().map(|c| &c.landmark))?;
        Ok(Self {
            analysis,
            steps: steps_for_analysis(analysis, true),
            all_steps: steps_for_analysis(analysis, false),
            graph,
            cache: None,
        })
    }

    pub fn analysis(&self) -> &'static Analysis {
        self.analysis
    }

    /// The deduplicated, ordered step set
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Every step occurrence, duplicates included
    pub fn all_steps(&self) -> &[Step] {
        &self.all_steps
    }

    /// The validated landmark dependency graph
    pub fn graph(&self) -> &LandmarkGraph {
        &self.graph
    }

    /// Evaluates the analysis against a snapshot and skip set
    ///
    /// Results are cached per (snapshot identity, snapshot version, skip
    /// set, evaluating set) and recomputed wholesale when any of them
    /// changes.
    pub fn evaluate(
        &mut self,
        manual: &ManualLandmarks,
        skipped: &HashSet<Symbol>,
        evaluating: &HashSet<Symbol>,
    ) -> &Evaluation {
        let fresh = match &self.cache {
            Some(c) => {
                c.nonce == manual.nonce()
                    && c.version == manual.version()
                    && &c.skipped == skipped
                    && &c.evaluating == evaluating
            }
            None => false,
        };

        if !fresh {
            debug!(
                "evaluating analysis '{}' at snapshot version {}",
                self.analysis.id,
                manual.version()
            );
            let resolver =
                Resolver::new(&self.steps, &self.all_steps, manual, skipped, evaluating);
            let states = resolver.step_states();
            let values = resolver.values();
            let objects = resolver.geo_objects();
            let results = self.analysis.interpret(&values, &objects);

            let steps = self
                .steps
                .iter()
                .map(|step| StepReport {
                    symbol: step.symbol().clone(),
                    title: step.title.clone(),
                    state: states
                        .get(step.symbol())
                        .copied()
                        .unwrap_or(StepState::Pending),
                    unit: step.landmark.unit,
                })
                .collect();

            self.cache = Some(CachedEvaluation {
                nonce: manual.nonce(),
                version: manual.version(),
                skipped: skipped.clone(),
                evaluating: evaluating.clone(),
                evaluation: Evaluation {
                    steps,
                    values,
                    objects,
                    results,
                },
            });
        }

        // The cache was just populated when it was stale
        &self
            .cache
            .as_ref()
            .expect("evaluation cache populated above")
            .evaluation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyses;
    use crate::domain::GeoPoint;

    fn place_steiner(manual: &mut ManualLandmarks) {
        manual.set("N", GeoPoint::new(0.0, 0.0));
        manual.set("S", GeoPoint::new(-100.0, 0.0));
        manual.set("A", GeoPoint::new(-20.9, -148.5));
        manual.set("B", GeoPoint::new(-34.7, -197.0));
    }

    #[test]
    fn engine_reports_ordered_steps() {
        let engine = Engine::new(analyses::get("steiner").unwrap()).unwrap();
        let symbols: Vec<&str> = engine.steps().iter().map(|s| s.symbol().as_str()).collect();

        // Deterministic flattening order, points first
        assert_eq!(symbols[0], "N");
        assert!(symbols.contains(&"SNA"));
        assert!(symbols.contains(&"ANB"));
    }

    #[test]
    fn evaluation_is_cached_per_snapshot_version() {
        let mut engine = Engine::new(analyses::get("steiner").unwrap()).unwrap();
        let mut manual = ManualLandmarks::new();
        let skipped = HashSet::new();
        let evaluating = HashSet::new();

        place_steiner(&mut manual);
        let first = engine.evaluate(&manual, &skipped, &evaluating).clone();
        let second = engine.evaluate(&manual, &skipped, &evaluating).clone();
        assert_eq!(first, second);

        // Mutating the snapshot invalidates the cache and changes output
        manual.remove(&crate::domain::Symbol::from("B"));
        let third = engine.evaluate(&manual, &skipped, &evaluating);
        assert!(!third.values.contains_key(&crate::domain::Symbol::from("SNB")));
    }

    #[test]
    fn distinct_snapshots_never_share_a_cache_entry() {
        let mut engine = Engine::new(analyses::get("steiner").unwrap()).unwrap();
        let skipped = HashSet::new();
        let evaluating = HashSet::new();

        // Two deserialized snapshots both carry version 0
        let complete: ManualLandmarks = serde_json::from_str(
            r#"{
                "N": {"x": 0.0, "y": 0.0},
                "S": {"x": -100.0, "y": 0.0},
                "A": {"x": -20.9, "y": -148.5},
                "B": {"x": -34.7, "y": -197.0}
            }"#,
        )
        .unwrap();
        let empty: ManualLandmarks = serde_json::from_str("{}").unwrap();
        assert_eq!(complete.version(), empty.version());

        let first = engine.evaluate(&complete, &skipped, &evaluating).clone();
        assert!(first.is_complete());

        // The second snapshot must be evaluated on its own merits, not
        // answered from the first snapshot's cache entry
        let second = engine.evaluate(&empty, &skipped, &evaluating);
        assert!(second.values.is_empty());
        assert!(!second.is_complete());
    }

    #[test]
    fn skip_set_change_invalidates_cache() {
        let mut engine = Engine::new(analyses::get("steiner").unwrap()).unwrap();
        let manual = ManualLandmarks::new();
        let evaluating = HashSet::new();

        let no_skips = HashSet::new();
        let n_current = engine
            .evaluate(&manual, &no_skips, &evaluating)
            .steps
            .iter()
            .find(|s| s.symbol.as_str() == "N")
            .unwrap()
            .state;
        assert_eq!(n_current, StepState::Current);

        let mut skips = HashSet::new();
        skips.insert(Symbol::from("N"));
        let n_skipped = engine
            .evaluate(&manual, &skips, &evaluating)
            .steps
            .iter()
            .find(|s| s.symbol.as_str() == "N")
            .unwrap()
            .state;
        assert_eq!(n_skipped, StepState::Skipped);
    }

    #[test]
    fn scaled_values_convert_linear_measurements_only() {
        let mut engine = Engine::new(analyses::get("steiner").unwrap()).unwrap();
        let mut manual = ManualLandmarks::new();
        place_steiner(&mut manual);

        let skipped = HashSet::new();
        let evaluating = HashSet::new();
        let evaluation = engine.evaluate(&manual, &skipped, &evaluating).clone();

        // Angles are unaffected by the scale factor
        let sna = Symbol::from("SNA");
        assert_eq!(
            evaluation.scaled_value(&sna, 0.5),
            evaluation.values[&sna].as_scalar()
        );

        // Lines are linear: length reporting would scale, and the mapped
        // vector itself stays in pixel space
        let ns = Symbol::from("N-S");
        assert!(evaluation.objects.contains_key(&ns));
        assert_eq!(evaluation.scaled_value(&ns, 0.5), None); // not a scalar
    }

    #[test]
    fn incomplete_evaluation_is_not_complete() {
        let mut engine = Engine::new(analyses::get("steiner").unwrap()).unwrap();
        let mut manual = ManualLandmarks::new();
        manual.set("N", GeoPoint::new(0.0, 0.0));

        let skipped = HashSet::new();
        let evaluating = HashSet::new();
        assert!(!engine.evaluate(&manual, &skipped, &evaluating).is_complete());

        place_steiner(&mut manual);
        assert!(engine.evaluate(&manual, &skipped, &evaluating).is_complete());
    }
}
