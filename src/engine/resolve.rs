//! Resolution engine
//!
//! A pure function from (step set, manual snapshot, skip set) to per-step
//! lifecycle states and evaluated values. Resolution order per step:
//!
//! 1. direct manual mapping, including delegation through a structurally
//!    equal step whose manual placement already exists
//! 2. recursive computation from the step's own components
//! 3. otherwise unresolved: the value is absent and absence propagates
//!    silently up the dependency chain
//!
//! Per-symbol results are memoized for the lifetime of one resolver, which
//! is tied to a single snapshot (see [`crate::engine::Engine`] for the
//! snapshot-version cache built on top).

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::domain::{
    angle_between, EvaluatedValue, GeoObject, GeoVector, Landmark, LandmarkKind, ObjectMap,
    Symbol, ValueMap,
};

use super::snapshot::ManualLandmarks;
use super::steps::{Step, StepState};

/// One resolution pass over a fixed snapshot
pub struct Resolver<'a> {
    /// Deduplicated, ordered steps (drives step numbering and `current`)
    steps: &'a [Step],
    /// Every occurrence including duplicates (drives equivalence search)
    all_steps: &'a [Step],
    manual: &'a ManualLandmarks,
    skipped: &'a HashSet<Symbol>,
    /// Symbols the host is evaluating asynchronously right now
    evaluating: &'a HashSet<Symbol>,
    cache: RefCell<HashMap<Symbol, Option<EvaluatedValue>>>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        steps: &'a [Step],
        all_steps: &'a [Step],
        manual: &'a ManualLandmarks,
        skipped: &'a HashSet<Symbol>,
        evaluating: &'a HashSet<Symbol>,
    ) -> Self {
        Self {
            steps,
            all_steps,
            manual,
            skipped,
            evaluating,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Steps structurally equal to `landmark` under a different symbol
    fn equal_steps(&self, landmark: &Landmark) -> Vec<&Landmark> {
        let mut seen: HashSet<&Symbol> = HashSet::new();
        self.all_steps
            .iter()
            .map(|s| &s.landmark)
            .filter(|other| {
                other.symbol != landmark.symbol
                    && seen.insert(&other.symbol)
                    && other.is_structurally_equal(landmark)
            })
            .collect()
    }

    /// Manual placement for a landmark, going through structurally equal
    /// steps when the landmark's own symbol has no placement
    fn mapped_value(&self, landmark: &Landmark) -> Option<EvaluatedValue> {
        if let Some(value) = self.manual.value(&landmark.symbol) {
            return Some(value);
        }
        self.equal_steps(landmark)
            .into_iter()
            .find_map(|eq| self.manual.value(&eq.symbol))
    }

    /// Evaluates one landmark against the snapshot, memoized per symbol
    pub fn evaluate(&self, landmark: &Landmark) -> Option<EvaluatedValue> {
        if let Some(cached) = self.cache.borrow().get(&landmark.symbol) {
            return *cached;
        }
        let value = self.evaluate_uncached(landmark);
        self.cache
            .borrow_mut()
            .insert(landmark.symbol.clone(), value);
        value
    }

    fn evaluate_uncached(&self, landmark: &Landmark) -> Option<EvaluatedValue> {
        if let Some(value) = self.mapped_value(landmark) {
            return Some(value);
        }

        if let Some(calculate) = landmark.calculate {
            let mut args = Vec::with_capacity(landmark.components.len());
            for component in &landmark.components {
                args.push(self.evaluate(component)?.as_scalar()?);
            }
            return Some(calculate(&args).into());
        }

        match landmark.kind {
            // A primitive point only ever comes from manual placement
            LandmarkKind::Point => None,
            LandmarkKind::Line => {
                let start = self.component_point(landmark, 0)?;
                let end = self.component_point(landmark, 1)?;
                Some(GeoObject::Vector(GeoVector::from_points(start, end)).into())
            }
            LandmarkKind::Distance => {
                let start = self.component_point(landmark, 0)?;
                let end = self.component_point(landmark, 1)?;
                // Pixel length; physical units are the caller's concern
                Some(start.distance_to(&end).into())
            }
            LandmarkKind::Angle => {
                let first = self.component_vector(landmark, 0)?;
                let second = self.component_vector(landmark, 1)?;
                Some(angle_between(&first, &second).into())
            }
        }
    }

    fn component_point(&self, landmark: &Landmark, index: usize) -> Option<crate::domain::GeoPoint> {
        self.evaluate(landmark.components.get(index)?)?.as_point()
    }

    fn component_vector(&self, landmark: &Landmark, index: usize) -> Option<GeoVector> {
        self.evaluate(landmark.components.get(index)?)?.as_vector()
    }

    /// The next step expecting direct manual input: the first manual step,
    /// in flattening order, that is neither skipped nor already resolved
    /// (directly or through an equivalent placement)
    pub fn next_manual_step(&self) -> Option<&Step> {
        self.steps.iter().find(|step| {
            step.landmark.is_manual()
                && !self.skipped.contains(step.symbol())
                && self.evaluate(&step.landmark).is_none()
        })
    }

    /// Derives the lifecycle state of every step
    ///
    /// Precedence, first match wins: `current`, `done`, `evaluating`,
    /// `skipped`, `pending`. `done` holds exactly when the evaluated value
    /// is defined.
    pub fn step_states(&self) -> HashMap<Symbol, StepState> {
        let next = self.next_manual_step().map(|s| s.symbol().clone());

        self.steps
            .iter()
            .map(|step| {
                let symbol = step.symbol().clone();
                let state = if next.as_ref() == Some(&symbol) {
                    StepState::Current
                } else if self.evaluate(&step.landmark).is_some() {
                    StepState::Done
                } else if self.evaluating.contains(&symbol) {
                    StepState::Evaluating
                } else if self.skipped.contains(&symbol) {
                    StepState::Skipped
                } else {
                    StepState::Pending
                };
                (symbol, state)
            })
            .collect()
    }

    /// All resolved values keyed by symbol; unresolved steps are absent
    pub fn values(&self) -> ValueMap {
        self.steps
            .iter()
            .filter_map(|step| {
                self.evaluate(&step.landmark)
                    .map(|v| (step.symbol().clone(), v))
            })
            .collect()
    }

    /// Mapped geometry keyed by symbol, usable for rendering
    pub fn geo_objects(&self) -> ObjectMap {
        self.steps
            .iter()
            .filter_map(|step| {
                self.evaluate(&step.landmark)
                    .and_then(|v| v.as_object())
                    .map(|o| (step.symbol().clone(), o))
            })
            .collect()
    }
}
