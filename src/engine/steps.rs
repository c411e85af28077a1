//! Step flattening
//!
//! Expands an analysis' component trees into the ordered list of steps the
//! user works through. Expansion is a post-order depth-first walk
//! (components before the landmark built from them), so primitive points
//! come before the lines and angles that need them. The result is
//! deterministic for a given analysis, which UI step numbering depends on.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::domain::{Analysis, Landmark, Symbol};

/// Lifecycle state of a step within one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    /// Waiting on input, directly or through a dependency
    Pending,
    /// The next step expecting direct manual input
    Current,
    /// Fully resolved; an evaluated value is always available
    Done,
    /// Being evaluated asynchronously by the host
    Evaluating,
    /// Explicitly skipped by the user
    Skipped,
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepState::Pending => "pending",
            StepState::Current => "current",
            StepState::Done => "done",
            StepState::Evaluating => "evaluating",
            StepState::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// A landmark in the context of one analysis run
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub landmark: Landmark,
    pub title: String,
}

impl Step {
    pub fn new(landmark: Landmark) -> Self {
        let title = landmark.title();
        Self { landmark, title }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.landmark.symbol
    }
}

/// Post-order flattening of one landmark's component tree, the landmark
/// itself last
fn flatten_landmark(landmark: &Landmark, out: &mut Vec<Landmark>) {
    for component in &landmark.components {
        flatten_landmark(component, out);
    }
    out.push(landmark.clone());
}

/// Expands an analysis into its full ordered step sequence
///
/// With `dedupe`, each symbol appears once (first occurrence wins); without
/// it every occurrence is kept, which stages reasoning about occurrence
/// multiplicity (equivalence classes) rely on.
pub fn steps_for_analysis(analysis: &Analysis, dedupe: bool) -> Vec<Step> {
    let mut landmarks = Vec::new();
    for component in &analysis.components {
        flatten_landmark(&component.landmark, &mut landmarks);
    }

    let steps = landmarks.into_iter().map(Step::new).collect();
    if dedupe {
        dedupe_steps(steps)
    } else {
        steps
    }
}

/// Removes duplicate symbols, keeping the first occurrence; idempotent
pub fn dedupe_steps(steps: Vec<Step>) -> Vec<Step> {
    let mut seen: HashSet<Symbol> = HashSet::new();
    steps
        .into_iter()
        .filter(|step| seen.insert(step.symbol().clone()))
        .collect()
}

/// Finds a step by symbol, searching the duplicated sequence
pub fn find_step_by_symbol<'a>(steps: &'a [Step], symbol: &Symbol) -> Option<&'a Step> {
    steps.iter().find(|s| s.symbol() == symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        angle_between_points, computed_angle, point, Analysis, AnalysisComponent, CategorizedResult,
        ObjectMap, ValueMap,
    };

    fn no_interpret(_: &ValueMap, _: &ObjectMap) -> Vec<CategorizedResult> {
        Vec::new()
    }

    fn steiner_like() -> Analysis {
        let s = point("S", "Sella", "");
        let n = point("N", "Nasion", "");
        let a = point("A", "Point A", "");
        let b = point("B", "Point B", "");
        let sna = angle_between_points(&s, &n, &a, Some("SNA"), None);
        let snb = angle_between_points(&s, &n, &b, Some("SNB"), None);
        let anb = computed_angle("ANB", "ANB", vec![sna.clone(), snb.clone()], |v| v[0] - v[1]);

        Analysis {
            id: "test",
            name: "Test",
            components: vec![
                AnalysisComponent::new(sna, 82.0, Some(2.0)),
                AnalysisComponent::new(snb, 80.0, Some(2.0)),
                AnalysisComponent::new(anb, 2.0, Some(2.0)),
            ],
            interpret: no_interpret,
        }
    }

    fn symbols(steps: &[Step]) -> Vec<&str> {
        steps.iter().map(|s| s.symbol().as_str()).collect()
    }

    #[test]
    fn flattening_is_post_order() {
        let analysis = steiner_like();
        let steps = steps_for_analysis(&analysis, true);

        // Points before the lines built from them, lines before the angle.
        // Vertex lines start at N, so N precedes S in declaration order.
        assert_eq!(
            symbols(&steps),
            vec!["N", "S", "N-S", "A", "N-A", "SNA", "B", "N-B", "SNB", "ANB"]
        );
    }

    #[test]
    fn flattening_is_deterministic() {
        let analysis = steiner_like();
        let first = steps_for_analysis(&analysis, true);
        let second = steps_for_analysis(&analysis, true);
        assert_eq!(first, second);

        let first_all = steps_for_analysis(&analysis, false);
        let second_all = steps_for_analysis(&analysis, false);
        assert_eq!(first_all, second_all);
    }

    #[test]
    fn duplicates_are_kept_without_dedupe() {
        let analysis = steiner_like();
        let all = steps_for_analysis(&analysis, false);
        let deduped = steps_for_analysis(&analysis, true);

        // S occurs in the SNA and SNB expansions, and twice more inside
        // ANB's component copies of both angles
        assert!(all.len() > deduped.len());
        let s_count = all.iter().filter(|s| s.symbol().as_str() == "S").count();
        assert_eq!(s_count, 4);
    }

    #[test]
    fn dedupe_is_idempotent() {
        let analysis = steiner_like();
        let all = steps_for_analysis(&analysis, false);

        let once = dedupe_steps(all);
        let twice = dedupe_steps(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn dedupe_keeps_first_occurrence_order() {
        let analysis = steiner_like();
        let deduped = dedupe_steps(steps_for_analysis(&analysis, false));
        assert_eq!(deduped, steps_for_analysis(&analysis, true));
    }

    #[test]
    fn find_step_by_symbol_searches_duplicates() {
        let analysis = steiner_like();
        let all = steps_for_analysis(&analysis, false);

        assert!(find_step_by_symbol(&all, &Symbol::from("N-B")).is_some());
        assert!(find_step_by_symbol(&all, &Symbol::from("missing")).is_none());
    }

    #[test]
    fn step_titles_come_from_landmark_names() {
        let analysis = steiner_like();
        let steps = steps_for_analysis(&analysis, true);
        let s = find_step_by_symbol(&steps, &Symbol::from("S")).unwrap();
        assert_eq!(s.title, "Sella (S)");
    }
}
