//! Analysis definitions and clinical interpretation types
//!
//! An analysis bundles landmarks with reference norms and an interpretation
//! function that turns fully evaluated values into categorized clinical
//! findings. Findings come from a closed enumeration, never extended at
//! runtime.

use serde::Serialize;
use std::collections::HashMap;

use super::geometry::{EvaluatedValue, GeoObject};
use super::landmark::{Landmark, Symbol};

/// Mapping of symbol to evaluated value; missing keys are unresolved steps
pub type ValueMap = HashMap<Symbol, EvaluatedValue>;

/// Mapping of symbol to mapped geometry, usable for rendering
pub type ObjectMap = HashMap<Symbol, GeoObject>;

/// A closed set of clinical findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisResult {
    // Skeletal pattern
    ClassISkeletalPattern,
    ClassIISkeletalPattern,
    ClassIIISkeletalPattern,

    // Maxilla
    PrognathicMaxilla,
    RetrognathicMaxilla,
    /// Neither prognathic nor retrognathic
    NormalMaxilla,

    // Mandible
    PrognathicMandible,
    RetrognathicMandible,
    /// Neither prognathic nor retrognathic
    NormalMandible,
}

impl AnalysisResult {
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisResult::ClassISkeletalPattern => "Class I skeletal pattern",
            AnalysisResult::ClassIISkeletalPattern => "Class II skeletal pattern",
            AnalysisResult::ClassIIISkeletalPattern => "Class III skeletal pattern",
            AnalysisResult::PrognathicMaxilla => "Prognathic maxilla",
            AnalysisResult::RetrognathicMaxilla => "Retrognathic maxilla",
            AnalysisResult::NormalMaxilla => "Normal maxilla",
            AnalysisResult::PrognathicMandible => "Prognathic mandible",
            AnalysisResult::RetrognathicMandible => "Retrognathic mandible",
            AnalysisResult::NormalMandible => "Normal mandible",
        }
    }
}

/// The clinical question a finding answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCategory {
    SkeletalPattern,
    Maxilla,
    Mandible,
}

impl ResultCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ResultCategory::SkeletalPattern => "Skeletal pattern",
            ResultCategory::Maxilla => "Maxilla",
            ResultCategory::Mandible => "Mandible",
        }
    }
}

/// A single categorized clinical finding with the measurement that drove it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorizedResult {
    pub category: ResultCategory,
    pub finding: AnalysisResult,
    /// The symbols whose evaluated values support this finding
    pub relevant: Vec<Symbol>,
    /// The driving measurement, when a single number applies
    pub value: Option<f64>,
}

/// Interpretation over the evaluated values and mapped geometry of one
/// analysis run. Must tolerate partially-populated maps: a finding whose
/// inputs are missing is simply omitted, never an error.
pub type InterpretFn = fn(&ValueMap, &ObjectMap) -> Vec<CategorizedResult>;

/// A landmark paired with its clinical reference norm
#[derive(Debug, Clone)]
pub struct AnalysisComponent {
    pub landmark: Landmark,
    pub norm: f64,
    pub std_dev: Option<f64>,
}

impl AnalysisComponent {
    pub fn new(landmark: Landmark, norm: f64, std_dev: Option<f64>) -> Self {
        Self {
            landmark,
            norm,
            std_dev,
        }
    }

    /// Upper bound of the normal range (norm + one standard deviation)
    pub fn max_normal(&self) -> f64 {
        self.norm + self.std_dev.unwrap_or(0.0)
    }

    /// Lower bound of the normal range (norm - one standard deviation)
    pub fn min_normal(&self) -> f64 {
        self.norm - self.std_dev.unwrap_or(0.0)
    }
}

/// A named bundle of landmark components plus interpretation logic
#[derive(Debug, Clone)]
pub struct Analysis {
    pub id: &'static str,
    pub name: &'static str,
    pub components: Vec<AnalysisComponent>,
    pub interpret: InterpretFn,
}

impl Analysis {
    /// Runs this analysis' interpretation over the given value and object
    /// maps. Partial maps yield partial (possibly empty) result lists.
    pub fn interpret(&self, values: &ValueMap, objects: &ObjectMap) -> Vec<CategorizedResult> {
        (self.interpret)(values, objects)
    }

    /// Finds the reference component for a symbol, if this analysis
    /// declares one at the top level
    pub fn component(&self, symbol: &Symbol) -> Option<&AnalysisComponent> {
        self.components.iter().find(|c| &c.landmark.symbol == symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::landmark::point;

    fn empty_interpret(_: &ValueMap, _: &ObjectMap) -> Vec<CategorizedResult> {
        Vec::new()
    }

    #[test]
    fn normal_range_uses_std_dev() {
        let c = AnalysisComponent::new(point("N", "", ""), 82.0, Some(2.0));
        assert_eq!(c.min_normal(), 80.0);
        assert_eq!(c.max_normal(), 84.0);
    }

    #[test]
    fn normal_range_without_std_dev_is_the_norm() {
        let c = AnalysisComponent::new(point("N", "", ""), 82.0, None);
        assert_eq!(c.min_normal(), 82.0);
        assert_eq!(c.max_normal(), 82.0);
    }

    #[test]
    fn component_lookup_by_symbol() {
        let analysis = Analysis {
            id: "test",
            name: "Test",
            components: vec![AnalysisComponent::new(point("N", "", ""), 0.0, None)],
            interpret: empty_interpret,
        };

        assert!(analysis.component(&Symbol::from("N")).is_some());
        assert!(analysis.component(&Symbol::from("S")).is_none());
    }
}
