//! Steiner analysis (sagittal skeletal relationship)
//!
//! SNA and SNB locate the maxilla and mandible against the anterior
//! cranial base; ANB is their difference and classifies the skeletal
//! pattern. ANB carries a custom calculation, so it resolves as soon as
//! both constituent angles do.

use crate::domain::{
    angle_between_points, computed_angle, point, Analysis, AnalysisComponent, AnalysisResult,
    CategorizedResult, ObjectMap, ResultCategory, Symbol, ValueMap,
};

const SNA_NORM: f64 = 82.0;
const SNA_DEV: f64 = 2.0;
const SNB_NORM: f64 = 80.0;
const SNB_DEV: f64 = 2.0;
const ANB_NORM: f64 = 2.0;
const ANB_DEV: f64 = 2.0;

pub fn analysis() -> Analysis {
    let s = point("S", "Sella", "Midpoint of the sella turcica");
    let n = point("N", "Nasion", "Most anterior point of the frontonasal suture");
    let a = point(
        "A",
        "Subspinale",
        "Deepest point on the anterior maxillary contour",
    );
    let b = point(
        "B",
        "Supramentale",
        "Deepest point on the anterior mandibular contour",
    );

    let sna = angle_between_points(&s, &n, &a, Some("SNA"), None);
    let snb = angle_between_points(&s, &n, &b, Some("SNB"), None);
    let anb = computed_angle(
        "ANB",
        "ANB",
        vec![sna.clone(), snb.clone()],
        |values| values[0] - values[1],
    );

    Analysis {
        id: "steiner",
        name: "Steiner",
        components: vec![
            AnalysisComponent::new(sna, SNA_NORM, Some(SNA_DEV)),
            AnalysisComponent::new(snb, SNB_NORM, Some(SNB_DEV)),
            AnalysisComponent::new(anb, ANB_NORM, Some(ANB_DEV)),
        ],
        interpret,
    }
}

fn scalar(values: &ValueMap, symbol: &str) -> Option<f64> {
    values.get(&Symbol::from(symbol))?.as_scalar()
}

fn interpret(values: &ValueMap, _objects: &ObjectMap) -> Vec<CategorizedResult> {
    let mut results = Vec::new();

    if let Some(anb) = scalar(values, "ANB") {
        let finding = if anb > ANB_NORM + ANB_DEV {
            AnalysisResult::ClassIISkeletalPattern
        } else if anb < ANB_NORM - ANB_DEV {
            AnalysisResult::ClassIIISkeletalPattern
        } else {
            AnalysisResult::ClassISkeletalPattern
        };
        results.push(CategorizedResult {
            category: ResultCategory::SkeletalPattern,
            finding,
            relevant: vec![Symbol::from("ANB")],
            value: Some(anb),
        });
    }

    if let Some(sna) = scalar(values, "SNA") {
        let sna = sna.abs();
        let finding = if sna > SNA_NORM + SNA_DEV {
            AnalysisResult::PrognathicMaxilla
        } else if sna < SNA_NORM - SNA_DEV {
            AnalysisResult::RetrognathicMaxilla
        } else {
            AnalysisResult::NormalMaxilla
        };
        results.push(CategorizedResult {
            category: ResultCategory::Maxilla,
            finding,
            relevant: vec![Symbol::from("SNA")],
            value: Some(sna),
        });
    }

    if let Some(snb) = scalar(values, "SNB") {
        let snb = snb.abs();
        let finding = if snb > SNB_NORM + SNB_DEV {
            AnalysisResult::PrognathicMandible
        } else if snb < SNB_NORM - SNB_DEV {
            AnalysisResult::RetrognathicMandible
        } else {
            AnalysisResult::NormalMandible
        };
        results.push(CategorizedResult {
            category: ResultCategory::Mandible,
            finding,
            relevant: vec![Symbol::from("SNB")],
            value: Some(snb),
        });
    }

    results
}
