//! Downs analysis (facial typology)
//!
//! Both measurements are plain geometric angles with no custom
//! calculation, exercising the line-based measurement path: the facial
//! angle relates the facial plane to Frankfort horizontal, and the angle
//! of convexity measures the profile at point A.

use crate::domain::{
    angle_between_lines, angle_between_points, line, point, Analysis, AnalysisComponent,
    AnalysisResult, CategorizedResult, ObjectMap, ResultCategory, Symbol, ValueMap,
};

const FACIAL_ANGLE_NORM: f64 = 87.8;
const FACIAL_ANGLE_DEV: f64 = 3.6;
const CONVEXITY_NORM: f64 = 0.0;
const CONVEXITY_DEV: f64 = 5.1;

pub fn analysis() -> Analysis {
    let po = point("Po", "Porion", "Most superior point of the external auditory meatus");
    let or = point("Or", "Orbitale", "Most inferior point of the orbital margin");
    let n = point("N", "Nasion", "Most anterior point of the frontonasal suture");
    let pog = point("Pog", "Pogonion", "Most anterior point of the chin");
    let a = point(
        "A",
        "Subspinale",
        "Deepest point on the anterior maxillary contour",
    );

    let fh = line(&po, &or, Some("Frankfort horizontal"), Some("FH"));
    let facial_plane = line(&n, &pog, Some("Facial plane"), Some("N-Pog"));

    let facial_angle =
        angle_between_lines(&fh, &facial_plane, Some("Facial angle"), Some("FH-NPog"));
    let convexity = angle_between_points(&n, &a, &pog, Some("Angle of convexity"), Some("NAPog"));

    Analysis {
        id: "downs",
        name: "Downs",
        components: vec![
            AnalysisComponent::new(facial_angle, FACIAL_ANGLE_NORM, Some(FACIAL_ANGLE_DEV)),
            AnalysisComponent::new(convexity, CONVEXITY_NORM, Some(CONVEXITY_DEV)),
        ],
        interpret,
    }
}

fn scalar(values: &ValueMap, symbol: &str) -> Option<f64> {
    values.get(&Symbol::from(symbol))?.as_scalar()
}

fn interpret(values: &ValueMap, _objects: &ObjectMap) -> Vec<CategorizedResult> {
    let mut results = Vec::new();

    if let Some(facial) = scalar(values, "FH-NPog") {
        let facial = facial.abs();
        let finding = if facial > FACIAL_ANGLE_NORM + FACIAL_ANGLE_DEV {
            AnalysisResult::PrognathicMandible
        } else if facial < FACIAL_ANGLE_NORM - FACIAL_ANGLE_DEV {
            AnalysisResult::RetrognathicMandible
        } else {
            AnalysisResult::NormalMandible
        };
        results.push(CategorizedResult {
            category: ResultCategory::Mandible,
            finding,
            relevant: vec![Symbol::from("FH-NPog")],
            value: Some(facial),
        });
    }

    if let Some(convexity) = scalar(values, "NAPog") {
        let finding = if convexity > CONVEXITY_NORM + CONVEXITY_DEV {
            AnalysisResult::ClassIISkeletalPattern
        } else if convexity < CONVEXITY_NORM - CONVEXITY_DEV {
            AnalysisResult::ClassIIISkeletalPattern
        } else {
            AnalysisResult::ClassISkeletalPattern
        };
        results.push(CategorizedResult {
            category: ResultCategory::SkeletalPattern,
            finding,
            relevant: vec![Symbol::from("NAPog")],
            value: Some(convexity),
        });
    }

    results
}
