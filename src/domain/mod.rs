//! Domain models for the landmark evaluation engine
//!
//! Contains the landmark schema, geometry primitives, analysis
//! definitions and the landmark dependency DAG, without any I/O concerns.

mod analysis;
mod geometry;
mod graph;
mod landmark;

pub use analysis::{
    Analysis, AnalysisComponent, AnalysisResult, CategorizedResult, InterpretFn, ObjectMap,
    ResultCategory, ValueMap,
};
pub use geometry::{
    angle_between, intersection, is_point_closer_to, is_point_in_segment, point_segment_distance,
    EvaluatedValue, GeoObject, GeoPoint, GeoVector, Rect, EPSILON,
};
pub use graph::{GraphError, LandmarkGraph};
pub use landmark::{
    angle_between_lines, angle_between_points, computed_angle, distance, line, point, CalcFn,
    Landmark, LandmarkKind, Symbol, Unit,
};
