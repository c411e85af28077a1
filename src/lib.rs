//! Cephalo - Cephalometric landmark evaluation engine
//!
//! Cephalo evaluates manually placed cephalometric landmarks against
//! clinical analyses (Steiner, Downs). An analysis is a set of measured
//! landmarks with clinical norms; each landmark is a small dependency tree
//! of points, lines, angles and distances. The engine flattens that tree
//! into an ordered step list, resolves each step from a versioned snapshot
//! of manual placements, and interprets the resolved measurements into
//! categorized clinical findings.

pub mod analyses;
pub mod cli;
pub mod domain;
pub mod engine;
pub mod worker;

pub use domain::{Analysis, GeoObject, GeoPoint, GeoVector, Landmark, LandmarkKind, Symbol, Unit};
pub use engine::{Engine, Evaluation, ManualLandmarks, Step, StepState};
