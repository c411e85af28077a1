//! Angle construction
//!
//! Turns two placed or derived vectors into the concrete geometry needed to
//! render and measure the angle between them, even when the vectors do not
//! intersect within their own segments. Precedence:
//!
//! 1. parallel carrying lines: no construction (terminal, not an error)
//! 2. intersection inside both segments: no extension, arc clipped to the
//!    triangle of the intersection and the far endpoints
//! 3. intersection inside exactly one segment: extend only the other vector
//! 4. intersection inside the bounding rectangle: extend both vectors
//! 5. intersection outside the bounds:
//!    - strictly closer to one vector: construction suppressed (the
//!      symmetric parallel construction is a known gap, see below)
//!    - otherwise: a line parallel to the first vector through the second
//!      vector's near endpoint, measured against instead of the original
//!
//! The "parallel to the far vector" half of case 5 is intentionally left
//! unimplemented to match the behavior the rest of the pipeline expects;
//! callers treat the suppressed construction exactly like the parallel
//! case.

use log::debug;

use crate::domain::{
    angle_between, intersection, is_point_closer_to, is_point_in_segment, GeoPoint, GeoVector,
    Rect, EPSILON,
};

/// Radius of the auxiliary angle arc, in pixels
pub const ARC_RADIUS: f64 = 45.0;

/// The circular arc marking the measured angle, clipped to a triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcClip {
    /// Arc center: the intersection point of the two (possibly extended)
    /// vectors
    pub center: GeoPoint,
    /// Clip triangle: a far endpoint, the intersection, a far endpoint
    pub triangle: [GeoPoint; 3],
    pub radius: f64,
}

/// How the original segments were altered to make the angle visible
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extension {
    /// Intersection inside both segments
    None,
    /// Only the first vector extended to the intersection
    First(GeoVector),
    /// Only the second vector extended to the intersection
    Second(GeoVector),
    /// Both vectors extended to the intersection
    Both(GeoVector, GeoVector),
    /// A line parallel to the first vector, through the second vector's
    /// near endpoint; the angle is measured against this line
    ParallelToFirst(GeoVector),
}

/// Complete construction output for one vector pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleConstruction {
    pub vectors: (GeoVector, GeoVector),
    /// Intersection of the carrying lines used for measurement
    pub intersection: GeoPoint,
    pub extension: Extension,
    pub arc: Option<ArcClip>,
    /// Signed angle in degrees, measured between the effective vectors
    pub degrees: f64,
}

/// Extends `v` from its endpoint away from `target` up to `target`,
/// mirroring per-coordinate endpoint matching
fn extend_to(v: &GeoVector, target: &GeoPoint) -> GeoVector {
    GeoVector {
        x1: if (v.x1 - target.x).abs() < EPSILON {
            v.x2
        } else {
            v.x1
        },
        y1: if (v.y1 - target.y).abs() < EPSILON {
            v.y2
        } else {
            v.y1
        },
        x2: target.x,
        y2: target.y,
    }
}

/// Arc clipped to the triangle formed by the intersection of the two
/// vectors and their endpoints not equal to it
fn arc_for(v1: &GeoVector, v2: &GeoVector) -> Option<ArcClip> {
    let center = intersection(v1, v2)?;
    let endpoints = [v1.start(), v1.end(), v2.start(), v2.end()];
    let mut far = endpoints.iter().filter(|p| !p.approx_eq(&center));
    let p1 = far.next()?;
    let p2 = far.next()?;
    Some(ArcClip {
        center,
        triangle: [*p1, center, *p2],
        radius: ARC_RADIUS,
    })
}

/// Constructs the renderable/measurable angle between two vectors
///
/// Returns `None` when the construction is undefined: parallel carrying
/// lines, or the documented unimplemented far-intersection branch. The
/// caller suppresses angle rendering and measurement for this pair and
/// carries on with unrelated steps.
pub fn construct_angle(
    v1: &GeoVector,
    v2: &GeoVector,
    bounds: &Rect,
) -> Option<AngleConstruction> {
    let i = match intersection(v1, v2) {
        Some(i) => i,
        None => {
            debug!("vectors are parallel, suppressing angle construction");
            return None;
        }
    };

    let in1 = is_point_in_segment(&i, v1);
    let in2 = is_point_in_segment(&i, v2);

    if in1 && in2 {
        return Some(AngleConstruction {
            vectors: (*v1, *v2),
            intersection: i,
            extension: Extension::None,
            arc: arc_for(v1, v2),
            degrees: angle_between(v1, v2),
        });
    }

    if in1 {
        return Some(AngleConstruction {
            vectors: (*v1, *v2),
            intersection: i,
            extension: Extension::Second(extend_to(v2, &i)),
            arc: arc_for(v1, v2),
            degrees: angle_between(v1, v2),
        });
    }

    if in2 {
        return Some(AngleConstruction {
            vectors: (*v1, *v2),
            intersection: i,
            extension: Extension::First(extend_to(v1, &i)),
            arc: arc_for(v1, v2),
            degrees: angle_between(v1, v2),
        });
    }

    if bounds.contains(&i) {
        return Some(AngleConstruction {
            vectors: (*v1, *v2),
            intersection: i,
            extension: Extension::Both(extend_to(v1, &i), extend_to(v2, &i)),
            arc: arc_for(v1, v2),
            degrees: angle_between(v1, v2),
        });
    }

    if is_point_closer_to(&i, v1, v2) {
        // Parallel construction on the far vector is not implemented;
        // suppress like the parallel case.
        debug!("intersection outside bounds and closer to the first vector, suppressing");
        return None;
    }

    // Build a parallel to the first vector through the second vector's
    // near endpoint, via slope/intercept algebra. A vertical first vector
    // has no finite slope; that construction is degenerate here.
    if v1.is_vertical() {
        debug!("first vector is vertical, parallel construction is degenerate");
        return None;
    }
    let slope = v1.slope();
    let intercept = v2.y1 - slope * v2.x1;
    let parallel = GeoVector {
        x1: v2.x1,
        y1: v2.y1,
        x2: v2.x2,
        y2: slope * v2.x2 + intercept,
    };

    Some(AngleConstruction {
        vectors: (*v1, *v2),
        intersection: i,
        extension: Extension::ParallelToFirst(parallel),
        arc: arc_for(&parallel, v2),
        degrees: angle_between(&parallel, v2),
    })
}
