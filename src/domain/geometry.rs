//! 2-D geometric primitives and the math behind angle construction
//!
//! All coordinates are in pixel space. Conversion to physical units
//! (millimeters, etc.) happens at the measurement boundary via a
//! caller-supplied scale factor, never here.

use serde::{Deserialize, Serialize};

/// Tolerance for coordinate comparisons and parallelism checks
pub const EPSILON: f64 = 1e-9;

/// A point in the 2-D pixel plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
}

impl GeoPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns true if both coordinates match within [`EPSILON`]
    pub fn approx_eq(&self, other: &GeoPoint) -> bool {
        (self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// A finite directed line segment in the 2-D pixel plane
///
/// The endpoints are ordered: `(x1, y1)` is the start and `(x2, y2)` the
/// end, which matters for direction-based angle measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoVector {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl GeoVector {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn from_points(start: GeoPoint, end: GeoPoint) -> Self {
        Self {
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
        }
    }

    pub fn start(&self) -> GeoPoint {
        GeoPoint::new(self.x1, self.y1)
    }

    pub fn end(&self) -> GeoPoint {
        GeoPoint::new(self.x2, self.y2)
    }

    pub fn dx(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn dy(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Segment length in pixels
    pub fn length(&self) -> f64 {
        self.dx().hypot(self.dy())
    }

    /// Direction of the vector in radians, via the two-argument arctangent
    pub fn direction(&self) -> f64 {
        self.dy().atan2(self.dx())
    }

    /// Slope of the carrying line; infinite for vertical segments
    pub fn slope(&self) -> f64 {
        self.dy() / self.dx()
    }

    /// Returns true if the carrying line is vertical (within [`EPSILON`])
    pub fn is_vertical(&self) -> bool {
        self.dx().abs() < EPSILON
    }
}

/// An axis-aligned bounding rectangle (the visible drawing area)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn contains(&self, p: &GeoPoint) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }
}

/// A geometric object produced by mapping a landmark onto the image
///
/// Serialized untagged so snapshot files can write `{"x": .., "y": ..}`
/// for points and `{"x1": .., ..}` for lines directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeoObject {
    Point(GeoPoint),
    Vector(GeoVector),
}

impl GeoObject {
    pub fn as_point(&self) -> Option<GeoPoint> {
        match self {
            GeoObject::Point(p) => Some(*p),
            GeoObject::Vector(_) => None,
        }
    }

    pub fn as_vector(&self) -> Option<GeoVector> {
        match self {
            GeoObject::Vector(v) => Some(*v),
            GeoObject::Point(_) => None,
        }
    }
}

impl From<GeoPoint> for GeoObject {
    fn from(p: GeoPoint) -> Self {
        GeoObject::Point(p)
    }
}

impl From<GeoVector> for GeoObject {
    fn from(v: GeoVector) -> Self {
        GeoObject::Vector(v)
    }
}

/// The unified result type flowing out of the resolution engine:
/// geometry for points and lines, plain numbers for angles and distances
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EvaluatedValue {
    Object(GeoObject),
    Scalar(f64),
}

impl EvaluatedValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            EvaluatedValue::Scalar(n) => Some(*n),
            EvaluatedValue::Object(_) => None,
        }
    }

    pub fn as_point(&self) -> Option<GeoPoint> {
        match self {
            EvaluatedValue::Object(o) => o.as_point(),
            EvaluatedValue::Scalar(_) => None,
        }
    }

    pub fn as_vector(&self) -> Option<GeoVector> {
        match self {
            EvaluatedValue::Object(o) => o.as_vector(),
            EvaluatedValue::Scalar(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<GeoObject> {
        match self {
            EvaluatedValue::Object(o) => Some(*o),
            EvaluatedValue::Scalar(_) => None,
        }
    }
}

impl From<GeoObject> for EvaluatedValue {
    fn from(o: GeoObject) -> Self {
        EvaluatedValue::Object(o)
    }
}

impl From<f64> for EvaluatedValue {
    fn from(n: f64) -> Self {
        EvaluatedValue::Scalar(n)
    }
}

/// Intersection point of the unbounded lines carrying two segments
///
/// Returns `None` when the lines are parallel (including coincident),
/// which is a legitimate terminal outcome for angle construction.
pub fn intersection(a: &GeoVector, b: &GeoVector) -> Option<GeoPoint> {
    let denom = a.dx() * b.dy() - a.dy() * b.dx();
    if denom.abs() < EPSILON {
        return None;
    }
    let t = ((b.x1 - a.x1) * b.dy() - (b.y1 - a.y1) * b.dx()) / denom;
    Some(GeoPoint::new(a.x1 + t * a.dx(), a.y1 + t * a.dy()))
}

/// Returns true if `p`, assumed to lie on the carrying line of `v`,
/// falls within the segment's own span
pub fn is_point_in_segment(p: &GeoPoint, v: &GeoVector) -> bool {
    let (min_x, max_x) = if v.x1 <= v.x2 { (v.x1, v.x2) } else { (v.x2, v.x1) };
    let (min_y, max_y) = if v.y1 <= v.y2 { (v.y1, v.y2) } else { (v.y2, v.y1) };
    p.x >= min_x - EPSILON
        && p.x <= max_x + EPSILON
        && p.y >= min_y - EPSILON
        && p.y <= max_y + EPSILON
}

/// Perpendicular (clamped) distance from a point to a finite segment
pub fn point_segment_distance(p: &GeoPoint, v: &GeoVector) -> f64 {
    let len_sq = v.dx() * v.dx() + v.dy() * v.dy();
    if len_sq < EPSILON {
        return p.distance_to(&v.start());
    }
    let t = ((p.x - v.x1) * v.dx() + (p.y - v.y1) * v.dy()) / len_sq;
    let t = t.clamp(0.0, 1.0);
    let proj = GeoPoint::new(v.x1 + t * v.dx(), v.y1 + t * v.dy());
    p.distance_to(&proj)
}

/// Returns true if `p` is strictly closer to segment `a` than to segment `b`
pub fn is_point_closer_to(p: &GeoPoint, a: &GeoVector, b: &GeoVector) -> bool {
    point_segment_distance(p, a) < point_segment_distance(p, b)
}

/// Signed angle between two vectors in degrees, normalized to `(-180, 180]`
///
/// Computed as the difference of the two `atan2` directions, per the
/// measurement semantics of angle landmarks.
pub fn angle_between(a: &GeoVector, b: &GeoVector) -> f64 {
    let mut deg = (b.direction() - a.direction()).to_degrees();
    while deg > 180.0 {
        deg -= 360.0;
    }
    while deg <= -180.0 {
        deg += 360.0;
    }
    deg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_segments_intersect_at_center() {
        let a = GeoVector::new(0.0, 0.0, 10.0, 10.0);
        let b = GeoVector::new(0.0, 10.0, 10.0, 0.0);

        let i = intersection(&a, &b).unwrap();
        assert!(i.approx_eq(&GeoPoint::new(5.0, 5.0)));
    }

    #[test]
    fn parallel_segments_have_no_intersection() {
        let a = GeoVector::new(0.0, 0.0, 10.0, 0.0);
        let b = GeoVector::new(0.0, 5.0, 10.0, 5.0);

        assert_eq!(intersection(&a, &b), None);
    }

    #[test]
    fn intersection_outside_both_spans() {
        let a = GeoVector::new(0.0, 0.0, 5.0, 0.0);
        let b = GeoVector::new(10.0, 5.0, 10.0, 10.0);

        let i = intersection(&a, &b).unwrap();
        assert!(i.approx_eq(&GeoPoint::new(10.0, 0.0)));
        assert!(!is_point_in_segment(&i, &a));
        assert!(!is_point_in_segment(&i, &b));
    }

    #[test]
    fn point_in_segment_boundaries() {
        let v = GeoVector::new(0.0, 0.0, 10.0, 10.0);

        assert!(is_point_in_segment(&GeoPoint::new(5.0, 5.0), &v));
        assert!(is_point_in_segment(&GeoPoint::new(0.0, 0.0), &v));
        assert!(is_point_in_segment(&GeoPoint::new(10.0, 10.0), &v));
        assert!(!is_point_in_segment(&GeoPoint::new(11.0, 11.0), &v));
    }

    #[test]
    fn right_angle_between_axes() {
        let x_axis = GeoVector::new(0.0, 0.0, 10.0, 0.0);
        let y_axis = GeoVector::new(0.0, 0.0, 0.0, 10.0);

        assert!((angle_between(&x_axis, &y_axis) - 90.0).abs() < 1e-9);
        assert!((angle_between(&y_axis, &x_axis) + 90.0).abs() < 1e-9);
    }

    #[test]
    fn angle_normalized_into_half_open_range() {
        let a = GeoVector::new(0.0, 0.0, 10.0, 0.0);
        let b = GeoVector::new(0.0, 0.0, -10.0, 0.0);

        // Opposite directions: exactly 180, never -180
        assert!((angle_between(&a, &b) - 180.0).abs() < 1e-9);
        assert!((angle_between(&b, &a) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn distance_to_segment_clamps_to_endpoints() {
        let v = GeoVector::new(0.0, 0.0, 10.0, 0.0);

        // Perpendicular within span
        assert!((point_segment_distance(&GeoPoint::new(5.0, 3.0), &v) - 3.0).abs() < 1e-9);
        // Beyond the end: distance to endpoint
        assert!((point_segment_distance(&GeoPoint::new(14.0, 3.0), &v) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn closer_to_picks_nearer_segment() {
        let a = GeoVector::new(0.0, 0.0, 10.0, 0.0);
        let b = GeoVector::new(0.0, 100.0, 10.0, 100.0);
        let p = GeoPoint::new(5.0, 10.0);

        assert!(is_point_closer_to(&p, &a, &b));
        assert!(!is_point_closer_to(&p, &b, &a));
    }

    #[test]
    fn scalar_and_object_accessors() {
        let v: EvaluatedValue = 42.0.into();
        assert_eq!(v.as_scalar(), Some(42.0));
        assert_eq!(v.as_point(), None);

        let p: EvaluatedValue = GeoObject::from(GeoPoint::new(1.0, 2.0)).into();
        assert_eq!(p.as_scalar(), None);
        assert_eq!(p.as_point(), Some(GeoPoint::new(1.0, 2.0)));
    }

    #[test]
    fn geo_object_deserializes_untagged() {
        let p: GeoObject = serde_json::from_str(r#"{"x": 1.0, "y": 2.0}"#).unwrap();
        assert_eq!(p.as_point(), Some(GeoPoint::new(1.0, 2.0)));

        let v: GeoObject =
            serde_json::from_str(r#"{"x1": 0.0, "y1": 0.0, "x2": 3.0, "y2": 4.0}"#).unwrap();
        assert_eq!(v.as_vector().unwrap().length(), 5.0);
    }
}
