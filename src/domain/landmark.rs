//! Landmark schema
//!
//! Landmarks are the declarative building blocks of an analysis: named
//! points, lines, angles and distances, composed into a DAG via their
//! component lists. A landmark with a custom `calculate` function derives
//! its value from the evaluated numeric values of its components, in
//! declared order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Globally unique landmark identifier (e.g. `N`, `S-N`, `SNA`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// What kind of geometric entity a landmark describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkKind {
    Point,
    Line,
    Angle,
    Distance,
}

impl LandmarkKind {
    pub fn label(&self) -> &'static str {
        match self {
            LandmarkKind::Point => "point",
            LandmarkKind::Line => "line",
            LandmarkKind::Angle => "angle",
            LandmarkKind::Distance => "distance",
        }
    }
}

/// Measurement unit; angular for angles, linear for lines and distances.
/// Raw points carry no unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Degree,
    Radian,
    Mm,
    Cm,
    In,
}

impl Unit {
    pub fn is_angular(&self) -> bool {
        matches!(self, Unit::Degree | Unit::Radian)
    }

    pub fn is_linear(&self) -> bool {
        !self.is_angular()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Unit::Degree => "°",
            Unit::Radian => "rad",
            Unit::Mm => "mm",
            Unit::Cm => "cm",
            Unit::In => "in",
        }
    }
}

/// A custom calculation over the evaluated numeric values of a landmark's
/// components, in declared order
pub type CalcFn = fn(&[f64]) -> f64;

/// A named cephalometric entity with a declared composition
///
/// Landmarks form a directed acyclic graph through `components`; cycles
/// are a definition bug caught at analysis load time
/// (see [`crate::domain::LandmarkGraph`]), never defended against during
/// resolution.
#[derive(Debug, Clone)]
pub struct Landmark {
    pub symbol: Symbol,
    pub name: Option<String>,
    pub description: Option<String>,
    pub kind: LandmarkKind,
    pub unit: Option<Unit>,
    /// Ordered component landmarks; empty for primitive points
    pub components: Vec<Landmark>,
    /// Optional derivation from component values
    pub calculate: Option<CalcFn>,
}

/// Equality over the declared data only. Function pointers compare
/// unreliably across codegen units, so `calculate` contributes its
/// presence, not its address.
impl PartialEq for Landmark {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
            && self.name == other.name
            && self.description == other.description
            && self.kind == other.kind
            && self.unit == other.unit
            && self.components == other.components
            && self.calculate.is_some() == other.calculate.is_some()
    }
}

impl Landmark {
    /// Returns true if this landmark is placed directly by the user
    /// (a primitive point with no components)
    pub fn is_manual(&self) -> bool {
        self.kind == LandmarkKind::Point && self.components.is_empty()
    }

    /// Returns true if this landmark's value is a geometric object that
    /// can be mapped from already-placed geometry (points and lines)
    pub fn is_mappable(&self) -> bool {
        matches!(self.kind, LandmarkKind::Point | LandmarkKind::Line)
    }

    /// Returns true if this landmark's value is a number derived from its
    /// components, either through a custom calculation or through
    /// angle/distance geometry
    pub fn is_computable(&self) -> bool {
        self.calculate.is_some()
            || matches!(self.kind, LandmarkKind::Angle | LandmarkKind::Distance)
    }

    /// Structural equality: same kind, same unit, component symbols
    /// pointwise equal, ignoring this landmark's own symbol
    ///
    /// Two differently-named steps that are structurally equal form an
    /// equivalence class and may share a manual placement. Primitive
    /// points are only equivalent to themselves: with no components there
    /// is no structure to compare, and treating every bare point as
    /// interchangeable would be wrong.
    ///
    /// The relation is used pairwise, never as a transitive closure.
    pub fn is_structurally_equal(&self, other: &Landmark) -> bool {
        if self.components.is_empty() || other.components.is_empty() {
            return self.kind == other.kind
                && self.unit == other.unit
                && self.symbol == other.symbol;
        }
        self.kind == other.kind
            && self.unit == other.unit
            && self.components.len() == other.components.len()
            && self
                .components
                .iter()
                .zip(&other.components)
                .all(|(a, b)| a.symbol == b.symbol)
    }

    /// Display title for step listings, e.g. `Nasion (N)`
    pub fn title(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", name, self.symbol),
            None => self.symbol.to_string(),
        }
    }
}

/// A primitive point landmark, placed manually by the user
pub fn point(symbol: &str, name: &str, description: &str) -> Landmark {
    Landmark {
        symbol: Symbol::from(symbol),
        name: if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        },
        description: if description.is_empty() {
            None
        } else {
            Some(description.to_string())
        },
        kind: LandmarkKind::Point,
        unit: None,
        components: Vec::new(),
        calculate: None,
    }
}

/// A line through two points, symbol defaulting to `{a}-{b}`
pub fn line(a: &Landmark, b: &Landmark, name: Option<&str>, symbol: Option<&str>) -> Landmark {
    Landmark {
        symbol: match symbol {
            Some(s) => Symbol::from(s),
            None => Symbol::new(format!("{}-{}", a.symbol, b.symbol)),
        },
        name: name.map(str::to_string),
        description: None,
        kind: LandmarkKind::Line,
        unit: Some(Unit::Mm),
        components: vec![a.clone(), b.clone()],
        calculate: None,
    }
}

/// The linear distance between two points, measured in pixels and scaled
/// to physical units by the caller
pub fn distance(a: &Landmark, b: &Landmark, name: Option<&str>, symbol: Option<&str>) -> Landmark {
    Landmark {
        symbol: match symbol {
            Some(s) => Symbol::from(s),
            None => Symbol::new(format!("{}->{}", a.symbol, b.symbol)),
        },
        name: name.map(str::to_string),
        description: None,
        kind: LandmarkKind::Distance,
        unit: Some(Unit::Mm),
        components: vec![a.clone(), b.clone()],
        calculate: None,
    }
}

/// The angle between two lines, symbol defaulting to `({a},{b})`
pub fn angle_between_lines(
    a: &Landmark,
    b: &Landmark,
    name: Option<&str>,
    symbol: Option<&str>,
) -> Landmark {
    Landmark {
        symbol: match symbol {
            Some(s) => Symbol::from(s),
            None => Symbol::new(format!("({},{})", a.symbol, b.symbol)),
        },
        name: name.map(str::to_string),
        description: None,
        kind: LandmarkKind::Angle,
        unit: Some(Unit::Degree),
        components: vec![a.clone(), b.clone()],
        calculate: None,
    }
}

/// The angle `ABC` with vertex `b`, built from the lines `b-a` and `b-c`;
/// symbol defaults to the concatenated point symbols
pub fn angle_between_points(
    a: &Landmark,
    b: &Landmark,
    c: &Landmark,
    name: Option<&str>,
    symbol: Option<&str>,
) -> Landmark {
    let default_symbol = format!("{}{}{}", a.symbol, b.symbol, c.symbol);
    angle_between_lines(
        &line(b, a, None, None),
        &line(b, c, None, None),
        name,
        Some(symbol.unwrap_or(&default_symbol)),
    )
}

/// An angle derived from other angles through a custom calculation,
/// e.g. `ANB = SNA - SNB`
pub fn computed_angle(
    symbol: &str,
    name: &str,
    components: Vec<Landmark>,
    calculate: CalcFn,
) -> Landmark {
    Landmark {
        symbol: Symbol::from(symbol),
        name: if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        },
        description: None,
        kind: LandmarkKind::Angle,
        unit: Some(Unit::Degree),
        components,
        calculate: Some(calculate),
    }
}
