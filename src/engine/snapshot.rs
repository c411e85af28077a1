//! Manual landmark snapshots
//!
//! The snapshot is the single shared input the engine reads: a versioned,
//! symbol-keyed map of user-placed values. It is owned and mutated by the
//! host application layer; the engine only ever receives it immutably and
//! keys its evaluation cache on the version counter.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::{EvaluatedValue, GeoObject, GeoPoint, GeoVector, Symbol};

/// Process-unique snapshot identity; versions only order mutations within
/// one instance, so distinct instances must never share an identity
fn next_nonce() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A user-placed value: a geometric point or line, or a plain scalar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManualValue {
    Point(GeoPoint),
    Vector(GeoVector),
    Scalar(f64),
}

impl From<ManualValue> for EvaluatedValue {
    fn from(v: ManualValue) -> Self {
        match v {
            ManualValue::Point(p) => EvaluatedValue::Object(GeoObject::Point(p)),
            ManualValue::Vector(v) => EvaluatedValue::Object(GeoObject::Vector(v)),
            ManualValue::Scalar(n) => EvaluatedValue::Scalar(n),
        }
    }
}

impl From<GeoPoint> for ManualValue {
    fn from(p: GeoPoint) -> Self {
        ManualValue::Point(p)
    }
}

impl From<GeoVector> for ManualValue {
    fn from(v: GeoVector) -> Self {
        ManualValue::Vector(v)
    }
}

impl From<f64> for ManualValue {
    fn from(n: f64) -> Self {
        ManualValue::Scalar(n)
    }
}

/// One manually placed landmark with an optional visibility flag
///
/// Two serialized forms are accepted:
/// - bare value: `{"x": 1.0, "y": 2.0}` or `12.5`
/// - wrapped: `{"value": {"x": 1.0, "y": 2.0}, "visible": false}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ManualLandmark {
    pub value: ManualValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl ManualLandmark {
    pub fn new(value: impl Into<ManualValue>) -> Self {
        Self {
            value: value.into(),
            visible: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(true)
    }
}

impl<'de> Deserialize<'de> for ManualLandmark {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;

        // Wrapped form carries an explicit "value" key
        if let serde_json::Value::Object(ref obj) = raw {
            if let Some(inner) = obj.get("value") {
                let value: ManualValue =
                    serde_json::from_value(inner.clone()).map_err(de::Error::custom)?;
                let visible = match obj.get("visible") {
                    Some(v) => Some(v.as_bool().ok_or_else(|| {
                        de::Error::custom("expected a boolean for 'visible'")
                    })?),
                    None => None,
                };
                return Ok(ManualLandmark { value, visible });
            }
        }

        let value: ManualValue = serde_json::from_value(raw).map_err(de::Error::custom)?;
        Ok(ManualLandmark {
            value,
            visible: None,
        })
    }
}

/// The immutable-to-the-engine snapshot of all manual placements
///
/// Every mutation bumps the version counter; the (identity, version) pair
/// is what the engine's evaluation cache compares against. The identity is
/// unique per instance, so two different snapshots can never alias in the
/// cache even when their version counters coincide.
#[derive(Debug, Serialize)]
pub struct ManualLandmarks {
    values: HashMap<Symbol, ManualLandmark>,
    #[serde(skip)]
    version: u64,
    #[serde(skip)]
    nonce: u64,
}

impl Default for ManualLandmarks {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
            version: 0,
            nonce: next_nonce(),
        }
    }
}

impl Clone for ManualLandmarks {
    /// A clone can diverge from its source, so it gets its own identity
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            version: self.version,
            nonce: next_nonce(),
        }
    }
}

impl ManualLandmarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places or replaces a value; called on initial placement and on drag
    pub fn set(&mut self, symbol: impl Into<Symbol>, value: impl Into<ManualValue>) {
        self.values
            .insert(symbol.into(), ManualLandmark::new(value));
        self.version += 1;
    }

    /// Removes a placement; called when the user deletes a landmark
    pub fn remove(&mut self, symbol: &Symbol) -> Option<ManualLandmark> {
        let removed = self.values.remove(symbol);
        if removed.is_some() {
            self.version += 1;
        }
        removed
    }

    /// Drops all placements; called when the active analysis changes
    pub fn clear(&mut self) {
        if !self.values.is_empty() {
            self.values.clear();
        }
        self.version += 1;
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&ManualLandmark> {
        self.values.get(symbol)
    }

    /// The placed value for a symbol, as an engine-facing evaluated value
    pub fn value(&self, symbol: &Symbol) -> Option<EvaluatedValue> {
        self.values.get(symbol).map(|m| m.value.into())
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.values.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Snapshot version; bumped on every mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Process-unique instance identity
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.values.keys()
    }
}

impl<'de> Deserialize<'de> for ManualLandmarks {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = HashMap::<Symbol, ManualLandmark>::deserialize(deserializer)?;
        Ok(Self {
            values,
            version: 0,
            nonce: next_nonce(),
        })
    }
}
