//! # Analysis Registry
//!
//! Built-in analysis definitions, resolved by identifier through a static
//! registry assembled at first use. Unknown identifiers fail with a
//! distinct error, and "no analysis selected" is its own state rather than
//! a lookup failure.
//!
//! ## Built-in Analyses
//!
//! | Id | Measurements | Purpose |
//! |----|--------------|---------|
//! | `steiner` | SNA, SNB, ANB | Sagittal skeletal relationship |
//! | `downs` | Facial angle, angle of convexity | Facial typology |

mod downs;
mod steiner;

use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

use crate::domain::Analysis;

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("Unknown analysis: '{0}'")]
    UnknownAnalysis(String),
}

fn registry() -> &'static HashMap<&'static str, Analysis> {
    static REGISTRY: OnceLock<HashMap<&'static str, Analysis>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map = HashMap::new();
        for analysis in [steiner::analysis(), downs::analysis()] {
            map.insert(analysis.id, analysis);
        }
        map
    })
}

/// Resolves an analysis identifier
pub fn get(id: &str) -> Result<&'static Analysis, RegistryError> {
    registry()
        .get(id)
        .ok_or_else(|| RegistryError::UnknownAnalysis(id.to_string()))
}

/// Resolves an optional selection: `None` means no analysis is selected,
/// which is distinct from an unknown identifier
pub fn resolve_selection(
    selection: Option<&str>,
) -> Result<Option<&'static Analysis>, RegistryError> {
    match selection {
        Some(id) => get(id).map(Some),
        None => Ok(None),
    }
}

/// All registered analysis identifiers, sorted for stable listings
pub fn ids() -> Vec<&'static str> {
    let mut ids: Vec<&'static str> = registry().keys().copied().collect();
    ids.sort_unstable();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_resolve() {
        assert_eq!(get("steiner").unwrap().id, "steiner");
        assert_eq!(get("downs").unwrap().id, "downs");
    }

    #[test]
    fn unknown_id_is_a_distinct_error() {
        assert_eq!(
            get("ricketts_frontal").unwrap_err(),
            RegistryError::UnknownAnalysis("ricketts_frontal".to_string())
        );
    }

    #[test]
    fn no_selection_is_not_an_error() {
        assert!(matches!(resolve_selection(None), Ok(None)));
        assert!(resolve_selection(Some("steiner")).unwrap().is_some());
        assert!(resolve_selection(Some("nope")).is_err());
    }

    #[test]
    fn ids_are_sorted() {
        assert_eq!(ids(), vec!["downs", "steiner"]);
    }
}
