//! Landmark dependency DAG
//!
//! Built once per analysis load from the flattened landmark set. Validates
//! the schema preconditions (acyclicity, one definition per symbol) and
//! fixes a topological evaluation order up front, so the resolution engine
//! can assume a well-formed graph at query time.
//! Uses petgraph for graph operations.

use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use thiserror::Error;

use super::landmark::{Landmark, LandmarkKind, Symbol, Unit};

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Landmark components form a cycle through '{0}'")]
    CycleDetected(Symbol),

    #[error("Landmark '{0}' has conflicting definitions")]
    ConflictingDefinition(Symbol),
}

/// Structure signature used to detect conflicting definitions of one symbol
type Signature = (LandmarkKind, Option<Unit>, Vec<Symbol>);

fn signature(landmark: &Landmark) -> Signature {
    (
        landmark.kind,
        landmark.unit,
        landmark.components.iter().map(|c| c.symbol.clone()).collect(),
    )
}

/// The component relation over landmark symbols as an explicit DAG
#[derive(Debug, Default)]
pub struct LandmarkGraph {
    /// The underlying directed graph; edges run component -> dependent
    graph: DiGraph<Symbol, ()>,

    /// Map from symbol to node index
    node_map: HashMap<Symbol, NodeIndex>,
}

impl LandmarkGraph {
    /// Builds and validates a graph from a set of landmarks, walking each
    /// landmark's component tree recursively
    pub fn from_landmarks<'a>(
        landmarks: impl IntoIterator<Item = &'a Landmark>,
    ) -> Result<Self, GraphError> {
        let mut graph = Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        };
        let mut signatures: HashMap<Symbol, Signature> = HashMap::new();

        for landmark in landmarks {
            graph.add_landmark(landmark, &mut signatures)?;
        }

        if is_cyclic_directed(&graph.graph) {
            // Report an arbitrary participating symbol; the schema is
            // malformed either way.
            let symbol = graph
                .graph
                .node_weights()
                .next()
                .cloned()
                .unwrap_or_else(|| Symbol::from("?"));
            return Err(GraphError::CycleDetected(symbol));
        }

        Ok(graph)
    }

    fn add_landmark(
        &mut self,
        landmark: &Landmark,
        signatures: &mut HashMap<Symbol, Signature>,
    ) -> Result<(), GraphError> {
        let sig = signature(landmark);
        match signatures.get(&landmark.symbol) {
            Some(existing) if existing != &sig => {
                return Err(GraphError::ConflictingDefinition(landmark.symbol.clone()));
            }
            Some(_) => return Ok(()), // already walked
            None => {
                signatures.insert(landmark.symbol.clone(), sig);
            }
        }

        let idx = self.node_index(&landmark.symbol);
        for component in &landmark.components {
            self.add_landmark(component, signatures)?;
            let component_idx = self.node_index(&component.symbol);
            self.graph.update_edge(component_idx, idx, ());
        }

        Ok(())
    }

    fn node_index(&mut self, symbol: &Symbol) -> NodeIndex {
        match self.node_map.get(symbol) {
            Some(idx) => *idx,
            None => {
                let idx = self.graph.add_node(symbol.clone());
                self.node_map.insert(symbol.clone(), idx);
                idx
            }
        }
    }

    /// Returns the direct components a symbol depends on
    pub fn dependencies(&self, symbol: &Symbol) -> Vec<Symbol> {
        let idx = match self.node_map.get(symbol) {
            Some(idx) => *idx,
            None => return vec![],
        };

        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .filter_map(|idx| self.graph.node_weight(idx).cloned())
            .collect()
    }

    /// Returns the symbols that directly depend on a symbol
    pub fn dependents(&self, symbol: &Symbol) -> Vec<Symbol> {
        let idx = match self.node_map.get(symbol) {
            Some(idx) => *idx,
            None => return vec![],
        };

        self.graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .filter_map(|idx| self.graph.node_weight(idx).cloned())
            .collect()
    }

    /// Returns all symbols in topological order (components before the
    /// landmarks built from them)
    pub fn topological_order(&self) -> Result<Vec<Symbol>, GraphError> {
        match toposort(&self.graph, None) {
            Ok(order) => Ok(order
                .into_iter()
                .filter_map(|idx| self.graph.node_weight(idx).cloned())
                .collect()),
            // Unreachable after construction-time validation
            Err(cycle) => Err(GraphError::CycleDetected(
                self.graph
                    .node_weight(cycle.node_id())
                    .cloned()
                    .unwrap_or_else(|| Symbol::from("?")),
            )),
        }
    }

    /// Returns true if the graph contains the symbol
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.node_map.contains_key(symbol)
    }

    /// Returns the number of distinct symbols in the graph
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    /// Returns all symbols in the graph
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.node_map.keys()
    }
}
