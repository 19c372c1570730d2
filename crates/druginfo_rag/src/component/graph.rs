//! Structured drug/side-effect store backed by a typed digraph.
//!
//! This is the in-process counterpart of a Cypher session: merge-upsert of
//! uniquely named nodes, directed `HAS_SIDE_EFFECT` edges carrying a
//! description, and exact key lookup. The graph shape keeps multi-hop
//! queries (drugs sharing a side effect) possible, even though only the
//! single-hop lookup is exercised today.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::info;

use super::corpus::Document;

#[derive(Debug, Clone, PartialEq, Eq)]
enum GraphNode {
    Drug(String),
    SideEffect(String),
}

#[derive(Default)]
pub struct GraphStore {
    graph: DiGraph<GraphNode, String>,
    drugs: HashMap<String, NodeIndex>,
    side_effects: HashMap<String, NodeIndex>,
}

impl GraphStore {
    pub fn new() -> GraphStore {
        GraphStore::default()
    }

    /// Replaces the whole graph with one derived from `documents`.
    ///
    /// Node names stay unique across repeated rows (merge semantics), but
    /// there is no edge-level uniqueness: a row repeated in the corpus
    /// produces parallel edges, matching the source contract. Re-ingesting
    /// is therefore idempotent for an identical corpus and a full rebuild
    /// for a changed one, never an incremental merge.
    pub fn ingest(&mut self, documents: &[Document]) {
        self.graph.clear();
        self.drugs.clear();
        self.side_effects.clear();
        for doc in documents {
            let drug = self.merge_drug(&doc.drug_name);
            let side_effect = self.merge_side_effect(&doc.side_effect);
            self.graph.add_edge(drug, side_effect, doc.description.clone());
        }
        info!(
            "graph rebuilt: {} drugs, {} side effects, {} edges",
            self.drugs.len(),
            self.side_effects.len(),
            self.graph.edge_count()
        );
    }

    fn merge_drug(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.drugs.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(GraphNode::Drug(name.to_string()));
        self.drugs.insert(name.to_string(), idx);
        idx
    }

    fn merge_side_effect(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.side_effects.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(GraphNode::SideEffect(name.to_string()));
        self.side_effects.insert(name.to_string(), idx);
        idx
    }

    /// Every outgoing `HAS_SIDE_EFFECT` edge of the drug with exactly this
    /// name, as `(side_effect, description)`. Empty when the drug is not in
    /// the graph. The order is stable for a fixed graph state but otherwise
    /// unspecified.
    pub fn query(&self, drug_name: &str) -> Vec<(String, String)> {
        let Some(&drug) = self.drugs.get(drug_name) else {
            return vec![];
        };
        self.graph
            .edges_directed(drug, Direction::Outgoing)
            .map(|edge| {
                let name = match &self.graph[edge.target()] {
                    GraphNode::SideEffect(name) => name.clone(),
                    GraphNode::Drug(name) => name.clone(),
                };
                (name, edge.weight().clone())
            })
            .collect()
    }

    pub fn drug_count(&self) -> usize {
        self.drugs.len()
    }

    pub fn side_effect_count(&self) -> usize {
        self.side_effects.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
