// Interactive render-facing graph. This is the mutable copy the rendering
// surface owns and edits through the operations below; the adapter only
// ever produces fresh snapshots, it never holds a reference into this.

use crate::graph_model::{NetGraph, ViewEdge, ViewNode, port_id};
use log::debug;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use std::collections::HashMap;

/// Interactive link creation failed. `DuplicateLink` is expected during
/// normal use (user redraws an existing wire) and callers treat it as a
/// no-op rather than surfacing it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("link {from} -> {to} already exists")]
    DuplicateLink { from: String, to: String },
    #[error("unknown node `{0}`")]
    UnknownNode(String),
}

/// Node/edge collections backed by a stable graph, keyed by render-facing
/// string ids. Node removal cascades to incident edges in one operation.
#[derive(Debug, Clone, Default)]
pub struct ViewGraph {
    g: StableGraph<ViewNode, ViewEdge>,
    index_of: HashMap<String, NodeIndex>,
}

impl From<NetGraph> for ViewGraph {
    fn from(snapshot: NetGraph) -> Self {
        let mut g = StableGraph::new();
        let mut index_of = HashMap::with_capacity(snapshot.nodes.len());
        for node in snapshot.nodes {
            let id = node.id.clone();
            let idx = g.add_node(node);
            index_of.insert(id, idx);
        }
        for edge in snapshot.edges {
            // The adapter already rejected dangling endpoints.
            if let (Some(&from), Some(&to)) =
                (index_of.get(&edge.from), index_of.get(&edge.to))
            {
                g.add_edge(from, to, edge);
            }
        }
        Self { g, index_of }
    }
}

impl ViewGraph {
    pub fn node_count(&self) -> usize {
        self.g.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.g.edge_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ViewNode> {
        self.g.node_weights()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &ViewEdge> {
        self.g.edge_weights()
    }

    pub fn node(&self, id: &str) -> Option<&ViewNode> {
        self.index_of.get(id).map(|&idx| &self.g[idx])
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.index_of.contains_key(id)
    }

    pub fn contains_edge(&self, edge_id: &str) -> bool {
        self.edges().any(|e| e.id == edge_id)
    }

    /// Owned copy of the current collections, in the shape a rendering
    /// surface consumes.
    pub fn snapshot(&self) -> NetGraph {
        NetGraph {
            nodes: self.nodes().cloned().collect(),
            edges: self.edges().cloned().collect(),
        }
    }

    /// Is there any edge between the two nodes?
    pub fn has_link(&self, from: &str, to: &str) -> bool {
        match (self.index_of.get(from), self.index_of.get(to)) {
            (Some(&from), Some(&to)) => self.g.find_edge(from, to).is_some(),
            _ => false,
        }
    }

    /// Is there an edge between the two ports specifically?
    pub fn has_port_link(&self, from: &str, from_port: &str, to: &str, to_port: &str) -> bool {
        let from_port = port_id(from, from_port);
        let to_port = port_id(to, to_port);
        self.edges().any(|e| {
            e.from == from && e.to == to && e.from_port == from_port && e.to_port == to_port
        })
    }

    /// Append a new edge. The duplicate check runs before any mutation: at
    /// node granularity when no ports are given, at port granularity when
    /// both are. Returns the id of the created edge.
    pub fn add_link(
        &mut self,
        from: &str,
        from_port: Option<&str>,
        to: &str,
        to_port: Option<&str>,
    ) -> Result<String, LinkError> {
        let from_idx = *self
            .index_of
            .get(from)
            .ok_or_else(|| LinkError::UnknownNode(from.to_string()))?;
        let to_idx = *self
            .index_of
            .get(to)
            .ok_or_else(|| LinkError::UnknownNode(to.to_string()))?;

        let duplicate = match (from_port, to_port) {
            (Some(fp), Some(tp)) => self.has_port_link(from, fp, to, tp),
            _ => self.has_link(from, to),
        };
        if duplicate {
            return Err(LinkError::DuplicateLink {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let edge = match (from_port, to_port) {
            (Some(fp), Some(tp)) => ViewEdge {
                id: format!("{from}.{fp}-{to}.{tp}"),
                from: from.to_string(),
                from_port: port_id(from, fp),
                to: to.to_string(),
                to_port: port_id(to, tp),
            },
            _ => ViewEdge {
                id: format!("{from}-{to}"),
                from: from.to_string(),
                from_port: String::new(),
                to: to.to_string(),
                to_port: String::new(),
            },
        };
        let id = edge.id.clone();
        self.g.add_edge(from_idx, to_idx, edge);
        Ok(id)
    }

    /// Remove a node together with every incident edge. The cascade is a
    /// single stable-graph operation, so no intermediate state with
    /// dangling edges is observable.
    pub fn remove_node(&mut self, id: &str) -> bool {
        match self.index_of.remove(id) {
            Some(idx) => {
                self.g.remove_node(idx);
                true
            }
            None => {
                debug!("remove_node: no node `{id}`");
                false
            }
        }
    }

    /// Remove exactly one edge by id. A missing id is a no-op: rapid
    /// double-clicks race against each other and must not crash the UI.
    pub fn remove_edge(&mut self, edge_id: &str) -> bool {
        let found: Option<EdgeIndex> = self
            .g
            .edge_references()
            .find(|e| e.weight().id == edge_id)
            .map(|e| e.id());
        match found {
            Some(idx) => {
                self.g.remove_edge(idx);
                true
            }
            None => {
                debug!("remove_edge: no edge `{edge_id}`");
                false
            }
        }
    }
}
