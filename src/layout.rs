// Auto-layout collaborator: a pure function from a layout request to node
// positions. The graph model never depends on layout output; it only
// supplies ids and a fixed node size. No global layout state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main axis of the layered placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    TopToBottom,
    LeftToRight,
}

/// Fixed box every node occupies; the renderer draws all nodes the same
/// size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSize {
    pub width: f32,
    pub height: f32,
}

impl Default for NodeSize {
    fn default() -> Self {
        Self {
            width: 342.5,
            height: 70.0,
        }
    }
}

/// Top-left anchored position, matching the render surface's node anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pos {
    pub x: f32,
    pub y: f32,
}

/// Everything the layout needs, passed explicitly per call.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRequest {
    /// Node ids in presentation order; order breaks ties within a layer.
    pub nodes: Vec<String>,
    /// Directed (from, to) node-id pairs.
    pub edges: Vec<(String, String)>,
    pub direction: Direction,
    pub node_size: NodeSize,
    /// Distance between consecutive layers along the main axis.
    pub layer_gap: f32,
    /// Distance between neighboring nodes within a layer.
    pub node_gap: f32,
}

impl LayoutRequest {
    pub fn new(nodes: Vec<String>, edges: Vec<(String, String)>) -> Self {
        Self {
            nodes,
            edges,
            direction: Direction::default(),
            node_size: NodeSize::default(),
            layer_gap: 60.0,
            node_gap: 40.0,
        }
    }
}

/// Layered placement: sources in layer zero, every other node one layer
/// past its furthest predecessor, layers centered on the cross axis.
pub fn compute_layout(req: &LayoutRequest) -> HashMap<String, Pos> {
    let index_of: HashMap<&str, usize> = req
        .nodes
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    let edges: Vec<(usize, usize)> = req
        .edges
        .iter()
        .filter_map(|(from, to)| {
            // Ids outside the node list do not constrain the layout.
            match (index_of.get(from.as_str()), index_of.get(to.as_str())) {
                (Some(&f), Some(&t)) if f != t => Some((f, t)),
                _ => None,
            }
        })
        .collect();

    // Longest-path layering by bounded relaxation; the bound makes cycles
    // terminate instead of pushing layers forever.
    let n = req.nodes.len();
    let mut layer = vec![0usize; n];
    for _ in 0..n {
        let mut changed = false;
        for &(from, to) in &edges {
            if layer[to] < layer[from] + 1 {
                layer[to] = layer[from] + 1;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let mut layers: Vec<Vec<usize>> = Vec::new();
    for (node, &l) in layer.iter().enumerate() {
        if layers.len() <= l {
            layers.resize_with(l + 1, Vec::new);
        }
        layers[l].push(node);
    }

    let (main_extent, cross_extent) = match req.direction {
        Direction::TopToBottom => (req.node_size.height, req.node_size.width),
        Direction::LeftToRight => (req.node_size.width, req.node_size.height),
    };
    let main_pitch = main_extent + req.layer_gap;
    let cross_pitch = cross_extent + req.node_gap;

    let mut positions = HashMap::with_capacity(n);
    for (l, members) in layers.iter().enumerate() {
        let main = l as f32 * main_pitch;
        let start = -((members.len().saturating_sub(1)) as f32 * cross_pitch) / 2.0;
        for (slot, &node) in members.iter().enumerate() {
            let cross = start + slot as f32 * cross_pitch;
            let (cx, cy) = match req.direction {
                Direction::TopToBottom => (cross, main),
                Direction::LeftToRight => (main, cross),
            };
            // Shift the center-anchored grid position to top-left.
            positions.insert(
                req.nodes[node].clone(),
                Pos {
                    x: cx - req.node_size.width / 2.0,
                    y: cy - req.node_size.height / 2.0,
                },
            );
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(nodes: &[&str], edges: &[(&str, &str)]) -> LayoutRequest {
        let mut req = LayoutRequest::new(
            nodes.iter().map(|s| s.to_string()).collect(),
            edges
                .iter()
                .map(|(f, t)| (f.to_string(), t.to_string()))
                .collect(),
        );
        req.node_size = NodeSize {
            width: 100.0,
            height: 50.0,
        };
        req.layer_gap = 50.0;
        req.node_gap = 20.0;
        req
    }

    #[test]
    fn chain_layers_top_to_bottom() {
        let req = request(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let pos = compute_layout(&req);
        assert_eq!(pos["a"], Pos { x: -50.0, y: -25.0 });
        assert_eq!(pos["b"], Pos { x: -50.0, y: 75.0 });
        assert_eq!(pos["c"], Pos { x: -50.0, y: 175.0 });
    }

    #[test]
    fn direction_swaps_axes() {
        let mut req = request(&["a", "b"], &[("a", "b")]);
        req.direction = Direction::LeftToRight;
        let pos = compute_layout(&req);
        assert_eq!(pos["a"], Pos { x: -50.0, y: -25.0 });
        assert_eq!(pos["b"], Pos { x: 100.0, y: -25.0 });
    }

    #[test]
    fn siblings_share_a_layer_centered() {
        let req = request(&["src", "l", "r"], &[("src", "l"), ("src", "r")]);
        let pos = compute_layout(&req);
        assert_eq!(pos["src"], Pos { x: -50.0, y: -25.0 });
        // l and r sit symmetrically around the source, 120 apart.
        assert_eq!(pos["l"], Pos { x: -110.0, y: 75.0 });
        assert_eq!(pos["r"], Pos { x: 10.0, y: 75.0 });
    }

    #[test]
    fn node_furthest_predecessor_wins() {
        let req = request(
            &["a", "b", "c"],
            &[("a", "b"), ("b", "c"), ("a", "c")],
        );
        let pos = compute_layout(&req);
        // c is two hops from a even though a direct edge exists.
        assert_eq!(pos["c"].y, 175.0);
    }

    #[test]
    fn cycles_terminate() {
        let req = request(&["a", "b"], &[("a", "b"), ("b", "a")]);
        let pos = compute_layout(&req);
        assert_eq!(pos.len(), 2);
    }

    #[test]
    fn unknown_edge_ids_are_ignored() {
        let req = request(&["a"], &[("a", "ghost")]);
        let pos = compute_layout(&req);
        assert_eq!(pos["a"], Pos { x: -50.0, y: -25.0 });
    }

    #[test]
    fn empty_request_yields_no_positions() {
        let req = request(&[], &[]);
        assert!(compute_layout(&req).is_empty());
    }
}
