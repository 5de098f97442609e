// Graph model adapter: pure translation from a `Module` to the
// render-facing node/edge model a graphing surface consumes. Recomputed
// fresh on every call; never mutates its input.

use crate::program::{Connection, Io, Module};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Separator between a node id and a port name inside a port id. Reserved:
/// node and port names must not contain it, which makes `port_id`
/// injective.
pub const PORT_ID_SEP: char = '_';

/// Names of the synthetic structural nodes.
pub const IN_NODE: &str = "in";
pub const OUT_NODE: &str = "out";
pub const CONST_NODE: &str = "const";

/// Globally unique port id: `node` + `_` + `port`.
pub fn port_id(node_id: &str, port_name: &str) -> String {
    format!("{node_id}{PORT_ID_SEP}{port_name}")
}

// ------------------------------------------------------------------
// Render-facing types
// ------------------------------------------------------------------

/// Which edge of the node box a port is drawn on. A rendering convention:
/// inputs sit North (top), outputs South (bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortSide {
    North,
    South,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewPort {
    pub id: String,
    pub side: PortSide,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewNode {
    pub id: String,
    pub label: String,
    pub ports: Vec<ViewPort>,
}

impl ViewNode {
    pub fn port(&self, id: &str) -> Option<&ViewPort> {
        self.ports.iter().find(|p| p.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewEdge {
    pub id: String,
    pub from: String,
    pub from_port: String,
    pub to: String,
    pub to_port: String,
}

/// Output of the adapter: node set (order-insensitive) plus edge list in
/// `net` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetGraph {
    pub nodes: Vec<ViewNode>,
    pub edges: Vec<ViewEdge>,
}

// ------------------------------------------------------------------
// Errors
// ------------------------------------------------------------------

/// A `Module` referenced something the derived node set does not contain.
/// Fatal to the render pass: a silently dropped wire would hide program
/// behavior from the viewer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DanglingReferenceError {
    #[error("worker `{worker}` references unknown dependency `{dep}`")]
    Dependency { worker: String, dep: String },
    #[error("connection endpoint `{endpoint}` references unknown node `{node}`")]
    Node { endpoint: String, node: String },
    #[error("connection endpoint `{endpoint}` references unknown port `{port}`")]
    Port { endpoint: String, port: String },
}

// ------------------------------------------------------------------
// Adapter
// ------------------------------------------------------------------

/// Derive the render-facing graph for a module's network.
pub fn net_graph(module: &Module) -> Result<NetGraph, DanglingReferenceError> {
    let nodes = module_nodes(module)?;
    let edges = net_edges(&module.net, &nodes)?;
    Ok(NetGraph { nodes, edges })
}

fn module_nodes(module: &Module) -> Result<Vec<ViewNode>, DanglingReferenceError> {
    let mut nodes = worker_nodes(module)?;

    // Module boundary ports and constants become first-class nodes so
    // every wire has two graph endpoints. The `in` node re-exposes the
    // module inputs as outputs (and `out` vice versa): data enters the
    // network through them.
    nodes.push(io_node(IN_NODE, &[], &port_names(&module.io.inports)));
    nodes.push(io_node(OUT_NODE, &port_names(&module.io.outports), &[]));

    let const_outs: Vec<&str> = module.constants.keys().map(String::as_str).collect();
    nodes.push(io_node(CONST_NODE, &[], &const_outs));

    Ok(nodes)
}

fn worker_nodes(module: &Module) -> Result<Vec<ViewNode>, DanglingReferenceError> {
    let mut nodes = Vec::with_capacity(module.workers.len());
    for (worker_name, dep_name) in &module.workers {
        let dep_io = module
            .deps
            .get(dep_name)
            .ok_or_else(|| DanglingReferenceError::Dependency {
                worker: worker_name.clone(),
                dep: dep_name.clone(),
            })?;
        nodes.push(dep_node(worker_name, dep_io));
    }
    Ok(nodes)
}

fn dep_node(name: &str, io: &Io) -> ViewNode {
    io_node(
        name,
        &port_names(&io.inports),
        &port_names(&io.outports),
    )
}

fn port_names(ports: &[crate::program::PortDef]) -> Vec<&str> {
    ports.iter().map(|p| p.name.as_str()).collect()
}

fn io_node(name: &str, inports: &[&str], outports: &[&str]) -> ViewNode {
    let mut ports = Vec::with_capacity(inports.len() + outports.len());
    for inport in inports {
        ports.push(ViewPort {
            id: port_id(name, inport),
            side: PortSide::North,
        });
    }
    for outport in outports {
        ports.push(ViewPort {
            id: port_id(name, outport),
            side: PortSide::South,
        });
    }
    ViewNode {
        id: name.to_string(),
        label: name.to_string(),
        ports,
    }
}

fn net_edges(
    net: &[Connection],
    nodes: &[ViewNode],
) -> Result<Vec<ViewEdge>, DanglingReferenceError> {
    let node_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let port_ids: HashSet<&str> = nodes
        .iter()
        .flat_map(|n| n.ports.iter().map(|p| p.id.as_str()))
        .collect();

    let mut edges = Vec::with_capacity(net.len());
    for conn in net {
        let from_port = resolve_port(&conn.from, &node_ids, &port_ids)?;
        let to_port = resolve_port(&conn.to, &node_ids, &port_ids)?;

        // The `[idx]` suffix lives in the edge id only: per-index edges
        // keep distinct identities while the declared port stays one port.
        edges.push(ViewEdge {
            id: format!("{}-{}", conn.from, conn.to),
            from: conn.from.node.clone(),
            from_port,
            to: conn.to.node.clone(),
            to_port,
        });
    }
    Ok(edges)
}

fn resolve_port(
    endpoint: &crate::program::Endpoint,
    node_ids: &HashSet<&str>,
    port_ids: &HashSet<&str>,
) -> Result<String, DanglingReferenceError> {
    if !node_ids.contains(endpoint.node.as_str()) {
        return Err(DanglingReferenceError::Node {
            endpoint: endpoint.to_string(),
            node: endpoint.node.clone(),
        });
    }
    let id = port_id(&endpoint.node, &endpoint.port);
    if !port_ids.contains(id.as_str()) {
        return Err(DanglingReferenceError::Port {
            endpoint: endpoint.to_string(),
            port: id,
        });
    }
    Ok(id)
}

/// Test fixture shared across modules: `io.in = {x}`, worker `multi` of a
/// dep with inputs `{nums0, nums1}` and output `{mul}`, `io.out = {y}`,
/// three wires through `multi`.
#[cfg(test)]
pub(crate) fn multiplier_module() -> Module {
    use crate::program::{Endpoint, PortDef, TypeExpr};

    let mut module = Module::default();
    module.io = Io::new(
        vec![PortDef::new("x", TypeExpr::Int)],
        vec![PortDef::new("y", TypeExpr::Int)],
    );
    module.workers.insert("multi".into(), "Multiply".into());
    module.deps.insert(
        "Multiply".into(),
        Io::new(
            vec![
                PortDef::new("nums0", TypeExpr::Int),
                PortDef::new("nums1", TypeExpr::Int),
            ],
            vec![PortDef::new("mul", TypeExpr::Int)],
        ),
    );
    module.net = vec![
        Connection::new(Endpoint::new("in", "x"), Endpoint::new("multi", "nums0")),
        Connection::new(Endpoint::new("in", "x"), Endpoint::new("multi", "nums1")),
        Connection::new(Endpoint::new("multi", "mul"), Endpoint::new("out", "y")),
    ];
    module
}
