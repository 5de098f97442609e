//! Render-facing graph model for dataflow module networks.
//!
//! The core is the graph model adapter: a pure function from a compiled
//! [`Module`] to the node/edge/port schema a graph-rendering surface
//! expects. Around it sit the interactive pieces a viewer needs: a
//! mutable [`ViewGraph`] with duplicate-checked linking and cascading
//! removal, a [`Selection`] reconciled against live ids, the
//! [`NetEditor`] action loop, and a pure layered [`layout`](crate::layout)
//! collaborator. Rendering itself stays external.

pub mod editor;
pub mod graph_model;
pub mod layout;
pub mod program;
pub mod selection;
pub mod view_graph;

pub use editor::{Action, DragState, NetEditor};
pub use graph_model::{
    DanglingReferenceError, NetGraph, PortSide, ViewEdge, ViewNode, ViewPort, net_graph, port_id,
};
pub use layout::{Direction, LayoutRequest, NodeSize, Pos, compute_layout};
pub use program::{Connection, ConstDef, Endpoint, Io, Module, PortDef, StructField, TypeExpr};
pub use selection::Selection;
pub use view_graph::{LinkError, ViewGraph};
