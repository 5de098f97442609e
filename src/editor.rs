// Editor state container: owns the Module, the interactive view graph and
// the selection, and applies discrete UI events through an action queue.
// All operations run synchronously on the caller's event loop.

use crate::graph_model::{DanglingReferenceError, net_graph};
use crate::layout::{Direction, LayoutRequest};
use crate::program::Module;
use crate::selection::Selection;
use crate::view_graph::{LinkError, ViewGraph};
use log::debug;
use std::collections::HashSet;

/// Discrete user-input events, dispatched by the render adapter's
/// callbacks and applied in order on the next flush.
#[derive(Debug, Clone)]
pub enum Action {
    /// Select exactly the clicked node.
    ClickNode { id: String },
    /// Select exactly the clicked edge.
    ClickEdge { id: String },
    /// Select exactly the clicked port.
    ClickPort { id: String },
    /// Multi-select: add or remove one id.
    ToggleSelect { id: String },
    /// Background click clears the selection.
    ClickCanvas,
    BeginDrag { id: String },
    EndDrag,
    /// Start drawing a wire from a node (optionally a specific port).
    BeginLink {
        from: String,
        from_port: Option<String>,
    },
    /// Finish the pending wire at a target node/port.
    CompleteLink {
        to: String,
        to_port: Option<String>,
    },
    AbortLink,
    RemoveNode { id: String },
    RemoveEdge { id: String },
    SetLayoutDirection { direction: Direction },
    /// Swap in a freshly compiled module and rebuild the graph.
    Reload { module: Module },
}

/// Interaction state. One logical thread of control: every transition is
/// a discrete event, no operation suspends mid-state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        id: String,
    },
    LinkPending {
        from: String,
        from_port: Option<String>,
    },
}

pub struct NetEditor {
    module: Module,
    graph: ViewGraph,
    pub selection: Selection,
    drag: DragState,
    layout_direction: Direction,
    layout_dirty: bool,
    last_link_error: Option<LinkError>,
    error_message: Option<String>,
    action_queue: Vec<Action>,
}

impl NetEditor {
    /// Adapt the module once and take ownership of the render-facing copy.
    pub fn new(module: Module) -> Result<Self, DanglingReferenceError> {
        let graph = ViewGraph::from(net_graph(&module)?);
        Ok(Self {
            module,
            graph,
            selection: Selection::new(),
            drag: DragState::Idle,
            layout_direction: Direction::default(),
            layout_dirty: true,
            last_link_error: None,
            error_message: None,
            action_queue: Vec::new(),
        })
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn graph(&self) -> &ViewGraph {
        &self.graph
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn layout_direction(&self) -> Direction {
        self.layout_direction
    }

    /// Set after every structural change; the host clears it once it has
    /// re-run layout.
    pub fn layout_dirty(&self) -> bool {
        self.layout_dirty
    }

    pub fn clear_layout_dirty(&mut self) {
        self.layout_dirty = false;
    }

    /// Last rejected link, if any. Duplicate links are a benign race, so
    /// they land here instead of bubbling to the user.
    pub fn take_link_error(&mut self) -> Option<LinkError> {
        self.last_link_error.take()
    }

    /// Last reload failure. The graph shown is the last good one.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Link-check callback for the render adapter: would a wire between
    /// these nodes be accepted?
    pub fn can_link(&self, from: &str, to: &str) -> bool {
        !self.graph.has_link(from, to)
    }

    /// Layout input for the auto-layout collaborator, built from the live
    /// graph. Layout output never feeds back into the graph model.
    pub fn layout_request(&self) -> LayoutRequest {
        let nodes = self.graph.nodes().map(|n| n.id.clone()).collect();
        let edges = self
            .graph
            .edges()
            .map(|e| (e.from.clone(), e.to.clone()))
            .collect();
        let mut req = LayoutRequest::new(nodes, edges);
        req.direction = self.layout_direction;
        req
    }

    /// Queue an action for the next flush.
    pub fn dispatch(&mut self, action: Action) {
        self.action_queue.push(action);
    }

    /// Apply all pending actions in dispatch order.
    pub fn flush_actions(&mut self) {
        let actions = std::mem::take(&mut self.action_queue);
        for action in actions {
            self.apply_action(action);
        }
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::ClickNode { id }
            | Action::ClickEdge { id }
            | Action::ClickPort { id } => {
                self.selection.click(id);
            }
            Action::ToggleSelect { id } => {
                self.selection.toggle(id);
            }
            Action::ClickCanvas => {
                self.selection.clear();
            }

            Action::BeginDrag { id } => {
                self.drag = DragState::Dragging { id };
            }
            Action::EndDrag => {
                self.drag = DragState::Idle;
            }

            Action::BeginLink { from, from_port } => {
                self.drag = DragState::LinkPending { from, from_port };
            }
            Action::AbortLink => {
                self.drag = DragState::Idle;
            }
            Action::CompleteLink { to, to_port } => {
                let pending = std::mem::take(&mut self.drag);
                let DragState::LinkPending { from, from_port } = pending else {
                    debug!("complete_link with no pending link");
                    return;
                };
                match self.graph.add_link(
                    &from,
                    from_port.as_deref(),
                    &to,
                    to_port.as_deref(),
                ) {
                    Ok(_) => {
                        self.layout_dirty = true;
                    }
                    Err(err) => {
                        debug!("link rejected: {err}");
                        self.last_link_error = Some(err);
                    }
                }
            }

            Action::RemoveNode { id } => {
                if self.graph.remove_node(&id) {
                    self.layout_dirty = true;
                    self.reconcile_selection();
                }
            }
            Action::RemoveEdge { id } => {
                if self.graph.remove_edge(&id) {
                    self.layout_dirty = true;
                    self.reconcile_selection();
                }
            }

            Action::SetLayoutDirection { direction } => {
                if self.layout_direction != direction {
                    self.layout_direction = direction;
                    self.layout_dirty = true;
                }
            }

            Action::Reload { module } => match net_graph(&module) {
                Ok(snapshot) => {
                    self.module = module;
                    self.graph = ViewGraph::from(snapshot);
                    self.error_message = None;
                    self.layout_dirty = true;
                    self.reconcile_selection();
                }
                Err(err) => {
                    // Keep the last good graph rather than showing a
                    // partially wired one.
                    self.error_message = Some(err.to_string());
                }
            },
        }
    }

    /// Intersect the selection with the current node/port/edge ids so a
    /// stale id never stays selected past a structural edit.
    fn reconcile_selection(&mut self) {
        let mut live: HashSet<String> = HashSet::new();
        for node in self.graph.nodes() {
            live.insert(node.id.clone());
            for port in &node.ports {
                live.insert(port.id.clone());
            }
        }
        for edge in self.graph.edges() {
            live.insert(edge.id.clone());
        }
        self.selection.retain(|id| live.contains(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_model::multiplier_module;
    use std::collections::HashSet;

    fn editor() -> NetEditor {
        NetEditor::new(multiplier_module()).unwrap()
    }

    fn apply(editor: &mut NetEditor, action: Action) {
        editor.dispatch(action);
        editor.flush_actions();
    }

    #[test]
    fn click_then_canvas_click() {
        let mut ed = editor();
        apply(&mut ed, Action::ClickNode { id: "multi".into() });
        assert!(ed.selection.contains("multi"));

        apply(&mut ed, Action::ClickPort { id: "multi_mul".into() });
        assert!(ed.selection.contains("multi_mul"));
        assert!(!ed.selection.contains("multi"));

        apply(&mut ed, Action::ClickCanvas);
        assert!(ed.selection.is_empty());
    }

    #[test]
    fn remove_node_cascades_and_reconciles_selection() {
        let mut ed = editor();
        apply(&mut ed, Action::ClickNode { id: "multi".into() });
        apply(
            &mut ed,
            Action::ToggleSelect {
                id: "in.x-multi.nums0".into(),
            },
        );

        apply(&mut ed, Action::RemoveNode { id: "multi".into() });

        let node_ids: HashSet<String> = ed.graph().nodes().map(|n| n.id.clone()).collect();
        assert_eq!(
            node_ids,
            HashSet::from(["in".to_string(), "out".to_string(), "const".to_string()])
        );
        assert_eq!(ed.graph().edge_count(), 0);
        assert!(ed.selection.is_empty());
        assert!(ed.layout_dirty());
    }

    #[test]
    fn link_state_machine_commits_new_wires() {
        let mut ed = editor();
        apply(
            &mut ed,
            Action::BeginLink {
                from: "in".into(),
                from_port: Some("x".into()),
            },
        );
        assert!(matches!(ed.drag_state(), DragState::LinkPending { .. }));

        apply(
            &mut ed,
            Action::CompleteLink {
                to: "out".into(),
                to_port: Some("y".into()),
            },
        );
        assert_eq!(ed.drag_state(), &DragState::Idle);
        assert!(ed.graph().contains_edge("in.x-out.y"));
        assert!(ed.take_link_error().is_none());
    }

    #[test]
    fn duplicate_link_is_a_reported_no_op() {
        let mut ed = editor();
        apply(
            &mut ed,
            Action::BeginLink {
                from: "in".into(),
                from_port: None,
            },
        );
        apply(
            &mut ed,
            Action::CompleteLink {
                to: "out".into(),
                to_port: None,
            },
        );
        let edge_count = ed.graph().edge_count();

        // Redrawing the same wire: rejected before mutation.
        apply(
            &mut ed,
            Action::BeginLink {
                from: "in".into(),
                from_port: None,
            },
        );
        apply(
            &mut ed,
            Action::CompleteLink {
                to: "out".into(),
                to_port: None,
            },
        );
        assert_eq!(ed.graph().edge_count(), edge_count);
        assert!(matches!(
            ed.take_link_error(),
            Some(LinkError::DuplicateLink { .. })
        ));
    }

    #[test]
    fn can_link_mirrors_has_link() {
        let ed = editor();
        assert!(!ed.can_link("in", "multi"));
        assert!(ed.can_link("in", "out"));
    }

    #[test]
    fn abort_link_returns_to_idle() {
        let mut ed = editor();
        apply(
            &mut ed,
            Action::BeginLink {
                from: "in".into(),
                from_port: None,
            },
        );
        apply(&mut ed, Action::AbortLink);
        assert_eq!(ed.drag_state(), &DragState::Idle);

        // Completing with nothing pending is ignored.
        let edge_count = ed.graph().edge_count();
        apply(
            &mut ed,
            Action::CompleteLink {
                to: "out".into(),
                to_port: None,
            },
        );
        assert_eq!(ed.graph().edge_count(), edge_count);
    }

    #[test]
    fn drag_state_round_trip() {
        let mut ed = editor();
        apply(&mut ed, Action::BeginDrag { id: "multi".into() });
        assert_eq!(
            ed.drag_state(),
            &DragState::Dragging { id: "multi".into() }
        );
        apply(&mut ed, Action::EndDrag);
        assert_eq!(ed.drag_state(), &DragState::Idle);
    }

    #[test]
    fn remove_edge_reconciles_edge_selection() {
        let mut ed = editor();
        apply(
            &mut ed,
            Action::ClickEdge {
                id: "multi.mul-out.y".into(),
            },
        );
        apply(
            &mut ed,
            Action::RemoveEdge {
                id: "multi.mul-out.y".into(),
            },
        );
        assert!(ed.selection.is_empty());
        assert_eq!(ed.graph().edge_count(), 2);

        // Double removal is benign and leaves everything untouched.
        apply(
            &mut ed,
            Action::RemoveEdge {
                id: "multi.mul-out.y".into(),
            },
        );
        assert_eq!(ed.graph().edge_count(), 2);
    }

    #[test]
    fn reload_keeps_last_good_graph_on_error() {
        let mut ed = editor();
        let mut broken = multiplier_module();
        broken.deps.clear();

        apply(&mut ed, Action::Reload { module: broken });
        assert!(ed.error_message().is_some());
        // Last good graph is still up.
        assert_eq!(ed.graph().node_count(), 4);
        assert!(ed.graph().contains_edge("in.x-multi.nums0"));

        // A good module clears the error.
        apply(
            &mut ed,
            Action::Reload {
                module: multiplier_module(),
            },
        );
        assert!(ed.error_message().is_none());
    }

    #[test]
    fn reload_reconciles_selection_against_new_ids() {
        let mut ed = editor();
        apply(&mut ed, Action::ClickNode { id: "multi".into() });

        let mut smaller = multiplier_module();
        smaller.workers.clear();
        smaller.deps.clear();
        smaller.net.clear();
        apply(&mut ed, Action::Reload { module: smaller });

        assert!(ed.selection.is_empty());
        assert_eq!(ed.graph().node_count(), 3);
    }

    #[test]
    fn layout_request_tracks_graph_and_direction() {
        let mut ed = editor();
        apply(
            &mut ed,
            Action::SetLayoutDirection {
                direction: Direction::LeftToRight,
            },
        );
        let req = ed.layout_request();
        assert_eq!(req.direction, Direction::LeftToRight);
        assert_eq!(req.nodes.len(), 4);
        assert!(req.edges.contains(&("in".to_string(), "multi".to_string())));

        let positions = crate::layout::compute_layout(&req);
        assert_eq!(positions.len(), 4);
    }

    #[test]
    fn edits_never_write_back_into_the_module() {
        let mut ed = editor();
        let before = ed.module().clone();
        apply(&mut ed, Action::RemoveNode { id: "multi".into() });
        apply(
            &mut ed,
            Action::BeginLink {
                from: "in".into(),
                from_port: None,
            },
        );
        apply(
            &mut ed,
            Action::CompleteLink {
                to: "out".into(),
                to_port: None,
            },
        );
        assert_eq!(ed.module(), &before);
    }
}
