//! Deterministic diagram-interchange layout
//!
//! Computes left-to-right DI coordinates from node/flow specs and lane
//! membership, and merges the result back into a document. Layout is a pure
//! function of its inputs: no randomness, no clock, stable ordering.
//!
//! Placement contract:
//! - Lanes stack as rows in first-seen order, each row 220px tall.
//! - Node x = 120 + order * 150, centered on its lane row.
//! - Same-row edges are straight two-point segments; cross-row edges route
//!   orthogonally through a vertical midpoint.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};
use xmltree::{Element, XMLNode};

use crate::core::{Bounds, NodeKind, Point};
use crate::doc::{
    attr, bpmndi_el, dc_el, di_el, find_descendant, fmt_coord, BpmnDoc, BPMNDI_NS, BPMN_NS, DC_NS,
    DI_NS,
};
use crate::graph::ProcessGraph;

/// Row height for each lane
const LANE_HEIGHT: f64 = 220.0;
/// Horizontal step between consecutive orders
const X_STEP: f64 = 150.0;
/// X-center of order 0
const BASE_X: f64 = 120.0;
/// Y-center of the first lane row
const FIRST_ROW_Y: f64 = 180.0;

/// Layout input: one node to place
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub id: String,
    /// Owning lane row; `None` collapses into one implicit row
    pub lane_id: Option<String>,
    pub kind: NodeKind,
    /// Left-to-right order within the lane
    pub order: usize,
}

/// Layout input: one edge to route
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSpec {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
}

/// DI shape entry: bounds plus the expanded flag for sub-processes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapeDi {
    pub bounds: Option<Bounds>,
    pub expanded: bool,
}

/// The visual-layout side of a diagram: shapes, edges, plane binding.
///
/// Keyed by `BTreeMap` so iteration (and therefore document merging) is
/// deterministic within a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagramInterchange {
    /// Shapes for flow nodes and lanes, keyed by element id
    pub shapes: BTreeMap<String, ShapeDi>,
    /// Edge waypoints keyed by sequence-flow id
    pub edges: BTreeMap<String, Vec<Point>>,
    /// Element the BPMNPlane is bound to
    pub plane_element: Option<String>,
}

impl DiagramInterchange {
    /// Create an empty diagram interchange
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds of a shape, when present
    pub fn shape_bounds(&self, id: &str) -> Option<Bounds> {
        self.shapes.get(id).and_then(|s| s.bounds)
    }
}

/// Compute a deterministic left-to-right layout for the given nodes and
/// flows.
///
/// Lane rows are discovered in input order; lane bounds are sized to the
/// lane's maximum order plus a margin so member nodes sit inside. Node
/// sizes follow the canonical table per kind.
pub fn layout(nodes: &[NodeSpec], flows: &[FlowSpec]) -> DiagramInterchange {
    trace!(node_count = nodes.len(), flow_count = flows.len(), "Computing layout");

    // Rows in first-seen order.
    let mut row_center: HashMap<Option<&str>, f64> = HashMap::new();
    let mut row_order: Vec<Option<&str>> = Vec::new();
    for node in nodes {
        let key = node.lane_id.as_deref();
        if !row_center.contains_key(&key) {
            let y = FIRST_ROW_Y + row_order.len() as f64 * LANE_HEIGHT;
            row_center.insert(key, y);
            row_order.push(key);
        }
    }

    let mut max_order: HashMap<Option<&str>, usize> = HashMap::new();
    for node in nodes {
        let entry = max_order.entry(node.lane_id.as_deref()).or_insert(0);
        *entry = (*entry).max(node.order);
    }

    let mut di = DiagramInterchange::new();

    for lane in &row_order {
        let Some(lane_id) = lane else { continue };
        let y_center = row_center[lane];
        let width = BASE_X + (max_order.get(lane).copied().unwrap_or(0) + 2) as f64 * X_STEP;
        di.shapes.insert(
            (*lane_id).to_string(),
            ShapeDi {
                bounds: Some(Bounds::new(
                    BASE_X - 80.0,
                    y_center - LANE_HEIGHT / 2.0,
                    width,
                    LANE_HEIGHT,
                )),
                expanded: false,
            },
        );
    }

    let mut node_bounds: HashMap<&str, Bounds> = HashMap::new();
    for node in nodes {
        let y_center = row_center[&node.lane_id.as_deref()];
        let x_center = BASE_X + node.order as f64 * X_STEP;
        let (width, height) = node.kind.canonical_size(false).unwrap_or((120.0, 80.0));
        let bounds = Bounds::new(x_center - width / 2.0, y_center - height / 2.0, width, height);
        node_bounds.insert(node.id.as_str(), bounds);
        di.shapes.insert(
            node.id.clone(),
            ShapeDi {
                bounds: Some(bounds),
                expanded: false,
            },
        );
    }

    for flow in flows {
        let (Some(src), Some(tgt)) = (
            node_bounds.get(flow.source_id.as_str()),
            node_bounds.get(flow.target_id.as_str()),
        ) else {
            continue;
        };
        let start = Point::new(src.right(), src.center_y());
        let end = Point::new(tgt.x, tgt.center_y());
        let waypoints = if src.center_y() == tgt.center_y() {
            vec![start, end]
        } else {
            let mid_x = (src.right() + tgt.x) / 2.0;
            vec![
                start,
                Point::new(mid_x, start.y),
                Point::new(mid_x, end.y),
                end,
            ]
        };
        di.edges.insert(flow.id.clone(), waypoints);
    }

    debug!(
        shape_count = di.shapes.len(),
        edge_count = di.edges.len(),
        "Layout computed"
    );
    di
}

/// Lay out an extracted graph: nodes grouped by lane (declaration order,
/// lane-less nodes last), ordered by their lane order hint.
pub fn layout_graph(graph: &ProcessGraph) -> DiagramInterchange {
    let lane_rank: HashMap<&str, usize> = graph
        .lanes()
        .enumerate()
        .map(|(i, lane)| (lane.id.as_str(), i))
        .collect();

    let mut specs: Vec<NodeSpec> = graph
        .nodes()
        .map(|n| NodeSpec {
            id: n.id.clone(),
            lane_id: n.lane_id.clone(),
            kind: n.kind,
            order: n.order,
        })
        .collect();
    specs.sort_by_key(|s| {
        let rank = s
            .lane_id
            .as_deref()
            .and_then(|id| lane_rank.get(id).copied())
            .unwrap_or(usize::MAX);
        (rank, s.order)
    });

    let flows: Vec<FlowSpec> = graph
        .flows()
        .map(|f| FlowSpec {
            id: f.id.clone(),
            source_id: f.source_id.clone(),
            target_id: f.target_id.clone(),
        })
        .collect();

    layout(&specs, &flows)
}

/// Merge a diagram interchange into a document.
///
/// Creates the BPMNDiagram/BPMNPlane when absent, binding the plane to the
/// collaboration id (or the process id when there is no collaboration).
/// Overwrites bounds/waypoints for element ids that already have shapes or
/// edges and creates new ones otherwise. Shapes and edges for ids not in
/// `di` are left untouched.
pub fn apply_di(doc: &mut BpmnDoc, di: &DiagramInterchange) {
    // Resolve the plane binding target before taking the mutable borrow.
    let fallback_target = find_descendant(doc.root(), "collaboration", BPMN_NS)
        .and_then(|c| attr(c, "id"))
        .or_else(|| find_descendant(doc.root(), "process", BPMN_NS).and_then(|p| attr(p, "id")))
        .map(str::to_string);

    let root = doc.root_mut();
    let diagram = ensure_element_child(root, "BPMNDiagram", || {
        let mut el = bpmndi_el("BPMNDiagram");
        el.attributes.insert("id".to_string(), "Diagram_1".to_string());
        el
    });
    let plane = ensure_element_child(diagram, "BPMNPlane", || {
        let mut el = bpmndi_el("BPMNPlane");
        el.attributes.insert("id".to_string(), "Plane_1".to_string());
        el
    });
    let unbound = plane
        .attributes
        .get("bpmnElement")
        .map(|v| v.is_empty())
        .unwrap_or(true);
    if unbound {
        if let Some(target) = fallback_target {
            plane.attributes.insert("bpmnElement".to_string(), target);
        }
    }

    for (id, shape) in &di.shapes {
        let el = ensure_referencing_child(plane, "BPMNShape", id, || {
            let mut el = bpmndi_el("BPMNShape");
            el.attributes.insert("id".to_string(), format!("{}_di", id));
            el.attributes.insert("bpmnElement".to_string(), id.clone());
            if shape.expanded {
                el.attributes
                    .insert("isExpanded".to_string(), "true".to_string());
            }
            el
        });
        if let Some(bounds) = shape.bounds {
            el.children.retain(|c| {
                c.as_element()
                    .map(|e| !(e.name == "Bounds" && e.namespace.as_deref() == Some(DC_NS)))
                    .unwrap_or(true)
            });
            let mut b = dc_el("Bounds");
            b.attributes.insert("x".to_string(), fmt_coord(bounds.x));
            b.attributes.insert("y".to_string(), fmt_coord(bounds.y));
            b.attributes
                .insert("width".to_string(), fmt_coord(bounds.width));
            b.attributes
                .insert("height".to_string(), fmt_coord(bounds.height));
            el.children.push(XMLNode::Element(b));
        }
    }

    for (id, waypoints) in &di.edges {
        let el = ensure_referencing_child(plane, "BPMNEdge", id, || {
            let mut el = bpmndi_el("BPMNEdge");
            el.attributes.insert("id".to_string(), format!("{}_di", id));
            el.attributes.insert("bpmnElement".to_string(), id.clone());
            el
        });
        el.children.retain(|c| {
            c.as_element()
                .map(|e| !(e.name == "waypoint" && e.namespace.as_deref() == Some(DI_NS)))
                .unwrap_or(true)
        });
        for point in waypoints {
            let mut wp = di_el("waypoint");
            wp.attributes.insert("x".to_string(), fmt_coord(point.x));
            wp.attributes.insert("y".to_string(), fmt_coord(point.y));
            el.children.push(XMLNode::Element(wp));
        }
    }

    debug!(
        shape_count = di.shapes.len(),
        edge_count = di.edges.len(),
        "Applied diagram interchange"
    );
}

/// Find or append a direct element child by local name
fn ensure_element_child<'a>(
    parent: &'a mut Element,
    name: &str,
    build: impl FnOnce() -> Element,
) -> &'a mut Element {
    let idx = parent
        .children
        .iter()
        .position(|c| c.as_element().map(|e| e.name == name).unwrap_or(false));
    let idx = match idx {
        Some(i) => i,
        None => {
            parent.children.push(XMLNode::Element(build()));
            parent.children.len() - 1
        }
    };
    match &mut parent.children[idx] {
        XMLNode::Element(el) => el,
        _ => unreachable!("index points at an element child"),
    }
}

/// Find or append a DI child (shape/edge) referencing the given element id
fn ensure_referencing_child<'a>(
    parent: &'a mut Element,
    name: &str,
    element_id: &str,
    build: impl FnOnce() -> Element,
) -> &'a mut Element {
    let idx = parent.children.iter().position(|c| {
        c.as_element()
            .map(|e| e.name == name && e.attributes.get("bpmnElement").map(String::as_str) == Some(element_id))
            .unwrap_or(false)
    });
    let idx = match idx {
        Some(i) => i,
        None => {
            parent.children.push(XMLNode::Element(build()));
            parent.children.len() - 1
        }
    };
    match &mut parent.children[idx] {
        XMLNode::Element(el) => el,
        _ => unreachable!("index points at an element child"),
    }
}

/// True if the plane already exists in the document
pub fn has_plane(doc: &BpmnDoc) -> bool {
    find_descendant(doc.root(), "BPMNDiagram", BPMNDI_NS)
        .and_then(|d| crate::doc::child_named(d, "BPMNPlane", BPMNDI_NS))
        .is_some()
}
