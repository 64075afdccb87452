//! Graph and DI extraction from parsed documents
//!
//! Walks the element tree once and builds the typed [`ProcessGraph`] the
//! rule engines and layout operate on, plus the [`DiagramInterchange`]
//! snapshot of existing visual data. Extraction never mutates the document.

use std::collections::HashMap;

use tracing::{debug, trace};
use xmltree::Element;

use crate::core::{Bounds, NodeKind, Point, Result};
use crate::doc::{
    attr, child_named, children_named, descendants, find_descendant, no_process_error, text_of,
    BpmnDoc, BPMNDI_NS, BPMN_NS, DC_NS, DI_NS,
};
use crate::graph::{FlowNode, Lane, Participant, ProcessGraph, SequenceFlow};
use crate::layout::{DiagramInterchange, ShapeDi};

/// Build a typed process graph from a parsed document.
///
/// The first `bpmn:process` element is the subject; collaboration and
/// participant metadata are captured alongside so the rule engines can
/// check the participant binding without re-walking the tree. Fails when
/// the document has no process at all.
pub fn extract_graph(doc: &BpmnDoc) -> Result<ProcessGraph> {
    let root = doc.root();
    let process = find_descendant(root, "process", BPMN_NS).ok_or_else(no_process_error)?;

    let process_id = attr(process, "id").unwrap_or("").to_string();
    let process_name = attr(process, "name").unwrap_or(&process_id).to_string();
    let mut graph = ProcessGraph::new(process_id, process_name);
    graph.is_executable = match attr(process, "isExecutable") {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    };

    if let Some(collab) = find_descendant(root, "collaboration", BPMN_NS) {
        graph.collaboration_id = attr(collab, "id").map(str::to_string);
        if let Some(participant) = child_named(collab, "participant", BPMN_NS) {
            graph.participant = Some(Participant {
                id: attr(participant, "id").unwrap_or("").to_string(),
                name: attr(participant, "name").map(str::to_string),
                process_ref: attr(participant, "processRef").map(str::to_string),
            });
        }
    }

    // Lane membership is first-wins: a node referenced by two lanes keeps
    // the first, matching document order.
    let mut lane_of: HashMap<String, String> = HashMap::new();
    if let Some(lane_set) = child_named(process, "laneSet", BPMN_NS) {
        graph.has_lane_set = true;
        for lane_el in children_named(lane_set, "lane", BPMN_NS) {
            let lane_id = match attr(lane_el, "id") {
                Some(id) => id.to_string(),
                None => continue,
            };
            let mut node_refs = Vec::new();
            for flow_ref in children_named(lane_el, "flowNodeRef", BPMN_NS) {
                if let Some(node_id) = text_of(flow_ref) {
                    lane_of.entry(node_id.clone()).or_insert_with(|| lane_id.clone());
                    node_refs.push(node_id);
                }
            }
            graph.add_lane(Lane {
                id: lane_id,
                name: attr(lane_el, "name").map(str::to_string),
                node_refs,
            });
        }
    }

    for el in descendants(process) {
        if el.namespace.as_deref() != Some(BPMN_NS) {
            continue;
        }
        if let Some(kind) = NodeKind::from_tag(&el.name) {
            let Some(id) = attr(el, "id") else {
                trace!(tag = %el.name, "Skipping flow node without id");
                continue;
            };
            let mut node = FlowNode::new(id, kind);
            node.name = attr(el, "name").map(str::to_string);
            node.lane_id = lane_of.get(id).cloned();
            node.attached_to = attr(el, "attachedToRef").map(str::to_string);
            graph.add_node(node);
        } else if el.name == "sequenceFlow" {
            let Some(id) = attr(el, "id") else {
                trace!("Skipping sequence flow without id");
                continue;
            };
            let mut flow = SequenceFlow::new(
                id,
                attr(el, "sourceRef").unwrap_or(""),
                attr(el, "targetRef").unwrap_or(""),
            );
            flow.condition_name = attr(el, "name").map(str::to_string);
            graph.add_flow(flow);
        }
    }

    debug!(
        process_id = %graph.process_id,
        node_count = graph.node_count(),
        flow_count = graph.flow_count(),
        lane_count = graph.lane_count(),
        "Extracted process graph"
    );
    Ok(graph)
}

/// Snapshot the diagram-interchange section of a document.
///
/// Returns `None` when the document carries no `BPMNDiagram`/`BPMNPlane`
/// pair; the caller decides whether that is a defect (lint) or a trigger
/// for generating a layout.
pub fn extract_di(doc: &BpmnDoc) -> Option<DiagramInterchange> {
    let diagram = find_descendant(doc.root(), "BPMNDiagram", BPMNDI_NS)?;
    let plane = child_named(diagram, "BPMNPlane", BPMNDI_NS)?;

    let mut di = DiagramInterchange::new();
    di.plane_element = attr(plane, "bpmnElement")
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    for el in descendants(plane) {
        if el.namespace.as_deref() != Some(BPMNDI_NS) {
            continue;
        }
        match el.name.as_str() {
            "BPMNShape" => {
                let Some(element_id) = attr(el, "bpmnElement") else {
                    continue;
                };
                di.shapes.insert(
                    element_id.to_string(),
                    ShapeDi {
                        bounds: child_named(el, "Bounds", DC_NS).map(parse_bounds),
                        expanded: attr(el, "isExpanded") == Some("true"),
                    },
                );
            }
            "BPMNEdge" => {
                let Some(element_id) = attr(el, "bpmnElement") else {
                    continue;
                };
                let waypoints: Vec<Point> = children_named(el, "waypoint", DI_NS)
                    .map(|wp| Point::new(coord(wp, "x"), coord(wp, "y")))
                    .collect();
                di.edges.insert(element_id.to_string(), waypoints);
            }
            _ => {}
        }
    }

    debug!(
        shape_count = di.shapes.len(),
        edge_count = di.edges.len(),
        "Extracted diagram interchange"
    );
    Some(di)
}

fn parse_bounds(el: &Element) -> Bounds {
    Bounds::new(
        coord(el, "x"),
        coord(el, "y"),
        coord(el, "width"),
        coord(el, "height"),
    )
}

fn coord(el: &Element, name: &str) -> f64 {
    attr(el, name)
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(0.0)
}
