//! Lint and consistency rule engine
//!
//! Independent, side-effect-free structural checks over a process graph and
//! its optional diagram interchange. Each rule appends zero or more
//! severity-tagged issues; the engine aggregates them in a stable order so
//! assertions stay reproducible. Findings are collected, never raised.

use tracing::debug;

use crate::core::{AuditIssue, NodeKind};
use crate::graph::ProcessGraph;
use crate::layout::DiagramInterchange;

/// Run every lint rule and return the aggregated issue list.
pub fn run_lint(graph: &ProcessGraph, di: Option<&DiagramInterchange>) -> Vec<AuditIssue> {
    let mut issues = Vec::new();

    check_executable_default(graph, &mut issues);
    check_participant(graph, &mut issues);
    check_lane_set(graph, &mut issues);
    check_flow_references(graph, &mut issues);
    check_start_end_presence(graph, &mut issues);
    check_start_end_connectivity(graph, &mut issues);
    check_orphans(graph, &mut issues);
    check_gateways(graph, &mut issues);
    check_lane_membership(graph, &mut issues);
    check_unmatched_splits(graph, &mut issues);
    check_di(graph, di, &mut issues);

    debug!(issue_count = issues.len(), "Lint completed");
    issues
}

fn check_executable_default(graph: &ProcessGraph, issues: &mut Vec<AuditIssue>) {
    if graph.is_executable == Some(true) {
        issues.push(AuditIssue::warning(
            "process-executable-default",
            "Process should default to isExecutable=\"false\" unless explicitly requested.",
            Some(graph.process_id.clone()),
        ));
    }
}

fn check_participant(graph: &ProcessGraph, issues: &mut Vec<AuditIssue>) {
    let bound = graph
        .participant
        .as_ref()
        .map(|p| p.process_ref.as_deref() == Some(graph.process_id.as_str()))
        .unwrap_or(false);
    if !bound {
        issues.push(AuditIssue::error(
            "participant-missing",
            "Participant referencing the main process is required.",
            Some(graph.process_id.clone()),
        ));
    }
}

fn check_lane_set(graph: &ProcessGraph, issues: &mut Vec<AuditIssue>) {
    if !graph.has_lane_set {
        issues.push(AuditIssue::error(
            "lane-set-missing",
            "LaneSet with at least one lane is required.",
            Some(graph.process_id.clone()),
        ));
    }
}

fn check_flow_references(graph: &ProcessGraph, issues: &mut Vec<AuditIssue>) {
    for flow in graph.flows() {
        if !flow.source_id.is_empty() && !graph.has_node(&flow.source_id) {
            issues.push(AuditIssue::error(
                "flow-source-missing",
                format!(
                    "SequenceFlow {} points to unknown source {}.",
                    flow.id, flow.source_id
                ),
                Some(flow.id.clone()),
            ));
        }
        if !flow.target_id.is_empty() && !graph.has_node(&flow.target_id) {
            issues.push(AuditIssue::error(
                "flow-target-missing",
                format!(
                    "SequenceFlow {} points to unknown target {}.",
                    flow.id, flow.target_id
                ),
                Some(flow.id.clone()),
            ));
        }
    }
}

fn check_start_end_presence(graph: &ProcessGraph, issues: &mut Vec<AuditIssue>) {
    if graph.nodes_of_kind(NodeKind::StartEvent).next().is_none() {
        issues.push(AuditIssue::error(
            "require-start-event",
            "No <startEvent> found in the BPMN model.",
            None,
        ));
    }
    if graph.nodes_of_kind(NodeKind::EndEvent).next().is_none() {
        issues.push(AuditIssue::error(
            "require-end-event",
            "No <endEvent> found in the BPMN model.",
            None,
        ));
    }
}

fn check_start_end_connectivity(graph: &ProcessGraph, issues: &mut Vec<AuditIssue>) {
    for node in graph.nodes_of_kind(NodeKind::StartEvent) {
        if graph.out_degree(&node.id) == 0 {
            issues.push(AuditIssue::error(
                "start-needs-outgoing",
                "Start event has no outgoing sequence flow.",
                Some(node.id.clone()),
            ));
        }
    }
    for node in graph.nodes_of_kind(NodeKind::EndEvent) {
        if graph.in_degree(&node.id) == 0 {
            issues.push(AuditIssue::error(
                "end-needs-incoming",
                "End event has no incoming sequence flow.",
                Some(node.id.clone()),
            ));
        }
    }
}

/// Any node with zero incoming and zero outgoing flows is an orphan.
/// Start and end events get no exemption: a start event with no outgoing
/// flow is both disconnected and useless.
fn check_orphans(graph: &ProcessGraph, issues: &mut Vec<AuditIssue>) {
    for node in graph.nodes() {
        if graph.in_degree(&node.id) == 0 && graph.out_degree(&node.id) == 0 {
            issues.push(AuditIssue::error(
                "orphan-node",
                "Flow node is not connected to any sequence flow.",
                Some(node.id.clone()),
            ));
        }
    }
}

fn check_gateways(graph: &ProcessGraph, issues: &mut Vec<AuditIssue>) {
    for node in graph.nodes().filter(|n| n.kind.is_gateway()) {
        let ins = graph.in_degree(&node.id);
        let outs = graph.out_degree(&node.id);
        match node.kind {
            NodeKind::ExclusiveGateway => {
                if ins <= 1 && outs < 2 {
                    issues.push(AuditIssue::warning(
                        "exclusive-split-branches",
                        "Exclusive split gateway should have 2+ outgoing flows.",
                        Some(node.id.clone()),
                    ));
                }
                if ins > 1 && outs != 1 {
                    issues.push(AuditIssue::warning(
                        "exclusive-merge-outgoing",
                        "Exclusive merge gateway should have exactly one outgoing flow.",
                        Some(node.id.clone()),
                    ));
                }
            }
            NodeKind::ComplexGateway => {
                if outs > 1 && outs <= 2 {
                    issues.push(AuditIssue::error(
                        "complex-gateway-branches",
                        "Complex gateway split must have >2 outgoing flows.",
                        Some(node.id.clone()),
                    ));
                }
                if outs == 1 && ins <= 2 {
                    issues.push(AuditIssue::error(
                        "complex-gateway-branches",
                        "Complex gateway merge must have >2 incoming flows.",
                        Some(node.id.clone()),
                    ));
                }
                if outs == 0 {
                    issues.push(AuditIssue::error(
                        "complex-gateway-branches",
                        "Complex gateway must have at least one outgoing flow.",
                        Some(node.id.clone()),
                    ));
                }
            }
            _ => {}
        }
    }
}

fn check_lane_membership(graph: &ProcessGraph, issues: &mut Vec<AuditIssue>) {
    if !graph.has_lane_set {
        return;
    }
    for node in graph.nodes() {
        if graph.lane_of(&node.id).is_none() {
            issues.push(AuditIssue::error(
                "lane-membership-missing",
                "Flow node not referenced by any lane.",
                Some(node.id.clone()),
            ));
        }
    }
}

/// Graph-wide existence heuristic: a split gateway needs some gateway of
/// the same kind acting as a merge anywhere in the graph. Deliberately not
/// a reachability analysis; with several splits of one kind it cannot pair
/// them individually.
fn check_unmatched_splits(graph: &ProcessGraph, issues: &mut Vec<AuditIssue>) {
    for node in graph.nodes().filter(|n| n.kind.is_gateway()) {
        if graph.out_degree(&node.id) <= 1 {
            continue;
        }
        let has_merge = graph
            .nodes()
            .any(|m| m.kind == node.kind && graph.in_degree(&m.id) > 1);
        if !has_merge {
            issues.push(AuditIssue::warning(
                "gateway_match",
                format!(
                    "Gateway {} splits but no matching {} merge found.",
                    node.id,
                    node.kind.tag()
                ),
                Some(node.id.clone()),
            ));
        }
    }
}

/// Shape/edge parity between the graph and the diagram interchange.
///
/// Parity covers flow nodes and sequence flows only; lane shapes are not
/// checked here.
fn check_di(graph: &ProcessGraph, di: Option<&DiagramInterchange>, issues: &mut Vec<AuditIssue>) {
    let Some(di) = di else {
        issues.push(AuditIssue::error(
            "di-missing",
            "BPMNDiagram/BPMNPlane required for DI.",
            None,
        ));
        return;
    };

    let expected_plane = graph
        .collaboration_id
        .clone()
        .or_else(|| (!graph.process_id.is_empty()).then(|| graph.process_id.clone()));
    if let Some(expected) = expected_plane {
        if di.plane_element.as_deref() != Some(expected.as_str()) {
            issues.push(AuditIssue::error(
                "di-plane-binding",
                format!("BPMNPlane should reference {}.", expected),
                di.plane_element.clone(),
            ));
        }
    }

    for node in graph.nodes() {
        if !di.shapes.contains_key(&node.id) {
            issues.push(AuditIssue::error(
                "di-missing-shape",
                "Flow node missing BPMNShape.",
                Some(node.id.clone()),
            ));
        }
    }
    for flow in graph.flows() {
        if !di.edges.contains_key(&flow.id) {
            issues.push(AuditIssue::error(
                "di-missing-edge",
                "SequenceFlow missing BPMNEdge.",
                Some(flow.id.clone()),
            ));
        }
    }

    for node in graph.nodes_of_kind(NodeKind::SubProcess) {
        let Some(shape) = di.shapes.get(&node.id) else {
            continue;
        };
        if shape.expanded {
            continue;
        }
        let Some(bounds) = shape.bounds else {
            continue;
        };
        if (bounds.width, bounds.height) != (120.0, 80.0) {
            issues.push(AuditIssue::warning(
                "collapsed-subprocess-size",
                "Collapsed subprocess should use standard task size (120x80).",
                Some(node.id.clone()),
            ));
        }
    }

    for (flow_id, waypoints) in &di.edges {
        let (Some(first), Some(last)) = (waypoints.first(), waypoints.last()) else {
            continue;
        };
        if last.x < first.x {
            issues.push(AuditIssue::error(
                "backward_flow",
                format!(
                    "SequenceFlow {} moves leftward ({} -> {}).",
                    flow_id, first.x, last.x
                ),
                Some(flow_id.clone()),
            ));
        }
    }
}
