//! Forbidden modelling pattern detection
//!
//! Patterns are shapes a diagram can technically express but that reviewers
//! always reject: flows drawn right-to-left, start events wired straight to
//! end events, detached boundary events, unclosed exclusive splits. Hits
//! carry error severity for exit-code purposes.

use tracing::debug;

use crate::core::{NodeKind, PatternHit};
use crate::graph::ProcessGraph;
use crate::layout::DiagramInterchange;

/// Detect forbidden patterns over the graph and optional diagram data.
pub fn check_patterns(graph: &ProcessGraph, di: Option<&DiagramInterchange>) -> Vec<PatternHit> {
    let mut hits = Vec::new();

    if let Some(di) = di {
        for (flow_id, waypoints) in &di.edges {
            let (Some(first), Some(last)) = (waypoints.first(), waypoints.last()) else {
                continue;
            };
            if waypoints.len() >= 2 && first.x > last.x {
                hits.push(PatternHit::new(
                    "left-pointing-flow",
                    "Sequence flow appears to go right-to-left.",
                    Some(flow_id.clone()),
                ));
            }
        }
    }

    for start in graph.nodes_of_kind(NodeKind::StartEvent) {
        let direct_to_end = graph.successors(&start.id).iter().any(|target| {
            graph
                .get_node(target)
                .map(|n| n.kind == NodeKind::EndEvent)
                .unwrap_or(false)
        });
        if direct_to_end {
            hits.push(PatternHit::new(
                "start-to-end-direct",
                "Start event flows directly to an end event.",
                Some(start.id.clone()),
            ));
        }
    }

    for boundary in graph.nodes_of_kind(NodeKind::BoundaryEvent) {
        if boundary.attached_to.as_deref().unwrap_or("").is_empty() {
            hits.push(PatternHit::new(
                "boundary-without-attachment",
                "Boundary event missing attachedToRef.",
                Some(boundary.id.clone()),
            ));
        }
        // Direct targets only; deeper paths are not traced.
        for target in graph.successors(&boundary.id) {
            let terminates = graph
                .get_node(target)
                .map(|n| matches!(n.kind, NodeKind::EndEvent | NodeKind::SubProcess))
                .unwrap_or(false);
            if !terminates {
                hits.push(PatternHit::new(
                    "boundary-path-termination",
                    "Boundary exception path should terminate in an end event or a collapsed subprocess.",
                    Some(boundary.id.clone()),
                ));
            }
        }
    }

    let xor_splits = graph
        .nodes_of_kind(NodeKind::ExclusiveGateway)
        .filter(|g| graph.out_degree(&g.id) > 1)
        .count();
    let xor_merges = graph
        .nodes_of_kind(NodeKind::ExclusiveGateway)
        .filter(|g| graph.in_degree(&g.id) > 1)
        .count();
    if xor_splits > xor_merges {
        hits.push(PatternHit::new(
            "xor-split-without-merge",
            "More XOR splits than merges detected; ensure splits are closed.",
            None,
        ));
    }

    debug!(hit_count = hits.len(), "Forbidden pattern check completed");
    hits
}
