//! Shape-size normalization
//!
//! Rewrites DI bounds to the canonical size for each flow-node kind:
//! activity boxes 120x80, gateways 50x50, events 36x36. Only width and
//! height change; positions are preserved so surrounding layout survives.
//! Expanded sub-processes are exempt, nodes without a DI shape are left
//! for the parity lint to report.

use std::collections::HashMap;

use tracing::{debug, trace};
use xmltree::Element;

use crate::core::{NodeKind, NormalizationChange};
use crate::doc::{fmt_coord, BpmnDoc, BPMNDI_NS, DC_NS};
use crate::graph::ProcessGraph;

/// Rewrite non-canonical shape sizes in place.
///
/// Returns one change record per rewritten shape. Running twice yields no
/// further changes.
pub fn normalize_sizes(doc: &mut BpmnDoc, graph: &ProcessGraph) -> Vec<NormalizationChange> {
    let kinds: HashMap<&str, NodeKind> = graph
        .nodes()
        .map(|n| (n.id.as_str(), n.kind))
        .collect();

    let mut changes = Vec::new();
    visit_mut(doc.root_mut(), &mut |el| {
        if !(el.name == "BPMNShape" && el.namespace.as_deref() == Some(BPMNDI_NS)) {
            return;
        }
        let Some(element_id) = el.attributes.get("bpmnElement").cloned() else {
            return;
        };
        let Some(kind) = kinds.get(element_id.as_str()).copied() else {
            return;
        };
        let expanded = el.attributes.get("isExpanded").map(String::as_str) == Some("true");
        let Some((target_w, target_h)) = kind.canonical_size(expanded) else {
            trace!(node_id = %element_id, "Expanded sub-process keeps authored size");
            return;
        };

        for child in el.children.iter_mut() {
            let Some(bounds) = child.as_mut_element() else {
                continue;
            };
            if !(bounds.name == "Bounds" && bounds.namespace.as_deref() == Some(DC_NS)) {
                continue;
            }
            let width = size_attr(bounds, "width");
            let height = size_attr(bounds, "height");
            if (width, height) != (target_w, target_h) {
                trace!(
                    node_id = %element_id,
                    from = ?(width, height),
                    to = ?(target_w, target_h),
                    "Normalizing shape size"
                );
                bounds
                    .attributes
                    .insert("width".to_string(), fmt_coord(target_w));
                bounds
                    .attributes
                    .insert("height".to_string(), fmt_coord(target_h));
                changes.push(NormalizationChange {
                    node_id: element_id.clone(),
                    from_size: (width, height),
                    to_size: (target_w, target_h),
                });
            }
            break;
        }
    });

    debug!(change_count = changes.len(), "Shape sizes normalized");
    changes
}

fn size_attr(el: &Element, name: &str) -> f64 {
    el.attributes
        .get(name)
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn visit_mut(el: &mut Element, f: &mut impl FnMut(&mut Element)) {
    f(el);
    for child in el.children.iter_mut() {
        if let Some(child_el) = child.as_mut_element() {
            visit_mut(child_el, f);
        }
    }
}
