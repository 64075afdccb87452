//! Itemized validation checklist
//!
//! A reviewer-facing surface: every expectation a diagram must meet is
//! reported as its own pass/warn/fail line, including the ones that pass.
//! The single-file checker folds fails into errors and warns into warnings.

use std::fmt;

use tracing::debug;

use crate::core::NodeKind;
use crate::doc::{find_descendant, BpmnDoc, BPMN_NS};
use crate::extract::{extract_di, extract_graph};

/// Outcome of one checklist item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecklistStatus {
    Pass,
    Warn,
    Fail,
}

impl fmt::Display for ChecklistStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecklistStatus::Pass => write!(f, "pass"),
            ChecklistStatus::Warn => write!(f, "warn"),
            ChecklistStatus::Fail => write!(f, "fail"),
        }
    }
}

/// One checklist line
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistItem {
    pub id: String,
    pub status: ChecklistStatus,
    pub message: String,
}

impl ChecklistItem {
    fn new(id: impl Into<String>, ok: bool, warn_only: bool, message: &str) -> Self {
        let status = if ok {
            ChecklistStatus::Pass
        } else if warn_only {
            ChecklistStatus::Warn
        } else {
            ChecklistStatus::Fail
        };
        Self {
            id: id.into(),
            status,
            message: message.to_string(),
        }
    }
}

/// Run the full checklist against a parsed document.
pub fn run_checklist(doc: &BpmnDoc) -> Vec<ChecklistItem> {
    let mut items = Vec::new();
    let root = doc.root();

    items.push(ChecklistItem::new(
        "definitions-exists",
        root.name == "definitions",
        false,
        "Root is <definitions>.",
    ));

    let has_process = find_descendant(root, "process", BPMN_NS).is_some();
    items.push(ChecklistItem::new(
        "process-exists",
        has_process,
        false,
        "Process element exists.",
    ));
    if !has_process {
        return items;
    }

    // The process exists, so extraction cannot fail.
    let Ok(graph) = extract_graph(doc) else {
        return items;
    };
    let di = extract_di(doc);

    let participant_bound = graph
        .participant
        .as_ref()
        .map(|p| p.process_ref.as_deref() == Some(graph.process_id.as_str()))
        .unwrap_or(false);
    items.push(ChecklistItem::new(
        "participant-present",
        participant_bound,
        false,
        "Participant references main process.",
    ));
    items.push(ChecklistItem::new(
        "process-isExecutable-false",
        graph.is_executable == Some(false),
        true,
        "Process defaults to isExecutable=\"false\".",
    ));

    items.push(ChecklistItem::new(
        "start-event-present",
        graph
            .nodes_of_kind(NodeKind::StartEvent)
            .next()
            .is_some(),
        false,
        "At least one start event.",
    ));
    items.push(ChecklistItem::new(
        "end-event-present",
        graph
            .nodes_of_kind(NodeKind::EndEvent)
            .next()
            .is_some(),
        false,
        "At least one end event.",
    ));

    for flow in graph.flows() {
        items.push(ChecklistItem::new(
            format!("flow-source-{}", flow.id),
            graph.has_node(&flow.source_id),
            false,
            "SequenceFlow sourceRef exists.",
        ));
        items.push(ChecklistItem::new(
            format!("flow-target-{}", flow.id),
            graph.has_node(&flow.target_id),
            false,
            "SequenceFlow targetRef exists.",
        ));
    }

    items.push(ChecklistItem::new(
        "lane-set-present",
        graph.has_lane_set,
        false,
        "Lane set present.",
    ));
    if graph.has_lane_set {
        let all_covered = graph.nodes().all(|n| graph.lane_of(&n.id).is_some());
        items.push(ChecklistItem::new(
            "lane-membership-complete",
            all_covered,
            false,
            "All nodes referenced by lanes.",
        ));
    }

    let splits = graph
        .nodes_of_kind(NodeKind::ExclusiveGateway)
        .filter(|g| graph.out_degree(&g.id) > 1)
        .count();
    let merges = graph
        .nodes_of_kind(NodeKind::ExclusiveGateway)
        .filter(|g| graph.in_degree(&g.id) > 1)
        .count();
    items.push(ChecklistItem::new(
        "xor-split-merge-balance",
        merges >= splits,
        true,
        "Exclusive gateways have merges for splits.",
    ));

    match di {
        Some(di) => {
            let expected_plane = graph
                .collaboration_id
                .clone()
                .unwrap_or_else(|| graph.process_id.clone());
            items.push(ChecklistItem::new(
                "di-plane-binding",
                di.plane_element.as_deref() == Some(expected_plane.as_str()),
                false,
                "BPMNPlane bound to collaboration or process.",
            ));
            items.push(ChecklistItem::new(
                "di-shapes-complete",
                graph.nodes().all(|n| di.shapes.contains_key(&n.id)),
                false,
                "All nodes have shapes.",
            ));
            items.push(ChecklistItem::new(
                "di-edges-complete",
                graph.flows().all(|f| di.edges.contains_key(&f.id)),
                false,
                "All flows have edges.",
            ));
        }
        None => {
            items.push(ChecklistItem::new(
                "di-present",
                false,
                false,
                "BPMNDiagram/BPMNPlane present.",
            ));
        }
    }

    debug!(item_count = items.len(), "Checklist completed");
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL"
                  xmlns:bpmndi="http://www.omg.org/spec/BPMN/20100524/DI"
                  xmlns:dc="http://www.omg.org/spec/DD/20100524/DC"
                  xmlns:di="http://www.omg.org/spec/DD/20100524/DI"
                  id="Definitions_1" targetNamespace="http://example.com/bpmn">
  <bpmn:collaboration id="Collab_1">
    <bpmn:participant id="Participant_1" processRef="Process_1"/>
  </bpmn:collaboration>
  <bpmn:process id="Process_1" isExecutable="false">
    <bpmn:laneSet id="LaneSet_1">
      <bpmn:lane id="Lane_1" name="Main">
        <bpmn:flowNodeRef>Start_1</bpmn:flowNodeRef>
        <bpmn:flowNodeRef>Task_1</bpmn:flowNodeRef>
        <bpmn:flowNodeRef>End_1</bpmn:flowNodeRef>
      </bpmn:lane>
    </bpmn:laneSet>
    <bpmn:startEvent id="Start_1"/>
    <bpmn:userTask id="Task_1"/>
    <bpmn:endEvent id="End_1"/>
    <bpmn:sequenceFlow id="Flow_1" sourceRef="Start_1" targetRef="Task_1"/>
    <bpmn:sequenceFlow id="Flow_2" sourceRef="Task_1" targetRef="End_1"/>
  </bpmn:process>
  <bpmndi:BPMNDiagram id="Diagram_1">
    <bpmndi:BPMNPlane id="Plane_1" bpmnElement="Collab_1">
      <bpmndi:BPMNShape id="Start_1_di" bpmnElement="Start_1">
        <dc:Bounds x="102" y="162" width="36" height="36"/>
      </bpmndi:BPMNShape>
      <bpmndi:BPMNShape id="Task_1_di" bpmnElement="Task_1">
        <dc:Bounds x="210" y="140" width="120" height="80"/>
      </bpmndi:BPMNShape>
      <bpmndi:BPMNShape id="End_1_di" bpmnElement="End_1">
        <dc:Bounds x="402" y="162" width="36" height="36"/>
      </bpmndi:BPMNShape>
      <bpmndi:BPMNEdge id="Flow_1_di" bpmnElement="Flow_1">
        <di:waypoint x="138" y="180"/>
        <di:waypoint x="210" y="180"/>
      </bpmndi:BPMNEdge>
      <bpmndi:BPMNEdge id="Flow_2_di" bpmnElement="Flow_2">
        <di:waypoint x="330" y="180"/>
        <di:waypoint x="402" y="180"/>
      </bpmndi:BPMNEdge>
    </bpmndi:BPMNPlane>
  </bpmndi:BPMNDiagram>
</bpmn:definitions>"#;

    fn by_id<'a>(items: &'a [ChecklistItem], id: &str) -> &'a ChecklistItem {
        items.iter().find(|i| i.id == id).unwrap()
    }

    #[test]
    fn test_complete_document_all_pass() {
        let doc = BpmnDoc::parse(COMPLETE).unwrap();
        let items = run_checklist(&doc);
        let failures: Vec<_> = items
            .iter()
            .filter(|i| i.status != ChecklistStatus::Pass)
            .collect();
        assert!(failures.is_empty(), "unexpected non-pass: {:?}", failures);
    }

    #[test]
    fn test_per_flow_items_present() {
        let doc = BpmnDoc::parse(COMPLETE).unwrap();
        let items = run_checklist(&doc);
        assert_eq!(by_id(&items, "flow-source-Flow_1").status, ChecklistStatus::Pass);
        assert_eq!(by_id(&items, "flow-target-Flow_2").status, ChecklistStatus::Pass);
    }

    #[test]
    fn test_executable_true_warns_not_fails() {
        let xml = COMPLETE.replace("isExecutable=\"false\"", "isExecutable=\"true\"");
        let doc = BpmnDoc::parse(&xml).unwrap();
        let items = run_checklist(&doc);
        assert_eq!(
            by_id(&items, "process-isExecutable-false").status,
            ChecklistStatus::Warn
        );
    }

    #[test]
    fn test_missing_di_reports_single_item() {
        let xml = r#"<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL">
  <bpmn:process id="P">
    <bpmn:startEvent id="Start_1"/>
  </bpmn:process>
</bpmn:definitions>"#;
        let doc = BpmnDoc::parse(xml).unwrap();
        let items = run_checklist(&doc);
        assert_eq!(by_id(&items, "di-present").status, ChecklistStatus::Fail);
        assert!(items.iter().all(|i| i.id != "di-plane-binding"));
    }

    #[test]
    fn test_no_process_short_circuits() {
        let doc = BpmnDoc::parse(
            r#"<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL"/>"#,
        )
        .unwrap();
        let items = run_checklist(&doc);
        assert_eq!(items.len(), 2);
        assert_eq!(by_id(&items, "process-exists").status, ChecklistStatus::Fail);
    }

    #[test]
    fn test_unbalanced_xor_warns() {
        let xml = COMPLETE
            .replace(
                "<bpmn:userTask id=\"Task_1\"/>",
                "<bpmn:exclusiveGateway id=\"Gate_1\"/><bpmn:userTask id=\"Task_1\"/><bpmn:userTask id=\"Task_2\"/>",
            )
            .replace(
                "<bpmn:sequenceFlow id=\"Flow_1\" sourceRef=\"Start_1\" targetRef=\"Task_1\"/>",
                "<bpmn:sequenceFlow id=\"Flow_1\" sourceRef=\"Start_1\" targetRef=\"Gate_1\"/><bpmn:sequenceFlow id=\"Flow_3\" sourceRef=\"Gate_1\" targetRef=\"Task_1\"/><bpmn:sequenceFlow id=\"Flow_4\" sourceRef=\"Gate_1\" targetRef=\"Task_2\"/>",
            );
        let doc = BpmnDoc::parse(&xml).unwrap();
        let items = run_checklist(&doc);
        assert_eq!(
            by_id(&items, "xor-split-merge-balance").status,
            ChecklistStatus::Warn
        );
    }
}
