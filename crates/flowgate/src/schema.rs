//! Pre-flight structural schema gate
//!
//! A stricter, deliberately overlapping validation surface distinct from the
//! lint engine: it re-walks the document tree itself instead of trusting the
//! extracted graph, and reports UPPER_SNAKE error codes with element paths.
//! Overlap with lint (lane coverage, DI presence) is defense in depth, not
//! a defect to deduplicate. A failed report does not stop lint from running.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::core::NodeKind;
use crate::doc::{
    attr, child_named, children_named, descendants, find_descendant, text_of, BpmnDoc, BPMNDI_NS,
    BPMN_NS,
};

/// One schema violation with its document path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaError {
    pub path: String,
    pub code: String,
    pub message: String,
}

impl SchemaError {
    fn new(path: impl Into<String>, code: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Outcome of the schema gate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaReport {
    pub valid: bool,
    pub errors: Vec<SchemaError>,
}

impl SchemaReport {
    fn from_errors(errors: Vec<SchemaError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate the structural skeleton of a document.
pub fn validate_schema(doc: &BpmnDoc) -> SchemaReport {
    let mut errors = Vec::new();
    let root = doc.root();

    if !(root.name == "definitions" && root.namespace.as_deref() == Some(BPMN_NS)) {
        errors.push(SchemaError::new(
            "/",
            "ROOT_NOT_DEFINITIONS",
            format!("Expected <definitions> root, got '{}'", root.name),
        ));
    }

    // Strict descendants only: a document whose root IS a process element
    // still has no process under its definitions.
    let processes: Vec<_> = descendants(root)
        .skip(1)
        .filter(|el| el.name == "process" && el.namespace.as_deref() == Some(BPMN_NS))
        .collect();
    if processes.is_empty() {
        errors.push(SchemaError::new(
            "/definitions",
            "PROCESS_MISSING",
            "No <process> element found.",
        ));
    } else {
        let mut seen_ids: HashSet<&str> = HashSet::new();
        for process in &processes {
            match attr(process, "id") {
                None => errors.push(SchemaError::new(
                    "/definitions/process",
                    "PROCESS_ID_MISSING",
                    "Process element missing required id.",
                )),
                Some(pid) => {
                    if !seen_ids.insert(pid) {
                        errors.push(SchemaError::new(
                            format!("/definitions/process[@id='{}']", pid),
                            "PROCESS_ID_DUPLICATE",
                            format!("Duplicate process id '{}'.", pid),
                        ));
                    }
                }
            }
        }

        // Remaining checks gate the main process only.
        let process = processes[0];
        let process_id = attr(process, "id");

        let element_ids: HashSet<&str> = descendants(process).filter_map(|el| attr(el, "id")).collect();
        for flow in descendants(process)
            .filter(|el| el.name == "sequenceFlow" && el.namespace.as_deref() == Some(BPMN_NS))
        {
            let fid = attr(flow, "id").unwrap_or("");
            if let Some(src) = attr(flow, "sourceRef") {
                if !element_ids.contains(src) {
                    errors.push(SchemaError::new(
                        format!("/definitions/process/sequenceFlow[@id='{}']", fid),
                        "SEQUENCEFLOW_SOURCE_MISSING",
                        format!("SequenceFlow sourceRef '{}' not found.", src),
                    ));
                }
            }
            if let Some(tgt) = attr(flow, "targetRef") {
                if !element_ids.contains(tgt) {
                    errors.push(SchemaError::new(
                        format!("/definitions/process/sequenceFlow[@id='{}']", fid),
                        "SEQUENCEFLOW_TARGET_MISSING",
                        format!("SequenceFlow targetRef '{}' not found.", tgt),
                    ));
                }
            }
        }

        // A participant is optional at this layer; the binding must be
        // correct when one exists.
        if let Some(participant) = find_descendant(root, "participant", BPMN_NS) {
            if attr(participant, "processRef") != process_id {
                errors.push(SchemaError::new(
                    "/definitions/collaboration/participant",
                    "PARTICIPANT_BINDING",
                    "Participant does not reference the main process.",
                ));
            }
        }

        match child_named(process, "laneSet", BPMN_NS) {
            None => errors.push(SchemaError::new(
                "/definitions/process/laneSet",
                "LANESET_MISSING",
                "LaneSet with at least one lane is required.",
            )),
            Some(lane_set) => {
                let lane_refs: HashSet<String> = children_named(lane_set, "lane", BPMN_NS)
                    .flat_map(|lane| children_named(lane, "flowNodeRef", BPMN_NS))
                    .filter_map(text_of)
                    .collect();
                let mut missing: Vec<&str> = descendants(process)
                    .filter(|el| {
                        el.namespace.as_deref() == Some(BPMN_NS)
                            && NodeKind::from_tag(&el.name).is_some()
                    })
                    .filter_map(|el| attr(el, "id"))
                    .filter(|id| !lane_refs.contains(*id))
                    .collect();
                missing.sort_unstable();
                if !missing.is_empty() {
                    errors.push(SchemaError::new(
                        "/definitions/process/laneSet",
                        "LANESET_COVERAGE",
                        format!("Flow nodes missing from lanes: {}", missing.join(", ")),
                    ));
                }
            }
        }
    }

    let has_plane = find_descendant(root, "BPMNDiagram", BPMNDI_NS)
        .and_then(|d| child_named(d, "BPMNPlane", BPMNDI_NS))
        .is_some();
    if !has_plane {
        errors.push(SchemaError::new(
            "/definitions",
            "DI_MISSING",
            "BPMNDiagram/BPMNPlane required for DI.",
        ));
    }

    let report = SchemaReport::from_errors(errors);
    debug!(valid = report.valid, error_count = report.errors.len(), "Schema validation completed");
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(report: &SchemaReport) -> Vec<&str> {
        report.errors.iter().map(|e| e.code.as_str()).collect()
    }

    const DIRECT_FLOW: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" id="Definitions_1" targetNamespace="http://example.com/bpmn">
  <bpmn:process id="Process_1">
    <bpmn:startEvent id="Start_1"/>
    <bpmn:endEvent id="End_1"/>
    <bpmn:sequenceFlow id="Flow_1" sourceRef="Start_1" targetRef="End_1"/>
  </bpmn:process>
</bpmn:definitions>"#;

    const COMPLETE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL"
                  xmlns:bpmndi="http://www.omg.org/spec/BPMN/20100524/DI"
                  xmlns:dc="http://www.omg.org/spec/DD/20100524/DC"
                  id="Definitions_1" targetNamespace="http://example.com/bpmn">
  <bpmn:collaboration id="Collab_1">
    <bpmn:participant id="Participant_1" processRef="Process_1"/>
  </bpmn:collaboration>
  <bpmn:process id="Process_1" isExecutable="false">
    <bpmn:laneSet id="LaneSet_1">
      <bpmn:lane id="Lane_1" name="Main">
        <bpmn:flowNodeRef>Start_1</bpmn:flowNodeRef>
        <bpmn:flowNodeRef>End_1</bpmn:flowNodeRef>
      </bpmn:lane>
    </bpmn:laneSet>
    <bpmn:startEvent id="Start_1"/>
    <bpmn:endEvent id="End_1"/>
    <bpmn:sequenceFlow id="Flow_1" sourceRef="Start_1" targetRef="End_1"/>
  </bpmn:process>
  <bpmndi:BPMNDiagram id="Diagram_1">
    <bpmndi:BPMNPlane id="Plane_1" bpmnElement="Collab_1"/>
  </bpmndi:BPMNDiagram>
</bpmn:definitions>"#;

    #[test]
    fn test_complete_document_is_valid() {
        let doc = BpmnDoc::parse(COMPLETE).unwrap();
        let report = validate_schema(&doc);
        assert!(report.valid, "unexpected errors: {:?}", report.errors);
    }

    #[test]
    fn test_direct_flow_reports_exactly_two_codes() {
        let doc = BpmnDoc::parse(DIRECT_FLOW).unwrap();
        let report = validate_schema(&doc);
        assert!(!report.valid);
        assert_eq!(codes(&report), vec!["LANESET_MISSING", "DI_MISSING"]);
    }

    #[test]
    fn test_wrong_root() {
        let doc = BpmnDoc::parse(
            r#"<bpmn:process xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" id="P"/>"#,
        )
        .unwrap();
        let report = validate_schema(&doc);
        assert!(codes(&report).contains(&"ROOT_NOT_DEFINITIONS"));
        assert!(codes(&report).contains(&"PROCESS_MISSING"));
    }

    #[test]
    fn test_duplicate_and_missing_process_ids() {
        let xml = r#"<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL">
  <bpmn:process id="P1"/>
  <bpmn:process id="P1"/>
  <bpmn:process/>
</bpmn:definitions>"#;
        let doc = BpmnDoc::parse(xml).unwrap();
        let report = validate_schema(&doc);
        assert!(codes(&report).contains(&"PROCESS_ID_DUPLICATE"));
        assert!(codes(&report).contains(&"PROCESS_ID_MISSING"));
    }

    #[test]
    fn test_dangling_sequence_flow_refs() {
        let xml = r#"<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL">
  <bpmn:process id="P1">
    <bpmn:startEvent id="Start_1"/>
    <bpmn:sequenceFlow id="Flow_1" sourceRef="Start_1" targetRef="Nope_1"/>
  </bpmn:process>
</bpmn:definitions>"#;
        let doc = BpmnDoc::parse(xml).unwrap();
        let report = validate_schema(&doc);
        assert!(codes(&report).contains(&"SEQUENCEFLOW_TARGET_MISSING"));
        assert!(!codes(&report).contains(&"SEQUENCEFLOW_SOURCE_MISSING"));
    }

    #[test]
    fn test_participant_binding_mismatch() {
        let xml = COMPLETE.replace("processRef=\"Process_1\"", "processRef=\"Other_1\"");
        let doc = BpmnDoc::parse(&xml).unwrap();
        let report = validate_schema(&doc);
        assert_eq!(codes(&report), vec!["PARTICIPANT_BINDING"]);
    }

    #[test]
    fn test_lane_coverage_gap() {
        let xml = COMPLETE.replace("<bpmn:flowNodeRef>End_1</bpmn:flowNodeRef>", "");
        let doc = BpmnDoc::parse(&xml).unwrap();
        let report = validate_schema(&doc);
        let err = report
            .errors
            .iter()
            .find(|e| e.code == "LANESET_COVERAGE")
            .unwrap();
        assert!(err.message.contains("End_1"));
        assert!(!err.message.contains("Flow_1"));
    }
}
