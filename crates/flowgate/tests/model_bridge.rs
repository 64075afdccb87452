//! Bridging between BPMN documents and the simplified process model

use flowgate::model::{from_model, to_model, Actor, Flow, ProcessModel, Step};
use flowgate::prelude::*;
use flowgate::{audit_document, BpmnDoc};

fn sample_model() -> ProcessModel {
    ProcessModel {
        id: "orders".to_string(),
        name: "Order handling".to_string(),
        actors: vec![
            Actor {
                id: "clerk".to_string(),
                name: "Clerk".to_string(),
            },
            Actor {
                id: "system".to_string(),
                name: "Order system".to_string(),
            },
        ],
        steps: vec![
            Step {
                id: "start".to_string(),
                actor_id: "clerk".to_string(),
                kind: "startEvent".to_string(),
                name: "Order received".to_string(),
                metadata: Default::default(),
            },
            Step {
                id: "review".to_string(),
                actor_id: "clerk".to_string(),
                kind: "userTask".to_string(),
                name: "Review order".to_string(),
                metadata: Default::default(),
            },
            Step {
                id: "reserve".to_string(),
                actor_id: "system".to_string(),
                kind: "serviceTask".to_string(),
                name: "Reserve stock".to_string(),
                metadata: Default::default(),
            },
            Step {
                id: "done".to_string(),
                actor_id: "system".to_string(),
                kind: "endEvent".to_string(),
                name: "Order handled".to_string(),
                metadata: Default::default(),
            },
        ],
        flows: vec![
            Flow {
                id: "f1".to_string(),
                source_id: "start".to_string(),
                target_id: "review".to_string(),
                condition: None,
            },
            Flow {
                id: "f2".to_string(),
                source_id: "review".to_string(),
                target_id: "reserve".to_string(),
                condition: Some("approved".to_string()),
            },
            Flow {
                id: "f3".to_string(),
                source_id: "reserve".to_string(),
                target_id: "done".to_string(),
                condition: None,
            },
        ],
    }
}

#[test]
fn generated_document_round_trips_through_the_graph() {
    let model = sample_model();
    let doc = from_model(&model);
    let graph = extract_graph(&doc).unwrap();
    let back = to_model(&graph);

    assert_eq!(back.id, model.id);
    assert_eq!(back.steps.len(), model.steps.len());
    assert_eq!(back.flows.len(), model.flows.len());
    assert_eq!(back.actors.len(), model.actors.len());

    let condition = back
        .flows
        .iter()
        .find(|f| f.id == "f2")
        .and_then(|f| f.condition.clone());
    assert_eq!(condition.as_deref(), Some("approved"));
}

#[test]
fn generated_document_passes_the_audit() {
    let doc = from_model(&sample_model());
    let issues = audit_document(&doc).unwrap();
    let blocking: Vec<&AuditIssue> = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .collect();
    assert!(
        blocking.is_empty(),
        "unexpected blocking issues: {:?}",
        blocking.iter().map(|i| &i.rule_id).collect::<Vec<_>>()
    );

    let report = validate_schema(&doc);
    assert!(report.valid, "schema errors: {:?}", report.errors);
}

#[test]
fn generated_document_carries_complete_di() {
    let doc = from_model(&sample_model());
    let graph = extract_graph(&doc).unwrap();
    let di = extract_di(&doc).expect("generated documents include DI");

    for node in graph.nodes() {
        assert!(
            di.shape_bounds(&node.id).is_some(),
            "missing shape for {}",
            node.id
        );
    }
    for flow in graph.flows() {
        assert!(di.edges.contains_key(&flow.id), "missing edge for {}", flow.id);
    }
}

#[test]
fn json_round_trip_uses_camel_case() {
    let model = sample_model();
    let json = model.to_json().unwrap();
    assert!(json.contains("\"sourceId\""));
    assert!(json.contains("\"actorId\""));

    let back = ProcessModel::from_json(&json).unwrap();
    assert_eq!(back, model);
}

#[test]
fn document_without_lanes_gets_a_synthetic_actor() {
    let doc = BpmnDoc::parse(
        r#"<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL">
  <bpmn:process id="P1">
    <bpmn:startEvent id="S"/>
    <bpmn:endEvent id="E"/>
    <bpmn:sequenceFlow id="F" sourceRef="S" targetRef="E"/>
  </bpmn:process>
</bpmn:definitions>"#,
    )
    .unwrap();
    let graph = extract_graph(&doc).unwrap();
    let model = to_model(&graph);
    assert_eq!(model.actors.len(), 1);
    assert!(model.steps.iter().all(|s| s.actor_id == model.actors[0].id));
}
