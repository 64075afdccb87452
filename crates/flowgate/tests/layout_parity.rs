//! Layout parity: what the engine computes is exactly what the document
//! reports back after merging

use flowgate::prelude::*;
use flowgate::{BpmnDoc, NamespaceTable};

const TWO_LANES: &str = r#"<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL"
    id="Definitions_1" targetNamespace="http://example.com/bpmn">
  <bpmn:collaboration id="Collab_1">
    <bpmn:participant id="Participant_1" name="Claims" processRef="Process_1"/>
  </bpmn:collaboration>
  <bpmn:process id="Process_1" isExecutable="false">
    <bpmn:laneSet id="LaneSet_1">
      <bpmn:lane id="Lane_Agent" name="Agent">
        <bpmn:flowNodeRef>Start_1</bpmn:flowNodeRef>
        <bpmn:flowNodeRef>Task_Review</bpmn:flowNodeRef>
      </bpmn:lane>
      <bpmn:lane id="Lane_System" name="System">
        <bpmn:flowNodeRef>Task_Book</bpmn:flowNodeRef>
        <bpmn:flowNodeRef>End_1</bpmn:flowNodeRef>
      </bpmn:lane>
    </bpmn:laneSet>
    <bpmn:startEvent id="Start_1"/>
    <bpmn:userTask id="Task_Review" name="Review claim"/>
    <bpmn:serviceTask id="Task_Book" name="Book payout"/>
    <bpmn:endEvent id="End_1"/>
    <bpmn:sequenceFlow id="F1" sourceRef="Start_1" targetRef="Task_Review"/>
    <bpmn:sequenceFlow id="F2" sourceRef="Task_Review" targetRef="Task_Book"/>
    <bpmn:sequenceFlow id="F3" sourceRef="Task_Book" targetRef="End_1"/>
  </bpmn:process>
</bpmn:definitions>"#;

#[test]
fn applied_layout_reads_back_identically() {
    let mut doc = BpmnDoc::parse(TWO_LANES).unwrap();
    let graph = extract_graph(&doc).unwrap();
    let computed = layout_graph(&graph);

    apply_di(&mut doc, &computed);
    let read_back = extract_di(&doc).expect("DI present after merge");

    assert_eq!(read_back.shapes, computed.shapes);
    assert_eq!(read_back.edges, computed.edges);
    assert_eq!(read_back.plane_element.as_deref(), Some("Collab_1"));
}

#[test]
fn parity_survives_a_serialization_round_trip() {
    let mut doc = BpmnDoc::parse(TWO_LANES).unwrap();
    let graph = extract_graph(&doc).unwrap();
    let computed = layout_graph(&graph);
    apply_di(&mut doc, &computed);

    let xml = doc.pretty(&NamespaceTable::standard(), 2).unwrap();
    let reparsed = BpmnDoc::parse(&xml).unwrap();
    let read_back = extract_di(&reparsed).expect("DI present after round trip");

    assert_eq!(read_back.shapes, computed.shapes);
    assert_eq!(read_back.edges, computed.edges);
}

#[test]
fn reapplying_the_same_layout_is_idempotent() {
    let mut doc = BpmnDoc::parse(TWO_LANES).unwrap();
    let graph = extract_graph(&doc).unwrap();
    let computed = layout_graph(&graph);

    apply_di(&mut doc, &computed);
    let first = doc.pretty(&NamespaceTable::standard(), 2).unwrap();
    apply_di(&mut doc, &computed);
    let second = doc.pretty(&NamespaceTable::standard(), 2).unwrap();
    assert_eq!(first, second);
}

#[test]
fn cross_lane_flow_routes_through_a_midpoint() {
    let doc = BpmnDoc::parse(TWO_LANES).unwrap();
    let graph = extract_graph(&doc).unwrap();
    let di = layout_graph(&graph);

    // Task_Review sits in the Agent lane, Task_Book in the System lane.
    let waypoints = &di.edges["F2"];
    assert_eq!(waypoints.len(), 4);
    assert!(waypoints[0].y < waypoints[3].y);
}

#[test]
fn merge_preserves_existing_unrelated_shapes() {
    let mut doc = BpmnDoc::parse(
        r#"<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL"
    xmlns:bpmndi="http://www.omg.org/spec/BPMN/20100524/DI"
    xmlns:dc="http://www.omg.org/spec/DD/20100524/DC">
  <bpmn:process id="Process_1">
    <bpmn:userTask id="Task_1"/>
    <bpmn:textAnnotation id="Note_1"/>
  </bpmn:process>
  <bpmndi:BPMNDiagram id="Diagram_1">
    <bpmndi:BPMNPlane id="Plane_1" bpmnElement="Process_1">
      <bpmndi:BPMNShape id="Note_1_di" bpmnElement="Note_1">
        <dc:Bounds x="500" y="60" width="100" height="30"/>
      </bpmndi:BPMNShape>
    </bpmndi:BPMNPlane>
  </bpmndi:BPMNDiagram>
</bpmn:definitions>"#,
    )
    .unwrap();
    let graph = extract_graph(&doc).unwrap();
    apply_di(&mut doc, &layout_graph(&graph));

    let di = extract_di(&doc).unwrap();
    // The annotation shape is untouched, the task shape is new.
    assert_eq!(
        di.shape_bounds("Note_1"),
        Some(Bounds::new(500.0, 60.0, 100.0, 30.0))
    );
    assert!(di.shape_bounds("Task_1").is_some());
}
