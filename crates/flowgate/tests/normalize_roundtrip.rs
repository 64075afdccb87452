//! Normalization contract: canonical sizes, idempotence, serialization
//! round trips

use flowgate::prelude::*;
use flowgate::{normalize_document, BpmnDoc, NamespaceTable};
use proptest::prelude::*;

fn diagram_with_shape(tag: &str, width: f64, height: f64) -> String {
    format!(
        r#"<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL"
    xmlns:bpmndi="http://www.omg.org/spec/BPMN/20100524/DI"
    xmlns:dc="http://www.omg.org/spec/DD/20100524/DC">
  <bpmn:process id="Process_1">
    <bpmn:{tag} id="Node_1"/>
  </bpmn:process>
  <bpmndi:BPMNDiagram id="Diagram_1">
    <bpmndi:BPMNPlane id="Plane_1" bpmnElement="Process_1">
      <bpmndi:BPMNShape id="Node_1_di" bpmnElement="Node_1">
        <dc:Bounds x="240" y="130" width="{width}" height="{height}"/>
      </bpmndi:BPMNShape>
    </bpmndi:BPMNPlane>
  </bpmndi:BPMNDiagram>
</bpmn:definitions>"#
    )
}

#[test]
fn normalization_rewrites_only_width_and_height() {
    let mut doc = BpmnDoc::parse(&diagram_with_shape("userTask", 190.0, 55.0)).unwrap();
    let changes = normalize_document(&mut doc).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].node_id, "Node_1");
    assert_eq!(changes[0].from_size, (190.0, 55.0));
    assert_eq!(changes[0].to_size, (120.0, 80.0));

    let di = extract_di(&doc).unwrap();
    let bounds = di.shape_bounds("Node_1").unwrap();
    assert_eq!((bounds.x, bounds.y), (240.0, 130.0));
    assert_eq!((bounds.width, bounds.height), (120.0, 80.0));
}

#[test]
fn expanded_sub_process_is_exempt() {
    let xml = r#"<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL"
    xmlns:bpmndi="http://www.omg.org/spec/BPMN/20100524/DI"
    xmlns:dc="http://www.omg.org/spec/DD/20100524/DC">
  <bpmn:process id="Process_1">
    <bpmn:subProcess id="Sub_1"/>
  </bpmn:process>
  <bpmndi:BPMNDiagram id="Diagram_1">
    <bpmndi:BPMNPlane id="Plane_1" bpmnElement="Process_1">
      <bpmndi:BPMNShape id="Sub_1_di" bpmnElement="Sub_1" isExpanded="true">
        <dc:Bounds x="200" y="100" width="640" height="420"/>
      </bpmndi:BPMNShape>
    </bpmndi:BPMNPlane>
  </bpmndi:BPMNDiagram>
</bpmn:definitions>"#;
    let mut doc = BpmnDoc::parse(xml).unwrap();
    let changes = normalize_document(&mut doc).unwrap();
    assert!(changes.is_empty());
}

#[test]
fn serialization_round_trip_preserves_logical_content() {
    let mut doc = BpmnDoc::parse(&diagram_with_shape("userTask", 190.0, 55.0)).unwrap();
    normalize_document(&mut doc).unwrap();

    let xml = doc.pretty(&NamespaceTable::standard(), 2).unwrap();
    let reparsed = BpmnDoc::parse(&xml).unwrap();

    let before = extract_graph(&doc).unwrap();
    let after = extract_graph(&reparsed).unwrap();
    assert_eq!(before.process_id, after.process_id);
    assert_eq!(before.node_count(), after.node_count());
    assert_eq!(before.flow_count(), after.flow_count());

    let di_before = extract_di(&doc).unwrap();
    let di_after = extract_di(&reparsed).unwrap();
    assert_eq!(di_before, di_after);
}

proptest! {
    #[test]
    fn prop_normalization_is_idempotent(
        tag_index in 0usize..4,
        width in 1.0f64..500.0,
        height in 1.0f64..500.0,
    ) {
        let (tag, canonical) = [
            ("userTask", (120.0, 80.0)),
            ("serviceTask", (120.0, 80.0)),
            ("exclusiveGateway", (50.0, 50.0)),
            ("startEvent", (36.0, 36.0)),
        ][tag_index];

        let mut doc = BpmnDoc::parse(&diagram_with_shape(tag, width, height)).unwrap();
        normalize_document(&mut doc).unwrap();

        let di = extract_di(&doc).unwrap();
        let bounds = di.shape_bounds("Node_1").unwrap();
        prop_assert_eq!((bounds.width, bounds.height), canonical);

        // A second pass finds nothing left to rewrite.
        let changes = normalize_document(&mut doc).unwrap();
        prop_assert!(changes.is_empty());
    }
}
