//! ProcessModel bridge
//!
//! Bidirectional mapping between diagrams and a document-independent
//! logical model of actors, steps, and flows. The logical model is what
//! gets exchanged as JSON with external tooling; rebuilding a diagram from
//! it runs the layout engine so the result is contract-complete.
//!
//! Round-trip contract: `to_model(from_model(m))` preserves step ids,
//! flow ids, and per-entity kind/source/target/actor data. Coordinates are
//! allowed to differ.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use xmltree::XMLNode;

use crate::core::{NodeKind, Result};
use crate::doc::{bpmn_el, bpmndi_el, BpmnDoc};
use crate::graph::ProcessGraph;
use crate::layout::{apply_di, layout, FlowSpec, NodeSpec};

/// An actor (lane or participant) in the logical model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
}

/// One unit of work or control in the logical model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    pub actor_id: String,
    /// BPMN tag name of the node kind, e.g. `userTask`
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// A directed connection between two steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(default)]
    pub condition: Option<String>,
}

/// Document-independent logical process view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessModel {
    pub id: String,
    pub name: String,
    pub actors: Vec<Actor>,
    pub steps: Vec<Step>,
    pub flows: Vec<Flow>,
}

impl ProcessModel {
    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Map an extracted graph to its logical model.
///
/// Actors come from lanes; with no lane set the participant stands in, and
/// with neither a single synthetic UNSPECIFIED actor is used. Steps keep
/// their lane as `actorId` and fall back to the first actor.
pub fn to_model(graph: &ProcessGraph) -> ProcessModel {
    let process_id = if graph.process_id.is_empty() {
        "process_1".to_string()
    } else {
        graph.process_id.clone()
    };
    let process_name = if graph.process_name.is_empty() {
        process_id.clone()
    } else {
        graph.process_name.clone()
    };

    let mut actors: Vec<Actor> = graph
        .lanes()
        .map(|lane| Actor {
            id: lane.id.clone(),
            name: lane.name.clone().unwrap_or_else(|| lane.id.clone()),
        })
        .collect();
    if actors.is_empty() {
        actors.push(match &graph.participant {
            Some(p) => {
                let id = if p.id.is_empty() {
                    "actor_1".to_string()
                } else {
                    p.id.clone()
                };
                Actor {
                    name: p.name.clone().unwrap_or_else(|| id.clone()),
                    id,
                }
            }
            None => Actor {
                id: "actor_1".to_string(),
                name: "UNSPECIFIED".to_string(),
            },
        });
    }
    let default_actor = actors[0].id.clone();

    let steps: Vec<Step> = graph
        .nodes()
        .map(|node| Step {
            id: node.id.clone(),
            actor_id: node
                .lane_id
                .clone()
                .unwrap_or_else(|| default_actor.clone()),
            kind: node.kind.tag().to_string(),
            name: node.name.clone().unwrap_or_else(|| node.id.clone()),
            metadata: serde_json::Map::new(),
        })
        .collect();

    let flows: Vec<Flow> = graph
        .flows()
        .map(|flow| Flow {
            id: flow.id.clone(),
            source_id: flow.source_id.clone(),
            target_id: flow.target_id.clone(),
            condition: flow.condition_name.clone(),
        })
        .collect();

    debug!(
        actor_count = actors.len(),
        step_count = steps.len(),
        flow_count = flows.len(),
        "Mapped graph to process model"
    );
    ProcessModel {
        id: process_id,
        name: process_name,
        actors,
        steps,
        flows,
    }
}

/// Build a complete diagram document from a logical model.
///
/// Emits collaboration/participant, process with lane set and membership,
/// one element per step, one sequence flow per flow, then attaches a full
/// left-to-right layout. A model without actors gets one synthetic lane.
pub fn from_model(model: &ProcessModel) -> BpmnDoc {
    let mut actors = model.actors.clone();
    if actors.is_empty() {
        actors.push(Actor {
            id: "Lane_Main".to_string(),
            name: "Main Lane".to_string(),
        });
    }
    let known_lanes: HashMap<&str, ()> = actors.iter().map(|a| (a.id.as_str(), ())).collect();
    let default_lane = actors[0].id.clone();
    let lane_for = |actor_id: &str| -> String {
        if known_lanes.contains_key(actor_id) {
            actor_id.to_string()
        } else {
            default_lane.clone()
        }
    };

    let mut definitions = bpmn_el("definitions");
    definitions
        .attributes
        .insert("id".to_string(), format!("Definitions_{}", model.id));
    definitions.attributes.insert(
        "targetNamespace".to_string(),
        "http://example.com/bpmn".to_string(),
    );

    let mut process = bpmn_el("process");
    process.attributes.insert("id".to_string(), model.id.clone());
    process
        .attributes
        .insert("name".to_string(), model.name.clone());
    process
        .attributes
        .insert("isExecutable".to_string(), "false".to_string());

    // Lane membership first, so lanes carry their flowNodeRefs when built.
    let mut members: HashMap<String, Vec<&str>> = HashMap::new();
    for step in &model.steps {
        members
            .entry(lane_for(&step.actor_id))
            .or_default()
            .push(&step.id);
    }

    let mut lane_set = bpmn_el("laneSet");
    lane_set
        .attributes
        .insert("id".to_string(), format!("LaneSet_{}", model.id));
    for actor in &actors {
        let mut lane = bpmn_el("lane");
        lane.attributes.insert("id".to_string(), actor.id.clone());
        lane.attributes
            .insert("name".to_string(), actor.name.clone());
        for member in members.get(&actor.id).into_iter().flatten() {
            let mut node_ref = bpmn_el("flowNodeRef");
            node_ref.children.push(XMLNode::Text((*member).to_string()));
            lane.children.push(XMLNode::Element(node_ref));
        }
        lane_set.children.push(XMLNode::Element(lane));
    }
    process.children.push(XMLNode::Element(lane_set));

    for step in &model.steps {
        let kind = NodeKind::from_tag(&step.kind).unwrap_or(NodeKind::Task);
        let mut el = bpmn_el(kind.tag());
        el.attributes.insert("id".to_string(), step.id.clone());
        el.attributes.insert("name".to_string(), step.name.clone());
        process.children.push(XMLNode::Element(el));
    }

    for flow in &model.flows {
        let mut el = bpmn_el("sequenceFlow");
        el.attributes.insert("id".to_string(), flow.id.clone());
        el.attributes
            .insert("sourceRef".to_string(), flow.source_id.clone());
        el.attributes
            .insert("targetRef".to_string(), flow.target_id.clone());
        if let Some(condition) = &flow.condition {
            el.attributes.insert("name".to_string(), condition.clone());
        }
        process.children.push(XMLNode::Element(el));
    }

    let mut collaboration = bpmn_el("collaboration");
    collaboration
        .attributes
        .insert("id".to_string(), format!("Collab_{}", model.id));
    let mut participant = bpmn_el("participant");
    participant
        .attributes
        .insert("id".to_string(), format!("Participant_{}", model.id));
    participant
        .attributes
        .insert("name".to_string(), model.name.clone());
    participant
        .attributes
        .insert("processRef".to_string(), model.id.clone());
    collaboration.children.push(XMLNode::Element(participant));

    let mut diagram = bpmndi_el("BPMNDiagram");
    diagram
        .attributes
        .insert("id".to_string(), format!("Diagram_{}", model.id));
    let mut plane = bpmndi_el("BPMNPlane");
    plane
        .attributes
        .insert("id".to_string(), format!("Plane_{}", model.id));
    plane
        .attributes
        .insert("bpmnElement".to_string(), format!("Collab_{}", model.id));
    diagram.children.push(XMLNode::Element(plane));

    definitions.children.push(XMLNode::Element(process));
    definitions.children.push(XMLNode::Element(collaboration));
    definitions.children.push(XMLNode::Element(diagram));

    let mut doc = BpmnDoc::from_root(definitions);

    let node_specs: Vec<NodeSpec> = model
        .steps
        .iter()
        .enumerate()
        .map(|(index, step)| NodeSpec {
            id: step.id.clone(),
            lane_id: Some(lane_for(&step.actor_id)),
            kind: NodeKind::from_tag(&step.kind).unwrap_or(NodeKind::Task),
            order: index,
        })
        .collect();
    let flow_specs: Vec<FlowSpec> = model
        .flows
        .iter()
        .map(|flow| FlowSpec {
            id: flow.id.clone(),
            source_id: flow.source_id.clone(),
            target_id: flow.target_id.clone(),
        })
        .collect();
    apply_di(&mut doc, &layout(&node_specs, &flow_specs));

    debug!(model_id = %model.id, step_count = model.steps.len(), "Built document from process model");
    doc
}
