//! Typed process-graph model
//!
//! Stores the flow nodes, sequence flows, and lanes of one BPMN process,
//! plus the collaboration metadata the rule engines need. Maintains
//! insertion order for deterministic iteration. A graph lives for the
//! duration of one operation and is never persisted.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::core::NodeKind;

/// A flow node with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct FlowNode {
    /// Unique identifier within the graph
    pub id: String,
    /// Classified kind
    pub kind: NodeKind,
    /// Display name, when authored
    pub name: Option<String>,
    /// Owning lane, when a lane set exists
    pub lane_id: Option<String>,
    /// Position hint within its lane, used only for layout
    pub order: usize,
    /// Attachment target for boundary events
    pub attached_to: Option<String>,
}

impl FlowNode {
    /// Create a new flow node
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: None,
            lane_id: None,
            order: 0,
            attached_to: None,
        }
    }
}

/// A directed sequence flow between two nodes
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceFlow {
    /// Unique identifier within the graph
    pub id: String,
    /// Source node id
    pub source_id: String,
    /// Target node id
    pub target_id: String,
    /// Display name, doubling as a condition hint
    pub condition_name: Option<String>,
}

impl SequenceFlow {
    /// Create a new sequence flow
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            condition_name: None,
        }
    }
}

/// A lane (named subdivision) of the process
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    /// Unique identifier
    pub id: String,
    /// Display name, when authored
    pub name: Option<String>,
    /// Member node ids in document order
    pub node_refs: Vec<String>,
}

/// The collaboration participant bound to the process
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: String,
    pub name: Option<String>,
    /// The process this participant claims to represent
    pub process_ref: Option<String>,
}

/// Typed graph view over one BPMN process.
///
/// Owns its nodes, flows, and lanes for the duration of one command
/// invocation. The normalizer and layout engine rewrite visual data only;
/// the rule engines read.
#[derive(Debug, Clone, Default)]
pub struct ProcessGraph {
    /// Process element id
    pub process_id: String,
    /// Process display name (falls back to the id)
    pub process_name: String,
    /// Raw `isExecutable` attribute, when present
    pub is_executable: Option<bool>,
    /// Collaboration element id, when present
    pub collaboration_id: Option<String>,
    /// Participant bound to the process, when present
    pub participant: Option<Participant>,
    /// True when the process declares a lane set (even an empty one)
    pub has_lane_set: bool,
    nodes: Vec<FlowNode>,
    node_index: HashMap<String, usize>,
    flows: Vec<SequenceFlow>,
    lanes: Vec<Lane>,
}

impl ProcessGraph {
    /// Create an empty graph for the given process
    pub fn new(process_id: impl Into<String>, process_name: impl Into<String>) -> Self {
        Self {
            process_id: process_id.into(),
            process_name: process_name.into(),
            ..Default::default()
        }
    }

    /// Add a node, assigning its per-lane order hint.
    ///
    /// First insertion wins on duplicate ids; the duplicate is dropped so
    /// degree queries stay unambiguous (the schema validator reports the
    /// underlying defect).
    pub fn add_node(&mut self, mut node: FlowNode) {
        if self.node_index.contains_key(&node.id) {
            trace!(node_id = %node.id, "Duplicate node id, keeping first");
            return;
        }
        node.order = self
            .nodes
            .iter()
            .filter(|n| n.lane_id == node.lane_id)
            .count();
        trace!(node_id = %node.id, kind = %node.kind, lane = ?node.lane_id, "Adding node");
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        debug!(node_count = self.node_count(), "Node added");
    }

    /// Add a sequence flow
    pub fn add_flow(&mut self, flow: SequenceFlow) {
        trace!(flow_id = %flow.id, source = %flow.source_id, target = %flow.target_id, "Adding flow");
        self.flows.push(flow);
    }

    /// Add a lane
    pub fn add_lane(&mut self, lane: Lane) {
        trace!(lane_id = %lane.id, members = lane.node_refs.len(), "Adding lane");
        self.lanes.push(lane);
    }

    /// Check if a node exists
    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Get a node by id
    pub fn get_node(&self, id: &str) -> Option<&FlowNode> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    /// Iterate over nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &FlowNode> {
        self.nodes.iter()
    }

    /// Iterate over flows in insertion order
    pub fn flows(&self) -> impl Iterator<Item = &SequenceFlow> {
        self.flows.iter()
    }

    /// Iterate over lanes in declaration order
    pub fn lanes(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.iter()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of flows
    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    /// Number of lanes
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Number of incoming flows for a node
    pub fn in_degree(&self, node_id: &str) -> usize {
        self.flows.iter().filter(|f| f.target_id == node_id).count()
    }

    /// Number of outgoing flows for a node
    pub fn out_degree(&self, node_id: &str) -> usize {
        self.flows.iter().filter(|f| f.source_id == node_id).count()
    }

    /// Ids of nodes this node points to
    pub fn successors(&self, node_id: &str) -> Vec<&str> {
        self.flows
            .iter()
            .filter(|f| f.source_id == node_id)
            .map(|f| f.target_id.as_str())
            .collect()
    }

    /// Outgoing flows of a node
    pub fn outgoing(&self, node_id: &str) -> Vec<&SequenceFlow> {
        self.flows.iter().filter(|f| f.source_id == node_id).collect()
    }

    /// The lane a node is referenced by, if any
    pub fn lane_of(&self, node_id: &str) -> Option<&Lane> {
        self.lanes
            .iter()
            .find(|lane| lane.node_refs.iter().any(|r| r == node_id))
    }

    /// Nodes of a given kind, in insertion order
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &FlowNode> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }
}
