//! Core type definitions for diagram auditing
//!
//! This module contains the fundamental types used throughout Flowgate:
//! flow-node kinds, issue severities, geometry, and normalization records.

use std::fmt;

/// The closed catalogue of BPMN flow-node kinds Flowgate recognizes.
///
/// Classification is done once, by structural tag identity during extraction,
/// and every downstream decision (canonical sizing, gateway fan-in/out rules,
/// layout) pattern-matches over this enum rather than inspecting tag strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Start event: `<bpmn:startEvent>`
    StartEvent,
    /// End event: `<bpmn:endEvent>`
    EndEvent,
    /// Intermediate catch event
    IntermediateCatchEvent,
    /// Intermediate throw event
    IntermediateThrowEvent,
    /// Boundary event attached to an activity
    BoundaryEvent,
    /// Untyped task
    Task,
    /// User task
    UserTask,
    /// Service task
    ServiceTask,
    /// Manual task
    ManualTask,
    /// Script task
    ScriptTask,
    /// Business rule task
    BusinessRuleTask,
    /// Send task
    SendTask,
    /// Receive task
    ReceiveTask,
    /// Call activity invoking another process
    CallActivity,
    /// Sub-process (collapsed or expanded; the DI shape decides which)
    SubProcess,
    /// Exclusive (XOR) gateway
    ExclusiveGateway,
    /// Parallel (AND) gateway
    ParallelGateway,
    /// Inclusive (OR) gateway
    InclusiveGateway,
    /// Event-based gateway
    EventBasedGateway,
    /// Complex gateway, reserved for >2-branch splits/merges
    ComplexGateway,
}

impl NodeKind {
    /// Classify a BPMN local tag name into a node kind.
    ///
    /// Returns `None` for tags outside the flow-node catalogue
    /// (sequence flows, lanes, extension elements, ...).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "startEvent" => Some(NodeKind::StartEvent),
            "endEvent" => Some(NodeKind::EndEvent),
            "intermediateCatchEvent" => Some(NodeKind::IntermediateCatchEvent),
            "intermediateThrowEvent" => Some(NodeKind::IntermediateThrowEvent),
            "boundaryEvent" => Some(NodeKind::BoundaryEvent),
            "task" => Some(NodeKind::Task),
            "userTask" => Some(NodeKind::UserTask),
            "serviceTask" => Some(NodeKind::ServiceTask),
            "manualTask" => Some(NodeKind::ManualTask),
            "scriptTask" => Some(NodeKind::ScriptTask),
            "businessRuleTask" => Some(NodeKind::BusinessRuleTask),
            "sendTask" => Some(NodeKind::SendTask),
            "receiveTask" => Some(NodeKind::ReceiveTask),
            "callActivity" => Some(NodeKind::CallActivity),
            "subProcess" => Some(NodeKind::SubProcess),
            "exclusiveGateway" => Some(NodeKind::ExclusiveGateway),
            "parallelGateway" => Some(NodeKind::ParallelGateway),
            "inclusiveGateway" => Some(NodeKind::InclusiveGateway),
            "eventBasedGateway" => Some(NodeKind::EventBasedGateway),
            "complexGateway" => Some(NodeKind::ComplexGateway),
            _ => None,
        }
    }

    /// The BPMN local tag name for this kind
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::StartEvent => "startEvent",
            NodeKind::EndEvent => "endEvent",
            NodeKind::IntermediateCatchEvent => "intermediateCatchEvent",
            NodeKind::IntermediateThrowEvent => "intermediateThrowEvent",
            NodeKind::BoundaryEvent => "boundaryEvent",
            NodeKind::Task => "task",
            NodeKind::UserTask => "userTask",
            NodeKind::ServiceTask => "serviceTask",
            NodeKind::ManualTask => "manualTask",
            NodeKind::ScriptTask => "scriptTask",
            NodeKind::BusinessRuleTask => "businessRuleTask",
            NodeKind::SendTask => "sendTask",
            NodeKind::ReceiveTask => "receiveTask",
            NodeKind::CallActivity => "callActivity",
            NodeKind::SubProcess => "subProcess",
            NodeKind::ExclusiveGateway => "exclusiveGateway",
            NodeKind::ParallelGateway => "parallelGateway",
            NodeKind::InclusiveGateway => "inclusiveGateway",
            NodeKind::EventBasedGateway => "eventBasedGateway",
            NodeKind::ComplexGateway => "complexGateway",
        }
    }

    /// Returns true for any event variant
    pub fn is_event(&self) -> bool {
        matches!(
            self,
            NodeKind::StartEvent
                | NodeKind::EndEvent
                | NodeKind::IntermediateCatchEvent
                | NodeKind::IntermediateThrowEvent
                | NodeKind::BoundaryEvent
        )
    }

    /// Returns true for any gateway variant
    pub fn is_gateway(&self) -> bool {
        matches!(
            self,
            NodeKind::ExclusiveGateway
                | NodeKind::ParallelGateway
                | NodeKind::InclusiveGateway
                | NodeKind::EventBasedGateway
                | NodeKind::ComplexGateway
        )
    }

    /// Returns true for task variants and call activities.
    ///
    /// These render as the standard activity box and share the 120x80
    /// canonical size.
    pub fn is_task_like(&self) -> bool {
        matches!(
            self,
            NodeKind::Task
                | NodeKind::UserTask
                | NodeKind::ServiceTask
                | NodeKind::ManualTask
                | NodeKind::ScriptTask
                | NodeKind::BusinessRuleTask
                | NodeKind::SendTask
                | NodeKind::ReceiveTask
                | NodeKind::CallActivity
        )
    }

    /// Returns true for sub-processes
    pub fn is_sub_process(&self) -> bool {
        matches!(self, NodeKind::SubProcess)
    }

    /// Canonical DI size (width, height) for this kind.
    ///
    /// Tasks, call activities, and collapsed sub-processes use 120x80,
    /// gateways 50x50, events 36x36. Expanded sub-processes keep their
    /// authored size and return `None`.
    pub fn canonical_size(&self, expanded: bool) -> Option<(f64, f64)> {
        if self.is_task_like() {
            Some((120.0, 80.0))
        } else if self.is_sub_process() {
            if expanded {
                None
            } else {
                Some((120.0, 80.0))
            }
        } else if self.is_gateway() {
            Some((50.0, 50.0))
        } else if self.is_event() {
            Some((36.0, 36.0))
        } else {
            None
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Severity of an audit issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Structural defect that should block the diagram
    Error,
    /// Suspicious construct worth reviewing
    Warning,
    /// Informational note
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A single finding from the lint/consistency engine
#[derive(Debug, Clone, PartialEq)]
pub struct AuditIssue {
    /// Stable rule identifier, e.g. `orphan-node`
    pub rule_id: String,
    /// Severity of the finding
    pub severity: Severity,
    /// Human-readable description
    pub message: String,
    /// Offending element id, when the finding is element-scoped
    pub node_id: Option<String>,
}

impl AuditIssue {
    /// Create an error-severity issue
    pub fn error(rule_id: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            severity: Severity::Error,
            message: message.into(),
            node_id,
        }
    }

    /// Create a warning-severity issue
    pub fn warning(rule_id: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            severity: Severity::Warning,
            message: message.into(),
            node_id,
        }
    }
}

/// A forbidden modelling pattern detection
#[derive(Debug, Clone, PartialEq)]
pub struct PatternHit {
    /// Stable pattern identifier, e.g. `start-to-end-direct`
    pub pattern_id: String,
    /// Human-readable description
    pub message: String,
    /// Offending element id, when element-scoped
    pub node_id: Option<String>,
}

impl PatternHit {
    /// Create a new pattern hit
    pub fn new(pattern_id: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        Self {
            pattern_id: pattern_id.to_string(),
            message: message.into(),
            node_id,
        }
    }
}

impl From<PatternHit> for AuditIssue {
    fn from(hit: PatternHit) -> Self {
        AuditIssue {
            rule_id: hit.pattern_id,
            severity: Severity::Error,
            message: hit.message,
            node_id: hit.node_id,
        }
    }
}

/// Axis-aligned rectangle in DI coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Create a new bounds rectangle
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Vertical center y-coordinate
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// A DI waypoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A size rewrite performed by the normalizer
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationChange {
    /// Id of the resized flow node
    pub node_id: String,
    /// Size before normalization (width, height)
    pub from_size: (f64, f64),
    /// Canonical size written (width, height)
    pub to_size: (f64, f64),
}
