//! Flowgate - Validate and auto-correct BPMN 2.0 process diagrams
//!
//! A library for gating BPMN diagrams before they are treated as
//! authoritative process documentation: it builds a typed graph over the
//! XML, normalizes visual sizes, computes deterministic layouts, and runs
//! a battery of structural consistency checks.
//!
//! # Quick Start
//!
//! ```rust
//! use flowgate::{audit_document, BpmnDoc};
//!
//! let xml = r#"<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL">
//!   <bpmn:process id="Process_1">
//!     <bpmn:startEvent id="Start_1"/>
//!     <bpmn:endEvent id="End_1"/>
//!     <bpmn:sequenceFlow id="Flow_1" sourceRef="Start_1" targetRef="End_1"/>
//!   </bpmn:process>
//! </bpmn:definitions>"#;
//!
//! let doc = BpmnDoc::parse(xml).unwrap();
//! let issues = audit_document(&doc).unwrap();
//! assert!(issues.iter().any(|i| i.rule_id == "lane-set-missing"));
//! ```
//!
//! # Advanced Usage
//!
//! For more control, use the individual components:
//!
//! ```rust
//! use flowgate::prelude::*;
//!
//! # let xml = r#"<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL">
//! #  <bpmn:process id="Process_1" name="Demo">
//! #    <bpmn:startEvent id="Start_1"/>
//! #  </bpmn:process>
//! # </bpmn:definitions>"#;
//! let mut doc = BpmnDoc::parse(xml).unwrap();
//! let graph = extract_graph(&doc).unwrap();
//!
//! // Regenerate the visual layout and write it back.
//! let di = layout_graph(&graph);
//! apply_di(&mut doc, &di);
//!
//! let report = validate_schema(&doc);
//! assert!(!report.valid);
//! ```

pub mod checklist;
pub mod core;
pub mod diff;
pub mod doc;
pub mod extract;
pub mod graph;
pub mod layout;
pub mod lint;
pub mod model;
pub mod normalize;
pub mod patterns;
pub mod schema;
pub mod workspace;

pub use core::*;
pub use doc::{BpmnDoc, NamespaceTable};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::checklist::{run_checklist, ChecklistItem, ChecklistStatus};
    pub use crate::core::{
        AuditIssue, Bounds, FlowgateError, NodeKind, NormalizationChange, PatternHit, Point,
        Result, Severity,
    };
    pub use crate::diff::unified_diff;
    pub use crate::doc::{BpmnDoc, NamespaceTable};
    pub use crate::extract::{extract_di, extract_graph};
    pub use crate::graph::{FlowNode, Lane, Participant, ProcessGraph, SequenceFlow};
    pub use crate::layout::{apply_di, layout, layout_graph, DiagramInterchange, FlowSpec, NodeSpec, ShapeDi};
    pub use crate::lint::run_lint;
    pub use crate::model::{from_model, to_model, Actor, Flow, ProcessModel, Step};
    pub use crate::normalize::normalize_sizes;
    pub use crate::patterns::check_patterns;
    pub use crate::schema::{validate_schema, SchemaError, SchemaReport};
    pub use crate::workspace::Workspace;
}

/// Normalize shape sizes in a document, in place.
///
/// This is the simplest way to apply the canonical sizing contract.
/// Returns one change record per rewritten shape.
pub fn normalize_document(doc: &mut BpmnDoc) -> Result<Vec<NormalizationChange>> {
    let graph = extract::extract_graph(doc)?;
    Ok(normalize::normalize_sizes(doc, &graph))
}

/// Run lint and forbidden-pattern checks over a document.
///
/// Pattern hits are folded into the issue list at error severity, after
/// the lint findings.
pub fn audit_document(doc: &BpmnDoc) -> Result<Vec<AuditIssue>> {
    let graph = extract::extract_graph(doc)?;
    let di = extract::extract_di(doc);
    let mut issues = lint::run_lint(&graph, di.as_ref());
    issues.extend(
        patterns::check_patterns(&graph, di.as_ref())
            .into_iter()
            .map(AuditIssue::from),
    );
    Ok(issues)
}
