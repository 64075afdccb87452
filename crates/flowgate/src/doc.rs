//! Document adapter: BPMN XML ↔ generic element tree
//!
//! Wraps `xmltree` parsing and serialization so the rest of the crate works
//! against a typed graph instead of raw XML. Serialization takes an explicit
//! [`NamespaceTable`] rather than relying on process-wide prefix
//! registration, so repeated or concurrent invocations cannot interfere.

use tracing::{debug, trace};
use xmltree::{Element, EmitterConfig, Namespace, XMLNode};

use crate::core::{FlowgateError, Result};

/// BPMN 2.0 model namespace
pub const BPMN_NS: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";
/// BPMN diagram-interchange namespace
pub const BPMNDI_NS: &str = "http://www.omg.org/spec/BPMN/20100524/DI";
/// Diagram-common (bounds) namespace
pub const DC_NS: &str = "http://www.omg.org/spec/DD/20100524/DC";
/// Diagram-interchange (waypoint) namespace
pub const DI_NS: &str = "http://www.omg.org/spec/DD/20100524/DI";
/// XML Schema instance namespace
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
/// Zeebe execution-engine extension namespace
pub const ZEEBE_NS: &str = "http://camunda.org/schema/zeebe/1.0";

/// Immutable prefix → namespace-URI table handed to the serializer.
///
/// The default table carries the standard BPMN/DI prefixes plus the zeebe
/// vendor extension so documents with execution attributes re-serialize with
/// their declarations intact.
#[derive(Debug, Clone)]
pub struct NamespaceTable {
    entries: Vec<(String, String)>,
}

impl NamespaceTable {
    /// The standard BPMN prefix set
    pub fn standard() -> Self {
        Self {
            entries: vec![
                ("bpmn".to_string(), BPMN_NS.to_string()),
                ("bpmndi".to_string(), BPMNDI_NS.to_string()),
                ("dc".to_string(), DC_NS.to_string()),
                ("di".to_string(), DI_NS.to_string()),
                ("xsi".to_string(), XSI_NS.to_string()),
                ("zeebe".to_string(), ZEEBE_NS.to_string()),
            ],
        }
    }

    /// Extend the table with an additional prefix binding
    pub fn with(mut self, prefix: &str, uri: &str) -> Self {
        self.entries.push((prefix.to_string(), uri.to_string()));
        self
    }

    /// Iterate over (prefix, uri) entries
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    fn to_namespace(&self) -> Namespace {
        let mut ns = Namespace::empty();
        for (prefix, uri) in &self.entries {
            ns.put(prefix.clone(), uri.clone());
        }
        ns
    }
}

impl Default for NamespaceTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// A parsed BPMN document
#[derive(Debug, Clone)]
pub struct BpmnDoc {
    root: Element,
}

impl BpmnDoc {
    /// Parse BPMN XML text into a document
    pub fn parse(xml: &str) -> Result<Self> {
        trace!(input_len = xml.len(), "Parsing BPMN document");
        let root = Element::parse(xml.as_bytes())?;
        debug!(root = %root.name, "Parsed BPMN document");
        Ok(Self { root })
    }

    /// Wrap an already-built element tree
    pub fn from_root(root: Element) -> Self {
        Self { root }
    }

    /// Root element of the document
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Mutable root element of the document
    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Serialize the document back to XML text.
    ///
    /// The namespace table is merged into the root element's declarations so
    /// every prefix used by created elements resolves.
    pub fn serialize(&self, table: &NamespaceTable) -> Result<String> {
        self.write(table, EmitterConfig::new().write_document_declaration(true))
    }

    /// Serialize with indentation for reviewable diffs
    pub fn pretty(&self, table: &NamespaceTable, indent: usize) -> Result<String> {
        self.write(
            table,
            EmitterConfig::new()
                .write_document_declaration(true)
                .perform_indent(true)
                .indent_string(" ".repeat(indent)),
        )
    }

    fn write(&self, table: &NamespaceTable, config: EmitterConfig) -> Result<String> {
        let mut root = self.root.clone();
        let mut ns = match root.namespaces.take() {
            Some(existing) => existing,
            None => Namespace::empty(),
        };
        for (prefix, uri) in table.to_namespace().0 {
            ns.put(prefix, uri);
        }
        root.namespaces = Some(ns);

        let mut buf = Vec::new();
        root.write_with_config(&mut buf, config)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Build an element qualified with the given prefix/namespace
pub fn qualified(prefix: &str, ns: &str, name: &str) -> Element {
    let mut el = Element::new(name);
    el.prefix = Some(prefix.to_string());
    el.namespace = Some(ns.to_string());
    el
}

/// Build a `bpmn:`-qualified element
pub fn bpmn_el(name: &str) -> Element {
    qualified("bpmn", BPMN_NS, name)
}

/// Build a `bpmndi:`-qualified element
pub fn bpmndi_el(name: &str) -> Element {
    qualified("bpmndi", BPMNDI_NS, name)
}

/// Build a `dc:`-qualified element
pub fn dc_el(name: &str) -> Element {
    qualified("dc", DC_NS, name)
}

/// Build a `di:`-qualified element
pub fn di_el(name: &str) -> Element {
    qualified("di", DI_NS, name)
}

/// True if the element has the given local name and namespace
pub fn is_named(el: &Element, name: &str, ns: &str) -> bool {
    el.name == name && el.namespace.as_deref() == Some(ns)
}

/// Direct children that are elements
pub fn child_elements(el: &Element) -> impl Iterator<Item = &Element> {
    el.children.iter().filter_map(XMLNode::as_element)
}

/// Direct children matching name and namespace
pub fn children_named<'a>(
    el: &'a Element,
    name: &'a str,
    ns: &'a str,
) -> impl Iterator<Item = &'a Element> {
    child_elements(el).filter(move |c| is_named(c, name, ns))
}

/// First direct child matching name and namespace
pub fn child_named<'a>(el: &'a Element, name: &str, ns: &str) -> Option<&'a Element> {
    child_elements(el).find(|c| is_named(c, name, ns))
}

/// Pre-order iterator over an element and all its descendants
pub fn descendants(el: &Element) -> Descendants<'_> {
    Descendants { stack: vec![el] }
}

/// First descendant (or self) matching name and namespace
pub fn find_descendant<'a>(el: &'a Element, name: &str, ns: &str) -> Option<&'a Element> {
    descendants(el).find(|e| is_named(e, name, ns))
}

/// Pre-order element iterator, see [`descendants`]
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let el = self.stack.pop()?;
        for child in el.children.iter().rev() {
            if let Some(child_el) = child.as_element() {
                self.stack.push(child_el);
            }
        }
        Some(el)
    }
}

/// Attribute value lookup by local name
pub fn attr<'a>(el: &'a Element, name: &str) -> Option<&'a str> {
    el.attributes.get(name).map(String::as_str)
}

/// Concatenated text content of an element, trimmed
pub fn text_of(el: &Element) -> Option<String> {
    let text = el.get_text()?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Format a DI coordinate the way modelers expect: integers without a
/// trailing fraction, everything else as-is.
pub fn fmt_coord(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Error for documents that contain no `<process>` element
pub fn no_process_error() -> FlowgateError {
    FlowgateError::parse_error("document has no <process> element")
}
