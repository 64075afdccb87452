//! Unified diffs between document renderings
//!
//! Pairs with [`crate::doc::BpmnDoc::pretty`] so a normalization pass can be
//! reviewed line by line before it is written back.

use similar::TextDiff;
use tracing::trace;

/// Render a unified diff between two XML texts.
///
/// Returns an empty string when the inputs are identical. The label names
/// the file in both headers, matching an in-place rewrite.
pub fn unified_diff(before: &str, after: &str, label: &str) -> String {
    if before == after {
        return String::new();
    }
    trace!(label, before_len = before.len(), after_len = after.len(), "Rendering diff");
    TextDiff::from_lines(before, after)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{}", label), &format!("b/{}", label))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_inputs_yield_empty_diff() {
        let xml = "<definitions>\n  <process id=\"P\"/>\n</definitions>\n";
        assert_eq!(unified_diff(xml, xml, "same.bpmn"), "");
    }

    #[test]
    fn test_changed_line_shows_both_versions() {
        let before = "<shape>\n  <bounds width=\"190\" height=\"55\"/>\n</shape>\n";
        let after = "<shape>\n  <bounds width=\"120\" height=\"80\"/>\n</shape>\n";
        let diff = unified_diff(before, after, "order.bpmn");
        assert!(diff.contains("--- a/order.bpmn"));
        assert!(diff.contains("+++ b/order.bpmn"));
        assert!(diff.contains("-  <bounds width=\"190\" height=\"55\"/>"));
        assert!(diff.contains("+  <bounds width=\"120\" height=\"80\"/>"));
    }

    #[test]
    fn test_unchanged_context_lines_are_kept() {
        let before = "<a/>\n<b/>\n<c old=\"1\"/>\n<d/>\n";
        let after = "<a/>\n<b/>\n<c old=\"2\"/>\n<d/>\n";
        let diff = unified_diff(before, after, "ctx.bpmn");
        assert!(diff.contains(" <b/>"));
        assert!(diff.contains(" <d/>"));
    }
}
