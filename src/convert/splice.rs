//! Format-preserving range splicer
//!
//! Applies (range, replacement) edits to the original text by copying the
//! untouched spans verbatim, rather than re-printing the whole tree.

use crate::error::{Diagnostic, DiagnosticKind};
use crate::lexer::Span;

/// One replacement produced by the translator
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub span: Span,
    pub text: String,
}

impl Edit {
    pub fn new(span: Span, text: impl Into<String>) -> Self {
        Edit {
            span,
            text: text.into(),
        }
    }
}

/// Splice `edits` into `source`
///
/// Edits are applied in order of range start. The translator guarantees
/// non-overlapping ranges; should a rule bug violate that, the
/// earliest-registered edit wins and the conflicting later one is dropped
/// with a diagnostic instead of corrupting the output.
pub fn splice(source: &str, edits: &[Edit]) -> (String, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();

    // Accept edits in registration order, rejecting overlaps
    let mut accepted: Vec<&Edit> = Vec::with_capacity(edits.len());
    for edit in edits {
        let conflicts = accepted
            .iter()
            .any(|kept| edit.span.start < kept.span.end && kept.span.start < edit.span.end);
        if conflicts {
            diagnostics.push(Diagnostic::new(
                edit.span,
                DiagnosticKind::OverlappingEdit,
                "dropped an edit overlapping an earlier one",
            ));
            continue;
        }
        if edit.span.end > source.len() || edit.span.start > edit.span.end {
            diagnostics.push(Diagnostic::new(
                edit.span,
                DiagnosticKind::OverlappingEdit,
                "dropped an edit outside the source bounds",
            ));
            continue;
        }
        accepted.push(edit);
    }
    accepted.sort_by_key(|edit| edit.span.start);

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0usize;
    for edit in accepted {
        output.push_str(source.get(cursor..edit.span.start).unwrap_or(""));
        output.push_str(&edit.text);
        cursor = edit.span.end;
    }
    output.push_str(source.get(cursor..).unwrap_or(""));
    (output, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> Span {
        Span::new(start, end, 1, 1)
    }

    #[test]
    fn test_no_edits_passthrough() {
        let (out, diags) = splice("const a = 1;", &[]);
        assert_eq!(out, "const a = 1;");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_single_edit() {
        let (out, _) = splice("let x: mixed = 1;", &[Edit::new(span(7, 12), "unknown")]);
        assert_eq!(out, "let x: unknown = 1;");
    }

    #[test]
    fn test_edits_applied_in_position_order() {
        let edits = vec![Edit::new(span(8, 9), "B"), Edit::new(span(4, 5), "A")];
        let (out, diags) = splice("abcdefghij", &edits);
        assert_eq!(out, "abcdAfghBj");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_overlap_keeps_earliest_registered() {
        let edits = vec![
            Edit::new(span(2, 6), "first"),
            Edit::new(span(4, 8), "second"),
        ];
        let (out, diags) = splice("0123456789", &edits);
        assert_eq!(out, "01first6789");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.first().map(|d| d.kind), Some(DiagnosticKind::OverlappingEdit));
    }

    #[test]
    fn test_out_of_bounds_edit_dropped() {
        let edits = vec![Edit::new(span(4, 99), "nope")];
        let (out, diags) = splice("0123456789", &edits);
        assert_eq!(out, "0123456789");
        assert_eq!(diags.len(), 1);
    }
}
