//! Error and diagnostic types for the converter

use serde::Serialize;
use thiserror::Error;

use crate::lexer::Span;

/// Fatal errors for a single conversion
///
/// A call to [`crate::convert`] either returns a full result or exactly one
/// of these. Reduced-fidelity translations are reported as [`Diagnostic`]s
/// on the result instead.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The source does not conform to the accepted grammar superset
    #[error("SyntaxError: {message} at {line}:{column}")]
    Parse {
        message: String,
        line: u32,
        column: u32,
    },

    /// The formatter rejected the spliced output
    ///
    /// The converter only feeds the formatter text it produced itself, so
    /// this indicates a translation bug rather than a user input defect.
    #[error("FormatError: {message}")]
    Format { message: String },
}

impl ConvertError {
    pub fn parse(message: impl Into<String>, line: u32, column: u32) -> Self {
        ConvertError::Parse {
            message: message.into(),
            line,
            column,
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        ConvertError::Format {
            message: message.into(),
        }
    }
}

/// The construct a diagnostic is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    OpaqueAlias,
    Variance,
    UtilityType,
    ExistentialType,
    FunctionPredicate,
    ModuleDeclaration,
    ImportTypeof,
    EnumDeclaration,
    ObjectSpread,
    CallProperty,
    Mixins,
    OverlappingEdit,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DiagnosticKind::OpaqueAlias => "opaque-alias",
            DiagnosticKind::Variance => "variance",
            DiagnosticKind::UtilityType => "utility-type",
            DiagnosticKind::ExistentialType => "existential-type",
            DiagnosticKind::FunctionPredicate => "function-predicate",
            DiagnosticKind::ModuleDeclaration => "module-declaration",
            DiagnosticKind::ImportTypeof => "import-typeof",
            DiagnosticKind::EnumDeclaration => "enum-declaration",
            DiagnosticKind::ObjectSpread => "object-spread",
            DiagnosticKind::CallProperty => "call-property",
            DiagnosticKind::Mixins => "mixins",
            DiagnosticKind::OverlappingEdit => "overlapping-edit",
        };
        f.write_str(name)
    }
}

/// A non-fatal fidelity note attached to one translated construct
///
/// Emitted whenever a construct is translated via a lossy approximation or
/// left in place for manual follow-up. Accumulates on the conversion result;
/// never aborts translation of the rest of the file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub span: Span,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(span: Span, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Diagnostic {
            span,
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} {}: {}",
            self.span.line, self.span.column, self.kind, self.message
        )
    }
}
