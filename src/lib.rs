//! Flow-to-TypeScript source converter
//!
//! Converts files written with Flow type annotations into equivalent
//! TypeScript, preserving the formatting of everything that is not itself
//! a type-syntax construct, and classifying each file as JSX-bearing or
//! not so callers can pick `.tsx` vs `.ts`.
//!
//! # Example
//!
//! ```
//! use flow2ts::{convert, ConversionOptions};
//!
//! let result = convert("const a: ?number = null;", &ConversionOptions::default()).unwrap();
//! assert_eq!(result.output_text, "const a: number | null | undefined = null;");
//! assert!(!result.contains_markup);
//! ```
//!
//! Constructs without a faithful TypeScript counterpart (opaque aliases,
//! write-only variance, `$ObjMap`, ...) are translated best-effort and
//! reported as [`Diagnostic`]s rather than errors; a single call either
//! returns a full result or fails with one [`ConvertError`].

pub mod ast;
pub mod cli;
pub mod convert;
pub mod detect_jsx;
pub mod error;
pub mod format;
pub mod lexer;
pub mod parser;

pub use convert::{
    convert, ArrowParens, ConversionOptions, ConversionResult, FormatterOptions, QuoteStyle,
    TrailingComma,
};
pub use detect_jsx::detect_jsx;
pub use error::{ConvertError, Diagnostic, DiagnosticKind};
pub use parser::Parser;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_untyped_source_is_untouched() {
        let result = convert("const a = 5;", &ConversionOptions::default()).unwrap();
        assert_eq!(result.output_text, "const a = 5;");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_markup_classification() {
        let result = convert("const b = <h1>hi</h1>;", &ConversionOptions::default()).unwrap();
        assert!(result.contains_markup);
    }

    #[test]
    fn test_parse_error_carries_position() {
        let error = convert("const = ;", &ConversionOptions::default()).unwrap_err();
        assert!(matches!(error, ConvertError::Parse { .. }));
    }
}
