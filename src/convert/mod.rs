//! The conversion pipeline
//!
//! `convert` is the only entry point callers need: parse, classify, build
//! the alias table, translate, splice, and optionally format. It performs
//! no I/O and keeps no state between calls, so concurrent conversions of
//! different files are safe.

pub mod aliases;
pub mod splice;
pub mod translate;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detect_jsx::detect_jsx;
use crate::error::{ConvertError, Diagnostic};
use crate::format;
use crate::parser::Parser;

pub use aliases::AliasTable;
pub use splice::{splice, Edit};
pub use translate::translate;

/// Options for one conversion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Expand utility types like `$Keys` into their structural form when
    /// the argument resolves through the local alias table, instead of
    /// emitting a named approximation with a diagnostic
    pub inline_utility_types: bool,
    /// Run the built-in formatter over the spliced output
    pub formatting: Option<FormatterOptions>,
}

/// Style options for the output formatter
///
/// Mirrors the option surface of the external formatters commonly applied
/// to the output; the built-in formatter implements a subset (see
/// `format`), and the full set is carried so an external implementation
/// receives it unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterOptions {
    pub semicolons: bool,
    pub quote_style: QuoteStyle,
    pub indent_width: usize,
    pub trailing_comma: TrailingComma,
    pub bracket_spacing: bool,
    pub arrow_parens: ArrowParens,
    pub line_width: usize,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        FormatterOptions {
            semicolons: false,
            quote_style: QuoteStyle::Double,
            indent_width: 4,
            trailing_comma: TrailingComma::All,
            bracket_spacing: false,
            arrow_parens: ArrowParens::Avoid,
            line_width: 80,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    Single,
    Double,
}

impl Default for QuoteStyle {
    fn default() -> Self {
        QuoteStyle::Double
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingComma {
    None,
    Es5,
    All,
}

impl Default for TrailingComma {
    fn default() -> Self {
        TrailingComma::All
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowParens {
    Avoid,
    Always,
}

impl Default for ArrowParens {
    fn default() -> Self {
        ArrowParens::Avoid
    }
}

/// The outcome of one conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConversionResult {
    pub output_text: String,
    /// True when the source contains JSX; callers use this to pick the
    /// output extension
    pub contains_markup: bool,
    /// Fidelity notes, in source order of the constructs they describe
    pub diagnostics: Vec<Diagnostic>,
}

/// Convert one Flow source file to TypeScript
///
/// Returns a full result, or exactly one of `ConvertError::Parse` (the
/// input does not conform to the accepted grammar) or
/// `ConvertError::Format` (the formatter rejected the spliced output).
/// Reduced-fidelity translations never fail; they surface as diagnostics
/// on the result.
pub fn convert(
    source: &str,
    options: &ConversionOptions,
) -> Result<ConversionResult, ConvertError> {
    let mut parser = Parser::new(source);
    let program = parser.parse_program()?;
    debug!(statements = program.body.len(), "parsed program");

    let contains_markup = detect_jsx(&program);
    let aliases = AliasTable::build(&program);
    debug!(aliases = aliases.len(), contains_markup, "collected aliases");

    let (edits, mut diagnostics) = translate(&program, source, options, &aliases, contains_markup);
    debug!(edits = edits.len(), diagnostics = diagnostics.len(), "translated");

    let (mut output_text, splice_diagnostics) = splice(source, &edits);
    diagnostics.extend(splice_diagnostics);

    if let Some(formatter) = &options.formatting {
        output_text = format::format(&output_text, formatter)?;
    }

    diagnostics.sort_by_key(|d| d.span.start);
    Ok(ConversionResult {
        output_text,
        contains_markup,
        diagnostics,
    })
}
