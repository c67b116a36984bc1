//! Command-line interface
//!
//! File selection, the `@flow` pragma pre-filter, output-path selection
//! from the markup classification, and version-control-aware renames all
//! live here; the conversion core stays a pure text-to-text transform.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, ValueEnum};
use globset::{Glob, GlobSetBuilder};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::convert::{
    convert, ArrowParens, ConversionOptions, FormatterOptions, QuoteStyle, TrailingComma,
};

#[derive(Debug, ClapParser)]
#[command(
    name = "flow2ts",
    version,
    about = "Convert Flow-annotated JavaScript to TypeScript"
)]
pub struct Cli {
    /// Files or glob patterns to convert
    #[arg(required = true)]
    pub patterns: Vec<String>,

    /// Inline utility types when possible instead of emitting named
    /// approximations
    #[arg(long)]
    pub inline_utility_types: bool,

    /// Skip files that do not start with a `// @flow` pragma
    #[arg(long)]
    pub keep_untyped: bool,

    /// Run the built-in formatter over the output
    #[arg(long)]
    pub format: bool,

    /// Add semicolons (depends on --format)
    #[arg(long)]
    pub semi: bool,

    /// Use single quotes instead of double quotes (depends on --format)
    #[arg(long)]
    pub single_quote: bool,

    /// Size of tabs (depends on --format)
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(2..=8))]
    pub tab_width: u8,

    /// Where to put trailing commas (depends on --format)
    #[arg(long, value_enum, default_value_t = TrailingCommaArg::All)]
    pub trailing_comma: TrailingCommaArg,

    /// Put spaces between braces and contents (depends on --format)
    #[arg(long)]
    pub bracket_spacing: bool,

    /// Arrow function parameter list parens (depends on --format)
    #[arg(long, value_enum, default_value_t = ArrowParensArg::Avoid)]
    pub arrow_parens: ArrowParensArg,

    /// Line width (depends on --format)
    #[arg(long, default_value_t = 80)]
    pub print_width: usize,

    /// Write output to disk instead of stdout
    #[arg(long, value_enum, default_value_t = WriteMode::None)]
    pub write: WriteMode,

    /// Delete the source file after a successful conversion
    #[arg(long)]
    pub delete_source: bool,

    /// Emit per-file diagnostics as JSON on stderr
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WriteMode {
    /// Write a new file next to the source
    New,
    /// Rename the source (git-aware) and write in its place
    Replace,
    /// Print to stdout
    None,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TrailingCommaArg {
    All,
    Es5,
    None,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ArrowParensArg {
    Avoid,
    Always,
}

impl Cli {
    fn conversion_options(&self) -> ConversionOptions {
        let formatting = self.format.then(|| FormatterOptions {
            semicolons: self.semi,
            quote_style: if self.single_quote {
                QuoteStyle::Single
            } else {
                QuoteStyle::Double
            },
            indent_width: usize::from(self.tab_width),
            trailing_comma: match self.trailing_comma {
                TrailingCommaArg::All => TrailingComma::All,
                TrailingCommaArg::Es5 => TrailingComma::Es5,
                TrailingCommaArg::None => TrailingComma::None,
            },
            bracket_spacing: self.bracket_spacing,
            arrow_parens: match self.arrow_parens {
                ArrowParensArg::Avoid => ArrowParens::Avoid,
                ArrowParensArg::Always => ArrowParens::Always,
            },
            line_width: self.print_width,
        });
        ConversionOptions {
            inline_utility_types: self.inline_utility_types,
            formatting,
        }
    }
}

/// Run the CLI against the given argument list; returns the process exit
/// code
pub fn run<I, T>(args: I) -> Result<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let options = cli.conversion_options();

    let files = expand_patterns(&cli.patterns)?;
    if files.is_empty() {
        warn!("no files matched the given patterns");
    }

    let mut failures = 0usize;
    for file in &files {
        if let Err(error) = process_file(&cli, &options, file) {
            eprintln!("error processing {}", file.display());
            eprintln!("{:#}", error);
            failures += 1;
        }
    }
    debug!(files = files.len(), failures, "batch finished");
    Ok(if failures > 0 { 1 } else { 0 })
}

fn process_file(cli: &Cli, options: &ConversionOptions, file: &Path) -> Result<()> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("could not read {}", file.display()))?;

    if cli.keep_untyped && !source.starts_with("// @flow") {
        println!("Skipping {} as it is not typed", file.display());
        return Ok(());
    }

    let result = convert(&source, options)?;

    if cli.json {
        eprintln!(
            "{}",
            serde_json::json!({
                "file": file.display().to_string(),
                "containsMarkup": result.contains_markup,
                "diagnostics": result.diagnostics,
            })
        );
    } else {
        for diagnostic in &result.diagnostics {
            eprintln!("{}:{}", file.display(), diagnostic);
        }
    }

    match cli.write {
        WriteMode::None => println!("{}", result.output_text),
        WriteMode::New => {
            let out_path = output_path(file, result.contains_markup);
            fs::write(&out_path, &result.output_text)
                .with_context(|| format!("could not write {}", out_path.display()))?;
        }
        WriteMode::Replace => {
            let out_path = output_path(file, result.contains_markup);
            move_with_git(file, &out_path);
            fs::write(&out_path, &result.output_text)
                .with_context(|| format!("could not write {}", out_path.display()))?;
        }
    }

    if cli.delete_source && file.exists() && cli.write != WriteMode::None {
        fs::remove_file(file)
            .with_context(|| format!("could not delete {}", file.display()))?;
    }
    Ok(())
}

/// Pick the output path by swapping the extension according to the markup
/// classification
fn output_path(input: &Path, contains_markup: bool) -> PathBuf {
    let extension = if contains_markup { "tsx" } else { "ts" };
    input.with_extension(extension)
}

/// Rename via `git mv` so history follows the file, falling back to a
/// plain rename outside a repository
fn move_with_git(from: &Path, to: &Path) {
    let status = Command::new("git")
        .arg("mv")
        .arg(from)
        .arg(to)
        .status();
    match status {
        Ok(status) if status.success() => {}
        _ => {
            if let Err(error) = fs::rename(from, to) {
                debug!(?error, "plain rename failed; the write will create the file");
            }
        }
    }
}

/// Expand glob patterns against the current directory; literal paths are
/// taken as-is
fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    let mut builder = GlobSetBuilder::new();
    let mut has_globs = false;

    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            if !files.contains(&path.to_path_buf()) {
                files.push(path.to_path_buf());
            }
        } else {
            builder.add(
                Glob::new(pattern)
                    .with_context(|| format!("invalid glob pattern `{}`", pattern))?,
            );
            has_globs = true;
        }
    }

    if has_globs {
        let set = builder.build().context("could not build glob set")?;
        for entry in WalkDir::new(".").into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path().strip_prefix(".").unwrap_or(entry.path());
            if set.is_match(path) {
                let path = path.to_path_buf();
                if !files.contains(&path) {
                    files.push(path);
                }
            }
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_plain() {
        assert_eq!(
            output_path(Path::new("src/a.js"), false),
            PathBuf::from("src/a.ts")
        );
    }

    #[test]
    fn test_output_path_markup() {
        assert_eq!(
            output_path(Path::new("src/a.js"), true),
            PathBuf::from("src/a.tsx")
        );
    }
}
