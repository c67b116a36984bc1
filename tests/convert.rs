//! End-to-end tests for the conversion pipeline
//!
//! Each test feeds Flow source through `convert` and checks the exact
//! output text, the markup classification, and the diagnostics that
//! reduced-fidelity translations must produce.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::string_slice, clippy::panic)]

use flow2ts::convert::{translate, AliasTable};
use flow2ts::{
    convert, detect_jsx, ConversionOptions, ConvertError, DiagnosticKind, FormatterOptions,
    Parser, QuoteStyle,
};

fn run(source: &str) -> flow2ts::ConversionResult {
    convert(source, &ConversionOptions::default()).unwrap()
}

fn run_inlined(source: &str) -> flow2ts::ConversionResult {
    let options = ConversionOptions {
        inline_utility_types: true,
        ..ConversionOptions::default()
    };
    convert(source, &options).unwrap()
}

// ============ PASSTHROUGH ============

#[test]
fn test_plain_annotation_is_unchanged() {
    let result = run("const a: number = 5;");
    assert_eq!(result.output_text, "const a: number = 5;");
    assert!(!result.contains_markup);
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_untyped_source_is_byte_identical() {
    let source = "function add(a, b) {\n  return a + b; // sum\n}\nadd(1, 2);\n";
    let result = run(source);
    assert_eq!(result.output_text, source);
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_comments_outside_rewritten_spans_survive() {
    let result = run("// header\nconst a: ?string = null; // trailing\n/* block */");
    assert_eq!(
        result.output_text,
        "// header\nconst a: string | null | undefined = null; // trailing\n/* block */"
    );
}

// ============ CORE TYPE REWRITES ============

#[test]
fn test_maybe_type() {
    let result = run("const a: ?number = null;");
    assert_eq!(
        result.output_text,
        "const a: number | null | undefined = null;"
    );
}

#[test]
fn test_primitive_keywords() {
    assert_eq!(run("let a: mixed;").output_text, "let a: unknown;");
    assert_eq!(run("let b: empty;").output_text, "let b: never;");
    let existential = run("let c: *;");
    assert_eq!(existential.output_text, "let c: any;");
    assert_eq!(
        existential.diagnostics[0].kind,
        DiagnosticKind::ExistentialType
    );
}

#[test]
fn test_exact_object_loses_delimiters() {
    let result = run("type P = {| a: number |};");
    assert_eq!(result.output_text, "type P = { a: number };");
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_inexact_object_gets_index_signature() {
    let result = run("type P = { a: number, ... };");
    assert_eq!(
        result.output_text,
        "type P = { a: number; [key: string]: any };"
    );
}

#[test]
fn test_object_member_variance() {
    let result = run("type P = { +ro: number, -wo: string };");
    assert_eq!(
        result.output_text,
        "type P = { readonly ro: number; wo: string };"
    );
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::Variance);
}

#[test]
fn test_indexer_with_variance() {
    let result = run("type D = { +[key: string]: number };");
    assert_eq!(
        result.output_text,
        "type D = { readonly [key: string]: number };"
    );
}

#[test]
fn test_object_spread_becomes_intersection() {
    let result = run("type P = { ...Base, extra: number };");
    assert_eq!(result.output_text, "type P = Base & { extra: number };");
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::ObjectSpread);
}

#[test]
fn test_tuple_union_intersection() {
    let result = run("type T = [number, ?string] | (A & B);");
    assert_eq!(
        result.output_text,
        "type T = [number, string | null | undefined] | (A & B);"
    );
}

#[test]
fn test_function_type_with_unnamed_params() {
    let result = run("type F = (string, number) => void;");
    assert_eq!(
        result.output_text,
        "type F = (arg0: string, arg1: number) => void;"
    );
}

#[test]
fn test_function_type_optional_and_rest() {
    let result = run("type F = (a?: number, ...rest: string[]) => void;");
    assert_eq!(
        result.output_text,
        "type F = (a?: number, ...rest: string[]) => void;"
    );
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_type_parameter_variance_bound_default() {
    let result = run("type Box<+T: Base = Base> = { value: T };");
    assert_eq!(
        result.output_text,
        "type Box<out T extends Base = Base> = { value: T };"
    );
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_variance_dropped_on_function_type_params() {
    let result = run("type F = <+T>(x: T) => T;");
    assert_eq!(result.output_text, "type F = <T>(x: T) => T;");
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::Variance);
}

#[test]
fn test_typecast_becomes_as() {
    let result = run("const x = (y: number);");
    assert_eq!(result.output_text, "const x = (y as number);");
}

#[test]
fn test_function_predicate_dropped() {
    let result = run("function isSet(x: mixed): boolean %checks { return x != null; }");
    assert_eq!(
        result.output_text,
        "function isSet(x: unknown): boolean { return x != null; }"
    );
    assert_eq!(
        result.diagnostics[0].kind,
        DiagnosticKind::FunctionPredicate
    );
}

// ============ OPAQUE ALIASES ============

#[test]
fn test_opaque_alias_uses_underlying_type() {
    let result = run("opaque type ID = string;");
    assert_eq!(result.output_text, "type ID = string;");
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::OpaqueAlias);
}

#[test]
fn test_opaque_alias_prefers_declared_bound() {
    let result = run("opaque type ID: string = number;");
    assert_eq!(result.output_text, "type ID = string;");
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::OpaqueAlias);
}

// ============ UTILITY TYPES ============

#[test]
fn test_faithful_utilities_have_no_diagnostics() {
    let result = run(
        "type A = $ReadOnly<P>;\n\
         type B = $ReadOnlyArray<number>;\n\
         type C = $NonMaybeType<T>;\n\
         type D = $Exact<P>;\n\
         type E = $PropertyType<P, 'name'>;\n\
         type F = $ElementType<P, K>;",
    );
    assert_eq!(
        result.output_text,
        "type A = Readonly<P>;\n\
         type B = ReadonlyArray<number>;\n\
         type C = NonNullable<T>;\n\
         type D = P;\n\
         type E = P['name'];\n\
         type F = P[K];"
    );
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_keys_named_approximation() {
    let result = run("type T = $Keys<{a: number}>;");
    assert_eq!(result.output_text, "type T = keyof { a: number };");
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::UtilityType);
}

#[test]
fn test_keys_inlined_to_literal_union() {
    let result = run_inlined("type T = $Keys<{a: number}>;");
    assert_eq!(result.output_text, "type T = 'a';");
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_keys_inlined_through_alias_chain() {
    let result = run_inlined(
        "type Base = { a: number, b: string };\ntype Ref = Base;\ntype K = $Keys<Ref>;",
    );
    assert!(result.output_text.ends_with("type K = 'a' | 'b';"));
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_values_inlined() {
    let result = run_inlined("type P = { a: number, b: string };\ntype V = $Values<P>;");
    assert!(result.output_text.ends_with("type V = number | string;"));
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_shape_inlined_makes_properties_optional() {
    let result = run_inlined("type P = { a: number, b: string };\ntype S = $Shape<P>;");
    assert!(result
        .output_text
        .ends_with("type S = { a?: number; b?: string };"));
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_shape_named_approximation_is_partial() {
    let result = run("type S = $Shape<P>;");
    assert_eq!(result.output_text, "type S = Partial<P>;");
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::UtilityType);
}

#[test]
fn test_diff_inlined_subtracts_properties() {
    let result = run_inlined(
        "type A = { a: number, b: string };\ntype B = { b: string };\ntype D = $Diff<A, B>;",
    );
    assert!(result.output_text.ends_with("type D = { a: number };"));
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_diff_named_approximation_is_omit() {
    let result = run("type D = $Diff<A, B>;");
    assert_eq!(result.output_text, "type D = Omit<A, keyof B>;");
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::UtilityType);
}

#[test]
fn test_inlining_falls_back_on_alias_cycle() {
    let result = run_inlined("type A = B;\ntype B = A;\ntype K = $Keys<A>;");
    assert!(result.output_text.ends_with("type K = keyof A;"));
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::UtilityType);
}

#[test]
fn test_inlining_falls_back_on_imported_argument() {
    let result = run_inlined("import type { Props } from './p';\ntype K = $Keys<Props>;");
    assert!(result.output_text.ends_with("type K = keyof Props;"));
    assert_eq!(result.diagnostics.len(), 1);
}

#[test]
fn test_last_alias_declaration_wins_for_inlining() {
    let result = run_inlined(
        "type A = { a: number };\ntype A = { b: string };\ntype K = $Keys<A>;",
    );
    assert!(result.output_text.ends_with("type K = 'b';"));
}

#[test]
fn test_unsupported_utilities_degrade_to_any() {
    let result = run("type M = $ObjMap<T, F>;");
    assert_eq!(result.output_text, "type M = any;");
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::UtilityType);
}

#[test]
fn test_class_of_reference() {
    let result = run("type C = Class<Point>;");
    assert_eq!(result.output_text, "type C = typeof Point;");
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::UtilityType);
}

#[test]
fn test_flowfixme_is_any() {
    let result = run("let x: $FlowFixMe;");
    assert_eq!(result.output_text, "let x: any;");
}

// ============ DECLARATIONS ============

#[test]
fn test_declare_function_names_parameters() {
    let result = run("declare function log(string): void;");
    assert_eq!(
        result.output_text,
        "declare function log(arg0: string): void;"
    );
}

#[test]
fn test_declare_module_elides_inner_declare() {
    let result = run(
        "declare module 'fs' {\n  declare export function read(path: string): string;\n}",
    );
    assert_eq!(
        result.output_text,
        "declare module 'fs' {\n  export function read(path: string): string;\n}"
    );
}

#[test]
fn test_declare_module_exports_is_preserved_with_diagnostic() {
    let source = "declare module.exports: { run(): void };";
    let result = run(source);
    assert_eq!(result.output_text, source);
    assert_eq!(
        result.diagnostics[0].kind,
        DiagnosticKind::ModuleDeclaration
    );
}

#[test]
fn test_import_typeof_is_preserved_with_diagnostic() {
    let source = "import typeof Value from './value';";
    let result = run(source);
    assert_eq!(result.output_text, source);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::ImportTypeof);
}

#[test]
fn test_interface_members_rewritten_in_place() {
    let result = run("interface Point {\n  +x: number;\n  distance(other: Point): number;\n}");
    assert_eq!(
        result.output_text,
        "interface Point {\n  readonly x: number;\n  distance(other: Point): number;\n}"
    );
}

// ============ ENUMS ============

#[test]
fn test_enum_defaults_to_string_values() {
    let result = run("enum Status { Active, Off }");
    assert_eq!(
        result.output_text,
        "enum Status { Active = 'Active', Off = 'Off' }"
    );
}

#[test]
fn test_enum_of_number_keeps_initializers() {
    let result = run("enum Level of number { Low = 1, High = 2 }");
    assert_eq!(result.output_text, "enum Level { Low = 1, High = 2 }");
}

#[test]
fn test_enum_of_boolean_is_preserved_with_diagnostic() {
    let source = "enum Flag of boolean { On = true, Off = false }";
    let result = run(source);
    assert_eq!(result.output_text, source);
    assert_eq!(
        result.diagnostics[0].kind,
        DiagnosticKind::EnumDeclaration
    );
}

// ============ CLASSES ============

#[test]
fn test_class_member_variance_and_annotations() {
    let result = run("class C {\n  +id: number;\n  name: ?string;\n}");
    assert_eq!(
        result.output_text,
        "class C {\n  readonly id: number;\n  name: string | null | undefined;\n}"
    );
}

#[test]
fn test_class_heritage_types_convert() {
    let result = run("class C extends Base<?number> implements I<mixed> {}");
    assert_eq!(
        result.output_text,
        "class C extends Base<number | null | undefined> implements I<unknown> {}"
    );
}

// ============ MARKUP CLASSIFICATION ============

#[test]
fn test_markup_presence() {
    assert!(run("const b = <h1>hi</h1>;").contains_markup);
    assert!(run("const b = <>{x}</>;").contains_markup);
    assert!(!run("type T = $Keys<{ a: number }>;").contains_markup);
}

#[test]
fn test_generic_arrow_gets_trailing_comma_in_markup_files() {
    let result = run("const view = <div />;\nconst id = <T>(x: T): T => x;");
    assert!(result.contains_markup);
    assert!(result.output_text.contains("<T,>(x: T): T => x"));
}

#[test]
fn test_generic_arrow_unchanged_in_plain_files() {
    let result = run("const id = <T>(x: T): T => x;");
    assert!(!result.contains_markup);
    assert_eq!(result.output_text, "const id = <T>(x: T): T => x;");
}

#[test]
fn test_jsx_attributes_and_children_convert() {
    let result = run("const v = <Row render={(x: ?number) => x} />;");
    assert_eq!(
        result.output_text,
        "const v = <Row render={(x: number | null | undefined) => x} />;"
    );
}

// ============ FORMATTING ============

#[test]
fn test_quote_style_formatting() {
    let options = ConversionOptions {
        inline_utility_types: false,
        formatting: Some(FormatterOptions {
            quote_style: QuoteStyle::Single,
            ..FormatterOptions::default()
        }),
    };
    let result = convert("const a: string = \"s\";", &options).unwrap();
    assert_eq!(result.output_text, "const a: string = 's';");
}

#[test]
fn test_semicolon_formatting() {
    let options = ConversionOptions {
        inline_utility_types: false,
        formatting: Some(FormatterOptions {
            semicolons: true,
            ..FormatterOptions::default()
        }),
    };
    let result = convert("const a: ?number = null", &options).unwrap();
    assert_eq!(
        result.output_text,
        "const a: number | null | undefined = null;"
    );
}

// ============ ERRORS ============

#[test]
fn test_parse_error_is_fatal_and_positioned() {
    let error = convert("const = ;", &ConversionOptions::default()).unwrap_err();
    match error {
        ConvertError::Parse { line, column, .. } => {
            assert_eq!(line, 1);
            assert!(column > 1);
        }
        other => panic!("expected a parse error, got {:?}", other),
    }
}

// ============ PROPERTIES ============

#[test]
fn test_idempotence_on_converted_output() {
    let source = "type Props = {| +name: string, age: ?number |};\n\
                  opaque type ID = string;\n\
                  const get = (p: Props): $Keys<Props> => 'name';\n\
                  enum Status { Active, Off }";
    let first = run(source);
    let second = run(&first.output_text);
    assert_eq!(second.output_text, first.output_text);
}

#[test]
fn test_totality_over_construct_soup() {
    // Every construct with no faithful counterpart degrades with a
    // diagnostic instead of failing
    let result = run(
        "opaque type T = number;\n\
         type M = $ObjMap<X, F>;\n\
         type E = $Exports<'fs'>;\n\
         declare module.exports: number;\n\
         import typeof V from './v';\n\
         function f(x: mixed): boolean %checks { return !!x; }\n\
         type W = { -w: number };\n\
         let star: *;",
    );
    assert!(result.diagnostics.len() >= 7);
}

#[test]
fn test_diagnostics_are_ordered_by_position() {
    let result = run("opaque type A = number;\ntype M = $ObjMap<X, F>;\nlet s: *;");
    let starts: Vec<usize> = result.diagnostics.iter().map(|d| d.span.start).collect();
    let mut sorted = starts.clone();
    sorted.sort_unstable();
    assert_eq!(starts, sorted);
}

#[test]
fn test_translator_edits_are_disjoint_and_in_bounds() {
    let source = "type Props = {| +name: string, age: ?number |};\n\
                  opaque type ID = $Keys<Props>;\n\
                  const f = (x: mixed): empty => { throw x; };\n\
                  class C extends Base<?number> { +p: Props; }";
    let program = Parser::new(source).parse_program().unwrap();
    let aliases = AliasTable::build(&program);
    let contains_markup = detect_jsx(&program);
    let options = ConversionOptions::default();
    let (mut edits, _) = translate(&program, source, &options, &aliases, contains_markup);

    edits.sort_by_key(|edit| edit.span.start);
    for edit in &edits {
        assert!(edit.span.start <= edit.span.end);
        assert!(edit.span.end <= source.len());
    }
    for pair in edits.windows(2) {
        assert!(
            pair[0].span.end <= pair[1].span.start,
            "overlapping edits at {} and {}",
            pair[0].span.start,
            pair[1].span.start
        );
    }
}
