//! Tests for the parser
//!
//! These tests verify that the parser accepts the Flow-annotated grammar
//! superset and records the spans the translator relies on.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::string_slice, clippy::panic)]

use flow2ts::ast::*;
use flow2ts::parser::Parser;

fn parse(source: &str) -> Program {
    match Parser::new(source).parse_program() {
        Ok(program) => program,
        Err(error) => panic!("parse failed: {} in {:?}", error, source),
    }
}

fn parse_type(source: &str) -> FlowType {
    let program = parse(&format!("type __T = {};", source));
    match program.body.into_iter().next().unwrap() {
        Statement::TypeAlias(alias) => alias.right,
        other => panic!("expected a type alias, got {:?}", other),
    }
}

#[test]
fn test_variable_declaration_with_annotation() {
    let program = parse("let x: number = 1;");
    assert_eq!(program.body.len(), 1);
    let Statement::VariableDeclaration(decl) = &program.body[0] else {
        panic!("expected a variable declaration");
    };
    assert!(decl.declarations[0].id.type_annotation().is_some());
}

#[test]
fn test_maybe_type() {
    assert!(matches!(parse_type("?string"), FlowType::Maybe(_)));
}

#[test]
fn test_union_and_intersection() {
    assert!(matches!(parse_type("A | B | C"), FlowType::Union(u) if u.members.len() == 3));
    assert!(
        matches!(parse_type("A & B"), FlowType::Intersection(i) if i.members.len() == 2)
    );
}

#[test]
fn test_leading_pipe_union() {
    let program = parse("type Rule =\n  | { type: 'a' }\n  | { type: 'b' };");
    assert_eq!(program.body.len(), 1);
}

#[test]
fn test_exact_and_inexact_objects() {
    let FlowType::Object(exact) = parse_type("{| a: number |}") else {
        panic!("expected an object type");
    };
    assert!(exact.exact);

    let FlowType::Object(inexact) = parse_type("{ a: number, ... }") else {
        panic!("expected an object type");
    };
    assert!(inexact.inexact);
}

#[test]
fn test_object_type_members() {
    let FlowType::Object(object) = parse_type(
        "{ +ro: number, opt?: string, m(x: number): void, [key: string]: mixed, (): void }",
    ) else {
        panic!("expected an object type");
    };
    assert_eq!(object.members.len(), 5);
    assert!(matches!(
        &object.members[0],
        ObjectTypeMember::Property(p) if p.variance.is_some()
    ));
    assert!(matches!(
        &object.members[1],
        ObjectTypeMember::Property(p) if p.optional
    ));
    assert!(matches!(
        &object.members[2],
        ObjectTypeMember::Property(p) if p.is_method
    ));
    assert!(matches!(&object.members[3], ObjectTypeMember::Indexer(_)));
    assert!(matches!(&object.members[4], ObjectTypeMember::Call(_)));
}

#[test]
fn test_function_type_with_unnamed_params() {
    let FlowType::Function(function) = parse_type("(string, number) => void") else {
        panic!("expected a function type");
    };
    assert_eq!(function.params.len(), 2);
    assert!(function.params[0].name.is_none());
}

#[test]
fn test_single_param_function_shorthand() {
    assert!(matches!(parse_type("string => void"), FlowType::Function(_)));
}

#[test]
fn test_generic_reference_and_indexed_access() {
    assert!(matches!(
        parse_type("Map<string, Array<number>>"),
        FlowType::Reference(r) if r.type_args.is_some()
    ));
    assert!(matches!(parse_type("T['key']"), FlowType::Indexed(_)));
}

#[test]
fn test_type_parameters_variance_bound_default() {
    let program = parse("type Box<+T: Base = Base> = { value: T };");
    let Statement::TypeAlias(alias) = &program.body[0] else {
        panic!("expected a type alias");
    };
    let params = alias.type_parameters.as_ref().unwrap();
    let param = &params.params[0];
    assert!(matches!(
        param.variance,
        Some(Variance {
            kind: VarianceKind::Covariant,
            ..
        })
    ));
    assert!(param.bound.is_some());
    assert!(param.default.is_some());
}

#[test]
fn test_opaque_type_with_supertype() {
    let program = parse("opaque type ID: string = number;");
    let Statement::OpaqueTypeAlias(alias) = &program.body[0] else {
        panic!("expected an opaque alias");
    };
    assert!(alias.supertype.is_some());
    assert!(alias.right.is_some());
}

#[test]
fn test_typecast_expression() {
    let program = parse("const x = (y: number);");
    let Statement::VariableDeclaration(decl) = &program.body[0] else {
        panic!("expected a variable declaration");
    };
    assert!(matches!(
        decl.declarations[0].init,
        Some(Expression::TypeCast(_))
    ));
}

#[test]
fn test_generic_arrow_is_not_jsx() {
    let program = parse("const id = <T>(x: T): T => x;");
    let Statement::VariableDeclaration(decl) = &program.body[0] else {
        panic!("expected a variable declaration");
    };
    assert!(matches!(decl.declarations[0].init, Some(Expression::Arrow(_))));
}

#[test]
fn test_jsx_with_attributes_and_children() {
    let program = parse(
        "const view = <div className=\"box\" onClick={e => go(e)}>Hello, {name}! <br/></div>;",
    );
    let Statement::VariableDeclaration(decl) = &program.body[0] else {
        panic!("expected a variable declaration");
    };
    let Some(Expression::Jsx(element)) = &decl.declarations[0].init else {
        panic!("expected a JSX element");
    };
    assert_eq!(element.attributes.len(), 2);
    assert!(element
        .children
        .iter()
        .any(|c| matches!(c, JsxChild::Element(_))));
}

#[test]
fn test_jsx_text_with_apostrophe() {
    let program = parse("const a = <p>don't panic</p>;");
    assert_eq!(program.body.len(), 1);
}

#[test]
fn test_jsx_fragment() {
    let program = parse("const a = <>{items}</>;");
    assert_eq!(program.body.len(), 1);
}

#[test]
fn test_class_with_flow_members() {
    let program = parse(
        "class C<+T> extends Base<T> implements I {\n  +x: number;\n  static y: string = 'a';\n  m(a: ?T): void {}\n}",
    );
    let Statement::ClassDeclaration(class) = &program.body[0] else {
        panic!("expected a class");
    };
    assert!(class.type_parameters.is_some());
    assert!(class.super_type_args.is_some());
    assert_eq!(class.implements.len(), 1);
    assert_eq!(class.body.members.len(), 3);
}

#[test]
fn test_declare_forms() {
    let program = parse(
        "declare var VERSION: string;\n\
         declare function log(string): void;\n\
         declare class Point { x: number; y: number }\n\
         declare module 'fs' { declare export function read(path: string): string; }\n\
         declare type Alias = number;\n\
         declare module.exports: { run(): void };",
    );
    assert_eq!(program.body.len(), 6);
    assert!(matches!(
        program.body[0],
        Statement::Declare(DeclareStatement::Variable(_))
    ));
    assert!(matches!(
        program.body[1],
        Statement::Declare(DeclareStatement::Function(_))
    ));
    assert!(matches!(
        program.body[2],
        Statement::Declare(DeclareStatement::Class(_))
    ));
    assert!(matches!(
        program.body[3],
        Statement::Declare(DeclareStatement::Module(_))
    ));
    assert!(matches!(program.body[4], Statement::TypeAlias(_)));
    assert!(matches!(
        program.body[5],
        Statement::Declare(DeclareStatement::ModuleExports(_))
    ));
}

#[test]
fn test_flow_enum() {
    let program = parse("enum Status of string { Active = 'on', Off }");
    let Statement::EnumDeclaration(decl) = &program.body[0] else {
        panic!("expected an enum");
    };
    assert_eq!(decl.kind, Some(EnumKind::String));
    assert_eq!(decl.members.len(), 2);
    assert!(decl.members[0].init.is_some());
}

#[test]
fn test_import_kinds() {
    let program = parse(
        "import type { Props } from './props';\n\
         import typeof Value from './value';\n\
         import { type A, typeof B, C } from './mixed';",
    );
    let Statement::Import(second) = &program.body[1] else {
        panic!("expected an import");
    };
    assert_eq!(second.kind, ImportKind::Typeof);
    let Statement::Import(third) = &program.body[2] else {
        panic!("expected an import");
    };
    assert_eq!(third.typeof_specifiers.len(), 1);
}

#[test]
fn test_contextual_words_as_bindings() {
    let program = parse("const type = 1;\nconst opaque = type;\ndeclare();\nmodule.hot;");
    assert_eq!(program.body.len(), 4);
}

#[test]
fn test_function_predicate() {
    let program = parse("function isSet(x: mixed): boolean %checks { return x != null; }");
    let Statement::FunctionDeclaration(decl) = &program.body[0] else {
        panic!("expected a function");
    };
    assert!(decl.function.predicate.is_some());
}

#[test]
fn test_typescript_round_trip_syntax() {
    // Constructs the converter itself emits must parse back
    let program = parse(
        "type K = keyof { a: number };\n\
         type V = T[keyof T];\n\
         interface I { readonly x: number }\n\
         type Box<out T extends Base> = { value: T };\n\
         const n = (x as number);\n\
         enum E { A = 'A', B = 'B' }",
    );
    assert_eq!(program.body.len(), 6);
}

#[test]
fn test_parse_error_has_position() {
    let error = Parser::new("const = 5;").parse_program().unwrap_err();
    let text = error.to_string();
    assert!(text.contains("SyntaxError"), "unexpected error: {}", text);
}

#[test]
fn test_asi() {
    let program = parse("const a = 1\nconst b = 2\nfoo()\nreturn_value");
    assert_eq!(program.body.len(), 4);
}

#[test]
fn test_regex_literal() {
    let program = parse("const re = /ab+c/gi; const div = a / b;");
    assert_eq!(program.body.len(), 2);
}

#[test]
fn test_template_with_typed_substitution() {
    let program = parse("const s = `v=${(x: number)}`;");
    assert_eq!(program.body.len(), 1);
}
