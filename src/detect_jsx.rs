//! JSX presence classifier
//!
//! Decides whether a parsed file contains markup so callers can pick the
//! output extension (`.tsx` vs `.ts`) before, or without, running the
//! translator. Pure function of the tree; only expression-position JSX
//! counts.

use crate::ast::*;

/// True iff the program contains at least one JSX element or fragment
pub fn detect_jsx(program: &Program) -> bool {
    program.body.iter().any(statement_has_jsx)
}

fn statement_has_jsx(statement: &Statement) -> bool {
    match statement {
        Statement::VariableDeclaration(decl) => decl.declarations.iter().any(|d| {
            pattern_has_jsx(&d.id) || d.init.as_ref().is_some_and(expression_has_jsx)
        }),
        Statement::FunctionDeclaration(decl) => function_has_jsx(&decl.function),
        Statement::ClassDeclaration(class) => class_has_jsx(class),
        Statement::Block(block) => block.body.iter().any(statement_has_jsx),
        Statement::If(stmt) => {
            expression_has_jsx(&stmt.test)
                || statement_has_jsx(&stmt.consequent)
                || stmt.alternate.as_deref().is_some_and(statement_has_jsx)
        }
        Statement::Switch(stmt) => {
            expression_has_jsx(&stmt.discriminant)
                || stmt.cases.iter().any(|case| {
                    case.test.as_ref().is_some_and(expression_has_jsx)
                        || case.body.iter().any(statement_has_jsx)
                })
        }
        Statement::For(stmt) => {
            stmt.init.as_ref().is_some_and(|init| match init {
                ForInit::Declaration(decl) => decl
                    .declarations
                    .iter()
                    .any(|d| d.init.as_ref().is_some_and(expression_has_jsx)),
                ForInit::Expression(expr) => expression_has_jsx(expr),
            }) || stmt.test.as_ref().is_some_and(expression_has_jsx)
                || stmt.update.as_ref().is_some_and(expression_has_jsx)
                || statement_has_jsx(&stmt.body)
        }
        Statement::ForIn(stmt) => {
            expression_has_jsx(&stmt.right) || statement_has_jsx(&stmt.body)
        }
        Statement::ForOf(stmt) => {
            expression_has_jsx(&stmt.right) || statement_has_jsx(&stmt.body)
        }
        Statement::While(stmt) => expression_has_jsx(&stmt.test) || statement_has_jsx(&stmt.body),
        Statement::DoWhile(stmt) => {
            expression_has_jsx(&stmt.test) || statement_has_jsx(&stmt.body)
        }
        Statement::Try(stmt) => {
            stmt.block.body.iter().any(statement_has_jsx)
                || stmt
                    .handler
                    .as_ref()
                    .is_some_and(|h| h.body.body.iter().any(statement_has_jsx))
                || stmt
                    .finalizer
                    .as_ref()
                    .is_some_and(|f| f.body.iter().any(statement_has_jsx))
        }
        Statement::Return(stmt) => stmt.argument.as_ref().is_some_and(expression_has_jsx),
        Statement::Throw(stmt) => expression_has_jsx(&stmt.argument),
        Statement::Export(export) => {
            export
                .declaration
                .as_deref()
                .is_some_and(statement_has_jsx)
                || export.default.as_ref().is_some_and(expression_has_jsx)
        }
        Statement::Expression(stmt) => expression_has_jsx(&stmt.expression),
        Statement::Labeled(stmt) => statement_has_jsx(&stmt.body),
        Statement::Declare(DeclareStatement::Module(module)) => {
            module.body.iter().any(statement_has_jsx)
        }
        _ => false,
    }
}

fn function_has_jsx(function: &Function) -> bool {
    function.params.iter().any(pattern_has_jsx)
        || function
            .body
            .as_ref()
            .is_some_and(|body| body.body.iter().any(statement_has_jsx))
}

fn class_has_jsx(class: &ClassDeclaration) -> bool {
    class
        .super_class
        .as_deref()
        .is_some_and(expression_has_jsx)
        || class.decorators.iter().any(expression_has_jsx)
        || class.body.members.iter().any(|member| match member {
            ClassMember::Method(method) => {
                method.decorators.iter().any(expression_has_jsx)
                    || function_has_jsx(&method.function)
            }
            ClassMember::Property(property) => {
                property.decorators.iter().any(expression_has_jsx)
                    || property.value.as_ref().is_some_and(expression_has_jsx)
            }
            ClassMember::StaticBlock(block) => block.body.iter().any(statement_has_jsx),
        })
}

fn pattern_has_jsx(pattern: &Pattern) -> bool {
    match pattern {
        Pattern::Identifier(_) => false,
        Pattern::Object(object) => object.properties.iter().any(|prop| match prop {
            ObjectPatternProperty::Property { key, value, .. } => {
                property_key_has_jsx(key) || pattern_has_jsx(value)
            }
            ObjectPatternProperty::Rest(rest) => pattern_has_jsx(&rest.argument),
        }),
        Pattern::Array(array) => array
            .elements
            .iter()
            .flatten()
            .any(pattern_has_jsx),
        Pattern::Assignment(assignment) => {
            pattern_has_jsx(&assignment.left) || expression_has_jsx(&assignment.right)
        }
        Pattern::Rest(rest) => pattern_has_jsx(&rest.argument),
    }
}

fn property_key_has_jsx(key: &PropertyKey) -> bool {
    match key {
        PropertyKey::Computed(expr) => expression_has_jsx(expr),
        _ => false,
    }
}

fn expression_has_jsx(expression: &Expression) -> bool {
    match expression {
        Expression::Jsx(_) | Expression::JsxFragment(_) => true,
        Expression::Template(template) => template.expressions.iter().any(expression_has_jsx),
        Expression::TaggedTemplate(tagged) => {
            expression_has_jsx(&tagged.tag)
                || tagged.quasi.expressions.iter().any(expression_has_jsx)
        }
        Expression::Array(array) => array
            .elements
            .iter()
            .flatten()
            .any(expression_has_jsx),
        Expression::Object(object) => object.properties.iter().any(|member| match member {
            ObjectLiteralMember::Property { key, value, .. } => {
                property_key_has_jsx(key) || expression_has_jsx(value)
            }
            ObjectLiteralMember::Shorthand(_) => false,
            ObjectLiteralMember::Method(method) => function_has_jsx(&method.function),
            ObjectLiteralMember::Spread(spread) => expression_has_jsx(&spread.argument),
        }),
        Expression::Function(function) => function_has_jsx(&function.function),
        Expression::Arrow(arrow) => {
            arrow.params.iter().any(pattern_has_jsx)
                || match &arrow.body {
                    ArrowBody::Expression(expr) => expression_has_jsx(expr),
                    ArrowBody::Block(block) => block.body.iter().any(statement_has_jsx),
                }
        }
        Expression::Class(class) => class_has_jsx(class),
        Expression::Unary(e) => expression_has_jsx(&e.argument),
        Expression::Update(e) => expression_has_jsx(&e.argument),
        Expression::Binary(e) | Expression::Logical(e) | Expression::Assignment(e) => {
            expression_has_jsx(&e.left) || expression_has_jsx(&e.right)
        }
        Expression::Conditional(e) => {
            expression_has_jsx(&e.test)
                || expression_has_jsx(&e.consequent)
                || expression_has_jsx(&e.alternate)
        }
        Expression::Call(e) | Expression::New(e) => {
            expression_has_jsx(&e.callee) || e.arguments.iter().any(expression_has_jsx)
        }
        Expression::Member(e) => {
            expression_has_jsx(&e.object)
                || match &e.property {
                    MemberProperty::Computed(index) => expression_has_jsx(index),
                    _ => false,
                }
        }
        Expression::Sequence(e) => e.expressions.iter().any(expression_has_jsx),
        Expression::Spread(e) => expression_has_jsx(&e.argument),
        Expression::TypeCast(e) => expression_has_jsx(&e.expression),
        Expression::AsCast(e) => expression_has_jsx(&e.expression),
        Expression::Paren(e) => expression_has_jsx(&e.expression),
        Expression::Yield(e) => e.argument.as_ref().is_some_and(expression_has_jsx),
        Expression::Await(e) => expression_has_jsx(&e.argument),
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn classify(source: &str) -> bool {
        detect_jsx(&Parser::new(source).parse_program().unwrap())
    }

    #[test]
    fn test_plain_code_has_no_markup() {
        assert!(!classify("const a: number = 5;"));
    }

    #[test]
    fn test_top_level_element() {
        assert!(classify("const b = <h1>hi</h1>;"));
    }

    #[test]
    fn test_element_deep_in_function() {
        assert!(classify(
            "function render() { if (x) { return <div className=\"a\" />; } return null; }"
        ));
    }

    #[test]
    fn test_fragment_counts() {
        assert!(classify("const c = <>{items}</>;"));
    }

    #[test]
    fn test_type_content_is_irrelevant() {
        assert!(!classify("type T = $Keys<{ a: number }>;\nconst x: ?string = null;"));
    }
}
