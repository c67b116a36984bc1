//! The type translator
//!
//! Walks the tree once and, for every type-syntax construct, computes a
//! TypeScript replacement for that construct's exact source range. Runtime
//! code is never touched; untranslated ranges pass through the splicer
//! verbatim. Translation is total: unsupported constructs degrade to a
//! pass-through plus a diagnostic instead of failing.

use crate::ast::*;
use crate::convert::aliases::AliasTable;
use crate::convert::splice::Edit;
use crate::convert::ConversionOptions;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::lexer::Span;

pub fn translate<'p>(
    program: &'p Program,
    source: &str,
    options: &ConversionOptions,
    aliases: &AliasTable<'p>,
    contains_jsx: bool,
) -> (Vec<Edit>, Vec<Diagnostic>) {
    let mut translator = Translator {
        source,
        options,
        aliases,
        contains_jsx,
        in_ambient: false,
        edits: Vec::new(),
        diagnostics: Vec::new(),
    };
    for statement in &program.body {
        translator.visit_statement(statement);
    }
    (translator.edits, translator.diagnostics)
}

struct Translator<'a, 'p> {
    source: &'a str,
    options: &'a ConversionOptions,
    aliases: &'a AliasTable<'p>,
    /// Generic arrow parameter lists need a trailing comma in .tsx output
    contains_jsx: bool,
    /// Inside a `declare module` body, where nested `declare` is invalid
    in_ambient: bool,
    edits: Vec<Edit>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a, 'p> Translator<'a, 'p> {
    fn text(&self, span: Span) -> &'a str {
        self.source.get(span.start..span.end).unwrap_or("")
    }

    /// Register an edit unless the replacement matches the source verbatim
    fn push_edit(&mut self, span: Span, text: String) {
        if self.text(span) != text {
            self.edits.push(Edit { span, text });
        }
    }

    fn diag(&mut self, span: Span, kind: DiagnosticKind, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(span, kind, message));
    }

    /// Whether the statement at `span` ends with an explicit semicolon
    fn has_semi(&self, span: Span) -> bool {
        self.text(span).ends_with(';')
    }

    /// Extend a span backwards over horizontal whitespace (used when a
    /// construct is deleted outright, e.g. `%checks`)
    fn with_leading_ws(&self, span: Span) -> Span {
        let mut start = span.start;
        while start > 0 {
            let prev = self.source.get(start - 1..start);
            if prev == Some(" ") || prev == Some("\t") {
                start -= 1;
            } else {
                break;
            }
        }
        Span::new(start, span.end, span.line, span.column)
    }

    // ============ STATEMENTS ============

    fn visit_statement(&mut self, statement: &'p Statement) {
        match statement {
            Statement::VariableDeclaration(decl) => {
                for declarator in &decl.declarations {
                    self.visit_pattern(&declarator.id);
                    if let Some(init) = &declarator.init {
                        self.visit_expression(init);
                    }
                }
            }
            Statement::FunctionDeclaration(decl) => self.visit_function(&decl.function, false),
            Statement::ClassDeclaration(class) => self.visit_class(class),
            Statement::TypeAlias(alias) => {
                if self.in_ambient {
                    if let Some(declare) = alias.declare {
                        self.push_edit(self.with_trailing_ws(declare), String::new());
                    }
                }
                if let Some(params) = &alias.type_parameters {
                    self.edit_type_params(params, true, false);
                }
                self.edit_type(&alias.right);
            }
            Statement::OpaqueTypeAlias(alias) => self.visit_opaque_alias(alias),
            Statement::InterfaceDeclaration(interface) => self.visit_interface(interface),
            Statement::EnumDeclaration(decl) => self.visit_enum(decl),
            Statement::Declare(declare) => self.visit_declare(declare),
            Statement::Import(import) => {
                for span in &import.typeof_specifiers {
                    self.diag(
                        *span,
                        DiagnosticKind::ImportTypeof,
                        "`import typeof` has no TypeScript equivalent and was left unchanged; \
                         replace it with `import type` of the value's type",
                    );
                }
            }
            Statement::Export(export) => {
                if let Some(declaration) = &export.declaration {
                    self.visit_statement(declaration);
                }
                if let Some(default) = &export.default {
                    self.visit_expression(default);
                }
            }
            Statement::Block(block) => self.visit_block(block),
            Statement::If(stmt) => {
                self.visit_expression(&stmt.test);
                self.visit_statement(&stmt.consequent);
                if let Some(alternate) = &stmt.alternate {
                    self.visit_statement(alternate);
                }
            }
            Statement::Switch(stmt) => {
                self.visit_expression(&stmt.discriminant);
                for case in &stmt.cases {
                    if let Some(test) = &case.test {
                        self.visit_expression(test);
                    }
                    for inner in &case.body {
                        self.visit_statement(inner);
                    }
                }
            }
            Statement::For(stmt) => {
                match &stmt.init {
                    Some(ForInit::Declaration(decl)) => {
                        for declarator in &decl.declarations {
                            self.visit_pattern(&declarator.id);
                            if let Some(init) = &declarator.init {
                                self.visit_expression(init);
                            }
                        }
                    }
                    Some(ForInit::Expression(expr)) => self.visit_expression(expr),
                    None => {}
                }
                if let Some(test) = &stmt.test {
                    self.visit_expression(test);
                }
                if let Some(update) = &stmt.update {
                    self.visit_expression(update);
                }
                self.visit_statement(&stmt.body);
            }
            Statement::ForIn(stmt) => {
                self.visit_for_target(&stmt.left);
                self.visit_expression(&stmt.right);
                self.visit_statement(&stmt.body);
            }
            Statement::ForOf(stmt) => {
                self.visit_for_target(&stmt.left);
                self.visit_expression(&stmt.right);
                self.visit_statement(&stmt.body);
            }
            Statement::While(stmt) => {
                self.visit_expression(&stmt.test);
                self.visit_statement(&stmt.body);
            }
            Statement::DoWhile(stmt) => {
                self.visit_statement(&stmt.body);
                self.visit_expression(&stmt.test);
            }
            Statement::Try(stmt) => {
                self.visit_block(&stmt.block);
                if let Some(handler) = &stmt.handler {
                    if let Some(param) = &handler.param {
                        self.visit_pattern(param);
                    }
                    self.visit_block(&handler.body);
                }
                if let Some(finalizer) = &stmt.finalizer {
                    self.visit_block(finalizer);
                }
            }
            Statement::Return(stmt) => {
                if let Some(argument) = &stmt.argument {
                    self.visit_expression(argument);
                }
            }
            Statement::Throw(stmt) => self.visit_expression(&stmt.argument),
            Statement::Expression(stmt) => self.visit_expression(&stmt.expression),
            Statement::Labeled(stmt) => self.visit_statement(&stmt.body),
            Statement::Break(_)
            | Statement::Continue(_)
            | Statement::Empty(_)
            | Statement::Debugger(_) => {}
        }
    }

    fn visit_block(&mut self, block: &'p BlockStatement) {
        for statement in &block.body {
            self.visit_statement(statement);
        }
    }

    fn visit_for_target(&mut self, target: &'p ForTarget) {
        match target {
            ForTarget::Declaration(decl) => {
                for declarator in &decl.declarations {
                    self.visit_pattern(&declarator.id);
                }
            }
            ForTarget::Pattern(pattern) => self.visit_pattern(pattern),
        }
    }

    /// Extend a span forward over one following space, for keyword removal
    fn with_trailing_ws(&self, span: Span) -> Span {
        let next = self.source.get(span.end..span.end + 1);
        if next == Some(" ") {
            Span::new(span.start, span.end + 1, span.line, span.column)
        } else {
            span
        }
    }

    fn visit_opaque_alias(&mut self, alias: &'p OpaqueTypeDeclaration) {
        self.diag(
            alias.span,
            DiagnosticKind::OpaqueAlias,
            format!(
                "opaque type `{}` was rewritten as a plain alias; the opacity guarantee is \
                 not preserved in TypeScript",
                alias.id.name
            ),
        );
        let params = alias
            .type_parameters
            .as_ref()
            .map(|p| self.print_type_params(p, true, false))
            .unwrap_or_default();
        // The declared bound, when present, is the alias's public face
        let right = match (&alias.supertype, &alias.right) {
            (Some(bound), _) => self.print_type(bound),
            (None, Some(right)) => self.print_type(right),
            (None, None) => "unknown".to_string(),
        };
        let declare = if alias.declare.is_some() && !self.in_ambient {
            "declare "
        } else {
            ""
        };
        let text = format!(
            "{}type {}{} = {}{}",
            declare,
            alias.id.name,
            params,
            right,
            if self.has_semi(alias.span) { ";" } else { "" },
        );
        self.push_edit(alias.span, text);
    }

    fn visit_interface(&mut self, interface: &'p InterfaceDeclaration) {
        if self.in_ambient {
            if let Some(declare) = interface.declare {
                self.push_edit(self.with_trailing_ws(declare), String::new());
            }
        }
        if let Some(params) = &interface.type_parameters {
            self.edit_type_params(params, true, false);
        }
        for reference in &interface.extends {
            let text = self.print_type_reference(reference);
            self.push_edit(reference.span, text);
        }
        self.edit_object_members(&interface.body);
    }

    /// Member-wise edits for interface bodies, preserving the surrounding
    /// formatting and comments between members
    fn edit_object_members(&mut self, object: &'p ObjectType) {
        for member in &object.members {
            match member {
                ObjectTypeMember::Spread(spread) => {
                    self.diag(
                        spread.span,
                        DiagnosticKind::ObjectSpread,
                        "spread in an interface body has no TypeScript equivalent; left unchanged",
                    );
                }
                _ => {
                    let text = self.print_object_member(member, false);
                    self.push_edit(member_span(member), text);
                }
            }
        }
        if object.inexact {
            self.diag(
                object.span,
                DiagnosticKind::ObjectSpread,
                "inexact marker `...` in an interface body was left unchanged",
            );
        }
    }

    fn visit_enum(&mut self, decl: &'p EnumDeclaration) {
        match decl.kind {
            Some(EnumKind::Boolean) | Some(EnumKind::Symbol) => {
                self.diag(
                    decl.span,
                    DiagnosticKind::EnumDeclaration,
                    "enums of boolean or symbol have no TypeScript equivalent; left unchanged",
                );
                return;
            }
            _ => {}
        }
        if decl.has_unknown_members {
            self.diag(
                decl.span,
                DiagnosticKind::EnumDeclaration,
                "the `...` unknown-members marker was dropped from the enum",
            );
        }
        let members: Vec<String> = decl
            .members
            .iter()
            .map(|member| match (&member.init, decl.kind) {
                (Some(init), _) => format!("{} = {}", member.name, self.text(*init)),
                (None, Some(EnumKind::Number)) => member.name.clone(),
                // Flow enums are string-valued by default, mirroring the
                // member name
                (None, _) => format!("{} = '{}'", member.name, member.name),
            })
            .collect();
        let text = format!(
            "enum {} {{ {} }}",
            decl.id.name,
            members.join(", "),
        );
        self.push_edit(decl.span, text);
    }

    // ============ DECLARE FORMS ============

    fn visit_declare(&mut self, declare: &'p DeclareStatement) {
        match declare {
            DeclareStatement::Variable(decl) => {
                if self.in_ambient {
                    let text = format!(
                        "{}{}",
                        self.print_declare_variable(decl),
                        if self.has_semi(decl.span) { ";" } else { "" }
                    );
                    self.push_edit(decl.span, text);
                } else if let Some(annotation) = &decl.type_annotation {
                    // `declare var x: T` is already TypeScript syntax
                    self.edit_type(annotation);
                }
            }
            DeclareStatement::Function(decl) => {
                let prefix = if self.in_ambient { "" } else { "declare " };
                let text = format!(
                    "{}{}{}",
                    prefix,
                    self.print_declare_function(decl),
                    if self.has_semi(decl.span) { ";" } else { "" }
                );
                self.push_edit(decl.span, text);
            }
            DeclareStatement::Class(decl) => {
                let prefix = if self.in_ambient { "" } else { "declare " };
                let text = format!("{}{}", prefix, self.print_declare_class(decl));
                self.push_edit(decl.span, text);
            }
            DeclareStatement::Module(module) => {
                // The header is already valid TypeScript; only members need
                // rewriting, with nested `declare` keywords elided
                let was_ambient = self.in_ambient;
                self.in_ambient = true;
                for statement in &module.body {
                    self.visit_statement(statement);
                }
                self.in_ambient = was_ambient;
            }
            DeclareStatement::ModuleExports(span) => {
                self.diag(
                    *span,
                    DiagnosticKind::ModuleDeclaration,
                    "`declare module.exports` has no TypeScript equivalent; left unchanged \
                     (consider `export =` syntax)",
                );
            }
            DeclareStatement::Export(export) => self.visit_declare_export(export),
        }
    }

    fn visit_declare_export(&mut self, export: &'p DeclareExport) {
        let text = match &export.value {
            DeclareExportValue::DefaultType(ty) => {
                let printed = self.print_type(ty);
                if self.in_ambient {
                    format!("const _default: {};\nexport default _default;", printed)
                } else {
                    format!(
                        "declare const _default: {};\nexport default _default;",
                        printed
                    )
                }
            }
            DeclareExportValue::Declaration(declaration) => {
                let prefix = match (export.default, self.in_ambient) {
                    (true, _) => "export default ".to_string(),
                    (false, true) => "export ".to_string(),
                    (false, false) => "export declare ".to_string(),
                };
                let semi = if self.has_semi(export.span) { ";" } else { "" };
                match declaration.as_ref() {
                    Statement::Declare(DeclareStatement::Variable(decl)) => {
                        format!("{}{}{}", prefix, self.print_declare_variable(decl), semi)
                    }
                    Statement::Declare(DeclareStatement::Function(decl)) => {
                        format!("{}{}{}", prefix, self.print_declare_function(decl), semi)
                    }
                    Statement::Declare(DeclareStatement::Class(decl)) => {
                        format!("{}{}", prefix, self.print_declare_class(decl))
                    }
                    _ => {
                        self.diag(
                            export.span,
                            DiagnosticKind::ModuleDeclaration,
                            "unsupported `declare export` form; left unchanged",
                        );
                        return;
                    }
                }
            }
        };
        self.push_edit(export.span, text);
    }

    fn print_declare_variable(&mut self, decl: &'p DeclareVariable) -> String {
        let keyword = match decl.kind {
            VariableKind::Let => "let",
            VariableKind::Const => "const",
            VariableKind::Var => "var",
        };
        match &decl.type_annotation {
            Some(ty) => format!("{} {}: {}", keyword, decl.id.name, self.print_type(ty)),
            None => format!("{} {}", keyword, decl.id.name),
        }
    }

    fn print_declare_function(&mut self, decl: &'p DeclareFunction) -> String {
        if let Some(predicate) = decl.predicate {
            self.diag(
                predicate,
                DiagnosticKind::FunctionPredicate,
                "`%checks` predicate dropped; TypeScript type guards must be written manually",
            );
        }
        let signature = self.print_function_type(&decl.function_type, false);
        format!("function {}{}", decl.id.name, signature)
    }

    fn print_declare_class(&mut self, decl: &'p DeclareClass) -> String {
        if let Some(mixins) = decl.mixins {
            self.diag(
                mixins,
                DiagnosticKind::Mixins,
                "`mixins` clause dropped; TypeScript has no declaration-level mixin syntax",
            );
        }
        let params = decl
            .type_parameters
            .as_ref()
            .map(|p| self.print_type_params(p, true, false))
            .unwrap_or_default();
        let extends = decl
            .extends
            .as_ref()
            .map(|r| format!(" extends {}", self.print_type_reference(r)))
            .unwrap_or_default();
        let mut members = Vec::new();
        for member in &decl.body.members {
            if let ObjectTypeMember::Call(call) = member {
                self.diag(
                    call.span,
                    DiagnosticKind::CallProperty,
                    "call property dropped; TypeScript classes cannot declare call signatures",
                );
                continue;
            }
            members.push(self.print_object_member(member, true));
        }
        if members.is_empty() {
            format!("class {}{}{} {{}}", decl.id.name, params, extends)
        } else {
            format!(
                "class {}{}{} {{ {} }}",
                decl.id.name,
                params,
                extends,
                members.join("; "),
            )
        }
    }

    // ============ FUNCTIONS, CLASSES, PATTERNS ============

    fn visit_function(&mut self, function: &'p Function, is_arrow: bool) {
        if let Some(params) = &function.type_parameters {
            self.edit_type_params(params, false, is_arrow && self.contains_jsx);
        }
        for param in &function.params {
            self.visit_pattern(param);
        }
        if let Some(return_type) = &function.return_type {
            self.edit_type(return_type);
        }
        if let Some(predicate) = function.predicate {
            self.diag(
                predicate,
                DiagnosticKind::FunctionPredicate,
                "`%checks` predicate dropped; TypeScript type guards must be written manually",
            );
            let span = self.with_leading_ws(predicate);
            self.push_edit(span, String::new());
        }
        if let Some(body) = &function.body {
            self.visit_block(body);
        }
    }

    fn visit_class(&mut self, class: &'p ClassDeclaration) {
        for decorator in &class.decorators {
            self.visit_expression(decorator);
        }
        if let Some(params) = &class.type_parameters {
            self.edit_type_params(params, true, false);
        }
        if let Some(super_class) = &class.super_class {
            self.visit_expression(super_class);
        }
        if let Some(args) = &class.super_type_args {
            let text = self.print_type_args(args);
            self.push_edit(args.span, text);
        }
        if let Some(mixins) = class.mixins {
            self.diag(
                mixins,
                DiagnosticKind::Mixins,
                "`mixins` clause dropped; TypeScript has no declaration-level mixin syntax",
            );
            self.push_edit(self.with_leading_ws(mixins), String::new());
        }
        for reference in &class.implements {
            let text = self.print_type_reference(reference);
            self.push_edit(reference.span, text);
        }
        for member in &class.body.members {
            match member {
                ClassMember::Method(method) => {
                    for decorator in &method.decorators {
                        self.visit_expression(decorator);
                    }
                    self.visit_property_key(&method.key);
                    self.visit_function(&method.function, false);
                }
                ClassMember::Property(property) => {
                    for decorator in &property.decorators {
                        self.visit_expression(decorator);
                    }
                    if let Some(variance) = &property.variance {
                        self.edit_member_variance(variance);
                    }
                    self.visit_property_key(&property.key);
                    if let Some(annotation) = &property.type_annotation {
                        self.edit_type(annotation);
                    }
                    if let Some(value) = &property.value {
                        self.visit_expression(value);
                    }
                }
                ClassMember::StaticBlock(block) => self.visit_block(block),
            }
        }
    }

    /// Rewrite a `+`/`-` variance marker on a class member
    fn edit_member_variance(&mut self, variance: &Variance) {
        match variance.kind {
            VarianceKind::Covariant => {
                self.push_edit(variance.span, "readonly ".to_string());
            }
            VarianceKind::Contravariant => {
                self.diag(
                    variance.span,
                    DiagnosticKind::Variance,
                    "write-only variance (`-`) has no TypeScript equivalent; the marker was \
                     dropped",
                );
                self.push_edit(self.with_trailing_ws(variance.span), String::new());
            }
        }
    }

    fn visit_property_key(&mut self, key: &'p PropertyKey) {
        if let PropertyKey::Computed(expr) = key {
            self.visit_expression(expr);
        }
    }

    fn visit_pattern(&mut self, pattern: &'p Pattern) {
        match pattern {
            Pattern::Identifier(p) => {
                if let Some(annotation) = &p.type_annotation {
                    self.edit_type(annotation);
                }
            }
            Pattern::Object(p) => {
                for property in &p.properties {
                    match property {
                        ObjectPatternProperty::Property { key, value, .. } => {
                            self.visit_property_key(key);
                            self.visit_pattern(value);
                        }
                        ObjectPatternProperty::Rest(rest) => self.visit_pattern(&rest.argument),
                    }
                }
                if let Some(annotation) = &p.type_annotation {
                    self.edit_type(annotation);
                }
            }
            Pattern::Array(p) => {
                for element in p.elements.iter().flatten() {
                    self.visit_pattern(element);
                }
                if let Some(annotation) = &p.type_annotation {
                    self.edit_type(annotation);
                }
            }
            Pattern::Assignment(p) => {
                self.visit_pattern(&p.left);
                self.visit_expression(&p.right);
            }
            Pattern::Rest(p) => self.visit_pattern(&p.argument),
        }
    }

    // ============ EXPRESSIONS ============

    fn visit_expression(&mut self, expression: &'p Expression) {
        match expression {
            Expression::TypeCast(cast) => {
                self.visit_expression(&cast.expression);
                let printed = self.print_type(&cast.type_annotation);
                self.push_edit(cast.cast_span, format!(" as {}", printed));
            }
            Expression::AsCast(cast) => {
                self.visit_expression(&cast.expression);
                self.edit_type(&cast.type_annotation);
            }
            Expression::Arrow(arrow) => {
                if let Some(params) = &arrow.type_parameters {
                    self.edit_type_params(params, false, self.contains_jsx);
                }
                for param in &arrow.params {
                    self.visit_pattern(param);
                }
                if let Some(return_type) = &arrow.return_type {
                    self.edit_type(return_type);
                }
                match &arrow.body {
                    ArrowBody::Expression(expr) => self.visit_expression(expr),
                    ArrowBody::Block(block) => self.visit_block(block),
                }
            }
            Expression::Function(function) => self.visit_function(&function.function, false),
            Expression::Class(class) => self.visit_class(class),
            Expression::Template(template) => {
                for expr in &template.expressions {
                    self.visit_expression(expr);
                }
            }
            Expression::TaggedTemplate(tagged) => {
                self.visit_expression(&tagged.tag);
                for expr in &tagged.quasi.expressions {
                    self.visit_expression(expr);
                }
            }
            Expression::Array(array) => {
                for element in array.elements.iter().flatten() {
                    self.visit_expression(element);
                }
            }
            Expression::Object(object) => {
                for member in &object.properties {
                    match member {
                        ObjectLiteralMember::Property { key, value, .. } => {
                            self.visit_property_key(key);
                            self.visit_expression(value);
                        }
                        ObjectLiteralMember::Shorthand(_) => {}
                        ObjectLiteralMember::Method(method) => {
                            self.visit_property_key(&method.key);
                            self.visit_function(&method.function, false);
                        }
                        ObjectLiteralMember::Spread(spread) => {
                            self.visit_expression(&spread.argument);
                        }
                    }
                }
            }
            Expression::Unary(e) => self.visit_expression(&e.argument),
            Expression::Update(e) => self.visit_expression(&e.argument),
            Expression::Binary(e) | Expression::Logical(e) | Expression::Assignment(e) => {
                self.visit_expression(&e.left);
                self.visit_expression(&e.right);
            }
            Expression::Conditional(e) => {
                self.visit_expression(&e.test);
                self.visit_expression(&e.consequent);
                self.visit_expression(&e.alternate);
            }
            Expression::Call(e) | Expression::New(e) => {
                self.visit_expression(&e.callee);
                if let Some(args) = &e.type_args {
                    let text = self.print_type_args(args);
                    self.push_edit(args.span, text);
                }
                for argument in &e.arguments {
                    self.visit_expression(argument);
                }
            }
            Expression::Member(e) => {
                self.visit_expression(&e.object);
                if let MemberProperty::Computed(index) = &e.property {
                    self.visit_expression(index);
                }
            }
            Expression::Sequence(e) => {
                for expr in &e.expressions {
                    self.visit_expression(expr);
                }
            }
            Expression::Spread(e) => self.visit_expression(&e.argument),
            Expression::Paren(e) => self.visit_expression(&e.expression),
            Expression::Yield(e) => {
                if let Some(argument) = &e.argument {
                    self.visit_expression(argument);
                }
            }
            Expression::Await(e) => self.visit_expression(&e.argument),
            Expression::Jsx(element) => self.visit_jsx_element(element),
            Expression::JsxFragment(fragment) => self.visit_jsx_children(&fragment.children),
            _ => {}
        }
    }

    fn visit_jsx_element(&mut self, element: &'p JsxElement) {
        for attribute in &element.attributes {
            match attribute {
                JsxAttribute::Named { value, .. } => match value {
                    Some(JsxAttributeValue::Expression(expr)) => self.visit_expression(expr),
                    Some(JsxAttributeValue::Element(inner)) => self.visit_jsx_element(inner),
                    Some(JsxAttributeValue::Fragment(fragment)) => {
                        self.visit_jsx_children(&fragment.children)
                    }
                    _ => {}
                },
                JsxAttribute::Spread(spread) => self.visit_expression(&spread.argument),
            }
        }
        self.visit_jsx_children(&element.children);
    }

    fn visit_jsx_children(&mut self, children: &'p [JsxChild]) {
        for child in children {
            match child {
                JsxChild::Element(element) => self.visit_jsx_element(element),
                JsxChild::Fragment(fragment) => self.visit_jsx_children(&fragment.children),
                JsxChild::Expression(Some(expr)) => self.visit_expression(expr),
                _ => {}
            }
        }
    }

    // ============ TYPE PRINTING ============

    fn edit_type(&mut self, ty: &'p FlowType) {
        let text = self.print_type(ty);
        self.push_edit(ty.span(), text);
    }

    fn edit_type_params(
        &mut self,
        params: &'p TypeParameters,
        allow_variance: bool,
        trailing_comma: bool,
    ) {
        let text = self.print_type_params(params, allow_variance, trailing_comma);
        self.push_edit(params.span, text);
    }

    fn print_type(&mut self, ty: &'p FlowType) -> String {
        match ty {
            FlowType::Any(_) => "any".to_string(),
            FlowType::Mixed(_) => "unknown".to_string(),
            FlowType::Empty(_) => "never".to_string(),
            FlowType::Void(_) => "void".to_string(),
            FlowType::Null(_) => "null".to_string(),
            FlowType::Number(_) => "number".to_string(),
            FlowType::String(_) => "string".to_string(),
            FlowType::Boolean(_) => "boolean".to_string(),
            FlowType::Symbol(_) => "symbol".to_string(),
            FlowType::Exists(span) => {
                self.diag(
                    *span,
                    DiagnosticKind::ExistentialType,
                    "existential type `*` has no TypeScript equivalent; emitted `any`",
                );
                "any".to_string()
            }
            FlowType::Maybe(maybe) => {
                let inner = self.print_operand(&maybe.inner);
                format!("{} | null | undefined", inner)
            }
            FlowType::Union(union) => {
                let members: Vec<String> =
                    union.members.iter().map(|m| self.print_operand(m)).collect();
                members.join(" | ")
            }
            FlowType::Intersection(intersection) => {
                let members: Vec<String> = intersection
                    .members
                    .iter()
                    .map(|m| self.print_intersection_operand(m))
                    .collect();
                members.join(" & ")
            }
            FlowType::Tuple(tuple) => {
                let elements: Vec<String> =
                    tuple.elements.iter().map(|e| self.print_type(e)).collect();
                format!("[{}]", elements.join(", "))
            }
            FlowType::Array(array) => {
                format!("{}[]", self.print_postfix_operand(&array.element))
            }
            FlowType::Object(object) => self.print_object_type(object),
            FlowType::Function(function) => self.print_function_type(function, true),
            FlowType::Reference(reference) => self.print_type_reference(reference),
            FlowType::Typeof(typeof_type) => {
                format!("typeof {}", typeof_type.argument.text())
            }
            FlowType::Keyof(keyof) => {
                format!("keyof {}", self.print_postfix_operand(&keyof.argument))
            }
            FlowType::Indexed(indexed) => {
                let object = self.print_postfix_operand(&indexed.object);
                let index = self.print_type(&indexed.index);
                format!("{}[{}]", object, index)
            }
            FlowType::Paren(paren) => format!("({})", self.print_type(&paren.inner)),
            FlowType::StringLiteral(literal) => self.text(literal.span).to_string(),
            FlowType::NumberLiteral(span) | FlowType::BigIntLiteral(span) => {
                self.text(*span).to_string()
            }
            FlowType::BooleanLiteral(value, _) => value.to_string(),
        }
    }

    /// Print a type as a union member: function types need parentheses
    fn print_operand(&mut self, ty: &'p FlowType) -> String {
        let text = self.print_type(ty);
        if matches!(ty, FlowType::Function(_)) {
            format!("({})", text)
        } else {
            text
        }
    }

    fn print_intersection_operand(&mut self, ty: &'p FlowType) -> String {
        let text = self.print_type(ty);
        if matches!(ty, FlowType::Function(_) | FlowType::Union(_)) {
            format!("({})", text)
        } else {
            text
        }
    }

    /// Print a type that will receive a postfix operator (`[]`, indexed
    /// access); anything lower-precedence gets parenthesized
    fn print_postfix_operand(&mut self, ty: &'p FlowType) -> String {
        let text = self.print_type(ty);
        if matches!(
            ty,
            FlowType::Function(_)
                | FlowType::Union(_)
                | FlowType::Intersection(_)
                | FlowType::Maybe(_)
        ) {
            format!("({})", text)
        } else {
            text
        }
    }

    fn print_object_type(&mut self, object: &'p ObjectType) -> String {
        let has_spread = object
            .members
            .iter()
            .any(|m| matches!(m, ObjectTypeMember::Spread(_)));
        if has_spread {
            return self.print_spread_object(object);
        }

        let mut members: Vec<String> = object
            .members
            .iter()
            .map(|m| self.print_object_member(m, false))
            .collect();
        if object.inexact {
            members.push("[key: string]: any".to_string());
        }
        if members.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", members.join("; "))
        }
    }

    /// Encode object-type spreads as an intersection (`{...A, b: B}` becomes
    /// `A & { b: B }`); ordering semantics differ, so this is flagged
    fn print_spread_object(&mut self, object: &'p ObjectType) -> String {
        self.diag(
            object.span,
            DiagnosticKind::ObjectSpread,
            "object type spread was approximated with an intersection; overlapping \
             properties resolve differently, review manually",
        );
        let mut parts: Vec<String> = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        for member in &object.members {
            match member {
                ObjectTypeMember::Spread(spread) => {
                    if !pending.is_empty() {
                        parts.push(format!("{{ {} }}", pending.join("; ")));
                        pending.clear();
                    }
                    parts.push(self.print_intersection_operand(&spread.argument));
                }
                _ => pending.push(self.print_object_member(member, false)),
            }
        }
        if object.inexact {
            pending.push("[key: string]: any".to_string());
        }
        if !pending.is_empty() {
            parts.push(format!("{{ {} }}", pending.join("; ")));
        }
        parts.join(" & ")
    }

    fn print_object_member(&mut self, member: &'p ObjectTypeMember, class_style: bool) -> String {
        match member {
            ObjectTypeMember::Property(property) => {
                let mut out = String::new();
                if class_style && property.is_static {
                    out.push_str("static ");
                }
                match &property.variance {
                    Some(Variance {
                        kind: VarianceKind::Covariant,
                        ..
                    }) => out.push_str("readonly "),
                    Some(variance @ Variance {
                        kind: VarianceKind::Contravariant,
                        ..
                    }) => {
                        self.diag(
                            variance.span,
                            DiagnosticKind::Variance,
                            "write-only variance (`-`) has no TypeScript equivalent; the \
                             marker was dropped",
                        );
                    }
                    None => {}
                }
                match property.kind {
                    ObjectPropertyKind::Get => out.push_str("get "),
                    ObjectPropertyKind::Set => out.push_str("set "),
                    ObjectPropertyKind::Init => {}
                }
                out.push_str(&self.print_object_key(&property.key));
                if property.optional {
                    out.push('?');
                }
                if property.is_method {
                    if let FlowType::Function(function) = &property.value {
                        out.push_str(&self.print_function_signature(function));
                        return out;
                    }
                }
                out.push_str(": ");
                out.push_str(&self.print_type(&property.value));
                out
            }
            ObjectTypeMember::Indexer(indexer) => {
                let mut out = String::new();
                if class_style && indexer.is_static {
                    out.push_str("static ");
                }
                match &indexer.variance {
                    Some(Variance {
                        kind: VarianceKind::Covariant,
                        ..
                    }) => out.push_str("readonly "),
                    Some(variance @ Variance {
                        kind: VarianceKind::Contravariant,
                        ..
                    }) => {
                        self.diag(
                            variance.span,
                            DiagnosticKind::Variance,
                            "write-only variance (`-`) has no TypeScript equivalent; the \
                             marker was dropped",
                        );
                    }
                    None => {}
                }
                let name = indexer.id.as_deref().unwrap_or("key");
                let key = self.print_type(&indexer.key);
                let value = self.print_type(&indexer.value);
                out.push_str(&format!("[{}: {}]: {}", name, key, value));
                out
            }
            ObjectTypeMember::Call(call) => self.print_function_signature(&call.function),
            ObjectTypeMember::Spread(spread) => {
                // Callers handle spreads; printing one directly falls back
                // to the intersection operand form
                format!("...{}", self.print_type(&spread.argument))
            }
        }
    }

    fn print_object_key(&self, key: &ObjectTypeKey) -> String {
        match key {
            ObjectTypeKey::Identifier(name) => name.clone(),
            ObjectTypeKey::String(_, span) | ObjectTypeKey::Number(span) => {
                self.text(*span).to_string()
            }
        }
    }

    /// Print a function type in `(...) => R` (annotation) or `(...): R`
    /// (member signature) style
    fn print_function_type(&mut self, function: &'p FunctionType, arrow_style: bool) -> String {
        let params = self.print_function_params(function);
        let type_params = function
            .type_parameters
            .as_ref()
            .map(|p| self.print_type_params(p, false, false))
            .unwrap_or_default();
        let return_type = self.print_type(&function.return_type);
        if arrow_style {
            format!("{}({}) => {}", type_params, params, return_type)
        } else {
            format!("{}({}): {}", type_params, params, return_type)
        }
    }

    fn print_function_signature(&mut self, function: &'p FunctionType) -> String {
        self.print_function_type(function, false)
    }

    fn print_function_params(&mut self, function: &'p FunctionType) -> String {
        let mut parts: Vec<String> = Vec::new();
        for (index, param) in function.params.iter().enumerate() {
            let name = match &param.name {
                Some(name) => name.clone(),
                // Flow permits unnamed parameters in function types;
                // TypeScript requires names
                None => format!("arg{}", index),
            };
            let optional = if param.optional { "?" } else { "" };
            let ty = self.print_type(&param.type_annotation);
            parts.push(format!("{}{}: {}", name, optional, ty));
        }
        if let Some(rest) = &function.rest {
            let name = rest.name.clone().unwrap_or_else(|| "rest".to_string());
            let ty = self.print_type(&rest.type_annotation);
            parts.push(format!("...{}: {}", name, ty));
        }
        parts.join(", ")
    }

    fn print_type_params(
        &mut self,
        params: &'p TypeParameters,
        allow_variance: bool,
        trailing_comma: bool,
    ) -> String {
        let mut parts: Vec<String> = Vec::new();
        for param in &params.params {
            let mut out = String::new();
            match &param.variance {
                Some(variance) if allow_variance => match variance.kind {
                    VarianceKind::Covariant => out.push_str("out "),
                    VarianceKind::Contravariant => out.push_str("in "),
                },
                Some(variance) => {
                    self.diag(
                        variance.span,
                        DiagnosticKind::Variance,
                        "variance markers are not allowed on function type parameters in \
                         TypeScript; the marker was dropped",
                    );
                }
                None => {}
            }
            out.push_str(&param.name);
            if let Some(bound) = &param.bound {
                out.push_str(" extends ");
                out.push_str(&self.print_type(bound));
            }
            if let Some(default) = &param.default {
                out.push_str(" = ");
                out.push_str(&self.print_type(default));
            }
            parts.push(out);
        }
        let trailing = if trailing_comma && !parts.is_empty() {
            ","
        } else {
            ""
        };
        format!("<{}{}>", parts.join(", "), trailing)
    }

    fn print_type_args(&mut self, args: &'p TypeArguments) -> String {
        let types: Vec<String> = args.types.iter().map(|t| self.print_type(t)).collect();
        format!("<{}>", types.join(", "))
    }

    // ============ UTILITY TYPES ============

    fn print_type_reference(&mut self, reference: &'p TypeReference) -> String {
        if let Some(name) = reference.name.single() {
            if let Some(text) = self.print_utility_type(name, reference) {
                return text;
            }
            // Unqualified $-prefixed names that reached this point are
            // unrecognized Flow internals
            if name.starts_with("$FlowFixMe") {
                return "any".to_string();
            }
        }
        let args = reference
            .type_args
            .as_ref()
            .map(|a| self.print_type_args(a))
            .unwrap_or_default();
        format!("{}{}", reference.name.text(), args)
    }

    /// Named translation rules for Flow meta/utility types; None means the
    /// reference is not a recognized utility and prints as-is
    fn print_utility_type(
        &mut self,
        name: &str,
        reference: &'p TypeReference,
    ) -> Option<String> {
        let args: &[FlowType] = reference
            .type_args
            .as_ref()
            .map(|a| a.types.as_slice())
            .unwrap_or(&[]);
        let span = reference.span;

        match (name, args) {
            ("$Keys", [arg]) => {
                if self.options.inline_utility_types {
                    if let Some(text) = self.inline_keys(arg) {
                        return Some(text);
                    }
                }
                let printed = self.print_postfix_operand(arg);
                self.diag(
                    span,
                    DiagnosticKind::UtilityType,
                    "`$Keys` was translated to `keyof`, which also includes indexer keys; \
                     review manually",
                );
                Some(format!("keyof {}", printed))
            }
            ("$Values", [arg]) => {
                if self.options.inline_utility_types {
                    if let Some(text) = self.inline_values(arg) {
                        return Some(text);
                    }
                }
                let printed = self.print_postfix_operand(arg);
                self.diag(
                    span,
                    DiagnosticKind::UtilityType,
                    "`$Values` was translated to an indexed access over `keyof`; review \
                     manually",
                );
                Some(format!("{}[keyof {}]", printed, printed))
            }
            ("$Shape", [arg]) => {
                if self.options.inline_utility_types {
                    if let Some(text) = self.inline_shape(arg) {
                        return Some(text);
                    }
                }
                let printed = self.print_type(arg);
                self.diag(
                    span,
                    DiagnosticKind::UtilityType,
                    "`$Shape` was approximated with `Partial`; the semantics differ for \
                     nested objects, review manually",
                );
                Some(format!("Partial<{}>", printed))
            }
            ("$Diff" | "$Rest", [a, b]) => {
                if self.options.inline_utility_types {
                    if let Some(text) = self.inline_diff(a, b) {
                        return Some(text);
                    }
                }
                let a_printed = self.print_type(a);
                let b_printed = self.print_postfix_operand(b);
                self.diag(
                    span,
                    DiagnosticKind::UtilityType,
                    format!(
                        "`{}` was approximated with `Omit`; review manually",
                        name
                    ),
                );
                Some(format!("Omit<{}, keyof {}>", a_printed, b_printed))
            }
            ("$ReadOnly", [arg]) => Some(format!("Readonly<{}>", self.print_type(arg))),
            ("$ReadOnlyArray", [arg]) => {
                Some(format!("ReadonlyArray<{}>", self.print_type(arg)))
            }
            ("$ReadOnlyMap", [k, v]) => {
                let k = self.print_type(k);
                let v = self.print_type(v);
                Some(format!("ReadonlyMap<{}, {}>", k, v))
            }
            ("$ReadOnlySet", [arg]) => Some(format!("ReadonlySet<{}>", self.print_type(arg))),
            ("$NonMaybeType", [arg]) => Some(format!("NonNullable<{}>", self.print_type(arg))),
            ("$Exact", [arg]) => Some(self.print_type(arg)),
            ("$PropertyType" | "$ElementType", [object, index]) => {
                let object = self.print_postfix_operand(object);
                let index = self.print_type(index);
                Some(format!("{}[{}]", object, index))
            }
            ("$Call", [function, ..]) => {
                let printed = self.print_type(function);
                self.diag(
                    span,
                    DiagnosticKind::UtilityType,
                    "`$Call` was approximated with `ReturnType`; argument-dependent results \
                     are not modeled, review manually",
                );
                Some(format!("ReturnType<{}>", printed))
            }
            ("$ObjMap" | "$ObjMapi" | "$TupleMap" | "$Exports", _) => {
                self.diag(
                    span,
                    DiagnosticKind::UtilityType,
                    format!(
                        "`{}` has no TypeScript counterpart; emitted `any`, review manually",
                        name
                    ),
                );
                Some("any".to_string())
            }
            ("$Subtype" | "$Supertype", [arg]) => {
                let printed = self.print_type(arg);
                self.diag(
                    span,
                    DiagnosticKind::UtilityType,
                    format!(
                        "`{}` bounds are not expressible in TypeScript; emitted the argument \
                         type",
                        name
                    ),
                );
                Some(printed)
            }
            ("$CharSet", _) => {
                self.diag(
                    span,
                    DiagnosticKind::UtilityType,
                    "`$CharSet` has no TypeScript counterpart; emitted `string`",
                );
                Some("string".to_string())
            }
            ("Class", [arg]) => match arg {
                FlowType::Reference(inner) if inner.type_args.is_none() => {
                    self.diag(
                        span,
                        DiagnosticKind::UtilityType,
                        "`Class<T>` was approximated with `typeof T`; this only holds when \
                         `T` is a concrete class, review manually",
                    );
                    Some(format!("typeof {}", inner.name.text()))
                }
                _ => {
                    self.diag(
                        span,
                        DiagnosticKind::UtilityType,
                        "`Class<T>` with a non-nominal argument has no TypeScript \
                         counterpart; emitted `any`",
                    );
                    Some("any".to_string())
                }
            },
            _ if name.starts_with("$FlowFixMe") => Some("any".to_string()),
            _ => None,
        }
    }

    // ============ UTILITY INLINING ============

    /// `$Keys<{a: number}>` -> `'a'` (string-literal union of key names)
    fn inline_keys(&mut self, arg: &'p FlowType) -> Option<String> {
        let object = self.aliases.resolve_object(arg)?;
        let mut keys = Vec::new();
        for member in &object.members {
            match member {
                ObjectTypeMember::Property(property) => match &property.key {
                    ObjectTypeKey::Identifier(name) => keys.push(format!("'{}'", name)),
                    ObjectTypeKey::String(_, span) | ObjectTypeKey::Number(span) => {
                        keys.push(self.text(*span).to_string())
                    }
                },
                // Indexers and spreads make the key set non-enumerable
                _ => return None,
            }
        }
        if keys.is_empty() {
            return Some("never".to_string());
        }
        Some(keys.join(" | "))
    }

    /// `$Values<{a: number}>` -> `number` (union of property types)
    fn inline_values(&mut self, arg: &'p FlowType) -> Option<String> {
        let object = self.aliases.resolve_object(arg)?;
        let mut values = Vec::new();
        for member in &object.members {
            match member {
                ObjectTypeMember::Property(property) => {
                    values.push(self.print_operand(&property.value));
                }
                _ => return None,
            }
        }
        if values.is_empty() {
            return Some("never".to_string());
        }
        Some(values.join(" | "))
    }

    /// `$Shape<{a: number}>` -> `{ a?: number }` (all properties optional)
    fn inline_shape(&mut self, arg: &'p FlowType) -> Option<String> {
        let object = self.aliases.resolve_object(arg)?;
        let mut members = Vec::new();
        for member in &object.members {
            match member {
                ObjectTypeMember::Property(property) if !property.is_method => {
                    let key = self.print_object_key(&property.key);
                    let value = self.print_type(&property.value);
                    members.push(format!("{}?: {}", key, value));
                }
                _ => return None,
            }
        }
        if members.is_empty() {
            return Some("{}".to_string());
        }
        Some(format!("{{ {} }}", members.join("; ")))
    }

    /// `$Diff<{a: A, b: B}, {b: B}>` -> `{ a: A }`
    fn inline_diff(&mut self, a: &'p FlowType, b: &'p FlowType) -> Option<String> {
        let a_object = self.aliases.resolve_object(a)?;
        let b_object = self.aliases.resolve_object(b)?;

        let mut removed = Vec::new();
        for member in &b_object.members {
            match member {
                ObjectTypeMember::Property(property) => {
                    removed.push(object_key_text(&property.key, self.source));
                }
                _ => return None,
            }
        }

        let mut members = Vec::new();
        for member in &a_object.members {
            match member {
                ObjectTypeMember::Property(property) => {
                    if removed.contains(&object_key_text(&property.key, self.source)) {
                        continue;
                    }
                    members.push(self.print_object_member(member, false));
                }
                _ => return None,
            }
        }
        if members.is_empty() {
            return Some("{}".to_string());
        }
        Some(format!("{{ {} }}", members.join("; ")))
    }
}

fn member_span(member: &ObjectTypeMember) -> Span {
    match member {
        ObjectTypeMember::Property(property) => property.span,
        ObjectTypeMember::Indexer(indexer) => indexer.span,
        ObjectTypeMember::Call(call) => call.span,
        ObjectTypeMember::Spread(spread) => spread.span,
    }
}

/// Comparable key text for property subtraction
fn object_key_text(key: &ObjectTypeKey, source: &str) -> String {
    match key {
        ObjectTypeKey::Identifier(name) => name.clone(),
        ObjectTypeKey::String(value, _) => value.clone(),
        ObjectTypeKey::Number(span) => source.get(span.start..span.end).unwrap_or("").to_string(),
    }
}
