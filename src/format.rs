//! Built-in output formatter
//!
//! A lightweight, span-driven formatter applied after splicing. Every
//! transformation is anchored to parsed node spans rather than raw text
//! scanning, so strings, comments, regexes and JSX text are never
//! corrupted. The implemented subset is `quote_style`, `semicolons`
//! (insertion), `trailing_comma` and `bracket_spacing`; `indent_width`,
//! `line_width` and `arrow_parens` are carried for external formatters
//! (see DESIGN.md).

use crate::ast::*;
use crate::convert::splice::{splice, Edit};
use crate::convert::{FormatterOptions, QuoteStyle, TrailingComma};
use crate::error::ConvertError;
use crate::lexer::{Lexer, Span, TokenKind};
use crate::parser::Parser;

/// Format converter output according to `options`
///
/// The input is text the converter itself produced, so a parse failure
/// here indicates a translation bug and surfaces as `ConvertError::Format`.
pub fn format(text: &str, options: &FormatterOptions) -> Result<String, ConvertError> {
    let mut parser = Parser::new(text);
    let program = parser.parse_program().map_err(|error| {
        ConvertError::format(format!("formatter could not parse its input: {}", error))
    })?;

    let mut collector = Collector {
        source: text,
        options,
        edits: Vec::new(),
    };
    for statement in &program.body {
        collector.visit_statement(statement);
    }

    let (output, dropped) = splice(text, &collector.edits);
    if !dropped.is_empty() {
        return Err(ConvertError::format(
            "formatter produced conflicting edits",
        ));
    }
    Ok(output)
}

struct Collector<'a> {
    source: &'a str,
    options: &'a FormatterOptions,
    edits: Vec<Edit>,
}

impl<'a> Collector<'a> {
    fn text(&self, span: Span) -> &'a str {
        self.source.get(span.start..span.end).unwrap_or("")
    }

    fn insert(&mut self, at: usize, text: &str) {
        self.edits.push(Edit::new(Span::new(at, at, 1, 1), text));
    }

    fn remove(&mut self, start: usize, end: usize) {
        self.edits.push(Edit::new(Span::new(start, end, 1, 1), ""));
    }

    // ============ SEMICOLONS ============

    /// Insert a semicolon after a statement terminated by ASI
    fn semi(&mut self, span: Span) {
        if self.options.semicolons && !self.text(span).trim_end().ends_with(';') {
            let end = span.start + self.text(span).trim_end().len();
            self.insert(end, ";");
        }
    }

    // ============ COMMAS & SPACING ============

    /// Apply the trailing-comma policy to a bracketed list
    ///
    /// `last_end` is the end of the final element, `close` the offset of
    /// the closing bracket.
    fn list(&mut self, span: Span, last_end: Option<usize>, close: usize, args_level: bool) {
        let Some(last_end) = last_end else { return };
        if last_end >= close || close > span.end {
            return;
        }
        let between = self.source.get(last_end..close).unwrap_or("");
        let has_comma = between.trim_start().starts_with(',');
        let multiline = self.text(span).contains('\n');

        match self.options.trailing_comma {
            TrailingComma::None => {
                if has_comma {
                    let comma = last_end + (between.len() - between.trim_start().len());
                    self.remove(comma, comma + 1);
                }
            }
            TrailingComma::Es5 => {
                if multiline && !has_comma && !args_level {
                    self.insert(last_end, ",");
                }
            }
            TrailingComma::All => {
                if multiline && !has_comma {
                    self.insert(last_end, ",");
                }
            }
        }
    }

    /// Pad or tighten the braces of a single-line object literal
    fn brace_spacing(&mut self, span: Span) {
        let text = self.text(span);
        if text.contains('\n') || text.len() < 3 {
            return;
        }
        let inner = span.start + 1..span.end - 1;
        let Some(inner_text) = self.source.get(inner.clone()) else {
            return;
        };
        if inner_text.trim().is_empty() {
            return;
        }
        let leading = inner_text.len() - inner_text.trim_start().len();
        let trailing = inner_text.len() - inner_text.trim_end().len();
        if self.options.bracket_spacing {
            if leading == 0 {
                self.insert(inner.start, " ");
            }
            if trailing == 0 {
                self.insert(inner.end, " ");
            }
        } else {
            if leading > 0 {
                self.remove(inner.start, inner.start + leading);
            }
            if trailing > 0 {
                self.remove(inner.end - trailing, inner.end);
            }
        }
    }

    // ============ QUOTES ============

    /// Re-quote a string literal to the configured style
    fn requote(&mut self, span: Span) {
        let text = self.text(span);
        let desired = match self.options.quote_style {
            QuoteStyle::Single => '\'',
            QuoteStyle::Double => '"',
        };
        if text.starts_with(desired) {
            return;
        }
        // Re-cook the literal through the lexer to resolve escapes
        let mut lexer = Lexer::new(text);
        let TokenKind::String(value) = lexer.next_token().kind else {
            return;
        };
        let mut out = String::with_capacity(value.len() + 2);
        out.push(desired);
        for ch in value.chars() {
            match ch {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '\0' => out.push_str("\\0"),
                c if c == desired => {
                    out.push('\\');
                    out.push(c);
                }
                c => out.push(c),
            }
        }
        out.push(desired);
        self.edits.push(Edit::new(span, out));
    }

    // ============ TRAVERSAL ============

    fn visit_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::VariableDeclaration(decl) => {
                self.semi(decl.span);
                for declarator in &decl.declarations {
                    self.visit_pattern(&declarator.id);
                    if let Some(init) = &declarator.init {
                        self.visit_expression(init);
                    }
                }
            }
            Statement::FunctionDeclaration(decl) => self.visit_function(&decl.function),
            Statement::ClassDeclaration(class) => self.visit_class(class),
            Statement::TypeAlias(alias) => {
                self.semi(alias.span);
                self.visit_type(&alias.right);
            }
            Statement::OpaqueTypeAlias(alias) => {
                self.semi(alias.span);
                if let Some(right) = &alias.right {
                    self.visit_type(right);
                }
            }
            Statement::InterfaceDeclaration(interface) => {
                self.visit_object_type(&interface.body);
            }
            Statement::EnumDeclaration(decl) => {
                for member in &decl.members {
                    if let Some(init) = member.init {
                        if self.text(init).starts_with(['"', '\'']) {
                            self.requote(init);
                        }
                    }
                }
            }
            Statement::Import(import) => self.semi(import.span),
            Statement::Export(export) => {
                match &export.declaration {
                    Some(declaration) => self.visit_statement(declaration),
                    None => self.semi(export.span),
                }
                if let Some(default) = &export.default {
                    self.visit_expression(default);
                }
            }
            Statement::Declare(DeclareStatement::Module(module)) => {
                for statement in &module.body {
                    self.visit_statement(statement);
                }
            }
            Statement::Declare(_) => {}
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
                if let Some(ForInit::Expression(expr)) = &stmt.init {
                    self.visit_expression(expr);
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
                self.visit_expression(&stmt.right);
                self.visit_statement(&stmt.body);
            }
            Statement::ForOf(stmt) => {
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
                    self.visit_block(&handler.body);
                }
                if let Some(finalizer) = &stmt.finalizer {
                    self.visit_block(finalizer);
                }
            }
            Statement::Return(stmt) => {
                self.semi(stmt.span);
                if let Some(argument) = &stmt.argument {
                    self.visit_expression(argument);
                }
            }
            Statement::Throw(stmt) => {
                self.semi(stmt.span);
                self.visit_expression(&stmt.argument);
            }
            Statement::Expression(stmt) => {
                self.semi(stmt.span);
                self.visit_expression(&stmt.expression);
            }
            Statement::Labeled(stmt) => self.visit_statement(&stmt.body),
            Statement::Break(span) | Statement::Continue(span) | Statement::Debugger(span) => {
                self.semi(*span);
            }
            Statement::Empty(_) => {}
        }
    }

    fn visit_block(&mut self, block: &BlockStatement) {
        for statement in &block.body {
            self.visit_statement(statement);
        }
    }

    fn visit_function(&mut self, function: &Function) {
        for param in &function.params {
            self.visit_pattern(param);
        }
        if let Some(return_type) = &function.return_type {
            self.visit_type(return_type);
        }
        if let Some(body) = &function.body {
            self.visit_block(body);
        }
    }

    fn visit_class(&mut self, class: &ClassDeclaration) {
        if let Some(super_class) = &class.super_class {
            self.visit_expression(super_class);
        }
        for member in &class.body.members {
            match member {
                ClassMember::Method(method) => self.visit_function(&method.function),
                ClassMember::Property(property) => {
                    if let Some(annotation) = &property.type_annotation {
                        self.visit_type(annotation);
                    }
                    if let Some(value) = &property.value {
                        self.visit_expression(value);
                    }
                }
                ClassMember::StaticBlock(block) => self.visit_block(block),
            }
        }
    }

    fn visit_pattern(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::Identifier(p) => {
                if let Some(annotation) = &p.type_annotation {
                    self.visit_type(annotation);
                }
            }
            Pattern::Object(p) => {
                for property in &p.properties {
                    match property {
                        ObjectPatternProperty::Property { value, .. } => {
                            self.visit_pattern(value)
                        }
                        ObjectPatternProperty::Rest(rest) => self.visit_pattern(&rest.argument),
                    }
                }
                if let Some(annotation) = &p.type_annotation {
                    self.visit_type(annotation);
                }
            }
            Pattern::Array(p) => {
                for element in p.elements.iter().flatten() {
                    self.visit_pattern(element);
                }
                if let Some(annotation) = &p.type_annotation {
                    self.visit_type(annotation);
                }
            }
            Pattern::Assignment(p) => {
                self.visit_pattern(&p.left);
                self.visit_expression(&p.right);
            }
            Pattern::Rest(p) => self.visit_pattern(&p.argument),
        }
    }

    fn visit_expression(&mut self, expression: &Expression) {
        match expression {
            Expression::StringLiteral(span) => self.requote(*span),
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
                let last_end = array
                    .elements
                    .iter()
                    .rev()
                    .find_map(|e| e.as_ref().map(|expr| expr.span().end));
                self.list(array.span, last_end, array.span.end - 1, false);
                for element in array.elements.iter().flatten() {
                    self.visit_expression(element);
                }
            }
            Expression::Object(object) => {
                let last_end = object.properties.last().map(member_end);
                self.list(object.span, last_end, object.span.end - 1, false);
                self.brace_spacing(object.span);
                for member in &object.properties {
                    match member {
                        ObjectLiteralMember::Property { key, value, .. } => {
                            if let PropertyKey::Literal(span) = key {
                                if self.text(*span).starts_with(['"', '\'']) {
                                    self.requote(*span);
                                }
                            }
                            self.visit_expression(value);
                        }
                        ObjectLiteralMember::Shorthand(_) => {}
                        ObjectLiteralMember::Method(method) => {
                            self.visit_function(&method.function)
                        }
                        ObjectLiteralMember::Spread(spread) => {
                            self.visit_expression(&spread.argument)
                        }
                    }
                }
            }
            Expression::Function(function) => self.visit_function(&function.function),
            Expression::Arrow(arrow) => {
                for param in &arrow.params {
                    self.visit_pattern(param);
                }
                if let Some(return_type) = &arrow.return_type {
                    self.visit_type(return_type);
                }
                match &arrow.body {
                    ArrowBody::Expression(expr) => self.visit_expression(expr),
                    ArrowBody::Block(block) => self.visit_block(block),
                }
            }
            Expression::Class(class) => self.visit_class(class),
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
                if !e.arguments.is_empty() && e.span.end > 0 {
                    let last_end = e.arguments.last().map(|a| a.span().end);
                    self.list(e.span, last_end, e.span.end - 1, true);
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
            Expression::TypeCast(e) => {
                self.visit_expression(&e.expression);
                self.visit_type(&e.type_annotation);
            }
            Expression::AsCast(e) => {
                self.visit_expression(&e.expression);
                self.visit_type(&e.type_annotation);
            }
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

    fn visit_jsx_element(&mut self, element: &JsxElement) {
        for attribute in &element.attributes {
            match attribute {
                // Attribute string values keep their quotes; JSX convention
                // prefers double quotes regardless of the code style
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

    fn visit_jsx_children(&mut self, children: &[JsxChild]) {
        for child in children {
            match child {
                JsxChild::Element(element) => self.visit_jsx_element(element),
                JsxChild::Fragment(fragment) => self.visit_jsx_children(&fragment.children),
                JsxChild::Expression(Some(expr)) => self.visit_expression(expr),
                _ => {}
            }
        }
    }

    fn visit_type(&mut self, ty: &FlowType) {
        match ty {
            FlowType::StringLiteral(literal) => self.requote(literal.span),
            FlowType::Maybe(t) => self.visit_type(&t.inner),
            FlowType::Union(t) => {
                for member in &t.members {
                    self.visit_type(member);
                }
            }
            FlowType::Intersection(t) => {
                for member in &t.members {
                    self.visit_type(member);
                }
            }
            FlowType::Tuple(t) => {
                for element in &t.elements {
                    self.visit_type(element);
                }
            }
            FlowType::Array(t) => self.visit_type(&t.element),
            FlowType::Object(t) => self.visit_object_type(t),
            FlowType::Function(t) => {
                for param in &t.params {
                    self.visit_type(&param.type_annotation);
                }
                if let Some(rest) = &t.rest {
                    self.visit_type(&rest.type_annotation);
                }
                self.visit_type(&t.return_type);
            }
            FlowType::Reference(t) => {
                if let Some(args) = &t.type_args {
                    for arg in &args.types {
                        self.visit_type(arg);
                    }
                }
            }
            FlowType::Indexed(t) => {
                self.visit_type(&t.object);
                self.visit_type(&t.index);
            }
            FlowType::Keyof(t) => self.visit_type(&t.argument),
            FlowType::Paren(t) => self.visit_type(&t.inner),
            _ => {}
        }
    }

    fn visit_object_type(&mut self, object: &ObjectType) {
        for member in &object.members {
            match member {
                ObjectTypeMember::Property(property) => {
                    if let ObjectTypeKey::String(_, span) = &property.key {
                        self.requote(*span);
                    }
                    self.visit_type(&property.value);
                }
                ObjectTypeMember::Indexer(indexer) => {
                    self.visit_type(&indexer.key);
                    self.visit_type(&indexer.value);
                }
                ObjectTypeMember::Call(call) => {
                    for param in &call.function.params {
                        self.visit_type(&param.type_annotation);
                    }
                    self.visit_type(&call.function.return_type);
                }
                ObjectTypeMember::Spread(spread) => self.visit_type(&spread.argument),
            }
        }
    }
}

fn member_end(member: &ObjectLiteralMember) -> usize {
    match member {
        ObjectLiteralMember::Property { span, .. } => span.end,
        ObjectLiteralMember::Shorthand(id) => id.span.end,
        ObjectLiteralMember::Method(method) => method.span.end,
        ObjectLiteralMember::Spread(spread) => spread.span.end,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fmt(source: &str, options: &FormatterOptions) -> String {
        format(source, options).unwrap()
    }

    #[test]
    fn test_requote_to_single() {
        let options = FormatterOptions {
            quote_style: QuoteStyle::Single,
            ..Default::default()
        };
        assert_eq!(
            fmt("const a: string = \"s\";", &options),
            "const a: string = 's';"
        );
    }

    #[test]
    fn test_requote_escapes_embedded_quote() {
        let options = FormatterOptions {
            quote_style: QuoteStyle::Single,
            ..Default::default()
        };
        assert_eq!(
            fmt("const a = \"it's\";", &options),
            "const a = 'it\\'s';"
        );
    }

    #[test]
    fn test_semicolon_insertion() {
        let options = FormatterOptions {
            semicolons: true,
            ..Default::default()
        };
        assert_eq!(fmt("const a = 1\nfoo()", &options), "const a = 1;\nfoo();");
    }

    #[test]
    fn test_trailing_comma_removed() {
        let options = FormatterOptions {
            trailing_comma: TrailingComma::None,
            ..Default::default()
        };
        assert_eq!(fmt("const a = [1, 2,];", &options), "const a = [1, 2];");
    }

    #[test]
    fn test_trailing_comma_added_multiline() {
        let options = FormatterOptions {
            trailing_comma: TrailingComma::All,
            ..Default::default()
        };
        assert_eq!(
            fmt("const a = [\n  1,\n  2\n];", &options),
            "const a = [\n  1,\n  2,\n];"
        );
    }

    #[test]
    fn test_bracket_spacing_added() {
        let options = FormatterOptions {
            bracket_spacing: true,
            ..Default::default()
        };
        assert_eq!(fmt("const o = {a: 1};", &options), "const o = { a: 1 };");
    }
}
