//! Parser for Flow-annotated JavaScript source
//!
//! Recursive descent over the token stream, with checkpoint/restore
//! backtracking for the spots the grammar is not LL(1): arrow functions vs
//! parenthesized expressions vs typecasts, generic arrows vs JSX, and call
//! type arguments vs less-than.

use crate::ast::*;
use crate::error::ConvertError;
use crate::lexer::{Lexer, LexerCheckpoint, Span, Token, TokenKind};

/// Parser checkpoint for backtracking
struct Checkpoint {
    lexer: LexerCheckpoint,
    current: Token,
    prev_end: usize,
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    /// Byte offset just past the previously consumed token
    prev_end: usize,
    /// Disables anonymous function types at the top level of the type being
    /// parsed (arrow-function return annotations, where `=>` must be left
    /// for the arrow itself)
    no_anon_fn: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            prev_end: 0,
            no_anon_fn: false,
        }
    }

    pub fn source(&self) -> &'a str {
        self.lexer.source()
    }

    /// Parse a complete program
    pub fn parse_program(&mut self) -> Result<Program, ConvertError> {
        let start = self.current.span;
        let mut body = Vec::new();
        while !self.is_at_end() {
            body.push(self.parse_statement()?);
        }
        Ok(Program {
            body,
            span: self.span_from(start),
        })
    }

    // ============ TOKEN PLUMBING ============

    fn is_at_end(&self) -> bool {
        self.current.kind == TokenKind::Eof
    }

    fn bump(&mut self) {
        self.prev_end = self.current.span.end;
        self.current = self.lexer.next_token();
    }

    fn advance(&mut self) -> Token {
        let token = self.current.clone();
        self.bump();
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.current.kind == *kind
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn require(&mut self, kind: TokenKind, what: &str) -> Result<Token, ConvertError> {
        if self.current.kind == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, what: &str) -> ConvertError {
        ConvertError::parse(
            format!(
                "expected {}, found {}",
                what,
                describe(&self.current.kind)
            ),
            self.current.span.line,
            self.current.span.column,
        )
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            lexer: self.lexer.checkpoint(),
            current: self.current.clone(),
            prev_end: self.prev_end,
        }
    }

    fn restore(&mut self, checkpoint: &Checkpoint) {
        self.lexer.restore(&checkpoint.lexer);
        self.current = checkpoint.current.clone();
        self.prev_end = checkpoint.prev_end;
    }

    fn peek_token(&mut self) -> Token {
        let cp = self.lexer.checkpoint();
        let token = self.lexer.next_token();
        self.lexer.restore(&cp);
        token
    }

    fn span_from(&self, start: Span) -> Span {
        Span::new(start.start, self.prev_end, start.line, start.column)
    }

    /// The current token's text when it can serve as an identifier name
    /// (plain identifiers plus reserved words in name position)
    fn ident_like(&self) -> Option<String> {
        match &self.current.kind {
            TokenKind::Identifier(name) => Some(name.clone()),
            kind => keyword_text(kind).map(str::to_string),
        }
    }

    fn current_ident_is(&self, name: &str) -> bool {
        matches!(&self.current.kind, TokenKind::Identifier(n) if n == name)
    }

    fn require_identifier(&mut self, what: &str) -> Result<Identifier, ConvertError> {
        match &self.current.kind {
            TokenKind::Identifier(name) => {
                let id = Identifier {
                    name: name.clone(),
                    span: self.current.span,
                };
                self.bump();
                Ok(id)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    /// Accept a semicolon, or apply automatic semicolon insertion
    fn expect_semicolon(&mut self) -> Result<(), ConvertError> {
        if self.match_token(&TokenKind::Semicolon) {
            return Ok(());
        }
        if self.current.newline_before
            || self.check(&TokenKind::RBrace)
            || self.is_at_end()
        {
            return Ok(());
        }
        Err(self.unexpected("`;`"))
    }

    /// Consume one `>` in type context, splitting compound tokens like `>>`
    fn expect_type_gt(&mut self) -> Result<Span, ConvertError> {
        let span = self.current.span;
        let gt_span = Span::new(span.start, span.start + 1, span.line, span.column);
        let rest = match self.current.kind {
            TokenKind::Gt => None,
            TokenKind::GtGt => Some(TokenKind::Gt),
            TokenKind::GtGtGt => Some(TokenKind::GtGt),
            TokenKind::GtEq => Some(TokenKind::Eq),
            TokenKind::GtGtEq => Some(TokenKind::GtEq),
            TokenKind::GtGtGtEq => Some(TokenKind::GtGtEq),
            _ => return Err(self.unexpected("`>`")),
        };
        match rest {
            None => {
                self.bump();
            }
            Some(kind) => {
                self.prev_end = span.start + 1;
                self.current = Token::new(
                    kind,
                    Span::new(span.start + 1, span.end, span.line, span.column + 1),
                    false,
                );
            }
        }
        Ok(gt_span)
    }

    // ============ STATEMENTS ============

    fn parse_statement(&mut self) -> Result<Statement, ConvertError> {
        // Labeled statement: identifier followed by a colon
        if matches!(self.current.kind, TokenKind::Identifier(_)) {
            let peek = self.peek_token();
            if peek.kind == TokenKind::Colon {
                return self.parse_labeled_statement();
            }
        }

        if self.check(&TokenKind::At) {
            let decorators = self.parse_decorators()?;
            if self.check(&TokenKind::Class) {
                let mut class = self.parse_class()?;
                class.decorators = decorators;
                return Ok(Statement::ClassDeclaration(class));
            }
            if self.check(&TokenKind::Export) {
                let mut export = self.parse_export()?;
                if let Some(decl) = export.declaration.as_deref_mut() {
                    if let Statement::ClassDeclaration(class) = decl {
                        class.decorators = decorators;
                    }
                }
                return Ok(Statement::Export(export));
            }
            return Err(self.unexpected("a class declaration after decorators"));
        }

        // Flow contextual declarations
        if self.current_ident_is("type") {
            if matches!(self.peek_token().kind, TokenKind::Identifier(_)) {
                return Ok(Statement::TypeAlias(self.parse_type_alias(None)?));
            }
        }
        if self.current_ident_is("opaque") {
            if matches!(&self.peek_token().kind, TokenKind::Identifier(n) if n == "type") {
                return Ok(Statement::OpaqueTypeAlias(self.parse_opaque_type(None)?));
            }
        }
        if self.current_ident_is("declare") && self.declare_follows() {
            return self.parse_declare();
        }

        let peek_is_function = self.peek_token().kind == TokenKind::Function;
        match &self.current.kind {
            TokenKind::Let | TokenKind::Const | TokenKind::Var => Ok(
                Statement::VariableDeclaration(self.parse_variable_declaration(true, true)?),
            ),
            TokenKind::Function => Ok(Statement::FunctionDeclaration(
                self.parse_function_declaration(false)?,
            )),
            TokenKind::Async if peek_is_function => {
                self.bump();
                Ok(Statement::FunctionDeclaration(
                    self.parse_function_declaration(true)?,
                ))
            }
            TokenKind::Class => {
                let class = self.parse_class()?;
                Ok(Statement::ClassDeclaration(class))
            }
            TokenKind::Interface => {
                Ok(Statement::InterfaceDeclaration(self.parse_interface(None)?))
            }
            TokenKind::Enum => Ok(Statement::EnumDeclaration(self.parse_enum()?)),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Do => self.parse_do_while_statement(),
            TokenKind::Switch => self.parse_switch_statement(),
            TokenKind::Try => self.parse_try_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Break => {
                let start = self.current.span;
                self.bump();
                if !self.current.newline_before && matches!(self.current.kind, TokenKind::Identifier(_)) {
                    self.bump();
                }
                self.expect_semicolon()?;
                Ok(Statement::Break(self.span_from(start)))
            }
            TokenKind::Continue => {
                let start = self.current.span;
                self.bump();
                if !self.current.newline_before && matches!(self.current.kind, TokenKind::Identifier(_)) {
                    self.bump();
                }
                self.expect_semicolon()?;
                Ok(Statement::Continue(self.span_from(start)))
            }
            TokenKind::Throw => {
                let start = self.current.span;
                self.bump();
                let argument = self.parse_expression(true)?;
                self.expect_semicolon()?;
                Ok(Statement::Throw(ThrowStatement {
                    argument,
                    span: self.span_from(start),
                }))
            }
            TokenKind::LBrace => Ok(Statement::Block(self.parse_block()?)),
            TokenKind::Semicolon => {
                let span = self.current.span;
                self.bump();
                Ok(Statement::Empty(span))
            }
            TokenKind::Debugger => {
                let start = self.current.span;
                self.bump();
                self.expect_semicolon()?;
                Ok(Statement::Debugger(self.span_from(start)))
            }
            TokenKind::Import => {
                let peek = self.peek_token();
                if peek.kind == TokenKind::LParen || peek.kind == TokenKind::Dot {
                    self.parse_expression_statement()
                } else {
                    Ok(Statement::Import(self.parse_import()?))
                }
            }
            TokenKind::Export => Ok(Statement::Export(self.parse_export()?)),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> Result<Statement, ConvertError> {
        let start = self.current.span;
        let expression = self.parse_expression(true)?;
        self.expect_semicolon()?;
        Ok(Statement::Expression(ExpressionStatement {
            expression,
            span: self.span_from(start),
        }))
    }

    fn parse_labeled_statement(&mut self) -> Result<Statement, ConvertError> {
        let start = self.current.span;
        let label = self.require_identifier("a label")?;
        self.require(TokenKind::Colon, "`:`")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Statement::Labeled(LabeledStatement {
            label,
            body,
            span: self.span_from(start),
        }))
    }

    fn parse_decorators(&mut self) -> Result<Vec<Expression>, ConvertError> {
        let mut decorators = vec![];
        while self.check(&TokenKind::At) {
            self.bump();
            decorators.push(self.parse_call_member_chain(false)?);
        }
        Ok(decorators)
    }

    fn parse_block(&mut self) -> Result<BlockStatement, ConvertError> {
        let start = self.current.span;
        self.require(TokenKind::LBrace, "`{`")?;
        let mut body = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            body.push(self.parse_statement()?);
        }
        self.require(TokenKind::RBrace, "`}`")?;
        Ok(BlockStatement {
            body,
            span: self.span_from(start),
        })
    }

    fn parse_variable_declaration(
        &mut self,
        allow_in: bool,
        consume_semi: bool,
    ) -> Result<VariableDeclaration, ConvertError> {
        let start = self.current.span;
        let kind = match self.current.kind {
            TokenKind::Let => VariableKind::Let,
            TokenKind::Const => VariableKind::Const,
            TokenKind::Var => VariableKind::Var,
            _ => return Err(self.unexpected("a variable declaration")),
        };
        self.bump();

        let mut declarations = vec![self.parse_variable_declarator(allow_in)?];
        while self.match_token(&TokenKind::Comma) {
            declarations.push(self.parse_variable_declarator(allow_in)?);
        }

        if consume_semi {
            self.expect_semicolon()?;
        }
        Ok(VariableDeclaration {
            kind,
            declarations,
            span: self.span_from(start),
        })
    }

    fn parse_variable_declarator(
        &mut self,
        allow_in: bool,
    ) -> Result<VariableDeclarator, ConvertError> {
        let start = self.current.span;
        let id = self.parse_binding(false)?;
        let init = if self.match_token(&TokenKind::Eq) {
            Some(self.parse_assignment(allow_in)?)
        } else {
            None
        };
        Ok(VariableDeclarator {
            id,
            init,
            span: self.span_from(start),
        })
    }

    fn parse_if_statement(&mut self) -> Result<Statement, ConvertError> {
        let start = self.current.span;
        self.bump();
        self.require(TokenKind::LParen, "`(`")?;
        let test = self.parse_expression(true)?;
        self.require(TokenKind::RParen, "`)`")?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.match_token(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Statement::If(IfStatement {
            test,
            consequent,
            alternate,
            span: self.span_from(start),
        }))
    }

    fn parse_while_statement(&mut self) -> Result<Statement, ConvertError> {
        let start = self.current.span;
        self.bump();
        self.require(TokenKind::LParen, "`(`")?;
        let test = self.parse_expression(true)?;
        self.require(TokenKind::RParen, "`)`")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Statement::While(WhileStatement {
            test,
            body,
            span: self.span_from(start),
        }))
    }

    fn parse_do_while_statement(&mut self) -> Result<Statement, ConvertError> {
        let start = self.current.span;
        self.bump();
        let body = Box::new(self.parse_statement()?);
        self.require(TokenKind::While, "`while`")?;
        self.require(TokenKind::LParen, "`(`")?;
        let test = self.parse_expression(true)?;
        self.require(TokenKind::RParen, "`)`")?;
        self.match_token(&TokenKind::Semicolon);
        Ok(Statement::DoWhile(DoWhileStatement {
            body,
            test,
            span: self.span_from(start),
        }))
    }

    fn parse_for_statement(&mut self) -> Result<Statement, ConvertError> {
        let start = self.current.span;
        self.bump();
        let is_await = if self.check(&TokenKind::Await) {
            self.bump();
            true
        } else {
            false
        };
        self.require(TokenKind::LParen, "`(`")?;

        // for (;;) with an empty initializer
        if self.match_token(&TokenKind::Semicolon) {
            return self.parse_for_rest(start, None);
        }

        if matches!(
            self.current.kind,
            TokenKind::Let | TokenKind::Const | TokenKind::Var
        ) {
            let declaration = self.parse_variable_declaration(false, false)?;
            if self.check(&TokenKind::In) {
                self.bump();
                return self.parse_for_in_of(start, ForTarget::Declaration(declaration), false, is_await);
            }
            if self.current_ident_is("of") {
                self.bump();
                return self.parse_for_in_of(start, ForTarget::Declaration(declaration), true, is_await);
            }
            self.require(TokenKind::Semicolon, "`;`")?;
            return self.parse_for_rest(start, Some(ForInit::Declaration(declaration)));
        }

        let init = self.parse_expression(false)?;
        if self.check(&TokenKind::In) {
            self.bump();
            let target = ForTarget::Pattern(expression_to_loose_pattern(init));
            return self.parse_for_in_of(start, target, false, is_await);
        }
        if self.current_ident_is("of") {
            self.bump();
            let target = ForTarget::Pattern(expression_to_loose_pattern(init));
            return self.parse_for_in_of(start, target, true, is_await);
        }
        self.require(TokenKind::Semicolon, "`;`")?;
        self.parse_for_rest(start, Some(ForInit::Expression(init)))
    }

    fn parse_for_rest(
        &mut self,
        start: Span,
        init: Option<ForInit>,
    ) -> Result<Statement, ConvertError> {
        let test = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression(true)?)
        };
        self.require(TokenKind::Semicolon, "`;`")?;
        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression(true)?)
        };
        self.require(TokenKind::RParen, "`)`")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Statement::For(ForStatement {
            init,
            test,
            update,
            body,
            span: self.span_from(start),
        }))
    }

    fn parse_for_in_of(
        &mut self,
        start: Span,
        left: ForTarget,
        is_of: bool,
        is_await: bool,
    ) -> Result<Statement, ConvertError> {
        let right = if is_of {
            self.parse_assignment(true)?
        } else {
            self.parse_expression(true)?
        };
        self.require(TokenKind::RParen, "`)`")?;
        let body = Box::new(self.parse_statement()?);
        let span = self.span_from(start);
        if is_of {
            Ok(Statement::ForOf(ForOfStatement {
                left,
                right,
                body,
                is_await,
                span,
            }))
        } else {
            Ok(Statement::ForIn(ForInStatement {
                left,
                right,
                body,
                span,
            }))
        }
    }

    fn parse_switch_statement(&mut self) -> Result<Statement, ConvertError> {
        let start = self.current.span;
        self.bump();
        self.require(TokenKind::LParen, "`(`")?;
        let discriminant = self.parse_expression(true)?;
        self.require(TokenKind::RParen, "`)`")?;
        self.require(TokenKind::LBrace, "`{`")?;
        let mut cases = vec![];
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let case_start = self.current.span;
            let test = if self.match_token(&TokenKind::Case) {
                let test = self.parse_expression(true)?;
                self.require(TokenKind::Colon, "`:`")?;
                Some(test)
            } else {
                self.require(TokenKind::Default, "`case` or `default`")?;
                self.require(TokenKind::Colon, "`:`")?;
                None
            };
            let mut body = vec![];
            while !matches!(
                self.current.kind,
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
            ) {
                body.push(self.parse_statement()?);
            }
            cases.push(SwitchCase {
                test,
                body,
                span: self.span_from(case_start),
            });
        }
        self.require(TokenKind::RBrace, "`}`")?;
        Ok(Statement::Switch(SwitchStatement {
            discriminant,
            cases,
            span: self.span_from(start),
        }))
    }

    fn parse_try_statement(&mut self) -> Result<Statement, ConvertError> {
        let start = self.current.span;
        self.bump();
        let block = self.parse_block()?;
        let handler = if self.check(&TokenKind::Catch) {
            let handler_start = self.current.span;
            self.bump();
            let param = if self.match_token(&TokenKind::LParen) {
                let param = self.parse_binding(false)?;
                self.require(TokenKind::RParen, "`)`")?;
                Some(param)
            } else {
                None
            };
            let body = self.parse_block()?;
            Some(CatchClause {
                param,
                body,
                span: self.span_from(handler_start),
            })
        } else {
            None
        };
        let finalizer = if self.match_token(&TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.unexpected("`catch` or `finally`"));
        }
        Ok(Statement::Try(TryStatement {
            block,
            handler,
            finalizer,
            span: self.span_from(start),
        }))
    }

    fn parse_return_statement(&mut self) -> Result<Statement, ConvertError> {
        let start = self.current.span;
        self.bump();
        let argument = if self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.is_at_end()
            || self.current.newline_before
        {
            None
        } else {
            Some(self.parse_expression(true)?)
        };
        self.expect_semicolon()?;
        Ok(Statement::Return(ReturnStatement {
            argument,
            span: self.span_from(start),
        }))
    }

    // ============ FUNCTIONS & CLASSES ============

    fn parse_function_declaration(
        &mut self,
        is_async: bool,
    ) -> Result<FunctionDeclaration, ConvertError> {
        let start = self.current.span;
        self.require(TokenKind::Function, "`function`")?;
        let is_generator = self.match_token(&TokenKind::Star);
        let id = Some(self.require_identifier("a function name")?);
        let function = self.parse_function_rest(start, id, is_async, is_generator, false)?;
        if function.body.is_none() {
            // Ambient overload-style declaration (`function f(): void;`)
            self.expect_semicolon()?;
        }
        let span = function.span;
        Ok(FunctionDeclaration { function, span })
    }

    /// Parse everything after the function name: type parameters, params,
    /// return annotation, optional predicate, and (unless `body_required`
    /// is false and absent) the body block
    fn parse_function_rest(
        &mut self,
        start: Span,
        id: Option<Identifier>,
        is_async: bool,
        is_generator: bool,
        body_required: bool,
    ) -> Result<Function, ConvertError> {
        let type_parameters = if self.check(&TokenKind::Lt) {
            Some(self.parse_type_parameters()?)
        } else {
            None
        };
        let params = self.parse_params()?;
        let return_type = if self.match_token(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let predicate = self.parse_predicate()?;
        let body = if self.check(&TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else if body_required {
            return Err(self.unexpected("a function body"));
        } else {
            None
        };
        Ok(Function {
            id,
            type_parameters,
            params,
            return_type,
            predicate,
            body,
            is_async,
            is_generator,
            span: self.span_from(start),
        })
    }

    /// Parse a `%checks` / `%checks(expr)` predicate, if present
    fn parse_predicate(&mut self) -> Result<Option<Span>, ConvertError> {
        if !self.check(&TokenKind::Percent) {
            return Ok(None);
        }
        let start = self.current.span;
        self.bump();
        if !self.current_ident_is("checks") {
            return Err(self.unexpected("`checks`"));
        }
        self.bump();
        if self.check(&TokenKind::LParen) {
            self.bump();
            let mut depth = 1usize;
            while depth > 0 && !self.is_at_end() {
                match self.current.kind {
                    TokenKind::LParen => depth += 1,
                    TokenKind::RParen => depth -= 1,
                    _ => {}
                }
                self.bump();
            }
        }
        Ok(Some(self.span_from(start)))
    }

    fn parse_params(&mut self) -> Result<Vec<Pattern>, ConvertError> {
        self.require(TokenKind::LParen, "`(`")?;
        let mut params = vec![];
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            if self.check(&TokenKind::DotDotDot) {
                let start = self.current.span;
                self.bump();
                let argument = Box::new(self.parse_binding(true)?);
                params.push(Pattern::Rest(RestPattern {
                    argument,
                    span: self.span_from(start),
                }));
            } else if self.check(&TokenKind::This) {
                let start = self.current.span;
                self.bump();
                let type_annotation = if self.match_token(&TokenKind::Colon) {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                params.push(Pattern::Identifier(IdentifierPattern {
                    name: "this".to_string(),
                    optional: false,
                    type_annotation,
                    span: self.span_from(start),
                }));
            } else {
                let pattern = self.parse_binding(true)?;
                params.push(self.wrap_default(pattern)?);
            }
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.require(TokenKind::RParen, "`)`")?;
        Ok(params)
    }

    fn wrap_default(&mut self, pattern: Pattern) -> Result<Pattern, ConvertError> {
        if self.match_token(&TokenKind::Eq) {
            let start = pattern.span();
            let right = Box::new(self.parse_assignment(true)?);
            Ok(Pattern::Assignment(AssignmentPattern {
                left: Box::new(pattern),
                right,
                span: self.span_from(start),
            }))
        } else {
            Ok(pattern)
        }
    }

    fn parse_class(&mut self) -> Result<ClassDeclaration, ConvertError> {
        let start = self.current.span;
        self.require(TokenKind::Class, "`class`")?;
        let id = if matches!(self.current.kind, TokenKind::Identifier(_)) {
            Some(self.require_identifier("a class name")?)
        } else {
            None
        };
        let type_parameters = if self.check(&TokenKind::Lt) {
            Some(self.parse_type_parameters()?)
        } else {
            None
        };
        let (super_class, super_type_args) = if self.match_token(&TokenKind::Extends) {
            let callee = self.parse_call_member_chain(false)?;
            let type_args = if self.check(&TokenKind::Lt) {
                Some(self.parse_type_arguments()?)
            } else {
                None
            };
            (Some(Box::new(callee)), type_args)
        } else {
            (None, None)
        };
        let mixins = if self.current_ident_is("mixins") {
            let mixins_start = self.current.span;
            self.bump();
            loop {
                self.parse_type_reference()?;
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            Some(self.span_from(mixins_start))
        } else {
            None
        };
        let mut implements = vec![];
        if self.match_token(&TokenKind::Implements) {
            loop {
                implements.push(self.parse_type_reference()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        let body = self.parse_class_body()?;
        Ok(ClassDeclaration {
            id,
            type_parameters,
            super_class,
            super_type_args,
            implements,
            mixins,
            decorators: vec![],
            body,
            span: self.span_from(start),
        })
    }

    fn parse_class_body(&mut self) -> Result<ClassBody, ConvertError> {
        let start = self.current.span;
        self.require(TokenKind::LBrace, "`{`")?;
        let mut members = vec![];
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            if self.match_token(&TokenKind::Semicolon) {
                continue;
            }
            members.push(self.parse_class_member()?);
        }
        self.require(TokenKind::RBrace, "`}`")?;
        Ok(ClassBody {
            members,
            span: self.span_from(start),
        })
    }

    fn parse_class_member(&mut self) -> Result<ClassMember, ConvertError> {
        let start = self.current.span;
        let decorators = if self.check(&TokenKind::At) {
            self.parse_decorators()?
        } else {
            vec![]
        };

        let mut is_static = false;
        if self.check(&TokenKind::Static) {
            let peek = self.peek_token();
            if peek.kind == TokenKind::LBrace {
                self.bump();
                return Ok(ClassMember::StaticBlock(self.parse_block()?));
            }
            if !matches!(
                peek.kind,
                TokenKind::LParen
                    | TokenKind::Eq
                    | TokenKind::Colon
                    | TokenKind::Question
                    | TokenKind::Semicolon
            ) {
                is_static = true;
                self.bump();
            }
        }

        let mut is_async = false;
        if self.check(&TokenKind::Async) {
            let peek = self.peek_token();
            if !peek.newline_before
                && !matches!(
                    peek.kind,
                    TokenKind::LParen
                        | TokenKind::Eq
                        | TokenKind::Colon
                        | TokenKind::Question
                        | TokenKind::Semicolon
                        | TokenKind::Lt
                )
            {
                is_async = true;
                self.bump();
            }
        }

        let is_generator = self.match_token(&TokenKind::Star);

        let mut kind = MethodKind::Method;
        if !is_async && !is_generator
            && (self.current_ident_is("get") || self.current_ident_is("set"))
        {
            let peek = self.peek_token();
            if !matches!(
                peek.kind,
                TokenKind::LParen
                    | TokenKind::Eq
                    | TokenKind::Colon
                    | TokenKind::Question
                    | TokenKind::Semicolon
                    | TokenKind::Lt
                    | TokenKind::RBrace
            ) {
                kind = if self.current_ident_is("get") {
                    MethodKind::Get
                } else {
                    MethodKind::Set
                };
                self.bump();
            }
        }

        let variance = self.parse_variance();
        let key = self.parse_property_key()?;

        if self.check(&TokenKind::Lt) || self.check(&TokenKind::LParen) {
            if kind == MethodKind::Method {
                if let PropertyKey::Identifier(id) = &key {
                    if id.name == "constructor" && !is_static {
                        kind = MethodKind::Constructor;
                    }
                }
            }
            let function = self.parse_function_rest(start, None, is_async, is_generator, true)?;
            return Ok(ClassMember::Method(ClassMethod {
                key,
                function,
                kind,
                is_static,
                decorators,
                span: self.span_from(start),
            }));
        }

        let optional = self.match_token(&TokenKind::Question);
        let type_annotation = if self.match_token(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let value = if self.match_token(&TokenKind::Eq) {
            Some(self.parse_assignment(true)?)
        } else {
            None
        };
        self.expect_semicolon()?;
        Ok(ClassMember::Property(ClassProperty {
            key,
            value,
            type_annotation,
            variance,
            is_static,
            optional,
            decorators,
            span: self.span_from(start),
        }))
    }

    fn parse_variance(&mut self) -> Option<Variance> {
        let kind = match self.current.kind {
            TokenKind::Plus => VarianceKind::Covariant,
            TokenKind::Minus => VarianceKind::Contravariant,
            _ => return None,
        };
        let span = self.current.span;
        self.bump();
        Some(Variance { kind, span })
    }

    fn parse_property_key(&mut self) -> Result<PropertyKey, ConvertError> {
        match &self.current.kind {
            TokenKind::String(_) | TokenKind::Number(_) | TokenKind::BigInt(_) => {
                let span = self.current.span;
                self.bump();
                Ok(PropertyKey::Literal(span))
            }
            TokenKind::LBracket => {
                self.bump();
                let expr = self.parse_assignment(true)?;
                self.require(TokenKind::RBracket, "`]`")?;
                Ok(PropertyKey::Computed(Box::new(expr)))
            }
            TokenKind::Hash => {
                let start = self.current.span;
                self.bump();
                let id = self.require_identifier("a private name")?;
                Ok(PropertyKey::Private(Identifier {
                    name: id.name,
                    span: start.to(id.span),
                }))
            }
            _ => {
                if let Some(name) = self.ident_like() {
                    let span = self.current.span;
                    self.bump();
                    Ok(PropertyKey::Identifier(Identifier { name, span }))
                } else {
                    Err(self.unexpected("a property name"))
                }
            }
        }
    }

    // ============ BINDINGS ============

    fn parse_binding(&mut self, in_param: bool) -> Result<Pattern, ConvertError> {
        let start = self.current.span;
        match &self.current.kind {
            TokenKind::LBrace => {
                self.bump();
                let mut properties = vec![];
                while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
                    if self.check(&TokenKind::DotDotDot) {
                        let rest_start = self.current.span;
                        self.bump();
                        let argument = Box::new(self.parse_binding(false)?);
                        properties.push(ObjectPatternProperty::Rest(RestPattern {
                            argument,
                            span: self.span_from(rest_start),
                        }));
                    } else {
                        let prop_start = self.current.span;
                        let key = self.parse_property_key()?;
                        let value = if self.match_token(&TokenKind::Colon) {
                            self.parse_binding(false)?
                        } else {
                            match &key {
                                PropertyKey::Identifier(id) => {
                                    Pattern::Identifier(IdentifierPattern {
                                        name: id.name.clone(),
                                        optional: false,
                                        type_annotation: None,
                                        span: id.span,
                                    })
                                }
                                _ => return Err(self.unexpected("`:`")),
                            }
                        };
                        let value = self.wrap_default(value)?;
                        properties.push(ObjectPatternProperty::Property {
                            key,
                            value,
                            span: self.span_from(prop_start),
                        });
                    }
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
                self.require(TokenKind::RBrace, "`}`")?;
                if in_param {
                    self.match_token(&TokenKind::Question);
                }
                let type_annotation = if self.match_token(&TokenKind::Colon) {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                Ok(Pattern::Object(ObjectPattern {
                    properties,
                    type_annotation,
                    span: self.span_from(start),
                }))
            }
            TokenKind::LBracket => {
                self.bump();
                let mut elements = vec![];
                while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
                    if self.check(&TokenKind::Comma) {
                        self.bump();
                        elements.push(None);
                        continue;
                    }
                    let element = if self.check(&TokenKind::DotDotDot) {
                        let rest_start = self.current.span;
                        self.bump();
                        let argument = Box::new(self.parse_binding(false)?);
                        Pattern::Rest(RestPattern {
                            argument,
                            span: self.span_from(rest_start),
                        })
                    } else {
                        let pattern = self.parse_binding(false)?;
                        self.wrap_default(pattern)?
                    };
                    elements.push(Some(element));
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
                self.require(TokenKind::RBracket, "`]`")?;
                if in_param {
                    self.match_token(&TokenKind::Question);
                }
                let type_annotation = if self.match_token(&TokenKind::Colon) {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                Ok(Pattern::Array(ArrayPattern {
                    elements,
                    type_annotation,
                    span: self.span_from(start),
                }))
            }
            _ => {
                let name = match &self.current.kind {
                    TokenKind::Identifier(name) => name.clone(),
                    // `let`, `async`, `static` and friends are valid binding
                    // names outside strict-mode edge cases
                    TokenKind::Let => "let".to_string(),
                    TokenKind::Async => "async".to_string(),
                    TokenKind::Static => "static".to_string(),
                    _ => return Err(self.unexpected("a binding name")),
                };
                self.bump();
                let optional = in_param && self.match_token(&TokenKind::Question);
                let type_annotation = if self.match_token(&TokenKind::Colon) {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                Ok(Pattern::Identifier(IdentifierPattern {
                    name,
                    optional,
                    type_annotation,
                    span: self.span_from(start),
                }))
            }
        }
    }

    // ============ MODULES ============

    fn parse_import(&mut self) -> Result<ImportDeclaration, ConvertError> {
        let start = self.current.span;
        self.require(TokenKind::Import, "`import`")?;
        let mut typeof_specifiers = vec![];

        if matches!(self.current.kind, TokenKind::String(_)) {
            self.bump();
            self.expect_semicolon()?;
            return Ok(ImportDeclaration {
                kind: ImportKind::Value,
                typeof_specifiers,
                span: self.span_from(start),
            });
        }

        let mut kind = ImportKind::Value;
        if self.current_ident_is("type") {
            let peek = self.peek_token();
            if matches!(
                peek.kind,
                TokenKind::Identifier(_) | TokenKind::LBrace | TokenKind::Star
            ) && !matches!(&peek.kind, TokenKind::Identifier(n) if n == "from")
            {
                kind = ImportKind::Type;
                self.bump();
            }
        } else if self.current_ident_is("typeof") || self.check(&TokenKind::Typeof) {
            let typeof_span = self.current.span;
            kind = ImportKind::Typeof;
            typeof_specifiers.push(typeof_span);
            self.bump();
        }

        // Default specifier
        if matches!(self.current.kind, TokenKind::Identifier(_)) && !self.current_ident_is("from") {
            self.bump();
            self.match_token(&TokenKind::Comma);
        }
        // Namespace specifier
        if self.check(&TokenKind::Star) {
            self.bump();
            if !self.current_ident_is("as") {
                return Err(self.unexpected("`as`"));
            }
            self.bump();
            self.require_identifier("a namespace binding")?;
        }
        // Named specifiers
        if self.match_token(&TokenKind::LBrace) {
            while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
                if self.check(&TokenKind::Typeof) {
                    typeof_specifiers.push(self.current.span);
                    self.bump();
                } else if self.current_ident_is("typeof") {
                    let peek = self.peek_token();
                    if matches!(peek.kind, TokenKind::Identifier(_)) {
                        typeof_specifiers.push(self.current.span);
                        self.bump();
                    }
                } else if self.current_ident_is("type") {
                    let peek = self.peek_token();
                    if matches!(peek.kind, TokenKind::Identifier(_) | TokenKind::String(_))
                        && !matches!(&peek.kind, TokenKind::Identifier(n) if n == "as")
                    {
                        self.bump();
                    }
                }
                if self.ident_like().is_none()
                    && !matches!(self.current.kind, TokenKind::String(_))
                {
                    return Err(self.unexpected("an import specifier"));
                }
                self.bump();
                if self.current_ident_is("as") {
                    self.bump();
                    if self.ident_like().is_none() {
                        return Err(self.unexpected("a binding name"));
                    }
                    self.bump();
                }
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.require(TokenKind::RBrace, "`}`")?;
        }

        if !self.current_ident_is("from") {
            return Err(self.unexpected("`from`"));
        }
        self.bump();
        if !matches!(self.current.kind, TokenKind::String(_)) {
            return Err(self.unexpected("a module specifier"));
        }
        self.bump();
        self.expect_semicolon()?;
        Ok(ImportDeclaration {
            kind,
            typeof_specifiers,
            span: self.span_from(start),
        })
    }

    fn parse_export(&mut self) -> Result<ExportDeclaration, ConvertError> {
        let start = self.current.span;
        self.require(TokenKind::Export, "`export`")?;

        if self.check(&TokenKind::Star) {
            self.bump();
            if self.current_ident_is("as") {
                self.bump();
                if self.ident_like().is_none() {
                    return Err(self.unexpected("a binding name"));
                }
                self.bump();
            }
            if !self.current_ident_is("from") {
                return Err(self.unexpected("`from`"));
            }
            self.bump();
            if !matches!(self.current.kind, TokenKind::String(_)) {
                return Err(self.unexpected("a module specifier"));
            }
            self.bump();
            self.expect_semicolon()?;
            return Ok(ExportDeclaration {
                declaration: None,
                default: None,
                span: self.span_from(start),
            });
        }

        if self.match_token(&TokenKind::Default) {
            if self.check(&TokenKind::Function)
                || self.check(&TokenKind::Class)
                || (self.check(&TokenKind::Async)
                    && self.peek_token().kind == TokenKind::Function)
            {
                let declaration = Some(Box::new(self.parse_statement()?));
                return Ok(ExportDeclaration {
                    declaration,
                    default: None,
                    span: self.span_from(start),
                });
            }
            let expr = self.parse_assignment(true)?;
            self.expect_semicolon()?;
            return Ok(ExportDeclaration {
                declaration: None,
                default: Some(expr),
                span: self.span_from(start),
            });
        }

        // `export type { ... }` and `export { ... }` specifier lists
        let type_specifiers = self.current_ident_is("type")
            && self.peek_token().kind == TokenKind::LBrace;
        if type_specifiers || self.check(&TokenKind::LBrace) {
            if type_specifiers {
                self.bump();
            }
            self.require(TokenKind::LBrace, "`{`")?;
            while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
                if self.ident_like().is_none() {
                    return Err(self.unexpected("an export specifier"));
                }
                self.bump();
                if self.current_ident_is("as") {
                    self.bump();
                    if self.ident_like().is_none() {
                        return Err(self.unexpected("a binding name"));
                    }
                    self.bump();
                }
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.require(TokenKind::RBrace, "`}`")?;
            if self.current_ident_is("from") {
                self.bump();
                if !matches!(self.current.kind, TokenKind::String(_)) {
                    return Err(self.unexpected("a module specifier"));
                }
                self.bump();
            }
            self.expect_semicolon()?;
            return Ok(ExportDeclaration {
                declaration: None,
                default: None,
                span: self.span_from(start),
            });
        }

        let declaration = Some(Box::new(self.parse_statement()?));
        Ok(ExportDeclaration {
            declaration,
            default: None,
            span: self.span_from(start),
        })
    }

    // ============ FLOW DECLARATIONS ============

    fn parse_type_alias(
        &mut self,
        declare: Option<Span>,
    ) -> Result<TypeAliasDeclaration, ConvertError> {
        let start = declare.unwrap_or(self.current.span);
        self.bump(); // `type`
        let id = self.require_identifier("a type alias name")?;
        let type_parameters = if self.check(&TokenKind::Lt) {
            Some(self.parse_type_parameters()?)
        } else {
            None
        };
        self.require(TokenKind::Eq, "`=`")?;
        let right = self.parse_type()?;
        self.expect_semicolon()?;
        Ok(TypeAliasDeclaration {
            id,
            type_parameters,
            right,
            declare,
            span: self.span_from(start),
        })
    }

    fn parse_opaque_type(
        &mut self,
        declare: Option<Span>,
    ) -> Result<OpaqueTypeDeclaration, ConvertError> {
        let start = declare.unwrap_or(self.current.span);
        self.bump(); // `opaque`
        self.bump(); // `type`
        let id = self.require_identifier("a type alias name")?;
        let type_parameters = if self.check(&TokenKind::Lt) {
            Some(self.parse_type_parameters()?)
        } else {
            None
        };
        let supertype = if self.match_token(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let right = if self.match_token(&TokenKind::Eq) {
            Some(self.parse_type()?)
        } else if declare.is_none() {
            return Err(self.unexpected("`=`"));
        } else {
            None
        };
        self.expect_semicolon()?;
        Ok(OpaqueTypeDeclaration {
            id,
            type_parameters,
            supertype,
            right,
            declare,
            span: self.span_from(start),
        })
    }

    fn parse_interface(&mut self, declare: Option<Span>) -> Result<InterfaceDeclaration, ConvertError> {
        let start = declare.unwrap_or(self.current.span);
        self.require(TokenKind::Interface, "`interface`")?;
        let id = self.require_identifier("an interface name")?;
        let type_parameters = if self.check(&TokenKind::Lt) {
            Some(self.parse_type_parameters()?)
        } else {
            None
        };
        let mut extends = vec![];
        if self.match_token(&TokenKind::Extends) {
            loop {
                extends.push(self.parse_type_reference()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        let body = self.parse_object_type(false)?;
        Ok(InterfaceDeclaration {
            id,
            type_parameters,
            extends,
            body,
            declare,
            span: self.span_from(start),
        })
    }

    fn parse_enum(&mut self) -> Result<EnumDeclaration, ConvertError> {
        let start = self.current.span;
        self.require(TokenKind::Enum, "`enum`")?;
        let id = self.require_identifier("an enum name")?;
        let kind = if self.current_ident_is("of") {
            self.bump();
            let kind = match self.ident_like().as_deref() {
                Some("boolean") => EnumKind::Boolean,
                Some("number") => EnumKind::Number,
                Some("string") => EnumKind::String,
                Some("symbol") => EnumKind::Symbol,
                _ => return Err(self.unexpected("an enum representation type")),
            };
            self.bump();
            Some(kind)
        } else {
            None
        };
        self.require(TokenKind::LBrace, "`{`")?;
        let mut members = vec![];
        let mut has_unknown_members = false;
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            if self.check(&TokenKind::DotDotDot) {
                has_unknown_members = true;
                self.bump();
                break;
            }
            let member_start = self.current.span;
            let name = match self.ident_like() {
                Some(name) => name,
                None => return Err(self.unexpected("an enum member name")),
            };
            self.bump();
            let init = if self.match_token(&TokenKind::Eq) {
                let span = self.current.span;
                match self.current.kind {
                    TokenKind::Number(_)
                    | TokenKind::String(_)
                    | TokenKind::BigInt(_)
                    | TokenKind::True
                    | TokenKind::False => {
                        self.bump();
                        Some(span)
                    }
                    _ => return Err(self.unexpected("an enum member initializer")),
                }
            } else {
                None
            };
            members.push(EnumMember {
                name,
                init,
                span: self.span_from(member_start),
            });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.require(TokenKind::RBrace, "`}`")?;
        Ok(EnumDeclaration {
            id,
            kind,
            members,
            has_unknown_members,
            span: self.span_from(start),
        })
    }

    /// Whether the token after `declare` begins a declare form
    fn declare_follows(&mut self) -> bool {
        match self.peek_token().kind {
            TokenKind::Var
            | TokenKind::Let
            | TokenKind::Const
            | TokenKind::Function
            | TokenKind::Class
            | TokenKind::Interface
            | TokenKind::Export => true,
            TokenKind::Identifier(name) => {
                matches!(name.as_str(), "type" | "opaque" | "module")
            }
            _ => false,
        }
    }

    fn parse_declare(&mut self) -> Result<Statement, ConvertError> {
        let start = self.current.span;
        self.bump(); // `declare`

        if self.current_ident_is("type") {
            return Ok(Statement::TypeAlias(self.parse_type_alias(Some(start))?));
        }
        if self.current_ident_is("opaque") {
            return Ok(Statement::OpaqueTypeAlias(
                self.parse_opaque_type(Some(start))?,
            ));
        }
        if self.check(&TokenKind::Interface) {
            return Ok(Statement::InterfaceDeclaration(
                self.parse_interface(Some(start))?,
            ));
        }
        if self.current_ident_is("module") {
            self.bump();
            if self.match_token(&TokenKind::Dot) {
                if !self.current_ident_is("exports") {
                    return Err(self.unexpected("`exports`"));
                }
                self.bump();
                self.require(TokenKind::Colon, "`:`")?;
                self.parse_type()?;
                self.expect_semicolon()?;
                return Ok(Statement::Declare(DeclareStatement::ModuleExports(
                    self.span_from(start),
                )));
            }
            let name = self.current.span;
            if self.ident_like().is_none() && !matches!(self.current.kind, TokenKind::String(_)) {
                return Err(self.unexpected("a module name"));
            }
            self.bump();
            self.require(TokenKind::LBrace, "`{`")?;
            let mut body = vec![];
            while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
                body.push(self.parse_statement()?);
            }
            self.require(TokenKind::RBrace, "`}`")?;
            return Ok(Statement::Declare(DeclareStatement::Module(DeclareModule {
                name,
                body,
                span: self.span_from(start),
            })));
        }
        if self.check(&TokenKind::Export) {
            self.bump();
            let default = self.match_token(&TokenKind::Default);
            if default
                && !self.check(&TokenKind::Function)
                && !self.check(&TokenKind::Class)
            {
                let ty = self.parse_type()?;
                self.expect_semicolon()?;
                return Ok(Statement::Declare(DeclareStatement::Export(DeclareExport {
                    value: DeclareExportValue::DefaultType(ty),
                    default: true,
                    span: self.span_from(start),
                })));
            }
            let declaration = Box::new(self.parse_declare_inner(start)?);
            return Ok(Statement::Declare(DeclareStatement::Export(DeclareExport {
                value: DeclareExportValue::Declaration(declaration),
                default,
                span: self.span_from(start),
            })));
        }
        self.parse_declare_inner(start)
    }

    /// The declaration forms shared by `declare X` and `declare export X`
    fn parse_declare_inner(&mut self, start: Span) -> Result<Statement, ConvertError> {
        match self.current.kind {
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let kind = match self.current.kind {
                    TokenKind::Let => VariableKind::Let,
                    TokenKind::Const => VariableKind::Const,
                    _ => VariableKind::Var,
                };
                self.bump();
                let id = self.require_identifier("a variable name")?;
                let type_annotation = if self.match_token(&TokenKind::Colon) {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                self.expect_semicolon()?;
                Ok(Statement::Declare(DeclareStatement::Variable(
                    DeclareVariable {
                        kind,
                        id,
                        type_annotation,
                        span: self.span_from(start),
                    },
                )))
            }
            TokenKind::Function => {
                self.bump();
                let id = self.require_identifier("a function name")?;
                let sig_start = self.current.span;
                let type_parameters = if self.check(&TokenKind::Lt) {
                    Some(self.parse_type_parameters()?)
                } else {
                    None
                };
                let (params, rest) = self.parse_function_type_params()?;
                self.require(TokenKind::Colon, "`:`")?;
                let return_type = self.parse_type()?;
                let function_type = FunctionType {
                    type_parameters,
                    params,
                    rest,
                    return_type,
                    span: self.span_from(sig_start),
                };
                let predicate = self.parse_predicate()?;
                self.expect_semicolon()?;
                Ok(Statement::Declare(DeclareStatement::Function(
                    DeclareFunction {
                        id,
                        function_type,
                        predicate,
                        span: self.span_from(start),
                    },
                )))
            }
            TokenKind::Class => {
                self.bump();
                let id = self.require_identifier("a class name")?;
                let type_parameters = if self.check(&TokenKind::Lt) {
                    Some(self.parse_type_parameters()?)
                } else {
                    None
                };
                let extends = if self.match_token(&TokenKind::Extends) {
                    Some(self.parse_type_reference()?)
                } else {
                    None
                };
                let mixins = if self.current_ident_is("mixins") {
                    let mixins_start = self.current.span;
                    self.bump();
                    loop {
                        self.parse_type_reference()?;
                        if !self.match_token(&TokenKind::Comma) {
                            break;
                        }
                    }
                    Some(self.span_from(mixins_start))
                } else {
                    None
                };
                let body = self.parse_object_type(false)?;
                Ok(Statement::Declare(DeclareStatement::Class(DeclareClass {
                    id,
                    type_parameters,
                    extends,
                    mixins,
                    body,
                    span: self.span_from(start),
                })))
            }
            _ => Err(self.unexpected("a declaration after `declare`")),
        }
    }

    // ============ EXPRESSIONS ============

    fn parse_expression(&mut self, allow_in: bool) -> Result<Expression, ConvertError> {
        let start = self.current.span;
        let first = self.parse_assignment(allow_in)?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.match_token(&TokenKind::Comma) {
            expressions.push(self.parse_assignment(allow_in)?);
        }
        Ok(Expression::Sequence(SequenceExpression {
            expressions,
            span: self.span_from(start),
        }))
    }

    fn parse_assignment(&mut self, allow_in: bool) -> Result<Expression, ConvertError> {
        if self.check(&TokenKind::Yield) {
            return self.parse_yield(allow_in);
        }

        if let Some(arrow) = self.try_parse_arrow(allow_in)? {
            return Ok(arrow);
        }

        let start = self.current.span;
        let left = self.parse_conditional(allow_in)?;
        if matches!(
            self.current.kind,
            TokenKind::Eq
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
                | TokenKind::PercentEq
                | TokenKind::StarStarEq
                | TokenKind::AmpEq
                | TokenKind::PipeEq
                | TokenKind::CaretEq
                | TokenKind::LtLtEq
                | TokenKind::GtGtEq
                | TokenKind::GtGtGtEq
                | TokenKind::AmpAmpEq
                | TokenKind::PipePipeEq
                | TokenKind::QuestionQuestionEq
        ) {
            self.bump();
            let right = self.parse_assignment(allow_in)?;
            return Ok(Expression::Assignment(Box::new(BinaryExpression {
                left,
                right,
                span: self.span_from(start),
            })));
        }
        Ok(left)
    }

    fn parse_yield(&mut self, allow_in: bool) -> Result<Expression, ConvertError> {
        let start = self.current.span;
        self.bump();
        self.match_token(&TokenKind::Star);
        let argument = if self.current.newline_before
            || matches!(
                self.current.kind,
                TokenKind::Semicolon
                    | TokenKind::RParen
                    | TokenKind::RBracket
                    | TokenKind::RBrace
                    | TokenKind::Comma
                    | TokenKind::Colon
                    | TokenKind::Eof
            ) {
            None
        } else {
            Some(self.parse_assignment(allow_in)?)
        };
        Ok(Expression::Yield(Box::new(YieldExpression {
            argument,
            span: self.span_from(start),
        })))
    }

    /// Attempt to parse an arrow function; restores and returns None when
    /// the lookahead turns out to be something else
    fn try_parse_arrow(&mut self, allow_in: bool) -> Result<Option<Expression>, ConvertError> {
        let could_start = matches!(
            self.current.kind,
            TokenKind::LParen | TokenKind::Lt | TokenKind::Identifier(_) | TokenKind::Async
        );
        if !could_start {
            return Ok(None);
        }

        let cp = self.checkpoint();
        let start = self.current.span;

        let mut is_async = false;
        if self.check(&TokenKind::Async) {
            let peek = self.peek_token();
            if !peek.newline_before
                && matches!(
                    peek.kind,
                    TokenKind::Identifier(_) | TokenKind::LParen | TokenKind::Lt
                )
            {
                is_async = true;
                self.bump();
            } else {
                return Ok(None);
            }
        }

        // Single identifier parameter
        if let TokenKind::Identifier(name) = self.current.kind.clone() {
            let ident_span = self.current.span;
            self.bump();
            if self.check(&TokenKind::Arrow) && !self.current.newline_before {
                self.bump();
                let params = vec![Pattern::Identifier(IdentifierPattern {
                    name,
                    optional: false,
                    type_annotation: None,
                    span: ident_span,
                })];
                let body = self.parse_arrow_body(allow_in)?;
                return Ok(Some(Expression::Arrow(Box::new(ArrowFunction {
                    type_parameters: None,
                    params,
                    return_type: None,
                    body,
                    is_async,
                    span: self.span_from(start),
                }))));
            }
            self.restore(&cp);
            return Ok(None);
        }

        let type_parameters = if self.check(&TokenKind::Lt) {
            match self.parse_type_parameters() {
                Ok(params) => Some(params),
                Err(_) => {
                    self.restore(&cp);
                    return Ok(None);
                }
            }
        } else {
            None
        };

        if !self.check(&TokenKind::LParen) {
            self.restore(&cp);
            return Ok(None);
        }
        let params = match self.parse_params() {
            Ok(params) => params,
            Err(_) => {
                self.restore(&cp);
                return Ok(None);
            }
        };

        let return_type = if self.check(&TokenKind::Colon) {
            self.bump();
            let saved = self.no_anon_fn;
            self.no_anon_fn = true;
            let result = self.parse_type();
            self.no_anon_fn = saved;
            match result {
                Ok(ty) => Some(ty),
                Err(_) => {
                    self.restore(&cp);
                    return Ok(None);
                }
            }
        } else {
            None
        };

        if !self.check(&TokenKind::Arrow) || self.current.newline_before {
            self.restore(&cp);
            return Ok(None);
        }
        self.bump();
        let body = self.parse_arrow_body(allow_in)?;
        Ok(Some(Expression::Arrow(Box::new(ArrowFunction {
            type_parameters,
            params,
            return_type,
            body,
            is_async,
            span: self.span_from(start),
        }))))
    }

    fn parse_arrow_body(&mut self, allow_in: bool) -> Result<ArrowBody, ConvertError> {
        if self.check(&TokenKind::LBrace) {
            Ok(ArrowBody::Block(self.parse_block()?))
        } else {
            Ok(ArrowBody::Expression(Box::new(
                self.parse_assignment(allow_in)?,
            )))
        }
    }

    fn parse_conditional(&mut self, allow_in: bool) -> Result<Expression, ConvertError> {
        let start = self.current.span;
        let test = self.parse_binary(0, allow_in)?;
        if !self.match_token(&TokenKind::Question) {
            return Ok(test);
        }
        let consequent = self.parse_assignment(true)?;
        self.require(TokenKind::Colon, "`:`")?;
        let alternate = self.parse_assignment(allow_in)?;
        Ok(Expression::Conditional(Box::new(ConditionalExpression {
            test,
            consequent,
            alternate,
            span: self.span_from(start),
        })))
    }

    fn parse_binary(&mut self, min_bp: u8, allow_in: bool) -> Result<Expression, ConvertError> {
        let start = self.current.span;
        let mut left = self.parse_unary(allow_in)?;
        loop {
            // TypeScript `expr as Type`, accepted for round-tripping
            if self.current_ident_is("as") && !self.current.newline_before && self.type_follows() {
                if 7 < min_bp {
                    break;
                }
                self.bump();
                let type_annotation = self.parse_type()?;
                left = Expression::AsCast(Box::new(AsCastExpression {
                    expression: left,
                    type_annotation,
                    span: self.span_from(start),
                }));
                continue;
            }
            let (bp, logical) = match self.current.kind {
                TokenKind::PipePipe | TokenKind::QuestionQuestion => (1, true),
                TokenKind::AmpAmp => (2, true),
                TokenKind::Pipe => (3, false),
                TokenKind::Caret => (4, false),
                TokenKind::Amp => (5, false),
                TokenKind::EqEq | TokenKind::EqEqEq | TokenKind::BangEq | TokenKind::BangEqEq => {
                    (6, false)
                }
                TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::LtEq
                | TokenKind::GtEq
                | TokenKind::Instanceof => (7, false),
                TokenKind::In if allow_in => (7, false),
                TokenKind::LtLt | TokenKind::GtGt | TokenKind::GtGtGt => (8, false),
                TokenKind::Plus | TokenKind::Minus => (9, false),
                TokenKind::Star | TokenKind::Slash | TokenKind::Percent => (10, false),
                TokenKind::StarStar => (11, false),
                _ => break,
            };
            if bp < min_bp {
                break;
            }
            self.bump();
            let right = self.parse_binary(bp + 1, allow_in)?;
            let node = Box::new(BinaryExpression {
                left,
                right,
                span: self.span_from(start),
            });
            left = if logical {
                Expression::Logical(node)
            } else {
                Expression::Binary(node)
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self, allow_in: bool) -> Result<Expression, ConvertError> {
        let start = self.current.span;
        match self.current.kind {
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::Typeof
            | TokenKind::Void
            | TokenKind::Delete => {
                self.bump();
                let argument = self.parse_unary(allow_in)?;
                Ok(Expression::Unary(Box::new(UnaryExpression {
                    argument,
                    span: self.span_from(start),
                })))
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                self.bump();
                let argument = self.parse_unary(allow_in)?;
                Ok(Expression::Update(Box::new(UpdateExpression {
                    argument,
                    span: self.span_from(start),
                })))
            }
            TokenKind::Await => {
                self.bump();
                let argument = self.parse_unary(allow_in)?;
                Ok(Expression::Await(Box::new(AwaitExpression {
                    argument,
                    span: self.span_from(start),
                })))
            }
            _ => {
                let expr = self.parse_call_member_chain(false)?;
                if !self.current.newline_before
                    && matches!(
                        self.current.kind,
                        TokenKind::PlusPlus | TokenKind::MinusMinus
                    )
                {
                    self.bump();
                    return Ok(Expression::Update(Box::new(UpdateExpression {
                        argument: expr,
                        span: self.span_from(start),
                    })));
                }
                Ok(expr)
            }
        }
    }

    /// Parse a primary expression followed by member access, calls, call
    /// type arguments and tagged templates. With `no_call` only member
    /// access is consumed (decorators, `new` callees).
    fn parse_call_member_chain(&mut self, no_call: bool) -> Result<Expression, ConvertError> {
        let start = self.current.span;
        let mut expr = self.parse_primary()?;
        loop {
            match self.current.kind {
                TokenKind::Dot => {
                    self.bump();
                    let property = if self.check(&TokenKind::Hash) {
                        let hash = self.current.span;
                        self.bump();
                        let id = self.require_identifier("a private name")?;
                        MemberProperty::Private(hash.to(id.span))
                    } else if let Some(_name) = self.ident_like() {
                        let span = self.current.span;
                        self.bump();
                        MemberProperty::Identifier(span)
                    } else {
                        return Err(self.unexpected("a property name"));
                    };
                    expr = Expression::Member(Box::new(MemberExpression {
                        object: expr,
                        property,
                        span: self.span_from(start),
                    }));
                }
                TokenKind::QuestionDot => {
                    self.bump();
                    if self.check(&TokenKind::LParen) {
                        if no_call {
                            return Err(self.unexpected("a property name"));
                        }
                        let arguments = self.parse_arguments()?;
                        expr = Expression::Call(Box::new(CallExpression {
                            callee: expr,
                            type_args: None,
                            arguments,
                            span: self.span_from(start),
                        }));
                    } else if self.check(&TokenKind::LBracket) {
                        self.bump();
                        let index = self.parse_expression(true)?;
                        self.require(TokenKind::RBracket, "`]`")?;
                        expr = Expression::Member(Box::new(MemberExpression {
                            object: expr,
                            property: MemberProperty::Computed(index),
                            span: self.span_from(start),
                        }));
                    } else if let Some(_name) = self.ident_like() {
                        let span = self.current.span;
                        self.bump();
                        expr = Expression::Member(Box::new(MemberExpression {
                            object: expr,
                            property: MemberProperty::Identifier(span),
                            span: self.span_from(start),
                        }));
                    } else {
                        return Err(self.unexpected("a property name"));
                    }
                }
                TokenKind::LBracket => {
                    self.bump();
                    let index = self.parse_expression(true)?;
                    self.require(TokenKind::RBracket, "`]`")?;
                    expr = Expression::Member(Box::new(MemberExpression {
                        object: expr,
                        property: MemberProperty::Computed(index),
                        span: self.span_from(start),
                    }));
                }
                TokenKind::LParen if !no_call => {
                    let arguments = self.parse_arguments()?;
                    expr = Expression::Call(Box::new(CallExpression {
                        callee: expr,
                        type_args: None,
                        arguments,
                        span: self.span_from(start),
                    }));
                }
                // Explicit call type arguments: `f<T>(x)`
                TokenKind::Lt if !no_call => {
                    let cp = self.checkpoint();
                    match self.parse_type_arguments() {
                        Ok(type_args) if self.check(&TokenKind::LParen) => {
                            let arguments = self.parse_arguments()?;
                            expr = Expression::Call(Box::new(CallExpression {
                                callee: expr,
                                type_args: Some(type_args),
                                arguments,
                                span: self.span_from(start),
                            }));
                        }
                        _ => {
                            self.restore(&cp);
                            break;
                        }
                    }
                }
                TokenKind::TemplateNoSub | TokenKind::TemplateHead => {
                    let quasi = self.parse_template()?;
                    expr = Expression::TaggedTemplate(TaggedTemplate {
                        tag: Box::new(expr),
                        quasi,
                        span: self.span_from(start),
                    });
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expression>, ConvertError> {
        self.require(TokenKind::LParen, "`(`")?;
        let mut arguments = vec![];
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            if self.check(&TokenKind::DotDotDot) {
                let start = self.current.span;
                self.bump();
                let argument = self.parse_assignment(true)?;
                arguments.push(Expression::Spread(Box::new(SpreadElement {
                    argument,
                    span: self.span_from(start),
                })));
            } else {
                arguments.push(self.parse_assignment(true)?);
            }
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.require(TokenKind::RParen, "`)`")?;
        Ok(arguments)
    }

    fn parse_template(&mut self) -> Result<TemplateLiteral, ConvertError> {
        let start = self.current.span;
        if self.check(&TokenKind::TemplateNoSub) {
            let span = self.current.span;
            self.bump();
            return Ok(TemplateLiteral {
                expressions: vec![],
                span,
            });
        }
        self.require(TokenKind::TemplateHead, "a template literal")?;
        let mut expressions = vec![];
        loop {
            expressions.push(self.parse_expression(true)?);
            if !self.check(&TokenKind::RBrace) {
                return Err(self.unexpected("`}`"));
            }
            let rbrace = self.current.span;
            self.prev_end = rbrace.end;
            self.current = self.lexer.rescan_template_continue(rbrace);
            match self.current.kind {
                TokenKind::TemplateMiddle => {
                    self.bump();
                }
                TokenKind::TemplateTail => {
                    self.prev_end = self.current.span.end;
                    let span = self.span_from(start);
                    self.bump();
                    return Ok(TemplateLiteral {
                        expressions,
                        span,
                    });
                }
                _ => return Err(self.unexpected("a template continuation")),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expression, ConvertError> {
        let start = self.current.span;
        match self.current.kind.clone() {
            TokenKind::Number(_) => {
                self.bump();
                Ok(Expression::NumberLiteral(start))
            }
            TokenKind::BigInt(_) => {
                self.bump();
                Ok(Expression::BigIntLiteral(start))
            }
            TokenKind::String(_) => {
                self.bump();
                Ok(Expression::StringLiteral(start))
            }
            TokenKind::True => {
                self.bump();
                Ok(Expression::BooleanLiteral(true, start))
            }
            TokenKind::False => {
                self.bump();
                Ok(Expression::BooleanLiteral(false, start))
            }
            TokenKind::Null => {
                self.bump();
                Ok(Expression::NullLiteral(start))
            }
            TokenKind::Slash | TokenKind::SlashEq => {
                let token = self.lexer.rescan_as_regexp(self.current.span);
                let span = token.span;
                self.prev_end = span.end;
                self.current = self.lexer.next_token();
                Ok(Expression::RegexLiteral(span))
            }
            TokenKind::TemplateNoSub | TokenKind::TemplateHead => {
                Ok(Expression::Template(self.parse_template()?))
            }
            TokenKind::Identifier(name) => {
                self.bump();
                Ok(Expression::Identifier(Identifier { name, span: start }))
            }
            // Contextual keywords usable as plain identifiers
            TokenKind::Let | TokenKind::Async | TokenKind::Static => {
                let name = describe_keyword(&self.current.kind);
                self.bump();
                Ok(Expression::Identifier(Identifier {
                    name,
                    span: start,
                }))
            }
            TokenKind::Import => {
                self.bump();
                Ok(Expression::Identifier(Identifier {
                    name: "import".to_string(),
                    span: start,
                }))
            }
            TokenKind::This => {
                self.bump();
                Ok(Expression::This(start))
            }
            TokenKind::Super => {
                self.bump();
                Ok(Expression::Super(start))
            }
            TokenKind::LParen => {
                self.bump();
                let expression = self.parse_expression(true)?;
                if self.check(&TokenKind::Colon) {
                    let colon = self.current.span;
                    self.bump();
                    let type_annotation = self.parse_type()?;
                    let cast_span = Span::new(colon.start, self.prev_end, colon.line, colon.column);
                    self.require(TokenKind::RParen, "`)`")?;
                    return Ok(Expression::TypeCast(Box::new(TypeCastExpression {
                        expression,
                        type_annotation,
                        cast_span,
                        span: self.span_from(start),
                    })));
                }
                self.require(TokenKind::RParen, "`)`")?;
                Ok(Expression::Paren(Box::new(ParenExpression {
                    expression,
                    span: self.span_from(start),
                })))
            }
            TokenKind::LBracket => {
                self.bump();
                let mut elements = vec![];
                while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
                    if self.check(&TokenKind::Comma) {
                        self.bump();
                        elements.push(None);
                        continue;
                    }
                    if self.check(&TokenKind::DotDotDot) {
                        let spread_start = self.current.span;
                        self.bump();
                        let argument = self.parse_assignment(true)?;
                        elements.push(Some(Expression::Spread(Box::new(SpreadElement {
                            argument,
                            span: self.span_from(spread_start),
                        }))));
                    } else {
                        elements.push(Some(self.parse_assignment(true)?));
                    }
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
                self.require(TokenKind::RBracket, "`]`")?;
                Ok(Expression::Array(ArrayLiteral {
                    elements,
                    span: self.span_from(start),
                }))
            }
            TokenKind::LBrace => Ok(Expression::Object(self.parse_object_literal()?)),
            TokenKind::Function => {
                self.bump();
                let is_generator = self.match_token(&TokenKind::Star);
                let id = if matches!(self.current.kind, TokenKind::Identifier(_)) {
                    Some(self.require_identifier("a function name")?)
                } else {
                    None
                };
                let function = self.parse_function_rest(start, id, false, is_generator, true)?;
                let span = function.span;
                Ok(Expression::Function(Box::new(FunctionExpression {
                    function,
                    span,
                })))
            }
            TokenKind::Async => {
                // async function expression; async arrows were handled in
                // try_parse_arrow, so a bare `async` is an identifier
                if self.peek_token().kind == TokenKind::Function {
                    self.bump();
                    self.bump();
                    let is_generator = self.match_token(&TokenKind::Star);
                    let id = if matches!(self.current.kind, TokenKind::Identifier(_)) {
                        Some(self.require_identifier("a function name")?)
                    } else {
                        None
                    };
                    let function = self.parse_function_rest(start, id, true, is_generator, true)?;
                    let span = function.span;
                    return Ok(Expression::Function(Box::new(FunctionExpression {
                        function,
                        span,
                    })));
                }
                self.bump();
                Ok(Expression::Identifier(Identifier {
                    name: "async".to_string(),
                    span: start,
                }))
            }
            TokenKind::Class => {
                let class = self.parse_class()?;
                Ok(Expression::Class(Box::new(class)))
            }
            TokenKind::New => {
                self.bump();
                if self.check(&TokenKind::Dot) {
                    // new.target
                    self.bump();
                    self.require_identifier("`target`")?;
                    return Ok(Expression::Identifier(Identifier {
                        name: "new.target".to_string(),
                        span: self.span_from(start),
                    }));
                }
                let callee = self.parse_call_member_chain(true)?;
                let type_args = if self.check(&TokenKind::Lt) {
                    let cp = self.checkpoint();
                    match self.parse_type_arguments() {
                        Ok(args) if self.check(&TokenKind::LParen) => Some(args),
                        _ => {
                            self.restore(&cp);
                            None
                        }
                    }
                } else {
                    None
                };
                let arguments = if self.check(&TokenKind::LParen) {
                    self.parse_arguments()?
                } else {
                    vec![]
                };
                Ok(Expression::New(Box::new(CallExpression {
                    callee,
                    type_args,
                    arguments,
                    span: self.span_from(start),
                })))
            }
            TokenKind::Lt => self.parse_jsx(false),
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn parse_object_literal(&mut self) -> Result<ObjectLiteral, ConvertError> {
        let start = self.current.span;
        self.require(TokenKind::LBrace, "`{`")?;
        let mut properties = vec![];
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            if self.check(&TokenKind::DotDotDot) {
                let spread_start = self.current.span;
                self.bump();
                let argument = self.parse_assignment(true)?;
                properties.push(ObjectLiteralMember::Spread(SpreadElement {
                    argument,
                    span: self.span_from(spread_start),
                }));
            } else {
                properties.push(self.parse_object_literal_member()?);
            }
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.require(TokenKind::RBrace, "`}`")?;
        Ok(ObjectLiteral {
            properties,
            span: self.span_from(start),
        })
    }

    fn parse_object_literal_member(&mut self) -> Result<ObjectLiteralMember, ConvertError> {
        let start = self.current.span;

        let mut is_async = false;
        if self.check(&TokenKind::Async) {
            let peek = self.peek_token();
            if !peek.newline_before
                && !matches!(
                    peek.kind,
                    TokenKind::LParen
                        | TokenKind::Colon
                        | TokenKind::Comma
                        | TokenKind::RBrace
                        | TokenKind::Lt
                )
            {
                is_async = true;
                self.bump();
            }
        }
        let is_generator = self.match_token(&TokenKind::Star);

        let mut kind = MethodKind::Method;
        if !is_async && !is_generator
            && (self.current_ident_is("get") || self.current_ident_is("set"))
        {
            let peek = self.peek_token();
            if !matches!(
                peek.kind,
                TokenKind::LParen
                    | TokenKind::Colon
                    | TokenKind::Comma
                    | TokenKind::RBrace
                    | TokenKind::Lt
            ) {
                kind = if self.current_ident_is("get") {
                    MethodKind::Get
                } else {
                    MethodKind::Set
                };
                self.bump();
            }
        }

        let key = self.parse_property_key()?;

        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Lt) {
            let function = self.parse_function_rest(start, None, is_async, is_generator, true)?;
            return Ok(ObjectLiteralMember::Method(ClassMethod {
                key,
                function,
                kind,
                is_static: false,
                decorators: vec![],
                span: self.span_from(start),
            }));
        }

        if self.match_token(&TokenKind::Colon) {
            let value = self.parse_assignment(true)?;
            return Ok(ObjectLiteralMember::Property {
                key,
                value,
                span: self.span_from(start),
            });
        }

        match key {
            PropertyKey::Identifier(id) => {
                // Shorthand, possibly with a default inside destructuring
                // assignment contexts; parse and keep the default expression
                if self.match_token(&TokenKind::Eq) {
                    let value = self.parse_assignment(true)?;
                    return Ok(ObjectLiteralMember::Property {
                        key: PropertyKey::Identifier(id.clone()),
                        value,
                        span: self.span_from(start),
                    });
                }
                Ok(ObjectLiteralMember::Shorthand(id))
            }
            _ => Err(self.unexpected("`:`")),
        }
    }

    // ============ JSX ============

    /// Replace the current token with a JSX text run starting right after
    /// `after`, without lexing the text as normal tokens first
    fn jsx_text_after(&mut self, after: Span) {
        let column = after.column + (after.end - after.start) as u32;
        self.prev_end = after.end;
        self.current = self
            .lexer
            .rescan_as_jsx_text(Span::new(after.end, after.end, after.line, column));
    }

    /// Consume the current `>` token; in children context the following
    /// text is rescanned as JSX text instead of normal tokens
    ///
    /// The lexer may have merged the tag's `>` with following text (`>>`),
    /// so only the first character is consumed.
    fn finish_jsx_tag(&mut self, in_children: bool) -> Result<Span, ConvertError> {
        if !matches!(
            self.current.kind,
            TokenKind::Gt | TokenKind::GtGt | TokenKind::GtGtGt | TokenKind::GtEq
        ) {
            return Err(self.unexpected("`>`"));
        }
        let span = self.current.span;
        let gt_span = Span::new(span.start, span.start + 1, span.line, span.column);
        if in_children {
            self.jsx_text_after(gt_span);
        } else if self.check(&TokenKind::Gt) {
            self.bump();
        } else {
            let rest = match self.current.kind {
                TokenKind::GtGt => TokenKind::Gt,
                TokenKind::GtGtGt => TokenKind::GtGt,
                _ => TokenKind::Eq,
            };
            self.prev_end = gt_span.end;
            self.current = Token::new(
                rest,
                Span::new(span.start + 1, span.end, span.line, span.column + 1),
                false,
            );
        }
        Ok(gt_span)
    }

    fn parse_jsx(&mut self, in_children: bool) -> Result<Expression, ConvertError> {
        let start = self.current.span;
        self.require(TokenKind::Lt, "`<`")?;
        if self.check(&TokenKind::Gt) {
            let fragment = self.parse_jsx_fragment(start, in_children)?;
            return Ok(Expression::JsxFragment(Box::new(fragment)));
        }
        let element = self.parse_jsx_element(start, in_children)?;
        Ok(Expression::Jsx(Box::new(element)))
    }

    /// Parse a JSX element; the `<` has already been consumed
    fn parse_jsx_element(
        &mut self,
        start: Span,
        in_children: bool,
    ) -> Result<JsxElement, ConvertError> {
        self.parse_jsx_name()?;

        let mut attributes = vec![];
        while !matches!(
            self.current.kind,
            TokenKind::Gt | TokenKind::Slash | TokenKind::Eof
        ) {
            attributes.push(self.parse_jsx_attribute()?);
        }

        if self.match_token(&TokenKind::Slash) {
            self.finish_jsx_tag(in_children)?;
            return Ok(JsxElement {
                attributes,
                children: vec![],
                self_closing: true,
                span: self.span_from(start),
            });
        }

        self.finish_jsx_tag(true)?;
        let children = self.parse_jsx_children(in_children)?;
        Ok(JsxElement {
            attributes,
            children,
            self_closing: false,
            span: self.span_from(start),
        })
    }

    fn parse_jsx_fragment(
        &mut self,
        start: Span,
        in_children: bool,
    ) -> Result<JsxFragment, ConvertError> {
        self.finish_jsx_tag(true)?;
        let children = self.parse_jsx_children(in_children)?;
        Ok(JsxFragment {
            children,
            span: self.span_from(start),
        })
    }

    /// Parse children and the closing tag; leaves the stream per the
    /// enclosing context (`in_children`)
    fn parse_jsx_children(&mut self, in_children: bool) -> Result<Vec<JsxChild>, ConvertError> {
        let mut children = vec![];
        loop {
            match self.current.kind {
                TokenKind::JsxText => {
                    if self.current.span.end > self.current.span.start {
                        children.push(JsxChild::Text(self.current.span));
                    }
                    self.bump();
                }
                TokenKind::LBrace => {
                    self.bump();
                    if self.check(&TokenKind::RBrace) {
                        let rbrace = self.current.span;
                        self.jsx_text_after(rbrace);
                        children.push(JsxChild::Expression(None));
                        continue;
                    }
                    let expr = if self.check(&TokenKind::DotDotDot) {
                        let spread_start = self.current.span;
                        self.bump();
                        let argument = self.parse_assignment(true)?;
                        Expression::Spread(Box::new(SpreadElement {
                            argument,
                            span: self.span_from(spread_start),
                        }))
                    } else {
                        self.parse_expression(true)?
                    };
                    if !self.check(&TokenKind::RBrace) {
                        return Err(self.unexpected("`}`"));
                    }
                    let rbrace = self.current.span;
                    self.jsx_text_after(rbrace);
                    children.push(JsxChild::Expression(Some(expr)));
                }
                TokenKind::Lt => {
                    if self.peek_token().kind == TokenKind::Slash {
                        // Closing tag
                        self.bump(); // <
                        self.bump(); // /
                        if !self.check(&TokenKind::Gt) {
                            self.parse_jsx_name()?;
                        }
                        self.finish_jsx_tag(in_children)?;
                        return Ok(children);
                    }
                    let lt = self.current.span;
                    self.bump();
                    if self.check(&TokenKind::Gt) {
                        let fragment = self.parse_jsx_fragment(lt, true)?;
                        children.push(JsxChild::Fragment(fragment));
                    } else {
                        let element = self.parse_jsx_element(lt, true)?;
                        children.push(JsxChild::Element(element));
                    }
                }
                _ => return Err(self.unexpected("JSX children or a closing tag")),
            }
        }
    }

    /// Consume a JSX element or attribute name: identifiers joined by `.`,
    /// `:` or adjacent `-`
    fn parse_jsx_name(&mut self) -> Result<Span, ConvertError> {
        let start = self.current.span;
        if self.ident_like().is_none() {
            return Err(self.unexpected("a JSX name"));
        }
        self.bump();
        loop {
            match self.current.kind {
                TokenKind::Dot | TokenKind::Colon => {
                    self.bump();
                    if self.ident_like().is_none() {
                        return Err(self.unexpected("a JSX name"));
                    }
                    self.bump();
                }
                TokenKind::Minus if self.current.span.start == self.prev_end => {
                    self.bump();
                    if self.ident_like().is_some() && self.current.span.start == self.prev_end {
                        self.bump();
                    }
                }
                _ => break,
            }
        }
        Ok(self.span_from(start))
    }

    fn parse_jsx_attribute(&mut self) -> Result<JsxAttribute, ConvertError> {
        if self.check(&TokenKind::LBrace) {
            let start = self.current.span;
            self.bump();
            self.require(TokenKind::DotDotDot, "`...`")?;
            let argument = self.parse_assignment(true)?;
            self.require(TokenKind::RBrace, "`}`")?;
            return Ok(JsxAttribute::Spread(SpreadElement {
                argument,
                span: self.span_from(start),
            }));
        }

        let start = self.current.span;
        let name = self.parse_jsx_name()?;
        let value = if self.match_token(&TokenKind::Eq) {
            match self.current.kind {
                TokenKind::String(_) => {
                    let span = self.current.span;
                    self.bump();
                    Some(JsxAttributeValue::String(span))
                }
                TokenKind::LBrace => {
                    self.bump();
                    let expr = self.parse_assignment(true)?;
                    self.require(TokenKind::RBrace, "`}`")?;
                    Some(JsxAttributeValue::Expression(expr))
                }
                TokenKind::Lt => match self.parse_jsx(false)? {
                    Expression::Jsx(element) => Some(JsxAttributeValue::Element(element)),
                    Expression::JsxFragment(fragment) => {
                        Some(JsxAttributeValue::Fragment(fragment))
                    }
                    _ => return Err(self.unexpected("a JSX value")),
                },
                _ => return Err(self.unexpected("an attribute value")),
            }
        } else {
            None
        };
        Ok(JsxAttribute::Named {
            name,
            value,
            span: self.span_from(start),
        })
    }

    // ============ TYPE SYNTAX ============

    pub fn parse_type(&mut self) -> Result<FlowType, ConvertError> {
        self.parse_union_type()
    }

    fn parse_union_type(&mut self) -> Result<FlowType, ConvertError> {
        let start = self.current.span;
        // Leading `|` is allowed for multi-line unions
        self.match_token(&TokenKind::Pipe);
        let first = self.parse_intersection_type()?;
        if !self.check(&TokenKind::Pipe) {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.match_token(&TokenKind::Pipe) {
            members.push(self.parse_intersection_type()?);
        }
        Ok(FlowType::Union(UnionType {
            members,
            span: self.span_from(start),
        }))
    }

    fn parse_intersection_type(&mut self) -> Result<FlowType, ConvertError> {
        let start = self.current.span;
        self.match_token(&TokenKind::Amp);
        let first = self.parse_function_or_postfix_type()?;
        if !self.check(&TokenKind::Amp) {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.match_token(&TokenKind::Amp) {
            members.push(self.parse_function_or_postfix_type()?);
        }
        Ok(FlowType::Intersection(IntersectionType {
            members,
            span: self.span_from(start),
        }))
    }

    /// Parse one union/intersection item: an anonymous function type, or a
    /// prefix/postfix type optionally followed by the single-parameter
    /// function shorthand (`string => void`)
    fn parse_function_or_postfix_type(&mut self) -> Result<FlowType, ConvertError> {
        let start = self.current.span;

        if !self.no_anon_fn {
            if self.check(&TokenKind::Lt) {
                let type_parameters = Some(self.parse_type_parameters()?);
                let (params, rest) = self.parse_function_type_params()?;
                self.require(TokenKind::Arrow, "`=>`")?;
                let return_type = self.parse_type()?;
                return Ok(FlowType::Function(Box::new(FunctionType {
                    type_parameters,
                    params,
                    rest,
                    return_type,
                    span: self.span_from(start),
                })));
            }
            if self.check(&TokenKind::LParen) {
                let cp = self.checkpoint();
                if let Ok((params, rest)) = self.parse_function_type_params() {
                    if self.match_token(&TokenKind::Arrow) {
                        let return_type = self.parse_type()?;
                        return Ok(FlowType::Function(Box::new(FunctionType {
                            type_parameters: None,
                            params,
                            rest,
                            return_type,
                            span: self.span_from(start),
                        })));
                    }
                }
                self.restore(&cp);
            }
        }

        let ty = self.parse_prefix_type()?;
        if !self.no_anon_fn && self.check(&TokenKind::Arrow) {
            self.bump();
            let param_span = ty.span();
            let return_type = self.parse_type()?;
            return Ok(FlowType::Function(Box::new(FunctionType {
                type_parameters: None,
                params: vec![FunctionTypeParam {
                    name: None,
                    optional: false,
                    type_annotation: ty,
                    span: param_span,
                }],
                rest: None,
                return_type,
                span: self.span_from(start),
            })));
        }
        Ok(ty)
    }

    fn parse_prefix_type(&mut self) -> Result<FlowType, ConvertError> {
        let start = self.current.span;
        if self.match_token(&TokenKind::Question) {
            let inner = self.parse_prefix_type()?;
            return Ok(FlowType::Maybe(Box::new(MaybeType {
                inner,
                span: self.span_from(start),
            })));
        }
        if self.check(&TokenKind::Typeof) {
            self.bump();
            let argument = self.parse_qualified_name()?;
            return Ok(FlowType::Typeof(TypeofType {
                argument,
                span: self.span_from(start),
            }));
        }
        if self.current_ident_is("keyof") && self.type_follows() {
            self.bump();
            let argument = self.parse_prefix_type()?;
            return Ok(FlowType::Keyof(Box::new(KeyofType {
                argument,
                span: self.span_from(start),
            })));
        }
        self.parse_postfix_type()
    }

    /// Whether the next token can begin a type (distinguishes `keyof T`
    /// from a reference to a type literally named `keyof`)
    fn type_follows(&mut self) -> bool {
        matches!(
            self.peek_token().kind,
            TokenKind::Identifier(_)
                | TokenKind::String(_)
                | TokenKind::Number(_)
                | TokenKind::BigInt(_)
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::Void
                | TokenKind::Typeof
                | TokenKind::LBrace
                | TokenKind::LBracePipe
                | TokenKind::LBracket
                | TokenKind::LParen
                | TokenKind::Question
                | TokenKind::Star
        )
    }

    fn parse_postfix_type(&mut self) -> Result<FlowType, ConvertError> {
        let start = self.current.span;
        let mut ty = self.parse_primary_type()?;
        while self.check(&TokenKind::LBracket) && !self.current.newline_before {
            self.bump();
            if self.match_token(&TokenKind::RBracket) {
                ty = FlowType::Array(Box::new(ArrayType {
                    element: ty,
                    span: self.span_from(start),
                }));
            } else {
                let saved = self.no_anon_fn;
                self.no_anon_fn = false;
                let index = self.parse_type()?;
                self.no_anon_fn = saved;
                self.require(TokenKind::RBracket, "`]`")?;
                ty = FlowType::Indexed(Box::new(IndexedAccessType {
                    object: ty,
                    index,
                    span: self.span_from(start),
                }));
            }
        }
        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> Result<FlowType, ConvertError> {
        let start = self.current.span;
        match self.current.kind.clone() {
            TokenKind::Void => {
                self.bump();
                Ok(FlowType::Void(start))
            }
            TokenKind::Null => {
                self.bump();
                Ok(FlowType::Null(start))
            }
            TokenKind::Star => {
                self.bump();
                Ok(FlowType::Exists(start))
            }
            TokenKind::True => {
                self.bump();
                Ok(FlowType::BooleanLiteral(true, start))
            }
            TokenKind::False => {
                self.bump();
                Ok(FlowType::BooleanLiteral(false, start))
            }
            TokenKind::Number(_) => {
                self.bump();
                Ok(FlowType::NumberLiteral(start))
            }
            TokenKind::Minus => {
                // Negative number literal type
                self.bump();
                if !matches!(self.current.kind, TokenKind::Number(_)) {
                    return Err(self.unexpected("a number literal"));
                }
                self.bump();
                Ok(FlowType::NumberLiteral(self.span_from(start)))
            }
            TokenKind::BigInt(_) => {
                self.bump();
                Ok(FlowType::BigIntLiteral(start))
            }
            TokenKind::String(value) => {
                self.bump();
                Ok(FlowType::StringLiteral(StringLiteralType {
                    value,
                    span: start,
                }))
            }
            TokenKind::LBrace => {
                self.bump();
                self.parse_object_type_body(start, false)
            }
            TokenKind::LBracePipe => {
                self.bump();
                self.parse_object_type_body(start, true)
            }
            TokenKind::LBracket => {
                self.bump();
                let saved = self.no_anon_fn;
                self.no_anon_fn = false;
                let mut elements = vec![];
                while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
                    elements.push(self.parse_type()?);
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
                self.no_anon_fn = saved;
                self.require(TokenKind::RBracket, "`]`")?;
                Ok(FlowType::Tuple(TupleType {
                    elements,
                    span: self.span_from(start),
                }))
            }
            TokenKind::LParen => {
                self.bump();
                let saved = self.no_anon_fn;
                self.no_anon_fn = false;
                let inner = self.parse_type()?;
                self.no_anon_fn = saved;
                self.require(TokenKind::RParen, "`)`")?;
                Ok(FlowType::Paren(Box::new(ParenType {
                    inner,
                    span: self.span_from(start),
                })))
            }
            TokenKind::Typeof => {
                self.bump();
                let argument = self.parse_qualified_name()?;
                Ok(FlowType::Typeof(TypeofType {
                    argument,
                    span: self.span_from(start),
                }))
            }
            TokenKind::Identifier(name) => match name.as_str() {
                "any" => {
                    self.bump();
                    Ok(FlowType::Any(start))
                }
                "mixed" => {
                    self.bump();
                    Ok(FlowType::Mixed(start))
                }
                "empty" => {
                    self.bump();
                    Ok(FlowType::Empty(start))
                }
                "number" => {
                    self.bump();
                    Ok(FlowType::Number(start))
                }
                "string" => {
                    self.bump();
                    Ok(FlowType::String(start))
                }
                "boolean" | "bool" => {
                    self.bump();
                    Ok(FlowType::Boolean(start))
                }
                "symbol" => {
                    self.bump();
                    Ok(FlowType::Symbol(start))
                }
                _ => Ok(FlowType::Reference(self.parse_type_reference()?)),
            },
            _ => Err(self.unexpected("a type")),
        }
    }

    fn parse_qualified_name(&mut self) -> Result<QualifiedName, ConvertError> {
        let start = self.current.span;
        let first = self.require_identifier("a name")?;
        let mut parts = vec![first.name];
        while self.check(&TokenKind::Dot) {
            self.bump();
            if let Some(name) = self.ident_like() {
                parts.push(name);
                self.bump();
            } else {
                return Err(self.unexpected("a name"));
            }
        }
        Ok(QualifiedName {
            parts,
            span: self.span_from(start),
        })
    }

    fn parse_type_reference(&mut self) -> Result<TypeReference, ConvertError> {
        let start = self.current.span;
        let name = self.parse_qualified_name()?;
        let type_args = if self.check(&TokenKind::Lt) {
            Some(self.parse_type_arguments()?)
        } else {
            None
        };
        Ok(TypeReference {
            name,
            type_args,
            span: self.span_from(start),
        })
    }

    fn parse_type_arguments(&mut self) -> Result<TypeArguments, ConvertError> {
        let start = self.current.span;
        self.require(TokenKind::Lt, "`<`")?;
        let saved = self.no_anon_fn;
        self.no_anon_fn = false;
        let mut types = vec![];
        while !self.check(&TokenKind::Gt) && !self.is_at_end() {
            types.push(self.parse_type()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.no_anon_fn = saved;
        self.expect_type_gt()?;
        Ok(TypeArguments {
            types,
            span: self.span_from(start),
        })
    }

    fn parse_type_parameters(&mut self) -> Result<TypeParameters, ConvertError> {
        let start = self.current.span;
        self.require(TokenKind::Lt, "`<`")?;
        let saved = self.no_anon_fn;
        self.no_anon_fn = false;
        let mut params = vec![];
        while !self.check(&TokenKind::Gt) && !self.is_at_end() {
            let param_start = self.current.span;
            let mut variance = self.parse_variance();
            // TypeScript declaration-site variance, accepted for
            // round-tripping
            if variance.is_none() {
                let kind = if self.current_ident_is("out")
                    && matches!(self.peek_token().kind, TokenKind::Identifier(_))
                {
                    Some(VarianceKind::Covariant)
                } else if self.check(&TokenKind::In)
                    && matches!(self.peek_token().kind, TokenKind::Identifier(_))
                {
                    Some(VarianceKind::Contravariant)
                } else {
                    None
                };
                if let Some(kind) = kind {
                    variance = Some(Variance {
                        kind,
                        span: self.current.span,
                    });
                    self.bump();
                }
            }
            let name = match &self.current.kind {
                TokenKind::Identifier(name) => name.clone(),
                _ => return Err(self.unexpected("a type parameter name")),
            };
            self.bump();
            let bound = if self.match_token(&TokenKind::Colon)
                || self.match_token(&TokenKind::Extends)
            {
                Some(self.parse_type()?)
            } else {
                None
            };
            let default = if self.match_token(&TokenKind::Eq) {
                Some(self.parse_type()?)
            } else {
                None
            };
            params.push(TypeParameter {
                name,
                variance,
                bound,
                default,
                span: self.span_from(param_start),
            });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.no_anon_fn = saved;
        self.expect_type_gt()?;
        Ok(TypeParameters {
            params,
            span: self.span_from(start),
        })
    }

    /// Parse a parenthesized function-type parameter list
    fn parse_function_type_params(
        &mut self,
    ) -> Result<(Vec<FunctionTypeParam>, Option<Box<FunctionTypeParam>>), ConvertError> {
        self.require(TokenKind::LParen, "`(`")?;
        let saved = self.no_anon_fn;
        self.no_anon_fn = false;
        let mut params = vec![];
        let mut rest = None;
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            if self.check(&TokenKind::DotDotDot) {
                self.bump();
                rest = Some(Box::new(self.parse_function_type_param()?));
                break;
            }
            params.push(self.parse_function_type_param()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.match_token(&TokenKind::Comma);
        self.no_anon_fn = saved;
        self.require(TokenKind::RParen, "`)`")?;
        Ok((params, rest))
    }

    fn parse_function_type_param(&mut self) -> Result<FunctionTypeParam, ConvertError> {
        let start = self.current.span;

        // Named parameter: `name: T` / `name?: T`; otherwise a bare type
        let named = match &self.current.kind {
            TokenKind::Identifier(_) | TokenKind::This => {
                let peek = self.peek_token();
                matches!(peek.kind, TokenKind::Colon | TokenKind::Question)
            }
            _ => false,
        };

        if named {
            let name = match &self.current.kind {
                TokenKind::Identifier(name) => name.clone(),
                TokenKind::This => "this".to_string(),
                _ => return Err(self.unexpected("a parameter name")),
            };
            self.bump();
            let optional = self.match_token(&TokenKind::Question);
            self.require(TokenKind::Colon, "`:`")?;
            let type_annotation = self.parse_type()?;
            return Ok(FunctionTypeParam {
                name: Some(name),
                optional,
                type_annotation,
                span: self.span_from(start),
            });
        }

        let type_annotation = self.parse_type()?;
        Ok(FunctionTypeParam {
            name: None,
            optional: false,
            type_annotation,
            span: self.span_from(start),
        })
    }

    fn parse_object_type(&mut self, exact: bool) -> Result<ObjectType, ConvertError> {
        let start = self.current.span;
        if exact {
            self.require(TokenKind::LBracePipe, "`{|`")?;
        } else {
            self.require(TokenKind::LBrace, "`{`")?;
        }
        match self.parse_object_type_body(start, exact)? {
            FlowType::Object(object) => Ok(object),
            _ => Err(self.unexpected("an object type")),
        }
    }

    /// Parse object type members after the opening brace
    fn parse_object_type_body(
        &mut self,
        start: Span,
        exact: bool,
    ) -> Result<FlowType, ConvertError> {
        let close = if exact {
            TokenKind::PipeRBrace
        } else {
            TokenKind::RBrace
        };
        let saved = self.no_anon_fn;
        self.no_anon_fn = false;
        let mut members = vec![];
        let mut inexact = false;

        while !self.check(&close) && !self.is_at_end() {
            if self.check(&TokenKind::DotDotDot) {
                let spread_start = self.current.span;
                self.bump();
                if self.check(&close)
                    || self.check(&TokenKind::Comma)
                    || self.check(&TokenKind::Semicolon)
                {
                    inexact = true;
                } else {
                    let argument = self.parse_type()?;
                    members.push(ObjectTypeMember::Spread(ObjectTypeSpread {
                        argument,
                        span: self.span_from(spread_start),
                    }));
                }
            } else {
                members.push(self.parse_object_type_member()?);
            }
            if !self.match_token(&TokenKind::Comma) && !self.match_token(&TokenKind::Semicolon) {
                break;
            }
        }
        self.no_anon_fn = saved;
        if exact {
            self.require(TokenKind::PipeRBrace, "`|}`")?;
        } else {
            self.require(TokenKind::RBrace, "`}`")?;
        }
        Ok(FlowType::Object(ObjectType {
            members,
            exact,
            inexact,
            span: self.span_from(start),
        }))
    }

    fn parse_object_type_member(&mut self) -> Result<ObjectTypeMember, ConvertError> {
        let start = self.current.span;

        let mut is_static = false;
        if self.check(&TokenKind::Static) {
            let peek = self.peek_token();
            if !matches!(
                peek.kind,
                TokenKind::Colon | TokenKind::Question | TokenKind::LParen | TokenKind::Lt
            ) {
                is_static = true;
                self.bump();
            }
        }

        // Call property: `(): T` or `<T>(): T`
        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Lt) {
            let function = self.parse_object_member_signature(start)?;
            return Ok(ObjectTypeMember::Call(ObjectTypeCall {
                function,
                is_static,
                span: self.span_from(start),
            }));
        }

        let mut variance = self.parse_variance();
        // `readonly` members, accepted for round-tripping
        if variance.is_none() && self.current_ident_is("readonly") {
            let peek = self.peek_token();
            if !matches!(
                peek.kind,
                TokenKind::Colon
                    | TokenKind::Question
                    | TokenKind::Comma
                    | TokenKind::Semicolon
                    | TokenKind::RBrace
                    | TokenKind::PipeRBrace
                    | TokenKind::LParen
                    | TokenKind::Lt
            ) {
                variance = Some(Variance {
                    kind: VarianceKind::Covariant,
                    span: self.current.span,
                });
                self.bump();
            }
        }

        // Indexer: `[K]: V` / `[name: K]: V`
        if self.check(&TokenKind::LBracket) {
            self.bump();
            let peek_is_colon = self.peek_token().kind == TokenKind::Colon;
            let id = match &self.current.kind {
                TokenKind::Identifier(name) if peek_is_colon => {
                    let name = name.clone();
                    self.bump();
                    self.bump();
                    Some(name)
                }
                _ => None,
            };
            let key = self.parse_type()?;
            self.require(TokenKind::RBracket, "`]`")?;
            self.require(TokenKind::Colon, "`:`")?;
            let value = self.parse_type()?;
            return Ok(ObjectTypeMember::Indexer(ObjectTypeIndexer {
                id,
                key,
                value,
                variance,
                is_static,
                span: self.span_from(start),
            }));
        }

        // Getter / setter
        let mut kind = ObjectPropertyKind::Init;
        if variance.is_none() && (self.current_ident_is("get") || self.current_ident_is("set")) {
            let peek = self.peek_token();
            if !matches!(
                peek.kind,
                TokenKind::Colon
                    | TokenKind::Question
                    | TokenKind::Comma
                    | TokenKind::Semicolon
                    | TokenKind::RBrace
                    | TokenKind::PipeRBrace
                    | TokenKind::LParen
                    | TokenKind::Lt
            ) {
                kind = if self.current_ident_is("get") {
                    ObjectPropertyKind::Get
                } else {
                    ObjectPropertyKind::Set
                };
                self.bump();
            }
        }

        let key = self.parse_object_type_key()?;
        let optional = self.match_token(&TokenKind::Question);

        // Method shorthand
        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Lt) {
            let sig_start = self.current.span;
            let function = self.parse_object_member_signature(sig_start)?;
            let span = self.span_from(start);
            return Ok(ObjectTypeMember::Property(ObjectTypeProperty {
                key,
                value: FlowType::Function(Box::new(function)),
                optional,
                variance,
                is_method: true,
                kind,
                is_static,
                span,
            }));
        }

        self.require(TokenKind::Colon, "`:`")?;
        let value = self.parse_type()?;
        Ok(ObjectTypeMember::Property(ObjectTypeProperty {
            key,
            value,
            optional,
            variance,
            is_method: false,
            kind,
            is_static,
            span: self.span_from(start),
        }))
    }

    /// Method / call-property signature inside object types: parameters use
    /// function-type syntax and the return type uses `:`
    fn parse_object_member_signature(&mut self, start: Span) -> Result<FunctionType, ConvertError> {
        let type_parameters = if self.check(&TokenKind::Lt) {
            Some(self.parse_type_parameters()?)
        } else {
            None
        };
        let (params, rest) = self.parse_function_type_params()?;
        self.require(TokenKind::Colon, "`:`")?;
        let return_type = self.parse_type()?;
        Ok(FunctionType {
            type_parameters,
            params,
            rest,
            return_type,
            span: self.span_from(start),
        })
    }

    fn parse_object_type_key(&mut self) -> Result<ObjectTypeKey, ConvertError> {
        match &self.current.kind {
            TokenKind::String(value) => {
                let key = ObjectTypeKey::String(value.clone(), self.current.span);
                self.bump();
                Ok(key)
            }
            TokenKind::Number(_) => {
                let key = ObjectTypeKey::Number(self.current.span);
                self.bump();
                Ok(key)
            }
            _ => {
                if let Some(name) = self.ident_like() {
                    self.bump();
                    Ok(ObjectTypeKey::Identifier(name))
                } else {
                    Err(self.unexpected("a property name"))
                }
            }
        }
    }
}

/// Reinterpret an already-parsed expression as a loose assignment target
/// for `for (x.y in z)` style heads; only the span is retained
fn expression_to_loose_pattern(expr: Expression) -> Pattern {
    Pattern::Identifier(IdentifierPattern {
        name: String::new(),
        optional: false,
        type_annotation: None,
        span: expr.span(),
    })
}

/// Keyword token text when the token may appear in identifier-name position
fn keyword_text(kind: &TokenKind) -> Option<&'static str> {
    let text = match kind {
        TokenKind::True => "true",
        TokenKind::False => "false",
        TokenKind::Null => "null",
        TokenKind::Let => "let",
        TokenKind::Const => "const",
        TokenKind::Var => "var",
        TokenKind::Function => "function",
        TokenKind::Return => "return",
        TokenKind::If => "if",
        TokenKind::Else => "else",
        TokenKind::For => "for",
        TokenKind::While => "while",
        TokenKind::Do => "do",
        TokenKind::Break => "break",
        TokenKind::Continue => "continue",
        TokenKind::Switch => "switch",
        TokenKind::Case => "case",
        TokenKind::Default => "default",
        TokenKind::Try => "try",
        TokenKind::Catch => "catch",
        TokenKind::Finally => "finally",
        TokenKind::Throw => "throw",
        TokenKind::New => "new",
        TokenKind::This => "this",
        TokenKind::Super => "super",
        TokenKind::Class => "class",
        TokenKind::Extends => "extends",
        TokenKind::Static => "static",
        TokenKind::Import => "import",
        TokenKind::Export => "export",
        TokenKind::Typeof => "typeof",
        TokenKind::Instanceof => "instanceof",
        TokenKind::In => "in",
        TokenKind::Void => "void",
        TokenKind::Delete => "delete",
        TokenKind::Yield => "yield",
        TokenKind::Await => "await",
        TokenKind::Async => "async",
        TokenKind::Debugger => "debugger",
        TokenKind::Interface => "interface",
        TokenKind::Enum => "enum",
        TokenKind::Implements => "implements",
        _ => return None,
    };
    Some(text)
}

fn describe_keyword(kind: &TokenKind) -> String {
    keyword_text(kind).unwrap_or("identifier").to_string()
}

/// Short human-readable token description for error messages
fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Identifier(name) => format!("`{}`", name),
        TokenKind::String(_) => "a string literal".to_string(),
        TokenKind::Number(_) => "a number literal".to_string(),
        TokenKind::Eof => "end of input".to_string(),
        TokenKind::Invalid(ch) => format!("invalid character `{}`", ch),
        other => match keyword_text(other) {
            Some(text) => format!("`{}`", text),
            None => format!("{:?}", other),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        Parser::new(source).parse_program().unwrap()
    }

    #[test]
    fn test_maybe_type_annotation() {
        let prog = parse("const a: ?string = null;");
        assert_eq!(prog.body.len(), 1);
    }

    #[test]
    fn test_exact_object_type() {
        let prog = parse("type T = {| a: number |};");
        assert_eq!(prog.body.len(), 1);
    }

    #[test]
    fn test_generic_arrow_vs_jsx() {
        let prog = parse("const id = <T>(x: T) => x;");
        let Statement::VariableDeclaration(decl) = prog.body.first().unwrap() else {
            panic!("expected a variable declaration");
        };
        assert!(matches!(
            decl.declarations.first().unwrap().init,
            Some(Expression::Arrow(_))
        ));
    }

    #[test]
    fn test_jsx_element_statement() {
        let prog = parse("const b = <h1>hi there</h1>;");
        assert_eq!(prog.body.len(), 1);
    }

    #[test]
    fn test_opaque_type() {
        let prog = parse("opaque type ID: string = string;");
        assert!(matches!(
            prog.body.first().unwrap(),
            Statement::OpaqueTypeAlias(_)
        ));
    }

    #[test]
    fn test_declare_module() {
        let prog = parse("declare module 'fs' { declare function readFile(string): void; }");
        assert!(matches!(prog.body.first().unwrap(), Statement::Declare(_)));
    }

    #[test]
    fn test_type_used_as_identifier() {
        let prog = parse("const type = 5; type.toString();");
        assert_eq!(prog.body.len(), 2);
    }
}
