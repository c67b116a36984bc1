//! Lexer for Flow-annotated JavaScript source
//!
//! Converts source text into a stream of tokens. The parser drives a few
//! rescan entry points (regex literals, template continuations, JSX text)
//! because those forms are not decidable from the token stream alone.

use std::iter::Peekable;
use std::str::CharIndices;

use serde::Serialize;

/// Source span information
///
/// `start`/`end` are byte offsets into the original source, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// A span covering both `self` and `other`
    pub fn to(&self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
            line: self.line,
            column: self.column,
        }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }
}

/// Token types for the JavaScript-with-Flow superset
///
/// Flow's contextual words (`type`, `opaque`, `declare`, `module`, `from`,
/// `as`, `of`, `checks`, ...) stay plain identifiers; the parser matches on
/// their text so they remain usable as ordinary binding names.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    BigInt(String),
    String(String),
    Regex,
    True,
    False,
    Null,

    // Identifiers & reserved words
    Identifier(String),
    Let,
    Const,
    Var,
    Function,
    Return,
    If,
    Else,
    For,
    While,
    Do,
    Break,
    Continue,
    Switch,
    Case,
    Default,
    Try,
    Catch,
    Finally,
    Throw,
    New,
    This,
    Super,
    Class,
    Extends,
    Static,
    Import,
    Export,
    Typeof,
    Instanceof,
    In,
    Void,
    Delete,
    Yield,
    Await,
    Async,
    Debugger,
    Interface,
    Enum,
    Implements,

    // Operators
    Plus,             // +
    Minus,            // -
    Star,             // *
    Slash,            // /
    Percent,          // %
    StarStar,         // **
    PlusPlus,         // ++
    MinusMinus,       // --
    Eq,               // =
    EqEq,             // ==
    EqEqEq,           // ===
    BangEq,           // !=
    BangEqEq,         // !==
    Lt,               // <
    LtEq,             // <=
    Gt,               // >
    GtEq,             // >=
    LtLt,             // <<
    GtGt,             // >>
    GtGtGt,           // >>>
    Amp,              // &
    AmpAmp,           // &&
    Pipe,             // |
    PipePipe,         // ||
    Caret,            // ^
    Tilde,            // ~
    Bang,             // !
    Question,         // ?
    QuestionQuestion, // ??
    QuestionDot,      // ?.

    // Assignment operators
    PlusEq,             // +=
    MinusEq,            // -=
    StarEq,             // *=
    SlashEq,            // /=
    PercentEq,          // %=
    StarStarEq,         // **=
    AmpEq,              // &=
    PipeEq,             // |=
    CaretEq,            // ^=
    LtLtEq,             // <<=
    GtGtEq,             // >>=
    GtGtGtEq,           // >>>=
    AmpAmpEq,           // &&=
    PipePipeEq,         // ||=
    QuestionQuestionEq, // ??=

    // Punctuation
    LParen,     // (
    RParen,     // )
    LBrace,     // {
    RBrace,     // }
    LBracePipe, // {| (exact object type open)
    PipeRBrace, // |} (exact object type close)
    LBracket,   // [
    RBracket,   // ]
    Dot,        // .
    DotDotDot,  // ...
    Comma,      // ,
    Colon,      // :
    Semicolon,  // ;
    Arrow,      // =>
    At,         // @
    Hash,       // #

    // Template literals
    TemplateHead,  // `...${
    TemplateMiddle, // }...${
    TemplateTail,  // }...`
    TemplateNoSub, // `...` (no substitutions)

    // JSX text run (produced only via `rescan_as_jsx_text`)
    JsxText,

    // Special
    Eof,
    Invalid(char),
}

/// A token with its source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// True when at least one line terminator preceded this token (for ASI)
    pub newline_before: bool,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, newline_before: bool) -> Self {
        Self {
            kind,
            span,
            newline_before,
        }
    }

    pub fn eof(pos: usize, line: u32, column: u32) -> Self {
        Self {
            kind: TokenKind::Eof,
            span: Span::new(pos, pos, line, column),
            newline_before: false,
        }
    }
}

/// Lexer state checkpoint for backtracking
#[derive(Clone)]
pub struct LexerCheckpoint {
    current_pos: usize,
    line: u32,
    column: u32,
}

/// Lexer for tokenizing Flow-annotated JavaScript
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    /// Base offset added to char_indices positions (needed after a reset
    /// into the middle of the source)
    chars_base_offset: usize,
    current_pos: usize,
    line: u32,
    column: u32,
    start_pos: usize,
    start_line: u32,
    start_column: u32,
    saw_newline: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            chars_base_offset: 0,
            current_pos: 0,
            line: 1,
            column: 1,
            start_pos: 0,
            start_line: 1,
            start_column: 1,
            saw_newline: false,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Create a checkpoint of the current lexer state for backtracking
    pub fn checkpoint(&self) -> LexerCheckpoint {
        LexerCheckpoint {
            current_pos: self.current_pos,
            line: self.line,
            column: self.column,
        }
    }

    /// Restore the lexer state from a checkpoint
    pub fn restore(&mut self, checkpoint: &LexerCheckpoint) {
        self.reset_to(checkpoint.current_pos, checkpoint.line, checkpoint.column);
    }

    fn reset_to(&mut self, pos: usize, line: u32, column: u32) {
        self.current_pos = pos;
        self.line = line;
        self.column = column;
        self.start_pos = pos;
        self.start_line = line;
        self.start_column = column;
        // Rebuild the iterator from the target position (O(1) instead of O(n))
        self.chars_base_offset = pos;
        self.chars = self
            .source
            .get(pos..)
            .unwrap_or("")
            .char_indices()
            .peekable();
    }

    /// Rescan starting at `span` as a regex literal
    ///
    /// Used when the parser determines that a `/` or `/=` token should have
    /// started a regex literal instead.
    pub fn rescan_as_regexp(&mut self, span: Span) -> Token {
        let newline_before = self.saw_newline;
        self.reset_to(span.start, span.line, span.column);
        self.advance(); // the opening /
        let kind = self.scan_regexp();
        Token::new(kind, self.make_span(), newline_before)
    }

    /// Rescan starting at a `}` token as a template continuation
    ///
    /// Returns `TemplateMiddle` (stopping after `${`) or `TemplateTail`
    /// (stopping after the closing backtick).
    pub fn rescan_template_continue(&mut self, rbrace: Span) -> Token {
        self.reset_to(rbrace.start, rbrace.line, rbrace.column);
        self.advance(); // the }
        let kind = self.scan_template_rest(false);
        Token::new(kind, self.make_span(), false)
    }

    /// Rescan starting at `span` as JSX text
    ///
    /// Consumes raw text up to (but not including) the next `<`, `{`, or
    /// end of input. The parser calls this when positioned at JSX children.
    pub fn rescan_as_jsx_text(&mut self, span: Span) -> Token {
        self.reset_to(span.start, span.line, span.column);
        while let Some(ch) = self.peek() {
            if ch == '<' || ch == '{' {
                break;
            }
            self.advance();
        }
        Token::new(TokenKind::JsxText, self.make_span(), false)
    }

    /// Get the next token from the source
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        self.start_pos = self.current_pos;
        self.start_line = self.line;
        self.start_column = self.column;
        let newline_before = self.saw_newline;

        let Some((_pos, ch)) = self.advance() else {
            let mut token = Token::eof(self.current_pos, self.line, self.column);
            token.newline_before = newline_before;
            return token;
        };

        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => {
                if self.peek() == Some('|') {
                    self.advance();
                    TokenKind::LBracePipe
                } else {
                    TokenKind::LBrace
                }
            }
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '~' => TokenKind::Tilde,
            '@' => TokenKind::At,
            '#' => TokenKind::Hash,

            '.' => self.scan_dot(),
            '+' => self.scan_plus(),
            '-' => self.scan_minus(),
            '*' => self.scan_star(),
            '/' => self.scan_slash(),
            '%' => {
                if self.match_char('=') {
                    TokenKind::PercentEq
                } else {
                    TokenKind::Percent
                }
            }
            '=' => self.scan_equals(),
            '!' => self.scan_bang(),
            '<' => self.scan_less_than(),
            '>' => self.scan_greater_than(),
            '&' => self.scan_ampersand(),
            '|' => self.scan_pipe(),
            '^' => {
                if self.match_char('=') {
                    TokenKind::CaretEq
                } else {
                    TokenKind::Caret
                }
            }
            '?' => self.scan_question(),

            '"' | '\'' => self.scan_string(ch),
            '`' => self.scan_template_rest(true),

            '0'..='9' => self.scan_number(ch),

            c if is_id_start(c) => self.scan_identifier(c),

            c => TokenKind::Invalid(c),
        };

        Token::new(kind, self.make_span(), newline_before)
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((pos, ch)) = result {
            self.current_pos = self.chars_base_offset + pos + ch.len_utf8();
            // ECMAScript line terminators: LF, LS (U+2028), PS (U+2029)
            if ch == '\n' || ch == '\u{2028}' || ch == '\u{2029}' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        result
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn peek_next(&self) -> Option<char> {
        let slice = self.source.get(self.current_pos..)?;
        let mut iter = slice.chars();
        iter.next();
        iter.next()
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn make_span(&self) -> Span {
        Span::new(
            self.start_pos,
            self.current_pos,
            self.start_line,
            self.start_column,
        )
    }

    fn skip_whitespace_and_comments(&mut self) {
        self.saw_newline = false;

        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r' | '\u{000B}' | '\u{000C}' | '\u{00A0}' | '\u{FEFF}') => {
                    self.advance();
                }
                Some('\n' | '\u{2028}' | '\u{2029}') => {
                    self.saw_newline = true;
                    self.advance();
                }
                Some('/') => {
                    let next = self.peek_next();
                    if next == Some('/') {
                        self.advance();
                        self.advance();
                        while let Some(ch) = self.peek() {
                            if ch == '\n' || ch == '\u{2028}' || ch == '\u{2029}' {
                                break;
                            }
                            self.advance();
                        }
                    } else if next == Some('*') {
                        self.advance();
                        self.advance();
                        loop {
                            match self.advance() {
                                Some((_, '*')) if self.peek() == Some('/') => {
                                    self.advance();
                                    break;
                                }
                                Some((_, '\n' | '\u{2028}' | '\u{2029}')) => {
                                    self.saw_newline = true;
                                }
                                Some(_) => {}
                                None => break,
                            }
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_dot(&mut self) -> TokenKind {
        if self.peek() == Some('.') && self.peek_next() == Some('.') {
            self.advance();
            self.advance();
            TokenKind::DotDotDot
        } else if matches!(self.peek(), Some('0'..='9')) {
            // .5 style number literal
            self.scan_number('.')
        } else {
            TokenKind::Dot
        }
    }

    fn scan_plus(&mut self) -> TokenKind {
        if self.match_char('+') {
            TokenKind::PlusPlus
        } else if self.match_char('=') {
            TokenKind::PlusEq
        } else {
            TokenKind::Plus
        }
    }

    fn scan_minus(&mut self) -> TokenKind {
        if self.match_char('-') {
            TokenKind::MinusMinus
        } else if self.match_char('=') {
            TokenKind::MinusEq
        } else {
            TokenKind::Minus
        }
    }

    fn scan_star(&mut self) -> TokenKind {
        if self.match_char('*') {
            if self.match_char('=') {
                TokenKind::StarStarEq
            } else {
                TokenKind::StarStar
            }
        } else if self.match_char('=') {
            TokenKind::StarEq
        } else {
            TokenKind::Star
        }
    }

    fn scan_slash(&mut self) -> TokenKind {
        if self.match_char('=') {
            TokenKind::SlashEq
        } else {
            TokenKind::Slash
        }
    }

    fn scan_equals(&mut self) -> TokenKind {
        if self.match_char('=') {
            if self.match_char('=') {
                TokenKind::EqEqEq
            } else {
                TokenKind::EqEq
            }
        } else if self.match_char('>') {
            TokenKind::Arrow
        } else {
            TokenKind::Eq
        }
    }

    fn scan_bang(&mut self) -> TokenKind {
        if self.match_char('=') {
            if self.match_char('=') {
                TokenKind::BangEqEq
            } else {
                TokenKind::BangEq
            }
        } else {
            TokenKind::Bang
        }
    }

    fn scan_less_than(&mut self) -> TokenKind {
        if self.match_char('<') {
            if self.match_char('=') {
                TokenKind::LtLtEq
            } else {
                TokenKind::LtLt
            }
        } else if self.match_char('=') {
            TokenKind::LtEq
        } else {
            TokenKind::Lt
        }
    }

    fn scan_greater_than(&mut self) -> TokenKind {
        if self.match_char('>') {
            if self.match_char('>') {
                if self.match_char('=') {
                    TokenKind::GtGtGtEq
                } else {
                    TokenKind::GtGtGt
                }
            } else if self.match_char('=') {
                TokenKind::GtGtEq
            } else {
                TokenKind::GtGt
            }
        } else if self.match_char('=') {
            TokenKind::GtEq
        } else {
            TokenKind::Gt
        }
    }

    fn scan_ampersand(&mut self) -> TokenKind {
        if self.match_char('&') {
            if self.match_char('=') {
                TokenKind::AmpAmpEq
            } else {
                TokenKind::AmpAmp
            }
        } else if self.match_char('=') {
            TokenKind::AmpEq
        } else {
            TokenKind::Amp
        }
    }

    fn scan_pipe(&mut self) -> TokenKind {
        if self.match_char('|') {
            if self.match_char('=') {
                TokenKind::PipePipeEq
            } else {
                TokenKind::PipePipe
            }
        } else if self.match_char('=') {
            TokenKind::PipeEq
        } else if self.match_char('}') {
            TokenKind::PipeRBrace
        } else {
            TokenKind::Pipe
        }
    }

    fn scan_question(&mut self) -> TokenKind {
        if self.peek() == Some('?') {
            self.advance();
            if self.match_char('=') {
                TokenKind::QuestionQuestionEq
            } else {
                TokenKind::QuestionQuestion
            }
        } else if self.peek() == Some('.') && !matches!(self.peek_next(), Some('0'..='9')) {
            // ?. but not ?.5 (conditional with a fractional literal)
            self.advance();
            TokenKind::QuestionDot
        } else {
            TokenKind::Question
        }
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        let mut value = String::new();

        loop {
            match self.advance() {
                Some((_, c)) if c == quote => break,
                Some((_, '\\')) => match self.advance() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'b')) => value.push('\x08'),
                    Some((_, 'f')) => value.push('\x0C'),
                    Some((_, 'v')) => value.push('\x0B'),
                    Some((_, '0')) if !matches!(self.peek(), Some('0'..='9')) => value.push('\0'),
                    Some((_, 'x')) => {
                        if let Some(code) = self.scan_hex_escape(2) {
                            if let Some(c) = char::from_u32(code) {
                                value.push(c);
                            }
                        }
                    }
                    Some((_, 'u')) => {
                        if self.peek() == Some('{') {
                            self.advance();
                            let mut hex = String::new();
                            while let Some(c) = self.peek() {
                                if c == '}' {
                                    self.advance();
                                    break;
                                }
                                if c.is_ascii_hexdigit() {
                                    hex.push(c);
                                    self.advance();
                                } else {
                                    break;
                                }
                            }
                            if let Ok(code) = u32::from_str_radix(&hex, 16) {
                                if let Some(c) = char::from_u32(code) {
                                    value.push(c);
                                }
                            }
                        } else if let Some(code) = self.scan_hex_escape(4) {
                            if let Some(c) = char::from_u32(code) {
                                value.push(c);
                            }
                        }
                    }
                    Some((_, '\n')) => {
                        // Line continuation
                    }
                    Some((_, c)) => value.push(c),
                    None => break,
                },
                Some((_, '\n')) => {
                    // Unterminated string
                    break;
                }
                Some((_, c)) => value.push(c),
                None => break,
            }
        }

        TokenKind::String(value)
    }

    fn scan_hex_escape(&mut self, count: usize) -> Option<u32> {
        let mut hex = String::new();
        for _ in 0..count {
            let ch = self.peek()?;
            if !ch.is_ascii_hexdigit() {
                return None;
            }
            hex.push(ch);
            self.advance();
        }
        u32::from_str_radix(&hex, 16).ok()
    }

    /// Scan the rest of a template literal
    ///
    /// With `from_start` the opening backtick was just consumed; otherwise
    /// the leading `}` of a continuation was. Stops after `${` (Head/Middle)
    /// or after the closing backtick (NoSub/Tail).
    fn scan_template_rest(&mut self, from_start: bool) -> TokenKind {
        loop {
            match self.advance() {
                Some((_, '`')) => {
                    return if from_start {
                        TokenKind::TemplateNoSub
                    } else {
                        TokenKind::TemplateTail
                    };
                }
                Some((_, '$')) if self.peek() == Some('{') => {
                    self.advance();
                    return if from_start {
                        TokenKind::TemplateHead
                    } else {
                        TokenKind::TemplateMiddle
                    };
                }
                Some((_, '\\')) => {
                    self.advance();
                }
                Some(_) => {}
                None => {
                    // Unterminated template
                    return if from_start {
                        TokenKind::TemplateNoSub
                    } else {
                        TokenKind::TemplateTail
                    };
                }
            }
        }
    }

    fn scan_regexp(&mut self) -> TokenKind {
        let mut in_class = false;
        loop {
            match self.advance() {
                Some((_, '\\')) => {
                    self.advance();
                }
                Some((_, '[')) => in_class = true,
                Some((_, ']')) => in_class = false,
                Some((_, '/')) if !in_class => break,
                Some((_, '\n')) | None => {
                    // Unterminated regex
                    return TokenKind::Regex;
                }
                Some(_) => {}
            }
        }
        // Flags
        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                self.advance();
            } else {
                break;
            }
        }
        TokenKind::Regex
    }

    fn scan_number(&mut self, first: char) -> TokenKind {
        let mut text = String::new();
        text.push(first);

        if first == '0' {
            match self.peek() {
                Some('x' | 'X') => return self.scan_radix_number(16),
                Some('o' | 'O') => return self.scan_radix_number(8),
                Some('b' | 'B') => return self.scan_radix_number(2),
                _ => {}
            }
        }

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '_' {
                if ch != '_' {
                    text.push(ch);
                }
                self.advance();
            } else {
                break;
            }
        }

        if first != '.' && self.peek() == Some('.') && !matches!(self.peek_next(), Some('.')) {
            text.push('.');
            self.advance();
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() || ch == '_' {
                    if ch != '_' {
                        text.push(ch);
                    }
                    self.advance();
                } else {
                    break;
                }
            }
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            text.push('e');
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                if let Some((_, sign)) = self.advance() {
                    text.push(sign);
                }
            }
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() {
                    text.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        if self.peek() == Some('n') {
            self.advance();
            return TokenKind::BigInt(text);
        }

        TokenKind::Number(text.parse().unwrap_or(f64::NAN))
    }

    fn scan_radix_number(&mut self, radix: u32) -> TokenKind {
        self.advance(); // x / o / b
        let mut digits = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_digit(radix) || ch == '_' {
                if ch != '_' {
                    digits.push(ch);
                }
                self.advance();
            } else {
                break;
            }
        }
        if self.peek() == Some('n') {
            self.advance();
            return TokenKind::BigInt(digits);
        }
        let value = u64::from_str_radix(&digits, radix).unwrap_or(0);
        TokenKind::Number(value as f64)
    }

    fn scan_identifier(&mut self, first: char) -> TokenKind {
        let mut name = String::new();
        name.push(first);

        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match name.as_str() {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,

            "let" => TokenKind::Let,
            "const" => TokenKind::Const,
            "var" => TokenKind::Var,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "switch" => TokenKind::Switch,
            "case" => TokenKind::Case,
            "default" => TokenKind::Default,
            "try" => TokenKind::Try,
            "catch" => TokenKind::Catch,
            "finally" => TokenKind::Finally,
            "throw" => TokenKind::Throw,
            "new" => TokenKind::New,
            "this" => TokenKind::This,
            "super" => TokenKind::Super,
            "class" => TokenKind::Class,
            "extends" => TokenKind::Extends,
            "static" => TokenKind::Static,
            "import" => TokenKind::Import,
            "export" => TokenKind::Export,
            "typeof" => TokenKind::Typeof,
            "instanceof" => TokenKind::Instanceof,
            "in" => TokenKind::In,
            "void" => TokenKind::Void,
            "delete" => TokenKind::Delete,
            "yield" => TokenKind::Yield,
            "await" => TokenKind::Await,
            "async" => TokenKind::Async,
            "debugger" => TokenKind::Debugger,
            "interface" => TokenKind::Interface,
            "enum" => TokenKind::Enum,
            "implements" => TokenKind::Implements,

            _ => TokenKind::Identifier(name),
        }
    }
}

/// Check if a character can start an identifier
fn is_id_start(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_xid::UnicodeXID::is_xid_start(ch)
}

/// Check if a character can continue an identifier
fn is_id_continue(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_xid::UnicodeXID::is_xid_continue(ch)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut tokens = vec![];
        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::Eof {
                break;
            }
            tokens.push(token.kind);
        }
        tokens
    }

    #[test]
    fn test_exact_object_tokens() {
        let tokens = lex("{| a: number |}");
        assert_eq!(tokens[0], TokenKind::LBracePipe);
        assert_eq!(*tokens.last().unwrap(), TokenKind::PipeRBrace);
    }

    #[test]
    fn test_empty_exact_object() {
        assert_eq!(
            lex("{||}"),
            vec![TokenKind::LBracePipe, TokenKind::PipeRBrace]
        );
    }

    #[test]
    fn test_union_before_exact_close() {
        // The |} must win over the union pipe only at the very end
        let tokens = lex("{|a:A|B|}");
        assert_eq!(tokens[4], TokenKind::Pipe);
        assert_eq!(*tokens.last().unwrap(), TokenKind::PipeRBrace);
    }

    #[test]
    fn test_maybe_type_question() {
        let tokens = lex("x: ?string");
        assert!(tokens.contains(&TokenKind::Question));
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let mut lexer = Lexer::new("let x");
        let tok = lexer.next_token();
        assert_eq!((tok.span.start, tok.span.end), (0, 3));
        let tok = lexer.next_token();
        assert_eq!((tok.span.start, tok.span.end), (4, 5));
    }

    #[test]
    fn test_newline_before_flag() {
        let mut lexer = Lexer::new("a\nb");
        assert!(!lexer.next_token().newline_before);
        assert!(lexer.next_token().newline_before);
    }
}
