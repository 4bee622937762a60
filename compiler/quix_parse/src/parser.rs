//! Parser state and token-level helpers shared by every grammar module.

use std::io::{Read, Seek};

use quix_diagnostic::{DiagMessage, DiagnosticManager, IssueCode, Severity, Ticket};
use quix_ir::{
    Keyword, Location, Name, NodeArena, NodeData, NodeId, Operator, Punctor, Span, StringLookup,
    Token, TokenKind,
};
use quix_lexer::{LexFault, Lexer};
use quix_stack::DepthExceeded;

use crate::error::{ParseError, ParseResult};

/// Parser limits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParserConfig {
    /// Deepest expression nesting accepted before `NestingTooDeep`.
    pub max_expr_depth: u32,
    /// Largest repeat count in a `[e; count]` list literal.
    pub max_list_dup: u32,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_expr_depth: 10_000,
            max_list_dup: 4096,
        }
    }
}

/// Parser over one token stream.
///
/// Nodes go into the borrowed arena, diagnostics into the borrowed manager
/// under [`Ticket::PARSE`].
pub struct Parser<'a, R> {
    pub(crate) lexer: &'a mut Lexer<R>,
    pub(crate) arena: &'a mut NodeArena,
    pub(crate) diags: &'a mut DiagnosticManager,
    pub(crate) config: ParserConfig,
    /// End of the most recently consumed token.
    pub(crate) prev_end: Location,
    /// Span given to every node and diagnostic, for token streams whose
    /// locations mean nothing to the caller.
    respan: Option<Span>,
    /// Set by the first error when `fast_error` is on.
    pub(crate) aborted: bool,
}

impl<'a, R: Read + Seek + Send> Parser<'a, R> {
    pub fn new(
        lexer: &'a mut Lexer<R>,
        arena: &'a mut NodeArena,
        diags: &'a mut DiagnosticManager,
        config: ParserConfig,
    ) -> Self {
        Parser {
            lexer,
            arena,
            diags,
            config,
            prev_end: Location::UNKNOWN,
            respan: None,
            aborted: false,
        }
    }

    /// Attribute every node and diagnostic to `span`.
    pub(crate) fn respanned(mut self, span: Span) -> Self {
        self.respan = Some(span);
        self
    }

    /// Whether the first error stopped the parse.
    pub fn aborted(&self) -> bool {
        self.aborted
    }

    // Tokens

    /// Next significant token, without consuming it.
    pub(crate) fn peek(&mut self) -> Token {
        loop {
            let tok = self.lexer.peek();
            self.lexer_faults();
            if !matches!(tok.kind, TokenKind::Comment(_)) {
                return tok;
            }
            self.lexer.next();
        }
    }

    pub(crate) fn next(&mut self) -> Token {
        let tok = self.peek();
        self.lexer.next();
        if !tok.is_eof() {
            self.prev_end = tok.span.end;
        }
        tok
    }

    /// Put `tok` back in front of the stream.
    pub(crate) fn push_back(&mut self, tok: Token) {
        self.lexer.insert(tok);
    }

    pub(crate) fn at_punct(&mut self, p: Punctor) -> bool {
        self.peek().is_punctor(p)
    }

    pub(crate) fn at_op(&mut self, op: Operator) -> bool {
        self.peek().is_operator(op)
    }

    pub(crate) fn at_keyword(&mut self, kw: Keyword) -> bool {
        self.peek().is_keyword(kw)
    }

    pub(crate) fn eat_punct(&mut self, p: Punctor) -> bool {
        let hit = self.at_punct(p);
        if hit {
            self.next();
        }
        hit
    }

    pub(crate) fn eat_op(&mut self, op: Operator) -> bool {
        let hit = self.at_op(op);
        if hit {
            self.next();
        }
        hit
    }

    pub(crate) fn eat_keyword(&mut self, kw: Keyword) -> bool {
        let hit = self.at_keyword(kw);
        if hit {
            self.next();
        }
        hit
    }

    pub(crate) fn expect_punct(&mut self, p: Punctor, context: &str) -> ParseResult<Token> {
        let tok = self.next();
        if tok.is_punctor(p) {
            Ok(tok)
        } else {
            Err(self.unexpected(tok, &format!("'{p}' {context}")))
        }
    }

    pub(crate) fn expect_op(&mut self, op: Operator, context: &str) -> ParseResult<Token> {
        let tok = self.next();
        if tok.is_operator(op) {
            Ok(tok)
        } else {
            Err(self.unexpected(tok, &format!("'{op}' {context}")))
        }
    }

    pub(crate) fn expect_ident(&mut self, what: &str) -> ParseResult<(Name, Span)> {
        let tok = self.next();
        match tok.kind {
            TokenKind::Identifier(name) => Ok((name, tok.span)),
            _ => Err(self.unexpected(tok, what)),
        }
    }

    pub(crate) fn expect_string(&mut self, what: &str) -> ParseResult<Name> {
        let tok = self.next();
        match tok.kind {
            TokenKind::String(text) => Ok(text),
            _ => Err(self.unexpected(tok, what)),
        }
    }

    /// `;` closing a statement.
    pub(crate) fn expect_semi(&mut self) -> ParseResult<()> {
        let tok = self.next();
        if tok.is_punctor(Punctor::Semicolon) {
            Ok(())
        } else {
            Err(self.error(tok.span, "Expected ';'"))
        }
    }

    /// `[a, b, ...]` of identifiers, sorted by text and deduplicated.
    pub(crate) fn name_list(&mut self, context: &str) -> ParseResult<Vec<Name>> {
        self.expect_punct(Punctor::LBracket, context)?;
        let mut names = Vec::new();
        loop {
            let tok = self.next();
            match tok.kind {
                TokenKind::Punctor(Punctor::RBracket) => break,
                TokenKind::Identifier(name) => names.push(name),
                _ => return Err(self.unexpected(tok, "a name or ']'")),
            }
            self.eat_punct(Punctor::Comma);
        }
        let strings = self.lexer.strings();
        names.sort_by_key(|&name| strings.lookup(name));
        names.dedup();
        Ok(names)
    }

    // Nodes

    pub(crate) fn intern(&self, text: &str) -> Name {
        self.lexer.strings().intern(text)
    }

    pub(crate) fn text(&self, name: Name) -> std::sync::Arc<str> {
        self.lexer.strings().lookup(name)
    }

    /// Allocate a node spanning `start` to the last consumed token.
    pub(crate) fn alloc(&mut self, data: NodeData, start: Location) -> NodeId {
        let span = self.respan.unwrap_or(Span::new(start, self.prev_end));
        self.arena.alloc(data, span)
    }

    /// Allocate a node starting where `first` starts.
    pub(crate) fn alloc_from(&mut self, data: NodeData, first: NodeId) -> NodeId {
        let start = self.arena.span(first).start;
        self.alloc(data, start)
    }

    // Errors

    /// Report what went wrong with the source underneath the tokens. An
    /// unreadable source is fatal; a full location table only costs
    /// positions.
    fn lexer_faults(&mut self) {
        for fault in self.lexer.take_faults() {
            let msg = match fault {
                LexFault::Read { span, message } => DiagMessage::new(
                    Severity::FatalError,
                    IssueCode::InternalError,
                    format!("Cannot read the source: {message}"),
                )
                .at(span),
                LexFault::LocationCap { message } => DiagMessage::new(
                    Severity::Warn,
                    IssueCode::Default,
                    format!("Source positions are no longer tracked: {message}"),
                ),
            };
            self.diags.push(Ticket::PARSE, msg);
        }
    }

    fn report(&mut self, code: IssueCode, span: Span, message: &str) {
        let span = self.respan.unwrap_or(span);
        self.diags
            .push(Ticket::PARSE, DiagMessage::error(code, message).at(span));
        if self.diags.config().fast_error {
            self.aborted = true;
        }
    }

    /// Report a syntax error at `span`.
    pub(crate) fn error(&mut self, span: Span, message: impl Into<String>) -> ParseError {
        let message = message.into();
        tracing::debug!(%message, "syntax error");
        self.report(IssueCode::SyntaxError, span, &message);
        ParseError::Syntax { message, span }
    }

    /// `Expected {expected}, found {tok}`.
    pub(crate) fn unexpected(&mut self, tok: Token, expected: &str) -> ParseError {
        let found = self.describe(tok);
        self.error(tok.span, format!("Expected {expected}, found {found}"))
    }

    pub(crate) fn too_deep(&mut self, source: DepthExceeded, span: Span) -> ParseError {
        self.report(IssueCode::NestingTooDeep, span, &source.to_string());
        ParseError::TooDeep { source, span }
    }

    /// Human-readable token text for messages.
    pub(crate) fn describe(&self, tok: Token) -> String {
        match tok.kind {
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::Unknown(Name::EMPTY) => "unreadable input".to_string(),
            kind => format!("'{}'", kind.text(self.lexer.strings())),
        }
    }
}
