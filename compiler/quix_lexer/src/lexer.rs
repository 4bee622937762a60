//! The token state machine.
//!
//! Each call to [`Lexer::next`] runs from `Start` until one token is
//! complete. The first significant byte picks the state:
//!
//! | Byte | State |
//! |---|---|
//! | letter, `_`, or `::` | identifier |
//! | digit | number |
//! | `"` or `'` | string |
//! | `/` | comment start |
//! | anything else | other (punctor, operator, unknown) |
//!
//! Malformed input never stops the lexer. It produces an `Unknown` token
//! carrying the offending text and carries on.

use std::io::{self, Read, Seek};
use std::sync::Arc;

use quix_ir::{
    Keyword, Location, LocationTable, Name, Operator, Punctor, SharedInterner, Span,
    StringInterner, Token, TokenKind,
};

use crate::ident::{is_ident_continue, is_ident_start, is_valid_identifier};
use crate::number::{canonicalize, Number};
use crate::reader::{ByteReader, Pos};

/// Lexer behavior knobs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LexerConfig {
    /// Drop comment tokens instead of returning them.
    pub skip_comments: bool,
}

/// A problem with the source itself rather than its text. Faults pile up
/// until [`Lexer::take_faults`] drains them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LexFault {
    /// The source could not be read. Lexing ended at `span` with an
    /// `Unknown` token.
    Read { span: Span, message: String },
    /// The location table is full. Tokens from here on carry unknown
    /// positions.
    LocationCap { message: String },
}

/// Streaming lexer over a seekable source.
pub struct Lexer<R> {
    reader: ByteReader<R>,
    filename: String,
    interner: SharedInterner,
    locations: LocationTable,
    config: LexerConfig,
    lookahead: Option<Token>,
    /// Spliced tokens, most recent last.
    inserted: Vec<Token>,
    /// Stream position the source started at.
    base: u64,
    cap_warned: bool,
    faults: Vec<LexFault>,
}

impl Lexer<io::Cursor<Vec<u8>>> {
    /// Lexer over an in-memory copy of `text`.
    pub fn from_text(text: &str, filename: impl Into<String>, interner: SharedInterner) -> Self {
        Lexer::new(io::Cursor::new(text.as_bytes().to_vec()), filename, interner)
    }
}

impl<R: Read + Seek + Send> Lexer<R> {
    pub fn new(mut source: R, filename: impl Into<String>, interner: SharedInterner) -> Self {
        let filename = filename.into();
        let mut faults = Vec::new();
        let base = source.stream_position().unwrap_or_else(|err| {
            tracing::error!(file = %filename, error = %err, "cannot query stream position");
            faults.push(LexFault::Read {
                span: Span::DUMMY,
                message: err.to_string(),
            });
            0
        });
        Lexer {
            reader: ByteReader::new(source),
            filename,
            interner,
            locations: LocationTable::new(),
            config: LexerConfig::default(),
            lookahead: None,
            inserted: Vec::new(),
            base,
            cap_warned: false,
            faults,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: LexerConfig) -> Self {
        self.config = config;
        self
    }

    /// Independent lexer over `source` that interns into the same table.
    pub fn fork<S: Read + Seek + Send>(&self, source: S, filename: impl Into<String>) -> Lexer<S> {
        Lexer::new(source, filename, Arc::clone(&self.interner)).with_config(self.config)
    }

    /// Consume one token. Returns `Eof` forever once the source is drained.
    #[allow(
        clippy::should_implement_trait,
        reason = "never ends; Eof repeats instead of None"
    )]
    pub fn next(&mut self) -> Token {
        if let Some(tok) = self.inserted.pop() {
            return tok;
        }
        if let Some(tok) = self.lookahead.take() {
            return tok;
        }
        self.lex()
    }

    /// The token [`next`](Self::next) would return.
    pub fn peek(&mut self) -> Token {
        if let Some(&tok) = self.inserted.last() {
            return tok;
        }
        if let Some(tok) = self.lookahead {
            return tok;
        }
        let tok = self.lex();
        self.lookahead = Some(tok);
        tok
    }

    /// Splice `token` in front of the stream. Tokens inserted later come out
    /// first, and any token already peeked stays queued behind them.
    pub fn insert(&mut self, token: Token) {
        self.inserted.push(token);
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn strings(&self) -> &StringInterner {
        &self.interner
    }

    pub fn locations(&self) -> &LocationTable {
        &self.locations
    }

    pub fn config(&self) -> LexerConfig {
        self.config
    }

    /// Faults recorded since the last call, oldest first.
    pub fn take_faults(&mut self) -> Vec<LexFault> {
        std::mem::take(&mut self.faults)
    }

    /// Byte offset of `loc` from the start of the source.
    pub fn offset(&self, loc: Location) -> Option<u32> {
        self.locations.offset(loc)
    }

    pub(crate) fn reread<T>(
        &mut self,
        f: impl FnOnce(&mut R, u64) -> io::Result<T>,
    ) -> Option<T> {
        let base = self.base;
        let source = self.reader.get_mut();
        let result = source.stream_position().and_then(|here| {
            let out = f(source, base);
            source.seek(io::SeekFrom::Start(here))?;
            out
        });
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::error!(file = %self.filename, error = %err, "cannot re-read source");
                None
            }
        }
    }

    fn lex(&mut self) -> Token {
        loop {
            let tok = self.lex_one();
            tracing::trace!(kind = ?tok.kind, "token");
            if self.config.skip_comments && matches!(tok.kind, TokenKind::Comment(_)) {
                continue;
            }
            return tok;
        }
    }

    fn lex_one(&mut self) -> Token {
        self.reader.skip_while(|b| b.is_ascii_whitespace());

        let start = self.reader.pos();
        let mut kind = match self.reader.current() {
            None => TokenKind::Eof,
            Some(b) if is_ident_start(b) => self.identifier(),
            Some(b':') if self.reader.peek_nth(1) == Some(b':') => self.identifier(),
            Some(b) if b.is_ascii_digit() => self.number(),
            Some(quote @ (b'"' | b'\'')) => self.string(quote),
            Some(b'/') => self.comment_start(),
            Some(_) => self.other(),
        };
        let read_error = self.reader.take_error();
        if read_error.is_some() {
            kind = TokenKind::Unknown(Name::EMPTY);
        }

        let end = if kind == TokenKind::Eof {
            start
        } else {
            self.reader.last()
        };
        let span = Span::new(self.locate(start), self.locate(end));
        if let Some(err) = read_error {
            tracing::error!(file = %self.filename, error = %err, "read failed");
            self.faults.push(LexFault::Read {
                span,
                message: err.to_string(),
            });
        }
        Token::new(kind, span)
    }

    fn locate(&mut self, pos: Pos) -> Location {
        match self.locations.save(pos.row, pos.col, pos.offset) {
            Ok(loc) => loc,
            Err(err) => {
                if !self.cap_warned {
                    tracing::warn!(file = %self.filename, error = %err, "position not recorded");
                    self.faults.push(LexFault::LocationCap {
                        message: err.to_string(),
                    });
                    self.cap_warned = true;
                }
                Location::UNKNOWN
            }
        }
    }

    fn intern(&self, bytes: &[u8]) -> Name {
        self.interner.intern(&String::from_utf8_lossy(bytes))
    }

    fn identifier(&mut self) -> TokenKind {
        let mut text = Vec::new();
        loop {
            self.reader.eat_while(&mut text, is_ident_continue);
            if self.reader.current() == Some(b':') && self.reader.peek_nth(1) == Some(b':') {
                self.reader.bump();
                self.reader.bump();
                text.extend_from_slice(b"::");
            } else {
                break;
            }
        }

        // Only ASCII bytes reach here.
        let text = String::from_utf8_lossy(&text);
        if text == "f" && self.reader.current() == Some(b'"') {
            return TokenKind::Keyword(Keyword::FString);
        }
        if let Some(kw) = Keyword::from_text(&text) {
            return TokenKind::Keyword(kw);
        }
        if let Some(op) = Operator::from_text(&text).filter(|op| op.is_word()) {
            return TokenKind::Operator(op);
        }
        let name = self.interner.intern(&text);
        if is_valid_identifier(&text) {
            TokenKind::Identifier(name)
        } else {
            TokenKind::Unknown(name)
        }
    }

    fn number(&mut self) -> TokenKind {
        let prefixed = self.reader.current() == Some(b'0')
            && matches!(
                self.reader.peek_nth(1),
                Some(b'x' | b'X' | b'b' | b'B' | b'o' | b'O' | b'd' | b'D')
            );

        let mut text = Vec::new();
        loop {
            self.reader.eat_while(&mut text, is_ident_continue);
            if prefixed {
                break;
            }
            let digit_follows = self.reader.peek_nth(1).is_some_and(|b| b.is_ascii_digit());
            let in_exponent = text.iter().any(|b| matches!(b, b'e' | b'E'));
            let more = match self.reader.current() {
                // `1..5` leaves `..` to the operator path.
                Some(b'.') => digit_follows && !in_exponent && !text.contains(&b'.'),
                Some(b'+' | b'-') => digit_follows && matches!(text.last(), Some(b'e' | b'E')),
                _ => false,
            };
            if !more {
                break;
            }
            if let Some(b) = self.reader.bump() {
                text.push(b);
            }
        }

        let raw = String::from_utf8_lossy(&text);
        match canonicalize(&raw) {
            Some(Number::Integer(value)) => TokenKind::Integer(self.interner.intern(&value)),
            Some(Number::Float(value)) => TokenKind::Float(self.interner.intern(&value)),
            None => TokenKind::Unknown(self.interner.intern(&raw)),
        }
    }

    /// Literal text runs to the next matching quote, taken verbatim.
    fn string(&mut self, quote: u8) -> TokenKind {
        self.reader.bump();
        let mut body = Vec::new();
        self.reader.eat_while(&mut body, |b| b != quote);
        if self.reader.bump().is_none() {
            let mut text = vec![quote];
            text.extend_from_slice(&body);
            return TokenKind::Unknown(self.intern(&text));
        }

        let body = String::from_utf8_lossy(&body);
        if quote == b'\'' {
            let mut chars = body.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                return TokenKind::Char(c);
            }
        }
        TokenKind::String(self.interner.intern(&body))
    }

    fn comment_start(&mut self) -> TokenKind {
        match self.reader.peek_nth(1) {
            Some(b'/') => {
                self.reader.bump();
                self.reader.bump();
                self.comment_single()
            }
            Some(b'*') => {
                self.reader.bump();
                self.reader.bump();
                self.comment_multi()
            }
            _ => self.other(),
        }
    }

    fn comment_single(&mut self) -> TokenKind {
        let mut text = Vec::new();
        self.reader.eat_while(&mut text, |b| b != b'\n');
        if text.last() == Some(&b'\r') {
            text.pop();
        }
        TokenKind::Comment(self.intern(&text))
    }

    /// Block comments nest.
    fn comment_multi(&mut self) -> TokenKind {
        let mut text = Vec::new();
        let mut depth = 1usize;
        loop {
            match (self.reader.current(), self.reader.peek_nth(1)) {
                (None, _) => {
                    let mut raw = b"/*".to_vec();
                    raw.extend_from_slice(&text);
                    return TokenKind::Unknown(self.intern(&raw));
                }
                (Some(b'/'), Some(b'*')) => {
                    self.reader.bump();
                    self.reader.bump();
                    depth += 1;
                    text.extend_from_slice(b"/*");
                }
                (Some(b'*'), Some(b'/')) => {
                    self.reader.bump();
                    self.reader.bump();
                    depth -= 1;
                    if depth == 0 {
                        return TokenKind::Comment(self.intern(&text));
                    }
                    text.extend_from_slice(b"*/");
                }
                (Some(b), _) => {
                    self.reader.bump();
                    text.push(b);
                }
            }
        }
    }

    /// Punctors, then the longest symbolic operator.
    fn other(&mut self) -> TokenKind {
        let Some(first) = self.reader.bump() else {
            return TokenKind::Eof;
        };
        if !first.is_ascii() {
            let mut raw = vec![first];
            self.reader.eat_while(&mut raw, |b| (0x80..0xC0).contains(&b));
            return TokenKind::Unknown(self.intern(&raw));
        }
        if let Some(p) = Punctor::from_char(char::from(first)) {
            return TokenKind::Punctor(p);
        }

        let mut text = String::from(char::from(first));
        let Some(mut op) = Operator::from_text(&text).filter(|op| !op.is_word()) else {
            return TokenKind::Unknown(self.interner.intern(&text));
        };
        // Every prefix of a symbolic operator is itself an operator, so
        // growing one byte at a time finds the longest match.
        while text.len() < Operator::MAX_SYMBOL_LEN {
            let Some(next) = self.reader.current().filter(u8::is_ascii) else {
                break;
            };
            text.push(char::from(next));
            match Operator::from_text(&text) {
                Some(longer) => {
                    self.reader.bump();
                    op = longer;
                }
                None => break,
            }
        }
        TokenKind::Operator(op)
    }
}

#[cfg(test)]
mod tests;
