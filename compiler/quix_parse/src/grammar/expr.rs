//! Expression parsing.
//!
//! One operand stack per nesting level. Operands push; an operator parses
//! everything up to the current terminator as its right operand and folds
//! it with whatever is on the stack: nothing makes a unary node, one operand
//! a binary node, more is an error. A terminator is peeked, never consumed.

use std::io::{self, Read, Seek};

use quix_ir::node::expr::{
    Assoc, Binary, Call, CallArg, FString, FStringPart, Field, Index, List, Literal, Named,
    PostUnary, Slice, Ternary, Unary, Wrap,
};
use quix_ir::{Keyword, Location, Name, NodeData, NodeId, Operator, Punctor, Span, TokenKind};
use quix_stack::DepthLimit;

use crate::error::ParseResult;
use crate::stop::Stop;
use crate::Parser;

impl<R: Read + Seek + Send> Parser<'_, R> {
    /// Expression up to the first token in `stop`. `None` if the terminator
    /// comes first.
    pub(crate) fn expr(&mut self, stop: Stop) -> ParseResult<Option<NodeId>> {
        self.expr_at(stop, 0)
    }

    /// Like [`expr`](Self::expr), but an empty expression is an error.
    pub(crate) fn expr_required(&mut self, stop: Stop, what: &str) -> ParseResult<NodeId> {
        self.required_at(stop, 0, what)
    }

    fn required_at(&mut self, stop: Stop, depth: u32, what: &str) -> ParseResult<NodeId> {
        match self.expr_at(stop, depth)? {
            Some(id) => Ok(id),
            None => {
                let tok = self.peek();
                Err(self.unexpected(tok, what))
            }
        }
    }

    fn expr_at(&mut self, stop: Stop, depth: u32) -> ParseResult<Option<NodeId>> {
        let limit = DepthLimit::new(self.config.max_expr_depth);
        match limit.enter(depth, |depth| self.operand_stack(stop, depth)) {
            Ok(result) => result,
            Err(exceeded) => {
                let span = self.peek().span;
                Err(self.too_deep(exceeded, span))
            }
        }
    }

    fn operand_stack(&mut self, stop: Stop, depth: u32) -> ParseResult<Option<NodeId>> {
        let mut stack: Vec<NodeId> = Vec::new();
        loop {
            let tok = self.peek();
            if stop.contains(&tok) {
                return match stack.len() {
                    0 => Ok(None),
                    1 => Ok(stack.pop()),
                    _ => Err(self.error(tok.span, "Expected an operator between operands")),
                };
            }
            if tok.is_eof() {
                return Err(self.error(tok.span, "Unexpected end of file in expression"));
            }

            self.next();
            let start = tok.span.start;
            let node = match tok.kind {
                TokenKind::Integer(value) => self.alloc(NodeData::Int(Literal { value }), start),
                TokenKind::Float(value) => self.alloc(NodeData::Float(Literal { value }), start),
                TokenKind::String(value) => self.alloc(NodeData::Str(Literal { value }), start),
                TokenKind::Char(c) => self.alloc(NodeData::Char(c), start),
                TokenKind::Keyword(kw) => self.keyword_operand(kw, tok.span, depth)?,
                TokenKind::Identifier(name) => self.name_operand(name, start, depth)?,

                TokenKind::Punctor(Punctor::LParen) => {
                    if let Some(&top) = stack.last() {
                        if matches!(self.arena.get(top), NodeData::Field(_)) {
                            stack.pop();
                            let call = self.call(top, depth)?;
                            stack.push(call);
                            continue;
                        }
                    }
                    let inner = self.required_at(
                        Stop::NONE.punct(Punctor::RParen),
                        depth + 1,
                        "an expression",
                    )?;
                    self.expect_punct(Punctor::RParen, "to close '('")?;
                    inner
                }
                TokenKind::Punctor(Punctor::LBrace) => self.assoc_list(start, depth)?,
                TokenKind::Punctor(Punctor::LBracket) => match stack.len() {
                    0 => self.list(start, depth)?,
                    1 => {
                        let base = stack.pop().unwrap_or_default();
                        self.index_or_slice(base, depth)?
                    }
                    _ => return Err(self.error(tok.span, "Expected an operator between operands")),
                },
                TokenKind::Punctor(Punctor::Comma) => {
                    let Some(left) = stack.pop().filter(|_| stack.is_empty()) else {
                        return Err(self.error(tok.span, "Expected an expression before ','"));
                    };
                    let right = self.required_at(stop, depth + 1, "an expression after ','")?;
                    self.alloc_from(NodeData::SeqPoint(List { items: vec![left, right] }), left)
                }
                TokenKind::Punctor(p) => {
                    return Err(self.error(tok.span, format!("Unexpected '{p}' in expression")));
                }

                TokenKind::Operator(Operator::Dot) => {
                    let Some(base) = stack.pop().filter(|_| stack.is_empty()) else {
                        return Err(self.error(tok.span, "Expected an expression before '.'"));
                    };
                    let (field, _) = self.expect_ident("a field name after '.'")?;
                    let node = self.alloc_from(NodeData::Field(Field { base, field }), base);
                    self.postfix(node)
                }
                TokenKind::Operator(op) if op.takes_type_operand() => {
                    let Some(lhs) = stack.pop().filter(|_| stack.is_empty()) else {
                        return Err(self.error(tok.span, format!("Expected an expression before '{op}'")));
                    };
                    let ty_start = self.peek().span.start;
                    let ty = self.parse_type()?;
                    let rhs = self.alloc(NodeData::TypeExpr(Wrap { inner: ty }), ty_start);
                    self.alloc_from(NodeData::Binary(Binary { op, lhs, rhs }), lhs)
                }
                TokenKind::Operator(Operator::Question) if stack.len() == 1 => {
                    let cond = stack.pop().unwrap_or_default();
                    let lhs = self.required_at(
                        Stop::NONE.punct(Punctor::Colon),
                        depth + 1,
                        "an expression after '?'",
                    )?;
                    self.expect_punct(Punctor::Colon, "in conditional expression")?;
                    let rhs = self.required_at(stop, depth + 1, "an expression after ':'")?;
                    self.alloc_from(NodeData::Ternary(Ternary { cond, lhs, rhs }), cond)
                }
                TokenKind::Operator(op) => {
                    let operand = format!("an operand after '{op}'");
                    let rhs = self.required_at(stop, depth + 1, &operand)?;
                    match stack.len() {
                        0 => self.alloc(NodeData::Unary(Unary { op, rhs }), start),
                        1 => {
                            let lhs = stack.pop().unwrap_or_default();
                            self.alloc_from(NodeData::Binary(Binary { op, lhs, rhs }), lhs)
                        }
                        _ => return Err(self.error(tok.span, "Expected an operator between operands")),
                    }
                }

                TokenKind::Unknown(_) | TokenKind::Comment(_) | TokenKind::Eof => {
                    let found = self.describe(tok);
                    return Err(self.error(tok.span, format!("Unexpected {found} in expression")));
                }
            };
            stack.push(node);
        }
    }

    fn keyword_operand(&mut self, kw: Keyword, span: Span, depth: u32) -> ParseResult<NodeId> {
        let start = span.start;
        Ok(match kw {
            Keyword::True => self.alloc(NodeData::Bool(true), start),
            Keyword::False => self.alloc(NodeData::Bool(false), start),
            Keyword::Null => self.alloc(NodeData::Null, start),
            Keyword::Undef => self.alloc(NodeData::Undef, start),
            Keyword::Fn => {
                let func = self.function(start, false)?;
                let literal = self.alloc(NodeData::StmtExpr(Wrap { inner: func }), start);
                if self.eat_punct(Punctor::LParen) {
                    self.call(literal, depth)?
                } else {
                    literal
                }
            }
            Keyword::FString => self.fstring(start, depth)?,
            _ => return Err(self.error(span, format!("Unexpected keyword '{kw}' in expression"))),
        })
    }

    /// Identifier, call, or identifier with fused `++`/`--`.
    fn name_operand(&mut self, name: Name, start: Location, depth: u32) -> ParseResult<NodeId> {
        let ident = self.alloc(NodeData::Ident(Named { name }), start);
        if self.eat_punct(Punctor::LParen) {
            return self.call(ident, depth);
        }
        Ok(self.postfix(ident))
    }

    /// Fuse a directly following `++` or `--` onto `node`.
    fn postfix(&mut self, node: NodeId) -> NodeId {
        for op in [Operator::Inc, Operator::Dec] {
            if self.eat_op(op) {
                return self.alloc_from(NodeData::PostUnary(PostUnary { op, lhs: node }), node);
            }
        }
        node
    }

    /// Arguments after `(`: `name: expr` or positional `expr`, commas
    /// optional, up to `)`.
    fn call(&mut self, func: NodeId, depth: u32) -> ParseResult<NodeId> {
        let mut args = Vec::new();
        let mut positional = 0usize;
        loop {
            let tok = self.peek();
            if self.eat_punct(Punctor::RParen) {
                break;
            }
            if tok.is_eof() {
                return Err(self.error(tok.span, "Expected ')' to close the argument list"));
            }

            let mut named = None;
            if let TokenKind::Identifier(name) = tok.kind {
                let prev_end = self.prev_end;
                self.next();
                if self.eat_punct(Punctor::Colon) {
                    named = Some(name);
                } else {
                    self.push_back(tok);
                    self.prev_end = prev_end;
                }
            }
            let value = self.required_at(Stop::ARG, depth + 1, "an argument")?;
            let name = named.unwrap_or_else(|| {
                let name = self.intern(&format!("__{positional}"));
                positional += 1;
                name
            });
            args.push(CallArg { name, value });
            self.eat_punct(Punctor::Comma);
        }
        Ok(self.alloc_from(NodeData::Call(Call { func, args }), func))
    }

    /// `{k: v, ...}` after `{`.
    fn assoc_list(&mut self, start: Location, depth: u32) -> ParseResult<NodeId> {
        let mut items = Vec::new();
        while !self.eat_punct(Punctor::RBrace) {
            let key = self.required_at(Stop::NONE.punct(Punctor::Colon), depth + 1, "a key")?;
            self.expect_punct(Punctor::Colon, "after a key")?;
            let value = self.required_at(
                Stop::NONE.punct(Punctor::Comma).punct(Punctor::RBrace),
                depth + 1,
                "a value",
            )?;
            items.push(self.alloc_from(NodeData::Assoc(Assoc { key, value }), key));
            self.eat_punct(Punctor::Comma);
        }
        Ok(self.alloc(NodeData::List(List { items }), start))
    }

    /// `[a, b]` or `[e; count]` after `[`. A repeated element is one node
    /// listed `count` times.
    fn list(&mut self, start: Location, depth: u32) -> ParseResult<NodeId> {
        let stop = Stop::NONE
            .punct(Punctor::Comma)
            .punct(Punctor::Semicolon)
            .punct(Punctor::RBracket);
        let mut items = Vec::new();
        while !self.eat_punct(Punctor::RBracket) {
            let element = self.required_at(stop, depth + 1, "a list element")?;
            if self.eat_punct(Punctor::Semicolon) {
                let count = self.repeat_count(depth)?;
                items.extend(std::iter::repeat_n(element, count as usize));
            } else {
                items.push(element);
            }
            self.eat_punct(Punctor::Comma);
        }
        Ok(self.alloc(NodeData::List(List { items }), start))
    }

    fn repeat_count(&mut self, depth: u32) -> ParseResult<u32> {
        let count = self.required_at(
            Stop::NONE.punct(Punctor::RBracket).punct(Punctor::Comma),
            depth + 1,
            "a repeat count",
        )?;
        let span = self.arena.span(count);
        let NodeData::Int(Literal { value }) = *self.arena.get(count) else {
            return Err(self.error(span, "List repeat count must be an integer literal"));
        };
        let limit = self.config.max_list_dup;
        match self.text(value).parse::<u32>() {
            Ok(n) if (1..=limit).contains(&n) => Ok(n),
            _ => Err(self.error(
                span,
                format!("List repeat count must be between 1 and {limit}"),
            )),
        }
    }

    /// `[i]`, `[i:j]`, `[:j]`, `[i:]` or `[:]` after `base[`.
    fn index_or_slice(&mut self, base: NodeId, depth: u32) -> ParseResult<NodeId> {
        let index = self.expr_at(
            Stop::NONE.punct(Punctor::RBracket).punct(Punctor::Colon),
            depth + 1,
        )?;
        if self.eat_punct(Punctor::Colon) {
            let end = self.expr_at(Stop::NONE.punct(Punctor::RBracket), depth + 1)?;
            self.expect_punct(Punctor::RBracket, "to close a slice")?;
            let slice = Slice {
                base,
                start: index.unwrap_or_default(),
                end: end.unwrap_or_default(),
            };
            return Ok(self.alloc_from(NodeData::Slice(slice), base));
        }
        let Some(index) = index else {
            let tok = self.peek();
            return Err(self.unexpected(tok, "an index"));
        };
        self.expect_punct(Punctor::RBracket, "to close an index")?;
        let node = self.alloc_from(NodeData::Index(Index { base, index }), base);
        Ok(self.postfix(node))
    }

    /// `f"text {expr} text"` after the `fstring` keyword.
    ///
    /// Each `{...}` hole is re-lexed on its own through a fork of the
    /// current lexer and parsed as a complete expression. Its nodes take
    /// the span of the whole string. `{{` and `}}` are literal braces.
    fn fstring(&mut self, start: Location, depth: u32) -> ParseResult<NodeId> {
        let tok = self.next();
        let TokenKind::String(template) = tok.kind else {
            return Err(self.unexpected(tok, "a string after 'fstring'"));
        };

        let template = self.text(template);
        let mut parts = Vec::new();
        let mut text = String::new();
        let mut chars = template.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    text.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    text.push('}');
                }
                '{' => {
                    let mut hole = String::new();
                    let mut open = 1usize;
                    for c in chars.by_ref() {
                        match c {
                            '{' => open += 1,
                            '}' => open -= 1,
                            _ => {}
                        }
                        if open == 0 {
                            break;
                        }
                        hole.push(c);
                    }
                    if open != 0 {
                        return Err(self.error(tok.span, "Unterminated '{' in format string"));
                    }
                    if !text.is_empty() {
                        parts.push(FStringPart::Text(self.intern(&text)));
                        text.clear();
                    }
                    let expr = self.hole(hole, tok.span, depth)?;
                    parts.push(FStringPart::Expr(expr));
                }
                '}' => return Err(self.error(tok.span, "Unmatched '}' in format string")),
                c => text.push(c),
            }
        }
        if !text.is_empty() {
            parts.push(FStringPart::Text(self.intern(&text)));
        }
        Ok(self.alloc(NodeData::FString(FString { parts }), start))
    }

    fn hole(&mut self, source: String, span: Span, depth: u32) -> ParseResult<NodeId> {
        let filename = self.lexer.filename().to_string();
        let mut lexer = self
            .lexer
            .fork(io::Cursor::new(source.into_bytes()), filename);
        let mut sub = Parser::new(&mut lexer, &mut *self.arena, &mut *self.diags, self.config)
            .respanned(span);
        let result = sub.required_at(Stop::EOF, depth + 1, "an expression in format string");
        self.aborted |= sub.aborted;
        result
    }
}

#[cfg(test)]
mod tests;
