//! Statement loop and keyword dispatch.

use std::io::{Read, Seek};

use quix_ir::node::expr::{List, Wrap};
use quix_ir::{Keyword, Location, NodeData, NodeFlags, NodeId, Operator, Punctor, TokenKind};

use crate::error::ParseResult;
use crate::stop::Stop;
use crate::Parser;

/// Keywords that open an expression rather than a statement.
fn starts_expression(kw: Keyword) -> bool {
    matches!(
        kw,
        Keyword::True | Keyword::False | Keyword::Null | Keyword::Undef | Keyword::FString
    )
}

impl<R: Read + Seek + Send> Parser<'_, R> {
    /// Whole input as one top-level block.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse_module(&mut self) -> ParseResult<NodeId> {
        let root = self.parse_block(false, false)?;
        tracing::debug!(nodes = self.arena.len(), "parsed module");
        Ok(root)
    }

    /// `{ stmt* }` when `expect_braces`, otherwise statements up to end of
    /// input. `single_stmt` stops after the first statement.
    ///
    /// A failed statement has already been reported; the loop skips to the
    /// next `;` or `}` and carries on, unless the parse has been aborted.
    pub(crate) fn parse_block(&mut self, expect_braces: bool, single_stmt: bool) -> ParseResult<NodeId> {
        let start = self.peek().span.start;
        if expect_braces {
            self.expect_punct(Punctor::LBrace, "to open a block")?;
        }

        let mut items = Vec::new();
        let mut attempted = false;
        loop {
            if single_stmt && attempted {
                break;
            }
            let tok = self.peek();
            match tok.kind {
                TokenKind::Eof => {
                    if expect_braces {
                        return Err(self.error(tok.span, "Expected '}'"));
                    }
                    break;
                }
                TokenKind::Punctor(Punctor::RBrace) if expect_braces => {
                    self.next();
                    break;
                }
                TokenKind::Punctor(Punctor::Semicolon) => {
                    self.next();
                    continue;
                }
                TokenKind::Punctor(p) if p.is_closing() => {
                    // A lone statement leaves the bracket to its enclosing block.
                    attempted = true;
                    if !single_stmt {
                        self.next();
                    }
                    let e = self.error(tok.span, format!("Unexpected closing brace '{p}'"));
                    if self.aborted {
                        return Err(e);
                    }
                    continue;
                }
                _ => {}
            }

            attempted = true;
            let stmt = quix_stack::ensure_sufficient_stack(|| self.statement(&mut items));
            if let Err(e) = stmt {
                if self.aborted {
                    return Err(e);
                }
                self.recover();
            }
        }
        Ok(self.alloc(NodeData::Block(List { items }), start))
    }

    /// `=> stmt` or `{ block }`.
    pub(crate) fn body(&mut self) -> ParseResult<NodeId> {
        if self.eat_op(Operator::Arrow) {
            self.parse_block(false, true)
        } else {
            self.parse_block(true, false)
        }
    }

    /// Skip to just past the next `;`, or up to the next `}`, at the
    /// current brace depth.
    fn recover(&mut self) {
        let mut depth = 0u32;
        loop {
            let tok = self.peek();
            match tok.kind {
                TokenKind::Eof => return,
                TokenKind::Punctor(Punctor::Semicolon) if depth == 0 => {
                    self.next();
                    return;
                }
                TokenKind::Punctor(Punctor::RBrace) if depth == 0 => return,
                TokenKind::Punctor(Punctor::RBrace) => depth -= 1,
                TokenKind::Punctor(Punctor::LBrace) => depth += 1,
                _ => {}
            }
            self.next();
        }
    }

    fn statement(&mut self, out: &mut Vec<NodeId>) -> ParseResult<()> {
        let tok = self.peek();
        let start = tok.span.start;
        let kw = match tok.kind {
            TokenKind::Keyword(kw) if !starts_expression(kw) => kw,
            _ => {
                out.push(self.expr_stmt(start)?);
                return Ok(());
            }
        };

        self.next();
        let node = match kw {
            Keyword::Let | Keyword::Var | Keyword::Const => return self.local(kw, start, out),
            Keyword::Type => self.typedef(start)?,
            Keyword::Enum => self.enum_def(start)?,
            Keyword::Struct | Keyword::Region | Keyword::Group | Keyword::Union => {
                self.composite(kw, start)?
            }
            Keyword::Subsystem => self.subsystem(start)?,
            Keyword::Fn => self.function(start, true)?,
            Keyword::Pub | Keyword::Import => self.export(start)?,
            Keyword::Sec | Keyword::Pro => return Ok(()),
            Keyword::Ret => self.ret(start)?,
            Keyword::Retif | Keyword::Retz => self.cond_ret(kw, start)?,
            Keyword::Retv => self.retv(start)?,
            Keyword::Break => {
                self.expect_semi()?;
                self.alloc(NodeData::Break, start)
            }
            Keyword::Continue => {
                self.expect_semi()?;
                self.alloc(NodeData::Continue, start)
            }
            Keyword::If => self.if_stmt(start)?,
            Keyword::While => self.while_stmt(start)?,
            Keyword::For => self.for_stmt(start)?,
            Keyword::Form => self.form_stmt(start)?,
            Keyword::Foreach => self.foreach_stmt(start)?,
            Keyword::Switch => self.switch_stmt(start)?,
            Keyword::Asm => self.inline_asm(start)?,
            Keyword::Unsafe | Keyword::Safe => {
                let block = self.block_or_stmt()?;
                self.arena
                    .set_flag(block, NodeFlags::UNSAFE, kw == Keyword::Unsafe);
                block
            }
            Keyword::Volatile => {
                let inner = self.block_or_stmt()?;
                self.alloc(NodeData::VolStmt(Wrap { inner }), start)
            }
            _ => return Err(self.error(tok.span, format!("Unexpected keyword '{kw}'"))),
        };
        out.push(node);
        Ok(())
    }

    /// `{ block }` or one statement.
    fn block_or_stmt(&mut self) -> ParseResult<NodeId> {
        let braced = self.at_punct(Punctor::LBrace);
        self.parse_block(braced, !braced)
    }

    fn expr_stmt(&mut self, start: Location) -> ParseResult<NodeId> {
        let inner = self.expr_required(Stop::SEMI, "an expression")?;
        self.expect_semi()?;
        Ok(self.alloc(NodeData::ExprStmt(Wrap { inner }), start))
    }
}
