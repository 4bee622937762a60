//! Returns, branches, loops, `switch` and `__asm__`.

use std::io::{Read, Seek};

use quix_ir::node::expr::List;
use quix_ir::node::stmt::{
    AsmOperand, Case, CondReturn, For, Foreach, Form, If, InlineAsm, RetV, Return, Switch, While,
};
use quix_ir::{Keyword, Location, Name, NodeData, NodeId, Operator, Punctor, TokenKind};

use crate::error::ParseResult;
use crate::stop::Stop;
use crate::Parser;

impl<R: Read + Seek + Send> Parser<'_, R> {
    /// `[expr] ;` after `ret`.
    pub(crate) fn ret(&mut self, start: Location) -> ParseResult<NodeId> {
        let value = self.expr(Stop::SEMI)?.unwrap_or_default();
        self.expect_semi()?;
        Ok(self.alloc(NodeData::Return(Return { value }), start))
    }

    /// `value, cond ;` after `retif` or `retz`.
    pub(crate) fn cond_ret(&mut self, kw: Keyword, start: Location) -> ParseResult<NodeId> {
        let value = self.expr_required(
            Stop::SEMI.punct(Punctor::Comma),
            "a return value",
        )?;
        if !self.eat_punct(Punctor::Comma) {
            // Leave a `;` for statement recovery.
            let tok = self.peek();
            return Err(self.unexpected(tok, "',' between the value and the condition"));
        }
        let cond = self.expr_required(Stop::SEMI, "a condition")?;
        self.expect_semi()?;
        let ret = CondReturn { cond, value };
        let data = if kw == Keyword::Retz {
            NodeData::RetZ(ret)
        } else {
            NodeData::RetIf(ret)
        };
        Ok(self.alloc(data, start))
    }

    /// `cond ;` after `retv`.
    pub(crate) fn retv(&mut self, start: Location) -> ParseResult<NodeId> {
        let cond = self.expr_required(Stop::SEMI, "a condition")?;
        self.expect_semi()?;
        Ok(self.alloc(NodeData::RetV(RetV { cond }), start))
    }

    pub(crate) fn if_stmt(&mut self, start: Location) -> ParseResult<NodeId> {
        let cond = self.expr_required(Stop::BODY, "a condition")?;
        let then = self.body()?;
        let otherwise = if self.eat_keyword(Keyword::Else) {
            let else_start = self.peek().span.start;
            if self.eat_keyword(Keyword::If) {
                self.if_stmt(else_start)?
            } else {
                self.body()?
            }
        } else {
            NodeId::INVALID
        };
        let node = If {
            cond,
            then,
            otherwise,
        };
        Ok(self.alloc(NodeData::If(node), start))
    }

    pub(crate) fn while_stmt(&mut self, start: Location) -> ParseResult<NodeId> {
        let cond = self.expr_required(Stop::BODY, "a condition")?;
        let body = self.body()?;
        Ok(self.alloc(NodeData::While(While { cond, body }), start))
    }

    /// `[(] init ; cond ; step [)] body` after `for`. Every header part
    /// may be empty.
    pub(crate) fn for_stmt(&mut self, start: Location) -> ParseResult<NodeId> {
        let paren = self.eat_punct(Punctor::LParen);

        let tok = self.peek();
        let init = match tok.kind {
            TokenKind::Keyword(kw @ (Keyword::Let | Keyword::Var | Keyword::Const)) => {
                self.next();
                let mut locals = Vec::new();
                self.local(kw, tok.span.start, &mut locals)?;
                if locals.len() == 1 {
                    locals[0]
                } else {
                    self.alloc(NodeData::Block(List { items: locals }), tok.span.start)
                }
            }
            _ => {
                let init = self.expr(Stop::SEMI)?.unwrap_or_default();
                self.expect_semi()?;
                init
            }
        };

        let cond = self.expr(Stop::SEMI)?.unwrap_or_default();
        self.expect_semi()?;

        let step = if paren {
            let step = self.expr(Stop::NONE.punct(Punctor::RParen))?;
            self.expect_punct(Punctor::RParen, "to close the loop header")?;
            step
        } else {
            self.expr(Stop::BODY)?
        }
        .unwrap_or_default();

        let body = self.body()?;
        let node = For {
            init,
            cond,
            step,
            body,
        };
        Ok(self.alloc(NodeData::For(node), start))
    }

    /// `index, value in iter`, ending at `stop`.
    fn iteration(&mut self, stop: Stop) -> ParseResult<(Name, Name, NodeId)> {
        let (index, _) = self.expect_ident("an index name")?;
        self.expect_punct(Punctor::Comma, "after the index name")?;
        let (value, _) = self.expect_ident("a value name")?;
        self.expect_op(Operator::In, "before the iterated value")?;
        let iter = self.expr_required(stop, "an iterated value")?;
        Ok((index, value, iter))
    }

    /// `[(] i, v in expr [)] body` after `foreach`.
    pub(crate) fn foreach_stmt(&mut self, start: Location) -> ParseResult<NodeId> {
        let (index, value, iter) = if self.eat_punct(Punctor::LParen) {
            let header = self.iteration(Stop::NONE.punct(Punctor::RParen))?;
            self.expect_punct(Punctor::RParen, "to close the loop header")?;
            header
        } else {
            self.iteration(Stop::BODY)?
        };
        let body = self.body()?;
        let node = Foreach {
            index,
            value,
            iter,
            body,
        };
        Ok(self.alloc(NodeData::Foreach(node), start))
    }

    /// `(max_jobs) (i, v in expr) body` after `form`.
    pub(crate) fn form_stmt(&mut self, start: Location) -> ParseResult<NodeId> {
        let close = Stop::NONE.punct(Punctor::RParen);
        self.expect_punct(Punctor::LParen, "after 'form'")?;
        let max_jobs = self.expr_required(close, "a job count")?;
        self.expect_punct(Punctor::RParen, "after the job count")?;
        self.expect_punct(Punctor::LParen, "to open the loop header")?;
        let (index, value, iter) = self.iteration(close)?;
        self.expect_punct(Punctor::RParen, "to close the loop header")?;
        let body = self.body()?;
        let node = Form {
            index,
            value,
            iter,
            max_jobs,
            body,
        };
        Ok(self.alloc(NodeData::Form(node), start))
    }

    /// `cond { case e: {block} ... default: {block} }` after `switch`.
    pub(crate) fn switch_stmt(&mut self, start: Location) -> ParseResult<NodeId> {
        let cond = self.expr_required(Stop::NONE.punct(Punctor::LBrace), "a switch value")?;
        self.expect_punct(Punctor::LBrace, "to open the switch")?;
        let mut cases = Vec::new();
        let mut default = NodeId::INVALID;
        loop {
            let tok = self.next();
            match tok.kind {
                TokenKind::Punctor(Punctor::RBrace) => break,
                TokenKind::Keyword(Keyword::Case) => {
                    let value =
                        self.expr_required(Stop::NONE.punct(Punctor::Colon), "a case value")?;
                    self.expect_punct(Punctor::Colon, "after a case value")?;
                    let body = self.parse_block(true, false)?;
                    let case = Case { cond: value, body };
                    cases.push(self.alloc(NodeData::Case(case), tok.span.start));
                }
                TokenKind::Keyword(Keyword::Default) => {
                    if default.is_valid() {
                        return Err(self.error(tok.span, "Duplicate 'default' in switch"));
                    }
                    self.expect_punct(Punctor::Colon, "after 'default'")?;
                    default = self.parse_block(true, false)?;
                }
                _ => return Err(self.unexpected(tok, "'case', 'default' or '}'")),
            }
        }
        let node = Switch {
            cond,
            cases,
            default,
        };
        Ok(self.alloc(NodeData::Switch(node), start))
    }

    /// `("code", {outputs}, {inputs}, [clobbers]);` after `__asm__`.
    pub(crate) fn inline_asm(&mut self, start: Location) -> ParseResult<NodeId> {
        self.expect_punct(Punctor::LParen, "after '__asm__'")?;
        let code = self.expect_string("assembly code")?;
        self.expect_punct(Punctor::Comma, "after the assembly code")?;
        let outputs = self.asm_operands()?;
        self.expect_punct(Punctor::Comma, "after the output operands")?;
        let inputs = self.asm_operands()?;
        self.expect_punct(Punctor::Comma, "after the input operands")?;

        self.expect_punct(Punctor::LBracket, "to open the clobber list")?;
        let mut clobbers = Vec::new();
        while !self.eat_punct(Punctor::RBracket) {
            clobbers.push(self.expect_string("a clobbered register")?);
            self.eat_punct(Punctor::Comma);
        }
        self.expect_punct(Punctor::RParen, "to close '__asm__'")?;
        self.expect_semi()?;

        let node = InlineAsm {
            code,
            outputs,
            inputs,
            clobbers,
        };
        Ok(self.alloc(NodeData::InlineAsm(node), start))
    }

    /// `{"constraint": expr, ...}`
    fn asm_operands(&mut self) -> ParseResult<Vec<AsmOperand>> {
        self.expect_punct(Punctor::LBrace, "to open an operand list")?;
        let mut operands = Vec::new();
        while !self.eat_punct(Punctor::RBrace) {
            let constraint = self.expect_string("an operand constraint")?;
            self.expect_punct(Punctor::Colon, "after an operand constraint")?;
            let stop = Stop::NONE.punct(Punctor::Comma).punct(Punctor::RBrace);
            let value = self.expr_required(stop, "an operand")?;
            operands.push(AsmOperand { constraint, value });
            self.eat_punct(Punctor::Comma);
        }
        Ok(operands)
    }
}
