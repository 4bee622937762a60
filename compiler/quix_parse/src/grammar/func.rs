//! Function signatures, bodies and `req` contracts.

use std::io::{Read, Seek};

use quix_ir::node::decl::{FnDecl, FnDef, Visibility};
use quix_ir::node::expr::Binary;
use quix_ir::node::ty::{FnParam, FnProps, FnTy, Purity};
use quix_ir::{Keyword, Location, Name, NodeData, NodeId, Operator, Punctor, TokenKind};

use crate::error::ParseResult;
use crate::stop::Stop;
use crate::Parser;

fn is_property(kw: Keyword) -> bool {
    matches!(
        kw,
        Keyword::Noexcept
            | Keyword::Foreign
            | Keyword::Impure
            | Keyword::Tsafe
            | Keyword::Pure
            | Keyword::Quasipure
            | Keyword::Retropure
            | Keyword::Inline
            | Keyword::Crashpoint
    )
}

impl<R: Read + Seek + Send> Parser<'_, R> {
    /// Property keywords following `fn`.
    ///
    /// Each keyword may appear once. `pure`, `quasipure` and `retropure`
    /// exclude each other and `impure`, and imply `noexcept`.
    fn fn_props(&mut self) -> ParseResult<FnProps> {
        let mut props = FnProps::default();
        let mut seen: Vec<Keyword> = Vec::new();
        let mut purity = None;
        let mut impure = false;
        let mut tsafe = false;
        loop {
            let tok = self.peek();
            let kw = match tok.kind {
                TokenKind::Keyword(kw) if is_property(kw) => kw,
                _ => break,
            };
            self.next();
            if seen.contains(&kw) {
                return Err(self.error(tok.span, format!("Duplicate function property '{kw}'")));
            }
            seen.push(kw);
            match kw {
                Keyword::Noexcept => props.noexcept = true,
                Keyword::Foreign => props.foreign = true,
                Keyword::Inline => props.inline = true,
                Keyword::Crashpoint => props.crashpoint = true,
                Keyword::Tsafe => tsafe = true,
                Keyword::Impure => impure = true,
                _ => {
                    if let Some(prev) = purity {
                        return Err(self.error(
                            tok.span,
                            format!("'{kw}' conflicts with '{prev}'"),
                        ));
                    }
                    purity = Some(kw);
                }
            }
            if impure {
                if let Some(pure) = purity {
                    return Err(self.error(tok.span, format!("'{pure}' conflicts with 'impure'")));
                }
            }
        }

        props.purity = match purity {
            Some(Keyword::Pure) => Purity::Pure,
            Some(Keyword::Quasipure) => Purity::Quasipure,
            Some(Keyword::Retropure) => Purity::Retropure,
            _ if tsafe => Purity::ImpureThreadSafe,
            _ => Purity::ImpureThreadUnsafe,
        };
        if purity.is_some() {
            props.noexcept = true;
        }
        Ok(props)
    }

    /// Properties, optional name, parameter list and return type, after
    /// `fn`. Returns the name (empty when absent) and the `FnTy` node.
    pub(crate) fn fn_signature(&mut self, start: Location) -> ParseResult<(Name, NodeId)> {
        let mut props = self.fn_props()?;
        let name = match self.peek().kind {
            TokenKind::Identifier(name) => {
                self.next();
                name
            }
            _ => Name::EMPTY,
        };

        self.expect_punct(Punctor::LParen, "to open the parameter list")?;
        let mut params = Vec::new();
        while !self.eat_punct(Punctor::RParen) {
            if self.eat_op(Operator::Ellipsis) {
                props.variadic = true;
                self.expect_punct(Punctor::RParen, "after '...'")?;
                break;
            }
            let (name, _) = self.expect_ident("a parameter name")?;
            self.expect_punct(Punctor::Colon, "after a parameter name")?;
            let ty = self.parse_type()?;
            let default = if self.eat_op(Operator::Set) {
                self.expr_required(Stop::ARG, "a default value")?
            } else {
                NodeId::INVALID
            };
            params.push(FnParam { name, ty, default });
            if !self.eat_punct(Punctor::Comma) {
                self.expect_punct(Punctor::RParen, "to close the parameter list")?;
                break;
            }
        }

        let ret = if self.eat_punct(Punctor::Colon) {
            self.parse_type()?
        } else {
            self.alloc(NodeData::VoidTy, start)
        };
        let ty = self.alloc(NodeData::FnTy(FnTy { params, ret, props }), start);
        Ok((name, ty))
    }

    /// Function after `fn`: a declaration ending in `;`, or a definition.
    ///
    /// `consume_semi` is off for function literals, whose `;` belongs to
    /// the enclosing statement.
    pub(crate) fn function(&mut self, start: Location, consume_semi: bool) -> ParseResult<NodeId> {
        let (name, ty) = self.fn_signature(start)?;
        if self.at_punct(Punctor::Semicolon) {
            if consume_semi {
                self.next();
            }
            let decl = FnDecl {
                name,
                ty,
                visibility: Visibility::default(),
            };
            return Ok(self.alloc(NodeData::FnDecl(decl), start));
        }

        let body = self.body()?;
        let (precond, postcond) = if self.eat_keyword(Keyword::Req) {
            self.contract()?
        } else {
            (NodeId::INVALID, NodeId::INVALID)
        };
        let def = FnDef {
            name,
            ty,
            visibility: Visibility::default(),
            captures: Vec::new(),
            body,
            precond,
            postcond,
        };
        Ok(self.alloc(NodeData::Fn(def), start))
    }

    /// `{ in expr; out expr; ... }` after `req`. Clauses of one kind are
    /// joined with `&&`.
    fn contract(&mut self) -> ParseResult<(NodeId, NodeId)> {
        self.expect_punct(Punctor::LBrace, "after 'req'")?;
        let mut pre = Vec::new();
        let mut post = Vec::new();
        while !self.eat_punct(Punctor::RBrace) {
            let tok = self.next();
            match tok.kind {
                TokenKind::Operator(Operator::In) => {
                    pre.push(self.expr_required(Stop::SEMI, "a precondition")?);
                }
                TokenKind::Operator(Operator::Out) => {
                    post.push(self.expr_required(Stop::SEMI, "a postcondition")?);
                }
                _ => return Err(self.unexpected(tok, "'in', 'out' or '}'")),
            }
            self.expect_semi()?;
        }
        Ok((self.conjunction(pre), self.conjunction(post)))
    }

    fn conjunction(&mut self, clauses: Vec<NodeId>) -> NodeId {
        clauses
            .into_iter()
            .rev()
            .reduce(|rhs, lhs| {
                let and = Binary {
                    op: Operator::LogicAnd,
                    lhs,
                    rhs,
                };
                self.alloc_from(NodeData::Binary(and), lhs)
            })
            .unwrap_or_default()
    }
}
