//! Type constructors.

use std::io::{Read, Seek};

use quix_ir::node::expr::{List, Named};
use quix_ir::node::ty::{ArrayTy, ItemTy, MapTy};
use quix_ir::{Keyword, NodeData, NodeId, Operator, Punctor, TokenKind};

use crate::error::ParseResult;
use crate::stop::Stop;
use crate::Parser;

/// Built-in type spelled as an identifier.
fn primitive(text: &str) -> Option<NodeData> {
    Some(match text {
        "u1" | "i1" => NodeData::U1,
        "u8" => NodeData::U8,
        "u16" => NodeData::U16,
        "u32" => NodeData::U32,
        "u64" => NodeData::U64,
        "u128" => NodeData::U128,
        "i8" => NodeData::I8,
        "i16" => NodeData::I16,
        "i32" => NodeData::I32,
        "i64" => NodeData::I64,
        "i128" => NodeData::I128,
        "f32" => NodeData::F32,
        "f64" => NodeData::F64,
        "string" => NodeData::StringTy,
        _ => return None,
    })
}

impl<R: Read + Seek + Send> Parser<'_, R> {
    /// One type, with any trailing `?` suffixes.
    pub(crate) fn parse_type(&mut self) -> ParseResult<NodeId> {
        quix_stack::ensure_sufficient_stack(|| {
            let mut ty = self.type_operand()?;
            while self.eat_op(Operator::Question) {
                ty = self.alloc_from(NodeData::OptionalTy(ItemTy { item: ty }), ty);
            }
            Ok(ty)
        })
    }

    fn type_operand(&mut self) -> ParseResult<NodeId> {
        let tok = self.next();
        let start = tok.span.start;
        let data = match tok.kind {
            TokenKind::Identifier(name) => {
                primitive(&self.text(name)).unwrap_or(NodeData::UnresTy(Named { name }))
            }
            TokenKind::Keyword(Keyword::Void) => NodeData::VoidTy,
            TokenKind::Keyword(Keyword::Fn) => {
                let (_, ty) = self.fn_signature(start)?;
                return Ok(ty);
            }
            TokenKind::Keyword(Keyword::Opaque) => {
                self.expect_punct(Punctor::LParen, "after 'opaque'")?;
                let (name, _) = self.expect_ident("an opaque type name")?;
                self.expect_punct(Punctor::RParen, "to close 'opaque('")?;
                NodeData::OpaqueTy(Named { name })
            }
            TokenKind::Punctor(Punctor::LBracket) => {
                let item = self.parse_type()?;
                let data = if self.eat_op(Operator::Minus) {
                    self.expect_op(Operator::Gt, "in a map type")?;
                    let value = self.parse_type()?;
                    NodeData::MapTy(MapTy { key: item, value })
                } else if self.eat_punct(Punctor::Semicolon) {
                    let size =
                        self.expr_required(Stop::NONE.punct(Punctor::RBracket), "an array size")?;
                    NodeData::ArrayTy(ArrayTy { item, size })
                } else {
                    NodeData::VectorTy(ItemTy { item })
                };
                self.expect_punct(Punctor::RBracket, "to close the type")?;
                data
            }
            TokenKind::Punctor(Punctor::LBrace) => {
                let item = self.parse_type()?;
                self.expect_punct(Punctor::RBrace, "to close a set type")?;
                NodeData::SetTy(ItemTy { item })
            }
            TokenKind::Punctor(Punctor::LParen) => {
                let mut items = Vec::new();
                while !self.eat_punct(Punctor::RParen) {
                    items.push(self.parse_type()?);
                    if !self.eat_punct(Punctor::Comma) {
                        self.expect_punct(Punctor::RParen, "to close a tuple type")?;
                        break;
                    }
                }
                NodeData::TupleTy(List { items })
            }
            TokenKind::Operator(Operator::Times) => {
                let item = self.parse_type()?;
                NodeData::PtrTy(ItemTy { item })
            }
            TokenKind::Operator(Operator::LogicNot) => {
                let item = self.parse_type()?;
                NodeData::MutTy(ItemTy { item })
            }
            _ => return Err(self.unexpected(tok, "a type")),
        };
        Ok(self.alloc(data, start))
    }
}
