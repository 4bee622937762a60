//! Declarations: locals, `type`, `enum`, aggregates, `subsystem` and
//! `pub`/`import` exports.

use std::io::{Read, Seek};

use quix_ir::node::decl::{
    CompositeDef, CompositeField, EnumDef, EnumItem, Export, Subsystem, Typedef, Visibility,
};
use quix_ir::node::expr::{List, Named};
use quix_ir::node::stmt::Local;
use quix_ir::node::ty::{FnParam, ItemTy};
use quix_ir::{Keyword, Location, Name, NodeData, NodeId, Operator, Punctor, TokenKind};

use crate::error::ParseResult;
use crate::stop::Stop;
use crate::Parser;

fn local_node(kw: Keyword, local: Local) -> NodeData {
    match kw {
        Keyword::Let => NodeData::Let(local),
        Keyword::Var => NodeData::Var(local),
        _ => NodeData::Const(local),
    }
}

/// Canonical ABI name for an export language string.
fn export_abi(lang: &str) -> Option<&'static str> {
    match lang {
        "c" => Some("c"),
        "c++" | "cxx" => Some("c++"),
        "d" | "dlang" => Some("d"),
        _ => None,
    }
}

impl<R: Read + Seek + Send> Parser<'_, R> {
    /// `name [: T] [= expr] ;` or `[a: T, b] ;` after `let`, `var` or
    /// `const`. One node per declared name goes to `out`.
    pub(crate) fn local(
        &mut self,
        kw: Keyword,
        start: Location,
        out: &mut Vec<NodeId>,
    ) -> ParseResult<()> {
        if self.eat_punct(Punctor::LBracket) {
            let mut names = Vec::new();
            loop {
                let (name, _) = self.expect_ident("a variable name")?;
                let ty = self.optional_type()?;
                names.push((name, ty));
                if self.eat_punct(Punctor::RBracket) {
                    break;
                }
                self.expect_punct(Punctor::Comma, "between declarations")?;
            }
            if self.at_op(Operator::Set) {
                let span = self.peek().span;
                return Err(self.error(span, "A multiple declaration cannot have an initializer"));
            }
            self.expect_semi()?;
            for (name, ty) in names {
                let local = Local {
                    name,
                    ty,
                    value: NodeId::INVALID,
                };
                out.push(self.alloc(local_node(kw, local), start));
            }
            return Ok(());
        }

        let (name, _) = self.expect_ident("a variable name")?;
        let ty = self.optional_type()?;
        let value = if self.eat_op(Operator::Set) {
            self.expr_required(Stop::SEMI, "an initializer")?
        } else {
            NodeId::INVALID
        };
        self.expect_semi()?;
        out.push(self.alloc(local_node(kw, Local { name, ty, value }), start));
        Ok(())
    }

    fn optional_type(&mut self) -> ParseResult<NodeId> {
        if self.eat_punct(Punctor::Colon) {
            self.parse_type()
        } else {
            Ok(NodeId::INVALID)
        }
    }

    /// `Name = T ;` after `type`.
    pub(crate) fn typedef(&mut self, start: Location) -> ParseResult<NodeId> {
        let (name, _) = self.expect_ident("a type name")?;
        self.expect_op(Operator::Set, "after a type name")?;
        let ty = self.parse_type()?;
        self.expect_semi()?;
        Ok(self.alloc(NodeData::Typedef(Typedef { name, ty }), start))
    }

    /// `Name [: T] { A [= expr], ... }` after `enum`.
    pub(crate) fn enum_def(&mut self, start: Location) -> ParseResult<NodeId> {
        let (name, _) = self.expect_ident("an enum name")?;
        let member = self.optional_type()?;
        self.expect_punct(Punctor::LBrace, "to open the enum items")?;
        let mut items = Vec::new();
        while !self.eat_punct(Punctor::RBrace) {
            let (item, _) = self.expect_ident("an enum item")?;
            let value = if self.eat_op(Operator::Set) {
                let stop = Stop::NONE.punct(Punctor::Comma).punct(Punctor::RBrace);
                self.expr_required(stop, "an item value")?
            } else {
                NodeId::INVALID
            };
            items.push(EnumItem { name: item, value });
            if !self.eat_punct(Punctor::Comma) {
                self.expect_punct(Punctor::RBrace, "to close the enum items")?;
                break;
            }
        }
        let def = EnumDef {
            name,
            member,
            items,
        };
        Ok(self.alloc(NodeData::Enum(def), start))
    }

    /// Body of `struct`, `region`, `group` or `union` after the keyword.
    pub(crate) fn composite(&mut self, kw: Keyword, start: Location) -> ParseResult<NodeId> {
        let (name, _) = self.expect_ident("a type name")?;
        self.expect_punct(Punctor::LBrace, "to open the member list")?;
        let mut def = CompositeDef {
            name,
            visibility: Visibility::default(),
            fields: Vec::new(),
            methods: Vec::new(),
            static_methods: Vec::new(),
            tags: Vec::new(),
        };

        loop {
            let tok = self.peek();
            match tok.kind {
                TokenKind::Eof => {
                    let message = format!("Unterminated {kw} '{}'", self.text(name));
                    return Err(self.error(tok.span, message));
                }
                TokenKind::Punctor(Punctor::RBrace) => {
                    self.next();
                    break;
                }
                TokenKind::Punctor(Punctor::Comma | Punctor::Semicolon) => {
                    self.next();
                    continue;
                }
                _ => {}
            }

            let visibility = self.visibility();
            let member_start = self.peek().span.start;
            if self.eat_keyword(Keyword::Static) {
                let tok = self.next();
                if !tok.is_keyword(Keyword::Fn) {
                    return Err(self.unexpected(tok, "'fn' after 'static'"));
                }
                let method = self.function(member_start, true)?;
                self.set_visibility(method, visibility);
                def.static_methods.push(method);
            } else if self.eat_keyword(Keyword::Fn) {
                let method = self.function(member_start, true)?;
                self.prepend_this(method, name);
                self.set_visibility(method, visibility);
                def.methods.push(method);
            } else {
                let (field, _) = self.expect_ident("a member name")?;
                self.expect_punct(Punctor::Colon, "after a member name")?;
                let ty = self.parse_type()?;
                let value = if self.eat_op(Operator::Set) {
                    let stop = Stop::NONE
                        .punct(Punctor::Comma)
                        .punct(Punctor::Semicolon)
                        .punct(Punctor::RBrace);
                    self.expr_required(stop, "a default value")?
                } else {
                    NodeId::INVALID
                };
                let field = CompositeField {
                    name: field,
                    ty,
                    value,
                    visibility,
                };
                def.fields.push(self.alloc(NodeData::CompositeField(field), member_start));
            }
        }

        self.eat_punct(Punctor::Semicolon);
        if self.eat_keyword(Keyword::Impl) {
            def.tags = self.name_list("after 'impl'")?;
        }
        let data = match kw {
            Keyword::Struct => NodeData::Struct(def),
            Keyword::Region => NodeData::Region(def),
            Keyword::Group => NodeData::Group(def),
            _ => NodeData::Union(def),
        };
        Ok(self.alloc(data, start))
    }

    /// Leading `pub`, `sec` or `pro` on a member.
    fn visibility(&mut self) -> Visibility {
        let visibility = match self.peek().kind {
            TokenKind::Keyword(Keyword::Pub) => Visibility::Public,
            TokenKind::Keyword(Keyword::Sec) => Visibility::Private,
            TokenKind::Keyword(Keyword::Pro) => Visibility::Protected,
            _ => return Visibility::default(),
        };
        self.next();
        visibility
    }

    fn set_visibility(&mut self, id: NodeId, visibility: Visibility) {
        match self.arena.get_mut(id) {
            NodeData::Fn(f) => f.visibility = visibility,
            NodeData::FnDecl(f) => f.visibility = visibility,
            NodeData::Struct(c) | NodeData::Region(c) | NodeData::Group(c) | NodeData::Union(c) => {
                c.visibility = visibility;
            }
            _ => {}
        }
    }

    /// Give a method an implicit first parameter `this: *Owner`.
    fn prepend_this(&mut self, method: NodeId, owner: Name) {
        let ty = match self.arena.get(method) {
            NodeData::Fn(f) => f.ty,
            NodeData::FnDecl(f) => f.ty,
            _ => return,
        };
        let span = self.arena.span(method);
        let owner = self
            .arena
            .alloc(NodeData::UnresTy(Named { name: owner }), span);
        let this_ty = self
            .arena
            .alloc(NodeData::PtrTy(ItemTy { item: owner }), span);
        let this = FnParam {
            name: self.intern("this"),
            ty: this_ty,
            default: NodeId::INVALID,
        };
        if let NodeData::FnTy(fn_ty) = self.arena.get_mut(ty) {
            fn_ty.params.insert(0, this);
        }
    }

    /// `a::b [: [deps]] { block } [impl [...]]` after `subsystem`.
    pub(crate) fn subsystem(&mut self, start: Location) -> ParseResult<NodeId> {
        let (name, _) = self.expect_ident("a subsystem name")?;
        let deps = if self.eat_punct(Punctor::Colon) {
            self.name_list("of subsystem dependencies")?
        } else {
            Vec::new()
        };
        let body = self.parse_block(true, false)?;
        let tags = if self.eat_keyword(Keyword::Impl) {
            self.name_list("after 'impl'")?
        } else {
            Vec::new()
        };
        let subsystem = Subsystem {
            name,
            body,
            deps,
            tags,
        };
        Ok(self.alloc(NodeData::Subsystem(subsystem), start))
    }

    /// `["lang"] { block }` or `["lang"] decl` after `pub` or `import`.
    /// Functions and aggregates declared directly inside become public.
    pub(crate) fn export(&mut self, start: Location) -> ParseResult<NodeId> {
        let abi = if matches!(self.peek().kind, TokenKind::String(_)) {
            let span = self.peek().span;
            let lang = self.expect_string("an export language")?;
            let lang = self.text(lang).to_lowercase();
            match export_abi(&lang) {
                Some(abi) => self.intern(abi),
                None => {
                    return Err(self.error(span, format!("Unknown export language \"{lang}\"")));
                }
            }
        } else {
            Name::EMPTY
        };

        let body = if self.at_punct(Punctor::LBrace) {
            self.parse_block(true, false)?
        } else {
            let tok = self.next();
            let item_start = tok.span.start;
            let mut items = Vec::new();
            match tok.kind {
                TokenKind::Keyword(kw @ (Keyword::Let | Keyword::Var | Keyword::Const)) => {
                    self.local(kw, item_start, &mut items)?;
                }
                TokenKind::Keyword(Keyword::Fn) => items.push(self.function(item_start, true)?),
                TokenKind::Keyword(
                    kw @ (Keyword::Struct | Keyword::Region | Keyword::Group | Keyword::Union),
                ) => items.push(self.composite(kw, item_start)?),
                TokenKind::Keyword(Keyword::Subsystem) => items.push(self.subsystem(item_start)?),
                _ => return Err(self.unexpected(tok, "'{' or a declaration")),
            }
            self.alloc(NodeData::Block(List { items }), item_start)
        };

        let items = match self.arena.get(body) {
            NodeData::Block(block) => block.items.clone(),
            _ => Vec::new(),
        };
        for item in items {
            self.set_visibility(item, Visibility::Public);
        }
        Ok(self.alloc(NodeData::Export(Export { abi, body }), start))
    }
}

#[cfg(test)]
mod tests;
