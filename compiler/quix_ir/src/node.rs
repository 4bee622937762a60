//! Node graph: ids, kinds, flags and payloads.
//!
//! Every node is a [`NodeData`] value stored in a [`NodeArena`](crate::NodeArena).
//! Children are [`NodeId`] slots inside the payload. The number and order of
//! slots is fixed when a node is built; passes rewrite slot contents only.
//!
//! [`NodeKind`] is the fieldless tag of [`NodeData`]. Both enums, the
//! kind-to-name table and the kind-to-size table are generated from one list
//! so they cannot drift apart.

use std::fmt;
use std::mem::size_of;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::Span;

pub mod decl;
pub mod expr;
pub mod stmt;
pub mod ty;

use decl::{CompositeDef, CompositeField, EnumDef, Export, FnDecl, FnDef, Subsystem, Typedef};
use expr::{
    Assoc, Binary, Call, FString, FStringPart, Field, Index, List, Literal, Named, PostUnary,
    Slice, TemplCall, Ternary, Unary, Wrap,
};
use stmt::{Case, CondReturn, For, Foreach, Form, If, InlineAsm, Local, RetV, Return, Switch, While};
use ty::{ArrayTy, EnumTy, FnTy, ItemTy, MapTy, StructTy};

/// Index into a [`NodeArena`](crate::NodeArena).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Empty slot.
    pub const INVALID: NodeId = NodeId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "NodeId({})", self.0)
        } else {
            write!(f, "NodeId::INVALID")
        }
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::INVALID
    }
}

bitflags! {
    /// Modifiers attachable to any node.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u8 {
        const CONST = 1;
        const VOLATILE = 1 << 1;
        const UNSAFE = 1 << 2;
    }
}

/// Coarse grouping of kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Expr,
    Type,
    Decl,
    Stmt,
}

/// Per-node bookkeeping stored beside every payload.
const HEADER_SIZE: usize = size_of::<Span>() + size_of::<NodeFlags>();

macro_rules! payload_size {
    () => {
        0
    };
    ($payload:ty) => {
        size_of::<$payload>()
    };
}

macro_rules! any_payload {
    ($payload:ty) => {
        _
    };
}

macro_rules! define_nodes {
    ( $( $cat:ident { $( $variant:ident $( ( $payload:ty ) )? ),* $(,)? } )* ) => {
        /// Closed set of node kinds.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum NodeKind {
            $( $( $variant, )* )*
        }

        impl NodeKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [NodeKind] = &[ $( $( NodeKind::$variant, )* )* ];

            /// Number of kinds.
            pub const COUNT: usize = Self::ALL.len();

            pub const fn name(self) -> &'static str {
                match self {
                    $( $( NodeKind::$variant => stringify!($variant), )* )*
                }
            }

            pub const fn category(self) -> NodeCategory {
                match self {
                    $( $( NodeKind::$variant => NodeCategory::$cat, )* )*
                }
            }

            /// Bytes a node of this kind accounts for in its arena.
            pub const fn byte_size(self) -> usize {
                match self {
                    $( $( NodeKind::$variant => HEADER_SIZE + payload_size!($($payload)?), )* )*
                }
            }
        }

        /// Node payload, one variant per [`NodeKind`].
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        pub enum NodeData {
            $( $( $variant $( ($payload) )?, )* )*
        }

        impl NodeData {
            pub const fn kind(&self) -> NodeKind {
                match self {
                    $( $( NodeData::$variant $( (any_payload!($payload)) )? => NodeKind::$variant, )* )*
                }
            }
        }
    };
}

define_nodes! {
    Expr {
        Binary(Binary),
        Unary(Unary),
        PostUnary(PostUnary),
        Ternary(Ternary),
        Int(Literal),
        Float(Literal),
        Str(Literal),
        Char(char),
        Bool(bool),
        Null,
        Undef,
        Call(Call),
        TemplCall(TemplCall),
        List(List),
        Assoc(Assoc),
        Field(Field),
        Index(Index),
        Slice(Slice),
        FString(FString),
        Ident(Named),
        SeqPoint(List),
        StmtExpr(Wrap),
        TypeExpr(Wrap),
    }
    Type {
        MutTy(ItemTy),
        U1,
        U8,
        U16,
        U32,
        U64,
        U128,
        I8,
        I16,
        I32,
        I64,
        I128,
        F32,
        F64,
        VoidTy,
        PtrTy(ItemTy),
        OpaqueTy(Named),
        StringTy,
        EnumTy(EnumTy),
        StructTy(StructTy),
        GroupTy(List),
        RegionTy(List),
        UnionTy(List),
        ArrayTy(ArrayTy),
        VectorTy(ItemTy),
        MapTy(MapTy),
        TupleTy(List),
        SetTy(ItemTy),
        OptionalTy(ItemTy),
        FnTy(FnTy),
        UnresTy(Named),
    }
    Decl {
        Typedef(Typedef),
        FnDecl(FnDecl),
        Struct(CompositeDef),
        Region(CompositeDef),
        Group(CompositeDef),
        Union(CompositeDef),
        Enum(EnumDef),
        Fn(FnDef),
        Subsystem(Subsystem),
        Export(Export),
        CompositeField(CompositeField),
    }
    Stmt {
        Block(List),
        Const(Local),
        Var(Local),
        Let(Local),
        InlineAsm(InlineAsm),
        Return(Return),
        RetIf(CondReturn),
        RetZ(CondReturn),
        RetV(RetV),
        Break,
        Continue,
        If(If),
        While(While),
        For(For),
        Form(Form),
        Foreach(Foreach),
        Case(Case),
        Switch(Switch),
        ExprStmt(Wrap),
        VolStmt(Wrap),
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Child slots in declaration order.
///
/// Expanded twice: once over `&NodeData` and once over `&mut NodeData`.
macro_rules! collect_slots {
    ($data:expr, $out:ident $(, $m:tt)?) => {
        match $data {
            NodeData::Binary(b) => {
                $out.push(&$($m)? b.lhs);
                $out.push(&$($m)? b.rhs);
            }
            NodeData::Unary(u) => $out.push(&$($m)? u.rhs),
            NodeData::PostUnary(u) => $out.push(&$($m)? u.lhs),
            NodeData::Ternary(t) => {
                $out.push(&$($m)? t.cond);
                $out.push(&$($m)? t.lhs);
                $out.push(&$($m)? t.rhs);
            }
            NodeData::Int(_)
            | NodeData::Float(_)
            | NodeData::Str(_)
            | NodeData::Char(_)
            | NodeData::Bool(_)
            | NodeData::Null
            | NodeData::Undef
            | NodeData::Ident(_)
            | NodeData::OpaqueTy(_)
            | NodeData::UnresTy(_)
            | NodeData::U1
            | NodeData::U8
            | NodeData::U16
            | NodeData::U32
            | NodeData::U64
            | NodeData::U128
            | NodeData::I8
            | NodeData::I16
            | NodeData::I32
            | NodeData::I64
            | NodeData::I128
            | NodeData::F32
            | NodeData::F64
            | NodeData::VoidTy
            | NodeData::StringTy
            | NodeData::Break
            | NodeData::Continue => {}
            NodeData::Call(c) => {
                $out.push(&$($m)? c.func);
                for arg in &$($m)? c.args {
                    $out.push(&$($m)? arg.value);
                }
            }
            NodeData::TemplCall(c) => {
                $out.push(&$($m)? c.func);
                for arg in &$($m)? c.template_args {
                    $out.push(&$($m)? arg.value);
                }
                for arg in &$($m)? c.args {
                    $out.push(&$($m)? arg.value);
                }
            }
            NodeData::List(l)
            | NodeData::SeqPoint(l)
            | NodeData::Block(l)
            | NodeData::GroupTy(l)
            | NodeData::RegionTy(l)
            | NodeData::UnionTy(l)
            | NodeData::TupleTy(l) => {
                for item in &$($m)? l.items {
                    $out.push(item);
                }
            }
            NodeData::Assoc(a) => {
                $out.push(&$($m)? a.key);
                $out.push(&$($m)? a.value);
            }
            NodeData::Field(f) => $out.push(&$($m)? f.base),
            NodeData::Index(i) => {
                $out.push(&$($m)? i.base);
                $out.push(&$($m)? i.index);
            }
            NodeData::Slice(s) => {
                $out.push(&$($m)? s.base);
                $out.push(&$($m)? s.start);
                $out.push(&$($m)? s.end);
            }
            NodeData::FString(f) => {
                for part in &$($m)? f.parts {
                    if let FStringPart::Expr(id) = part {
                        $out.push(id);
                    }
                }
            }
            NodeData::StmtExpr(w)
            | NodeData::TypeExpr(w)
            | NodeData::ExprStmt(w)
            | NodeData::VolStmt(w) => $out.push(&$($m)? w.inner),
            NodeData::MutTy(t)
            | NodeData::PtrTy(t)
            | NodeData::VectorTy(t)
            | NodeData::SetTy(t)
            | NodeData::OptionalTy(t) => $out.push(&$($m)? t.item),
            NodeData::EnumTy(e) => $out.push(&$($m)? e.member),
            NodeData::StructTy(s) => {
                for field in &$($m)? s.fields {
                    $out.push(&$($m)? field.ty);
                }
            }
            NodeData::ArrayTy(a) => {
                $out.push(&$($m)? a.item);
                $out.push(&$($m)? a.size);
            }
            NodeData::MapTy(m) => {
                $out.push(&$($m)? m.key);
                $out.push(&$($m)? m.value);
            }
            NodeData::FnTy(f) => {
                for param in &$($m)? f.params {
                    $out.push(&$($m)? param.ty);
                    $out.push(&$($m)? param.default);
                }
                $out.push(&$($m)? f.ret);
            }
            NodeData::Typedef(t) => $out.push(&$($m)? t.ty),
            NodeData::FnDecl(f) => $out.push(&$($m)? f.ty),
            NodeData::Fn(f) => {
                $out.push(&$($m)? f.ty);
                $out.push(&$($m)? f.body);
                $out.push(&$($m)? f.precond);
                $out.push(&$($m)? f.postcond);
            }
            NodeData::Struct(c) | NodeData::Region(c) | NodeData::Group(c) | NodeData::Union(c) => {
                for id in &$($m)? c.fields {
                    $out.push(id);
                }
                for id in &$($m)? c.methods {
                    $out.push(id);
                }
                for id in &$($m)? c.static_methods {
                    $out.push(id);
                }
            }
            NodeData::Enum(e) => {
                $out.push(&$($m)? e.member);
                for item in &$($m)? e.items {
                    $out.push(&$($m)? item.value);
                }
            }
            NodeData::Subsystem(s) => $out.push(&$($m)? s.body),
            NodeData::Export(e) => $out.push(&$($m)? e.body),
            NodeData::CompositeField(f) => {
                $out.push(&$($m)? f.ty);
                $out.push(&$($m)? f.value);
            }
            NodeData::Const(l) | NodeData::Var(l) | NodeData::Let(l) => {
                $out.push(&$($m)? l.ty);
                $out.push(&$($m)? l.value);
            }
            NodeData::InlineAsm(a) => {
                for op in &$($m)? a.outputs {
                    $out.push(&$($m)? op.value);
                }
                for op in &$($m)? a.inputs {
                    $out.push(&$($m)? op.value);
                }
            }
            NodeData::Return(r) => $out.push(&$($m)? r.value),
            NodeData::RetIf(r) | NodeData::RetZ(r) => {
                $out.push(&$($m)? r.cond);
                $out.push(&$($m)? r.value);
            }
            NodeData::RetV(r) => $out.push(&$($m)? r.cond),
            NodeData::If(i) => {
                $out.push(&$($m)? i.cond);
                $out.push(&$($m)? i.then);
                $out.push(&$($m)? i.otherwise);
            }
            NodeData::While(w) => {
                $out.push(&$($m)? w.cond);
                $out.push(&$($m)? w.body);
            }
            NodeData::For(f) => {
                $out.push(&$($m)? f.init);
                $out.push(&$($m)? f.cond);
                $out.push(&$($m)? f.step);
                $out.push(&$($m)? f.body);
            }
            NodeData::Form(f) => {
                $out.push(&$($m)? f.max_jobs);
                $out.push(&$($m)? f.iter);
                $out.push(&$($m)? f.body);
            }
            NodeData::Foreach(f) => {
                $out.push(&$($m)? f.iter);
                $out.push(&$($m)? f.body);
            }
            NodeData::Case(c) => {
                $out.push(&$($m)? c.cond);
                $out.push(&$($m)? c.body);
            }
            NodeData::Switch(s) => {
                $out.push(&$($m)? s.cond);
                for id in &$($m)? s.cases {
                    $out.push(id);
                }
                $out.push(&$($m)? s.default);
            }
        }
    };
}

/// Inline capacity for slot lists; covers every fixed-shape kind.
pub type Slots<T> = SmallVec<[T; 4]>;

impl NodeData {
    /// Every child slot, empty ones included, in declaration order.
    pub fn slots(&self) -> Slots<NodeId> {
        let mut refs: Slots<&NodeId> = SmallVec::new();
        collect_slots!(self, refs);
        refs.into_iter().copied().collect()
    }

    /// Mutable references to every child slot, in declaration order.
    pub fn slots_mut(&mut self) -> Slots<&mut NodeId> {
        let mut refs: Slots<&mut NodeId> = SmallVec::new();
        collect_slots!(self, refs, mut);
        refs
    }

    /// Occupied child slots, in declaration order.
    pub fn children(&self) -> Slots<NodeId> {
        let mut ids = self.slots();
        ids.retain(|id| id.is_valid());
        ids
    }

    /// Number of child slots.
    pub fn slot_count(&self) -> usize {
        self.slots().len()
    }
}

#[cfg(test)]
mod tests;
