//! Lowered IR.
//!
//! Smaller than the parse tree: statements and expressions share one node
//! type, booleans and characters are integers, and the derived statements
//! (`retif`, `retz`, `retv`, ternaries) are plain `If`s. Absent branches
//! and return values are an explicit [`IrKind::Void`] rather than an empty
//! slot.
//!
//! Nodes live in an [`IrArena`] with the same layout as the parse tree's
//! arena: parallel kind, span and flag arrays indexed by [`IrId`].

use std::fmt;

use bitflags::bitflags;
use quix_ir::{Name, SharedInterner, Span};
use smallvec::SmallVec;

mod print;

pub use print::render;

/// Index into an [`IrArena`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct IrId(u32);

impl IrId {
    /// Absent optional part: an untyped literal, an inferred local type, a
    /// function without a body, an open slice bound.
    pub const INVALID: IrId = IrId(u32::MAX);

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

impl fmt::Debug for IrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "IrId({})", self.0)
        } else {
            write!(f, "IrId::INVALID")
        }
    }
}

impl Default for IrId {
    fn default() -> Self {
        Self::INVALID
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct IrFlags: u8 {
        const CONST = 1;
        const VOLATILE = 1 << 1;
    }
}

/// Operators that survive lowering. Compound assignments, `^^`, `is`, `in`,
/// `sizeof` and `typeof` are rewritten in terms of these or of calls.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IrOp {
    Plus,
    Minus,
    Times,
    Slash,
    Percent,
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    LogicAnd,
    LogicOr,
    LogicNot,
    LShift,
    RShift,
    Rotr,
    Rotl,
    Inc,
    Dec,
    Set,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    CastAs,
    BitcastAs,
    Alignof,
    Bitsizeof,
    Offsetof,
}

impl IrOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            IrOp::Plus => "+",
            IrOp::Minus => "-",
            IrOp::Times => "*",
            IrOp::Slash => "/",
            IrOp::Percent => "%",
            IrOp::BitAnd => "&",
            IrOp::BitOr => "|",
            IrOp::BitXor => "^",
            IrOp::BitNot => "~",
            IrOp::LogicAnd => "&&",
            IrOp::LogicOr => "||",
            IrOp::LogicNot => "!",
            IrOp::LShift => "<<",
            IrOp::RShift => ">>",
            IrOp::Rotr => ">>>",
            IrOp::Rotl => "<<<",
            IrOp::Inc => "++",
            IrOp::Dec => "--",
            IrOp::Set => "=",
            IrOp::Lt => "<",
            IrOp::Gt => ">",
            IrOp::Le => "<=",
            IrOp::Ge => ">=",
            IrOp::Eq => "==",
            IrOp::Ne => "!=",
            IrOp::CastAs => "as",
            IrOp::BitcastAs => "bitcast_as",
            IrOp::Alignof => "alignof",
            IrOp::Bitsizeof => "bitsizeof",
            IrOp::Offsetof => "offsetof",
        }
    }
}

impl fmt::Display for IrOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named call argument or assembly operand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrArg {
    pub name: Name,
    pub value: IrId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrParam {
    pub name: Name,
    pub ty: IrId,
    /// `INVALID` when the parameter has no default.
    pub default: IrId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IrKind {
    // Values
    /// Integer literal, by text. `ty` is set for lowered booleans,
    /// characters and `null`.
    Int {
        value: Name,
        ty: IrId,
    },
    Float(Name),
    Str(Name),
    Undef,
    Ident(Name),
    Binary {
        op: IrOp,
        lhs: IrId,
        rhs: IrId,
    },
    Unary {
        op: IrOp,
        rhs: IrId,
    },
    PostUnary {
        op: IrOp,
        lhs: IrId,
    },
    Call {
        func: IrId,
        args: Vec<IrArg>,
    },
    List(Vec<IrId>),
    Field {
        base: IrId,
        field: Name,
    },
    Index {
        base: IrId,
        index: IrId,
    },
    Slice {
        base: IrId,
        start: IrId,
        end: IrId,
    },
    Seq(Vec<IrId>),

    // Control
    If {
        cond: IrId,
        then: IrId,
        otherwise: IrId,
    },
    While {
        cond: IrId,
        body: IrId,
    },
    For {
        init: IrId,
        cond: IrId,
        step: IrId,
        body: IrId,
    },
    Form {
        index: Name,
        value: Name,
        max_jobs: IrId,
        iter: IrId,
        body: IrId,
    },
    Foreach {
        index: Name,
        value: Name,
        iter: IrId,
        body: IrId,
    },
    Case {
        cond: IrId,
        body: IrId,
    },
    Switch {
        cond: IrId,
        cases: Vec<IrId>,
        default: IrId,
    },
    Ret(IrId),
    Brk,
    Cont,
    Asm {
        code: Name,
        outputs: Vec<IrArg>,
        inputs: Vec<IrArg>,
        clobbers: Vec<Name>,
    },

    // Declarations
    /// `let`, `var` and `const` alike; constants carry [`IrFlags::CONST`].
    Local {
        name: Name,
        ty: IrId,
        value: IrId,
    },
    Fn {
        name: Name,
        params: Vec<IrParam>,
        ret: IrId,
        variadic: bool,
        /// `INVALID` for a declaration.
        body: IrId,
    },
    Typedef {
        name: Name,
        ty: IrId,
    },
    Extern {
        abi: Name,
        body: IrId,
    },

    // Types
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
    /// The void type, and the "no value" placeholder.
    Void,
    Ptr(IrId),
    Mut(IrId),
    Opaque(Name),
    StringTy,
    /// Field types by position. `packed` for regions.
    Struct {
        fields: Vec<IrId>,
        packed: bool,
    },
    Union(Vec<IrId>),
    Array {
        item: IrId,
        size: IrId,
    },
    ListTy(IrId),
    MapTy {
        key: IrId,
        value: IrId,
    },
    SetTy(IrId),
    OptionalTy(IrId),
    FnTy {
        params: Vec<IrId>,
        ret: IrId,
        variadic: bool,
    },
    /// A type known only by name, left for resolution.
    Named(Name),
}

impl IrKind {
    /// Occupied child slots, in declaration order.
    pub fn children(&self) -> SmallVec<[IrId; 4]> {
        let mut out = SmallVec::new();
        let mut push = |id: IrId| {
            if id.is_valid() {
                out.push(id);
            }
        };
        match self {
            IrKind::Float(_)
            | IrKind::Str(_)
            | IrKind::Undef
            | IrKind::Ident(_)
            | IrKind::Brk
            | IrKind::Cont
            | IrKind::U1
            | IrKind::U8
            | IrKind::U16
            | IrKind::U32
            | IrKind::U64
            | IrKind::U128
            | IrKind::I8
            | IrKind::I16
            | IrKind::I32
            | IrKind::I64
            | IrKind::I128
            | IrKind::F32
            | IrKind::F64
            | IrKind::Void
            | IrKind::Opaque(_)
            | IrKind::StringTy
            | IrKind::Named(_) => {}
            IrKind::Int { ty, .. } => push(*ty),
            IrKind::Binary { lhs, rhs, .. } => {
                push(*lhs);
                push(*rhs);
            }
            IrKind::Unary { rhs: inner, .. }
            | IrKind::PostUnary { lhs: inner, .. }
            | IrKind::Field { base: inner, .. }
            | IrKind::Ret(inner)
            | IrKind::Ptr(inner)
            | IrKind::Mut(inner)
            | IrKind::ListTy(inner)
            | IrKind::SetTy(inner)
            | IrKind::OptionalTy(inner) => push(*inner),
            IrKind::Call { func, args } => {
                push(*func);
                args.iter().for_each(|a| push(a.value));
            }
            IrKind::List(items)
            | IrKind::Seq(items)
            | IrKind::Union(items)
            | IrKind::Struct { fields: items, .. } => items.iter().copied().for_each(&mut push),
            IrKind::Index { base, index } => {
                push(*base);
                push(*index);
            }
            IrKind::Slice { base, start, end } => {
                push(*base);
                push(*start);
                push(*end);
            }
            IrKind::If {
                cond,
                then,
                otherwise,
            } => {
                push(*cond);
                push(*then);
                push(*otherwise);
            }
            IrKind::While { cond, body } | IrKind::Case { cond, body } => {
                push(*cond);
                push(*body);
            }
            IrKind::For {
                init,
                cond,
                step,
                body,
            } => {
                push(*init);
                push(*cond);
                push(*step);
                push(*body);
            }
            IrKind::Form {
                max_jobs,
                iter,
                body,
                ..
            } => {
                push(*max_jobs);
                push(*iter);
                push(*body);
            }
            IrKind::Foreach { iter, body, .. } => {
                push(*iter);
                push(*body);
            }
            IrKind::Switch {
                cond,
                cases,
                default,
            } => {
                push(*cond);
                cases.iter().copied().for_each(&mut push);
                push(*default);
            }
            IrKind::Asm {
                outputs, inputs, ..
            } => outputs
                .iter()
                .chain(inputs)
                .for_each(|a| push(a.value)),
            IrKind::Local { ty, value, .. } => {
                push(*ty);
                push(*value);
            }
            IrKind::Fn {
                params, ret, body, ..
            } => {
                for p in params {
                    push(p.ty);
                    push(p.default);
                }
                push(*ret);
                push(*body);
            }
            IrKind::Typedef { ty: inner, .. } | IrKind::Extern { body: inner, .. } => push(*inner),
            IrKind::Array { item, size } => {
                push(*item);
                push(*size);
            }
            IrKind::MapTy { key, value } => {
                push(*key);
                push(*value);
            }
            IrKind::FnTy { params, ret, .. } => {
                params.iter().copied().for_each(&mut push);
                push(*ret);
            }
        }
        out
    }
}

#[cold]
#[inline(never)]
fn arena_full() -> ! {
    panic!("IR arena exceeded {} nodes", u32::MAX - 1)
}

/// Append-only IR store.
#[derive(Clone, Debug, Default)]
pub struct IrArena {
    kinds: Vec<IrKind>,
    spans: Vec<Span>,
    flags: Vec<IrFlags>,
}

impl IrArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize) -> Self {
        IrArena {
            kinds: Vec::with_capacity(nodes),
            spans: Vec::with_capacity(nodes),
            flags: Vec::with_capacity(nodes),
        }
    }

    /// # Panics
    /// Panics past `u32::MAX - 1` nodes.
    pub fn push(&mut self, kind: IrKind, span: Span) -> IrId {
        let raw = match u32::try_from(self.kinds.len()) {
            Ok(raw) if raw != u32::MAX => raw,
            _ => arena_full(),
        };
        self.kinds.push(kind);
        self.spans.push(span);
        self.flags.push(IrFlags::empty());
        IrId(raw)
    }

    pub fn kind(&self, id: IrId) -> &IrKind {
        &self.kinds[id.index()]
    }

    pub fn kind_mut(&mut self, id: IrId) -> &mut IrKind {
        &mut self.kinds[id.index()]
    }

    pub fn span(&self, id: IrId) -> Span {
        self.spans[id.index()]
    }

    pub fn flags(&self, id: IrId) -> IrFlags {
        self.flags[id.index()]
    }

    pub fn set_flag(&mut self, id: IrId, flag: IrFlags, on: bool) {
        self.flags[id.index()].set(flag, on);
    }

    pub fn contains(&self, id: IrId) -> bool {
        id.index() < self.kinds.len()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = IrId> + '_ {
        (0..self.kinds.len()).map(|i| IrId(i as u32))
    }
}

/// Output of lowering one module.
#[derive(Clone, Debug)]
pub struct IrModule {
    pub arena: IrArena,
    pub root: IrId,
    /// Shared with the parsed module; lowering interns the names it makes.
    pub strings: SharedInterner,
}

impl IrModule {
    /// Whether the root and every child reference resolve.
    pub fn validate(&self) -> bool {
        self.arena.contains(self.root)
            && self.arena.ids().all(|id| {
                self.arena
                    .kind(id)
                    .children()
                    .iter()
                    .all(|&child| self.arena.contains(child))
            })
    }

    /// One-line text form of the whole module.
    pub fn render(&self) -> String {
        render(&self.arena, &*self.strings, self.root)
    }
}

#[cfg(test)]
mod tests;
