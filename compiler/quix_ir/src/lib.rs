//! QUIX IR: the data every front-end pass shares.
//!
//! - [`Name`] handles from a shared [`StringInterner`]
//! - [`Location`] tags from a [`LocationTable`]
//! - [`Token`]s as produced by the lexer
//! - the node graph: [`NodeKind`], [`NodeData`] payloads, [`NodeArena`]
//! - [`traverse`]: multi-order walks with in-place rewrite
//! - [`hash_subtree`] and the [`serialize`] forms
//!
//! # Design
//!
//! - **Intern everything**: strings become `Name(u32)`, positions `Location(u32)`
//! - **Flatten everything**: children are `NodeId(u32)` slots, never boxes
//! - **Closed kinds**: every kind-dispatching function is an exhaustive
//!   `match`, so adding a kind fails to compile until each site handles it

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
mod hash;
mod interner;
mod location;
mod name;
pub mod node;
pub mod serialize;
mod source;
mod token;
pub mod traverse;

pub use arena::{ArenaGuard, NodeArena};
pub use hash::hash_subtree;
pub use interner::{InternError, SharedInterner, StringInterner, StringLookup};
pub use location::{Location, LocationError, LocationTable, Span, MAX_COL, MAX_ROW};
pub use name::Name;
pub use node::{NodeCategory, NodeData, NodeFlags, NodeId, NodeKind, Slots};
pub use serialize::{SerializeError, SexprOptions};
pub use source::SourceView;
pub use token::{Keyword, Operator, Punctor, Token, TokenKind};
pub use traverse::{
    for_each_child_par, walk, walk_with, IterOp, TraversalOrder, VisitCtx, WalkError,
    WalkOptions, WalkOutcome,
};

static_assert_size!(Name, 4);
static_assert_size!(NodeId, 4);
static_assert_size!(Location, 4);
static_assert_size!(Span, 8);
