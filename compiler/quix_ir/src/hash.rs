//! Content hash of a subtree.
//!
//! Produces location-free, arena-independent fingerprints. Two subtrees with
//! the same shape and content hash equal regardless of where they were
//! allocated or which interner handles their strings received.
//!
//! # Strategy
//!
//! Pre-order walk. For each node:
//! 1. Hash `discriminant(kind)`
//! 2. Hash non-child payload data (strings by text, operators, flags)
//! 3. Hash the slot count, then descend into each slot
//!
//! Empty slots hash a sentinel. A node reached a second time (shared or
//! cyclic) hashes a back-reference marker instead of its content again.

use std::hash::{Hash, Hasher};
use std::mem;

use rustc_hash::{FxHashSet, FxHasher};

use crate::node::expr::FStringPart;
use crate::{Name, NodeArena, NodeData, NodeId, StringLookup};

const EMPTY_SLOT: u32 = u32::MAX;
const BACK_REF: u32 = u32::MAX - 1;

/// Hash the subtree rooted at `root`.
pub fn hash_subtree(arena: &NodeArena, strings: &dyn StringLookup, root: NodeId) -> u64 {
    let mut state = FxHasher::default();
    let mut visited = FxHashSet::default();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        if !id.is_valid() {
            EMPTY_SLOT.hash(&mut state);
            continue;
        }
        if !visited.insert(id) {
            BACK_REF.hash(&mut state);
            continue;
        }

        let data = arena.get(id);
        mem::discriminant(data).hash(&mut state);
        arena.flags(id).bits().hash(&mut state);
        hash_payload(data, strings, &mut state);

        let slots = data.slots();
        slots.len().hash(&mut state);
        stack.extend(slots.into_iter().rev());
    }

    state.finish()
}

fn hash_name(strings: &dyn StringLookup, name: Name, state: &mut FxHasher) {
    strings.lookup(name).hash(state);
}

fn hash_names(strings: &dyn StringLookup, names: &[Name], state: &mut FxHasher) {
    names.len().hash(state);
    for &name in names {
        hash_name(strings, name, state);
    }
}

/// Hash the non-child data of a payload.
fn hash_payload(data: &NodeData, strings: &dyn StringLookup, state: &mut FxHasher) {
    match data {
        NodeData::Binary(b) => b.op.hash(state),
        NodeData::Unary(u) => u.op.hash(state),
        NodeData::PostUnary(u) => u.op.hash(state),
        NodeData::Int(l) | NodeData::Float(l) | NodeData::Str(l) => {
            hash_name(strings, l.value, state);
        }
        NodeData::Char(c) => c.hash(state),
        NodeData::Bool(b) => b.hash(state),
        NodeData::Call(c) => {
            for arg in &c.args {
                hash_name(strings, arg.name, state);
            }
        }
        NodeData::TemplCall(c) => {
            c.template_args.len().hash(state);
            for arg in c.template_args.iter().chain(&c.args) {
                hash_name(strings, arg.name, state);
            }
        }
        NodeData::Field(f) => hash_name(strings, f.field, state),
        NodeData::FString(f) => {
            for part in &f.parts {
                match part {
                    FStringPart::Text(text) => {
                        0u8.hash(state);
                        hash_name(strings, *text, state);
                    }
                    FStringPart::Expr(_) => 1u8.hash(state),
                }
            }
        }
        NodeData::Ident(n) | NodeData::OpaqueTy(n) | NodeData::UnresTy(n) => {
            hash_name(strings, n.name, state);
        }
        NodeData::EnumTy(e) => hash_name(strings, e.name, state),
        NodeData::StructTy(s) => {
            for field in &s.fields {
                hash_name(strings, field.name, state);
            }
        }
        NodeData::FnTy(f) => {
            f.props.hash(state);
            for param in &f.params {
                hash_name(strings, param.name, state);
            }
        }
        NodeData::Typedef(t) => hash_name(strings, t.name, state),
        NodeData::FnDecl(f) => {
            hash_name(strings, f.name, state);
            f.visibility.hash(state);
        }
        NodeData::Fn(f) => {
            hash_name(strings, f.name, state);
            f.visibility.hash(state);
            for cap in &f.captures {
                hash_name(strings, cap.name, state);
                cap.by_ref.hash(state);
            }
        }
        NodeData::Struct(c) | NodeData::Region(c) | NodeData::Group(c) | NodeData::Union(c) => {
            hash_name(strings, c.name, state);
            c.visibility.hash(state);
            c.fields.len().hash(state);
            c.methods.len().hash(state);
            c.static_methods.len().hash(state);
            hash_names(strings, &c.tags, state);
        }
        NodeData::Enum(e) => {
            hash_name(strings, e.name, state);
            for item in &e.items {
                hash_name(strings, item.name, state);
            }
        }
        NodeData::Subsystem(s) => {
            hash_name(strings, s.name, state);
            hash_names(strings, &s.deps, state);
            hash_names(strings, &s.tags, state);
        }
        NodeData::Export(e) => hash_name(strings, e.abi, state),
        NodeData::CompositeField(f) => {
            hash_name(strings, f.name, state);
            f.visibility.hash(state);
        }
        NodeData::Const(l) | NodeData::Var(l) | NodeData::Let(l) => {
            hash_name(strings, l.name, state);
        }
        NodeData::InlineAsm(a) => {
            hash_name(strings, a.code, state);
            a.outputs.len().hash(state);
            for op in a.outputs.iter().chain(&a.inputs) {
                hash_name(strings, op.constraint, state);
            }
            hash_names(strings, &a.clobbers, state);
        }
        NodeData::Form(f) => {
            hash_name(strings, f.index, state);
            hash_name(strings, f.value, state);
        }
        NodeData::Foreach(f) => {
            hash_name(strings, f.index, state);
            hash_name(strings, f.value, state);
        }
        NodeData::Switch(s) => s.cases.len().hash(state),
        // Shape alone: the discriminant and slots say everything.
        NodeData::Ternary(_)
        | NodeData::Null
        | NodeData::Undef
        | NodeData::List(_)
        | NodeData::Assoc(_)
        | NodeData::Index(_)
        | NodeData::Slice(_)
        | NodeData::SeqPoint(_)
        | NodeData::StmtExpr(_)
        | NodeData::TypeExpr(_)
        | NodeData::MutTy(_)
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
        | NodeData::PtrTy(_)
        | NodeData::StringTy
        | NodeData::GroupTy(_)
        | NodeData::RegionTy(_)
        | NodeData::UnionTy(_)
        | NodeData::ArrayTy(_)
        | NodeData::VectorTy(_)
        | NodeData::MapTy(_)
        | NodeData::TupleTy(_)
        | NodeData::SetTy(_)
        | NodeData::OptionalTy(_)
        | NodeData::Block(_)
        | NodeData::Return(_)
        | NodeData::RetIf(_)
        | NodeData::RetZ(_)
        | NodeData::RetV(_)
        | NodeData::Break
        | NodeData::Continue
        | NodeData::If(_)
        | NodeData::While(_)
        | NodeData::For(_)
        | NodeData::Case(_)
        | NodeData::ExprStmt(_)
        | NodeData::VolStmt(_) => {}
    }
}

#[cfg(test)]
mod tests;
