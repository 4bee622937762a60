use super::*;

use crate::node::expr::{Binary, Literal, Named};
use crate::{NodeFlags, Operator, Span, StringInterner};

fn ident(arena: &mut NodeArena, interner: &StringInterner, text: &str) -> NodeId {
    arena.alloc(
        NodeData::Ident(Named {
            name: interner.intern(text),
        }),
        Span::DUMMY,
    )
}

fn sum(arena: &mut NodeArena, interner: &StringInterner, lhs: &str, rhs: &str) -> NodeId {
    let lhs = ident(arena, interner, lhs);
    let rhs = ident(arena, interner, rhs);
    arena.alloc(
        NodeData::Binary(Binary {
            op: Operator::Plus,
            lhs,
            rhs,
        }),
        Span::DUMMY,
    )
}

#[test]
fn equal_content_hashes_equal_across_arenas_and_interners() {
    let i1 = StringInterner::new();
    let i2 = StringInterner::new();
    i2.intern("padding shifts every handle");

    let mut a1 = NodeArena::new();
    let mut a2 = NodeArena::new();
    a2.alloc(NodeData::Null, Span::DUMMY);

    let r1 = sum(&mut a1, &i1, "x", "y");
    let r2 = sum(&mut a2, &i2, "x", "y");
    assert_eq!(hash_subtree(&a1, &i1, r1), hash_subtree(&a2, &i2, r2));
}

#[test]
fn different_text_hashes_differently() {
    let interner = StringInterner::new();
    let mut arena = NodeArena::new();
    let a = sum(&mut arena, &interner, "x", "y");
    let b = sum(&mut arena, &interner, "x", "z");
    assert_ne!(
        hash_subtree(&arena, &interner, a),
        hash_subtree(&arena, &interner, b)
    );
}

#[test]
fn operand_order_matters() {
    let interner = StringInterner::new();
    let mut arena = NodeArena::new();
    let a = sum(&mut arena, &interner, "x", "y");
    let b = sum(&mut arena, &interner, "y", "x");
    assert_ne!(
        hash_subtree(&arena, &interner, a),
        hash_subtree(&arena, &interner, b)
    );
}

#[test]
fn flags_are_content() {
    let interner = StringInterner::new();
    let mut arena = NodeArena::new();
    let a = ident(&mut arena, &interner, "x");
    let b = ident(&mut arena, &interner, "x");
    assert_eq!(
        hash_subtree(&arena, &interner, a),
        hash_subtree(&arena, &interner, b)
    );
    arena.set_flag(b, NodeFlags::CONST, true);
    assert_ne!(
        hash_subtree(&arena, &interner, a),
        hash_subtree(&arena, &interner, b)
    );
}

#[test]
fn spans_are_not_content() {
    let interner = StringInterner::new();
    let mut arena = NodeArena::new();
    let value = interner.intern("42");
    let a = arena.alloc(NodeData::Int(Literal { value }), Span::DUMMY);
    let b = arena.alloc(
        NodeData::Int(Literal { value }),
        Span::new(
            crate::Location::from_raw(3),
            crate::Location::from_raw(4),
        ),
    );
    assert_eq!(
        hash_subtree(&arena, &interner, a),
        hash_subtree(&arena, &interner, b)
    );
}

#[test]
fn cyclic_graph_terminates() {
    let interner = StringInterner::new();
    let mut arena = NodeArena::new();
    let root = sum(&mut arena, &interner, "x", "y");
    arena.set_child(root, 1, root);
    let first = hash_subtree(&arena, &interner, root);
    assert_eq!(first, hash_subtree(&arena, &interner, root));
}

#[test]
fn invalid_root_hashes_sentinel() {
    let interner = StringInterner::new();
    let arena = NodeArena::new();
    let h = hash_subtree(&arena, &interner, NodeId::INVALID);
    assert_eq!(h, hash_subtree(&arena, &interner, NodeId::INVALID));
}
