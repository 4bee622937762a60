use super::*;
use pretty_assertions::assert_eq;

use crate::node::expr::{Binary, Literal};
use crate::{Name, Operator};

fn int(arena: &mut NodeArena, raw: u32) -> NodeId {
    arena.alloc(
        NodeData::Int(Literal {
            value: Name::from_raw(raw),
        }),
        Span::DUMMY,
    )
}

#[test]
fn alloc_hands_out_sequential_ids() {
    let mut arena = NodeArena::new();
    let a = int(&mut arena, 1);
    let b = int(&mut arena, 2);
    assert_eq!(a, NodeId::new(0));
    assert_eq!(b, NodeId::new(1));
    assert_eq!(arena.len(), 2);
    assert_eq!(arena.kind(b), NodeKind::Int);
    assert_eq!(arena.ids().collect::<Vec<_>>(), vec![a, b]);
}

#[test]
fn bytes_used_follows_kind_table() {
    let mut arena = NodeArena::new();
    let a = int(&mut arena, 1);
    let b = int(&mut arena, 2);
    arena.alloc(
        NodeData::Binary(Binary {
            op: Operator::Plus,
            lhs: a,
            rhs: b,
        }),
        Span::DUMMY,
    );
    let expected = 2 * NodeKind::Int.byte_size() + NodeKind::Binary.byte_size();
    assert_eq!(arena.bytes_used(), expected);
}

#[test]
fn set_child_keeps_shape() {
    let mut arena = NodeArena::new();
    let a = int(&mut arena, 1);
    let b = int(&mut arena, 2);
    let c = int(&mut arena, 3);
    let sum = arena.alloc(
        NodeData::Binary(Binary {
            op: Operator::Plus,
            lhs: a,
            rhs: b,
        }),
        Span::DUMMY,
    );

    assert_eq!(arena.set_child(sum, 1, c), Some(b));
    assert_eq!(arena.children(sum).as_slice(), &[a, c]);
    assert_eq!(arena.set_child(sum, 2, c), None);
    assert_eq!(arena.get(sum).slot_count(), 2);
}

#[test]
fn flags_toggle() {
    let mut arena = NodeArena::new();
    let a = int(&mut arena, 1);
    assert!(arena.flags(a).is_empty());
    arena.set_flag(a, NodeFlags::CONST, true);
    arena.set_flag(a, NodeFlags::UNSAFE, true);
    arena.set_flag(a, NodeFlags::CONST, false);
    assert_eq!(arena.flags(a), NodeFlags::UNSAFE);
}

#[test]
fn scoped_arena_restores_on_drop() {
    let mut arena = NodeArena::new();
    let outer = int(&mut arena, 1);
    {
        let mut nested = arena.scoped();
        assert!(nested.is_empty());
        int(&mut nested, 2);
        int(&mut nested, 3);
        assert_eq!(nested.len(), 2);
    }
    assert_eq!(arena.len(), 1);
    assert_eq!(arena.kind(outer), NodeKind::Int);
}

#[test]
fn scoped_arena_finish_returns_nested() {
    let mut arena = NodeArena::new();
    int(&mut arena, 1);
    let nested = {
        let mut guard = arena.scoped();
        int(&mut guard, 2);
        guard.finish()
    };
    assert_eq!(nested.len(), 1);
    assert_eq!(arena.len(), 1);
}

#[test]
fn scoped_arena_restores_on_error_path() {
    fn fails(arena: &mut NodeArena) -> Result<(), &'static str> {
        let mut guard = arena.scoped();
        int(&mut guard, 9);
        Err("nested parse failed")
    }

    let mut arena = NodeArena::new();
    int(&mut arena, 1);
    assert!(fails(&mut arena).is_err());
    assert_eq!(arena.len(), 1);
}

#[test]
fn try_get_rejects_invalid() {
    let arena = NodeArena::new();
    assert!(arena.try_get(NodeId::INVALID).is_none());
    assert!(!arena.contains(NodeId::new(0)));
}
