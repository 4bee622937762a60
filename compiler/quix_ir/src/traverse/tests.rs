#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::node::expr::{Binary, List, Literal};
use crate::{Name, NodeData, Operator, Span};

fn int(arena: &mut NodeArena, raw: u32) -> NodeId {
    arena.alloc(
        NodeData::Int(Literal {
            value: Name::from_raw(raw),
        }),
        Span::DUMMY,
    )
}

fn bin(arena: &mut NodeArena, lhs: NodeId, rhs: NodeId) -> NodeId {
    arena.alloc(
        NodeData::Binary(Binary {
            op: Operator::Plus,
            lhs,
            rhs,
        }),
        Span::DUMMY,
    )
}

/// ```text
///        root(+)
///       /      \
///     l(+)      c
///    /   \
///   a     b
/// ```
struct Fixture {
    arena: NodeArena,
    root: NodeId,
    l: NodeId,
    a: NodeId,
    b: NodeId,
    c: NodeId,
}

fn fixture() -> Fixture {
    let mut arena = NodeArena::new();
    let a = int(&mut arena, 1);
    let b = int(&mut arena, 2);
    let c = int(&mut arena, 3);
    let l = bin(&mut arena, a, b);
    let root = bin(&mut arena, l, c);
    Fixture {
        arena,
        root,
        l,
        a,
        b,
        c,
    }
}

fn order_of(f: &mut Fixture, order: TraversalOrder) -> Vec<NodeId> {
    let mut seen = Vec::new();
    let mut root = f.root;
    let outcome = walk(&mut f.arena, &mut root, order, |ctx| {
        seen.push(ctx.node());
        IterOp::Proceed
    })
    .unwrap();
    assert_eq!(outcome, WalkOutcome::Completed);
    seen
}

#[test]
fn dfs_pre_visits_parent_first() {
    let mut f = fixture();
    let expected = vec![f.root, f.l, f.a, f.b, f.c];
    assert_eq!(order_of(&mut f, TraversalOrder::DfsPre), expected);
}

#[test]
fn dfs_post_visits_root_last() {
    let mut f = fixture();
    let expected = vec![f.a, f.b, f.l, f.c, f.root];
    assert_eq!(order_of(&mut f, TraversalOrder::DfsPost), expected);
}

#[test]
fn bfs_pre_visits_by_level() {
    let mut f = fixture();
    let expected = vec![f.root, f.l, f.c, f.a, f.b];
    assert_eq!(order_of(&mut f, TraversalOrder::BfsPre), expected);
}

#[test]
fn bfs_post_visits_deepest_level_first() {
    let mut f = fixture();
    let expected = vec![f.a, f.b, f.l, f.c, f.root];
    assert_eq!(order_of(&mut f, TraversalOrder::BfsPost), expected);
}

#[test]
fn children_order_skips_root_and_grandchildren() {
    let mut f = fixture();
    let expected = vec![f.l, f.c];
    assert_eq!(order_of(&mut f, TraversalOrder::Children), expected);
}

#[test]
fn root_has_no_parent() {
    let mut f = fixture();
    let mut parents = Vec::new();
    let mut root = f.root;
    walk(&mut f.arena, &mut root, TraversalOrder::DfsPre, |ctx| {
        parents.push((ctx.node(), ctx.parent()));
        IterOp::Proceed
    })
    .unwrap();
    assert_eq!(parents[0], (f.root, None));
    assert_eq!(parents[1], (f.l, Some(f.root)));
    assert_eq!(parents[2], (f.a, Some(f.l)));
}

#[test]
fn abort_on_first_callback_stops_the_walk() {
    for order in [
        TraversalOrder::DfsPre,
        TraversalOrder::DfsPost,
        TraversalOrder::BfsPre,
        TraversalOrder::BfsPost,
        TraversalOrder::Children,
    ] {
        let mut f = fixture();
        let mut calls = 0;
        let mut root = f.root;
        let outcome = walk(&mut f.arena, &mut root, order, |_| {
            calls += 1;
            IterOp::Abort
        })
        .unwrap();
        assert_eq!(outcome, WalkOutcome::Aborted, "{order:?}");
        assert_eq!(calls, 1, "{order:?}");
    }
}

#[test]
fn skip_children_prunes_pre_order() {
    let mut f = fixture();
    let l = f.l;
    let mut seen = Vec::new();
    let mut root = f.root;
    walk(&mut f.arena, &mut root, TraversalOrder::DfsPre, |ctx| {
        seen.push(ctx.node());
        if ctx.node() == l {
            IterOp::SkipChildren
        } else {
            IterOp::Proceed
        }
    })
    .unwrap();
    assert_eq!(seen, vec![f.root, f.l, f.c]);
}

#[test]
fn skip_children_is_rejected_in_post_order() {
    for order in [TraversalOrder::DfsPost, TraversalOrder::BfsPost] {
        let mut f = fixture();
        let mut root = f.root;
        let err = walk(&mut f.arena, &mut root, order, |_| IterOp::SkipChildren).unwrap_err();
        assert!(matches!(err, WalkError::SkipChildrenInPostOrder { .. }));
    }
}

#[test]
fn replace_rewrites_slot_and_descends_into_new_node() {
    let mut f = fixture();
    let (a, b, l) = (f.a, f.b, f.l);
    let mut seen = Vec::new();
    let mut root = f.root;
    walk(&mut f.arena, &mut root, TraversalOrder::DfsPre, |ctx| {
        seen.push(ctx.node());
        if ctx.node() == f.c {
            // c := (a + b), a fresh node sharing children with l
            let fresh = bin(ctx.arena_mut(), b, a);
            ctx.replace(fresh);
        }
        IterOp::Proceed
    })
    .unwrap();

    let rewritten = f.arena.children(f.root)[1];
    assert_ne!(rewritten, f.c);
    assert_eq!(f.arena.kind(rewritten), NodeKind::Binary);
    assert_eq!(f.arena.children(rewritten).as_slice(), &[b, a]);
    // a and b were already visited under l.
    assert_eq!(seen, vec![f.root, l, a, b, f.c]);
}

#[test]
fn replacing_root_updates_root_slot() {
    let mut f = fixture();
    let mut root = f.root;
    let mut replacement = NodeId::INVALID;
    walk(&mut f.arena, &mut root, TraversalOrder::DfsPost, |ctx| {
        if ctx.parent().is_none() {
            replacement = ctx.arena_mut().alloc(NodeData::Null, Span::DUMMY);
            ctx.replace(replacement);
        }
        IterOp::Proceed
    })
    .unwrap();
    assert_eq!(root, replacement);
    assert_eq!(f.arena.kind(root), NodeKind::Null);
}

#[test]
fn cycles_are_visited_once() {
    let mut f = fixture();
    // Point a slot of l back at the root.
    f.arena.set_child(f.l, 1, f.root);
    for order in [
        TraversalOrder::DfsPre,
        TraversalOrder::DfsPost,
        TraversalOrder::BfsPre,
        TraversalOrder::BfsPost,
    ] {
        let seen = order_of(&mut f, order);
        assert_eq!(seen.len(), 4, "{order:?}");
    }
}

#[test]
fn empty_slots_are_skipped() {
    let mut f = fixture();
    f.arena.set_child(f.root, 1, NodeId::INVALID);
    let expected = vec![f.root, f.l, f.a, f.b];
    assert_eq!(order_of(&mut f, TraversalOrder::DfsPre), expected);
}

#[test]
fn dangling_slots_end_the_walk() {
    let ghost = NodeId::new(99);
    for order in [
        TraversalOrder::DfsPre,
        TraversalOrder::DfsPost,
        TraversalOrder::BfsPre,
        TraversalOrder::BfsPost,
        TraversalOrder::Children,
    ] {
        let mut f = fixture();
        f.arena.set_child(f.root, 1, ghost);
        let mut root = f.root;
        let err = walk(&mut f.arena, &mut root, order, |_| IterOp::Proceed).unwrap_err();
        assert_eq!(err, WalkError::Dangling { node: ghost }, "{order:?}");
    }

    let mut arena = NodeArena::new();
    let mut root = ghost;
    let err = walk(&mut arena, &mut root, TraversalOrder::DfsPre, |_| IterOp::Proceed).unwrap_err();
    assert_eq!(err, WalkError::Dangling { node: ghost });
}

#[test]
fn dangling_replacement_is_refused() {
    let mut f = fixture();
    let ghost = NodeId::new(99);
    let mut root = f.root;
    let err = walk(&mut f.arena, &mut root, TraversalOrder::DfsPre, |ctx| {
        if ctx.node() == f.c {
            ctx.replace(ghost);
        }
        IterOp::Proceed
    })
    .unwrap_err();
    assert_eq!(err, WalkError::Dangling { node: ghost });
    assert_eq!(f.arena.children(f.root)[1], f.c);
}

#[test]
fn comparator_reorders_children() {
    let mut f = fixture();
    let reverse = |_: &NodeArena, x: &ChildRef, y: &ChildRef| y.slot.cmp(&x.slot);
    let options = WalkOptions {
        comparator: Some(&reverse),
    };
    let mut seen = Vec::new();
    let mut root = f.root;
    walk_with(
        &mut f.arena,
        &mut root,
        TraversalOrder::DfsPre,
        options,
        |ctx| {
            seen.push(ctx.node());
            IterOp::Proceed
        },
    )
    .unwrap();
    assert_eq!(seen, vec![f.root, f.c, f.l, f.b, f.a]);
}

#[test]
fn parallel_children_visit_all() {
    let f = fixture();
    let seen = parking_lot::Mutex::new(Vec::new());
    let outcome = for_each_child_par(&f.arena, f.root, |parent, child| {
        assert_eq!(parent, f.root);
        seen.lock().push(child);
        IterOp::Proceed
    });
    assert_eq!(outcome, WalkOutcome::Completed);
    let mut seen = seen.into_inner();
    seen.sort();
    assert_eq!(seen, vec![f.c, f.l]);
}

#[test]
fn parallel_children_report_abort() {
    let f = fixture();
    let outcome = for_each_child_par(&f.arena, f.root, |_, _| IterOp::Abort);
    assert_eq!(outcome, WalkOutcome::Aborted);
}

/// Tree of `Block` nodes; node `i > 0` hangs under `parents[i - 1] % i`.
fn block_tree(parents: &[usize]) -> (NodeArena, NodeId) {
    let mut arena = NodeArena::new();
    let n = parents.len() + 1;
    let ids: Vec<NodeId> = (0..n)
        .map(|_| arena.alloc(NodeData::Block(List::default()), Span::DUMMY))
        .collect();
    for (i, &p) in parents.iter().enumerate() {
        let child = i + 1;
        let parent = p % child;
        if let NodeData::Block(list) = arena.get_mut(ids[parent]) {
            list.items.push(ids[child]);
        }
    }
    (arena, ids[0])
}

proptest! {
    #[test]
    fn dfs_pre_and_post_visit_equal_sets(parents in prop::collection::vec(any::<usize>(), 0..64)) {
        let (mut arena, root) = block_tree(&parents);
        let mut pre = Vec::new();
        let mut post = Vec::new();

        let mut r = root;
        walk(&mut arena, &mut r, TraversalOrder::DfsPre, |ctx| {
            pre.push(ctx.node());
            IterOp::Proceed
        }).unwrap();
        let mut r = root;
        walk(&mut arena, &mut r, TraversalOrder::DfsPost, |ctx| {
            post.push(ctx.node());
            IterOp::Proceed
        }).unwrap();

        prop_assert_eq!(pre.len(), parents.len() + 1);
        prop_assert_eq!(pre[0], root);
        prop_assert_eq!(*post.last().unwrap(), root);
        pre.sort();
        post.sort();
        prop_assert_eq!(pre, post);
    }
}
