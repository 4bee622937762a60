use super::*;
use pretty_assertions::assert_eq;

use crate::node::expr::CallArg;
use crate::node::ty::FnParam;
use crate::Name;

fn id(n: u32) -> NodeId {
    NodeId::new(n)
}

#[test]
fn kind_tables_are_complete() {
    assert_eq!(NodeKind::COUNT, 85);

    let mut names: Vec<&str> = NodeKind::ALL.iter().map(|k| k.name()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), NodeKind::COUNT, "kind names must be unique");

    for &kind in NodeKind::ALL {
        assert!(kind.byte_size() >= HEADER_SIZE, "{kind}");
        assert!(!kind.name().is_empty());
    }
}

#[test]
fn category_counts() {
    let count = |cat| {
        NodeKind::ALL
            .iter()
            .filter(|k| k.category() == cat)
            .count()
    };
    assert_eq!(count(NodeCategory::Expr), 23);
    assert_eq!(count(NodeCategory::Type), 31);
    assert_eq!(count(NodeCategory::Decl), 11);
    assert_eq!(count(NodeCategory::Stmt), 20);
}

#[test]
fn data_reports_its_kind() {
    assert_eq!(NodeData::Null.kind(), NodeKind::Null);
    assert_eq!(NodeData::Bool(true).kind(), NodeKind::Bool);
    assert_eq!(
        NodeData::Block(List { items: vec![] }).kind(),
        NodeKind::Block
    );
    assert_eq!(
        NodeData::SeqPoint(List { items: vec![] }).kind(),
        NodeKind::SeqPoint
    );
}

#[test]
fn slots_follow_declaration_order() {
    let call = NodeData::Call(Call {
        func: id(0),
        args: vec![
            CallArg {
                name: Name::from_raw(1),
                value: id(1),
            },
            CallArg {
                name: Name::from_raw(2),
                value: id(2),
            },
        ],
    });
    assert_eq!(call.slots().as_slice(), &[id(0), id(1), id(2)]);

    let fn_ty = NodeData::FnTy(FnTy {
        params: vec![FnParam {
            name: Name::from_raw(1),
            ty: id(4),
            default: NodeId::INVALID,
        }],
        ret: id(5),
        props: ty::FnProps::default(),
    });
    assert_eq!(fn_ty.slots().as_slice(), &[id(4), NodeId::INVALID, id(5)]);
    assert_eq!(fn_ty.children().as_slice(), &[id(4), id(5)]);
    assert_eq!(fn_ty.slot_count(), 3);
}

#[test]
fn slots_mut_rewrites_in_place() {
    let mut data = NodeData::Binary(Binary {
        op: crate::Operator::Plus,
        lhs: id(1),
        rhs: id(2),
    });
    for slot in data.slots_mut() {
        *slot = NodeId::new(slot.raw() + 10);
    }
    assert_eq!(data.slots().as_slice(), &[id(11), id(12)]);
}

#[test]
fn leaves_have_no_slots() {
    for data in [
        NodeData::Null,
        NodeData::Undef,
        NodeData::U8,
        NodeData::Break,
        NodeData::Char('x'),
    ] {
        assert!(data.slots().is_empty(), "{:?}", data.kind());
    }
}

#[test]
fn invalid_id_debug() {
    assert_eq!(format!("{:?}", NodeId::INVALID), "NodeId::INVALID");
    assert_eq!(format!("{:?}", NodeId::new(3)), "NodeId(3)");
    assert_eq!(NodeId::default(), NodeId::INVALID);
}
