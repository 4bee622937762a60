use pretty_assertions::assert_eq;

use quix_ir::{Span, StringInterner};

use super::*;

#[test]
fn ids() {
    assert!(!IrId::INVALID.is_valid());
    assert_eq!(IrId::default(), IrId::INVALID);
    assert_eq!(format!("{:?}", IrId::INVALID), "IrId::INVALID");

    let mut arena = IrArena::new();
    assert!(arena.is_empty());
    let a = arena.push(IrKind::Brk, Span::DUMMY);
    let b = arena.push(IrKind::Cont, Span::DUMMY);
    assert_eq!((a.raw(), b.index()), (0, 1));
    assert_eq!(format!("{b:?}"), "IrId(1)");
    assert_eq!(arena.ids().collect::<Vec<_>>(), [a, b]);
    assert!(arena.contains(b));
    assert!(!arena.contains(IrId::INVALID));
}

#[test]
fn children_skip_empty_slots() {
    let mut arena = IrArena::new();
    let base = arena.push(IrKind::Undef, Span::DUMMY);
    let end = arena.push(IrKind::Undef, Span::DUMMY);
    let slice = IrKind::Slice {
        base,
        start: IrId::INVALID,
        end,
    };
    assert_eq!(slice.children().as_slice(), [base, end]);

    let decl = IrKind::Fn {
        name: quix_ir::Name::EMPTY,
        params: vec![IrParam {
            name: quix_ir::Name::EMPTY,
            ty: base,
            default: IrId::INVALID,
        }],
        ret: end,
        variadic: false,
        body: IrId::INVALID,
    };
    assert_eq!(decl.children().as_slice(), [base, end]);
    assert!(IrKind::Int {
        value: quix_ir::Name::EMPTY,
        ty: IrId::INVALID
    }
    .children()
    .is_empty());
}

#[test]
fn flags() {
    let mut arena = IrArena::new();
    let id = arena.push(IrKind::Undef, Span::DUMMY);
    assert_eq!(arena.flags(id), IrFlags::empty());
    arena.set_flag(id, IrFlags::CONST, true);
    arena.set_flag(id, IrFlags::VOLATILE, true);
    arena.set_flag(id, IrFlags::CONST, false);
    assert_eq!(arena.flags(id), IrFlags::VOLATILE);
}

#[test]
fn operator_spelling() {
    assert_eq!(IrOp::CastAs.to_string(), "as");
    assert_eq!(IrOp::Rotl.as_str(), "<<<");
    assert_eq!(IrOp::Bitsizeof.to_string(), "bitsizeof");
}

fn module(arena: IrArena, root: IrId, strings: SharedInterner) -> IrModule {
    IrModule {
        arena,
        root,
        strings,
    }
}

#[test]
fn render_declarations() {
    let strings = StringInterner::shared();
    let mut arena = IrArena::new();
    let x = strings.intern("x");
    let i32_ty = arena.push(IrKind::I32, Span::DUMMY);
    let one = arena.push(
        IrKind::Int {
            value: strings.intern("1"),
            ty: IrId::INVALID,
        },
        Span::DUMMY,
    );
    let local = arena.push(
        IrKind::Local {
            name: x,
            ty: i32_ty,
            value: one,
        },
        Span::DUMMY,
    );
    arena.set_flag(local, IrFlags::CONST, true);
    let func = arena.push(IrKind::Ident(strings.intern("f")), Span::DUMMY);
    let arg = arena.push(IrKind::Ident(x), Span::DUMMY);
    let call = arena.push(
        IrKind::Call {
            func,
            args: vec![
                IrArg {
                    name: strings.intern("__0"),
                    value: arg,
                },
                IrArg {
                    name: strings.intern("flag"),
                    value: one,
                },
            ],
        },
        Span::DUMMY,
    );
    arena.set_flag(call, IrFlags::VOLATILE, true);
    let text = arena.push(IrKind::Str(strings.intern("a\"b\n")), Span::DUMMY);
    let root = arena.push(IrKind::Seq(vec![local, call, text]), Span::DUMMY);

    let ir = module(arena, root, strings);
    assert!(ir.validate());
    assert_eq!(
        ir.render(),
        "(seq (const x i32 1) volatile (call f x flag=1) \"a\\\"b\\n\")"
    );
}

#[test]
fn render_marks_bad_references() {
    let strings = StringInterner::shared();
    let mut arena = IrArena::new();
    let dangling = arena.push(IrKind::Ret(IrId(40)), Span::DUMMY);
    let seq = arena.push(IrKind::Seq(vec![dangling]), Span::DUMMY);
    // A node that contains itself.
    *arena.kind_mut(seq) = IrKind::Seq(vec![dangling, seq]);

    let ir = module(arena, seq, strings);
    assert!(!ir.validate());
    assert_eq!(ir.render(), "(seq (ret {?}) {...})");
}

#[test]
fn empty_module_is_invalid() {
    let ir = module(IrArena::new(), IrId::INVALID, StringInterner::shared());
    assert!(!ir.validate());
    assert_eq!(ir.render(), "_");
}
