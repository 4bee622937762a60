#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use quix_diagnostic::{DiagnosticConfig, IssueCode, Ticket};
use quix_ir::node::decl::Typedef;
use quix_ir::node::expr::{List, Literal, Named};
use quix_ir::node::stmt::While;
use quix_ir::{NodeArena, NodeData, NodeId, NodeKind, Span, StringInterner};
use quix_parse::Module;

use super::*;
use crate::ir::render;

/// Each top-level item of `text`, lowered and rendered. Fails the test on
/// any diagnostic.
fn items(text: &str) -> Vec<String> {
    let mut module = Module::from_text(text, "demo.q");
    let ir = lower(&mut module).unwrap();
    let subjects: Vec<_> = module
        .diagnostics()
        .messages(Ticket::ALL)
        .iter()
        .map(|m| m.subject.clone())
        .collect();
    assert_eq!(subjects, Vec::<String>::new(), "source: {text}");
    assert!(ir.validate());
    let IrKind::Seq(items) = ir.arena.kind(ir.root) else {
        panic!("root is not a sequence");
    };
    items
        .iter()
        .map(|&id| render(&ir.arena, &*ir.strings, id))
        .collect()
}

fn one(text: &str) -> String {
    let mut out = items(text);
    assert_eq!(out.len(), 1, "source: {text}");
    out.remove(0)
}

/// Lower `text`, expecting failure, and return the error with the
/// diagnostics reported under `CONVERT`.
fn failure(text: &str) -> (LowerError, Vec<(IssueCode, String)>) {
    let mut module = Module::from_text(text, "demo.q");
    let err = lower(&mut module).unwrap_err();
    let reported = module
        .diagnostics()
        .messages(Ticket::CONVERT)
        .iter()
        .map(|m| (m.code, m.subject.clone()))
        .collect();
    (err, reported)
}

#[test]
fn typed_local() {
    assert_eq!(one("let x: i32 = 1 + 2;"), "(let x i32 (+ 1 2))");
    assert_eq!(
        items("var y: u8; const c = 1;"),
        ["(let y u8 _)", "(const c _ 1)"]
    );
}

#[test]
fn operators_keep_their_grouping() {
    assert_eq!(one("a + b * c;"), "(+ a (* b c))");
    assert_eq!(one("(a + b) * c;"), "(* (+ a b) c)");
}

#[test]
fn literals() {
    assert_eq!(
        items("true; false; 'c'; null; undef; 1.5; \"hi\"; 42;"),
        ["1:u1", "0:u1", "99:u8", "0:(ptr void)", "undef", "1.5", "\"hi\"", "42"]
    );
}

#[test]
fn returns() {
    assert_eq!(
        items("ret; ret a + 1; retif x, c; retz x, c; retv c;"),
        [
            "(ret void)",
            "(ret (+ a 1))",
            "(if c (ret x) void)",
            "(if (! c) (ret x) void)",
            "(if c (ret void) void)"
        ]
    );
}

#[test]
fn branches_and_loops() {
    assert_eq!(one("if a { b; } else { c; }"), "(if a (seq b) (seq c))");
    assert_eq!(one("if a { }"), "(if a (seq) void)");
    assert_eq!(one("while i < n { i++; }"), "(while (< i n) (seq (post++ i)))");
    assert_eq!(
        one("for (let i = 0; i < n; i++) { }"),
        "(for (let i _ 0) (< i n) (post++ i) (seq))"
    );
    assert_eq!(one("for (;;) { }"), "(for void 1 void (seq))");
    assert_eq!(one("foreach (i, v in xs) { }"), "(foreach i v xs (seq))");
    assert_eq!(one("form (4) (i, v in xs) { }"), "(form i v 4 xs (seq))");
    assert_eq!(items("break; continue;"), ["brk", "cont"]);
}

#[test]
fn switch() {
    assert_eq!(
        one("switch x { case 1: { a; } default: { b; } }"),
        "(switch x (case 1 (seq a)) (seq b))"
    );
    assert_eq!(one("switch x { }"), "(switch x void)");
}

#[test]
fn ternary_becomes_if() {
    assert_eq!(one("c ? a : b + 1;"), "(if c a (+ b 1))");
}

#[test]
fn compound_assignment_reads_the_target() {
    assert_eq!(one("a += 1;"), "(= a (+ a 1))");
    assert_eq!(one("a.b <<= 2;"), "(= (. a b) (<< (. a b) 2))");
}

#[test]
fn logical_xor_is_spelled_out() {
    assert_eq!(one("a ^^ b;"), "(&& (|| a b) (! (&& a b)))");
    assert_eq!(one("a ^^= b;"), "(= a (&& (|| a b) (! (&& a b))))");
}

#[test]
fn casts_and_queries() {
    assert_eq!(one("x as i32;"), "(as x i32)");
    assert_eq!(one("p bitcast_as *u8;"), "(bitcast_as p (ptr u8))");
    assert_eq!(one("a is b;"), "(call __is a b)");
    assert_eq!(one("a in b;"), "(call (. b has) a)");
    assert_eq!(one("sizeof x;"), "(call __ceil (/ (bitsizeof x) 8))");
    assert_eq!(one("typeof x;"), "(call __typeof x)");
    assert_eq!(one("-a;"), "(- a)");
}

#[test]
fn calls_and_collections() {
    assert_eq!(one("f(1, x: 2, y);"), "(call f 1 x=2 y)");
    assert_eq!(one("[1, 2];"), "[1 2]");
    assert_eq!(one("{\"a\": 1};"), "[[\"a\" 1]]");
    assert_eq!(one("a[i];"), "(index a i)");
    assert_eq!(one("a[:n];"), "(slice a _ n)");
    assert_eq!(one("a = 1, b;"), "(= a (seq 1 b))");
}

#[test]
fn repeated_list_items_are_lowered_once() {
    assert_eq!(one("[x + 1; 3];"), "[(+ x 1) (+ x 1) (+ x 1)]");

    let mut module = Module::from_text("let a = [[0; 4096]; 4096];", "demo.q");
    let ir = lower(&mut module).unwrap();
    assert!(ir.validate());
    assert!(ir.arena.len() < 32, "{} IR nodes", ir.arena.len());
}

#[test]
fn fstrings_concatenate() {
    assert_eq!(one("fstring \"plain\";"), "\"plain\"");
    assert_eq!(one("fstring \"{x}\";"), "(as x string)");
    assert_eq!(
        one("fstring \"a{x + 1}b\";"),
        "(+ (+ (+ \"\" \"a\") (as (+ x 1) string)) \"b\")"
    );
}

#[test]
fn volatile_statement() {
    assert_eq!(one("volatile a = 1;"), "volatile (seq (= a 1))");
}

#[test]
fn functions() {
    assert_eq!(
        one("fn add(a: i32, b: i32 = 1): i32 { ret a + b; }"),
        "(fn add (a:i32 b:i32=1) i32 (seq (ret (+ a b))))"
    );
    assert_eq!(one("fn main();"), "(fn main () void _)");
    assert_eq!(
        one("fn printf(fmt: *u8, ...): i32;"),
        "(fn printf (fmt:(ptr u8) ...) i32 _)"
    );
}

#[test]
fn contracts_become_checks() {
    let out = one("fn f(x: i32): i32 { ret x; } req { in x > 0; out x; }");
    let post = "(if (! x) (call __quix_postcond_fail) void)";
    assert_eq!(
        out,
        format!(
            "(fn f (x:i32) i32 (seq \
             (if (! (> x 0)) (call __quix_precond_fail) void) \
             (seq {post} (ret x)) \
             {post}))"
        )
    );
}

#[test]
fn nested_function_has_its_own_contract() {
    let out = one("fn f(): i32 { let g = fn () { ret 1; }; ret 2; } req { out r; }");
    // The literal's return is not checked against the outer postcondition.
    assert!(out.contains("(seq (ret 1))"), "{out}");
    assert!(out.contains("(ret 2))"), "{out}");
    assert_eq!(out.matches("__quix_postcond_fail").count(), 2, "{out}");
}

#[test]
fn composites() {
    assert_eq!(
        one("struct Point {
            x: i32 = 0,
            pub y: i32;
            fn len(): f64 { ret 0; }
            static fn origin(): Point;
        }"),
        "(seq (type Point (struct i32 i32)) \
         (fn Point::len (this:(ptr Point)) f64 (seq (ret 0))) \
         (fn Point::origin () Point _))"
    );
    assert_eq!(one("region R { a: u8 }"), "(seq (type R (packed u8)))");
    assert_eq!(one("group G { a: u8 }"), "(seq (type G (struct u8)))");
    assert_eq!(
        one("union U { a: u8, b: f32 }"),
        "(seq (type U (union u8 f32)))"
    );
}

#[test]
fn enums_count_up() {
    assert_eq!(
        one("enum Color: u8 { Red = 1, Green, Blue, }"),
        "(seq (const Color::Red u8 1) \
         (const Color::Green u8 (+ Color::Red 1)) \
         (const Color::Blue u8 (+ Color::Green 1)))"
    );
    assert_eq!(
        one("enum E { A, B }"),
        "(seq (const E::A _ 0) (const E::B _ (+ E::A 1)))"
    );
}

#[test]
fn subsystem_qualifies_declarations() {
    assert_eq!(
        one("subsystem app: [std] { type T = i32; let x = 1; fn f() { let y = 1; } }"),
        "(seq (type app::T i32) (let app::x _ 1) (fn app::f () void (seq (let y _ 1))))"
    );
    assert_eq!(
        one("subsystem app: [std] { struct S { fn m(); } }"),
        "(seq (seq (type app::S (struct)) (fn app::S::m (this:(ptr S)) void _)))"
    );
}

#[test]
fn exports_become_extern() {
    assert_eq!(
        one("pub \"C\" fn puts(s: *u8): i32;"),
        "(extern \"c\" (seq (fn puts (s:(ptr u8)) i32 _)))"
    );
}

#[test]
fn types() {
    assert_eq!(one("type Bytes = [u8];"), "(type Bytes (list u8))");
    let cases = [
        ("*!i64", "(ptr (mut i64))"),
        ("[string -> i64]", "(map string i64)"),
        ("[u8; 4]", "(array u8 4)"),
        ("{string}", "(set string)"),
        ("(u8, *Node)", "(struct u8 (ptr Node))"),
        ("opaque(Handle)", "(opaque Handle)"),
        ("i32?", "(optional i32)"),
        ("fn (fmt: *u8, ...): i32", "(fnty ((ptr u8) ...) i32)"),
    ];
    for (text, expected) in cases {
        assert_eq!(one(&format!("type T = {text};")), format!("(type T {expected})"));
    }
}

#[test]
fn inline_assembly() {
    assert_eq!(
        one("__asm__(\"mov %1, %0\", {\"=r\": out_v}, {\"r\": x + 1}, [\"cc\"]);"),
        "(asm \"mov %1, %0\" (\"=r\"=out_v) (\"r\"=(+ x 1)) (\"cc\"))"
    );
    assert_eq!(one("__asm__(\"nop\", {}, {}, []);"), "(asm \"nop\" () () ())");
}

#[test]
fn bare_let_is_malformed() {
    let (err, reported) = failure("let a;");
    assert_eq!(
        err,
        LowerError::Malformed {
            kind: NodeKind::Let,
            what: "a type or an initializer",
            span: err.span(),
        }
    );
    assert_eq!(
        reported,
        [(
            IssueCode::PTreeInvalid,
            "Let is missing a type or an initializer".to_string()
        )]
    );
}

#[test]
fn unsupported_operator() {
    let (err, reported) = failure("a <=> b;");
    assert_eq!(err.to_string(), "binary '<=>' cannot be lowered");
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].0, IssueCode::Default);
}

#[test]
fn parse_failure_is_not_reported_again() {
    let config = DiagnosticConfig {
        fast_error: true,
        ..DiagnosticConfig::default()
    };
    let mut module = Module::from_text("a b;", "demo.q").with_diagnostics(config);
    let err = lower(&mut module).unwrap_err();
    assert!(matches!(err, LowerError::Parse(_)));
    assert_eq!(err.code(), IssueCode::SyntaxError);
    assert!(module.diagnostics().messages(Ticket::CONVERT).is_empty());
}

#[test]
fn depth_limit() {
    let mut module = Module::from_text("a + b + c + d;", "demo.q");
    let err = lower_with(&mut module, LowerConfig { max_depth: 3 }).unwrap_err();
    // Block, statement, then the first two operators.
    assert!(
        matches!(err, LowerError::TooDeep { source, .. } if source.depth == 4 && source.limit == 3),
        "{err:?}"
    );
    let codes: Vec<_> = module
        .diagnostics()
        .messages(Ticket::CONVERT)
        .iter()
        .map(|m| m.code)
        .collect();
    assert_eq!(codes, [IssueCode::NestingTooDeep]);

    let mut module = Module::from_text("a + b + c + d;", "demo.q");
    assert!(lower_with(&mut module, LowerConfig { max_depth: 6 }).is_ok());
}

fn ident(arena: &mut NodeArena, interner: &StringInterner, name: &str) -> NodeId {
    let name = interner.intern(name);
    arena.alloc(NodeData::Ident(Named { name }), Span::DUMMY)
}

#[test]
fn missing_required_child() {
    let interner = StringInterner::shared();
    let mut arena = NodeArena::new();
    let cond = ident(&mut arena, &interner, "a");
    let stmt = arena.alloc(
        NodeData::While(While {
            cond,
            body: NodeId::INVALID,
        }),
        Span::DUMMY,
    );
    let root = arena.alloc(NodeData::Block(List { items: vec![stmt] }), Span::DUMMY);
    let err = lower_tree(&arena, &interner, root, LowerConfig::default()).unwrap_err();
    assert_eq!(err.to_string(), "While is missing a body");
    assert_eq!(err.code(), IssueCode::PTreeInvalid);
}

#[test]
fn dangling_child() {
    let interner = StringInterner::shared();
    let mut arena = NodeArena::new();
    let root = arena.alloc(
        NodeData::Block(List {
            items: vec![NodeId::new(99)],
        }),
        Span::DUMMY,
    );
    let err = lower_tree(&arena, &interner, root, LowerConfig::default()).unwrap_err();
    assert_eq!(err.to_string(), "Block is missing a statement");

    let err = lower_tree(&arena, &interner, NodeId::new(7), LowerConfig::default()).unwrap_err();
    assert!(matches!(err, LowerError::Malformed { what: "a root node", .. }));
}

#[test]
fn value_where_a_type_belongs() {
    let interner = StringInterner::shared();
    let mut arena = NodeArena::new();
    let value = interner.intern("5");
    let ty = arena.alloc(NodeData::Int(Literal { value }), Span::DUMMY);
    let name = interner.intern("T");
    let root = arena.alloc(NodeData::Typedef(Typedef { name, ty }), Span::DUMMY);
    let err = lower_tree(&arena, &interner, root, LowerConfig::default()).unwrap_err();
    assert_eq!(
        err,
        LowerError::NotAType {
            found: NodeKind::Int,
            span: Span::DUMMY
        }
    );
    assert_eq!(err.code(), IssueCode::DSBadType);
}

#[test]
fn field_outside_a_composite() {
    let interner = StringInterner::shared();
    let mut arena = NodeArena::new();
    let name = interner.intern("x");
    let field = arena.alloc(
        NodeData::CompositeField(quix_ir::node::decl::CompositeField {
            name,
            ty: NodeId::INVALID,
            value: NodeId::INVALID,
            visibility: quix_ir::node::decl::Visibility::Public,
        }),
        Span::DUMMY,
    );
    let err = lower_tree(&arena, &interner, field, LowerConfig::default()).unwrap_err();
    assert_eq!(err.to_string(), "CompositeField is missing an enclosing composite");
}

proptest! {
    #[test]
    fn operator_chains_lower_one_to_one(ops in prop::collection::vec(0..6usize, 1..24)) {
        const OPS: [&str; 6] = ["+", "-", "*", "/", "<<", "=="];
        let mut text = String::from("v0");
        for (i, &op) in ops.iter().enumerate() {
            text.push_str(&format!(" {} v{}", OPS[op], i + 1));
        }
        text.push(';');

        let mut module = Module::from_text(&text, "prop.q");
        let ir = lower(&mut module).unwrap();
        prop_assert!(ir.validate());
        let binaries = ir
            .arena
            .ids()
            .filter(|&id| matches!(ir.arena.kind(id), IrKind::Binary { .. }))
            .count();
        prop_assert_eq!(binaries, ops.len());
        let idents = ir
            .arena
            .ids()
            .filter(|&id| matches!(ir.arena.kind(id), IrKind::Ident(_)))
            .count();
        prop_assert_eq!(idents, ops.len() + 1);
    }
}
