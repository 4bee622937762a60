#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use quix_ir::node::decl::Visibility;
use quix_ir::NodeData;

use crate::test_util::{errors, parse, stmts};

#[test]
fn locals() {
    assert_eq!(
        stmts("let a; var b: u8; const c = 1;"),
        ["(Let:a _ _)", "(Var:b u8 _)", "(Const:c _ 1)"]
    );
}

#[test]
fn multiple_declaration() {
    assert_eq!(
        stmts("var [x: i32, y];"),
        ["(Var:x i32 _)", "(Var:y _ _)"]
    );
    let module = parse("let [x, y] = 1;");
    assert_eq!(
        errors(&module),
        ["A multiple declaration cannot have an initializer"]
    );
}

#[test]
fn typedef() {
    assert_eq!(stmts("type Bytes = [u8];"), ["(Typedef:Bytes (VectorTy u8))"]);
    assert_eq!(
        errors(&parse("type Bytes [u8];")),
        ["Expected '=' after a type name, found '['"]
    );
}

#[test]
fn enums() {
    assert_eq!(
        stmts("enum Color: u8 { Red = 1, Green, Blue, }"),
        ["(Enum:Color u8 1 _ _)"]
    );
    assert_eq!(stmts("enum Empty {}"), ["(Enum:Empty _)"]);
}

#[test]
fn struct_members() {
    let out = stmts(
        "struct Point {
            x: i32 = 0,
            pub y: i32;
            fn len(): f64 { ret 0; }
            static fn origin(): Point;
        }",
    );
    assert_eq!(
        out,
        ["(Struct:Point (CompositeField:x i32 0) (CompositeField:y i32 _) \
          (Fn:len (FnTy this:(PtrTy Point) -> f64) (Block (Return 0)) _ _) \
          (FnDecl:origin (FnTy -> Point)))"]
    );
}

#[test]
fn member_visibility() {
    let module = parse("group G { pro a: u8, sec fn f(); pub static fn g(); }");
    let arena = module.arena();
    let mut seen = Vec::new();
    for id in arena.ids() {
        match arena.get(id) {
            NodeData::CompositeField(f) => seen.push(("a", f.visibility)),
            NodeData::FnDecl(f) => {
                let name = if module.strings().lookup(f.name).as_ref() == "f" { "f" } else { "g" };
                seen.push((name, f.visibility));
            }
            _ => {}
        }
    }
    seen.sort_by_key(|&(name, _)| name);
    assert_eq!(
        seen,
        [
            ("a", Visibility::Protected),
            ("f", Visibility::Private),
            ("g", Visibility::Public)
        ]
    );
}

#[test]
fn composite_kinds_and_tags() {
    assert_eq!(
        stmts("region R { a: u8 }; union U { a: u8, b: f32 } impl [b, a, b]"),
        [
            "(Region:R (CompositeField:a u8 _))",
            "(Union:U (CompositeField:a u8 _) (CompositeField:b f32 _))"
        ]
    );

    let module = parse("union U { } impl [zeta, alpha, zeta]");
    let arena = module.arena();
    let tags: Vec<String> = arena
        .ids()
        .find_map(|id| match arena.get(id) {
            NodeData::Union(c) => Some(c.tags.clone()),
            _ => None,
        })
        .unwrap()
        .into_iter()
        .map(|t| module.strings().lookup(t).to_string())
        .collect();
    assert_eq!(tags, ["alpha", "zeta"]);
}

#[test]
fn unterminated_struct() {
    let module = parse("struct S { a: u8,");
    assert_eq!(errors(&module), ["Unterminated struct 'S'"]);
}

#[test]
fn subsystem() {
    assert_eq!(
        stmts("subsystem app::core: [std, io] { let x; } impl [main]"),
        ["(Subsystem:app::core (Block (Let:x _ _)))"]
    );
    let module = parse("subsystem app: [std, io] { }");
    let arena = module.arena();
    let deps = arena
        .ids()
        .find_map(|id| match arena.get(id) {
            NodeData::Subsystem(s) => Some(s.deps.len()),
            _ => None,
        })
        .unwrap();
    assert_eq!(deps, 2);
}

#[test]
fn exports() {
    assert_eq!(
        stmts("pub \"C\" fn puts(s: *u8): i32;"),
        ["(Export:c (Block (FnDecl:puts (FnTy s:(PtrTy u8) -> i32))))"]
    );
    assert_eq!(
        stmts("import \"dlang\" { let x; }"),
        ["(Export:d (Block (Let:x _ _)))"]
    );
    assert_eq!(
        stmts("pub \"cxx\" struct S { }"),
        ["(Export:c++ (Block (Struct:S)))"]
    );
    assert_eq!(stmts("pub fn f();"), ["(Export (Block (FnDecl:f (FnTy -> void))))"]);
}

#[test]
fn exported_items_become_public() {
    let module = parse("pub { fn f(); struct S { } }");
    let arena = module.arena();
    let public = arena
        .ids()
        .filter_map(|id| match arena.get(id) {
            NodeData::FnDecl(f) => Some(f.visibility),
            NodeData::Struct(c) => Some(c.visibility),
            _ => None,
        })
        .all(|v| v == Visibility::Public);
    assert!(public);
}

#[test]
fn unknown_export_language() {
    assert_eq!(
        errors(&parse("pub \"rust\" fn f();")),
        ["Unknown export language \"rust\""]
    );
    assert_eq!(
        errors(&parse("pub 5;")),
        ["Expected '{' or a declaration, found '5'"]
    );
}
