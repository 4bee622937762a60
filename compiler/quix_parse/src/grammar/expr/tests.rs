#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use quix_diagnostic::{IssueCode, Ticket};
use quix_ir::{NodeData, NodeId};

use crate::test_util::{errors, expr, parse, stmts, top_level};
use crate::{Module, ParserConfig};

#[test]
fn operators_group_to_the_right() {
    assert_eq!(expr("a + b * c"), "(+ a (* b c))");
    assert_eq!(expr("a * b + c"), "(* a (+ b c))");
    assert_eq!(expr("a - b - c"), "(- a (- b c))");
}

#[test]
fn parentheses_group_first() {
    assert_eq!(expr("(a + b) * c"), "(* (+ a b) c)");
    assert_eq!(expr("((a))"), "a");
}

#[test]
fn prefix_operators() {
    assert_eq!(expr("-a"), "(- a)");
    assert_eq!(expr("!a + b"), "(! (+ a b))");
    assert_eq!(expr("x = ~y"), "(= x (~ y))");
}

#[test]
fn literals() {
    assert_eq!(expr("42"), "42");
    assert_eq!(expr("1.5"), "1.5");
    assert_eq!(expr("\"hi\""), "\"hi\"");
    assert_eq!(expr("'c'"), "'c'");
    assert_eq!(expr("true"), "true");
    assert_eq!(expr("false"), "false");
    assert_eq!(expr("null"), "null");
    assert_eq!(expr("undef"), "undef");
}

#[test]
fn calls_with_positional_and_named_arguments() {
    assert_eq!(expr("f()"), "(call f)");
    assert_eq!(expr("f(1, x: 2, y)"), "(call f __0=1 x=2 __1=y)");
}

#[test]
fn positional_argument_spans_stop_at_the_argument() {
    let module = parse("f(a, bb: 1, cc);");
    let arena = module.arena();
    let call = arena
        .ids()
        .find(|&id| matches!(arena.get(id), NodeData::Call(_)))
        .unwrap();
    let NodeData::Call(c) = arena.get(call) else {
        unreachable!()
    };
    let offsets = |id: NodeId| {
        let span = arena.span(id);
        let lexer = module.lexer();
        (lexer.offset(span.start).unwrap(), lexer.offset(span.end).unwrap())
    };
    let args: Vec<_> = c.args.iter().map(|arg| offsets(arg.value)).collect();
    assert_eq!(args, [(2, 2), (9, 9), (12, 13)]);
    assert_eq!(offsets(call), (0, 14));
}

#[test]
fn method_call_on_field() {
    assert_eq!(expr("obj.run(1)"), "(call (. obj run) __0=1)");
}

#[test]
fn postfix_increment_and_decrement() {
    assert_eq!(expr("i++"), "(post++ i)");
    assert_eq!(expr("a.b--"), "(post-- (. a b))");
    assert_eq!(expr("a[0]++"), "(post++ (Index a 0))");
}

#[test]
fn index_and_slice() {
    assert_eq!(expr("a[i + 1]"), "(Index a (+ i 1))");
    assert_eq!(expr("a[1:2]"), "(Slice a 1 2)");
    assert_eq!(expr("a[:n]"), "(Slice a _ n)");
    assert_eq!(expr("a[:]"), "(Slice a _ _)");
}

#[test]
fn list_literals() {
    assert_eq!(expr("[]"), "(List)");
    assert_eq!(expr("[1, 2, 3]"), "(List 1 2 3)");
    assert_eq!(expr("[x + 1; 2, 0]"), "(List (+ x 1) (+ x 1) 0)");
}

#[test]
fn repeated_list_elements_share_one_node() {
    let module = parse("[f(1); 3];");
    let root = module.root().unwrap();
    let NodeData::Block(block) = module.arena().get(root) else {
        panic!("root is not a block");
    };
    let NodeData::ExprStmt(stmt) = module.arena().get(block.items[0]) else {
        panic!("not an expression statement");
    };
    let NodeData::List(list) = module.arena().get(stmt.inner) else {
        panic!("not a list");
    };
    assert_eq!(list.items.len(), 3);
    assert!(list.items.iter().all(|&id| id == list.items[0]));
}

#[test]
fn nested_repeats_stay_small() {
    let module = parse("let a = [[0; 4096]; 4096];");
    assert_eq!(errors(&module), Vec::<String>::new());
    assert!(module.arena().len() < 16, "{} nodes", module.arena().len());
}

#[test]
fn repeat_count_limits() {
    let module = parse("[0; 5000];");
    assert_eq!(
        errors(&module),
        ["List repeat count must be between 1 and 4096"]
    );
    let module = parse("[0; n];");
    assert_eq!(
        errors(&module),
        ["List repeat count must be an integer literal"]
    );
}

#[test]
fn assoc_list() {
    assert_eq!(
        expr("{\"a\": 1, \"b\": x + 2}"),
        "(List (Assoc \"a\" 1) (Assoc \"b\" (+ x 2)))"
    );
}

#[test]
fn sequence_point() {
    assert_eq!(expr("a, b"), "(SeqPoint a b)");
    assert_eq!(expr("a = 1, b"), "(= a (SeqPoint 1 b))");
}

#[test]
fn casts_take_a_type() {
    assert_eq!(expr("x as i32"), "(as x (TypeExpr i32))");
    assert_eq!(expr("p bitcast_as *u8"), "(bitcast_as p (TypeExpr (PtrTy u8)))");
}

#[test]
fn ternary() {
    assert_eq!(expr("c ? a : b + 1"), "(Ternary c a (+ b 1))");
}

#[test]
fn function_literal() {
    assert_eq!(
        stmts("let f = fn (x: i32) { ret x; };"),
        ["(Let:f _ (StmtExpr (Fn (FnTy x:i32 -> void) (Block (Return x)) _ _)))"]
    );
    assert_eq!(
        stmts("let y = fn () { ret 1; }();"),
        ["(Let:y _ (call (StmtExpr (Fn (FnTy -> void) (Block (Return 1)) _ _))))"]
    );
}

#[test]
fn format_string_holes() {
    assert_eq!(
        expr("fstring \"a{x + 1}b{{c}}\""),
        "(FString \"a\" (+ x 1) \"b{c}\")"
    );
    assert_eq!(expr("fstring \"{f(y)}\""), "(FString (call f __0=y))");
}

#[test]
fn format_string_hole_spans_cover_the_string() {
    let module = parse("fstring \"{x}\";");
    let strings = top_level(&module);
    assert_eq!(strings, ["(ExprStmt (FString x))"]);

    let arena = module.arena();
    let fstring = arena
        .ids()
        .find(|&id| matches!(arena.get(id), NodeData::FString(_)))
        .unwrap();
    let hole = arena
        .ids()
        .find(|&id| matches!(arena.get(id), NodeData::Ident(_)))
        .unwrap();
    assert_eq!(arena.span(hole).end, arena.span(fstring).end);
}

#[test]
fn format_string_errors() {
    let module = parse("fstring \"{x\";");
    assert_eq!(errors(&module), ["Unterminated '{' in format string"]);
    let module = parse("fstring \"x}\";");
    assert_eq!(errors(&module), ["Unmatched '}' in format string"]);
    let module = parse("fstring \"{}\";");
    assert_eq!(
        errors(&module),
        ["Expected an expression in format string, found end of file"]
    );
    let module = parse("fstring x;");
    assert_eq!(errors(&module), ["Expected a string after 'fstring', found 'x'"]);
}

#[test]
fn malformed_expressions() {
    let cases = [
        ("a b;", "Expected an operator between operands"),
        ("a +;", "Expected an operand after '+', found ';'"),
        ("a +", "Unexpected end of file in expression"),
        ("let x = if;", "Unexpected keyword 'if' in expression"),
        ("x = ];", "Unexpected ']' in expression"),
        (". a;", "Expected an expression before '.'"),
        ("f(, 1);", "Expected an argument, found ','"),
    ];
    for (text, expected) in cases {
        let module = parse(text);
        assert_eq!(errors(&module).first().map(String::as_str), Some(expected), "source: {text}");
    }
}

#[test]
fn nesting_limit() {
    let config = ParserConfig {
        max_expr_depth: 8,
        ..ParserConfig::default()
    };
    let text = format!("{}a;", "- ".repeat(20));
    let mut module = Module::from_text(&text, "test.q").with_parser_config(config);
    module.parse().unwrap();

    let messages = module.diagnostics().messages(Ticket::PARSE);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].code, IssueCode::NestingTooDeep);
    assert_eq!(messages[0].subject, "nesting depth 9 exceeds the limit of 8");

    let text = format!("{}a;", "- ".repeat(8));
    let mut module = Module::from_text(&text, "test.q").with_parser_config(config);
    assert!(module.check());
}

fn right_nested(names: &[String], ops: &[&str]) -> String {
    match ops.split_first() {
        None => names[0].clone(),
        Some((op, rest)) => format!("({op} {} {})", names[0], right_nested(&names[1..], rest)),
    }
}

proptest! {
    #[test]
    fn chains_always_nest_right(ops in prop::collection::vec(
        prop::sample::select(vec!["+", "-", "*", "/", "%", "&&", "||", "<", "=="]),
        1..8,
    )) {
        let names: Vec<String> = (0..=ops.len()).map(|i| format!("v{i}")).collect();
        let mut text = names[0].clone();
        for (op, name) in ops.iter().zip(&names[1..]) {
            text.push_str(&format!(" {op} {name}"));
        }
        prop_assert_eq!(expr(&text), right_nested(&names, &ops));
    }

    #[test]
    fn arbitrary_input_never_panics(text in "\\PC{0,64}") {
        let mut module = Module::from_text(&text, "fuzz.q");
        if module.parse().is_ok() {
            prop_assert!(module.verify());
        }
    }
}
