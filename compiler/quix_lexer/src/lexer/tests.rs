#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use quix_ir::StringLookup;

fn lexer(text: &str) -> Lexer<io::Cursor<Vec<u8>>> {
    Lexer::from_text(text, "test.q", StringInterner::shared())
}

/// `class text` for every token up to `Eof`.
fn lex(text: &str) -> Vec<String> {
    let mut lx = lexer(text);
    let mut out = Vec::new();
    loop {
        let tok = lx.next();
        if tok.is_eof() {
            return out;
        }
        out.push(format!(
            "{} {}",
            tok.kind.class_name(),
            tok.kind.text(lx.strings())
        ));
    }
}

#[test]
fn punctuation_crunch() {
    assert_eq!(
        lex("(){}[],:;><=+-*/%&|^!~?@#_"),
        [
            "punct (", "punct )", "punct {", "punct }", "punct [", "punct ]", "punct ,",
            "punct :", "punct ;", "op >", "op <=", "op +", "op -", "op *", "op /", "op %",
            "op &", "op |", "op ^", "op !", "op ~", "op ?", "op @", "op #", "ident _",
        ]
    );
}

#[test]
fn keywords_and_qualified_names_between_dots() {
    assert_eq!(
        lex("subsystem.fstring.__asm__.std::panic.std::_19031__9_1::panic.hello0."),
        [
            "keyword subsystem",
            "op .",
            "keyword fstring",
            "op .",
            "keyword __asm__",
            "op .",
            "ident std::panic",
            "op .",
            "ident std::_19031__9_1::panic",
            "op .",
            "ident hello0",
            "op .",
        ]
    );
}

#[test]
fn single_colons_stay_punctors() {
    assert_eq!(
        lex("x: T a[i:j]"),
        [
            "ident x", "punct :", "ident T", "ident a", "punct [", "ident i", "punct :",
            "ident j", "punct ]",
        ]
    );
}

#[test]
fn malformed_qualified_names_are_unknown() {
    assert_eq!(lex("::a"), ["unknown ::a"]);
    assert_eq!(lex("a::;"), ["unknown a::", "punct ;"]);
    assert_eq!(lex("a::1b"), ["unknown a::1b"]);
}

#[test]
fn word_operators() {
    assert_eq!(
        lex("x as i32 sizeof bitcast_as"),
        ["ident x", "op as", "ident i32", "op sizeof", "op bitcast_as"]
    );
}

#[test]
fn fstring_prefix() {
    assert_eq!(
        lex(r#"f"a{x}" f"#),
        ["keyword fstring", "string a{x}", "ident f"]
    );
}

#[test]
fn longest_operator_wins() {
    assert_eq!(
        lex("a<<<=b>>>c<=>d...e&&=f?:g"),
        [
            "ident a", "op <<<=", "ident b", "op >>>", "ident c", "op <=>", "ident d",
            "op ...", "ident e", "op &&=", "ident f", "op ?:", "ident g",
        ]
    );
}

#[test]
fn numbers() {
    assert_eq!(
        lex("0x_FF 0b101 0o17 1_000 1.50 2e3 7"),
        [
            "int 255", "int 5", "int 15", "int 1000", "float 1.5", "float 2000.0", "int 7",
        ]
    );
}

#[test]
fn range_after_digits() {
    assert_eq!(lex("1..5"), ["int 1", "op ..", "int 5"]);
    assert_eq!(lex("3.len"), ["int 3", "op .", "ident len"]);
    assert_eq!(lex("1e-2-1"), ["float 0.01", "op -", "int 1"]);
}

#[test]
fn bad_numbers_are_unknown() {
    assert_eq!(lex("0b2 9z"), ["unknown 0b2", "unknown 9z"]);
    assert_eq!(
        lex("340282366920938463463374607431768211456"),
        ["unknown 340282366920938463463374607431768211456"]
    );
}

#[test]
fn strings_and_chars() {
    assert_eq!(
        lex(r#""hi there" 'x' 'xy' '' "a\n""#),
        [
            "string hi there",
            "char x",
            "string xy",
            "string ",
            r"string a\n",
        ]
    );
}

#[test]
fn unterminated_string_is_unknown() {
    assert_eq!(lex("x \"abc"), ["ident x", "unknown \"abc"]);
}

#[test]
fn comments() {
    assert_eq!(
        lex("a // note\nb /* x /* y */ z */ c"),
        [
            "ident a",
            "comment  note",
            "ident b",
            "comment  x /* y */ z ",
            "ident c",
        ]
    );
    assert_eq!(lex("/* open"), ["unknown /* open"]);
}

#[test]
fn slash_without_comment_is_an_operator() {
    assert_eq!(
        lex("a / b /= c"),
        ["ident a", "op /", "ident b", "op /=", "ident c"]
    );
}

#[test]
fn skip_comments_config() {
    let mut lx = lexer("// a\nx /* b */ y").with_config(LexerConfig {
        skip_comments: true,
    });
    assert!(matches!(lx.next().kind, TokenKind::Identifier(_)));
    assert!(matches!(lx.next().kind, TokenKind::Identifier(_)));
    assert!(lx.next().is_eof());
}

#[test]
fn stray_bytes_are_unknown() {
    assert_eq!(lex("$ é"), ["unknown $", "unknown é"]);
}

#[test]
fn eof_repeats() {
    let mut lx = lexer("");
    assert!(lx.next().is_eof());
    assert!(lx.peek().is_eof());
    assert!(lx.next().is_eof());
}

#[test]
fn peek_then_next() {
    let mut lx = lexer("a b");
    let a = lx.peek();
    assert_eq!(lx.peek(), a);
    assert_eq!(lx.next(), a);
    assert_ne!(lx.next(), a);
}

#[test]
fn inserted_tokens_come_first() {
    let mut lx = lexer("a");
    let a = lx.peek();
    let semi = Token::dummy(TokenKind::Punctor(Punctor::Semicolon));
    let comma = Token::dummy(TokenKind::Punctor(Punctor::Comma));
    lx.insert(semi);
    lx.insert(comma);
    assert_eq!(lx.peek(), comma);
    assert_eq!(lx.next(), comma);
    assert_eq!(lx.next(), semi);
    assert_eq!(lx.next(), a);
    assert!(lx.next().is_eof());
}

#[test]
fn fork_shares_interner() {
    let parent = lexer("");
    let mut child = parent.fork(io::Cursor::new(b"shared".to_vec()), "sub.q");
    let name = child.next().ident().unwrap();
    assert_eq!(parent.strings().get("shared"), Some(name));
    assert_eq!(child.filename(), "sub.q");
}

#[test]
fn token_spans() {
    let mut lx = lexer("let\n  abc = 1;");
    let kw = lx.next();
    let id = lx.next();
    let loc = lx.locations();
    assert_eq!(loc.row_col(kw.span.start), Some((1, 1)));
    assert_eq!(loc.row_col(kw.span.end), Some((1, 3)));
    assert_eq!(loc.row_col(id.span.start), Some((2, 3)));
    assert_eq!(loc.row_col(id.span.end), Some((2, 5)));
    assert_eq!(lx.offset(id.span.start), Some(6));
}

#[test]
fn positions_past_column_cap_are_unknown() {
    let text = format!("a{}b", " ".repeat(2000));
    let mut lx = lexer(&text);
    assert!(lx.next().span.start.is_known());
    let b = lx.next();
    assert_eq!(b.kind.text(lx.strings()), "b");
    assert!(!b.span.start.is_known());

    let faults = lx.take_faults();
    assert_eq!(faults.len(), 1, "{faults:?}");
    assert!(matches!(faults[0], LexFault::LocationCap { .. }));
    assert!(lx.take_faults().is_empty());
}

struct Flaky {
    data: io::Cursor<Vec<u8>>,
}

impl Read for Flaky {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.data.position() > 0 {
            return Err(io::Error::new(io::ErrorKind::Other, "gone"));
        }
        let n = buf.len().min(3);
        self.data.read(&mut buf[..n])
    }
}

impl Seek for Flaky {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        self.data.seek(pos)
    }
}

#[test]
fn read_error_becomes_unknown() {
    let flaky = Flaky {
        data: io::Cursor::new(b"abcdef".to_vec()),
    };
    let mut lx = Lexer::new(flaky, "flaky.q", StringInterner::shared());
    let tok = lx.next();
    assert_eq!(tok.kind, TokenKind::Unknown(Name::EMPTY));
    assert!(lx.next().is_eof());
    assert_eq!(
        lx.take_faults(),
        [LexFault::Read {
            span: tok.span,
            message: "gone".to_string(),
        }]
    );
}

proptest! {
    #[test]
    fn peek_is_idempotent(text in "[ -~\n]{0,64}") {
        let mut lx = lexer(&text);
        for _ in 0..=text.len() {
            let peeked = lx.peek();
            prop_assert_eq!(lx.peek(), peeked);
            prop_assert_eq!(lx.next(), peeked);
            if peeked.is_eof() {
                break;
            }
        }
        prop_assert!(lx.next().is_eof());
    }

    #[test]
    fn integers_round_trip(n: u128) {
        let text = n.to_string();
        let mut lx = lexer(&text);
        let tok = lx.next();
        let TokenKind::Integer(name) = tok.kind else {
            return Err(TestCaseError::fail(format!("{tok:?}")));
        };
        let spelled = lx.strings().lookup(name);
        prop_assert_eq!(&*spelled, text.as_str());
    }
}
