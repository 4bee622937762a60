//! Token types for the QUIX lexer.
//!
//! Keyword, operator and punctor tables are closed enums with `ALL` arrays.
//! The lexer matches text against them; the parser matches on variants.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Name, Span, StringLookup};

/// A token with its location pair.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }

    /// Token with unknown locations, for synthetic pushback.
    pub const fn dummy(kind: TokenKind) -> Self {
        Token {
            kind,
            span: Span::DUMMY,
        }
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    #[inline]
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.kind == TokenKind::Keyword(kw)
    }

    #[inline]
    pub fn is_operator(&self, op: Operator) -> bool {
        self.kind == TokenKind::Operator(op)
    }

    #[inline]
    pub fn is_punctor(&self, p: Punctor) -> bool {
        self.kind == TokenKind::Punctor(p)
    }

    /// Identifier text handle, if this is an identifier.
    pub fn ident(&self) -> Option<Name> {
        match self.kind {
            TokenKind::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

/// Token kinds.
///
/// Text-bearing kinds carry interned handles. Numbers keep their canonical
/// text so integers up to `u128` and any `f64` survive unchanged.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    Eof,
    /// Malformed input, with the offending text.
    Unknown(Name),
    Identifier(Name),
    Keyword(Keyword),
    Operator(Operator),
    Punctor(Punctor),
    String(Name),
    Char(char),
    /// Decimal text of the integer value.
    Integer(Name),
    /// Normalized float text.
    Float(Name),
    Comment(Name),
}

impl TokenKind {
    /// Short class name, as used by `quixc lex`.
    pub fn class_name(&self) -> &'static str {
        match self {
            TokenKind::Eof => "eof",
            TokenKind::Unknown(_) => "unknown",
            TokenKind::Identifier(_) => "ident",
            TokenKind::Keyword(_) => "keyword",
            TokenKind::Operator(_) => "op",
            TokenKind::Punctor(_) => "punct",
            TokenKind::String(_) => "string",
            TokenKind::Char(_) => "char",
            TokenKind::Integer(_) => "int",
            TokenKind::Float(_) => "float",
            TokenKind::Comment(_) => "comment",
        }
    }

    /// Source-like text of this token.
    pub fn text(&self, strings: &dyn StringLookup) -> String {
        match *self {
            TokenKind::Eof => String::new(),
            TokenKind::Unknown(n)
            | TokenKind::Identifier(n)
            | TokenKind::String(n)
            | TokenKind::Integer(n)
            | TokenKind::Float(n)
            | TokenKind::Comment(n) => strings.lookup(n).to_string(),
            TokenKind::Keyword(kw) => kw.as_str().to_string(),
            TokenKind::Operator(op) => op.as_str().to_string(),
            TokenKind::Punctor(p) => p.as_char().to_string(),
            TokenKind::Char(c) => c.to_string(),
        }
    }
}

macro_rules! closed_table {
    (
        $(#[$meta:meta])*
        $vis:vis enum $ty:ident { $( $variant:ident => $text:literal ),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
        $vis enum $ty {
            $( $variant ),*
        }

        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$ty] = &[ $( $ty::$variant ),* ];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $( $ty::$variant => $text ),*
                }
            }

            /// Exact-text lookup.
            pub fn from_text(text: &str) -> Option<Self> {
                match text {
                    $( $text => Some($ty::$variant), )*
                    _ => None,
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_table! {
    /// Reserved words.
    pub enum Keyword {
        Subsystem => "subsystem",
        Import => "import",
        Pub => "pub",
        Sec => "sec",
        Pro => "pro",
        Type => "type",
        Let => "let",
        Var => "var",
        Const => "const",
        Static => "static",
        Struct => "struct",
        Region => "region",
        Group => "group",
        Union => "union",
        Opaque => "opaque",
        Enum => "enum",
        FString => "fstring",
        Impl => "impl",
        Fn => "fn",
        Noexcept => "noexcept",
        Foreign => "foreign",
        Impure => "impure",
        Tsafe => "tsafe",
        Pure => "pure",
        Quasipure => "quasipure",
        Retropure => "retropure",
        Crashpoint => "crashpoint",
        Inline => "inline",
        Unsafe => "unsafe",
        Safe => "safe",
        Volatile => "volatile",
        Promise => "promise",
        Req => "req",
        If => "if",
        Else => "else",
        For => "for",
        While => "while",
        Do => "do",
        Switch => "switch",
        Case => "case",
        Default => "default",
        Break => "break",
        Continue => "continue",
        Ret => "ret",
        Retif => "retif",
        Retz => "retz",
        Retv => "retv",
        Form => "form",
        Foreach => "foreach",
        Asm => "__asm__",
        Void => "void",
        Undef => "undef",
        Null => "null",
        True => "true",
        False => "false",
    }
}

closed_table! {
    /// Symbolic and word operators.
    pub enum Operator {
        Ternary => "?:",
        Arrow => "=>",
        Dot => ".",
        Plus => "+",
        Minus => "-",
        Times => "*",
        Slash => "/",
        Percent => "%",
        BitAnd => "&",
        BitOr => "|",
        BitXor => "^",
        BitNot => "~",
        LogicAnd => "&&",
        LogicOr => "||",
        LogicXor => "^^",
        LogicNot => "!",
        LShift => "<<",
        RShift => ">>",
        Rotr => ">>>",
        Rotl => "<<<",
        Inc => "++",
        Dec => "--",
        Set => "=",
        PlusSet => "+=",
        MinusSet => "-=",
        TimesSet => "*=",
        SlashSet => "/=",
        PercentSet => "%=",
        BitAndSet => "&=",
        BitOrSet => "|=",
        BitXorSet => "^=",
        LogicAndSet => "&&=",
        LogicOrSet => "||=",
        LogicXorSet => "^^=",
        LShiftSet => "<<=",
        RShiftSet => ">>=",
        RotrSet => ">>>=",
        RotlSet => "<<<=",
        Lt => "<",
        Gt => ">",
        Le => "<=",
        Ge => ">=",
        Eq => "==",
        Ne => "!=",
        Range => "..",
        Ellipsis => "...",
        Spaceship => "<=>",
        Question => "?",
        At => "@",
        Hash => "#",
        As => "as",
        Is => "is",
        In => "in",
        Sizeof => "sizeof",
        Alignof => "alignof",
        Typeof => "typeof",
        Offsetof => "offsetof",
        BitcastAs => "bitcast_as",
        ReinterpretAs => "reinterpret_as",
        Bitsizeof => "bitsizeof",
        Out => "out",
    }
}

impl Operator {
    /// Longest symbolic operator, in bytes.
    pub const MAX_SYMBOL_LEN: usize = 4;

    /// Spelled with letters rather than punctuation.
    pub fn is_word(self) -> bool {
        self.as_str()
            .bytes()
            .all(|b| b.is_ascii_alphabetic() || b == b'_')
    }

    /// Right operand is a type rather than an expression.
    pub fn takes_type_operand(self) -> bool {
        matches!(
            self,
            Operator::As | Operator::BitcastAs | Operator::ReinterpretAs
        )
    }
}

/// Single-character structural symbols.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub enum Punctor {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,
}

impl Punctor {
    pub const ALL: &'static [Punctor] = &[
        Punctor::LParen,
        Punctor::RParen,
        Punctor::LBracket,
        Punctor::RBracket,
        Punctor::LBrace,
        Punctor::RBrace,
        Punctor::Comma,
        Punctor::Colon,
        Punctor::Semicolon,
    ];

    pub const fn as_char(self) -> char {
        match self {
            Punctor::LParen => '(',
            Punctor::RParen => ')',
            Punctor::LBracket => '[',
            Punctor::RBracket => ']',
            Punctor::LBrace => '{',
            Punctor::RBrace => '}',
            Punctor::Comma => ',',
            Punctor::Colon => ':',
            Punctor::Semicolon => ';',
        }
    }

    pub const fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '(' => Punctor::LParen,
            ')' => Punctor::RParen,
            '[' => Punctor::LBracket,
            ']' => Punctor::RBracket,
            '{' => Punctor::LBrace,
            '}' => Punctor::RBrace,
            ',' => Punctor::Comma,
            ':' => Punctor::Colon,
            ';' => Punctor::Semicolon,
            _ => return None,
        })
    }

    /// `)`, `]` or `}`.
    pub const fn is_closing(self) -> bool {
        matches!(self, Punctor::RParen | Punctor::RBracket | Punctor::RBrace)
    }
}

impl fmt::Display for Punctor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
