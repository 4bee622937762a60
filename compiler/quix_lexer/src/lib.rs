//! Streaming lexer for QUIX.
//!
//! The lexer pulls bytes from any `Read + Seek` source and hands out one
//! [`Token`](quix_ir::Token) at a time. It owns the location table for its
//! source and shares a string interner with its forks and with every pass
//! that reads the node graph.
//!
//! ```
//! use quix_ir::{StringInterner, TokenKind};
//! use quix_lexer::Lexer;
//!
//! let mut lexer = Lexer::from_text("let x;", "demo.q", StringInterner::shared());
//! assert_eq!(lexer.next().kind.class_name(), "keyword");
//! assert!(matches!(lexer.next().kind, TokenKind::Identifier(_)));
//! ```

mod ident;
mod lexer;
mod number;
mod reader;
mod view;

pub use ident::is_valid_identifier;
pub use lexer::{LexFault, Lexer, LexerConfig};
pub use number::{canonicalize, Number};
