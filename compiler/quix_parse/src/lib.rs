//! Parser for QUIX.
//!
//! A recursive descent parser for statements over an operand-stack parser
//! for expressions, producing the node graph of `quix_ir`.
//!
//! - [`Module`]: one source file, its arena, diagnostics and root
//! - [`Parser`]: the grammar, over a borrowed lexer, arena and
//!   diagnostics manager
//! - [`ParseError`]: a syntax error already reported to diagnostics
//!
//! Statements recover from errors: a failed statement is reported and the
//! enclosing block skips to the next `;` or `}`. With `fast_error` set the
//! first error ends the parse instead.
//!
//! ```
//! use quix_parse::Module;
//!
//! let mut module = Module::from_text("let x: i32 = 1 + 2;", "demo.q");
//! assert!(module.check());
//! ```

mod error;
mod grammar;
mod module;
mod parser;
mod stop;

#[cfg(test)]
mod test_util;

pub use error::{ParseError, ParseResult};
pub use module::{Module, Snippet};
pub use parser::{Parser, ParserConfig};
