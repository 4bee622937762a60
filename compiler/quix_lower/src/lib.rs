//! Lowering from the QUIX parse tree to a small IR.
//!
//! The parse tree keeps every surface form the grammar has. Lowering
//! reduces it to the [`ir`] node set: one arena, one node type for
//! statements and expressions, derived forms spelled out, and names
//! qualified by their subsystem and owner.
//!
//! - [`lower`] / [`lower_with`]: parse a [`Module`](quix_parse::Module) if
//!   needed, lower it, report failures under `Ticket::CONVERT`
//! - [`lower_tree`]: lower any arena and root, reporting nothing
//! - [`LowerError`]: why a tree could not be lowered
//!
//! ```
//! use quix_parse::Module;
//!
//! let mut module = Module::from_text("let x: i32 = 1 + 2;", "demo.q");
//! let ir = quix_lower::lower(&mut module)?;
//! assert_eq!(ir.render(), "(seq (let x i32 (+ 1 2)))");
//! # Ok::<(), quix_lower::LowerError>(())
//! ```

mod error;
pub mod ir;
mod lower;

pub use error::LowerError;
pub use ir::{IrArena, IrFlags, IrId, IrKind, IrModule, IrOp};
pub use lower::{lower, lower_tree, lower_with, LowerConfig};
