//! Grammar productions.
//!
//! Each module extends [`Parser`](crate::Parser) with the productions for
//! one part of the language:
//!
//! - [`block`]: the statement loop, keyword dispatch and error recovery
//! - [`decl`]: `let`/`var`/`const`, `type`, `enum`, aggregates,
//!   `subsystem` and `pub`/`import`
//! - [`func`]: function properties, signatures, bodies and contracts
//! - [`control`]: returns, branches, loops, `switch` and `__asm__`
//! - [`expr`]: the operand-stack expression parser
//! - [`ty`]: type constructors
//!
//! Expressions have no precedence table. An operator takes everything to
//! its right up to the current terminator as its right operand, so chains
//! group to the right: `a + b * c` is `a + (b * c)` and `a * b + c` is
//! `a * (b + c)`. Parentheses group as usual.

mod block;
mod control;
mod decl;
mod expr;
mod func;
mod ty;
