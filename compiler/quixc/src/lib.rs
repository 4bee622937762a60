//! Command-line driver for the QUIX front end.
//!
//! ```text
//! source ──► lex ──► parse ──► check / hash / emit
//!                      │
//!                      ▼
//!                    lower
//! ```
//!
//! The binary in `main.rs` only parses arguments, sets up logging and maps
//! the result to an exit code. Everything else lives here so tests can run
//! commands over in-memory text.

pub mod commands;
mod error;
mod logging;
mod options;

pub use commands::{run, run_source, Status};
pub use error::CliError;
pub use logging::init_tracing;
pub use options::{parse_args, usage, Action, Command, Invocation, Options};
