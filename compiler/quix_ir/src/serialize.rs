//! Node graph serialization.
//!
//! - [`sexpr`]: human-readable s-expression text, write only
//! - [`binary`]: compact self-describing form that reads back to an
//!   equivalent arena and interner

mod binary;
mod sexpr;

use thiserror::Error;

use crate::InternError;

pub use binary::{read_binary, write_binary, Decoded, MAGIC, VERSION};
pub use sexpr::{escape_string, to_sexpr, SexprOptions};

/// Serialization or deserialization failed.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a QUIX binary graph (magic {found:02x?})")]
    BadMagic { found: [u8; 4] },
    #[error("unsupported binary graph version {version}")]
    UnsupportedVersion { version: u32 },
    #[error("payload truncated: header says {expected} bytes, found {found}")]
    LengthMismatch { expected: u64, found: u64 },
    #[error("payload codec error: {0}")]
    Codec(#[source] bincode::Error),
    #[error("node {parent} refers to missing node {child}")]
    DanglingChild { parent: u32, child: u32 },
    #[error("root {root} is not a node in the graph")]
    InvalidRoot { root: u32 },
    #[error(transparent)]
    Intern(#[from] InternError),
}
