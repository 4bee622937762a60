//! Binary form.
//!
//! ```text
//! +------+---------+-------------+-------------------+
//! | QXB1 | version | payload len | bincode payload   |
//! | 4 B  | u32 LE  | u64 LE      | `len` bytes       |
//! +------+---------+-------------+-------------------+
//! ```
//!
//! The payload carries the string table by handle index, every node in
//! arena order, and the root. Handles and location tags are stored raw, so
//! a decoded graph indexes the same strings and locations as the original.

use std::io::{Read, Write};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    Location, NodeArena, NodeData, NodeFlags, NodeId, SharedInterner, Span, StringInterner,
};

use super::SerializeError;

pub const MAGIC: [u8; 4] = *b"QXB1";
pub const VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct NodeRecord {
    data: NodeData,
    start: u32,
    end: u32,
    flags: u8,
}

#[derive(Serialize, Deserialize)]
struct Payload {
    strings: Vec<Option<String>>,
    nodes: Vec<NodeRecord>,
    root: NodeId,
}

/// A graph read back by [`read_binary`].
#[derive(Debug)]
pub struct Decoded {
    pub arena: NodeArena,
    pub interner: SharedInterner,
    pub root: NodeId,
}

/// Write `arena` with `root` and the strings it names.
pub fn write_binary<W: Write>(
    out: &mut W,
    arena: &NodeArena,
    interner: &StringInterner,
    root: NodeId,
) -> Result<(), SerializeError> {
    if root.is_valid() && !arena.contains(root) {
        return Err(SerializeError::InvalidRoot { root: root.raw() });
    }
    let nodes = arena
        .ids()
        .map(|id| {
            let span = arena.span(id);
            NodeRecord {
                data: arena.get(id).clone(),
                start: span.start.raw(),
                end: span.end.raw(),
                flags: arena.flags(id).bits(),
            }
        })
        .collect();
    let payload = Payload {
        strings: interner.snapshot(),
        nodes,
        root,
    };
    let bytes = bincode::serialize(&payload).map_err(SerializeError::Codec)?;

    out.write_all(&MAGIC)?;
    out.write_all(&VERSION.to_le_bytes())?;
    out.write_all(&(bytes.len() as u64).to_le_bytes())?;
    out.write_all(&bytes)?;
    tracing::debug!(
        nodes = arena.len(),
        bytes = bytes.len(),
        "wrote binary node graph"
    );
    Ok(())
}

/// Read a graph written by [`write_binary`].
///
/// Every child slot is checked to be empty or to name a node in the file.
pub fn read_binary<R: Read>(input: &mut R) -> Result<Decoded, SerializeError> {
    let mut magic = [0u8; 4];
    input.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(SerializeError::BadMagic { found: magic });
    }

    let mut word = [0u8; 4];
    input.read_exact(&mut word)?;
    let version = u32::from_le_bytes(word);
    if version != VERSION {
        return Err(SerializeError::UnsupportedVersion { version });
    }

    let mut len = [0u8; 8];
    input.read_exact(&mut len)?;
    let expected = u64::from_le_bytes(len);
    let mut bytes = Vec::new();
    input.take(expected).read_to_end(&mut bytes)?;
    if bytes.len() as u64 != expected {
        return Err(SerializeError::LengthMismatch {
            expected,
            found: bytes.len() as u64,
        });
    }

    let payload: Payload = bincode::deserialize(&bytes).map_err(SerializeError::Codec)?;
    let interner = StringInterner::restore(payload.strings)?;

    let mut arena = NodeArena::with_capacity(payload.nodes.len() * 8);
    for record in payload.nodes {
        let span = Span::new(
            Location::from_raw(record.start),
            Location::from_raw(record.end),
        );
        let id = arena.alloc(record.data, span);
        arena.set_flag(id, NodeFlags::from_bits_truncate(record.flags), true);
    }

    for id in arena.ids() {
        if let Some(&child) = arena
            .get(id)
            .children()
            .iter()
            .find(|&&child| !arena.contains(child))
        {
            return Err(SerializeError::DanglingChild {
                parent: id.raw(),
                child: child.raw(),
            });
        }
    }
    if payload.root.is_valid() && !arena.contains(payload.root) {
        return Err(SerializeError::InvalidRoot {
            root: payload.root.raw(),
        });
    }

    tracing::debug!(nodes = arena.len(), "read binary node graph");
    Ok(Decoded {
        arena,
        interner: Arc::new(interner),
        root: payload.root,
    })
}
