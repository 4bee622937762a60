//! Node arena.
//!
//! [`NodeArena`] is an append-only store using struct-of-arrays layout
//! (parallel `data`, `spans`, `flags` arrays indexed by [`NodeId`]). Nodes
//! are never freed individually; dropping the arena frees all of them.
//!
//! A nested sub-task gets its own allocation scope through
//! [`NodeArena::scoped`], which swaps in a fresh arena and puts the
//! original back when the guard drops.

use std::mem;
use std::ops::{Deref, DerefMut};

use crate::{NodeData, NodeFlags, NodeId, NodeKind, Slots, Span};

#[cold]
#[inline(never)]
fn arena_full() -> ! {
    panic!("node arena exceeded {} nodes", u32::MAX - 1)
}

#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    data: Vec<NodeData>,
    spans: Vec<Span>,
    flags: Vec<NodeFlags>,
    bytes: usize,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arena pre-sized from source length, at roughly one node per 8 bytes.
    pub fn with_capacity(source_len: usize) -> Self {
        let estimated = source_len / 8;
        NodeArena {
            data: Vec::with_capacity(estimated),
            spans: Vec::with_capacity(estimated),
            flags: Vec::with_capacity(estimated),
            bytes: 0,
        }
    }

    /// Allocate a node.
    ///
    /// # Panics
    /// Panics past `u32::MAX - 1` nodes; the last index is reserved for
    /// [`NodeId::INVALID`].
    pub fn alloc(&mut self, data: NodeData, span: Span) -> NodeId {
        let Ok(raw) = u32::try_from(self.data.len()) else {
            arena_full()
        };
        if raw == u32::MAX {
            arena_full();
        }
        self.bytes += data.kind().byte_size();
        self.data.push(data);
        self.spans.push(span);
        self.flags.push(NodeFlags::empty());
        NodeId::new(raw)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &NodeData {
        &self.data[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.data[id.index()]
    }

    /// Bounds-checked lookup; `None` for `INVALID` and foreign ids.
    pub fn try_get(&self, id: NodeId) -> Option<&NodeData> {
        self.data.get(id.index())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.data.len()
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.data[id.index()].kind()
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.spans[id.index()]
    }

    pub fn set_span(&mut self, id: NodeId, span: Span) {
        self.spans[id.index()] = span;
    }

    #[inline]
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.flags[id.index()]
    }

    pub fn set_flag(&mut self, id: NodeId, flag: NodeFlags, on: bool) {
        self.flags[id.index()].set(flag, on);
    }

    /// Occupied child slots of `id`.
    pub fn children(&self, id: NodeId) -> Slots<NodeId> {
        self.get(id).children()
    }

    /// Overwrite child slot `slot` of `parent`, returning the previous value.
    ///
    /// Returns `None` when `slot` is out of range for the node's kind; the
    /// node's shape never changes.
    pub fn set_child(&mut self, parent: NodeId, slot: usize, child: NodeId) -> Option<NodeId> {
        let mut slots = self.get_mut(parent).slots_mut();
        let target = slots.get_mut(slot)?;
        Some(mem::replace(&mut **target, child))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes accounted for by every allocation so far.
    pub fn bytes_used(&self) -> usize {
        self.bytes
    }

    /// Every allocated id, in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.data.len()).map(|i| NodeId::new(i as u32))
    }

    /// Swap in a fresh arena until the returned guard drops.
    pub fn scoped(&mut self) -> ArenaGuard<'_> {
        self.scoped_with(NodeArena::new())
    }

    /// Swap in `nested` until the returned guard drops.
    pub fn scoped_with(&mut self, nested: NodeArena) -> ArenaGuard<'_> {
        let outer = mem::replace(self, nested);
        tracing::trace!(outer_nodes = outer.len(), "arena scope entered");
        ArenaGuard {
            slot: self,
            outer: Some(outer),
        }
    }
}

/// Restores the outer arena on drop.
///
/// Derefs to the nested arena. Dropping discards the nested nodes;
/// [`ArenaGuard::finish`] hands them back instead.
pub struct ArenaGuard<'a> {
    slot: &'a mut NodeArena,
    outer: Option<NodeArena>,
}

impl ArenaGuard<'_> {
    /// Restore the outer arena and return the nested one.
    pub fn finish(mut self) -> NodeArena {
        match self.outer.take() {
            Some(outer) => mem::replace(self.slot, outer),
            None => mem::take(self.slot),
        }
    }
}

impl Deref for ArenaGuard<'_> {
    type Target = NodeArena;

    fn deref(&self) -> &NodeArena {
        self.slot
    }
}

impl DerefMut for ArenaGuard<'_> {
    fn deref_mut(&mut self) -> &mut NodeArena {
        self.slot
    }
}

impl Drop for ArenaGuard<'_> {
    fn drop(&mut self) {
        if let Some(outer) = self.outer.take() {
            let nested = mem::replace(self.slot, outer);
            tracing::trace!(nested_nodes = nested.len(), "arena scope discarded");
        }
    }
}

#[cfg(test)]
mod tests;
