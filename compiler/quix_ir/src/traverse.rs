//! Multi-order traversal and in-place rewrite engine.
//!
//! # Design
//!
//! A walk starts from a mutable root slot and visits nodes in one of the
//! [`TraversalOrder`]s. The callback receives a [`VisitCtx`] naming the
//! parent (None for the root), the node, and mutable access to the arena.
//! Calling [`VisitCtx::replace`] rewrites the slot that held the node,
//! which is how rewrite passes are written; there is no rebuild step.
//!
//! Every walk carries a visited set, so a node reachable through several
//! slots (or through a cycle introduced by a rewrite) is visited once.
//! Empty slots are skipped.
//!
//! Walks are iterative; deep trees do not grow the native stack. A slot
//! or replacement naming a node outside the arena ends the walk with
//! [`WalkError::Dangling`] before anything reads it.
//!
//! # Example
//!
//! ```text
//! walk(&mut arena, &mut root, TraversalOrder::DfsPre, |ctx| {
//!     if ctx.kind() == NodeKind::Undef {
//!         let null = ctx.arena_mut().alloc(NodeData::Null, Span::DUMMY);
//!         ctx.replace(null);
//!     }
//!     IterOp::Proceed
//! })?;
//! ```

use std::cmp::Ordering;
use std::collections::VecDeque;

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::{NodeArena, NodeId, NodeKind};

/// Callback verdict.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IterOp {
    Proceed,
    /// Stop the whole walk.
    Abort,
    /// Do not descend below this node. Pre-orders only.
    SkipChildren,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraversalOrder {
    DfsPre,
    DfsPost,
    BfsPre,
    /// Level order reversed: deepest level first, each level left to right.
    BfsPost,
    /// Immediate children of the root only.
    Children,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WalkOutcome {
    Completed,
    Aborted,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum WalkError {
    #[error("SkipChildren returned for {node:?} during a post-order walk")]
    SkipChildrenInPostOrder { node: NodeId },
    #[error("{node:?} is not in the arena")]
    Dangling { node: NodeId },
}

/// A child as seen by a comparator: its slot position and current value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChildRef {
    pub slot: usize,
    pub node: NodeId,
}

/// Child ordering. Children are visited in slot order unless one is given.
pub type Comparator<'c> = dyn Fn(&NodeArena, &ChildRef, &ChildRef) -> Ordering + Sync + 'c;

#[derive(Copy, Clone, Default)]
pub struct WalkOptions<'c> {
    pub comparator: Option<&'c Comparator<'c>>,
}

/// Per-visit view handed to callbacks.
pub struct VisitCtx<'a> {
    arena: &'a mut NodeArena,
    parent: Option<NodeId>,
    node: NodeId,
    replaced: bool,
}

impl VisitCtx<'_> {
    /// `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn kind(&self) -> NodeKind {
        self.arena.kind(self.node)
    }

    pub fn arena(&self) -> &NodeArena {
        self.arena
    }

    pub fn arena_mut(&mut self) -> &mut NodeArena {
        self.arena
    }

    /// Rewrite the slot holding this node.
    ///
    /// Pre-order walks then descend into `new` instead of the old node.
    pub fn replace(&mut self, new: NodeId) {
        self.node = new;
        self.replaced = true;
    }
}

/// Where a node hangs: the root slot, or slot `slot` of `parent`.
#[derive(Copy, Clone, Debug)]
struct Site {
    parent: Option<NodeId>,
    slot: usize,
}

impl Site {
    const ROOT: Site = Site {
        parent: None,
        slot: 0,
    };
}

struct Walker<'a, 'c, F> {
    arena: &'a mut NodeArena,
    root: &'a mut NodeId,
    options: WalkOptions<'c>,
    visited: FxHashSet<NodeId>,
    callback: F,
}

impl<F> Walker<'_, '_, F>
where
    F: FnMut(&mut VisitCtx<'_>) -> IterOp,
{
    /// Current content of a site.
    fn read(&self, site: Site) -> NodeId {
        match site.parent {
            None => *self.root,
            Some(parent) => self
                .arena
                .get(parent)
                .slots()
                .get(site.slot)
                .copied()
                .unwrap_or(NodeId::INVALID),
        }
    }

    /// The node at `site`, unless the slot is empty or already visited.
    fn enter(&mut self, site: Site) -> Result<Option<NodeId>, WalkError> {
        let node = self.read(site);
        if !node.is_valid() || !self.visited.insert(node) {
            return Ok(None);
        }
        self.check(node)?;
        Ok(Some(node))
    }

    fn check(&self, node: NodeId) -> Result<(), WalkError> {
        if self.arena.contains(node) {
            Ok(())
        } else {
            Err(WalkError::Dangling { node })
        }
    }

    /// Occupied child sites of `node`, in visiting order.
    fn child_sites(&self, node: NodeId) -> Vec<Site> {
        let mut refs: Vec<ChildRef> = self
            .arena
            .get(node)
            .slots()
            .into_iter()
            .enumerate()
            .filter(|(_, id)| id.is_valid())
            .map(|(slot, node)| ChildRef { slot, node })
            .collect();
        if let Some(cmp) = self.options.comparator {
            let arena: &NodeArena = &*self.arena;
            refs.sort_by(|a, b| cmp(arena, a, b));
        }
        refs.into_iter()
            .map(|c| Site {
                parent: Some(node),
                slot: c.slot,
            })
            .collect()
    }

    /// Run the callback on `node` at `site`, applying any replacement.
    /// Returns the verdict and the node now occupying the site.
    fn visit(&mut self, site: Site, node: NodeId) -> Result<(IterOp, NodeId), WalkError> {
        let mut ctx = VisitCtx {
            arena: &mut *self.arena,
            parent: site.parent,
            node,
            replaced: false,
        };
        let op = (self.callback)(&mut ctx);
        let VisitCtx {
            node: current,
            replaced,
            ..
        } = ctx;

        if replaced {
            if current.is_valid() {
                self.check(current)?;
            }
            match site.parent {
                None => *self.root = current,
                Some(parent) => {
                    if self.arena.set_child(parent, site.slot, current).is_none() {
                        tracing::warn!(?parent, slot = site.slot, "replace on vanished slot");
                    }
                }
            }
        }
        Ok((op, current))
    }

    fn dfs_pre(&mut self) -> Result<WalkOutcome, WalkError> {
        let mut stack = vec![Site::ROOT];
        while let Some(site) = stack.pop() {
            let Some(node) = self.enter(site)? else {
                continue;
            };
            let (op, current) = self.visit(site, node)?;
            match op {
                IterOp::Abort => return Ok(WalkOutcome::Aborted),
                IterOp::SkipChildren => continue,
                IterOp::Proceed => {}
            }
            if !current.is_valid() {
                continue;
            }
            self.visited.insert(current);
            let mut children = self.child_sites(current);
            children.reverse();
            stack.extend(children);
        }
        Ok(WalkOutcome::Completed)
    }

    fn dfs_post(&mut self) -> Result<WalkOutcome, WalkError> {
        // (site, Some(node)) marks a node whose children are done.
        let mut stack: Vec<(Site, Option<NodeId>)> = vec![(Site::ROOT, None)];
        while let Some((site, expanded)) = stack.pop() {
            if let Some(node) = expanded {
                match self.visit(site, node)?.0 {
                    IterOp::Abort => return Ok(WalkOutcome::Aborted),
                    IterOp::SkipChildren => {
                        return Err(WalkError::SkipChildrenInPostOrder { node })
                    }
                    IterOp::Proceed => {}
                }
                continue;
            }

            let Some(node) = self.enter(site)? else {
                continue;
            };
            stack.push((site, Some(node)));
            let mut children = self.child_sites(node);
            children.reverse();
            stack.extend(children.into_iter().map(|c| (c, None)));
        }
        Ok(WalkOutcome::Completed)
    }

    fn bfs_pre(&mut self) -> Result<WalkOutcome, WalkError> {
        let mut queue = VecDeque::from([Site::ROOT]);
        while let Some(site) = queue.pop_front() {
            let Some(node) = self.enter(site)? else {
                continue;
            };
            let (op, current) = self.visit(site, node)?;
            match op {
                IterOp::Abort => return Ok(WalkOutcome::Aborted),
                IterOp::SkipChildren => continue,
                IterOp::Proceed => {}
            }
            if current.is_valid() {
                self.visited.insert(current);
                queue.extend(self.child_sites(current));
            }
        }
        Ok(WalkOutcome::Completed)
    }

    fn bfs_post(&mut self) -> Result<WalkOutcome, WalkError> {
        let mut levels: Vec<Vec<(Site, NodeId)>> = Vec::new();
        let mut frontier = vec![Site::ROOT];
        while !frontier.is_empty() {
            let mut level = Vec::new();
            let mut next = Vec::new();
            for site in frontier {
                let Some(node) = self.enter(site)? else {
                    continue;
                };
                next.extend(self.child_sites(node));
                level.push((site, node));
            }
            if !level.is_empty() {
                levels.push(level);
            }
            frontier = next;
        }

        for level in levels.into_iter().rev() {
            for (site, node) in level {
                match self.visit(site, node)?.0 {
                    IterOp::Abort => return Ok(WalkOutcome::Aborted),
                    IterOp::SkipChildren => {
                        return Err(WalkError::SkipChildrenInPostOrder { node })
                    }
                    IterOp::Proceed => {}
                }
            }
        }
        Ok(WalkOutcome::Completed)
    }

    fn children(&mut self) -> Result<WalkOutcome, WalkError> {
        let Some(root) = self.enter(Site::ROOT)? else {
            return Ok(WalkOutcome::Completed);
        };
        for site in self.child_sites(root) {
            let Some(node) = self.enter(site)? else {
                continue;
            };
            if self.visit(site, node)?.0 == IterOp::Abort {
                return Ok(WalkOutcome::Aborted);
            }
        }
        Ok(WalkOutcome::Completed)
    }
}

/// Walk from `root` in `order`, children in slot order.
pub fn walk<F>(
    arena: &mut NodeArena,
    root: &mut NodeId,
    order: TraversalOrder,
    callback: F,
) -> Result<WalkOutcome, WalkError>
where
    F: FnMut(&mut VisitCtx<'_>) -> IterOp,
{
    walk_with(arena, root, order, WalkOptions::default(), callback)
}

/// Walk from `root` in `order` with explicit options.
pub fn walk_with<F>(
    arena: &mut NodeArena,
    root: &mut NodeId,
    order: TraversalOrder,
    options: WalkOptions<'_>,
    callback: F,
) -> Result<WalkOutcome, WalkError>
where
    F: FnMut(&mut VisitCtx<'_>) -> IterOp,
{
    tracing::trace!(?order, root = ?*root, "walk");
    let mut walker = Walker {
        arena,
        root,
        options,
        visited: FxHashSet::default(),
        callback,
    };
    match order {
        TraversalOrder::DfsPre => walker.dfs_pre(),
        TraversalOrder::DfsPost => walker.dfs_post(),
        TraversalOrder::BfsPre => walker.bfs_pre(),
        TraversalOrder::BfsPost => walker.bfs_post(),
        TraversalOrder::Children => walker.children(),
    }
}

/// Visit the immediate children of `node` in parallel.
///
/// The callback gets `(parent, child)` and may only read. All tasks are
/// joined before returning. `Abort` stops scheduling further children;
/// children already running finish.
pub fn for_each_child_par<F>(arena: &NodeArena, node: NodeId, callback: F) -> WalkOutcome
where
    F: Fn(NodeId, NodeId) -> IterOp + Sync,
{
    let children = arena.children(node);
    let result = children.as_slice().par_iter().try_for_each(|&child| {
        if callback(node, child) == IterOp::Abort {
            Err(())
        } else {
            Ok(())
        }
    });
    match result {
        Ok(()) => WalkOutcome::Completed,
        Err(()) => WalkOutcome::Aborted,
    }
}

#[cfg(test)]
mod tests;
