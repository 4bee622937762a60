//! Recursion safety for the parser and lowering passes.
//!
//! Two tools live here:
//!
//! - [`ensure_sufficient_stack`] grows the native stack on demand, so a
//!   deeply nested input degrades into a slow parse instead of a crash.
//! - [`DepthLimit`] counts logical nesting and turns a runaway recursion into
//!   an ordinary error value that callers report as a diagnostic.
//!
//! Nothing here catches a fault. A parse is not wrapped in a signal
//! handler; the fault conditions are made unreachable instead.

use thiserror::Error;

/// Remaining stack below which we allocate a new segment (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (2MB).
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack; call straight through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Nesting limit was exceeded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[error("nesting depth {depth} exceeds the limit of {limit}")]
pub struct DepthExceeded {
    pub depth: u32,
    pub limit: u32,
}

/// Logical recursion counter.
///
/// `enter` hands out the next depth or fails once `limit` is passed. The
/// counter itself is a plain value: recursive functions pass `depth + 1`
/// down rather than sharing mutable state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DepthLimit {
    limit: u32,
}

impl DepthLimit {
    pub const fn new(limit: u32) -> Self {
        DepthLimit { limit }
    }

    pub const fn limit(self) -> u32 {
        self.limit
    }

    /// Check `depth` against the limit.
    #[inline]
    pub fn check(self, depth: u32) -> Result<u32, DepthExceeded> {
        if depth > self.limit {
            Err(DepthExceeded {
                depth,
                limit: self.limit,
            })
        } else {
            Ok(depth)
        }
    }

    /// Check `depth`, then run `f` on a stack with enough headroom.
    #[inline]
    pub fn enter<R>(
        self,
        depth: u32,
        f: impl FnOnce(u32) -> R,
    ) -> Result<R, DepthExceeded> {
        let depth = self.check(depth)?;
        Ok(ensure_sufficient_stack(|| f(depth)))
    }
}
