//! Lock-wrapped manager for pushes from parallel traversal callbacks.

use parking_lot::Mutex;

use crate::{DiagMessage, DiagnosticManager, Ticket};

#[derive(Debug, Default)]
pub struct ConcurrentDiagnostics {
    inner: Mutex<DiagnosticManager>,
}

impl ConcurrentDiagnostics {
    pub fn new(manager: DiagnosticManager) -> Self {
        ConcurrentDiagnostics {
            inner: Mutex::new(manager),
        }
    }

    pub fn push(&self, ticket: Ticket, msg: DiagMessage) -> bool {
        self.inner.lock().push(ticket, msg)
    }

    pub fn count(&self, ticket: Ticket) -> usize {
        self.inner.lock().count(ticket)
    }

    pub fn has_failed(&self) -> bool {
        self.inner.lock().has_failed()
    }

    /// Run `f` with the manager locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut DiagnosticManager) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn into_inner(self) -> DiagnosticManager {
        self.inner.into_inner()
    }
}
