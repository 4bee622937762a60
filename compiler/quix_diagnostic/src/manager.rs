//! Per-module diagnostics store.
//!
//! Messages live in channels keyed by [`Ticket`]. Within a channel they keep
//! push order, and an exact repeat (same severity, code, subject and
//! location pair) is dropped. Rendering and counting accept the `ALL` and
//! `LAST` selectors.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use quix_ir::SourceView;
use rustc_hash::FxHashSet;

use crate::render::{render_message, DiagFormat};
use crate::{DiagMessage, Severity, Ticket};

/// Diagnostics behavior knobs.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Drop exact repeats within a channel.
    pub deduplicate: bool,
    /// Abort the parse at the first error.
    pub fast_error: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            deduplicate: true,
            fast_error: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Channel {
    messages: Vec<DiagMessage>,
    seen: FxHashSet<u64>,
}

impl Channel {
    fn clear(&mut self) -> usize {
        let n = self.messages.len();
        self.messages.clear();
        self.seen.clear();
        n
    }
}

#[derive(Clone, Debug)]
pub struct DiagnosticManager {
    config: DiagnosticConfig,
    channels: BTreeMap<Ticket, Channel>,
    last: Ticket,
    current: Ticket,
    failed: bool,
}

impl Default for DiagnosticManager {
    fn default() -> Self {
        Self::new(DiagnosticConfig::default())
    }
}

impl DiagnosticManager {
    pub fn new(config: DiagnosticConfig) -> Self {
        let mut channels = BTreeMap::new();
        channels.insert(Ticket::CONVERT, Channel::default());
        DiagnosticManager {
            config,
            channels,
            last: Ticket::CONVERT,
            current: Ticket::CONVERT,
            failed: false,
        }
    }

    pub fn config(&self) -> DiagnosticConfig {
        self.config
    }

    /// Map a pushing ticket to a concrete channel.
    fn target(&self, ticket: Ticket) -> Ticket {
        match ticket {
            Ticket::LAST => self.last,
            Ticket::ALL => self.current,
            t => t,
        }
    }

    /// Store `msg` under `ticket`.
    ///
    /// `LAST` pushes to the most recently used channel and `ALL` to the
    /// current default. Returns `false` if the message was a duplicate.
    pub fn push(&mut self, ticket: Ticket, msg: DiagMessage) -> bool {
        let ticket = self.target(ticket);
        if msg.severity.is_error() {
            self.failed = true;
        }
        self.last = ticket;

        let dedup = self.config.deduplicate;
        let channel = self.channels.entry(ticket).or_default();
        if dedup && !channel.seen.insert(msg.fingerprint()) {
            tracing::trace!(?ticket, code = msg.code.code(), "dropped duplicate diagnostic");
            return false;
        }
        tracing::debug!(
            ?ticket,
            severity = %msg.severity,
            code = msg.code.code(),
            subject = %msg.subject,
            "diagnostic"
        );
        channel.messages.push(msg);
        true
    }

    /// Push to the current default ticket.
    pub fn emit(&mut self, msg: DiagMessage) -> bool {
        self.push(self.current, msg)
    }

    /// Messages selected by `ticket`, in channel then push order.
    pub fn messages(&self, ticket: Ticket) -> Vec<&DiagMessage> {
        match ticket {
            Ticket::ALL => self
                .channels
                .values()
                .flat_map(|c| c.messages.iter())
                .collect(),
            t => self
                .channels
                .get(&self.target(t))
                .map(|c| c.messages.iter().collect())
                .unwrap_or_default(),
        }
    }

    pub fn count(&self, ticket: Ticket) -> usize {
        match ticket {
            Ticket::ALL => self.channels.values().map(|c| c.messages.len()).sum(),
            t => self
                .channels
                .get(&self.target(t))
                .map_or(0, |c| c.messages.len()),
        }
    }

    /// Drop the selected messages and their dedup state.
    pub fn clear(&mut self, ticket: Ticket) -> usize {
        match ticket {
            Ticket::ALL => self.channels.values_mut().map(Channel::clear).sum(),
            t => {
                let t = self.target(t);
                self.channels.get_mut(&t).map_or(0, Channel::clear)
            }
        }
    }

    /// Whether any `Error` or `FatalError` was ever pushed. Clearing does
    /// not reset this.
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Whether a `FatalError` is stored under any ticket.
    pub fn has_fatal(&self) -> bool {
        self.channels
            .values()
            .flat_map(|c| c.messages.iter())
            .any(|m| m.severity == Severity::FatalError)
    }

    /// Format every selected message and hand it to `sink`.
    ///
    /// Returns the number of messages rendered.
    pub fn render(
        &self,
        ticket: Ticket,
        format: DiagFormat,
        mut source: Option<&mut (dyn SourceView + '_)>,
        sink: &mut dyn FnMut(&str, Severity),
    ) -> usize {
        let messages = self.messages(ticket);
        for msg in &messages {
            let text = render_message(msg, format, source.as_deref_mut());
            sink(&text, msg.severity);
        }
        messages.len()
    }

    pub fn current(&self) -> Ticket {
        self.current
    }

    /// Make `ticket` the default for [`emit`](Self::emit) until the guard
    /// drops.
    pub fn scoped(&mut self, ticket: Ticket) -> TicketGuard<'_> {
        let previous = self.current;
        self.current = self.target(ticket);
        TicketGuard {
            manager: self,
            previous,
        }
    }
}

/// Restores the previous default ticket on drop.
pub struct TicketGuard<'a> {
    manager: &'a mut DiagnosticManager,
    previous: Ticket,
}

impl Deref for TicketGuard<'_> {
    type Target = DiagnosticManager;

    fn deref(&self) -> &DiagnosticManager {
        self.manager
    }
}

impl DerefMut for TicketGuard<'_> {
    fn deref_mut(&mut self) -> &mut DiagnosticManager {
        self.manager
    }
}

impl Drop for TicketGuard<'_> {
    fn drop(&mut self) {
        self.manager.current = self.previous;
    }
}

#[cfg(test)]
mod tests;
