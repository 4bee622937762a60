//! Diagnostics for the QUIX front end.
//!
//! A [`DiagnosticManager`] belongs to one module. Passes push
//! [`DiagMessage`]s under a [`Ticket`]; the driver renders them in one of
//! the [`DiagFormat`]s and checks [`DiagnosticManager::has_failed`] before
//! moving to the next phase.
//!
//! ```text
//! let mut diags = DiagnosticManager::default();
//! diags.push(Ticket::PARSE, DiagMessage::error(IssueCode::SyntaxError, "Expected ';'").at(span));
//! diags.render(Ticket::ALL, DiagFormat::Plain, Some(&mut lexer), &mut |text, _| eprintln!("{text}"));
//! ```

mod concurrent;
mod issue;
mod manager;
mod message;
pub mod render;
mod severity;
mod ticket;

pub use concurrent::ConcurrentDiagnostics;
pub use issue::IssueCode;
pub use manager::{DiagnosticConfig, DiagnosticManager, TicketGuard};
pub use message::DiagMessage;
pub use render::{render_message, ColorMode, DiagFormat, UnknownFormat};
pub use severity::Severity;
pub use ticket::Ticket;
