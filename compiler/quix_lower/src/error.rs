//! Lowering errors.

use quix_diagnostic::IssueCode;
use quix_ir::{NodeKind, Span};
use quix_parse::ParseError;
use quix_stack::DepthExceeded;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LowerError {
    /// The module did not parse; its diagnostics already say why.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A required child slot is empty or points outside the arena.
    #[error("{} is missing {what}", .kind.name())]
    Malformed {
        kind: NodeKind,
        what: &'static str,
        span: Span,
    },
    #[error("expected a type, found {}", .found.name())]
    NotAType { found: NodeKind, span: Span },
    #[error("{what} cannot be lowered")]
    Unsupported { what: String, span: Span },
    #[error("{source}")]
    TooDeep {
        #[source]
        source: DepthExceeded,
        span: Span,
    },
}

impl LowerError {
    pub fn span(&self) -> Span {
        match self {
            LowerError::Parse(e) => e.span(),
            LowerError::Malformed { span, .. }
            | LowerError::NotAType { span, .. }
            | LowerError::Unsupported { span, .. }
            | LowerError::TooDeep { span, .. } => *span,
        }
    }

    /// Issue reported under the `CONVERT` ticket.
    pub fn code(&self) -> IssueCode {
        match self {
            LowerError::Parse(ParseError::Syntax { .. }) => IssueCode::SyntaxError,
            LowerError::Parse(ParseError::TooDeep { .. }) | LowerError::TooDeep { .. } => {
                IssueCode::NestingTooDeep
            }
            LowerError::Malformed { .. } => IssueCode::PTreeInvalid,
            LowerError::NotAType { .. } => IssueCode::DSBadType,
            LowerError::Unsupported { .. } => IssueCode::Default,
        }
    }
}
