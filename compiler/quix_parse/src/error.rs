//! Parse errors.
//!
//! Every [`ParseError`] has already been reported to the module's
//! diagnostics when it is created. Callers only decide how far to unwind:
//! a block catches it and skips ahead, a fast-error parse lets it reach the
//! driver.

use quix_ir::Span;
use quix_stack::DepthExceeded;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{message}")]
    Syntax { message: String, span: Span },
    #[error("{source}")]
    TooDeep {
        #[source]
        source: DepthExceeded,
        span: Span,
    },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Syntax { span, .. } | ParseError::TooDeep { span, .. } => *span,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
