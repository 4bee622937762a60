//! Terminator sets for the expression parser.
//!
//! An expression ends at the first token in its [`Stop`] set. The token is
//! left unconsumed for the caller. Membership is a single bit test: punctors
//! take the low bits, operators start at [`OPERATOR_BASE`], end of input
//! takes the top bit.

use quix_ir::{Operator, Punctor, Token, TokenKind};

const OPERATOR_BASE: u32 = 16;
const EOF_BIT: u32 = 127;

const _: () = assert!(Punctor::ALL.len() <= OPERATOR_BASE as usize);
const _: () = assert!(OPERATOR_BASE as usize + Operator::ALL.len() <= EOF_BIT as usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) struct Stop(u128);

impl Stop {
    pub const NONE: Stop = Stop(0);

    /// `;`
    pub const SEMI: Stop = Stop::NONE.punct(Punctor::Semicolon);

    /// `,` or `)`, for call arguments and parameter defaults.
    pub const ARG: Stop = Stop::NONE.punct(Punctor::Comma).punct(Punctor::RParen);

    /// `{` or `=>`, ahead of a statement body.
    pub const BODY: Stop = Stop::NONE.punct(Punctor::LBrace).op(Operator::Arrow);

    /// End of input, for re-lexed format string holes.
    pub const EOF: Stop = Stop(1 << EOF_BIT);

    #[must_use]
    pub const fn punct(self, p: Punctor) -> Self {
        Stop(self.0 | (1 << p as u32))
    }

    #[must_use]
    pub const fn op(self, op: Operator) -> Self {
        Stop(self.0 | (1 << (OPERATOR_BASE + op as u32)))
    }

    pub fn contains(self, token: &Token) -> bool {
        let bit = match token.kind {
            TokenKind::Punctor(p) => p as u32,
            TokenKind::Operator(op) => OPERATOR_BASE + op as u32,
            TokenKind::Eof => EOF_BIT,
            _ => return false,
        };
        self.0 & (1 << bit) != 0
    }
}
