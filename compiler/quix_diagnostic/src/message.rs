use std::hash::{Hash, Hasher};

use quix_ir::{Location, Span};
use rustc_hash::FxHasher;

use crate::{IssueCode, Severity};

/// One diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagMessage {
    pub severity: Severity,
    pub code: IssueCode,
    pub subject: String,
    pub start: Location,
    pub end: Location,
}

impl DiagMessage {
    pub fn new(severity: Severity, code: IssueCode, subject: impl Into<String>) -> Self {
        DiagMessage {
            severity,
            code,
            subject: subject.into(),
            start: Location::UNKNOWN,
            end: Location::UNKNOWN,
        }
    }

    pub fn error(code: IssueCode, subject: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, subject)
    }

    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        self.start = span.start;
        self.end = span.end;
        self
    }

    /// Dedup key over every field.
    pub fn fingerprint(&self) -> u64 {
        let mut h = FxHasher::default();
        self.severity.hash(&mut h);
        self.code.hash(&mut h);
        self.subject.hash(&mut h);
        self.start.raw().hash(&mut h);
        self.end.raw().hash(&mut h);
        h.finish()
    }
}
