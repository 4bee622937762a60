use std::fmt;

/// How serious a diagnostic is.
///
/// Ordered: `Debug < Info < Warn < Error < FatalError`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    FatalError,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warning",
            Severity::Error => "error",
            Severity::FatalError => "fatal error",
        }
    }

    /// `Error` and `FatalError` fail the module.
    pub const fn is_error(self) -> bool {
        matches!(self, Severity::Error | Severity::FatalError)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
