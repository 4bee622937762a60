//! Driver errors.
//!
//! Problems in the QUIX source are diagnostics, not errors. These cover
//! the command line and the files around it.

use std::io;

use quix_diagnostic::UnknownFormat;
use quix_ir::SerializeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("missing command")]
    MissingCommand,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("`{0}` needs a file path")]
    MissingPath(&'static str),
    #[error("unexpected argument `{0}`")]
    ExtraArgument(String),
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error("`{0}` needs a value")]
    MissingValue(&'static str),
    #[error(transparent)]
    Format(#[from] UnknownFormat),
    #[error("unknown color mode `{0}` (expected auto, always or never)")]
    UnknownColor(String),

    #[error("cannot find file '{0}'")]
    NotFound(String),
    #[error("permission denied reading '{0}'")]
    PermissionDenied(String),
    #[error("'{0}' contains invalid UTF-8 data")]
    NotUtf8(String),
    #[error("error reading '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("error writing '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

impl CliError {
    /// Whether the command line itself was wrong, so usage is worth showing.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            CliError::MissingCommand
                | CliError::UnknownCommand(_)
                | CliError::MissingPath(_)
                | CliError::ExtraArgument(_)
                | CliError::UnknownOption(_)
                | CliError::MissingValue(_)
                | CliError::Format(_)
                | CliError::UnknownColor(_)
        )
    }

    pub(crate) fn reading(path: &str, error: io::Error) -> Self {
        let path = path.to_string();
        match error.kind() {
            io::ErrorKind::NotFound => CliError::NotFound(path),
            io::ErrorKind::PermissionDenied => CliError::PermissionDenied(path),
            io::ErrorKind::InvalidData => CliError::NotUtf8(path),
            _ => CliError::Read {
                path,
                source: error,
            },
        }
    }
}
