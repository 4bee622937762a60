//! The `lower` command.

use std::io::Write;

use quix_lower::{lower_with, LowerConfig};

use super::{may_print, open, report, Status};
use crate::{CliError, Options};

/// Print the lowered IR of a module that parsed cleanly.
pub fn lower(
    text: &str,
    filename: &str,
    options: &Options,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<Status, CliError> {
    let mut module = open(text, filename, options);
    let lowered = lower_with(&mut module, LowerConfig::default());
    let failed = report(&mut module, options, err)?;
    match lowered {
        Ok(ir) if !failed && may_print(&module) => {
            writeln!(out, "{}", ir.render())?;
            Ok(Status::Success)
        }
        Ok(_) => Ok(Status::Failed),
        Err(e) => {
            tracing::debug!(error = %e, "lowering failed");
            Ok(Status::Failed)
        }
    }
}
