//! The `emit` command: the binary node graph.

use std::io::Write;

use quix_ir::serialize::write_binary;

use super::{may_print, open, parse_root, report, Status};
use crate::{CliError, Options};

/// Write the graph only when the module has no errors.
pub fn emit(
    text: &str,
    filename: &str,
    options: &Options,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<Status, CliError> {
    let mut module = open(text, filename, options);
    let root = parse_root(&mut module);
    let failed = report(&mut module, options, err)?;
    match root {
        Some(root) if !failed && may_print(&module) => {
            let mut bytes = Vec::new();
            write_binary(&mut bytes, module.arena(), module.interner(), root)?;
            out.write_all(&bytes)?;
            Ok(Status::Success)
        }
        _ => Ok(Status::Failed),
    }
}
