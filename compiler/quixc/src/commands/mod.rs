//! Command handlers for the `quixc` CLI.
//!
//! Every handler works on source text already in memory and writes its
//! result to `out` and its diagnostics to `err`, so the same code serves
//! the binary and the tests. [`run`] adds the file handling around them.

use std::fs;
use std::io::{self, Cursor, Read, Write};

use quix_diagnostic::Ticket;
use quix_ir::NodeId;
use quix_parse::Module;

use crate::{CliError, Command, Invocation, Options};

mod debug;
mod emit;
mod lower;

/// How a command finished.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Success,
    /// Diagnostics were reported; the process exits with status 1.
    Failed,
}

impl Status {
    pub fn from_failed(failed: bool) -> Self {
        if failed {
            Status::Failed
        } else {
            Status::Success
        }
    }

    pub fn exit_code(self) -> u8 {
        match self {
            Status::Success => 0,
            Status::Failed => 1,
        }
    }
}

/// Read the input, run the command, then place its output.
///
/// With `-o` the output is written to the file only when there is some, so
/// a failed run leaves no empty file behind.
pub fn run(
    invocation: &Invocation,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<Status, CliError> {
    let text = read_source(&invocation.path)?;
    let filename = if invocation.path == "-" {
        "<stdin>"
    } else {
        invocation.path.as_str()
    };
    match &invocation.options.output {
        None => run_source(invocation.command, &text, filename, &invocation.options, out, err),
        Some(path) => {
            let mut buffer = Vec::new();
            let status = run_source(
                invocation.command,
                &text,
                filename,
                &invocation.options,
                &mut buffer,
                err,
            )?;
            if !buffer.is_empty() {
                fs::write(path, &buffer).map_err(|source| CliError::Write {
                    path: path.display().to_string(),
                    source,
                })?;
            }
            Ok(status)
        }
    }
}

/// Run `command` over `text` as if it were read from `filename`.
#[tracing::instrument(level = "debug", skip(text, options, out, err))]
pub fn run_source(
    command: Command,
    text: &str,
    filename: &str,
    options: &Options,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<Status, CliError> {
    match command {
        Command::Lex => debug::lex(text, filename, out),
        Command::Parse => debug::parse(text, filename, options, out, err),
        Command::Check => debug::check(text, filename, options, out, err),
        Command::Hash => debug::hash(text, filename, options, out, err),
        Command::Lower => lower::lower(text, filename, options, out, err),
        Command::Emit => emit::emit(text, filename, options, out, err),
    }
}

/// Read a path, or standard input for `-`.
fn read_source(path: &str) -> Result<String, CliError> {
    if path == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| CliError::reading(path, e))?;
        return Ok(text);
    }
    fs::read_to_string(path).map_err(|e| CliError::reading(path, e))
}

type SourceModule = Module<Cursor<Vec<u8>>>;

fn open(text: &str, filename: &str, options: &Options) -> SourceModule {
    Module::from_text(text, filename).with_diagnostics(options.diagnostics)
}

/// Parse, keeping the root when the parser got that far. An aborted parse
/// has already reported why.
fn parse_root(module: &mut SourceModule) -> Option<NodeId> {
    match module.parse() {
        Ok(root) => Some(root),
        Err(e) => {
            tracing::debug!(error = %e, "parse aborted");
            None
        }
    }
}

/// Render every diagnostic of `module` to `err`. Returns whether the
/// module has failed.
fn report(module: &mut SourceModule, options: &Options, err: &mut dyn Write) -> io::Result<bool> {
    let mut rendered = Vec::new();
    module.render_diagnostics(Ticket::ALL, options.diag_format(), &mut |text, _| {
        rendered.push(text.to_string());
    });
    for text in &rendered {
        writeln!(err, "{text}")?;
    }
    Ok(module.has_failed())
}

/// Whether the command may still write output. Nothing follows a fatal
/// diagnostic.
fn may_print(module: &SourceModule) -> bool {
    !module.diagnostics().has_fatal()
}
