//! Inspection commands: `lex`, `parse`, `check` and `hash`.

use std::io::Write;

use quix_ir::serialize::escape_string;
use quix_ir::{hash_subtree, SourceView, StringInterner, TokenKind};
use quix_lexer::Lexer;

use super::{may_print, open, parse_root, report, Status};
use crate::{CliError, Options};

fn position(n: Option<u32>) -> String {
    n.map_or_else(|| "?".to_string(), |n| n.to_string())
}

/// One token per line: `line:col<TAB>class<TAB>text`.
///
/// Comments are kept. Unknown tokens make the run fail.
pub fn lex(text: &str, filename: &str, out: &mut dyn Write) -> Result<Status, CliError> {
    let mut lexer = Lexer::from_text(text, filename, StringInterner::shared());
    let mut failed = false;
    loop {
        let token = lexer.next();
        if token.is_eof() {
            break;
        }
        let shown = match token.kind {
            TokenKind::String(_) | TokenKind::Comment(_) | TokenKind::Unknown(_) => {
                escape_string(&token.kind.text(lexer.strings()))
            }
            TokenKind::Char(c) => format!("{c:?}"),
            kind => kind.text(lexer.strings()),
        };
        failed |= matches!(token.kind, TokenKind::Unknown(_));
        writeln!(
            out,
            "{}:{}\t{}\t{shown}",
            position(lexer.line(token.span.start)),
            position(lexer.col(token.span.start)),
            token.kind.class_name(),
        )?;
    }
    Ok(Status::from_failed(failed))
}

/// Print the tree, even one recovered from syntax errors.
pub fn parse(
    text: &str,
    filename: &str,
    options: &Options,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<Status, CliError> {
    let mut module = open(text, filename, options);
    let root = parse_root(&mut module);
    let failed = report(&mut module, options, err)?;
    if root.is_some() && may_print(&module) {
        if let Some(dump) = module.dump(options.sexpr) {
            writeln!(out, "{dump}")?;
        }
    }
    Ok(Status::from_failed(failed || root.is_none()))
}

pub fn check(
    text: &str,
    filename: &str,
    options: &Options,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<Status, CliError> {
    let mut module = open(text, filename, options);
    let sound = module.check();
    report(&mut module, options, err)?;
    if !sound {
        return Ok(Status::Failed);
    }
    writeln!(out, "OK: {filename} ({} nodes)", module.arena().len())?;
    Ok(Status::Success)
}

/// Sixteen hex digits of the tree's content hash.
pub fn hash(
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
        Some(root) if !failed => {
            let hash = hash_subtree(module.arena(), module.strings(), root);
            writeln!(out, "{hash:016x}")?;
            Ok(Status::Success)
        }
        _ => Ok(Status::Failed),
    }
}
