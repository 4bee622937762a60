//! Command-line parsing.

use std::fmt;
use std::path::PathBuf;

use quix_diagnostic::{ColorMode, DiagFormat, DiagnosticConfig};
use quix_ir::SexprOptions;

use crate::CliError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the token stream.
    Lex,
    /// Print the node graph as an s-expression.
    Parse,
    /// Parse and verify without output.
    Check,
    /// Print the lowered IR.
    Lower,
    /// Print the content hash of the whole tree.
    Hash,
    /// Write the binary node graph.
    Emit,
}

impl Command {
    pub const ALL: &'static [Command] = &[
        Command::Lex,
        Command::Parse,
        Command::Check,
        Command::Lower,
        Command::Hash,
        Command::Emit,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Command::Lex => "lex",
            Command::Parse => "parse",
            Command::Check => "check",
            Command::Lower => "lower",
            Command::Hash => "hash",
            Command::Emit => "emit",
        }
    }

    pub const fn about(self) -> &'static str {
        match self {
            Command::Lex => "Tokenize and print one token per line",
            Command::Parse => "Parse and print the tree as an s-expression",
            Command::Check => "Parse and verify, reporting diagnostics only",
            Command::Lower => "Parse, lower and print the IR",
            Command::Hash => "Print the content hash of the parsed tree",
            Command::Emit => "Write the parsed tree in binary form",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Command::ALL.iter().copied().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flags shared by every command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    /// `--format=`; picked from `color` when unset.
    pub format: Option<DiagFormat>,
    pub color: ColorMode,
    /// Whether stderr is a terminal, for `ColorMode::Auto`.
    pub stderr_tty: bool,
    pub diagnostics: DiagnosticConfig,
    pub sexpr: SexprOptions,
    /// `-o`; stdout when unset.
    pub output: Option<PathBuf>,
}

impl Options {
    /// Diagnostic format after applying the color mode.
    pub fn diag_format(&self) -> DiagFormat {
        self.format
            .unwrap_or_else(|| self.color.human_format(self.stderr_tty))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub command: Command,
    pub path: String,
    pub options: Options,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Run(Invocation),
    Help,
    Version,
}

fn parse_color(value: &str) -> Result<ColorMode, CliError> {
    match value {
        "auto" => Ok(ColorMode::Auto),
        "always" => Ok(ColorMode::Always),
        "never" => Ok(ColorMode::Never),
        _ => Err(CliError::UnknownColor(value.to_string())),
    }
}

/// Parse the arguments after the program name.
///
/// Options may come before or after the path. `-o` takes the next
/// argument; everything else is `--name` or `--name=value`.
pub fn parse_args(args: &[String]) -> Result<Action, CliError> {
    let Some(first) = args.first() else {
        return Err(CliError::MissingCommand);
    };
    let command = match first.as_str() {
        "help" | "--help" | "-h" => return Ok(Action::Help),
        "version" | "--version" | "-V" => return Ok(Action::Version),
        name => Command::from_name(name).ok_or_else(|| CliError::UnknownCommand(name.to_string()))?,
    };

    let mut options = Options::default();
    let mut path = None;
    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        if arg == "-o" {
            let value = rest.next().ok_or(CliError::MissingValue("-o"))?;
            options.output = Some(PathBuf::from(value));
        } else if let Some(value) = arg.strip_prefix("--format=") {
            options.format = Some(value.parse()?);
        } else if let Some(value) = arg.strip_prefix("--color=") {
            options.color = parse_color(value)?;
        } else if arg == "--no-dedup" {
            options.diagnostics.deduplicate = false;
        } else if arg == "--fast-error" {
            options.diagnostics.fast_error = true;
        } else if arg == "--minify" {
            options.sexpr.minify = true;
        } else if arg == "--format" {
            return Err(CliError::MissingValue("--format"));
        } else if arg == "--color" {
            return Err(CliError::MissingValue("--color"));
        } else if arg.starts_with('-') && arg != "-" {
            return Err(CliError::UnknownOption(arg.clone()));
        } else if path.is_none() {
            path = Some(arg.clone());
        } else {
            return Err(CliError::ExtraArgument(arg.clone()));
        }
    }

    let path = path.ok_or(CliError::MissingPath(command.as_str()))?;
    Ok(Action::Run(Invocation {
        command,
        path,
        options,
    }))
}

pub fn usage() -> String {
    let mut text = String::from(
        "QUIX front end\n\nUsage: quixc <command> <file> [options]\n\nCommands:\n",
    );
    for command in Command::ALL {
        text.push_str(&format!("  {:<8} {}\n", command.as_str(), command.about()));
    }
    text.push_str(
        "\nOptions:\n\
         \x20 --format=<fmt>   Diagnostics as code, code-loc, code-text, plain, ansi or modern\n\
         \x20 --color=<when>   auto, always or never (default: auto)\n\
         \x20 --no-dedup       Keep repeated diagnostics\n\
         \x20 --fast-error     Stop at the first syntax error\n\
         \x20 --minify         Single-line s-expressions\n\
         \x20 -o <path>        Write output to a file\n\
         \nA path of `-` reads standard input.\n\
         Set RUST_LOG to enable logging, and QUIX_LOG_TREE for nested span output.\n",
    );
    text
}
