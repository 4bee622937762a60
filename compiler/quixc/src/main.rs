//! `quixc`: QUIX front-end CLI.

use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;

use quixc::{init_tracing, parse_args, run, usage, Action};

fn main() -> ExitCode {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut invocation = match parse_args(&args) {
        Ok(Action::Run(invocation)) => invocation,
        Ok(Action::Help) => {
            print!("{}", usage());
            return ExitCode::SUCCESS;
        }
        Ok(Action::Version) => {
            println!("quixc {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!();
            eprint!("{}", usage());
            return ExitCode::from(2);
        }
    };
    invocation.options.stderr_tty = io::stderr().is_terminal();

    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut out = stdout.lock();
    let mut err = stderr.lock();
    let result = run(&invocation, &mut out, &mut err);
    let _ = out.flush();

    match result {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(e) => {
            let _ = writeln!(err, "error: {e}");
            ExitCode::from(if e.is_usage() { 2 } else { 1 })
        }
    }
}
