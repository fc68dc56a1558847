use std::ffi::OsString;
use std::io::{self, Write};

use clap::Parser;
use sd_core::ScriptDescError;

mod cli_args;
mod commands;
mod error_map;
mod logging;

pub(crate) use cli_args::{AstArgs, Cli, DescribeArgs, Mode};
pub(crate) use error_map::{emit_error, map_cli_json, map_cli_read, map_cli_write};

/// Parses `args`, runs the command and returns the process exit code.
/// Results go to stdout, logs to stderr.
pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    logging::init_logging();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let code = match run(&mut out, cli) {
        Ok(code) => code,
        Err(error) => emit_error(&mut out, &error),
    };
    let _ = out.flush();
    code
}

fn run(out: &mut dyn Write, cli: Cli) -> Result<i32, ScriptDescError> {
    match cli.command {
        Mode::Describe(args) => commands::run_describe(out, args),
        Mode::Ast(args) => commands::run_ast(out, args),
    }
}

#[cfg(test)]
mod tests;
