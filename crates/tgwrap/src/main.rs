mod app;
mod commands;
mod flags;
mod logging;
mod options;
mod shell;
mod util;

use std::env;
use std::io;
use std::process::ExitCode;

use anyhow::{Result, anyhow};
use tgwrap_cli::exit_code;

fn main() -> ExitCode {
    let args = match collect_args(env::args_os().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let app = app::new_app(io::stdout(), io::stderr());
    match app.run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // terraform already reported its own failure
            if !err.chain().any(|cause| cause.is::<tgwrap_cli::ExitCode>()) {
                eprintln!("ERROR: {err:#}");
            }
            ExitCode::from(u8::try_from(exit_code(&err)).unwrap_or(1))
        }
    }
}

fn collect_args(args: impl Iterator<Item = std::ffi::OsString>) -> Result<Vec<String>> {
    args.map(|arg| {
        arg.into_string()
            .map_err(|arg| anyhow!("argument {arg:?} is not valid UTF-8"))
    })
    .collect()
}
