//! The catch-all command: forwards everything to terraform.

use std::rc::Rc;

use anyhow::Result;
use tgwrap_cli::{Command, show_app_help};
use tracing::debug;

use crate::flags::{config_flag_names, new_flags};
use crate::options::{SharedOptions, TerragruntOptions};
use crate::shell;

/// Matches nothing typed by hand; the app dispatches here by default.
pub const COMMAND_NAME: &str = "*";

pub fn new_command(opts: &SharedOptions) -> Command {
    let run_opts = Rc::clone(opts);
    Command::new(COMMAND_NAME)
        .usage("Everything else is passed straight to terraform")
        .flags(new_flags(opts).filter(&config_flag_names()))
        .action(move |ctx| {
            if run_opts.borrow().terraform_command.is_empty() {
                show_app_help(ctx)?;
                return Ok(());
            }
            run(&run_opts.borrow())
        })
}

pub fn run(opts: &TerragruntOptions) -> Result<()> {
    debug!(command = %opts.terraform_command, "forwarding to terraform");
    shell::run_terraform_command(opts, &opts.terraform_cli_args)
}
