//! `terragrunt-info`: print the resolved options as JSON.

use std::io::Write;
use std::rc::Rc;

use anyhow::Result;
use serde::Serialize;
use tgwrap_cli::Command;

use crate::flags::{config_flag_names, new_flags};
use crate::options::{SharedOptions, TerragruntOptions};

pub const COMMAND_NAME: &str = "terragrunt-info";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InfoGroup {
    pub config_path: String,
    pub download_dir: String,
    pub iam_role: String,
    pub terraform_binary: String,
    pub terraform_command: String,
    pub working_dir: String,
}

impl From<&TerragruntOptions> for InfoGroup {
    fn from(opts: &TerragruntOptions) -> Self {
        Self {
            config_path: opts.terragrunt_config_path.clone(),
            download_dir: opts.download_dir.clone(),
            iam_role: opts.iam_role_options.role_arn.clone(),
            terraform_binary: opts.terraform_path.clone(),
            terraform_command: opts.terraform_command.clone(),
            working_dir: opts.working_dir.clone(),
        }
    }
}

pub fn new_command(opts: &SharedOptions) -> Command {
    let run_opts = Rc::clone(opts);
    Command::new(COMMAND_NAME)
        .usage("Emits limited terragrunt state on stdout and exits")
        .flags(new_flags(opts).filter(&config_flag_names()))
        .action(move |ctx| {
            let json = render(&run_opts.borrow())?;
            writeln!(ctx.app().writer(), "{json}")?;
            Ok(())
        })
}

pub fn render(opts: &TerragruntOptions) -> Result<String> {
    Ok(serde_json::to_string_pretty(&InfoGroup::from(opts))?)
}
