//! Hidden aliases for commands that were folded into `run-all`.

use std::rc::Rc;

use tgwrap_cli::Command;
use tracing::warn;

use super::run_all;
use crate::flags::{config_flag_names, new_flags};
use crate::options::{SharedOptions, TerragruntOptions};

/// Old command name and the terraform command `run-all` runs instead.
pub const REPLACEMENTS: &[(&str, &str)] = &[
    ("spin-up", "apply"),
    ("tear-down", "destroy"),
    ("plan-all", "plan"),
    ("apply-all", "apply"),
    ("destroy-all", "destroy"),
    ("output-all", "output"),
    ("validate-all", "validate"),
];

pub fn new_commands(opts: &SharedOptions) -> Vec<Command> {
    REPLACEMENTS
        .iter()
        .map(|&(old, new)| new_command(opts, old, new))
        .collect()
}

fn new_command(opts: &SharedOptions, old: &'static str, new: &'static str) -> Command {
    let run_opts = Rc::clone(opts);
    Command::new(old)
        .hidden()
        .usage(format!("Deprecated: use 'run-all {new}'"))
        .flags(new_flags(opts).filter(&config_flag_names()))
        .action(move |ctx| {
            warn!("'{old}' is deprecated; use 'run-all {new}' instead");
            replace_command(&mut run_opts.borrow_mut(), new);
            run_all::run(&run_opts.borrow(), || ctx.is_cancelled())
        })
}

/// Swap the deprecated name at the head of the forwarded args for `new`.
fn replace_command(opts: &mut TerragruntOptions, new: &str) {
    let mut args = vec![new.to_string()];
    args.extend(opts.terraform_cli_args.iter().skip(1).cloned());
    opts.terraform_cli_args = args;
    opts.terraform_command = new.to_string();
    opts.original_terraform_command = new.to_string();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options;

    #[test]
    fn every_replacement_is_hidden() {
        let commands = new_commands(&options::new_shared());
        assert_eq!(commands.len(), REPLACEMENTS.len());
        assert!(commands.iter().all(|c| c.hidden));
        assert_eq!(commands[0].name, "spin-up");
    }

    #[test]
    fn replacement_keeps_the_remaining_args() {
        let mut opts = TerragruntOptions {
            terraform_command: "plan-all".to_string(),
            terraform_cli_args: vec!["plan-all".to_string(), "-lock=false".to_string()],
            ..TerragruntOptions::default()
        };
        replace_command(&mut opts, "plan");
        assert_eq!(opts.terraform_command, "plan");
        assert_eq!(opts.terraform_cli_args, vec!["plan", "-lock=false"]);
    }
}
