//! Assembly of the tgwrap `App`: commands, global hook and option setup.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context as _, Result};
use semver::Version;
use tgwrap_cli::{
    App, Commands, Context, Error, Flags, FlagValue, NormalizeStyle, show_app_help,
    show_command_help,
};
use tracing::{debug, warn};

use crate::commands::{deprecated, run_all, terraform, terragrunt_info};
use crate::flags::{FLAG_NAME_HELP, new_help_flag};
use crate::logging;
use crate::options::{self, SharedOptions, TERRAGRUNT_CACHE_DIR};
use crate::shell;
use crate::util::to_slash;

pub const APP_NAME: &str = "tgwrap";

const APP_USAGE: &str = "Thin wrapper for terraform with extra tools for working with many modules.\n\
                         Anything tgwrap does not recognise is forwarded to terraform.";

pub fn new_app(writer: impl Write + 'static, err_writer: impl Write + 'static) -> App {
    new_app_with_options(options::new_shared(), writer, err_writer)
}

/// Build the app around caller-owned options, so tests can inspect what a
/// run resolved.
pub fn new_app_with_options(
    opts: SharedOptions,
    writer: impl Write + 'static,
    err_writer: impl Write + 'static,
) -> App {
    let mut app = App::new(APP_NAME);
    app.usage = APP_USAGE.to_string();
    app.authors = vec!["tgwrap contributors".to_string()];
    app.version = env!("CARGO_PKG_VERSION").to_string();
    app.set_writer(writer);
    app.set_err_writer(err_writer);
    app.flags = Flags::new().with(new_help_flag());

    let mut commands: Commands = deprecated::new_commands(&opts).into_iter().collect();
    commands.extend(new_commands(&opts));
    app.commands = commands;

    app.set_before(before_running_command(Rc::clone(&opts)));
    app.default_command = Some(terraform::COMMAND_NAME.to_string());
    // Failures are returned to `main`, which owns the process exit.
    app.os_exiter = Box::new(|_| {});
    app
}

/// Registered commands sorted by name, with the terraform catch-all last so
/// it closes the help listing.
pub fn new_commands(opts: &SharedOptions) -> Commands {
    let mut commands = Commands::new()
        .with(run_all::new_command(opts))
        .with(terragrunt_info::new_command(opts));
    commands.sort();
    commands.add(terraform::new_command(opts));
    commands
}

fn before_running_command(
    opts: SharedOptions,
) -> impl Fn(&Context<'_>) -> anyhow::Result<()> + 'static {
    move |ctx| {
        if ctx.is_flag_set(FLAG_NAME_HELP) {
            return show_help(ctx, &opts);
        }
        initial_setup(ctx, &opts)
    }
}

fn show_help(ctx: &Context<'_>, opts: &SharedOptions) -> Result<()> {
    ctx.suppress_action();

    if let Some(command) = ctx
        .command()
        .filter(|cmd| !cmd.is_root && cmd.name != terraform::COMMAND_NAME)
    {
        show_command_help(ctx, &command.name)?;
        return Ok(());
    }

    if let Some(name) = ctx.args().command_name() {
        let mut args = vec![name.to_string(), "-help".to_string()];
        args.extend(ctx.args().tail());
        return shell::run_terraform_command(&opts.borrow(), &args);
    }

    show_app_help(ctx)?;
    Ok(())
}

/// Resolve everything the commands need once flags have been parsed.
fn initial_setup(ctx: &Context<'_>, opts: &SharedOptions) -> Result<()> {
    let env = ctx.env();
    let mut opts = opts.borrow_mut();

    // Positive-sense names kept for older setups.
    opts.auto_init = env_bool(env, "TERRAGRUNT_AUTO_INIT", opts.auto_init);
    opts.auto_retry = env_bool(env, "TERRAGRUNT_AUTO_RETRY", opts.auto_retry);
    opts.run_all_auto_approve =
        env_bool(env, "TERRAGRUNT_AUTO_APPROVE", opts.run_all_auto_approve);

    let mut args = ctx.args().normalize(NormalizeStyle::OneDashFlag).slice();
    let command_name = ctx.command().map(|cmd| cmd.name.as_str()).unwrap_or_default();
    let terraform_command = match command_name {
        terraform::COMMAND_NAME | run_all::COMMAND_NAME => {
            ctx.args().command_name().unwrap_or_default().to_string()
        }
        name => {
            args.insert(0, name.to_string());
            name.to_string()
        }
    };
    opts.terraform_command = terraform_command;
    opts.terraform_cli_args = args;
    opts.env = env.iter().cloned().collect();

    let level = if opts.debug && !ctx.is_flag_set(crate::flags::FLAG_NAME_TERRAGRUNT_LOG_LEVEL) {
        Some("debug")
    } else {
        logging::parse_log_level(&opts.log_level)
    };
    logging::init(level.unwrap_or(options::DEFAULT_LOG_LEVEL), opts.disable_log_colors);
    if level.is_none() {
        warn!(level = %opts.log_level, "unknown log level, using {}", options::DEFAULT_LOG_LEVEL);
    }

    if opts.working_dir.is_empty() {
        let current = std::env::current_dir()
            .map_err(|err| Error::Resolution(format!("current directory is unavailable: {err}")))
            .context("failed to read the current directory")?;
        opts.working_dir = current.to_string_lossy().into_owned();
    }
    opts.working_dir = to_slash(&opts.working_dir);

    if opts.download_dir.is_empty() {
        opts.download_dir = Path::new(&opts.working_dir)
            .join(TERRAGRUNT_CACHE_DIR)
            .to_string_lossy()
            .into_owned();
    }
    let download_dir = absolute(&opts.download_dir)?;
    opts.download_dir = to_slash(&download_dir.to_string_lossy());

    if opts.terragrunt_config_path.is_empty() {
        opts.terragrunt_config_path = options::default_config_path(Path::new(&opts.working_dir));
    }
    opts.terraform_path = to_slash(&opts.terraform_path);

    opts.terragrunt_version = parse_version(&ctx.app().version);
    debug!(version = %opts.terragrunt_version, "tgwrap version");

    let json_output = opts
        .terraform_cli_args
        .iter()
        .any(|arg| arg.eq_ignore_ascii_case("-json"));
    if opts.include_module_prefix && !json_output {
        opts.output_prefix = format!("[{}] ", opts.working_dir);
    } else {
        opts.include_module_prefix = false;
    }

    if !opts.run_all_auto_approve {
        // Interactive prompts need one module at a time.
        opts.parallelism = 1;
    }

    opts.original_terragrunt_config_path = opts.terragrunt_config_path.clone();
    opts.original_terraform_command = opts.terraform_command.clone();
    opts.original_iam_role_options = opts.iam_role_options.clone();
    Ok(())
}

fn env_bool(env: &[(String, String)], key: &str, fallback: bool) -> bool {
    env.iter()
        .find(|(k, _)| k == key)
        .and_then(|(_, v)| bool::parse_value(v).ok())
        .unwrap_or(fallback)
}

fn absolute(path: &str) -> Result<PathBuf> {
    std::path::absolute(path)
        .map_err(|err| Error::Resolution(format!("cannot make {path:?} absolute: {err}")))
        .with_context(|| format!("failed to resolve path {path}"))
}

/// Parse the app version, accepting a leading `v`. Malformed versions become
/// `0.0.0`.
pub fn parse_version(raw: &str) -> Version {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    match Version::parse(trimmed) {
        Ok(version) => version,
        Err(err) => {
            debug!(version = raw, "malformed version ({err}), using 0.0.0");
            Version::new(0, 0, 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io;

    use super::*;
    use crate::options::TerragruntOptions;

    #[derive(Clone, Default)]
    struct Buffer(Rc<RefCell<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    struct Harness {
        app: App,
        opts: SharedOptions,
        out: Buffer,
        dir: tempfile::TempDir,
    }

    fn harness(env: &[(&str, &str)]) -> Harness {
        let opts = options::new_shared();
        let out = Buffer::default();
        let mut app = new_app_with_options(Rc::clone(&opts), out.clone(), io::sink());
        app.env = Some(
            env.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        let dir = tempfile::tempdir().unwrap();
        Harness { app, opts, out, dir }
    }

    impl Harness {
        fn run(&self, args: &[&str]) -> anyhow::Result<()> {
            let mut argv: Vec<String> = args.iter().map(|a| a.to_string()).collect();
            argv.push("--terragrunt-working-dir".to_string());
            argv.push(self.dir.path().to_string_lossy().into_owned());
            self.app.run(argv)
        }

        fn opts(&self) -> TerragruntOptions {
            self.opts.borrow().clone()
        }
    }

    #[test]
    fn negative_flag_and_forwarded_command() {
        let h = harness(&[]);
        h.run(&["--terragrunt-tfpath", "true", "--terragrunt-no-auto-init", "plan", "--out=x"])
            .unwrap();

        let opts = h.opts();
        assert!(!opts.auto_init);
        assert!(opts.auto_retry);
        assert_eq!(opts.terraform_command, "plan");
        assert_eq!(opts.terraform_cli_args, vec!["plan", "-out=x"]);
        assert_eq!(opts.original_terraform_command, "plan");
    }

    #[test]
    fn env_fills_flags_missing_from_args() {
        let h = harness(&[("TERRAGRUNT_IAM_ROLE", "arn:aws:iam::1:role/ci")]);
        h.run(&["terragrunt-info"]).unwrap();

        assert_eq!(h.opts().iam_role_options.role_arn, "arn:aws:iam::1:role/ci");
        let info: serde_json::Value = serde_json::from_str(&h.out.text()).unwrap();
        assert_eq!(info["IamRole"], "arn:aws:iam::1:role/ci");
        assert_eq!(info["TerraformCommand"], "terragrunt-info");
    }

    #[test]
    fn legacy_positive_env_vars_still_apply() {
        let h = harness(&[("TERRAGRUNT_AUTO_APPROVE", "false"), ("TERRAGRUNT_AUTO_INIT", "junk")]);
        h.run(&["terragrunt-info"]).unwrap();

        let opts = h.opts();
        assert!(!opts.run_all_auto_approve);
        assert_eq!(opts.parallelism, 1);
        assert!(opts.auto_init);
    }

    #[test]
    fn paths_are_resolved() {
        let h = harness(&[]);
        h.run(&["terragrunt-info"]).unwrap();

        let opts = h.opts();
        let dir = to_slash(&h.dir.path().to_string_lossy());
        assert_eq!(opts.working_dir, dir);
        assert_eq!(opts.download_dir, format!("{dir}/{TERRAGRUNT_CACHE_DIR}"));
        assert_eq!(opts.terragrunt_config_path, format!("{dir}/terragrunt.hcl"));
        assert_eq!(opts.original_terragrunt_config_path, opts.terragrunt_config_path);
        assert_eq!(opts.terraform_cli_args, vec!["terragrunt-info"]);
    }

    #[test]
    fn module_prefix_is_dropped_for_json_output() {
        let h = harness(&[]);
        h.run(&["--terragrunt-include-module-prefix", "--terragrunt-tfpath", "true", "output", "--json"])
            .unwrap();
        let opts = h.opts();
        assert!(!opts.include_module_prefix);
        assert!(opts.output_prefix.is_empty());

        let h = harness(&[]);
        h.run(&["--terragrunt-include-module-prefix", "--terragrunt-tfpath", "true", "output"])
            .unwrap();
        assert!(h.opts().output_prefix.starts_with('['));
    }

    #[test]
    fn app_help_hides_deprecated_commands() {
        let h = harness(&[]);
        h.run(&["--help"]).unwrap();

        let text = h.out.text();
        assert!(text.contains("run-all"), "{text}");
        assert!(text.contains("terragrunt-info"), "{text}");
        assert!(text.contains("--terragrunt-no-auto-init"), "{text}");
        assert!(!text.contains("spin-up"), "{text}");
        assert!(h.opts().terraform_command.is_empty());
    }

    #[test]
    fn command_help_for_registered_command() {
        let h = harness(&[]);
        h.run(&["run-all", "-h"]).unwrap();

        let text = h.out.text();
        assert!(text.contains("tgwrap run-all - "), "{text}");
        assert!(text.contains("USAGE:\n   tgwrap run-all [options]"), "{text}");
    }

    #[test]
    fn no_arguments_prints_app_help() {
        let h = harness(&[]);
        h.run(&[]).unwrap();
        assert!(h.out.text().starts_with("NAME:\n   tgwrap"), "{}", h.out.text());
    }

    #[test]
    fn terraform_exit_status_is_returned() {
        let h = harness(&[]);
        let err = h.run(&["--terragrunt-tfpath", "false", "plan"]).unwrap_err();
        assert_eq!(tgwrap_cli::exit_code(&err), 1);
    }

    #[test]
    fn bad_flag_value_is_a_parse_error() {
        let h = harness(&[]);
        let err = h
            .run(&["--terragrunt-parallelism", "many", "plan"])
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<tgwrap_cli::Error>(),
            Some(tgwrap_cli::Error::Parse { .. })
        ));
    }

    #[test]
    fn unresolvable_path_is_a_resolution_error() {
        let err = absolute("").unwrap_err();
        assert!(err.to_string().contains("failed to resolve path"), "{err}");
        assert!(matches!(
            err.downcast_ref::<tgwrap_cli::Error>(),
            Some(tgwrap_cli::Error::Resolution(_))
        ));
    }

    #[test]
    fn versions_fall_back_to_zero() {
        assert_eq!(parse_version("v1.2.3"), Version::new(1, 2, 3));
        assert_eq!(parse_version("0.1.0"), Version::new(0, 1, 0));
        assert_eq!(parse_version("latest"), Version::new(0, 0, 0));
    }

    #[test]
    fn commands_are_sorted_with_catch_all_last() {
        let commands = new_commands(&options::new_shared());
        assert_eq!(commands.names(), vec!["run-all", "terragrunt-info", "*"]);
    }
}
