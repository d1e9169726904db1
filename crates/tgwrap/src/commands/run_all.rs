//! `run-all`: run one terraform command in every module under the working dir.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context as _, Result, anyhow, bail};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tgwrap_cli::Command;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::flags::{config_flag_names, new_flags};
use crate::options::{DEFAULT_CONFIG_PATH, SharedOptions, TERRAGRUNT_CACHE_DIR, TerragruntOptions};
use crate::shell;
use crate::util::to_slash;

pub const COMMAND_NAME: &str = "run-all";

const SKIPPED_DIRS: &[&str] = &[TERRAGRUNT_CACHE_DIR, ".terraform"];

pub fn new_command(opts: &SharedOptions) -> Command {
    let run_opts = Rc::clone(opts);
    Command::new(COMMAND_NAME)
        .usage("Run a terraform command against every module under the working dir")
        .description(
            "The first argument is the terraform command; the rest are passed to it.\n\
             Modules are the directories holding the config file.",
        )
        .flags(new_flags(opts).filter(&config_flag_names()))
        .action(move |ctx| {
            let opts = run_opts.borrow();
            run(&opts, || ctx.is_cancelled())
        })
}

/// Run the configured terraform command in each discovered module, in path
/// order. `cancelled` is polled before each module.
pub fn run(opts: &TerragruntOptions, cancelled: impl Fn() -> bool) -> Result<()> {
    if opts.terraform_command.is_empty() {
        bail!("missing terraform command: usage is `run-all <command> [args]`");
    }

    let modules = discover_modules(opts)?;
    if modules.is_empty() {
        bail!("no modules with {} found under {}", config_file_name(opts), opts.working_dir);
    }
    info!(
        command = %opts.terraform_command,
        modules = modules.len(),
        "running command in every module"
    );

    let args = module_args(opts);
    let mut failures = Vec::new();
    for module in &modules {
        if cancelled() {
            bail!("run-all cancelled");
        }
        let module_opts = module_options(opts, module);
        match shell::run_terraform_command(&module_opts, &args) {
            Ok(()) => debug!(module = %module_opts.working_dir, "module finished"),
            Err(err) if opts.ignore_dependency_errors => {
                warn!(module = %module_opts.working_dir, "module failed: {err:#}");
                failures.push(module_opts.working_dir);
            }
            Err(err) => {
                return Err(err.context(format!("module {} failed", module_opts.working_dir)));
            }
        }
    }

    if !failures.is_empty() {
        return Err(anyhow!(
            "{} of {} modules failed: {}",
            failures.len(),
            modules.len(),
            failures.join(", ")
        ));
    }
    Ok(())
}

/// Arguments for each module; `apply` and `destroy` get `-auto-approve`
/// (and `apply` also `-input=false`) unless auto approve is off.
pub fn module_args(opts: &TerragruntOptions) -> Vec<String> {
    let mut args = opts.terraform_cli_args.clone();
    if !opts.run_all_auto_approve {
        return args;
    }
    let at = 1.min(args.len());
    match opts.terraform_command.as_str() {
        "apply" => {
            args.insert(at, "-auto-approve".to_string());
            args.insert(at, "-input=false".to_string());
        }
        "destroy" => args.insert(at, "-auto-approve".to_string()),
        _ => {}
    }
    args
}

fn module_options(opts: &TerragruntOptions, module: &Path) -> TerragruntOptions {
    let mut module_opts = opts.clone();
    module_opts.working_dir = to_slash(&module.to_string_lossy());
    module_opts.terragrunt_config_path =
        to_slash(&module.join(config_file_name(opts)).to_string_lossy());
    if opts.include_module_prefix {
        module_opts.output_prefix = format!("[{}] ", module_opts.working_dir);
    }
    module_opts
}

fn config_file_name(opts: &TerragruntOptions) -> String {
    Path::new(&opts.terragrunt_config_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Directories under the working dir holding the config file, after the
/// include and exclude globs. Globs match paths relative to the working dir.
pub fn discover_modules(opts: &TerragruntOptions) -> Result<Vec<PathBuf>> {
    let root = Path::new(&opts.working_dir);
    let config_name = config_file_name(opts);
    let includes = build_globset(&opts.include_dirs)?;
    let excludes = build_globset(&opts.exclude_dirs)?;

    let mut modules = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry));
    for entry in walker {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() || entry.file_name().to_string_lossy() != config_name {
            continue;
        }
        let Some(dir) = entry.path().parent() else {
            continue;
        };
        let rel = relative(root, dir);
        if excludes.as_ref().is_some_and(|set| set.is_match(&rel)) {
            debug!(module = %rel, "excluded");
            continue;
        }
        if let Some(set) = &includes {
            if !set.is_match(&rel) {
                debug!(module = %rel, "not included");
                continue;
            }
        }
        modules.push(dir.to_path_buf());
    }
    Ok(modules)
}

fn relative(root: &Path, dir: &Path) -> String {
    let rel = to_slash(&dir.strip_prefix(root).unwrap_or(dir).to_string_lossy());
    if rel.is_empty() { ".".to_string() } else { rel }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry.depth() > 0
        && SKIPPED_DIRS
            .iter()
            .any(|name| entry.file_name().to_string_lossy() == *name)
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    let mut builder = GlobSetBuilder::new();
    let mut added = false;
    for pat in patterns {
        let pat = pat.trim().trim_start_matches("./").trim_end_matches('/');
        if pat.is_empty() {
            continue;
        }
        let glob = Glob::new(pat).with_context(|| format!("invalid directory glob '{pat}'"))?;
        builder.add(glob);
        added = true;
    }
    if !added {
        return Ok(None);
    }
    Ok(Some(builder.build().context("failed to build directory globs")?))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn tree(modules: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for module in modules {
            let path = dir.path().join(module);
            fs::create_dir_all(&path).unwrap();
            fs::write(path.join(DEFAULT_CONFIG_PATH), "").unwrap();
        }
        dir
    }

    fn opts_for(dir: &Path) -> TerragruntOptions {
        TerragruntOptions {
            working_dir: dir.to_string_lossy().into_owned(),
            terragrunt_config_path: dir.join(DEFAULT_CONFIG_PATH).to_string_lossy().into_owned(),
            ..TerragruntOptions::default()
        }
    }

    fn names(dir: &Path, modules: &[PathBuf]) -> Vec<String> {
        modules.iter().map(|m| relative(dir, m)).collect()
    }

    #[test]
    fn finds_modules_in_path_order_and_skips_caches() {
        let dir = tree(&["vpc", "app/db", "app/web", ".terragrunt-cache/abc/vpc", "app/.terraform/x"]);
        fs::create_dir_all(dir.path().join("docs")).unwrap();

        let modules = discover_modules(&opts_for(dir.path())).unwrap();
        assert_eq!(names(dir.path(), &modules), vec!["app/db", "app/web", "vpc"]);
    }

    #[test]
    fn exclude_and_include_globs() {
        let dir = tree(&["app/db", "app/web", "vpc"]);

        let mut opts = opts_for(dir.path());
        opts.exclude_dirs = vec!["app/*".to_string()];
        assert_eq!(names(dir.path(), &discover_modules(&opts).unwrap()), vec!["vpc"]);

        let mut opts = opts_for(dir.path());
        opts.include_dirs = vec!["./app/web/".to_string(), "vpc".to_string()];
        opts.exclude_dirs = vec!["vpc".to_string()];
        assert_eq!(names(dir.path(), &discover_modules(&opts).unwrap()), vec!["app/web"]);
    }

    #[test]
    fn invalid_glob_is_reported() {
        let dir = tree(&["vpc"]);
        let mut opts = opts_for(dir.path());
        opts.exclude_dirs = vec!["[".to_string()];
        let err = discover_modules(&opts).unwrap_err();
        assert!(err.to_string().contains("invalid directory glob"), "{err}");
    }

    #[test]
    fn auto_approve_is_inserted_after_the_command() {
        let mut opts = TerragruntOptions::default();
        opts.terraform_command = "apply".to_string();
        opts.terraform_cli_args = vec!["apply".to_string(), "-lock=false".to_string()];
        assert_eq!(
            module_args(&opts),
            vec!["apply", "-input=false", "-auto-approve", "-lock=false"]
        );

        opts.terraform_command = "plan".to_string();
        opts.terraform_cli_args = vec!["plan".to_string()];
        assert_eq!(module_args(&opts), vec!["plan"]);

        opts.terraform_command = "destroy".to_string();
        opts.terraform_cli_args = vec!["destroy".to_string()];
        opts.run_all_auto_approve = false;
        assert_eq!(module_args(&opts), vec!["destroy"]);
    }

    #[test]
    fn runs_every_module_and_collects_failures() {
        let dir = tree(&["a", "b"]);
        let mut opts = opts_for(dir.path());
        opts.terraform_path = "false".to_string();
        opts.terraform_command = "plan".to_string();
        opts.terraform_cli_args = vec!["plan".to_string()];

        let err = run(&opts, || false).unwrap_err();
        assert_eq!(tgwrap_cli::exit_code(&err), 1);
        assert!(err.to_string().contains("module"), "{err}");

        opts.ignore_dependency_errors = true;
        let err = run(&opts, || false).unwrap_err();
        assert!(err.to_string().starts_with("2 of 2 modules failed"), "{err}");

        opts.terraform_path = "true".to_string();
        run(&opts, || false).unwrap();
        assert!(run(&opts, || true).is_err());
    }

    #[test]
    fn empty_tree_and_missing_command_fail() {
        let dir = tree(&[]);
        let mut opts = opts_for(dir.path());
        assert!(run(&opts, || false).unwrap_err().to_string().contains("missing terraform command"));
        opts.terraform_command = "plan".to_string();
        assert!(run(&opts, || false).unwrap_err().to_string().contains("no modules"));
    }
}
