//! The catalog of every tgwrap flag, bound to [`TerragruntOptions`] fields.
//!
//! Commands take the subset they accept with [`Flags::filter`].

use std::rc::Rc;

use tgwrap_cli::{BoolFlag, Destination, Flag, Flags, GenericFlag, MapFlag, SliceFlag};

use crate::options::{SharedOptions, TerragruntOptions};
use crate::util;

pub const FLAG_NAME_TERRAGRUNT_CONFIG: &str = "terragrunt-config";
pub const FLAG_NAME_TERRAGRUNT_TFPATH: &str = "terragrunt-tfpath";
pub const FLAG_NAME_TERRAGRUNT_NO_AUTO_INIT: &str = "terragrunt-no-auto-init";
pub const FLAG_NAME_TERRAGRUNT_NO_AUTO_RETRY: &str = "terragrunt-no-auto-retry";
pub const FLAG_NAME_TERRAGRUNT_NO_AUTO_APPROVE: &str = "terragrunt-no-auto-approve";
pub const FLAG_NAME_TERRAGRUNT_NON_INTERACTIVE: &str = "terragrunt-non-interactive";
pub const FLAG_NAME_TERRAGRUNT_WORKING_DIR: &str = "terragrunt-working-dir";
pub const FLAG_NAME_TERRAGRUNT_DOWNLOAD_DIR: &str = "terragrunt-download-dir";
pub const FLAG_NAME_TERRAGRUNT_SOURCE: &str = "terragrunt-source";
pub const FLAG_NAME_TERRAGRUNT_SOURCE_MAP: &str = "terragrunt-source-map";
pub const FLAG_NAME_TERRAGRUNT_SOURCE_UPDATE: &str = "terragrunt-source-update";
pub const FLAG_NAME_TERRAGRUNT_IAM_ROLE: &str = "terragrunt-iam-role";
pub const FLAG_NAME_TERRAGRUNT_IAM_ASSUME_ROLE_DURATION: &str =
    "terragrunt-iam-assume-role-duration";
pub const FLAG_NAME_TERRAGRUNT_IAM_ASSUME_ROLE_SESSION_NAME: &str =
    "terragrunt-iam-assume-role-session-name";
pub const FLAG_NAME_TERRAGRUNT_IGNORE_DEPENDENCY_ERRORS: &str =
    "terragrunt-ignore-dependency-errors";
pub const FLAG_NAME_TERRAGRUNT_IGNORE_DEPENDENCY_ORDER: &str = "terragrunt-ignore-dependency-order";
pub const FLAG_NAME_TERRAGRUNT_IGNORE_EXTERNAL_DEPENDENCIES: &str =
    "terragrunt-ignore-external-dependencies";
pub const FLAG_NAME_TERRAGRUNT_INCLUDE_EXTERNAL_DEPENDENCIES: &str =
    "terragrunt-include-external-dependencies";
pub const FLAG_NAME_TERRAGRUNT_EXCLUDE_DIR: &str = "terragrunt-exclude-dir";
pub const FLAG_NAME_TERRAGRUNT_INCLUDE_DIR: &str = "terragrunt-include-dir";
pub const FLAG_NAME_TERRAGRUNT_STRICT_INCLUDE: &str = "terragrunt-strict-include";
pub const FLAG_NAME_TERRAGRUNT_PARALLELISM: &str = "terragrunt-parallelism";
pub const FLAG_NAME_TERRAGRUNT_DEBUG: &str = "terragrunt-debug";
pub const FLAG_NAME_TERRAGRUNT_LOG_LEVEL: &str = "terragrunt-log-level";
pub const FLAG_NAME_TERRAGRUNT_NO_COLOR: &str = "terragrunt-no-color";
pub const FLAG_NAME_TERRAGRUNT_MODULES_THAT_INCLUDE: &str = "terragrunt-modules-that-include";
pub const FLAG_NAME_TERRAGRUNT_FETCH_DEPENDENCY_OUTPUT_FROM_STATE: &str =
    "terragrunt-fetch-dependency-output-from-state";
pub const FLAG_NAME_TERRAGRUNT_USE_PARTIAL_PARSE_CONFIG_CACHE: &str =
    "terragrunt-use-partial-parse-config-cache";
pub const FLAG_NAME_TERRAGRUNT_INCLUDE_MODULE_PREFIX: &str = "terragrunt-include-module-prefix";

pub const FLAG_NAME_HELP: &str = "help";

/// Flags every command accepts.
pub const COMMON_FLAG_NAMES: &[&str] = &[
    FLAG_NAME_TERRAGRUNT_TFPATH,
    FLAG_NAME_TERRAGRUNT_NO_AUTO_INIT,
    FLAG_NAME_TERRAGRUNT_NO_AUTO_RETRY,
    FLAG_NAME_TERRAGRUNT_NO_AUTO_APPROVE,
    FLAG_NAME_TERRAGRUNT_NON_INTERACTIVE,
    FLAG_NAME_TERRAGRUNT_WORKING_DIR,
    FLAG_NAME_TERRAGRUNT_DOWNLOAD_DIR,
    FLAG_NAME_TERRAGRUNT_SOURCE,
    FLAG_NAME_TERRAGRUNT_SOURCE_MAP,
    FLAG_NAME_TERRAGRUNT_SOURCE_UPDATE,
    FLAG_NAME_TERRAGRUNT_IAM_ROLE,
    FLAG_NAME_TERRAGRUNT_IAM_ASSUME_ROLE_DURATION,
    FLAG_NAME_TERRAGRUNT_IAM_ASSUME_ROLE_SESSION_NAME,
    FLAG_NAME_TERRAGRUNT_IGNORE_DEPENDENCY_ERRORS,
    FLAG_NAME_TERRAGRUNT_IGNORE_DEPENDENCY_ORDER,
    FLAG_NAME_TERRAGRUNT_IGNORE_EXTERNAL_DEPENDENCIES,
    FLAG_NAME_TERRAGRUNT_INCLUDE_EXTERNAL_DEPENDENCIES,
    FLAG_NAME_TERRAGRUNT_EXCLUDE_DIR,
    FLAG_NAME_TERRAGRUNT_INCLUDE_DIR,
    FLAG_NAME_TERRAGRUNT_STRICT_INCLUDE,
    FLAG_NAME_TERRAGRUNT_PARALLELISM,
    FLAG_NAME_TERRAGRUNT_DEBUG,
    FLAG_NAME_TERRAGRUNT_LOG_LEVEL,
    FLAG_NAME_TERRAGRUNT_NO_COLOR,
    FLAG_NAME_TERRAGRUNT_MODULES_THAT_INCLUDE,
    FLAG_NAME_TERRAGRUNT_FETCH_DEPENDENCY_OUTPUT_FROM_STATE,
    FLAG_NAME_TERRAGRUNT_USE_PARTIAL_PARSE_CONFIG_CACHE,
    FLAG_NAME_TERRAGRUNT_INCLUDE_MODULE_PREFIX,
    FLAG_NAME_HELP,
];

/// Flags accepted by commands that read a config file: the common set plus
/// `--terragrunt-config`.
pub fn config_flag_names() -> Vec<&'static str> {
    let mut names = COMMON_FLAG_NAMES.to_vec();
    names.push(FLAG_NAME_TERRAGRUNT_CONFIG);
    names
}

fn dest<T: 'static>(
    opts: &SharedOptions,
    project: fn(&mut TerragruntOptions) -> &mut T,
) -> Destination<T> {
    Destination::field(Rc::clone(opts), project)
}

/// Every flag, sorted by name, with `help` last.
pub fn new_flags(opts: &SharedOptions) -> Flags {
    let catalog: Vec<Box<dyn Flag>> = vec![
        Box::new(
            GenericFlag::<String>::new(FLAG_NAME_TERRAGRUNT_CONFIG)
                .env_var("TERRAGRUNT_CONFIG")
                .usage("Path to the config file. Defaults to terragrunt.hcl in the working dir.")
                .destination(dest(opts, |o| &mut o.terragrunt_config_path)),
        ),
        Box::new(
            GenericFlag::<String>::new(FLAG_NAME_TERRAGRUNT_TFPATH)
                .env_var("TERRAGRUNT_TFPATH")
                .usage("Terraform binary to run. Defaults to terraform on PATH.")
                .destination(dest(opts, |o| &mut o.terraform_path)),
        ),
        Box::new(
            BoolFlag::new(FLAG_NAME_TERRAGRUNT_NO_AUTO_INIT)
                .negative()
                .env_var("TERRAGRUNT_NO_AUTO_INIT")
                .usage("Do not run 'terraform init' automatically before other commands.")
                .destination(dest(opts, |o| &mut o.auto_init)),
        ),
        Box::new(
            BoolFlag::new(FLAG_NAME_TERRAGRUNT_NO_AUTO_RETRY)
                .negative()
                .env_var("TERRAGRUNT_NO_AUTO_RETRY")
                .usage("Do not retry commands that fail with transient errors.")
                .destination(dest(opts, |o| &mut o.auto_retry)),
        ),
        Box::new(
            BoolFlag::new(FLAG_NAME_TERRAGRUNT_NO_AUTO_APPROVE)
                .negative()
                .env_var("TERRAGRUNT_NO_AUTO_APPROVE")
                .usage("Do not append -auto-approve to apply and destroy in 'run-all'.")
                .destination(dest(opts, |o| &mut o.run_all_auto_approve)),
        ),
        Box::new(
            BoolFlag::new(FLAG_NAME_TERRAGRUNT_NON_INTERACTIVE)
                .env_var("TERRAGRUNT_NON_INTERACTIVE")
                .usage("Answer yes to every prompt.")
                .destination(dest(opts, |o| &mut o.non_interactive)),
        ),
        Box::new(
            GenericFlag::<String>::new(FLAG_NAME_TERRAGRUNT_WORKING_DIR)
                .env_var("TERRAGRUNT_WORKING_DIR")
                .usage("Directory holding the terraform code. Defaults to the current dir.")
                .destination(dest(opts, |o| &mut o.working_dir)),
        ),
        Box::new(
            GenericFlag::<String>::new(FLAG_NAME_TERRAGRUNT_DOWNLOAD_DIR)
                .env_var("TERRAGRUNT_DOWNLOAD")
                .usage("Where terraform sources are downloaded. Defaults to .terragrunt-cache in the working dir.")
                .destination(dest(opts, |o| &mut o.download_dir)),
        ),
        Box::new(
            GenericFlag::<String>::new(FLAG_NAME_TERRAGRUNT_SOURCE)
                .env_var("TERRAGRUNT_SOURCE")
                .usage("Download terraform code from this source and run it from a temporary folder.")
                .destination(dest(opts, |o| &mut o.source)),
        ),
        Box::new(
            BoolFlag::new(FLAG_NAME_TERRAGRUNT_SOURCE_UPDATE)
                .env_var("TERRAGRUNT_SOURCE_UPDATE")
                .usage("Clear the download folder before fetching the source again.")
                .destination(dest(opts, |o| &mut o.source_update)),
        ),
        Box::new(
            MapFlag::<String, String>::new(FLAG_NAME_TERRAGRUNT_SOURCE_MAP)
                .env_var("TERRAGRUNT_SOURCE_MAP")
                .splitter(util::split_urls)
                .usage("Replace source URLs starting with the given root with dest (root=dest).")
                .destination(dest(opts, |o| &mut o.source_map)),
        ),
        Box::new(
            GenericFlag::<String>::new(FLAG_NAME_TERRAGRUNT_IAM_ROLE)
                .env_var("TERRAGRUNT_IAM_ROLE")
                .usage("IAM role to assume before running terraform.")
                .destination(dest(opts, |o| &mut o.iam_role_options.role_arn)),
        ),
        Box::new(
            GenericFlag::<i64>::new(FLAG_NAME_TERRAGRUNT_IAM_ASSUME_ROLE_DURATION)
                .env_var("TERRAGRUNT_IAM_ASSUME_ROLE_DURATION")
                .usage("Session duration, in seconds, of the assumed IAM role.")
                .destination(dest(opts, |o| &mut o.iam_role_options.assume_role_duration)),
        ),
        Box::new(
            GenericFlag::<String>::new(FLAG_NAME_TERRAGRUNT_IAM_ASSUME_ROLE_SESSION_NAME)
                .env_var("TERRAGRUNT_IAM_ASSUME_ROLE_SESSION_NAME")
                .usage("Session name of the assumed IAM role.")
                .destination(dest(opts, |o| &mut o.iam_role_options.assume_role_session_name)),
        ),
        Box::new(
            BoolFlag::new(FLAG_NAME_TERRAGRUNT_IGNORE_DEPENDENCY_ERRORS)
                .usage("Keep running the remaining modules of 'run-all' when one fails.")
                .destination(dest(opts, |o| &mut o.ignore_dependency_errors)),
        ),
        Box::new(
            BoolFlag::new(FLAG_NAME_TERRAGRUNT_IGNORE_DEPENDENCY_ORDER)
                .usage("Run 'run-all' modules without regard to their dependencies.")
                .destination(dest(opts, |o| &mut o.ignore_dependency_order)),
        ),
        Box::new(
            BoolFlag::new(FLAG_NAME_TERRAGRUNT_IGNORE_EXTERNAL_DEPENDENCIES)
                .usage("Never pull external dependencies into 'run-all'.")
                .destination(dest(opts, |o| &mut o.ignore_external_dependencies)),
        ),
        Box::new(
            BoolFlag::new(FLAG_NAME_TERRAGRUNT_INCLUDE_EXTERNAL_DEPENDENCIES)
                .env_var("TERRAGRUNT_INCLUDE_EXTERNAL_DEPENDENCIES")
                .usage("Pull external dependencies into 'run-all'.")
                .destination(dest(opts, |o| &mut o.include_external_dependencies)),
        ),
        Box::new(
            GenericFlag::<usize>::new(FLAG_NAME_TERRAGRUNT_PARALLELISM)
                .env_var("TERRAGRUNT_PARALLELISM")
                .usage("Run at most N modules at once in 'run-all'.")
                .destination(dest(opts, |o| &mut o.parallelism)),
        ),
        Box::new(
            SliceFlag::<String>::new(FLAG_NAME_TERRAGRUNT_EXCLUDE_DIR)
                .env_var("TERRAGRUNT_EXCLUDE_DIR")
                .usage("Glob of module directories 'run-all' skips.")
                .destination(dest(opts, |o| &mut o.exclude_dirs)),
        ),
        Box::new(
            SliceFlag::<String>::new(FLAG_NAME_TERRAGRUNT_INCLUDE_DIR)
                .usage("Glob of module directories 'run-all' runs in.")
                .destination(dest(opts, |o| &mut o.include_dirs)),
        ),
        Box::new(
            BoolFlag::new(FLAG_NAME_TERRAGRUNT_DEBUG)
                .env_var("TERRAGRUNT_DEBUG")
                .usage("Log at debug level unless a log level is given.")
                .destination(dest(opts, |o| &mut o.debug)),
        ),
        Box::new(
            GenericFlag::<String>::new(FLAG_NAME_TERRAGRUNT_LOG_LEVEL)
                .env_var("TERRAGRUNT_LOG_LEVEL")
                .usage("Log level: panic, fatal, error, warn, info, debug or trace.")
                .destination(dest(opts, |o| &mut o.log_level)),
        ),
        Box::new(
            BoolFlag::new(FLAG_NAME_TERRAGRUNT_NO_COLOR)
                .env_var("TERRAGRUNT_NO_COLOR")
                .usage("Disable colored log output.")
                .destination(dest(opts, |o| &mut o.disable_log_colors)),
        ),
        Box::new(
            BoolFlag::new(FLAG_NAME_TERRAGRUNT_USE_PARTIAL_PARSE_CONFIG_CACHE)
                .env_var("TERRAGRUNT_USE_PARTIAL_PARSE_CONFIG_CACHE")
                .usage("Cache includes during partial config parsing.")
                .destination(dest(opts, |o| &mut o.use_partial_parse_config_cache)),
        ),
        Box::new(
            BoolFlag::new(FLAG_NAME_TERRAGRUNT_FETCH_DEPENDENCY_OUTPUT_FROM_STATE)
                .env_var("TERRAGRUNT_FETCH_DEPENDENCY_OUTPUT_FROM_STATE")
                .usage("Read dependency outputs from the state file instead of running terraform.")
                .destination(dest(opts, |o| &mut o.fetch_dependency_output_from_state)),
        ),
        Box::new(
            BoolFlag::new(FLAG_NAME_TERRAGRUNT_INCLUDE_MODULE_PREFIX)
                .env_var("TERRAGRUNT_INCLUDE_MODULE_PREFIX")
                .usage("Prefix terraform output lines with the module path.")
                .destination(dest(opts, |o| &mut o.include_module_prefix)),
        ),
        Box::new(
            BoolFlag::new(FLAG_NAME_TERRAGRUNT_STRICT_INCLUDE)
                .usage("Only run modules under the --terragrunt-include-dir directories.")
                .destination(dest(opts, |o| &mut o.strict_include)),
        ),
        Box::new(
            SliceFlag::<String>::new(FLAG_NAME_TERRAGRUNT_MODULES_THAT_INCLUDE)
                .usage("Only run 'run-all' in modules whose config includes this file.")
                .destination(dest(opts, |o| &mut o.modules_that_include)),
        ),
    ];

    let mut flags: Flags = catalog.into_iter().collect();
    flags.sort();
    flags.add(new_help_flag());
    flags
}

pub fn new_help_flag() -> BoolFlag {
    BoolFlag::new(FLAG_NAME_HELP).alias("h").usage("Show help")
}
