//! Resolved settings for one tgwrap run.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use indexmap::IndexMap;
use semver::Version;

/// Directory, relative to the working dir, terraform sources are downloaded to.
pub const TERRAGRUNT_CACHE_DIR: &str = ".terragrunt-cache";
pub const DEFAULT_CONFIG_PATH: &str = "terragrunt.hcl";
pub const DEFAULT_JSON_CONFIG_PATH: &str = "terragrunt.hcl.json";
pub const DEFAULT_TERRAFORM_PATH: &str = "terraform";
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Effectively unbounded.
pub const DEFAULT_PARALLELISM: usize = i32::MAX as usize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IamRoleOptions {
    pub role_arn: String,
    /// Session length in seconds; 0 leaves it to the provider.
    pub assume_role_duration: i64,
    pub assume_role_session_name: String,
}

/// Everything flags, environment and `initial_setup` resolve.
///
/// Flags write straight into these fields through [`SharedOptions`]; the
/// remaining fields are derived once the command is known.
#[derive(Debug, Clone)]
pub struct TerragruntOptions {
    pub terragrunt_config_path: String,
    pub original_terragrunt_config_path: String,
    pub terraform_path: String,
    pub auto_init: bool,
    pub auto_retry: bool,
    pub run_all_auto_approve: bool,
    pub non_interactive: bool,
    pub working_dir: String,
    pub download_dir: String,
    pub source: String,
    pub source_map: HashMap<String, String>,
    pub source_update: bool,
    pub iam_role_options: IamRoleOptions,
    pub original_iam_role_options: IamRoleOptions,
    pub ignore_dependency_errors: bool,
    pub ignore_dependency_order: bool,
    pub ignore_external_dependencies: bool,
    pub include_external_dependencies: bool,
    pub exclude_dirs: Vec<String>,
    pub include_dirs: Vec<String>,
    pub strict_include: bool,
    pub parallelism: usize,
    pub debug: bool,
    pub log_level: String,
    pub disable_log_colors: bool,
    pub use_partial_parse_config_cache: bool,
    pub fetch_dependency_output_from_state: bool,
    pub include_module_prefix: bool,
    /// Prepended to every line of terraform output when module prefixes are on.
    pub output_prefix: String,
    pub modules_that_include: Vec<String>,
    pub terraform_command: String,
    pub original_terraform_command: String,
    /// Arguments forwarded to terraform, command name first.
    pub terraform_cli_args: Vec<String>,
    /// Environment passed to terraform.
    pub env: IndexMap<String, String>,
    pub terragrunt_version: Version,
}

impl Default for TerragruntOptions {
    fn default() -> Self {
        Self {
            terragrunt_config_path: String::new(),
            original_terragrunt_config_path: String::new(),
            terraform_path: DEFAULT_TERRAFORM_PATH.to_string(),
            auto_init: true,
            auto_retry: true,
            run_all_auto_approve: true,
            non_interactive: false,
            working_dir: String::new(),
            download_dir: String::new(),
            source: String::new(),
            source_map: HashMap::new(),
            source_update: false,
            iam_role_options: IamRoleOptions::default(),
            original_iam_role_options: IamRoleOptions::default(),
            ignore_dependency_errors: false,
            ignore_dependency_order: false,
            ignore_external_dependencies: false,
            include_external_dependencies: false,
            exclude_dirs: Vec::new(),
            include_dirs: Vec::new(),
            strict_include: false,
            parallelism: DEFAULT_PARALLELISM,
            debug: false,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            disable_log_colors: false,
            use_partial_parse_config_cache: false,
            fetch_dependency_output_from_state: false,
            include_module_prefix: false,
            output_prefix: String::new(),
            modules_that_include: Vec::new(),
            terraform_command: String::new(),
            original_terraform_command: String::new(),
            terraform_cli_args: Vec::new(),
            env: IndexMap::new(),
            terragrunt_version: Version::new(0, 0, 0),
        }
    }
}

/// Options shared between the flag catalog and command hooks.
pub type SharedOptions = Rc<RefCell<TerragruntOptions>>;

pub fn new_shared() -> SharedOptions {
    Rc::new(RefCell::new(TerragruntOptions::default()))
}

/// `terragrunt.hcl.json` when present in `working_dir`, else `terragrunt.hcl`.
pub fn default_config_path(working_dir: &Path) -> String {
    let json = working_dir.join(DEFAULT_JSON_CONFIG_PATH);
    let path = if json.is_file() {
        json
    } else {
        working_dir.join(DEFAULT_CONFIG_PATH)
    };
    crate::util::to_slash(&path.to_string_lossy())
}
