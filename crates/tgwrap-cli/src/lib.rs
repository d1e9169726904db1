//! Flag, command and context framework for a CLI that wraps another tool.
//!
//! An [`App`] owns global [`Flags`] and a collection of [`Command`]s. A run
//! parses the global flags, resolves a command by name (falling back to the
//! app's default command), parses that command's flags with environment
//! fallback, and calls its hooks with a [`Context`] linked to its parent.
//!
//! Tokens that do not name a registered flag are left in [`Args`] untouched so
//! a forwarding command can pass them on; [`Args::normalize`] rewrites them to
//! the wrapped tool's dash convention.

pub mod app;
pub mod args;
pub mod command;
pub mod context;
pub mod error;
pub mod flag_set;
pub mod flags;
pub mod help;
pub mod value;

pub use app::{App, ExiterFn};
pub use args::{Args, NormalizeStyle};
pub use command::{Command, Commands, HookFn};
pub use context::{Context, ExecContext};
pub use error::{Error, ExitCode, Result, ValueError, exit_code};
pub use flag_set::FlagSet;
pub use flags::{BoolFlag, Flag, Flags, GenericFlag, MapFlag, SliceFlag, TypedFlag};
pub use help::{app_help, command_help, show_app_help, show_command_help};
pub use value::{Destination, FlagType, FlagValue, Splitter, Value, ValueSource, split};
