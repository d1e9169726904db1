//! Commands and the ordered collections they are registered in.

use std::cell::OnceCell;
use std::fmt;

use crate::context::Context;
use crate::flags::Flags;
use crate::help;

/// A lifecycle hook (`before` or `action`) run against the dispatch context.
pub type HookFn = Box<dyn Fn(&Context<'_>) -> anyhow::Result<()>>;

/// A named unit of dispatch with its own flags and hooks.
///
/// Fields are public so callers can inspect a registered command; use the
/// builder methods to construct one.
#[derive(Default)]
pub struct Command {
    pub name: String,
    pub aliases: Vec<String>,
    pub usage: String,
    pub usage_text: String,
    pub description: String,
    /// Left out of help listings; lookup and dispatch still find it.
    pub hidden: bool,
    pub flags: Flags,
    pub subcommands: Commands,
    pub before: Option<HookFn>,
    pub action: Option<HookFn>,
    /// Marks the implicit top-level command used when nothing else resolves.
    pub is_root: bool,
    help_name: OnceCell<String>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The pseudo-command dispatched when no registered or default command
    /// matches; its action prints the app help.
    pub fn root() -> Self {
        Self {
            is_root: true,
            hidden: true,
            ..Self::default()
        }
        .action(|ctx| {
            help::show_app_help(ctx)?;
            Ok(())
        })
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Replaces the generated usage line in help.
    pub fn usage_text(mut self, text: impl Into<String>) -> Self {
        self.usage_text = text.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn subcommands(mut self, subcommands: Commands) -> Self {
        self.subcommands = subcommands;
        self
    }

    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context<'_>) -> anyhow::Result<()> + 'static,
    {
        self.before = Some(Box::new(hook));
        self
    }

    pub fn action<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context<'_>) -> anyhow::Result<()> + 'static,
    {
        self.action = Some(Box::new(hook));
        self
    }

    /// Name shown in help; defaults to `name` the first time it is asked for.
    pub fn help_name(&self) -> &str {
        self.help_name.get_or_init(|| self.name.clone())
    }

    pub fn set_help_name(&self, help_name: impl Into<String>) -> bool {
        self.help_name.set(help_name.into()).is_ok()
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }

    /// Name followed by aliases.
    pub fn names(&self) -> Vec<&str> {
        std::iter::once(self.name.as_str())
            .chain(self.aliases.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("hidden", &self.hidden)
            .field("is_root", &self.is_root)
            .field("flags", &self.flags)
            .field("subcommands", &self.subcommands)
            .finish_non_exhaustive()
    }
}

/// Commands in registration order.
///
/// Names are expected to be unique; with duplicates, lookups return the first.
#[derive(Debug, Default)]
pub struct Commands(Vec<Command>);

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, command: Command) {
        self.0.push(command);
    }

    /// Builder form of [`Commands::add`].
    pub fn with(mut self, command: Command) -> Self {
        self.add(command);
        self
    }

    /// First command whose name or alias equals `name`.
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.0.iter().find(|cmd| cmd.has_name(name))
    }

    /// Commands known by any of `names`, in their original relative order.
    pub fn filter(&self, names: &[&str]) -> Vec<&Command> {
        self.0
            .iter()
            .filter(|cmd| names.iter().any(|name| cmd.has_name(name)))
            .collect()
    }

    /// Non-hidden commands in collection order, with help names defaulted.
    pub fn visible_commands(&self) -> Vec<&Command> {
        self.0
            .iter()
            .filter(|cmd| !cmd.hidden)
            .inspect(|cmd| {
                cmd.help_name();
            })
            .collect()
    }

    /// Lexicographic, case-sensitive, by name.
    pub fn sort(&mut self) {
        self.0.sort_by(|a, b| a.name.cmp(&b.name));
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|cmd| cmd.name.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Command> for Commands {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Command> for Commands {
    fn extend<I: IntoIterator<Item = Command>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Commands {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Commands {
    type Item = Command;
    type IntoIter = std::vec::IntoIter<Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
