//! Top-level assembly and the dispatch loop.

use std::cell::{RefCell, RefMut};
use std::fmt;
use std::io::{self, Write};

use anyhow::Context as _;
use tracing::debug;

use crate::args::Args;
use crate::command::{Command, Commands, HookFn};
use crate::context::{Context, ExecContext};
use crate::error::exit_code;
use crate::flags::Flags;

/// Exit strategy invoked with the status of a failed dispatch.
pub type ExiterFn = Box<dyn Fn(i32)>;

/// A command-line application: global flags, registered commands and hooks.
///
/// Build one per run. Nothing is global; the environment and output streams
/// can be swapped for tests.
pub struct App {
    pub name: String,
    pub usage: String,
    /// Replaces the generated usage line in help.
    pub usage_text: String,
    pub description: String,
    pub version: String,
    pub authors: Vec<String>,
    /// Parsed before any command is resolved.
    pub flags: Flags,
    pub commands: Commands,
    /// Runs before the resolved command's own `before`.
    pub before: Option<HookFn>,
    /// Name of the command dispatched when the first argument matches nothing.
    pub default_command: Option<String>,
    /// Called with the exit status when a dispatch fails.
    pub os_exiter: ExiterFn,
    /// Environment consulted for flag fallbacks; `None` reads the process env.
    pub env: Option<Vec<(String, String)>>,
    writer: RefCell<Box<dyn Write>>,
    err_writer: RefCell<Box<dyn Write>>,
}

impl App {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            usage: String::new(),
            usage_text: String::new(),
            description: String::new(),
            version: String::new(),
            authors: Vec::new(),
            flags: Flags::new(),
            commands: Commands::new(),
            before: None,
            default_command: None,
            os_exiter: Box::new(|code| {
                std::process::exit(code);
            }),
            env: None,
            writer: RefCell::new(Box::new(io::stdout())),
            err_writer: RefCell::new(Box::new(io::stderr())),
        }
    }

    pub fn set_before<F>(&mut self, hook: F)
    where
        F: Fn(&Context<'_>) -> anyhow::Result<()> + 'static,
    {
        self.before = Some(Box::new(hook));
    }

    pub fn set_writer(&mut self, writer: impl Write + 'static) {
        self.writer = RefCell::new(Box::new(writer));
    }

    pub fn set_err_writer(&mut self, writer: impl Write + 'static) {
        self.err_writer = RefCell::new(Box::new(writer));
    }

    /// Standard output of the app (help, command output).
    pub fn writer(&self) -> RefMut<'_, Box<dyn Write>> {
        self.writer.borrow_mut()
    }

    pub fn err_writer(&self) -> RefMut<'_, Box<dyn Write>> {
        self.err_writer.borrow_mut()
    }

    /// Dispatch `args` (program name excluded) with a fresh execution context.
    pub fn run<I, S>(&self, args: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_context(ExecContext::new(), args)
    }

    /// Dispatch `args` under a caller-supplied execution context.
    ///
    /// On failure the exit strategy is called with the error's exit status
    /// before the error is returned.
    pub fn run_context<I, S>(&self, exec: ExecContext, args: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let result = self.dispatch(exec, Args::new(args));
        if let Err(err) = &result {
            (self.os_exiter)(exit_code(err));
        }
        result
    }

    fn dispatch(&self, exec: ExecContext, args: Args) -> anyhow::Result<()> {
        let env = match &self.env {
            Some(env) => env.clone(),
            None => std::env::vars().collect(),
        };
        let (global, rest) = self
            .flags
            .parse(&args, &env)
            .context("failed to parse global flags")?;
        let root = Context::new(self, exec, rest.clone(), global, env);

        if let Some(command) = rest.command_name().and_then(|name| self.commands.get(name)) {
            debug!(command = %command.name, "dispatching registered command");
            return self.run_command(&root, command, rest.tail());
        }
        if let Some(command) = self.default_command() {
            debug!(command = %command.name, "dispatching default command");
            return self.run_command(&root, command, rest);
        }

        let fallback = Command::root();
        self.run_command(&root, &fallback, rest)
    }

    /// The registered command named by `default_command`, if any.
    pub fn default_command(&self) -> Option<&Command> {
        self.default_command
            .as_deref()
            .and_then(|name| self.commands.get(name))
    }

    fn run_command(&self, parent: &Context<'_>, command: &Command, args: Args) -> anyhow::Result<()> {
        let (flag_set, rest) = command
            .flags
            .parse(&args, parent.env())
            .with_context(|| format!("failed to parse flags of command {:?}", command.name))?;
        let ctx = parent.clone_with(command, rest).with_flag_set(flag_set);

        if let Some(sub) = ctx
            .args()
            .command_name()
            .and_then(|name| command.subcommands.get(name))
        {
            debug!(parent = %command.name, command = %sub.name, "dispatching subcommand");
            let tail = ctx.args().tail();
            return self.run_command(&ctx, sub, tail);
        }

        self.run_hooks(&ctx, command)
    }

    /// `app.before`, then `command.before`, then the action unless a hook
    /// suppressed it.
    fn run_hooks(&self, ctx: &Context<'_>, command: &Command) -> anyhow::Result<()> {
        if let Some(before) = &self.before {
            before(ctx).context("before hook failed")?;
        }
        if let Some(before) = &command.before {
            before(ctx)
                .with_context(|| format!("before hook of command {:?} failed", command.name))?;
        }
        if ctx.action_suppressed() {
            debug!(command = %command.name, "action suppressed");
            return Ok(());
        }
        if let Some(action) = &command.action {
            action(ctx).with_context(|| format!("command {:?} failed", command.name))?;
        }
        Ok(())
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("flags", &self.flags)
            .field("commands", &self.commands)
            .field("default_command", &self.default_command)
            .finish_non_exhaustive()
    }
}
