//! Dispatch contexts.
//!
//! A [`Context`] is created per dispatch step and links to the one it was
//! cloned from. Children borrow their parent, so the chain is acyclic and
//! lives no longer than the dispatch that built it.

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tokio_util::sync::CancellationToken;

use crate::app::App;
use crate::args::Args;
use crate::command::Command;
use crate::flag_set::FlagSet;

struct ValueNode {
    key: &'static str,
    value: Rc<dyn Any>,
    next: Option<Rc<ValueNode>>,
}

/// Values and cancellation inherited from the caller of a dispatch.
///
/// Values form a persistent list: [`ExecContext::with_value`] prepends a
/// node and leaves the receiver untouched, and lookups walk towards the root
/// so the closest binding of a key wins.
#[derive(Clone, Default)]
pub struct ExecContext {
    values: Option<Rc<ValueNode>>,
    cancel: CancellationToken,
}

impl ExecContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a caller-owned token; cancelling it is visible to every context
    /// derived from this one.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            values: None,
            cancel: token,
        }
    }

    #[must_use]
    pub fn with_value<T: 'static>(&self, key: &'static str, value: T) -> Self {
        Self {
            values: Some(Rc::new(ValueNode {
                key,
                value: Rc::new(value),
                next: self.values.clone(),
            })),
            cancel: self.cancel.clone(),
        }
    }

    /// Closest value bound to `key`, if it has type `T`.
    pub fn value<T: 'static>(&self, key: &str) -> Option<&T> {
        let mut node = self.values.as_deref();
        while let Some(current) = node {
            if current.key == key {
                return current.value.downcast_ref::<T>();
            }
            node = current.next.as_deref();
        }
        None
    }

    /// Same values, with a token cancelled whenever this one is.
    pub fn child(&self) -> Self {
        Self {
            values: self.values.clone(),
            cancel: self.cancel.child_token(),
        }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl fmt::Debug for ExecContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = Vec::new();
        let mut node = self.values.as_deref();
        while let Some(current) = node {
            keys.push(current.key);
            node = current.next.as_deref();
        }
        f.debug_struct("ExecContext")
            .field("keys", &keys)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Parsed state handed to hooks.
#[derive(Clone)]
pub struct Context<'a> {
    exec: ExecContext,
    app: &'a App,
    command: Option<&'a Command>,
    args: Args,
    flag_set: Rc<FlagSet>,
    env: Rc<Vec<(String, String)>>,
    suppressed: Rc<Cell<bool>>,
    parent: Option<&'a Context<'a>>,
}

impl<'a> Context<'a> {
    /// Root of a dispatch: no command, no parent.
    pub fn new(
        app: &'a App,
        exec: ExecContext,
        args: Args,
        flag_set: FlagSet,
        env: Vec<(String, String)>,
    ) -> Self {
        Self {
            exec,
            app,
            command: None,
            args,
            flag_set: Rc::new(flag_set),
            env: Rc::new(env),
            suppressed: Rc::new(Cell::new(false)),
            parent: None,
        }
    }

    /// Child context for `command`, linked to `self`.
    ///
    /// The execution context is inherited unchanged; the child starts with an
    /// empty flag set until the command's flags are parsed.
    pub fn clone_with<'b>(&'b self, command: &'b Command, args: Args) -> Context<'b> {
        Context {
            exec: self.exec.clone(),
            app: self.app,
            command: Some(command),
            args,
            flag_set: Rc::new(FlagSet::new()),
            env: Rc::clone(&self.env),
            suppressed: Rc::new(Cell::new(false)),
            parent: Some(self),
        }
    }

    pub(crate) fn with_flag_set(mut self, flag_set: FlagSet) -> Self {
        self.flag_set = Rc::new(flag_set);
        self
    }

    /// Copy of this context whose execution context also binds `key`.
    ///
    /// Neither the receiver nor its ancestors change; use the returned value.
    #[must_use]
    pub fn with_value<T: 'static>(&self, key: &'static str, value: T) -> Self {
        Self {
            exec: self.exec.with_value(key, value),
            ..self.clone()
        }
    }

    /// Closest binding of `key`, searching this context's execution context
    /// and then each ancestor's.
    pub fn value<T: 'static>(&self, key: &str) -> Option<&T> {
        self.lineage().into_iter().find_map(|ctx| ctx.exec.value(key))
    }

    pub fn app(&self) -> &'a App {
        self.app
    }

    /// The resolved command; `None` on the root context.
    pub fn command(&self) -> Option<&'a Command> {
        self.command
    }

    pub fn args(&self) -> &Args {
        &self.args
    }

    pub fn flag_set(&self) -> &FlagSet {
        &self.flag_set
    }

    /// Environment flags were resolved against.
    pub fn env(&self) -> &[(String, String)] {
        &self.env
    }

    pub fn exec(&self) -> &ExecContext {
        &self.exec
    }

    pub fn parent(&self) -> Option<&'a Context<'a>> {
        self.parent
    }

    /// This context followed by its ancestors, root last.
    pub fn lineage(&self) -> Vec<&Context<'a>> {
        let mut out = vec![self];
        let mut current = self.parent;
        while let Some(ctx) = current {
            out.push(ctx);
            current = ctx.parent;
        }
        out
    }

    /// Whether any context in the chain parsed a value for `name`.
    pub fn is_flag_set(&self, name: &str) -> bool {
        self.lineage().iter().any(|ctx| ctx.flag_set.is_set(name))
    }

    /// Skip the command's action for this dispatch. Hooks already queued
    /// still run.
    pub fn suppress_action(&self) {
        self.suppressed.set(true);
    }

    pub fn action_suppressed(&self) -> bool {
        self.suppressed.get()
    }

    pub fn is_cancelled(&self) -> bool {
        self.exec.is_cancelled()
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("command", &self.command.map(|c| c.name.as_str()))
            .field("args", &self.args)
            .field("depth", &(self.lineage().len() - 1))
            .field("exec", &self.exec)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{BoolFlag, Flags};

    #[test]
    fn with_value_leaves_receiver_untouched() {
        let base = ExecContext::new();
        let derived = base.with_value("region", "eu-west-1".to_string());
        assert!(base.value::<String>("region").is_none());
        assert_eq!(derived.value::<String>("region").map(String::as_str), Some("eu-west-1"));
    }

    #[test]
    fn closest_binding_shadows() {
        let exec = ExecContext::new()
            .with_value("n", 1u32)
            .with_value("other", true)
            .with_value("n", 2u32);
        assert_eq!(exec.value::<u32>("n"), Some(&2));
        assert_eq!(exec.value::<bool>("other"), Some(&true));
        assert!(exec.value::<String>("n").is_none());
    }

    #[test]
    fn child_token_follows_parent() {
        let parent = ExecContext::new();
        let child = parent.child();
        let sibling = parent.child();
        child.cancellation_token().cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
        parent.cancellation_token().cancel();
        assert!(sibling.is_cancelled());
    }

    #[test]
    fn chain_links_values_and_flags() {
        let app = App::new("tgwrap");
        let help = Flags::new().with(BoolFlag::new("help"));
        let (set, rest) = help.parse(&Args::new(["--help", "plan"]), &[]).unwrap();

        let exec = ExecContext::new().with_value("request", 7u8);
        let root = Context::new(&app, exec, rest, set, Vec::new());
        let command = Command::new("plan");
        let child = root.clone_with(&command, Args::new(["-out=x"]));

        assert_eq!(child.command().map(|c| c.name.as_str()), Some("plan"));
        assert!(root.command().is_none());
        assert_eq!(child.lineage().len(), 2);
        assert!(child.parent().is_some());
        assert!(child.is_flag_set("help"));
        assert!(!child.flag_set().is_set("help"));
        assert_eq!(child.value::<u8>("request"), Some(&7));

        let tagged = child.with_value("request", 9u8);
        assert_eq!(tagged.value::<u8>("request"), Some(&9));
        assert_eq!(child.value::<u8>("request"), Some(&7));
        assert_eq!(tagged.args(), child.args());
    }

    #[test]
    fn suppression_is_shared_by_value_copies() {
        let app = App::new("tgwrap");
        let root = Context::new(&app, ExecContext::new(), Args::default(), FlagSet::new(), Vec::new());
        let copy = root.with_value("k", ());
        copy.suppress_action();
        assert!(root.action_suppressed());

        let command = Command::new("plan");
        let child = root.clone_with(&command, Args::default());
        assert!(!child.action_suppressed());
    }

    #[test]
    fn cancellation_reaches_cloned_contexts() {
        let app = App::new("tgwrap");
        let token = CancellationToken::new();
        let root = Context::new(
            &app,
            ExecContext::with_cancellation(token.clone()),
            Args::default(),
            FlagSet::new(),
            Vec::new(),
        );
        let command = Command::new("plan");
        let child = root.clone_with(&command, Args::default());
        token.cancel();
        assert!(child.is_cancelled());
    }
}
