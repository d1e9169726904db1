//! Flag declarations and the `Flags` collection.
//!
//! Every variant is a [`TypedFlag`] over a value type and a write rule:
//!
//! | alias            | destination         | rule                      |
//! |------------------|---------------------|---------------------------|
//! | [`BoolFlag`]     | `bool`              | presence, optional invert |
//! | [`GenericFlag`]  | `T`                 | overwrite                 |
//! | [`SliceFlag`]    | `Vec<T>`            | split and append          |
//! | [`MapFlag`]      | `HashMap<K, V>`     | split and merge           |

mod bool_flag;
mod generic_flag;
mod map_flag;
mod slice_flag;

pub use bool_flag::{BoolFlag, BoolType};
pub use generic_flag::{GenericFlag, ScalarType};
pub use map_flag::{MapFlag, MapType};
pub use slice_flag::{SliceFlag, SliceType};

use std::cell::OnceCell;
use std::fmt;

use crate::args::Args;
use crate::error::Result;
use crate::flag_set::FlagSet;
use crate::value::{Destination, FlagType, GenericValue, Value};

/// A named, typed switch bound to a caller-owned destination.
pub trait Flag: fmt::Display {
    fn name(&self) -> &str;
    fn aliases(&self) -> &[String];
    fn usage(&self) -> &str;
    fn env_var(&self) -> Option<&str>;
    fn default_text(&self) -> String;
    fn takes_value(&self) -> bool;
    fn hidden(&self) -> bool;

    /// Register a fresh value bound to this flag's destination in `set`.
    fn apply(&self, set: &mut FlagSet) -> Result<()>;

    /// Name followed by aliases; the first entry is canonical.
    fn names(&self) -> Vec<&str> {
        std::iter::once(self.name())
            .chain(self.aliases().iter().map(String::as_str))
            .collect()
    }

    fn env_vars(&self) -> Vec<&str> {
        self.env_var().into_iter().collect()
    }

    fn has_name(&self, name: &str) -> bool {
        self.name() == name || self.aliases().iter().any(|a| a == name)
    }
}

/// A flag variant: value type `T` written by rule `F`.
pub struct TypedFlag<T, F> {
    name: String,
    aliases: Vec<String>,
    usage: String,
    env_var: Option<String>,
    default_text: Option<String>,
    hidden: bool,
    destination: Option<Destination<T>>,
    flag_type: F,
    applied_default: OnceCell<String>,
}

impl<T, F> TypedFlag<T, F> {
    fn with_type(name: impl Into<String>, flag_type: F) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            usage: String::new(),
            env_var: None,
            default_text: None,
            hidden: false,
            destination: None,
            flag_type,
            applied_default: OnceCell::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn env_var(mut self, env_var: impl Into<String>) -> Self {
        self.env_var = Some(env_var.into());
        self
    }

    /// Override the default shown in help.
    pub fn default_text(mut self, text: impl Into<String>) -> Self {
        self.default_text = Some(text.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn destination(mut self, destination: Destination<T>) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn flag_type(&self) -> &F {
        &self.flag_type
    }
}

impl<T, F> Flag for TypedFlag<T, F>
where
    T: Default + 'static,
    F: FlagType<T>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }

    fn usage(&self) -> &str {
        &self.usage
    }

    fn env_var(&self) -> Option<&str> {
        self.env_var.as_deref()
    }

    fn default_text(&self) -> String {
        if let Some(text) = &self.default_text {
            return text.clone();
        }
        if let Some(text) = self.applied_default.get() {
            return text.clone();
        }
        match &self.destination {
            Some(dest) => self.flag_type.format(&dest.borrow_mut()),
            None => self.flag_type.format(&T::default()),
        }
    }

    fn takes_value(&self) -> bool {
        !self.flag_type.is_bool_flag()
    }

    fn hidden(&self) -> bool {
        self.hidden
    }

    fn apply(&self, set: &mut FlagSet) -> Result<()> {
        let dest = self.destination.clone().unwrap_or_default();
        let value = GenericValue::new(self.flag_type.clone(), dest);
        self.applied_default
            .get_or_init(|| value.default_text().to_string());
        set.var(&self.names(), self.env_var.as_deref(), Box::new(value))
    }
}

impl<T, F> fmt::Display for TypedFlag<T, F>
where
    T: Default + 'static,
    F: FlagType<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&flag_line(self))
    }
}

/// One help line: `--name value, -n value<TAB>usage (default: x) [$ENV]`.
///
/// The tab separates the column the help renderer aligns.
pub fn flag_line(flag: &dyn Flag) -> String {
    let names: Vec<String> = flag
        .names()
        .into_iter()
        .map(|name| {
            let dashes = if name.chars().count() == 1 { "-" } else { "--" };
            if flag.takes_value() {
                format!("{dashes}{name} value")
            } else {
                format!("{dashes}{name}")
            }
        })
        .collect();

    let mut out = format!("{}\t{}", names.join(", "), flag.usage());
    let default = flag.default_text();
    let show_default = if flag.takes_value() {
        !default.is_empty() && default != "[]" && default != "{}"
    } else {
        default == "true"
    };
    if show_default {
        out.push_str(&format!(" (default: {default})"));
    }
    if let Some(env) = flag.env_var() {
        out.push_str(&format!(" [${env}]"));
    }
    out
}

/// Ordered flag declarations of one command.
#[derive(Default)]
pub struct Flags(Vec<Box<dyn Flag>>);

impl Flags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, flag: impl Flag + 'static) {
        self.0.push(Box::new(flag));
    }

    /// Builder form of [`Flags::add`].
    pub fn with(mut self, flag: impl Flag + 'static) -> Self {
        self.add(flag);
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Flag> {
        self.0.iter().find(|f| f.has_name(name)).map(|f| &**f)
    }

    /// Keep only flags known by one of `names`, in their original order.
    pub fn filter(self, names: &[&str]) -> Flags {
        Self(
            self.0
                .into_iter()
                .filter(|flag| names.iter().any(|name| flag.has_name(name)))
                .collect(),
        )
    }

    /// Lexicographic by name.
    pub fn sort(&mut self) {
        self.0.sort_by(|a, b| a.name().cmp(b.name()));
    }

    pub fn visible(&self) -> impl Iterator<Item = &dyn Flag> {
        self.iter().filter(|f| !f.hidden())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Flag> {
        self.0.iter().map(|f| &**f)
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bind every flag into a fresh `FlagSet`, parse `args`, then fall back to
    /// `env` for flags the arguments left unset.
    pub fn parse(&self, args: &Args, env: &[(String, String)]) -> Result<(FlagSet, Args)> {
        let mut set = FlagSet::new();
        for flag in &self.0 {
            flag.apply(&mut set)?;
        }
        let rest = set.parse(args.as_slice())?;
        set.apply_env(env)?;
        Ok((set, rest))
    }
}

impl FromIterator<Box<dyn Flag>> for Flags {
    fn from_iter<I: IntoIterator<Item = Box<dyn Flag>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
