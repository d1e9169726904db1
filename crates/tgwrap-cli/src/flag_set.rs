//! Per-dispatch parsed flag state.

use indexmap::IndexMap;
use tracing::trace;

use crate::args::Args;
use crate::error::{Error, Result};
use crate::value::{Value, ValueSource};

struct Entry {
    name: String,
    env_var: Option<String>,
    value: Box<dyn Value>,
}

/// Flags registered for one command, keyed by every name and alias.
///
/// Unlike a strict parser, tokens that do not name a registered flag are kept
/// (in order) as remaining arguments so they can be forwarded to the wrapped
/// tool untouched.
#[derive(Default)]
pub struct FlagSet {
    entries: Vec<Entry>,
    lookup: IndexMap<String, usize>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bound value under `names` (canonical name first).
    pub fn var(
        &mut self,
        names: &[&str],
        env_var: Option<&str>,
        value: Box<dyn Value>,
    ) -> Result<()> {
        let Some(canonical) = names.first() else {
            return Err(Error::Resolution("flag registered without a name".to_string()));
        };
        if let Some(dup) = names.iter().find(|name| self.lookup.contains_key(**name)) {
            return Err(Error::DuplicateFlag((*dup).to_string()));
        }
        let idx = self.entries.len();
        for name in names {
            self.lookup.insert((*name).to_string(), idx);
        }
        self.entries.push(Entry {
            name: (*canonical).to_string(),
            env_var: env_var.map(str::to_string),
            value,
        });
        Ok(())
    }

    /// Consume registered flags from `args`, returning everything else.
    ///
    /// Accepts `-name`, `--name`, `-name=value` and `-name value`; bool flags
    /// never take the next token. `--` ends parsing and is kept together
    /// with the tokens after it.
    pub fn parse(&mut self, args: &[String]) -> Result<Args> {
        let mut rest = Vec::new();
        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];
            if arg == "--" {
                rest.extend_from_slice(&args[i..]);
                break;
            }

            let Some((name, inline)) = split_flag(arg) else {
                rest.push(arg.clone());
                i += 1;
                continue;
            };
            let Some(&idx) = self.lookup.get(name) else {
                rest.push(arg.clone());
                i += 1;
                continue;
            };

            let raw = match inline {
                Some(value) => value.to_string(),
                None if self.entries[idx].value.is_bool_flag() => "true".to_string(),
                None => {
                    i += 1;
                    args.get(i)
                        .cloned()
                        .ok_or_else(|| Error::MissingValue(name.to_string()))?
                }
            };
            self.set_entry(idx, &raw, ValueSource::Args)?;
            i += 1;
        }
        Ok(Args::new(rest))
    }

    /// Fill flags still unset after `parse` from their environment variables.
    /// Empty variables count as absent.
    pub fn apply_env(&mut self, env: &[(String, String)]) -> Result<()> {
        for idx in 0..self.entries.len() {
            let entry = &self.entries[idx];
            if entry.value.is_set() {
                continue;
            }
            let Some(key) = entry.env_var.as_deref() else {
                continue;
            };
            let Some(raw) = env_lookup(env, key).filter(|v| !v.is_empty()) else {
                continue;
            };
            trace!(flag = %entry.name, env = key, "flag value taken from environment");
            let raw = raw.to_string();
            self.set_entry(idx, &raw, ValueSource::Env)?;
        }
        Ok(())
    }

    /// Whether the flag known by `name` received a value from args or env.
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| v.is_set())
    }

    pub fn source(&self, name: &str) -> Option<ValueSource> {
        self.get(name).map(|v| v.source())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Value> {
        self.lookup
            .get(name)
            .map(|&idx| self.entries[idx].value.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Canonical names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    fn set_entry(&mut self, idx: usize, raw: &str, source: ValueSource) -> Result<()> {
        let entry = &mut self.entries[idx];
        entry
            .value
            .set(raw, source)
            .map_err(|err| err.into_error(&entry.name, raw))
    }
}

fn split_flag(arg: &str) -> Option<(&str, Option<&str>)> {
    let body = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-'))?;
    if body.is_empty() || body.starts_with('-') {
        return None;
    }
    Some(match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    })
}

pub(crate) fn env_lookup<'e>(env: &'e [(String, String)], key: &str) -> Option<&'e str> {
    env.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Destination, FlagType, GenericValue};
    use crate::error::ValueError;

    #[derive(Clone)]
    struct Text;

    impl FlagType<String> for Text {
        fn set(&self, dest: &mut String, raw: &str, _reset: bool) -> std::result::Result<(), ValueError> {
            *dest = raw.to_string();
            Ok(())
        }

        fn format(&self, dest: &String) -> String {
            dest.clone()
        }
    }

    #[derive(Clone)]
    struct Switch;

    impl FlagType<bool> for Switch {
        fn set(&self, dest: &mut bool, raw: &str, _reset: bool) -> std::result::Result<(), ValueError> {
            *dest = raw == "true";
            Ok(())
        }

        fn format(&self, dest: &bool) -> String {
            dest.to_string()
        }

        fn is_bool_flag(&self) -> bool {
            true
        }
    }

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn set_with(text: Destination<String>, switch: Destination<bool>) -> FlagSet {
        let mut set = FlagSet::new();
        set.var(
            &["config", "c"],
            Some("CONFIG"),
            Box::new(GenericValue::new(Text, text)),
        )
        .unwrap();
        set.var(&["debug"], None, Box::new(GenericValue::new(Switch, switch)))
            .unwrap();
        set
    }

    #[test]
    fn known_flags_are_consumed_anywhere_unknown_kept_in_order() {
        let text = Destination::default();
        let switch = Destination::default();
        let mut set = set_with(text.clone(), switch.clone());

        let rest = set
            .parse(&argv(&["plan", "--config", "a.hcl", "-input=false", "-debug", "-var", "x=1"]))
            .unwrap();

        assert_eq!(rest.as_slice(), argv(&["plan", "-input=false", "-var", "x=1"]).as_slice());
        assert_eq!(text.get(), "a.hcl");
        assert!(switch.get());
        assert!(set.is_set("c"));
        assert_eq!(set.source("config"), Some(ValueSource::Args));
    }

    #[test]
    fn bool_flag_does_not_take_next_token() {
        let switch = Destination::default();
        let mut set = set_with(Destination::default(), switch.clone());
        let rest = set.parse(&argv(&["--debug", "apply"])).unwrap();
        assert_eq!(rest.as_slice(), argv(&["apply"]).as_slice());
        assert!(switch.get());
    }

    #[test]
    fn separator_stops_parsing() {
        let mut set = set_with(Destination::default(), Destination::default());
        let rest = set.parse(&argv(&["--", "--debug"])).unwrap();
        assert_eq!(rest.as_slice(), argv(&["--", "--debug"]).as_slice());
        assert!(!set.is_set("debug"));
    }

    #[test]
    fn triple_dash_is_not_a_flag_before_or_after_normalizing() {
        let mut set = set_with(Destination::default(), Destination::default());
        let args = Args::new(["---debug"]).normalize(crate::args::NormalizeStyle::OneDashFlag);
        let rest = set.parse(args.as_slice()).unwrap();
        assert_eq!(rest.as_slice(), argv(&["---debug"]).as_slice());
        assert!(!set.is_set("debug"));
    }

    #[test]
    fn missing_value_is_an_error() {
        let mut set = set_with(Destination::default(), Destination::default());
        let err = set.parse(&argv(&["--config"])).unwrap_err();
        assert!(matches!(err, Error::MissingValue(ref name) if name == "config"));
    }

    #[test]
    fn env_only_fills_unset_flags() {
        let env = vec![("CONFIG".to_string(), "env.hcl".to_string())];

        let text = Destination::default();
        let mut set = set_with(text.clone(), Destination::default());
        set.parse(&[]).unwrap();
        set.apply_env(&env).unwrap();
        assert_eq!(text.get(), "env.hcl");
        assert_eq!(set.source("config"), Some(ValueSource::Env));

        let text = Destination::default();
        let mut set = set_with(text.clone(), Destination::default());
        set.parse(&argv(&["-config=cli.hcl"])).unwrap();
        set.apply_env(&env).unwrap();
        assert_eq!(text.get(), "cli.hcl");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut set = set_with(Destination::default(), Destination::default());
        let err = set
            .var(&["c"], None, Box::new(GenericValue::new(Text, Destination::default())))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateFlag(ref name) if name == "c"));
    }
}
