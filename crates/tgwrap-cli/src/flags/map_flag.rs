use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::error::ValueError;
use crate::value::{self, FlagType, FlagValue, Splitter};

use super::TypedFlag;

/// Repeatable `KEY=VALUE` flag merging into a `HashMap<K, V>`.
///
/// An occurrence may carry several entries separated by the entry separator.
/// Each entry is split into key and value by the splitter; the last write for
/// a key wins.
pub type MapFlag<K, V> = TypedFlag<HashMap<K, V>, MapType<K, V>>;

pub const MAP_FLAG_ENTRY_SEP: &str = ",";
pub const MAP_FLAG_KEY_VAL_SEP: &str = "=";

pub struct MapType<K, V> {
    splitter: Splitter,
    entry_sep: String,
    key_val_sep: String,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> Default for MapType<K, V> {
    fn default() -> Self {
        Self {
            splitter: value::split,
            entry_sep: MAP_FLAG_ENTRY_SEP.to_string(),
            key_val_sep: MAP_FLAG_KEY_VAL_SEP.to_string(),
            _marker: PhantomData,
        }
    }
}

impl<K, V> Clone for MapType<K, V> {
    fn clone(&self) -> Self {
        Self {
            splitter: self.splitter,
            entry_sep: self.entry_sep.clone(),
            key_val_sep: self.key_val_sep.clone(),
            _marker: PhantomData,
        }
    }
}

impl<K, V> FlagType<HashMap<K, V>> for MapType<K, V>
where
    K: FlagValue + Eq + Hash + Ord,
    V: FlagValue,
{
    fn set(&self, dest: &mut HashMap<K, V>, raw: &str, reset: bool) -> Result<(), ValueError> {
        let mut entries = Vec::new();
        for entry in raw.split(self.entry_sep.as_str()) {
            let parts = (self.splitter)(entry, &self.key_val_sep);
            let [key, val] = parts.as_slice() else {
                return Err(ValueError::KeyValue {
                    sep: self.key_val_sep.clone(),
                });
            };
            entries.push((K::parse_value(key.trim())?, V::parse_value(val.trim())?));
        }
        if reset {
            dest.clear();
        }
        dest.extend(entries);
        Ok(())
    }

    fn format(&self, dest: &HashMap<K, V>) -> String {
        let mut pairs: Vec<(&K, &V)> = dest.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        let pairs: Vec<String> = pairs
            .into_iter()
            .map(|(k, v)| format!("{}{}{}", k.format_value(), self.key_val_sep, v.format_value()))
            .collect();
        format!("{{{}}}", pairs.join(", "))
    }
}

impl<K, V> TypedFlag<HashMap<K, V>, MapType<K, V>>
where
    K: FlagValue + Eq + Hash + Ord,
    V: FlagValue,
{
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_type(name, MapType::default())
    }

    /// Splitter applied to each entry on the key/value separator.
    pub fn splitter(mut self, splitter: Splitter) -> Self {
        self.flag_type.splitter = splitter;
        self
    }

    pub fn entry_sep(mut self, sep: impl Into<String>) -> Self {
        self.flag_type.entry_sep = sep.into();
        self
    }

    pub fn key_val_sep(mut self, sep: impl Into<String>) -> Self {
        self.flag_type.key_val_sep = sep.into();
        self
    }
}
