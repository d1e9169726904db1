use std::marker::PhantomData;

use crate::error::ValueError;
use crate::value::{self, FlagType, FlagValue, Splitter};

use super::TypedFlag;

/// Repeatable flag collecting into a `Vec<T>`.
///
/// Each occurrence (or environment value) is split on the value separator
/// and every piece is appended in order; duplicates are kept. The first value
/// received replaces whatever the destination held before parsing.
pub type SliceFlag<T> = TypedFlag<Vec<T>, SliceType<T>>;

pub const SLICE_FLAG_VALUE_SEP: &str = ",";

pub struct SliceType<T> {
    splitter: Splitter,
    value_sep: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for SliceType<T> {
    fn default() -> Self {
        Self {
            splitter: value::split,
            value_sep: SLICE_FLAG_VALUE_SEP.to_string(),
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for SliceType<T> {
    fn clone(&self) -> Self {
        Self {
            splitter: self.splitter,
            value_sep: self.value_sep.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: FlagValue> FlagType<Vec<T>> for SliceType<T> {
    fn set(&self, dest: &mut Vec<T>, raw: &str, reset: bool) -> Result<(), ValueError> {
        let items = (self.splitter)(raw, &self.value_sep)
            .iter()
            .map(|part| T::parse_value(part.trim()))
            .collect::<Result<Vec<T>, _>>()?;
        if reset {
            dest.clear();
        }
        dest.extend(items);
        Ok(())
    }

    fn format(&self, dest: &Vec<T>) -> String {
        let items: Vec<String> = dest.iter().map(FlagValue::format_value).collect();
        format!("[{}]", items.join(", "))
    }
}

impl<T: FlagValue> TypedFlag<Vec<T>, SliceType<T>> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_type(name, SliceType::default())
    }

    pub fn splitter(mut self, splitter: Splitter) -> Self {
        self.flag_type.splitter = splitter;
        self
    }

    pub fn value_sep(mut self, sep: impl Into<String>) -> Self {
        self.flag_type.value_sep = sep.into();
        self
    }
}
