//! Value coercion shared by every flag variant.
//!
//! A flag writes into a [`Destination`] owned by the caller. The write rule
//! (overwrite, invert, append, merge) is a [`FlagType`]; [`GenericValue`]
//! binds one to a destination and tracks where the current value came from.

use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::error::ValueError;

/// Canonical text form of a single flag value.
pub trait FlagValue: Clone + Default + 'static {
    fn parse_value(raw: &str) -> Result<Self, ValueError>;
    fn format_value(&self) -> String;
}

impl FlagValue for String {
    fn parse_value(raw: &str) -> Result<Self, ValueError> {
        Ok(raw.to_string())
    }

    fn format_value(&self) -> String {
        self.clone()
    }
}

impl FlagValue for bool {
    fn parse_value(raw: &str) -> Result<Self, ValueError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "1" => Ok(true),
            "false" | "f" | "0" => Ok(false),
            _ => Err(ValueError::Invalid(format!(
                "expected a boolean (true/false), got {raw:?}"
            ))),
        }
    }

    fn format_value(&self) -> String {
        self.to_string()
    }
}

macro_rules! number_flag_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FlagValue for $ty {
                fn parse_value(raw: &str) -> Result<Self, ValueError> {
                    raw.trim()
                        .parse::<$ty>()
                        .map_err(|err| ValueError::Invalid(err.to_string()))
                }

                fn format_value(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

number_flag_value!(i32, i64, u32, u64, usize, f64);

impl FlagValue for Duration {
    fn parse_value(raw: &str) -> Result<Self, ValueError> {
        parse_duration(raw)
    }

    fn format_value(&self) -> String {
        format_duration(self)
    }
}

/// Parse `1h30m`, `250ms`, `1.5s`, or a bare number of seconds.
fn parse_duration(raw: &str) -> Result<Duration, ValueError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(ValueError::Invalid("empty duration".to_string()));
    }
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return Err(ValueError::Invalid(format!("invalid duration {raw:?}")));
        }
        let (num, tail) = rest.split_at(num_len);
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_len);

        let value: f64 = num
            .parse()
            .map_err(|_| ValueError::Invalid(format!("invalid duration {raw:?}")))?;
        let scale = match unit {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            "" => {
                return Err(ValueError::Invalid(format!(
                    "missing unit in duration {raw:?}"
                )));
            }
            other => {
                return Err(ValueError::Invalid(format!(
                    "unknown unit {other:?} in duration {raw:?}"
                )));
            }
        };
        let out_of_range = || ValueError::Invalid(format!("duration {raw:?} out of range"));
        let part = Duration::try_from_secs_f64(value * scale).map_err(|_| out_of_range())?;
        total = total.checked_add(part).ok_or_else(out_of_range)?;
        rest = next;
    }
    Ok(total)
}

fn format_duration(d: &Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }
    let secs = d.as_secs();
    let nanos = d.subsec_nanos();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);

    let mut out = String::new();
    if h > 0 {
        out.push_str(&format!("{h}h"));
    }
    if m > 0 {
        out.push_str(&format!("{m}m"));
    }
    if s > 0 {
        out.push_str(&format!("{s}s"));
    }
    if nanos > 0 {
        if nanos % 1_000_000 == 0 {
            out.push_str(&format!("{}ms", nanos / 1_000_000));
        } else {
            out.push_str(&format!("{nanos}ns"));
        }
    }
    out
}

trait Slot<T> {
    fn borrow_mut(&self) -> RefMut<'_, T>;
}

struct CellSlot<T>(Rc<RefCell<T>>);

impl<T> Slot<T> for CellSlot<T> {
    fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }
}

struct FieldSlot<O, T> {
    owner: Rc<RefCell<O>>,
    project: fn(&mut O) -> &mut T,
}

impl<O, T> Slot<T> for FieldSlot<O, T> {
    fn borrow_mut(&self) -> RefMut<'_, T> {
        RefMut::map(self.owner.borrow_mut(), self.project)
    }
}

/// Caller-owned storage a flag writes its parsed value into.
///
/// The framework holds a handle to the slot but never decides its lifetime;
/// every clone of a `Destination` refers to the same slot.
pub struct Destination<T> {
    slot: Rc<dyn Slot<T>>,
}

impl<T: 'static> Destination<T> {
    pub fn new(cell: Rc<RefCell<T>>) -> Self {
        Self {
            slot: Rc::new(CellSlot(cell)),
        }
    }

    /// Bind to one field of a shared options struct.
    pub fn field<O: 'static>(owner: Rc<RefCell<O>>, project: fn(&mut O) -> &mut T) -> Self {
        Self {
            slot: Rc::new(FieldSlot { owner, project }),
        }
    }

    /// Mutable access to the slot.
    ///
    /// Panics if the slot is already borrowed, like `RefCell::borrow_mut`.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.slot.borrow_mut()
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.borrow_mut().clone()
    }

    pub fn set(&self, value: T) {
        *self.borrow_mut() = value;
    }
}

impl<T: Default + 'static> Default for Destination<T> {
    fn default() -> Self {
        Self::new(Rc::new(RefCell::new(T::default())))
    }
}

impl<T> Clone for Destination<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T> fmt::Debug for Destination<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Destination").finish_non_exhaustive()
    }
}

/// How a flag variant writes one raw string into its destination.
pub trait FlagType<T>: Clone + 'static {
    /// `reset` is true for the first value the flag receives in a dispatch;
    /// accumulating variants drop the compiled-in default at that point.
    fn set(&self, dest: &mut T, raw: &str, reset: bool) -> Result<(), ValueError>;

    fn format(&self, dest: &T) -> String;

    fn is_bool_flag(&self) -> bool {
        false
    }
}

/// Origin of a flag's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Default,
    Env,
    Args,
}

/// Object-safe view of a bound flag value, stored in a `FlagSet`.
pub trait Value {
    fn set(&mut self, raw: &str, source: ValueSource) -> Result<(), ValueError>;
    fn is_set(&self) -> bool;
    fn source(&self) -> ValueSource;
    fn is_bool_flag(&self) -> bool;
    fn default_text(&self) -> &str;
    fn current_text(&self) -> String;
}

/// A `FlagType` bound to exactly one destination.
pub struct GenericValue<T, F> {
    flag_type: F,
    dest: Destination<T>,
    default_text: String,
    source: ValueSource,
}

impl<T: 'static, F: FlagType<T>> GenericValue<T, F> {
    pub fn new(flag_type: F, dest: Destination<T>) -> Self {
        let default_text = flag_type.format(&dest.borrow_mut());
        Self {
            flag_type,
            dest,
            default_text,
            source: ValueSource::Default,
        }
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.dest.get()
    }
}

impl<T: 'static, F: FlagType<T>> Value for GenericValue<T, F> {
    fn set(&mut self, raw: &str, source: ValueSource) -> Result<(), ValueError> {
        let reset = self.source == ValueSource::Default;
        self.flag_type.set(&mut self.dest.borrow_mut(), raw, reset)?;
        self.source = source;
        Ok(())
    }

    fn is_set(&self) -> bool {
        self.source != ValueSource::Default
    }

    fn source(&self) -> ValueSource {
        self.source
    }

    fn is_bool_flag(&self) -> bool {
        self.flag_type.is_bool_flag()
    }

    fn default_text(&self) -> &str {
        &self.default_text
    }

    fn current_text(&self) -> String {
        self.flag_type.format(&self.dest.borrow_mut())
    }
}

/// Splits a raw string on a separator.
pub type Splitter = fn(&str, &str) -> Vec<String>;

/// Plain separator split, the default `Splitter`.
pub fn split(s: &str, sep: &str) -> Vec<String> {
    s.split(sep).map(str::to_string).collect()
}
