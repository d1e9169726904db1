use crate::error::ValueError;
use crate::value::{FlagType, FlagValue};

use super::TypedFlag;

/// Boolean flag; bare presence means `true`.
///
/// A negative flag stores the inverse of what it parsed, so
/// `--no-auto-init` can drive an `auto_init` destination.
pub type BoolFlag = TypedFlag<bool, BoolType>;

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolType {
    negative: bool,
}

impl FlagType<bool> for BoolType {
    fn set(&self, dest: &mut bool, raw: &str, _reset: bool) -> Result<(), ValueError> {
        *dest = bool::parse_value(raw)? != self.negative;
        Ok(())
    }

    fn format(&self, dest: &bool) -> String {
        dest.format_value()
    }

    fn is_bool_flag(&self) -> bool {
        true
    }
}

impl TypedFlag<bool, BoolType> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_type(name, BoolType::default())
    }

    pub fn negative(mut self) -> Self {
        self.flag_type.negative = true;
        self
    }

    pub fn is_negative(&self) -> bool {
        self.flag_type.negative
    }
}
