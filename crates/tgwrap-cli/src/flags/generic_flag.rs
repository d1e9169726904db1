use std::marker::PhantomData;

use crate::error::ValueError;
use crate::value::{FlagType, FlagValue};

use super::TypedFlag;

/// Single-value flag; a later occurrence overwrites an earlier one.
pub type GenericFlag<T> = TypedFlag<T, ScalarType<T>>;

#[derive(Debug)]
pub struct ScalarType<T>(PhantomData<fn() -> T>);

impl<T> Default for ScalarType<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T> Clone for ScalarType<T> {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl<T: FlagValue> FlagType<T> for ScalarType<T> {
    fn set(&self, dest: &mut T, raw: &str, _reset: bool) -> Result<(), ValueError> {
        *dest = T::parse_value(raw)?;
        Ok(())
    }

    fn format(&self, dest: &T) -> String {
        dest.format_value()
    }
}

impl<T: FlagValue> TypedFlag<T, ScalarType<T>> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_type(name, ScalarType::default())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::args::Args;
    use crate::flags::Flags;
    use crate::value::Destination;

    #[test]
    fn last_occurrence_wins() {
        let dest = Destination::default();
        let flags = Flags::new().with(GenericFlag::<String>::new("source").destination(dest.clone()));
        flags
            .parse(&Args::new(["--source", "a", "-source=b"]), &[])
            .unwrap();
        assert_eq!(dest.get(), "b");
    }

    #[test]
    fn integers_and_durations() {
        let count = Destination::default();
        let timeout = Destination::default();
        let flags = Flags::new()
            .with(GenericFlag::<i64>::new("duration").destination(count.clone()))
            .with(GenericFlag::<Duration>::new("timeout").destination(timeout.clone()));
        let (_, rest) = flags
            .parse(&Args::new(["-duration", "900", "--timeout=2m", "apply"]), &[])
            .unwrap();
        assert_eq!(count.get(), 900);
        assert_eq!(timeout.get(), Duration::from_secs(120));
        assert_eq!(rest, Args::new(["apply"]));
    }

    #[test]
    fn huge_duration_is_a_parse_error() {
        let flags = Flags::new().with(GenericFlag::<Duration>::new("timeout"));
        let err = flags
            .parse(&Args::new(["--timeout", "99999999999999999999h"]), &[])
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, crate::Error::Parse { ref flag, .. } if flag == "timeout"));
    }

    #[test]
    fn untouched_destination_keeps_its_default() {
        let dest = Destination::default();
        dest.set(10i32);
        let flags = Flags::new().with(GenericFlag::<i32>::new("parallelism").destination(dest.clone()));
        let (set, _) = flags.parse(&Args::new(["plan"]), &[]).unwrap();
        assert_eq!(dest.get(), 10);
        assert!(!set.is_set("parallelism"));
    }

    #[test]
    fn bad_env_value_is_a_parse_error() {
        let dest = Destination::<i32>::default();
        let flags = Flags::new().with(
            GenericFlag::<i32>::new("parallelism")
                .env_var("PARALLELISM")
                .destination(dest),
        );
        let env = vec![("PARALLELISM".to_string(), "lots".to_string())];
        let err = flags.parse(&Args::default(), &env).map(|_| ()).unwrap_err();
        assert!(matches!(err, crate::Error::Parse { ref flag, ref value, .. } if flag == "parallelism" && value == "lots"));
    }
}
