use thiserror::Error;

/// Failures raised by the flag, command and help layers.
#[derive(Debug, Error)]
pub enum Error {
    /// A flag or environment value could not be coerced into the flag's type.
    #[error("invalid value {value:?} for flag -{flag}: {reason}")]
    Parse {
        flag: String,
        value: String,
        reason: String,
    },

    #[error("invalid value {value:?} for flag -{flag}: expected KEY{sep}VALUE")]
    InvalidKeyValue {
        flag: String,
        value: String,
        sep: String,
    },

    #[error("flag needs an argument: -{0}")]
    MissingValue(String),

    #[error("flag redefined: {0}")]
    DuplicateFlag(String),

    #[error("no help topic for '{0}'")]
    CommandNotFound(String),

    /// Help routing, working directory and path resolution failures.
    #[error("{0}")]
    Resolution(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a raw string was rejected, before the owning flag name is known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("{0}")]
    Invalid(String),

    #[error("expected KEY{sep}VALUE")]
    KeyValue { sep: String },
}

impl ValueError {
    pub(crate) fn into_error(self, flag: &str, value: &str) -> Error {
        match self {
            Self::Invalid(reason) => Error::Parse {
                flag: flag.to_string(),
                value: value.to_string(),
                reason,
            },
            Self::KeyValue { sep } => Error::InvalidKeyValue {
                flag: flag.to_string(),
                value: value.to_string(),
                sep,
            },
        }
    }
}

/// Carries a process exit status through an `anyhow` chain.
///
/// Actions return it when the wrapped tool exits non-zero so the status
/// reaches the app's exit strategy unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("exit status {0}")]
pub struct ExitCode(pub i32);

/// Exit status for a dispatch failure: the first `ExitCode` in the chain, else 1.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ExitCode>())
        .map_or(1, |code| code.0)
}
