//! Error type shared by every fallible index set operation.

use thiserror::Error;

/// The error type returned by fallible `index-set` operations.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn not_mutable() -> Error {
        Error(ErrorKind::NotMutable.into())
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("mutating operation invoked on an immutable index set")]
    NotMutable,
}

/// Checks an argument precondition, reporting `InvalidArgument` on failure.
#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

#[cold]
fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(Error::invalid_arg(name, condition))
}

/// Macro form of [`verify_arg`] that stringifies the checked condition.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::error::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}
