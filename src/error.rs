//! Error types shared by the library and the CLI.
//!
//! Internally everything is an `anyhow::Error`. Errors that cross the public boundary (i.e. the
//! ones a command returns to the user) are tagged with an `ErrorType` so that callers can tell a
//! validation problem from a broken store without parsing messages.

use serde::{Deserialize, Serialize};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The broad category of a public error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The home directory or `config.json` is missing or invalid.
    Config,
    /// User input was rejected. Nothing was written.
    Validation,
    /// The durable store could not be read or written.
    Storage,
    /// The asset cache could not be installed, activated or read.
    Cache,
    /// A request could not be answered, not even with the offline fallback.
    Request,
}

serde_plain::derive_display_from_serialize!(ErrorType);

/// Attaches an `ErrorType` to the error of a `Result`.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| e.into().context(error_type))
    }
}

/// Returns the `ErrorType` attached with `pub_result`, if any.
pub fn error_type(e: &Error) -> Option<ErrorType> {
    e.downcast_ref::<ErrorType>().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_error_type_is_recoverable() {
        let result: Result<()> = Err(anyhow!("no such key")).pub_result(ErrorType::Storage);
        let e = result.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Storage));
        assert!(format!("{e:?}").contains("no such key"));
    }

    #[test]
    fn test_untagged_error_has_no_type() {
        let e = anyhow!("plain");
        assert_eq!(error_type(&e), None);
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::Validation.to_string(), "validation");
    }
}
