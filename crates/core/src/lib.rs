//! Shared primitives for all Rust crates in odoolink.

#![forbid(unsafe_code)]

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across odoolink crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend rejected the supplied credentials.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The endpoint was unreachable or answered with something other than a
    /// well-formed RPC response.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The backend executed the call and returned a business-logic fault.
    #[error("remote fault: {0}")]
    RemoteFault(String),

    /// A bulk load batch reported an error message.
    ///
    /// Displays the backend text verbatim.
    #[error("{0}")]
    Load(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
