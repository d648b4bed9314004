use std::fmt::{Display, Formatter};
use std::str::FromStr;

use odoolink_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Module used to qualify external ids given without one.
pub const DEFAULT_EXTERNAL_ID_MODULE: &str = "external_config";

/// Name of a remote business-object collection, for example `res.partner`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityType(NonEmptyString);

impl EntityType {
    /// Creates a validated entity type name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(format!(
                "entity type '{value}' must not contain whitespace"
            )));
        }

        NonEmptyString::new(value).map(Self)
    }

    /// Returns the entity type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for EntityType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

/// Stable `module.name` reference to a backend record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExternalId {
    module: String,
    name: String,
}

impl ExternalId {
    /// Creates an external id from its two parts.
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> AppResult<Self> {
        let module = module.into();
        let name = name.into();
        if module.trim().is_empty() || name.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "external id '{module}.{name}' requires a module and a name"
            )));
        }

        Ok(Self { module, name })
    }

    /// Parses `module.name`, qualifying a bare name with
    /// [`DEFAULT_EXTERNAL_ID_MODULE`].
    ///
    /// Only the first dot separates the module; the remainder is the name.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value.split_once('.') {
            Some((module, name)) => Self::new(module, name),
            None => Self::new(DEFAULT_EXTERNAL_ID_MODULE, value),
        }
    }

    /// Returns the module part.
    #[must_use]
    pub fn module(&self) -> &str {
        self.module.as_str()
    }

    /// Returns the name part.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

impl Display for ExternalId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}.{}", self.module, self.name)
    }
}

impl FromStr for ExternalId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}
