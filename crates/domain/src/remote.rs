use std::fmt::{Display, Formatter};
use std::str::FromStr;

use odoolink_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Remote methods the gateway is allowed to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteOperation {
    /// Returns matching ids.
    Search,
    /// Returns matching records with the requested fields.
    SearchRead,
    /// Returns the number of matching records.
    SearchCount,
    /// Reads fields of known ids.
    Read,
    /// Aggregates records grouped by fields.
    ReadGroup,
    /// Updates known ids.
    Write,
    /// Creates one or many records.
    Create,
    /// Deletes known ids.
    Unlink,
    /// Bulk import of positional rows.
    Load,
    /// Field introspection.
    FieldsGet,
    /// Default values for fields.
    DefaultGet,
    /// Resolves an external id, legacy name.
    GetObjectReference,
    /// Resolves an external id with access checks.
    CheckObjectReference,
}

impl RemoteOperation {
    /// Returns the backend method name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::SearchRead => "search_read",
            Self::SearchCount => "search_count",
            Self::Read => "read",
            Self::ReadGroup => "read_group",
            Self::Write => "write",
            Self::Create => "create",
            Self::Unlink => "unlink",
            Self::Load => "load",
            Self::FieldsGet => "fields_get",
            Self::DefaultGet => "default_get",
            Self::GetObjectReference => "get_object_reference",
            Self::CheckObjectReference => "check_object_reference",
        }
    }

    /// Returns every supported operation.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[RemoteOperation] = &[
            RemoteOperation::Search,
            RemoteOperation::SearchRead,
            RemoteOperation::SearchCount,
            RemoteOperation::Read,
            RemoteOperation::ReadGroup,
            RemoteOperation::Write,
            RemoteOperation::Create,
            RemoteOperation::Unlink,
            RemoteOperation::Load,
            RemoteOperation::FieldsGet,
            RemoteOperation::DefaultGet,
            RemoteOperation::GetObjectReference,
            RemoteOperation::CheckObjectReference,
        ];

        ALL
    }
}

impl Display for RemoteOperation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for RemoteOperation {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|operation| operation.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unsupported remote operation '{value}'")))
    }
}

/// Backend release hint used to pick method names that changed over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    major: u16,
    minor: u16,
}

/// Operations renamed from a given major version onward.
const RENAMED_OPERATIONS: &[(u16, RemoteOperation, RemoteOperation)] = &[(
    15,
    RemoteOperation::GetObjectReference,
    RemoteOperation::CheckObjectReference,
)];

impl ApiVersion {
    /// Creates a version hint.
    #[must_use]
    pub fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Parses `15`, `15.0` or `16.4`.
    pub fn parse(value: &str) -> AppResult<Self> {
        let value = value.trim();
        let (major, minor) = value.split_once('.').unwrap_or((value, "0"));
        let parse_part = |part: &str| {
            part.parse::<u16>().map_err(|error| {
                AppError::Validation(format!("invalid API version '{value}': {error}"))
            })
        };

        Ok(Self::new(parse_part(major)?, parse_part(minor)?))
    }

    /// Maps an operation to the name served by this release.
    #[must_use]
    pub fn resolve(&self, operation: RemoteOperation) -> RemoteOperation {
        RENAMED_OPERATIONS
            .iter()
            .filter(|(since, _, _)| self.major >= *since)
            .find(|(_, legacy, _)| *legacy == operation)
            .map_or(operation, |(_, _, renamed)| *renamed)
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::new(15, 0)
    }
}

impl Display for ApiVersion {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ApiVersion {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}
