use async_trait::async_trait;
use odoolink_core::AppResult;
use odoolink_domain::{EntityType, RemoteOperation};
use serde_json::{Map, Value};

/// Longest argument summary written to the debug log.
const ARGUMENT_SUMMARY_LIMIT: usize = 512;

/// Fully prepared remote call handed to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCall {
    /// Target collection.
    pub entity_type: EntityType,
    /// Method name already resolved for the backend release.
    pub operation: RemoteOperation,
    /// Positional arguments, shape depends on the operation.
    pub args: Vec<Value>,
    /// Keyword arguments; always carries `context`.
    pub kwargs: Map<String, Value>,
}

impl RemoteCall {
    /// Returns a bounded, single-line rendering of the positional arguments.
    #[must_use]
    pub fn argument_summary(&self) -> String {
        let rendered = Value::Array(self.args.clone()).to_string();
        if rendered.chars().count() <= ARGUMENT_SUMMARY_LIMIT {
            return rendered;
        }

        let mut truncated: String = rendered.chars().take(ARGUMENT_SUMMARY_LIMIT).collect();
        truncated.push_str("...");
        truncated
    }
}

/// Port for the authenticated session that executes remote calls.
///
/// Implementations perform exactly one round trip per call and never retry.
/// Failures are classified as `AppError::Protocol` (endpoint unreachable or
/// malformed answer), `AppError::Authentication` or `AppError::RemoteFault`
/// (business error raised by the backend, carrying its message text).
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Executes one call and returns the decoded result.
    async fn execute(&self, call: RemoteCall) -> AppResult<Value>;
}
