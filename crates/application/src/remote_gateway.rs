use std::sync::Arc;

use odoolink_core::{AppError, AppResult};
use odoolink_domain::{ApiVersion, CallContext, EntityType, RemoteOperation};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::entity_proxy::EntityProxy;
use crate::gateway_ports::{RemoteCall, RemoteTransport};

mod external_ids;
mod operations;

pub use operations::{ReadGroupOptions, SearchOptions};

/// One remote operation before context merging and name resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayRequest {
    entity_type: EntityType,
    operation: RemoteOperation,
    args: Vec<Value>,
    kwargs: Map<String, Value>,
    context: Option<CallContext>,
}

impl GatewayRequest {
    /// Starts a request with no arguments.
    #[must_use]
    pub fn new(entity_type: EntityType, operation: RemoteOperation) -> Self {
        Self {
            entity_type,
            operation,
            args: Vec::new(),
            kwargs: Map::new(),
            context: None,
        }
    }

    /// Sets the positional arguments.
    #[must_use]
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// Adds one keyword argument. `context` is reserved and overwritten.
    #[must_use]
    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    /// Sets the caller context laid over the gateway defaults.
    #[must_use]
    pub fn with_context(mut self, context: Option<&CallContext>) -> Self {
        self.context = context.cloned();
        self
    }
}

/// Issues remote operations against one authenticated backend session.
///
/// The gateway owns the default call context and the backend release hint.
/// Cloning is cheap; clones share the same session.
#[derive(Clone)]
pub struct RemoteGateway {
    transport: Arc<dyn RemoteTransport>,
    default_context: CallContext,
    api_version: ApiVersion,
}

impl RemoteGateway {
    /// Creates a gateway over an established session.
    #[must_use]
    pub fn new(
        transport: Arc<dyn RemoteTransport>,
        default_context: CallContext,
        api_version: ApiVersion,
    ) -> Self {
        Self {
            transport,
            default_context,
            api_version,
        }
    }

    /// Returns the context sent when callers do not override it.
    #[must_use]
    pub fn default_context(&self) -> &CallContext {
        &self.default_context
    }

    /// Returns the backend release hint.
    #[must_use]
    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    /// Returns a proxy bound to one entity type.
    #[must_use]
    pub fn entity(&self, entity_type: EntityType) -> EntityProxy {
        EntityProxy::new(entity_type, self.clone())
    }

    /// Merges the context and resolves the operation name.
    #[must_use]
    pub fn prepare(&self, request: GatewayRequest) -> RemoteCall {
        let context = match &request.context {
            Some(context) => self.default_context.overlay(context),
            None => self.default_context.clone(),
        };
        let mut kwargs = request.kwargs;
        kwargs.insert("context".to_owned(), context.to_value());

        RemoteCall {
            entity_type: request.entity_type,
            operation: self.api_version.resolve(request.operation),
            args: request.args,
            kwargs,
        }
    }

    /// Executes one remote operation and returns its raw result.
    pub async fn call(&self, request: GatewayRequest) -> AppResult<Value> {
        let call = self.prepare(request);
        let entity_type = call.entity_type.clone();
        let operation = call.operation;

        debug!(
            entity_type = %entity_type,
            operation = %operation,
            args = %call.argument_summary(),
            "dispatching remote call"
        );

        self.transport.execute(call).await.inspect_err(|failure| {
            error!(
                entity_type = %entity_type,
                operation = %operation,
                error = %failure,
                "remote call failed"
            );
        })
    }

    /// Executes one remote operation, logging instead of raising on failure.
    ///
    /// `None` means "unknown outcome", not an empty successful result.
    pub async fn call_no_raise(&self, request: GatewayRequest) -> Option<Value> {
        let call = self.prepare(request);
        let entity_type = call.entity_type.clone();
        let operation = call.operation;

        debug!(
            entity_type = %entity_type,
            operation = %operation,
            args = %call.argument_summary(),
            "dispatching remote call without raising"
        );

        match self.transport.execute(call).await {
            Ok(value) => Some(value),
            Err(failure) => {
                warn!(
                    entity_type = %entity_type,
                    operation = %operation,
                    error = %failure,
                    "remote call failed, outcome unknown"
                );
                None
            }
        }
    }
}

fn decode<T: DeserializeOwned>(operation: RemoteOperation, value: Value) -> AppResult<T> {
    serde_json::from_value(value).map_err(|error| {
        AppError::Protocol(format!(
            "unexpected result shape for remote operation '{operation}': {error}"
        ))
    })
}
