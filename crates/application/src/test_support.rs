use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use odoolink_core::{AppError, AppResult};
use odoolink_domain::{ApiVersion, CallContext, EntityType};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{RemoteCall, RemoteGateway, RemoteTransport};

/// Transport that records every call and answers from a script.
pub(crate) struct ScriptedTransport {
    calls: Mutex<Vec<RemoteCall>>,
    responses: Mutex<VecDeque<AppResult<Value>>>,
}

impl ScriptedTransport {
    pub(crate) fn new(responses: Vec<AppResult<Value>>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into()),
        })
    }

    pub(crate) async fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl RemoteTransport for ScriptedTransport {
    async fn execute(&self, call: RemoteCall) -> AppResult<Value> {
        self.calls.lock().await.push(call);
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Internal("no scripted response left".to_owned())))
    }
}

pub(crate) fn gateway_over(transport: Arc<ScriptedTransport>) -> RemoteGateway {
    RemoteGateway::new(
        transport,
        CallContext::with_defaults("fr_FR", true),
        ApiVersion::new(15, 0),
    )
}

pub(crate) fn entity(name: &str) -> EntityType {
    EntityType::new(name).unwrap_or_else(|error| panic!("invalid test entity type: {error}"))
}
