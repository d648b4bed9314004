//! Application services and ports.

#![forbid(unsafe_code)]

mod bulk_load_service;
mod contact_message_service;
mod entity_proxy;
mod gateway_ports;
mod remote_gateway;

#[cfg(test)]
mod test_support;

pub use bulk_load_service::{BatchTiming, BulkLoadOptions, BulkLoadOrchestrator, BulkLoadReport};
pub use contact_message_service::{ContactMessageRepository, ContactMessageService};
pub use entity_proxy::{EntityOperations, EntityProxy};
pub use gateway_ports::{RemoteCall, RemoteTransport};
pub use remote_gateway::{GatewayRequest, ReadGroupOptions, RemoteGateway, SearchOptions};
