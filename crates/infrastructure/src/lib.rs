//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_contact_message_repository;
mod json_rpc_session;
mod local_attachment;
mod postgres_contact_message_repository;

pub use in_memory_contact_message_repository::InMemoryContactMessageRepository;
pub use json_rpc_session::{
    DatabaseCreation, HttpCredentials, JsonRpcOdooSession, OdooConnectionSettings,
};
pub use local_attachment::{
    AttachmentEncoding, AttachmentUpload, LocalAttachment, upload_attachment,
};
pub use postgres_contact_message_repository::PostgresContactMessageRepository;
