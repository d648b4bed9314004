//! Domain values for the Odoo client and the contact form.

#![forbid(unsafe_code)]

mod contact;
mod context;
mod entity;
mod load;
mod remote;
mod search_domain;

pub use contact::{
    CONTACT_EMAIL_MAX_LENGTH, CONTACT_NAME_MAX_LENGTH, ContactMessage, ContactMessageId,
    ContactMessageInput, EmailAddress,
};
pub use context::CallContext;
pub use entity::{DEFAULT_EXTERNAL_ID_MODULE, EntityType, ExternalId};
pub use load::{
    DEFAULT_BATCH_SIZE, LoadBatch, LoadKeySet, LoadMessage, LoadMessageRows, LoadMessageType,
    LoadPlan, LoadResult, Record,
};
pub use remote::{ApiVersion, RemoteOperation};
pub use search_domain::{DomainTerm, LogicalOperator, SearchDomain};
