use odoolink_domain::{ContactMessage, ContactMessageInput};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Contact form fields, shared by the HTML form and the JSON endpoint.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/contact-message-request.ts"
)]
pub struct ContactMessageRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl From<ContactMessageRequest> for ContactMessageInput {
    fn from(value: ContactMessageRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            message: value.message,
        }
    }
}

/// API representation of a stored contact message.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/contact-message-response.ts"
)]
pub struct ContactMessageResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub summary: String,
    pub created_at: String,
}

impl From<ContactMessage> for ContactMessageResponse {
    fn from(value: ContactMessage) -> Self {
        Self {
            id: value.id().to_string(),
            name: value.name().to_owned(),
            email: value.email().as_str().to_owned(),
            message: value.message().to_owned(),
            summary: value.summary(),
            created_at: value.created_at().to_rfc3339(),
        }
    }
}

/// Query parameters for listing stored messages.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ContactMessageListQuery {
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::{ContactMessageRequest, ContactMessageResponse, HealthResponse};

    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        ErrorResponse::export(&config)?;
        HealthResponse::export(&config)?;
        ContactMessageRequest::export(&config)?;
        ContactMessageResponse::export(&config)?;

        Ok(())
    }
}
