use odoolink_application::ContactMessageService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub contact_message_service: ContactMessageService,
}
