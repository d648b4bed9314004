use async_trait::async_trait;
use odoolink_application::ContactMessageRepository;
use odoolink_core::{AppError, AppResult};
use odoolink_domain::ContactMessage;
use tokio::sync::RwLock;

/// In-memory contact message repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryContactMessageRepository {
    messages: RwLock<Vec<ContactMessage>>,
}

impl InMemoryContactMessageRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactMessageRepository for InMemoryContactMessageRepository {
    async fn save_message(&self, message: &ContactMessage) -> AppResult<()> {
        let mut messages = self.messages.write().await;

        if messages.iter().any(|stored| stored.id() == message.id()) {
            return Err(AppError::Internal(format!(
                "contact message '{}' already exists",
                message.id()
            )));
        }

        messages.push(message.clone());
        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> AppResult<Vec<ContactMessage>> {
        let messages = self.messages.read().await;

        let mut values: Vec<ContactMessage> = messages.clone();
        values.sort_by(|left, right| right.created_at().cmp(&left.created_at()));
        values.truncate(limit);

        Ok(values)
    }
}
