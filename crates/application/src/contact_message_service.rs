//! Contact message ports and application service.
//!
//! Backs the landing-page contact form. Independent of the remote gateway.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use odoolink_core::AppResult;
use odoolink_domain::{ContactMessage, ContactMessageInput};

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Repository port for contact message persistence.
#[async_trait]
pub trait ContactMessageRepository: Send + Sync {
    /// Persists one validated message.
    async fn save_message(&self, message: &ContactMessage) -> AppResult<()>;

    /// Lists stored messages, newest first.
    async fn list_recent(&self, limit: usize) -> AppResult<Vec<ContactMessage>>;
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service for contact form submissions.
#[derive(Clone)]
pub struct ContactMessageService {
    repository: Arc<dyn ContactMessageRepository>,
}

impl ContactMessageService {
    /// Creates a new contact message service.
    #[must_use]
    pub fn new(repository: Arc<dyn ContactMessageRepository>) -> Self {
        Self { repository }
    }

    /// Validates and stores one submission.
    ///
    /// Nothing is persisted when validation fails.
    pub async fn submit(&self, input: ContactMessageInput) -> AppResult<ContactMessage> {
        let message = ContactMessage::new(input, Utc::now())?;
        self.repository.save_message(&message).await?;

        info!(
            contact_message_id = %message.id(),
            email = %message.email(),
            "contact message stored"
        );

        Ok(message)
    }

    /// Returns up to `limit` stored messages, newest first.
    pub async fn recent_messages(&self, limit: usize) -> AppResult<Vec<ContactMessage>> {
        self.repository.list_recent(limit).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use odoolink_core::{AppError, AppResult};
    use odoolink_domain::{ContactMessage, ContactMessageInput};
    use tokio::sync::Mutex;

    use super::{ContactMessageRepository, ContactMessageService};

    #[derive(Default)]
    struct FakeContactMessageRepository {
        messages: Mutex<Vec<ContactMessage>>,
        fail_saves: bool,
    }

    #[async_trait]
    impl ContactMessageRepository for FakeContactMessageRepository {
        async fn save_message(&self, message: &ContactMessage) -> AppResult<()> {
            if self.fail_saves {
                return Err(AppError::Internal("database unavailable".to_owned()));
            }
            self.messages.lock().await.push(message.clone());
            Ok(())
        }

        async fn list_recent(&self, limit: usize) -> AppResult<Vec<ContactMessage>> {
            let messages = self.messages.lock().await;
            Ok(messages.iter().rev().take(limit).cloned().collect())
        }
    }

    fn input(name: &str, email: &str, message: &str) -> ContactMessageInput {
        ContactMessageInput {
            name: name.to_owned(),
            email: email.to_owned(),
            message: message.to_owned(),
        }
    }

    #[tokio::test]
    async fn submit_persists_valid_message() {
        let repository = Arc::new(FakeContactMessageRepository::default());
        let service = ContactMessageService::new(repository.clone());

        let stored = service
            .submit(input("Ada", " Ada@Example.com ", "Hello there"))
            .await;

        let Ok(stored) = stored else {
            panic!("valid message should be stored");
        };
        assert_eq!(stored.email().as_str(), "ada@example.com");
        assert_eq!(repository.messages.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn submit_rejects_invalid_input_without_persisting() {
        let repository = Arc::new(FakeContactMessageRepository::default());
        let service = ContactMessageService::new(repository.clone());

        let result = service.submit(input("Ada", "not-an-email", "Hello")).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(repository.messages.lock().await.is_empty());
    }

    #[tokio::test]
    async fn submit_surfaces_storage_failure() {
        let repository = Arc::new(FakeContactMessageRepository {
            fail_saves: true,
            ..FakeContactMessageRepository::default()
        });
        let service = ContactMessageService::new(repository);

        let result = service.submit(input("Ada", "ada@example.com", "Hi")).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn recent_messages_are_newest_first() {
        let repository = Arc::new(FakeContactMessageRepository::default());
        let service = ContactMessageService::new(repository);
        for name in ["First", "Second", "Third"] {
            let result = service.submit(input(name, "ada@example.com", "Hi")).await;
            assert!(result.is_ok());
        }

        let recent = service.recent_messages(2).await;

        let Ok(recent) = recent else {
            panic!("listing should succeed");
        };
        let names: Vec<&str> = recent.iter().map(|message| message.name()).collect();
        assert_eq!(names, vec!["Third", "Second"]);
    }
}
