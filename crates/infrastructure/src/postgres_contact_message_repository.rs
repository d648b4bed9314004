//! PostgreSQL-backed contact message repository using the `contact_messages` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use odoolink_application::ContactMessageRepository;
use odoolink_core::{AppError, AppResult};
use odoolink_domain::{ContactMessage, ContactMessageId, EmailAddress};

/// PostgreSQL implementation of the contact message repository port.
#[derive(Clone)]
pub struct PostgresContactMessageRepository {
    pool: PgPool,
}

impl PostgresContactMessageRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactMessageRepository for PostgresContactMessageRepository {
    async fn save_message(&self, message: &ContactMessage) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO contact_messages (id, name, email, message, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id().as_uuid())
        .bind(message.name())
        .bind(message.email().as_str())
        .bind(message.message())
        .bind(message.created_at())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save contact message: {error}")))?;

        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> AppResult<Vec<ContactMessage>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, ContactMessageRow>(
            r#"
            SELECT id, name, email, message, created_at
            FROM contact_messages
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list contact messages: {error}"))
        })?;

        rows.into_iter().map(ContactMessageRow::into_message).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContactMessageRow {
    id: Uuid,
    name: String,
    email: String,
    message: String,
    created_at: DateTime<Utc>,
}

impl ContactMessageRow {
    fn into_message(self) -> AppResult<ContactMessage> {
        let email = EmailAddress::new(self.email).map_err(|error| {
            AppError::Internal(format!(
                "stored contact message '{}' has an invalid email: {error}",
                self.id
            ))
        })?;

        Ok(ContactMessage::from_storage(
            ContactMessageId::from_uuid(self.id),
            self.name,
            email,
            self.message,
            self.created_at,
        ))
    }
}
