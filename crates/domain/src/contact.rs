//! Contact form message and its validation rules.

use chrono::{DateTime, Utc};
use odoolink_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of the sender name.
pub const CONTACT_NAME_MAX_LENGTH: usize = 100;

/// Maximum length of the sender email.
pub const CONTACT_EMAIL_MAX_LENGTH: usize = 100;

/// Unique identifier for a stored contact message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactMessageId(Uuid);

impl ContactMessageId {
    /// Creates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ContactMessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContactMessageId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a lower-cased address of the form `local@domain.tld`.
    ///
    /// The address fits in the `email` column and has no whitespace; the
    /// domain is made of non-empty dot-separated labels.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let address = value.into().trim().to_lowercase();

        if address.chars().count() > CONTACT_EMAIL_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "email is longer than {CONTACT_EMAIL_MAX_LENGTH} characters"
            )));
        }
        if !is_well_formed(address.as_str()) {
            return Err(AppError::Validation(format!(
                "'{address}' is not a valid email address"
            )));
        }

        Ok(Self(address))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn is_well_formed(address: &str) -> bool {
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !address.contains(char::is_whitespace)
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Raw form fields as submitted by a visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactMessageInput {
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Message body.
    pub message: String,
}

/// Persisted contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    id: ContactMessageId,
    name: String,
    email: EmailAddress,
    message: String,
    created_at: DateTime<Utc>,
}

impl ContactMessage {
    /// Validates form input into a new message stamped with `created_at`.
    pub fn new(input: ContactMessageInput, created_at: DateTime<Utc>) -> AppResult<Self> {
        let name = input.name.trim().to_owned();
        if name.is_empty() {
            return Err(AppError::Validation("name must not be empty".to_owned()));
        }
        if name.chars().count() > CONTACT_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "name must not exceed {CONTACT_NAME_MAX_LENGTH} characters"
            )));
        }

        let email = EmailAddress::new(input.email)?;

        if input.message.trim().is_empty() {
            return Err(AppError::Validation("message must not be empty".to_owned()));
        }

        Ok(Self {
            id: ContactMessageId::new(),
            name,
            email,
            message: input.message,
            created_at,
        })
    }

    /// Rebuilds a message loaded from storage without re-validating it.
    #[must_use]
    pub fn from_storage(
        id: ContactMessageId,
        name: String,
        email: EmailAddress,
        message: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            message,
            created_at,
        }
    }

    /// Returns the message identifier.
    #[must_use]
    pub fn id(&self) -> ContactMessageId {
        self.id
    }

    /// Returns the sender name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the sender email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the message body.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Returns the submission timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Short label used in logs and admin listings.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("Message from: {}", self.email.as_str())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn input(name: &str, email: &str, message: &str) -> ContactMessageInput {
        ContactMessageInput {
            name: name.to_owned(),
            email: email.to_owned(),
            message: message.to_owned(),
        }
    }

    #[test]
    fn valid_submission_is_normalized() {
        let message = ContactMessage::new(
            input("  Ana Torres ", "Ana@Example.COM", "Hola, quiero una demo."),
            Utc::now(),
        );

        let Ok(message) = message else {
            panic!("submission should validate");
        };
        assert_eq!(message.name(), "Ana Torres");
        assert_eq!(message.email().as_str(), "ana@example.com");
        assert_eq!(message.summary(), "Message from: ana@example.com");
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(ContactMessage::new(input("   ", "a@b.co", "hi"), Utc::now()).is_err());
    }

    #[test]
    fn oversized_name_is_rejected() {
        let name = "n".repeat(CONTACT_NAME_MAX_LENGTH + 1);
        assert!(ContactMessage::new(input(&name, "a@b.co", "hi"), Utc::now()).is_err());
    }

    #[test]
    fn blank_message_is_rejected() {
        assert!(ContactMessage::new(input("Ana", "a@b.co", " \n "), Utc::now()).is_err());
    }

    #[test]
    fn malformed_emails_are_rejected() {
        assert!(EmailAddress::new("").is_err());
        assert!(EmailAddress::new("noatsign").is_err());
        assert!(EmailAddress::new("user@nodot").is_err());
        assert!(EmailAddress::new("a@b@c.com").is_err());
        assert!(EmailAddress::new("@example.com").is_err());
        assert!(EmailAddress::new("ana@example.").is_err());
        assert!(EmailAddress::new("ana torres@example.com").is_err());
    }

    #[test]
    fn invalid_email_error_names_the_address() {
        assert!(matches!(
            EmailAddress::new(" Ana@Nodot "),
            Err(AppError::Validation(ref message)) if message == "'ana@nodot' is not a valid email address"
        ));
    }

    #[test]
    fn oversized_email_is_rejected() {
        let email = format!("{}@example.com", "x".repeat(CONTACT_EMAIL_MAX_LENGTH));
        assert!(EmailAddress::new(email).is_err());
    }
}
