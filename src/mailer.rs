//! Outbound mail for contact-form notifications.
//!
//! Uses SMTP via lettre. When no SMTP host is configured the `NoopMailer` is
//! installed instead and notifications are only logged.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use thiserror::Error;

use crate::{config::SmtpConfig, models::Contact};

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Mailer
///
/// Notification sink for newly persisted contact messages.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn notify_contact(&self, contact: &Contact) -> Result<(), MailError>;
}

pub type MailerState = Arc<dyn Mailer>;

/// SMTP-backed mailer.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    contact_inbox: String,
}

impl SmtpMailer {
    /// Create a mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay cannot be set up for `config.host`.
    pub fn new(config: &SmtpConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from.clone(),
            contact_inbox: config.contact_inbox.clone(),
        })
    }
}

/// Plain-text notification body for a contact message.
pub fn contact_notification_body(contact: &Contact) -> String {
    format!(
        "New contact message\n\nFrom: {} <{}>\nSubject: {}\nReceived: {}\n\n{}\n",
        contact.name,
        contact.email,
        contact.subject,
        contact.created_at.to_rfc3339(),
        contact.message
    )
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn notify_contact(&self, contact: &Contact) -> Result<(), MailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| MailError::InvalidAddress(self.from_address.clone()))?,
            )
            .reply_to(
                contact
                    .email
                    .parse()
                    .map_err(|_| MailError::InvalidAddress(contact.email.clone()))?,
            )
            .to(self
                .contact_inbox
                .parse()
                .map_err(|_| MailError::InvalidAddress(self.contact_inbox.clone()))?)
            .subject(format!("Contact form: {}", contact.subject))
            .header(ContentType::TEXT_PLAIN)
            .body(contact_notification_body(contact))?;

        self.transport.send(email).await?;

        tracing::info!(contact_id = %contact.id, "contact notification sent");
        Ok(())
    }
}

/// Mailer used when SMTP is not configured.
#[derive(Clone, Default)]
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn notify_contact(&self, contact: &Contact) -> Result<(), MailError> {
        tracing::debug!(contact_id = %contact.id, "mail disabled, notification skipped");
        Ok(())
    }
}
