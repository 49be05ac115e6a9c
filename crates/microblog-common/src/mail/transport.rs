//! Delivery transports and the [`Mailer`] adapter over them

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use microblog_core::{DomainError, Mailer, RepoResult, User};
use parking_lot::Mutex;
use tracing::{info, instrument};

use super::message::{MailComposer, MailMessage};
use crate::config::{AppConfig, MailBackend, MailConfig};
use crate::error::AppError;

/// Something that can put a rendered message on the wire
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, message: &MailMessage) -> Result<(), AppError>;
}

/// [`Mailer`] implementation that renders with a [`MailComposer`] and hands
/// the result to a transport
pub struct AccountMailer<T> {
    composer: MailComposer,
    transport: T,
}

impl<T: MailTransport> AccountMailer<T> {
    pub fn new(composer: MailComposer, transport: T) -> Self {
        Self {
            composer,
            transport,
        }
    }
}

#[async_trait]
impl<T: MailTransport> Mailer for AccountMailer<T> {
    #[instrument(skip(self, user, token), fields(user_id = %user.id))]
    async fn send_activation_email(&self, user: &User, token: &str) -> RepoResult<()> {
        let message = self.composer.account_activation(user, token);
        self.transport
            .deliver(&message)
            .await
            .map_err(DomainError::from)
    }

    #[instrument(skip(self, user, token), fields(user_id = %user.id))]
    async fn send_password_reset_email(&self, user: &User, token: &str) -> RepoResult<()> {
        let message = self.composer.password_reset(user, token);
        self.transport
            .deliver(&message)
            .await
            .map_err(DomainError::from)
    }
}

// ============================================================================
// Log transport
// ============================================================================

/// Writes messages to the log instead of sending them
#[derive(Debug, Clone, Default)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn deliver(&self, message: &MailMessage) -> Result<(), AppError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            kind = ?message.kind,
            "\n{}",
            message.body
        );
        Ok(())
    }
}

// ============================================================================
// Memory transport
// ============================================================================

/// Keeps every delivered message. Clones share the same outbox.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    outbox: Arc<Mutex<Vec<MailMessage>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, oldest first
    pub fn deliveries(&self) -> Vec<MailMessage> {
        self.outbox.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.outbox.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.outbox.lock().is_empty()
    }

    pub fn last(&self) -> Option<MailMessage> {
        self.outbox.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.outbox.lock().clear();
    }
}

#[async_trait]
impl MailTransport for MemoryTransport {
    async fn deliver(&self, message: &MailMessage) -> Result<(), AppError> {
        self.outbox.lock().push(message.clone());
        Ok(())
    }
}

// ============================================================================
// SMTP transport
// ============================================================================

/// Delivers through an SMTP relay
pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpTransport {
    /// Build the relay client. No connection is opened until the first send.
    ///
    /// # Errors
    /// Returns a config error for an unparsable sender or relay host
    pub fn new(config: &MailConfig) -> Result<Self, AppError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| AppError::Config(format!("MAIL_FROM: {e}")))?;

        let smtp = &config.smtp;
        let mut builder = if smtp.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
                .map_err(|e| AppError::Config(format!("SMTP_HOST: {e}")))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
        };
        builder = builder.port(smtp.port);

        if let (Some(username), Some(password)) = (&smtp.username, &smtp.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    async fn deliver(&self, message: &MailMessage) -> Result<(), AppError> {
        let address: Address = message
            .to
            .parse()
            .map_err(|e| AppError::Mail(format!("invalid recipient: {e}")))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(Some(message.to_name.clone()), address))
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| AppError::Mail(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| AppError::Mail(e.to_string()))?;

        info!("Mail delivered");
        Ok(())
    }
}

/// Build the mailer selected by `MAIL_BACKEND`
///
/// # Errors
/// Returns a config error if the SMTP transport cannot be built
pub fn mailer_from_config(config: &AppConfig) -> Result<Arc<dyn Mailer>, AppError> {
    let composer = MailComposer::new(config.app.name.clone(), &config.app.base_url);

    Ok(match config.mail.backend {
        MailBackend::Log => Arc::new(AccountMailer::new(composer, LogTransport)),
        MailBackend::Smtp => Arc::new(AccountMailer::new(
            composer,
            SmtpTransport::new(&config.mail)?,
        )),
    })
}
