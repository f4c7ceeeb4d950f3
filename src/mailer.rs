use lettre::{
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
    message::{Mailbox, Message, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
};

/// Async SMTP mailer. Runs disabled when no credentials are configured:
/// codes are still issued and persisted, delivery is skipped with a warning.
#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    sender: Option<Mailbox>,
}

impl Mailer {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let (Some(sender), Some(password)) = (
            config.email_sender.as_ref(),
            config.email_password.as_ref(),
        ) else {
            tracing::warn!(
                "EMAIL_SENDER / EMAIL_PASSWORD not set; confirmation emails will not be delivered"
            );
            return Ok(Self::disabled());
        };

        let sender_mailbox = sender
            .parse::<Mailbox>()
            .map_err(|e| anyhow::anyhow!("invalid EMAIL_SENDER address: {e}"))?;
        let credentials = Credentials::new(sender.clone(), password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport: Some(transport),
            sender: Some(sender_mailbox),
        })
    }

    pub fn disabled() -> Self {
        Self {
            transport: None,
            sender: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Deliver a confirmation code. A delivery failure is surfaced to the
    /// caller; the issued code stays persisted either way.
    pub async fn send_confirmation_code(&self, to: &str, code: i32) -> AppResult<()> {
        let (Some(transport), Some(sender)) = (&self.transport, &self.sender) else {
            tracing::warn!(recipient = %to, "mailer disabled, skipping code delivery");
            return Ok(());
        };

        let recipient = to
            .parse::<Mailbox>()
            .map_err(|_| AppError::BadRequest("invalid email address".to_string()))?;

        let email = Message::builder()
            .from(sender.clone())
            .to(recipient)
            .subject("Confirmation Code")
            .header(ContentType::TEXT_PLAIN)
            .body(format!("Your confirmation code is {code}"))
            .map_err(|e| AppError::Email(e.to_string()))?;

        transport
            .send(email)
            .await
            .map_err(|e| AppError::Email(e.to_string()))?;

        tracing::info!(recipient = %to, "confirmation code email sent");
        Ok(())
    }
}
