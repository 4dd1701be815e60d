//! Email delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport. If `SMTP_HOST`
//! is not set, [`EmailConfig::from_env`] returns `None` and email is
//! disabled.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::OutboundMessage;

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),
}

const DEFAULT_SMTP_PORT: u16 = 587;

const DEFAULT_FROM_ADDRESS: &str = "billing@clientdesk.local";

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable        | Required | Default                     |
    /// |-----------------|----------|-----------------------------|
    /// | `SMTP_HOST`     | yes      | (email disabled when unset) |
    /// | `SMTP_PORT`     | no       | `587`                       |
    /// | `SMTP_FROM`     | no       | `billing@clientdesk.local`  |
    /// | `SMTP_USER`     | no       |                             |
    /// | `SMTP_PASSWORD` | no       |                             |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

/// Sends plain-text client emails over SMTP.
///
/// The transport is built once and pools its connections across sends.
pub struct EmailDelivery {
    from_address: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailDelivery {
    /// Fails only if the relay host cannot be used to set up STARTTLS.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);
        if let (Some(user), Some(pass)) = (config.smtp_user, config.smtp_password) {
            builder = builder.credentials(Credentials::new(user, pass));
        }
        Ok(Self {
            from_address: config.from_address,
            transport: builder.build(),
        })
    }

    /// Build the MIME message without sending it.
    pub fn build_message(&self, message: &OutboundMessage) -> Result<Message, EmailError> {
        Message::builder()
            .from(self.from_address.parse()?)
            .to(message.to.parse()?)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| EmailError::Build(e.to_string()))
    }

    /// Make one send attempt.
    pub async fn send(&self, message: &OutboundMessage) -> Result<(), EmailError> {
        let email = self.build_message(message)?;
        self.transport.send(email).await?;

        tracing::info!(to = %message.to, reference = %message.reference, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delivery() -> EmailDelivery {
        EmailDelivery::new(EmailConfig {
            smtp_host: "localhost".into(),
            smtp_port: DEFAULT_SMTP_PORT,
            from_address: DEFAULT_FROM_ADDRESS.into(),
            smtp_user: None,
            smtp_password: None,
        })
        .expect("localhost is a valid relay")
    }

    fn message(to: &str) -> OutboundMessage {
        OutboundMessage {
            to: to.into(),
            subject: "Your invoice".into(),
            body: "Amount due: 99.50".into(),
            reference: "invoice:1".into(),
        }
    }

    #[test]
    fn builds_plain_text_message() {
        let email = delivery().build_message(&message("ana@silva.example")).unwrap();
        let raw = String::from_utf8(email.formatted()).unwrap();
        assert!(raw.contains("Subject: Your invoice"));
        assert!(raw.contains("Amount due: 99.50"));
    }

    #[test]
    fn invalid_recipient_is_an_address_error() {
        let err = delivery().build_message(&message("not-an-email")).unwrap_err();
        assert!(err.to_string().contains("Email address parse error"));
    }

    #[test]
    fn email_error_display_build() {
        let err = EmailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }
}
