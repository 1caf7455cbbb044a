use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::MailConfig;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("email build error: {0}")]
    Build(String),
}

/// Outbound notification delivery.
///
/// The reminder sweep only depends on this trait, so tests can substitute
/// a recording fake for the real SMTP transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError>;
}

/// SMTP mailer over lettre's async transport.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let mut builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        }
        .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        let email = Message::builder()
            .from(self.from_address.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport.send(email).await?;
        tracing::info!(to, subject, "reminder email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MailConfig;

    fn config() -> MailConfig {
        MailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            use_tls: true,
            smtp_user: Some("user".to_string()),
            smtp_password: Some("pass".to_string()),
            from_address: "noreply@schedulite.local".to_string(),
        }
    }

    #[test]
    fn builds_transport_from_config() {
        assert!(SmtpMailer::from_config(&config()).is_ok());
    }

    #[test]
    fn builds_plaintext_transport_when_tls_disabled() {
        let mut cfg = config();
        cfg.use_tls = false;
        cfg.smtp_user = None;
        cfg.smtp_password = None;
        assert!(SmtpMailer::from_config(&cfg).is_ok());
    }

    #[test]
    fn mail_error_display() {
        let err = MailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "email build error: missing body");

        let addr: Result<lettre::Address, _> = "not-an-email".parse();
        let err = MailError::Address(addr.unwrap_err());
        assert!(err.to_string().contains("email address parse error"));
    }
}
