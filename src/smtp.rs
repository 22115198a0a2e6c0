//! SMTP mail sender via lettre.
//!
//! Sends the rewritten raw message with an explicit envelope: the
//! recipient key as envelope sender, the destination list as envelope
//! recipients. The relay must accept the key's domain as a verified
//! sender — that is the whole point of the From rewrite.

use async_trait::async_trait;
use lettre::address::{Address, Envelope};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::info;

use crate::error::{ConfigError, SendError};
use crate::pipeline::types::MailSender;

/// SMTP relay configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl SmtpConfig {
    /// Build config from environment variables.
    /// Returns `None` if `REMAIL_SMTP_HOST` is not set.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("REMAIL_SMTP_HOST").ok()?;
        let port: u16 = std::env::var("REMAIL_SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);
        let username = std::env::var("REMAIL_SMTP_USERNAME").unwrap_or_default();
        let password = std::env::var("REMAIL_SMTP_PASSWORD").unwrap_or_default();
        Some(Self {
            host,
            port,
            username,
            password,
        })
    }
}

/// `MailSender` over an async lettre SMTP transport.
pub struct SmtpMailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailSender {
    pub fn new(config: &SmtpConfig) -> Result<Self, ConfigError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| ConfigError::InvalidValue {
                key: "REMAIL_SMTP_HOST".into(),
                message: e.to_string(),
            })?
            .port(config.port);
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }
        Ok(Self {
            transport: builder.build(),
        })
    }
}

fn parse_address(address: &str) -> Result<Address, SendError> {
    address.parse().map_err(|e: lettre::address::AddressError| {
        SendError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        }
    })
}

#[async_trait]
impl MailSender for SmtpMailSender {
    async fn send(
        &self,
        envelope_from: &str,
        envelope_to: &[String],
        raw_message: &str,
    ) -> Result<(), SendError> {
        let from = parse_address(envelope_from)?;
        let to = envelope_to
            .iter()
            .map(|a| parse_address(a))
            .collect::<Result<Vec<_>, _>>()?;

        let envelope =
            Envelope::new(Some(from), to).map_err(|e| SendError::InvalidAddress {
                address: envelope_from.to_string(),
                reason: e.to_string(),
            })?;

        self.transport
            .send_raw(&envelope, raw_message.as_bytes())
            .await
            .map_err(|e| SendError::Transport {
                key: envelope_from.to_string(),
                reason: e.to_string(),
            })?;

        info!(
            envelope_from,
            recipients = envelope_to.len(),
            "Forwarded copy sent via SMTP"
        );
        Ok(())
    }
}
