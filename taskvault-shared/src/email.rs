/// Account email notifications
///
/// Welcome and cancellation emails are best-effort: the `*_detached`
/// variants spawn the send onto the runtime, log failures at warn, and
/// can never fail the operation that triggered them. With no API key
/// configured the mailer is a logged no-op.
///
/// Delivery goes through a SendGrid-style JSON endpoint via reqwest.

use serde_json::json;
use tracing::{debug, warn};

/// Error type for email delivery
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// The HTTP request itself failed
    #[error("Email request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status
    #[error("Email provider returned {0}")]
    Provider(reqwest::StatusCode),
}

/// Mailer configuration
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Provider API key; `None` disables delivery entirely
    pub api_key: Option<String>,

    /// Provider endpoint accepting the SendGrid v3 send payload
    pub endpoint: String,

    /// Sender address
    pub from: String,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.sendgrid.com/v3/mail/send".to_string(),
            from: "no-reply@taskvault.dev".to_string(),
        }
    }
}

/// Sends account lifecycle emails
///
/// Cheap to clone; the inner reqwest client is reference-counted.
#[derive(Debug, Clone)]
pub struct Mailer {
    client: reqwest::Client,
    config: MailerConfig,
}

impl Mailer {
    /// Creates a mailer from configuration
    pub fn new(config: MailerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Sends the welcome email for a fresh registration
    pub async fn send_welcome(&self, to: &str, name: &str) -> Result<(), EmailError> {
        self.send(
            to,
            "Thanks for joining in!",
            &format!(
                "Welcome to the app, {}. Let me know how you get along with the app.",
                name
            ),
        )
        .await
    }

    /// Sends the goodbye email after account deletion
    pub async fn send_cancellation(&self, to: &str, name: &str) -> Result<(), EmailError> {
        self.send(to, "Sorry to see you go!", &format!("Goodbye, {}.", name))
            .await
    }

    /// Spawns the welcome email off the request path
    pub fn send_welcome_detached(&self, to: String, name: String) {
        let mailer = self.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send_welcome(&to, &name).await {
                warn!(error = %e, to = %to, "Failed to deliver welcome email");
            }
        });
    }

    /// Spawns the cancellation email off the request path
    pub fn send_cancellation_detached(&self, to: String, name: String) {
        let mailer = self.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send_cancellation(&to, &name).await {
                warn!(error = %e, to = %to, "Failed to deliver cancellation email");
            }
        });
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        let Some(api_key) = &self.config.api_key else {
            debug!(to = %to, subject = %subject, "Email delivery disabled, skipping");
            return Ok(());
        };

        let payload = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.config.from },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }],
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EmailError::Provider(response.status()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mailer_config_default_is_disabled() {
        let config = MailerConfig::default();
        assert!(config.api_key.is_none());
        assert!(config.endpoint.contains("sendgrid"));
        assert!(!config.from.is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_mailer_is_a_noop() {
        let mailer = Mailer::new(MailerConfig::default());

        // No API key: both sends succeed without touching the network.
        assert!(mailer.send_welcome("a@x.com", "Ada").await.is_ok());
        assert!(mailer.send_cancellation("a@x.com", "Ada").await.is_ok());
    }
}
