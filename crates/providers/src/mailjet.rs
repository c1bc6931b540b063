use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use stockwatch_core::config::MailConfig;
use stockwatch_core::ports::{Notification, Notifier, NotifyOutcome};
use thiserror::Error;
use tracing::{error, info};

use crate::template::EmailTemplate;
use crate::ProviderError;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("mailjet credentials are not configured")]
    MissingCredentials,
    #[error("email body could not be rendered: {0}")]
    Render(#[from] tera::Error),
    #[error("mailjet request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("mailjet api returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Sends the availability email through the Mailjet v3.1 send API.
/// Each notification is a single attempt.
#[derive(Clone)]
pub struct MailjetNotifier {
    client: Client,
    api_url: String,
    api_key: Option<SecretString>,
    secret_key: Option<SecretString>,
    sender_email: String,
    sender_name: String,
    recipients: Vec<String>,
    template: EmailTemplate,
}

impl MailjetNotifier {
    pub fn from_config(config: &MailConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            secret_key: config.secret_key.clone(),
            sender_email: config.sender_email.clone(),
            sender_name: config.sender_name.clone(),
            recipients: config.recipients.clone(),
            template: EmailTemplate::new()?,
        })
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        let api_key = self.api_key.as_ref()?.expose_secret();
        let secret_key = self.secret_key.as_ref()?.expose_secret();
        if api_key.trim().is_empty() || secret_key.trim().is_empty() {
            return None;
        }
        Some((api_key, secret_key))
    }

    pub fn payload(&self, notification: &Notification) -> Result<Value, NotifyError> {
        let html = self.template.render(notification)?;
        let to: Vec<Value> = self.recipients.iter().map(|email| json!({ "Email": email })).collect();

        Ok(json!({
            "Messages": [{
                "From": { "Email": self.sender_email, "Name": self.sender_name },
                "To": to,
                "Subject": EmailTemplate::subject(&notification.product_name),
                "HTMLPart": html
            }]
        }))
    }

    pub async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let (api_key, secret_key) = self.credentials().ok_or(NotifyError::MissingCredentials)?;
        let payload = self.payload(notification)?;

        let response = self
            .client
            .post(&self.api_url)
            .basic_auth(api_key, Some(secret_key))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status { status, body });
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for MailjetNotifier {
    fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }

    async fn notify(&self, notification: &Notification) -> NotifyOutcome {
        match self.send(notification).await {
            Ok(()) => {
                info!(
                    event_name = "notifier.mailjet.sent",
                    product = %notification.product_name,
                    recipients = self.recipients.len(),
                    "email notification sent successfully via mailjet"
                );
                NotifyOutcome::Sent
            }
            Err(error) => {
                error!(
                    event_name = "notifier.mailjet.failed",
                    product = %notification.product_name,
                    error = %error,
                    "error sending email via mailjet"
                );
                NotifyOutcome::Failed
            }
        }
    }
}
