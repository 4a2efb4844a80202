// Notifier: transactional email to candidates through an HTTP mail API.
// Delivery is best-effort. Callers log failures and never fail a request on them.

pub mod email;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::config::MailSettings;
pub use email::ConfirmationEmail;

/// Concurrent deliveries allowed at once; further sends wait for a permit.
pub const MAX_CONCURRENT_DELIVERIES: usize = 5;
const MAIL_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Mail is not configured; nothing was sent.
    Skipped,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("mail request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail API returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("notifier is shutting down")]
    Closed,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_application_confirmation(
        &self,
        email: &ConfirmationEmail,
    ) -> Result<Delivery, NotifyError>;
}

#[derive(Debug, Serialize)]
struct MailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: String,
    text: String,
    html: String,
}

#[derive(Clone)]
pub struct HttpMailNotifier {
    client: Client,
    settings: Option<MailSettings>,
    permits: Arc<Semaphore>,
}

impl HttpMailNotifier {
    /// `None` settings make every send a `Delivery::Skipped`.
    pub fn new(settings: Option<MailSettings>) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(MAIL_TIMEOUT).build()?;
        Ok(Self {
            client,
            settings,
            permits: Arc::new(Semaphore::new(MAX_CONCURRENT_DELIVERIES)),
        })
    }
}

#[async_trait]
impl Notifier for HttpMailNotifier {
    async fn send_application_confirmation(
        &self,
        email: &ConfirmationEmail,
    ) -> Result<Delivery, NotifyError> {
        let Some(settings) = &self.settings else {
            warn!("Mail API not configured, skipping confirmation email");
            return Ok(Delivery::Skipped);
        };

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| NotifyError::Closed)?;

        let payload = MailRequest {
            from: &settings.from,
            to: [&email.to],
            subject: email.subject(),
            text: email.text_body(),
            html: email.html_body(),
        };

        let response = self
            .client
            .post(&settings.api_url)
            .bearer_auth(&settings.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("Confirmation email sent to {}", email.to);
        Ok(Delivery::Sent)
    }
}
