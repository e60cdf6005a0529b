use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use guarita_core::{DispatchFailure, Email, EmailDispatcher};

/// Captures outgoing mail instead of sending it. End-to-end tests read the
/// one-time codes and reset tickets back out of `sent()`.
#[derive(Clone, Default)]
pub struct MockEmailDispatcher {
    sent: Arc<RwLock<Vec<SentEmail>>>,
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: Email,
    pub subject: String,
    pub html_body: String,
}

impl MockEmailDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<SentEmail> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl EmailDispatcher for MockEmailDispatcher {
    #[tracing::instrument(name = "Recording email in mock dispatcher", skip_all)]
    async fn send(
        &self,
        recipient: &Email,
        subject: &str,
        html_body: &str,
    ) -> Result<(), DispatchFailure> {
        self.sent.write().await.push(SentEmail {
            recipient: recipient.clone(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}
