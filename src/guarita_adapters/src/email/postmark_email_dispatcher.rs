use async_trait::async_trait;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};

use guarita_core::{DispatchFailure, Email, EmailDispatcher};

#[derive(Clone)]
pub struct PostmarkEmailDispatcher {
    http_client: Client,
    base_url: String,
    sender: Email,
    authorization_token: Secret<String>,
}

impl PostmarkEmailDispatcher {
    pub fn new(
        base_url: String,
        sender: Email,
        authorization_token: Secret<String>,
        http_client: Client,
    ) -> Self {
        Self {
            http_client,
            base_url,
            sender,
            authorization_token,
        }
    }
}

#[async_trait]
impl EmailDispatcher for PostmarkEmailDispatcher {
    #[tracing::instrument(name = "Sending email via Postmark", skip_all)]
    async fn send(
        &self,
        recipient: &Email,
        subject: &str,
        html_body: &str,
    ) -> Result<(), DispatchFailure> {
        let base = Url::parse(&self.base_url).map_err(|e| DispatchFailure(e.to_string()))?;
        let url = base
            .join("/email")
            .map_err(|e| DispatchFailure(e.to_string()))?;

        let request_body = SendEmailRequest {
            from: self.sender.as_str(),
            to: recipient.as_str(),
            subject,
            html_body,
            text_body: html_body,
            message_stream: MESSAGE_STREAM,
        };

        self.http_client
            .post(url)
            .header(
                POSTMARK_AUTH_HEADER,
                self.authorization_token.expose_secret(),
            )
            .json(&request_body)
            .send()
            .await
            .map_err(|e| DispatchFailure(e.to_string()))?
            .error_for_status()
            .map_err(|e| DispatchFailure(e.to_string()))?;

        Ok(())
    }
}

const MESSAGE_STREAM: &str = "outbound";
const POSTMARK_AUTH_HEADER: &str = "X-Postmark-Server-Token";

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    message_stream: &'a str,
}
