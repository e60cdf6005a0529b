use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use reqwest::Client;
use secrecy::Secret;
use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use guarita_adapters::config::test::email_dispatcher::{SENDER, TIMEOUT};
use guarita_adapters::email::PostmarkEmailDispatcher;
use guarita_core::{Email, EmailDispatcher};

fn random_email() -> Email {
    let raw: String = SafeEmail().fake();
    Email::parse(&raw).unwrap()
}

fn dispatcher(base_url: String) -> PostmarkEmailDispatcher {
    PostmarkEmailDispatcher::new(
        base_url,
        Email::parse(SENDER).unwrap(),
        Secret::from("postmark-token".to_string()),
        Client::builder().timeout(TIMEOUT).build().unwrap(),
    )
}

#[tokio::test]
async fn sends_the_expected_postmark_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/email"))
        .and(header("X-Postmark-Server-Token", "postmark-token"))
        .and(header_exists("Content-Type"))
        .and(wiremock::matchers::body_partial_json(json!({
            "From": SENDER,
            "Subject": "Your verification code",
            "MessageStream": "outbound",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let result = dispatcher(server.uri())
        .send(
            &random_email(),
            "Your verification code",
            "<p>123456</p>",
        )
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn provider_errors_surface_as_dispatch_failures() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/email"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let result = dispatcher(server.uri())
        .send(&random_email(), "Reset your password", "<p>link</p>")
        .await;

    assert!(result.is_err());
}
