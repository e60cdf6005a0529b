use reqwest::StatusCode;
use secrecy::Secret;
use serde_json::{Value, json};
use uuid::Uuid;

use guarita_adapters::email::MockEmailDispatcher;
use guarita_adapters::hashing::Argon2Hasher;
use guarita_adapters::persistence::{InMemoryAccountStore, InMemoryEventStore};
use guarita_adapters::tokens::JwtTokenCodec;
use guarita_auth_service::AuthService;
use guarita_core::{
    Account, AccountStatus, CredentialHasher, Email, Password, ResetToken,
};

struct TestApp {
    address: String,
    client: reqwest::Client,
    accounts: InMemoryAccountStore,
    mailer: MockEmailDispatcher,
}

impl TestApp {
    async fn spawn() -> Self {
        let accounts = InMemoryAccountStore::new();
        let events = InMemoryEventStore::new();
        let mailer = MockEmailDispatcher::new();
        let codec = JwtTokenCodec::new(&Secret::from("e2e-test-secret".to_string()));

        let service = AuthService::new(
            accounts.clone(),
            events,
            Argon2Hasher::new(),
            codec,
            mailer.clone(),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(service.run_standalone(listener, None));

        Self {
            address,
            client: reqwest::Client::new(),
            accounts,
            mailer,
        }
    }

    async fn seed_account(&self, username: &str, email: &str, password: &str) -> Account {
        let hash = Argon2Hasher::new()
            .hash(&Password::try_from(Secret::from(password.to_string())).unwrap())
            .await
            .unwrap();
        let account = Account {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: Email::parse(email).unwrap(),
            credential_hash: hash,
            failed_attempt_count: 0,
            status: AccountStatus::Active,
            last_login_at: None,
            company_id: Uuid::new_v4(),
            role: "operator".to_string(),
        };
        self.accounts.insert(account.clone()).await;
        account
    }

    async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn post_with_bearer(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn login(&self, identifier: &str, password: &str) -> reqwest::Response {
        self.post(
            "/auth/login",
            json!({ "identifier": identifier, "password": password }),
        )
        .await
    }

    /// Pull the value the latest email wrapped in `<strong>` tags: the
    /// one-time code or the reset token.
    async fn latest_emailed_secret(&self) -> String {
        let sent = self.mailer.sent().await;
        let body = &sent.last().unwrap().html_body;
        let start = body.find("<strong>").unwrap() + "<strong>".len();
        let end = body.find("</strong>").unwrap();
        body[start..end].to_string()
    }
}

#[tokio::test]
async fn login_issues_tokens_that_verify_token_accepts() {
    let app = TestApp::spawn().await;
    let account = app
        .seed_account("alice", "alice@example.com", "Secret1!")
        .await;

    let response = app.login("alice", "Secret1!").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let access_token = body["accessToken"].as_str().unwrap().to_string();
    assert!(body["refreshToken"].as_str().is_some());
    assert_eq!(body["account"]["username"], "alice");

    let verified = app
        .post_with_bearer("/auth/verify-token", &access_token, json!({}))
        .await;
    assert_eq!(verified.status(), StatusCode::OK);

    let claims: Value = verified.json().await.unwrap();
    assert_eq!(claims["accountId"], json!(account.id));
    assert_eq!(claims["companyId"], json!(account.company_id));
    assert_eq!(claims["role"], "operator");
}

#[tokio::test]
async fn unknown_user_and_wrong_password_are_indistinguishable() {
    let app = TestApp::spawn().await;
    app.seed_account("alice", "alice@example.com", "Secret1!")
        .await;

    let unknown = app.login("ghost", "Secret1!").await;
    let wrong = app.login("alice", "wrong-pw1").await;

    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let unknown_body: Value = unknown.json().await.unwrap();
    let wrong_body: Value = wrong.json().await.unwrap();
    assert_eq!(unknown_body["error"], wrong_body["error"]);
}

#[tokio::test]
async fn five_failures_lock_the_account_even_for_the_correct_password() {
    let app = TestApp::spawn().await;
    app.seed_account("alice", "alice@example.com", "Secret1!")
        .await;

    for _ in 0..5 {
        let attempt = app.login("alice", "wrong-pw1").await;
        assert_eq!(attempt.status(), StatusCode::UNAUTHORIZED);
    }

    let locked = app.login("alice", "Secret1!").await;
    assert_eq!(locked.status(), StatusCode::LOCKED);
}

#[tokio::test]
async fn two_factor_login_requires_the_emailed_code_exactly_once() {
    let app = TestApp::spawn().await;
    app.seed_account("alice", "alice@example.com", "Secret1!")
        .await;

    // Enable the second factor over the API, authenticated by a first login.
    let first = app.login("alice", "Secret1!").await;
    let tokens: Value = first.json().await.unwrap();
    let access_token = tokens["accessToken"].as_str().unwrap().to_string();

    let toggled = app
        .post_with_bearer("/auth/toggle-2fa", &access_token, json!({ "enable": true }))
        .await;
    assert_eq!(toggled.status(), StatusCode::OK);

    // The next login is challenged instead of answered with tokens.
    let challenged = app.login("alice", "Secret1!").await;
    assert_eq!(challenged.status(), StatusCode::PARTIAL_CONTENT);
    let challenge: Value = challenged.json().await.unwrap();
    assert_eq!(challenge["challengeRequired"], json!(true));
    let account_id = challenge["accountRef"].as_str().unwrap().to_string();
    assert!(challenge.get("accessToken").is_none());

    let code = app.latest_emailed_secret().await;
    let completed = app
        .post(
            "/auth/verify-2fa",
            json!({ "accountId": account_id, "code": code }),
        )
        .await;
    assert_eq!(completed.status(), StatusCode::OK);
    let body: Value = completed.json().await.unwrap();
    assert!(body["accessToken"].as_str().is_some());

    // The code is spent.
    let replayed = app
        .post(
            "/auth/verify-2fa",
            json!({ "accountId": account_id, "code": code }),
        )
        .await;
    assert_eq!(replayed.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn password_reset_round_trip_swaps_the_working_password() {
    let app = TestApp::spawn().await;
    app.seed_account("alice", "alice@example.com", "Secret1!")
        .await;

    let requested = app
        .post(
            "/auth/request-password-reset",
            json!({ "email": "alice@example.com" }),
        )
        .await;
    assert_eq!(requested.status(), StatusCode::OK);

    let token = app.latest_emailed_secret().await;

    let checked = app
        .client
        .get(format!(
            "{}/auth/verify-reset-ticket?token={token}",
            app.address
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(checked.status(), StatusCode::OK);
    let status: Value = checked.json().await.unwrap();
    assert_eq!(status["valid"], json!(true));

    let redeemed = app
        .post(
            "/auth/redeem-password-reset",
            json!({ "token": token, "newPassword": "NewSecret2!" }),
        )
        .await;
    assert_eq!(redeemed.status(), StatusCode::OK);

    // Old password out, new password in.
    let old = app.login("alice", "Secret1!").await;
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);
    let new = app.login("alice", "NewSecret2!").await;
    assert_eq!(new.status(), StatusCode::OK);

    // The ticket is spent.
    let rechecked = app
        .client
        .get(format!(
            "{}/auth/verify-reset-ticket?token={token}",
            app.address
        ))
        .send()
        .await
        .unwrap();
    let status: Value = rechecked.json().await.unwrap();
    assert_eq!(status["valid"], json!(false));
}

#[tokio::test]
async fn redeeming_a_bad_reset_token_is_unauthorized() {
    let app = TestApp::spawn().await;
    app.seed_account("alice", "alice@example.com", "Secret1!")
        .await;

    // Malformed and never-issued tokens get the same refusal.
    let malformed = app
        .post(
            "/auth/redeem-password-reset",
            json!({ "token": "not-a-token", "newPassword": "NewSecret2!" }),
        )
        .await;
    assert_eq!(malformed.status(), StatusCode::UNAUTHORIZED);

    let unissued = app
        .post(
            "/auth/redeem-password-reset",
            json!({
                "token": ResetToken::generate().as_str(),
                "newPassword": "NewSecret2!",
            }),
        )
        .await;
    assert_eq!(unissued.status(), StatusCode::UNAUTHORIZED);

    // The seeded password still works.
    let login = app.login("alice", "Secret1!").await;
    assert_eq!(login.status(), StatusCode::OK);
}

#[tokio::test]
async fn reset_request_for_unknown_email_acknowledges_without_mail() {
    let app = TestApp::spawn().await;

    let requested = app
        .post(
            "/auth/request-password-reset",
            json!({ "email": "ghost@example.com" }),
        )
        .await;

    assert_eq!(requested.status(), StatusCode::OK);
    assert!(app.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn logout_needs_a_bearer_token() {
    let app = TestApp::spawn().await;
    app.seed_account("alice", "alice@example.com", "Secret1!")
        .await;

    let missing = app.post("/auth/logout", json!({})).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let tokens: Value = app.login("alice", "Secret1!").await.json().await.unwrap();
    let access_token = tokens["accessToken"].as_str().unwrap().to_string();

    let out = app
        .post_with_bearer("/auth/logout", &access_token, json!({}))
        .await;
    assert_eq!(out.status(), StatusCode::OK);
}
