use guarita_adapters::{
    config::Settings,
    email::PostmarkEmailDispatcher,
    hashing::Argon2Hasher,
    persistence::{PostgresAccountStore, PostgresEventStore},
    tokens::JwtTokenCodec,
};
use guarita_auth_service::{AuthService, configure_postgresql, init_tracing};
use guarita_core::Email;
use reqwest::Client as HttpClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let settings = Settings::load()?;

    let pg_pool = configure_postgresql(&settings).await?;

    let accounts = PostgresAccountStore::new(pg_pool.clone());
    let events = PostgresEventStore::new(pg_pool);
    let hasher = Argon2Hasher::new();
    let codec = JwtTokenCodec::new(&settings.auth.jwt_secret);

    let http_client = HttpClient::builder().timeout(settings.email.timeout()).build()?;
    let mailer = PostmarkEmailDispatcher::new(
        settings.email.base_url.clone(),
        Email::parse(&settings.email.sender)?,
        settings.email.auth_token.clone(),
        http_client,
    );

    let service = AuthService::new(accounts, events, hasher, codec, mailer);

    let listener = tokio::net::TcpListener::bind(&settings.application.address).await?;

    service
        .run_standalone(listener, settings.allowed_origins())
        .await?;

    Ok(())
}
