use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use secrecy::Secret;
use serde::Deserialize;

use super::constants::{env, prod};

/// Service configuration, loaded from an optional `guarita.json` file with
/// environment overrides (`GUARITA__` prefix, `__` separator). The secrets
/// additionally honor the conventional bare variables `DATABASE_URL`,
/// `JWT_SECRET` and `POSTMARK_AUTH_TOKEN`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub email: EmailSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    pub address: String,
    pub allowed_origins: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: Secret<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: Secret<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailSettings {
    pub base_url: String,
    pub sender: String,
    pub auth_token: Secret<String>,
    pub timeout_in_millis: u64,
}

impl EmailSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_in_millis)
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Config::builder()
            .set_default("application.address", prod::APP_ADDRESS)?
            .set_default("database.max_connections", 5)?
            .set_default("email.base_url", prod::email_dispatcher::BASE_URL)?
            .set_default("email.sender", prod::email_dispatcher::SENDER)?
            .set_default(
                "email.timeout_in_millis",
                prod::email_dispatcher::TIMEOUT.as_millis() as u64,
            )?
            .add_source(File::new("guarita", FileFormat::Json).required(false))
            .add_source(Environment::with_prefix("GUARITA").separator("__"))
            .set_override_option(
                "database.url",
                std::env::var(env::DATABASE_URL_ENV_VAR).ok(),
            )?
            .set_override_option(
                "auth.jwt_secret",
                std::env::var(env::JWT_SECRET_ENV_VAR).ok(),
            )?
            .set_override_option(
                "email.auth_token",
                std::env::var(env::POSTMARK_AUTH_TOKEN_ENV_VAR).ok(),
            )?
            .set_override_option(
                "application.allowed_origins",
                std::env::var(env::ALLOWED_ORIGINS_ENV_VAR).ok(),
            )?
            .build()?
            .try_deserialize()
    }

    pub fn allowed_origins(&self) -> Option<AllowedOrigins> {
        self.application
            .allowed_origins
            .as_deref()
            .map(AllowedOrigins::parse)
    }
}

/// Comma-separated CORS origin allow-list.
#[derive(Debug, Clone)]
pub struct AllowedOrigins(Vec<String>);

impl AllowedOrigins {
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
        )
    }

    /// Match against the raw bytes of an `Origin` header value.
    pub fn contains_bytes(&self, origin: &[u8]) -> bool {
        self.0.iter().any(|allowed| allowed.as_bytes() == origin)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
