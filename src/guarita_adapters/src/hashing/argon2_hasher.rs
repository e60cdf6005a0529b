use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
    password_hash::{PasswordHasher, SaltString, rand_core},
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};

use guarita_core::{CredentialHashError, CredentialHasher, Password};

/// A syntactically valid Argon2id hash that matches no real password. The
/// not-found path verifies against it so an unknown identifier costs the
/// same as a wrong password.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=15000,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$zdEv1DXUtIF2xYQ44fFM1lIMVKJrBUZvRHT9VavJ5uc";

#[derive(Clone, Copy, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

fn argon2() -> Result<Argon2<'static>, String> {
    Ok(Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(15000, 2, 1, None).map_err(|e| e.to_string())?,
    ))
}

#[async_trait]
impl CredentialHasher for Argon2Hasher {
    #[tracing::instrument(name = "Computing password hash", skip_all)]
    async fn hash(&self, password: &Password) -> Result<Secret<String>, CredentialHashError> {
        let password = password.expose().to_string();
        let current_span = tracing::Span::current();

        tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| {
                let salt = SaltString::generate(rand_core::OsRng);
                argon2()?
                    .hash_password(password.as_bytes(), &salt)
                    .map(|h| Secret::from(h.to_string()))
                    .map_err(|e| e.to_string())
            })
        })
        .await
        .map_err(|e| CredentialHashError::HashingError(e.to_string()))?
        .map_err(CredentialHashError::HashingError)
    }

    #[tracing::instrument(name = "Verifying password hash", skip_all)]
    async fn verify(&self, candidate: &Password, expected_hash: &Secret<String>) -> bool {
        let candidate = candidate.expose().to_string();
        let expected_hash = expected_hash.expose_secret().to_string();
        let current_span = tracing::Span::current();

        tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| {
                let Ok(parsed) = PasswordHash::new(&expected_hash) else {
                    return false;
                };
                let Ok(hasher) = argon2() else {
                    return false;
                };
                hasher
                    .verify_password(candidate.as_bytes(), &parsed)
                    .is_ok()
            })
        })
        .await
        .unwrap_or(false)
    }

    #[tracing::instrument(name = "Verifying dummy password hash", skip_all)]
    async fn verify_dummy(&self, candidate: &Password) {
        // Result intentionally discarded; only the comparison time matters.
        let _ = self
            .verify(candidate, &Secret::from(DUMMY_HASH.to_string()))
            .await;
    }
}
