use async_trait::async_trait;
use secrecy::Secret;
use thiserror::Error;

use crate::domain::{
    claims::{AccessClaims, RefreshClaims},
    email::Email,
    password::Password,
};

/// Outbound email failed. Non-fatal by design: the code or ticket is
/// already durably recorded before dispatch, so a failure degrades to a
/// warning and never rolls the security transition back.
#[derive(Debug, Error)]
#[error("Email dispatch failed: {0}")]
pub struct DispatchFailure(pub String);

#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    async fn send(
        &self,
        recipient: &Email,
        subject: &str,
        html_body: &str,
    ) -> Result<(), DispatchFailure>;
}

#[derive(Debug, Error)]
pub enum CredentialHashError {
    #[error("Hashing error: {0}")]
    HashingError(String),
}

/// Password hashing with a fixed cost parameter.
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash(&self, password: &Password) -> Result<Secret<String>, CredentialHashError>;

    async fn verify(&self, candidate: &Password, expected_hash: &Secret<String>) -> bool;

    /// Compare against a fixed throwaway hash. Called on the
    /// account-not-found path so an unknown identifier costs the same as a
    /// wrong password and lookups cannot be enumerated by timing.
    async fn verify_dummy(&self, candidate: &Password);
}

#[derive(Debug, Eq, Error)]
pub enum TokenError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Expired token")]
    ExpiredToken,
    #[error("Token encoding error: {0}")]
    EncodingError(String),
}

impl PartialEq for TokenError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::InvalidToken, Self::InvalidToken)
                | (Self::ExpiredToken, Self::ExpiredToken)
                | (Self::EncodingError(_), Self::EncodingError(_))
        )
    }
}

/// Signing and validation of the self-verifying token pair. Validation is
/// signature + expiry only; nothing here consults the event log.
pub trait TokenCodec: Send + Sync {
    fn encode_access(&self, claims: &AccessClaims) -> Result<String, TokenError>;

    fn encode_refresh(&self, claims: &RefreshClaims) -> Result<String, TokenError>;

    fn decode_access(&self, token: &str) -> Result<AccessClaims, TokenError>;

    fn decode_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError>;

    /// Decode without the expiry check. Used on logout, where an expired
    /// token should still produce a `SessionEnded` record.
    fn decode_access_ignoring_expiry(&self, token: &str) -> Result<AccessClaims, TokenError>;
}
