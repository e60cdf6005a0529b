use guarita_core::{EventStore, EventStoreError, TokenCodec, TokenError};

use crate::token_issuer::{TokenIssueError, TokenIssuer};

/// Error types for the logout use case
#[derive(Debug, thiserror::Error)]
pub enum LogoutError {
    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
    #[error("Event store error: {0}")]
    EventStoreError(#[from] EventStoreError),
}

impl From<TokenIssueError> for LogoutError {
    fn from(error: TokenIssueError) -> Self {
        match error {
            TokenIssueError::TokenError(e) => LogoutError::TokenError(e),
            TokenIssueError::EventStoreError(e) => LogoutError::EventStoreError(e),
        }
    }
}

/// Records the end of a session for the presented access token.
#[derive(Clone)]
pub struct LogoutUseCase<S, C>
where
    S: EventStore,
    C: TokenCodec,
{
    issuer: TokenIssuer<S, C>,
}

impl<S, C> LogoutUseCase<S, C>
where
    S: EventStore,
    C: TokenCodec,
{
    pub fn new(events: S, codec: C) -> Self {
        Self {
            issuer: TokenIssuer::new(events, codec),
        }
    }

    #[tracing::instrument(name = "LogoutUseCase::execute", skip_all)]
    pub async fn execute(&self, access_token: &str) -> Result<(), LogoutError> {
        self.issuer.revoke(access_token).await?;
        Ok(())
    }
}
