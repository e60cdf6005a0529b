use chrono::Utc;
use serde_json::json;

use guarita_core::{
    AccessClaims, Account, ActionKind, EventStore, EventStoreError, NewEventRecord, RefreshClaims,
    SubjectType, TokenCodec, TokenError, TokenPair, REFRESH_TOKEN_TYPE,
};

/// Access-token lifetime: one hour.
pub const ACCESS_TTL_SECONDS: i64 = 60 * 60;

/// Refresh-token lifetime: thirty days.
pub const REFRESH_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;

/// How much of a token the `TokenIssued` record keeps. Enough to correlate
/// with client logs, never enough to replay.
const TOKEN_PREFIX_LEN: usize = 12;

fn prefix(token: &str) -> &str {
    &token[..token.len().min(TOKEN_PREFIX_LEN)]
}

/// Error types for token issuance and revocation
#[derive(Debug, thiserror::Error)]
pub enum TokenIssueError {
    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
    #[error("Event store error: {0}")]
    EventStoreError(#[from] EventStoreError),
}

/// Signed access/refresh pair minting and self-contained validation.
#[derive(Clone)]
pub struct TokenIssuer<S, C>
where
    S: EventStore,
    C: TokenCodec,
{
    events: S,
    codec: C,
}

impl<S, C> TokenIssuer<S, C>
where
    S: EventStore,
    C: TokenCodec,
{
    pub fn new(events: S, codec: C) -> Self {
        Self { events, codec }
    }

    /// Mint both tokens and append a `TokenIssued` record carrying only a
    /// truncated prefix of each.
    #[tracing::instrument(name = "TokenIssuer::issue_pair", skip_all, fields(account_id = %account.id))]
    pub async fn issue_pair(&self, account: &Account) -> Result<TokenPair, TokenIssueError> {
        let iat = Utc::now().timestamp();

        let access_claims = AccessClaims {
            sub: account.id,
            company_id: account.company_id,
            email: account.email.to_string(),
            username: account.username.clone(),
            role: account.role.clone(),
            iat,
            exp: iat + ACCESS_TTL_SECONDS,
        };
        let refresh_claims = RefreshClaims {
            sub: account.id,
            token_type: REFRESH_TOKEN_TYPE.to_string(),
            iat,
            exp: iat + REFRESH_TTL_SECONDS,
        };

        let access_token = self.codec.encode_access(&access_claims)?;
        let refresh_token = self.codec.encode_refresh(&refresh_claims)?;

        self.events
            .append(
                NewEventRecord::new(
                    SubjectType::Session,
                    account.id.to_string(),
                    ActionKind::TokenIssued,
                    Utc::now(),
                )
                .actor(account.id)
                .new_state(json!({
                    "access_prefix": prefix(&access_token),
                    "refresh_prefix": prefix(&refresh_token),
                })),
            )
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Signature and expiry check only. `SessionEnded` records are written
    /// on logout and password reset but are not consulted here; revocation
    /// is currently recorded, not enforced.
    pub fn validate(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.codec.decode_access(token)
    }

    /// Append `SessionEnded` for the token's account. Expiry is ignored on
    /// decode so that logging out with a just-expired token still leaves its
    /// trace.
    #[tracing::instrument(name = "TokenIssuer::revoke", skip_all)]
    pub async fn revoke(&self, token: &str) -> Result<(), TokenIssueError> {
        let claims = self.codec.decode_access_ignoring_expiry(token)?;

        self.events
            .append(
                NewEventRecord::new(
                    SubjectType::Session,
                    claims.sub.to_string(),
                    ActionKind::SessionEnded,
                    Utc::now(),
                )
                .actor(claims.sub)
                .new_state(json!({ "access_prefix": prefix(token) }))
                .note("logout"),
            )
            .await?;
        Ok(())
    }
}
