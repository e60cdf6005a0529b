use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use guarita_application::LoginOutcome;
use guarita_core::{
    AccountStore, AccountSummary, CredentialHasher, EmailDispatcher, EventStore, Password,
    TokenCodec,
};

use crate::{error::AuthApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email address.
    pub identifier: String,
    pub password: Secret<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub account: AccountSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub challenge_required: bool,
    /// Account id to hand back to `/auth/verify-2fa`.
    pub account_ref: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// First step of authentication. Without a second factor the response is
/// the token pair; with one, 206 and the account id to hand back to
/// `/verify-2fa`.
#[tracing::instrument(name = "Login", skip_all)]
pub async fn login<A, S, H, C, D>(
    State(state): State<AppState<A, S, H, C, D>>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AuthApiError>
where
    A: AccountStore + Clone + 'static,
    S: EventStore + Clone + 'static,
    H: CredentialHasher + Clone + 'static,
    C: TokenCodec + Clone + 'static,
    D: EmailDispatcher + Clone + 'static,
{
    let password = Password::try_from(request.password)?;

    let outcome = state.login.execute(&request.identifier, password).await?;

    match outcome {
        LoginOutcome::TokensIssued { tokens, account } => Ok((
            StatusCode::OK,
            Json(TokensResponse {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
                account,
            }),
        )
            .into_response()),
        LoginOutcome::ChallengeIssued {
            account_id,
            warning,
        } => Ok((
            StatusCode::PARTIAL_CONTENT,
            Json(ChallengeResponse {
                challenge_required: true,
                account_ref: account_id,
                warning,
            }),
        )
            .into_response()),
    }
}
