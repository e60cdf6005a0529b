use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use uuid::Uuid;

use guarita_core::{
    AccountStore, CredentialHasher, EmailDispatcher, EventStore, OneTimeCode, TokenCodec,
};

use crate::{error::AuthApiError, routes::login::TokensResponse, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verify2FaRequest {
    pub account_id: Uuid,
    pub code: String,
}

/// Second step of a challenged login: spend the emailed code for the token
/// pair.
#[tracing::instrument(name = "Verify 2FA", skip_all)]
pub async fn verify_2fa<A, S, H, C, D>(
    State(state): State<AppState<A, S, H, C, D>>,
    Json(request): Json<Verify2FaRequest>,
) -> Result<impl IntoResponse, AuthApiError>
where
    A: AccountStore + Clone + 'static,
    S: EventStore + Clone + 'static,
    H: CredentialHasher + Clone + 'static,
    C: TokenCodec + Clone + 'static,
    D: EmailDispatcher + Clone + 'static,
{
    let code = OneTimeCode::parse(&request.code)?;

    let (tokens, account) = state
        .complete_two_factor
        .execute(request.account_id, code)
        .await?;

    Ok(Json(TokensResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        account,
    }))
}
