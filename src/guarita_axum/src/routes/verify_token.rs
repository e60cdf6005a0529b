use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use uuid::Uuid;

use guarita_core::{AccountStore, CredentialHasher, EmailDispatcher, EventStore, TokenCodec};

use crate::{error::AuthApiError, extract::bearer_token, state::AppState};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedTokenResponse {
    pub account_id: Uuid,
    pub company_id: Uuid,
    pub username: String,
    pub role: String,
}

/// Validate the presented access token and echo its identity claims.
/// Other services call this to authenticate requests on our behalf.
#[tracing::instrument(name = "Verify token", skip_all)]
pub async fn verify_token<A, S, H, C, D>(
    State(state): State<AppState<A, S, H, C, D>>,
    headers: axum::http::HeaderMap,
) -> Result<impl IntoResponse, AuthApiError>
where
    A: AccountStore + Clone + 'static,
    S: EventStore + Clone + 'static,
    H: CredentialHasher + Clone + 'static,
    C: TokenCodec + Clone + 'static,
    D: EmailDispatcher + Clone + 'static,
{
    let token = bearer_token(&headers)?;
    let claims = state.token_issuer.validate(token)?;

    Ok(Json(VerifiedTokenResponse {
        account_id: claims.sub,
        company_id: claims.company_id,
        username: claims.username,
        role: claims.role,
    }))
}
