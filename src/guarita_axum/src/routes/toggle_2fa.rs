use axum::{Json, extract::State, http::HeaderMap, response::IntoResponse};
use serde::{Deserialize, Serialize};

use guarita_core::{AccountStore, CredentialHasher, EmailDispatcher, EventStore, TokenCodec};

use crate::{error::AuthApiError, extract::bearer_token, state::AppState};

#[derive(Debug, Deserialize)]
pub struct Toggle2FaRequest {
    pub enable: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Toggle2FaResponse {
    pub ack: bool,
    pub two_factor_enabled: bool,
}

/// Switch email-code verification on or off for the authenticated account.
#[tracing::instrument(name = "Toggle 2FA", skip_all)]
pub async fn toggle_2fa<A, S, H, C, D>(
    State(state): State<AppState<A, S, H, C, D>>,
    headers: HeaderMap,
    Json(request): Json<Toggle2FaRequest>,
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

    let enabled = state
        .toggle_two_factor
        .execute(claims.sub, request.enable)
        .await?;

    Ok(Json(Toggle2FaResponse {
        ack: true,
        two_factor_enabled: enabled,
    }))
}
