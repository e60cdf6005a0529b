use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use secrecy::Secret;
use serde::{Deserialize, Serialize};

use guarita_core::{
    AccountStore, CredentialHasher, Email, EmailDispatcher, EventStore, Password, ResetToken,
    TokenCodec,
};

use crate::{error::AuthApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RequestResetRequest {
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgmentResponse {
    pub ack: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Start a reset. The acknowledgment is identical whether or not the email
/// maps to an account.
#[tracing::instrument(name = "Request password reset", skip_all)]
pub async fn request_password_reset<A, S, H, C, D>(
    State(state): State<AppState<A, S, H, C, D>>,
    Json(request): Json<RequestResetRequest>,
) -> Result<impl IntoResponse, AuthApiError>
where
    A: AccountStore + Clone + 'static,
    S: EventStore + Clone + 'static,
    H: CredentialHasher + Clone + 'static,
    C: TokenCodec + Clone + 'static,
    D: EmailDispatcher + Clone + 'static,
{
    let email = Email::parse(&request.email)?;

    let warning = state.password_reset.request_reset(&email).await?;

    Ok(Json(AcknowledgmentResponse { ack: true, warning }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyTicketQuery {
    pub token: String,
}

#[derive(Serialize)]
pub struct TicketStatusResponse {
    pub valid: bool,
}

/// Pre-flight check so a reset form can reject a stale link before asking
/// for a new password. A malformed token is simply not valid.
#[tracing::instrument(name = "Verify reset ticket", skip_all)]
pub async fn verify_reset_ticket<A, S, H, C, D>(
    State(state): State<AppState<A, S, H, C, D>>,
    Query(query): Query<VerifyTicketQuery>,
) -> Result<impl IntoResponse, AuthApiError>
where
    A: AccountStore + Clone + 'static,
    S: EventStore + Clone + 'static,
    H: CredentialHasher + Clone + 'static,
    C: TokenCodec + Clone + 'static,
    D: EmailDispatcher + Clone + 'static,
{
    let valid = match ResetToken::parse(&query.token) {
        Ok(token) => state.password_reset.verify_ticket(&token).await?,
        Err(_) => false,
    };

    Ok(Json(TicketStatusResponse { valid }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResetRequest {
    pub token: String,
    pub new_password: Secret<String>,
}

/// Spend the ticket and set the new password.
#[tracing::instrument(name = "Redeem password reset", skip_all)]
pub async fn redeem_password_reset<A, S, H, C, D>(
    State(state): State<AppState<A, S, H, C, D>>,
    Json(request): Json<RedeemResetRequest>,
) -> Result<impl IntoResponse, AuthApiError>
where
    A: AccountStore + Clone + 'static,
    S: EventStore + Clone + 'static,
    H: CredentialHasher + Clone + 'static,
    C: TokenCodec + Clone + 'static,
    D: EmailDispatcher + Clone + 'static,
{
    // A token that does not even parse gets the same answer as one that was
    // never issued.
    let token =
        ResetToken::parse(&request.token).map_err(|_| AuthApiError::InvalidResetTicket)?;
    let new_password = Password::try_from(request.new_password)?;

    state.password_reset.redeem(&token, &new_password).await?;

    Ok(Json(AcknowledgmentResponse {
        ack: true,
        warning: None,
    }))
}
