use axum::{Json, extract::State, http::HeaderMap, response::IntoResponse};

use guarita_core::{AccountStore, CredentialHasher, EmailDispatcher, EventStore, TokenCodec};

use crate::{
    error::AuthApiError, extract::bearer_token, routes::password_reset::AcknowledgmentResponse,
    state::AppState,
};

/// Record the end of the presented session. An expired token is still
/// accepted here; only a token that never verified is refused.
#[tracing::instrument(name = "Logout", skip_all)]
pub async fn logout<A, S, H, C, D>(
    State(state): State<AppState<A, S, H, C, D>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthApiError>
where
    A: AccountStore + Clone + 'static,
    S: EventStore + Clone + 'static,
    H: CredentialHasher + Clone + 'static,
    C: TokenCodec + Clone + 'static,
    D: EmailDispatcher + Clone + 'static,
{
    let token = bearer_token(&headers)?;

    state.logout.execute(token).await?;

    Ok(Json(AcknowledgmentResponse {
        ack: true,
        warning: None,
    }))
}
