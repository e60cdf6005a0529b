use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use guarita_application::{
    CompleteTwoFactorError, LoginError, LogoutError, PasswordResetError, ToggleTwoFactorError,
};
use guarita_core::{InputError, TokenError};

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AuthApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is temporarily locked")]
    AccountLocked,

    #[error("Two-factor code is invalid or expired")]
    InvalidTwoFactorCode,

    #[error("Reset ticket is invalid or expired")]
    InvalidResetTicket,

    #[error("Missing token")]
    MissingToken,

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AuthApiError::InvalidInput(_) | AuthApiError::MissingToken => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }

            AuthApiError::AccountLocked => (StatusCode::LOCKED, self.to_string()),

            AuthApiError::InvalidCredentials
            | AuthApiError::InvalidTwoFactorCode
            | AuthApiError::InvalidResetTicket
            | AuthApiError::AuthenticationError(_) => (StatusCode::UNAUTHORIZED, self.to_string()),

            // Store failures never leak details to the client.
            AuthApiError::UnexpectedError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status_code, body).into_response()
    }
}

impl From<InputError> for AuthApiError {
    fn from(error: InputError) -> Self {
        AuthApiError::InvalidInput(error.to_string())
    }
}

impl From<TokenError> for AuthApiError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::InvalidToken | TokenError::ExpiredToken => {
                AuthApiError::AuthenticationError(error.to_string())
            }
            TokenError::EncodingError(e) => AuthApiError::UnexpectedError(e),
        }
    }
}

impl From<LoginError> for AuthApiError {
    fn from(error: LoginError) -> Self {
        match error {
            LoginError::InvalidCredentials => AuthApiError::InvalidCredentials,
            LoginError::AccountLocked => AuthApiError::AccountLocked,
            LoginError::AccountStoreError(e) => AuthApiError::UnexpectedError(e.to_string()),
            LoginError::EventStoreError(e) => AuthApiError::UnexpectedError(e.to_string()),
            LoginError::TokenError(e) => AuthApiError::UnexpectedError(e.to_string()),
        }
    }
}

impl From<CompleteTwoFactorError> for AuthApiError {
    fn from(error: CompleteTwoFactorError) -> Self {
        match error {
            CompleteTwoFactorError::CodeInvalidOrExpired => AuthApiError::InvalidTwoFactorCode,
            CompleteTwoFactorError::AccountStoreError(e) => {
                AuthApiError::UnexpectedError(e.to_string())
            }
            CompleteTwoFactorError::EventStoreError(e) => {
                AuthApiError::UnexpectedError(e.to_string())
            }
            CompleteTwoFactorError::TokenError(e) => AuthApiError::UnexpectedError(e.to_string()),
        }
    }
}

impl From<LogoutError> for AuthApiError {
    fn from(error: LogoutError) -> Self {
        match error {
            LogoutError::TokenError(e) => e.into(),
            LogoutError::EventStoreError(e) => AuthApiError::UnexpectedError(e.to_string()),
        }
    }
}

impl From<ToggleTwoFactorError> for AuthApiError {
    fn from(error: ToggleTwoFactorError) -> Self {
        match error {
            ToggleTwoFactorError::EventStoreError(e) => AuthApiError::UnexpectedError(e.to_string()),
        }
    }
}

impl From<PasswordResetError> for AuthApiError {
    fn from(error: PasswordResetError) -> Self {
        match error {
            PasswordResetError::InvalidOrExpiredTicket => AuthApiError::InvalidResetTicket,
            PasswordResetError::AccountStoreError(e) => AuthApiError::UnexpectedError(e.to_string()),
            PasswordResetError::EventStoreError(e) => AuthApiError::UnexpectedError(e.to_string()),
            PasswordResetError::CredentialHashError(e) => {
                AuthApiError::UnexpectedError(e.to_string())
            }
        }
    }
}
