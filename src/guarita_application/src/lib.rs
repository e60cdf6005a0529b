//! Security components and use cases.
//!
//! The components map one-to-one onto the interacting state machines of the
//! subsystem: [`LockoutGuard`] (failed-attempt lockout),
//! [`CredentialVerifier`] (password comparison), [`TwoFactorChallenge`]
//! (one-time email codes), [`PasswordResetFlow`] (single-use reset tickets)
//! and [`TokenIssuer`] (signed token pairs). The use cases compose them
//! into the operations the HTTP boundary exposes.

pub mod credential;
pub mod lockout;
pub mod password_reset;
pub mod token_issuer;
pub mod two_factor;
pub mod use_cases;

pub use credential::{CredentialError, CredentialVerifier};
pub use lockout::{LockoutError, LockoutGuard, LOCK_DURATION_MINUTES, MAX_ATTEMPTS};
pub use password_reset::{PasswordResetError, PasswordResetFlow, TICKET_TTL_MINUTES};
pub use token_issuer::{TokenIssueError, TokenIssuer, ACCESS_TTL_SECONDS, REFRESH_TTL_SECONDS};
pub use two_factor::{TwoFactorChallenge, TwoFactorError, CODE_TTL_MINUTES};

pub use use_cases::{
    complete_two_factor::{CompleteTwoFactorError, CompleteTwoFactorUseCase},
    login::{LoginError, LoginOutcome, LoginUseCase},
    logout::{LogoutError, LogoutUseCase},
    toggle_two_factor::{ToggleTwoFactorError, ToggleTwoFactorUseCase},
};

#[cfg(test)]
pub(crate) mod test_support;
